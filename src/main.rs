use clap::{Parser, Subcommand};
use std::error::Error;
use tracing::{error, info, warn};

use supabase_probe::config::ProbeConfig;
use supabase_probe::domain::models::{ProbeReport, StepStatus};
use supabase_probe::domain::services::{ConnectivityProber, ProbeOptions};
use supabase_probe::infrastructure::supabase::BackendFactory;
use supabase_probe::utils::logging;

/// Supabase connectivity and schema verification probe
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available probe commands
#[derive(Subcommand)]
enum Commands {
    /// Check auth, the profile procedure and the profile/admin tables
    Probe {
        /// Do not call the profile procedure
        #[arg(long)]
        skip_rpc: bool,
        /// Report missing records without creating them
        #[arg(long)]
        no_create: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Debug the profile procedure and the profile table
    DebugRpc {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables before the filter reads RUST_LOG
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logger();

    // Parse command line arguments
    let cli = Cli::parse();
    let config = ProbeConfig::from_env();

    match cli.command {
        Commands::Probe {
            skip_rpc,
            no_create,
            json,
        } => {
            let options = ProbeOptions {
                probe_procedure: !skip_rpc,
                create_missing: !no_create,
                ..ProbeOptions::from_config(&config)
            };
            let client = BackendFactory::connect(&config.supabase).await;
            let report = ConnectivityProber::new(client, options).run().await;
            emit(&report, json)?;
        }
        Commands::DebugRpc { json } => {
            let client = BackendFactory::connect(&config.supabase).await;
            let report = ConnectivityProber::new(client, ProbeOptions::from_config(&config))
                .debug_procedure()
                .await;
            emit(&report, json)?;
        }
        Commands::Config => show_config(&config),
    }

    Ok(())
}

/// Logs the summary line and optionally prints the full report
fn emit(report: &ProbeReport, json: bool) -> Result<(), Box<dyn Error>> {
    let summary = format!(
        "{} probe: {} passed, {} advisory, {} failed, {} skipped",
        report.sequence,
        report.count(StepStatus::Pass),
        report.count(StepStatus::Advisory),
        report.count(StepStatus::Fail),
        report.count(StepStatus::Skipped),
    );
    if report.has_failures() {
        warn!("{}", summary);
    } else {
        info!("{}", summary);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}

fn show_config(config: &ProbeConfig) {
    let supabase = &config.supabase;
    info!("URL: {}", supabase.url);
    info!("Key: {}", logging::mask_secret(&supabase.anon_key));

    let session = if supabase.access_token.is_some() {
        "access token"
    } else if supabase.credentials().is_some() {
        "password sign-in"
    } else {
        "none"
    };
    info!("Session source: {}", session);
    info!(
        "Procedure: {}, profile table: {}, admin table: {}",
        config.targets.procedure, config.targets.profile_table, config.targets.admin_table
    );
    info!(
        "Timeouts: {}s request, {}s connect",
        supabase.timeout_secs, supabase.connect_timeout_secs
    );

    match supabase.validate() {
        Ok(()) => info!("✅ Configuration is complete"),
        Err(e) => {
            error!("❌ {}", e);
            info!("Set SUPABASE_URL and SUPABASE_ANON_KEY (environment or .env file)");
        }
    }
}
