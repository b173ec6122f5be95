use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Number of leading key characters shown before masking
const VISIBLE_SECRET_CHARS: usize = 20;

/// Initialize the tracing subscriber, honouring RUST_LOG (default `info`).
///
/// Logs go to stderr; stdout is reserved for the `--json` report.
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Shows the start of a secret and hides the rest
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() > VISIBLE_SECRET_CHARS {
        let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();
        format!("{}...", visible)
    } else {
        secret.to_string()
    }
}
