// Connectivity and schema verification probe

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::{ProbeConfig, ProbeTargets};
use crate::domain::models::{
    FailureKind, Identity, NewAdminFlag, NewProfile, ProbeReport, ProbeStep, ProfilePayload,
    StepReport,
};
use crate::infrastructure::supabase::{BackendError, BackendErrorKind, BackendService};

/// Remediation shown when the profile procedure is missing
const PROCEDURE_HINTS: [&str; 5] = [
    "The SQL script needs to be executed in Supabase:",
    "1. Go to your Supabase dashboard",
    "2. Navigate to SQL Editor",
    "3. Paste the profile provisioning SQL script",
    "4. Click Run to execute the script",
];

/// Which optional parts of the connection probe run
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub targets: ProbeTargets,
    /// Call the profile procedure before the table checks
    pub probe_procedure: bool,
    /// Create profile/admin records that turn out to be absent
    pub create_missing: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            targets: ProbeTargets::default(),
            probe_procedure: true,
            create_missing: true,
        }
    }
}

impl ProbeOptions {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            targets: config.targets.clone(),
            ..Self::default()
        }
    }
}

/// Result of a keyed lookup; creation only follows `Absent`
#[derive(Debug)]
enum Lookup {
    Found,
    Absent,
    Failed,
}

/// Runs sequential checks against the data-and-auth service
pub struct ConnectivityProber {
    client: Option<Arc<dyn BackendService>>,
    options: ProbeOptions,
}

impl ConnectivityProber {
    pub fn new(client: Option<Arc<dyn BackendService>>, options: ProbeOptions) -> Self {
        Self { client, options }
    }

    /// Full connection test: identity, procedure, lookups, creation fallback
    pub async fn run(&self) -> ProbeReport {
        let mut report = ProbeReport::new("connection");
        info!("🧪 Testing Supabase connection...");

        let Some(client) = self.check_client(&mut report) else {
            return report.finish();
        };
        let Some(identity) = self.check_identity(client, &mut report).await else {
            return report.finish();
        };

        if self.options.probe_procedure {
            self.probe_procedure(client, &identity, &mut report).await;
        } else {
            report.record(StepReport::skipped(
                ProbeStep::RemoteProcedure,
                "Remote procedure probe disabled",
            ));
        }

        let profile = self.lookup_profile(client, &identity, &mut report).await;
        let admin = self.lookup_admin(client, &identity, &mut report).await;

        self.create_profile_if_absent(client, &identity, profile, &mut report)
            .await;
        self.create_admin_if_absent(client, &identity, admin, &mut report)
            .await;

        report.record(StepReport::pass(
            ProbeStep::Completion,
            "🎉 Supabase connection test completed",
        ));
        report.finish()
    }

    /// Procedure debugging: identity, procedure call, table existence
    pub async fn debug_procedure(&self) -> ProbeReport {
        let mut report = ProbeReport::new("procedure");
        info!("🔍 Debugging Supabase remote procedure...");

        let Some(client) = self.check_client(&mut report) else {
            return report.finish();
        };
        let Some(identity) = self.check_identity(client, &mut report).await else {
            return report.finish();
        };

        self.probe_procedure(client, &identity, &mut report).await;
        self.probe_profile_table(client, &mut report).await;

        report.record(StepReport::pass(
            ProbeStep::Completion,
            "Remote procedure debugging completed",
        ));
        report.finish()
    }

    fn check_client<'a>(&'a self, report: &mut ProbeReport) -> Option<&'a Arc<dyn BackendService>> {
        match &self.client {
            Some(client) => {
                report.record(StepReport::pass(ProbeStep::ClientHandle, "Supabase client found"));
                Some(client)
            }
            None => {
                report.record(StepReport::fail(
                    ProbeStep::ClientHandle,
                    FailureKind::ClientUnavailable,
                    "Supabase client unavailable: set SUPABASE_URL and SUPABASE_ANON_KEY",
                ));
                None
            }
        }
    }

    async fn check_identity(
        &self,
        client: &Arc<dyn BackendService>,
        report: &mut ProbeReport,
    ) -> Option<Identity> {
        match client.current_identity().await {
            Ok(Some(identity)) => {
                report.record(StepReport::pass(
                    ProbeStep::Identity,
                    format!("User authenticated: {}", identity.display_name()),
                ));
                Some(identity)
            }
            Ok(None) => {
                report.record(StepReport::fail(
                    ProbeStep::Identity,
                    FailureKind::NotAuthenticated,
                    "No user logged in - please log in first",
                ));
                None
            }
            Err(e) => {
                report.record(StepReport::fail(
                    ProbeStep::Identity,
                    classify_generic(&e),
                    format!("Error getting user: {}", e),
                ));
                None
            }
        }
    }

    async fn probe_procedure(
        &self,
        client: &Arc<dyn BackendService>,
        identity: &Identity,
        report: &mut ProbeReport,
    ) {
        let name = &self.options.targets.procedure;
        info!("🔍 Testing if {} function exists...", name);

        let args = match serde_json::to_value(ProfilePayload::probe(identity)) {
            Ok(args) => args,
            Err(e) => {
                report.record(StepReport::fail(
                    ProbeStep::RemoteProcedure,
                    FailureKind::Unexpected,
                    format!("Unexpected error encoding arguments: {}", e),
                ));
                return;
            }
        };

        let step = match client.call_procedure(name, args).await {
            Ok(data) => {
                StepReport::pass(ProbeStep::RemoteProcedure, format!("{} works", name)).with_data(data)
            }
            Err(e) => match classify_procedure(&e) {
                FailureKind::ProcedureMissing => StepReport::fail(
                    ProbeStep::RemoteProcedure,
                    FailureKind::ProcedureMissing,
                    format!("Remote procedure {} not found: {}", name, e.message()),
                )
                .with_hints(PROCEDURE_HINTS),
                FailureKind::Unexpected => StepReport::fail(
                    ProbeStep::RemoteProcedure,
                    FailureKind::Unexpected,
                    format!("Unexpected error calling {}: {}", name, e),
                ),
                kind => StepReport::fail(
                    ProbeStep::RemoteProcedure,
                    kind,
                    format!("RPC error from {}: {}", name, e),
                ),
            },
        };
        report.record(step);
    }

    async fn probe_profile_table(&self, client: &Arc<dyn BackendService>, report: &mut ProbeReport) {
        let table = &self.options.targets.profile_table;
        info!("🔍 Testing if {} table exists...", table);

        let step = match client.probe_table(table).await {
            Ok(()) => StepReport::pass(ProbeStep::TableExistence, format!("{} table exists", table)),
            Err(e) => match classify_relation(&e) {
                FailureKind::RelationMissing => StepReport::fail(
                    ProbeStep::TableExistence,
                    FailureKind::RelationMissing,
                    format!("Table {} does not exist: {}", table, e.message()),
                )
                .with_hints([format!(
                    "The {} table needs to be created: run the SQL script in Supabase",
                    table
                )]),
                kind => StepReport::fail(
                    ProbeStep::TableExistence,
                    kind,
                    format!("Table error on {}: {}", table, e),
                ),
            },
        };
        report.record(step);
    }

    async fn lookup_profile(
        &self,
        client: &Arc<dyn BackendService>,
        identity: &Identity,
        report: &mut ProbeReport,
    ) -> Lookup {
        let table = &self.options.targets.profile_table;
        info!("🔍 Testing {} table...", table);

        match client.find_one(table, "user_id", &identity.id).await {
            Ok(Some(record)) => {
                report.record(
                    StepReport::pass(ProbeStep::ProfileLookup, "User profile found").with_data(record),
                );
                Lookup::Found
            }
            Ok(None) => {
                report.record(StepReport::advisory(
                    ProbeStep::ProfileLookup,
                    "No user profile found - this might be expected for new users",
                ));
                Lookup::Absent
            }
            Err(e) => {
                let step = match classify_relation(&e) {
                    FailureKind::RelationMissing => StepReport::fail(
                        ProbeStep::ProfileLookup,
                        FailureKind::RelationMissing,
                        format!("Table {} does not exist: {}", table, e.message()),
                    )
                    .with_hints([format!(
                        "The {} table needs to be created: run the SQL script in Supabase",
                        table
                    )]),
                    kind => StepReport::fail(
                        ProbeStep::ProfileLookup,
                        kind,
                        format!("Error accessing {}: {}", table, e),
                    ),
                };
                report.record(step);
                Lookup::Failed
            }
        }
    }

    async fn lookup_admin(
        &self,
        client: &Arc<dyn BackendService>,
        identity: &Identity,
        report: &mut ProbeReport,
    ) -> Lookup {
        let table = &self.options.targets.admin_table;
        info!("🔍 Testing {} table...", table);

        match client.find_one(table, "user_id", &identity.id).await {
            Ok(Some(record)) => {
                report.record(
                    StepReport::pass(ProbeStep::AdminLookup, "Admin status found").with_data(record),
                );
                Lookup::Found
            }
            Ok(None) => {
                report.record(StepReport::advisory(
                    ProbeStep::AdminLookup,
                    "No admin status found - this might be expected for new users",
                ));
                Lookup::Absent
            }
            Err(e) => {
                report.record(StepReport::fail(
                    ProbeStep::AdminLookup,
                    classify_generic(&e),
                    format!("Error accessing {}: {}", table, e),
                ));
                Lookup::Failed
            }
        }
    }

    async fn create_profile_if_absent(
        &self,
        client: &Arc<dyn BackendService>,
        identity: &Identity,
        lookup: Lookup,
        report: &mut ProbeReport,
    ) {
        let record = NewProfile::for_identity(identity);
        self.create_if_absent(
            client,
            ProbeStep::ProfileCreation,
            &self.options.targets.profile_table,
            &record,
            lookup,
            report,
        )
        .await;
    }

    async fn create_admin_if_absent(
        &self,
        client: &Arc<dyn BackendService>,
        identity: &Identity,
        lookup: Lookup,
        report: &mut ProbeReport,
    ) {
        let record = NewAdminFlag::not_admin(&identity.id);
        self.create_if_absent(
            client,
            ProbeStep::AdminCreation,
            &self.options.targets.admin_table,
            &record,
            lookup,
            report,
        )
        .await;
    }

    async fn create_if_absent(
        &self,
        client: &Arc<dyn BackendService>,
        step: ProbeStep,
        table: &str,
        record: &(impl Serialize + Sync),
        lookup: Lookup,
        report: &mut ProbeReport,
    ) {
        match lookup {
            Lookup::Found => return,
            Lookup::Failed => {
                report.record(StepReport::skipped(
                    step,
                    format!("Not creating a record in {}: the lookup failed", table),
                ));
                return;
            }
            Lookup::Absent if !self.options.create_missing => {
                report.record(StepReport::skipped(
                    step,
                    format!("Record creation in {} disabled", table),
                ));
                return;
            }
            Lookup::Absent => {}
        }

        let record = match serde_json::to_value(record) {
            Ok(record) => record,
            Err(e) => {
                report.record(StepReport::fail(
                    step,
                    FailureKind::Unexpected,
                    format!("Unexpected error encoding record for {}: {}", table, e),
                ));
                return;
            }
        };

        info!("🔧 Creating record in {}...", table);
        let outcome = match client.insert(table, record).await {
            Ok(created) => {
                StepReport::pass(step, format!("Record created in {}", table)).with_data(created)
            }
            Err(e) => StepReport::fail(
                step,
                classify_generic(&e),
                format!("Error creating record in {}: {}", table, e),
            ),
        };
        report.record(outcome);
    }
}

/// Remote error or unexpected (transport/decode) error
pub fn classify_generic(error: &BackendError) -> FailureKind {
    match error.kind() {
        BackendErrorKind::Transport => FailureKind::Unexpected,
        _ => FailureKind::RemoteError,
    }
}

/// As [`classify_generic`], recognising a missing procedure
pub fn classify_procedure(error: &BackendError) -> FailureKind {
    match error.kind() {
        BackendErrorKind::UndefinedFunction => FailureKind::ProcedureMissing,
        _ => classify_generic(error),
    }
}

/// As [`classify_generic`], recognising a missing table
pub fn classify_relation(error: &BackendError) -> FailureKind {
    match error.kind() {
        BackendErrorKind::UndefinedTable => FailureKind::RelationMissing,
        _ => classify_generic(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_classification_uses_kind() {
        let missing = BackendError::api(404, "function public.upsert_user_profile() does not exist");
        assert_eq!(classify_procedure(&missing), FailureKind::ProcedureMissing);

        let denied = BackendError::api(403, "permission denied for function upsert_user_profile");
        assert_eq!(classify_procedure(&denied), FailureKind::RemoteError);

        let transport = BackendError::HttpError("timed out".to_string());
        assert_eq!(classify_procedure(&transport), FailureKind::Unexpected);
    }

    #[test]
    fn relation_classification_ignores_missing_functions() {
        let missing = BackendError::api(404, "relation \"public.user_profiles\" does not exist");
        assert_eq!(classify_relation(&missing), FailureKind::RelationMissing);

        let function = BackendError::api(404, "function foo() does not exist");
        assert_eq!(classify_relation(&function), FailureKind::RemoteError);
    }

    #[test]
    fn admin_lookups_do_not_special_case_missing_tables() {
        let missing = BackendError::api(404, "relation \"public.admin_users\" does not exist");
        assert_eq!(classify_generic(&missing), FailureKind::RemoteError);
    }
}
