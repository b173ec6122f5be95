use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

/// Checks performed by the prober, in the order they can appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStep {
    ClientHandle,
    Identity,
    RemoteProcedure,
    TableExistence,
    ProfileLookup,
    AdminLookup,
    ProfileCreation,
    AdminCreation,
    Completion,
}

impl ProbeStep {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStep::ClientHandle => "client",
            ProbeStep::Identity => "identity",
            ProbeStep::RemoteProcedure => "remote procedure",
            ProbeStep::TableExistence => "table existence",
            ProbeStep::ProfileLookup => "profile lookup",
            ProbeStep::AdminLookup => "admin lookup",
            ProbeStep::ProfileCreation => "profile creation",
            ProbeStep::AdminCreation => "admin creation",
            ProbeStep::Completion => "completion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pass,
    Advisory,
    Fail,
    Skipped,
}

/// Why a step did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ClientUnavailable,
    NotAuthenticated,
    ProcedureMissing,
    RelationMissing,
    RemoteError,
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ClientUnavailable => "client_unavailable",
            FailureKind::NotAuthenticated => "not_authenticated",
            FailureKind::ProcedureMissing => "procedure_missing",
            FailureKind::RelationMissing => "relation_missing",
            FailureKind::RemoteError => "remote_error",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: ProbeStep,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl StepReport {
    fn new(step: ProbeStep, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            step,
            status,
            kind: None,
            message: message.into(),
            hints: Vec::new(),
            data: None,
        }
    }

    pub fn pass(step: ProbeStep, message: impl Into<String>) -> Self {
        Self::new(step, StepStatus::Pass, message)
    }

    pub fn skipped(step: ProbeStep, message: impl Into<String>) -> Self {
        Self::new(step, StepStatus::Skipped, message)
    }

    /// A condition worth a warning that is not a failure
    pub fn advisory(step: ProbeStep, message: impl Into<String>) -> Self {
        Self::new(step, StepStatus::Advisory, message)
    }

    pub fn fail(step: ProbeStep, kind: FailureKind, message: impl Into<String>) -> Self {
        let mut report = Self::new(step, StepStatus::Fail, message);
        report.kind = Some(kind);
        report
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints.extend(hints.into_iter().map(Into::into));
        self
    }

    fn log(&self) {
        let step = self.step.label();
        match self.status {
            StepStatus::Pass => match &self.data {
                Some(data) => info!(step, "✅ {}: {}", self.message, data),
                None => info!(step, "✅ {}", self.message),
            },
            StepStatus::Advisory => warn!(step, "⚠️ {}", self.message),
            StepStatus::Skipped => info!(step, "⏭️ {}", self.message),
            StepStatus::Fail => match self.kind {
                Some(kind) => error!(step, kind = %kind, "❌ {}", self.message),
                None => error!(step, "❌ {}", self.message),
            },
        }
        for hint in &self.hints {
            info!(step, "💡 {}", hint);
        }
    }
}

/// Pass/fail/advisory per step for one probe run
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub sequence: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub steps: Vec<StepReport>,
}

impl ProbeReport {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            started_at: Utc::now(),
            finished_at: None,
            completed: false,
            steps: Vec::new(),
        }
    }

    /// Logs the step and appends it to the report
    pub fn record(&mut self, step: StepReport) {
        step.log();
        if step.step == ProbeStep::Completion {
            self.completed = true;
        }
        self.steps.push(step);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn step(&self, step: ProbeStep) -> Option<&StepReport> {
        self.steps.iter().find(|report| report.step == step)
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps
            .iter()
            .filter(|report| report.status == status)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(StepStatus::Fail) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_marks_report_completed() {
        let mut report = ProbeReport::new("connection");
        report.record(StepReport::pass(ProbeStep::ClientHandle, "Supabase client found"));
        assert!(!report.completed);

        report.record(StepReport::pass(ProbeStep::Completion, "done"));
        let report = report.finish();
        assert!(report.completed);
        assert!(report.finished_at.is_some());
        assert_eq!(report.count(StepStatus::Pass), 2);
        assert!(!report.has_failures());
    }

    #[test]
    fn failure_kind_displays_without_option_wrapper() {
        let step = StepReport::fail(ProbeStep::ClientHandle, FailureKind::ClientUnavailable, "missing");
        let shown = step.kind.map(|kind| kind.to_string());
        assert_eq!(shown.as_deref(), Some("client_unavailable"));

        // The logged form matches the serialized form
        for kind in [FailureKind::NotAuthenticated, FailureKind::RelationMissing, FailureKind::Unexpected] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.to_string()));
        }
    }

    #[test]
    fn serializes_kind_and_hints() {
        let step = StepReport::fail(ProbeStep::RemoteProcedure, FailureKind::ProcedureMissing, "missing")
            .with_hints(["Run the SQL script"]);
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(
            value,
            json!({
                "step": "remote_procedure",
                "status": "fail",
                "kind": "procedure_missing",
                "message": "missing",
                "hints": ["Run the SQL script"]
            })
        );
    }
}
