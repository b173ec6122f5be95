pub mod admin;
pub mod identity;
pub mod profile;
pub mod report;

pub use admin::NewAdminFlag;
pub use identity::{Identity, Session};
pub use profile::{NewProfile, ProfilePayload};
pub use report::{FailureKind, ProbeReport, ProbeStep, StepReport, StepStatus};
