//! Supabase access
//!
//! The prober only sees the [`BackendService`] trait; [`SupabaseClient`]
//! implements it over the GoTrue and PostgREST HTTP APIs.

pub mod client;
pub mod error;
pub mod factory;

pub use client::SupabaseClient;
pub use error::{ApiError, BackendError, BackendErrorKind};
pub use factory::BackendFactory;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::Identity;

/// Operations the prober needs from the data-and-auth service
#[async_trait]
pub trait BackendService: Send + Sync + std::fmt::Debug {
    /// Current authenticated identity, `None` when there is no session
    async fn current_identity(&self) -> Result<Option<Identity>, BackendError>;

    /// Invokes a named remote procedure with structured arguments
    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, BackendError>;

    /// At most one record of `table` where `column` equals `value`
    async fn find_one(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, BackendError>;

    /// Reads at most one row to confirm the table is reachable
    async fn probe_table(&self, table: &str) -> Result<(), BackendError>;

    /// Inserts one record and returns it as stored
    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError>;
}
