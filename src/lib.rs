//! Connectivity and schema verification probe for Supabase projects.
//!
//! Checks that a client can be built, that a user session resolves to an
//! identity, that the profile procedure and tables exist, and creates the
//! per-user profile and admin records when they are absent.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;
