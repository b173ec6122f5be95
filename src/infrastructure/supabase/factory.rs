//! Factory for the backend handle handed to the prober

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::SupabaseConfig;
use crate::infrastructure::supabase::{BackendService, SupabaseClient};

/// Factory for creating backend handles
pub struct BackendFactory;

impl BackendFactory {
    /// Builds the client and establishes a session when credentials allow.
    ///
    /// Returns `None` when the project is not configured; the prober reports
    /// that as an unavailable client. A failed sign-in still yields a client,
    /// without a session.
    pub async fn connect(config: &SupabaseConfig) -> Option<Arc<dyn BackendService>> {
        if let Err(e) = config.validate() {
            warn!("Supabase not configured: {}", e);
            return None;
        }

        let client = match SupabaseClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create Supabase client: {}", e);
                return None;
            }
        };

        let client = if let Some(token) = &config.access_token {
            info!("Using access token from SUPABASE_ACCESS_TOKEN");
            client.with_access_token(token.clone())
        } else if let Some((email, password)) = config.credentials() {
            match client.sign_in_with_password(email, password).await {
                Ok(session) => {
                    info!("Signed in as {}", email);
                    client.with_access_token(session.access_token)
                }
                Err(e) => {
                    error!("Sign-in failed for {}: {}", email, e);
                    client
                }
            }
        } else {
            client
        };

        Some(Arc::new(client))
    }
}
