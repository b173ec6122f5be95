use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated principal as returned by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity id, used as the key of every per-user record
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form attributes supplied at sign-up
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl Identity {
    /// Non-empty string attribute from `user_metadata`
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Session obtained from a password sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<Identity>,
}
