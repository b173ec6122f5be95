use serde::Serialize;

use super::identity::Identity;

/// Arguments of the profile upsert procedure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub p_first_name: Option<String>,
    pub p_last_name: Option<String>,
    pub p_email: Option<String>,
    pub p_phone: Option<String>,
    pub p_country: Option<String>,
    pub p_age: Option<u32>,
    pub p_profile_picture_url: Option<String>,
}

impl ProfilePayload {
    /// Fixed test payload used to probe the procedure
    pub fn probe(identity: &Identity) -> Self {
        Self {
            p_first_name: Some("Test".to_string()),
            p_last_name: Some("User".to_string()),
            p_email: identity.email.clone(),
            p_phone: None,
            p_country: None,
            p_age: None,
            p_profile_picture_url: None,
        }
    }
}

/// Minimal profile row inserted when none exists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl NewProfile {
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            user_id: identity.id.clone(),
            email: identity.email.clone(),
            first_name: identity
                .metadata_str("first_name")
                .unwrap_or("User")
                .to_string(),
            last_name: identity
                .metadata_str("last_name")
                .unwrap_or("Name")
                .to_string(),
        }
    }
}
