use serde::Serialize;

/// Admin flag row inserted when none exists; never grants admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAdminFlag {
    pub user_id: String,
    pub is_admin: bool,
}

impl NewAdminFlag {
    pub fn not_admin(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_admin: false,
        }
    }
}
