// Error types for Supabase client operations

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Postgres / PostgREST codes for a function that cannot be resolved
const UNDEFINED_FUNCTION_CODES: &[&str] = &["42883", "PGRST202"];
/// Postgres / PostgREST codes for a table that cannot be resolved
const UNDEFINED_TABLE_CODES: &[&str] = &["42P01", "PGRST205"];

/// What went wrong on the remote side, independent of message wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// The named remote procedure does not exist
    UndefinedFunction,
    /// The queried table does not exist
    UndefinedTable,
    /// The request was rejected for lack of a valid session
    Unauthorized,
    /// Any other error reported by the service
    Other,
    /// The request never produced a service response
    Transport,
}

/// Structured error body returned by GoTrue or PostgREST
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ApiError {
    /// Parses an error body, accepting both the PostgREST and GoTrue shapes
    pub fn from_body(status: u16, body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let text = |key: &str| match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        // GoTrue sends a numeric `code` next to a textual `error_code`
        let code = text("code").or_else(|| text("error_code"));
        let message = ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| text(*key))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP status {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        Self {
            status,
            code,
            message,
            details: text("details"),
            hint: text("hint"),
        }
    }

    /// Classifies by error code; message text is consulted only when no code was sent
    pub fn kind(&self) -> BackendErrorKind {
        match self.code.as_deref() {
            Some(code) if UNDEFINED_FUNCTION_CODES.contains(&code) => {
                return BackendErrorKind::UndefinedFunction;
            }
            Some(code) if UNDEFINED_TABLE_CODES.contains(&code) => {
                return BackendErrorKind::UndefinedTable;
            }
            Some(_) => {}
            None => {
                if let Some(kind) = Self::kind_from_message(&self.message) {
                    return kind;
                }
            }
        }

        if self.status == 401 || self.status == 403 {
            BackendErrorKind::Unauthorized
        } else {
            BackendErrorKind::Other
        }
    }

    fn kind_from_message(message: &str) -> Option<BackendErrorKind> {
        let message = message.to_lowercase();
        if message.contains("does not exist") {
            if message.contains("function") {
                return Some(BackendErrorKind::UndefinedFunction);
            }
            if message.contains("relation") {
                return Some(BackendErrorKind::UndefinedTable);
            }
        }
        None
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {} (HTTP {})", code, self.message, self.status),
            None => write!(f, "{} (HTTP {})", self.message, self.status),
        }
    }
}

/// Error type for Supabase client operations
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// The response could not be decoded
    #[error("Response error: {0}")]
    ResponseError(String),
    /// The service answered with an error body
    #[error("API error: {0}")]
    ApiError(ApiError),
}

impl BackendError {
    /// Typed classification of this error
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            BackendError::ApiError(api) => api.kind(),
            BackendError::HttpError(_) | BackendError::ResponseError(_) => {
                BackendErrorKind::Transport
            }
        }
    }

    /// Message text as reported by the service
    pub fn message(&self) -> String {
        match self {
            BackendError::ApiError(api) => api.message.clone(),
            other => other.to_string(),
        }
    }

    /// Builds an API error from a bare message, as a service without codes would
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        BackendError::ApiError(ApiError {
            status,
            code: None,
            message: message.into(),
            details: None,
            hint: None,
        })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            BackendError::ResponseError(error.to_string())
        } else {
            BackendError::HttpError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(error: serde_json::Error) -> Self {
        BackendError::ResponseError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgrest_body_is_parsed() {
        let body = r#"{"code":"42883","details":null,"hint":"No function matches the given name","message":"function public.upsert_user_profile(p_age => integer) does not exist"}"#;
        let error = ApiError::from_body(404, body);
        assert_eq!(error.code.as_deref(), Some("42883"));
        assert_eq!(error.hint.as_deref(), Some("No function matches the given name"));
        assert!(error.details.is_none());
        assert_eq!(error.kind(), BackendErrorKind::UndefinedFunction);
    }

    #[test]
    fn gotrue_body_uses_error_code_and_msg() {
        let body = r#"{"code":401,"error_code":"bad_jwt","msg":"invalid JWT: token is expired"}"#;
        let error = ApiError::from_body(401, body);
        assert_eq!(error.code.as_deref(), Some("bad_jwt"));
        assert_eq!(error.message, "invalid JWT: token is expired");
        assert_eq!(error.kind(), BackendErrorKind::Unauthorized);
    }

    #[test]
    fn schema_cache_codes_are_recognised() {
        let table = ApiError::from_body(
            404,
            r#"{"code":"PGRST205","message":"Could not find the table 'public.user_profiles' in the schema cache"}"#,
        );
        assert_eq!(table.kind(), BackendErrorKind::UndefinedTable);

        let function = ApiError::from_body(
            404,
            r#"{"code":"PGRST202","message":"Could not find the function public.upsert_user_profile in the schema cache"}"#,
        );
        assert_eq!(function.kind(), BackendErrorKind::UndefinedFunction);
    }

    #[test]
    fn message_text_is_the_fallback_without_a_code() {
        let function = BackendError::api(400, "function upsert_user_profile does not exist");
        assert_eq!(function.kind(), BackendErrorKind::UndefinedFunction);

        let relation = BackendError::api(400, "relation \"user_profiles\" does not exist");
        assert_eq!(relation.kind(), BackendErrorKind::UndefinedTable);

        let other = BackendError::api(400, "permission denied for table user_profiles");
        assert_eq!(other.kind(), BackendErrorKind::Other);
    }

    #[test]
    fn unlisted_codes_skip_message_matching() {
        let column = ApiError::from_body(
            400,
            r#"{"code":"42703","message":"column user_profiles.relation_id does not exist"}"#,
        );
        assert_eq!(column.kind(), BackendErrorKind::Other);

        let grant = ApiError::from_body(
            403,
            r#"{"code":"42501","message":"permission denied: function upsert_user_profile does not exist for role anon"}"#,
        );
        assert_eq!(grant.kind(), BackendErrorKind::Unauthorized);
    }

    #[test]
    fn non_json_body_keeps_raw_text() {
        let error = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(error.message, "Bad Gateway");
        assert!(error.code.is_none());

        let empty = ApiError::from_body(503, "");
        assert_eq!(empty.message, "HTTP status 503");
    }

    #[test]
    fn transport_errors_are_not_remote() {
        let error = BackendError::HttpError("connection refused".to_string());
        assert_eq!(error.kind(), BackendErrorKind::Transport);
        assert_eq!(error.message(), "HTTP error: connection refused");
    }
}
