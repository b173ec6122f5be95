// Configuration management from environment variables

use dotenv::dotenv;
use std::env;
use thiserror::Error;

pub const DEFAULT_PROCEDURE: &str = "upsert_user_profile";
pub const DEFAULT_PROFILE_TABLE: &str = "user_profiles";
pub const DEFAULT_ADMIN_TABLE: &str = "admin_users";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors raised while validating configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("Invalid SUPABASE_URL '{0}': expected an http(s) URL")]
    InvalidUrl(String),
}

/// Connection settings for the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. https://xyz.supabase.co
    pub url: String,
    /// Public anon key sent as `apikey`
    pub anon_key: String,
    /// Pre-issued user access token
    pub access_token: Option<String>,
    /// Email for password sign-in
    pub email: Option<String>,
    /// Password for password sign-in
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl SupabaseConfig {
    /// Checks that enough is configured to build a client
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_URL"));
        }
        if self.anon_key.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }

    /// Password credentials, when both halves are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Names of the procedure and tables the probe exercises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTargets {
    pub procedure: String,
    pub profile_table: String,
    pub admin_table: String,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            procedure: DEFAULT_PROCEDURE.to_string(),
            profile_table: DEFAULT_PROFILE_TABLE.to_string(),
            admin_table: DEFAULT_ADMIN_TABLE.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub supabase: SupabaseConfig,
    pub targets: ProbeTargets,
}

impl ProbeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Ensure .env file is loaded
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let seconds = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default)
        };

        let supabase = SupabaseConfig {
            url: non_empty("SUPABASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            anon_key: non_empty("SUPABASE_ANON_KEY").unwrap_or_default(),
            access_token: non_empty("SUPABASE_ACCESS_TOKEN"),
            email: non_empty("SUPABASE_EMAIL"),
            password: non_empty("SUPABASE_PASSWORD"),
            timeout_secs: seconds("PROBE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            connect_timeout_secs: seconds("PROBE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let defaults = ProbeTargets::default();
        let targets = ProbeTargets {
            procedure: non_empty("PROBE_PROCEDURE").unwrap_or(defaults.procedure),
            profile_table: non_empty("PROBE_PROFILE_TABLE").unwrap_or(defaults.profile_table),
            admin_table: non_empty("PROBE_ADMIN_TABLE").unwrap_or(defaults.admin_table),
        };

        Self { supabase, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ProbeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ProbeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.targets, ProbeTargets::default());
        assert_eq!(config.supabase.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.supabase.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(
            config.supabase.validate(),
            Err(ConfigError::Missing("SUPABASE_URL"))
        );
    }

    #[test]
    fn missing_anon_key_is_reported() {
        let config = config_from(&[("SUPABASE_URL", "https://demo.supabase.co")]);
        assert_eq!(
            config.supabase.validate(),
            Err(ConfigError::Missing("SUPABASE_ANON_KEY"))
        );
    }

    #[test]
    fn url_is_trimmed_and_validated() {
        let config = config_from(&[
            ("SUPABASE_URL", "https://demo.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        assert_eq!(config.supabase.url, "https://demo.supabase.co");
        assert!(config.supabase.validate().is_ok());

        let bad = config_from(&[("SUPABASE_URL", "demo.supabase.co"), ("SUPABASE_ANON_KEY", "anon")]);
        assert!(matches!(bad.supabase.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn unparsable_timeouts_fall_back_to_defaults() {
        let config = config_from(&[("PROBE_TIMEOUT_SECS", "soon"), ("PROBE_CONNECT_TIMEOUT_SECS", "2")]);
        assert_eq!(config.supabase.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.supabase.connect_timeout_secs, 2);
    }

    #[test]
    fn zero_timeouts_fall_back_to_defaults() {
        let config = config_from(&[("PROBE_TIMEOUT_SECS", "0"), ("PROBE_CONNECT_TIMEOUT_SECS", "0")]);
        assert_eq!(config.supabase.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.supabase.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    }

    #[test]
    fn credentials_require_both_halves() {
        let only_email = config_from(&[("SUPABASE_EMAIL", "guest@example.com")]);
        assert!(only_email.supabase.credentials().is_none());

        let both = config_from(&[
            ("SUPABASE_EMAIL", "guest@example.com"),
            ("SUPABASE_PASSWORD", "secret"),
        ]);
        assert_eq!(both.supabase.credentials(), Some(("guest@example.com", "secret")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("SUPABASE_ACCESS_TOKEN", "  "), ("PROBE_PROCEDURE", "")]);
        assert!(config.supabase.access_token.is_none());
        assert_eq!(config.targets.procedure, DEFAULT_PROCEDURE);
    }
}
