use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::SupabaseConfig;
use crate::domain::models::{Identity, Session};
use crate::infrastructure::supabase::error::{ApiError, BackendError};
use crate::infrastructure::supabase::BackendService;

/// Client for the Supabase auth (GoTrue) and data (PostgREST) APIs
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    /// Create a new client without a user session
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| BackendError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// Attaches a user access token to every subsequent request
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn has_session(&self) -> bool {
        self.access_token.is_some()
    }

    /// Exchanges email and password for a session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        debug!("Signing in as {}", email);

        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        Ok(serde_json::from_value(body)?)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    /// Adds the project key and the bearer token (session token, else anon key)
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    /// Returns the JSON body of a successful response, or the parsed error body
    async fn read_json(response: Response) -> Result<Value, BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::ApiError(ApiError::from_body(status.as_u16(), &text)));
        }

        // `void` procedures and `return=minimal` writes answer with an empty body
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn rows(body: Value) -> Result<Vec<Value>, BackendError> {
        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(BackendError::ResponseError(format!(
                "Expected an array of rows, got: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl BackendService for SupabaseClient {
    async fn current_identity(&self) -> Result<Option<Identity>, BackendError> {
        // No session means nobody is logged in; the auth API is not consulted
        if self.access_token.is_none() {
            return Ok(None);
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        match Self::read_json(response).await? {
            Value::Null => Ok(None),
            body => Ok(Some(serde_json::from_value(body)?)),
        }
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, BackendError> {
        let url = self.rest_url(&format!("rpc/{}", name));
        debug!("Calling procedure {}", name);

        let response = self
            .authorize(self.client.post(&url))
            .json(&args)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn find_one(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, BackendError> {
        let url = self.rest_url(table);
        let filter = format!("eq.{}", value);

        // Two rows are requested so that a non-unique key is detected
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*"), (column, filter.as_str()), ("limit", "2")])
            .send()
            .await?;

        let mut rows = Self::rows(Self::read_json(response).await?)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(BackendError::ResponseError(format!(
                "Expected at most one row in {} for {} = {}, got {}",
                table, column, value, n
            ))),
        }
    }

    async fn probe_table(&self, table: &str) -> Result<(), BackendError> {
        let url = self.rest_url(table);

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*"), ("limit", "1")])
            .send()
            .await?;

        Self::rows(Self::read_json(response).await?).map(|_| ())
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError> {
        let url = self.rest_url(table);

        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        let mut rows = Self::rows(Self::read_json(response).await?)?;
        if rows.len() != 1 {
            return Err(BackendError::ResponseError(format!(
                "Expected the inserted row back from {}, got {} rows",
                table,
                rows.len()
            )));
        }
        Ok(rows.remove(0))
    }
}
