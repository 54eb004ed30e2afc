//! Low-level HTTP client for the Nitrado REST API.
//!
//! Exposes the three request primitives ([`RestClient::data_get`],
//! [`RestClient::data_post`], [`RestClient::data_delete`]) that the typed
//! resource crates are built on. Every primitive takes a resource-relative
//! path plus a flat string parameter list and returns the payload with the
//! API's `{"status": ..., "data": ...}` envelope already stripped.
//!
//! Retry, backoff, and session refresh are out of scope — callers get one
//! request per call and see the failure as-is.

use async_trait::async_trait;
use serde_json::Value;

const BASE_URL: &str = "https://api.nitrado.net";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nitrado api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("nitrado api {path} returned {status}: {message}")]
    Api {
        path: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("missing env var: {0}")]
    MissingEnv(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The request primitives consumed by the typed resource layers.
///
/// GET and DELETE carry their parameters in the query string, POST as a
/// form body — the wire convention of the Nitrado API. Implementations
/// return the `data` member of the response envelope (`Value::Null` when
/// the endpoint returns no data).
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn data_get(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;

    async fn data_post(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;

    async fn data_delete(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}

/// Bearer-token client for the Nitrado REST API.
#[derive(Clone)]
pub struct NitrapiClient {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl NitrapiClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Client against a non-default API endpoint. Mostly useful for tests.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Create from env vars: `NITRAPI_TOKEN` (required), `NITRAPI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let token = std::env::var("NITRAPI_TOKEN")
            .map_err(|_| Error::MissingEnv("NITRAPI_TOKEN".into()))?;
        let base_url = std::env::var("NITRAPI_BASE_URL").unwrap_or_else(|_| BASE_URL.into());
        Ok(Self::with_base_url(token, base_url))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Check the HTTP status and unwrap the response envelope.
    async fn unwrap_data(resp: reqwest::Response, path: &str) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // Error bodies carry {"status":"error","message":"..."} when
            // they come from the API itself; proxies may send plain text.
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or(body);
            return Err(Error::Api {
                path: path.to_string(),
                status,
                message,
            });
        }

        let body: Value = resp.json().await?;
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl RestClient for NitrapiClient {
    async fn data_get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .header("Authorization", self.auth())
            .query(params)
            .send()
            .await?;

        Self::unwrap_data(resp, path).await
    }

    async fn data_post(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .header("Authorization", self.auth())
            .form(params)
            .send()
            .await?;

        Self::unwrap_data(resp, path).await
    }

    async fn data_delete(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .delete(self.url(path))
            .header("Authorization", self.auth())
            .query(params)
            .send()
            .await?;

        Self::unwrap_data(resp, path).await
    }
}
