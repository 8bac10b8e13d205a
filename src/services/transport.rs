//! Transport abstraction and the default HTTP implementation
//!
//! Service calls build a URL and a [`RequestInit`] descriptor and hand both
//! to a [`Transport`]. The default [`HttpTransport`] performs the exchange
//! over `reqwest`; tests substitute recording implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::error::{AppError, Result};

/// HTTP method of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// Credential handling requested for the exchange. Advisory for transports
/// that run where the distinction exists (browser/wasm); the server-side
/// default transport always sends what it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsMode {
    Omit,
    SameOrigin,
    Include,
}

/// Cache handling requested for the exchange. Advisory, like
/// [`CredentialsMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    Default,
    NoStore,
    Reload,
    NoCache,
}

/// Everything about an outbound request except the URL.
#[derive(Debug, Clone, Serialize)]
pub struct RequestInit {
    pub method: HttpMethod,

    /// Header name/value pairs, including `Authorization` when a token is
    /// attached
    pub headers: Vec<(String, String)>,

    pub credentials: CredentialsMode,

    pub cache: CacheMode,
}

impl RequestInit {
    /// Value of the named header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Performs one request/response exchange and returns the parsed JSON body.
///
/// Implementations map network failure, non-2xx statuses and body-parse
/// failure uniformly into [`AppError`]; callers treat all three as a failed
/// dispatch.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, url: &Url, request: &RequestInit) -> Result<serde_json::Value>;
}

/// Default transport over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, url: &Url, request: &RequestInit) -> Result<serde_json::Value> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(AppError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Serialization(e.to_string()))
    }
}
