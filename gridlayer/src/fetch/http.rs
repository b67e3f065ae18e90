//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
/// Some imagery servers reject requests without a browser-like User-Agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Raw response from a GET request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for synchronous HTTP client operations.
///
/// Status and content-type checks belong to the caller; implementations only
/// fail when no response was received.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Real HTTP client implementation using reqwest.
///
/// Built once and shared read-only by every worker; the underlying
/// connection pool is reused across requests.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout and User-Agent.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
    }

    /// Creates a new ReqwestClient with a custom timeout and User-Agent.
    pub fn with_config(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().map_err(transport)?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
