//! HTTP request helper
//!
//! Builds authorized JSON requests against the backend and normalizes error
//! responses into [`ClientError::Api`]. No retries and no client-imposed
//! timeouts; failures propagate directly to the caller.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;
use crate::Result;

/// Structured error body the backend returns on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin wrapper around `reqwest::Client` bound to a base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request for `path`, attaching the bearer token when present
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending request");
        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and deserialize the JSON body of a successful response
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Send, discarding the body of a successful response
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the best available
/// message: the `error` field of a JSON body, else the raw body text, else
/// the status line.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if !text.trim().is_empty() => text,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
