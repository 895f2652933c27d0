//! Media service HTTP transport
//!
//! A single authenticated GET operation against the service. Deliberately has
//! no timeout of its own: an unreachable service stalls the caller rather
//! than failing it, and the gateway's retry policy handles everything that
//! does fail.

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Successful transport outcomes. A 404 is a legitimate "absent" result, not
/// an error, and must not trigger the gateway's retry policy.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    /// 2xx with the raw response body
    Body(String),
    /// 404
    NotFound,
}

/// The media service transport capability
#[async_trait]
pub trait MediaApi: Send + Sync {
    /// Perform a GET for `path`, relative to the service base URL
    async fn get(&self, path: &str) -> Result<ApiResponse>;
}

/// Production transport backed by reqwest
pub struct HttpMediaApi {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMediaApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl MediaApi for HttpMediaApi {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(ApiResponse::NotFound);
        }

        if !status.is_success() {
            return Err(Error::ApiStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(ApiResponse::Body(body))
    }
}
