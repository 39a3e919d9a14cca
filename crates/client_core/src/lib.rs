//! Client side of the narration contract: settings, the service seam, and the
//! reqwest-backed implementation that talks to the remote endpoint.

use std::{error::Error as StdError, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    domain::{NarrationRequest, NarrationResult},
    error::TransportError,
    protocol::{parse_generate_audio_response, GenerateAudioRequest},
};
use tracing::{debug, info};

pub mod config;
pub use config::{load_settings, NarratorSettings};

const USER_AGENT: &str = concat!("book-narrator/", env!("CARGO_PKG_VERSION"));
const MAX_LOGGED_BODY_CHARS: usize = 512;

/// One outbound call per method invocation: no retries, caching or deduplication.
#[async_trait]
pub trait NarrationService: Send + Sync {
    async fn generate_audio(
        &self,
        request: &NarrationRequest,
    ) -> Result<NarrationResult, TransportError>;

    async fn download_audio(&self, audio_url: &str) -> Result<Vec<u8>, TransportError>;
}

pub type SharedNarrationService = Arc<dyn NarrationService>;

#[derive(Debug, Clone)]
pub struct HttpNarrationClient {
    http: Client,
    endpoint_url: String,
}

impl HttpNarrationClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), endpoint_url)
    }

    pub fn with_http_client(http: Client, endpoint_url: impl Into<String>) -> Self {
        Self {
            http,
            endpoint_url: endpoint_url.into(),
        }
    }

    /// No request timeout is configured; calls wait for the transport to resolve.
    pub fn from_settings(settings: &NarratorSettings) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build narration HTTP client")?;
        Ok(Self::with_http_client(http, settings.endpoint_url.clone()))
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl NarrationService for HttpNarrationClient {
    async fn generate_audio(
        &self,
        request: &NarrationRequest,
    ) -> Result<NarrationResult, TransportError> {
        let payload = GenerateAudioRequest::from(request);
        debug!(
            endpoint = %self.endpoint_url,
            voice_id = %request.voice_id(),
            characters = request.character_count(),
            "posting narration request"
        );

        let response = self
            .http
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        let result = parse_generate_audio_response(&body)?;
        info!(
            voice_id = %request.voice_id(),
            characters = request.character_count(),
            "narration generated"
        );
        Ok(result)
    }

    async fn download_audio(&self, audio_url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .http
            .get(audio_url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        debug!(bytes = body.len(), "downloaded narration audio");
        Ok(body.to_vec())
    }
}

/// reqwest's Display omits the underlying cause (refused, dns, tls), so walk the chain.
fn network_error(err: reqwest::Error) -> TransportError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportError::Network(message)
}

fn body_snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_LOGGED_BODY_CHARS)
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
