//! Image fetching
//!
//! Downloads are expressed as a [`FetchOutcome`] per URL rather than as
//! errors: a failed download is recorded and skipped, and the caller decides
//! how to continue.

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a URL produced no image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Connection could not be established or was reset
    Connection(String),
    /// Request did not complete within the configured timeout
    Timeout,
    /// Server answered with a non-success status code
    HttpStatus(u16),
    /// URL could not be parsed or uses an unsupported scheme
    InvalidUrl(String),
    /// Response body was interrupted
    Body(String),
    /// Response exceeded the configured size limit
    TooLarge { limit: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus(code) => write!(f, "HTTP status {}", code),
            Self::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            Self::Body(msg) => write!(f, "body read failed: {}", msg),
            Self::TooLarge { limit } => write!(f, "response larger than {} bytes", limit),
        }
    }
}

impl SkipReason {
    fn from_request_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_builder() {
            Self::InvalidUrl(error.to_string())
        } else {
            Self::Connection(error.to_string())
        }
    }
}

/// Result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response body, ready to be written to disk
    Fetched(Vec<u8>),
    /// Nothing to write; the URL is skipped
    Skipped(SkipReason),
}

impl FetchOutcome {
    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Source of image bytes for the collector
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Attempt to download one URL
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// HTTP fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    accept_error_status: bool,
    max_image_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher from the collector configuration
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CollectorError::network_error("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            accept_error_status: config.accept_error_status,
            max_image_bytes: config.max_image_bytes,
        })
    }

    async fn read_body(&self, response: reqwest::Response) -> FetchOutcome {
        if let Some(length) = response.content_length() {
            if length > self.max_image_bytes {
                return FetchOutcome::Skipped(SkipReason::TooLarge {
                    limit: self.max_image_bytes,
                });
            }
        }

        let capacity = response
            .content_length()
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0);
        let mut body = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    if (body.len() + bytes.len()) as u64 > self.max_image_bytes {
                        return FetchOutcome::Skipped(SkipReason::TooLarge {
                            limit: self.max_image_bytes,
                        });
                    }
                    body.extend_from_slice(&bytes);
                },
                Err(e) if e.is_timeout() => return FetchOutcome::Skipped(SkipReason::Timeout),
                Err(e) => return FetchOutcome::Skipped(SkipReason::Body(e.to_string())),
            }
        }

        FetchOutcome::Fetched(body)
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if let Err(reason) = validate_image_url(url) {
            return FetchOutcome::Skipped(reason);
        }

        tracing::debug!(url = %url, "Fetching image");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Skipped(SkipReason::from_request_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            if !self.accept_error_status {
                return FetchOutcome::Skipped(SkipReason::HttpStatus(status.as_u16()));
            }
            tracing::debug!(url = %url, status = %status, "Keeping body of non-success response");
        }

        self.read_body(response).await
    }
}

/// Check that a manifest line is an absolute http(s) URL
pub fn validate_image_url(url: &str) -> std::result::Result<(), SkipReason> {
    let parsed = Url::parse(url).map_err(|e| SkipReason::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SkipReason::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, scheme
        ))),
    }
}
