//! Fetch gateway
//!
//! The gateway resolves a target URL to rendered page content. The
//! production implementation routes every request through a rotating
//! proxy API; its internal proxy selection and backoff are opaque to the
//! crawl core, which only supplies a fully-formed target URL and
//! consumes whatever content comes back.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors surfaced by a gateway fetch
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to build gateway client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid gateway URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Per-request fetch options passed through to the proxy service
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// How long the proxy should let the page render before returning it
    pub render_wait: Duration,

    /// Two-letter country code for the proxy exit node
    pub country_code: String,
}

/// Resolves a target URL to rendered page content
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetches one page through the gateway
    ///
    /// # Arguments
    ///
    /// * `url` - The fully-formed target URL
    /// * `options` - Render wait and locale options for this request
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, GatewayError>;
}

/// Rotating-proxy gateway backed by an HTTP proxy API
pub struct ProxyGateway {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ProxyGateway {
    /// Builds a gateway from the gateway configuration
    ///
    /// The underlying client allows the proxy service generous time to
    /// render pages before answering.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Builds the proxied request URL for a target
    fn proxied_url(&self, target: &str, options: &FetchOptions) -> Result<Url, GatewayError> {
        let wait_ms = options.render_wait.as_millis().to_string();
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("api_key", self.api_key.as_str()),
                ("url", target),
                ("country_code", options.country_code.as_str()),
                ("render", "true"),
                ("wait_for", wait_ms.as_str()),
            ],
        )?;
        Ok(url)
    }
}

#[async_trait]
impl Gateway for ProxyGateway {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, GatewayError> {
        let request_url = self.proxied_url(url, options)?;

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    GatewayError::Http {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| GatewayError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}
