use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single blocking GET. Implementations must not retry.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        debug!(action = "request", component = "http_fetch", url = url, "HTTP fetch starting");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("HTTP request to {} failed", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        debug!(action = "response", component = "http_fetch", url = url, status, bytes = body.len(), "HTTP fetch finished");
        Ok(FetchResponse { status, body })
    }
}
