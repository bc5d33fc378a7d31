// src/fetch/client.rs

use reqwest::{
    blocking::{Client, ClientBuilder},
    StatusCode,
};
use std::{thread, time::Duration};
use tracing::warn;
use url::Url;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

/// Fetch the body behind a URL.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        (**self).get(url)
    }
}

/// Blocking HTTP transport with a request timeout and retry on transient
/// failures. The delay doubles after each failed attempt.
pub struct HttpTransport {
    client: Client,
    max_retries: usize,
    retry_delay: Duration,
}

impl HttpTransport {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Self::with_builder(config, client_builder(config))
    }

    fn with_builder(config: &PipelineConfig, builder: ClientBuilder) -> Result<Self> {
        let client = builder
            .build()
            .map_err(|e| PipelineError::Config(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    fn try_get(&self, url: &Url) -> reqwest::Result<Vec<u8>> {
        let resp = self.client.get(url.clone()).send()?.error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.try_get(url) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    let delay = self.retry_delay * 2u32.saturating_pow(attempt as u32);
                    attempt += 1;
                    warn!(url = %url, attempt, ?delay, error = %e, "retrying");
                    thread::sleep(delay);
                }
                Err(e) => return Err(PipelineError::fetch(url.as_str(), e)),
            }
        }
    }
}

fn client_builder(config: &PipelineConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    match err.status() {
        Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        None => err.is_request() || err.is_body(),
    }
}
