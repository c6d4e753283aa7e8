//! HTTP fetch collaborator.

use std::future::Future;
use std::time::Duration;

use jaws_core::{ReqwestErrorExt, WeatherConfig};
use reqwest::Client;

use crate::types::WeatherError;

/// Retrieves the body of a GET request. `None` means nothing usable came back;
/// the implementation logs the reason.
pub trait Fetcher: Send + Sync {
    fn retrieve(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
        )
    }

    /// GET `url` and return the body, failing on transport errors, non-2xx
    /// statuses and empty bodies.
    pub async fn get(&self, url: &str) -> Result<String, WeatherError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if body.trim().is_empty() {
            return Err(WeatherError::NoResponse(url.to_string()));
        }

        Ok(body)
    }
}

impl Fetcher for HttpFetcher {
    async fn retrieve(&self, url: &str) -> Option<String> {
        match self.get(url).await {
            Ok(body) => Some(body),
            Err(WeatherError::Network(e)) => {
                tracing::warn!("Request to {} failed: {}", url, e.into_network_error());
                None
            }
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                None
            }
        }
    }
}
