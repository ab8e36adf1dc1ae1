use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::config::{Config, BASE_URL, URL_DAY_FORMAT};
use crate::error::{FetchError, Result};

/// Source of raw page markup. One call per day, never more than one in flight.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// URL of the tips page for `day`.
pub fn day_url(day: NaiveDate) -> String {
    format!("{}{}", BASE_URL, day.format(URL_DAY_FORMAT))
}

/// reqwest-backed fetcher. Non-2xx responses are errors; there is no retry at this layer.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|source| FetchError::Transport {
                url: BASE_URL.to_string(),
                source,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
