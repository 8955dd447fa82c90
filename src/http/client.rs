use anyhow::{anyhow, Context, Result};
use log::warn;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::settings::SheetSettings;
use crate::errors::fetch_context;

/// HTTP client with a bounded timeout and a bounded number of retries
pub struct RetryingClient {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl RetryingClient {
    pub fn new(
        user_agent: &str,
        timeout_secs: u64,
        retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;

        Ok(Self {
            client,
            retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }

    pub fn from_settings(settings: &SheetSettings) -> Result<Self> {
        Self::new(
            settings.user_agent,
            settings.timeout_secs,
            settings.retries,
            settings.retry_delay_ms,
        )
    }

    /// GET `url` and return the body, trying `1 + retries` times in total
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 0..=self.retries {
            if attempt > 0 {
                sleep(self.retry_delay).await;
            }

            match self.send_get_request(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {:#}", attempt + 1, self.retries + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("no attempts made"))
            .context(fetch_context(url)))
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_get_request(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send GET request")?
            .error_for_status()
            .context("Server returned an error status")?;

        let bytes = response.bytes().await.context("Failed to read response body")?;
        Ok(bytes.to_vec())
    }
}
