//! HTTP transport for activities payloads.
//!
//! POSTs one JSON payload per call and retries transient failures with
//! exponential backoff, up to `max_retries` additional attempts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use app_events_core::config::DeliveryConfig;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::DeliveryError;

/// Successful response from the destination.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    /// Attempts made, including the successful one.
    pub attempts: usize,
}

/// Delivers a payload to a path below the transport's endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    async fn post(&self, path: &str, payload: &Value) -> Result<TransportResponse, DeliveryError>;
}

/// `reqwest` transport with bounded retries.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    max_retries: usize,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl HttpTransport {
    pub fn new(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: parse_endpoint(&config.endpoint)?,
            max_retries: config.max_retries,
            min_backoff: config.min_backoff(),
            max_backoff: config.max_backoff(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Backoff configuration for retries.
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_backoff)
            .with_max_delay(self.max_backoff)
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    async fn post_once(&self, url: &Url, payload: &Value) -> Result<TransportResponse, DeliveryError> {
        let response = self.client.post(url.clone()).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if (200..300).contains(&status) {
            return Ok(TransportResponse {
                status,
                body,
                attempts: 1,
            });
        }

        Err(DeliveryError::Status {
            status,
            body: body.chars().take(200).collect(),
        })
    }
}

/// Endpoints are joined with relative paths, so they must end in `/`.
fn parse_endpoint(raw: &str) -> Result<Url, DeliveryError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<TransportResponse, DeliveryError> {
        let url = self.endpoint.join(path.trim_start_matches('/'))?;
        let attempts = AtomicUsize::new(0);

        let result = {
            let url = &url;
            let attempts = &attempts;
            (move || async move {
                attempts.fetch_add(1, Ordering::Relaxed);
                self.post_once(url, payload).await
            })
            .retry(self.backoff())
            .when(DeliveryError::is_retryable)
            .notify(|err: &DeliveryError, delay: Duration| {
                warn!(
                    url = %url,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying app event delivery"
                );
            })
            .await
        };

        let attempts = attempts.load(Ordering::Relaxed);
        match result {
            Ok(response) => {
                debug!(url = %url, status = response.status, attempts, "App event posted");
                Ok(TransportResponse {
                    attempts,
                    ..response
                })
            }
            Err(err) => {
                error!(url = %url, error = %err, attempts, "App event delivery failed");
                Err(err)
            }
        }
    }
}
