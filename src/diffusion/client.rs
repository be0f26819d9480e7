use super::{GenerationRequest, StoryImageService};
use crate::image::GeneratedImage;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tokio_retry::RetryIf;

/// Total attempts per `generate` call, including the first.
pub const MAX_ATTEMPTS: usize = 3;

/// Delays between attempts: `unit`, `2 * unit`, ... (one fewer than attempts).
pub fn backoff_schedule(unit: Duration) -> impl Iterator<Item = Duration> {
    (1..MAX_ATTEMPTS as u32).map(move |n| unit * n)
}

/// Retrying multipart client for the StoryDiffusion endpoint.
///
/// Holds only immutable configuration, so one instance can serve concurrent
/// calls. Dropping a `generate` future cancels the in-flight attempt or the
/// pending backoff; no further attempts are made.
pub struct StoryDiffusionClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    timeout: Duration,
    backoff_unit: Duration,
}

impl fmt::Debug for StoryDiffusionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryDiffusionClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("backoff_unit", &self.backoff_unit)
            .finish_non_exhaustive()
    }
}

impl StoryDiffusionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: &Config, client: Client) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            tracing::error!("Invalid StoryDiffusion endpoint '{}': {}", config.endpoint, e);
            Error::InvalidEndpoint(format!("{} ({})", config.endpoint, e))
        })?;

        tracing::info!(
            "StoryDiffusion client ready (endpoint: {}, timeout: {}s)",
            endpoint,
            config.timeout.as_secs()
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
            timeout: config.timeout,
            backoff_unit: config.backoff_unit,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, request: &GenerationRequest, attempt: usize) -> Result<GeneratedImage> {
        tracing::info!(
            "Attempt {}/{}: requesting {} panel(s)",
            attempt,
            MAX_ATTEMPTS,
            request.num_ids()
        );

        let result = self.post(request).await;

        match &result {
            Ok(image) => tracing::info!(
                "Generation succeeded on attempt {} ({} bytes, {}x{} {})",
                attempt,
                image.bytes().len(),
                image.width(),
                image.height(),
                image.mime_type()
            ),
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => tracing::warn!(
                "Attempt {}/{} failed: {}. Retrying in {}s",
                attempt,
                MAX_ATTEMPTS,
                e,
                (self.backoff_unit * attempt as u32).as_secs_f64()
            ),
            Err(e) if e.is_retryable() => tracing::error!(
                "Attempt {}/{} failed: {}. All attempts exhausted",
                attempt,
                MAX_ATTEMPTS,
                e
            ),
            Err(e) => tracing::error!("Attempt {} failed and will not be retried: {}", attempt, e),
        }

        result
    }

    async fn post(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let form = request.to_multipart();
        tracing::debug!("Sending multipart form (boundary: {})", form.boundary());

        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to StoryDiffusion: {}", e);
                e
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let body = response.bytes().await.map_err(|e| {
            Error::UnexpectedResponse(format!(
                "Failed to read response body (status {}): {}",
                status, e
            ))
        })?;

        tracing::debug!(
            "Response status {} ({}, {} bytes)",
            status,
            content_type,
            body.len()
        );

        if status != StatusCode::OK {
            let error_text = String::from_utf8_lossy(&body).into_owned();
            tracing::error!("StoryDiffusion API error (status {}): {}", status, error_text);
            return Err(Error::Server {
                status: status.as_u16(),
                body: error_text,
            });
        }

        GeneratedImage::decode_in_background(body.to_vec()).await
    }
}

#[async_trait]
impl StoryImageService for StoryDiffusionClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let mut attempt = 0;

        RetryIf::spawn(
            backoff_schedule(self.backoff_unit),
            move || {
                attempt += 1;
                self.attempt(request, attempt)
            },
            Error::is_retryable,
        )
        .await
    }
}
