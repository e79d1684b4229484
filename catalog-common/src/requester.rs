//! JSON transport for provider APIs
//!
//! [`JsonRequester`] is the seam provider modules call; [`DelayedRequester`]
//! is the HTTP implementation. It owns every politeness and reliability
//! concern: a governor rate limiter spacing requests out, and retries with
//! exponential backoff for transient failures. Provider code never retries.

use crate::{Error, Result};
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Query parameters for a provider API request
pub type QueryParams = BTreeMap<String, String>;

/// Fetches a JSON document from a provider endpoint
#[async_trait]
pub trait JsonRequester: Send + Sync {
    /// GET `endpoint` with `params`
    ///
    /// Returns `Ok(None)` when the remote answered without a JSON body
    /// (no content, empty body, or literal `null`).
    async fn get_response_json(&self, endpoint: &str, params: &QueryParams)
        -> Result<Option<Value>>;
}

/// Follows a provider's redirects to the final URL of a page
///
/// Providers hand out short or id-only landing URLs that redirect to the
/// canonical page; records store the canonical form.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve_url(&self, url: &str) -> Result<String>;
}

/// Tunables for [`DelayedRequester`]
#[derive(Debug, Clone)]
pub struct RequesterSettings {
    /// Minimum spacing between two requests (zero disables the limiter)
    pub delay: Duration,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Total request timeout
    pub timeout: Duration,
    /// First backoff; doubles per retry up to `max_backoff`
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RequesterSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_retries: 3,
            timeout: Duration::from_secs(30),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Outcome of a single HTTP attempt that did not produce a value
enum AttemptError {
    /// Worth retrying (connection problems, 429, 5xx)
    Transient(Error),
    /// Retrying cannot help (4xx, malformed JSON)
    Fatal(Error),
}

/// Rate-limited, retrying HTTP JSON requester
pub struct DelayedRequester {
    client: Client,
    rate_limiter: Option<DirectRateLimiter>,
    settings: RequesterSettings,
}

impl DelayedRequester {
    pub fn new(settings: RequesterSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::config::get_user_agent())
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Quota::with_period returns None for a zero period
        let rate_limiter = Quota::with_period(settings.delay).map(RateLimiter::direct);

        Ok(Self {
            client,
            rate_limiter,
            settings,
        })
    }

    pub fn settings(&self) -> &RequesterSettings {
        &self.settings
    }

    async fn attempt(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> std::result::Result<Option<Value>, AttemptError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let response = self
            .client
            .get(endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    AttemptError::Fatal(Error::Http(e))
                } else {
                    AttemptError::Transient(Error::Http(e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(AttemptError::Transient(Error::Transport(format!(
                "{} returned {}",
                endpoint, status
            ))));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(Error::Transport(format!(
                "{} returned {}",
                endpoint, status
            ))));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Transient(Error::Http(e)))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_slice(&body).map_err(|e| AttemptError::Fatal(Error::Json(e)))?;
        Ok((!value.is_null()).then_some(value))
    }
}

#[async_trait]
impl JsonRequester for DelayedRequester {
    async fn get_response_json(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<Option<Value>> {
        let mut attempt = 0u32;
        let mut backoff = self.settings.initial_backoff;

        loop {
            attempt += 1;
            debug!(endpoint, attempt, "Requesting JSON");

            match self.attempt(endpoint, params).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Transient(err)) => {
                    if attempt > self.settings.max_retries {
                        error!(
                            endpoint,
                            attempt,
                            error = %err,
                            "Request failed, retries exhausted"
                        );
                        return Err(err);
                    }

                    warn!(
                        endpoint,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Request failed, will retry after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.settings.max_backoff);
                }
            }
        }
    }
}

#[async_trait]
impl UrlResolver for DelayedRequester {
    /// HEAD request; reqwest follows up to 10 redirects
    async fn resolve_url(&self, url: &str) -> Result<String> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let response = self.client.head(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("{} returned {}", url, status)));
        }

        let resolved = response.url().to_string();
        if resolved != url {
            debug!(url, resolved = %resolved, "Followed redirect");
        }
        Ok(resolved)
    }
}
