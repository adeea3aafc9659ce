//! Signed HTTP transport
//!
//! Performs one signed round trip per call and classifies the outcome:
//! - Status failures are routed through the [`RetryPolicy`]
//! - Rate limit headers are recorded after every successful response
//! - A response reporting zero remaining calls suspends the caller for the
//!   cooldown period
//! - Connection failures are returned as-is, never retried

use super::rate_limit::{reported_remaining, Cooldown, RateState, RateTracker, RequestPacer};
use super::retry::{RetryAction, RetryPolicy};
use crate::auth::{SignedRequestParameters, Signer};
use crate::error::{Error, Result};
use crate::types::{ExceptionHandler, Method};
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Configuration for the transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Status code handling
    pub retry: RetryPolicy,
    /// Client-side request pacing (requests per second)
    pub requests_per_second: Option<u32>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("tokenquery/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
            requests_per_second: None,
        }
    }
}

impl TransportConfig {
    /// Create a new config builder
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for transport config
#[derive(Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the wait used when the rate limit is hit
    pub fn rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.retry.rate_limit_cooldown = cooldown;
        self
    }

    /// Set the wait used before resending a 503/504
    pub fn unavailable_delay(mut self, delay: Duration) -> Self {
        self.config.retry.unavailable_delay = delay;
        self
    }

    /// Enable client-side pacing
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.config.requests_per_second = Some(rps);
        self
    }

    /// Build the config
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

/// Outcome of a single round trip
#[derive(Debug)]
enum Attempt {
    Success(String),
    Failed { status: u16, body: String },
}

/// Signed HTTP transport with single-shot resend and rate limit tracking
pub struct Transport {
    client: Client,
    signer: Signer,
    config: TransportConfig,
    rate: RateTracker,
    cooldown: Cooldown,
    pacer: Option<RequestPacer>,
}

impl Transport {
    /// Create a transport with default configuration
    pub fn new(signer: Signer) -> Result<Self> {
        Self::with_config(signer, TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(signer: Signer, config: TransportConfig) -> Result<Self> {
        // No idle connections are kept: each request opens and closes its own.
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        let pacer = config.requests_per_second.map(RequestPacer::per_second);

        Ok(Self {
            client,
            signer,
            config,
            rate: RateTracker::new(),
            cooldown: Cooldown::new(),
            pacer,
        })
    }

    /// Share rate limit state with other transports
    #[must_use]
    pub fn with_rate_tracker(mut self, tracker: RateTracker) -> Self {
        self.rate = tracker;
        self
    }

    /// The signer used for every request
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Handle over the rate limit state
    pub fn rate_tracker(&self) -> &RateTracker {
        &self.rate
    }

    /// Last observed rate limit state
    pub fn rate_state(&self) -> RateState {
        self.rate.snapshot()
    }

    /// Handle that can abort an in-progress wait
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Sign and execute a request with freshly generated OAuth parameters
    pub async fn execute_signed(
        &self,
        url: &str,
        method: Method,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<String>> {
        let params = self.signer.generate_parameters();
        self.execute(url, method, &params, exception_handler).await
    }

    /// Execute a request and return its body.
    ///
    /// `Ok(None)` means the request produced nothing: either the body was
    /// empty or a failure was handed to `exception_handler`. A resend reuses
    /// `params` and its own failure is returned without further handling.
    pub async fn execute(
        &self,
        url: &str,
        method: Method,
        params: &SignedRequestParameters,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<String>> {
        let (status, body) = match self.send(url, method, params).await? {
            Attempt::Success(body) => return Ok(non_empty(body)),
            Attempt::Failed { status, body } => (status, body),
        };

        let reason = RetryPolicy::describe(status);
        match self.config.retry.action_for(status) {
            RetryAction::WaitAndResend(delay) => {
                warn!("HTTP {} for {}: {}, resending in {:?}", status, url, reason, delay);
                self.cooldown.wait(delay).await?;
                info!("Woke up, resending {}", url);

                match self.send(url, method, params).await? {
                    Attempt::Success(body) => Ok(non_empty(body)),
                    Attempt::Failed { status, body } => {
                        error!("Resend of {} failed with HTTP {}", url, status);
                        Err(Error::for_status(status, url, body))
                    }
                }
            }
            RetryAction::Outage => {
                error!("HTTP {} for {}: {}", status, url, reason);
                Err(Error::ServiceOutage {
                    url: url.to_string(),
                })
            }
            RetryAction::ReportAuth | RetryAction::ReportTerminal | RetryAction::Delegate => {
                warn!(
                    "HTTP {} for {}: {}, data will not be retrieved",
                    status, url, reason
                );
                let err = Error::for_status(status, url, body);
                match exception_handler {
                    Some(handler) => {
                        handler(&err);
                        Ok(None)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// One round trip: sign, send, record rate limit headers
    async fn send(
        &self,
        url: &str,
        method: Method,
        params: &SignedRequestParameters,
    ) -> Result<Attempt> {
        if let Some(ref pacer) = self.pacer {
            pacer.wait().await;
        }

        let authorization = self.signer.authorization_header(method, url, params)?;

        let response = self
            .client
            .request(method.into(), url)
            .header(AUTHORIZATION, authorization)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read HTTP {} body from {}: {}", status, url, e);
                    String::new()
                }
            };
            return Ok(Attempt::Failed {
                status: status.as_u16(),
                body,
            });
        }

        // Only this response's own header decides the cooldown
        let remaining = reported_remaining(response.headers());
        self.rate.observe(response.headers());
        let body = response.text().await?;
        debug!("Request succeeded: {} {}", method, url);

        if let Some(remaining) = remaining {
            info!("Url: {} remaining calls: {}", url, remaining);
        }
        if remaining == Some(0) {
            let cooldown = self.config.retry.rate_limit_cooldown;
            warn!("Rate limit reached for {}, sleeping for {:?}", url, cooldown);
            self.cooldown.wait(cooldown).await?;
            info!("Woke up after rate limit cooldown");
        }

        Ok(Attempt::Success(body))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("rate", &self.rate.snapshot())
            .field("has_pacer", &self.pacer.is_some())
            .finish_non_exhaustive()
    }
}

fn non_empty(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}
