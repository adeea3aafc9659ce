//! Rate limit tracking and waits
//!
//! - `RateState` / `RateTracker`: the server's view of our quota, read from
//!   `X-Rate-Limit-*` response headers.
//! - `Cooldown`: the cancellable wait used for rate-limit and overload backoff.
//! - `RequestPacer`: optional client-side token bucket using governor.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::header::HeaderMap;
use std::num::NonZeroU32;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Header carrying the request quota for the current window
pub const HEADER_LIMIT: &str = "x-rate-limit-limit";
/// Header carrying the calls left in the current window
pub const HEADER_REMAINING: &str = "x-rate-limit-remaining";
/// Header carrying the window reset time (epoch seconds)
pub const HEADER_RESET: &str = "x-rate-limit-reset";

// ============================================================================
// Rate State
// ============================================================================

/// Last observed rate limit information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateState {
    /// Requests allowed per window
    pub limit: Option<u32>,
    /// Requests left in the current window
    pub remaining: Option<u32>,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
}

impl RateState {
    /// The server reported no calls left
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Shared handle over a [`RateState`]
///
/// Cloning the tracker shares the state, so several transports (or callers
/// on different tasks) see the same counters.
#[derive(Debug, Clone, Default)]
pub struct RateTracker {
    state: Arc<RwLock<RateState>>,
}

impl RateTracker {
    /// Create a tracker with no observations
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn snapshot(&self) -> RateState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Apply a mutation to the state and return the result
    pub fn update(&self, f: impl FnOnce(&mut RateState)) -> RateState {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
        *guard
    }

    /// Record the rate limit headers of a response.
    ///
    /// Headers that are missing or unparsable leave the previous value alone.
    pub fn observe(&self, headers: &HeaderMap) -> RateState {
        let limit = header_number::<u32>(headers, HEADER_LIMIT);
        let remaining = header_number::<u32>(headers, HEADER_REMAINING);
        let reset = header_number::<i64>(headers, HEADER_RESET)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        self.update(|state| {
            if limit.is_some() {
                state.limit = limit;
            }
            if remaining.is_some() {
                state.remaining = remaining;
            }
            if reset.is_some() {
                state.reset = reset;
            }
        })
    }
}

/// Remaining-calls count carried by this response alone
pub(crate) fn reported_remaining(headers: &HeaderMap) -> Option<u32> {
    header_number(headers, HEADER_REMAINING)
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

// ============================================================================
// Cooldown
// ============================================================================

/// Cancellable fixed-duration wait
///
/// Every clone shares the same cancel signal.
#[derive(Debug, Clone, Default)]
pub struct Cooldown {
    cancel: Arc<Notify>,
}

impl Cooldown {
    /// Create a new cooldown handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `duration`, or fail with [`Error::Cancelled`] if
    /// [`Cooldown::cancel`] is called first
    pub async fn wait(&self, duration: Duration) -> Result<()> {
        debug!("Waiting {:?}", duration);
        tokio::select! {
            () = tokio::time::sleep(duration) => Ok(()),
            () = self.cancel.notified() => Err(Error::Cancelled),
        }
    }

    /// Abort every wait currently in progress
    pub fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

// ============================================================================
// Request Pacer
// ============================================================================

/// Token bucket limiting how fast requests leave this process
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RequestPacer {
    /// Allow `requests_per_second` requests, bursting up to the same amount
    pub fn per_second(requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(Governor::direct(Quota::per_second(rate))),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer").finish()
    }
}
