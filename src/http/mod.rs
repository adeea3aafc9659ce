//! HTTP transport module
//!
//! Provides the signed transport, its status code retry policy and rate
//! limit tracking.
//!
//! # Features
//!
//! - **OAuth Signing**: Every request carries a fresh `Authorization` header
//! - **Single Resend**: 429/503/504 are waited out and resent exactly once
//! - **Rate Limit Tracking**: `X-Rate-Limit-*` headers feed a shared `RateState`
//! - **Cooldown**: A response reporting zero remaining calls suspends the caller, cancellably

mod client;
mod rate_limit;
mod retry;

pub use client::{Transport, TransportConfig, TransportConfigBuilder};
pub use rate_limit::{
    Cooldown, RateState, RateTracker, RequestPacer, HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET,
};
pub use retry::{RetryAction, RetryPolicy, DEFAULT_RATE_LIMIT_COOLDOWN, DEFAULT_UNAVAILABLE_DELAY};
