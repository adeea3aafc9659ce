//! Status code retry policy
//!
//! A pure mapping from an HTTP failure status to what the transport should
//! do about it. Resends are single-shot: there is no retry counter and no
//! backoff growth.

use std::time::Duration;

/// Default wait after a 429 before the single resend
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(15 * 60);

/// Default wait after a 503/504 before the single resend
pub const DEFAULT_UNAVAILABLE_DELAY: Duration = Duration::from_secs(1);

/// What to do with a failed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Wait, then resend the same request exactly once
    WaitAndResend(Duration),
    /// 401: report as an auth failure, no resend
    ReportAuth,
    /// 403/404/406/410/500: this request cannot succeed, no resend
    ReportTerminal,
    /// 502: the service is down, fail the whole operation
    Outage,
    /// Anything else: hand to the caller's exception handler, or fail
    Delegate,
}

impl RetryAction {
    /// Whether this action resends the request
    pub fn resends(&self) -> bool {
        matches!(self, Self::WaitAndResend(_))
    }
}

/// Maps HTTP status codes to [`RetryAction`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait applied to 429 responses
    pub rate_limit_cooldown: Duration,
    /// Wait applied to 503 and 504 responses
    pub unavailable_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
            unavailable_delay: DEFAULT_UNAVAILABLE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom waits
    pub fn new(rate_limit_cooldown: Duration, unavailable_delay: Duration) -> Self {
        Self {
            rate_limit_cooldown,
            unavailable_delay,
        }
    }

    /// Decide what to do with a failure status
    pub fn action_for(&self, status: u16) -> RetryAction {
        match status {
            429 => RetryAction::WaitAndResend(self.rate_limit_cooldown),
            401 => RetryAction::ReportAuth,
            403 | 404 | 406 | 410 | 500 => RetryAction::ReportTerminal,
            502 => RetryAction::Outage,
            503 | 504 => RetryAction::WaitAndResend(self.unavailable_delay),
            _ => RetryAction::Delegate,
        }
    }

    /// Human readable reason logged for a classified status
    pub fn describe(status: u16) -> &'static str {
        match status {
            429 => "rate limit reached",
            401 => "unauthorized operation",
            403 => "server refused the request or access is not allowed",
            404 => "the URI is invalid or the requested resource does not exist",
            406 => "invalid format specified in the request",
            410 => "this resource is gone",
            500 => "internal server error",
            502 => "servers are down or being upgraded",
            503 => "servers are up but overloaded with requests",
            504 => "servers are up but the request could not be serviced",
            _ => "unexpected status",
        }
    }
}
