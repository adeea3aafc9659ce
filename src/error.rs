//! Error types for tokenquery
//!
//! This module defines the error hierarchy for the whole query engine.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tokenquery
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller Errors
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Signing Errors
    // ============================================================================
    #[error("Request signing failed: {message}")]
    Signing { message: String },

    // ============================================================================
    // Classified HTTP Failures
    // ============================================================================
    #[error("Unauthorized request to {url}")]
    AuthFailure { url: String },

    #[error("HTTP {status}: data will not be retrieved for {url}")]
    TerminalRequest { status: u16, url: String },

    #[error("Service outage (HTTP 502) while requesting {url}")]
    ServiceOutage { url: String },

    #[error("Transient failure (HTTP {status}) persisted after resend for {url}")]
    Transient { status: u16, url: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Wait cancelled before completion")]
    Cancelled,

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Map an HTTP failure status onto its error class.
    ///
    /// 401 is an auth failure, 403/404/406/410/500 are terminal for the
    /// request, 502 is an outage and 429/503/504 are transient. Anything
    /// else is reported as a raw [`Error::HttpStatus`].
    pub fn for_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        match status {
            401 => Self::AuthFailure { url },
            403 | 404 | 406 | 410 | 500 => Self::TerminalRequest { status, url },
            502 => Self::ServiceOutage { url },
            429 | 503 | 504 => Self::Transient { status, url },
            _ => Self::http_status(status, body),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AuthFailure { .. } => Some(401),
            Error::ServiceOutage { .. } => Some(502),
            Error::TerminalRequest { status, .. }
            | Error::Transient { status, .. }
            | Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }
}

/// Result type alias for tokenquery
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
