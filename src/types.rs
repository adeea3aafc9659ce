//! Common types used throughout tokenquery
//!
//! This module contains shared type definitions, type aliases,
//! and the handler signatures accepted by the query operations.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// One decoded API response object: field name to dynamically typed value
pub type Record = serde_json::Map<String, JsonValue>;

// ============================================================================
// Handler Types
// ============================================================================

/// Per-record callback, invoked once per decoded record in document order
pub type RecordHandler<'a> = &'a mut (dyn FnMut(&Record) + Send);

/// Callback for classified request failures that the caller wants to absorb.
///
/// Per-call handlers borrow for `'a` and may capture caller state by
/// reference; a stored default handler is `ExceptionHandler<'static>`.
pub type ExceptionHandler<'a> = dyn Fn(&Error) + Send + Sync + 'a;

/// Reborrow an optional record handler for one more call
pub(crate) fn reborrow<'b>(handler: &'b mut Option<RecordHandler<'_>>) -> Option<RecordHandler<'b>> {
    match handler {
        Some(handler) => Some(&mut **handler),
        None => None,
    }
}

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl Method {
    /// Uppercase method name as used in the signature base string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}
