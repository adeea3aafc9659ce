// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tokenquery
//!
//! A client-side query engine for OAuth 1.0a signed, rate-limited,
//! paginated REST APIs.
//!
//! ## Features
//!
//! - **Request Signing**: HMAC-SHA1 `Authorization` headers built from consumer and access credentials
//! - **Status Handling**: 429/503/504 waited out and resent once, everything else classified
//! - **Rate Limit Tracking**: `X-Rate-Limit-*` headers recorded, a zero remaining count waited out
//! - **Pagination**: Cursor, `max_id` window and capped batch lookup
//! - **Record Dispatch**: Responses decoded into records and streamed through callbacks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tokenquery::{Credentials, Record, Result, Token};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let token = Token::new(Credentials::new("ck", "cs", "at", "ats"))?;
//!
//!     // Every record of every page goes through the handler
//!     let mut print = |tweet: &Record| println!("{}", tweet["text"]);
//!     token
//!         .execute_since_max_query(
//!             "https://api.twitter.com/1.1/statuses/user_timeline.json?screen_name=alice",
//!             Some(&mut print),
//!             None,
//!         )
//!         .await?;
//!
//!     // 150 ids resolve in two requests of 100 and 50
//!     let ids: Vec<i64> = (1..=150).collect();
//!     let users = token
//!         .lookup("https://api.twitter.com/1.1/users/lookup.json", &ids, &[], None, None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                              Token                              │
//! │  get/post · collection · cursor · custom cursor · window · lookup│
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │  Pagination  │           Decode              │      Config      │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ Cursor       │ ResponseDispatcher            │ YAML + env       │
//! │ Window       │ Single / Collection           │                  │
//! │ Batch Lookup │                               │                  │
//! └──────────────┴───────────────┬───────────────┴──────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │  HTTP: Transport · RetryPolicy · RateTracker · Cooldown         │
//! │  Auth: Signer · Credentials · NonceSource                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// OAuth 1.0a request signing
pub mod auth;

/// Signed HTTP transport with retry and rate limit tracking
pub mod http;

/// Response decoding and record dispatch
pub mod decode;

/// Cursor, window and batch lookup pagination
pub mod pagination;

/// Query facade
pub mod token;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{Credentials, Signer};
pub use config::ClientConfig;
pub use decode::Decoded;
pub use http::{RateState, Transport, TransportConfig};
pub use pagination::{CursorPosition, WindowState};
pub use token::Token;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
