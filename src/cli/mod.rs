//! CLI module
//!
//! Command-line interface over [`Token`](crate::token::Token).
//!
//! # Commands
//!
//! - `get` - Request a single object
//! - `collection` - Request a collection of objects
//! - `cursor` - Follow a cursor endpoint
//! - `timeline` - Walk a `max_id` window
//! - `lookup` - Resolve ids and names in batches
//! - `rate-limit` - Refresh rate limit status
//!
//! Credentials come from the config file (`-C`) or the `TOKENQUERY_*`
//! environment variables.

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
