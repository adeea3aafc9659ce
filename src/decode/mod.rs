//! Response decoding module
//!
//! Turns raw response bodies into [`Record`](crate::types::Record)s and
//! forwards each one to a caller supplied handler.
//!
//! # Overview
//!
//! A body is either a single JSON object or an array of objects; the shape
//! of the parsed value decides which, not any content type. The
//! `ResponseDispatcher` pairs this with the transport so a URL goes in and
//! decoded records come out.

mod dispatcher;
mod types;

pub use dispatcher::{decode_body, dispatch, ResponseDispatcher};
pub use types::Decoded;
