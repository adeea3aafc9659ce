//! Pagination module
//!
//! Supports: Cursor, Window (`max_id`), Batch Lookup
//!
//! # Overview
//!
//! Each paginator wraps a [`ResponseDispatcher`](crate::decode::ResponseDispatcher)
//! and repeats requests until its own stop condition holds:
//!
//! - **Cursor**: follows `next_cursor` until it equals `previous_cursor`
//! - **Window**: lowers `max_id` to the smallest id seen until a pass is empty
//! - **Batch Lookup**: splits ids and names into capped, interleaved chunks

mod strategies;
mod types;

pub use strategies::{BatchLookupPaginator, CursorPaginator, WindowPaginator};
pub use types::{
    append_query_param, extract_id, query_delimiter, split_batches, BatchChunk,
    CursorPageHandler, CursorPosition, CursorStopHandler, WindowState, CURSOR_PARAM,
    DEFAULT_BATCH_CAP, DEFAULT_ID_FIELD, FIRST_CURSOR, MAX_ID_PARAM, SCREEN_NAME_PARAM,
    USER_ID_PARAM,
};

#[cfg(test)]
mod tests;
