//! Pagination types and URL helpers
//!
//! Defines the state each paginator carries between requests.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Query parameter carrying the cursor
pub const CURSOR_PARAM: &str = "cursor";

/// Query parameter carrying the window upper bound
pub const MAX_ID_PARAM: &str = "max_id";

/// Query parameter carrying looked-up numeric identifiers
pub const USER_ID_PARAM: &str = "user_id";

/// Query parameter carrying looked-up names
pub const SCREEN_NAME_PARAM: &str = "screen_name";

/// Cursor value requesting the first page
pub const FIRST_CURSOR: i64 = -1;

/// Default maximum number of keys in one lookup request
pub const DEFAULT_BATCH_CAP: usize = 100;

/// Default identifier field for window pagination
pub const DEFAULT_ID_FIELD: &str = "id";

/// Paths ending in a file-extension-like suffix always start a new query string
static EXTENSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.json|\.xml|\.)$").unwrap());

// ============================================================================
// URL Helpers
// ============================================================================

/// Delimiter to use when appending a query parameter to `url`
pub fn query_delimiter(url: &str) -> char {
    if EXTENSION_SUFFIX.is_match(url) || !url.contains('?') {
        '?'
    } else {
        '&'
    }
}

/// Append `name=value` to `url`, choosing the delimiter from the URL shape
pub fn append_query_param(url: &str, name: &str, value: impl std::fmt::Display) -> String {
    format!("{}{}{}={}", url, query_delimiter(url), name, value)
}

/// Read an integer identifier from a record field.
///
/// Accepts JSON integers and strings holding an integer.
pub fn extract_id(record: &Record, field: &str) -> Option<i64> {
    match record.get(field)? {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Cursor State
// ============================================================================

/// Per-page callback of a cursor query, returning how many items it consumed
pub type CursorPageHandler<'a> = &'a mut (dyn FnMut(&Record, CursorPosition) -> usize + Send);

/// Per-page callback of a custom cursor query, returning `true` to stop
pub type CursorStopHandler<'a> = &'a mut (dyn FnMut(&Record, CursorPosition) -> bool + Send);

/// Cursor pair reported by the last cursor page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    /// Cursor of the page before the one just read
    pub previous: i64,
    /// Cursor to request next
    pub next: i64,
}

impl CursorPosition {
    /// Position before any page has been read
    pub fn start(cursor: i64) -> Self {
        Self {
            previous: cursor,
            next: cursor,
        }
    }

    /// Read `previous_cursor` / `next_cursor` from a page
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            previous: cursor_field(record, "previous_cursor")?,
            next: cursor_field(record, "next_cursor")?,
        })
    }

    /// The cursor stopped advancing
    pub fn is_stalled(&self) -> bool {
        self.previous == self.next
    }

    /// The service reported no further page
    pub fn is_last(&self) -> bool {
        self.next == 0
    }
}

fn cursor_field(record: &Record, field: &str) -> Result<i64> {
    extract_id(record, field)
        .ok_or_else(|| Error::decode(format!("cursor page is missing integer field '{field}'")))
}

// ============================================================================
// Window State
// ============================================================================

/// Progress of a descending-identifier window walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    /// Upper bound sent with the next request (`None` before the first pass)
    pub max_id: Option<i64>,
    /// Smallest identifier seen in the current pass
    pub min_id_seen: i64,
    /// Records delivered in the current pass
    pub items_received: usize,
    /// Records delivered across all passes
    pub total_items: usize,
    /// Requests issued
    pub passes: usize,
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowState {
    /// Fresh state: no bound, nothing seen
    pub fn new() -> Self {
        Self {
            max_id: None,
            min_id_seen: i64::MAX,
            items_received: 0,
            total_items: 0,
            passes: 0,
        }
    }

    /// Reset per-pass counters before a request
    pub fn begin_pass(&mut self) {
        self.min_id_seen = i64::MAX;
        self.items_received = 0;
        self.passes += 1;
    }

    /// Account for one delivered record
    pub fn observe(&mut self, id: Option<i64>) {
        self.items_received += 1;
        self.total_items += 1;
        if let Some(id) = id {
            self.min_id_seen = self.min_id_seen.min(id);
        }
    }

    /// Move the bound to the smallest id of the pass.
    ///
    /// Returns `false` when the walk is over: the pass was empty, carried no
    /// numeric id, or would not move the bound strictly downwards.
    pub fn advance(&mut self) -> bool {
        if self.items_received == 0 || self.min_id_seen == i64::MAX {
            return false;
        }
        if let Some(bound) = self.max_id {
            if self.min_id_seen >= bound {
                return false;
            }
        }
        self.max_id = Some(self.min_id_seen);
        true
    }
}

// ============================================================================
// Batch Chunks
// ============================================================================

/// Keys resolved by one lookup request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchChunk {
    /// Numeric identifiers
    pub ids: Vec<i64>,
    /// Names
    pub names: Vec<String>,
}

impl BatchChunk {
    /// Number of keys in the chunk
    pub fn len(&self) -> usize {
        self.ids.len() + self.names.len()
    }

    /// Check if the chunk holds no key
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }

    /// Lookup URL for this chunk: `screen_name` then `user_id`, comma separated
    pub fn apply(&self, url: &str) -> Result<String> {
        let mut url = Url::parse(url)?;
        {
            let mut pairs = url.query_pairs_mut();
            if !self.names.is_empty() {
                pairs.append_pair(SCREEN_NAME_PARAM, &self.names.join(","));
            }
            if !self.ids.is_empty() {
                let ids: Vec<String> = self.ids.iter().map(i64::to_string).collect();
                pairs.append_pair(USER_ID_PARAM, &ids.join(","));
            }
        }
        Ok(url.into())
    }
}

/// Split ids and names into chunks of at most `cap` keys.
///
/// Within a chunk ids and names are taken alternately until one list runs
/// out, then the other list fills the rest. Names are sent comma-joined, so
/// a name containing a comma is rejected.
pub fn split_batches(ids: &[i64], names: &[String], cap: usize) -> Result<Vec<BatchChunk>> {
    if ids.is_empty() && names.is_empty() {
        return Err(Error::invalid_argument(
            "identifiers or names must be specified",
        ));
    }
    if cap == 0 {
        return Err(Error::invalid_argument("batch cap must be greater than 0"));
    }
    if let Some(name) = names.iter().find(|name| name.contains(',')) {
        return Err(Error::invalid_argument(format!(
            "name '{name}' contains the ',' key separator"
        )));
    }

    let mut ids = ids.iter().copied().peekable();
    let mut names = names.iter().cloned().peekable();
    let mut chunks = Vec::new();

    while ids.peek().is_some() || names.peek().is_some() {
        let mut chunk = BatchChunk::default();

        while chunk.len() < cap && ids.peek().is_some() && names.peek().is_some() {
            chunk.ids.extend(ids.next());
            if chunk.len() < cap {
                chunk.names.extend(names.next());
            }
        }
        while chunk.len() < cap {
            match ids.next() {
                Some(id) => chunk.ids.push(id),
                None => break,
            }
        }
        while chunk.len() < cap {
            match names.next() {
                Some(name) => chunk.names.push(name),
                None => break,
            }
        }

        chunks.push(chunk);
    }

    Ok(chunks)
}
