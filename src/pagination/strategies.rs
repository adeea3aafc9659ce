//! Pagination strategy implementations
//!
//! Each paginator drives a [`ResponseDispatcher`] through one pagination
//! pattern, issuing requests strictly one after another.

use super::types::{
    append_query_param, extract_id, split_batches, BatchChunk, CursorPageHandler,
    CursorPosition, CursorStopHandler, WindowState, CURSOR_PARAM, DEFAULT_BATCH_CAP,
    DEFAULT_ID_FIELD, FIRST_CURSOR, MAX_ID_PARAM,
};
use crate::decode::{Decoded, ResponseDispatcher};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{reborrow, ExceptionHandler, Method, Record, RecordHandler};
use tracing::{debug, info};

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor pagination over `previous_cursor` / `next_cursor` pages
///
/// Each page is requested with `cursor=<next>` appended to the base URL.
#[derive(Debug, Clone)]
pub struct CursorPaginator<'a> {
    dispatcher: ResponseDispatcher<'a>,
    method: Method,
    start_cursor: i64,
    max_items: usize,
}

impl<'a> CursorPaginator<'a> {
    /// Create a cursor paginator starting at the first page with no item cap
    pub fn new(transport: &'a Transport) -> Self {
        Self {
            dispatcher: ResponseDispatcher::new(transport),
            method: Method::GET,
            start_cursor: FIRST_CURSOR,
            max_items: usize::MAX,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Start from a cursor returned by an earlier query
    #[must_use]
    pub fn with_start_cursor(mut self, cursor: i64) -> Self {
        self.start_cursor = cursor;
        self
    }

    /// Stop once page handlers report this many consumed items
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Walk the cursor until it stops advancing, the service reports the
    /// last page (`next_cursor == 0`) or the item cap is reached.
    ///
    /// Every page is handed to `record_handler`, then to `page_handler`
    /// together with its cursor pair. Returns the last cursor pair seen.
    pub async fn run(
        &self,
        url: &str,
        mut record_handler: Option<RecordHandler<'_>>,
        mut page_handler: Option<CursorPageHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<CursorPosition> {
        let mut position = CursorPosition::start(self.start_cursor);
        let mut processed = 0usize;
        let mut pages = 0usize;

        while processed < self.max_items {
            let Some(page) = self
                .fetch_page(
                    url,
                    position.next,
                    reborrow(&mut record_handler),
                    exception_handler,
                )
                .await?
            else {
                debug!("Cursor query on {} produced no page, stopping", url);
                break;
            };
            pages += 1;

            position = CursorPosition::from_record(&page)?;
            if let Some(handler) = page_handler.as_deref_mut() {
                processed = processed.saturating_add(handler(&page, position));
            }

            if position.is_stalled() || position.is_last() {
                break;
            }
        }

        info!(
            "Cursor query on {} finished after {} pages ({} items)",
            url, pages, processed
        );
        Ok(position)
    }

    /// Walk the cursor until `handler` returns `true`, the cursor stops
    /// advancing or the service reports the last page (`next_cursor == 0`)
    pub async fn run_until(
        &self,
        url: &str,
        handler: CursorStopHandler<'_>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<CursorPosition> {
        let mut position = CursorPosition::start(self.start_cursor);
        let mut pages = 0usize;

        loop {
            let Some(page) = self
                .fetch_page(url, position.next, None, exception_handler)
                .await?
            else {
                break;
            };
            pages += 1;

            position = CursorPosition::from_record(&page)?;
            if handler(&page, position) {
                debug!("Cursor handler requested stop on {}", url);
                break;
            }
            if position.is_stalled() || position.is_last() {
                break;
            }
        }

        info!("Custom cursor query on {} finished after {} pages", url, pages);
        Ok(position)
    }

    async fn fetch_page(
        &self,
        url: &str,
        cursor: i64,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Record>> {
        let page_url = append_query_param(url, CURSOR_PARAM, cursor);
        debug!("Requesting cursor page {}", page_url);

        match self
            .dispatcher
            .execute(&page_url, self.method, handler, exception_handler)
            .await?
        {
            Some(Decoded::Single(page)) => Ok(Some(page)),
            Some(Decoded::Collection(_)) => Err(Error::decode(format!(
                "cursor page from {page_url} is not an object"
            ))),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Window Pagination
// ============================================================================

/// Descending-identifier pagination bounded by `max_id`
///
/// The first request goes to the URL as given; each following request
/// carries `max_id` set to the smallest identifier of the previous pass.
/// The record holding that identifier is requested again and redelivered.
#[derive(Debug, Clone)]
pub struct WindowPaginator<'a> {
    dispatcher: ResponseDispatcher<'a>,
    method: Method,
    id_field: String,
}

impl<'a> WindowPaginator<'a> {
    /// Create a window paginator reading identifiers from `id`
    pub fn new(transport: &'a Transport) -> Self {
        Self {
            dispatcher: ResponseDispatcher::new(transport),
            method: Method::GET,
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Read identifiers from another field
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Walk the window until a pass returns no records.
    ///
    /// Records without a numeric identifier are delivered but do not move
    /// the bound. Returns the final window state.
    pub async fn run(
        &self,
        url: &str,
        mut handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<WindowState> {
        let mut state = WindowState::new();

        loop {
            let request_url = match state.max_id {
                Some(max_id) => append_query_param(url, MAX_ID_PARAM, max_id),
                None => url.to_string(),
            };
            state.begin_pass();
            debug!("Window pass {} on {}", state.passes, request_url);

            let id_field = self.id_field.as_str();
            let mut deliver = |record: &Record| {
                state.observe(extract_id(record, id_field));
                if let Some(handler) = handler.as_deref_mut() {
                    handler(record);
                }
            };

            let decoded = self
                .dispatcher
                .execute(&request_url, self.method, Some(&mut deliver), exception_handler)
                .await?;

            if decoded.is_none() || !state.advance() {
                break;
            }
        }

        info!(
            "Window query on {} finished after {} passes ({} items)",
            url, state.passes, state.total_items
        );
        Ok(state)
    }
}

// ============================================================================
// Batch Lookup
// ============================================================================

/// Resolves many identifiers and names with as few requests as the cap allows
#[derive(Debug, Clone)]
pub struct BatchLookupPaginator<'a> {
    dispatcher: ResponseDispatcher<'a>,
    method: Method,
    cap: usize,
}

impl<'a> BatchLookupPaginator<'a> {
    /// Create a batch paginator with the default cap of 100 keys per request
    pub fn new(transport: &'a Transport) -> Self {
        Self {
            dispatcher: ResponseDispatcher::new(transport),
            method: Method::GET,
            cap: DEFAULT_BATCH_CAP,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the maximum number of keys per request
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Maximum number of keys per request
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Chunks that `run` would request, in issuance order
    pub fn chunks(&self, ids: &[i64], names: &[String]) -> Result<Vec<BatchChunk>> {
        split_batches(ids, names, self.cap)
    }

    /// Look up every id and name, returning all records in chunk order
    pub async fn run(
        &self,
        url: &str,
        ids: &[i64],
        names: &[String],
        mut handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Vec<Record>> {
        let chunks = self.chunks(ids, names)?;
        let total = chunks.len();
        let mut records = Vec::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let chunk_url = chunk.apply(url)?;
            debug!(
                "Lookup batch {}/{} with {} keys",
                index + 1,
                total,
                chunk.len()
            );

            if let Some(decoded) = self
                .dispatcher
                .execute(
                    &chunk_url,
                    self.method,
                    reborrow(&mut handler),
                    exception_handler,
                )
                .await?
            {
                records.extend(decoded.into_records());
            }
        }

        info!(
            "Lookup on {} resolved {} records in {} requests",
            url,
            records.len(),
            total
        );
        Ok(records)
    }
}
