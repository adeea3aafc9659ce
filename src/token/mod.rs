//! Query facade
//!
//! A [`Token`] bundles a signed [`Transport`] with the paginators and a
//! default exception handler, and is the entry point for callers:
//!
//! ```ignore
//! let token = Token::new(Credentials::new("ck", "cs", "at", "ats"))?;
//! let user = token
//!     .execute_get("https://api.twitter.com/1.1/users/show.json?screen_name=alice", None, None)
//!     .await?;
//! ```

use crate::auth::{Credentials, Signer};
use crate::config::ClientConfig;
use crate::decode::{Decoded, ResponseDispatcher};
use crate::error::{Error, Result};
use crate::http::{Cooldown, RateState, Transport, TransportConfig};
use crate::pagination::{
    extract_id, BatchLookupPaginator, CursorPageHandler, CursorPaginator, CursorPosition,
    CursorStopHandler, WindowPaginator, WindowState, DEFAULT_BATCH_CAP, DEFAULT_ID_FIELD,
};
use crate::types::{ExceptionHandler, Method, Record, RecordHandler};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Signed, rate-limit aware query client
pub struct Token {
    transport: Transport,
    exception_handler: Option<Arc<ExceptionHandler<'static>>>,
    batch_cap: usize,
    id_field: String,
}

impl Token {
    /// Create a token with default transport settings
    pub fn new(credentials: Credentials) -> Result<Self> {
        let signer = Signer::new(Arc::new(credentials));
        Ok(Self::from_transport(Transport::new(signer)?))
    }

    /// Create a token with custom transport settings
    pub fn with_config(credentials: Credentials, config: TransportConfig) -> Result<Self> {
        let signer = Signer::new(Arc::new(credentials));
        Ok(Self::from_transport(Transport::with_config(signer, config)?))
    }

    /// Wrap an existing transport
    pub fn from_transport(transport: Transport) -> Self {
        Self {
            transport,
            exception_handler: None,
            batch_cap: DEFAULT_BATCH_CAP,
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }

    /// Build a token from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let token = Self::with_config(config.credentials.clone(), config.transport_config())?;
        Ok(token
            .with_batch_cap(config.pagination.batch_cap)
            .with_id_field(config.pagination.id_field.clone()))
    }

    /// Set the exception handler used when a call supplies none
    #[must_use]
    pub fn with_exception_handler(
        mut self,
        handler: impl Fn(&Error) + Send + Sync + 'static,
    ) -> Self {
        self.set_exception_handler(handler);
        self
    }

    /// Replace the default exception handler
    pub fn set_exception_handler(&mut self, handler: impl Fn(&Error) + Send + Sync + 'static) {
        self.exception_handler = Some(Arc::new(handler));
    }

    /// Remove the default exception handler
    pub fn clear_exception_handler(&mut self) {
        self.exception_handler = None;
    }

    /// Set the maximum number of keys per lookup request
    #[must_use]
    pub fn with_batch_cap(mut self, cap: usize) -> Self {
        self.batch_cap = cap;
        self
    }

    /// Set the identifier field used by window queries
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Credentials used to sign requests
    pub fn credentials(&self) -> &Credentials {
        self.transport.signer().credentials()
    }

    /// The underlying transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Last observed rate limit state
    pub fn rate_state(&self) -> RateState {
        self.transport.rate_state()
    }

    /// Handle that can abort an in-progress wait
    pub fn cooldown(&self) -> &Cooldown {
        self.transport.cooldown()
    }

    fn handler_for<'h>(
        &'h self,
        per_call: Option<&'h ExceptionHandler<'_>>,
    ) -> Option<&'h ExceptionHandler<'h>> {
        match per_call {
            Some(handler) => Some(handler),
            None => self
                .exception_handler
                .as_deref()
                .map(|handler| handler as &ExceptionHandler<'h>),
        }
    }

    // ========================================================================
    // Single Requests
    // ========================================================================

    /// Execute a request and return whatever it decoded to
    pub async fn execute_query(
        &self,
        url: &str,
        method: Method,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Decoded>> {
        ResponseDispatcher::new(&self.transport)
            .execute(url, method, handler, self.handler_for(exception_handler))
            .await
    }

    /// GET a single object
    pub async fn execute_get(
        &self,
        url: &str,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Record>> {
        self.execute_single(url, Method::GET, handler, exception_handler)
            .await
    }

    /// POST and return a single object
    pub async fn execute_post(
        &self,
        url: &str,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Record>> {
        self.execute_single(url, Method::POST, handler, exception_handler)
            .await
    }

    /// GET a collection of objects
    pub async fn execute_get_collection(
        &self,
        url: &str,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Vec<Record>> {
        self.execute_collection(url, Method::GET, handler, exception_handler)
            .await
    }

    /// POST and return a collection of objects
    pub async fn execute_post_collection(
        &self,
        url: &str,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Vec<Record>> {
        self.execute_collection(url, Method::POST, handler, exception_handler)
            .await
    }

    async fn execute_single(
        &self,
        url: &str,
        method: Method,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Record>> {
        ResponseDispatcher::new(&self.transport)
            .execute_single(url, method, handler, self.handler_for(exception_handler))
            .await
    }

    async fn execute_collection(
        &self,
        url: &str,
        method: Method,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Vec<Record>> {
        let decoded = self
            .execute_query(url, method, handler, exception_handler)
            .await?;
        Ok(decoded.map(Decoded::into_records).unwrap_or_default())
    }

    // ========================================================================
    // Paginated Requests
    // ========================================================================

    /// Follow a cursor endpoint.
    ///
    /// `start_cursor` defaults to the first page and `max_items` to no cap;
    /// the cap counts what `page_handler` reports as consumed.
    pub async fn execute_cursor_query(
        &self,
        url: &str,
        start_cursor: Option<i64>,
        max_items: Option<usize>,
        page_handler: Option<CursorPageHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<CursorPosition> {
        let mut paginator = CursorPaginator::new(&self.transport);
        if let Some(cursor) = start_cursor {
            paginator = paginator.with_start_cursor(cursor);
        }
        if let Some(max) = max_items {
            paginator = paginator.with_max_items(max);
        }
        paginator
            .run(url, None, page_handler, self.handler_for(exception_handler))
            .await
    }

    /// Follow a cursor endpoint until `handler` returns `true`
    pub async fn execute_custom_cursor_query(
        &self,
        url: &str,
        start_cursor: Option<i64>,
        handler: CursorStopHandler<'_>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<CursorPosition> {
        let mut paginator = CursorPaginator::new(&self.transport);
        if let Some(cursor) = start_cursor {
            paginator = paginator.with_start_cursor(cursor);
        }
        paginator
            .run_until(url, handler, self.handler_for(exception_handler))
            .await
    }

    /// Walk a descending-identifier feed with `max_id`
    pub async fn execute_since_max_query(
        &self,
        url: &str,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<WindowState> {
        WindowPaginator::new(&self.transport)
            .with_id_field(self.id_field.clone())
            .run(url, handler, self.handler_for(exception_handler))
            .await
    }

    /// Resolve identifiers and names in capped batches
    pub async fn lookup(
        &self,
        url: &str,
        ids: &[i64],
        names: &[String],
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Vec<Record>> {
        BatchLookupPaginator::new(&self.transport)
            .with_cap(self.batch_cap)
            .run(url, ids, names, handler, self.handler_for(exception_handler))
            .await
    }

    // ========================================================================
    // Rate Limit Status
    // ========================================================================

    /// Query a rate limit status endpoint and record what it reports.
    ///
    /// Reads `hourly_limit`, `reset_time_in_seconds` and, when present,
    /// `remaining_hits`. The remaining count otherwise comes from the
    /// response headers of the same call.
    pub async fn refresh_rate_limit(&self, url: &str) -> Result<RateState> {
        let status = self
            .execute_get(url, None, None)
            .await?
            .ok_or_else(|| Error::decode(format!("empty rate limit status from {url}")))?;

        let limit = extract_id(&status, "hourly_limit").and_then(|v| u32::try_from(v).ok());
        let remaining = extract_id(&status, "remaining_hits").and_then(|v| u32::try_from(v).ok());
        let reset = extract_id(&status, "reset_time_in_seconds")
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        let state = self.transport.rate_tracker().update(|state| {
            if limit.is_some() {
                state.limit = limit;
            }
            if remaining.is_some() {
                state.remaining = remaining;
            }
            if reset.is_some() {
                state.reset = reset;
            }
        });

        info!(
            "Rate limit: {:?} of {:?} calls remaining, reset at {:?}",
            state.remaining, state.limit, state.reset
        );
        Ok(state)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("transport", &self.transport)
            .field("has_exception_handler", &self.exception_handler.is_some())
            .field("batch_cap", &self.batch_cap)
            .field("id_field", &self.id_field)
            .finish()
    }
}
