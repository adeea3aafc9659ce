//! Body decoding and record dispatch

use super::types::Decoded;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{ExceptionHandler, JsonValue, Method, Record, RecordHandler};
use tracing::debug;

/// Decode a raw body into records.
///
/// An empty body (or a literal `null`) decodes to `None`. Array elements
/// that are not objects are skipped.
pub fn decode_body(body: &str) -> Result<Option<Decoded>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;

    match value {
        JsonValue::Object(record) => Ok(Some(Decoded::Single(record))),
        JsonValue::Array(items) => {
            let total = items.len();
            let records: Vec<Record> = items
                .into_iter()
                .filter_map(|item| match item {
                    JsonValue::Object(record) => Some(record),
                    _ => None,
                })
                .collect();
            if records.len() < total {
                debug!("Skipped {} non-object array elements", total - records.len());
            }
            Ok(Some(Decoded::Collection(records)))
        }
        JsonValue::Null => Ok(None),
        other => Err(Error::decode(format!(
            "expected an object or an array of objects, got {other}"
        ))),
    }
}

/// Decode `body` and hand every record to `handler` before returning them
pub fn dispatch(body: Option<&str>, handler: Option<RecordHandler<'_>>) -> Result<Option<Decoded>> {
    let Some(body) = body else {
        return Ok(None);
    };

    let decoded = decode_body(body)?;
    if let (Some(decoded), Some(handler)) = (&decoded, handler) {
        for record in decoded.records() {
            handler(record);
        }
    }
    Ok(decoded)
}

/// Executes a request and dispatches the decoded records
#[derive(Debug, Clone, Copy)]
pub struct ResponseDispatcher<'a> {
    transport: &'a Transport,
}

impl<'a> ResponseDispatcher<'a> {
    /// Create a dispatcher over a transport
    pub fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// The underlying transport
    pub fn transport(&self) -> &'a Transport {
        self.transport
    }

    /// Request `url` and dispatch whatever comes back
    pub async fn execute(
        &self,
        url: &str,
        method: Method,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Decoded>> {
        let body = self
            .transport
            .execute_signed(url, method, exception_handler)
            .await?;
        dispatch(body.as_deref(), handler)
    }

    /// Request `url` expecting a single object
    pub async fn execute_single(
        &self,
        url: &str,
        method: Method,
        handler: Option<RecordHandler<'_>>,
        exception_handler: Option<&ExceptionHandler<'_>>,
    ) -> Result<Option<Record>> {
        let decoded = self
            .execute(url, method, handler, exception_handler)
            .await?;
        Ok(decoded.and_then(Decoded::into_single))
    }
}
