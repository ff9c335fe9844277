//! Per-source page fetching
//!
//! A [`SourceAdapter`] owns one API's pagination protocol and response
//! envelope. Each `fetch_page` call builds the request for one cursor, makes
//! exactly one transport call and returns that page's raw records together
//! with the cursor of the following page, if any.

mod clinical_trials;
mod drugsfda;
mod rxclass;

pub use clinical_trials::ClinicalTrialsAdapter;
pub use drugsfda::DrugsFdaAdapter;
pub use rxclass::RxClassAdapter;

use serde_json::Value;
use tracing::warn;

use crate::error::{RegbotError, Result};
use crate::query::{PageCursor, QueryBuilder, QueryParameters, RequestDescriptor};
use crate::retry::RetryableError;
use crate::source::Source;
use crate::transport::{Transport, TransportError};

/// One page of raw records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw JSON records in source order
    pub records: Vec<Value>,
    /// Cursor of the next page; `None` when the source is exhausted
    pub next: Option<PageCursor>,
}

impl Page {
    /// A page after which there is nothing more to fetch
    pub fn last(records: Vec<Value>) -> Self {
        Self { records, next: None }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Fetches single pages from one source
pub trait SourceAdapter {
    fn source(&self) -> Source;

    fn query_builder(&self) -> &QueryBuilder;

    /// Fetch the page at `cursor` (`None` for the first page)
    ///
    /// # Errors
    ///
    /// * `UnsupportedParameter` / `InvalidParameters` - from the query builder, before any I/O
    /// * `InvalidQuery` - the source rejected the request (HTTP 4xx)
    /// * `TransientSourceError` - HTTP 429/5xx, network failure or an unreadable body
    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page>;

    /// Check `params` without performing I/O
    fn validate(&self, params: &QueryParameters) -> Result<()> {
        self.query_builder()
            .build_query(self.source(), params, None)
            .map(|_| ())
    }
}

impl<A: SourceAdapter + ?Sized> SourceAdapter for &A {
    fn source(&self) -> Source {
        (**self).source()
    }

    fn query_builder(&self) -> &QueryBuilder {
        (**self).query_builder()
    }

    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        (**self).fetch_page(params, cursor)
    }
}

/// Any of the three adapters
#[derive(Debug, Clone)]
pub enum Adapter<T> {
    ClinicalTrials(ClinicalTrialsAdapter<T>),
    DrugsFda(DrugsFdaAdapter<T>),
    RxClass(RxClassAdapter<T>),
}

impl<T: Transport> Adapter<T> {
    /// The adapter for `source`
    pub fn for_source(source: Source, transport: T, builder: QueryBuilder) -> Self {
        match source {
            Source::ClinicalTrials => Adapter::ClinicalTrials(ClinicalTrialsAdapter::with_builder(transport, builder)),
            Source::DrugsFda => Adapter::DrugsFda(DrugsFdaAdapter::with_builder(transport, builder)),
            Source::RxClass => Adapter::RxClass(RxClassAdapter::with_builder(transport, builder)),
        }
    }
}

impl<T: Transport> SourceAdapter for Adapter<T> {
    fn source(&self) -> Source {
        match self {
            Adapter::ClinicalTrials(adapter) => adapter.source(),
            Adapter::DrugsFda(adapter) => adapter.source(),
            Adapter::RxClass(adapter) => adapter.source(),
        }
    }

    fn query_builder(&self) -> &QueryBuilder {
        match self {
            Adapter::ClinicalTrials(adapter) => adapter.query_builder(),
            Adapter::DrugsFda(adapter) => adapter.query_builder(),
            Adapter::RxClass(adapter) => adapter.query_builder(),
        }
    }

    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        match self {
            Adapter::ClinicalTrials(adapter) => adapter.fetch_page(params, cursor),
            Adapter::DrugsFda(adapter) => adapter.fetch_page(params, cursor),
            Adapter::RxClass(adapter) => adapter.fetch_page(params, cursor),
        }
    }
}

impl<T> From<ClinicalTrialsAdapter<T>> for Adapter<T> {
    fn from(adapter: ClinicalTrialsAdapter<T>) -> Self {
        Adapter::ClinicalTrials(adapter)
    }
}

impl<T> From<DrugsFdaAdapter<T>> for Adapter<T> {
    fn from(adapter: DrugsFdaAdapter<T>) -> Self {
        Adapter::DrugsFda(adapter)
    }
}

impl<T> From<RxClassAdapter<T>> for Adapter<T> {
    fn from(adapter: RxClassAdapter<T>) -> Self {
        Adapter::RxClass(adapter)
    }
}

/// Send `request`, classifying transport failures for `request.source`
pub(crate) fn send_request<T: Transport>(transport: &T, request: &RequestDescriptor) -> Result<Value> {
    transport
        .send(request)
        .map_err(|err| classify_transport_error(request.source, err))
}

/// Map a transport failure onto the error kinds callers act on
///
/// 429 and 5xx are transient, other 4xx mean the request itself is wrong.
pub(crate) fn classify_transport_error(source: Source, err: TransportError) -> RegbotError {
    let retryable = err.is_retryable();
    match err {
        TransportError::Status { status, body } if !retryable && (400..500).contains(&status) => {
            RegbotError::InvalidQuery {
                api: source,
                status,
                message: error_message(&body),
            }
        }
        TransportError::Status { status, body } => RegbotError::TransientSourceError {
            api: source,
            status: Some(status),
            message: error_message(&body),
        },
        other => RegbotError::TransientSourceError {
            api: source,
            status: None,
            message: other.to_string(),
        },
    }
}

/// Best human-readable message from an error body
///
/// openFDA sends `{"error": {"code": ..., "message": ...}}`; the other sources
/// send plain text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Response that is not the JSON object a source always returns
pub(crate) fn unexpected_envelope(source: Source, response: &Value) -> RegbotError {
    warn!(source = %source, "Response is not a JSON object");
    RegbotError::TransientSourceError {
        api: source,
        status: None,
        message: format!("unexpected response envelope: {}", truncate(&response.to_string(), 200)),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
