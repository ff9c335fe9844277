use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{classify_transport_error, unexpected_envelope, Page, SourceAdapter};
use crate::assembler::lenient::one_or_many;
use crate::error::Result;
use crate::query::{PageCursor, QueryBuilder, QueryParameters};
use crate::source::Source;
use crate::transport::{Transport, TransportError};

/// openFDA rejects `skip` values above this
pub const MAX_SKIP: u64 = 25_000;

/// openFDA Drugs@FDA (`/drug/drugsfda.json`), offset/limit pagination
///
/// The `meta.results` block reports `{skip, limit, total}`; the next page
/// starts at `skip + limit` and the result set ends once that reaches `total`.
#[derive(Debug, Clone)]
pub struct DrugsFdaAdapter<T> {
    transport: T,
    builder: QueryBuilder,
}

impl<T: Transport> DrugsFdaAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_builder(transport, QueryBuilder::new())
    }

    pub fn with_builder(transport: T, builder: QueryBuilder) -> Self {
        Self { transport, builder }
    }
}

impl<T: Transport> SourceAdapter for DrugsFdaAdapter<T> {
    fn source(&self) -> Source {
        Source::DrugsFda
    }

    fn query_builder(&self) -> &QueryBuilder {
        &self.builder
    }

    #[instrument(skip(self, params))]
    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        let request = self.builder.build_query(Source::DrugsFda, params, cursor)?;

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(TransportError::Status { status: 404, body }) if is_not_found(&body) => {
                debug!("No matching Drugs@FDA applications");
                return Ok(Page::default());
            }
            Err(err) => return Err(classify_transport_error(Source::DrugsFda, err)),
        };

        let Value::Object(mut envelope) = response else {
            return Err(unexpected_envelope(Source::DrugsFda, &response));
        };

        let records = one_or_many(envelope.remove("results").unwrap_or(Value::Null));
        let next = envelope.get("meta").and_then(next_offset);

        debug!(records = records.len(), next = ?next, "Fetched Drugs@FDA page");
        Ok(Page { records, next })
    }
}

/// openFDA answers a search without matches with 404 and `error.code == "NOT_FOUND"`
fn is_not_found(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.pointer("/error/code").and_then(Value::as_str).map(|code| code == "NOT_FOUND"))
        .unwrap_or(false)
}

/// Offset of the next page from the `meta` block, or `None` at the end
fn next_offset(meta: &Value) -> Option<PageCursor> {
    let results = meta.get("results")?;
    let field = |name: &str| results.get(name).and_then(Value::as_u64);

    let (Some(skip), Some(limit), Some(total)) = (field("skip"), field("limit"), field("total")) else {
        warn!(meta = %meta, "Incomplete pagination metadata; treating page as last");
        return None;
    };

    let next = skip.saturating_add(limit);
    if limit == 0 || next >= total {
        return None;
    }
    if next > MAX_SKIP {
        warn!(
            total,
            fetched = next,
            "openFDA does not page beyond skip={}; narrow the search to see the remaining results",
            MAX_SKIP
        );
        return None;
    }
    Some(PageCursor::Offset(next))
}
