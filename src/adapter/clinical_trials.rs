use serde_json::Value;
use tracing::{debug, instrument};

use super::{send_request, unexpected_envelope, Page, SourceAdapter};
use crate::assembler::lenient::one_or_many;
use crate::error::Result;
use crate::query::{PageCursor, QueryBuilder, QueryParameters};
use crate::source::Source;
use crate::transport::Transport;

/// ClinicalTrials.gov v2 (`/studies`), continuation-token pagination
///
/// Each page carries `nextPageToken` until the last one.
#[derive(Debug, Clone)]
pub struct ClinicalTrialsAdapter<T> {
    transport: T,
    builder: QueryBuilder,
}

impl<T: Transport> ClinicalTrialsAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_builder(transport, QueryBuilder::new())
    }

    pub fn with_builder(transport: T, builder: QueryBuilder) -> Self {
        Self { transport, builder }
    }
}

impl<T: Transport> SourceAdapter for ClinicalTrialsAdapter<T> {
    fn source(&self) -> Source {
        Source::ClinicalTrials
    }

    fn query_builder(&self) -> &QueryBuilder {
        &self.builder
    }

    #[instrument(skip(self, params))]
    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        let request = self.builder.build_query(Source::ClinicalTrials, params, cursor)?;
        let response = send_request(&self.transport, &request)?;

        let Value::Object(mut envelope) = response else {
            return Err(unexpected_envelope(Source::ClinicalTrials, &response));
        };

        let records = one_or_many(envelope.remove("studies").unwrap_or(Value::Null));
        let next = envelope
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| PageCursor::Token(token.to_string()));

        let total = envelope.get("totalCount").and_then(Value::as_u64);
        debug!(
            records = records.len(),
            total = ?total,
            has_next = next.is_some(),
            "Fetched ClinicalTrials.gov page"
        );
        Ok(Page { records, next })
    }
}
