//! Lazy pagination over a [`SourceAdapter`]
//!
//! [`Records`] is a plain [`Iterator`]: each `next()` either hands out a
//! buffered record or fetches the following page. Nothing is fetched before
//! the first `next()` call and abandoning the iterator stops all work.

use std::collections::{HashSet, VecDeque};
use std::mem;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapter::SourceAdapter;
use crate::assembler::RecordAssembler;
use crate::error::{RegbotError, Result};
use crate::models::NormalizedRecord;
use crate::query::{PageCursor, QueryParameters};
use crate::retry::RetryableError;

/// Consecutive transient failures on one page before the sequence ends
pub const DEFAULT_MAX_TRANSIENT_FAILURES: u32 = 3;

/// Drives an adapter page by page
///
/// # Example
///
/// ```no_run
/// use regbot_client::{ClientConfig, DrugsFdaAdapter, HttpTransport, PaginatedFetcher, QueryParameters};
///
/// let transport = HttpTransport::new(ClientConfig::from_env())?;
/// let fetcher = PaginatedFetcher::new(DrugsFdaAdapter::new(transport));
///
/// let params = QueryParameters::new().with("generic_name", "imatinib");
/// for record in fetcher.fetch(&params, Some(25))? {
///     let record = record?;
///     println!("{}", record.key());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PaginatedFetcher<A> {
    adapter: A,
    max_transient_failures: u32,
}

impl<A: SourceAdapter> PaginatedFetcher<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            max_transient_failures: DEFAULT_MAX_TRANSIENT_FAILURES,
        }
    }

    /// End the sequence after `max` consecutive transient failures on the same page
    ///
    /// Values below 1 are treated as 1: the first failure is still yielded.
    pub fn with_max_transient_failures(mut self, max: u32) -> Self {
        self.max_transient_failures = max.max(1);
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Lazily fetch up to `max_records` records (`None` for all of them)
    ///
    /// `params` are validated here, so `UnsupportedParameter` and
    /// `InvalidParameters` are returned before any request is made.
    pub fn fetch(&self, params: &QueryParameters, max_records: Option<usize>) -> Result<Records<&A>> {
        Records::start(&self.adapter, params, max_records, self.max_transient_failures)
    }

    /// Like [`fetch`](Self::fetch), handing the adapter to the iterator
    pub fn into_records(self, params: &QueryParameters, max_records: Option<usize>) -> Result<Records<A>> {
        Records::start(self.adapter, params, max_records, self.max_transient_failures)
    }
}

enum FetchState {
    /// The next call requests the page at `cursor`
    Pending { cursor: Option<PageCursor> },
    /// Records of the current page not yet handed out
    Buffered {
        records: VecDeque<Value>,
        next: Option<PageCursor>,
    },
    Done,
}

/// Iterator over normalized records, fetching pages on demand
///
/// * A `TransientSourceError` is yielded without ending the sequence: the
///   next call retries the same page. After too many consecutive failures
///   on one page the error is yielded and the sequence ends.
/// * Any other error is yielded once and ends the sequence.
/// * A cursor that was already requested, or an offset that does not move
///   forward, ends the sequence with `PaginationLoopDetected`.
/// * Raw records that cannot be normalized at all are skipped with a warning.
pub struct Records<A> {
    adapter: A,
    params: QueryParameters,
    max_records: Option<usize>,
    yielded: usize,
    transient_failures: u32,
    max_transient_failures: u32,
    requested: HashSet<PageCursor>,
    state: FetchState,
}

impl<A: SourceAdapter> Records<A> {
    fn start(
        adapter: A,
        params: &QueryParameters,
        max_records: Option<usize>,
        max_transient_failures: u32,
    ) -> Result<Self> {
        adapter.validate(params)?;
        debug!(source = %adapter.source(), ?max_records, "Starting paginated fetch");

        Ok(Self {
            adapter,
            params: params.clone(),
            max_records,
            yielded: 0,
            transient_failures: 0,
            max_transient_failures,
            requested: HashSet::new(),
            state: FetchState::Pending { cursor: None },
        })
    }

    /// Number of records handed out so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, FetchState::Done)
    }

    fn limit_reached(&self) -> bool {
        self.max_records.is_some_and(|max| self.yielded >= max)
    }

    /// Fetch the page at `cursor` and decide what comes after it
    fn load_page(&mut self, cursor: Option<PageCursor>) -> Option<Result<NormalizedRecord>> {
        let source = self.adapter.source();

        let page = match self.adapter.fetch_page(&self.params, cursor.as_ref()) {
            Ok(page) => {
                self.transient_failures = 0;
                page
            }
            Err(err) if err.is_retryable() => {
                self.transient_failures += 1;
                if self.transient_failures >= self.max_transient_failures {
                    warn!(
                        source = %source,
                        error = %err,
                        failures = self.transient_failures,
                        "Page fetch keeps failing; giving up"
                    );
                    self.state = FetchState::Done;
                } else {
                    warn!(source = %source, error = %err, "Page fetch failed; the next call retries it");
                    self.state = FetchState::Pending { cursor };
                }
                return Some(Err(err));
            }
            Err(err) => {
                self.state = FetchState::Done;
                return Some(Err(err));
            }
        };

        if let Some(next) = &page.next {
            if self.is_loop(cursor.as_ref(), next) {
                warn!(source = %source, cursor = %next, "Source returned a cursor it already served");
                self.state = FetchState::Done;
                return Some(Err(RegbotError::PaginationLoopDetected {
                    api: source,
                    cursor: next.to_string(),
                }));
            }
            if page.records.is_empty() {
                warn!(source = %source, cursor = %next, "Empty page with a continuation cursor; stopping");
                self.state = FetchState::Done;
                return None;
            }
        }

        if let Some(cursor) = cursor {
            self.requested.insert(cursor);
        }
        debug!(source = %source, records = page.records.len(), last = page.is_last(), "Loaded page");

        self.state = FetchState::Buffered {
            records: page.records.into(),
            next: page.next,
        };
        None
    }

    fn is_loop(&self, current: Option<&PageCursor>, next: &PageCursor) -> bool {
        if current == Some(next) || self.requested.contains(next) {
            return true;
        }
        match (current, next) {
            (Some(PageCursor::Offset(current)), PageCursor::Offset(next)) => next <= current,
            (None, PageCursor::Offset(next)) => *next == 0,
            _ => false,
        }
    }
}

impl<A: SourceAdapter> Iterator for Records<A> {
    type Item = Result<NormalizedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.limit_reached() && !self.is_done() {
                info!(source = %self.adapter.source(), records = self.yielded, "Reached max_records");
                self.state = FetchState::Done;
            }

            match mem::replace(&mut self.state, FetchState::Done) {
                FetchState::Done => return None,
                FetchState::Pending { cursor } => {
                    if let Some(result) = self.load_page(cursor) {
                        return Some(result);
                    }
                }
                FetchState::Buffered { mut records, next } => {
                    let Some(raw) = records.pop_front() else {
                        match next {
                            Some(cursor) => self.state = FetchState::Pending { cursor: Some(cursor) },
                            None => {
                                info!(source = %self.adapter.source(), records = self.yielded, "Source exhausted");
                            }
                        }
                        continue;
                    };

                    self.state = FetchState::Buffered { records, next };
                    match RecordAssembler::normalize(self.adapter.source(), &raw) {
                        Ok(record) => {
                            self.yielded += 1;
                            return Some(Ok(record));
                        }
                        Err(err) => warn!(error = %err, "Skipping record"),
                    }
                }
            }
        }
    }
}
