//! # regbot-client
//!
//! Fetch drug regulatory and clinical-research metadata from three public
//! APIs and normalize it into one set of strongly typed records:
//!
//! - **ClinicalTrials.gov v2**: studies, as [`ClinicalTrialRecord`]
//! - **openFDA Drugs@FDA**: applications with their submissions and products,
//!   as [`DrugApplicationRecord`]
//! - **NLM RxClass**: drug classes and their member concepts, as [`DrugClassRecord`]
//!
//! ## Layers
//!
//! - [`QueryBuilder`] validates [`QueryParameters`] and resolves them into a
//!   [`RequestDescriptor`] without doing any I/O.
//! - A [`SourceAdapter`] performs one request per page through a
//!   [`Transport`] and interprets the source's pagination.
//! - [`RecordAssembler`] maps one raw JSON record into its record type,
//!   defaulting whatever the source left out.
//! - [`PaginatedFetcher`] yields records lazily as an [`Iterator`].
//!
//! [`RegulatoryClient`] bundles all of it over the blocking [`HttpTransport`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use regbot_client::{QueryParameters, RegulatoryClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegulatoryClient::new()?;
//!
//!     let params = QueryParameters::new().with("intervention", "imatinib");
//!     for study in client.clinical_trials(&params, Some(20))? {
//!         let study = study?;
//!         println!("{}: {}", study.nct_id, study.title.unwrap_or_default());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without the network
//!
//! Every layer takes its transport as a parameter, so recorded responses can
//! stand in for the live APIs:
//!
//! ```
//! use regbot_client::{
//!     DrugsFdaAdapter, PaginatedFetcher, QueryParameters, RequestDescriptor, Transport,
//!     TransportError,
//! };
//! use serde_json::{json, Value};
//!
//! struct Recorded;
//!
//! impl Transport for Recorded {
//!     fn send(&self, _request: &RequestDescriptor) -> Result<Value, TransportError> {
//!         Ok(json!({
//!             "meta": {"results": {"skip": 0, "limit": 100, "total": 1}},
//!             "results": [{"application_number": "NDA207145", "sponsor_name": "MDD US"}]
//!         }))
//!     }
//! }
//!
//! let fetcher = PaginatedFetcher::new(DrugsFdaAdapter::new(Recorded));
//! let params = QueryParameters::new().with("brand_name", "XADAGO");
//! let records = fetcher.fetch(&params, None)?.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(records.len(), 1);
//! # Ok::<(), regbot_client::RegbotError>(())
//! ```

pub mod adapter;
pub mod assembler;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ids;
pub mod models;
pub mod query;
pub mod rate_limit;
pub mod retry;
pub mod source;
pub mod transport;
pub mod vocab;

// Re-export main types for convenience
pub use adapter::{Adapter, ClinicalTrialsAdapter, DrugsFdaAdapter, Page, RxClassAdapter, SourceAdapter};
pub use assembler::RecordAssembler;
pub use client::RegulatoryClient;
pub use config::ClientConfig;
pub use error::{RegbotError, Result};
pub use fetcher::{PaginatedFetcher, Records};
pub use models::{
    ActiveIngredient, ApplicationDocument, ClinicalTrialRecord, DrugApplicationRecord, DrugClassRecord,
    DrugConcept, Eligibility, Intervention, MeshTerm, NormalizedRecord, OpenFdaCrossReference, Outcome,
    Oversight, Product, SourceDate, StudyReference, Submission,
};
pub use query::{PageCursor, QueryBuilder, QueryParameters, RequestDescriptor};
pub use rate_limit::RateLimiter;
pub use retry::{RetryConfig, RetryableError};
pub use source::Source;
pub use transport::{HttpTransport, Transport, TransportError};
