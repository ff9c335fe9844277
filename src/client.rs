//! One entry point over all three sources

use tracing::instrument;

use crate::adapter::{Adapter, Page, SourceAdapter};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::fetcher::{PaginatedFetcher, Records};
use crate::models::{ClinicalTrialRecord, DrugApplicationRecord, DrugClassRecord, NormalizedRecord};
use crate::query::{PageCursor, QueryBuilder, QueryParameters};
use crate::source::Source;
use crate::transport::{HttpTransport, Transport, TransportError};

/// Client for ClinicalTrials.gov, Drugs@FDA and RxClass sharing one transport
///
/// # Example
///
/// ```no_run
/// use regbot_client::{QueryParameters, RegulatoryClient};
///
/// let client = RegulatoryClient::new()?;
/// let params = QueryParameters::new().with("application_number", "NDA207145");
///
/// for application in client.drug_applications(&params, None)? {
///     let application = application?;
///     println!("{} by {:?}", application.application_number, application.sponsor_name);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RegulatoryClient<T> {
    transport: T,
    builder: QueryBuilder,
}

impl RegulatoryClient<HttpTransport> {
    /// Client over HTTP with the default configuration and `OPENFDA_API_KEY` from the environment
    pub fn new() -> std::result::Result<Self, TransportError> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Client over HTTP with a custom configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use regbot_client::{ClientConfig, RegulatoryClient, Source};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_rate_limit(4.0)
    ///     .with_page_size(Source::ClinicalTrials, 100);
    /// let client = RegulatoryClient::with_config(config)?;
    /// # Ok::<(), regbot_client::TransportError>(())
    /// ```
    pub fn with_config(config: ClientConfig) -> std::result::Result<Self, TransportError> {
        let builder = QueryBuilder::from_config(&config);
        let transport = HttpTransport::new(config)?;
        Ok(Self { transport, builder })
    }
}

impl<T: Transport> RegulatoryClient<T> {
    /// Client over any transport, with default page sizes
    pub fn with_transport(transport: T) -> Self {
        Self::with_transport_and_builder(transport, QueryBuilder::new())
    }

    pub fn with_transport_and_builder(transport: T, builder: QueryBuilder) -> Self {
        Self { transport, builder }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The adapter for `source`, borrowing this client's transport
    pub fn adapter(&self, source: Source) -> Adapter<&T> {
        Adapter::for_source(source, &self.transport, self.builder.clone())
    }

    /// Lazily fetch normalized records from `source`
    ///
    /// # Errors
    ///
    /// Parameter errors are returned here, before any request is made.
    /// Fetch errors are yielded by the iterator.
    #[instrument(skip(self, params))]
    pub fn fetch(
        &self,
        source: Source,
        params: &QueryParameters,
        max_records: Option<usize>,
    ) -> Result<Records<Adapter<&T>>> {
        PaginatedFetcher::new(self.adapter(source)).into_records(params, max_records)
    }

    /// Fetch a single page of raw records
    pub fn fetch_page(&self, source: Source, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        self.adapter(source).fetch_page(params, cursor)
    }

    /// Drugs@FDA applications matching `params`
    pub fn drug_applications<'a>(
        &'a self,
        params: &QueryParameters,
        max_records: Option<usize>,
    ) -> Result<impl Iterator<Item = Result<DrugApplicationRecord>> + use<'a, T>> {
        let records = self.fetch(Source::DrugsFda, params, max_records)?;
        Ok(records.filter_map(|record| record.map(NormalizedRecord::into_drug_application).transpose()))
    }

    /// ClinicalTrials.gov studies matching `params`
    pub fn clinical_trials<'a>(
        &'a self,
        params: &QueryParameters,
        max_records: Option<usize>,
    ) -> Result<impl Iterator<Item = Result<ClinicalTrialRecord>> + use<'a, T>> {
        let records = self.fetch(Source::ClinicalTrials, params, max_records)?;
        Ok(records.filter_map(|record| record.map(NormalizedRecord::into_clinical_trial).transpose()))
    }

    /// RxClass classes matching `params`
    pub fn drug_classes<'a>(
        &'a self,
        params: &QueryParameters,
    ) -> Result<impl Iterator<Item = Result<DrugClassRecord>> + use<'a, T>> {
        let records = self.fetch(Source::RxClass, params, None)?;
        Ok(records.filter_map(|record| record.map(NormalizedRecord::into_drug_class).transpose()))
    }
}
