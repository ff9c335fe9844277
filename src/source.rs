//! The three upstream APIs this crate talks to

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the regulatory / clinical-research APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// ClinicalTrials.gov v2 study search
    ClinicalTrials,
    /// openFDA Drugs@FDA endpoint
    DrugsFda,
    /// NLM RxClass drug classification
    RxClass,
}

impl Source {
    /// All sources, in a stable order
    pub const ALL: [Source; 3] = [Source::ClinicalTrials, Source::DrugsFda, Source::RxClass];

    /// Query keys this source accepts
    ///
    /// Anything outside this set is rejected by the query builder with
    /// `RegbotError::UnsupportedParameter`.
    pub fn recognized_parameters(&self) -> &'static [&'static str] {
        match self {
            Source::ClinicalTrials => &["condition", "intervention", "nct_id", "sponsor", "status"],
            Source::DrugsFda => &[
                "application_number",
                "brand_name",
                "generic_name",
                "sponsor_name",
                "ndc",
            ],
            Source::RxClass => &["class_id", "rxcui", "relation_source", "drug_name", "relation"],
        }
    }

    /// Whether `key` is a recognized query key for this source
    pub fn recognizes(&self, key: &str) -> bool {
        self.recognized_parameters().contains(&key)
    }

    /// Default public base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Source::ClinicalTrials => "https://clinicaltrials.gov/api/v2",
            Source::DrugsFda => "https://api.fda.gov",
            Source::RxClass => "https://rxnav.nlm.nih.gov/REST/rxclass",
        }
    }

    /// Default number of records requested per page
    ///
    /// RxClass is unpaginated and reports `None`.
    pub fn default_page_size(&self) -> Option<usize> {
        match self {
            Source::ClinicalTrials => Some(50),
            Source::DrugsFda => Some(100),
            Source::RxClass => None,
        }
    }

    /// Largest page size the source accepts
    pub fn max_page_size(&self) -> Option<usize> {
        match self {
            Source::ClinicalTrials => Some(1000),
            Source::DrugsFda => Some(1000),
            Source::RxClass => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::ClinicalTrials => "ClinicalTrials.gov",
            Source::DrugsFda => "Drugs@FDA",
            Source::RxClass => "RxClass",
        };
        f.write_str(name)
    }
}
