//! Record normalization
//!
//! [`RecordAssembler`] turns one raw JSON record into a normalized record. It
//! is total for structurally plausible input: missing optional fields become
//! `None` or empty lists, repeatable fields are always lists, dates keep their
//! raw text when they do not parse, and unknown fields are ignored. The only
//! failure is a value that is not a record at all (not an object, or without
//! the record's key).

mod clinical_trials;
mod drugsfda;
pub(crate) mod lenient;
mod rxclass;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{RegbotError, Result};
use crate::models::{ClinicalTrialRecord, DrugApplicationRecord, DrugClassRecord, NormalizedRecord};
use crate::source::Source;

use self::clinical_trials::RawStudy;
use self::drugsfda::RawApplication;
use self::rxclass::RawDrugInfo;

/// Stateless mapper from source JSON to normalized records
///
/// # Example
///
/// ```
/// use regbot_client::{RecordAssembler, Source};
/// use serde_json::json;
///
/// let raw = json!({
///     "application_number": "NDA207145",
///     "sponsor_name": "MDD US",
///     "openfda": {"brand_name": "XADAGO"}
/// });
/// let record = RecordAssembler::normalize_drug_application(&raw).unwrap();
/// assert_eq!(record.sponsor_name.as_deref(), Some("MDD US"));
/// assert_eq!(record.openfda.brand_name, vec!["XADAGO"]);
/// assert!(record.products.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAssembler;

impl RecordAssembler {
    /// Normalize one raw record from `source`
    pub fn normalize(source: Source, raw: &Value) -> Result<NormalizedRecord> {
        match source {
            Source::DrugsFda => Self::normalize_drug_application(raw).map(NormalizedRecord::DrugApplication),
            Source::ClinicalTrials => Self::normalize_clinical_trial(raw).map(NormalizedRecord::ClinicalTrial),
            Source::RxClass => Self::normalize_drug_class(raw).map(NormalizedRecord::DrugClass),
        }
    }

    /// Normalize one element of an openFDA Drugs@FDA `results` array
    #[instrument(level = "trace", skip(raw))]
    pub fn normalize_drug_application(raw: &Value) -> Result<DrugApplicationRecord> {
        let source = Source::DrugsFda;
        let parsed: RawApplication = read_object(source, raw)?;
        let number = required_key(source, parsed.application_number.clone(), "application_number")?;
        debug!(application_number = %number, "Normalized Drugs@FDA application");
        Ok(parsed.into_record(number))
    }

    /// Normalize one element of a ClinicalTrials.gov `studies` array
    #[instrument(level = "trace", skip(raw))]
    pub fn normalize_clinical_trial(raw: &Value) -> Result<ClinicalTrialRecord> {
        let source = Source::ClinicalTrials;
        let parsed: RawStudy = read_object(source, raw)?;
        let nct_id = required_key(
            source,
            parsed.nct_id().map(str::to_string),
            "protocolSection.identificationModule.nctId",
        )?;
        debug!(nct_id = %nct_id, "Normalized study");
        Ok(parsed.into_record(nct_id))
    }

    /// Normalize one RxClass drug-info entry
    #[instrument(level = "trace", skip(raw))]
    pub fn normalize_drug_class(raw: &Value) -> Result<DrugClassRecord> {
        let source = Source::RxClass;
        let parsed: RawDrugInfo = read_object(source, raw)?;
        let class_id = required_key(
            source,
            parsed.class_id().map(str::to_string),
            "rxclassMinConceptItem.classId",
        )?;
        debug!(class_id = %class_id, "Normalized drug class");
        Ok(parsed.into_record(class_id))
    }
}

fn read_object<T: DeserializeOwned>(source: Source, raw: &Value) -> Result<T> {
    if !raw.is_object() {
        return Err(RegbotError::MalformedRecord {
            api: source,
            reason: format!("expected a JSON object, found {}", json_kind(raw)),
        });
    }
    serde_json::from_value(raw.clone()).map_err(|e| RegbotError::MalformedRecord {
        api: source,
        reason: e.to_string(),
    })
}

fn required_key(source: Source, value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RegbotError::MalformedRecord {
            api: source,
            reason: format!("missing required key '{key}'"),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
