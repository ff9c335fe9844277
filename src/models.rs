//! Normalized record types
//!
//! These are the only data contract the crate exposes. Every record is an
//! immutable value with structural equality, built fresh from one page of a
//! source response. Serializing a record produces the source-native JSON
//! shape, so normalizing a serialized record yields an equal record.

use serde::{Serialize, Serializer};
use time::macros::format_description;
use time::{Date, Month};
use tracing::warn;

use crate::source::Source;
use crate::vocab::{
    ApplicationDocType, ApplicationKind, ClassType, MarketingStatus, OpenFdaProductType, OverallStatus,
    Relation, RelationSource, ReviewPriority, StudyPhase, SubmissionClassCode, SubmissionStatus,
    SubmissionType, TermType, TherapeuticEquivalenceCode,
};

/// A date as the source reported it, plus the calendar date when it parses
///
/// A malformed date never loses data: the raw string is always kept and
/// [`SourceDate::date`] is simply `None`.
///
/// # Example
///
/// ```
/// use regbot_client::SourceDate;
///
/// let parsed = SourceDate::from_compact("20170321");
/// assert_eq!(parsed.date().map(|d| d.year()), Some(2017));
///
/// let kept = SourceDate::from_compact("2017-03-21");
/// assert!(kept.date().is_none());
/// assert_eq!(kept.raw(), "2017-03-21");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceDate {
    raw: String,
    date: Option<Date>,
}

impl SourceDate {
    /// Strict `YYYYMMDD` (Drugs@FDA)
    pub fn from_compact(raw: &str) -> Self {
        let date = Date::parse(raw, format_description!("[year][month][day]")).ok();
        Self::with_parsed(raw, date)
    }

    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY` (ClinicalTrials.gov)
    ///
    /// Partial dates resolve to the first day of the month or year.
    pub fn from_partial_iso(raw: &str) -> Self {
        let date = Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .ok()
            .or_else(|| parse_year_month(raw));
        Self::with_parsed(raw, date)
    }

    fn with_parsed(raw: &str, date: Option<Date>) -> Self {
        if date.is_none() {
            warn!(raw_date = raw, "Unable to parse date; keeping raw value");
        }
        Self {
            raw: raw.to_string(),
            date,
        }
    }

    /// The string exactly as the source sent it
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> Option<Date> {
        self.date
    }

    pub fn is_parsed(&self) -> bool {
        self.date.is_some()
    }
}

impl Serialize for SourceDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// `YYYY-MM` or `YYYY`
fn parse_year_month(raw: &str) -> Option<Date> {
    let all_digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());

    let mut parts = raw.split('-');
    let year = parts.next().filter(|year| all_digits(year, 4))?;
    let month = match parts.next() {
        Some(month) if all_digits(month, 2) => Month::try_from(month.parse::<u8>().ok()?).ok()?,
        Some(_) => return None,
        None => Month::January,
    };
    if parts.next().is_some() {
        return None;
    }
    Date::from_calendar_date(year.parse().ok()?, month, 1).ok()
}

/// One regulatory application (NDA, ANDA or BLA) from Drugs@FDA
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugApplicationRecord {
    pub application_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_name: Option<String>,
    pub submissions: Vec<Submission>,
    pub products: Vec<Product>,
    pub openfda: OpenFdaCrossReference,
}

impl DrugApplicationRecord {
    pub fn application_kind(&self) -> Option<ApplicationKind> {
        ApplicationKind::from_application_number(&self.application_number)
    }

    /// Submissions that were the original approval (`ORIG`)
    pub fn original_submissions(&self) -> impl Iterator<Item = &Submission> {
        self.submissions
            .iter()
            .filter(|s| s.submission_type_kind() == Some(SubmissionType::Original))
    }
}

/// The `openfda` harmonization block attached to a Drugs@FDA result
///
/// Every field is a list that may be empty; none is ever absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenFdaCrossReference {
    pub application_number: Vec<String>,
    pub brand_name: Vec<String>,
    pub generic_name: Vec<String>,
    pub manufacturer_name: Vec<String>,
    pub product_ndc: Vec<String>,
    pub product_type: Vec<String>,
    pub route: Vec<String>,
    pub substance_name: Vec<String>,
    pub rxcui: Vec<String>,
    pub spl_id: Vec<String>,
    pub spl_set_id: Vec<String>,
    pub package_ndc: Vec<String>,
    pub nui: Vec<String>,
    pub pharm_class_epc: Vec<String>,
    pub pharm_class_cs: Vec<String>,
    pub pharm_class_moa: Vec<String>,
    pub pharm_class_pe: Vec<String>,
    pub unii: Vec<String>,
}

impl OpenFdaCrossReference {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Recognized product types, in source order
    pub fn product_type_kinds(&self) -> Vec<OpenFdaProductType> {
        self.product_type.iter().filter_map(|t| t.parse().ok()).collect()
    }
}

/// One regulatory filing event within an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_status_date: Option<SourceDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_class_code_description: Option<String>,
    pub application_docs: Vec<ApplicationDocument>,
}

impl Submission {
    pub fn submission_type_kind(&self) -> Option<SubmissionType> {
        self.submission_type.as_deref()?.parse().ok()
    }

    pub fn review_priority_kind(&self) -> Option<ReviewPriority> {
        self.review_priority.as_deref()?.parse().ok()
    }

    pub fn submission_status_kind(&self) -> Option<SubmissionStatus> {
        self.submission_status.as_deref()?.parse().ok()
    }

    pub fn submission_class_code_kind(&self) -> Option<SubmissionClassCode> {
        self.submission_class_code.as_deref()?.parse().ok()
    }
}

/// A document attached to a submission (letter, label, review...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Kept verbatim, even when malformed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<SourceDate>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl ApplicationDocument {
    /// The URL, if it is a well-formed absolute URL
    pub fn parsed_url(&self) -> Option<url::Url> {
        url::Url::parse(self.url.as_deref()?.trim()).ok()
    }

    pub fn doc_type_kind(&self) -> Option<ApplicationDocType> {
        self.doc_type.as_deref()?.parse().ok()
    }
}

/// One marketed formulation within an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_drug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub active_ingredients: Vec<ActiveIngredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_standard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_status: Option<String>,
    /// Therapeutic-equivalence code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub te_code: Option<String>,
}

impl Product {
    pub fn marketing_status_kind(&self) -> Option<MarketingStatus> {
        self.marketing_status.as_deref()?.parse().ok()
    }

    pub fn te_code_kind(&self) -> Option<TherapeuticEquivalenceCode> {
        self.te_code.as_deref()?.parse().ok()
    }

    /// `Yes`/`No` flag as a bool; `TBD` and unknown values give `None`
    pub fn is_reference_drug(&self) -> Option<bool> {
        yes_no(self.reference_drug.as_deref()?)
    }

    pub fn is_reference_standard(&self) -> Option<bool> {
        yes_no(self.reference_standard.as_deref()?)
    }
}

fn yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveIngredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

/// One study from ClinicalTrials.gov
///
/// Serializes to the nested `protocolSection` shape of the v2 API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalTrialRecord {
    pub nct_id: String,
    /// Brief title
    pub title: Option<String>,
    pub official_title: Option<String>,
    /// Overall recruitment status, e.g. `COMPLETED`
    pub status: Option<String>,
    pub last_known_status: Option<String>,
    pub why_stopped: Option<String>,
    pub has_expanded_access: Option<bool>,
    pub lead_sponsor: Option<String>,
    /// Agency class of the lead sponsor, e.g. `INDUSTRY`
    pub lead_sponsor_class: Option<String>,
    pub collaborators: Vec<String>,
    pub oversight: Oversight,
    pub brief_summary: Option<String>,
    pub detailed_description: Option<String>,
    pub conditions: Vec<String>,
    pub keywords: Vec<String>,
    /// MeSH terms ClinicalTrials.gov derived from the conditions
    pub mesh_conditions: Vec<MeshTerm>,
    pub interventions: Vec<Intervention>,
    pub study_type: Option<String>,
    /// The API lists every phase a study spans, e.g. `["PHASE1", "PHASE2"]`
    pub phases: Vec<String>,
    pub enrollment: Option<u64>,
    /// `ACTUAL` or `ESTIMATED`
    pub enrollment_type: Option<String>,
    pub eligibility: Eligibility,
    pub primary_outcomes: Vec<Outcome>,
    pub secondary_outcomes: Vec<Outcome>,
    pub references: Vec<StudyReference>,
    pub start_date: Option<SourceDate>,
    pub primary_completion_date: Option<SourceDate>,
    pub completion_date: Option<SourceDate>,
    pub study_first_submit_date: Option<SourceDate>,
    pub results_first_submit_date: Option<SourceDate>,
    pub last_update_submit_date: Option<SourceDate>,
}

impl ClinicalTrialRecord {
    pub fn overall_status(&self) -> Option<OverallStatus> {
        self.status.as_deref()?.parse().ok()
    }

    /// Recognized phases, in source order
    pub fn phase_kinds(&self) -> Vec<StudyPhase> {
        self.phases.iter().filter_map(|p| p.parse().ok()).collect()
    }

    /// MeSH descriptor ids of the derived conditions, e.g. `D046152`
    pub fn mesh_ids(&self) -> Vec<&str> {
        self.mesh_conditions
            .iter()
            .filter_map(|m| m.id.as_deref())
            .collect()
    }
}

/// Regulatory oversight flags of a study
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Oversight {
    /// Whether a data monitoring committee is appointed
    pub has_dmc: Option<bool>,
    pub is_fda_regulated_drug: Option<bool>,
    pub is_fda_regulated_device: Option<bool>,
}

impl Oversight {
    pub fn is_empty(&self) -> bool {
        self.has_dmc.is_none() && self.is_fda_regulated_drug.is_none() && self.is_fda_regulated_device.is_none()
    }
}

/// Who may enroll in a study
///
/// Ages are kept as the source phrases them, e.g. `18 Years`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    pub criteria: Option<String>,
    pub healthy_volunteers: Option<bool>,
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub maximum_age: Option<String>,
    /// Standard age groups: `CHILD`, `ADULT`, `OLDER_ADULT`
    pub std_ages: Vec<String>,
}

impl Eligibility {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A primary or secondary outcome measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub measure: Option<String>,
    pub description: Option<String>,
    pub time_frame: Option<String>,
}

/// A MeSH descriptor attached to a study
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTerm {
    pub id: Option<String>,
    pub term: Option<String>,
}

/// A publication cited by a study record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyReference {
    pub pmid: Option<String>,
    /// `BACKGROUND`, `RESULT` or `DERIVED`
    pub reference_type: Option<String>,
    pub citation: Option<String>,
}

/// An intervention arm descriptor of a study
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intervention {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "otherNames")]
    pub other_names: Vec<String>,
}

/// One RxClass drug classification and the concepts related to it
///
/// Serializes to the `rxclassDrugInfo` entry shape, with `minConcept` as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugClassRecord {
    pub class_id: String,
    pub class_name: Option<String>,
    /// e.g. `EPC`, `MOA`, `DISEASE`, `ATC1-4`
    pub class_type: Option<String>,
    pub class_url: Option<String>,
    /// e.g. `may_treat`, `has_epc`
    pub relation: Option<String>,
    pub relation_source: Option<String>,
    pub members: Vec<DrugConcept>,
}

impl DrugClassRecord {
    /// Related RxCUIs in source order
    pub fn rxcuis(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.rxcui.as_str()).collect()
    }

    pub fn relation_source_kind(&self) -> Option<RelationSource> {
        self.relation_source.as_deref()?.parse().ok()
    }

    pub fn class_type_kind(&self) -> Option<ClassType> {
        self.class_type.as_deref()?.parse().ok()
    }

    /// The relation; `has_VAclass` and `has_va_class` both map to [`Relation::HasVaClass`]
    pub fn relation_kind(&self) -> Option<Relation> {
        self.relation.as_deref()?.parse().ok()
    }
}

/// An RxNorm concept (`minConcept`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugConcept {
    pub rxcui: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "tty", skip_serializing_if = "Option::is_none")]
    pub term_type: Option<String>,
}

impl DrugConcept {
    pub fn term_type_kind(&self) -> Option<TermType> {
        self.term_type.as_deref()?.parse().ok()
    }
}

/// A normalized record from any source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NormalizedRecord {
    DrugApplication(DrugApplicationRecord),
    ClinicalTrial(ClinicalTrialRecord),
    DrugClass(DrugClassRecord),
}

impl NormalizedRecord {
    pub fn source(&self) -> Source {
        match self {
            NormalizedRecord::DrugApplication(_) => Source::DrugsFda,
            NormalizedRecord::ClinicalTrial(_) => Source::ClinicalTrials,
            NormalizedRecord::DrugClass(_) => Source::RxClass,
        }
    }

    /// The record's unique key within its source
    pub fn key(&self) -> &str {
        match self {
            NormalizedRecord::DrugApplication(record) => &record.application_number,
            NormalizedRecord::ClinicalTrial(record) => &record.nct_id,
            NormalizedRecord::DrugClass(record) => &record.class_id,
        }
    }

    pub fn as_drug_application(&self) -> Option<&DrugApplicationRecord> {
        match self {
            NormalizedRecord::DrugApplication(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_clinical_trial(&self) -> Option<&ClinicalTrialRecord> {
        match self {
            NormalizedRecord::ClinicalTrial(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_drug_class(&self) -> Option<&DrugClassRecord> {
        match self {
            NormalizedRecord::DrugClass(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_drug_application(self) -> Option<DrugApplicationRecord> {
        match self {
            NormalizedRecord::DrugApplication(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_clinical_trial(self) -> Option<ClinicalTrialRecord> {
        match self {
            NormalizedRecord::ClinicalTrial(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_drug_class(self) -> Option<DrugClassRecord> {
        match self {
            NormalizedRecord::DrugClass(record) => Some(record),
            _ => None,
        }
    }
}
