//! RxClass drug-info entry → [`DrugClassRecord`]
//!
//! The adapter hands over one entry per class with every related concept
//! merged into `minConcept`, so a record is read from
//!
//! ```json
//! {
//!   "minConcept": [{"rxcui": "282388", "name": "imatinib", "tty": "IN"}],
//!   "rxclassMinConceptItem": {"classId": "N0000175605", "className": "...", "classType": "EPC"},
//!   "rela": "has_epc",
//!   "relaSource": "FDASPL"
//! }
//! ```

use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use super::lenient;
use crate::models::{DrugClassRecord, DrugConcept};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawDrugInfo {
    #[serde(default, deserialize_with = "lenient::element_list")]
    min_concept: Vec<RawMinConcept>,
    #[serde(default, deserialize_with = "lenient::object")]
    rxclass_min_concept_item: RawClassItem,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    rela: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    rela_source: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassItem {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    class_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    class_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    class_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawMinConcept {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    rxcui: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    tty: Option<String>,
}

impl RawDrugInfo {
    pub(super) fn class_id(&self) -> Option<&str> {
        self.rxclass_min_concept_item.class_id.as_deref()
    }

    /// Build the record; `class_id` has already been checked by the caller
    pub(super) fn into_record(self, class_id: String) -> DrugClassRecord {
        let members = self
            .min_concept
            .into_iter()
            .filter_map(|concept| match concept.rxcui {
                Some(rxcui) if !rxcui.trim().is_empty() => Some(DrugConcept {
                    rxcui,
                    name: concept.name,
                    term_type: concept.tty,
                }),
                _ => {
                    warn!(class_id = %class_id, "Skipping class member without an RxCUI");
                    None
                }
            })
            .collect();

        DrugClassRecord {
            class_id,
            class_name: self.rxclass_min_concept_item.class_name,
            class_type: self.rxclass_min_concept_item.class_type,
            class_url: self.rxclass_min_concept_item.class_url,
            relation: self.rela,
            relation_source: self.rela_source,
            members,
        }
    }
}

impl From<&DrugClassRecord> for RawDrugInfo {
    fn from(record: &DrugClassRecord) -> Self {
        RawDrugInfo {
            min_concept: record
                .members
                .iter()
                .map(|member| RawMinConcept {
                    rxcui: Some(member.rxcui.clone()),
                    name: member.name.clone(),
                    tty: member.term_type.clone(),
                })
                .collect(),
            rxclass_min_concept_item: RawClassItem {
                class_id: Some(record.class_id.clone()),
                class_name: record.class_name.clone(),
                class_type: record.class_type.clone(),
                class_url: record.class_url.clone(),
            },
            rela: record.relation.clone(),
            rela_source: record.relation_source.clone(),
        }
    }
}

impl Serialize for DrugClassRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawDrugInfo::from(self).serialize(serializer)
    }
}
