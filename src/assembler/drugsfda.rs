//! Drugs@FDA result → [`DrugApplicationRecord`]
//!
//! The raw structs mirror one element of the openFDA `results` array. Field
//! names match the API, so the derived `Serialize` on the record types
//! produces JSON these structs read back unchanged.

use serde::Deserialize;

use super::lenient;
use crate::models::{
    ActiveIngredient, ApplicationDocument, DrugApplicationRecord, OpenFdaCrossReference, Product,
    SourceDate, Submission,
};

#[derive(Debug, Deserialize)]
pub(super) struct RawApplication {
    #[serde(default, deserialize_with = "lenient::string")]
    pub application_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    sponsor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::element_list")]
    submissions: Vec<RawSubmission>,
    #[serde(default, deserialize_with = "lenient::element_list")]
    products: Vec<RawProduct>,
    #[serde(default, deserialize_with = "lenient::object")]
    openfda: RawOpenFda,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    #[serde(default, deserialize_with = "lenient::string")]
    submission_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    submission_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    submission_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    submission_status_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    review_priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    submission_class_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    submission_class_code_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::element_list")]
    application_docs: Vec<RawApplicationDoc>,
}

#[derive(Debug, Deserialize)]
struct RawApplicationDoc {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    date: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    doc_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default, deserialize_with = "lenient::string")]
    product_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    reference_drug: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    brand_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::element_list")]
    active_ingredients: Vec<RawActiveIngredient>,
    #[serde(default, deserialize_with = "lenient::string")]
    reference_standard: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    dosage_form: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    route: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    marketing_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    te_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawActiveIngredient {
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    strength: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOpenFda {
    #[serde(default, deserialize_with = "lenient::string_list")]
    application_number: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    brand_name: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    generic_name: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    manufacturer_name: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    product_ndc: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    product_type: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    route: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    substance_name: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    rxcui: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    spl_id: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    spl_set_id: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    package_ndc: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    nui: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pharm_class_epc: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pharm_class_cs: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pharm_class_moa: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pharm_class_pe: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    unii: Vec<String>,
}

impl RawApplication {
    /// Build the record; `application_number` has already been checked by the caller
    pub(super) fn into_record(self, application_number: String) -> DrugApplicationRecord {
        DrugApplicationRecord {
            application_number,
            sponsor_name: self.sponsor_name,
            submissions: self.submissions.into_iter().map(Submission::from).collect(),
            products: self.products.into_iter().map(Product::from).collect(),
            openfda: self.openfda.into(),
        }
    }
}

impl From<RawSubmission> for Submission {
    fn from(raw: RawSubmission) -> Self {
        Submission {
            submission_type: raw.submission_type,
            submission_number: raw.submission_number,
            submission_status: raw.submission_status,
            submission_status_date: raw.submission_status_date.as_deref().map(SourceDate::from_compact),
            review_priority: raw.review_priority,
            submission_class_code: raw.submission_class_code,
            submission_class_code_description: raw.submission_class_code_description,
            application_docs: raw
                .application_docs
                .into_iter()
                .map(|doc| ApplicationDocument {
                    id: doc.id,
                    url: doc.url,
                    date: doc.date.as_deref().map(SourceDate::from_compact),
                    doc_type: doc.doc_type,
                })
                .collect(),
        }
    }
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            product_number: raw.product_number,
            reference_drug: raw.reference_drug,
            brand_name: raw.brand_name,
            active_ingredients: raw
                .active_ingredients
                .into_iter()
                .map(|ingredient| ActiveIngredient {
                    name: ingredient.name,
                    strength: ingredient.strength,
                })
                .collect(),
            reference_standard: raw.reference_standard,
            dosage_form: raw.dosage_form,
            route: raw.route,
            marketing_status: raw.marketing_status,
            te_code: raw.te_code,
        }
    }
}

impl From<RawOpenFda> for OpenFdaCrossReference {
    fn from(raw: RawOpenFda) -> Self {
        OpenFdaCrossReference {
            application_number: raw.application_number,
            brand_name: raw.brand_name,
            generic_name: raw.generic_name,
            manufacturer_name: raw.manufacturer_name,
            product_ndc: raw.product_ndc,
            product_type: raw.product_type,
            route: raw.route,
            substance_name: raw.substance_name,
            rxcui: raw.rxcui,
            spl_id: raw.spl_id,
            spl_set_id: raw.spl_set_id,
            package_ndc: raw.package_ndc,
            nui: raw.nui,
            pharm_class_epc: raw.pharm_class_epc,
            pharm_class_cs: raw.pharm_class_cs,
            pharm_class_moa: raw.pharm_class_moa,
            pharm_class_pe: raw.pharm_class_pe,
            unii: raw.unii,
        }
    }
}
