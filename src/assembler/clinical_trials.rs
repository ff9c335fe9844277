//! ClinicalTrials.gov v2 study → [`ClinicalTrialRecord`]
//!
//! Only the `protocolSection` modules and the `derivedSection` condition
//! browse module the record uses are modelled. The same structs serialize a
//! record back into that nested shape.

use serde::{Deserialize, Serialize, Serializer};

use super::lenient;
use crate::models::{
    ClinicalTrialRecord, Eligibility, Intervention, MeshTerm, Outcome, Oversight, SourceDate, StudyReference,
};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawStudy {
    #[serde(default, deserialize_with = "lenient::object")]
    protocol_section: ProtocolSection,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "DerivedSection::is_empty")]
    derived_section: DerivedSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProtocolSection {
    #[serde(default, deserialize_with = "lenient::object")]
    identification_module: IdentificationModule,
    #[serde(default, deserialize_with = "lenient::object")]
    status_module: StatusModule,
    #[serde(default, deserialize_with = "lenient::object")]
    sponsor_collaborators_module: SponsorCollaboratorsModule,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "OversightModule::is_empty")]
    oversight_module: OversightModule,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "DescriptionModule::is_empty")]
    description_module: DescriptionModule,
    #[serde(default, deserialize_with = "lenient::object")]
    conditions_module: ConditionsModule,
    #[serde(default, deserialize_with = "lenient::object")]
    design_module: DesignModule,
    #[serde(default, deserialize_with = "lenient::object")]
    arms_interventions_module: ArmsInterventionsModule,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "OutcomesModule::is_empty")]
    outcomes_module: OutcomesModule,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "EligibilityModule::is_empty")]
    eligibility_module: EligibilityModule,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "ReferencesModule::is_empty")]
    references_module: ReferencesModule,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentificationModule {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    nct_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    brief_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    official_title: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusModule {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    overall_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    last_known_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    why_stopped: Option<String>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "ExpandedAccessInfo::is_empty")]
    expanded_access_info: ExpandedAccessInfo,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "DateStruct::is_empty")]
    start_date_struct: DateStruct,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "DateStruct::is_empty")]
    primary_completion_date_struct: DateStruct,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "DateStruct::is_empty")]
    completion_date_struct: DateStruct,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    study_first_submit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    results_first_submit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    last_update_submit_date: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpandedAccessInfo {
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    has_expanded_access: Option<bool>,
}

impl ExpandedAccessInfo {
    fn is_empty(&self) -> bool {
        self.has_expanded_access.is_none()
    }
}

/// `{"date": "2008-10", "type": "ACTUAL"}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct DateStruct {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

impl DateStruct {
    fn is_empty(&self) -> bool {
        self.date.is_none()
    }

    fn from_date(date: &Option<SourceDate>) -> Self {
        Self {
            date: raw_date(date),
        }
    }

    fn into_date(self) -> Option<SourceDate> {
        partial_date(self.date)
    }
}

fn raw_date(date: &Option<SourceDate>) -> Option<String> {
    date.as_ref().map(|d| d.raw().to_string())
}

fn partial_date(raw: Option<String>) -> Option<SourceDate> {
    raw.as_deref().map(SourceDate::from_partial_iso)
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SponsorCollaboratorsModule {
    #[serde(default, deserialize_with = "lenient::object")]
    lead_sponsor: Agency,
    #[serde(default, deserialize_with = "lenient::element_list", skip_serializing_if = "Vec::is_empty")]
    collaborators: Vec<Agency>,
}

/// A lead sponsor or collaborator
#[derive(Debug, Default, Serialize, Deserialize)]
struct Agency {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    class: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OversightModule {
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    oversight_has_dmc: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    is_fda_regulated_drug: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    is_fda_regulated_device: Option<bool>,
}

impl OversightModule {
    fn is_empty(&self) -> bool {
        self.oversight_has_dmc.is_none() && self.is_fda_regulated_drug.is_none() && self.is_fda_regulated_device.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionModule {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    brief_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    detailed_description: Option<String>,
}

impl DescriptionModule {
    fn is_empty(&self) -> bool {
        self.brief_summary.is_none() && self.detailed_description.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConditionsModule {
    #[serde(default, deserialize_with = "lenient::string_list")]
    conditions: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    keywords: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignModule {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    study_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    phases: Vec<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    enrollment_info: EnrollmentInfo,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EnrollmentInfo {
    #[serde(default, deserialize_with = "lenient::unsigned", skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    enrollment_type: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ArmsInterventionsModule {
    #[serde(default, deserialize_with = "lenient::element_list")]
    interventions: Vec<RawIntervention>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIntervention {
    #[serde(rename = "type", default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    intervention_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    other_names: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomesModule {
    #[serde(default, deserialize_with = "lenient::element_list", skip_serializing_if = "Vec::is_empty")]
    primary_outcomes: Vec<RawOutcome>,
    #[serde(default, deserialize_with = "lenient::element_list", skip_serializing_if = "Vec::is_empty")]
    secondary_outcomes: Vec<RawOutcome>,
}

impl OutcomesModule {
    fn is_empty(&self) -> bool {
        self.primary_outcomes.is_empty() && self.secondary_outcomes.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutcome {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    measure: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    time_frame: Option<String>,
}

impl From<RawOutcome> for Outcome {
    fn from(raw: RawOutcome) -> Self {
        Outcome {
            measure: raw.measure,
            description: raw.description,
            time_frame: raw.time_frame,
        }
    }
}

impl From<&Outcome> for RawOutcome {
    fn from(outcome: &Outcome) -> Self {
        RawOutcome {
            measure: outcome.measure.clone(),
            description: outcome.description.clone(),
            time_frame: outcome.time_frame.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EligibilityModule {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    eligibility_criteria: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    healthy_volunteers: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    sex: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    minimum_age: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    maximum_age: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list", skip_serializing_if = "Vec::is_empty")]
    std_ages: Vec<String>,
}

impl EligibilityModule {
    fn is_empty(&self) -> bool {
        self.eligibility_criteria.is_none()
            && self.healthy_volunteers.is_none()
            && self.sex.is_none()
            && self.minimum_age.is_none()
            && self.maximum_age.is_none()
            && self.std_ages.is_empty()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReferencesModule {
    #[serde(default, deserialize_with = "lenient::element_list")]
    references: Vec<RawReference>,
}

impl ReferencesModule {
    fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawReference {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pmid: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    reference_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    citation: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DerivedSection {
    #[serde(default, deserialize_with = "lenient::object")]
    condition_browse_module: ConditionBrowseModule,
}

impl DerivedSection {
    fn is_empty(&self) -> bool {
        self.condition_browse_module.meshes.is_empty()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConditionBrowseModule {
    #[serde(default, deserialize_with = "lenient::element_list")]
    meshes: Vec<RawMesh>,
}

/// `{"id": "D046152", "term": "Gastrointestinal Stromal Tumors"}`
#[derive(Debug, Serialize, Deserialize)]
struct RawMesh {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    term: Option<String>,
}

impl RawStudy {
    pub(super) fn nct_id(&self) -> Option<&str> {
        self.protocol_section.identification_module.nct_id.as_deref()
    }

    /// Build the record; `nct_id` has already been checked by the caller
    pub(super) fn into_record(self, nct_id: String) -> ClinicalTrialRecord {
        let protocol = self.protocol_section;
        let status = protocol.status_module;
        let sponsors = protocol.sponsor_collaborators_module;
        let oversight = protocol.oversight_module;
        let design = protocol.design_module;
        let eligibility = protocol.eligibility_module;

        ClinicalTrialRecord {
            nct_id,
            title: protocol.identification_module.brief_title,
            official_title: protocol.identification_module.official_title,
            status: status.overall_status,
            last_known_status: status.last_known_status,
            why_stopped: status.why_stopped,
            has_expanded_access: status.expanded_access_info.has_expanded_access,
            lead_sponsor: sponsors.lead_sponsor.name,
            lead_sponsor_class: sponsors.lead_sponsor.class,
            collaborators: sponsors
                .collaborators
                .into_iter()
                .filter_map(|agency| agency.name)
                .collect(),
            oversight: Oversight {
                has_dmc: oversight.oversight_has_dmc,
                is_fda_regulated_drug: oversight.is_fda_regulated_drug,
                is_fda_regulated_device: oversight.is_fda_regulated_device,
            },
            brief_summary: protocol.description_module.brief_summary,
            detailed_description: protocol.description_module.detailed_description,
            conditions: protocol.conditions_module.conditions,
            keywords: protocol.conditions_module.keywords,
            mesh_conditions: self
                .derived_section
                .condition_browse_module
                .meshes
                .into_iter()
                .map(|raw| MeshTerm {
                    id: raw.id,
                    term: raw.term,
                })
                .collect(),
            interventions: protocol
                .arms_interventions_module
                .interventions
                .into_iter()
                .map(|raw| Intervention {
                    intervention_type: raw.intervention_type,
                    name: raw.name,
                    description: raw.description,
                    other_names: raw.other_names,
                })
                .collect(),
            study_type: design.study_type,
            phases: design.phases,
            enrollment: design.enrollment_info.count,
            enrollment_type: design.enrollment_info.enrollment_type,
            eligibility: Eligibility {
                criteria: eligibility.eligibility_criteria,
                healthy_volunteers: eligibility.healthy_volunteers,
                sex: eligibility.sex,
                minimum_age: eligibility.minimum_age,
                maximum_age: eligibility.maximum_age,
                std_ages: eligibility.std_ages,
            },
            primary_outcomes: protocol
                .outcomes_module
                .primary_outcomes
                .into_iter()
                .map(Outcome::from)
                .collect(),
            secondary_outcomes: protocol
                .outcomes_module
                .secondary_outcomes
                .into_iter()
                .map(Outcome::from)
                .collect(),
            references: protocol
                .references_module
                .references
                .into_iter()
                .map(|raw| StudyReference {
                    pmid: raw.pmid,
                    reference_type: raw.reference_type,
                    citation: raw.citation,
                })
                .collect(),
            start_date: status.start_date_struct.into_date(),
            primary_completion_date: status.primary_completion_date_struct.into_date(),
            completion_date: status.completion_date_struct.into_date(),
            study_first_submit_date: partial_date(status.study_first_submit_date),
            results_first_submit_date: partial_date(status.results_first_submit_date),
            last_update_submit_date: partial_date(status.last_update_submit_date),
        }
    }
}

impl From<&ClinicalTrialRecord> for RawStudy {
    fn from(record: &ClinicalTrialRecord) -> Self {
        RawStudy {
            protocol_section: ProtocolSection {
                identification_module: IdentificationModule {
                    nct_id: Some(record.nct_id.clone()),
                    brief_title: record.title.clone(),
                    official_title: record.official_title.clone(),
                },
                status_module: StatusModule {
                    overall_status: record.status.clone(),
                    last_known_status: record.last_known_status.clone(),
                    why_stopped: record.why_stopped.clone(),
                    expanded_access_info: ExpandedAccessInfo {
                        has_expanded_access: record.has_expanded_access,
                    },
                    start_date_struct: DateStruct::from_date(&record.start_date),
                    primary_completion_date_struct: DateStruct::from_date(&record.primary_completion_date),
                    completion_date_struct: DateStruct::from_date(&record.completion_date),
                    study_first_submit_date: raw_date(&record.study_first_submit_date),
                    results_first_submit_date: raw_date(&record.results_first_submit_date),
                    last_update_submit_date: raw_date(&record.last_update_submit_date),
                },
                sponsor_collaborators_module: SponsorCollaboratorsModule {
                    lead_sponsor: Agency {
                        name: record.lead_sponsor.clone(),
                        class: record.lead_sponsor_class.clone(),
                    },
                    collaborators: record
                        .collaborators
                        .iter()
                        .map(|name| Agency {
                            name: Some(name.clone()),
                            class: None,
                        })
                        .collect(),
                },
                oversight_module: OversightModule {
                    oversight_has_dmc: record.oversight.has_dmc,
                    is_fda_regulated_drug: record.oversight.is_fda_regulated_drug,
                    is_fda_regulated_device: record.oversight.is_fda_regulated_device,
                },
                description_module: DescriptionModule {
                    brief_summary: record.brief_summary.clone(),
                    detailed_description: record.detailed_description.clone(),
                },
                conditions_module: ConditionsModule {
                    conditions: record.conditions.clone(),
                    keywords: record.keywords.clone(),
                },
                design_module: DesignModule {
                    study_type: record.study_type.clone(),
                    phases: record.phases.clone(),
                    enrollment_info: EnrollmentInfo {
                        count: record.enrollment,
                        enrollment_type: record.enrollment_type.clone(),
                    },
                },
                arms_interventions_module: ArmsInterventionsModule {
                    interventions: record
                        .interventions
                        .iter()
                        .map(|i| RawIntervention {
                            intervention_type: i.intervention_type.clone(),
                            name: i.name.clone(),
                            description: i.description.clone(),
                            other_names: i.other_names.clone(),
                        })
                        .collect(),
                },
                outcomes_module: OutcomesModule {
                    primary_outcomes: record.primary_outcomes.iter().map(RawOutcome::from).collect(),
                    secondary_outcomes: record.secondary_outcomes.iter().map(RawOutcome::from).collect(),
                },
                eligibility_module: EligibilityModule {
                    eligibility_criteria: record.eligibility.criteria.clone(),
                    healthy_volunteers: record.eligibility.healthy_volunteers,
                    sex: record.eligibility.sex.clone(),
                    minimum_age: record.eligibility.minimum_age.clone(),
                    maximum_age: record.eligibility.maximum_age.clone(),
                    std_ages: record.eligibility.std_ages.clone(),
                },
                references_module: ReferencesModule {
                    references: record
                        .references
                        .iter()
                        .map(|r| RawReference {
                            pmid: r.pmid.clone(),
                            reference_type: r.reference_type.clone(),
                            citation: r.citation.clone(),
                        })
                        .collect(),
                },
            },
            derived_section: DerivedSection {
                condition_browse_module: ConditionBrowseModule {
                    meshes: record
                        .mesh_conditions
                        .iter()
                        .map(|m| RawMesh {
                            id: m.id.clone(),
                            term: m.term.clone(),
                        })
                        .collect(),
                },
            },
        }
    }
}

impl Serialize for ClinicalTrialRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawStudy::from(self).serialize(serializer)
    }
}
