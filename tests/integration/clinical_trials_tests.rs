//! ClinicalTrials.gov v2 tests: token pagination and lenient normalization

mod common;

use common::{load_fixture, FixtureTransport};
use regbot_client::vocab::{OverallStatus, StudyPhase};
use regbot_client::{
    ClinicalTrialRecord, ClinicalTrialsAdapter, MeshTerm, Outcome, PageCursor, PaginatedFetcher,
    QueryParameters, RecordAssembler, RegulatoryClient, Source, SourceAdapter,
};
use time::{Date, Month};

fn two_page_transport() -> FixtureTransport {
    FixtureTransport::new()
        .with_fixture("clinical_trials/imatinib_page1.json")
        .with_fixture("clinical_trials/imatinib_page2.json")
}

fn study(page: &str, index: usize) -> ClinicalTrialRecord {
    let raw = &load_fixture(page)["studies"][index];
    RecordAssembler::normalize_clinical_trial(raw).unwrap()
}

#[test]
fn test_token_pagination_across_two_pages() {
    let transport = two_page_transport();
    let fetcher = PaginatedFetcher::new(ClinicalTrialsAdapter::new(&transport));
    let params = QueryParameters::new().with("intervention", "imatinib");

    let records: Vec<_> = fetcher
        .fetch(&params, None)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.key()).collect();
    assert_eq!(ids, vec!["NCT00769782", "NCT01234567", "NCT02345678"]);
    assert!(records.iter().all(|r| r.source() == Source::ClinicalTrials));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/studies");
    assert_eq!(requests[0].query_value("query.intr"), Some("imatinib"));
    assert_eq!(requests[0].query_value("pageToken"), None);
    assert_eq!(requests[1].query_value("pageToken"), Some("NF0g5JGBlPMuwQY"));
}

#[test]
fn test_single_page_cursor() {
    let transport = two_page_transport();
    let adapter = ClinicalTrialsAdapter::new(&transport);
    let params = QueryParameters::new().with("condition", "leukemia");

    let first = adapter.fetch_page(&params, None).unwrap();
    assert_eq!(first.records.len(), 2);
    assert_eq!(first.next, Some(PageCursor::Token("NF0g5JGBlPMuwQY".to_string())));

    let second = adapter.fetch_page(&params, first.next.as_ref()).unwrap();
    assert_eq!(second.records.len(), 1);
    assert!(second.is_last());
}

#[test]
fn test_max_records_stops_before_second_page() {
    let transport = two_page_transport();
    let client = RegulatoryClient::with_transport(&transport);
    let params = QueryParameters::new().with("intervention", "imatinib");

    let studies: Vec<_> = client
        .clinical_trials(&params, Some(2))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(studies.len(), 2);
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_completed_study_fields() {
    let record = study("clinical_trials/imatinib_page1.json", 0);

    assert_eq!(record.nct_id, "NCT00769782");
    assert_eq!(record.overall_status(), Some(OverallStatus::Completed));
    assert_eq!(record.lead_sponsor.as_deref(), Some("Novartis"));
    assert_eq!(record.conditions, vec!["Gastrointestinal Stromal Tumors"]);
    assert_eq!(record.keywords, vec!["GIST", "imatinib"]);
    assert_eq!(record.phase_kinds(), vec![StudyPhase::Phase4]);
    assert_eq!(record.enrollment, Some(120));

    assert_eq!(record.interventions.len(), 1);
    let intervention = &record.interventions[0];
    assert_eq!(intervention.intervention_type.as_deref(), Some("DRUG"));
    assert_eq!(intervention.other_names, vec!["Gleevec", "STI571"]);
}

#[test]
fn test_description_and_sponsors() {
    let record = study("clinical_trials/imatinib_page1.json", 0);

    assert_eq!(
        record.brief_summary.as_deref(),
        Some("This study evaluates the safety of imatinib 400 mg daily in GIST.")
    );
    assert!(record
        .detailed_description
        .as_deref()
        .is_some_and(|d| d.starts_with("Patients receive imatinib")));
    assert_eq!(record.lead_sponsor_class.as_deref(), Some("INDUSTRY"));
    assert_eq!(
        record.collaborators,
        vec!["Dana-Farber Cancer Institute", "National Cancer Institute (NCI)"]
    );
    assert_eq!(record.oversight.has_dmc, Some(true));
    assert_eq!(record.oversight.is_fda_regulated_drug, Some(true));
    assert_eq!(record.oversight.is_fda_regulated_device, Some(false));
    assert_eq!(record.enrollment_type.as_deref(), Some("ACTUAL"));
}

#[test]
fn test_eligibility() {
    let adult = study("clinical_trials/imatinib_page1.json", 0);
    assert_eq!(adult.eligibility.minimum_age.as_deref(), Some("18 Years"));
    assert_eq!(adult.eligibility.maximum_age, None);
    assert_eq!(adult.eligibility.std_ages, vec!["ADULT", "OLDER_ADULT"]);
    assert_eq!(adult.eligibility.sex.as_deref(), Some("ALL"));
    assert_eq!(adult.eligibility.healthy_volunteers, Some(false));
    assert!(adult
        .eligibility
        .criteria
        .as_deref()
        .is_some_and(|c| c.contains("Histologically confirmed GIST")));

    // A bare age group and a yes/no string
    let pediatric = study("clinical_trials/imatinib_page1.json", 1);
    assert_eq!(pediatric.eligibility.minimum_age.as_deref(), Some("1 Year"));
    assert_eq!(pediatric.eligibility.maximum_age.as_deref(), Some("21 Years"));
    assert_eq!(pediatric.eligibility.std_ages, vec!["CHILD"]);
    assert_eq!(pediatric.eligibility.healthy_volunteers, Some(false));

    let observational = study("clinical_trials/imatinib_page2.json", 0);
    assert!(observational.eligibility.is_empty());
}

#[test]
fn test_outcomes() {
    let record = study("clinical_trials/imatinib_page1.json", 0);

    assert_eq!(
        record.primary_outcomes,
        vec![Outcome {
            measure: Some("Progression-free survival".to_string()),
            description: Some("Time from enrollment to progression".to_string()),
            time_frame: Some("24 months".to_string()),
        }]
    );
    assert_eq!(record.secondary_outcomes.len(), 2);
    assert_eq!(record.secondary_outcomes[0].description, None);
    assert_eq!(
        record.secondary_outcomes[1].time_frame.as_deref(),
        Some("Up to 30 days after last dose")
    );

    // A single outcome object instead of a list
    let second = study("clinical_trials/imatinib_page1.json", 1);
    assert_eq!(second.primary_outcomes.len(), 1);
    assert_eq!(second.primary_outcomes[0].measure.as_deref(), Some("Event-free survival"));
    assert!(second.secondary_outcomes.is_empty());
}

#[test]
fn test_mesh_conditions_from_derived_section() {
    let record = study("clinical_trials/imatinib_page1.json", 0);
    assert_eq!(
        record.mesh_conditions,
        vec![MeshTerm {
            id: Some("D046152".to_string()),
            term: Some("Gastrointestinal Stromal Tumors".to_string()),
        }]
    );
    assert_eq!(record.mesh_ids(), vec!["D046152"]);

    let single = study("clinical_trials/imatinib_page1.json", 1);
    assert_eq!(single.mesh_ids(), vec!["D054198"]);

    let none = study("clinical_trials/imatinib_page2.json", 0);
    assert!(none.mesh_conditions.is_empty());
}

#[test]
fn test_references_and_status_dates() {
    let record = study("clinical_trials/imatinib_page1.json", 0);

    assert_eq!(record.references.len(), 1);
    assert_eq!(record.references[0].pmid.as_deref(), Some("18955451"));
    assert_eq!(record.references[0].reference_type.as_deref(), Some("BACKGROUND"));

    assert_eq!(record.has_expanded_access, Some(false));
    assert_eq!(
        record.study_first_submit_date.as_ref().and_then(|d| d.date()),
        Date::from_calendar_date(2008, Month::October, 27).ok()
    );
    assert_eq!(record.results_first_submit_date.as_ref().unwrap().raw(), "2012-05-14");
    assert_eq!(record.last_update_submit_date.as_ref().unwrap().raw(), "2012-06-20");

    let recruiting = study("clinical_trials/imatinib_page2.json", 0);
    assert_eq!(recruiting.last_known_status.as_deref(), Some("RECRUITING"));
    assert_eq!(recruiting.oversight.has_dmc, Some(true));
    assert_eq!(recruiting.why_stopped, None);
}

#[test]
fn test_partial_dates() {
    let record = study("clinical_trials/imatinib_page1.json", 0);

    let start = record.start_date.as_ref().unwrap();
    assert_eq!(start.raw(), "2008-10");
    assert_eq!(start.date(), Date::from_calendar_date(2008, Month::October, 1).ok());

    let completion = record.completion_date.as_ref().unwrap();
    assert_eq!(
        completion.date(),
        Date::from_calendar_date(2011, Month::June, 30).ok()
    );

    let year_only = study("clinical_trials/imatinib_page1.json", 1);
    assert_eq!(
        year_only.start_date.as_ref().and_then(|d| d.date()),
        Date::from_calendar_date(2011, Month::January, 1).ok()
    );
    assert_eq!(year_only.completion_date, None);
}

#[test]
fn test_shape_drift_is_absorbed() {
    // Conditions as a bare string, no sponsor, no enrollment
    let second = study("clinical_trials/imatinib_page1.json", 1);
    assert_eq!(second.conditions, vec!["Acute Lymphoblastic Leukemia"]);
    assert_eq!(second.lead_sponsor, None);
    assert_eq!(second.enrollment, None);
    assert!(second.interventions.is_empty());
    assert_eq!(
        second.phase_kinds(),
        vec![StudyPhase::Phase2, StudyPhase::Phase3]
    );

    // Enrollment as a numeric string, a single intervention object,
    // and a start date that is not a date at all
    let third = study("clinical_trials/imatinib_page2.json", 0);
    assert_eq!(third.enrollment, Some(250));
    assert_eq!(third.interventions.len(), 1);
    assert_eq!(third.interventions[0].name.as_deref(), Some("Imatinib"));
    assert!(third.interventions[0].other_names.is_empty());

    let start = third.start_date.as_ref().unwrap();
    assert_eq!(start.raw(), "Spring 2015");
    assert!(!start.is_parsed());
}

#[test]
fn test_round_trip_is_idempotent() {
    for (page, index) in [
        ("clinical_trials/imatinib_page1.json", 0),
        ("clinical_trials/imatinib_page1.json", 1),
        ("clinical_trials/imatinib_page2.json", 0),
    ] {
        let record = study(page, index);
        let serialized = serde_json::to_value(&record).unwrap();
        let reparsed = RecordAssembler::normalize_clinical_trial(&serialized).unwrap();
        assert_eq!(record, reparsed, "{page}[{index}]");
    }
}

#[test]
fn test_serialized_form_uses_protocol_section() {
    let record = study("clinical_trials/imatinib_page1.json", 0);
    let serialized = serde_json::to_value(&record).unwrap();

    assert_eq!(
        serialized.pointer("/protocolSection/identificationModule/nctId"),
        Some(&serde_json::json!("NCT00769782"))
    );
    assert_eq!(
        serialized.pointer("/protocolSection/statusModule/startDateStruct/date"),
        Some(&serde_json::json!("2008-10"))
    );
    assert_eq!(
        serialized.pointer("/protocolSection/eligibilityModule/minimumAge"),
        Some(&serde_json::json!("18 Years"))
    );
    assert_eq!(
        serialized.pointer("/protocolSection/outcomesModule/primaryOutcomes/0/timeFrame"),
        Some(&serde_json::json!("24 months"))
    );
    assert_eq!(
        serialized.pointer("/derivedSection/conditionBrowseModule/meshes/0/id"),
        Some(&serde_json::json!("D046152"))
    );
}
