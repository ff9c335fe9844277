//! Drugs@FDA fetch-and-normalize tests against recorded openFDA responses

mod common;

use common::{load_fixture, load_fixture_text, FixtureTransport};
use regbot_client::vocab::{
    ApplicationDocType, ApplicationKind, MarketingStatus, OpenFdaProductType, ReviewPriority,
    SubmissionClassCode, SubmissionStatus, SubmissionType,
};
use regbot_client::{
    DrugApplicationRecord, DrugsFdaAdapter, PaginatedFetcher, QueryParameters, RecordAssembler,
    RegbotError, RegulatoryClient, Source, SourceAdapter, TransportError,
};
use rstest::rstest;
use serde_json::{json, Value};
use time::{Date, Month};

fn xadago_result() -> Value {
    load_fixture("drugsfda/nda207145_xadago.json")["results"][0].clone()
}

fn fetch_xadago() -> Vec<DrugApplicationRecord> {
    let transport = FixtureTransport::new().with_fixture("drugsfda/nda207145_xadago.json");
    let client = RegulatoryClient::with_transport(transport);
    let params = QueryParameters::new().with("application_number", "NDA207145");

    let records = client
        .drug_applications(&params, None)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(client.transport().request_count(), 1);
    records
}

#[test]
fn test_nda207145_end_to_end() {
    let transport = FixtureTransport::new().with_fixture("drugsfda/nda207145_xadago.json");
    let fetcher = PaginatedFetcher::new(DrugsFdaAdapter::new(&transport));
    let params = QueryParameters::new().with("application_number", "NDA207145");

    let records: Vec<_> = fetcher
        .fetch(&params, None)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 1);
    let application = records[0].as_drug_application().expect("Drugs@FDA record");

    assert_eq!(application.application_number, "NDA207145");
    assert_eq!(application.sponsor_name.as_deref(), Some("MDD US"));
    assert_eq!(application.products.len(), 2);
    assert_eq!(application.submissions.len(), 4);

    let ingredients = &application.products[0].active_ingredients;
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].name.as_deref(), Some("SAFINAMIDE MESYLATE"));
    assert_eq!(ingredients[0].strength.as_deref(), Some("EQ 50MG BASE"));

    assert_eq!(application.openfda.brand_name, vec!["XADAGO"]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/drug/drugsfda.json");
    assert_eq!(
        requests[0].query_value("search"),
        Some(r#"application_number:"NDA207145""#)
    );
}

#[test]
fn test_typed_client_iterator() {
    let records = fetch_xadago();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].application_kind(), Some(ApplicationKind::Nda));
}

#[test]
fn test_submission_details() {
    let application = RecordAssembler::normalize_drug_application(&xadago_result()).unwrap();

    let original: Vec<_> = application.original_submissions().collect();
    assert_eq!(original.len(), 1);
    let orig = original[0];
    assert_eq!(orig.submission_number.as_deref(), Some("1"));
    assert_eq!(orig.submission_type_kind(), Some(SubmissionType::Original));
    assert_eq!(orig.review_priority_kind(), Some(ReviewPriority::Standard));
    assert_eq!(
        orig.submission_status_date.as_ref().and_then(|d| d.date()),
        Date::from_calendar_date(2017, Month::March, 21).ok()
    );
    assert_eq!(orig.application_docs.len(), 3);
    assert_eq!(orig.application_docs[0].doc_type.as_deref(), Some("Label"));
    assert!(orig.application_docs[0].parsed_url().is_some());
    let doc_types: Vec<_> = orig.application_docs.iter().filter_map(|d| d.doc_type_kind()).collect();
    assert_eq!(
        doc_types,
        vec![ApplicationDocType::Label, ApplicationDocType::Letter, ApplicationDocType::Review]
    );
    assert_eq!(orig.submission_status_kind(), Some(SubmissionStatus::Approved));
    assert_eq!(orig.submission_class_code_kind(), Some(SubmissionClassCode::Type(1)));

    let class_codes: Vec<_> = application
        .submissions
        .iter()
        .filter_map(|s| s.submission_class_code_kind())
        .collect();
    assert!(class_codes.contains(&SubmissionClassCode::ManufacturingCmc));
    assert!(class_codes.contains(&SubmissionClassCode::Labeling));

    // SUPPL-9 has no application_docs and no review_priority
    let latest = &application.submissions[0];
    assert!(latest.application_docs.is_empty());
    assert_eq!(latest.review_priority, None);
}

#[test]
fn test_product_details() {
    let application = RecordAssembler::normalize_drug_application(&xadago_result()).unwrap();

    let first = &application.products[0];
    assert_eq!(first.product_number.as_deref(), Some("001"));
    assert_eq!(first.marketing_status_kind(), Some(MarketingStatus::Prescription));
    assert_eq!(first.is_reference_drug(), Some(false));
    assert_eq!(first.te_code, None);

    let second = &application.products[1];
    assert_eq!(second.is_reference_drug(), Some(true));
    assert_eq!(
        second.active_ingredients[0].strength.as_deref(),
        Some("EQ 100MG BASE")
    );
}

#[test]
fn test_openfda_cross_reference() {
    let application = RecordAssembler::normalize_drug_application(&xadago_result()).unwrap();
    let openfda = &application.openfda;

    assert_eq!(openfda.product_ndc, vec!["27505-050", "27505-100"]);
    assert_eq!(openfda.rxcui.len(), 4);
    assert_eq!(openfda.unii, vec!["YS90V3DTX0"]);
    assert_eq!(openfda.product_type_kinds(), vec![OpenFdaProductType::HumanPrescriptionDrug]);
    // Absent in the fixture, still present as empty lists
    assert!(openfda.pharm_class_cs.is_empty());
    assert!(openfda.pharm_class_pe.is_empty());
}

#[test]
fn test_round_trip_is_idempotent() {
    let record = RecordAssembler::normalize_drug_application(&xadago_result()).unwrap();
    let serialized = serde_json::to_value(&record).unwrap();
    let reparsed = RecordAssembler::normalize_drug_application(&serialized).unwrap();
    assert_eq!(record, reparsed);
}

#[rstest]
#[case::products("products")]
#[case::submissions("submissions")]
#[case::openfda("openfda")]
#[case::sponsor("sponsor_name")]
fn test_missing_field_uses_default(#[case] field: &str) {
    let mut raw = xadago_result();
    raw.as_object_mut().unwrap().remove(field);

    let record = RecordAssembler::normalize_drug_application(&raw).unwrap();
    match field {
        "products" => assert!(record.products.is_empty()),
        "submissions" => assert!(record.submissions.is_empty()),
        "openfda" => assert!(record.openfda.is_empty()),
        "sponsor_name" => assert_eq!(record.sponsor_name, None),
        other => unreachable!("unexpected case {other}"),
    }
}

#[test]
fn test_malformed_date_is_preserved() {
    let mut raw = xadago_result();
    raw["submissions"][3]["submission_status_date"] = json!("2017-03-21");

    let record = RecordAssembler::normalize_drug_application(&raw).unwrap();
    let date = record.submissions[3].submission_status_date.as_ref().unwrap();
    assert_eq!(date.raw(), "2017-03-21");
    assert!(!date.is_parsed());
}

#[test]
fn test_not_found_is_an_empty_result() {
    let transport = FixtureTransport::new().with_error(TransportError::Status {
        status: 404,
        body: load_fixture_text("drugsfda/not_found.json"),
    });
    let adapter = DrugsFdaAdapter::new(&transport);
    let params = QueryParameters::new().with("brand_name", "NOT A DRUG");

    let page = adapter.fetch_page(&params, None).unwrap();
    assert!(page.records.is_empty());
    assert!(page.is_last());
}

#[test]
fn test_bad_request_is_invalid_query() {
    let transport = FixtureTransport::new().with_error(TransportError::Status {
        status: 400,
        body: r#"{"error": {"code": "BAD_REQUEST", "message": "Syntax error in search"}}"#.to_string(),
    });
    let fetcher = PaginatedFetcher::new(DrugsFdaAdapter::new(&transport));
    let params = QueryParameters::new().with("generic_name", "imatinib");

    let results: Vec<_> = fetcher.fetch(&params, None).unwrap().collect();
    assert_eq!(
        results,
        vec![Err(RegbotError::InvalidQuery {
            api: Source::DrugsFda,
            status: 400,
            message: "Syntax error in search".to_string(),
        })]
    );
}

#[test]
fn test_server_error_is_transient() {
    let transport = FixtureTransport::new().with_error(TransportError::Status {
        status: 502,
        body: "Bad Gateway".to_string(),
    });
    let adapter = DrugsFdaAdapter::new(&transport);
    let params = QueryParameters::new().with("generic_name", "imatinib");

    assert!(matches!(
        adapter.fetch_page(&params, None),
        Err(RegbotError::TransientSourceError { status: Some(502), .. })
    ));
}
