//! RxClass tests: per-class grouping, the SNOMED CT filter and class member lookups

mod common;

use common::FixtureTransport;
use regbot_client::vocab::{ClassType, Relation, RelationSource, TermType};
use regbot_client::{
    DrugClassRecord, QueryParameters, RecordAssembler, RegulatoryClient, RxClassAdapter, SourceAdapter,
};
use serde_json::json;

fn drug_classes(transport: &FixtureTransport, params: &QueryParameters) -> Vec<DrugClassRecord> {
    RegulatoryClient::with_transport(transport)
        .drug_classes(params)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn find<'a>(classes: &'a [DrugClassRecord], class_id: &str) -> &'a DrugClassRecord {
    classes
        .iter()
        .find(|c| c.class_id == class_id)
        .unwrap_or_else(|| panic!("class {class_id} not returned"))
}

#[test]
fn test_by_drug_name_groups_per_class() {
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");
    let params = QueryParameters::new().with("drug_name", "imatinib");

    let classes = drug_classes(&transport, &params);

    let ids: Vec<&str> = classes.iter().map(|c| c.class_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["D054437", "D046152", "N0000175605", "N0000000070", "L01EA", "AN900"]
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/class/byDrugName.json");
    assert_eq!(requests[0].query_value("drugName"), Some("imatinib"));
}

#[test]
fn test_duplicate_class_entries_are_merged() {
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");
    let params = QueryParameters::new().with("drug_name", "imatinib");

    let classes = drug_classes(&transport, &params);
    let epc = find(&classes, "N0000175605");

    assert_eq!(epc.class_name.as_deref(), Some("Kinase Inhibitor"));
    assert_eq!(epc.class_type.as_deref(), Some("EPC"));
    assert_eq!(epc.relation.as_deref(), Some("has_epc"));
    assert_eq!(epc.relation_source_kind(), Some(RelationSource::FdaSpl));
    assert_eq!(epc.rxcuis(), vec!["282388", "282386"]);

    let disease = find(&classes, "D046152");
    assert_eq!(disease.rxcuis(), vec!["282388"]);
    assert_eq!(disease.members[0].name.as_deref(), Some("imatinib"));

    let va = find(&classes, "AN900");
    assert_eq!(va.class_url.as_deref(), Some("https://www.va.gov/formularyadvisor/"));
    assert_eq!(va.relation_kind(), Some(Relation::HasVaClass));
    assert_eq!(va.class_type_kind(), Some(ClassType::Va));
}

#[test]
fn test_class_and_term_type_kinds() {
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");
    let params = QueryParameters::new().with("drug_name", "imatinib");

    let classes = drug_classes(&transport, &params);

    let epc = find(&classes, "N0000175605");
    assert_eq!(epc.class_type_kind(), Some(ClassType::Epc));
    assert_eq!(epc.relation_kind(), Some(Relation::HasEpc));
    let term_types: Vec<_> = epc.members.iter().filter_map(|m| m.term_type_kind()).collect();
    assert_eq!(term_types, vec![TermType::Ingredient, TermType::PreciseIngredient]);

    // ATC classes come with an empty relation
    let atc = find(&classes, "L01EA");
    assert_eq!(atc.class_type_kind(), Some(ClassType::Atc1To4));
    assert_eq!(atc.relation_kind(), None);
}

#[test]
fn test_snomedct_only_when_requested() {
    let params = QueryParameters::new()
        .with("drug_name", "imatinib")
        .with("relation_source", "snomedct");
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");

    let classes = drug_classes(&transport, &params);

    let snomed = find(&classes, "372544009");
    assert_eq!(snomed.relation_source_kind(), Some(RelationSource::SnomedCt));
    assert_eq!(transport.requests()[0].query_value("relaSource"), Some("SNOMEDCT"));
}

#[test]
fn test_empty_response_yields_nothing() {
    let transport = FixtureTransport::new().with_response(json!({}));
    let params = QueryParameters::new().with("rxcui", "12345");

    let classes = drug_classes(&transport, &params);
    assert!(classes.is_empty());
    assert_eq!(transport.requests()[0].path, "/class/byRxcui.json");
}

#[test]
fn test_class_members_become_one_record() {
    let transport = FixtureTransport::new().with_fixture("rxclass/class_members_medrt.json");
    let params = QueryParameters::new()
        .with("class_id", "D000069439")
        .with("relation_source", "MEDRT")
        .with("relation", "may_treat");

    let classes = drug_classes(&transport, &params);

    assert_eq!(classes.len(), 1);
    let class = &classes[0];
    assert_eq!(class.class_id, "D000069439");
    assert_eq!(class.relation.as_deref(), Some("may_treat"));
    assert_eq!(class.relation_source_kind(), Some(RelationSource::MedRt));
    assert_eq!(class.rxcuis(), vec!["282388", "475342", "662281"]);
    assert_eq!(class.members[1].name.as_deref(), Some("dasatinib"));
    assert_eq!(class.members[1].term_type.as_deref(), Some("IN"));

    let request = &transport.requests()[0];
    assert_eq!(request.path, "/classMembers.json");
    assert_eq!(request.query_value("classId"), Some("D000069439"));
    assert_eq!(request.query_value("relaSource"), Some("MEDRT"));
    assert_eq!(request.query_value("rela"), Some("may_treat"));
}

#[test]
fn test_single_page_only() {
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");
    let adapter = RxClassAdapter::new(&transport);
    let params = QueryParameters::new().with("drug_name", "imatinib");

    let page = adapter.fetch_page(&params, None).unwrap();
    assert!(page.is_last());
    assert_eq!(page.records.len(), 6);
}

#[test]
fn test_round_trip_is_idempotent() {
    let transport = FixtureTransport::new().with_fixture("rxclass/bydrugname_imatinib.json");
    let params = QueryParameters::new().with("drug_name", "imatinib");

    for class in drug_classes(&transport, &params) {
        let serialized = serde_json::to_value(&class).unwrap();
        let reparsed = RecordAssembler::normalize_drug_class(&serialized).unwrap();
        assert_eq!(class, reparsed);
    }
}
