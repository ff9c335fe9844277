//! HTTP transport tests against a local mock server
//!
//! The transport is blocking, so each scenario runs on a blocking thread
//! while wiremock serves requests from the async runtime.

use std::time::Duration;

use regbot_client::{
    ClientConfig, DrugsFdaAdapter, HttpTransport, QueryParameters, RegbotError, RegulatoryClient,
    RetryConfig, Source, SourceAdapter,
};
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn drugsfda_body(numbers: &[&str]) -> serde_json::Value {
    let results: Vec<_> = numbers
        .iter()
        .map(|n| json!({"application_number": n, "sponsor_name": "MOCK PHARMA"}))
        .collect();
    json!({
        "meta": {"results": {"skip": 0, "limit": 100, "total": numbers.len()}},
        "results": results,
    })
}

fn fast_retries(max_retries: u32) -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(max_retries)
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(50))
        .without_jitter()
}

fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(Source::DrugsFda, server.uri())
        .with_base_url(Source::ClinicalTrials, server.uri())
        .with_base_url(Source::RxClass, server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(RetryConfig::disabled())
}

#[tokio::test(flavor = "multi_thread")]
#[traced_test]
async fn test_api_key_is_appended() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/drugsfda.json"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("search", r#"openfda.brand_name:"XADAGO""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(drugsfda_body(&["NDA207145"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server).with_api_key("test-key");
    let applications = tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        let params = QueryParameters::new().with("brand_name", "XADAGO");
        client
            .drug_applications(&params, None)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].application_number, "NDA207145");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_key_is_not_sent_to_other_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/class/byRxcui.json"))
        .and(query_param("rxcui", "282388"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server).with_api_key("test-key");
    tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        let params = QueryParameters::new().with("rxcui", "282388");
        assert_eq!(client.drug_classes(&params).unwrap().count(), 0);
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query().unwrap_or_default().contains("api_key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_request_is_invalid_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/drugsfda.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BAD_REQUEST", "message": "Invalid search syntax"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Retries are enabled; a 400 must not be retried
    let config = mock_config(&server).with_retry_config(fast_retries(3));
    let result = tokio::task::spawn_blocking(move || {
        let adapter = DrugsFdaAdapter::new(HttpTransport::new(config).unwrap());
        adapter.fetch_page(&QueryParameters::new().with("generic_name", "x"), None)
    })
    .await
    .unwrap();

    assert_eq!(
        result,
        Err(RegbotError::InvalidQuery {
            api: Source::DrugsFda,
            status: 400,
            message: "Invalid search syntax".to_string(),
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
#[traced_test]
async fn test_service_unavailable_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/drugsfda.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drug/drugsfda.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(drugsfda_body(&["ANDA090721"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server).with_retry_config(fast_retries(3));
    let page = tokio::task::spawn_blocking(move || {
        let adapter = DrugsFdaAdapter::new(HttpTransport::new(config).unwrap());
        adapter.fetch_page(&QueryParameters::new().with("generic_name", "imatinib"), None)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(page.records.len(), 1);
    assert!(page.is_last());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exhausted_retries_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studies"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(3)
        .mount(&server)
        .await;

    let config = mock_config(&server).with_retry_config(fast_retries(2));
    let result = tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        client.fetch_page(
            Source::ClinicalTrials,
            &QueryParameters::new().with("condition", "asthma"),
            None,
        )
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(RegbotError::TransientSourceError {
            api: Source::ClinicalTrials,
            status: Some(429),
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/drugsfda.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NOT_FOUND", "message": "No matches found!"}
        })))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let count = tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        let params = QueryParameters::new().with("brand_name", "NOSUCHDRUG");
        client.fetch(Source::DrugsFda, &params, None).unwrap().count()
    })
    .await
    .unwrap();

    assert_eq!(count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undecodable_body_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let result = tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        client.fetch_page(
            Source::ClinicalTrials,
            &QueryParameters::new().with("intervention", "imatinib"),
            None,
        )
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(RegbotError::TransientSourceError { status: None, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"studies": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = mock_config(&server).with_timeout(Duration::from_millis(200));
    let result = tokio::task::spawn_blocking(move || {
        let client = RegulatoryClient::with_config(config).unwrap();
        client.fetch_page(
            Source::ClinicalTrials,
            &QueryParameters::new().with("condition", "asthma"),
            None,
        )
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(RegbotError::TransientSourceError { status: None, .. })
    ));
}
