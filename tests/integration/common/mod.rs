//! Shared helpers for integration tests: JSON fixtures and a recording transport

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use regbot_client::{RequestDescriptor, Transport, TransportError};
use serde_json::Value;

const TEST_DATA_DIR: &str = "tests/integration/test_data";

/// Load a JSON fixture relative to `tests/integration/test_data`
pub fn load_fixture(relative: &str) -> Value {
    let path = Path::new(TEST_DATA_DIR).join(relative);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Fixture {} is not valid JSON: {}", path.display(), e))
}

/// Load a fixture as raw text (for error bodies)
pub fn load_fixture_text(relative: &str) -> String {
    let path = Path::new(TEST_DATA_DIR).join(relative);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Transport serving queued responses in order and recording every request
///
/// Once the queue is empty every further request fails with a 500, which
/// makes an unexpected extra request visible in the test.
#[derive(Default)]
pub struct FixtureTransport {
    responses: RefCell<VecDeque<Result<Value, TransportError>>>,
    requests: RefCell<Vec<RequestDescriptor>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn with_fixture(self, relative: &str) -> Self {
        self.with_response(load_fixture(relative))
    }

    pub fn with_error(self, error: TransportError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for FixtureTransport {
    fn send(&self, request: &RequestDescriptor) -> Result<Value, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(TransportError::Status {
                status: 500,
                body: format!("no fixture queued for {}", request.path),
            })
        })
    }
}

/// Helpers for opt-in tests against the live APIs
pub mod real_api {
    use std::env;

    use regbot_client::{ClientConfig, HttpTransport, RegulatoryClient};

    /// Real API tests run only with `REGBOT_REAL_API_TESTS` set
    pub fn should_run_real_api_tests() -> bool {
        env::var("REGBOT_REAL_API_TESTS").is_ok()
    }

    /// Client with a conservative rate limit, using `OPENFDA_API_KEY` if set
    pub fn create_test_client() -> RegulatoryClient<HttpTransport> {
        let config = ClientConfig::from_env()
            .with_rate_limit(2.0)
            .with_user_agent("regbot-client-integration-tests");
        RegulatoryClient::with_config(config).expect("HTTP client should build")
    }
}
