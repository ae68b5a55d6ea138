#![allow(dead_code)]

use std::time::Duration;

use rstest::fixture;
use serde_json::Value;
use tracing::info;
use wiremock::MockServer;

use gtp_service_sdk::{
    GeophiresParameters, GeophiresRequest, GtpServiceClient, GtpServiceClientBuilder,
    ReservoirModel, RetryPolicy,
};

pub const TEST_TOKEN: &str = "test-access-token";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A mock GTP service.
pub struct TestService {
    pub server: MockServer,
}

impl TestService {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        info!(uri = %server.uri(), "mock GTP service started");
        Self { server }
    }

    /// A builder pointing at the mock service, with a bearer token and fast retries.
    pub fn builder(&self) -> GtpServiceClientBuilder {
        GtpServiceClient::builder()
            .with_endpoint(self.server.uri())
            .with_bearer_token(TEST_TOKEN)
            .with_retry_policy(fast_retry_policy())
    }

    pub fn client(&self) -> GtpServiceClient {
        match self.builder().build() {
            Ok(client) => client,
            Err(error) => panic!("fail to build client: {error:?}"),
        }
    }

    /// JSON bodies of every request received so far.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.body_json::<Value>().unwrap_or(Value::Null))
            .collect()
    }
}

pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy::default()
        .with_min_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(5))
}

pub fn geophires_request() -> GeophiresRequest {
    GeophiresRequest::new(
        GeophiresParameters::new()
            .with_reservoir_model(ReservoirModel::MultipleParallelFractures)
            .with_reservoir_depth(3)
            .with_number_of_segments(1)
            .with_gradient_1(50)
            .with_maximum_temperature(400),
    )
}

#[fixture]
pub async fn service() -> TestService {
    init_tracing();
    TestService::start().await
}
