#![cfg(feature = "blocking")]
#![allow(missing_docs)]

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gtp_service_sdk::blocking::GtpServiceClient;
use gtp_service_sdk::{GtpServiceError, ResultIdRequest};

mod common;
pub use self::common::*;

/// The mock server runs on its own runtime, the blocking client owns another.
fn start_server() -> (tokio::runtime::Runtime, MockServer) {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("server runtime");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

fn blocking_client(server: MockServer) -> (TestService, GtpServiceClient) {
    let service = TestService { server };
    let client = GtpServiceClient::new(service.builder()).expect("blocking client");
    (service, client)
}

#[test]
fn should_run_simulation_from_blocking_code() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/v1/create-geophires-result"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ResultId": "abc123" })),
            )
            .expect(1)
            .mount(&server),
    );
    let (_service, client) = blocking_client(server);

    let result = client
        .create_geophires_result(&geophires_request())
        .expect("create");

    assert_eq!(result.result_id().expect("result id"), "abc123");
}

#[test]
fn should_surface_gateway_timeout_from_blocking_code() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/v1/delete-geophires-result"))
            .and(body_json(json!({ "result_id": "abc123" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "Endpoint request timed out" })),
            )
            .expect(1)
            .mount(&server),
    );
    let (_service, client) = blocking_client(server);

    let error = client
        .delete_geophires_result(&ResultIdRequest::new("abc123"))
        .expect_err("timeout");

    assert!(matches!(error, GtpServiceError::GatewayTimeout { .. }));
}
