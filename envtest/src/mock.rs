//! A mock API server for unit tests of code that talks to the cluster.

use hyper::{Body, Method, Request, Response};
use kube::Client;
use serde_json::{json, Value};

type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;

pub(crate) struct ApiServerVerifier(ApiServerHandle);

pub(crate) fn mock_client() -> (Client, ApiServerVerifier) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    (
        Client::new(mock_service, "default"),
        ApiServerVerifier(handle),
    )
}

pub(crate) fn status_failure(code: u16, reason: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("mock failure: {}", reason),
        "reason": reason,
        "code": code
    })
}

impl ApiServerVerifier {
    /// Answers the next request and returns its method and URI. Returns `None` once the client
    /// has been dropped.
    pub(crate) async fn respond(&mut self, status: u16, body: &Value) -> Option<(Method, String)> {
        let (request, send) = self.0.next_request().await?;
        let method = request.method().clone();
        let uri = request.uri().to_string();
        send.send_response(
            Response::builder()
                .status(status)
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        );
        Some((method, uri))
    }
}
