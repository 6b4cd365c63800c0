//! A mock API server for unit tests. Every request the client makes must be answered by the test
//! through [`ApiServerVerifier::respond`], in order.

use http::{Method, Request, Response};
use hyper::Body;
use kube::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tower_test::mock::SendResponse;

type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;

pub(crate) struct ApiServerVerifier(ApiServerHandle);

/// A request as seen by the mock API server.
#[derive(Debug)]
pub(crate) struct Recorded {
    pub(crate) method: Method,
    pub(crate) uri: String,
    pub(crate) body: Value,
}

pub(crate) fn mock_client() -> (Client, ApiServerVerifier) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    (
        Client::new(mock_service, "default"),
        ApiServerVerifier(handle),
    )
}

/// The body the API server sends with a failed request.
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

pub(crate) async fn timeout_after_1s(handle: tokio::task::JoinHandle<()>) {
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("timeout on mock apiserver")
        .expect("scenario succeeded")
}

impl ApiServerVerifier {
    /// Waits for the next request, answers it with `status` and `body`, and returns what was
    /// requested.
    pub(crate) async fn respond(&mut self, status: u16, body: Value) -> Recorded {
        self.try_respond(status, body)
            .await
            .expect("service not called")
    }

    /// Accepts the next request without answering it. The request stays pending until the
    /// returned handle is dropped.
    pub(crate) async fn hold(&mut self) -> SendResponse<Response<Body>> {
        let (_request, send) = self.0.next_request().await.expect("service not called");
        send
    }

    /// Like [`ApiServerVerifier::respond`], but returns `None` once the client has been dropped.
    pub(crate) async fn try_respond(&mut self, status: u16, body: Value) -> Option<Recorded> {
        let (request, send) = self.0.next_request().await?;
        let method = request.method().clone();
        let uri = request.uri().to_string();
        let bytes = hyper::body::to_bytes(request.into_body()).await.unwrap();
        let body_json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("valid json")
        };
        send.send_response(
            Response::builder()
                .status(status)
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        );
        Some(Recorded {
            method,
            uri,
            body: body_json,
        })
    }
}
