//! End-to-end exchanges over a real socket.

#![cfg(feature = "http")]

use std::time::Duration;

use rigging::{Context, Failure, HttpTransport, Reply, Router, Status, Transport, call, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct AddRequest {
    #[serde(rename = "A")]
    a: i64,
    #[serde(rename = "B")]
    b: i64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct AddResponse {
    #[serde(rename = "Sum")]
    sum: i64,
}

fn math_router() -> Router {
    let mut router = Router::new();
    router
        .route("/math/Add", |_ctx, body: &[u8]| {
            let request: AddRequest = match decode(body) {
                Ok(request) => request,
                Err(failure) => return Reply::failure(Status::BAD_REQUEST, &failure),
            };
            match request.a.checked_add(request.b) {
                Some(sum) => Reply::encode(&AddResponse { sum }),
                None => Reply::failure(Status::INTERNAL_SERVER_ERROR, "overflow"),
            }
        })
        .route("/math/Deadline", |ctx: Context, _body: &[u8]| {
            let has_deadline = ctx.deadline().is_some();
            Reply::encode(&has_deadline)
        });
    router
}

/// Start a server on an ephemeral port; the runtime must outlive the test body.
fn start() -> (tokio::runtime::Runtime, HttpTransport) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();
    runtime.spawn(rigging::http::serve(listener, math_router()));
    (runtime, HttpTransport::new(format!("http://{addr}")))
}

#[test]
fn success_and_failure_statuses() {
    let (_runtime, transport) = start();
    let ctx = Context::background();

    let response: AddResponse = call(&transport, &ctx, "/math/Add", &AddRequest { a: 2, b: 40 }).unwrap();
    assert_eq!(response, AddResponse { sum: 42 });

    let err = call::<_, AddResponse, _>(
        &transport,
        &ctx,
        "/math/Add",
        &AddRequest { a: i64::MAX, b: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        Failure::Remote {
            status: Status::INTERNAL_SERVER_ERROR,
            message: "overflow".into(),
        }
    );

    let reply = transport
        .round_trip(&ctx, "/math/Add", b"{\"A\": \"two\"}".to_vec())
        .unwrap();
    assert_eq!(reply.status, Status::BAD_REQUEST);

    let reply = transport
        .round_trip(&ctx, "/math/Subtract", b"{}".to_vec())
        .unwrap();
    assert_eq!(reply.status, Status::NOT_FOUND);
}

#[test]
fn deadline_travels_in_header() {
    let (_runtime, transport) = start();

    let without: bool = call(&transport, &Context::background(), "/math/Deadline", &()).unwrap();
    assert!(!without);

    let ctx = Context::background().with_timeout(Duration::from_secs(30));
    let with: bool = call(&transport, &ctx, "/math/Deadline", &()).unwrap();
    assert!(with);
}

#[test]
fn unreachable_server_is_transport_failure() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let transport = HttpTransport::new(format!("http://{addr}"));
    let err = call::<_, AddResponse, _>(
        &transport,
        &Context::background(),
        "/math/Add",
        &AddRequest { a: 1, b: 1 },
    )
    .unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}
