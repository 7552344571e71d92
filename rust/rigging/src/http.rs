//! JSON over HTTP: a blocking ureq client transport and an axum server adapter.
//!
//! Every method is `POST /{unit}/{Method}` with a JSON body. The caller's
//! remaining time travels in the [`TIMEOUT_HEADER`] header and becomes the
//! deadline of the server-side [`Context`].

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use crate::{Context, Failure, Reply, Router, Status, Transport};

/// Header carrying the caller's remaining time in milliseconds.
pub const TIMEOUT_HEADER: &str = "rigging-timeout-ms";

/// A [`Transport`] that posts to `{base_url}{path}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport with a default agent.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_agent(base_url, ureq::Agent::new())
    }

    /// Create a transport with a preconfigured agent (timeouts, proxies).
    pub fn with_agent(base_url: impl Into<String>, agent: ureq::Agent) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure> {
        ctx.check()?;
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json");
        if let Some(remaining) = ctx.remaining() {
            request = request
                .set(TIMEOUT_HEADER, &remaining.as_millis().to_string())
                .timeout(remaining);
        }

        match request.send_bytes(&body) {
            Ok(response) => read_reply(response),
            // Non-2xx statuses are replies, not transport failures.
            Err(ureq::Error::Status(_, response)) => read_reply(response),
            Err(ureq::Error::Transport(transport)) => {
                tracing::debug!(%url, error = %transport, "exchange failed");
                Err(Failure::Transport(transport.to_string()))
            }
        }
    }
}

fn read_reply(response: ureq::Response) -> Result<Reply, Failure> {
    let status = Status(response.status());
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| Failure::Transport(e.to_string()))?;
    Ok(Reply::new(status, body))
}

/// Build the axum Router serving every path registered in `router`.
///
/// Handlers are synchronous, so each request runs on tokio's blocking pool.
pub fn axum_router(router: Router) -> axum::Router {
    axum::Router::new()
        .route("/{unit}/{method}", post(handle_call))
        .with_state(Arc::new(router))
}

/// Serve `router` on `listener` until the future is dropped.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, paths = ?router.paths(), "serving");
    }
    axum::serve(listener, axum_router(router)).await
}

async fn handle_call(
    State(router): State<Arc<Router>>,
    Path((unit, method)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/{unit}/{method}");
    let ctx = context_from_headers(&headers);
    let reply = tokio::task::spawn_blocking(move || router.dispatch(ctx, &path, &body)).await;
    match reply {
        Ok(reply) => reply.into_response(),
        Err(e) => Reply::failure(Status::INTERNAL_SERVER_ERROR, e).into_response(),
    }
}

fn context_from_headers(headers: &HeaderMap) -> Context {
    let ctx = Context::background();
    let timeout = headers
        .get(TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    match timeout {
        Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
        None => ctx,
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status.0).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [("content-type", "application/json")], self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:8080/");
        assert_eq!(transport.base_url(), "http://localhost:8080");
    }

    #[test]
    fn timeout_header_sets_deadline() {
        let mut headers = HeaderMap::new();
        assert!(context_from_headers(&headers).deadline().is_none());

        headers.insert(TIMEOUT_HEADER, HeaderValue::from_static("5000"));
        let remaining = context_from_headers(&headers).remaining().unwrap();
        assert!(remaining <= Duration::from_millis(5000));
        assert!(remaining > Duration::from_millis(4000));

        headers.insert(TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        assert!(context_from_headers(&headers).deadline().is_none());
    }
}
