//! The exchange abstraction generated remote clients are written against.

use std::sync::Arc;

use crate::{Context, Failure, Reply, Router};

/// Performs one request/response exchange.
///
/// `Err` means the exchange itself failed. A reply with an error status is
/// still `Ok`; callers turn it into [`Failure::Remote`].
pub trait Transport: Send + Sync {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure> {
        (**self).round_trip(ctx, path, body)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure> {
        (**self).round_trip(ctx, path, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure> {
        (**self).round_trip(ctx, path, body)
    }
}

/// Dispatches straight into a [`Router`] in the same process.
///
/// Bodies still go through JSON, so a remote client over `InProcess`
/// exercises exactly the wire contract an HTTP deployment would.
#[derive(Debug, Clone)]
pub struct InProcess {
    router: Arc<Router>,
}

impl InProcess {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl From<Router> for InProcess {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

impl Transport for InProcess {
    fn round_trip(&self, ctx: &Context, path: &str, body: Vec<u8>) -> Result<Reply, Failure> {
        ctx.check()?;
        Ok(self.router.dispatch(ctx.clone(), path, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Status, call};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Echo {
        text: String,
    }

    fn echo_router() -> Router {
        let mut router = Router::new();
        router.route("/echo/Say", |_ctx, body: &[u8]| {
            match crate::decode::<Echo>(body) {
                Ok(echo) => Reply::encode(&echo),
                Err(failure) => Reply::failure(Status::BAD_REQUEST, &failure),
            }
        });
        router
    }

    #[test]
    fn call_round_trips_through_router() {
        let transport = InProcess::new(echo_router());
        let ctx = Context::background();
        let echo: Echo = call(
            &transport,
            &ctx,
            "/echo/Say",
            &Echo {
                text: "hi".into(),
            },
        )
        .unwrap();
        assert_eq!(echo.text, "hi");
    }

    #[test]
    fn unknown_path_becomes_remote_failure() {
        let transport = Arc::new(InProcess::new(echo_router()));
        let ctx = Context::background();
        let err = call::<_, Echo, _>(&transport, &ctx, "/echo/Shout", &Echo { text: "hi".into() })
            .unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.status(), Some(Status::NOT_FOUND));
    }

    #[test]
    fn cancelled_context_never_dispatches() {
        let transport = InProcess::new(echo_router());
        let ctx = Context::background();
        ctx.cancel();
        let err = transport
            .round_trip(&ctx, "/echo/Say", b"{}".to_vec())
            .unwrap_err();
        assert_eq!(err, Failure::Cancelled);
    }
}
