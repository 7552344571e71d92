//! Path-to-handler routing shared by every server transport.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Context, Reply};

/// A type-erased handler: decodes its request, calls the implementation and
/// encodes the outcome.
pub type Handler = Arc<dyn Fn(Context, &[u8]) -> Reply + Send + Sync>;

/// Maps `/{unit}/{Method}` paths to handlers.
///
/// Generated `register_handlers` functions fill a router; transports call
/// [`Router::dispatch`].
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `path`, replacing any previous handler there.
    pub fn route<F>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Context, &[u8]) -> Reply + Send + Sync + 'static,
    {
        let path = path.into();
        if self.routes.insert(path.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(%path, "handler replaced");
        }
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Run the handler for `path`; unknown paths get a `404`.
    pub fn dispatch(&self, ctx: Context, path: &str, body: &[u8]) -> Reply {
        let Some(handler) = self.routes.get(path) else {
            tracing::debug!(path, "no handler");
            return Reply::not_found(path);
        };
        let reply = handler(ctx, body);
        tracing::debug!(path, status = %reply.status, "dispatched");
        reply
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("paths", &self.paths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn dispatches_by_path() {
        let mut router = Router::new();
        router
            .route("/users/Ping", |_ctx, body: &[u8]| {
                Reply::new(Status::OK, body.to_vec())
            })
            .route("/users/Fail", |_ctx, _body: &[u8]| {
                Reply::failure(Status::INTERNAL_SERVER_ERROR, "nope")
            });

        assert_eq!(router.paths(), vec!["/users/Fail", "/users/Ping"]);

        let reply = router.dispatch(Context::background(), "/users/Ping", b"{}");
        assert_eq!(reply, Reply::new(Status::OK, b"{}".to_vec()));

        let reply = router.dispatch(Context::background(), "/users/Fail", b"{}");
        assert_eq!(reply.status, Status::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.message(), "nope");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let router = Router::new();
        let reply = router.dispatch(Context::background(), "/users/Missing", b"{}");
        assert_eq!(reply.status, Status::NOT_FOUND);
        assert_eq!(reply.message(), "no handler for /users/Missing");
    }
}
