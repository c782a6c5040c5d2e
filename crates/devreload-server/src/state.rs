//! Live reload state shared by the status handler and the injection middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use devreload_core::ReloadSignal;

use crate::handlers;
use crate::middleware;

/// Which responses the injection middleware may rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectionPolicy {
    /// Treat a response without a `Content-Type` header as HTML.
    ///
    /// Full pages rendered by a handler often carry no content type; partial
    /// responses that declare a non-HTML type are never touched either way.
    pub inject_without_content_type: bool,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        Self {
            inject_without_content_type: true,
        }
    }
}

impl InjectionPolicy {
    /// Whether a response with this `Content-Type` is eligible for injection.
    ///
    /// Matching is a case-sensitive substring test for `text/html`, so
    /// `text/html; charset=utf-8` qualifies.
    #[must_use]
    pub fn accepts(&self, content_type: Option<&HeaderValue>) -> bool {
        match content_type {
            None => self.inject_without_content_type,
            Some(value) => value
                .to_str()
                .is_ok_and(|content_type| content_type.contains("text/html")),
        }
    }
}

/// Live reload wiring for an axum application.
///
/// Holds the reload signal, the path of the status endpoint and the
/// injection policy. Cheap to clone.
///
/// ```ignore
/// let live_reload = LiveReload::new(signal.clone(), "/dev/reload-check");
/// let app = live_reload.attach(Router::new().route("/", get(index)));
/// ```
#[derive(Clone, Debug)]
pub struct LiveReload {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    signal: ReloadSignal,
    status_path: String,
    policy: InjectionPolicy,
}

impl LiveReload {
    /// Create live reload state serving `signal` at `status_path`.
    #[must_use]
    pub fn new(signal: ReloadSignal, status_path: impl Into<String>) -> Self {
        Self::with_policy(signal, status_path, InjectionPolicy::default())
    }

    /// Create live reload state with an explicit injection policy.
    #[must_use]
    pub fn with_policy(
        signal: ReloadSignal,
        status_path: impl Into<String>,
        policy: InjectionPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                signal,
                status_path: status_path.into(),
                policy,
            }),
        }
    }

    /// The shared reload signal.
    #[must_use]
    pub fn signal(&self) -> &ReloadSignal {
        &self.inner.signal
    }

    /// Path of the status endpoint.
    #[must_use]
    pub fn status_path(&self) -> &str {
        &self.inner.status_path
    }

    /// Injection policy.
    #[must_use]
    pub fn policy(&self) -> InjectionPolicy {
        self.inner.policy
    }

    /// Add the status route and the injection middleware to a router.
    ///
    /// The middleware wraps every route of `router`, including its fallback.
    #[must_use]
    pub fn attach<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .route(
                self.status_path(),
                get(handlers::status::reload_status).with_state(self.clone()),
            )
            .layer(axum::middleware::from_fn_with_state(
                self.clone(),
                middleware::inject::inject_reload_script,
            ))
    }
}
