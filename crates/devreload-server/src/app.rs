//! Router construction.

use std::path::Path;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::LiveReload;
use crate::static_files;

/// Create the development server router.
///
/// Serves `root` and, when `live_reload` is set, adds the status endpoint and
/// wraps every response with the injection middleware.
pub(crate) fn create_router(root: &Path, live_reload: Option<&LiveReload>) -> Router {
    let mut router = static_files::static_router(root);

    if let Some(live_reload) = live_reload {
        router = live_reload.attach(router);
    }

    router.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use devreload_core::ReloadSignal;
    use tower::ServiceExt;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>Home</h1></body></html>",
        )
        .unwrap();
        std::fs::write(dir.path().join("app.css"), "body {}").unwrap();
        dir
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_static_html_gets_script_when_enabled() {
        let dir = site();
        let live_reload = LiveReload::new(ReloadSignal::starting_at(77), "/dev/reload-check");
        let router = create_router(dir.path(), Some(&live_reload));

        let (status, body) = get(router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"var lastKnown = "77";"#));
        assert!(body.ends_with("</script></body></html>"));
    }

    #[tokio::test]
    async fn test_static_css_untouched() {
        let dir = site();
        let live_reload = LiveReload::new(ReloadSignal::starting_at(77), "/dev/reload-check");
        let router = create_router(dir.path(), Some(&live_reload));

        let (_, body) = get(router, "/app.css").await;
        assert_eq!(body, "body {}");
    }

    #[tokio::test]
    async fn test_status_route_served() {
        let dir = site();
        let live_reload = LiveReload::new(ReloadSignal::starting_at(77), "/dev/reload-check");
        let router = create_router(dir.path(), Some(&live_reload));

        let (status, body) = get(router, "/dev/reload-check").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "77");
    }

    #[tokio::test]
    async fn test_disabled_live_reload_serves_plain_files() {
        let dir = site();
        let router = create_router(dir.path(), None);

        let (_, body) = get(router.clone(), "/").await;
        assert_eq!(body, "<html><body><h1>Home</h1></body></html>");

        let (status, _) = get(router, "/dev/reload-check").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_after_trigger_serves_fresh_page() {
        let dir = site();
        let signal = ReloadSignal::starting_at(100);
        let live_reload = LiveReload::new(signal.clone(), "/dev/reload-check");
        let router = create_router(dir.path(), Some(&live_reload));

        let first = router
            .clone()
            .oneshot(
                Request::get("/")
                    .header(header::ACCEPT, "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(first.headers().get(header::LAST_MODIFIED).is_none());
        assert!(first.headers().get(header::ETAG).is_none());

        let value = signal.trigger();
        let reload = router
            .oneshot(
                Request::get("/")
                    .header(header::ACCEPT, "text/html,*/*;q=0.8")
                    .header(header::IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(reload.status(), StatusCode::OK);
        let body = to_bytes(reload.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(&format!(r#"var lastKnown = "{value}";"#)));
    }

    #[tokio::test]
    async fn test_conditional_asset_request_still_revalidates() {
        let dir = site();
        let live_reload = LiveReload::new(ReloadSignal::starting_at(1), "/dev/reload-check");
        let router = create_router(dir.path(), Some(&live_reload));

        let response = router
            .oneshot(
                Request::get("/app.css")
                    .header(header::ACCEPT, "text/css,*/*;q=0.1")
                    .header(header::IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }
}
