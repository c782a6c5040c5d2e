//! Static file serving.
//!
//! Serves the configured root directory; directory requests resolve to their
//! `index.html`.

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

/// Create a router serving files under `root` as its fallback.
pub(crate) fn static_router(root: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
}
