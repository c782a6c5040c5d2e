//! Reload status endpoint.
//!
//! Returns the current reload signal as a decimal string. Polled by the
//! injected script; never cached.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::LiveReload;

/// Headers that disable caching of the status response.
const NO_CACHE_HEADERS: [(header::HeaderName, &str); 4] = [
    (header::CONTENT_TYPE, "text/plain"),
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

/// Handle `GET <status_path>`.
pub(crate) async fn reload_status(State(live_reload): State<LiveReload>) -> impl IntoResponse {
    (NO_CACHE_HEADERS, live_reload.signal().current().to_string())
}
