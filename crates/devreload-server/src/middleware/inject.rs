//! Reload script injection middleware.
//!
//! Rewrites HTML responses so that the polling script is placed right
//! before the first `</body>`. Everything else passes through untouched.
//!
//! A rewritten page carries the reload value current at response time, so it
//! must never be revalidated into a cached copy holding an older value.
//! Injected responses lose their validators and are marked uncacheable, and
//! conditional headers are dropped from page requests.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::script::render_script_tag;
use crate::state::LiveReload;

/// Closing tag the script is inserted in front of.
const BODY_CLOSE: &str = "</body>";

/// `Cache-Control` of a response carrying the script.
const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// Insert `script_tag` before the first `</body>` of `html`.
///
/// Returns `None` when the document has no `</body>`.
#[must_use]
pub fn inject_script(html: &str, script_tag: &str) -> Option<String> {
    let index = html.find(BODY_CLOSE)?;

    let mut injected = String::with_capacity(html.len() + script_tag.len());
    injected.push_str(&html[..index]);
    injected.push_str(script_tag);
    injected.push_str(&html[index..]);
    Some(injected)
}

/// Middleware entry point, used with `axum::middleware::from_fn_with_state`.
pub(crate) async fn inject_reload_script(
    State(live_reload): State<LiveReload>,
    mut request: Request,
    next: Next,
) -> Response {
    if accepts_html(request.headers()) {
        let headers = request.headers_mut();
        headers.remove(header::IF_MODIFIED_SINCE);
        headers.remove(header::IF_NONE_MATCH);
    }

    let response = next.run(request).await;

    // Only complete pages are rewritten
    if response.status() != StatusCode::OK {
        return response;
    }

    let headers = response.headers();
    let encoded = headers
        .get(header::CONTENT_ENCODING)
        .is_some_and(|encoding| encoding != "identity");
    if encoded || !live_reload.policy().accepts(headers.get(header::CONTENT_TYPE)) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to buffer response for script injection");
            return ServerError::Body(err).into_response();
        }
    };

    // Non UTF-8 bodies are not text payloads
    let Ok(html) = std::str::from_utf8(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    let script_tag = render_script_tag(live_reload.signal().current(), live_reload.status_path());
    match inject_script(html, &script_tag) {
        Some(injected) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.remove(header::LAST_MODIFIED);
            parts.headers.remove(header::ETAG);
            parts
                .headers
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
            Response::from_parts(parts, Body::from(injected))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

/// Page navigations announce `text/html` in `Accept`.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}
