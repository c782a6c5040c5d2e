//! Polling script generation.
//!
//! The injected script remembers the signal value it was rendered with and
//! polls the status endpoint once a second, reloading the page when the
//! returned value differs. Failed polls are logged to the console and the
//! next tick tries again.

/// Interval between polls, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1000;

const TEMPLATE: &str = r#"
(function () {
  var lastKnown = __LAST_KNOWN__;
  var statusUrl = __STATUS_URL__;
  setInterval(function () {
    fetch(statusUrl, { cache: "no-store" })
      .then(function (response) {
        if (!response.ok) {
          throw new Error("status " + response.status);
        }
        return response.text();
      })
      .then(function (value) {
        if (value.trim() !== lastKnown) {
          window.location.reload();
        }
      })
      .catch(function (err) {
        console.log("devreload: poll failed", err);
      });
  }, __INTERVAL__);
})();
"#;

/// Render the script body (without `<script>` tags).
///
/// `last_known` is the signal value at the time the page is produced.
#[must_use]
pub fn render_script(last_known: u64, status_path: &str) -> String {
    // Caller-supplied text goes in last so it is never rescanned
    TEMPLATE
        .replace("__INTERVAL__", &POLL_INTERVAL_MS.to_string())
        .replace("__LAST_KNOWN__", &js_string(&last_known.to_string()))
        .replace("__STATUS_URL__", &js_string(status_path))
}

/// Render the full `<script>…</script>` element.
#[must_use]
pub fn render_script_tag(last_known: u64, status_path: &str) -> String {
    format!("<script>{}</script>", render_script(last_known, status_path))
}

/// Quote a value as a JavaScript string literal that is safe inside a
/// `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace('<', "\\u003c")
}
