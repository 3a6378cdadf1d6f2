use serde::Serialize;

use crate::providers::UPSTREAM_BODY_PREVIEW_CHARS;

pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

/// First `UPSTREAM_BODY_PREVIEW_CHARS` characters of a body, for logs.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    let raw_body = String::from_utf8_lossy(bytes);
    format!("{:.len$}", raw_body, len = UPSTREAM_BODY_PREVIEW_CHARS)
}

/// Drains a response for logging; read failures become the preview text.
pub(crate) async fn response_preview(resp: reqwest::Response) -> String {
    match resp.bytes().await {
        Ok(bytes) => body_preview(&bytes),
        Err(e) => format!("<failed to read body: {}>", e.without_url()),
    }
}
