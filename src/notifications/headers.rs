//! Reads notification signals out of response headers.
//!
//! The server sends the message twice: base64 of the UTF-8 text (safe for
//! non-ASCII) and as a plain header that only survives ASCII. The encoded
//! form wins when it decodes cleanly.

use super::types::{Notification, Severity};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{HeaderMap, HeaderValue};

pub const NOTIFICATION_BASE64_HEADER: &str = "x-notification-base64";
pub const NOTIFICATION_HEADER: &str = "x-notification";
pub const NOTIFICATION_TYPE_HEADER: &str = "x-notification-type";
pub const TRIGGER_HEADER: &str = "hx-trigger";

/// Extract the notification signalled by a completed exchange, if any.
pub fn decode_notification(headers: &HeaderMap) -> Option<Notification> {
    let message = headers
        .get(NOTIFICATION_BASE64_HEADER)
        .and_then(decode_base64_message)
        .or_else(|| headers.get(NOTIFICATION_HEADER).and_then(plain_message))?;

    let severity = Severity::parse_lenient(
        headers
            .get(NOTIFICATION_TYPE_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    Notification::new(message, severity).ok()
}

fn decode_base64_message(value: &HeaderValue) -> Option<String> {
    let encoded = value.to_str().ok()?.trim();
    let bytes = match BASE64.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Malformed {} header, using plain header: {}", NOTIFICATION_BASE64_HEADER, e);
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) if !text.is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("{} is not UTF-8, using plain header: {}", NOTIFICATION_BASE64_HEADER, e);
            None
        }
    }
}

fn plain_message(value: &HeaderValue) -> Option<String> {
    std::str::from_utf8(value.as_bytes())
        .ok()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Signal names carried by `HX-Trigger`.
///
/// Accepts both the bare form (`topic-created, refresh`) and the JSON object
/// form (`{"topic-created": {...}}`), in which case the keys are the names.
pub fn triggered_signals(headers: &HeaderMap) -> Vec<String> {
    let Some(raw) = headers.get(TRIGGER_HEADER).and_then(|v| v.to_str().ok()) else {
        return Vec::new();
    };
    let raw = raw.trim();

    if raw.starts_with('{') {
        return match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            Ok(object) => object.keys().cloned().collect(),
            Err(e) => {
                tracing::warn!("Ignoring unparsable {} header: {}", TRIGGER_HEADER, e);
                Vec::new()
            }
        };
    }

    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
