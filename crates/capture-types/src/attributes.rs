//! Span attribute keys written by the capture engine.

use std::collections::BTreeMap;

/// Flat key/value pairs destined for a tracing span. Keys are unique; the last write wins.
pub type Attributes = BTreeMap<String, String>;

pub const USER_ID: &str = "capture.derived.user.id";
pub const SESSION_ID: &str = "capture.derived.session_id";
pub const PARENT_SESSION_ID: &str = "capture.derived.parent_session_id";
pub const REQUEST_PAYLOAD: &str = "capture.derived.request.payload";
pub const RESPONSE_PAYLOAD: &str = "capture.derived.response.payload";
pub const SELF_URL: &str = "capture.derived.url.path.self";

/// Prefix for request headers copied verbatim by the tracking extractor.
pub const TRACKING_HEADER_PREFIX: &str = "http.request.header.";

pub fn tracking_header_key(header: &str) -> String {
    format!("{}{}", TRACKING_HEADER_PREFIX, header)
}
