//! Request-level tracking signals copied to the span before any capture rule applies.

use payload_capture_privacy::{cookie_pairs, header_value};
use payload_capture_types::attributes::{
    tracking_header_key, PARENT_SESSION_ID, SESSION_ID, USER_ID,
};
use payload_capture_types::{Attributes, HeaderMap};

use crate::exchange::CapturedRequest;

pub const TRACKED_TEST_HEADERS: &[&str] = &[
    "trackedtest.name",
    "trackedtest.suite",
    "trackedtest.step",
    "trackedtest.type",
    "trackedtest.invocation-id",
];

pub const SESSION_TRACKING_COOKIE: &str = "capture.session-record-tracking-id";
pub const PARENT_SESSION_TRACKING_COOKIE: &str = "capture.parent-session-record-tracking-id";
pub const SESSION_TRACKING_HEADER: &str = "capture-session-record-tracking-id";
pub const PARENT_SESSION_TRACKING_HEADER: &str = "capture-parent-session-record-tracking-id";
pub const CURRENT_USER_HEADER: &str = "capture-current-user-id";

/// Collects tracking attributes from request headers and cookies. Explicit tracking headers
/// override the cookies; empty values are ignored.
pub fn tracking_attributes(headers: &HeaderMap) -> Attributes {
    let mut attributes = Attributes::new();

    if let Some(cookie) = header_value(headers, "cookie") {
        let tracked = cookie_pairs(cookie).find(|(name, value)| {
            !value.is_empty()
                && (*name == SESSION_TRACKING_COOKIE || *name == PARENT_SESSION_TRACKING_COOKIE)
        });
        match tracked {
            Some((SESSION_TRACKING_COOKIE, value)) => {
                attributes.insert(SESSION_ID.to_string(), value.to_string());
            }
            Some((_, value)) => {
                attributes.insert(PARENT_SESSION_ID.to_string(), value.to_string());
            }
            None => {}
        }
    }

    let explicit = [
        (SESSION_TRACKING_HEADER, SESSION_ID),
        (PARENT_SESSION_TRACKING_HEADER, PARENT_SESSION_ID),
        (CURRENT_USER_HEADER, USER_ID),
    ];
    for (header, key) in explicit {
        if let Some(value) = non_empty(headers, header) {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    for header in TRACKED_TEST_HEADERS {
        if let Some(value) = non_empty(headers, header) {
            attributes.insert(tracking_header_key(header), value.to_string());
        }
    }

    attributes
}

/// `<proto>://<host><path>`, preferring `X-Forwarded-Proto` over the request scheme.
pub fn self_url(request: &CapturedRequest) -> String {
    let scheme = non_empty(&request.headers, "x-forwarded-proto").unwrap_or(&request.scheme);
    format!("{}://{}{}", scheme, request.host, request.path)
}

fn non_empty<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    header_value(headers, name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
