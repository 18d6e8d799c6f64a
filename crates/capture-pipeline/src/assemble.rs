//! Payload assembler: turns a routed body plus sanitized headers into the emitted record.

use std::collections::BTreeMap;

use payload_capture_privacy::form::split_pairs;
use payload_capture_privacy::{process_json, process_multipart, process_urlencoded, FieldRules};
use payload_capture_types::{Attributes, BinaryBody, Body, KeyValueBody};
use tracing::warn;

use crate::content::{classify, BodyKind};
use crate::exchange::RawBody;

/// Parses a raw query string. Pairs without exactly one `=` are skipped; keys and values
/// are stored as sent, without percent-decoding.
pub fn parse_query_string(raw: Option<&str>) -> BTreeMap<String, String> {
    raw.map(|raw| {
        split_pairs(raw)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    })
    .unwrap_or_default()
}

/// Routes `raw` by `content_type` and returns the body variant with any body-derived
/// attributes. An empty body still yields the routed variant, with empty content.
pub fn build_body(
    raw: &RawBody,
    content_type: Option<&str>,
    rules: &FieldRules<'_>,
) -> (Option<Body>, Attributes) {
    let bytes: &[u8] = match raw {
        RawBody::Empty => &[],
        RawBody::Opaque(bytes) => {
            return (
                Some(Body::Binary(BinaryBody {
                    data: bytes.clone(),
                })),
                Attributes::new(),
            )
        }
        RawBody::Buffered(bytes) => bytes,
    };

    let kind = classify(content_type);
    if bytes.is_empty() {
        return (Some(empty_body(kind)), Attributes::new());
    }
    match kind {
        BodyKind::Json => {
            let text = String::from_utf8_lossy(bytes);
            match process_json(&text, rules) {
                Ok(outcome) => (Some(Body::Json(outcome.body)), outcome.attributes),
                Err(err) => {
                    warn!(%err, "json body dropped from capture");
                    (Some(Body::Json(String::new())), Attributes::new())
                }
            }
        }
        BodyKind::FormUrlEncoded => {
            let text = String::from_utf8_lossy(bytes);
            let outcome = process_urlencoded(&text, rules);
            (
                Some(Body::FormUrlEncoded(KeyValueBody::from(outcome.fields))),
                outcome.attributes,
            )
        }
        BodyKind::FormData => {
            let content_type = content_type.unwrap_or_default();
            match process_multipart(bytes, content_type, rules) {
                Ok(outcome) => (
                    Some(Body::FormData(KeyValueBody::from(outcome.fields))),
                    outcome.attributes,
                ),
                Err(err) => {
                    warn!(%err, "multipart body dropped from capture");
                    (Some(Body::FormData(KeyValueBody::default())), Attributes::new())
                }
            }
        }
        BodyKind::Html => (Some(Body::Html(text_of(bytes))), Attributes::new()),
        BodyKind::Xml => (Some(Body::Xml(text_of(bytes))), Attributes::new()),
        BodyKind::Text | BodyKind::Unknown => (Some(Body::Text(text_of(bytes))), Attributes::new()),
    }
}

fn empty_body(kind: BodyKind) -> Body {
    match kind {
        BodyKind::Json => Body::Json(String::new()),
        BodyKind::Html => Body::Html(String::new()),
        BodyKind::Xml => Body::Xml(String::new()),
        BodyKind::FormUrlEncoded => Body::FormUrlEncoded(KeyValueBody::default()),
        BodyKind::FormData => Body::FormData(KeyValueBody::default()),
        BodyKind::Text | BodyKind::Unknown => Body::Text(String::new()),
    }
}

fn text_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
