//! Request and response extraction entry points.

use std::sync::Arc;

use payload_capture_privacy::{header_value, sanitize_headers, FieldRules, HeaderRules};
use payload_capture_rules::{MergedRule, RuleTable};
use payload_capture_types::{Direction, ExtractResult, HeaderMap, HttpPayload, Payload};
use tracing::debug;

use crate::assemble::{build_body, parse_query_string};
use crate::exchange::{CapturedRequest, CapturedResponse, RawBody};

/// Runs the full pipeline against a shared, read-only rule table.
#[derive(Clone, Debug)]
pub struct Extractor {
    table: Arc<RuleTable>,
}

impl Extractor {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// `None` when the method is skipped outright (untracked `OPTIONS`).
    pub fn extract_request(&self, request: &CapturedRequest) -> Option<ExtractResult> {
        let parts = Parts {
            method: &request.method,
            headers: &request.headers,
            body: &request.body,
            query: request.query.as_deref(),
            emit_method: true,
            status: None,
        };
        self.extract(&request.path, Direction::Request, parts)
    }

    pub fn extract_response(
        &self,
        request: &CapturedRequest,
        response: &CapturedResponse,
    ) -> Option<ExtractResult> {
        let parts = Parts {
            method: &request.method,
            headers: &response.headers,
            body: &response.body,
            query: None,
            emit_method: false,
            status: Some(response.status),
        };
        self.extract(&request.path, Direction::Response, parts)
    }

    fn extract(&self, path: &str, direction: Direction, parts: Parts<'_>) -> Option<ExtractResult> {
        if self.table.skips_method(parts.method) {
            debug!(path, direction = direction.as_str(), "options request skipped");
            return None;
        }

        let resolution = self.table.resolve(path, direction);
        if resolution.ignore {
            return Some(ExtractResult::ignored());
        }
        Some(self.capture(direction, &resolution.rule, parts))
    }

    fn capture(
        &self,
        direction: Direction,
        rule: &MergedRule,
        parts: Parts<'_>,
    ) -> ExtractResult {
        let global = self.table.global();
        let header_rules = HeaderRules {
            ignored: &rule.ignored_headers,
            extract: &rule.extract_headers_to_attributes,
            user_id_header: global.user_id_header.as_deref(),
            session_header: global.session_tracking_header.as_deref(),
            parent_session_header: global.parent_session_tracking_header.as_deref(),
        };
        let sanitized = sanitize_headers(parts.headers, &header_rules, direction);

        let field_rules = FieldRules {
            extract: &rule.extract_to_attributes,
            redact: &rule.ignored_fields,
            user_id: rule.user_id_field.as_deref(),
        };
        let content_type = header_value(parts.headers, "content-type");
        let (body, body_attributes) = build_body(parts.body, content_type, &field_rules);

        let mut attributes = sanitized.attributes;
        attributes.extend(body_attributes);

        let payload = Payload::http(HttpPayload {
            header_map: sanitized.headers,
            query_param_map: parse_query_string(parts.query),
            http_method: parts
                .emit_method
                .then(|| parts.method.to_ascii_uppercase()),
            response_code: parts.status,
            body,
        });
        ExtractResult::new(payload, attributes)
    }
}

struct Parts<'a> {
    method: &'a str,
    headers: &'a HeaderMap,
    body: &'a RawBody,
    query: Option<&'a str>,
    /// Only request payloads carry the method.
    emit_method: bool,
    status: Option<u16>,
}
