//! Host-facing capture filter.
//!
//! The host calls [`CaptureFilter::on_request`] before its handler runs and
//! [`CaptureFilter::on_response`] once the response is buffered. Neither call can fail the
//! host exchange: capture problems are logged and dropped.

use std::sync::Arc;

use payload_capture_rules::{load_rule_table_or_empty, RuleTable};
use payload_capture_types::attributes::{REQUEST_PAYLOAD, RESPONSE_PAYLOAD, SELF_URL};
use payload_capture_types::ExtractResult;
use tracing::{debug, warn};

use crate::exchange::{CapturedRequest, CapturedResponse};
use crate::extract::Extractor;
use crate::settings::CaptureSettings;
use crate::sink::SpanSink;
use crate::tracking::{self_url, tracking_attributes};

#[derive(Clone, Debug)]
pub struct CaptureFilter {
    settings: CaptureSettings,
    extractor: Extractor,
}

impl CaptureFilter {
    pub fn new(settings: CaptureSettings, table: Arc<RuleTable>) -> Self {
        Self {
            settings,
            extractor: Extractor::new(table),
        }
    }

    /// Loads the rule table from `settings.config_path`, falling back to an empty table.
    pub fn from_settings(settings: CaptureSettings) -> Self {
        let table = load_rule_table_or_empty(settings.config_path.as_deref());
        Self::new(settings, Arc::new(table))
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn on_request(&self, request: &CapturedRequest, sink: &mut dyn SpanSink) {
        if !self.settings.enabled {
            return;
        }
        for (key, value) in tracking_attributes(&request.headers) {
            sink.set_attribute(&key, value);
        }
        if !self.settings.request_capture && !self.settings.response_capture {
            return;
        }
        if self.extractor.table().is_globally_ignored(&request.path) {
            debug!(path = %request.path, "globally ignored path");
            return;
        }
        sink.set_attribute(SELF_URL, self_url(request));

        if self.settings.request_capture {
            if let Some(result) = self.extractor.extract_request(request) {
                publish(result, REQUEST_PAYLOAD, sink);
            }
        }
    }

    pub fn on_response(
        &self,
        request: &CapturedRequest,
        response: &CapturedResponse,
        sink: &mut dyn SpanSink,
    ) {
        if !self.settings.enabled || !self.settings.response_capture {
            return;
        }
        if let Some(result) = self.extractor.extract_response(request, response) {
            publish(result, RESPONSE_PAYLOAD, sink);
        }
    }
}

fn publish(result: ExtractResult, payload_key: &str, sink: &mut dyn SpanSink) {
    let ExtractResult {
        payload,
        attributes,
    } = result;
    for (key, value) in attributes {
        sink.set_attribute(&key, value);
    }
    if payload.is_empty() {
        return;
    }
    match payload.with_span_id(sink.span_id()).to_json() {
        Ok(json) => sink.set_attribute(payload_key, json),
        Err(err) => warn!(%err, key = payload_key, "payload not attached to span"),
    }
}
