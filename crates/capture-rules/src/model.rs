use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capture policy for one URI pattern and one direction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureRule {
    /// Body field paths copied into attributes.
    #[serde(alias = "extract_to_span_attributes")]
    pub extract_to_attributes: Vec<String>,
    /// Header names copied into attributes.
    #[serde(alias = "extract_headers_to_span_attributes")]
    pub extract_headers_to_attributes: Vec<String>,
    /// Body field paths blanked before emission.
    pub ignored_fields: Vec<String>,
    pub ignored_headers: Vec<String>,
    pub user_id_field: Option<String>,
    pub ignore_payload: bool,
}

impl CaptureRule {
    /// Rule used for a direction whose section is absent from the config.
    pub fn ignoring() -> Self {
        Self {
            ignore_payload: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(alias = "ignored_urls")]
    pub ignored_url_patterns: Vec<String>,
    pub ignored_headers: Vec<String>,
    pub user_id_header: Option<String>,
    #[serde(alias = "session_record_tracking_id_header")]
    pub session_tracking_header: Option<String>,
    #[serde(alias = "parent_session_record_tracking_id_header")]
    pub parent_session_tracking_header: Option<String>,
    #[serde(alias = "enable_options_call_tracking")]
    pub track_options_requests: bool,
}

/// Per-pattern entry of `url_configs`. A missing direction means that direction is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    pub request: Option<CaptureRule>,
    pub response: Option<CaptureRule>,
}

/// Root of the YAML capture config.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfigFile {
    pub builtin_guards: bool,
    pub global_config: GlobalConfig,
    pub url_configs: IndexMap<String, Option<UrlConfig>>,
}
