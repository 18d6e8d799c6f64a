use std::env;
use std::path::PathBuf;

use payload_capture_types::{CaptureError, CaptureResult};
use serde_json::Value;
use tracing::debug;

const ENV_PREFIX: &str = "PAYLOAD_CAPTURE__";

/// Runtime switches for the capture filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureSettings {
    pub enabled: bool,
    pub request_capture: bool,
    pub response_capture: bool,
    pub config_path: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            request_capture: true,
            response_capture: true,
            config_path: None,
        }
    }
}

impl CaptureSettings {
    /// Defaults overlaid with `PAYLOAD_CAPTURE__*` environment variables.
    pub fn from_env() -> CaptureResult<Self> {
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> CaptureResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, raw) in vars {
            let Some(stripped) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let name = stripped.to_ascii_lowercase();
            let value = parse_env_value(raw.as_ref());
            match name.as_str() {
                "enabled" => settings.enabled = expect_bool(&name, value)?,
                "request_capture" => settings.request_capture = expect_bool(&name, value)?,
                "response_capture" => settings.response_capture = expect_bool(&name, value)?,
                "config_path" => {
                    settings.config_path = match value {
                        Value::Null => None,
                        Value::String(path) => Some(PathBuf::from(path)),
                        _ => Some(PathBuf::from(raw.as_ref())),
                    }
                }
                _ => debug!(key = %name, "unknown capture setting ignored"),
            }
        }
        Ok(settings)
    }
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Value::Number(int_val.into());
    }
    Value::String(raw.to_string())
}

fn expect_bool(key: &str, value: Value) -> CaptureResult<bool> {
    match value {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) if number.as_i64() == Some(0) => Ok(false),
        Value::Number(number) if number.as_i64() == Some(1) => Ok(true),
        other => Err(CaptureError::InvalidSetting {
            key: key.to_string(),
            reason: format!("expected a boolean, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_capture_both_sides() {
        let settings = CaptureSettings::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(settings, CaptureSettings::default());
        assert!(settings.enabled && settings.request_capture && settings.response_capture);
    }

    #[test]
    fn env_values_are_coerced() {
        let settings = CaptureSettings::from_vars([
            ("PAYLOAD_CAPTURE__ENABLED", "true"),
            ("PAYLOAD_CAPTURE__RESPONSE_CAPTURE", "0"),
            ("PAYLOAD_CAPTURE__CONFIG_PATH", "/etc/capture.yaml"),
            ("PAYLOAD_CAPTURE__SOMETHING_ELSE", "x"),
            ("UNRELATED", "false"),
        ])
        .unwrap();
        assert!(settings.enabled);
        assert!(!settings.response_capture);
        assert_eq!(settings.config_path, Some(PathBuf::from("/etc/capture.yaml")));
    }

    #[test]
    fn non_boolean_switch_is_rejected() {
        let err = CaptureSettings::from_vars([("PAYLOAD_CAPTURE__REQUEST_CAPTURE", "maybe")])
            .unwrap_err();
        match err {
            CaptureError::InvalidSetting { key, .. } => assert_eq!(key, "request_capture"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
