//! Field redactor/extractor for JSON bodies.

use payload_capture_types::attributes::USER_ID;
use payload_capture_types::Attributes;
use serde_json::Value;
use tracing::debug;

use crate::errors::{PrivacyError, PrivacyResult};
use crate::jsonpath::{stringify, JsonPath, Resolved};

/// Field paths that apply to one body.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldRules<'a> {
    pub extract: &'a [String],
    pub redact: &'a [String],
    pub user_id: Option<&'a str>,
}

impl FieldRules<'_> {
    pub fn is_empty(&self) -> bool {
        self.extract.is_empty() && self.redact.is_empty() && self.user_id.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonOutcome {
    pub body: String,
    pub attributes: Attributes,
}

/// Redacts, then extracts. The body is re-serialized only when a redaction path resolved;
/// otherwise it is returned byte for byte.
pub fn process_json(raw: &str, rules: &FieldRules<'_>) -> PrivacyResult<JsonOutcome> {
    if rules.is_empty() {
        return Ok(JsonOutcome {
            body: raw.to_string(),
            attributes: Attributes::new(),
        });
    }

    let mut document: Value =
        serde_json::from_str(raw).map_err(|err| PrivacyError::MalformedJson(format!("{}", err)))?;

    let blank = Value::String(String::new());
    let mut redacted = 0;
    for path in rules.redact {
        if let Some(path) = parse_path(path) {
            redacted += path.replace_all(&mut document, &blank);
        }
    }

    let mut attributes = Attributes::new();
    for raw_path in rules.extract {
        let Some(path) = parse_path(raw_path) else {
            continue;
        };
        if let Some(value) = path.resolve(&document).and_then(attribute_value) {
            attributes.insert(attribute_key(raw_path).to_string(), value);
        }
    }

    if let Some(path) = rules.user_id.and_then(parse_path) {
        let user = match path.resolve(&document) {
            Some(Resolved::Single(Value::Array(items))) => items.first().map(stringify),
            Some(Resolved::Single(value)) => Some(stringify(value)),
            Some(Resolved::List(values)) => values.first().map(|value| stringify(value)),
            None => None,
        };
        if let Some(user) = user {
            attributes.insert(USER_ID.to_string(), user);
        }
    }

    let body = if redacted > 0 {
        debug!(fields = redacted, "json fields redacted");
        serde_json::to_string(&document)
            .map_err(|err| PrivacyError::Serialization(format!("{}", err)))?
    } else {
        raw.to_string()
    };

    Ok(JsonOutcome { body, attributes })
}

/// The attribute key for an extract path is the text after its last `.`.
pub fn attribute_key(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn parse_path(raw: &str) -> Option<JsonPath> {
    match JsonPath::parse(raw) {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(%err, "skipping json path");
            None
        }
    }
}

fn attribute_value(resolved: Resolved<'_>) -> Option<String> {
    match resolved {
        Resolved::Single(Value::Array(items)) if items.is_empty() => None,
        Resolved::Single(Value::Array(items)) => Some(join(items.iter())),
        Resolved::Single(value) => Some(stringify(value)),
        Resolved::List(values) if values.is_empty() => None,
        Resolved::List(values) => Some(join(values.into_iter())),
    }
}

fn join<'v>(values: impl Iterator<Item = &'v Value>) -> String {
    values.map(stringify).collect::<Vec<_>>().join(",")
}
