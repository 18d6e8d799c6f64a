//! URL-encoded and multipart form handlers.
//!
//! Form fields are matched by exact key. A configured entry may carry a leading `$.`
//! so the same rule list can be shared with JSON bodies.

use std::collections::BTreeMap;

use payload_capture_types::attributes::USER_ID;
use payload_capture_types::Attributes;
use tracing::debug;

use crate::errors::{PrivacyError, PrivacyResult};
use crate::redact::FieldRules;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormOutcome {
    /// Fields kept in the emitted body.
    pub fields: BTreeMap<String, String>,
    pub attributes: Attributes,
}

impl FormOutcome {
    fn absorb(&mut self, key: String, value: String, rules: &FieldRules<'_>) {
        if rules.extract.iter().any(|entry| field_matches(entry, &key)) {
            self.attributes.insert(key.clone(), value.clone());
        }
        if rules.user_id.is_some_and(|entry| field_matches(entry, &key)) {
            self.attributes.insert(USER_ID.to_string(), value.clone());
        }
        if !rules.redact.iter().any(|entry| field_matches(entry, &key)) {
            self.fields.insert(key, value);
        }
    }
}

pub fn field_matches(configured: &str, key: &str) -> bool {
    let configured = configured.trim();
    configured == key || configured.strip_prefix("$.") == Some(key)
}

/// Handles `application/x-www-form-urlencoded` bodies. Pairs without exactly one `=` are
/// skipped; keys and values that fail to decode are kept as sent.
pub fn process_urlencoded(body: &str, rules: &FieldRules<'_>) -> FormOutcome {
    let mut outcome = FormOutcome::default();
    for (key, value) in split_pairs(body) {
        outcome.absorb(decode_component(key), decode_component(value), rules);
    }
    outcome
}

/// Splits `a=1&b=2` into pairs, dropping segments without exactly one `=`.
pub fn split_pairs(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split('&').filter_map(|pair| {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.is_empty() => Some((key, value)),
            _ => None,
        }
    })
}

pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            debug!(%err, "form component kept undecoded");
            raw.to_string()
        }
    }
}

/// Handles `multipart/form-data` bodies. Parts that carry a filename are file uploads and
/// are never captured.
pub fn process_multipart(
    body: &[u8],
    content_type: &str,
    rules: &FieldRules<'_>,
) -> PrivacyResult<FormOutcome> {
    let boundary = multipart_boundary(content_type).ok_or(PrivacyError::MissingBoundary)?;
    let delimiter = format!("--{}", boundary).into_bytes();

    let mut outcome = FormOutcome::default();
    let mut skipped_files = 0usize;
    let mut cursor = match find(body, &delimiter, 0) {
        Some(index) => index + delimiter.len(),
        None => return Ok(outcome),
    };

    // A delimiter followed by `--` closes the body.
    while !body[cursor..].starts_with(b"--") {
        let Some(next) = find(body, &delimiter, cursor) else {
            break;
        };
        let part = &body[cursor..next];
        cursor = next + delimiter.len();
        let Some(part) = parse_part(part) else {
            continue;
        };
        if part.filename {
            skipped_files += 1;
            continue;
        }
        if let Some(name) = part.name {
            let value = String::from_utf8_lossy(part.content).into_owned();
            outcome.absorb(name, value, rules);
        }
    }

    if skipped_files > 0 {
        debug!(files = skipped_files, "multipart file parts skipped");
    }
    Ok(outcome)
}

/// Extracts the `boundary` parameter from a multipart content type.
pub fn multipart_boundary(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then_some(value)
    })
}

struct Part<'b> {
    name: Option<String>,
    filename: bool,
    content: &'b [u8],
}

fn parse_part(raw: &[u8]) -> Option<Part<'_>> {
    let raw = strip_line_break_prefix(raw);
    let (head, content) = match find(raw, b"\r\n\r\n", 0) {
        Some(index) => (&raw[..index], &raw[index + 4..]),
        None => {
            let index = find(raw, b"\n\n", 0)?;
            (&raw[..index], &raw[index + 2..])
        }
    };
    let content = strip_line_break_suffix(content);
    let head = String::from_utf8_lossy(head);

    let mut name = None;
    let mut filename = false;
    for line in head.lines() {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        if !header.trim().eq_ignore_ascii_case("content-disposition") {
            continue;
        }
        for param in value.split(';').skip(1) {
            let Some((key, param_value)) = param.split_once('=') else {
                continue;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "name" => name = Some(param_value.trim().trim_matches('"').to_string()),
                "filename" | "filename*" => filename = true,
                _ => {}
            }
        }
    }
    Some(Part {
        name,
        filename,
        content,
    })
}

fn strip_line_break_prefix(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(b"\r\n")
        .or_else(|| raw.strip_prefix(b"\n"))
        .unwrap_or(raw)
}

fn strip_line_break_suffix(raw: &[u8]) -> &[u8] {
    raw.strip_suffix(b"\r\n")
        .or_else(|| raw.strip_suffix(b"\n"))
        .unwrap_or(raw)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|index| index + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn urlencoded_fields_are_decoded_and_filtered() {
        let extract = strings(&["$.email"]);
        let redact = strings(&["password", "email"]);
        let rules = FieldRules {
            extract: &extract,
            redact: &redact,
            user_id: Some("user"),
        };
        let out = process_urlencoded(
            "user=bob+smith&email=bob%40example.com&password=hunter2&broken&a=b=c&note=%E2%9C%93",
            &rules,
        );
        let mut expected = BTreeMap::new();
        expected.insert("user".to_string(), "bob smith".to_string());
        expected.insert("note".to_string(), "\u{2713}".to_string());
        assert_eq!(out.fields, expected);
        assert_eq!(
            out.attributes.get("email").map(String::as_str),
            Some("bob@example.com")
        );
        assert_eq!(
            out.attributes.get(USER_ID).map(String::as_str),
            Some("bob smith")
        );
    }

    #[test]
    fn undecodable_components_survive_raw() {
        let out = process_urlencoded("k=%FF%FE&ok=%zz", &FieldRules::default());
        assert_eq!(out.fields.get("k").map(String::as_str), Some("%FF%FE"));
        assert_eq!(out.fields.get("ok").map(String::as_str), Some("%zz"));
    }

    #[test]
    fn pairs_need_exactly_one_equals() {
        let pairs: Vec<_> = split_pairs("a=1&b=2&bad&c=&=x&d=1=2").collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "")]);
    }

    #[test]
    fn multipart_skips_file_parts() {
        let body = concat!(
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"username\"\r\n",
            "\r\n",
            "alice\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"secret\"\r\n",
            "\r\n",
            "s3cr3t\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n",
            "Content-Type: image/png\r\n",
            "\r\n",
            "PNGDATA\r\n",
            "--XyZ--\r\n"
        );
        let redact = strings(&["secret"]);
        let rules = FieldRules {
            redact: &redact,
            user_id: Some("$.username"),
            ..FieldRules::default()
        };
        let out = process_multipart(
            body.as_bytes(),
            "multipart/form-data; boundary=\"XyZ\"",
            &rules,
        )
        .unwrap();
        let mut expected = BTreeMap::new();
        expected.insert("username".to_string(), "alice".to_string());
        assert_eq!(out.fields, expected);
        assert_eq!(out.attributes.get(USER_ID).map(String::as_str), Some("alice"));
        assert!(!out.attributes.contains_key("avatar"));
    }

    #[test]
    fn multipart_without_boundary_is_an_error() {
        assert!(matches!(
            process_multipart(b"--x\r\n", "multipart/form-data", &FieldRules::default()),
            Err(PrivacyError::MissingBoundary)
        ));
        assert_eq!(
            multipart_boundary("multipart/form-data; charset=utf-8; Boundary=abc"),
            Some("abc")
        );
    }
}
