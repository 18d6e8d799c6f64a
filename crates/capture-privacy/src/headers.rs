//! Header sanitizer: drops ignored headers, then reads identity, session and extract
//! attributes from what is left.

use payload_capture_types::attributes::{PARENT_SESSION_ID, SESSION_ID, USER_ID};
use payload_capture_types::{Attributes, Direction, HeaderMap};
use tracing::debug;

/// Conventional session cookie names, compared case-insensitively.
pub const SESSION_COOKIE_NAMES: &[&str] = &["sessionid", "jsessionid", "phpsessid"];

#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderRules<'a> {
    pub ignored: &'a [String],
    pub extract: &'a [String],
    pub user_id_header: Option<&'a str>,
    pub session_header: Option<&'a str>,
    pub parent_session_header: Option<&'a str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizedHeaders {
    /// Remaining headers, keyed by lower-cased name.
    pub headers: HeaderMap,
    pub attributes: Attributes,
}

pub fn sanitize_headers(
    raw: &HeaderMap,
    rules: &HeaderRules<'_>,
    direction: Direction,
) -> SanitizedHeaders {
    let mut headers: HeaderMap = raw
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();

    let before = headers.len();
    headers.retain(|name, _| !is_ignored(name, rules.ignored));
    if headers.len() != before {
        debug!(
            removed = before - headers.len(),
            direction = direction.as_str(),
            "ignored headers removed"
        );
    }

    let mut attributes = Attributes::new();

    if let Some(value) = lookup(&headers, rules.user_id_header) {
        attributes.insert(USER_ID.to_string(), value.to_string());
    }

    if let Some(session) = lookup(&headers, rules.session_header) {
        let parent = lookup(&headers, rules.parent_session_header).unwrap_or(session);
        attributes.insert(SESSION_ID.to_string(), session.to_string());
        attributes.insert(PARENT_SESSION_ID.to_string(), parent.to_string());
    } else if direction == Direction::Request {
        if let Some(session) = headers.get("cookie").and_then(|c| session_from_cookie(c)) {
            attributes.insert(SESSION_ID.to_string(), session.to_string());
        }
    }

    for name in rules.extract {
        let name = name.trim().to_ascii_lowercase();
        if let Some(value) = headers.get(&name) {
            attributes.insert(name, value.clone());
        }
    }

    SanitizedHeaders {
        headers,
        attributes,
    }
}

/// Two-way, case-insensitive substring match between a header name and the ignore tokens.
pub fn is_ignored(name: &str, ignored: &[String]) -> bool {
    let name = name.to_ascii_lowercase();
    if name.is_empty() {
        return false;
    }
    ignored.iter().any(|token| {
        let token = token.trim().to_ascii_lowercase();
        !token.is_empty() && (name.contains(&token) || token.contains(&name))
    })
}

/// Case-insensitive header lookup.
pub fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn lookup<'h>(headers: &'h HeaderMap, name: Option<&str>) -> Option<&'h str> {
    name.filter(|name| !name.trim().is_empty())
        .and_then(|name| header_value(headers, name.trim()))
}

/// Iterates `name=value` pairs of a `Cookie` header. Pairs without `=` are skipped.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim()))
    })
}

/// First cookie whose name is one of `names` (case-insensitive).
pub fn cookie_value<'c>(header: &'c str, names: &[&str]) -> Option<&'c str> {
    cookie_pairs(header)
        .find(|(name, _)| names.iter().any(|known| name.eq_ignore_ascii_case(known)))
        .map(|(_, value)| value)
}

pub fn session_from_cookie(header: &str) -> Option<&str> {
    cookie_value(header, SESSION_COOKIE_NAMES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn auth_token_removes_every_variant() {
        let raw = headers(&[
            ("Authorization", "Bearer x"),
            ("X-Auth-Token", "t"),
            ("auth", "a"),
            ("Accept", "application/json"),
        ]);
        let ignored = strings(&["auth"]);
        let rules = HeaderRules {
            ignored: &ignored,
            ..HeaderRules::default()
        };
        let out = sanitize_headers(&raw, &rules, Direction::Request);
        assert_eq!(out.headers, headers(&[("accept", "application/json")]));
    }

    #[test]
    fn token_longer_than_header_name_still_matches() {
        let ignored = strings(&["x-api-key-secret"]);
        assert!(is_ignored("X-API-Key", &ignored));
        assert!(!is_ignored("accept", &ignored));
        assert!(!is_ignored("accept", &strings(&["", "  "])));
    }

    #[test]
    fn removed_headers_contribute_no_attributes() {
        let raw = headers(&[("X-User-Id", "u-1"), ("X-Tenant", "acme")]);
        let ignored = strings(&["x-user"]);
        let extract = strings(&["x-user-id", "X-Tenant"]);
        let rules = HeaderRules {
            ignored: &ignored,
            extract: &extract,
            user_id_header: Some("x-user-id"),
            ..HeaderRules::default()
        };
        let out = sanitize_headers(&raw, &rules, Direction::Request);
        assert!(!out.attributes.contains_key(USER_ID));
        assert!(!out.attributes.contains_key("x-user-id"));
        assert_eq!(out.attributes.get("x-tenant").map(String::as_str), Some("acme"));
    }

    #[test]
    fn session_header_is_its_own_parent() {
        let raw = headers(&[("X-Session-Id", "s-1"), ("X-User-Id", "u-1")]);
        let rules = HeaderRules {
            user_id_header: Some("X-User-Id"),
            session_header: Some("x-session-id"),
            ..HeaderRules::default()
        };
        let out = sanitize_headers(&raw, &rules, Direction::Response);
        assert_eq!(out.attributes.get(USER_ID).map(String::as_str), Some("u-1"));
        assert_eq!(out.attributes.get(SESSION_ID).map(String::as_str), Some("s-1"));
        assert_eq!(
            out.attributes.get(PARENT_SESSION_ID).map(String::as_str),
            Some("s-1")
        );
    }

    #[test]
    fn explicit_parent_session_header_wins() {
        let raw = headers(&[("x-session-id", "s-2"), ("x-parent-session-id", "s-1")]);
        let rules = HeaderRules {
            session_header: Some("x-session-id"),
            parent_session_header: Some("x-parent-session-id"),
            ..HeaderRules::default()
        };
        let out = sanitize_headers(&raw, &rules, Direction::Request);
        assert_eq!(
            out.attributes.get(PARENT_SESSION_ID).map(String::as_str),
            Some("s-1")
        );
    }

    #[test]
    fn request_cookie_provides_session() {
        let raw = headers(&[("Cookie", "theme=dark; JSESSIONID=abc123; sessionid=zzz")]);
        let out = sanitize_headers(&raw, &HeaderRules::default(), Direction::Request);
        assert_eq!(
            out.attributes.get(SESSION_ID).map(String::as_str),
            Some("abc123")
        );
        assert!(!out.attributes.contains_key(PARENT_SESSION_ID));

        let response = sanitize_headers(&raw, &HeaderRules::default(), Direction::Response);
        assert!(response.attributes.is_empty());
    }

    #[test]
    fn cookie_pairs_skip_malformed_entries() {
        let pairs: Vec<_> = cookie_pairs("a=1; broken; =x;b = 2 ").collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
        assert_eq!(session_from_cookie("PHPSESSID=p"), Some("p"));
        assert_eq!(session_from_cookie("other=p"), None);
    }
}
