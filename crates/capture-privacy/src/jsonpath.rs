//! A small JSON path evaluator over `serde_json::Value`.
//!
//! Supported syntax: `$` root (implied when omitted), `.name`, `['name']`, `['a','b']`,
//! `[n]` with negative indexes counted from the end, `[a,b]`, `[start:end]`, `[*]`,
//! `.*`, and `..` deep scan in front of any of them. Filter and script expressions are
//! rejected by [`JsonPath::parse`].

use std::fmt;

use serde_json::Value;

use crate::errors::{PrivacyError, PrivacyResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Selector {
    Keys(Vec<String>),
    Indexes(Vec<i64>),
    Slice { start: Option<i64>, end: Option<i64> },
    Wildcard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    recursive: bool,
    selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    steps: Vec<Step>,
}

/// Outcome of evaluating a path against a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<'v> {
    /// A definite path that hit a value.
    Single(&'v Value),
    /// Every value matched by an indefinite path, possibly none.
    List(Vec<&'v Value>),
}

impl JsonPath {
    pub fn parse(raw: &str) -> PrivacyResult<Self> {
        let trimmed = raw.trim();
        let mut parser = Parser {
            raw,
            chars: trimmed.chars().collect(),
            pos: 0,
        };
        let steps = parser.parse()?;
        Ok(Self {
            raw: raw.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// A definite path addresses at most one value.
    pub fn is_definite(&self) -> bool {
        self.steps.iter().all(|step| {
            !step.recursive
                && match &step.selector {
                    Selector::Keys(keys) => keys.len() == 1,
                    Selector::Indexes(indexes) => indexes.len() == 1,
                    Selector::Slice { .. } | Selector::Wildcard => false,
                }
        })
    }

    /// Every value the path matches, in document order.
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let mut current = vec![root];
        for step in &self.steps {
            let mut next = Vec::new();
            for node in current {
                if step.recursive {
                    let mut scope = Vec::new();
                    descendants(node, &mut scope);
                    for candidate in scope {
                        apply(candidate, &step.selector, &mut next);
                    }
                } else {
                    apply(node, &step.selector, &mut next);
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// Returns `None` only when a definite path does not resolve.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<Resolved<'v>> {
        let matches = self.select(root);
        if self.is_definite() {
            matches.into_iter().next().map(Resolved::Single)
        } else {
            Some(Resolved::List(matches))
        }
    }

    /// Overwrites every matched value with `replacement` and returns how many changed.
    /// Values already equal to `replacement` are not counted. Missing keys are never created.
    pub fn replace_all(&self, root: &mut Value, replacement: &Value) -> usize {
        if self.steps.is_empty() {
            return 0;
        }
        replace_at(root, &self.steps, replacement)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(map) => map.values().for_each(|child| descendants(child, out)),
        Value::Array(items) => items.iter().for_each(|child| descendants(child, out)),
        _ => {}
    }
}

fn apply<'v>(node: &'v Value, selector: &Selector, out: &mut Vec<&'v Value>) {
    match (selector, node) {
        (Selector::Keys(keys), Value::Object(map)) => {
            out.extend(keys.iter().filter_map(|key| map.get(key)));
        }
        (Selector::Indexes(indexes), Value::Array(items)) => {
            out.extend(
                indexes
                    .iter()
                    .filter_map(|index| normalize_index(*index, items.len()))
                    .map(|index| &items[index]),
            );
        }
        (Selector::Slice { start, end }, Value::Array(items)) => {
            let (from, to) = slice_bounds(*start, *end, items.len());
            out.extend(items[from..to].iter());
        }
        (Selector::Wildcard, Value::Object(map)) => out.extend(map.values()),
        (Selector::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        _ => {}
    }
}

fn replace_at(node: &mut Value, steps: &[Step], replacement: &Value) -> usize {
    let Some((step, rest)) = steps.split_first() else {
        if *node == *replacement {
            return 0;
        }
        *node = replacement.clone();
        return 1;
    };

    let mut replaced = replace_children(node, &step.selector, rest, replacement);
    if step.recursive {
        let children: Vec<&mut Value> = match node {
            Value::Object(map) => map.values_mut().collect(),
            Value::Array(items) => items.iter_mut().collect(),
            _ => Vec::new(),
        };
        for child in children {
            replaced += replace_at(child, steps, replacement);
        }
    }
    replaced
}

fn replace_children(
    node: &mut Value,
    selector: &Selector,
    rest: &[Step],
    replacement: &Value,
) -> usize {
    let mut replaced = 0;
    match (selector, node) {
        (Selector::Keys(keys), Value::Object(map)) => {
            for key in keys {
                if let Some(child) = map.get_mut(key) {
                    replaced += replace_at(child, rest, replacement);
                }
            }
        }
        (Selector::Indexes(indexes), Value::Array(items)) => {
            let len = items.len();
            for index in indexes.iter().filter_map(|index| normalize_index(*index, len)) {
                replaced += replace_at(&mut items[index], rest, replacement);
            }
        }
        (Selector::Slice { start, end }, Value::Array(items)) => {
            let (from, to) = slice_bounds(*start, *end, items.len());
            for child in &mut items[from..to] {
                replaced += replace_at(child, rest, replacement);
            }
        }
        (Selector::Wildcard, Value::Object(map)) => {
            for child in map.values_mut() {
                replaced += replace_at(child, rest, replacement);
            }
        }
        (Selector::Wildcard, Value::Array(items)) => {
            for child in items.iter_mut() {
                replaced += replace_at(child, rest, replacement);
            }
        }
        _ => {}
    }
    replaced
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let absolute = if index < 0 { len + index } else { index };
    if (0..len).contains(&absolute) {
        usize::try_from(absolute).ok()
    } else {
        None
    }
}

fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |bound: i64| -> usize {
        let len_i = len as i64;
        let absolute = if bound < 0 { len_i + bound } else { bound };
        absolute.clamp(0, len_i) as usize
    };
    let from = start.map_or(0, clamp);
    let to = end.map_or(len, clamp);
    if from >= to {
        (0, 0)
    } else {
        (from, to)
    }
}

struct Parser<'a> {
    raw: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn parse(&mut self) -> PrivacyResult<Vec<Step>> {
        if self.chars.is_empty() {
            return Err(self.error("empty path"));
        }
        let mut steps = Vec::new();
        if self.peek() == Some('$') {
            self.pos += 1;
        } else if self.peek() != Some('[') && self.peek() != Some('.') {
            // Bare paths such as `user.id` are relative to the root.
            steps.push(self.dot_member(false)?);
        }

        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.pos += 1;
                    let recursive = self.peek() == Some('.');
                    if recursive {
                        self.pos += 1;
                    }
                    if self.peek() == Some('[') {
                        if !recursive {
                            return Err(self.error("'.' followed by '['"));
                        }
                        let selector = self.bracket()?;
                        steps.push(Step {
                            recursive,
                            selector,
                        });
                    } else {
                        steps.push(self.dot_member(recursive)?);
                    }
                }
                '[' => {
                    let selector = self.bracket()?;
                    steps.push(Step {
                        recursive: false,
                        selector,
                    });
                }
                other => return Err(self.error(&format!("unexpected character '{}'", other))),
            }
        }
        Ok(steps)
    }

    fn dot_member(&mut self, recursive: bool) -> PrivacyResult<Step> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        let name = name.trim();
        let selector = match name {
            "" => return Err(self.error("empty member name")),
            "*" => Selector::Wildcard,
            _ => Selector::Keys(vec![name.to_string()]),
        };
        Ok(Step {
            recursive,
            selector,
        })
    }

    fn bracket(&mut self) -> PrivacyResult<Selector> {
        // Skip '['.
        self.pos += 1;
        let start = self.pos;
        let mut quote: Option<char> = None;
        while let Some(ch) = self.peek() {
            match quote {
                Some(open) if ch == open => quote = None,
                Some(_) => {}
                None if ch == '\'' || ch == '"' => quote = Some(ch),
                None if ch == ']' => break,
                None => {}
            }
            self.pos += 1;
        }
        if self.peek() != Some(']') {
            return Err(self.error("unterminated '['"));
        }
        let content: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;

        let content = content.trim();
        if content.is_empty() {
            return Err(self.error("empty brackets"));
        }
        if content.starts_with('?') || content.starts_with('(') {
            return Err(self.error("filter and script expressions are not supported"));
        }
        if content == "*" {
            return Ok(Selector::Wildcard);
        }
        if content.starts_with('\'') || content.starts_with('"') {
            return self.quoted_keys(content).map(Selector::Keys);
        }
        if content.contains(':') {
            return self.slice(content);
        }
        content
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|_| self.error(&format!("invalid index '{}'", part.trim())))
            })
            .collect::<PrivacyResult<Vec<_>>>()
            .map(Selector::Indexes)
    }

    fn quoted_keys(&self, content: &str) -> PrivacyResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut rest = content;
        loop {
            rest = rest.trim_start();
            let mut chars = rest.chars();
            let open = match chars.next() {
                Some(ch @ ('\'' | '"')) => ch,
                _ => return Err(self.error("expected quoted member name")),
            };
            let body = &rest[1..];
            let close = body
                .find(open)
                .ok_or_else(|| self.error("unterminated quoted member name"))?;
            keys.push(body[..close].to_string());
            rest = body[close + 1..].trim_start();
            if rest.is_empty() {
                return Ok(keys);
            }
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| self.error("expected ',' between member names"))?;
        }
    }

    fn slice(&self, content: &str) -> PrivacyResult<Selector> {
        let parts: Vec<&str> = content.split(':').map(str::trim).collect();
        if parts.len() > 2 {
            return Err(self.error("slice steps are not supported"));
        }
        let bound = |part: &str| -> PrivacyResult<Option<i64>> {
            if part.is_empty() {
                return Ok(None);
            }
            part.parse::<i64>()
                .map(Some)
                .map_err(|_| self.error(&format!("invalid slice bound '{}'", part)))
        };
        Ok(Selector::Slice {
            start: bound(parts[0])?,
            end: bound(parts[1])?,
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self, reason: &str) -> PrivacyError {
        PrivacyError::InvalidPath {
            path: self.raw.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Renders a resolved value as an attribute string: strings raw, `null` as `"null"`,
/// everything else as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "user": {"id": "u-1", "email": "bob@example.com"},
            "items": [
                {"sku": "A", "price": 1},
                {"sku": "B", "price": 2},
                {"sku": "C", "price": 3}
            ],
            "tags": ["x", "y"],
            "meta": {"nested": {"sku": "Z"}}
        })
    }

    fn select(path: &str) -> Vec<Value> {
        let document = doc();
        JsonPath::parse(path)
            .unwrap()
            .select(&document)
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn root_prefix_is_optional() {
        assert_eq!(select("$.user.id"), vec![json!("u-1")]);
        assert_eq!(select("user.id"), vec![json!("u-1")]);
        assert_eq!(select("$['user']['email']"), vec![json!("bob@example.com")]);
    }

    #[test]
    fn indexes_slices_and_wildcards() {
        assert_eq!(select("$.items[0].sku"), vec![json!("A")]);
        assert_eq!(select("$.items[-1].sku"), vec![json!("C")]);
        assert_eq!(select("$.items[0,2].sku"), vec![json!("A"), json!("C")]);
        assert_eq!(select("$.items[1:].sku"), vec![json!("B"), json!("C")]);
        assert_eq!(select("$.items[:-1].price"), vec![json!(1), json!(2)]);
        assert_eq!(select("$.items[*].sku"), vec![json!("A"), json!("B"), json!("C")]);
        assert_eq!(select("$.tags.*"), vec![json!("x"), json!("y")]);
        assert_eq!(select("$.items[7]"), Vec::<Value>::new());
    }

    #[test]
    fn deep_scan_finds_every_match() {
        assert_eq!(
            select("$..sku"),
            vec![json!("A"), json!("B"), json!("C"), json!("Z")]
        );
        assert_eq!(select("$.user['id','missing']"), vec![json!("u-1")]);
        assert_eq!(
            select("$.user[\"email\", 'id']"),
            vec![json!("bob@example.com"), json!("u-1")]
        );
    }

    #[test]
    fn definite_paths_resolve_to_single() {
        let document = doc();
        let definite = JsonPath::parse("$.user.id").unwrap();
        assert!(definite.is_definite());
        assert_eq!(
            definite.resolve(&document),
            Some(Resolved::Single(&json!("u-1")))
        );
        assert_eq!(JsonPath::parse("$.nope").unwrap().resolve(&document), None);

        let indefinite = JsonPath::parse("$.items[*].price").unwrap();
        assert!(!indefinite.is_definite());
        match indefinite.resolve(&document) {
            Some(Resolved::List(values)) => assert_eq!(values.len(), 3),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn filters_and_garbage_are_rejected() {
        for path in ["$.items[?(@.price > 1)]", "", "$.items[", "$.a..", "$.a[1:2:3]", "$.[0]"] {
            assert!(JsonPath::parse(path).is_err(), "{} should not parse", path);
        }
    }

    #[test]
    fn replace_all_never_creates_keys() {
        let mut document = doc();
        let blank = json!("");
        assert_eq!(
            JsonPath::parse("$.user.password").unwrap().replace_all(&mut document, &blank),
            0
        );
        assert_eq!(document, doc());

        assert_eq!(
            JsonPath::parse("$..sku").unwrap().replace_all(&mut document, &blank),
            4
        );
        assert_eq!(document["items"][1]["sku"], json!(""));
        assert_eq!(document["meta"]["nested"]["sku"], json!(""));
        assert_eq!(document["items"][1]["price"], json!(2));

        assert_eq!(
            JsonPath::parse("$..sku").unwrap().replace_all(&mut document, &blank),
            0
        );
    }

    #[test]
    fn stringify_matches_attribute_rules() {
        assert_eq!(stringify(&json!("raw")), "raw");
        assert_eq!(stringify(&Value::Null), "null");
        assert_eq!(stringify(&json!(12.5)), "12.5");
        assert_eq!(stringify(&json!({"a": [1, true]})), r#"{"a":[1,true]}"#);
    }
}
