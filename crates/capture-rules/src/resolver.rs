use payload_capture_types::Direction;
use tracing::debug;

use crate::model::CaptureRule;
use crate::table::RuleTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No registered pattern matched the path.
    Unmatched,
    /// The path matched a global ignore pattern.
    GlobalIgnore,
    /// The last matching rule has `ignore_payload` set.
    PayloadIgnored,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Unmatched => "unmatched",
            IgnoreReason::GlobalIgnore => "global_ignore",
            IgnoreReason::PayloadIgnored => "payload_ignored",
        }
    }
}

/// Union of every rule that matched one path in one direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergedRule {
    pub extract_to_attributes: Vec<String>,
    pub extract_headers_to_attributes: Vec<String>,
    pub ignored_fields: Vec<String>,
    /// Global ignored headers followed by per-rule ones.
    pub ignored_headers: Vec<String>,
    pub user_id_field: Option<String>,
    pub ignore_payload: bool,
}

impl MergedRule {
    fn absorb(&mut self, rule: &CaptureRule) {
        push_unique(&mut self.extract_to_attributes, &rule.extract_to_attributes);
        push_unique(
            &mut self.extract_headers_to_attributes,
            &rule.extract_headers_to_attributes,
        );
        push_unique(&mut self.ignored_fields, &rule.ignored_fields);
        push_unique(&mut self.ignored_headers, &rule.ignored_headers);
        if rule.user_id_field.is_some() {
            self.user_id_field = rule.user_id_field.clone();
        }
        self.ignore_payload = rule.ignore_payload;
    }
}

fn push_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

#[derive(Clone, Debug)]
pub struct Resolution<'a> {
    /// Matching rules in registration order.
    pub matched: Vec<&'a CaptureRule>,
    pub ignore: bool,
    pub reason: Option<IgnoreReason>,
    pub rule: MergedRule,
}

impl RuleTable {
    /// Resolves the rules for `uri`. Any query string is stripped before matching.
    pub fn resolve(&self, uri: &str, direction: Direction) -> Resolution<'_> {
        let path = uri.split_once('?').map_or(uri, |(path, _)| path);

        let matched: Vec<&CaptureRule> = self
            .entries
            .iter()
            .filter(|entry| entry.matches(path))
            .map(|entry| match direction {
                Direction::Request => &entry.request,
                Direction::Response => &entry.response,
            })
            .collect();

        let mut rule = MergedRule {
            ignored_headers: self.global.ignored_headers.clone(),
            ..MergedRule::default()
        };
        for matched_rule in &matched {
            rule.absorb(matched_rule);
        }

        let reason = if self.is_globally_ignored(path) {
            Some(IgnoreReason::GlobalIgnore)
        } else if matched.is_empty() {
            Some(IgnoreReason::Unmatched)
        } else if rule.ignore_payload {
            Some(IgnoreReason::PayloadIgnored)
        } else {
            None
        };

        debug!(
            path,
            direction = direction.as_str(),
            matched = matched.len(),
            ignored = reason.map(|reason| reason.as_str()),
            "capture rules resolved"
        );

        Resolution {
            matched,
            ignore: reason.is_some(),
            reason,
            rule,
        }
    }
}
