//! Immutable rule table built once at startup.
//!
//! Patterns are compiled as full-match regular expressions. The table is read-only after
//! [`RuleTableBuilder::build`], so it can be shared across request threads behind an `Arc`
//! without locking.

use regex::Regex;
use tracing::{info, warn};

use crate::defaults::apply_builtin_guards;
use crate::errors::{RulesError, RulesResult};
use crate::model::{CaptureConfigFile, CaptureRule, GlobalConfig};

#[derive(Clone, Debug)]
pub struct RuleEntry {
    pub pattern: String,
    pub(crate) matcher: Regex,
    pub request: CaptureRule,
    pub response: CaptureRule,
}

impl RuleEntry {
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    pub(crate) entries: Vec<RuleEntry>,
    pub(crate) global: GlobalConfig,
    pub(crate) global_ignores: Vec<Regex>,
}

impl RuleTable {
    /// Table with no patterns: every URI resolves to ignore.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the request method is skipped outright. Only `OPTIONS` is, and only while
    /// options tracking is disabled.
    pub fn skips_method(&self, method: &str) -> bool {
        method.eq_ignore_ascii_case("OPTIONS") && !self.global.track_options_requests
    }

    /// True when `path` matches one of the global ignore patterns.
    pub fn is_globally_ignored(&self, path: &str) -> bool {
        self.global_ignores.iter().any(|matcher| matcher.is_match(path))
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleTableBuilder {
    global: GlobalConfig,
    builtin_guards: bool,
    rules: Vec<(String, CaptureRule, CaptureRule)>,
}

impl RuleTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: CaptureConfigFile) -> Self {
        let mut builder = Self::new().global(config.global_config);
        if config.builtin_guards {
            builder = builder.with_builtin_guards();
        }
        for (pattern, url_config) in config.url_configs {
            let url_config = url_config.unwrap_or_default();
            builder = builder.register(
                pattern,
                url_config.request.unwrap_or_else(CaptureRule::ignoring),
                url_config.response.unwrap_or_else(CaptureRule::ignoring),
            );
        }
        builder
    }

    pub fn global(mut self, global: GlobalConfig) -> Self {
        self.global = global;
        self
    }

    pub fn with_builtin_guards(mut self) -> Self {
        self.builtin_guards = true;
        self
    }

    /// Registers a pattern. Registering the same pattern again replaces its rules in place.
    pub fn register(
        mut self,
        pattern: impl Into<String>,
        request: CaptureRule,
        response: CaptureRule,
    ) -> Self {
        let pattern = pattern.into();
        if let Some(slot) = self.rules.iter_mut().find(|(existing, _, _)| *existing == pattern) {
            slot.1 = request;
            slot.2 = response;
        } else {
            self.rules.push((pattern, request, response));
        }
        self
    }

    /// Builds the table, skipping patterns that fail to compile.
    pub fn build(self) -> RuleTable {
        self.compile(false).unwrap_or_default()
    }

    /// Builds the table, failing on the first pattern that does not compile.
    pub fn try_build(self) -> RulesResult<RuleTable> {
        self.compile(true)
    }

    fn compile(self, strict: bool) -> RulesResult<RuleTable> {
        let mut global = self.global;
        if self.builtin_guards {
            apply_builtin_guards(&mut global);
        }

        let mut global_ignores = Vec::with_capacity(global.ignored_url_patterns.len());
        for pattern in &global.ignored_url_patterns {
            match full_match(pattern) {
                Ok(matcher) => global_ignores.push(matcher),
                Err(err) if strict => return Err(err),
                Err(err) => warn!(%err, "skipping global ignore pattern"),
            }
        }

        let mut entries = Vec::with_capacity(self.rules.len());
        for (pattern, request, response) in self.rules {
            match full_match(&pattern) {
                Ok(matcher) => entries.push(RuleEntry {
                    pattern,
                    matcher,
                    request,
                    response,
                }),
                Err(err) if strict => return Err(err),
                Err(err) => warn!(%err, "skipping capture pattern"),
            }
        }

        info!(
            patterns = entries.len(),
            global_ignores = global_ignores.len(),
            "capture rule table built"
        );
        Ok(RuleTable {
            entries,
            global,
            global_ignores,
        })
    }
}

fn full_match(pattern: &str) -> RulesResult<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| RulesError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_full_match() {
        let table = RuleTable::builder()
            .register("/api/.*", CaptureRule::default(), CaptureRule::default())
            .build();
        let entry = &table.entries()[0];
        assert!(entry.matches("/api/orders"));
        assert!(!entry.matches("/v1/api/orders"));
        assert!(!entry.matches("/ap"));
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let first = CaptureRule {
            ignored_fields: vec!["a".into()],
            ..CaptureRule::default()
        };
        let second = CaptureRule {
            ignored_fields: vec!["b".into()],
            ..CaptureRule::default()
        };
        let table = RuleTable::builder()
            .register("/one", first, CaptureRule::default())
            .register("/two", CaptureRule::default(), CaptureRule::default())
            .register("/one", second, CaptureRule::default())
            .build();
        let patterns: Vec<_> = table.patterns().collect();
        assert_eq!(patterns, vec!["/one", "/two"]);
        assert_eq!(table.entries()[0].request.ignored_fields, vec!["b"]);
    }

    #[test]
    fn invalid_pattern_is_skipped_or_rejected() {
        let builder = RuleTable::builder()
            .register("/ok", CaptureRule::default(), CaptureRule::default())
            .register("/bad(", CaptureRule::default(), CaptureRule::default());
        assert_eq!(builder.clone().build().len(), 1);
        match builder.try_build() {
            Err(RulesError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "/bad("),
            other => panic!("expected invalid pattern, got {:?}", other),
        }
    }

    #[test]
    fn options_skipped_unless_tracked() {
        let table = RuleTable::empty();
        assert!(table.skips_method("OPTIONS"));
        assert!(table.skips_method("options"));
        assert!(!table.skips_method("GET"));

        let tracked = RuleTable::builder()
            .global(GlobalConfig {
                track_options_requests: true,
                ..GlobalConfig::default()
            })
            .build();
        assert!(!tracked.skips_method("OPTIONS"));
    }
}
