use crate::model::GlobalConfig;

pub const DEFAULT_IGNORED_HEADERS: &[&str] = &[
    "authorization",
    "token",
    "security",
    "oauth",
    "auth",
    "content-length",
];

pub const DEFAULT_IGNORED_URL_PATTERNS: &[&str] = &[
    ".*/health/check",
    ".*/actuator/.*",
    ".*/static/.*",
    ".*/assets/.*",
    ".*/resources/.*",
];

/// Adds the built-in header and URL guards to `global`, keeping any entries already present.
pub fn apply_builtin_guards(global: &mut GlobalConfig) {
    merge_unique(&mut global.ignored_headers, DEFAULT_IGNORED_HEADERS);
    merge_unique(&mut global.ignored_url_patterns, DEFAULT_IGNORED_URL_PATTERNS);
}

fn merge_unique(target: &mut Vec<String>, defaults: &[&str]) {
    for value in defaults {
        if !target.iter().any(|existing| existing == value) {
            target.push((*value).to_string());
        }
    }
}
