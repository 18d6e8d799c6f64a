use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::{RulesError, RulesResult};
use crate::model::CaptureConfigFile;
use crate::table::{RuleTable, RuleTableBuilder};

/// Parses a YAML capture config. An empty document yields the default config.
pub fn parse_config(content: &str) -> RulesResult<CaptureConfigFile> {
    if content.trim().is_empty() {
        return Ok(CaptureConfigFile::default());
    }
    serde_yaml::from_str(content).map_err(|err| RulesError::Invalid(format!("{}", err)))
}

pub fn load_config(path: &Path) -> RulesResult<CaptureConfigFile> {
    let content = fs::read_to_string(path)
        .map_err(|err| RulesError::Io(format!("{}: {}", path.display(), err)))?;
    parse_config(&content)
}

/// Builds a table from YAML text. Invalid URI patterns are skipped with a warning.
pub fn parse_rule_table(content: &str) -> RulesResult<RuleTable> {
    Ok(RuleTableBuilder::from_config(parse_config(content)?).build())
}

pub fn load_rule_table(path: &Path) -> RulesResult<RuleTable> {
    let table = RuleTableBuilder::from_config(load_config(path)?).build();
    info!(path = %path.display(), patterns = table.len(), "capture config loaded");
    Ok(table)
}

/// Loads the table, falling back to an empty table (every URI ignored) when the config is
/// missing or unreadable.
pub fn load_rule_table_or_empty(path: Option<&Path>) -> RuleTable {
    let Some(path) = path else {
        warn!("no capture config given; all traffic will be ignored");
        return RuleTable::empty();
    };
    match load_rule_table(path) {
        Ok(table) => table,
        Err(err) => {
            warn!(%err, "capture config unusable; all traffic will be ignored");
            RuleTable::empty()
        }
    }
}
