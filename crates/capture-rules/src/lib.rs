//! Capture rules for the payload capture engine: the config model, the immutable
//! [`RuleTable`] and the URI resolver that decides what may be observed for a path.

pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod table;

pub use defaults::apply_builtin_guards;
pub use errors::{RulesError, RulesResult};
pub use loader::{
    load_config, load_rule_table, load_rule_table_or_empty, parse_config, parse_rule_table,
};
pub use model::{CaptureConfigFile, CaptureRule, GlobalConfig, UrlConfig};
pub use resolver::{IgnoreReason, MergedRule, Resolution};
pub use table::{RuleEntry, RuleTable, RuleTableBuilder};
