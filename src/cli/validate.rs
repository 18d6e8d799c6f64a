use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use payload_capture_rules::{load_config, CaptureRule, RuleTableBuilder};
use serde::Serialize;
use tracing::info;

use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Capture config (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    patterns: Vec<PatternReport>,
    global_ignores: Vec<String>,
    ignored_headers: Vec<String>,
    track_options_requests: bool,
}

#[derive(Debug, Serialize)]
struct PatternReport {
    pattern: String,
    request: CaptureRule,
    response: CaptureRule,
}

/// Loads the config strictly: unreadable files, bad YAML and invalid patterns all fail.
pub fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("Invalid capture config {}", args.config.display()))?;
    let table = RuleTableBuilder::from_config(config)
        .try_build()
        .with_context(|| format!("Invalid capture config {}", args.config.display()))?;

    let global = table.global();
    let report = ValidationReport {
        patterns: table
            .entries()
            .iter()
            .map(|entry| PatternReport {
                pattern: entry.pattern.clone(),
                request: entry.request.clone(),
                response: entry.response.clone(),
            })
            .collect(),
        global_ignores: global.ignored_url_patterns.clone(),
        ignored_headers: global.ignored_headers.clone(),
        track_options_requests: global.track_options_requests,
    };
    info!(patterns = report.patterns.len(), "capture config valid");

    if print_structured(args.output, &report)? {
        return Ok(());
    }

    println!("Capture config OK: {}", args.config.display());
    println!("  patterns:        {}", report.patterns.len());
    println!("  global ignores:  {}", report.global_ignores.len());
    println!("  ignored headers: {}", report.ignored_headers.len());
    println!(
        "  options calls:   {}",
        if report.track_options_requests {
            "tracked"
        } else {
            "skipped"
        }
    );
    for pattern in &report.patterns {
        println!(
            "  {}  request: {}  response: {}",
            pattern.pattern,
            describe(&pattern.request),
            describe(&pattern.response)
        );
    }
    Ok(())
}

fn describe(rule: &CaptureRule) -> String {
    if rule.ignore_payload {
        return "ignored".to_string();
    }
    format!(
        "{} extract, {} redact, {} header extract, user id {}",
        rule.extract_to_attributes.len(),
        rule.ignored_fields.len(),
        rule.extract_headers_to_attributes.len(),
        rule.user_id_field.as_deref().unwrap_or("-")
    )
}
