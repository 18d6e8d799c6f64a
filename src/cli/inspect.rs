use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use payload_capture_pipeline::{CaptureFilter, CaptureSettings, RecordingSink};
use payload_capture_rules::load_rule_table;
use payload_capture_types::attributes::{REQUEST_PAYLOAD, RESPONSE_PAYLOAD};
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{print_structured, OutputFormat};
use crate::exchange_file::ExchangeFile;

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// Capture config (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Recorded exchange (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub exchange: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Debug, Default, Serialize)]
pub struct InspectReport {
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_payload: Option<Value>,
}

/// Runs a recorded exchange through the capture filter and prints what the span would get.
pub fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let table = load_rule_table(&args.config)
        .with_context(|| format!("Invalid capture config {}", args.config.display()))?;
    let exchange = ExchangeFile::load(&args.exchange)?;

    let settings = CaptureSettings::from_env().context("Invalid PAYLOAD_CAPTURE__ settings")?;
    let report = inspect(CaptureFilter::new(settings, Arc::new(table)), &exchange)?;

    if print_structured(args.output, &report)? {
        return Ok(());
    }
    for (key, value) in &report.attributes {
        println!("{} = {}", key, value);
    }
    for (label, payload) in [
        ("request", &report.request_payload),
        ("response", &report.response_payload),
    ] {
        match payload {
            Some(payload) => {
                println!("{} payload:", label);
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
            None => println!("{} payload: <none>", label),
        }
    }
    Ok(())
}

pub fn inspect(filter: CaptureFilter, exchange: &ExchangeFile) -> Result<InspectReport> {
    let mut sink = match &exchange.span_id {
        Some(span_id) => RecordingSink::with_span_id(span_id.clone()),
        None => RecordingSink::new(),
    };
    let request = exchange.request.to_captured()?;
    filter.on_request(&request, &mut sink);
    if let Some(response) = &exchange.response {
        filter.on_response(&request, &response.to_captured()?, &mut sink);
    }

    let mut attributes = sink.into_attributes();
    let request_payload = take_payload(&mut attributes, REQUEST_PAYLOAD)?;
    let response_payload = take_payload(&mut attributes, RESPONSE_PAYLOAD)?;
    Ok(InspectReport {
        attributes,
        request_payload,
        response_payload,
    })
}

fn take_payload(attributes: &mut BTreeMap<String, String>, key: &str) -> Result<Option<Value>> {
    attributes
        .remove(key)
        .map(|json| serde_json::from_str(&json).context("payload attribute is not valid json"))
        .transpose()
}
