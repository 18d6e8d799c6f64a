//! Recorded HTTP exchanges read by `capture inspect`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use payload_capture_pipeline::{CapturedRequest, CapturedResponse, RawBody};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct ExchangeFile {
    #[serde(default)]
    pub span_id: Option<String>,
    pub request: RequestRecord,
    #[serde(default)]
    pub response: Option<ResponseRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RequestRecord {
    pub method: String,
    /// Path with an optional query string.
    pub uri: String,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Opaque bytes, captured as a binary body.
    #[serde(default)]
    pub body_base64: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResponseRecord {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_base64: Option<String>,
}

impl ExchangeFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read exchange file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse exchange file {}", path.display()))
    }
}

impl RequestRecord {
    pub fn to_captured(&self) -> Result<CapturedRequest> {
        let mut request = CapturedRequest::new(self.method.clone(), &self.uri);
        if let Some(scheme) = &self.scheme {
            request.scheme = scheme.clone();
        }
        if let Some(host) = &self.host {
            request.host = host.clone();
        }
        request.headers = self.headers.clone();
        request.body = raw_body(self.body.as_deref(), self.body_base64.as_deref())?;
        Ok(request)
    }
}

impl ResponseRecord {
    pub fn to_captured(&self) -> Result<CapturedResponse> {
        let mut response = CapturedResponse::new(self.status);
        response.headers = self.headers.clone();
        response.body = raw_body(self.body.as_deref(), self.body_base64.as_deref())?;
        Ok(response)
    }
}

fn raw_body(text: Option<&str>, encoded: Option<&str>) -> Result<RawBody> {
    if let Some(encoded) = encoded {
        let bytes = Base64
            .decode(encoded.trim())
            .context("body_base64 is not valid base64")?;
        return Ok(RawBody::Opaque(bytes));
    }
    Ok(text.map(RawBody::from).unwrap_or_default())
}
