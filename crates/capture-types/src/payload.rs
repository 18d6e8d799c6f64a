//! The sanitized record emitted for one side of an HTTP exchange.
//!
//! Field names serialize in camelCase so the JSON attached to a span matches the
//! canonical payload schema (`httpPayload.headerMap`, `jsonBody`, ...).

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Serialize, Serializer};

use crate::attributes::Attributes;
use crate::errors::CaptureResult;

/// Header and query maps. Header keys are lower-cased by the sanitizer before they land here.
pub type HeaderMap = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueBody {
    pub key_value_map: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for KeyValueBody {
    fn from(key_value_map: BTreeMap<String, String>) -> Self {
        Self { key_value_map }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BinaryBody {
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

/// Exactly one body representation per payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Body {
    #[serde(rename = "jsonBody")]
    Json(String),
    #[serde(rename = "textBody")]
    Text(String),
    #[serde(rename = "htmlBody")]
    Html(String),
    #[serde(rename = "xmlBody")]
    Xml(String),
    #[serde(rename = "httpFormDataBody")]
    FormData(KeyValueBody),
    #[serde(rename = "httpFormUrlencodedBody")]
    FormUrlEncoded(KeyValueBody),
    #[serde(rename = "binaryDataBody")]
    Binary(BinaryBody),
}

impl Body {
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Json(_) => "json",
            Body::Text(_) => "text",
            Body::Html(_) => "html",
            Body::Xml(_) => "xml",
            Body::FormData(_) => "form_data",
            Body::FormUrlEncoded(_) => "form_urlencoded",
            Body::Binary(_) => "binary",
        }
    }

    /// Text content for the string-backed variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Json(text) | Body::Text(text) | Body::Html(text) | Body::Xml(text) => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Field map for the two form variants.
    pub fn as_fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Body::FormData(form) | Body::FormUrlEncoded(form) => Some(&form.key_value_map),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPayload {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub header_map: HeaderMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query_param_map: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(flatten)]
    pub body: Option<Body>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_payload: Option<HttpPayload>,
}

impl Payload {
    pub fn http(http_payload: HttpPayload) -> Self {
        Self {
            span_id: None,
            http_payload: Some(http_payload),
        }
    }

    /// True for the default record emitted when capture is ignored.
    pub fn is_empty(&self) -> bool {
        self.http_payload.is_none()
    }

    pub fn body(&self) -> Option<&Body> {
        self.http_payload.as_ref().and_then(|http| http.body.as_ref())
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.http_payload.as_ref().map(|http| &http.header_map)
    }

    pub fn with_span_id(mut self, span_id: Option<String>) -> Self {
        self.span_id = span_id;
        self
    }

    pub fn to_json(&self) -> CaptureResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Unit returned by every extraction call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractResult {
    pub payload: Payload,
    pub attributes: Attributes,
}

impl ExtractResult {
    pub fn new(payload: Payload, attributes: Attributes) -> Self {
        Self {
            payload,
            attributes,
        }
    }

    /// Empty payload and no attributes.
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn is_ignored(&self) -> bool {
        self.payload.is_empty() && self.attributes.is_empty()
    }
}
