use payload_capture_types::Attributes;

/// Port to the host's tracing span. The host owns span creation and export.
pub trait SpanSink {
    fn span_id(&self) -> Option<String>;
    fn set_attribute(&mut self, key: &str, value: String);
}

/// In-memory sink that records every attribute written to it.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    span_id: Option<String>,
    attributes: Attributes,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_span_id(span_id: impl Into<String>) -> Self {
        Self {
            span_id: Some(span_id.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl SpanSink for RecordingSink {
    fn span_id(&self) -> Option<String> {
        self.span_id.clone()
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.attributes.insert(key.to_string(), value);
    }
}
