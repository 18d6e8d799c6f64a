//! Buffered request/response data handed over by the host.

use payload_capture_types::HeaderMap;

/// A fully buffered body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RawBody {
    #[default]
    Empty,
    /// Bytes to interpret through the declared content type.
    Buffered(Vec<u8>),
    /// Bytes with no text interpretation; always captured as binary.
    Opaque(Vec<u8>),
}

impl RawBody {
    pub fn is_empty(&self) -> bool {
        match self {
            RawBody::Empty => true,
            RawBody::Buffered(bytes) | RawBody::Opaque(bytes) => bytes.is_empty(),
        }
    }
}

impl From<&str> for RawBody {
    fn from(text: &str) -> Self {
        RawBody::Buffered(text.as_bytes().to_vec())
    }
}

impl From<String> for RawBody {
    fn from(text: String) -> Self {
        RawBody::Buffered(text.into_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedRequest {
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    pub query: Option<String>,
    pub scheme: String,
    pub host: String,
    pub headers: HeaderMap,
    pub body: RawBody,
}

impl CapturedRequest {
    /// Builds a request from a method and a URI that may carry a query string.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.to_string(), None),
        };
        Self {
            method: method.into(),
            path,
            query,
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            headers: HeaderMap::new(),
            body: RawBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<RawBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_host(mut self, scheme: impl Into<String>, host: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self.host = host.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: RawBody,
}

impl CapturedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: RawBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<RawBody>) -> Self {
        self.body = body.into();
        self
    }
}
