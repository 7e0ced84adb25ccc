//! Catalog client
//!
//! Fetches the model and provider lists (`GET /api/models`,
//! `GET /api/providers`). Failures never escape as errors: they are
//! reported in the `error` field of the result, next to empty data.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::stream::{StreamError, StreamTransport, Transport};

/// Path of the model list endpoint
pub const MODELS_PATH: &str = "/api/models";
/// Path of the provider list endpoint
pub const PROVIDERS_PATH: &str = "/api/providers";

/// Fetch errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}")]
    Http { status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<StreamError> for FetchError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Http { status } => FetchError::Http { status },
            StreamError::Network(msg) | StreamError::Io(msg) | StreamError::InvalidUrl(msg) => {
                FetchError::Network(msg)
            }
        }
    }
}

/// Result of a list fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    /// Items of the JSON array (empty on error)
    pub data: Vec<JsonValue>,
    /// Failure, if the fetch did not succeed
    pub error: Option<FetchError>,
}

impl Fetched {
    fn ok(data: Vec<JsonValue>) -> Self {
        Self { data, error: None }
    }

    fn failed(error: FetchError) -> Self {
        Self {
            data: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Client for the catalog endpoints
#[derive(Debug)]
pub struct CatalogClient {
    base_url: String,
    transport: Transport,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, transport: impl Into<Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: transport.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the model list
    pub fn models(&self) -> Fetched {
        self.fetch_list(MODELS_PATH)
    }

    /// Fetch the provider list
    pub fn providers(&self) -> Fetched {
        self.fetch_list(PROVIDERS_PATH)
    }

    fn fetch_list(&self, path: &str) -> Fetched {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "fetching catalog list");

        let body = match self.transport.get_text(&url) {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "catalog fetch failed");
                return Fetched::failed(e.into());
            }
        };

        match parse_list(&body) {
            Ok(data) => Fetched::ok(data),
            Err(e) => {
                warn!(url = %url, error = %e, "catalog response rejected");
                Fetched::failed(e)
            }
        }
    }
}

/// Parse a response body that must be a JSON array
pub fn parse_list(body: &str) -> Result<Vec<JsonValue>, FetchError> {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Array(items)) => Ok(items),
        Ok(other) => Err(FetchError::Decode(format!(
            "expected JSON array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(FetchError::Decode(e.to_string())),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
