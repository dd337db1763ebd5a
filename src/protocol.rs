use crate::error::{BraviaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version sent in every JSON-RPC envelope
pub const JSON_RPC_VERSION: &str = "1.0";

/// Path of the IRCC (infrared remote emulation) endpoint
pub const IRCC_PATH: &str = "sony/IRCC";

/// SOAP action header value for IRCC requests
pub const IRCC_SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";

/// Content type of the IRCC envelope
pub const IRCC_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

/// Web API services exposed under `/sony/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    System,
    AvContent,
    Audio,
    AppControl,
    AccessControl,
}

impl Service {
    /// Service name as used in the URL
    pub fn name(self) -> &'static str {
        match self {
            Service::System => "system",
            Service::AvContent => "avContent",
            Service::Audio => "audio",
            Service::AppControl => "appControl",
            Service::AccessControl => "accessControl",
        }
    }

    /// URL path relative to the device root
    pub fn path(self) -> String {
        format!("sony/{}", self.name())
    }
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u32,
    pub version: String,
}

impl Request {
    /// Create a request for `method` with no parameters (`params: []`)
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            id: 1,
            version: JSON_RPC_VERSION.to_string(),
        }
    }

    /// Set the single parameter object (`params: [params]`)
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = vec![params];
        self
    }

    /// Set the raw parameter list, for methods taking more than one element
    pub fn with_param_list(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    /// Serialize the envelope to its wire form
    pub fn to_body(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Decoded JSON-RPC response
///
/// The TV reports failures inside a 200 response as
/// `{"error": [code, "message"]}`, so a successful HTTP exchange does not
/// mean the call succeeded.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl Response {
    /// Parse a raw response body
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(BraviaError::InvalidResponse("empty response body".to_string()));
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// Check if the response carries an error payload
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_null())
    }

    /// Convert the error payload into a `BraviaError::Api`, if any
    pub fn api_error(&self) -> Option<BraviaError> {
        let error = self.error.as_ref().filter(|e| !e.is_null())?;

        let (code, message) = match error {
            Value::Array(parts) => (
                parts.first().and_then(Value::as_i64).unwrap_or_default(),
                parts
                    .get(1)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            Value::Object(obj) => (
                obj.get("code").and_then(Value::as_i64).unwrap_or_default(),
                obj.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            other => (0, other.to_string()),
        };

        Some(BraviaError::Api { code, message })
    }

    /// Consume the response, yielding the `result` sequence or the error
    pub fn into_result(self) -> Result<Vec<Value>> {
        if let Some(error) = self.api_error() {
            return Err(error);
        }
        match self.result {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Ok(vec![other]),
            None => Err(BraviaError::InvalidResponse(
                "response has neither result nor error".to_string(),
            )),
        }
    }
}

/// Build the SOAP envelope carrying a single IRCC code
pub fn ircc_envelope(code: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\"?>",
            "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">",
            "<s:Body>",
            "<u:X_SendIRCC xmlns:u=\"urn:schemas-sony-com:service:IRCC:1\">",
            "<IRCCCode>{}</IRCCCode>",
            "</u:X_SendIRCC>",
            "</s:Body>",
            "</s:Envelope>"
        ),
        code
    )
}

// Defensive accessors over loosely shaped payloads. A missing key or a value
// of the wrong type reads as `None`.

pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(|s| s.to_string())
}

pub(crate) fn i64_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bool_field(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}
