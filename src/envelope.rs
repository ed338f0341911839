//! Unwrapping of certificate authority API responses.
//!
//! The API wraps every payload in a `success`/`result`/`errors`/`messages`
//! envelope. Bare mode skips the envelope and treats the whole document as
//! the result mapping.

use crate::error::{CertSplitError, Result};
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of the `errors` or `messages` list of an API response.
///
/// Only the message text is ever shown, so the code is read leniently: an
/// integer `code` is preferred, then the legacy `int` key, else 0.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawResponseMessage")]
pub struct ResponseMessage {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize)]
struct RawResponseMessage {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    int: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    message: String,
}

impl From<RawResponseMessage> for ResponseMessage {
    fn from(raw: RawResponseMessage) -> Self {
        Self {
            code: raw.code.as_i64().or_else(|| raw.int.as_i64()).unwrap_or(0),
            message: raw.message,
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResponseMessage {
    pub fn new<S: Into<String>>(code: i64, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The standard API response envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Response {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ResponseMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ResponseMessage>,
}

impl Response {
    /// Consume a successful response and return its result mapping.
    pub fn into_result(self) -> Result<Map<String, Value>> {
        if !self.success {
            return Err(CertSplitError::RequestFailed {
                errors: self.errors,
            });
        }

        for msg in &self.messages {
            info!("API message {}: {}", msg.code, msg.message);
        }

        Ok(self.result.unwrap_or_default())
    }
}

/// Parse raw input into the mapping that field extraction runs against.
pub fn unwrap_envelope(data: &[u8], bare: bool) -> Result<Map<String, Value>> {
    if bare {
        debug!("Parsing {} bytes as a bare JSON object", data.len());
        // A bare `null` is an empty mapping.
        let fields: Option<Map<String, Value>> =
            serde_json::from_slice(data).map_err(|e| CertSplitError::Parse {
                message: format!("JSON: {}", String::from_utf8_lossy(data)),
                source: e,
            })?;
        return Ok(fields.unwrap_or_default());
    }

    debug!("Parsing {} bytes as an API response envelope", data.len());
    let response: Response = serde_json::from_slice(data).map_err(|e| CertSplitError::Parse {
        message: format!("input: {}", e),
        source: e,
    })?;

    response.into_result()
}
