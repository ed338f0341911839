use crate::envelope::ResponseMessage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertSplitError {
    #[error("Failed to read input from {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {message}")]
    Parse {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request failed:{}", format_response_messages(.errors))]
    RequestFailed { errors: Vec<ResponseMessage> },

    #[error("Field {field} must be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Bundle parsing failed: \"{field}\" is missing or not a string")]
    BundleParse { field: &'static str },

    #[error("Failed to parse {field}: {source}")]
    Base64Decode {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Failed to marshal output to JSON: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CertSplitError {
    fn user_message(&self) -> String {
        match self {
            CertSplitError::Read { source_name, source } => {
                format!("Failed to read input: {}: {}", source_name, source)
            }
            CertSplitError::TypeMismatch {
                field,
                expected,
                found,
            } => {
                format!("Unexpected value for \"{}\": expected {}, got {}", field, expected, found)
            }
            CertSplitError::Write { path, source } => {
                format!("Could not write {}: {}", path, source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CertSplitError::Read { .. } => Some(
                "Pass the response file with -f, or use -f - to read from standard input.".to_string()
            ),
            CertSplitError::Parse { .. } => Some(
                "If the input is not wrapped in a success/result envelope, run again with --bare.".to_string()
            ),
            CertSplitError::BundleParse { .. } => Some(
                "The bundle object must contain string fields \"bundle\" and \"root\".".to_string()
            ),
            CertSplitError::Base64Decode { .. } => Some(
                "The OCSP response must be standard base64 with padding.".to_string()
            ),
            CertSplitError::Write { .. } => Some(
                "Ensure the output directory exists and is writable, or use --stdout.".to_string()
            ),
            CertSplitError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CertSplitError {
    fn from(error: toml::de::Error) -> Self {
        CertSplitError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertSplitError>;

fn format_response_messages(messages: &[ResponseMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("\n\t{}", msg.message))
        .collect()
}

/// Short JSON type name used in type mismatch diagnostics.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_lists_every_message() {
        let error = CertSplitError::RequestFailed {
            errors: vec![
                ResponseMessage::new(1000, "bad request"),
                ResponseMessage::new(1001, "unknown profile"),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Request failed:\n\tbad request\n\tunknown profile"
        );
    }

    #[test]
    fn test_request_failed_without_messages() {
        let error = CertSplitError::RequestFailed { errors: Vec::new() };
        assert_eq!(error.to_string(), "Request failed:");
        assert!(error.suggestion().is_none());
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = CertSplitError::TypeMismatch {
            field: "cert".to_string(),
            expected: "a string",
            found: "number",
        };
        assert!(error.user_message().contains("\"cert\""));
        assert!(error.user_message().contains("number"));

        let error = CertSplitError::BundleParse { field: "root" };
        assert_eq!(
            error.user_message(),
            "Bundle parsing failed: \"root\" is missing or not a string"
        );
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = CertSplitError::from(toml_error);
        assert!(matches!(error, CertSplitError::Config { .. }));
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
        assert_eq!(json_type_name(&serde_json::json!(42)), "number");
        assert_eq!(json_type_name(&serde_json::json!({"a": 1})), "object");
        assert_eq!(json_type_name(&serde_json::json!(["a"])), "array");
    }
}
