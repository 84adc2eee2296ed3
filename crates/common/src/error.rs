//! Error types for Stratus

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias using Stratus Error
pub type Result<T> = std::result::Result<T, Error>;

/// Category of an error returned by a cloud service API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    Validation,
    Throttling,
    Conflict,
    Generic,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Throttling => write!(f, "throttling"),
            ApiErrorKind::Conflict => write!(f, "conflict"),
            ApiErrorKind::Generic => write!(f, "generic"),
        }
    }
}

/// Error returned by a cloud service API call.
///
/// `code` is the service's own error code (for example
/// `InvalidCarrierGatewayID.NotFound`); `kind` is the category used by the
/// provider to decide between clearing state, retrying and failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, code, message)
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, code, message)
    }

    pub fn throttling(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Throttling, "ThrottlingException", message)
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Conflict, code, message)
    }

    pub fn generic(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Generic, code, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    pub fn is_throttling(&self) -> bool {
        self.kind == ApiErrorKind::Throttling
    }

    /// True when the service error code matches exactly.
    pub fn code_equals(&self, code: &str) -> bool {
        self.code == code
    }

    /// True when the code matches and the message contains `needle`.
    /// An empty needle matches any message.
    pub fn message_contains(&self, code: &str, needle: &str) -> bool {
        self.code == code && self.message.contains(needle)
    }
}

/// Stratus error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Resource not found after {checks} consecutive checks")]
    Vanished { checks: u32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Attribute {attribute} of {resource_type} cannot be updated in place; the resource must be replaced")]
    ForceNewChanged {
        resource_type: String,
        attribute: String,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Resource type {0} does not support import")]
    ImportNotSupported(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error(
        "unexpected state '{state}', wanted target {}{}",
        quote_list(.expected),
        cause_suffix(.cause)
    )]
    UnexpectedState {
        state: String,
        expected: Vec<String>,
        cause: Option<String>,
    },

    #[error(
        "timeout while waiting for state to become {} (last state: '{last_state}', timeout: {timeout:?}){}",
        quote_list(.expected),
        cause_suffix(.cause)
    )]
    Timeout {
        last_state: String,
        expected: Vec<String>,
        timeout: Duration,
        cause: Option<String>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Resource absent remotely, in any of the forms the provider produces.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } | Error::Vanished { .. } => true,
            Error::Api(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Brief, expected failure that is safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_throttling())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// The underlying API error, if this error came from a service call.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    /// True when a service call failed with exactly this error code.
    pub fn has_code(&self, code: &str) -> bool {
        self.api_error().map(|e| e.code_equals(code)).unwrap_or(false)
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

fn quote_list(values: &[String]) -> String {
    if values.is_empty() {
        return "absent".to_string();
    }
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn cause_suffix(cause: &Option<String>) -> String {
    match cause {
        Some(c) if !c.is_empty() => format!(": {}", c),
        _ => String::new(),
    }
}

/// Walk an `anyhow` chain and report whether any link is a not-found error.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<Error>() {
            return e.is_not_found();
        }
        if let Some(e) = cause.downcast_ref::<ApiError>() {
            return e.is_not_found();
        }
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_timeout_message_includes_cause() {
        let err = Error::Timeout {
            last_state: "CREATING".to_string(),
            expected: vec!["AVAILABLE".to_string()],
            timeout: Duration::from_secs(5),
            cause: Some("subnet has no free addresses".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("'AVAILABLE'"));
        assert!(msg.contains("last state: 'CREATING'"));
        assert!(msg.ends_with(": subnet has no free addresses"));
    }

    #[test]
    fn test_timeout_message_without_cause() {
        let err = Error::Timeout {
            last_state: "deleting".to_string(),
            expected: vec![],
            timeout: Duration::from_secs(1),
            cause: None,
        };
        assert!(err.to_string().contains("become absent"));
        assert!(!err.to_string().ends_with(": "));
    }

    #[test]
    fn test_categories() {
        let nf = Error::from(ApiError::not_found("ParameterGroupNotFoundFault", "gone"));
        assert!(nf.is_not_found());
        assert!(!nf.is_transient());

        let throttled = Error::from(ApiError::throttling("slow down"));
        assert!(throttled.is_transient());
        assert!(!throttled.is_not_found());

        assert!(Error::Vanished { checks: 20 }.is_not_found());
    }

    #[test]
    fn test_not_found_survives_context() {
        let result: std::result::Result<(), Error> =
            Err(ApiError::not_found("NotFoundException", "alias missing").into());
        let err = result
            .context("error reading GameLift Alias (alias-1)")
            .unwrap_err();
        assert!(is_not_found(&err));

        let other = anyhow::anyhow!("boom").context("outer");
        assert!(!is_not_found(&other));
    }

    #[test]
    fn test_message_contains() {
        let e = ApiError::validation(
            "InvalidParametersException",
            "Launch role profile does not exist",
        );
        assert!(e.message_contains("InvalidParametersException", "profile does not exist"));
        assert!(e.message_contains("InvalidParametersException", ""));
        assert!(!e.message_contains("ResourceNotFoundException", ""));
    }
}
