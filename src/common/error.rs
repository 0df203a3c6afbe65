//! Error types for the breakpoint binding layer
//!
//! Only construction failures and contract violations cross the front-end
//! boundary. Session failures are turned into an unbound breakpoint by the
//! pending breakpoint itself and never reach the caller as an `Err`.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the binding layer
#[derive(Error, Debug)]
pub enum Error {
    // === Construction Errors ===
    #[error("Breakpoint request is for language '{actual}', this engine debugs '{expected}'")]
    LanguageMismatch { expected: String, actual: String },

    #[error("Invalid breakpoint location: {0}")]
    InvalidLocation(String),

    #[error("Could not resolve document '{reference}': {reason}")]
    UnresolvedDocument { reference: String, reason: String },

    #[error("{rejected} of {total} breakpoint requests were rejected")]
    RequestsRejected { rejected: usize, total: usize },

    // === Breakpoint Contract Errors ===
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Failed to set breakpoint at {location}: {reason}")]
    BreakpointFailed { location: String, reason: String },

    // === Session Errors ===
    #[error("Remote session is unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Remote session call was cancelled before it completed")]
    SessionCancelled,

    // === Adapter Errors ===
    #[error("Debug adapter '{name}' not found. Searched: {searched}")]
    AdapterNotFound { name: String, searched: String },

    #[error("Debug adapter failed to start: {0}")]
    AdapterStartFailed(String),

    #[error("Debug adapter crashed unexpectedly")]
    AdapterCrashed,

    // === DAP Protocol Errors ===
    #[error("DAP protocol error: {0}")]
    DapProtocol(String),

    #[error("DAP request '{command}' failed: {message}")]
    DapRequestFailed { command: String, message: String },

    // === Timeout Errors ===
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an adapter not found error with search paths
    pub fn adapter_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::AdapterNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a DAP request failed error
    pub fn dap_request_failed(command: &str, message: &str) -> Self {
        Self::DapRequestFailed {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a breakpoint failed error
    pub fn breakpoint_failed(location: &str, reason: &str) -> Self {
        Self::BreakpointFailed {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unresolved document error
    pub fn unresolved(reference: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvedDocument {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a caller bug rather than a runtime condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContractViolation(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_mismatch_message_names_both_languages() {
        let err = Error::LanguageMismatch {
            expected: "r".to_string(),
            actual: "python".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'python'"));
        assert!(msg.contains("'r'"));
    }

    #[test]
    fn test_only_contract_and_internal_errors_are_fatal() {
        assert!(Error::ContractViolation("x".into()).is_fatal());
        assert!(Error::Internal("x".into()).is_fatal());
        assert!(!Error::SessionCancelled.is_fatal());
        assert!(!Error::Timeout(3).is_fatal());
        assert!(!Error::NotImplemented("error breakpoints").is_fatal());
    }
}
