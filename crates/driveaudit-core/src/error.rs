//! Error types module
//!
//! Every failure that can end an audit run is an `AuditError`. Variants fall
//! into four classes that callers must be able to tell apart: configuration,
//! authentication, remote API, and internal. Failures confined to a single
//! file are not errors at this level; they are collected as `FileError`s in
//! the `AuditResult`.

use std::path::PathBuf;

use crate::models::AuditResult;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad configuration
    Debug,
    /// Warning level - for interruptions the user asked for
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Process exit status exposed by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    ConfigError,
    AuthError,
    ApiError,
    InternalError,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::ConfigError => 1,
            ExitCode::AuthError => 2,
            ExitCode::ApiError => 3,
            ExitCode::InternalError => 10,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Metadata describing how an error should be surfaced to the operator
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "CONFIG_ERROR")
    fn error_code(&self) -> &'static str;

    /// Exit status the CLI reports for this error
    fn exit_code(&self) -> ExitCode;

    /// Suggested action for the operator
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read config file {}", .path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Authentication failed: {message}")]
    AuthWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to {operation} for {target}")]
    Api {
        operation: String,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Audit cancelled after {} of {} files", .partial.files_processed, .partial.total_files)]
    Cancelled { partial: Box<AuditResult> },

    /// Cancellation of a combined run. `files` is complete whenever `sharing`
    /// is present; `sharing` is `None` if the sharing pass never started.
    #[error("Audit cancelled during the {} pass", .sharing.as_ref().map_or("files", |_| "sharing"))]
    CancelledAll {
        files: Box<AuditResult>,
        sharing: Option<Box<AuditResult>>,
    },

    #[error("Failed to write report {}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuditError {
    /// Wrap a transport failure with the operation and entity it concerned.
    pub fn api(
        operation: impl Into<String>,
        target: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        AuditError::Api {
            operation: operation.into(),
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn auth(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AuditError::AuthWithSource {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Partial result carried by a cancellation, if this is one.
    pub fn partial_result(&self) -> Option<&AuditResult> {
        match self {
            AuditError::Cancelled { partial } => Some(&**partial),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (error_code, exit_code, suggested_action, log_level).
fn audit_error_static_metadata(
    err: &AuditError,
) -> (&'static str, ExitCode, Option<&'static str>, LogLevel) {
    match err {
        AuditError::Config(_) | AuditError::ConfigFile { .. } => (
            "CONFIG_ERROR",
            ExitCode::ConfigError,
            Some("Run `driveaudit config init` and fill in the google section"),
            LogLevel::Debug,
        ),
        AuditError::Auth(_) | AuditError::AuthWithSource { .. } => (
            "AUTH_ERROR",
            ExitCode::AuthError,
            Some("Check the service account key and its domain-wide delegation"),
            LogLevel::Error,
        ),
        AuditError::Api { .. } => (
            "API_ERROR",
            ExitCode::ApiError,
            Some("Check Drive API access for the admin account and retry"),
            LogLevel::Error,
        ),
        AuditError::Cancelled { .. } | AuditError::CancelledAll { .. } => (
            "CANCELLED",
            ExitCode::InternalError,
            None,
            LogLevel::Warn,
        ),
        AuditError::Report { .. } => (
            "REPORT_ERROR",
            ExitCode::InternalError,
            Some("Check that the output directory is writable"),
            LogLevel::Error,
        ),
        AuditError::Internal(_) => (
            "INTERNAL_ERROR",
            ExitCode::InternalError,
            None,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AuditError {
    fn error_code(&self) -> &'static str {
        audit_error_static_metadata(self).0
    }

    fn exit_code(&self) -> ExitCode {
        audit_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        audit_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        audit_error_static_metadata(self).3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            ExitCode::Success.code(),
            ExitCode::ConfigError.code(),
            ExitCode::AuthError.code(),
            ExitCode::ApiError.code(),
            ExitCode::InternalError.code(),
        ];
        assert_eq!(codes, [0, 1, 2, 3, 10]);
    }

    #[test]
    fn test_error_metadata_config() {
        let err = AuditError::Config("google.domain is required".to_string());
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(err.exit_code(), ExitCode::ConfigError);
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert!(err.to_string().contains("google.domain is required"));
    }

    #[test]
    fn test_error_metadata_auth() {
        let err = AuditError::auth("token exchange failed", anyhow::anyhow!("401"));
        assert_eq!(err.exit_code(), ExitCode::AuthError);
        assert_eq!(err.error_code(), "AUTH_ERROR");
        assert!(err.detailed_message().contains("Caused by: 401"));
    }

    #[test]
    fn test_error_metadata_api_keeps_context() {
        let err = AuditError::api("list permissions", "file abc123", anyhow::anyhow!("boom"));
        assert_eq!(err.exit_code(), ExitCode::ApiError);
        assert_eq!(err.to_string(), "Failed to list permissions for file abc123");
        assert!(err.detailed_message().contains("boom"));
    }

    #[test]
    fn test_cancelled_carries_partial_result() {
        let partial = AuditResult {
            total_files: 4,
            files_processed: 2,
            ..Default::default()
        };
        let err = AuditError::Cancelled {
            partial: Box::new(partial),
        };
        assert_eq!(err.exit_code(), ExitCode::InternalError);
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert_eq!(err.partial_result().map(|r| r.files_processed), Some(2));
        assert_eq!(err.to_string(), "Audit cancelled after 2 of 4 files");
    }

    #[test]
    fn test_combined_cancel_names_interrupted_pass() {
        let err = AuditError::CancelledAll {
            files: Box::new(AuditResult::default()),
            sharing: None,
        };
        assert_eq!(err.to_string(), "Audit cancelled during the files pass");
        assert_eq!(err.exit_code(), ExitCode::InternalError);
        assert_eq!(err.log_level(), LogLevel::Warn);

        let err = AuditError::CancelledAll {
            files: Box::new(AuditResult::default()),
            sharing: Some(Box::default()),
        };
        assert_eq!(err.to_string(), "Audit cancelled during the sharing pass");
    }

    #[test]
    fn test_non_cancel_has_no_partial() {
        let err = AuditError::Internal("oops".to_string());
        assert!(err.partial_result().is_none());
        assert_eq!(err.exit_code(), ExitCode::InternalError);
    }
}
