//! Support code for the `driveaudit` binary.

pub mod commands;
pub mod output;

use driveaudit_core::{AuditError, ErrorMetadata, ExitCode, LogLevel};

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_log_directive(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout carries only
/// report summaries.
pub fn init_tracing(verbose: bool, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(default_log_directive(verbose, quiet))
            }),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// The first `AuditError` in the chain, if any.
pub fn audit_error(err: &anyhow::Error) -> Option<&AuditError> {
    err.chain().find_map(|e| e.downcast_ref::<AuditError>())
}

/// Exit status for a failed run. Anything not classified is internal.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    audit_error(err)
        .map(|e| e.exit_code())
        .unwrap_or(ExitCode::InternalError)
}

/// Log a failed run at the level its error asks for and print it to stderr.
pub fn report_failure(err: &anyhow::Error) {
    match audit_error(err) {
        Some(audit) => {
            match audit.log_level() {
                LogLevel::Debug => {
                    tracing::debug!(
                        error_code = audit.error_code(),
                        error = %audit.detailed_message(),
                        "Run failed"
                    )
                }
                LogLevel::Warn => {
                    tracing::warn!(error_code = audit.error_code(), error = %audit, "Run stopped")
                }
                LogLevel::Error => {
                    tracing::error!(
                        error_code = audit.error_code(),
                        error = %audit.detailed_message(),
                        "Run failed"
                    )
                }
            }
            eprintln!("Error: {:#}", err);
            if let Some(action) = audit.suggested_action() {
                eprintln!("Hint: {}", action);
            }
        }
        None => {
            tracing::error!(error = %format!("{:#}", err), "Run failed");
            eprintln!("Error: {:#}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use driveaudit_core::AuditResult;

    #[test]
    fn log_directive_follows_flags() {
        assert_eq!(default_log_directive(false, false), "info");
        assert_eq!(default_log_directive(true, false), "debug");
        assert_eq!(default_log_directive(false, true), "warn");
    }

    #[test]
    fn exit_code_found_through_context() {
        let err = Err::<(), _>(AuditError::Config("domain is required".into()))
            .context("Failed to load config")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::ConfigError);

        let err = anyhow::Error::from(AuditError::Auth("bad key".into()));
        assert_eq!(exit_code_for(&err), ExitCode::AuthError);

        let err = anyhow::Error::from(AuditError::api(
            "list files",
            "corpus domain",
            anyhow::anyhow!("timeout"),
        ));
        assert_eq!(exit_code_for(&err), ExitCode::ApiError);
    }

    #[test]
    fn cancellation_and_unknown_errors_are_internal() {
        let err = anyhow::Error::from(AuditError::Cancelled {
            partial: Box::new(AuditResult::default()),
        });
        assert_eq!(exit_code_for(&err), ExitCode::InternalError);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), ExitCode::InternalError);
    }

    #[test]
    fn outermost_audit_error_wins() {
        // A token refresh failing mid-run arrives wrapped in an API error.
        let inner = AuditError::Auth("token expired".into());
        let err = anyhow::Error::from(AuditError::api("list permissions", "file f1", inner));
        assert_eq!(exit_code_for(&err), ExitCode::ApiError);
    }
}
