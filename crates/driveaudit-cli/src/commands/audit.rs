use std::sync::Arc;

use anyhow::Context;
use driveaudit_core::{AuditError, AuditResult, Config};
use driveaudit_drive::{Authenticator, DriveApi, GoogleDriveApi, TokenSource};
use driveaudit_services::{create_reporter, AuditSettings, Auditor, Reporter};
use tokio_util::sync::CancellationToken;

use crate::output::{Console, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    Files,
    Sharing,
    All,
}

/// Authenticate against Google and run the requested audit.
pub async fn run(
    kind: AuditKind,
    config: &Config,
    console: &Console,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let api = connect(config).await?;
    execute(kind, api, config, console, cancel).await
}

/// Build the live Drive client.
///
/// A token is fetched up front so credential problems surface as
/// authentication failures before any listing starts.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn DriveApi>> {
    let auth = Authenticator::new(
        &config.google.service_account_file,
        &config.google.admin_email,
    )?;
    auth.access_token().await?;
    tracing::info!(
        client_email = %auth.client_email(),
        subject = %config.google.admin_email,
        "Authenticated with service account"
    );

    let api = GoogleDriveApi::new(Arc::new(auth)).context("Failed to create Drive client")?;
    Ok(Arc::new(api))
}

/// Run an audit over `api` and write its reports.
///
/// A cancelled audit still writes whatever it gathered before returning the
/// cancellation error.
pub async fn execute(
    kind: AuditKind,
    api: Arc<dyn DriveApi>,
    config: &Config,
    console: &Console,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let reporter = create_reporter(config.output_format()?, &config.output.directory)?;
    let auditor = Auditor::new(api, AuditSettings::from(config));

    match kind {
        AuditKind::Files => {
            console.status("Fetching files from Google Drive...");
            match auditor.audit_files(cancel).await {
                Ok(mut result) => {
                    write_files(reporter.as_ref(), console, &mut result, Outcome::Complete)
                }
                Err(AuditError::Cancelled { mut partial }) => {
                    write_files(reporter.as_ref(), console, &mut partial, Outcome::Cancelled)?;
                    Err(AuditError::Cancelled { partial }.into())
                }
                Err(e) => Err(e.into()),
            }
        }
        AuditKind::Sharing => {
            console.status("Analyzing external sharing...");
            match auditor.audit_external_sharing(cancel).await {
                Ok(mut result) => {
                    write_sharing(reporter.as_ref(), console, &mut result, Outcome::Complete)
                }
                Err(AuditError::Cancelled { mut partial }) => {
                    write_sharing(reporter.as_ref(), console, &mut partial, Outcome::Cancelled)?;
                    Err(AuditError::Cancelled { partial }.into())
                }
                Err(e) => Err(e.into()),
            }
        }
        AuditKind::All => {
            console.status("Running all audits...");
            match auditor.audit_all(cancel).await {
                Ok(mut combined) => {
                    let reporter = reporter.as_ref();
                    write_files(reporter, console, &mut combined.files, Outcome::Complete)?;
                    write_sharing(reporter, console, &mut combined.sharing, Outcome::Complete)
                }
                Err(AuditError::CancelledAll {
                    mut files,
                    mut sharing,
                }) => {
                    // A sharing partial means the files pass ran to the end.
                    let files_outcome = if sharing.is_some() {
                        Outcome::Complete
                    } else {
                        Outcome::Cancelled
                    };
                    write_files(reporter.as_ref(), console, &mut files, files_outcome)?;
                    // Leave any earlier sharing report alone if the pass never started.
                    if let Some(partial) = sharing.as_deref_mut() {
                        write_sharing(reporter.as_ref(), console, partial, Outcome::Cancelled)?;
                    }
                    Err(AuditError::CancelledAll { files, sharing }.into())
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn write_files(
    reporter: &dyn Reporter,
    console: &Console,
    result: &mut AuditResult,
    outcome: Outcome,
) -> anyhow::Result<()> {
    let path = reporter.write_files_by_owner(&mut result.file_records)?;
    console.files_summary(result, &path, outcome);
    Ok(())
}

fn write_sharing(
    reporter: &dyn Reporter,
    console: &Console,
    result: &mut AuditResult,
    outcome: Outcome,
) -> anyhow::Result<()> {
    let path = reporter.write_external_sharing(&mut result.external_shares)?;
    for error in &result.errors {
        tracing::debug!(file_id = %error.file_id, error = %error.message, "File skipped");
    }
    console.sharing_summary(result, &path, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_code_for;
    use driveaudit_core::ExitCode;
    use driveaudit_drive::testing::{file, permission, ScriptedDriveApi};

    fn config(output: &std::path::Path, format: &str) -> Config {
        let mut config = Config::default();
        config.google.domain = "example.com".to_string();
        config.output.directory = output.display().to_string();
        config.output.format = format.to_string();
        config
    }

    fn drive() -> Arc<ScriptedDriveApi> {
        let api = ScriptedDriveApi::new().with_files(vec![
            file("f1", "Plan", "amy@example.com"),
            file("f2", "Notes", "bob@example.com"),
        ]);
        api.set_permissions("f1", vec![permission("p", "anyone", None, None)]);
        Arc::new(api)
    }

    #[tokio::test]
    async fn files_audit_writes_csv_report() {
        let tmp = tempfile::tempdir().unwrap();
        execute(
            AuditKind::Files,
            drive(),
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(tmp.path().join("files_by_owner.csv")).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(!tmp.path().join("external_sharing.csv").exists());
    }

    #[tokio::test]
    async fn sharing_audit_writes_json_report() {
        let tmp = tempfile::tempdir().unwrap();
        execute(
            AuditKind::Sharing,
            drive(),
            &config(tmp.path(), "json"),
            &Console::new(true, false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(tmp.path().join("external_sharing.json")).unwrap();
        assert!(content.contains("\"permission_type\": \"anyone\""));
    }

    #[tokio::test]
    async fn all_audits_write_both_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let api = drive();
        api.push_file_page(driveaudit_drive::Page::last(vec![file(
            "f1",
            "Plan",
            "amy@example.com",
        )]));

        execute(
            AuditKind::All,
            api,
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(tmp.path().join("files_by_owner.csv").exists());
        assert!(tmp.path().join("external_sharing.csv").exists());
    }

    #[tokio::test]
    async fn cancelled_audit_writes_partial_report_and_exits_internal() {
        let tmp = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = execute(
            AuditKind::Files,
            drive(),
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &cancel,
        )
        .await
        .unwrap_err();

        assert_eq!(exit_code_for(&err), ExitCode::InternalError);
        let content = std::fs::read_to_string(tmp.path().join("files_by_owner.csv")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn all_audit_cancelled_in_sharing_pass_keeps_complete_files_report() {
        let tmp = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let api = ScriptedDriveApi::new().with_files(vec![
            file("f1", "Plan", "amy@example.com"),
            file("f2", "Notes", "bob@example.com"),
        ]);
        api.push_file_page(driveaudit_drive::Page::new(
            vec![file("f1", "Plan", "amy@example.com")],
            Some("t".to_string()),
        ));
        api.cancel_after_file_pages(2, cancel.clone());

        let err = execute(
            AuditKind::All,
            Arc::new(api),
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &cancel,
        )
        .await
        .unwrap_err();

        assert_eq!(exit_code_for(&err), ExitCode::InternalError);
        let files = std::fs::read_to_string(tmp.path().join("files_by_owner.csv")).unwrap();
        assert_eq!(files.lines().count(), 3);
        let sharing = std::fs::read_to_string(tmp.path().join("external_sharing.csv")).unwrap();
        assert_eq!(sharing.lines().count(), 1);
    }

    #[tokio::test]
    async fn all_audit_cancelled_in_files_pass_leaves_sharing_report_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let earlier = tmp.path().join("external_sharing.csv");
        std::fs::write(&earlier, "from an earlier run\n").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = execute(
            AuditKind::All,
            drive(),
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &cancel,
        )
        .await
        .unwrap_err();

        assert_eq!(exit_code_for(&err), ExitCode::InternalError);
        assert!(tmp.path().join("files_by_owner.csv").exists());
        assert_eq!(
            std::fs::read_to_string(&earlier).unwrap(),
            "from an earlier run\n"
        );
    }

    #[tokio::test]
    async fn listing_failure_exits_with_api_code() {
        let tmp = tempfile::tempdir().unwrap();
        let api = ScriptedDriveApi::new();
        api.fail_files("503 backend error");

        let err = execute(
            AuditKind::Files,
            Arc::new(api),
            &config(tmp.path(), "csv"),
            &Console::new(true, false),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::ApiError);
    }

    #[tokio::test]
    async fn missing_credentials_exit_with_auth_code() {
        let err = connect(&Config::default()).await.err().unwrap();
        assert_eq!(exit_code_for(&err), ExitCode::AuthError);
    }
}
