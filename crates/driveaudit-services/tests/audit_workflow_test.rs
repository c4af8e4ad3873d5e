mod helpers;

use driveaudit_core::{ErrorMetadata, ExitCode, OutputFormat};
use driveaudit_drive::testing::{permission, ScriptedDriveApi};
use driveaudit_services::{create_reporter, Reporter};
use helpers::fixtures::{org_files, paged_drive, script_org_permissions};
use helpers::setup_audit;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_files_audit_follows_every_page() {
    let app = setup_audit(paged_drive(org_files()));

    let result = app
        .auditor
        .audit_files(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_files, 5);
    assert_eq!(result.files_processed, 5);
    let tokens: Vec<_> = app
        .api
        .file_requests()
        .into_iter()
        .map(|r| r.page_token)
        .collect();
    assert_eq!(
        tokens,
        vec![None, Some("page-1".to_string()), Some("page-2".to_string())]
    );
    assert!(app.api.file_requests().iter().all(|r| r.page_size == 2));
}

#[tokio::test]
async fn test_sharing_audit_classifies_against_domain() {
    let api = paged_drive(org_files());
    script_org_permissions(&api);
    let app = setup_audit(api);

    let result = app
        .auditor
        .audit_external_sharing(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_files, 5);
    assert_eq!(result.files_processed, 5);
    assert!(result.errors.is_empty());

    let mut found: Vec<_> = result
        .external_shares
        .iter()
        .map(|s| {
            (
                s.file_id.as_str(),
                s.permission_type.as_str(),
                s.shared_with_domain.as_str(),
            )
        })
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            ("f-budget", "user", "accounting-firm.com"),
            ("f-notes", "domain", "partner.org"),
            ("f-roadmap", "anyone", ""),
        ]
    );
    assert_eq!(result.total_external_shares, 3);

    // Every share refers to a file seen in the same pass.
    assert!(result
        .external_shares
        .iter()
        .all(|s| result.file_records.iter().any(|f| f.file_id == s.file_id)));
}

#[tokio::test]
async fn test_failed_file_appears_once_in_errors() {
    let api = paged_drive(org_files());
    api.fail_permissions("f-budget", "rate limit exceeded");
    api.set_permissions(
        "f-handbook",
        vec![permission("x", "user", Some("friend@gmail.com"), None)],
    );
    let app = setup_audit(api);

    let result = app
        .auditor
        .audit_external_sharing(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(app.api.permission_file_ids().len(), 5);
    assert_eq!(result.files_processed, 4);
    let failed: Vec<_> = result.errors.iter().map(|e| e.file_id.as_str()).collect();
    assert_eq!(failed, vec!["f-budget"]);
    assert!(result.errors[0].message.contains("rate limit exceeded"));

    // The last file is still audited after the failure.
    assert_eq!(result.external_shares.len(), 1);
    assert_eq!(result.external_shares[0].file_id, "f-handbook");
}

#[tokio::test]
async fn test_listing_failure_aborts_with_api_error() {
    let api = ScriptedDriveApi::new();
    api.fail_files("403 Insufficient Permission");
    let app = setup_audit(api);

    let err = app
        .auditor
        .audit_files(&CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), ExitCode::ApiError);
    assert_eq!(err.error_code(), "API_ERROR");
    assert!(err.detailed_message().contains("Insufficient Permission"));
}

#[tokio::test]
async fn test_cancellation_mid_listing_returns_partial_files() {
    let cancel = CancellationToken::new();
    let api = paged_drive(org_files());
    api.cancel_after_file_pages(2, cancel.clone());
    let app = setup_audit(api);

    let err = app.auditor.audit_files(&cancel).await.unwrap_err();
    let partial = err.partial_result().expect("cancellation carries a partial result");

    assert_eq!(partial.total_files, 4);
    assert_eq!(app.api.file_requests().len(), 2);
    assert_eq!(err.exit_code(), ExitCode::InternalError);
}

#[tokio::test]
async fn test_partial_sharing_result_can_still_be_reported() {
    let cancel = CancellationToken::new();
    let api = paged_drive(org_files());
    script_org_permissions(&api);
    api.cancel_on_permissions("f-budget", cancel.clone());
    let app = setup_audit(api);

    let err = app
        .auditor
        .audit_external_sharing(&cancel)
        .await
        .unwrap_err();
    let mut partial = err.partial_result().unwrap().clone();
    // Cancelled while f-budget still had a second permission page to fetch.
    assert_eq!(partial.files_processed, 1);
    assert_eq!(partial.external_shares.len(), 1);

    let reporter = create_reporter(OutputFormat::Csv, app.output.path()).unwrap();
    let path = reporter
        .write_external_sharing(&mut partial.external_shares)
        .unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert_eq!(content.lines().count(), 1 + partial.external_shares.len());
}
