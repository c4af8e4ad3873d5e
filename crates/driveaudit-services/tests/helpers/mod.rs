#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use driveaudit_drive::testing::ScriptedDriveApi;
use driveaudit_services::{AuditSettings, Auditor};
use tempfile::TempDir;

pub const TEST_DOMAIN: &str = "example.com";

/// Auditor wired to a scripted Drive plus a scratch output directory
pub struct TestAudit {
    pub api: Arc<ScriptedDriveApi>,
    pub auditor: Auditor,
    pub output: TempDir,
}

/// Setup an auditor over `api` for the test domain
pub fn setup_audit(api: ScriptedDriveApi) -> TestAudit {
    let api = Arc::new(api);
    let auditor = Auditor::new(
        api.clone(),
        AuditSettings {
            domain: TEST_DOMAIN.to_string(),
            page_size: 2,
            include_shared_drives: true,
        },
    );
    let output = tempfile::tempdir().expect("Failed to create output directory");

    TestAudit {
        api,
        auditor,
        output,
    }
}
