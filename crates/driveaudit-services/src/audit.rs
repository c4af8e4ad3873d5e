//! Audit orchestration.
//!
//! Drives the paginated listings in a single sequential pass: every file,
//! then (for the sharing audit) every permission of every file, classifying
//! each grant against the organization domain.

use std::sync::Arc;

use driveaudit_core::{
    AuditError, AuditResult, Config, DomainClassifier, ExternalShareRecord, FileError, FileRecord,
};
use driveaudit_drive::{DriveApi, DriveClient, FetchError};
use tokio_util::sync::CancellationToken;

/// The subset of configuration an audit run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub domain: String,
    pub page_size: i64,
    pub include_shared_drives: bool,
}

impl From<&Config> for AuditSettings {
    fn from(config: &Config) -> Self {
        Self {
            domain: config.google.domain.clone(),
            page_size: config.audit.page_size,
            include_shared_drives: config.audit.include_shared_drives,
        }
    }
}

/// Results of running both audits
#[derive(Debug, Clone, Default)]
pub struct CombinedAudit {
    pub files: AuditResult,
    pub sharing: AuditResult,
}

pub struct Auditor {
    client: DriveClient,
    classifier: DomainClassifier,
}

impl Auditor {
    pub fn new(api: Arc<dyn DriveApi>, settings: AuditSettings) -> Self {
        Self {
            client: DriveClient::new(api, settings.page_size, settings.include_shared_drives),
            classifier: DomainClassifier::new(settings.domain),
        }
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    /// List every file in the domain as a files-by-owner result.
    #[tracing::instrument(skip_all, fields(audit = "files"))]
    pub async fn audit_files(&self, cancel: &CancellationToken) -> Result<AuditResult, AuditError> {
        tracing::info!("Listing files");

        let file_records = match self.list_file_records(cancel).await {
            Ok(records) => records,
            Err(FetchError::Cancelled { partial }) => {
                let count = partial.len();
                return Err(cancelled(AuditResult {
                    total_files: count,
                    files_processed: count,
                    file_records: partial,
                    ..Default::default()
                }));
            }
            Err(FetchError::Failed(e)) => return Err(e),
        };

        let count = file_records.len();
        tracing::info!(files = count, "Files audit complete");

        Ok(AuditResult {
            total_files: count,
            files_processed: count,
            file_records,
            ..Default::default()
        })
    }

    /// List every file, then every permission of each file, keeping grants
    /// that reach outside the organization domain.
    ///
    /// A file whose permissions cannot be listed is recorded in `errors` and
    /// skipped. Only a failure of the file listing itself aborts the audit.
    #[tracing::instrument(skip_all, fields(audit = "sharing", domain = %self.classifier.domain()))]
    pub async fn audit_external_sharing(
        &self,
        cancel: &CancellationToken,
    ) -> Result<AuditResult, AuditError> {
        tracing::info!("Listing files");

        let files = match self.list_file_records(cancel).await {
            Ok(records) => records,
            Err(FetchError::Cancelled { partial }) => {
                return Err(cancelled(AuditResult {
                    total_files: partial.len(),
                    file_records: partial,
                    ..Default::default()
                }));
            }
            Err(FetchError::Failed(e)) => return Err(e),
        };

        tracing::info!(files = files.len(), "Checking permissions");

        let mut result = AuditResult {
            total_files: files.len(),
            ..Default::default()
        };

        let mut interrupted = false;
        for file in &files {
            if cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            match self.client.get_file_permissions(cancel, &file.file_id).await {
                Ok(permissions) => {
                    result.files_processed += 1;
                    result.external_shares.extend(
                        permissions
                            .iter()
                            .filter(|p| self.classifier.is_external(p))
                            .map(|p| ExternalShareRecord::from_permission(file, p)),
                    );
                }
                Err(FetchError::Cancelled { .. }) => {
                    interrupted = true;
                    break;
                }
                Err(FetchError::Failed(e)) => {
                    let message = format!("{:#}", anyhow::Error::from(e));
                    tracing::warn!(
                        file_id = %file.file_id,
                        error = %message,
                        "Skipping file after permission listing failed"
                    );
                    result.errors.push(FileError {
                        file_id: file.file_id.clone(),
                        message,
                    });
                }
            }
        }

        let result = finish(result, files);
        if interrupted {
            return Err(cancelled(result));
        }

        tracing::info!(
            files = result.total_files,
            processed = result.files_processed,
            external_shares = result.total_external_shares,
            errors = result.errors.len(),
            "Sharing audit complete"
        );
        Ok(result)
    }

    /// Run the files audit, then the sharing audit.
    ///
    /// On cancellation the error is `AuditError::CancelledAll`, which keeps a
    /// finished files pass alongside the partial sharing pass.
    pub async fn audit_all(&self, cancel: &CancellationToken) -> Result<CombinedAudit, AuditError> {
        let files = match self.audit_files(cancel).await {
            Ok(files) => files,
            Err(AuditError::Cancelled { partial }) => {
                return Err(AuditError::CancelledAll {
                    files: partial,
                    sharing: None,
                })
            }
            Err(e) => return Err(e),
        };

        match self.audit_external_sharing(cancel).await {
            Ok(sharing) => Ok(CombinedAudit { files, sharing }),
            Err(AuditError::Cancelled { partial }) => Err(AuditError::CancelledAll {
                files: Box::new(files),
                sharing: Some(partial),
            }),
            Err(e) => Err(e),
        }
    }

    async fn list_file_records(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileRecord>, FetchError<FileRecord>> {
        match self.client.list_all_files(cancel).await {
            Ok(files) => Ok(files.into_iter().map(FileRecord::from).collect()),
            Err(FetchError::Cancelled { partial }) => Err(FetchError::Cancelled {
                partial: partial.into_iter().map(FileRecord::from).collect(),
            }),
            Err(FetchError::Failed(e)) => Err(FetchError::Failed(e)),
        }
    }
}

fn finish(mut result: AuditResult, files: Vec<FileRecord>) -> AuditResult {
    result.file_records = files;
    result.total_external_shares = result.external_shares.len();
    result
}

fn cancelled(partial: AuditResult) -> AuditError {
    tracing::warn!(
        processed = partial.files_processed,
        total = partial.total_files,
        "Audit cancelled"
    );
    AuditError::Cancelled {
        partial: Box::new(partial),
    }
}
