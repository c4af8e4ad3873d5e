use serde::Serialize;
use std::fmt;

use crate::models::{ExternalShareRecord, FileRecord};

/// A non-fatal failure confined to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file_id: String,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}: {}", self.file_id, self.message)
    }
}

/// Outcome of one audit pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditResult {
    pub total_files: usize,
    pub files_processed: usize,
    pub total_external_shares: usize,
    pub file_records: Vec<FileRecord>,
    pub external_shares: Vec<ExternalShareRecord>,
    pub errors: Vec<FileError>,
}

impl AuditResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
