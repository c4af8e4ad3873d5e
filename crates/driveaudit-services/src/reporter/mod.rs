//! Report writers.
//!
//! Both reports are sorted by owner email, then file name, before they are
//! written. Comparison is byte-wise and the sort is stable, so the same
//! records always produce the same file.

mod csv_report;
mod json_report;

use std::path::{Path, PathBuf};

use driveaudit_core::models::format_timestamp;
use driveaudit_core::{AuditError, ExternalShareRecord, FileRecord, OutputFormat};
use serde::Serialize;

pub use csv_report::CsvReporter;
pub use json_report::JsonReporter;

/// Base name of the files-by-owner report
pub const FILES_BY_OWNER_REPORT: &str = "files_by_owner";
/// Base name of the external sharing report
pub const EXTERNAL_SHARING_REPORT: &str = "external_sharing";

pub(crate) const FILE_COLUMNS: [&str; 7] = [
    "owner_email",
    "file_id",
    "file_name",
    "file_type",
    "created_time",
    "modified_time",
    "size_bytes",
];

pub(crate) const SHARE_COLUMNS: [&str; 8] = [
    "owner_email",
    "file_id",
    "file_name",
    "shared_with_email",
    "shared_with_domain",
    "permission_type",
    "permission_role",
    "shared_date",
];

/// Writes finished audit results to the output directory
pub trait Reporter {
    /// Sort `records` in place and write the files-by-owner report.
    /// Returns the path written.
    fn write_files_by_owner(&self, records: &mut [FileRecord]) -> Result<PathBuf, AuditError>;

    /// Sort `records` in place and write the external sharing report.
    fn write_external_sharing(
        &self,
        records: &mut [ExternalShareRecord],
    ) -> Result<PathBuf, AuditError>;

    fn output_dir(&self) -> &Path;
}

/// Build the reporter for `format`, creating `output_dir` if needed.
pub fn create_reporter(
    format: OutputFormat,
    output_dir: impl Into<PathBuf>,
) -> Result<Box<dyn Reporter>, AuditError> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvReporter::new(output_dir)?),
        OutputFormat::Json => Box::new(JsonReporter::new(output_dir)?),
    })
}

pub fn sort_file_records(records: &mut [FileRecord]) {
    records.sort_by(|a, b| {
        a.owner_email
            .cmp(&b.owner_email)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}

pub fn sort_share_records(records: &mut [ExternalShareRecord]) {
    records.sort_by(|a, b| {
        a.owner_email
            .cmp(&b.owner_email)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}

pub(crate) fn prepare_output_dir(dir: PathBuf) -> Result<PathBuf, AuditError> {
    std::fs::create_dir_all(&dir).map_err(|e| AuditError::Report {
        path: dir.clone(),
        source: e.into(),
    })?;
    Ok(dir)
}

pub(crate) fn report_error(path: &Path, source: impl Into<anyhow::Error>) -> AuditError {
    AuditError::Report {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

/// One files-by-owner row, with timestamps already formatted
#[derive(Debug, Serialize)]
pub(crate) struct FileRow<'a> {
    owner_email: &'a str,
    file_id: &'a str,
    file_name: &'a str,
    file_type: &'a str,
    created_time: String,
    modified_time: String,
    size_bytes: i64,
}

impl<'a> From<&'a FileRecord> for FileRow<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            owner_email: &record.owner_email,
            file_id: &record.file_id,
            file_name: &record.file_name,
            file_type: &record.file_type,
            created_time: format_timestamp(record.created_time.as_ref()),
            modified_time: format_timestamp(record.modified_time.as_ref()),
            size_bytes: record.size_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ShareRow<'a> {
    owner_email: &'a str,
    file_id: &'a str,
    file_name: &'a str,
    shared_with_email: &'a str,
    shared_with_domain: &'a str,
    permission_type: &'a str,
    permission_role: &'a str,
    shared_date: String,
}

impl<'a> From<&'a ExternalShareRecord> for ShareRow<'a> {
    fn from(record: &'a ExternalShareRecord) -> Self {
        Self {
            owner_email: &record.owner_email,
            file_id: &record.file_id,
            file_name: &record.file_name,
            shared_with_email: &record.shared_with_email,
            shared_with_domain: &record.shared_with_domain,
            permission_type: &record.permission_type,
            permission_role: &record.permission_role,
            shared_date: format_timestamp(record.shared_date.as_ref()),
        }
    }
}
