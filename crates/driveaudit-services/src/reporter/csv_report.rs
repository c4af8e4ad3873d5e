use std::path::{Path, PathBuf};

use driveaudit_core::{AuditError, ExternalShareRecord, FileRecord};
use serde::Serialize;

use super::{
    prepare_output_dir, report_error, sort_file_records, sort_share_records, FileRow, Reporter,
    ShareRow, EXTERNAL_SHARING_REPORT, FILES_BY_OWNER_REPORT, FILE_COLUMNS, SHARE_COLUMNS,
};

/// CSV report writer. The header row is written even when there are no
/// records.
#[derive(Debug, Clone)]
pub struct CsvReporter {
    output_dir: PathBuf,
}

impl CsvReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, AuditError> {
        Ok(Self {
            output_dir: prepare_output_dir(output_dir.into())?,
        })
    }

    fn report_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", name))
    }

    fn write<R: Serialize>(
        &self,
        name: &str,
        header: &[&str],
        rows: impl Iterator<Item = R>,
    ) -> Result<PathBuf, AuditError> {
        let path = self.report_path(name);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| report_error(&path, e))?;

        writer
            .write_record(header)
            .map_err(|e| report_error(&path, e))?;
        let mut count = 0usize;
        for row in rows {
            writer.serialize(row).map_err(|e| report_error(&path, e))?;
            count += 1;
        }
        writer.flush().map_err(|e| report_error(&path, e))?;

        tracing::info!(path = %path.display(), rows = count, "Wrote CSV report");
        Ok(path)
    }
}

impl Reporter for CsvReporter {
    fn write_files_by_owner(&self, records: &mut [FileRecord]) -> Result<PathBuf, AuditError> {
        sort_file_records(records);
        self.write(
            FILES_BY_OWNER_REPORT,
            &FILE_COLUMNS,
            records.iter().map(FileRow::from),
        )
    }

    fn write_external_sharing(
        &self,
        records: &mut [ExternalShareRecord],
    ) -> Result<PathBuf, AuditError> {
        sort_share_records(records);
        self.write(
            EXTERNAL_SHARING_REPORT,
            &SHARE_COLUMNS,
            records.iter().map(ShareRow::from),
        )
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
