use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use driveaudit_core::{AuditError, ExternalShareRecord, FileRecord};
use serde::Serialize;

use super::{
    prepare_output_dir, report_error, sort_file_records, sort_share_records, FileRow, Reporter,
    ShareRow, EXTERNAL_SHARING_REPORT, FILES_BY_OWNER_REPORT,
};

/// JSON report writer: one array of objects per report, keyed by the same
/// column names as the CSV output.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, AuditError> {
        Ok(Self {
            output_dir: prepare_output_dir(output_dir.into())?,
        })
    }

    fn write<R: Serialize>(&self, name: &str, rows: &[R]) -> Result<PathBuf, AuditError> {
        let path = self.output_dir.join(format!("{}.json", name));
        let file = File::create(&path).map_err(|e| report_error(&path, e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, rows).map_err(|e| report_error(&path, e))?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| report_error(&path, e))?;

        tracing::info!(path = %path.display(), rows = rows.len(), "Wrote JSON report");
        Ok(path)
    }
}

impl Reporter for JsonReporter {
    fn write_files_by_owner(&self, records: &mut [FileRecord]) -> Result<PathBuf, AuditError> {
        sort_file_records(records);
        let rows: Vec<FileRow<'_>> = records.iter().map(FileRow::from).collect();
        self.write(FILES_BY_OWNER_REPORT, &rows)
    }

    fn write_external_sharing(
        &self,
        records: &mut [ExternalShareRecord],
    ) -> Result<PathBuf, AuditError> {
        sort_share_records(records);
        let rows: Vec<ShareRow<'_>> = records.iter().map(ShareRow::from).collect();
        self.write(EXTERNAL_SHARING_REPORT, &rows)
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
