//! driveaudit services layer
//!
//! Hosts the audit orchestration on top of the Drive listing client and the
//! report writers that turn finished results into files. The CLI depends on
//! this crate as its single facade.

pub mod audit;
pub mod reporter;

pub use audit::{AuditSettings, Auditor, CombinedAudit};
pub use reporter::{
    create_reporter, sort_file_records, sort_share_records, CsvReporter, JsonReporter, Reporter,
    EXTERNAL_SHARING_REPORT, FILES_BY_OWNER_REPORT,
};
