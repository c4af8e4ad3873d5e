pub mod file;
pub mod permission;
pub mod result;
pub mod share;

pub use file::{format_timestamp, parse_timestamp, FileRecord};
pub use permission::{PermissionRecord, PermissionType};
pub use result::{AuditResult, FileError};
pub use share::ExternalShareRecord;
