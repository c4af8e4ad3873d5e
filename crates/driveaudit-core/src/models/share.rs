use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::extract_domain;
use crate::models::{FileRecord, PermissionRecord};

/// A permission granting access outside the organization, joined with its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalShareRecord {
    pub owner_email: String,
    pub file_id: String,
    pub file_name: String,
    pub shared_with_email: String,
    pub shared_with_domain: String,
    pub permission_type: String,
    pub permission_role: String,
    /// The Drive API does not expose when a grant was made; always `None`.
    pub shared_date: Option<DateTime<Utc>>,
}

impl ExternalShareRecord {
    /// Join a file with one of its external permissions.
    ///
    /// The recipient domain is the permission's own domain when present,
    /// otherwise whatever follows the last `@` of the recipient email.
    pub fn from_permission(file: &FileRecord, permission: &PermissionRecord) -> Self {
        let shared_with_email = permission.email().unwrap_or_default().to_string();
        let shared_with_domain = match permission.domain() {
            Some(domain) => domain.to_string(),
            None => extract_domain(&shared_with_email).to_string(),
        };

        ExternalShareRecord {
            owner_email: file.owner_email.clone(),
            file_id: file.file_id.clone(),
            file_name: file.file_name.clone(),
            shared_with_email,
            shared_with_domain,
            permission_type: permission.permission_type.to_string(),
            permission_role: permission.role.clone(),
            shared_date: None,
        }
    }
}
