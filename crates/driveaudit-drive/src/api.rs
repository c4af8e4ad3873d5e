//! Remote listing capability and its wire types.

use async_trait::async_trait;
use driveaudit_core::models::parse_timestamp;
use driveaudit_core::{FileRecord, PermissionRecord, PermissionType};
use serde::{Deserialize, Deserializer};

/// Field mask for file listings
pub const FILE_FIELDS: &str =
    "nextPageToken, files(id, name, mimeType, owners, createdTime, modifiedTime, size)";
/// Field mask for permission listings
pub const PERMISSION_FIELDS: &str =
    "nextPageToken, permissions(id, type, role, emailAddress, domain, displayName)";

/// One page of a listing plus the cursor for the next one
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` or empty when this is the last page
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// A final page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListRequest {
    /// Listing scope; `domain` covers every file visible to the domain
    pub corpora: String,
    pub page_size: i64,
    pub page_token: Option<String>,
    pub fields: String,
    pub supports_all_drives: bool,
    pub include_items_from_all_drives: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionListRequest {
    pub page_token: Option<String>,
    pub fields: String,
    pub supports_all_drives: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteOwner {
    pub email_address: String,
    pub display_name: Option<String>,
}

/// File entry as returned by `files.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub owners: Vec<RemoteOwner>,
    pub created_time: String,
    pub modified_time: String,
    #[serde(deserialize_with = "int64_string")]
    pub size: i64,
}

impl RemoteFile {
    /// Email of the first listed owner; shared-drive files have none.
    pub fn owner_email(&self) -> &str {
        self.owners
            .first()
            .map(|o| o.email_address.as_str())
            .unwrap_or_default()
    }
}

impl From<RemoteFile> for FileRecord {
    fn from(file: RemoteFile) -> Self {
        FileRecord {
            owner_email: file.owner_email().to_string(),
            created_time: parse_timestamp(&file.created_time),
            modified_time: parse_timestamp(&file.modified_time),
            file_id: file.id,
            file_name: file.name,
            file_type: file.mime_type,
            size_bytes: file.size,
        }
    }
}

/// Permission entry as returned by `permissions.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemotePermission {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub email_address: Option<String>,
    pub domain: Option<String>,
    pub display_name: Option<String>,
}

impl From<RemotePermission> for PermissionRecord {
    fn from(perm: RemotePermission) -> Self {
        PermissionRecord {
            id: perm.id,
            permission_type: PermissionType::from(perm.kind),
            role: perm.role,
            email_address: perm.email_address,
            domain: perm.domain,
            display_name: perm.display_name,
        }
    }
}

/// Drive encodes int64 values as JSON strings; accept numbers and null too.
fn int64_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(s)) if s.is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Remote listing operations the auditor needs
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Fetch one page of files.
    async fn list_files(&self, request: &FileListRequest) -> anyhow::Result<Page<RemoteFile>>;

    /// Fetch one page of permissions for `file_id`.
    async fn list_permissions(
        &self,
        file_id: &str,
        request: &PermissionListRequest,
    ) -> anyhow::Result<Page<RemotePermission>>;
}
