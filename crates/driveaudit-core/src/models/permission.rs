use serde::{Deserialize, Serialize};
use std::fmt;

/// Grantee type of a Drive permission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionType {
    User,
    Group,
    Domain,
    Anyone,
    /// Any value the API returns that we do not model; kept verbatim for reports.
    Other(String),
}

impl PermissionType {
    pub fn as_str(&self) -> &str {
        match self {
            PermissionType::User => "user",
            PermissionType::Group => "group",
            PermissionType::Domain => "domain",
            PermissionType::Anyone => "anyone",
            PermissionType::Other(raw) => raw,
        }
    }
}

impl From<&str> for PermissionType {
    fn from(value: &str) -> Self {
        match value {
            "user" => PermissionType::User,
            "group" => PermissionType::Group,
            "domain" => PermissionType::Domain,
            "anyone" => PermissionType::Anyone,
            other => PermissionType::Other(other.to_string()),
        }
    }
}

impl From<String> for PermissionType {
    fn from(value: String) -> Self {
        PermissionType::from(value.as_str())
    }
}

impl From<PermissionType> for String {
    fn from(value: PermissionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sharing grant on a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub id: String,
    pub permission_type: PermissionType,
    /// owner, organizer, fileOrganizer, writer, commenter, reader
    pub role: String,
    pub email_address: Option<String>,
    pub domain: Option<String>,
    pub display_name: Option<String>,
}

impl PermissionRecord {
    /// Email address, treating an empty string the same as absent.
    pub fn email(&self) -> Option<&str> {
        self.email_address.as_deref().filter(|e| !e.is_empty())
    }

    /// Domain, treating an empty string the same as absent.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}
