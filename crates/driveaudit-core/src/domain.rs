//! Internal/external classification of sharing permissions
//!
//! A permission is external when it grants access to a principal outside the
//! organization's domain. Rules are evaluated in order and the first match wins:
//!
//! | type              | external when                                        |
//! |-------------------|------------------------------------------------------|
//! | `anyone`          | always                                               |
//! | `domain`          | the permission domain differs (empty counts)         |
//! | `user` / `group`  | the email is set and its domain differs              |
//! | anything else     | never                                                |
//!
//! A user or group grant without an email cannot be proven external and is
//! reported as internal. Comparison is case-sensitive.

use crate::models::{PermissionRecord, PermissionType};

/// Return everything after the last `@`, or `""` when there is none.
pub fn extract_domain(email: &str) -> &str {
    match email.rfind('@') {
        Some(idx) => &email[idx + 1..],
        None => "",
    }
}

/// Whether `permission` grants access outside `organization_domain`.
pub fn is_external(permission: &PermissionRecord, organization_domain: &str) -> bool {
    match &permission.permission_type {
        PermissionType::Anyone => true,
        PermissionType::Domain => permission.domain().unwrap_or_default() != organization_domain,
        PermissionType::User | PermissionType::Group => match permission.email() {
            Some(email) => extract_domain(email) != organization_domain,
            None => false,
        },
        PermissionType::Other(_) => false,
    }
}

/// Classifier bound to one organization domain
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    domain: String,
}

impl DomainClassifier {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_external(&self, permission: &PermissionRecord) -> bool {
        is_external(permission, &self.domain)
    }
}
