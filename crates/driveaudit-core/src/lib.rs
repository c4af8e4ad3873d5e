//! Driveaudit Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! internal/external sharing classifier shared by every driveaudit component.

pub mod config;
pub mod domain;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AuditConfig, Config, GoogleConfig, OutputConfig, OutputFormat};
pub use domain::{extract_domain, is_external, DomainClassifier};
pub use error::{AuditError, ErrorMetadata, ExitCode, LogLevel};
pub use models::{
    AuditResult, ExternalShareRecord, FileError, FileRecord, PermissionRecord, PermissionType,
};
