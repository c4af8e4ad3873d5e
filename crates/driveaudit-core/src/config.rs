//! Configuration module
//!
//! Configuration is read from a YAML file with three sections (`google`,
//! `audit`, `output`). Missing sections and keys fall back to defaults; the
//! Google credentials may also be supplied through the environment (or a
//! `.env` file), which takes precedence over the file.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuditError;

/// Default number of items requested per API page.
pub const DEFAULT_PAGE_SIZE: i64 = 1000;
/// Largest page size the Drive API accepts for file listings.
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const DEFAULT_OUTPUT_FORMAT: &str = "csv";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "./output";
/// File name looked up in the working directory, then in the home directory.
pub const CONFIG_FILE_NAME: &str = ".driveaudit.yaml";
/// Supported values for `output.format`.
pub const VALID_OUTPUT_FORMATS: &[&str] = &["csv", "json"];

const ENV_SERVICE_ACCOUNT_FILE: &str = "DRIVEAUDIT_SERVICE_ACCOUNT_FILE";
const ENV_ADMIN_EMAIL: &str = "DRIVEAUDIT_ADMIN_EMAIL";
const ENV_DOMAIN: &str = "DRIVEAUDIT_DOMAIN";

/// Report serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Parse a configured format name. Matching is exact (lowercase only).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Google API credentials and the organization domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Path to the service account JSON key
    pub service_account_file: String,
    /// Workspace admin impersonated through domain-wide delegation
    pub admin_email: String,
    /// Organization domain; grants outside it are reported as external
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub include_shared_drives: bool,
    pub page_size: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            include_shared_drives: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_OUTPUT_FORMAT.to_string(),
            directory: DEFAULT_OUTPUT_DIRECTORY.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub audit: AuditConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load, override from the environment, and validate.
    ///
    /// With an explicit `path` the file must exist. Otherwise
    /// `./.driveaudit.yaml` and `~/.driveaudit.yaml` are tried in order, and
    /// when neither exists only defaults and environment values apply.
    pub fn load(path: Option<&Path>) -> Result<Self, AuditError> {
        dotenvy::dotenv().ok();

        let source = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(),
        };

        let mut config = match source {
            Some(ref p) => {
                tracing::debug!(path = %p.display(), "Loading configuration file");
                Self::from_file(p)?
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Config::default()
            }
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, AuditError> {
        let raw = fs::read_to_string(path).map_err(|e| AuditError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_yaml_str(&raw).map_err(|e| AuditError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping.
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(raw)
    }

    fn discover() -> Option<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }
        candidates.into_iter().find(|p| p.is_file())
    }

    /// Replace Google settings with non-empty values from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = value(ENV_SERVICE_ACCOUNT_FILE) {
            self.google.service_account_file = v;
        }
        if let Some(v) = value(ENV_ADMIN_EMAIL) {
            self.google.admin_email = v;
        }
        if let Some(v) = value(ENV_DOMAIN) {
            self.google.domain = v;
        }
    }

    /// Every problem with this configuration, in a stable order.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.google.service_account_file.is_empty() {
            errors.push("google.service_account_file is required".to_string());
        } else if !Path::new(&self.google.service_account_file).exists() {
            errors.push(format!(
                "service account file not found: {}",
                self.google.service_account_file
            ));
        }

        if self.google.admin_email.is_empty() {
            errors.push("google.admin_email is required for domain-wide delegation".to_string());
        } else if !self.google.admin_email.contains('@') {
            errors.push("google.admin_email must be a valid email address".to_string());
        }

        if self.google.domain.is_empty() {
            errors.push("google.domain is required".to_string());
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.audit.page_size) {
            errors.push(format!(
                "audit.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            ));
        }

        if OutputFormat::parse(&self.output.format).is_none() {
            errors.push(format!(
                "output.format must be one of: {}",
                VALID_OUTPUT_FORMATS.join(", ")
            ));
        }

        errors
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuditError::Config(errors.join("; ")))
        }
    }

    /// The configured output format. Call after `validate`.
    pub fn output_format(&self) -> Result<OutputFormat, AuditError> {
        OutputFormat::parse(&self.output.format).ok_or_else(|| {
            AuditError::Config(format!("unsupported output.format: {}", self.output.format))
        })
    }

    /// Write this configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), AuditError> {
        let to_err = |source: anyhow::Error| AuditError::ConfigFile {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| to_err(e.into()))?;
        }

        let data = serde_yaml::to_string(self).map_err(|e| to_err(e.into()))?;
        write_private(path, data.as_bytes()).map_err(|e| to_err(e.into()))?;
        Ok(())
    }
}

// The file names a credential path and admin account; keep it owner-only.
#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}
