use std::path::{Path, PathBuf};

use anyhow::Context;
use driveaudit_core::config::CONFIG_FILE_NAME;
use driveaudit_core::{AuditError, Config};

use crate::output::Console;

/// Write a sample configuration to `path` (default `./.driveaudit.yaml`).
///
/// An existing file is left alone unless `force` is set.
pub fn init(path: Option<&Path>, force: bool) -> anyhow::Result<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() && !force {
        return Err(AuditError::Config(format!(
            "config file {} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    Config::default()
        .save(&path)
        .context("Failed to create config file")?;
    tracing::debug!(path = %path.display(), "Wrote sample config");
    Ok(path)
}

pub fn run(path: Option<&Path>, force: bool, console: &Console) -> anyhow::Result<()> {
    let written = init(path, force)?;
    console.status(&format!("Created {}", written.display()));
    console.status("Please edit the file to add your Google service account credentials.");
    Ok(())
}
