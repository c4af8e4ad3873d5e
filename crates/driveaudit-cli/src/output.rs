//! Human-readable progress and summaries on stdout.

use std::fmt;
use std::path::Path;

use driveaudit_core::AuditResult;

/// Whether a pass ran to the end or was interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Complete => f.write_str("complete"),
            Outcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Stdout printer honoring `--quiet` and `--verbose`
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
    verbose: bool,
}

impl Console {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self { quiet, verbose }
    }

    pub fn status(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn files_summary(&self, result: &AuditResult, report: &Path, outcome: Outcome) {
        for line in files_summary_lines(result, report, outcome) {
            self.status(&line);
        }
    }

    pub fn sharing_summary(&self, result: &AuditResult, report: &Path, outcome: Outcome) {
        for line in sharing_summary_lines(result, report, outcome, self.verbose) {
            self.status(&line);
        }
    }
}

pub fn files_summary_lines(result: &AuditResult, report: &Path, outcome: Outcome) -> Vec<String> {
    vec![
        format!("Files audit {}. Total files: {}", outcome, result.total_files),
        format!("Report saved to: {}", report.display()),
    ]
}

/// Per-file failures are counted always and listed only when `verbose`.
pub fn sharing_summary_lines(
    result: &AuditResult,
    report: &Path,
    outcome: Outcome,
    verbose: bool,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Sharing audit {}. Files processed: {} of {}",
            outcome, result.files_processed, result.total_files
        ),
        format!("External shares found: {}", result.total_external_shares),
        format!("Report saved to: {}", report.display()),
    ];

    if result.has_errors() {
        lines.push(format!(
            "Warnings: {} files could not be processed",
            result.errors.len()
        ));
        if verbose {
            lines.extend(result.errors.iter().map(|e| format!("  - {}", e)));
        }
    }

    lines
}
