//! Output formatters for duplicate scan results.
//!
//! This module provides two output formats:
//! - Text for people, with optional colour
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::DuplicateFinder;
//! use ccdupe::error::ExitCode;
//! use ccdupe::output::TextOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (report, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let mut stdout = std::io::stdout();
//! TextOutput::new(true).write_report(&mut stdout, &report, &summary).unwrap();
//! ```

pub mod json;
pub mod text;

use std::path::PathBuf;

use crate::duplicates::Report;
use crate::scanner::{HashError, ScanError};

// Re-export main types
pub use json::{JsonFileList, JsonOutput};
pub use text::TextOutput;

/// A per-file warning flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Stage that produced it: `"scan"` or `"hash"`
    pub stage: &'static str,
    /// Affected path
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

impl Warning {
    /// From an enumeration warning.
    #[must_use]
    pub fn from_scan(error: &ScanError) -> Self {
        Self {
            stage: "scan",
            path: error.path().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// From a hashing warning.
    #[must_use]
    pub fn from_hash(error: &HashError) -> Self {
        Self {
            stage: "hash",
            path: error.path().to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Enumeration warnings followed by hashing warnings.
///
/// Unverifiable pairs are reported separately and are not included.
#[must_use]
pub fn collect_warnings(report: &Report) -> Vec<Warning> {
    report
        .scan_warnings
        .iter()
        .map(Warning::from_scan)
        .chain(report.hash_warnings.iter().map(Warning::from_hash))
        .collect()
}
