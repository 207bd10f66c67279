//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "hash_groups": [
//!     { "hash": "abc123...", "size": 10, "files": ["/t/a", "/t/b"] }
//!   ],
//!   "duplicates": [
//!     { "size": 10, "first": "/t/a", "second": "/t/b" }
//!   ],
//!   "distinct": [],
//!   "unverifiable": [],
//!   "warnings": [
//!     { "stage": "hash", "path": "/t/locked", "message": "Permission denied: /t/locked" }
//!   ],
//!   "summary": {
//!     "total_files": 4,
//!     "duplicate_pairs": 1,
//!     "reclaimable_space": 10,
//!     "scan_duration_ms": 3,
//!     "exit_code": 3,
//!     "exit_code_name": "CD003"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::DuplicateFinder;
//! use ccdupe::error::ExitCode;
//! use ccdupe::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (report, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&report, &summary, ExitCode::for_report(&report));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::{collect_warnings, Warning};
use crate::actions::ResolutionReport;
use crate::duplicates::{Enumeration, HashGroup, Report, ScanSummary};
use crate::error::ExitCode;

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A hash group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonHashGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Member paths
    pub files: Vec<String>,
}

impl JsonHashGroup {
    /// Convert a [`HashGroup`].
    #[must_use]
    pub fn from_hash_group(group: &HashGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            files: group.paths.iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// A confirmed duplicate pair.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPair {
    /// Size of each file in bytes
    pub size: u64,
    /// First path
    pub first: String,
    /// Second path
    pub second: String,
}

/// Two paths with matching digests but different content.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPathPair {
    /// First path
    pub first: String,
    /// Second path
    pub second: String,
}

/// A pair that could not be compared.
#[derive(Debug, Clone, Serialize)]
pub struct JsonUnverifiable {
    /// First path
    pub first: String,
    /// Second path
    pub second: String,
    /// Why the comparison failed
    pub error: String,
}

/// A per-file warning from enumeration or hashing.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// `"scan"` or `"hash"`
    pub stage: &'static str,
    /// Affected path
    pub path: String,
    /// Error message
    pub message: String,
}

impl From<Warning> for JsonWarning {
    fn from(warning: Warning) -> Self {
        Self {
            stage: warning.stage,
            path: path_string(&warning.path),
            message: warning.message,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Files skipped because their size was unique
    pub eliminated_by_size: usize,
    /// Files whose digest was computed
    pub hashed_files: usize,
    /// Hashed files whose digest matched nothing
    pub eliminated_by_hash: usize,
    /// Confirmed duplicate pairs
    pub duplicate_pairs: usize,
    /// Digest matches with differing content
    pub distinct_pairs: usize,
    /// Pairs that could not be compared
    pub unverifiable_pairs: usize,
    /// Non-fatal problems, unverifiable pairs included
    pub warnings: usize,
    /// Bytes freed by keeping one copy of each duplicate set
    pub reclaimable_space: u64,
    /// Duration of hashing and verification in milliseconds
    pub scan_duration_ms: u64,
    /// Process exit code for this run
    pub exit_code: i32,
    /// Machine-readable exit code name
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from a [`ScanSummary`] and the run's exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            eliminated_by_hash: summary.eliminated_by_hash,
            duplicate_pairs: summary.duplicate_pairs,
            distinct_pairs: summary.distinct_pairs,
            unverifiable_pairs: summary.unverifiable_pairs,
            warnings: summary.warnings,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A deleted file.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeleted {
    /// Deleted path
    pub path: String,
    /// Bytes freed
    pub size: u64,
    /// Removed permanently rather than moved to trash
    pub permanent: bool,
}

/// Outcome of an interactive resolution session.
#[derive(Debug, Clone, Serialize)]
pub struct JsonResolution {
    /// Files deleted
    pub deleted: Vec<JsonDeleted>,
    /// Refused or failed deletions
    pub failed: Vec<JsonWarning>,
    /// Pairs skipped by decision
    pub skipped: usize,
    /// Pairs not asked about because a member was already deleted
    pub already_resolved: usize,
    /// Total bytes freed
    pub bytes_freed: u64,
}

impl JsonResolution {
    /// Convert a [`ResolutionReport`].
    #[must_use]
    pub fn from_report(report: &ResolutionReport) -> Self {
        Self {
            deleted: report
                .deleted()
                .map(|r| JsonDeleted {
                    path: path_string(&r.path),
                    size: r.size,
                    permanent: r.permanent,
                })
                .collect(),
            failed: report
                .failed()
                .map(|e| JsonWarning {
                    stage: "delete",
                    path: path_string(e.path()),
                    message: e.to_string(),
                })
                .collect(),
            skipped: report.skipped_count(),
            already_resolved: report.already_resolved_count(),
            bytes_freed: report.bytes_freed(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Every hash group, singletons included
    pub hash_groups: Vec<JsonHashGroup>,
    /// Confirmed duplicate pairs
    pub duplicates: Vec<JsonPair>,
    /// Digest matches with differing content
    pub distinct: Vec<JsonPathPair>,
    /// Pairs that could not be compared
    pub unverifiable: Vec<JsonUnverifiable>,
    /// Enumeration and hashing warnings
    pub warnings: Vec<JsonWarning>,
    /// Interactive resolution outcome, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<JsonResolution>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a report, its summary and the exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use ccdupe::duplicates::{Report, ScanSummary};
    /// use ccdupe::error::ExitCode;
    /// use ccdupe::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&Report::default(), &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(report: &Report, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            hash_groups: report
                .hash_groups
                .iter()
                .map(JsonHashGroup::from_hash_group)
                .collect(),
            duplicates: report
                .confirmed
                .iter()
                .map(|p| JsonPair {
                    size: p.size,
                    first: path_string(&p.first),
                    second: path_string(&p.second),
                })
                .collect(),
            distinct: report
                .distinct
                .iter()
                .map(|(a, b)| JsonPathPair {
                    first: path_string(a),
                    second: path_string(b),
                })
                .collect(),
            unverifiable: report
                .unverifiable
                .iter()
                .map(|w| JsonUnverifiable {
                    first: path_string(&w.first),
                    second: path_string(&w.second),
                    error: w.error.to_string(),
                })
                .collect(),
            warnings: collect_warnings(report)
                .into_iter()
                .map(JsonWarning::from)
                .collect(),
            resolution: None,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Attach the outcome of an interactive session.
    #[must_use]
    pub fn with_resolution(mut self, resolution: &ResolutionReport) -> Self {
        self.resolution = Some(JsonResolution::from_report(resolution));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

/// A listed file.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// `--list-files` output.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileList {
    /// Every enumerated file
    pub files: Vec<JsonFile>,
    /// Entries that could not be inspected
    pub warnings: Vec<JsonWarning>,
    /// Number of files
    pub total_files: usize,
    /// Sum of file sizes in bytes
    pub total_size: u64,
}

impl JsonFileList {
    /// Build from an enumeration.
    #[must_use]
    pub fn new(enumeration: &Enumeration) -> Self {
        Self {
            files: enumeration
                .files
                .iter()
                .map(|f| JsonFile {
                    path: path_string(&f.path),
                    size: f.size,
                })
                .collect(),
            warnings: enumeration
                .warnings
                .iter()
                .map(|e| JsonWarning::from(Warning::from_scan(e)))
                .collect(),
            total_files: enumeration.files.len(),
            total_size: enumeration.files.iter().map(|f| f.size).sum(),
        }
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

fn write_json<T: Serialize, W: Write>(
    value: &T,
    writer: &mut W,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
