//! Human-readable text output.
//!
//! ```text
//! Hash groups:
//!   3f1c...e0 (10 B, 2 files)
//!     /t/a
//!     /t/b
//!
//! Duplicates:
//!   /t/a
//!   /t/b  (10 B)
//!
//! Summary:
//!   Files scanned:      4 (35 B)
//!   Duplicate pairs:    1
//!   Reclaimable space:  10 B (28.6%)
//! ```

use std::fmt::Display;
use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Paint, Style};

use super::{collect_warnings, Warning};
use crate::actions::ResolutionReport;
use crate::duplicates::{Enumeration, Report, ScanSummary};

const HEADING: Style = Style::new().bold();
const DIGEST: Style = Style::new().cyan();
const MATCH: Style = Style::new().green();
const CAUTION: Style = Style::new().yellow();
const FAILURE: Style = Style::new().red();
const MUTED: Style = Style::new().dim();

/// Text formatter.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    /// Create a formatter. With `color` off, no escape codes are written.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn styled(&self, value: impl Display, style: Style) -> String {
        if self.color {
            value.paint(style).to_string()
        } else {
            value.to_string()
        }
    }

    /// Write the full report: hash groups, pairs, warnings and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(
        &self,
        out: &mut W,
        report: &Report,
        summary: &ScanSummary,
    ) -> io::Result<()> {
        if !report.hash_groups.is_empty() {
            writeln!(out, "{}", self.styled("Hash groups:", HEADING))?;
            for group in &report.hash_groups {
                let noun = if group.len() == 1 { "file" } else { "files" };
                writeln!(
                    out,
                    "  {} ({}, {} {})",
                    self.styled(group.hash_hex(), DIGEST),
                    ByteSize::b(group.size),
                    group.len(),
                    noun
                )?;
                for path in &group.paths {
                    writeln!(out, "    {}", path.display())?;
                }
            }
            writeln!(out)?;
        }

        if report.confirmed.is_empty() {
            writeln!(out, "{}", self.styled("No duplicate files found.", MUTED))?;
        } else {
            writeln!(out, "{}", self.styled("Duplicates:", HEADING))?;
            for pair in &report.confirmed {
                writeln!(out, "  {}", self.styled(pair.first.display(), MATCH))?;
                writeln!(
                    out,
                    "  {}  ({})",
                    self.styled(pair.second.display(), MATCH),
                    ByteSize::b(pair.size)
                )?;
            }
        }
        writeln!(out)?;

        if !report.distinct.is_empty() {
            writeln!(
                out,
                "{}",
                self.styled("Same digest, different content:", HEADING)
            )?;
            for (first, second) in &report.distinct {
                writeln!(out, "  {} / {}", first.display(), second.display())?;
            }
            writeln!(out)?;
        }

        if !report.unverifiable.is_empty() {
            writeln!(out, "{}", self.styled("Unverifiable pairs:", HEADING))?;
            for warning in &report.unverifiable {
                writeln!(out, "  {}", self.styled(warning, CAUTION))?;
            }
            writeln!(out)?;
        }

        self.write_warnings(out, &collect_warnings(report))?;
        self.write_summary(out, summary)
    }

    fn write_warnings<W: Write>(&self, out: &mut W, warnings: &[Warning]) -> io::Result<()> {
        if warnings.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.styled("Warnings:", HEADING))?;
        for warning in warnings {
            writeln!(
                out,
                "  [{}] {}",
                warning.stage,
                self.styled(&warning.message, CAUTION)
            )?;
        }
        writeln!(out)
    }

    /// Write the summary block.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_summary<W: Write>(&self, out: &mut W, summary: &ScanSummary) -> io::Result<()> {
        writeln!(out, "{}", self.styled("Summary:", HEADING))?;
        writeln!(
            out,
            "  Files scanned:      {} ({})",
            summary.total_files,
            summary.total_size_display()
        )?;
        writeln!(
            out,
            "  Unique by size:     {}",
            summary.eliminated_by_size
        )?;
        writeln!(out, "  Files hashed:       {}", summary.hashed_files)?;
        writeln!(out, "  Duplicate pairs:    {}", summary.duplicate_pairs)?;
        if summary.unverifiable_pairs > 0 {
            writeln!(
                out,
                "  Unverifiable pairs: {}",
                self.styled(summary.unverifiable_pairs, CAUTION)
            )?;
        }
        writeln!(
            out,
            "  Reclaimable space:  {} ({:.1}%)",
            self.styled(summary.reclaimable_display(), MATCH),
            summary.wasted_percentage()
        )?;
        if summary.warnings > 0 {
            writeln!(
                out,
                "  Warnings:           {}",
                self.styled(summary.warnings, CAUTION)
            )?;
        }
        writeln!(out, "  Duration:           {:.2?}", summary.scan_duration)
    }

    /// Write every enumerated file, one per line, then the total.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_file_list<W: Write>(&self, out: &mut W, enumeration: &Enumeration) -> io::Result<()> {
        for file in &enumeration.files {
            writeln!(
                out,
                "{:>10}  {}",
                ByteSize::b(file.size).to_string(),
                file.path.display()
            )?;
        }

        let warnings: Vec<Warning> = enumeration.warnings.iter().map(Warning::from_scan).collect();
        if !warnings.is_empty() {
            writeln!(out)?;
            self.write_warnings(out, &warnings)?;
        }

        let total: u64 = enumeration.files.iter().map(|f| f.size).sum();
        writeln!(
            out,
            "{} files, {}",
            enumeration.files.len(),
            ByteSize::b(total)
        )
    }

    /// Write the outcome of an interactive session.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_resolution<W: Write>(
        &self,
        out: &mut W,
        resolution: &ResolutionReport,
    ) -> io::Result<()> {
        writeln!(out)?;
        for result in resolution.deleted() {
            let how = if result.permanent { "Deleted" } else { "Trashed" };
            writeln!(out, "  {} {}", how, result.path.display())?;
        }
        for error in resolution.failed() {
            writeln!(out, "  {}", self.styled(error, FAILURE))?;
        }
        writeln!(out, "{}", self.styled(resolution.summary(), HEADING))
    }
}
