//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Content hashing and digest grouping
//! - Byte-exact verification of digest matches

pub mod finder;
pub mod groups;
pub mod verify;

pub use finder::{
    hash_and_group, DuplicateFinder, Enumeration, FinderConfig, FinderError, HashConfig,
    HashOutcome, HashStats, Report, ScanOutcome, ScanSummary,
};
pub use groups::{
    group_by_size, DuplicatePair, GroupingStats, HashGroup, SizeGroup, SizeGrouper,
};
pub use verify::{
    compare_files, compare_readers, verify_groups, CompareError, PairWarning, VerifyConfig,
    VerifyOutcome, VerifyStats,
};
