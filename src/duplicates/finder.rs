//! Duplicate finder implementation with staged detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Scan**: walk the tree and group files by size (see [`crate::duplicates::groups`])
//! 2. **Hash**: digest every candidate and split size groups by digest
//! 3. **Verify**: compare digest matches byte for byte (see [`crate::duplicates::verify`])
//!
//! Each stage can be run on its own through [`DuplicateFinder`], or all three
//! at once with [`DuplicateFinder::find_duplicates`].
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//!
//! let scan = finder.scan(Path::new(".")).unwrap();
//! let hashed = finder.hash_and_group(scan.candidates);
//! let verified = finder.verify(&hashed.groups);
//!
//! println!("{} confirmed pairs", verified.confirmed.len());
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::verify::{verify_groups, PairWarning, VerifyConfig, VerifyOutcome};
use super::{DuplicatePair, GroupingStats, HashGroup, SizeGroup, SizeGrouper};
use crate::progress::ProgressCallback;
use crate::scanner::{
    FileEntry, Hash, HashError, Hasher, ScanError, Walker, WalkerConfig, DEFAULT_CHUNK_SIZE,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Run `op` on a dedicated pool of `threads` workers.
///
/// Falls back to the global rayon pool if the dedicated pool cannot be built.
pub(crate) fn run_on_io_pool<R, F>(threads: usize, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!(
                "Failed to create I/O thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            op()
        }
    }
}

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Bytes read per chunk.
    pub chunk_size: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the read chunk size (at least 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn hasher(&self) -> Hasher {
        let hasher = Hasher::new().with_chunk_size(self.chunk_size);
        match self.shutdown_flag {
            Some(ref flag) => hasher.with_shutdown_flag(flag.clone()),
            None => hasher,
        }
    }
}

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct HashStats {
    /// Files that entered the phase
    pub input_files: usize,
    /// Digests successfully computed
    pub hashed_files: usize,
    /// Files that failed to hash
    pub failed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Hash groups produced, singletons included
    pub hash_groups: usize,
    /// Hash groups with 2+ members
    pub multi_member_groups: usize,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Result of hashing candidate size groups.
#[derive(Debug, Default)]
pub struct HashOutcome {
    /// Every (size, digest) group, singletons included, largest size first
    pub groups: Vec<HashGroup>,
    /// Per-file failures; those files are absent from `groups`
    pub warnings: Vec<HashError>,
    /// Phase statistics
    pub stats: HashStats,
}

/// Hash every candidate file and group by (size, digest).
///
/// Files are hashed in parallel on a pool of `io_threads` workers. A file
/// that fails to hash is left out of its group and reported in
/// [`HashOutcome::warnings`].
///
/// # Example
///
/// ```no_run
/// use ccdupe::duplicates::{group_by_size, hash_and_group, HashConfig};
/// use ccdupe::scanner::{Walker, WalkerConfig};
/// use std::path::Path;
///
/// let walker = Walker::new(Path::new("."), WalkerConfig::default());
/// let (candidates, _) = group_by_size(walker.walk().filter_map(Result::ok));
///
/// let outcome = hash_and_group(candidates, &HashConfig::default());
/// println!("{} files hashed", outcome.stats.hashed_files);
/// ```
#[must_use]
pub fn hash_and_group(candidates: Vec<SizeGroup>, config: &HashConfig) -> HashOutcome {
    let all_files: Vec<FileEntry> = candidates
        .into_iter()
        .filter(SizeGroup::is_candidate)
        .flat_map(|group| group.files)
        .collect();

    let mut outcome = HashOutcome {
        stats: HashStats {
            input_files: all_files.len(),
            ..HashStats::default()
        },
        ..HashOutcome::default()
    };

    if all_files.is_empty() {
        log::debug!("Hash: No files to process");
        return outcome;
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", all_files.len());
    }

    log::info!("Computing content hashes for {} files", all_files.len());

    let hasher = config.hasher();
    let results: Vec<(FileEntry, Result<Hash, HashError>)> =
        run_on_io_pool(config.io_threads, || {
            all_files
                .into_par_iter()
                .enumerate()
                .map(|(idx, file)| {
                    if config.is_shutdown_requested() {
                        let err = HashError::Interrupted(file.path.clone());
                        return (file, Err(err));
                    }

                    if file.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({} MB): {}",
                            file.size / (1024 * 1024),
                            file.path.display()
                        );
                    }

                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                    }

                    let result = hasher.full_hash(&file.path);
                    match result {
                        Ok(_) => {
                            log::trace!("Hash computed: {}", file.path.display());
                            if let Some(ref callback) = config.progress_callback {
                                callback.on_item_completed(file.size);
                            }
                        }
                        Err(ref e) if e.is_interrupted() => {}
                        Err(ref e) => log::warn!("Failed to hash {}: {}", file.path.display(), e),
                    }
                    (file, result)
                })
                .collect()
        });

    let mut by_digest: HashMap<(u64, Hash), Vec<PathBuf>> = HashMap::new();
    for (file, result) in results {
        match result {
            Ok(hash) => {
                outcome.stats.hashed_files += 1;
                outcome.stats.bytes_hashed += file.size;
                by_digest.entry((file.size, hash)).or_default().push(file.path);
            }
            Err(e) if e.is_interrupted() => outcome.stats.interrupted = true,
            Err(e) => {
                outcome.stats.failed_files += 1;
                outcome.warnings.push(e);
            }
        }
    }

    if outcome.stats.interrupted {
        log::info!("Hash: Interrupted by shutdown signal");
    }

    let mut groups: Vec<HashGroup> = by_digest
        .into_iter()
        .map(|((size, hash), paths)| {
            if paths.len() > 1 {
                log::debug!(
                    "Hash group {}: {} files, {} bytes each",
                    crate::scanner::hash_to_hex(&hash),
                    paths.len(),
                    size
                );
            }
            HashGroup::new(size, hash, paths)
        })
        .collect();
    groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.hash.cmp(&b.hash)));

    outcome.stats.hash_groups = groups.len();
    outcome.stats.multi_member_groups = groups.iter().filter(|g| g.has_duplicates()).count();
    outcome.groups = groups;

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    log::info!(
        "Hashing complete: {} files hashed, {} groups with matching digests, {} failures",
        outcome.stats.hashed_files,
        outcome.stats.multi_member_groups,
        outcome.stats.failed_files
    );

    outcome
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for hashing and verification.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Bytes read per chunk while hashing and comparing.
    pub chunk_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the chunk size (at least 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn hash_config(&self) -> HashConfig {
        HashConfig {
            io_threads: self.io_threads,
            chunk_size: self.chunk_size,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }

    fn verify_config(&self) -> VerifyConfig {
        VerifyConfig {
            io_threads: self.io_threads,
            chunk_size: self.chunk_size,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Errors that abort a duplicate search.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl FinderError {
    /// Whether this is an invalid-root error.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::NotADirectory(_))
    }
}

/// Files found by a walk, before grouping.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Every regular file that passed the walker filters
    pub files: Vec<FileEntry>,
    /// Entries that could not be inspected
    pub warnings: Vec<ScanError>,
}

/// Result of walking a tree and grouping by size.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Candidate sets (2+ files of equal size), largest size first
    pub candidates: Vec<SizeGroup>,
    /// Entries that could not be inspected
    pub warnings: Vec<ScanError>,
    /// Grouping statistics
    pub stats: GroupingStats,
}

/// Everything a full run found.
#[derive(Debug, Default)]
pub struct Report {
    /// Every hash group, singletons included
    pub hash_groups: Vec<HashGroup>,
    /// Pairs confirmed byte-identical
    pub confirmed: Vec<DuplicatePair>,
    /// Digest matches whose contents differ
    pub distinct: Vec<(PathBuf, PathBuf)>,
    /// Pairs that could not be compared
    pub unverifiable: Vec<PairWarning>,
    /// Enumeration warnings
    pub scan_warnings: Vec<ScanError>,
    /// Hashing warnings
    pub hash_warnings: Vec<HashError>,
}

impl Report {
    /// Whether any confirmed duplicate pair was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.confirmed.is_empty()
    }

    /// Whether any non-fatal problem was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.unverifiable.is_empty()
            || !self.scan_warnings.is_empty()
            || !self.hash_warnings.is_empty()
    }

    /// Bytes freed by keeping one copy of each confirmed duplicate set.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        let mut confirmed_paths: HashSet<&Path> = HashSet::new();
        for pair in &self.confirmed {
            confirmed_paths.insert(&pair.first);
            confirmed_paths.insert(&pair.second);
        }

        self.hash_groups
            .iter()
            .map(|group| {
                let members = group
                    .paths
                    .iter()
                    .filter(|p| confirmed_paths.contains(p.as_path()))
                    .count() as u64;
                group.size * members.saturating_sub(1)
            })
            .sum()
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Digests computed
    pub hashed_files: usize,
    /// Hashed files whose digest matched no other file
    pub eliminated_by_hash: usize,
    /// Pairs confirmed byte-identical
    pub duplicate_pairs: usize,
    /// Digest matches whose contents differ
    pub distinct_pairs: usize,
    /// Pairs that could not be compared
    pub unverifiable_pairs: usize,
    /// Non-fatal warnings across all stages
    pub warnings: usize,
    /// Space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Duplicate finder that orchestrates the staged detection pipeline.
///
/// # Example
///
/// ```no_run
/// use ccdupe::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (report, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate pairs", report.confirmed.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Check that `root` exists and is a directory.
    fn validate_root(root: &Path) -> Result<(), FinderError> {
        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    /// Walk `root`, handing each file to `on_file`. Returns the warnings.
    fn walk(
        &self,
        root: &Path,
        mut on_file: impl FnMut(FileEntry),
    ) -> Result<Vec<ScanError>, FinderError> {
        Self::validate_root(root)?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Walking {}", root.display());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut warnings = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => on_file(file),
                Err(e) => warnings.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        Ok(warnings)
    }

    /// Enumerate every file under `root` without grouping.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root is invalid or the walk is interrupted.
    pub fn enumerate(&self, root: &Path) -> Result<Enumeration, FinderError> {
        let mut files = Vec::new();
        let warnings = self.walk(root, |file| files.push(file))?;
        log::info!("Enumerated {} files", files.len());
        Ok(Enumeration { files, warnings })
    }

    /// Group an already collected enumeration by size.
    #[must_use]
    pub fn group(&self, enumeration: Enumeration) -> ScanOutcome {
        let mut grouper = SizeGrouper::new();
        for file in enumeration.files {
            grouper.push(file);
        }
        let (candidates, stats) = grouper.into_candidates();
        ScanOutcome {
            candidates,
            warnings: enumeration.warnings,
            stats,
        }
    }

    /// Walk `root` and group its files by size.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`]
    /// before any work if the root is invalid, and
    /// [`FinderError::Interrupted`] if shutdown is requested.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome, FinderError> {
        let mut grouper = SizeGrouper::new();
        let warnings = self.walk(root, |file| grouper.push(file))?;
        let (candidates, stats) = grouper.into_candidates();

        Ok(ScanOutcome {
            candidates,
            warnings,
            stats,
        })
    }

    /// Hash candidate size groups and split them by digest.
    #[must_use]
    pub fn hash_and_group(&self, candidates: Vec<SizeGroup>) -> HashOutcome {
        hash_and_group(candidates, &self.config.hash_config())
    }

    /// Compare every digest-matched pair byte for byte.
    #[must_use]
    pub fn verify(&self, hash_groups: &[HashGroup]) -> VerifyOutcome {
        verify_groups(hash_groups, &self.config.verify_config())
    }

    /// Run scan, hashing and verification end to end.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root is invalid or the run is
    /// interrupted. Per-file failures are recorded in the [`Report`] instead.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ccdupe::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((report, summary)) => {
    ///         println!("Found {} duplicate pairs", report.confirmed.len());
    ///         println!("Can reclaim {} bytes", summary.reclaimable_space);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(&self, root: &Path) -> Result<(Report, ScanSummary), FinderError> {
        let scan = self.scan(root)?;
        self.find_duplicates_in(scan)
    }

    /// Run hashing and verification on the result of a previous scan.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates_in(
        &self,
        scan: ScanOutcome,
    ) -> Result<(Report, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary {
            total_files: scan.stats.total_files,
            total_size: scan.stats.total_size,
            eliminated_by_size: scan.stats.eliminated_unique,
            ..ScanSummary::default()
        };

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        let hashed = self.hash_and_group(scan.candidates);
        if hashed.stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let verified = self.verify(&hashed.groups);
        if verified.stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let report = Report {
            hash_groups: hashed.groups,
            confirmed: verified.confirmed,
            distinct: verified.distinct,
            unverifiable: verified.unverifiable,
            scan_warnings: scan.warnings,
            hash_warnings: hashed.warnings,
        };

        summary.hashed_files = hashed.stats.hashed_files;
        summary.eliminated_by_hash = report
            .hash_groups
            .iter()
            .filter(|g| !g.has_duplicates())
            .map(HashGroup::len)
            .sum();
        summary.duplicate_pairs = report.confirmed.len();
        summary.distinct_pairs = report.distinct.len();
        summary.unverifiable_pairs = report.unverifiable.len();
        summary.warnings =
            report.scan_warnings.len() + report.hash_warnings.len() + report.unverifiable.len();
        summary.reclaimable_space = report.reclaimable_space();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate pairs, {} reclaimable, {} warnings",
            summary.duplicate_pairs,
            summary.reclaimable_display(),
            summary.warnings
        );

        Ok((report, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        FileEntry::new(path, content.len() as u64)
    }

    fn candidates(files: Vec<FileEntry>) -> Vec<SizeGroup> {
        super::super::group_by_size(files).0
    }

    #[test]
    fn test_run_on_io_pool_returns_value() {
        let sum: u32 = run_on_io_pool(2, || (1..=4u32).into_par_iter().sum());
        assert_eq!(sum, 10);
    }

    #[test]
    fn test_hash_config_builder() {
        let config = HashConfig::default().with_io_threads(0).with_chunk_size(0);
        assert_eq!(config.io_threads, 1);
        assert_eq!(config.chunk_size, 1);
        assert_eq!(HashConfig::default().io_threads, 4);
    }

    #[test]
    fn test_hash_and_group_empty_input() {
        let outcome = hash_and_group(Vec::new(), &HashConfig::default());

        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.stats, HashStats::default());
    }

    #[test]
    fn test_hash_and_group_splits_by_digest() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"aaaaaaaaaa");
        let b = create_test_file(&dir, "b", b"aaaaaaaaaa");
        let c = create_test_file(&dir, "c", b"bbbbbbbbbb");

        let outcome = hash_and_group(
            candidates(vec![a.clone(), b.clone(), c.clone()]),
            &HashConfig::default(),
        );

        assert_eq!(outcome.stats.input_files, 3);
        assert_eq!(outcome.stats.hashed_files, 3);
        assert_eq!(outcome.stats.bytes_hashed, 30);
        assert_eq!(outcome.groups.len(), 2);
        assert_eq!(outcome.stats.multi_member_groups, 1);

        let pair_group = outcome.groups.iter().find(|g| g.len() == 2).unwrap();
        let mut paths = pair_group.paths.clone();
        paths.sort();
        assert_eq!(paths, vec![a.path, b.path]);

        let single = outcome.groups.iter().find(|g| g.len() == 1).unwrap();
        assert_eq!(single.paths, vec![c.path]);
    }

    #[test]
    fn test_hash_and_group_key_includes_size() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"");
        let b = create_test_file(&dir, "b", b"");

        let outcome = hash_and_group(candidates(vec![a, b]), &HashConfig::default());

        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].size, 0);
        assert_eq!(outcome.groups[0].len(), 2);
    }

    #[test]
    fn test_hash_and_group_ignores_singleton_size_groups() {
        let outcome = hash_and_group(
            vec![SizeGroup::with_files(
                5,
                vec![FileEntry::new(PathBuf::from("/does/not/exist"), 5)],
            )],
            &HashConfig::default(),
        );

        assert_eq!(outcome.stats.input_files, 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_hash_and_group_missing_file_is_warning() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"aaaaaaaaaa");
        let b = create_test_file(&dir, "b", b"aaaaaaaaaa");
        let c = create_test_file(&dir, "c", b"aaaaaaaaaa");
        std::fs::remove_file(&c.path).unwrap();

        let outcome = hash_and_group(candidates(vec![a, b, c.clone()]), &HashConfig::default());

        assert_eq!(outcome.stats.hashed_files, 2);
        assert_eq!(outcome.stats.failed_files, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].path(), c.path.as_path());
        assert!(outcome.groups.iter().all(|g| !g.paths.contains(&c.path)));
    }

    #[test]
    fn test_hash_and_group_shutdown_flag() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"aaaaaaaaaa");
        let b = create_test_file(&dir, "b", b"aaaaaaaaaa");

        let config = HashConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
        let outcome = hash_and_group(candidates(vec![a, b]), &config);

        assert!(outcome.stats.interrupted);
        assert_eq!(outcome.stats.hashed_files, 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_finder_config_default() {
        let config = FinderConfig::default();
        assert_eq!(config.io_threads, 4);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.shutdown_flag.is_none());
    }

    #[test]
    fn test_finder_config_io_threads_min() {
        assert_eq!(FinderConfig::default().with_io_threads(0).io_threads, 1);
    }

    #[test]
    fn test_scan_summary_wasted_percentage() {
        let summary = ScanSummary {
            total_size: 1000,
            reclaimable_space: 250,
            ..Default::default()
        };
        assert!((summary.wasted_percentage() - 25.0).abs() < 0.01);
        assert_eq!(ScanSummary::default().wasted_percentage(), 0.0);
    }

    #[test]
    fn test_find_duplicates_path_not_found() {
        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(FinderError::PathNotFound(_))));
    }

    #[test]
    fn test_find_duplicates_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = create_test_file(&dir, "file.txt", b"content");

        let finder = DuplicateFinder::with_defaults();
        let err = finder.scan(&file.path).unwrap_err();

        assert!(matches!(err, FinderError::NotADirectory(_)));
        assert!(err.is_invalid_root());
    }

    #[test]
    fn test_find_duplicates_empty_directory() {
        let dir = TempDir::new().unwrap();
        let (report, summary) = DuplicateFinder::with_defaults()
            .find_duplicates(dir.path())
            .unwrap();

        assert!(!report.has_duplicates());
        assert!(!report.has_warnings());
        assert_eq!(summary.total_files, 0);
    }

    #[test]
    fn test_find_duplicates_with_duplicates() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "a.txt", b"aaaaaaaaaa");
        create_test_file(&dir, "b.txt", b"aaaaaaaaaa");
        create_test_file(&dir, "c.txt", b"bbbbbbbbbb");
        create_test_file(&dir, "d.txt", b"ddddd");

        let (report, summary) = DuplicateFinder::with_defaults()
            .find_duplicates(dir.path())
            .unwrap();

        assert_eq!(report.confirmed.len(), 1);
        assert!(report.confirmed[0].contains(&dir.path().join("a.txt")));
        assert!(report.confirmed[0].contains(&dir.path().join("b.txt")));
        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.eliminated_by_size, 1);
        assert_eq!(summary.hashed_files, 3);
        assert_eq!(summary.eliminated_by_hash, 1);
        assert_eq!(summary.duplicate_pairs, 1);
        assert_eq!(summary.reclaimable_space, 10);
    }

    #[test]
    fn test_find_duplicates_shutdown_flag() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "a.txt", b"content");

        let config = FinderConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
        let result = DuplicateFinder::new(config).find_duplicates(dir.path());

        assert!(matches!(result, Err(FinderError::Interrupted)));
    }

    #[test]
    fn test_enumerate_then_group_matches_scan() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "a.txt", b"aaaaaaaaaa");
        create_test_file(&dir, "b.txt", b"aaaaaaaaaa");
        create_test_file(&dir, "d.txt", b"ddddd");

        let finder = DuplicateFinder::with_defaults();
        let enumeration = finder.enumerate(dir.path()).unwrap();
        assert_eq!(enumeration.files.len(), 3);

        let grouped = finder.group(enumeration);
        let scanned = finder.scan(dir.path()).unwrap();
        assert_eq!(grouped.stats, scanned.stats);
        assert_eq!(grouped.candidates.len(), 1);
    }

    #[test]
    fn test_report_reclaimable_space() {
        let report = Report {
            hash_groups: vec![HashGroup::new(
                100,
                [0u8; 32],
                vec![
                    PathBuf::from("/a"),
                    PathBuf::from("/b"),
                    PathBuf::from("/c"),
                ],
            )],
            confirmed: vec![
                DuplicatePair::new(100, PathBuf::from("/a"), PathBuf::from("/b")),
                DuplicatePair::new(100, PathBuf::from("/a"), PathBuf::from("/c")),
                DuplicatePair::new(100, PathBuf::from("/b"), PathBuf::from("/c")),
            ],
            ..Report::default()
        };

        assert_eq!(report.reclaimable_space(), 200);
    }
}
