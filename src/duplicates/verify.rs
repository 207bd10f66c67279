//! Byte-exact verification of digest matches.
//!
//! # Overview
//!
//! A shared digest makes two files very likely identical; this module makes it
//! certain. Every pair inside a [`HashGroup`] is compared chunk by chunk in
//! lock-step, stopping at the first differing chunk. Each pair ends up in
//! exactly one bucket of the [`VerifyOutcome`]:
//!
//! - `confirmed`: contents are identical
//! - `distinct`: contents differ despite the digest match
//! - `unverifiable`: one of the files could not be read
//!
//! Pairs are compared in parallel on a bounded pool; the two files of a
//! single pair are always read sequentially.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use super::finder::run_on_io_pool;
use super::{DuplicatePair, HashGroup};
use crate::progress::ProgressCallback;
use crate::scanner::DEFAULT_CHUNK_SIZE;

/// Errors that can occur while comparing two files.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path of the file that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The comparison was aborted by a shutdown request.
    #[error("Comparison interrupted")]
    Interrupted,
}

impl CompareError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A digest-matched pair whose contents could not be compared.
#[derive(thiserror::Error, Debug)]
#[error("Could not verify {} and {}: {error}", .first.display(), .second.display())]
pub struct PairWarning {
    /// First file of the pair
    pub first: PathBuf,
    /// Second file of the pair
    pub second: PathBuf,
    /// What went wrong
    #[source]
    pub error: CompareError,
}

impl Serialize for PairWarning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PairWarning", 3)?;
        state.serialize_field("first", &self.first)?;
        state.serialize_field("second", &self.second)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// Read into `buf` until it is full or the reader reaches end of stream.
///
/// Returns the number of bytes read; less than `buf.len()` only at EOF.
fn fill_buffer<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Compare two readers chunk by chunk.
///
/// Errors are attributed to `first_path`/`second_path`. Returns `Ok(true)`
/// only if both streams end at the same time with no differing chunk.
///
/// # Errors
///
/// Returns [`CompareError`] if either read fails or shutdown is requested.
pub fn compare_readers<A: Read, B: Read>(
    first_path: &Path,
    mut first: A,
    second_path: &Path,
    mut second: B,
    chunk_size: usize,
    shutdown_flag: Option<&AtomicBool>,
) -> Result<bool, CompareError> {
    let chunk_size = chunk_size.max(1);
    let mut first_buf = vec![0u8; chunk_size];
    let mut second_buf = vec![0u8; chunk_size];

    loop {
        if shutdown_flag.is_some_and(|f| f.load(Ordering::SeqCst)) {
            return Err(CompareError::Interrupted);
        }

        let first_len =
            fill_buffer(&mut first, &mut first_buf).map_err(|e| CompareError::io(first_path, e))?;
        let second_len = fill_buffer(&mut second, &mut second_buf)
            .map_err(|e| CompareError::io(second_path, e))?;

        if first_len != second_len {
            return Ok(false);
        }
        if first_len == 0 {
            return Ok(true);
        }
        if first_buf[..first_len] != second_buf[..second_len] {
            return Ok(false);
        }
    }
}

/// Compare two files byte for byte.
///
/// # Errors
///
/// Returns [`CompareError`] if either file cannot be opened or read, or if
/// shutdown is requested mid-comparison.
///
/// # Example
///
/// ```no_run
/// use ccdupe::duplicates::compare_files;
/// use std::path::Path;
///
/// let same = compare_files(Path::new("a.bin"), Path::new("b.bin"), 4096, None).unwrap();
/// println!("identical: {}", same);
/// ```
pub fn compare_files(
    first: &Path,
    second: &Path,
    chunk_size: usize,
    shutdown_flag: Option<&AtomicBool>,
) -> Result<bool, CompareError> {
    let first_file = File::open(first).map_err(|e| CompareError::io(first, e))?;
    let second_file = File::open(second).map_err(|e| CompareError::io(second, e))?;
    compare_readers(
        first,
        first_file,
        second,
        second_file,
        chunk_size,
        shutdown_flag,
    )
}

/// Configuration for the verification phase.
#[derive(Clone)]
pub struct VerifyConfig {
    /// Number of I/O threads for parallel pair comparison.
    pub io_threads: usize,
    /// Bytes read from each file per step.
    pub chunk_size: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
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

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl VerifyConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the comparison chunk size (at least 1).
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
}

/// Statistics from the verification phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyStats {
    /// Hash groups with 2+ members that were examined
    pub input_groups: usize,
    /// Pairs enumerated across all groups
    pub total_pairs: usize,
    /// Pairs confirmed identical
    pub confirmed: usize,
    /// Pairs found to differ
    pub distinct: usize,
    /// Pairs that could not be compared
    pub unverifiable: usize,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Result of verifying a set of hash groups.
#[derive(Debug, Default, Serialize)]
pub struct VerifyOutcome {
    /// Pairs confirmed byte-identical
    pub confirmed: Vec<DuplicatePair>,
    /// Pairs whose digests matched but whose contents differ
    pub distinct: Vec<(PathBuf, PathBuf)>,
    /// Pairs that could not be compared
    pub unverifiable: Vec<PairWarning>,
    /// Phase statistics
    pub stats: VerifyStats,
}

enum PairResult {
    Same(DuplicatePair),
    Different(PathBuf, PathBuf),
    Failed(PairWarning),
    Skipped,
}

/// Verify every pair inside each hash group.
///
/// Singleton groups are ignored. Pairs left unfinished by a shutdown are
/// dropped and `stats.interrupted` is set; they are never reported as
/// duplicates.
#[must_use]
pub fn verify_groups(hash_groups: &[HashGroup], config: &VerifyConfig) -> VerifyOutcome {
    let candidates: Vec<&HashGroup> = hash_groups.iter().filter(|g| g.has_duplicates()).collect();

    let pairs: Vec<(u64, PathBuf, PathBuf)> = candidates
        .iter()
        .flat_map(|group| {
            group
                .pairs()
                .into_iter()
                .map(move |(first, second)| (group.size, first, second))
        })
        .collect();

    let mut outcome = VerifyOutcome {
        stats: VerifyStats {
            input_groups: candidates.len(),
            total_pairs: pairs.len(),
            ..VerifyStats::default()
        },
        ..VerifyOutcome::default()
    };

    if pairs.is_empty() {
        log::debug!("Verify: No pairs to compare");
        return outcome;
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("verifying", pairs.len());
    }

    log::info!(
        "Verifying {} pairs across {} hash groups",
        pairs.len(),
        candidates.len()
    );

    let shutdown = config.shutdown_flag.as_deref();
    let results: Vec<PairResult> = run_on_io_pool(config.io_threads, || {
        pairs
            .into_par_iter()
            .enumerate()
            .map(|(idx, (size, first, second))| {
                if config.is_shutdown_requested() {
                    return PairResult::Skipped;
                }

                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, first.to_string_lossy().as_ref());
                }

                let result = match compare_files(&first, &second, config.chunk_size, shutdown) {
                    Ok(true) => {
                        log::trace!(
                            "Confirmed identical: {} == {}",
                            first.display(),
                            second.display()
                        );
                        PairResult::Same(DuplicatePair::new(size, first, second))
                    }
                    Ok(false) => {
                        log::debug!(
                            "Digest match but contents differ: {} != {}",
                            first.display(),
                            second.display()
                        );
                        PairResult::Different(first, second)
                    }
                    Err(CompareError::Interrupted) => PairResult::Skipped,
                    Err(error) => {
                        let warning = PairWarning {
                            first,
                            second,
                            error,
                        };
                        log::warn!("{}", warning);
                        PairResult::Failed(warning)
                    }
                };

                if let Some(ref callback) = config.progress_callback {
                    callback.on_item_completed(size);
                }
                result
            })
            .collect()
    });

    for result in results {
        match result {
            PairResult::Same(pair) => outcome.confirmed.push(pair),
            PairResult::Different(first, second) => outcome.distinct.push((first, second)),
            PairResult::Failed(warning) => outcome.unverifiable.push(warning),
            PairResult::Skipped => outcome.stats.interrupted = true,
        }
    }

    outcome.stats.confirmed = outcome.confirmed.len();
    outcome.stats.distinct = outcome.distinct.len();
    outcome.stats.unverifiable = outcome.unverifiable.len();

    if outcome.stats.interrupted {
        log::info!("Verify: Interrupted by shutdown signal");
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("verifying");
    }

    log::info!(
        "Verify complete: {} confirmed, {} distinct, {} unverifiable",
        outcome.stats.confirmed,
        outcome.stats.distinct,
        outcome.stats.unverifiable
    );

    outcome
}
