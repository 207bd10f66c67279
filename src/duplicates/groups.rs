//! Size grouping and the hand-off types between pipeline stages.
//!
//! # Overview
//!
//! Size grouping is the first filter of duplicate detection. Files are
//! partitioned by their exact size, since files with different sizes cannot
//! be duplicates. Only groups holding two or more files (the *candidate
//! sets*) are passed on to hashing.
//!
//! Later stages produce [`HashGroup`]s (files sharing size and digest) and
//! [`DuplicatePair`]s (two files confirmed byte-identical).
//!
//! # Example
//!
//! ```
//! use ccdupe::scanner::FileEntry;
//! use ccdupe::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! // Only groups with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::hash::{Hash as StdHash, Hasher as StdHasher};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in traversal order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create a new, empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileEntry>) -> Self {
        Self { size, files }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group is a candidate set (2+ files).
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        self.files.len() > 1
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Incremental size grouper.
///
/// Files are pushed one at a time as the walker yields them. A file can only
/// ever land in the group matching its size.
#[derive(Debug, Default)]
pub struct SizeGrouper {
    groups: HashMap<u64, SizeGroup>,
    total_files: usize,
    total_size: u64,
    empty_files: usize,
}

impl SizeGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file record.
    pub fn push(&mut self, file: FileEntry) {
        self.total_files += 1;
        self.total_size += file.size;
        if file.size == 0 {
            self.empty_files += 1;
        }
        log::trace!("Grouping {} ({} bytes)", file.path.display(), file.size);

        self.groups
            .entry(file.size)
            .or_insert_with(|| SizeGroup::new(file.size))
            .add(file);
    }

    /// Number of files pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_files
    }

    /// Check if no files have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Borrow the groups holding two or more files.
    pub fn candidate_sets(&self) -> impl Iterator<Item = &SizeGroup> + '_ {
        self.groups.values().filter(|g| g.is_candidate())
    }

    /// Statistics for the files pushed so far.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.groups.len(),
            empty_files: self.empty_files,
            ..GroupingStats::default()
        };
        for group in self.groups.values() {
            if group.is_candidate() {
                stats.potential_duplicates += group.len();
                stats.duplicate_groups += 1;
            } else {
                stats.eliminated_unique += group.len();
            }
        }
        stats
    }

    /// Consume the grouper, keeping only candidate sets.
    ///
    /// Groups are ordered by size, largest first.
    #[must_use]
    pub fn into_candidates(self) -> (Vec<SizeGroup>, GroupingStats) {
        let stats = self.stats();

        let mut candidates: Vec<SizeGroup> = self
            .groups
            .into_values()
            .filter(|group| {
                if group.is_candidate() {
                    log::debug!(
                        "Size group {} bytes: {} potential duplicates",
                        group.size,
                        group.len()
                    );
                    true
                } else {
                    log::trace!("Eliminated unique size {}", group.size);
                    false
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.size.cmp(&a.size));

        log::info!(
            "Size grouping complete: {} files -> {} potential duplicates ({:.1}% eliminated)",
            stats.total_files,
            stats.potential_duplicates,
            stats.elimination_rate()
        );

        (candidates, stats)
    }
}

/// Group files by size in one batch.
///
/// Returns only the candidate sets, largest size first, plus statistics.
/// No file I/O is performed.
///
/// # Example
///
/// ```
/// use ccdupe::scanner::FileEntry;
/// use ccdupe::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut grouper = SizeGrouper::new();
    for file in files {
        grouper.push(file);
    }
    grouper.into_candidates()
}

/// Files sharing both size and content digest.
///
/// Singleton groups are kept so callers can report files whose digest
/// matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashGroup {
    /// File size in bytes
    pub size: u64,
    /// BLAKE3 digest of the content
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// Member paths
    pub paths: Vec<PathBuf>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl HashGroup {
    /// Create a new hash group.
    #[must_use]
    pub fn new(size: u64, hash: Hash, paths: Vec<PathBuf>) -> Self {
        Self { size, hash, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check if this group needs byte verification (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.paths.len() > 1
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Every unordered pair of members, C(n,2) in total.
    #[must_use]
    pub fn pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        let n = self.paths.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for (i, first) in self.paths.iter().enumerate() {
            for second in &self.paths[i + 1..] {
                pairs.push((first.clone(), second.clone()));
            }
        }
        pairs
    }
}

/// Two files verified byte-identical.
///
/// The pair is unordered: `(a, b)` and `(b, a)` compare and hash equal.
/// `first`/`second` only fix the labels used when asking for a decision.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    /// Size of both files in bytes
    pub size: u64,
    /// First file
    pub first: PathBuf,
    /// Second file
    pub second: PathBuf,
}

impl DuplicatePair {
    /// Create a new pair.
    #[must_use]
    pub fn new(size: u64, first: PathBuf, second: PathBuf) -> Self {
        Self {
            size,
            first,
            second,
        }
    }

    /// Check if `path` is one of the two files.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.first == path || self.second == path
    }

    /// The two paths in a canonical order.
    fn ordered(&self) -> (&Path, &Path) {
        if self.first <= self.second {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        }
    }
}

impl PartialEq for DuplicatePair {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.ordered() == other.ordered()
    }
}

impl Eq for DuplicatePair {}

impl StdHash for DuplicatePair {
    fn hash<H: StdHasher>(&self, state: &mut H) {
        self.size.hash(state);
        self.ordered().hash(state);
    }
}
