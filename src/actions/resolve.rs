//! Resolution of confirmed duplicate pairs.
//!
//! # Overview
//!
//! For each confirmed [`DuplicatePair`] a [`DecisionSource`] chooses which
//! file to keep, and [`resolve`] deletes the other one. These guards make it
//! impossible to lose both copies:
//!
//! - the kept file must still exist at deletion time
//! - the kept file must not be the target itself under another name
//! - [`resolve_all`] never asks about a pair that touches a file already
//!   deleted earlier in the same session
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::actions::{resolve_all, DeleteConfig, Decision, FixedDecision};
//! use ccdupe::duplicates::DuplicatePair;
//!
//! let pairs: Vec<DuplicatePair> = Vec::new();
//! let mut source = FixedDecision(Decision::KeepFirst);
//!
//! let report = resolve_all(&pairs, &mut source, &DeleteConfig::trash());
//! println!("{}", report.summary());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::delete::{
    check_distinct, check_unchanged, delete_file, DeleteConfig, DeleteError, DeleteResult,
};
use crate::duplicates::DuplicatePair;

/// What to do with one duplicate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    /// Keep the first file, delete the second.
    KeepFirst,
    /// Keep the second file, delete the first.
    KeepSecond,
    /// Leave both files alone.
    Skip,
}

/// Anything that can decide the fate of a duplicate pair.
///
/// Closures work directly:
///
/// ```
/// use ccdupe::actions::{Decision, DecisionSource};
/// use ccdupe::duplicates::DuplicatePair;
/// use std::path::PathBuf;
///
/// let mut source = |_: &DuplicatePair| Decision::Skip;
/// let pair = DuplicatePair::new(1, PathBuf::from("/a"), PathBuf::from("/b"));
/// assert_eq!(source.decide(&pair), Decision::Skip);
/// ```
pub trait DecisionSource {
    /// Choose what to do with `pair`.
    fn decide(&mut self, pair: &DuplicatePair) -> Decision;
}

impl<F> DecisionSource for F
where
    F: FnMut(&DuplicatePair) -> Decision,
{
    fn decide(&mut self, pair: &DuplicatePair) -> Decision {
        self(pair)
    }
}

/// Gives the same answer for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub Decision);

impl DecisionSource for FixedDecision {
    fn decide(&mut self, _pair: &DuplicatePair) -> Decision {
        self.0
    }
}

/// Result of acting on one decision.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// Nothing was touched.
    Skipped,
    /// The non-kept file was deleted.
    Deleted(DeleteResult),
    /// Deletion was refused or failed; both files are as they were.
    Failed(DeleteError),
}

impl DeleteOutcome {
    /// Whether a file was removed.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// Apply `decision` to `pair`.
///
/// `Skip` performs no filesystem access at all. Otherwise the kept file
/// must still exist and the target must still have the verified size, or
/// the deletion is refused.
#[must_use]
pub fn resolve(pair: &DuplicatePair, decision: Decision, config: &DeleteConfig) -> DeleteOutcome {
    let (target, kept) = match decision {
        Decision::Skip => {
            log::debug!(
                "Skipping pair {} / {}",
                pair.first.display(),
                pair.second.display()
            );
            return DeleteOutcome::Skipped;
        }
        Decision::KeepFirst => (&pair.second, &pair.first),
        Decision::KeepSecond => (&pair.first, &pair.second),
    };

    if !kept.is_file() {
        log::warn!(
            "Kept copy {} is missing, not deleting {}",
            kept.display(),
            target.display()
        );
        return DeleteOutcome::Failed(DeleteError::KeptCopyMissing {
            target: target.clone(),
            kept: kept.clone(),
        });
    }

    if let Err(e) = check_distinct(target, kept) {
        log::warn!("Not deleting {}: {}", target.display(), e);
        return DeleteOutcome::Failed(e);
    }

    if let Err(e) = check_unchanged(target, pair.size) {
        log::warn!("Not deleting {}: {}", target.display(), e);
        return DeleteOutcome::Failed(e);
    }

    match delete_file(target, config) {
        Ok(result) => DeleteOutcome::Deleted(result),
        Err(e) => {
            log::warn!("Failed to delete {}: {}", target.display(), e);
            DeleteOutcome::Failed(e)
        }
    }
}

/// What happened to one pair during [`resolve_all`].
#[derive(Debug)]
pub enum PairOutcome {
    /// One of the files was already deleted earlier in the session; the
    /// source was not asked.
    AlreadyResolved,
    /// The source decided and the decision was applied.
    Resolved {
        /// The decision given
        decision: Decision,
        /// What applying it did
        outcome: DeleteOutcome,
    },
}

/// Outcome of resolving a list of pairs.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// One entry per input pair, in input order
    pub outcomes: Vec<(DuplicatePair, PairOutcome)>,
}

impl ResolutionReport {
    /// Successful deletions.
    pub fn deleted(&self) -> impl Iterator<Item = &DeleteResult> + '_ {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            PairOutcome::Resolved {
                outcome: DeleteOutcome::Deleted(r),
                ..
            } => Some(r),
            _ => None,
        })
    }

    /// Failed or refused deletions.
    pub fn failed(&self) -> impl Iterator<Item = &DeleteError> + '_ {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            PairOutcome::Resolved {
                outcome: DeleteOutcome::Failed(e),
                ..
            } => Some(e),
            _ => None,
        })
    }

    /// Pairs the source chose to skip.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    PairOutcome::Resolved {
                        outcome: DeleteOutcome::Skipped,
                        ..
                    }
                )
            })
            .count()
    }

    /// Pairs not asked about because a member was already deleted.
    #[must_use]
    pub fn already_resolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PairOutcome::AlreadyResolved))
            .count()
    }

    /// Total bytes removed.
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.deleted().map(|r| r.size).sum()
    }

    /// Human-readable summary of the session.
    #[must_use]
    pub fn summary(&self) -> String {
        let deleted = self.deleted().count();
        let failed = self.failed().count();
        if failed == 0 {
            format!(
                "Deleted {} file(s), skipped {}, freed {} bytes",
                deleted,
                self.skipped_count() + self.already_resolved_count(),
                self.bytes_freed()
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, skipped {}, freed {} bytes",
                deleted,
                failed,
                self.skipped_count() + self.already_resolved_count(),
                self.bytes_freed()
            )
        }
    }
}

/// Resolve pairs one at a time, in order.
///
/// The source is asked once per pair, except for pairs touching a file
/// deleted earlier in this call, which are recorded as
/// [`PairOutcome::AlreadyResolved`]. A failure never stops the loop.
pub fn resolve_all<S: DecisionSource + ?Sized>(
    pairs: &[DuplicatePair],
    source: &mut S,
    config: &DeleteConfig,
) -> ResolutionReport {
    let mut deleted: HashSet<PathBuf> = HashSet::new();
    let mut report = ResolutionReport::default();

    for pair in pairs {
        let touched = |p: &Path| deleted.contains(p);
        if touched(pair.first.as_path()) || touched(pair.second.as_path()) {
            log::debug!(
                "Pair {} / {} already resolved",
                pair.first.display(),
                pair.second.display()
            );
            report
                .outcomes
                .push((pair.clone(), PairOutcome::AlreadyResolved));
            continue;
        }

        let decision = source.decide(pair);
        let outcome = resolve(pair, decision, config);
        if let DeleteOutcome::Deleted(ref result) = outcome {
            deleted.insert(result.path.clone());
        }
        report
            .outcomes
            .push((pair.clone(), PairOutcome::Resolved { decision, outcome }));
    }

    log::info!("Resolution complete: {}", report.summary());
    report
}
