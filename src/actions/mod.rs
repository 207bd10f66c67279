//! File actions module.
//!
//! This module provides functionality for:
//! - Deciding what to do with each confirmed duplicate pair
//! - Safe deletion via the trash crate
//! - Permanent deletion (explicit opt-in)
//!
//! Nothing is deleted without a per-pair [`Decision`] from a
//! [`DecisionSource`]:
//!
//! ```no_run
//! use ccdupe::actions::{resolve, DeleteConfig, Decision};
//! use ccdupe::duplicates::DuplicatePair;
//! use std::path::PathBuf;
//!
//! let pair = DuplicatePair::new(10, PathBuf::from("/a.txt"), PathBuf::from("/b.txt"));
//! let outcome = resolve(&pair, Decision::KeepFirst, &DeleteConfig::trash());
//! ```

pub mod delete;
pub mod prompt;
pub mod resolve;

pub use delete::{
    check_distinct, check_unchanged, delete_file, delete_to_trash, permanent_delete, DeleteConfig,
    DeleteError, DeleteResult,
};
pub use prompt::PromptDecisionSource;
pub use resolve::{
    resolve, resolve_all, Decision, DecisionSource, DeleteOutcome, FixedDecision, PairOutcome,
    ResolutionReport,
};
