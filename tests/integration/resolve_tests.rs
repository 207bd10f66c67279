use ccdupe::actions::{
    resolve, resolve_all, Decision, DeleteConfig, DeleteError, DeleteOutcome, FixedDecision,
    PairOutcome, PromptDecisionSource,
};
use ccdupe::duplicates::{DuplicateFinder, DuplicatePair, FinderConfig};
use ccdupe::scanner::WalkerConfig;
use std::fs;
use std::io::Cursor;
use tempfile::{tempdir, TempDir};

fn confirmed_pairs(dir: &TempDir) -> Vec<DuplicatePair> {
    let finder = DuplicateFinder::with_defaults();
    let (report, _) = finder.find_duplicates(dir.path()).unwrap();
    report.confirmed
}

fn copies(names: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"aaaaaaaaaa").unwrap();
    }
    dir
}

#[test]
fn test_skip_leaves_filesystem_unchanged() {
    let dir = copies(&["A", "B"]);
    let pairs = confirmed_pairs(&dir);

    let report = resolve_all(&pairs, &mut FixedDecision(Decision::Skip), &DeleteConfig::permanent());

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.deleted().count(), 0);
    assert!(dir.path().join("A").exists());
    assert!(dir.path().join("B").exists());
}

#[test]
fn test_keep_first_deletes_second() {
    let dir = copies(&["A", "B"]);
    let pair = confirmed_pairs(&dir).remove(0);

    let outcome = resolve(&pair, Decision::KeepFirst, &DeleteConfig::permanent());

    match outcome {
        DeleteOutcome::Deleted(result) => {
            assert_eq!(result.path, pair.second);
            assert_eq!(result.size, 10);
            assert!(result.permanent);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(pair.first.exists());
    assert!(!pair.second.exists());
}

#[test]
fn test_never_deletes_every_copy() {
    let dir = copies(&["A", "B", "C"]);
    let pairs = confirmed_pairs(&dir);
    assert_eq!(pairs.len(), 3);

    let first = resolve_all(
        &pairs,
        &mut FixedDecision(Decision::KeepFirst),
        &DeleteConfig::permanent(),
    );
    assert_eq!(first.deleted().count(), 2);

    // A second pass with the opposite policy finds every kept copy gone
    let second = resolve_all(
        &pairs,
        &mut FixedDecision(Decision::KeepSecond),
        &DeleteConfig::permanent(),
    );
    assert_eq!(second.deleted().count(), 0);

    let remaining = ["A", "B", "C"]
        .iter()
        .filter(|n| dir.path().join(n).exists())
        .count();
    assert_eq!(remaining, 1);
}

#[test]
fn test_pairs_with_deleted_member_are_not_asked_about() {
    let dir = copies(&["A", "B", "C"]);
    let pairs = confirmed_pairs(&dir);

    let mut asked = 0;
    let mut source = |_: &DuplicatePair| {
        asked += 1;
        Decision::KeepFirst
    };
    let report = resolve_all(&pairs, &mut source, &DeleteConfig::permanent());

    assert_eq!(report.deleted().count(), 2);
    assert_eq!(report.already_resolved_count(), 1);
    assert_eq!(asked, 2);
    assert_eq!(report.bytes_freed(), 20);
}

#[test]
fn test_missing_kept_copy_refuses_deletion() {
    let dir = copies(&["A", "B"]);
    let pair = confirmed_pairs(&dir).remove(0);
    fs::remove_file(&pair.first).unwrap();

    let outcome = resolve(&pair, Decision::KeepFirst, &DeleteConfig::permanent());

    assert!(matches!(
        outcome,
        DeleteOutcome::Failed(DeleteError::KeptCopyMissing { .. })
    ));
    assert!(pair.second.exists());
}

#[test]
fn test_modified_target_is_not_deleted() {
    let dir = copies(&["A", "B"]);
    let pair = confirmed_pairs(&dir).remove(0);
    fs::write(&pair.second, b"grown since the scan").unwrap();

    let outcome = resolve(&pair, Decision::KeepFirst, &DeleteConfig::permanent());

    assert!(matches!(outcome, DeleteOutcome::Failed(DeleteError::Modified(_))));
    assert!(pair.second.exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_and_its_target_are_never_resolved() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("b_real.txt");
    fs::write(&real, b"only one copy").unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("a_link.txt")).unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let (report, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(report.confirmed.len(), 1);
    let pair = &report.confirmed[0];

    for decision in [Decision::KeepFirst, Decision::KeepSecond] {
        let outcome = resolve(pair, decision, &DeleteConfig::permanent());
        assert!(matches!(
            outcome,
            DeleteOutcome::Failed(DeleteError::SameFile { .. })
        ));
    }
    assert_eq!(fs::read(&real).unwrap(), b"only one copy");
    assert_eq!(
        fs::read(dir.path().join("a_link.txt")).unwrap(),
        b"only one copy"
    );
}

#[test]
fn test_vanished_target_fails_and_processing_continues() {
    let dir = copies(&["A", "B"]);
    let other = tempdir().unwrap();
    fs::write(other.path().join("X"), b"xx").unwrap();
    fs::write(other.path().join("Y"), b"xx").unwrap();

    let mut pairs = confirmed_pairs(&dir);
    pairs.extend(confirmed_pairs(&other));
    fs::remove_file(&pairs[0].second).unwrap();

    let report = resolve_all(
        &pairs,
        &mut FixedDecision(Decision::KeepFirst),
        &DeleteConfig::permanent(),
    );

    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.deleted().count(), 1);
    assert!(matches!(
        report.outcomes[1].1,
        PairOutcome::Resolved {
            outcome: DeleteOutcome::Deleted(_),
            ..
        }
    ));
}

#[test]
fn test_prompt_answers_drive_deletion() {
    let dir = copies(&["A", "B"]);
    let pair = confirmed_pairs(&dir).remove(0);

    let mut prompt = PromptDecisionSource::new(Cursor::new("1\n"), Vec::new());
    let report = resolve_all(
        std::slice::from_ref(&pair),
        &mut prompt,
        &DeleteConfig::permanent(),
    );

    assert_eq!(report.deleted().count(), 1);
    assert!(!pair.first.exists());
    assert!(pair.second.exists());
}

#[test]
fn test_prompt_end_of_input_skips() {
    let dir = copies(&["A", "B", "C"]);
    let pairs = confirmed_pairs(&dir);

    let mut prompt = PromptDecisionSource::new(Cursor::new(""), Vec::new());
    let report = resolve_all(&pairs, &mut prompt, &DeleteConfig::permanent());

    assert_eq!(report.skipped_count(), 3);
    for name in ["A", "B", "C"] {
        assert!(dir.path().join(name).exists());
    }
}
