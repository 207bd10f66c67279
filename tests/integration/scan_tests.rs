use ccdupe::duplicates::{DuplicateFinder, DuplicatePair, FinderConfig, FinderError};
use ccdupe::scanner::WalkerConfig;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// A and B share content, C has the same size, D is shorter.
fn abcd_tree() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("A"), b"aaaaaaaaaa").unwrap();
    fs::write(dir.path().join("B"), b"aaaaaaaaaa").unwrap();
    fs::write(dir.path().join("C"), b"bbbbbbbbbb").unwrap();
    fs::write(dir.path().join("D"), b"ddddd").unwrap();
    dir
}

fn names(paths: &[PathBuf]) -> HashSet<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn pair_names(pair: &DuplicatePair) -> HashSet<String> {
    names(&[pair.first.clone(), pair.second.clone()])
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_pipeline_stage_by_stage() {
    let dir = abcd_tree();
    let finder = DuplicateFinder::with_defaults();

    let scan = finder.scan(dir.path()).unwrap();
    assert_eq!(scan.stats.total_files, 4);
    assert_eq!(scan.candidates.len(), 1);
    assert_eq!(scan.candidates[0].size, 10);
    let members: Vec<PathBuf> = scan.candidates[0]
        .files
        .iter()
        .map(|f| f.path.clone())
        .collect();
    assert_eq!(names(&members), set(&["A", "B", "C"]));

    let hashed = finder.hash_and_group(scan.candidates);
    assert_eq!(hashed.stats.hashed_files, 3);
    assert!(hashed.warnings.is_empty());
    let groups: Vec<HashSet<String>> = hashed.groups.iter().map(|g| names(&g.paths)).collect();
    assert_eq!(groups.len(), 2);
    assert!(groups.contains(&set(&["A", "B"])));
    assert!(groups.contains(&set(&["C"])));

    let verified = finder.verify(&hashed.groups);
    assert_eq!(verified.confirmed.len(), 1);
    assert_eq!(pair_names(&verified.confirmed[0]), set(&["A", "B"]));
    assert!(verified.distinct.is_empty());
    assert!(verified.unverifiable.is_empty());
}

#[test]
fn test_find_duplicates_end_to_end() {
    let dir = abcd_tree();
    let finder = DuplicateFinder::with_defaults();

    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.has_duplicates());
    assert!(!report.has_warnings());
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.eliminated_by_hash, 1);
    assert_eq!(summary.duplicate_pairs, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_min_size_excludes_small_file_before_grouping() {
    let dir = abcd_tree();
    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_min_size(Some(8)));
    let finder = DuplicateFinder::new(config);

    let scan = finder.scan(dir.path()).unwrap();
    assert_eq!(scan.stats.total_files, 3);
    assert_eq!(scan.stats.eliminated_unique, 0);
}

#[test]
fn test_min_size_boundary() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("exact1"), b"12345678").unwrap();
    fs::write(dir.path().join("exact2"), b"12345678").unwrap();
    fs::write(dir.path().join("short1"), b"1234567").unwrap();
    fs::write(dir.path().join("short2"), b"1234567").unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_min_size(Some(8)));
    let finder = DuplicateFinder::new(config);
    let (report, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(report.confirmed.len(), 1);
    assert_eq!(pair_names(&report.confirmed[0]), set(&["exact1", "exact2"]));
}

#[test]
fn test_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    for i in 1..=5 {
        fs::write(dir.path().join(format!("f{}", i)), vec![b'x'; i]).unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.eliminated_by_size, 5);
    assert_eq!(summary.hashed_files, 0);
    assert!(report.hash_groups.is_empty());
}

#[test]
fn test_rerun_yields_same_pairs() {
    let dir = abcd_tree();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("A2"), b"aaaaaaaaaa").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    let first: HashSet<DuplicatePair> = first.confirmed.into_iter().collect();
    let second: HashSet<DuplicatePair> = second.confirmed.into_iter().collect();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_three_copies_give_three_pairs() {
    let dir = tempdir().unwrap();
    for name in ["x", "y", "z"] {
        fs::write(dir.path().join(name), b"same bytes").unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(report.confirmed.len(), 3);
    // Keeping one copy frees two
    assert_eq!(summary.reclaimable_space, 20);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty1"), b"").unwrap();
    fs::write(dir.path().join("empty2"), b"").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(report.confirmed.len(), 1);
    assert_eq!(report.confirmed[0].size, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_nested_directories_and_absolute_paths() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two");
    fs::create_dir_all(&deep).unwrap();
    fs::write(dir.path().join("top.txt"), b"nested content").unwrap();
    fs::write(deep.join("bottom.txt"), b"nested content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (report, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(report.confirmed.len(), 1);
    assert!(report.confirmed[0].first.is_absolute());
    assert!(report.confirmed[0].second.is_absolute());
}

#[test]
fn test_skip_hidden_and_ignore_patterns() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep1"), b"payload").unwrap();
    fs::write(dir.path().join("keep2"), b"payload").unwrap();
    fs::write(dir.path().join(".hidden"), b"payload").unwrap();
    fs::write(dir.path().join("drop.tmp"), b"payload").unwrap();

    let walker = WalkerConfig::default()
        .with_skip_hidden(true)
        .with_ignore_patterns(vec!["*.tmp".to_string()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(report.confirmed.len(), 1);
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(!report.has_duplicates());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_invalid_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();
    let finder = DuplicateFinder::with_defaults();

    let missing = finder.scan(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(missing, FinderError::PathNotFound(_)));
    assert!(missing.is_invalid_root());

    let not_dir = finder.scan(&file).unwrap_err();
    assert!(matches!(not_dir, FinderError::NotADirectory(_)));
}

#[test]
fn test_enumerate_lists_every_file() {
    let dir = abcd_tree();
    let finder = DuplicateFinder::with_defaults();

    let enumeration = finder.enumerate(dir.path()).unwrap();
    let paths: Vec<PathBuf> = enumeration.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(names(&paths), set(&["A", "B", "C", "D"]));
    assert!(enumeration.warnings.is_empty());

    let grouped = finder.group(enumeration);
    assert_eq!(grouped.candidates.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("real");
    fs::write(&target, b"linked content").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("link")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(!report.has_duplicates());
}
