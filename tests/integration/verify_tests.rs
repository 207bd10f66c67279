use ccdupe::duplicates::{
    compare_files, verify_groups, CompareError, DuplicateFinder, HashGroup, VerifyConfig,
};
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_file_removed_after_hashing_is_unverifiable() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("A");
    let b = dir.path().join("B");
    fs::write(&a, b"aaaaaaaaaa").unwrap();
    fs::write(&b, b"aaaaaaaaaa").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let scan = finder.scan(dir.path()).unwrap();
    let hashed = finder.hash_and_group(scan.candidates);
    assert!(hashed.groups.iter().any(HashGroup::has_duplicates));

    fs::remove_file(&a).unwrap();

    let verified = finder.verify(&hashed.groups);
    assert!(verified.confirmed.is_empty());
    assert!(verified.distinct.is_empty());
    assert_eq!(verified.unverifiable.len(), 1);

    let warning = &verified.unverifiable[0];
    assert!(warning.first == a || warning.second == a);
    match &warning.error {
        CompareError::Io { path, .. } => assert_eq!(path, &a),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(verified.stats.unverifiable, 1);
}

#[test]
fn test_file_replaced_by_directory_is_unverifiable() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("A");
    let b = dir.path().join("B");
    fs::write(&a, b"aaaaaaaaaa").unwrap();
    fs::write(&b, b"aaaaaaaaaa").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let hashed = finder.hash_and_group(finder.scan(dir.path()).unwrap().candidates);

    fs::remove_file(&a).unwrap();
    fs::create_dir(&a).unwrap();

    let verified = finder.verify(&hashed.groups);
    assert!(verified.confirmed.is_empty());
    assert_eq!(verified.unverifiable.len(), 1);
}

#[test]
fn test_same_digest_different_content_is_distinct() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"0123456789").unwrap();
    fs::write(&b, b"0123456780").unwrap();

    // A forged group stands in for a digest collision
    let groups = vec![HashGroup::new(10, [7u8; 32], vec![a.clone(), b.clone()])];
    let outcome = verify_groups(&groups, &VerifyConfig::default());

    assert!(outcome.confirmed.is_empty());
    assert_eq!(outcome.distinct, vec![(a, b)]);
    assert!(outcome.unverifiable.is_empty());
}

#[test]
fn test_every_pair_lands_in_one_bucket() {
    let dir = tempdir().unwrap();
    let x = dir.path().join("x");
    let y = dir.path().join("y");
    let z = dir.path().join("z");
    fs::write(&x, b"identical!").unwrap();
    fs::write(&y, b"identical!").unwrap();
    fs::write(&z, b"identical!").unwrap();

    let groups = vec![HashGroup::new(
        10,
        [1u8; 32],
        vec![x.clone(), y.clone(), z.clone()],
    )];
    fs::remove_file(&z).unwrap();

    let outcome = verify_groups(&groups, &VerifyConfig::default().with_io_threads(2));

    assert_eq!(outcome.stats.total_pairs, 3);
    assert_eq!(outcome.confirmed.len(), 1);
    assert!(outcome.confirmed[0].contains(&x) && outcome.confirmed[0].contains(&y));
    assert_eq!(outcome.unverifiable.len(), 2);
    assert_eq!(
        outcome.confirmed.len() + outcome.distinct.len() + outcome.unverifiable.len(),
        outcome.stats.total_pairs
    );
}

#[test]
fn test_compare_files_across_chunk_boundaries() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");

    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let mut changed = content.clone();
    changed[9_999] ^= 0xff;
    fs::write(&a, &content).unwrap();
    fs::write(&b, &content).unwrap();
    fs::write(&c, &changed).unwrap();

    for chunk in [1, 7, 4096, 65_536] {
        assert!(compare_files(&a, &b, chunk, None).unwrap());
        assert!(!compare_files(&a, &c, chunk, None).unwrap());
    }
}

#[test]
fn test_shutdown_interrupts_verification() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let groups = vec![HashGroup::new(4, [0u8; 32], vec![a, b])];
    let outcome = verify_groups(&groups, &VerifyConfig::default().with_shutdown_flag(flag));

    assert!(outcome.stats.interrupted);
    assert!(outcome.confirmed.is_empty());
}
