mod common;

use engine::{partition, scan, ScanOptions};
use regex::Regex;
use std::collections::BTreeSet;
use tempfile::tempdir;

fn names_and_paths(report: &engine::ScanReport) -> BTreeSet<(String, String)> {
    report
        .classes
        .iter()
        .map(|c| (c.name().to_string(), c.path.clone()))
        .collect()
}

fn options(root: &std::path::Path, jobs: usize, depth: usize) -> ScanOptions {
    let mut opts = ScanOptions::new(root);
    opts.jobs = jobs;
    opts.depth = depth;
    opts
}

#[test]
fn parallel_scan_is_a_lossless_partition() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_tree(dir.path());

    let single = scan(&options(dir.path(), 1, 1))?;
    assert_eq!(single.classes.len(), 6);
    assert_eq!(single.files_parsed, 6);
    let expected = names_and_paths(&single);
    for jobs in 2..=5 {
        let report = scan(&options(dir.path(), jobs, 1))?;
        assert_eq!(report.classes.len(), single.classes.len(), "jobs={jobs}");
        assert_eq!(names_and_paths(&report), expected, "jobs={jobs}");
    }
    Ok(())
}

#[test]
fn same_job_count_gives_same_order() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_tree(dir.path());
    let order = |r: engine::ScanReport| -> Vec<String> {
        r.classes.iter().map(|c| c.name().to_string()).collect()
    };
    let first = order(scan(&options(dir.path(), 3, 1))?);
    for _ in 0..5 {
        assert_eq!(order(scan(&options(dir.path(), 3, 1))?), first);
    }
    // Loose files come first, then bucket 0 = {a, d}, bucket 1 = {b, e}, bucket 2 = {c}.
    assert_eq!(
        first,
        [
            "LLoose;",
            "Lcom/app/A;",
            "Lcom/app/D;",
            "Lcom/app/B;",
            "Lcom/app/Extra;",
            "Lcom/app/C;"
        ]
    );
    Ok(())
}

#[test]
fn files_above_the_cutoff_are_not_lost() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_tree(dir.path());
    for depth in 0..=4 {
        let report = scan(&options(dir.path(), 2, depth))?;
        let names: BTreeSet<_> = report.classes.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names.len(), 6, "depth={depth}");
        assert!(names.contains("LLoose;"), "depth={depth}");
        assert!(names.contains("Lcom/app/C;"), "depth={depth}");
    }
    Ok(())
}

#[test]
fn excluded_directories_are_skipped() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_tree(dir.path());
    let mut opts = options(dir.path(), 2, 1);
    opts.excludes = vec![Regex::new("^b(/.*)?$")?];
    let report = scan(&opts)?;
    let names: BTreeSet<_> = report.classes.iter().map(|c| c.name().to_string()).collect();
    assert!(!names.contains("Lcom/app/B;"));
    assert!(!names.contains("Lcom/app/Extra;"));
    assert_eq!(names.len(), 4);
    Ok(())
}

#[test]
fn invalid_input_is_rejected() {
    let dir = tempdir().unwrap();
    let err = scan(&options(dir.path(), 0, 1)).unwrap_err();
    assert!(err.to_string().contains("jobs must be greater than 0"));

    let missing = dir.path().join("missing");
    let err = scan(&options(&missing, 1, 1)).unwrap_err();
    assert!(err.to_string().contains("Invalid location"));

    let file = dir.path().join("file.smali");
    std::fs::write(&file, "").unwrap();
    assert!(scan(&options(&file, 1, 1)).is_err());
}

#[test]
fn duplicate_classes_collapse_in_the_model() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_tree(dir.path());
    let copy = common::class_source("Lcom/app/A;", "run", &[("Lcom/app/B;", "step")]);
    std::fs::create_dir_all(dir.path().join("z"))?;
    std::fs::write(dir.path().join("z/A.smali"), copy)?;

    let report = scan(&options(dir.path(), 2, 1))?;
    assert_eq!(report.classes.len(), 7);
    let model = report.into_model(dir.path().to_string_lossy());
    assert_eq!(model.len(), 6);
    assert!(model.parser.as_deref().unwrap().starts_with("smaliscan"));
    Ok(())
}

#[test]
fn partition_deals_round_robin() {
    assert_eq!(
        partition(&[0, 1, 2, 3, 4], 2),
        vec![vec![0, 2, 4], vec![1, 3]]
    );
    assert_eq!(partition(&[7], 3), vec![vec![7]]);
    assert!(partition::<u8>(&[], 4).is_empty());
}
