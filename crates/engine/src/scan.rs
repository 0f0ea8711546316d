//! Directory-parallel extraction.
//!
//! Directories exactly `depth` levels below the root are the units of work.
//! They are dealt round-robin into `jobs` buckets and each non-empty bucket
//! is parsed by its own worker with its own extractor. Suffixed files that
//! sit above the cutoff form one extra batch, processed first. Batches are
//! joined in bucket order, so the same input and job count always produce
//! the same class order.

use anyhow::{bail, Context, Result};
use ir::{ClassRecord, ProgramModel};
use parsers::{ParserMetrics, SmaliParser};
use rayon::{prelude::*, ThreadPoolBuilder};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Name recorded as the producer of scanned models.
pub const PARSER_NAME: &str = concat!("smaliscan ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// File name suffix of the sources to parse.
    pub suffix: String,
    /// Worker count; must be greater than 0.
    pub jobs: usize,
    /// Directory depth of the work units below `root`.
    pub depth: usize,
    /// Patterns matched against paths relative to `root`.
    pub excludes: Vec<Regex>,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: parsers::smali::DEFAULT_SUFFIX.to_string(),
            jobs: std::thread::available_parallelism().map_or(1, |n| n.get()),
            depth: 1,
            excludes: Vec::new(),
        }
    }
}

/// Merged output of a scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Classes in bucket order. Not de-duplicated.
    pub classes: Vec<ClassRecord>,
    pub files_parsed: usize,
    pub files_failed: usize,
    /// Workers that received a non-empty batch.
    pub workers: usize,
    pub duration: Duration,
}

impl ScanReport {
    /// Keys the classes by name; later classes replace earlier ones.
    pub fn into_model(self, location: impl Into<String>) -> ProgramModel {
        let mut model: ProgramModel = self.classes.into_iter().collect();
        model.location = Some(location.into());
        model.parser = Some(PARSER_NAME.to_string());
        model
    }
}

#[derive(Debug)]
enum WorkUnit {
    /// Files above the depth cutoff.
    Files(Vec<PathBuf>),
    /// One round-robin bucket of cutoff directories.
    Dirs(Vec<PathBuf>),
}

#[derive(Debug, Default)]
struct Batch {
    classes: Vec<ClassRecord>,
    metrics: ParserMetrics,
}

fn relative_depth(root: &Path, path: &Path) -> usize {
    path.strip_prefix(root)
        .map(|rel| rel.components().count())
        .unwrap_or(0)
}

fn is_excluded(root: &Path, path: &Path, patterns: &[Regex]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|re| re.is_match(&rel))
}

/// Deals `dirs` into `jobs` buckets, bucket `i` receiving every directory
/// whose index modulo `jobs` is `i`. Empty buckets are dropped.
pub fn partition<T: Clone>(dirs: &[T], jobs: usize) -> Vec<Vec<T>> {
    let mut buckets: Vec<Vec<T>> = vec![Vec::new(); jobs];
    for (i, dir) in dirs.iter().enumerate() {
        buckets[i % jobs].push(dir.clone());
    }
    buckets.retain(|b| !b.is_empty());
    buckets
}

fn run_worker<F>(unit: &WorkUnit, suffix: &str, excluded: &F) -> Batch
where
    F: Fn(&Path) -> bool,
{
    let mut parser = SmaliParser::new(suffix);
    match unit {
        WorkUnit::Files(files) => parser.parse_files(files.iter().map(PathBuf::as_path)),
        WorkUnit::Dirs(dirs) => {
            for dir in dirs {
                debug!(dir = %dir.display(), "Scanning directory");
                match loader::collect_files(dir, suffix, excluded) {
                    Ok(files) => parser.parse_files(files.iter().map(PathBuf::as_path)),
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory")
                    }
                }
            }
        }
    }
    let (classes, metrics) = parser.into_parts();
    Batch { classes, metrics }
}

/// Scans `opts.root` and returns every class found.
pub fn scan(opts: &ScanOptions) -> Result<ScanReport> {
    if opts.jobs == 0 {
        bail!("jobs must be greater than 0");
    }
    let root = opts.root.as_path();
    let meta = fs::metadata(root)
        .with_context(|| format!("Invalid location: {}", root.display()))?;
    if !meta.is_dir() {
        bail!("Location is not a directory: {}", root.display());
    }
    let start = Instant::now();
    info!(
        root = %root.display(),
        suffix = %opts.suffix,
        jobs = opts.jobs,
        depth = opts.depth,
        "Scanning"
    );

    let excluded = |p: &Path| is_excluded(root, p, &opts.excludes);
    let dirs = loader::dirs_at_depth(root, opts.depth, &excluded)
        .with_context(|| format!("Failed to list directories of {}", root.display()))?;

    let mut units = Vec::new();
    if opts.depth > 0 {
        let above_cutoff = |p: &Path| {
            excluded(p) || (p != root && p.is_dir() && relative_depth(root, p) >= opts.depth)
        };
        let loose = loader::collect_files(root, &opts.suffix, &above_cutoff)
            .with_context(|| format!("Failed to walk {}", root.display()))?;
        if !loose.is_empty() {
            debug!(files = loose.len(), "Files above the depth cutoff");
            units.push(WorkUnit::Files(loose));
        }
    }
    units.extend(partition(&dirs, opts.jobs).into_iter().map(WorkUnit::Dirs));
    debug!(directories = dirs.len(), units = units.len(), "Work partitioned");

    let pool = ThreadPoolBuilder::new()
        .num_threads(opts.jobs)
        .build()
        .context("Failed to build thread pool")?;
    let batches: Vec<Batch> = pool.install(|| {
        units
            .par_iter()
            .map(|unit| run_worker(unit, &opts.suffix, &excluded))
            .collect()
    });

    let mut report = ScanReport {
        classes: Vec::new(),
        files_parsed: 0,
        files_failed: 0,
        workers: batches.len(),
        duration: Duration::ZERO,
    };
    for batch in batches {
        report.files_parsed += batch.metrics.files_parsed;
        report.files_failed += batch.metrics.parse_errors;
        report.classes.extend(batch.classes);
    }
    report.duration = start.elapsed();
    info!(
        classes = report.classes.len(),
        files = report.files_parsed,
        failed = report.files_failed,
        workers = report.workers,
        elapsed_ms = report.duration.as_millis() as u64,
        "Scan finished"
    );
    Ok(report)
}
