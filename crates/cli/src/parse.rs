//! The `parse` command: scan a tree and write the model.

use anyhow::{bail, Result};
use engine::{export_model, scan, ScanOptions, SqliteStore};
use reporters::ScanInfo;
use tracing::info;

use crate::args::{default_jobs, ParseArgs};
use crate::config::ScanConfig;
use crate::output::DumpFormat;
use crate::ui;

/// Merges flags over configuration defaults.
pub fn scan_options(args: &ParseArgs, cfg: &ScanConfig) -> Result<ScanOptions> {
    let mut opts = ScanOptions::new(&args.location);
    if let Some(suffix) = args.suffix.clone().or_else(|| cfg.suffix.clone()) {
        opts.suffix = suffix;
    }
    opts.jobs = args.jobs.or(cfg.jobs).unwrap_or_else(default_jobs);
    if opts.jobs == 0 {
        bail!("jobs must be greater than 0");
    }
    if let Some(depth) = args.depth.or(cfg.depth) {
        opts.depth = depth;
    }
    opts.excludes = args.exclude.clone();
    opts.excludes.extend(crate::parse_excludes(&cfg.exclude)?);
    Ok(opts)
}

pub fn run_parse(args: ParseArgs, cfg: &ScanConfig, quiet: bool) -> Result<()> {
    let opts = scan_options(&args, cfg)?;
    let report = scan(&opts)?;
    let location = args.location.display().to_string();
    let mut summary = ScanInfo {
        location: location.clone(),
        files_parsed: report.files_parsed,
        files_failed: report.files_failed,
        classes: 0,
        workers: report.workers,
        duration_ms: report.duration.as_millis() as u64,
        output: args.output.display().to_string(),
        export: None,
    };

    let model = report.into_model(location);
    summary.classes = model.len();
    match args.format {
        DumpFormat::Json => loader::write_dump(&model, &args.output)?,
        DumpFormat::Sqlite => {
            let mut store = SqliteStore::open(&args.output)?;
            summary.export = Some(export_model(&model, &mut store)?);
        }
    }
    info!(path = %args.output.display(), classes = summary.classes, "Model written");

    if !quiet {
        ui::print_status("DONE", &format!("Wrote {}", args.output.display()));
    }
    reporters::print_summary(&summary, args.report.into())?;
    Ok(())
}
