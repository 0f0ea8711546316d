//! Line-oriented extraction of class facts from smali sources.

mod context;
mod facts;

pub use context::FileContext;
pub use loader::has_suffix;
pub use facts::{
    match_class, match_const_string, match_field, match_invoke, match_line, match_method,
    match_super, CallSite, Fact,
};

use anyhow::{Context, Result};
use ir::ClassRecord;
use std::{fs, path::Path};
use tracing::{debug, info, warn};

use crate::ParserMetrics;

/// Default suffix of the files handed to the extractor.
pub const DEFAULT_SUFFIX: &str = "smali";

/// Extracts the classes of an in-memory source.
pub fn parse_source(path: &str, content: &str) -> Vec<ClassRecord> {
    let mut ctx = FileContext::new(path);
    for line in content.lines() {
        ctx.feed_line(line);
    }
    if ctx.dropped() > 0 {
        debug!(path, dropped = ctx.dropped(), "Facts without enclosing scope");
    }
    ctx.finish()
}

/// Accumulates the classes of many files.
///
/// Files are parsed independently; the same instance is never shared between
/// threads, so every worker owns its own parser.
#[derive(Debug)]
pub struct SmaliParser {
    suffix: String,
    classes: Vec<ClassRecord>,
    metrics: ParserMetrics,
}

impl Default for SmaliParser {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

impl SmaliParser {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            classes: Vec::new(),
            metrics: ParserMetrics::default(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn accepts(&self, path: &Path) -> bool {
        has_suffix(path, &self.suffix)
    }

    /// Parses an in-memory source and returns how many classes it declared.
    pub fn parse_str(&mut self, path: &str, content: &str) -> usize {
        let found = parse_source(path, content);
        let count = found.len();
        self.classes.extend(found);
        self.metrics.files_parsed += 1;
        self.metrics.classes_found += count;
        count
    }

    /// Reads and parses one file. Undecodable bytes are replaced rather than
    /// rejected.
    pub fn parse_file(&mut self, path: &Path) -> Result<usize> {
        debug!(file = %path.display(), "Parsing file");
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                self.metrics.parse_errors += 1;
                return Err(e)
                    .with_context(|| format!("Failed to read file: {}", path.display()));
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        Ok(self.parse_str(&path.to_string_lossy(), &content))
    }

    /// Parses every file of `paths` that carries the configured suffix.
    /// Unreadable files are logged and skipped.
    pub fn parse_files<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a Path>,
    {
        for path in paths {
            if !self.accepts(path) {
                continue;
            }
            if let Err(e) = self.parse_file(path) {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
            }
        }
    }

    /// Parses every suffixed file below `root`, walking it in name order.
    pub fn parse_location(&mut self, root: &Path) -> Result<()> {
        info!(suffix = %self.suffix, root = %root.display(), "Parsing files");
        let files = loader::collect_files(root, &self.suffix, &|_| false)
            .with_context(|| format!("Failed to walk {}", root.display()))?;
        self.parse_files(files.iter().map(|p| p.as_path()));
        info!(
            files = self.metrics.files_parsed,
            classes = self.metrics.classes_found,
            "Finished parsing"
        );
        Ok(())
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn metrics(&self) -> &ParserMetrics {
        &self.metrics
    }

    pub fn into_classes(self) -> Vec<ClassRecord> {
        self.classes
    }

    pub fn into_parts(self) -> (Vec<ClassRecord>, ParserMetrics) {
        (self.classes, self.metrics)
    }
}

#[cfg(test)]
mod tests;
