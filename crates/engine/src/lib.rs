//! Scanning, querying and cross-referencing of the program model.
//! Runs the extractor over a directory tree in parallel and stores or
//! queries the resulting records.

use anyhow::Result;
use std::path::Path;
use tracing::info;

pub mod analysis;
pub mod export;
pub mod scan;
pub mod store;
pub mod xref;

pub use analysis::{
    Analyzer, CallFilter, ClassColumn, ConstColumn, MethodColumn, PropertyColumn, SearchResults,
    TableKind,
};
pub use export::{export_model, ExportStats};
pub use scan::{partition, scan, ScanOptions, ScanReport, PARSER_NAME};
pub use store::{MemoryStore, SqliteStore, Store, StoreCounts};
pub use xref::{xref_calls, CallIndex, Direction};

/// A queryable store: everything the analysis commands need.
pub trait Backend: Store + Analyzer + CallIndex {}

impl<T: Store + Analyzer + CallIndex> Backend for T {}

/// Opens the backend for `path`: JSON dumps are loaded into a
/// [`MemoryStore`], anything else is opened as a SQLite database.
pub fn open_backend(path: &Path) -> Result<Box<dyn Backend>> {
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let backend: Box<dyn Backend> = if is_json {
        let model = loader::load_dump(path)?;
        Box::new(MemoryStore::from_model(&model)?)
    } else {
        if !path.exists() {
            anyhow::bail!("Database not found: {}", path.display());
        }
        Box::new(SqliteStore::open(path)?)
    };
    info!(path = %path.display(), json = is_json, "Backend opened");
    Ok(backend)
}
