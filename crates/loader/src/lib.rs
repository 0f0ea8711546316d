//! Discovers smali sources on disk and loads previously written model dumps.

use anyhow::Context;
use ir::{ModelDump, ProgramModel};
use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

mod walk;
pub use walk::{collect_files, dirs_at_depth, has_suffix, visit};

/// Reads a JSON dump written by [`write_dump`] (or by an older tool using the
/// same layout) and rebuilds the program model.
pub fn load_dump(path: &Path) -> anyhow::Result<ProgramModel> {
    debug!(path = %path.display(), "Loading dump");
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open dump: {}", path.display()))?;
    let dump: ModelDump = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid dump: {}", path.display()))?;
    let model = ProgramModel::from_dump(dump);
    info!(path = %path.display(), classes = model.len(), "Dump loaded");
    Ok(model)
}

/// Writes `model` as a pretty-printed JSON dump.
pub fn write_dump(model: &ProgramModel, path: &Path) -> anyhow::Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create dump: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    model
        .write_json(&mut out)
        .with_context(|| format!("Failed to write dump: {}", path.display()))?;
    out.flush()?;
    info!(path = %path.display(), classes = model.len(), "Dump written");
    Ok(())
}
