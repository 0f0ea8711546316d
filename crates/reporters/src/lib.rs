//! Formatters for query results and scan summaries in text and JSON.

use engine::{ExportStats, SearchResults};
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

mod table;

pub use table::{RowRange, Table, TableOptions, Tabular};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Supported output formats.
pub enum Format {
    /// Aligned plain-text tables.
    #[default]
    Text,
    /// JSON arrays of row objects.
    Json,
}

fn simple_box(title: &str) -> String {
    let width = title.len() + 2;
    format!(
        "╭{}╮\n│ {} │\n╰{}╯\n",
        "─".repeat(width),
        title,
        "─".repeat(width)
    )
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Prints `records` as a table in the selected format.
///
/// # Example
/// ```
/// use ir::ConstStringRecord;
/// use reporters::{print_table, Format, TableOptions};
/// let rows = vec![ConstStringRecord {
///     var: "v0".into(),
///     value: "secret".into(),
///     class: "La/B;".into(),
/// }];
/// print_table(&rows, &TableOptions::default(), Format::Text).unwrap();
/// ```
pub fn print_table<T: Tabular>(records: &[T], opts: &TableOptions, fmt: Format) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_table(&mut out, records, opts, fmt)
}

/// Writes a table to a generic `Write`, used for tests.
pub fn write_table<W: Write, T: Tabular>(
    out: &mut W,
    records: &[T],
    opts: &TableOptions,
    fmt: Format,
) -> io::Result<()> {
    let table = Table::new(records).apply(opts).map_err(invalid)?;
    debug!(rows = table.rows.len(), columns = table.columns.len(), "Writing table");
    match fmt {
        Format::Text => {
            if table.is_empty() {
                writeln!(out, "No results.")?;
            } else {
                write!(out, "{}", table.to_text(opts.max_width))?;
                writeln!(out, "\nTotal: {}", table.rows.len())?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &table)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn print_search(results: &SearchResults, opts: &TableOptions, fmt: Format) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_search(&mut out, results, opts, fmt)
}

/// Writes global search matches, one section per table.
pub fn write_search<W: Write>(
    out: &mut W,
    results: &SearchResults,
    opts: &TableOptions,
    fmt: Format,
) -> io::Result<()> {
    match fmt {
        Format::Text => {
            writeln!(out, "{}", simple_box("Classes"))?;
            write_table(out, &results.classes, opts, fmt)?;
            writeln!(out, "\n{}", simple_box("Properties"))?;
            write_table(out, &results.properties, opts, fmt)?;
            writeln!(out, "\n{}", simple_box("Const strings"))?;
            write_table(out, &results.const_strings, opts, fmt)?;
            writeln!(out, "\n{}", simple_box("Methods"))?;
            write_table(out, &results.methods, opts, fmt)?;
        }
        Format::Json => {
            #[derive(Serialize)]
            struct SearchOut {
                classes: Table,
                properties: Table,
                const_strings: Table,
                methods: Table,
                total: usize,
            }
            let json = SearchOut {
                classes: Table::new(&results.classes).apply(opts).map_err(invalid)?,
                properties: Table::new(&results.properties).apply(opts).map_err(invalid)?,
                const_strings: Table::new(&results.const_strings)
                    .apply(opts)
                    .map_err(invalid)?,
                methods: Table::new(&results.methods).apply(opts).map_err(invalid)?,
                total: results.len(),
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Outcome of a `parse` run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanInfo {
    pub location: String,
    pub files_parsed: usize,
    pub files_failed: usize,
    pub classes: usize,
    pub workers: usize,
    pub duration_ms: u64,
    pub output: String,
    /// Present when the model was written into a store.
    pub export: Option<ExportStats>,
}

fn scan_stats(info: &ScanInfo) -> String {
    let mut output = simple_box("Scan Status");
    output.push('\n');
    output.push_str(&format!(
        "    Parsed {} files under {} with {} workers\n\n",
        info.files_parsed, info.location, info.workers
    ));
    output.push_str("    Metric                    Value\n");
    output.push_str(
        "    ──────────────────────────────────────────────────────────────────────────────\n",
    );
    output.push_str(&format!("    Classes                   {}\n", info.classes));
    output.push_str(&format!("    Failed files              {}\n", info.files_failed));
    output.push_str(&format!("    Duration                  {}ms\n", info.duration_ms));
    let attempted = info.files_parsed + info.files_failed;
    output.push_str(&format!(
        "    Success rate              {:.1}%\n",
        if attempted > 0 {
            info.files_parsed as f64 / attempted as f64 * 100.0
        } else {
            0.0
        }
    ));

    if let Some(stats) = &info.export {
        output.push('\n');
        output.push_str("    Table                     Rows\n");
        output.push_str(
            "    ──────────────────────────────────────────────────────────────────────────────\n",
        );
        for (name, rows) in [
            ("classes", stats.classes),
            ("properties", stats.properties),
            ("const_strings", stats.const_strings),
            ("methods", stats.methods),
            ("calls", stats.calls),
            ("failed inserts", stats.failed),
        ] {
            output.push_str(&format!("    {name:<25} {rows}\n"));
        }
    }
    output.push_str(&format!("\n    Output: {}\n", info.output));
    output
}

pub fn print_summary(info: &ScanInfo, fmt: Format) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_summary(&mut out, info, fmt)
}

pub fn write_summary<W: Write>(out: &mut W, info: &ScanInfo, fmt: Format) -> io::Result<()> {
    match fmt {
        Format::Text => write!(out, "{}", scan_stats(info))?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, info)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
