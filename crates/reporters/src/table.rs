use ir::{CallRecord, ClassRow, ConstStringRecord, MethodRow, Persisted, PropertyRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Records that can be shown as table rows.
pub trait Tabular {
    fn columns() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

impl Tabular for ClassRow {
    fn columns() -> Vec<&'static str> {
        vec!["name", "type", "package", "parent", "path", "depth"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.class_type.clone(),
            self.package.clone(),
            self.parent.clone().unwrap_or_default(),
            self.path.clone(),
            self.depth.to_string(),
        ]
    }
}

impl Tabular for PropertyRecord {
    fn columns() -> Vec<&'static str> {
        vec!["name", "type", "info", "class"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.prop_type.clone(),
            self.info.clone(),
            self.class.clone(),
        ]
    }
}

impl Tabular for ConstStringRecord {
    fn columns() -> Vec<&'static str> {
        vec!["var", "value", "class"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.var.clone(), self.value.clone(), self.class.clone()]
    }
}

impl Tabular for MethodRow {
    fn columns() -> Vec<&'static str> {
        vec!["name", "type", "args", "return", "class"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.info.clone(),
            self.args.clone(),
            self.ret.clone(),
            self.class.clone(),
        ]
    }
}

impl Tabular for CallRecord {
    fn columns() -> Vec<&'static str> {
        vec![
            "from_class",
            "from_method",
            "local_args",
            "to_class",
            "to_method",
            "dst_args",
            "return",
            "index",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.from_class.clone(),
            self.from_method.clone(),
            self.local_args.clone(),
            self.to_class.clone(),
            self.to_method.clone(),
            self.dst_args.clone(),
            self.ret.clone(),
            self.index.to_string(),
        ]
    }
}

impl<T: Tabular> Tabular for Persisted<T> {
    fn columns() -> Vec<&'static str> {
        let mut cols = vec!["id"];
        cols.extend(T::columns());
        cols
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.id.to_string()];
        cells.extend(self.record.cells());
        cells
    }
}

/// Row window given as `end` or `start,end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for RowRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid range '{s}', expected N or START,END"))
        };
        match s.split_once(',') {
            Some((start, end)) => {
                let (start, end) = (num(start)?, num(end)?);
                if start > end {
                    return Err(format!("invalid range '{s}', start is after end"));
                }
                Ok(RowRange { start, end })
            }
            None => Ok(RowRange {
                start: 0,
                end: num(s)?,
            }),
        }
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

/// How rows are picked and shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub range: Option<RowRange>,
    /// Columns left out of the output. Unknown names are ignored.
    pub exclude: Vec<String>,
    pub sort_by: Option<String>,
    pub reverse: bool,
    /// Longest cell shown in text output, in characters.
    pub max_width: Option<usize>,
}

/// Numbers compare numerically, everything else as text.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    if width <= 3 {
        return cell.chars().take(width).collect();
    }
    let mut out: String = cell.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

/// Rows of strings under named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<T: Tabular>(records: &[T]) -> Self {
        Self {
            columns: T::columns(),
            rows: records.iter().map(Tabular::cells).collect(),
        }
    }

    /// Sorts, windows and projects the table.
    ///
    /// Sorting runs first and may use an excluded column.
    pub fn apply(mut self, opts: &TableOptions) -> Result<Table, String> {
        if let Some(col) = &opts.sort_by {
            let idx = self
                .columns
                .iter()
                .position(|c| c == col)
                .ok_or_else(|| {
                    format!(
                        "unknown column '{col}', expected one of: {}",
                        self.columns.join(", ")
                    )
                })?;
            self.rows
                .sort_by(|a, b| compare_cells(&a[idx], &b[idx]));
        }
        if opts.reverse {
            self.rows.reverse();
        }
        if let Some(range) = opts.range {
            let end = range.end.min(self.rows.len());
            let start = range.start.min(end);
            self.rows.truncate(end);
            self.rows.drain(..start);
        }
        if !opts.exclude.is_empty() {
            let keep: Vec<usize> = (0..self.columns.len())
                .filter(|i| !opts.exclude.iter().any(|x| x == self.columns[*i]))
                .collect();
            self.columns = keep.iter().map(|i| self.columns[*i]).collect();
            self.rows = self
                .rows
                .into_iter()
                .map(|row| keep.iter().map(|i| row[*i].clone()).collect())
                .collect();
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Left-aligned plain text with a header rule.
    pub fn to_text(&self, max_width: Option<usize>) -> String {
        let cell = |s: &str| match max_width {
            Some(w) => truncate(s, w),
            None => s.to_string(),
        };
        let header: Vec<String> = self.columns.iter().map(|c| cell(*c)).collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|c| cell(c)).collect())
            .collect();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, c) in row.iter().enumerate() {
                widths[i] = widths[i].max(c.chars().count());
            }
        }

        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect();
            format!("{}\n", padded.join("  ").trim_end())
        };
        let mut out = line(&header);
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"─".repeat(total));
        out.push('\n');
        for row in &rows {
            out.push_str(&line(row));
        }
        out
    }
}

/// One table row serialized as an object with keys in column order.
struct RowOut<'a> {
    columns: &'a [&'static str],
    cells: &'a [String],
}

impl Serialize for RowOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (k, v) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter().map(|cells| RowOut {
            columns: &self.columns,
            cells,
        }))
    }
}
