use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use engine::{
    CallFilter, ClassColumn, ConstColumn, Direction, MethodColumn, PropertyColumn, TableKind,
};
use graph::{LayoutEngine, OutputFormat};
use regex::Regex;
use reporters::{RowRange, TableOptions};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::output::{DumpFormat, Format};

pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn parse_jobs(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("jobs must be greater than 0".into())
    } else {
        Ok(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "smaliscan - static analysis of smali sources",
    long_about = "smaliscan extracts classes, fields, const strings, methods and calls from a tree of smali files, stores them as a JSON dump or a SQLite database, and lets you search, cross-reference and draw them.

Examples:
  smaliscan parse -l app/smali -o app.json           # Parse into a JSON dump
  smaliscan parse -l app/smali -f sqlite -o app.db   # Parse into SQLite
  smaliscan analyze -i app.db classes -p Crypto      # Search classes
  smaliscan analyze -i app.db draw-xref -c Lcom/a/B; -d to -o xref.svg -F svg",
    subcommand_required = true
)]
pub struct Cli {
    /// Logging level (default: info)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
    /// Shorthand for --log-level debug
    #[arg(long, global = true)]
    pub debug: bool,
    /// Disable logging and the header
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `--quiet` wins over `--debug`, which wins over `--log-level`.
    pub fn log_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::OFF
        } else if self.debug {
            LevelFilter::DEBUG
        } else {
            self.log_level.map_or(LevelFilter::INFO, LevelFilter::from)
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a directory of smali files into a dump or database
    Parse(ParseArgs),
    /// Query a dump or database
    Analyze(AnalyzeArgs),
}

#[derive(ClapArgs)]
pub struct ParseArgs {
    /// Directory to parse
    #[arg(short, long)]
    pub location: PathBuf,
    /// File suffix of the sources (default: smali)
    #[arg(short, long)]
    pub suffix: Option<String>,
    /// Number of parallel workers (default: available cores)
    #[arg(short, long, value_parser = parse_jobs)]
    pub jobs: Option<usize>,
    /// Depth below the location of the directories handed to workers (default: 1)
    #[arg(short, long)]
    pub depth: Option<usize>,
    /// Exclude paths relative to the location matching these globs
    #[arg(long, value_parser = crate::parse_exclude, value_delimiter = ',')]
    pub exclude: Vec<Regex>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = DumpFormat::Json)]
    pub format: DumpFormat,
    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
    /// Format of the summary printed after parsing
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub report: Format,
}

#[derive(ClapArgs)]
pub struct AnalyzeArgs {
    /// JSON dump (`.json`) or SQLite database to query
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output format of query results
    #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    #[command(subcommand)]
    pub command: AnalyzeCmd,
}

#[derive(Subcommand)]
pub enum AnalyzeCmd {
    /// Search every table for a pattern
    Search(SearchArgs),
    /// Search classes
    Classes(ClassSearch),
    /// Search properties
    Properties(PropertySearch),
    /// Search const strings
    Consts(ConstSearch),
    /// Search methods
    Methods(MethodSearch),
    /// Search calls
    Calls(CallArgs),
    /// Cross-reference calls
    Xref(XrefArgs),
    /// Draw matching classes clustered by package
    DrawClasses(DrawClassesArgs),
    /// Draw matching calls clustered by class
    DrawCalls(DrawCallsArgs),
    /// Draw the cross-references of a class or method
    DrawXref(DrawXrefArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TableArgs {
    /// Rows to print: END or START,END
    #[arg(short, long)]
    pub range: Option<RowRange>,
    /// Columns to leave out
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude_fields: Vec<String>,
    /// Column to sort by
    #[arg(short = 's', long)]
    pub sort_by: Option<String>,
    /// Reverse the order
    #[arg(long)]
    pub reverse: bool,
    /// Longest cell shown in text output
    #[arg(long)]
    pub max_width: Option<usize>,
}

impl From<TableArgs> for TableOptions {
    fn from(a: TableArgs) -> Self {
        TableOptions {
            range: a.range,
            exclude: a.exclude_fields,
            sort_by: a.sort_by,
            reverse: a.reverse,
            max_width: a.max_width,
        }
    }
}

#[derive(ClapArgs)]
pub struct SearchArgs {
    /// Pattern to look for
    #[arg(short, long)]
    pub pattern: String,
    /// Only search this table (classes, properties, consts, methods)
    #[arg(short, long)]
    pub table: Option<TableKind>,
    #[command(flatten)]
    pub table_args: TableArgs,
}

macro_rules! column_search {
    ($($name:ident => $column:ty = $default:literal),+ $(,)?) => {
        $(
            #[derive(ClapArgs)]
            pub struct $name {
                /// Column to search
                #[arg(short, long, default_value = $default)]
                pub column: $column,
                /// Substring to look for; empty lists every row
                #[arg(short, long, default_value = "")]
                pub pattern: String,
                #[command(flatten)]
                pub table_args: TableArgs,
            }
        )+
    };
}

column_search! {
    ClassSearch => ClassColumn = "name",
    PropertySearch => PropertyColumn = "name",
    ConstSearch => ConstColumn = "value",
    MethodSearch => MethodColumn = "name",
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Calling class contains
    #[arg(long)]
    pub from_class: Option<String>,
    /// Calling method contains
    #[arg(long)]
    pub from_method: Option<String>,
    /// Called class contains
    #[arg(long)]
    pub to_class: Option<String>,
    /// Called method contains
    #[arg(long)]
    pub to_method: Option<String>,
    /// Caller registers contain
    #[arg(long)]
    pub local_args: Option<String>,
    /// Called method arguments contain
    #[arg(long)]
    pub dst_args: Option<String>,
}

impl From<FilterArgs> for CallFilter {
    fn from(a: FilterArgs) -> Self {
        CallFilter {
            from_class: a.from_class,
            from_method: a.from_method,
            to_class: a.to_class,
            to_method: a.to_method,
            local_args: a.local_args,
            dst_args: a.dst_args,
        }
    }
}

#[derive(ClapArgs)]
pub struct CallArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    #[command(flatten)]
    pub table_args: TableArgs,
}

#[derive(ClapArgs)]
pub struct XrefArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Follow calls into (`to`) or out of (`from`) the matched classes
    #[arg(short, long)]
    pub direction: Direction,
    /// Expansion rounds
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,
    #[command(flatten)]
    pub table_args: TableArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DrawArgs {
    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
    /// Graph format (default: dot)
    #[arg(short = 'F', long = "graph-format")]
    pub graph_format: Option<OutputFormat>,
    /// Graphviz layout engine (default: dot)
    #[arg(long)]
    pub engine: Option<LayoutEngine>,
    /// Extra Graphviz arguments
    #[arg(long, allow_hyphen_values = true)]
    pub args: Option<String>,
}

#[derive(ClapArgs)]
pub struct DrawClassesArgs {
    /// Column to search
    #[arg(short, long, default_value = "name")]
    pub column: ClassColumn,
    /// Substring to look for; empty draws every class
    #[arg(short, long, default_value = "")]
    pub pattern: String,
    #[command(flatten)]
    pub draw: DrawArgs,
}

#[derive(ClapArgs)]
pub struct DrawCallsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    #[command(flatten)]
    pub draw: DrawArgs,
}

#[derive(ClapArgs)]
pub struct DrawXrefArgs {
    /// Class to start from
    #[arg(short, long)]
    pub class: Option<String>,
    /// Method to start from
    #[arg(short, long)]
    pub method: Option<String>,
    /// Follow calls into (`to`) or out of (`from`) the start
    #[arg(short, long)]
    pub direction: Direction,
    /// Expansion rounds
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,
    #[command(flatten)]
    pub draw: DrawArgs,
}

impl DrawXrefArgs {
    /// Seed filter: the start is the callee for `to` and the caller for `from`.
    pub fn seed_filter(&self) -> CallFilter {
        match self.direction {
            Direction::To => CallFilter {
                to_class: self.class.clone(),
                to_method: self.method.clone(),
                ..CallFilter::default()
            },
            Direction::From => CallFilter {
                from_class: self.class.clone(),
                from_method: self.method.clone(),
                ..CallFilter::default()
            },
        }
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
