//! Converters of smali sources to the program model used by the engine.

use serde::Serialize;
use std::ops::AddAssign;

pub mod smali;

pub use smali::{has_suffix, match_line, parse_source, Fact, FileContext, SmaliParser};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParserMetrics {
    pub files_parsed: usize,
    pub classes_found: usize,
    pub parse_errors: usize,
}

impl AddAssign for ParserMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.files_parsed += rhs.files_parsed;
        self.classes_found += rhs.classes_found;
        self.parse_errors += rhs.parse_errors;
    }
}

/// Extracts the classes of an in-memory smali source.
///
/// # Example
/// ```
/// use parsers::parse_str;
/// let classes = parse_str(".class public Lcom/a/B;\n.super Ljava/lang/Object;\n");
/// assert_eq!(classes[0].name(), "Lcom/a/B;");
/// assert_eq!(classes[0].package(), "com.a");
/// assert_eq!(classes[0].parent.as_deref(), Some("Ljava/lang/Object;"));
/// ```
pub fn parse_str(content: &str) -> Vec<ir::ClassRecord> {
    parse_source("<memory>", content)
}
