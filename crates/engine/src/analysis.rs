//! Query capability shared by every backend.

use anyhow::Result;
use ir::{
    CallRecord, ClassRecord, ClassRow, ConstStringRecord, MethodRecord, MethodRow, Persisted,
    PropertyRecord,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declares a searchable column enum with its user facing and SQL names
/// and the accessor used by in-memory backends.
macro_rules! columns {
    (
        $(#[$meta:meta])*
        $name:ident for $row:ty {
            $($variant:ident => ($label:literal, $sql:literal, |$r:ident| $get:expr)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub(crate) fn sql(self) -> &'static str {
                match self {
                    $($name::$variant => $sql),+
                }
            }

            pub fn value(self, row: &$row) -> &str {
                match self {
                    $($name::$variant => { let $r = row; $get }),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|c| c.as_str() == s)
                    .ok_or_else(|| {
                        let names: Vec<_> = $name::ALL.iter().map(|c| c.as_str()).collect();
                        format!("unknown column '{s}', expected one of: {}", names.join(", "))
                    })
            }
        }
    };
}

columns! {
    /// Searchable class columns.
    ClassColumn for ClassRow {
        Name => ("name", "name", |r| &r.name),
        Type => ("type", "class_type", |r| &r.class_type),
        Package => ("package", "package", |r| &r.package),
        Parent => ("parent", "parent", |r| r.parent.as_deref().unwrap_or("")),
        Path => ("path", "path", |r| &r.path),
    }
}

columns! {
    PropertyColumn for PropertyRecord {
        Name => ("name", "name", |r| &r.name),
        Type => ("type", "prop_type", |r| &r.prop_type),
        Info => ("info", "info", |r| &r.info),
        Class => ("class", "class", |r| &r.class),
    }
}

columns! {
    ConstColumn for ConstStringRecord {
        Var => ("var", "var", |r| &r.var),
        Value => ("value", "value", |r| &r.value),
        Class => ("class", "class", |r| &r.class),
    }
}

columns! {
    MethodColumn for MethodRow {
        Name => ("name", "name", |r| &r.name),
        Type => ("type", "method_type", |r| &r.info),
        Args => ("args", "args", |r| &r.args),
        Return => ("return", "ret", |r| &r.ret),
        Class => ("class", "class", |r| &r.class),
    }
}

/// Substring filters over calls. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallFilter {
    pub from_class: Option<String>,
    pub from_method: Option<String>,
    pub to_class: Option<String>,
    pub to_method: Option<String>,
    pub local_args: Option<String>,
    pub dst_args: Option<String>,
}

impl CallFilter {
    /// `(sql column, pattern)` pairs of the fields that are set.
    pub(crate) fn conditions(&self) -> Vec<(&'static str, &str)> {
        [
            ("from_class", &self.from_class),
            ("from_method", &self.from_method),
            ("to_class", &self.to_class),
            ("to_method", &self.to_method),
            ("local_args", &self.local_args),
            ("dst_args", &self.dst_args),
        ]
        .into_iter()
        .filter_map(|(col, v)| v.as_deref().map(|p| (col, p)))
        .collect()
    }

    pub fn matches(&self, call: &CallRecord) -> bool {
        fn hit(pattern: &Option<String>, value: &str) -> bool {
            pattern.as_deref().map_or(true, |p| value.contains(p))
        }
        hit(&self.from_class, &call.from_class)
            && hit(&self.from_method, &call.from_method)
            && hit(&self.to_class, &call.to_class)
            && hit(&self.to_method, &call.to_method)
            && hit(&self.local_args, &call.local_args)
            && hit(&self.dst_args, &call.dst_args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableKind {
    Classes,
    Properties,
    Consts,
    Methods,
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" | "classes" => Ok(TableKind::Classes),
            "property" | "properties" => Ok(TableKind::Properties),
            "const" | "consts" => Ok(TableKind::Consts),
            "method" | "methods" => Ok(TableKind::Methods),
            other => Err(format!("unknown table '{other}'")),
        }
    }
}

/// Matches of a global search, grouped by table and ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub classes: Vec<Persisted<ClassRow>>,
    pub properties: Vec<Persisted<PropertyRecord>>,
    pub const_strings: Vec<Persisted<ConstStringRecord>>,
    pub methods: Vec<Persisted<MethodRow>>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.classes.len() + self.properties.len() + self.const_strings.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unions per-column matches, keeping one row per id.
fn union_by_id<T, F>(columns: usize, mut search: F) -> Result<Vec<Persisted<T>>>
where
    F: FnMut(usize) -> Result<Vec<Persisted<T>>>,
{
    let mut rows = BTreeMap::new();
    for col in 0..columns {
        for row in search(col)? {
            rows.entry(row.id).or_insert(row);
        }
    }
    Ok(rows.into_values().collect())
}

/// Search operations over a stored program model.
///
/// Column searches match when the column contains `pattern`; an empty
/// pattern matches every row.
pub trait Analyzer {
    fn search_class(&self, column: ClassColumn, pattern: &str) -> Result<Vec<Persisted<ClassRow>>>;

    fn search_property(
        &self,
        column: PropertyColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<PropertyRecord>>>;

    fn search_const_string(
        &self,
        column: ConstColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<ConstStringRecord>>>;

    fn search_method(&self, column: MethodColumn, pattern: &str)
        -> Result<Vec<Persisted<MethodRow>>>;

    fn search_call(&self, filter: &CallFilter) -> Result<Vec<Persisted<CallRecord>>>;

    /// Looks for `pattern` in every column of every table, or of `table` only.
    fn search(&self, pattern: &str, table: Option<TableKind>) -> Result<SearchResults> {
        let wanted = |t: TableKind| table.map_or(true, |only| only == t);
        let mut results = SearchResults::default();
        if wanted(TableKind::Classes) {
            results.classes = union_by_id(ClassColumn::ALL.len(), |i| {
                self.search_class(ClassColumn::ALL[i], pattern)
            })?;
        }
        if wanted(TableKind::Properties) {
            results.properties = union_by_id(PropertyColumn::ALL.len(), |i| {
                self.search_property(PropertyColumn::ALL[i], pattern)
            })?;
        }
        if wanted(TableKind::Consts) {
            results.const_strings = union_by_id(ConstColumn::ALL.len(), |i| {
                self.search_const_string(ConstColumn::ALL[i], pattern)
            })?;
        }
        if wanted(TableKind::Methods) {
            results.methods = union_by_id(MethodColumn::ALL.len(), |i| {
                self.search_method(MethodColumn::ALL[i], pattern)
            })?;
        }
        Ok(results)
    }

    /// Rebuilds a class with its properties and methods, or `None` when no
    /// class has exactly this name. Calls are not attached.
    fn class_record(&self, name: &str) -> Result<Option<ClassRecord>> {
        let Some(row) = self
            .search_class(ClassColumn::Name, name)?
            .into_iter()
            .find(|c| c.name == name)
        else {
            return Ok(None);
        };
        let mut class =
            ClassRecord::new(row.name.clone(), row.class_type.clone(), row.path.clone());
        class.parent = row.parent.clone();
        class.properties = self
            .search_property(PropertyColumn::Class, name)?
            .into_iter()
            .filter(|p| p.class == name)
            .map(|p| p.record)
            .collect();
        class.methods = self
            .search_method(MethodColumn::Class, name)?
            .into_iter()
            .filter(|m| m.class == name)
            .map(|m| MethodRecord {
                name: m.record.name,
                args: m.record.args,
                ret: m.record.ret,
                info: m.record.info,
                class: m.record.class,
                calls: Vec::new(),
            })
            .collect();
        Ok(Some(class))
    }
}
