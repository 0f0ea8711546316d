use anyhow::{Context, Result};
use ir::{CallRecord, ClassRow, ConstStringRecord, MethodRow, Persisted, PropertyRecord};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use super::Store;
use crate::analysis::{Analyzer, CallFilter, ClassColumn, ConstColumn, MethodColumn, PropertyColumn};
use crate::xref::{CallIndex, Direction};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS classes (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        class_type TEXT NOT NULL,
        package TEXT NOT NULL,
        parent TEXT,
        path TEXT NOT NULL,
        depth INTEGER NOT NULL,
        UNIQUE (name, class_type, depth, path)
    );

    CREATE TABLE IF NOT EXISTS properties (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        prop_type TEXT NOT NULL,
        info TEXT NOT NULL,
        class TEXT NOT NULL,
        UNIQUE (name, prop_type, info, class)
    );

    CREATE TABLE IF NOT EXISTS const_strings (
        id INTEGER PRIMARY KEY,
        var TEXT NOT NULL,
        value TEXT NOT NULL,
        class TEXT NOT NULL,
        UNIQUE (var, value, class)
    );

    CREATE TABLE IF NOT EXISTS methods (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        method_type TEXT NOT NULL,
        args TEXT NOT NULL,
        ret TEXT NOT NULL,
        class TEXT NOT NULL,
        UNIQUE (name, method_type, args, ret, class)
    );

    CREATE TABLE IF NOT EXISTS calls (
        id INTEGER PRIMARY KEY,
        from_class TEXT NOT NULL,
        from_method TEXT NOT NULL,
        local_args TEXT NOT NULL,
        to_class TEXT NOT NULL,
        to_method TEXT NOT NULL,
        dst_args TEXT NOT NULL,
        ret TEXT NOT NULL,
        call_index INTEGER NOT NULL,
        UNIQUE (from_class, from_method, call_index, to_class, to_method, dst_args)
    );

    CREATE INDEX IF NOT EXISTS idx_calls_from_class ON calls(from_class);
    CREATE INDEX IF NOT EXISTS idx_calls_to_class ON calls(to_class);
";

/// Classes bound per `IN` list, well below SQLite's variable limit.
const CLASS_CHUNK: usize = 500;

const CLASS_COLS: &str = "id, name, class_type, package, parent, path, depth";
const PROPERTY_COLS: &str = "id, name, prop_type, info, class";
const CONST_COLS: &str = "id, var, value, class";
const METHOD_COLS: &str = "id, name, method_type, args, ret, class";
const CALL_COLS: &str =
    "id, from_class, from_method, local_args, to_class, to_method, dst_args, ret, call_index";

fn to_usize(v: i64) -> usize {
    usize::try_from(v).unwrap_or_default()
}

fn class_row(row: &Row<'_>) -> rusqlite::Result<Persisted<ClassRow>> {
    Ok(Persisted::new(
        row.get(0)?,
        ClassRow {
            name: row.get(1)?,
            class_type: row.get(2)?,
            package: row.get(3)?,
            parent: row.get(4)?,
            path: row.get(5)?,
            depth: to_usize(row.get(6)?),
        },
    ))
}

fn property_row(row: &Row<'_>) -> rusqlite::Result<Persisted<PropertyRecord>> {
    Ok(Persisted::new(
        row.get(0)?,
        PropertyRecord {
            name: row.get(1)?,
            prop_type: row.get(2)?,
            info: row.get(3)?,
            class: row.get(4)?,
        },
    ))
}

fn const_row(row: &Row<'_>) -> rusqlite::Result<Persisted<ConstStringRecord>> {
    Ok(Persisted::new(
        row.get(0)?,
        ConstStringRecord {
            var: row.get(1)?,
            value: row.get(2)?,
            class: row.get(3)?,
        },
    ))
}

fn method_row(row: &Row<'_>) -> rusqlite::Result<Persisted<MethodRow>> {
    Ok(Persisted::new(
        row.get(0)?,
        MethodRow {
            name: row.get(1)?,
            info: row.get(2)?,
            args: row.get(3)?,
            ret: row.get(4)?,
            class: row.get(5)?,
        },
    ))
}

fn call_row(row: &Row<'_>) -> rusqlite::Result<Persisted<CallRecord>> {
    Ok(Persisted::new(
        row.get(0)?,
        CallRecord {
            from_class: row.get(1)?,
            from_method: row.get(2)?,
            local_args: row.get(3)?,
            to_class: row.get(4)?,
            to_method: row.get(5)?,
            dst_args: row.get(6)?,
            ret: row.get(7)?,
            index: to_usize(row.get(8)?),
        },
    ))
}

/// SQLite backend. Natural keys are `UNIQUE` constraints and inserts use
/// `INSERT OR REPLACE`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        debug!(path = %path.display(), "Database opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create database schema")?;
        Ok(Self { conn })
    }

    fn query<T, F>(&self, sql: &str, args: &[&str], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Rows of `table` whose `column` contains `pattern`.
    fn search<T, F>(
        &self,
        table: &str,
        cols: &str,
        column: &str,
        pattern: &str,
        map: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        if pattern.is_empty() {
            return self.query(&format!("SELECT {cols} FROM {table} ORDER BY id"), &[], map);
        }
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE instr(COALESCE({column}, ''), ?1) > 0 ORDER BY id"
        );
        self.query(&sql, &[pattern], map)
    }
}

impl Store for SqliteStore {
    fn add_class(&mut self, class: &ClassRow) -> Result<i64> {
        self.conn.execute(
            "INSERT OR REPLACE INTO classes (name, class_type, package, parent, path, depth)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                class.name,
                class.class_type,
                class.package,
                class.parent,
                class.path,
                class.depth as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_property(&mut self, property: &PropertyRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT OR REPLACE INTO properties (name, prop_type, info, class)
             VALUES (?1, ?2, ?3, ?4)",
            params![property.name, property.prop_type, property.info, property.class],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_const_string(&mut self, const_string: &ConstStringRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT OR REPLACE INTO const_strings (var, value, class) VALUES (?1, ?2, ?3)",
            params![const_string.var, const_string.value, const_string.class],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_method(&mut self, method: &MethodRow) -> Result<i64> {
        self.conn.execute(
            "INSERT OR REPLACE INTO methods (name, method_type, args, ret, class)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![method.name, method.info, method.args, method.ret, method.class],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_call(&mut self, call: &CallRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT OR REPLACE INTO calls
             (from_class, from_method, local_args, to_class, to_method, dst_args, ret, call_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                call.from_class,
                call.from_method,
                call.local_args,
                call.to_class,
                call.to_method,
                call.dst_args,
                call.ret,
                call.index as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_classes(&self) -> Result<Vec<Persisted<ClassRow>>> {
        self.query(&format!("SELECT {CLASS_COLS} FROM classes ORDER BY id"), &[], class_row)
    }

    fn get_properties(&self) -> Result<Vec<Persisted<PropertyRecord>>> {
        self.query(
            &format!("SELECT {PROPERTY_COLS} FROM properties ORDER BY id"),
            &[],
            property_row,
        )
    }

    fn get_const_strings(&self) -> Result<Vec<Persisted<ConstStringRecord>>> {
        self.query(
            &format!("SELECT {CONST_COLS} FROM const_strings ORDER BY id"),
            &[],
            const_row,
        )
    }

    fn get_methods(&self) -> Result<Vec<Persisted<MethodRow>>> {
        self.query(&format!("SELECT {METHOD_COLS} FROM methods ORDER BY id"), &[], method_row)
    }

    fn get_calls(&self) -> Result<Vec<Persisted<CallRecord>>> {
        self.query(&format!("SELECT {CALL_COLS} FROM calls ORDER BY id"), &[], call_row)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn get_class(&self, name: &str) -> Result<Option<Persisted<ClassRow>>> {
        let rows = self.query(
            &format!("SELECT {CLASS_COLS} FROM classes WHERE name = ?1 ORDER BY id LIMIT 1"),
            &[name],
            class_row,
        )?;
        Ok(rows.into_iter().next())
    }
}

impl Analyzer for SqliteStore {
    fn search_class(&self, column: ClassColumn, pattern: &str) -> Result<Vec<Persisted<ClassRow>>> {
        self.search("classes", CLASS_COLS, column.sql(), pattern, class_row)
    }

    fn search_property(
        &self,
        column: PropertyColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<PropertyRecord>>> {
        self.search("properties", PROPERTY_COLS, column.sql(), pattern, property_row)
    }

    fn search_const_string(
        &self,
        column: ConstColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<ConstStringRecord>>> {
        self.search("const_strings", CONST_COLS, column.sql(), pattern, const_row)
    }

    fn search_method(
        &self,
        column: MethodColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<MethodRow>>> {
        self.search("methods", METHOD_COLS, column.sql(), pattern, method_row)
    }

    fn search_call(&self, filter: &CallFilter) -> Result<Vec<Persisted<CallRecord>>> {
        let conditions = filter.conditions();
        let mut sql = format!("SELECT {CALL_COLS} FROM calls");
        let mut args = Vec::with_capacity(conditions.len());
        for (i, (column, pattern)) in conditions.into_iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("instr({column}, ?{}) > 0", i + 1));
            args.push(pattern);
        }
        sql.push_str(" ORDER BY id");
        debug!(%sql, "Searching calls");
        self.query(&sql, &args, call_row)
    }
}

impl CallIndex for SqliteStore {
    fn calls_touching(
        &self,
        classes: &BTreeSet<String>,
        direction: Direction,
    ) -> Result<Vec<CallRecord>> {
        if classes.is_empty() {
            return Ok(Vec::new());
        }
        let column = match direction {
            Direction::To => "to_class",
            Direction::From => "from_class",
        };
        let names: Vec<&str> = classes.iter().map(String::as_str).collect();
        let mut found = Vec::new();
        for chunk in names.chunks(CLASS_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT {CALL_COLS} FROM calls WHERE {column} IN ({placeholders})");
            found.extend(self.query(&sql, chunk, call_row)?);
        }
        found.sort_by_key(|p| p.id);
        debug!(classes = names.len(), calls = found.len(), "Calls touching frontier");
        Ok(found.into_iter().map(|p| p.record).collect())
    }
}
