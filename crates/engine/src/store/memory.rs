use anyhow::Result;
use ir::{
    CallRecord, ClassRow, ConstStringRecord, MethodRow, Persisted, ProgramModel, PropertyRecord,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use super::{
    call_key, class_key, const_key, method_key, property_key, CallKey, ClassKey, ConstKey,
    MethodKey, PropertyKey, Store,
};
use crate::analysis::{Analyzer, CallFilter, ClassColumn, ConstColumn, MethodColumn, PropertyColumn};
use crate::export::export_model;
use crate::xref::{CallIndex, Direction};

/// Rows of one record kind, keyed by id and indexed by natural key.
#[derive(Debug)]
struct Table<K, T> {
    rows: BTreeMap<i64, T>,
    keys: HashMap<K, i64>,
}

impl<K, T> Default for Table<K, T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, T: Clone> Table<K, T> {
    /// Inserts `row`, replacing any row with the same key. The new id
    /// follows the largest id present before the insert.
    fn upsert(&mut self, key: K, row: T) -> i64 {
        let id = self.rows.keys().next_back().map_or(1, |last| last + 1);
        if let Some(old) = self.keys.remove(&key) {
            self.rows.remove(&old);
        }
        self.rows.insert(id, row);
        self.keys.insert(key, id);
        id
    }

    fn select<F>(&self, mut pred: F) -> Vec<Persisted<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.rows
            .iter()
            .filter(|(_, row)| pred(row))
            .map(|(id, row)| Persisted::new(*id, row.clone()))
            .collect()
    }

    fn all(&self) -> Vec<Persisted<T>> {
        self.select(|_| true)
    }
}

/// In-memory backend. Used for dumps loaded from JSON and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    classes: Table<ClassKey, ClassRow>,
    properties: Table<PropertyKey, PropertyRecord>,
    const_strings: Table<ConstKey, ConstStringRecord>,
    methods: Table<MethodKey, MethodRow>,
    calls: Table<CallKey, CallRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_model(model: &ProgramModel) -> Result<Self> {
        let mut store = Self::new();
        export_model(model, &mut store)?;
        Ok(store)
    }
}

impl Store for MemoryStore {
    fn add_class(&mut self, class: &ClassRow) -> Result<i64> {
        Ok(self.classes.upsert(class_key(class), class.clone()))
    }

    fn add_property(&mut self, property: &PropertyRecord) -> Result<i64> {
        Ok(self
            .properties
            .upsert(property_key(property), property.clone()))
    }

    fn add_const_string(&mut self, const_string: &ConstStringRecord) -> Result<i64> {
        Ok(self
            .const_strings
            .upsert(const_key(const_string), const_string.clone()))
    }

    fn add_method(&mut self, method: &MethodRow) -> Result<i64> {
        Ok(self.methods.upsert(method_key(method), method.clone()))
    }

    fn add_call(&mut self, call: &CallRecord) -> Result<i64> {
        Ok(self.calls.upsert(call_key(call), call.clone()))
    }

    fn get_classes(&self) -> Result<Vec<Persisted<ClassRow>>> {
        Ok(self.classes.all())
    }

    fn get_properties(&self) -> Result<Vec<Persisted<PropertyRecord>>> {
        Ok(self.properties.all())
    }

    fn get_const_strings(&self) -> Result<Vec<Persisted<ConstStringRecord>>> {
        Ok(self.const_strings.all())
    }

    fn get_methods(&self) -> Result<Vec<Persisted<MethodRow>>> {
        Ok(self.methods.all())
    }

    fn get_calls(&self) -> Result<Vec<Persisted<CallRecord>>> {
        Ok(self.calls.all())
    }
}

impl Analyzer for MemoryStore {
    fn search_class(&self, column: ClassColumn, pattern: &str) -> Result<Vec<Persisted<ClassRow>>> {
        Ok(self
            .classes
            .select(|row| column.value(row).contains(pattern)))
    }

    fn search_property(
        &self,
        column: PropertyColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<PropertyRecord>>> {
        Ok(self
            .properties
            .select(|row| column.value(row).contains(pattern)))
    }

    fn search_const_string(
        &self,
        column: ConstColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<ConstStringRecord>>> {
        Ok(self
            .const_strings
            .select(|row| column.value(row).contains(pattern)))
    }

    fn search_method(
        &self,
        column: MethodColumn,
        pattern: &str,
    ) -> Result<Vec<Persisted<MethodRow>>> {
        Ok(self
            .methods
            .select(|row| column.value(row).contains(pattern)))
    }

    fn search_call(&self, filter: &CallFilter) -> Result<Vec<Persisted<CallRecord>>> {
        Ok(self.calls.select(|call| filter.matches(call)))
    }
}

impl CallIndex for MemoryStore {
    fn calls_touching(
        &self,
        classes: &BTreeSet<String>,
        direction: Direction,
    ) -> Result<Vec<CallRecord>> {
        Ok(self
            .calls
            .select(|call| classes.contains(direction.queried_class(call)))
            .into_iter()
            .map(|p| p.record)
            .collect())
    }
}
