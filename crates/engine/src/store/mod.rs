//! Repository-style persistence of the program model.
//!
//! Every record kind has a natural key. Adding a row whose key is already
//! stored replaces the old row; the replacement gets a fresh id.

use anyhow::Result;
use ir::{CallRecord, ClassRow, ConstStringRecord, MethodRow, Persisted, PropertyRecord};
use serde::Serialize;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Add and get operations for the five record kinds.
pub trait Store {
    fn add_class(&mut self, class: &ClassRow) -> Result<i64>;
    fn add_property(&mut self, property: &PropertyRecord) -> Result<i64>;
    fn add_const_string(&mut self, const_string: &ConstStringRecord) -> Result<i64>;
    fn add_method(&mut self, method: &MethodRow) -> Result<i64>;
    fn add_call(&mut self, call: &CallRecord) -> Result<i64>;

    fn get_classes(&self) -> Result<Vec<Persisted<ClassRow>>>;
    fn get_properties(&self) -> Result<Vec<Persisted<PropertyRecord>>>;
    fn get_const_strings(&self) -> Result<Vec<Persisted<ConstStringRecord>>>;
    fn get_methods(&self) -> Result<Vec<Persisted<MethodRow>>>;
    fn get_calls(&self) -> Result<Vec<Persisted<CallRecord>>>;

    /// Starts a batch of writes. Backends without transactions ignore it.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn get_class(&self, name: &str) -> Result<Option<Persisted<ClassRow>>> {
        Ok(self.get_classes()?.into_iter().find(|c| c.name == name))
    }

    fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            classes: self.get_classes()?.len(),
            properties: self.get_properties()?.len(),
            const_strings: self.get_const_strings()?.len(),
            methods: self.get_methods()?.len(),
            calls: self.get_calls()?.len(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub classes: usize,
    pub properties: usize,
    pub const_strings: usize,
    pub methods: usize,
    pub calls: usize,
}

pub(crate) type ClassKey = (String, String, usize, String);
pub(crate) type PropertyKey = (String, String, String, String);
pub(crate) type ConstKey = (String, String, String);
pub(crate) type MethodKey = (String, String, String, String, String);
pub(crate) type CallKey = (String, String, usize, String, String, String);

pub(crate) fn class_key(c: &ClassRow) -> ClassKey {
    (c.name.clone(), c.class_type.clone(), c.depth, c.path.clone())
}

pub(crate) fn property_key(p: &PropertyRecord) -> PropertyKey {
    (
        p.name.clone(),
        p.prop_type.clone(),
        p.info.clone(),
        p.class.clone(),
    )
}

pub(crate) fn const_key(c: &ConstStringRecord) -> ConstKey {
    (c.var.clone(), c.value.clone(), c.class.clone())
}

pub(crate) fn method_key(m: &MethodRow) -> MethodKey {
    (
        m.name.clone(),
        m.info.clone(),
        m.args.clone(),
        m.ret.clone(),
        m.class.clone(),
    )
}

pub(crate) fn call_key(c: &CallRecord) -> CallKey {
    (
        c.from_class.clone(),
        c.from_method.clone(),
        c.index,
        c.to_class.clone(),
        c.to_method.clone(),
        c.dst_args.clone(),
    )
}
