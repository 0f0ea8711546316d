//! Record types for the **program model** extracted from smali sources.
//!
//! The extractor emits [`ClassRecord`]s that own their properties, const
//! strings and methods. A [`ProgramModel`] keys them by class name and offers
//! the flattened views ([`ClassRow`], [`MethodRow`], ...) consumed by the
//! stores and reporters.

pub mod model;
pub mod records;

use serde::{Deserialize, Serialize};

pub use model::{ClassDump, ClassRow, MethodRow, ModelDump, ProgramModel};
pub use records::{
    depth_of, descriptor_body, package_of, CallRecord, ClassRecord, ConstStringRecord,
    MethodRecord, PropertyRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Row owned by a store, carrying the store-assigned identifier.
pub struct Persisted<T> {
    pub id: i64,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Persisted<T> {
    pub fn new(id: i64, record: T) -> Self {
        Self { id, record }
    }
}

impl<T> std::ops::Deref for Persisted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

#[cfg(test)]
mod tests;
