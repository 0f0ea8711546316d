//! Typed records produced by the fact extractor.
//!
//! Records own their children (a class owns its properties, const strings and
//! methods; a method owns its calls). Children only refer back to their owner
//! by name.

use serde::{Deserialize, Serialize};

/// Returns the slash separated body of a type descriptor.
///
/// `Lcom/a/B;` becomes `com/a/B`. Names that are not object descriptors are
/// returned untouched.
pub fn descriptor_body(name: &str) -> &str {
    name.strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap_or(name)
}

/// Package of a fully-qualified class name: every `/` segment except the
/// last one, joined with `.`.
///
/// # Example
/// ```
/// use ir::package_of;
/// assert_eq!(package_of("Lcom/a/B;"), "com.a");
/// assert_eq!(package_of("Lcom/B;"), "com");
/// assert_eq!(package_of("B"), "");
/// ```
pub fn package_of(name: &str) -> String {
    let body = descriptor_body(name);
    match body.rsplit_once('/') {
        Some((pkg, _)) => pkg.split('/').collect::<Vec<_>>().join("."),
        None => String::new(),
    }
}

/// Number of `/` separated segments of a class name.
pub fn depth_of(name: &str) -> usize {
    name.split('/').count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Modifier tokens such as `private static final`.
    pub info: String,
    /// Owning class name.
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstStringRecord {
    /// Register the string is loaded into.
    pub var: String,
    pub value: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRecord {
    pub from_class: String,
    pub from_method: String,
    /// Caller registers, braces included (`{v0, v1}`).
    pub local_args: String,
    pub to_class: String,
    pub to_method: String,
    pub dst_args: String,
    #[serde(rename = "return")]
    pub ret: String,
    /// Position of the call inside its method, starting at 0.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub args: String,
    #[serde(rename = "return")]
    pub ret: String,
    /// Modifier tokens such as `public static` or `constructor`.
    #[serde(rename = "type")]
    pub info: String,
    pub class: String,
    #[serde(default)]
    pub calls: Vec<CallRecord>,
}

/// A class declaration together with everything found inside it.
///
/// `package` and `depth` are derived from `name` when the record is built and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    name: String,
    package: String,
    depth: usize,
    pub class_type: String,
    pub path: String,
    pub parent: Option<String>,
    pub properties: Vec<PropertyRecord>,
    pub const_strings: Vec<ConstStringRecord>,
    pub methods: Vec<MethodRecord>,
}

impl ClassRecord {
    /// Creates an empty class record.
    ///
    /// # Example
    /// ```
    /// use ir::ClassRecord;
    /// let c = ClassRecord::new("Lcom/a/B;", "public", "B.smali");
    /// assert_eq!(c.package(), "com.a");
    /// assert_eq!(c.depth(), 3);
    /// ```
    pub fn new(
        name: impl Into<String>,
        class_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "class names are never empty");
        Self {
            package: package_of(&name),
            depth: depth_of(&name),
            name,
            class_type: class_type.into(),
            path: path.into(),
            parent: None,
            properties: Vec::new(),
            const_strings: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// All calls of all methods, in declaration order.
    pub fn calls(&self) -> impl Iterator<Item = &CallRecord> {
        self.methods.iter().flat_map(|m| m.calls.iter())
    }
}
