//! In-memory program model and its flattened views.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::records::{CallRecord, ClassRecord, ConstStringRecord, MethodRecord, PropertyRecord};

/// Flat view of a class without its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRow {
    pub name: String,
    #[serde(rename = "type")]
    pub class_type: String,
    pub package: String,
    pub parent: Option<String>,
    pub path: String,
    pub depth: usize,
}

impl From<&ClassRecord> for ClassRow {
    fn from(c: &ClassRecord) -> Self {
        Self {
            name: c.name().to_string(),
            class_type: c.class_type.clone(),
            package: c.package().to_string(),
            parent: c.parent.clone(),
            path: c.path.clone(),
            depth: c.depth(),
        }
    }
}

/// Flat view of a method without its calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRow {
    pub name: String,
    #[serde(rename = "type")]
    pub info: String,
    pub args: String,
    #[serde(rename = "return")]
    pub ret: String,
    pub class: String,
}

impl From<&MethodRecord> for MethodRow {
    fn from(m: &MethodRecord) -> Self {
        Self {
            name: m.name.clone(),
            info: m.info.clone(),
            args: m.args.clone(),
            ret: m.ret.clone(),
            class: m.class.clone(),
        }
    }
}

/// Classes keyed by name. Inserting a class whose name is already present
/// replaces the previous record.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    /// Root directory the classes were extracted from.
    pub location: Option<String>,
    /// Name and version of the tool that produced the model.
    pub parser: Option<String>,
    classes: BTreeMap<String, ClassRecord>,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a class, returning the record it replaced.
    ///
    /// # Example
    /// ```
    /// use ir::{ClassRecord, ProgramModel};
    /// let mut model = ProgramModel::new();
    /// model.insert(ClassRecord::new("La/B;", "public", "one.smali"));
    /// let old = model.insert(ClassRecord::new("La/B;", "final", "two.smali"));
    /// assert_eq!(old.unwrap().path, "one.smali");
    /// assert_eq!(model.len(), 1);
    /// assert_eq!(model.get("La/B;").unwrap().path, "two.smali");
    /// ```
    pub fn insert(&mut self, class: ClassRecord) -> Option<ClassRecord> {
        self.classes.insert(class.name().to_string(), class)
    }

    pub fn get(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    pub fn classes(&self) -> Vec<ClassRow> {
        self.iter().map(ClassRow::from).collect()
    }

    pub fn properties(&self) -> Vec<PropertyRecord> {
        self.iter()
            .flat_map(|c| c.properties.iter().cloned())
            .collect()
    }

    pub fn const_strings(&self) -> Vec<ConstStringRecord> {
        self.iter()
            .flat_map(|c| c.const_strings.iter().cloned())
            .collect()
    }

    pub fn methods(&self) -> Vec<MethodRow> {
        self.iter()
            .flat_map(|c| c.methods.iter().map(MethodRow::from))
            .collect()
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.iter().flat_map(|c| c.calls().cloned()).collect()
    }

    pub fn to_dump(&self) -> ModelDump {
        let classes = self
            .classes
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    ClassDump {
                        class_type: c.class_type.clone(),
                        parent: c.parent.clone(),
                        path: c.path.clone(),
                        package: c.package().to_string(),
                        depth: c.depth(),
                        properties: c.properties.clone(),
                        methods: c.methods.clone(),
                        const_strings: c.const_strings.clone(),
                    },
                )
            })
            .collect();
        ModelDump {
            parser: self.parser.clone(),
            location: self.location.clone(),
            classes,
        }
    }

    /// Rebuilds a model from a dump. Derived class fields are recomputed from
    /// the class names; the stored `package` and `depth` are ignored.
    pub fn from_dump(dump: ModelDump) -> Self {
        let mut model = ProgramModel {
            location: dump.location,
            parser: dump.parser,
            classes: BTreeMap::new(),
        };
        for (name, entry) in dump.classes {
            if name.is_empty() {
                continue;
            }
            let mut class = ClassRecord::new(name, entry.class_type, entry.path);
            class.parent = entry.parent;
            class.properties = entry.properties;
            class.methods = entry.methods;
            class.const_strings = entry.const_strings;
            model.insert(class);
        }
        model
    }

    /// Writes the model as pretty-printed JSON with a 4-space indent.
    pub fn write_json<W: Write>(&self, out: W) -> serde_json::Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(out, formatter);
        self.to_dump().serialize(&mut ser)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Extend<ClassRecord> for ProgramModel {
    fn extend<T: IntoIterator<Item = ClassRecord>>(&mut self, iter: T) {
        for class in iter {
            self.insert(class);
        }
    }
}

impl FromIterator<ClassRecord> for ProgramModel {
    fn from_iter<T: IntoIterator<Item = ClassRecord>>(iter: T) -> Self {
        let mut model = ProgramModel::new();
        model.extend(iter);
        model
    }
}

/// Serialized form of a [`ProgramModel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDump {
    #[serde(default)]
    pub parser: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDump>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDump {
    #[serde(rename = "type", default)]
    pub class_type: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    #[serde(rename = "const-strings", default)]
    pub const_strings: Vec<ConstStringRecord>,
}
