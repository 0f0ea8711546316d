use ir::ClassRecord;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::dot::{quote, Attrs, Digraph};
use crate::styles::class_graph as style;

/// Classes clustered by package.
///
/// Each package gets a `cluster_<package>` subgraph holding an anchor node
/// named after the package and one node per class, linked anchor to class.
#[derive(Debug, Default)]
pub struct ClassGraph {
    clusters: Vec<Digraph>,
    packages: HashMap<String, usize>,
    classes: HashSet<String>,
    edges: HashSet<(String, String)>,
}

/// Node id of a class.
pub fn class_node_id(name: &str) -> String {
    format!("{name}_class")
}

/// Record-style label listing the properties and methods of `class`.
pub fn class_label(class: &ClassRecord) -> String {
    let mut label = format!("--- {}\\r\\r", class.name());
    label.push_str("Properties:\\l\\l");
    for p in &class.properties {
        label.push_str(&format!("[P] {} {}\\l", p.prop_type, p.name));
    }
    label.push_str("\\l\\lMethods:\\l\\l");
    for m in &class.methods {
        label.push_str(&format!("[M] {} {}()\\l", m.info, m.name));
    }
    label
}

impl ClassGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn cluster(&mut self, package: &str) -> &mut Digraph {
        let idx = match self.packages.get(package) {
            Some(idx) => *idx,
            None => {
                let mut cluster = Digraph::named(format!("cluster_{package}"));
                cluster.body.push(format!("label = {}", quote(package)));
                cluster.node(package, Attrs::from([("label", package)]));
                self.clusters.push(cluster);
                self.packages.insert(package.to_string(), self.clusters.len() - 1);
                self.clusters.len() - 1
            }
        };
        &mut self.clusters[idx]
    }

    pub fn add_class(&mut self, class: &ClassRecord) {
        let package = class.package().to_string();
        let node = class_node_id(class.name());
        let new_node = self.classes.insert(node.clone());
        let new_edge = self.edges.insert((package.clone(), node.clone()));

        let cluster = self.cluster(&package);
        if new_node {
            let mut attrs = Attrs::from([("label", class_label(class).as_str())]);
            attrs.extend(style::CLASS_NODE);
            cluster.node(node.clone(), attrs);
        }
        if new_edge {
            cluster.edge(package, node, Attrs::new());
        } else {
            debug!(class = class.name(), "Class already drawn");
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Styles every cluster and attaches it to the styled top-level graph.
    pub fn finish(self) -> Digraph {
        let mut graph = Digraph::new();
        for mut cluster in self.clusters {
            cluster.apply_styles(&style::CLUSTER);
            graph.subgraph(cluster);
        }
        graph.apply_styles(&style::GRAPH);
        graph
    }
}

impl<'a> Extend<&'a ClassRecord> for ClassGraph {
    fn extend<I: IntoIterator<Item = &'a ClassRecord>>(&mut self, iter: I) {
        for class in iter {
            self.add_class(class);
        }
    }
}
