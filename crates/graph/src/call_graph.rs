use ir::CallRecord;
use std::collections::{HashMap, HashSet};

use crate::dot::{quote, Attrs, Digraph};
use crate::styles::call_graph as style;

/// Methods clustered by class, linked by call edges.
///
/// Each class seen as caller or callee gets a compound `cluster_<class>`
/// holding an invisible anchor node and its method nodes. Call edges live on
/// the top-level graph so they may cross clusters.
#[derive(Debug, Default)]
pub struct CallGraph {
    clusters: Vec<Digraph>,
    classes: HashMap<String, usize>,
    methods: HashSet<(String, String)>,
    edges: HashSet<(String, String)>,
    calls: Vec<(String, String)>,
}

/// Node id of a method: `<class>_<method>`.
pub fn method_node_id(class: &str, method: &str) -> String {
    format!("{class}_{method}")
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn cluster_index(&mut self, class: &str) -> usize {
        if let Some(idx) = self.classes.get(class) {
            return *idx;
        }
        let mut cluster = Digraph::named(format!("cluster_{class}"));
        cluster.body.push("compound = \"true\"".to_string());
        cluster.body.push(format!("label = {}", quote(class)));
        cluster.node(class, Attrs::from([("label", class), ("style", "invis")]));
        self.clusters.push(cluster);
        let idx = self.clusters.len() - 1;
        self.classes.insert(class.to_string(), idx);
        idx
    }

    fn add_method(&mut self, class: &str, method: &str) -> String {
        let idx = self.cluster_index(class);
        let id = method_node_id(class, method);
        if self.methods.insert((class.to_string(), method.to_string())) {
            let label = format!("[M] {method}\\l");
            let mut attrs = Attrs::from([("label", label.as_str())]);
            attrs.extend(style::METHOD_NODE);
            self.clusters[idx].node(id.clone(), attrs);
        }
        id
    }

    pub fn add_call(&mut self, call: &CallRecord) {
        // Both clusters exist before either method node is placed.
        self.cluster_index(&call.from_class);
        self.cluster_index(&call.to_class);
        let from = self.add_method(&call.from_class, &call.from_method);
        let to = self.add_method(&call.to_class, &call.to_method);
        if self.edges.insert((from.clone(), to.clone())) {
            self.calls.push((from, to));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.calls.len()
    }

    /// Styles every cluster and attaches it to the styled top-level graph.
    pub fn finish(self) -> Digraph {
        let mut graph = Digraph::new();
        for (from, to) in self.calls {
            let mut attrs = Attrs::new();
            attrs.extend(style::METHOD_EDGE);
            graph.edge(from, to, attrs);
        }
        for mut cluster in self.clusters {
            cluster.apply_styles(&style::CLUSTER);
            graph.subgraph(cluster);
        }
        graph.apply_styles(&style::GRAPH);
        graph
    }
}

impl<'a> Extend<&'a CallRecord> for CallGraph {
    fn extend<I: IntoIterator<Item = &'a CallRecord>>(&mut self, iter: I) {
        for call in iter {
            self.add_call(call);
        }
    }
}
