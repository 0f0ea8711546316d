//! Minimal Graphviz document model.

use crate::styles::StyleSet;

/// Ordered `key = value` attributes. Setting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn extend(&mut self, pairs: &[(&str, &str)]) {
        for (k, v) in pairs {
            self.set(*k, *v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_dot(&self) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, quote(v)))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Attrs {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut attrs = Attrs::new();
        attrs.extend(&pairs);
        attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub attrs: Attrs,
}

/// A directed graph or, when nested, a subgraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digraph {
    pub name: Option<String>,
    pub graph_attr: Attrs,
    pub node_attr: Attrs,
    pub edge_attr: Attrs,
    /// Raw statements emitted before the nodes, e.g. `label = "x"`.
    pub body: Vec<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Digraph>,
}

/// Quotes a DOT identifier or attribute value.
///
/// The line escapes `\l`, `\r` and `\n` pass through; any other backslash
/// is doubled so it can never swallow the closing quote.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if matches!(chars.peek(), Some('l' | 'r' | 'n')) => out.push('\\'),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Digraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn node(&mut self, id: impl Into<String>, attrs: Attrs) {
        self.nodes.push(Node {
            id: id.into(),
            attrs,
        });
    }

    pub fn edge(&mut self, from: impl Into<String>, to: impl Into<String>, attrs: Attrs) {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            attrs,
        });
    }

    pub fn subgraph(&mut self, graph: Digraph) {
        self.subgraphs.push(graph);
    }

    pub fn apply_styles(&mut self, styles: &StyleSet) {
        self.graph_attr.extend(styles.graph);
        self.node_attr.extend(styles.nodes);
        self.edge_attr.extend(styles.edges);
    }

    /// Exports the graph to Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut out = match &self.name {
            Some(name) => format!("digraph {} {{\n", quote(name)),
            None => String::from("digraph {\n"),
        };
        self.write_statements(&mut out, 1);
        out.push('}');
        out.push('\n');
        out
    }

    fn write_statements(&self, out: &mut String, level: usize) {
        let pad = "    ".repeat(level);
        for (kind, attrs) in [
            ("graph", &self.graph_attr),
            ("node", &self.node_attr),
            ("edge", &self.edge_attr),
        ] {
            if !attrs.is_empty() {
                out.push_str(&format!("{pad}{kind} {};\n", attrs.to_dot()));
            }
        }
        for line in &self.body {
            out.push_str(&format!("{pad}{line};\n"));
        }
        for node in &self.nodes {
            if node.attrs.is_empty() {
                out.push_str(&format!("{pad}{};\n", quote(&node.id)));
            } else {
                out.push_str(&format!("{pad}{} {};\n", quote(&node.id), node.attrs.to_dot()));
            }
        }
        for edge in &self.edges {
            let arrow = format!("{} -> {}", quote(&edge.from), quote(&edge.to));
            if edge.attrs.is_empty() {
                out.push_str(&format!("{pad}{arrow};\n"));
            } else {
                out.push_str(&format!("{pad}{arrow} {};\n", edge.attrs.to_dot()));
            }
        }
        for sub in &self.subgraphs {
            match &sub.name {
                Some(name) => out.push_str(&format!("{pad}subgraph {} {{\n", quote(name))),
                None => out.push_str(&format!("{pad}subgraph {{\n")),
            }
            sub.write_statements(out, level + 1);
            out.push_str(&format!("{pad}}}\n"));
        }
    }
}
