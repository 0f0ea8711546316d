//! Fixed Graphviz styles. See <https://www.graphviz.org/doc/info/attrs.html>.

/// Graph, node and edge defaults applied to one graph or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSet {
    pub graph: &'static [(&'static str, &'static str)],
    pub nodes: &'static [(&'static str, &'static str)],
    pub edges: &'static [(&'static str, &'static str)],
}

pub mod class_graph {
    use super::StyleSet;

    pub const GRAPH: StyleSet = StyleSet {
        graph: &[("rankdir", "LR"), ("splines", "ortho"), ("bgcolor", "black")],
        nodes: &[
            ("shape", "record"),
            ("color", "orange"),
            ("fontcolor", "orange"),
            ("style", "filled"),
            ("fillcolor", "#1c1c1c"),
        ],
        edges: &[("color", "orange")],
    };

    pub const CLUSTER: StyleSet = StyleSet {
        graph: &[],
        nodes: &[
            ("shape", "note"),
            ("color", "#1e1e1e"),
            ("fontcolor", "white"),
            ("width", "10"),
        ],
        edges: &[("color", "#3B3131")],
    };

    /// Attributes of every class node.
    pub const CLASS_NODE: &[(&str, &str)] = &[
        ("color", "orange"),
        ("fontcolor", "grey"),
        ("style", "rounded"),
        ("shape", "note"),
    ];
}

pub mod call_graph {
    use super::StyleSet;

    pub const GRAPH: StyleSet = StyleSet {
        graph: &[
            ("rankdir", "LR"),
            ("splines", "false"),
            ("bgcolor", "black"),
            ("color", "yellow"),
            ("labeljust", "r"),
            ("fontcolor", "orange"),
            ("ranksep", "2.8 equally"),
            ("nodesep", ".05"),
        ],
        nodes: &[
            ("shape", "box3d"),
            ("color", "white"),
            ("fontcolor", "grey"),
            ("width", "7"),
        ],
        edges: &[("color", "orange"), ("style", "invis")],
    };

    pub const CLUSTER: StyleSet = StyleSet {
        graph: &[
            ("rankdir", "LR"),
            ("splines", "false"),
            ("labeljust", "r"),
            ("labelfontsize", "60.5"),
            ("color", "#B87333"),
        ],
        nodes: &[
            ("shape", "Mrecord"),
            ("color", "#3F602B"),
            ("fontcolor", "orange"),
            ("width", "7"),
        ],
        edges: &[("color", "orange"), ("style", "invis")],
    };

    pub const METHOD_NODE: &[(&str, &str)] = &[
        ("color", "#1c1c1c"),
        ("style", "filled"),
        ("shape", "box"),
        ("fontcolor", "orange"),
    ];

    /// Call edges override the invisible edge default.
    pub const METHOD_EDGE: &[(&str, &str)] = &[("color", "#3B3131"), ("style", "solid")];
}
