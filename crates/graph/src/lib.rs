//! Graph builders for smaliscan.
//!
//! [`ClassGraph`] clusters classes by package and [`CallGraph`] clusters
//! methods by class. Both deduplicate nodes and edges however often the
//! same record is added, and [`finish`](CallGraph::finish) into a styled
//! [`Digraph`] ready for [`render::render`].

mod call_graph;
mod class_graph;
mod dot;
pub mod render;
pub mod styles;

pub use call_graph::{method_node_id, CallGraph};
pub use class_graph::{class_label, class_node_id, ClassGraph};
pub use dot::{quote, Attrs, Digraph, Edge, Node};
pub use render::{render, LayoutEngine, OutputFormat};

#[cfg(test)]
mod tests;
