use super::*;
use ir::{CallRecord, ClassRecord, MethodRecord, PropertyRecord};
use std::path::Path;

fn class(name: &str) -> ClassRecord {
    let mut c = ClassRecord::new(name, "public", format!("{name}.smali"));
    c.properties.push(PropertyRecord {
        name: "count".into(),
        prop_type: "I".into(),
        info: "private".into(),
        class: name.into(),
    });
    c.methods.push(MethodRecord {
        name: "run".into(),
        args: String::new(),
        ret: "V".into(),
        info: "public".into(),
        class: name.into(),
        calls: Vec::new(),
    });
    c
}

fn call(from: (&str, &str), to: (&str, &str)) -> CallRecord {
    CallRecord {
        from_class: from.0.into(),
        from_method: from.1.into(),
        local_args: "{v0}".into(),
        to_class: to.0.into(),
        to_method: to.1.into(),
        dst_args: String::new(),
        ret: "V".into(),
        index: 0,
    }
}

#[test]
fn class_graph_clusters_by_package() {
    let mut g = ClassGraph::new();
    g.add_class(&class("Lcom/a/One;"));
    g.add_class(&class("Lcom/b/Two;"));
    g.add_class(&class("Lcom/a/Three;"));
    assert_eq!(g.cluster_count(), 2);

    let graph = g.finish();
    let names: Vec<_> = graph
        .subgraphs
        .iter()
        .map(|s| s.name.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, ["cluster_com.a", "cluster_com.b"]);

    let first = &graph.subgraphs[0];
    // anchor plus two classes
    assert_eq!(first.nodes.len(), 3);
    assert_eq!(first.nodes[0].id, "com.a");
    assert_eq!(first.nodes[0].attrs.get("label"), Some("com.a"));
    assert_eq!(first.edges.len(), 2);
    assert_eq!(first.edges[1].from, "com.a");
    assert_eq!(first.edges[1].to, "Lcom/a/Three;_class");
}

#[test]
fn class_graph_ignores_repeated_classes() {
    let mut g = ClassGraph::new();
    let c = class("Lcom/a/One;");
    g.extend([&c, &c, &c]);
    let graph = g.finish();
    assert_eq!(graph.subgraphs.len(), 1);
    assert_eq!(graph.subgraphs[0].nodes.len(), 2);
    assert_eq!(graph.subgraphs[0].edges.len(), 1);
}

#[test]
fn class_label_lists_members() {
    let label = class_label(&class("Lcom/a/One;"));
    assert!(label.starts_with("--- Lcom/a/One;"));
    assert!(label.contains("[P] I count\\l"));
    assert!(label.contains("[M] public run()\\l"));
}

#[test]
fn class_graph_styles_applied_on_finish() {
    let mut g = ClassGraph::new();
    g.add_class(&class("Lcom/a/One;"));
    let graph = g.finish();
    assert_eq!(graph.graph_attr.get("splines"), Some("ortho"));
    assert_eq!(graph.node_attr.get("shape"), Some("record"));
    let cluster = &graph.subgraphs[0];
    assert_eq!(cluster.node_attr.get("shape"), Some("note"));
    assert_eq!(cluster.edge_attr.get("color"), Some("#3B3131"));
    assert_eq!(cluster.nodes[1].attrs.get("style"), Some("rounded"));
}

#[test]
fn call_graph_clusters_by_class() {
    let mut g = CallGraph::new();
    g.add_call(&call(("La/A;", "run"), ("La/B;", "go")));
    g.add_call(&call(("La/A;", "run"), ("La/B;", "stop")));
    g.add_call(&call(("La/B;", "go"), ("La/A;", "run")));
    assert_eq!(g.edge_count(), 3);

    let graph = g.finish();
    assert_eq!(graph.subgraphs.len(), 2);
    let a = &graph.subgraphs[0];
    assert_eq!(a.name.as_deref(), Some("cluster_La/A;"));
    assert!(a.body.contains(&"compound = \"true\"".to_string()));
    assert_eq!(a.nodes[0].id, "La/A;");
    assert_eq!(a.nodes[0].attrs.get("style"), Some("invis"));
    assert_eq!(a.nodes.len(), 2);

    let b = &graph.subgraphs[1];
    let ids: Vec<_> = b.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["La/B;", "La/B;_go", "La/B;_stop"]);
    assert_eq!(b.nodes[1].attrs.get("label"), Some("[M] go\\l"));

    assert_eq!(graph.edges.len(), 3);
    assert_eq!(graph.edges[0].from, "La/A;_run");
    assert_eq!(graph.edges[0].to, "La/B;_go");
    assert_eq!(graph.edges[0].attrs.get("style"), Some("solid"));
}

#[test]
fn call_graph_deduplicates_edges() {
    let mut g = CallGraph::new();
    let c = call(("La/A;", "run"), ("La/B;", "go"));
    let mut again = c.clone();
    again.index = 7;
    again.local_args = "{v1, v2}".into();
    g.extend([&c, &c, &again]);
    assert_eq!(g.edge_count(), 1);
    let graph = g.finish();
    assert_eq!(graph.edges.len(), 1);
    let nodes: usize = graph.subgraphs.iter().map(|s| s.nodes.len()).sum();
    assert_eq!(nodes, 4);
}

#[test]
fn call_graph_self_call_keeps_one_cluster() {
    let mut g = CallGraph::new();
    g.add_call(&call(("La/A;", "run"), ("La/A;", "run")));
    let graph = g.finish();
    assert_eq!(graph.subgraphs.len(), 1);
    assert_eq!(graph.subgraphs[0].nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn to_dot_quotes_identifiers_and_escapes_labels() {
    let mut graph = Digraph::new();
    graph.node("a\"b", Attrs::from([("label", "say \"hi\"\\l")]));
    graph.edge("a\"b", "c", Attrs::new());
    let mut sub = Digraph::named("cluster_x");
    sub.body.push("label = \"x\"".into());
    sub.node("c", Attrs::new());
    graph.subgraph(sub);

    let dot = graph.to_dot();
    assert!(dot.starts_with("digraph {\n"));
    assert!(dot.contains("    \"a\\\"b\" [label=\"say \\\"hi\\\"\\l\"];\n"));
    assert!(dot.contains("    \"a\\\"b\" -> \"c\";\n"));
    assert!(dot.contains(
        "    subgraph \"cluster_x\" {\n        label = \"x\";\n        \"c\";\n    }\n"
    ));
    assert!(dot.ends_with("}\n"));
}

#[test]
fn quote_doubles_stray_backslashes() {
    assert_eq!(quote("C:\\"), "\"C:\\\\\"");
    assert_eq!(quote("a\\tb"), "\"a\\\\tb\"");
    assert_eq!(quote("[P] I x\\l"), "\"[P] I x\\l\"");
    assert_eq!(quote("\\\""), "\"\\\\\\\"\"");

    let mut graph = Digraph::new();
    graph.node("n", Attrs::from([("label", "ends with \\")]));
    assert!(graph
        .to_dot()
        .contains("    \"n\" [label=\"ends with \\\\\"];\n"));
}

#[test]
fn attrs_replace_existing_keys() {
    let mut attrs = Attrs::from([("color", "red"), ("shape", "box")]);
    attrs.set("color", "blue");
    assert_eq!(attrs.get("color"), Some("blue"));
    let mut g = Digraph::new();
    g.node_attr = attrs;
    assert!(g.to_dot().contains("node [color=\"blue\", shape=\"box\"];"));
}

#[test]
fn formats_and_engines_parse() {
    assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
    assert_eq!("XDOT".parse::<OutputFormat>().unwrap(), OutputFormat::Xdot);
    assert_eq!("sfdp".parse::<LayoutEngine>().unwrap(), LayoutEngine::Sfdp);
    let err = "gif".parse::<OutputFormat>().unwrap_err();
    assert!(err.contains("dot, xdot, png, pdf, jpg, svg"));
    assert!("spring".parse::<LayoutEngine>().is_err());
}

#[test]
fn dot_args_split_extra_arguments() {
    let args = render::dot_args(
        OutputFormat::Png,
        LayoutEngine::Neato,
        Path::new("/tmp/out.png"),
        Some("-Gdpi=300 -Nfontname='DejaVu Sans'"),
    )
    .unwrap();
    assert_eq!(
        args,
        ["-Kneato", "-Tpng", "-o", "/tmp/out.png", "-Gdpi=300", "-Nfontname=DejaVu Sans"]
    );
    assert!(render::dot_args(
        OutputFormat::Png,
        LayoutEngine::Dot,
        Path::new("x"),
        Some("'unterminated")
    )
    .is_err());
}

#[test]
fn render_dot_writes_source() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("calls.dot");
    let mut g = CallGraph::new();
    g.add_call(&call(("La/A;", "run"), ("La/B;", "go")));
    let graph = g.finish();
    render(&graph, OutputFormat::Dot, LayoutEngine::Dot, &out, None).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, graph.to_dot());
    assert!(written.contains("\"La/A;_run\" -> \"La/B;_go\""));
}

#[cfg(unix)]
#[test]
fn chatty_child_does_not_stall_the_pipe() {
    let script = "head -c 1000000 /dev/zero >&2; cat > /dev/null".to_string();
    let input = vec![b'x'; 1_000_000];
    render::pipe_through("sh", &["-c".to_string(), script], &input).unwrap();
}

#[cfg(unix)]
#[test]
fn failing_child_reports_its_stderr() {
    let script = "cat > /dev/null; echo 'syntax error in line 1' >&2; exit 3".to_string();
    let err = render::pipe_through("sh", &["-c".to_string(), script], b"digraph {")
        .unwrap_err()
        .to_string();
    assert!(err.contains("syntax error in line 1"), "{err}");
}
