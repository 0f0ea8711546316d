#![no_main]
use graph::{CallGraph, ClassGraph};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let classes = parsers::parse_source("fuzz.smali", s);
        let mut classes_graph = ClassGraph::new();
        classes_graph.extend(&classes);
        let _ = classes_graph.finish().to_dot();
        let mut calls_graph = CallGraph::new();
        for class in &classes {
            calls_graph.extend(class.calls());
        }
        let _ = calls_graph.finish().to_dot();
    }
});
