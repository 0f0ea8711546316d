#![allow(dead_code)]

use ir::{CallRecord, ProgramModel};
use std::fs;
use std::path::Path;

pub fn class_source(name: &str, method: &str, calls: &[(&str, &str)]) -> String {
    let mut src = format!(
        ".class public {name}\n.super Ljava/lang/Object;\n\n.field private count:I\n\n.method public {method}()V\n    const-string v0, \"{method}-tag\"\n"
    );
    for (class, target) in calls {
        src.push_str(&format!("    invoke-virtual {{v0}}, {class}->{target}()V\n"));
    }
    src.push_str("    return-void\n.end method\n");
    src
}

/// Tree with classes spread over several depths:
///
/// ```text
/// Loose.smali            LLoose;
/// a/A.smali              Lcom/app/A;  run  -> B.step
/// b/B.smali              Lcom/app/B;  step -> C.leaf
/// b/inner/Extra.smali    Lcom/app/Extra;
/// c/deep/C.smali         Lcom/app/C;  leaf -> Log.d
/// d/D.smali              Lcom/app/D;
/// e/                     (empty)
/// notes.txt
/// ```
pub fn write_tree(root: &Path) {
    let files = [
        ("Loose.smali", class_source("LLoose;", "main", &[("Lcom/app/A;", "run")])),
        ("a/A.smali", class_source("Lcom/app/A;", "run", &[("Lcom/app/B;", "step")])),
        ("b/B.smali", class_source("Lcom/app/B;", "step", &[("Lcom/app/C;", "leaf")])),
        ("b/inner/Extra.smali", class_source("Lcom/app/Extra;", "noop", &[])),
        ("c/deep/C.smali", class_source("Lcom/app/C;", "leaf", &[("Landroid/util/Log;", "d")])),
        ("d/D.smali", class_source("Lcom/app/D;", "idle", &[])),
        ("notes.txt", ".class public LNotSmali;\n".to_string()),
    ];
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    fs::create_dir_all(root.join("e")).unwrap();
}

pub fn chain_model() -> ProgramModel {
    let src = [
        class_source("Lcom/app/A;", "run", &[("Lcom/app/B;", "step")]),
        class_source("Lcom/app/B;", "step", &[("Lcom/app/C;", "leaf")]),
        class_source("Lcom/app/C;", "leaf", &[("Landroid/util/Log;", "d")]),
        class_source("Lcom/app/D;", "idle", &[]),
    ];
    src.iter()
        .flat_map(|s| parsers::parse_str(s))
        .collect()
}

pub fn edge(call: &CallRecord) -> (String, String) {
    (
        format!("{}{}", call.from_class, call.from_method),
        format!("{}{}", call.to_class, call.to_method),
    )
}
