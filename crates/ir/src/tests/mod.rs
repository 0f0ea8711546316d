use super::*;
use serde_json::Value as JsonValue;

fn sample_class(name: &str, path: &str) -> ClassRecord {
    let mut class = ClassRecord::new(name, "public", path);
    class.parent = Some("Ljava/lang/Object;".into());
    class.properties.push(PropertyRecord {
        name: "count".into(),
        prop_type: "I".into(),
        info: "private".into(),
        class: name.into(),
    });
    class.const_strings.push(ConstStringRecord {
        var: "v0".into(),
        value: "hello".into(),
        class: name.into(),
    });
    class.methods.push(MethodRecord {
        name: "run".into(),
        args: "I".into(),
        ret: "V".into(),
        info: "public".into(),
        class: name.into(),
        calls: vec![CallRecord {
            from_class: name.into(),
            from_method: "run".into(),
            local_args: "{v0}".into(),
            to_class: "Lcom/a/C;".into(),
            to_method: "bar".into(),
            dst_args: "I".into(),
            ret: "V".into(),
            index: 0,
        }],
    });
    class
}

#[test]
fn package_and_depth_follow_the_name() {
    for (name, package, depth) in [
        ("Lcom/a/B;", "com.a", 3),
        ("Lcom/example/app/ui/MainActivity;", "com.example.app.ui", 5),
        ("LTopLevel;", "", 1),
        ("org/plain/Name", "org.plain", 3),
    ] {
        let c = ClassRecord::new(name, "", "");
        assert_eq!(c.package(), package, "package of {name}");
        assert_eq!(c.depth(), depth, "depth of {name}");
        assert_eq!(c.depth(), name.split('/').count());
    }
}

#[test]
fn inserting_same_name_replaces_instead_of_merging() {
    let mut model = ProgramModel::new();
    model.insert(sample_class("Lcom/a/B;", "first.smali"));
    let mut second = ClassRecord::new("Lcom/a/B;", "final", "second.smali");
    second.methods.clear();
    model.insert(second);

    assert_eq!(model.len(), 1);
    let stored = model.get("Lcom/a/B;").unwrap();
    assert_eq!(stored.path, "second.smali");
    assert!(stored.methods.is_empty());
    assert!(model.calls().is_empty());
}

#[test]
fn flattened_views_cover_every_child() {
    let model: ProgramModel = [
        sample_class("Lcom/a/B;", "b.smali"),
        sample_class("Lcom/a/C;", "c.smali"),
    ]
    .into_iter()
    .collect();

    assert_eq!(model.classes().len(), 2);
    assert_eq!(model.properties().len(), 2);
    assert_eq!(model.const_strings().len(), 2);
    assert_eq!(model.methods().len(), 2);
    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].from_class, "Lcom/a/B;");
    assert_eq!(calls[1].from_class, "Lcom/a/C;");

    let row = &model.classes()[0];
    assert_eq!(row.package, "com.a");
    assert_eq!(row.depth, 3);
    assert_eq!(row.parent.as_deref(), Some("Ljava/lang/Object;"));
}

#[test]
fn dump_uses_nested_class_layout() {
    let mut model = ProgramModel::new();
    model.location = Some("/tmp/app".into());
    model.insert(sample_class("Lcom/a/B;", "b.smali"));

    let json = model.to_json().unwrap();
    assert!(json.contains("\n    \"classes\""), "4-space indent expected");
    let v: JsonValue = serde_json::from_str(&json).unwrap();
    let class = &v["classes"]["Lcom/a/B;"];
    assert_eq!(class["type"], "public");
    assert_eq!(class["parent"], "Ljava/lang/Object;");
    assert_eq!(class["path"], "b.smali");
    assert_eq!(class["properties"][0]["name"], "count");
    assert_eq!(class["const-strings"][0]["value"], "hello");
    assert_eq!(class["methods"][0]["calls"][0]["to_method"], "bar");
    assert_eq!(v["location"], "/tmp/app");
}

#[test]
fn dump_reload_recomputes_derived_fields() {
    let mut model = ProgramModel::new();
    model.insert(sample_class("Lcom/a/B;", "b.smali"));
    let mut dump = model.to_dump();
    let entry = dump.classes.get_mut("Lcom/a/B;").unwrap();
    entry.package = "tampered".into();
    entry.depth = 42;

    let reloaded = ProgramModel::from_dump(dump);
    let class = reloaded.get("Lcom/a/B;").unwrap();
    assert_eq!(class.package(), "com.a");
    assert_eq!(class.depth(), 3);
    assert_eq!(class, model.get("Lcom/a/B;").unwrap());
}

#[test]
fn persisted_rows_flatten_their_record() {
    let row = Persisted::new(7, ClassRow::from(&sample_class("Lcom/a/B;", "b.smali")));
    let v = serde_json::to_value(&row).unwrap();
    assert_eq!(v["id"], 7);
    assert_eq!(v["name"], "Lcom/a/B;");
    assert_eq!(row.package, "com.a");
}
