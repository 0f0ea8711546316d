use super::*;

const SAMPLE: &str = r#"
.class public Lcom/a/B;
.super Ljava/lang/Object;
.source "B.java"

# instance fields
.field private count:I

.field public static final TAG:Ljava/lang/String; = "B"

# direct methods
.method public constructor <init>()V
    .locals 0
    invoke-direct {p0}, Ljava/lang/Object;-><init>()V
    return-void
.end method

.method public final foo(I)Z
    .locals 2
    const-string v0, "secret"
    invoke-virtual {v0}, Lcom/a/C;->bar(I)V
    invoke-static {p1}, Lcom/a/D;->baz(I)I
    move-result v1
    const/4 v0, 0x1
    return v0
.end method
"#;

#[test]
fn sample_class_is_fully_extracted() {
    let classes = parse_source("B.smali", SAMPLE);
    assert_eq!(classes.len(), 1);
    let c = &classes[0];
    assert_eq!(c.name(), "Lcom/a/B;");
    assert_eq!(c.package(), "com.a");
    assert_eq!(c.depth(), 3);
    assert_eq!(c.class_type, "public");
    assert_eq!(c.path, "B.smali");
    assert_eq!(c.parent.as_deref(), Some("Ljava/lang/Object;"));

    let props: Vec<_> = c.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(props, ["count", "TAG"]);
    assert_eq!(c.properties[1].info, "public static final");
    assert!(c.properties.iter().all(|p| p.class == "Lcom/a/B;"));

    assert_eq!(c.const_strings.len(), 1);
    assert_eq!(c.const_strings[0].value, "secret");

    let foo = &c.methods[1];
    assert_eq!((foo.name.as_str(), foo.args.as_str(), foo.ret.as_str()), ("foo", "I", "Z"));
    assert_eq!(foo.info, "public final");
    let indices: Vec<_> = foo.calls.iter().map(|k| k.index).collect();
    assert_eq!(indices, [0, 1]);
    assert_eq!(foo.calls[0].to_class, "Lcom/a/C;");
    assert_eq!(foo.calls[0].to_method, "bar");
    assert_eq!(foo.calls[0].from_method, "foo");
    assert_eq!(foo.calls[1].to_method, "baz");

    let init = &c.methods[0];
    assert_eq!(init.calls.len(), 1);
    assert_eq!(init.calls[0].index, 0);
}

#[test]
fn facts_before_any_class_are_dropped() {
    let mut ctx = FileContext::new("orphan.smali");
    assert!(!ctx.feed_line(".field private x:I"));
    assert!(!ctx.feed_line(".method public run()V"));
    assert!(!ctx.feed_line("invoke-static {}, La/B;->c()V"));
    assert_eq!(ctx.dropped(), 3);
    assert!(ctx.finish().is_empty());
}

#[test]
fn call_without_open_method_is_dropped() {
    let mut ctx = FileContext::new("x.smali");
    assert!(ctx.feed_line(".class public La/B;"));
    assert!(!ctx.feed_line("invoke-static {}, La/B;->c()V"));
    assert!(ctx.current_method().is_none());
    let classes = ctx.finish();
    assert!(classes[0].calls().next().is_none());
}

#[test]
fn class_fact_closes_the_open_method() {
    let src = "\
.class public La/First;
.method public run()V
invoke-static {}, La/X;->one()V
.class public La/Second;
invoke-static {}, La/X;->two()V
.method public go()V
invoke-static {}, La/X;->three()V
";
    let mut ctx = FileContext::new("multi.smali");
    for line in src.lines() {
        ctx.feed_line(line);
    }
    assert_eq!(ctx.dropped(), 1);
    assert_eq!(ctx.call_index(), 1);
    let classes = ctx.finish();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].calls().count(), 1);
    let second: Vec<_> = classes[1].calls().collect();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].to_method, "three");
    assert_eq!(second[0].index, 0);
    assert_eq!(second[0].from_class, "La/Second;");
}

#[test]
fn call_index_restarts_for_each_method() {
    let src = "\
.class La/B;
.method a()V
invoke-static {}, La/X;->one()V
invoke-static {}, La/X;->two()V
.end method
.method b()V
invoke-static {}, La/X;->three()V
";
    let classes = parse_source("b.smali", src);
    let calls: Vec<_> = classes[0]
        .calls()
        .map(|c| (c.from_method.as_str(), c.index))
        .collect();
    assert_eq!(calls, [("a", 0), ("a", 1), ("b", 0)]);
}

#[test]
fn parser_counts_files_and_skips_unreadable_ones() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("B.smali");
    std::fs::write(&good, SAMPLE).unwrap();
    let other = dir.path().join("notes.txt");
    std::fs::write(&other, ".class public LIgnored;").unwrap();
    let missing = dir.path().join("Gone.smali");

    let mut parser = SmaliParser::default();
    parser.parse_files([good.as_path(), other.as_path(), missing.as_path()]);

    let metrics = *parser.metrics();
    assert_eq!(metrics.files_parsed, 1);
    assert_eq!(metrics.classes_found, 1);
    assert_eq!(metrics.parse_errors, 1);
    let classes = parser.into_classes();
    assert_eq!(classes[0].path, good.to_string_lossy());
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bad.smali");
    let mut bytes = b".class public La/Bad;\n    const-string v0, \"caf".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(b"\"\n");
    std::fs::write(&path, bytes).unwrap();

    let mut parser = SmaliParser::new("smali");
    assert_eq!(parser.parse_file(&path).unwrap(), 1);
    let class = &parser.classes()[0];
    assert!(class.const_strings[0].value.starts_with("caf"));
}

#[test]
fn parse_location_walks_the_whole_tree() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    std::fs::create_dir_all(base.join("com/a")).unwrap();
    std::fs::write(base.join("com/a/B.smali"), SAMPLE).unwrap();
    std::fs::write(base.join("Top.smali"), ".class public LTop;\n").unwrap();

    let mut parser = SmaliParser::default();
    parser.parse_location(base).unwrap();
    let names: Vec<_> = parser.classes().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["LTop;", "Lcom/a/B;"]);
    assert_eq!(parser.metrics().files_parsed, 2);
}

#[test]
fn parsing_the_same_file_twice_merges_into_one_equal_record() {
    let once = parse_source("B.smali", SAMPLE);
    let mut parser = SmaliParser::default();
    parser.parse_str("B.smali", SAMPLE);
    parser.parse_str("B.smali", SAMPLE);
    let twice = parser.into_classes();
    assert_eq!(twice.len(), 2);

    let model: ir::ProgramModel = twice.into_iter().collect();
    assert_eq!(model.len(), 1);
    let stored = model.get("Lcom/a/B;").unwrap();
    let single = &once[0];
    assert_eq!(stored.properties, single.properties);
    assert_eq!(stored.const_strings, single.const_strings);
    assert_eq!(stored.methods, single.methods);
    let indices: Vec<_> = stored.calls().map(|c| c.index).collect();
    assert_eq!(indices, [0, 0, 1]);
    assert_eq!(stored, single);
}

#[test]
fn parser_accepts_the_files_the_walker_collects() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("A.smali"), SAMPLE).unwrap();
    std::fs::write(dir.path().join("A.java"), "class A {}").unwrap();
    let parser = SmaliParser::default();
    let collected = loader::collect_files(dir.path(), parser.suffix(), &|_| false).unwrap();
    assert_eq!(collected.len(), 1);
    assert!(collected.iter().all(|p| parser.accepts(p)));
    assert!(!parser.accepts(&dir.path().join("A.java")));
    assert!(!has_suffix(dir.path(), "smali"));
}
