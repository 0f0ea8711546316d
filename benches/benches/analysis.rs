use benches::{bundle, write_tree};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::{scan, xref_calls, Direction, ScanOptions};
use graph::{CallGraph, ClassGraph};
use ir::ProgramModel;

fn bench_extraction(c: &mut Criterion) {
    let source = bundle(200);
    c.bench_function("extract_200_classes", |b| {
        b.iter(|| parsers::parse_str(black_box(&source)))
    });
}

fn bench_scan(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("temp dir");
    write_tree(tmp.path(), 16, 25).expect("write tree");
    for jobs in [1, 4] {
        let mut opts = ScanOptions::new(tmp.path());
        opts.jobs = jobs;
        c.bench_function(&format!("scan_400_files_jobs_{jobs}"), |b| {
            b.iter(|| scan(black_box(&opts)).expect("scan"))
        });
    }
}

fn model(total: usize) -> ProgramModel {
    parsers::parse_str(&bundle(total)).into_iter().collect()
}

fn bench_xref(c: &mut Criterion) {
    let model = model(500);
    let seed: Vec<_> = model.calls().into_iter().take(5).collect();
    c.bench_function("xref_depth_5", |b| {
        b.iter(|| xref_calls(&model, black_box(seed.clone()), Direction::To, 5).expect("xref"))
    });
}

fn bench_graphs(c: &mut Criterion) {
    let model = model(500);
    let calls = model.calls();
    c.bench_function("call_graph_3000_calls", |b| {
        b.iter(|| {
            let mut g = CallGraph::new();
            g.extend(black_box(&calls));
            g.finish().to_dot()
        })
    });
    c.bench_function("class_graph_500_classes", |b| {
        b.iter(|| {
            let mut g = ClassGraph::new();
            g.extend(black_box(model.iter()));
            g.finish().to_dot()
        })
    });
}

criterion_group!(benches, bench_extraction, bench_scan, bench_xref, bench_graphs);
criterion_main!(benches);
