//! The `analyze` command: queries, cross-references and drawings.

use anyhow::Result;
use engine::{open_backend, xref_calls, Analyzer, Backend, CallFilter};
use graph::{render, CallGraph, ClassGraph};
use ir::CallRecord;
use reporters::{Format, TableOptions};
use tracing::{info, warn};

use crate::args::{AnalyzeArgs, AnalyzeCmd, DrawArgs};
use crate::config::GraphConfig;

fn calls(backend: &dyn Backend, filter: &CallFilter) -> Result<Vec<CallRecord>> {
    Ok(backend
        .search_call(filter)?
        .into_iter()
        .map(|p| p.record)
        .collect())
}

fn draw(graph: &graph::Digraph, args: &DrawArgs, cfg: &GraphConfig) -> Result<()> {
    let format = args.graph_format.or(cfg.format).unwrap_or_default();
    let engine = args.engine.or(cfg.engine).unwrap_or_default();
    let extra = args.args.as_deref().or(cfg.args.as_deref());
    render(graph, format, engine, &args.output, extra)?;
    info!(path = %args.output.display(), "Wrote results");
    Ok(())
}

pub fn run_analyze(args: AnalyzeArgs, cfg: &GraphConfig) -> Result<()> {
    let backend = open_backend(&args.input)?;
    let backend = backend.as_ref();
    let fmt: Format = args.format.into();

    match args.command {
        AnalyzeCmd::Search(a) => {
            let results = backend.search(&a.pattern, a.table)?;
            info!(pattern = %a.pattern, results = results.len(), "Global search");
            reporters::print_search(&results, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Classes(a) => {
            let rows = backend.search_class(a.column, &a.pattern)?;
            reporters::print_table(&rows, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Properties(a) => {
            let rows = backend.search_property(a.column, &a.pattern)?;
            reporters::print_table(&rows, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Consts(a) => {
            let rows = backend.search_const_string(a.column, &a.pattern)?;
            reporters::print_table(&rows, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Methods(a) => {
            let rows = backend.search_method(a.column, &a.pattern)?;
            reporters::print_table(&rows, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Calls(a) => {
            let rows = backend.search_call(&a.filter.into())?;
            reporters::print_table(&rows, &a.table_args.into(), fmt)?;
        }
        AnalyzeCmd::Xref(a) => {
            let seed = calls(backend, &a.filter.into())?;
            let rows = xref_calls(backend, seed, a.direction, a.max_depth)?;
            let opts: TableOptions = a.table_args.into();
            reporters::print_table(&rows, &opts, fmt)?;
        }
        AnalyzeCmd::DrawClasses(a) => {
            let mut graph = ClassGraph::new();
            let rows = backend.search_class(a.column, &a.pattern)?;
            for row in &rows {
                if let Some(class) = backend.class_record(&row.name)? {
                    graph.add_class(&class);
                }
            }
            if rows.is_empty() {
                warn!("No classes matched");
            }
            draw(&graph.finish(), &a.draw, cfg)?;
        }
        AnalyzeCmd::DrawCalls(a) => {
            let found = calls(backend, &a.filter.into())?;
            if found.is_empty() {
                warn!("No calls matched, nothing drawn");
                return Ok(());
            }
            let mut graph = CallGraph::new();
            graph.extend(&found);
            draw(&graph.finish(), &a.draw, cfg)?;
        }
        AnalyzeCmd::DrawXref(a) => {
            let seed = calls(backend, &a.seed_filter())?;
            let found = xref_calls(backend, seed, a.direction, a.max_depth)?;
            let mut graph = CallGraph::new();
            graph.extend(&found);
            draw(&graph.finish(), &a.draw, cfg)?;
        }
    }
    Ok(())
}
