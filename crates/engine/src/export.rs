use anyhow::Result;
use ir::{ClassRow, MethodRow, ProgramModel};
use serde::Serialize;
use std::fmt::Display;
use tracing::{info, warn};

use crate::store::Store;

/// Rows written by [`export_model`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub classes: usize,
    pub properties: usize,
    pub const_strings: usize,
    pub methods: usize,
    pub calls: usize,
    pub failed: usize,
}

fn record<E: Display>(
    res: Result<i64, E>,
    ok: &mut usize,
    failed: &mut usize,
    kind: &str,
    name: &str,
) {
    match res {
        Ok(_) => *ok += 1,
        Err(e) => {
            *failed += 1;
            warn!(kind, name, error = %e, "Insert failed, skipping");
        }
    }
}

/// Writes every record of `model` into `store`.
///
/// A failing insert is logged and the export continues; only failing to
/// open or commit the batch is an error.
pub fn export_model<S: Store + ?Sized>(model: &ProgramModel, store: &mut S) -> Result<ExportStats> {
    let mut stats = ExportStats::default();
    store.begin()?;
    for class in model.iter() {
        let res = store.add_class(&ClassRow::from(class));
        record(res, &mut stats.classes, &mut stats.failed, "class", class.name());
        for property in &class.properties {
            let res = store.add_property(property);
            record(res, &mut stats.properties, &mut stats.failed, "property", &property.name);
        }
        for const_string in &class.const_strings {
            let res = store.add_const_string(const_string);
            record(
                res,
                &mut stats.const_strings,
                &mut stats.failed,
                "const-string",
                &const_string.value,
            );
        }
        for method in &class.methods {
            let res = store.add_method(&MethodRow::from(method));
            record(res, &mut stats.methods, &mut stats.failed, "method", &method.name);
            for call in &method.calls {
                let res = store.add_call(call);
                record(res, &mut stats.calls, &mut stats.failed, "call", &call.to_method);
            }
        }
    }
    store.commit()?;
    info!(
        classes = stats.classes,
        properties = stats.properties,
        const_strings = stats.const_strings,
        methods = stats.methods,
        calls = stats.calls,
        failed = stats.failed,
        "Model exported"
    );
    Ok(stats)
}
