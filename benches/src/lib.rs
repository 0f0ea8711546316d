//! Synthetic smali inputs shared by the benchmarks.

use std::fs;
use std::io;
use std::path::Path;

/// Name of the `i`-th synthetic class, spread over ten packages.
pub fn class_name(i: usize) -> String {
    format!("Lbench/p{}/C{i};", i % 10)
}

/// One class with a few fields, const strings and methods. Each method
/// calls a method of the next two classes, wrapping at `total`.
pub fn class_source(i: usize, total: usize) -> String {
    let name = class_name(i);
    let mut src = format!(".class public {name}\n.super Ljava/lang/Object;\n\n");
    for f in 0..4 {
        src.push_str(&format!(".field private f{f}:Ljava/lang/String;\n"));
    }
    for m in 0..3 {
        src.push_str(&format!(".method public m{m}(ILjava/lang/String;)V\n"));
        src.push_str("    .registers 4\n");
        src.push_str(&format!("    const-string v0, \"value {i}.{m}\"\n"));
        for step in 1..=2 {
            let target = class_name((i + step) % total.max(1));
            src.push_str(&format!(
                "    invoke-virtual {{p0, v0}}, {target}->m{m}(ILjava/lang/String;)V\n"
            ));
        }
        src.push_str("    return-void\n.end method\n\n");
    }
    src
}

/// All classes concatenated into one source text.
pub fn bundle(total: usize) -> String {
    (0..total).map(|i| class_source(i, total)).collect()
}

/// Writes `dirs` directories of `per_dir` files each under `root`.
pub fn write_tree(root: &Path, dirs: usize, per_dir: usize) -> io::Result<()> {
    let total = dirs * per_dir;
    for d in 0..dirs {
        let dir = root.join(format!("d{d}"));
        fs::create_dir_all(&dir)?;
        for f in 0..per_dir {
            let i = d * per_dir + f;
            fs::write(dir.join(format!("C{i}.smali")), class_source(i, total))?;
        }
    }
    Ok(())
}
