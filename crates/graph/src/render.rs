//! Writes finished graphs, delegating image formats to Graphviz `dot`.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;
use tracing::{debug, info};

use crate::dot::Digraph;

/// Runs `program` with `input` on stdin and fails on a non-zero exit.
///
/// Stdin is fed from its own thread while stderr is collected, so a child
/// that writes a lot of diagnostics before reading cannot block on a full
/// pipe.
pub(crate) fn pipe_through(program: &str, args: &[String], input: &[u8]) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {program}"))?;
    let mut stdin = child.stdin.take().context("open stdin")?;
    let (written, out) = thread::scope(|s| {
        let writer = s.spawn(move || stdin.write_all(input));
        let out = child.wait_with_output();
        (writer.join(), out)
    });
    let out = out.with_context(|| format!("Failed to wait for {program}"))?;
    if !out.status.success() {
        bail!(
            "{program} exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    written
        .map_err(|_| anyhow!("stdin writer for {program} panicked"))?
        .with_context(|| format!("Failed to send input to {program}"))?;
    Ok(())
}

/// Name of the Graphviz executable.
pub const DOT_PROGRAM: &str = "dot";

macro_rules! names {
    ($name:ident, $what:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let names: Vec<_> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{s}', expected one of: {}", $what, names.join(", "))
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// DOT source, written without running Graphviz.
    #[default]
    Dot,
    Xdot,
    Png,
    Pdf,
    Jpg,
    Svg,
}

names!(OutputFormat, "format" {
    Dot => "dot",
    Xdot => "xdot",
    Png => "png",
    Pdf => "pdf",
    Jpg => "jpg",
    Svg => "svg",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    #[default]
    Dot,
    Neato,
    Circo,
    Twopi,
    Fdp,
    Sfdp,
    Nop,
}

names!(LayoutEngine, "layout engine" {
    Dot => "dot",
    Neato => "neato",
    Circo => "circo",
    Twopi => "twopi",
    Fdp => "fdp",
    Sfdp => "sfdp",
    Nop => "nop",
});

/// Arguments passed to `dot` for an output file.
pub fn dot_args(
    format: OutputFormat,
    engine: LayoutEngine,
    output: &Path,
    extra: Option<&str>,
) -> Result<Vec<String>> {
    let mut args = vec![
        format!("-K{engine}"),
        format!("-T{format}"),
        "-o".to_string(),
        output.display().to_string(),
    ];
    if let Some(extra) = extra.filter(|e| !e.trim().is_empty()) {
        let parts = shlex::split(extra)
            .ok_or_else(|| anyhow!("Invalid Graphviz arguments: {extra}"))?;
        args.extend(parts);
    }
    Ok(args)
}

/// Writes `graph` to `output`.
///
/// [`OutputFormat::Dot`] writes the DOT text directly. Every other format
/// pipes the DOT text to `dot` with the chosen engine, format and extra
/// arguments.
pub fn render(
    graph: &Digraph,
    format: OutputFormat,
    engine: LayoutEngine,
    output: &Path,
    extra: Option<&str>,
) -> Result<()> {
    let source = graph.to_dot();
    if format == OutputFormat::Dot {
        fs::write(output, source)
            .with_context(|| format!("Failed to write graph: {}", output.display()))?;
        info!(path = %output.display(), "Graph written");
        return Ok(());
    }

    let args = dot_args(format, engine, output, extra)?;
    debug!(program = DOT_PROGRAM, args = ?args, "Running Graphviz");
    pipe_through(DOT_PROGRAM, &args, source.as_bytes())
        .with_context(|| format!("Failed to run {DOT_PROGRAM}; is Graphviz installed?"))?;
    info!(path = %output.display(), format = %format, engine = %engine, "Graph rendered");
    Ok(())
}
