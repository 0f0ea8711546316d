//! Header and status lines printed by the CLI.

use colored::*;
use std::env;

/// Check if colored output should be used
fn use_colored_output() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" || term == "unknown" {
            return false;
        }
    }
    if env::var("CI").is_ok() || env::var("CONTINUOUS_INTEGRATION").is_ok() {
        return false;
    }
    true
}

pub fn print_header() {
    let name = "smaliscan";
    let version = env!("CARGO_PKG_VERSION");
    if use_colored_output() {
        eprintln!("{} {} - static analysis of smali sources", name.bright_green().bold(), version);
    } else {
        eprintln!("{name} {version} - static analysis of smali sources");
    }
}

/// Prints `[TAG] message` to stderr.
pub fn print_status(tag: &str, message: &str) {
    if use_colored_output() {
        eprintln!("[{}] {}", tag.bright_blue().bold(), message);
    } else {
        eprintln!("[{tag}] {message}");
    }
}
