#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const MAIN: &str = r#".class public La/Main;
.super Ljava/lang/Object;

.field private static final API_KEY:Ljava/lang/String; = "k"

.method public run()V
    const-string v1, "api_key"
    invoke-virtual {v0, v1}, Lb/Net;->send(Ljava/lang/String;)V
    return-void
.end method
"#;

const NET: &str = r#".class public Lb/Net;
.super Ljava/lang/Object;

.method public send(Ljava/lang/String;)V
    new-instance v0, Ljava/net/URL;
    invoke-direct {v0, p1}, Ljava/net/URL;-><init>(Ljava/lang/String;)V
    return-void
.end method
"#;

/// `a/Main.smali` calls `b/Net.smali`, which calls into `java.net`.
pub fn write_app(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("a"))?;
    fs::create_dir_all(root.join("b"))?;
    fs::write(root.join("a/Main.smali"), MAIN)?;
    fs::write(root.join("b/Net.smali"), NET)?;
    fs::write(root.join("README.md"), "not smali")?;
    Ok(())
}

/// The binary with an isolated home directory and no colors.
pub fn smaliscan(home: &Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("smaliscan")?;
    cmd.env("HOME", home).env("NO_COLOR", "1");
    Ok(cmd)
}
