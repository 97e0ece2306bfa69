//! Script test runner
//!
//! Every `.rv` file found under the given paths is run in its own session.
//! A script passes when it exits with status 0 and records no faults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use raven::{report, EvalContext, Session};
use tracing::info;

use crate::read_script;

const EXTENSION: &str = "rv";

/// Collect scripts under `paths`, sorted per argument.
pub fn discover(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut scripts = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            discover_recursive(path, &mut found);
            found.sort();
            scripts.extend(found);
        } else {
            scripts.push(path.clone());
        }
    }
    scripts
}

fn discover_recursive(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }

        if path.is_dir() {
            discover_recursive(&path, found);
        } else if path.extension().is_some_and(|ext| ext == EXTENSION) {
            found.push(path);
        }
    }
}

/// Run every script. Returns whether all of them passed.
pub fn run(paths: &[PathBuf], ctx: EvalContext) -> Result<bool> {
    let scripts = discover(paths);
    info!(scripts = scripts.len(), "running script tests");

    let mut failed = Vec::new();
    for script in &scripts {
        let source = read_script(script)?;
        let status = Session::new(ctx.clone()).run(&source);

        if status.is_success() {
            println!("ok      {}", script.display());
        } else {
            println!("FAILED  {} (exit {})", script.display(), status.exit_code());
            let faults = status.faults();
            if !faults.is_empty() {
                eprintln!("{}\n", report::render_all(faults, &source));
            }
            failed.push(script);
        }
    }

    println!(
        "\n{} passed, {} failed, {} total",
        scripts.len() - failed.len(),
        failed.len(),
        scripts.len()
    );
    for script in &failed {
        println!("  failed: {}", script.display());
    }
    Ok(failed.is_empty())
}
