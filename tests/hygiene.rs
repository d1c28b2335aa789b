//! Hygiene: source-level budgets checked at test time.
//!
//! These tests scan the engine's production sources for patterns the crate
//! does not allow. Each pattern has a budget (zero everywhere today). Lines
//! are matched verbatim, comments included, so a budget cannot be dodged by
//! mentioning the pattern in prose either.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    // Panics. Input handlers run inside the host's event loop.
    Budget { pattern: ".unwrap()", max: 0, why: "propagate with ? or fall back" },
    Budget { pattern: ".expect(", max: 0, why: "propagate with ? or fall back" },
    Budget { pattern: "panic!(", max: 0, why: "return an EngineError" },
    Budget { pattern: "unreachable!(", max: 0, why: "make the match total" },
    Budget { pattern: "todo!(", max: 0, why: "finish the stub" },
    Budget { pattern: "unimplemented!(", max: 0, why: "finish the stub" },
    // Silent loss.
    Budget { pattern: "let _ =", max: 0, why: "inspect the result" },
    Budget { pattern: ".ok()", max: 0, why: "inspect the error" },
    // Output belongs to the host's tracing subscriber.
    Budget { pattern: "println!(", max: 0, why: "use tracing" },
    Budget { pattern: "eprintln!(", max: 0, why: "use tracing" },
    Budget { pattern: "dbg!(", max: 0, why: "remove before committing" },
    // Structure.
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete the dead code" },
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding sibling `_test.rs` files.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn count_in_source(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter().map(|(path, count)| format!("  {path}: {count}")).collect::<Vec<_>>().join("\n")
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "run from the crate root");
    assert!(files.iter().all(|f| !f.path.ends_with("_test.rs")));
}

#[test]
fn every_budget_holds() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let hits = count_in_source(&files, budget.pattern);
        let count: usize = hits.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            failures.push(format!(
                "`{}` budget exceeded: found {count}, max {} ({}).\n{}",
                budget.pattern,
                budget.max,
                budget.why,
                format_hits(&hits)
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn every_module_has_a_doc_header() {
    let missing: Vec<String> = source_files()
        .into_iter()
        .filter(|f| !f.content.trim_start().starts_with("//!"))
        .map(|f| f.path)
        .collect();
    assert!(missing.is_empty(), "modules without a //! header:\n{}", missing.join("\n"));
}
