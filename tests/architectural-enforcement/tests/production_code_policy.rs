//! Integration Test: Production Code Policy
//!
//! **Policy**: Production code in `owen/core` MUST NOT:
//! - block a thread with `std::thread::sleep` (frames must never stall)
//! - wait on timers outside the clip module (only clip fades and
//!   completion polling may suspend)
//! - print to stdout/stderr (use `tracing`)
//! - `unwrap()` or `expect()` (propagate with `?` instead)
//!
//! Test modules (everything after `#[cfg(test)]`) and comment lines are exempt.

use std::fs;
use std::path::{Path, PathBuf};

/// Files allowed to await `tokio::time::sleep`
const TIMER_ALLOWED: &[&str] = &["clip/mod.rs"];

struct Violation {
    path: PathBuf,
    line: usize,
    rule: &'static str,
    text: String,
}

fn core_src() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(architectural_enforcement::CORE_SRC)
}

fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

fn find_violations() -> Vec<Violation> {
    let root = core_src();
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }

        let relative = path
            .strip_prefix(&root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let timers_allowed = TIMER_ALLOWED.contains(&relative.as_str());

        for (line, text) in production_lines(path) {
            let code = text.split("//").next().unwrap_or(&text);

            let rule = if code.contains("thread::sleep") {
                Some("blocking sleep")
            } else if code.contains("time::sleep(") && !timers_allowed {
                Some("timer outside the clip module")
            } else if code.contains("println!") || code.contains("eprintln!") || code.contains("dbg!") {
                Some("printing instead of tracing")
            } else if code.contains(".unwrap()") || code.contains(".expect(") {
                Some("unwrap/expect in production code")
            } else {
                None
            };

            if let Some(rule) = rule {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line,
                    rule,
                    text: text.trim().to_string(),
                });
            }
        }
    }

    violations
}

#[test]
fn test_core_sources_are_scanned() {
    let root = core_src();
    assert!(root.join("lib.rs").exists(), "missing {}", root.display());

    let files = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .count();
    assert!(files > 10, "expected the full core source tree, found {files} files");
}

#[test]
fn test_no_policy_violations_in_production_code() {
    let violations = find_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Production code policy violations:\n");
        for v in &violations {
            eprintln!("  ❌ {}:{} [{}] {}", v.path.display(), v.line, v.rule, v.text);
        }
        eprintln!("\n✅ Use tracing macros for output and `?` for errors.");
        eprintln!("✅ Only clip fades and completion polling may await timers.");

        panic!(
            "\nFound {} policy violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

#[test]
fn test_test_modules_are_exempt() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("sample.rs");
    fs::write(
        &file,
        "pub fn ok() -> u8 { 1 }\n// a.unwrap() in a comment\n#[cfg(test)]\nmod tests { fn t() { Some(1).unwrap(); } }\n",
    )
    .unwrap();

    let lines = production_lines(&file);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, 1);
}
