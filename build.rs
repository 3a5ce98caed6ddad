use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const SOURCE_DIR: &str = "src";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/packed-refs");

    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CC_STATUS_GIT_SHA={}", sha);

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let root = PathBuf::from(&manifest_dir);
    let mut files = Vec::new();
    collect_rust_files(&root.join(SOURCE_DIR), &mut files);
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let sources: Vec<(PathBuf, String)> = files
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let rel = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
            Some((rel, content))
        })
        .collect();

    let mut failures = Vec::new();
    failures.extend(line_limit_violations(&sources));
    failures.extend(dead_code_allow_violations(&sources));
    failures.extend(unserialized_env_mutations(&sources));

    if !failures.is_empty() {
        eprintln!("\n========================================");
        eprintln!("SOURCE CHECKS FAILED");
        eprintln!("========================================");
        for failure in &failures {
            eprintln!("  {}", failure);
        }
        eprintln!("========================================\n");
        panic!("Build failed: {} source check violation(s)", failures.len());
    }
}

fn collect_rust_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            files.push(path);
        }
    }
}

/// Files over the limit must be split into submodules.
fn line_limit_violations(sources: &[(PathBuf, String)]) -> Vec<String> {
    sources
        .iter()
        .filter_map(|(path, content)| {
            let lines = content.lines().filter(|l| !l.trim().is_empty()).count();
            (lines > MAX_LINES).then(|| {
                format!(
                    "{} - {} lines (max {}); split it into smaller modules",
                    path.display(),
                    lines,
                    MAX_LINES
                )
            })
        })
        .collect()
}

/// Unused code gets deleted, not silenced.
fn dead_code_allow_violations(sources: &[(PathBuf, String)]) -> Vec<String> {
    let mut violations = Vec::new();
    for (path, content) in sources {
        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code")
            {
                violations.push(format!(
                    "{}:{} - #[allow(dead_code)] is not allowed; delete the code or gate it with #[cfg(test)]",
                    path.display(),
                    i + 1
                ));
            }
        }
    }
    violations
}

/// Tests that touch process env must be `#[serial]`.
fn unserialized_env_mutations(sources: &[(PathBuf, String)]) -> Vec<String> {
    let mut violations = Vec::new();
    for (path, content) in sources {
        let mut has_serial = false;
        let mut in_test = false;
        let mut depth: i64 = 0;
        let mut test_line = 0;

        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
                has_serial = true;
            }
            if trimmed == "#[test]" || trimmed.starts_with("#[tokio::test") {
                in_test = true;
                depth = 0;
                test_line = i + 1;
            }
            if !in_test {
                continue;
            }

            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            let mutates = !trimmed.starts_with("//")
                && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"));
            if mutates && !has_serial {
                violations.push(format!(
                    "{}:{} - test mutates env without #[serial]",
                    path.display(),
                    test_line
                ));
                in_test = false;
                has_serial = false;
            } else if depth == 0 && line.contains('}') {
                in_test = false;
                has_serial = false;
            }
        }
    }
    violations
}
