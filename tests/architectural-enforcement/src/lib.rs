//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce how the room is put
//! together:
//! - Only the overlay controller writes to the overlay registry
//! - Session code does file I/O through `tokio::fs`
//!
//! The checks are source scans. This library holds the shared walking and
//! line filtering; the rules live under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// A source line that broke a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.file.display(), self.line, self.text)
    }
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Non-test code lines of a file, comments stripped, with 1-based numbers
///
/// Everything from the first `#[cfg(test)]` on is treated as test code.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Scan the production lines of every file under `dir`
///
/// `is_violation` sees the file path (relative to the workspace root) and a
/// code line.
pub fn scan(dir: &str, is_violation: impl Fn(&Path, &str) -> bool) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();

        for (line, code) in production_lines(&content) {
            if is_violation(&relative, code) {
                violations.push(Violation {
                    file: relative.clone(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }

    violations
}

/// Print violations and fail the test
pub fn report(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s) of: {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let src = "fn a() {}\n// note\nfn b() {} // trailing\n#[cfg(test)]\nmod tests { fn c() {} }\n";
        let lines = production_lines(src);
        assert_eq!(lines, vec![(1, "fn a() {}"), (3, "fn b() {} ")]);
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
        assert!(!rust_files("room/core/src").is_empty());
    }
}
