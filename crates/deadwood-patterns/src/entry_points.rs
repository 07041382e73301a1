//! Entry-point discovery.
//!
//! Entry points come from three sources, unioned in a fixed order with
//! first-seen deduplication: packaging metadata (`main` and `bin`),
//! CLI-conventional paths, and conventional application layouts. The
//! caller adds explicit configuration overrides on top.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// CLI-conventional files checked verbatim.
const CLI_PATHS: &[&str] = &[
    "src/cli/cli.ts",
    "src/cli/index.ts",
    "src/cli.ts",
    "cli/cli.ts",
    "cli/index.ts",
    "bin/cli.ts",
    "bin/index.ts",
];

/// Glob patterns widening the CLI conventions.
const CLI_GLOBS: &[&str] = &["src/cli/*.ts", "bin/*.ts"];

/// Conventional entry layouts, brace-expanded.
const CONVENTIONAL_PATHS: &[&str] = &[
    "src/index.{ts,tsx}",
    "src/main.{ts,tsx}",
    "index.{ts,tsx}",
    "main.{ts,tsx}",
    "src/app.{ts,tsx}",
    "app.{ts,tsx}",
    "src/server.{ts,tsx}",
    "server.{ts,tsx}",
];

/// Discover the project's entry points. Paths are canonical and
/// deduplicated preserving first-seen order. A missing or malformed
/// `package.json` is not an error.
pub fn discover_entry_points(root: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    fn push(path: PathBuf, seen: &mut HashSet<PathBuf>, entries: &mut Vec<PathBuf>) {
        if let Ok(canonical) = path.canonicalize() {
            if seen.insert(canonical.clone()) {
                entries.push(canonical);
            }
        }
    }

    // 1. Packaging metadata
    for declared in package_json_entries(root) {
        if let Some(resolved) = probe(&root.join(&declared)) {
            push(resolved, &mut seen, &mut entries);
        }
    }

    // 2. CLI conventions
    for candidate in CLI_PATHS {
        let path = root.join(candidate);
        if path.is_file() {
            push(path, &mut seen, &mut entries);
        }
    }
    for pattern in CLI_GLOBS {
        for path in glob_under(root, pattern) {
            push(path, &mut seen, &mut entries);
        }
    }

    // 3. Conventional entries
    for pattern in CONVENTIONAL_PATHS {
        for expanded in expand_braces(pattern) {
            let path = root.join(&expanded);
            if path.is_file() {
                push(path, &mut seen, &mut entries);
            }
        }
    }

    entries
}

/// `main` and `bin` values from package.json, declaration order.
fn package_json_entries(root: &Path) -> Vec<String> {
    let package_json = root.join("package.json");
    let content = match std::fs::read_to_string(&package_json) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };

    let package: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            warn!(file = %package_json.display(), error = %err, "unparseable package.json");
            return Vec::new();
        }
    };

    let mut declared = Vec::new();

    if let Some(main) = package.get("main").and_then(|v| v.as_str()) {
        declared.push(main.to_string());
    }

    match package.get("bin") {
        Some(serde_json::Value::String(bin)) => declared.push(bin.clone()),
        Some(serde_json::Value::Object(map)) => {
            for value in map.values() {
                if let Some(bin) = value.as_str() {
                    declared.push(bin.to_string());
                }
            }
        }
        _ => {}
    }

    declared
}

/// Probe a declared entry the way the resolver's fallback would: exact
/// file, compiled-output rewrites, appended extensions, index files.
/// `"main": "index.js"` routinely points at output that only exists as
/// `index.ts` in the source tree.
fn probe(declared: &Path) -> Option<PathBuf> {
    if declared.is_file() {
        return Some(declared.to_path_buf());
    }

    if let Some(ext) = declared.extension().and_then(|e| e.to_str()) {
        let rewrites: &[&str] = match ext {
            "js" => &["ts", "tsx"],
            "jsx" => &["tsx"],
            _ => &[],
        };
        for rewrite in rewrites {
            let candidate = declared.with_extension(rewrite);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    for ext in EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{ext}", declared.display()));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    if declared.is_dir() {
        for ext in EXTENSIONS {
            let candidate = declared.join(format!("index.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    None
}

/// Run a glob pattern rooted at `root`, sorted for stable ordering.
fn glob_under(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let absolute = format!("{}/{}", root.display(), pattern);
    let mut matches: Vec<PathBuf> = match glob::glob(&absolute) {
        Ok(paths) => paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect(),
        Err(_) => Vec::new(),
    };
    matches.sort();
    matches
}

/// Expand brace patterns like `index.{ts,tsx}` into concrete names.
/// The `glob` crate doesn't support brace expansion, so it happens here.
fn expand_braces(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let options = &pattern[start + 1..end];

            let mut results = Vec::new();
            for option in options.split(',') {
                let expanded = format!("{prefix}{option}{suffix}");
                results.extend(expand_braces(&expanded));
            }
            return results;
        }
    }

    vec![pattern.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_braces_simple() {
        assert_eq!(expand_braces("file.{ts,js}"), vec!["file.ts", "file.js"]);
    }

    #[test]
    fn test_expand_braces_no_braces() {
        assert_eq!(expand_braces("file.ts"), vec!["file.ts"]);
    }

    #[test]
    fn test_main_field_resolves_js_to_ts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("package.json"), r#"{ "main": "index.js" }"#).unwrap();
        fs::write(root.join("index.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("index.ts"));
    }

    #[test]
    fn test_bin_map_entries() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/cli")).unwrap();
        fs::write(
            root.join("package.json"),
            r#"{ "bin": { "tool": "src/cli/cli.ts" } }"#,
        )
        .unwrap();
        fs::write(root.join("src/cli/cli.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("cli.ts"));
    }

    #[test]
    fn test_bin_string_entry() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("package.json"), r#"{ "bin": "main.ts" }"#).unwrap();
        fs::write(root.join("main.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_conventional_entries_without_packaging() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/index.ts"), "").unwrap();
        fs::write(root.join("src/server.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("src/index.ts"));
        assert!(entries[1].ends_with("src/server.ts"));
    }

    #[test]
    fn test_missing_package_json_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(discover_entry_points(temp.path()).is_empty());
    }

    #[test]
    fn test_malformed_package_json_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("package.json"), "{ nope").unwrap();
        fs::write(root.join("index.ts"), "").unwrap();

        // Falls through to conventional discovery.
        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        // `main` points at the same file a convention would find.
        fs::write(root.join("package.json"), r#"{ "main": "index.ts" }"#).unwrap();
        fs::write(root.join("index.ts"), "").unwrap();
        fs::write(root.join("main.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("index.ts"));
        assert!(entries[1].ends_with("main.ts"));
    }

    #[test]
    fn test_cli_glob_discovery() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/migrate.ts"), "").unwrap();

        let entries = discover_entry_points(root);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("bin/migrate.ts"));
    }
}
