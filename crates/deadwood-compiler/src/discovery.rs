//! Source file discovery.
//!
//! Walks the project tree, skipping the directories no analysis should
//! ever enter, and returns the analyzable source files in a stable
//! (sorted) order so downstream graph population is deterministic.

use deadwood_core::{Error, FileClass, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories that are never traversed.
const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

const MAX_DEPTH: usize = 100;

/// Discover analyzable source files under `root`.
///
/// Accepted extensions are `.ts .tsx .js .jsx`; declaration files are
/// skipped. `exclude` globs are matched against the path relative to
/// `root`. Paths are canonicalized (symlinks resolved) and sorted.
///
/// # Errors
/// - `Error::Config` when `root` is unsafe to scan or a glob is invalid
/// - `Error::Io` from the underlying walk
pub fn discover_source_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    validate_project_root(root)?;
    let exclude_set = build_exclude_set(exclude)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .follow_links(false)
        .max_depth(Some(MAX_DEPTH))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !EXCLUDED_DIRS.contains(&name))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(class) = FileClass::from_path(path) else {
            continue;
        };
        if !class.is_analyzable() || class.is_declaration() {
            continue;
        }

        if let Ok(relative) = path.strip_prefix(root) {
            if exclude_set.is_match(relative) {
                debug!(path = %path.display(), "excluded by configuration glob");
                continue;
            }
        }

        match path.canonicalize() {
            Ok(canonical) => files.push(canonical),
            Err(err) => debug!(path = %path.display(), error = %err, "cannot canonicalize"),
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::Config {
            message: format!("invalid exclude glob {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::Config {
        message: format!("failed to compile exclude globs: {e}"),
    })
}

/// Validates that the project root is safe to scan.
fn validate_project_root(root: &Path) -> Result<()> {
    // Refuse to scan the filesystem root
    if root == Path::new("/") {
        return Err(Error::Config {
            message: "Refusing to scan filesystem root".to_string(),
        });
    }

    #[cfg(unix)]
    {
        let dangerous_paths = ["/bin", "/sbin", "/usr", "/etc", "/var", "/sys", "/proc"];
        for dangerous in &dangerous_paths {
            if root.starts_with(dangerous) {
                return Err(Error::Config {
                    message: format!("Refusing to scan system directory: {dangerous}"),
                });
            }
        }
    }

    #[cfg(windows)]
    {
        let root_str = root.to_string_lossy().to_lowercase();
        if root_str.starts_with("c:\\windows") || root_str.starts_with("c:\\program files") {
            return Err(Error::Config {
                message: "Refusing to scan Windows system directory".to_string(),
            });
        }
    }

    Ok(())
}
