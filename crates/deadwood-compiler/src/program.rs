//! Program construction: the loaded project view handed to the engine.

use crate::discovery::discover_source_files;
use crate::options::CompilerOptions;
use crate::resolver::ImportResolver;
use deadwood_config::AnalyzerConfig;
use deadwood_core::{Error, FileClass, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A loaded source file. Text is held for the duration of the analysis
/// call and discarded with the program.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub class: FileClass,
}

/// The project as the engine sees it: canonical root, ordered source
/// files, merged compiler options, and module resolution.
#[derive(Debug)]
pub struct Program {
    root: PathBuf,
    options: CompilerOptions,
    files: Vec<Arc<SourceFile>>,
    analyzed: HashSet<PathBuf>,
    resolver: ImportResolver,
}

impl Program {
    /// Canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Non-declaration, non-`node_modules` source files, in discovery
    /// order.
    pub fn source_files(&self) -> impl Iterator<Item = &Arc<SourceFile>> {
        self.files.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Whether `path` is one of the analyzed source files.
    pub fn is_analyzed(&self, path: &Path) -> bool {
        self.analyzed.contains(path)
    }

    /// Resolve an import specifier written in `from_file`. `None` means
    /// external (no edge).
    pub fn resolve_import(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        self.resolver.resolve(from_file, specifier)
    }
}

/// Builds [`Program`]s. Owns no state between calls.
pub struct CompilerService;

impl CompilerService {
    /// Discover configuration and source files under `project_path` and
    /// load them into a program.
    ///
    /// # Errors
    /// - `Error::ProjectNotFound` when the path does not exist
    /// - `Error::Json` when a colocated tsconfig is malformed
    /// - `Error::Config` when the root is unsafe or excludes are invalid
    pub fn create_program(project_path: &Path, config: &AnalyzerConfig) -> Result<Program> {
        let root = project_path
            .canonicalize()
            .map_err(|_| Error::ProjectNotFound {
                path: project_path.to_path_buf(),
            })?;

        let options = CompilerOptions::discover(&root, config)?;
        let paths = discover_source_files(&root, &config.exclude)?;

        let mut files = Vec::with_capacity(paths.len());
        let mut analyzed = HashSet::with_capacity(paths.len());
        for path in paths {
            let Some(class) = FileClass::from_path(&path) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    analyzed.insert(path.clone());
                    files.push(Arc::new(SourceFile { path, text, class }));
                }
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "unreadable source file");
                }
            }
        }

        let resolver = ImportResolver::new(
            root.clone(),
            options.tsconfig_path.clone(),
            options.module_resolution,
            options.resolve_json_module,
        );

        Ok(Program {
            root,
            options,
            files,
            analyzed,
            resolver,
        })
    }
}
