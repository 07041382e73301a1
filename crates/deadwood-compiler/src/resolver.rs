//! Import specifier resolution.
//!
//! Resolution delegates to `oxc_resolver`, configured to match what a
//! TypeScript compiler in `Node16`/`NodeNext` mode would do. The critical
//! rule lives in `extension_alias`: a specifier ending in `.js` must
//! resolve to the sibling `.ts`/`.tsx` when that file exists on disk and
//! the `.js` does not. A small manual prober backs the resolver up for
//! edge cases it rejects.

use deadwood_config::ModuleResolution;
use deadwood_core::types::is_node_module;
use oxc_resolver::{
    ResolveOptions, Resolver, TsconfigDiscovery, TsconfigOptions, TsconfigReferences,
};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

/// Resolves import specifiers to canonical absolute paths inside the
/// project root. Bare and out-of-root specifiers are external (`None`).
#[derive(Debug)]
pub struct ImportResolver {
    resolver: Resolver,
    root: PathBuf,
    resolve_json: bool,
}

impl ImportResolver {
    pub fn new(
        root: PathBuf,
        tsconfig_path: Option<PathBuf>,
        mode: ModuleResolution,
        resolve_json: bool,
    ) -> Self {
        let options = build_resolve_options(tsconfig_path, mode, resolve_json);
        Self {
            resolver: Resolver::new(options),
            root,
            resolve_json,
        }
    }

    /// Resolve `specifier` as written in `from_file`.
    ///
    /// Returns `None` for externals: bare package specifiers, resolutions
    /// landing in `node_modules` or outside the project root, and JSON
    /// targets when `resolveJsonModule` is off. Resolution failures are
    /// silent (the caller emits no edge).
    pub fn resolve(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        let from_dir = from_file.parent()?;

        if let Ok(resolution) = self.resolver.resolve(from_dir, specifier) {
            if let Some(path) = self.admit(resolution.into_path_buf()) {
                return Some(path);
            }
        }

        // The compiler-grade resolver said no; probe by hand for the
        // relative-specifier edge cases.
        if specifier.starts_with('.') {
            let probed = self.probe_relative(from_dir, specifier)?;
            return self.admit(probed);
        }

        debug!(specifier, from = %from_file.display(), "treated as external");
        None
    }

    /// Boundary and policy checks shared by both resolution paths.
    fn admit(&self, resolved: PathBuf) -> Option<PathBuf> {
        let canonical = resolved.canonicalize().ok()?;
        if !canonical.starts_with(&self.root) || is_node_module(&canonical) {
            return None;
        }
        if canonical.extension().is_some_and(|e| e == "json") && !self.resolve_json {
            return None;
        }
        Some(canonical)
    }

    /// Manual fallback for relative specifiers: exact path, `.js`-family
    /// rewrites, appended extensions, then directory index files.
    fn probe_relative(&self, from_dir: &Path, specifier: &str) -> Option<PathBuf> {
        let base = from_dir.join(specifier);

        if base.is_file() {
            return Some(base);
        }

        // Compiled-output specifiers written against TypeScript sources.
        if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
            let rewrites: &[&str] = match ext {
                "js" => &["ts", "tsx"],
                "jsx" => &["tsx"],
                "mjs" => &["mts"],
                "cjs" => &["cts"],
                _ => &[],
            };
            for rewrite in rewrites {
                let candidate = base.with_extension(rewrite);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        for ext in EXTENSIONS {
            let candidate = PathBuf::from(format!("{}{ext}", base.display()));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if base.is_dir() {
            for ext in EXTENSIONS {
                let candidate = base.join(format!("index{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        None
    }
}

fn build_resolve_options(
    tsconfig_path: Option<PathBuf>,
    mode: ModuleResolution,
    resolve_json: bool,
) -> ResolveOptions {
    let mut extensions: Vec<String> = EXTENSIONS.iter().map(|e| (*e).into()).collect();
    extensions.extend([".mjs".into(), ".cjs".into()]);
    if resolve_json {
        extensions.push(".json".into());
    }

    let condition_names: Vec<String> = match mode {
        ModuleResolution::Node => vec!["require".into(), "node".into(), "default".into()],
        ModuleResolution::Node16 | ModuleResolution::NodeNext => vec![
            "import".into(),
            "require".into(),
            "node".into(),
            "default".into(),
        ],
    };

    ResolveOptions {
        extensions,
        // `.js` written in source resolves to the TypeScript sibling.
        extension_alias: vec![
            (".js".into(), vec![".ts".into(), ".tsx".into(), ".js".into()]),
            (".jsx".into(), vec![".tsx".into(), ".jsx".into()]),
            (".mjs".into(), vec![".mts".into(), ".mjs".into()]),
            (".cjs".into(), vec![".cts".into(), ".cjs".into()]),
        ],
        main_files: vec!["index".into()],
        main_fields: vec!["module".into(), "main".into()],
        condition_names,
        tsconfig: tsconfig_path.map(|config_file| {
            TsconfigDiscovery::Manual(TsconfigOptions {
                config_file,
                references: TsconfigReferences::Auto,
            })
        }),
        ..ResolveOptions::default()
    }
}
