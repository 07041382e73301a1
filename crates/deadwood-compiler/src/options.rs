//! Compiler option discovery.
//!
//! Options come from a `tsconfig.json` colocated with the project path
//! when one exists, otherwise from synthesized defaults. tsconfig is not
//! strict JSON: comments and trailing commas are tolerated, so the file
//! is cleaned up before deserialization.

use deadwood_config::{AnalyzerConfig, ModuleResolution};
use deadwood_core::{Error, Result};
use json_comments::StripComments;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Effective compiler options for an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub allow_js: bool,
    pub resolve_json_module: bool,
    pub es_module_interop: bool,
    pub skip_lib_check: bool,
    pub force_consistent_casing_in_file_names: bool,
    pub module_resolution: ModuleResolution,

    /// Path of the tsconfig the options were read from, if any. Handed to
    /// the resolver so `paths`/`baseUrl` aliases keep working.
    pub tsconfig_path: Option<PathBuf>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            allow_js: true,
            resolve_json_module: true,
            es_module_interop: true,
            skip_lib_check: true,
            force_consistent_casing_in_file_names: false,
            module_resolution: ModuleResolution::Node16,
            tsconfig_path: None,
        }
    }
}

/// The subset of tsconfig.json deadwood reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsconfigFile {
    #[serde(default)]
    compiler_options: Option<TsconfigCompilerOptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsconfigCompilerOptions {
    allow_js: Option<bool>,
    resolve_json_module: Option<bool>,
    es_module_interop: Option<bool>,
    skip_lib_check: Option<bool>,
    force_consistent_casing_in_file_names: Option<bool>,
    module_resolution: Option<String>,
}

impl CompilerOptions {
    /// Discover options for `project_root`, merging three layers:
    /// synthesized defaults, a colocated `tsconfig.json`, then the
    /// caller's overrides (which always win).
    ///
    /// # Errors
    /// `Error::Json` if a tsconfig exists but cannot be parsed. A missing
    /// tsconfig is not an error.
    pub fn discover(project_root: &Path, config: &AnalyzerConfig) -> Result<Self> {
        let mut options = CompilerOptions::default();

        let tsconfig_path = project_root.join("tsconfig.json");
        if tsconfig_path.is_file() {
            let content = std::fs::read_to_string(&tsconfig_path)?;
            let parsed = parse_tsconfig_str(&content).map_err(|source| Error::Json {
                file: tsconfig_path.clone(),
                source,
            })?;
            options.apply_tsconfig(&parsed);
            options.tsconfig_path = Some(tsconfig_path);
        }

        options.apply_overrides(config);
        Ok(options)
    }

    fn apply_tsconfig(&mut self, file: &TsconfigFile) {
        let Some(co) = &file.compiler_options else {
            return;
        };
        if let Some(v) = co.allow_js {
            self.allow_js = v;
        }
        if let Some(v) = co.resolve_json_module {
            self.resolve_json_module = v;
        }
        if let Some(v) = co.es_module_interop {
            self.es_module_interop = v;
        }
        if let Some(v) = co.skip_lib_check {
            self.skip_lib_check = v;
        }
        if let Some(v) = co.force_consistent_casing_in_file_names {
            self.force_consistent_casing_in_file_names = v;
        }
        if let Some(mode) = &co.module_resolution {
            if let Some(parsed) = parse_module_resolution(mode) {
                self.module_resolution = parsed;
            }
        }
    }

    fn apply_overrides(&mut self, config: &AnalyzerConfig) {
        let overrides = &config.compiler_options;
        if let Some(v) = overrides.allow_js {
            self.allow_js = v;
        }
        if let Some(v) = overrides.resolve_json_module {
            self.resolve_json_module = v;
        }
        if let Some(v) = overrides.es_module_interop {
            self.es_module_interop = v;
        }
        if let Some(v) = overrides.skip_lib_check {
            self.skip_lib_check = v;
        }
        if let Some(v) = overrides.force_consistent_casing_in_file_names {
            self.force_consistent_casing_in_file_names = v;
        }
        if let Some(mode) = config.module_resolution {
            self.module_resolution = mode;
        }
    }
}

fn parse_module_resolution(raw: &str) -> Option<ModuleResolution> {
    match raw.to_ascii_lowercase().as_str() {
        "node" | "node10" | "classic" => Some(ModuleResolution::Node),
        "node16" => Some(ModuleResolution::Node16),
        "nodenext" | "bundler" => Some(ModuleResolution::NodeNext),
        _ => None,
    }
}

/// Parse tsconfig-flavoured JSON: comments stripped, trailing commas
/// removed before the object/array close.
fn parse_tsconfig_str(json: &str) -> std::result::Result<TsconfigFile, serde_json::Error> {
    // Remove trailing commas from objects and arrays.
    let re = Regex::new(r",(?P<valid>\s*[}\]])").expect("static regex");
    let json = re.replace_all(json, "$valid");
    let stripped = StripComments::new(json.as_bytes());
    serde_json::from_reader(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_defaults() {
        let options = CompilerOptions::default();
        assert!(options.allow_js);
        assert!(options.resolve_json_module);
        assert!(options.es_module_interop);
        assert!(options.skip_lib_check);
        assert!(!options.force_consistent_casing_in_file_names);
        assert_eq!(options.module_resolution, ModuleResolution::Node16);
    }

    #[test]
    fn test_parses_tsconfig_with_comments_and_trailing_commas() {
        let raw = r#"
        {
            // project config
            "compilerOptions": {
                "allowJs": false,
                /* block comment */
                "moduleResolution": "NodeNext",
            },
        }
        "#;
        let parsed = parse_tsconfig_str(raw).unwrap();
        let co = parsed.compiler_options.unwrap();
        assert_eq!(co.allow_js, Some(false));
        assert_eq!(co.module_resolution.as_deref(), Some("NodeNext"));
    }

    #[test]
    fn test_discover_without_tsconfig_synthesizes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = CompilerOptions::discover(dir.path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(options, CompilerOptions::default());
    }

    #[test]
    fn test_discover_reads_colocated_tsconfig() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "compilerOptions": { "resolveJsonModule": false, "moduleResolution": "node" } }"#,
        )
        .unwrap();

        let options = CompilerOptions::discover(dir.path(), &AnalyzerConfig::default()).unwrap();
        assert!(!options.resolve_json_module);
        assert_eq!(options.module_resolution, ModuleResolution::Node);
        assert!(options.tsconfig_path.is_some());
    }

    #[test]
    fn test_malformed_tsconfig_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tsconfig.json"), "{ not json").unwrap();

        let err = CompilerOptions::discover(dir.path(), &AnalyzerConfig::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_config_overrides_win_over_tsconfig() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "compilerOptions": { "allowJs": false } }"#,
        )
        .unwrap();

        let mut config = AnalyzerConfig::default();
        config.compiler_options.allow_js = Some(true);
        config.module_resolution = Some(ModuleResolution::NodeNext);

        let options = CompilerOptions::discover(dir.path(), &config).unwrap();
        assert!(options.allow_js);
        assert_eq!(options.module_resolution, ModuleResolution::NodeNext);
    }
}
