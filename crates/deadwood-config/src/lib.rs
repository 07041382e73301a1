//! Analyzer configuration.
//!
//! [`AnalyzerConfig`] is the single configuration object fed into
//! `analyze`. It can be built programmatically or loaded from a
//! `.deadwood.toml` colocated with the project. A missing file yields
//! defaults; a malformed file is a fatal configuration error.

use deadwood_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Module resolution strategy, mirroring the TypeScript compiler modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleResolution {
    Node,
    #[default]
    Node16,
    NodeNext,
}

/// Typed subset of tsconfig `compilerOptions` that callers may override.
///
/// `None` means "keep whatever the discovered tsconfig (or the synthesized
/// defaults) say".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_json_module: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub es_module_interop: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_lib_check: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_consistent_casing_in_file_names: Option<bool>,
}

/// A user-supplied regex pattern contributing to dynamic-usage capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    /// Display name, used in logs.
    pub name: String,

    /// The regex source. Compiled with ReDoS guards; an invalid pattern
    /// is a warning, not a fatal error.
    pub regex: String,

    /// Capture group index that yields the symbol name.
    #[serde(default = "default_symbol_group")]
    pub symbol_group: usize,
}

/// Dynamic wiring detection knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicPatterns {
    /// Additional regex passes beyond the built-in container/bus/import
    /// patterns.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,

    /// Decorator names treated like the built-in DI decorators.
    #[serde(default)]
    pub decorators: Vec<String>,

    /// Symbols that are never condemned: a candidate exposing one of
    /// these names is dropped from the dead set.
    #[serde(default)]
    pub keep_alive: Vec<String>,
}

/// Confidence scoring thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Candidates below this final confidence are dropped.
    #[serde(default = "default_minimum_threshold")]
    pub minimum_threshold: u8,

    /// Multiplicative dampener for architectural-core files, applied after
    /// all additive terms.
    #[serde(default = "default_core_multiplier")]
    pub architectural_core_multiplier: f64,

    /// Extra penalty applied to the dynamic-usage rescues.
    #[serde(default = "default_dynamic_bonus")]
    pub dynamic_pattern_bonus: u8,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            minimum_threshold: default_minimum_threshold(),
            architectural_core_multiplier: default_core_multiplier(),
            dynamic_pattern_bonus: default_dynamic_bonus(),
        }
    }
}

/// Collaborator-level cache hints. The core never persists anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Resource knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Cap on the parse worker pool. `None` lets the runtime decide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

/// Main configuration object for a deadwood analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Entry points added unconditionally to the discovered set.
    #[serde(default)]
    pub entry_points: Vec<PathBuf>,

    /// Globs excluded during file discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Overrides merged over the discovered tsconfig.
    #[serde(default)]
    pub compiler_options: CompilerOverrides,

    /// Module resolution mode. `None` inherits the discovered tsconfig's
    /// mode, falling back to `node16`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<ModuleResolution>,

    #[serde(default)]
    pub dynamic_patterns: DynamicPatterns,

    #[serde(default)]
    pub confidence_thresholds: ConfidenceThresholds,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl AnalyzerConfig {
    /// Load configuration for a project.
    ///
    /// Precedence: an explicit path (must exist), then a colocated
    /// `.deadwood.toml`, then defaults.
    ///
    /// # Errors
    /// - `Error::Config` if the explicit path does not exist or values are
    ///   out of range
    /// - `Error::Toml` if the file is malformed
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let colocated = project_root.join(".deadwood.toml");
                if !colocated.is_file() {
                    return Ok(Self::default());
                }
                colocated
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let config: AnalyzerConfig = toml::from_str(&content).map_err(|e| Error::Toml {
            file: path,
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check threshold values.
    pub fn validate(&self) -> Result<()> {
        let thresholds = &self.confidence_thresholds;
        if thresholds.minimum_threshold > 100 {
            return Err(Error::Config {
                message: format!(
                    "minimum_threshold must be 0-100, got {}",
                    thresholds.minimum_threshold
                ),
            });
        }
        if !(0.0..=1.0).contains(&thresholds.architectural_core_multiplier) {
            return Err(Error::Config {
                message: format!(
                    "architectural_core_multiplier must be 0.0-1.0, got {}",
                    thresholds.architectural_core_multiplier
                ),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_minimum_threshold() -> u8 {
    50
}

fn default_core_multiplier() -> f64 {
    0.5
}

fn default_dynamic_bonus() -> u8 {
    20
}

fn default_symbol_group() -> usize {
    1
}
