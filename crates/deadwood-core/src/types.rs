//! Core data types for deadwood analysis.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Classification of a dependency edge.
///
/// Multiple edges with different kinds between the same file pair are
/// permitted; duplicate `(pair, kind)` edges are coalesced by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Static `import` declaration, re-export, or side-effect import.
    Import,

    /// CommonJS `require("...")` call with a literal argument.
    Require,

    /// `import("...")` expression with a literal argument.
    DynamicImport,

    /// Type-only import (`import type { Foo }`).
    TypeImport,

    /// Any other code-level reference.
    Reference,
}

/// Extension class of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    Ts,
    Tsx,
    Js,
    Jsx,
    Mjs,
    Cjs,
    Json,
    /// TypeScript declaration file (`.d.ts`). Skipped for analysis.
    Dts,
}

impl FileClass {
    /// Classify a path by extension. Returns `None` for files deadwood
    /// does not recognize at all.
    pub fn from_path(path: &Path) -> Option<FileClass> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
            return Some(FileClass::Dts);
        }
        match path.extension()?.to_str()? {
            "ts" => Some(FileClass::Ts),
            "tsx" => Some(FileClass::Tsx),
            "js" => Some(FileClass::Js),
            "jsx" => Some(FileClass::Jsx),
            "mjs" => Some(FileClass::Mjs),
            "cjs" => Some(FileClass::Cjs),
            "json" => Some(FileClass::Json),
            _ => None,
        }
    }

    /// Declaration files carry no runtime code and are never analyzed.
    pub fn is_declaration(&self) -> bool {
        matches!(self, FileClass::Dts)
    }

    /// Whether files of this class are parsed and walked for edges.
    pub fn is_analyzable(&self) -> bool {
        matches!(
            self,
            FileClass::Ts | FileClass::Tsx | FileClass::Js | FileClass::Jsx
        )
    }
}

/// Whether a path sits under a `node_modules` directory.
pub fn is_node_module(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "node_modules")
}

/// Symbols observed in dynamic wiring patterns, keyed by the string
/// literal seen in the source, mapped to the files that mentioned it.
///
/// Insertion order of both keys and file lists is preserved; it is part
/// of the serialized output contract. Symbol names compare
/// case-sensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicUsage {
    /// Service-container registrations and lookups.
    pub service_container: IndexMap<String, Vec<PathBuf>>,

    /// Command-bus registrations and handler lookups.
    pub command_bus: IndexMap<String, Vec<PathBuf>>,

    /// Dynamic `import(...)` / `require(...)` specifiers.
    pub dynamic_imports: IndexMap<String, Vec<PathBuf>>,

    /// Captures from user-configured custom patterns.
    pub custom_patterns: IndexMap<String, Vec<PathBuf>>,
}

fn record(map: &mut IndexMap<String, Vec<PathBuf>>, symbol: &str, file: &Path) {
    let files = map.entry(symbol.to_string()).or_default();
    if !files.iter().any(|f| f == file) {
        files.push(file.to_path_buf());
    }
}

fn merge_bucket(into: &mut IndexMap<String, Vec<PathBuf>>, from: &IndexMap<String, Vec<PathBuf>>) {
    for (symbol, files) in from {
        for file in files {
            record(into, symbol, file);
        }
    }
}

impl DynamicUsage {
    pub fn record_service_container(&mut self, symbol: &str, file: &Path) {
        record(&mut self.service_container, symbol, file);
    }

    pub fn record_command_bus(&mut self, symbol: &str, file: &Path) {
        record(&mut self.command_bus, symbol, file);
    }

    pub fn record_dynamic_import(&mut self, specifier: &str, file: &Path) {
        record(&mut self.dynamic_imports, specifier, file);
    }

    pub fn record_custom(&mut self, symbol: &str, file: &Path) {
        record(&mut self.custom_patterns, symbol, file);
    }

    /// Merge another usage map into this one. The operation is a set
    /// union per bucket, so merges commute up to insertion order.
    pub fn merge(&mut self, other: &DynamicUsage) {
        merge_bucket(&mut self.service_container, &other.service_container);
        merge_bucket(&mut self.command_bus, &other.command_bus);
        merge_bucket(&mut self.dynamic_imports, &other.dynamic_imports);
        merge_bucket(&mut self.custom_patterns, &other.custom_patterns);
    }

    /// Symbols registered through the container, the bus, or a custom
    /// pattern. Dynamic import specifiers are paths, not symbols, and are
    /// matched separately.
    pub fn registered_symbols(&self) -> impl Iterator<Item = &str> {
        self.service_container
            .keys()
            .chain(self.command_bus.keys())
            .chain(self.custom_patterns.keys())
            .map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.service_container.is_empty()
            && self.command_bus.is_empty()
            && self.dynamic_imports.is_empty()
            && self.custom_patterns.is_empty()
    }
}

/// A file flagged as dead, with a calibrated confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeadFile {
    /// Canonical absolute path.
    pub path: PathBuf,

    /// Confidence that the file is truly dead, 0-100.
    pub confidence: u8,

    /// Human-readable factors, in the order they were applied.
    pub reasons: Vec<String>,

    /// Optional follow-up hints (e.g. safe-to-delete).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Summary of the dependency graph, for formatters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub reachable_files: usize,
    pub unreachable_files: usize,
    pub circular_dependencies: Vec<Vec<PathBuf>>,
}

/// Timing data recorded during analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub analysis_time_ms: u64,
}

/// Result of analyzing a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Wall-clock time the analysis started, RFC 3339.
    pub timestamp: String,

    /// The analyzed project root.
    pub project_path: PathBuf,

    /// Number of source files parsed and walked.
    pub files_analyzed: usize,

    /// Non-empty, non-comment lines across analyzed files.
    pub lines_of_code: usize,

    pub performance_metrics: PerformanceMetrics,

    /// Entry points reachability was computed from, discovery order.
    pub entry_points: Vec<PathBuf>,

    pub dependency_graph: GraphStats,

    /// Dead files ordered by descending confidence, then by path.
    pub dead_files: Vec<DeadFile>,

    pub dynamic_usage: DynamicUsage,

    /// Count of local errors (files that failed to parse).
    pub errors: usize,

    /// Count of warnings (pattern failures, entry-point fallbacks).
    pub warnings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_class_from_path() {
        assert_eq!(
            FileClass::from_path(Path::new("src/index.ts")),
            Some(FileClass::Ts)
        );
        assert_eq!(
            FileClass::from_path(Path::new("src/App.tsx")),
            Some(FileClass::Tsx)
        );
        assert_eq!(
            FileClass::from_path(Path::new("lib/types.d.ts")),
            Some(FileClass::Dts)
        );
        assert_eq!(
            FileClass::from_path(Path::new("package.json")),
            Some(FileClass::Json)
        );
        assert_eq!(FileClass::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_declaration_files_not_analyzable() {
        let dts = FileClass::from_path(Path::new("index.d.ts")).unwrap();
        assert!(dts.is_declaration());
        assert!(!dts.is_analyzable());

        let ts = FileClass::from_path(Path::new("index.ts")).unwrap();
        assert!(!ts.is_declaration());
        assert!(ts.is_analyzable());
    }

    #[test]
    fn test_is_node_module() {
        assert!(is_node_module(Path::new("/p/node_modules/react/index.js")));
        assert!(!is_node_module(Path::new("/p/src/index.ts")));
    }

    #[test]
    fn test_dynamic_usage_record_dedupes_files() {
        let mut usage = DynamicUsage::default();
        usage.record_service_container("UserService", Path::new("a.ts"));
        usage.record_service_container("UserService", Path::new("a.ts"));
        usage.record_service_container("UserService", Path::new("b.ts"));

        let files = usage.service_container.get("UserService").unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_dynamic_usage_merge_is_union() {
        let mut left = DynamicUsage::default();
        left.record_service_container("A", Path::new("x.ts"));

        let mut right = DynamicUsage::default();
        right.record_service_container("A", Path::new("x.ts"));
        right.record_command_bus("SendEmail", Path::new("y.ts"));

        left.merge(&right);
        assert_eq!(left.service_container.get("A").unwrap().len(), 1);
        assert_eq!(left.command_bus.get("SendEmail").unwrap().len(), 1);
    }

    #[test]
    fn test_registered_symbols_excludes_dynamic_imports() {
        let mut usage = DynamicUsage::default();
        usage.record_service_container("UserService", Path::new("a.ts"));
        usage.record_dynamic_import("./lazy", Path::new("a.ts"));

        let symbols: Vec<&str> = usage.registered_symbols().collect();
        assert_eq!(symbols, vec!["UserService"]);
    }

    #[test]
    fn test_dead_file_serialization_is_camel_case() {
        let dead = DeadFile {
            path: PathBuf::from("/p/DeadService.ts"),
            confidence: 85,
            reasons: vec!["not reachable from any entry point".to_string()],
            suggestions: None,
        };

        let json = serde_json::to_value(&dead).unwrap();
        assert!(json.get("confidence").is_some());
        assert!(json.get("suggestions").is_none());

        let round: DeadFile = serde_json::from_value(json).unwrap();
        assert_eq!(dead, round);
    }

    #[test]
    fn test_graph_stats_defaults() {
        let stats = GraphStats::default();
        assert_eq!(stats.total_nodes, 0);
        assert_eq!(stats.total_edges, 0);
        assert!(stats.circular_dependencies.is_empty());
    }
}
