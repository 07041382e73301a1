//! The unified analysis engine.
//!
//! Drives the compiler service, the pattern detector and the dependency
//! graph through the end-to-end pipeline: program build, node seeding,
//! entry points, edge extraction, dynamic usage, reachability, candidate
//! identification, scoring, thresholding, and result assembly.
//!
//! Per-file extraction runs on blocking workers and joins before any
//! graph mutation; population and scoring are single-threaded and follow
//! discovery order so results are deterministic.

use crate::extract::{extract_file, FileExtract};
use crate::scoring::{sort_dead_files, Candidate, Scorer};
use chrono::Utc;
use deadwood_compiler::{CompilerService, Program};
use deadwood_config::AnalyzerConfig;
use deadwood_core::{
    AnalysisResult, DependencyGraph, DynamicUsage, Error, FileClass, GraphStats,
    PerformanceMetrics, Result,
};
use deadwood_patterns::{discover_entry_points, is_architectural_core, PatternDetector};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Analyzes projects for dead files.
///
/// # Examples
///
/// ```no_run
/// use deadwood_engine::Analyzer;
/// use deadwood_config::AnalyzerConfig;
/// use std::path::Path;
///
/// # fn main() -> Result<(), deadwood_core::Error> {
/// let analyzer = Analyzer::new(AnalyzerConfig::default())?;
/// let result = analyzer.analyze(Path::new("."))?;
/// println!("{} dead files", result.dead_files.len());
/// # Ok(())
/// # }
/// ```
pub struct Analyzer {
    config: AnalyzerConfig,
    runtime: tokio::runtime::Runtime,
}

impl Analyzer {
    /// Create an analyzer. Validates the configuration and initializes
    /// the internal runtime.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self { config, runtime })
    }

    /// Run a full analysis of `project_path`.
    ///
    /// All analysis state lives and dies inside this call; there is no
    /// cross-call cache in the engine.
    pub fn analyze(&self, project_path: &Path) -> Result<AnalysisResult> {
        self.runtime.block_on(self.analyze_async(project_path))
    }

    async fn analyze_async(&self, project_path: &Path) -> Result<AnalysisResult> {
        let start = Instant::now();
        let timestamp = Utc::now().to_rfc3339();
        let mut errors = 0usize;
        let mut warnings = 0usize;

        // 1. Program build
        let program = Arc::new(CompilerService::create_program(project_path, &self.config)?);
        let detector = Arc::new(PatternDetector::new(&self.config.dynamic_patterns));
        warnings += detector.warnings();

        // 2. Node seeding
        let mut graph = DependencyGraph::new();
        for file in program.source_files() {
            graph.add_file(&file.path);
        }

        // 3. Entry points
        let (entry_points, fallback_warnings) = self.collect_entry_points(&program);
        warnings += fallback_warnings;
        for entry in &entry_points {
            graph.add_entry_point(entry);
        }
        let entry_set: HashSet<&PathBuf> = entry_points.iter().collect();

        // 4-5. Parallel extraction, joined before any graph mutation
        let (extracts, worker_failures) = self.run_extraction(&program, &detector).await;
        warnings += worker_failures;

        // Dynamic usage merges in discovery order so serialized key order
        // is stable.
        let mut usage = DynamicUsage::default();
        for file in program.source_files() {
            if let Some((_, file_usage)) = extracts.get(&file.path) {
                usage.merge(file_usage);
            }
        }

        // Edge population, single-threaded, discovery order.
        for file in program.source_files() {
            let Some((extract, _)) = extracts.get(&file.path) else {
                continue;
            };
            if extract.parse_failed {
                errors += 1;
                continue;
            }
            for import in &extract.imports {
                let Some(target) = program.resolve_import(&file.path, &import.specifier) else {
                    continue;
                };
                let is_json = matches!(FileClass::from_path(&target), Some(FileClass::Json));
                if !program.is_analyzed(&target) && !is_json {
                    debug!(target = %target.display(), "resolved outside analyzed set");
                    continue;
                }
                graph.add_dependency(&file.path, &target, import.kind);
            }
        }

        for file in program.source_files() {
            if is_architectural_core(&file.path) {
                graph.mark_architectural_core(&file.path)?;
            }
        }

        // 6. Reachability and cycles
        let reachable = graph.find_reachable();
        let cycles = graph.cycles()?;

        let mut isolated_cycle_members: HashSet<PathBuf> = HashSet::new();
        for cycle in &cycles {
            if cycle.iter().all(|path| !reachable.contains(path)) {
                isolated_cycle_members.extend(cycle.iter().cloned());
            }
        }

        let dynamic_targets = self.resolve_dynamic_targets(&program, &usage);

        // 7-9. Candidates, scoring, thresholding
        let scorer = Scorer::new(
            &self.config.confidence_thresholds,
            &usage,
            &self.config.dynamic_patterns.keep_alive,
        );
        let mut dead_files = Vec::new();
        for file in program.source_files() {
            let path = &file.path;
            if reachable.contains(path) || entry_set.contains(path) {
                continue;
            }
            let Some((extract, _)) = extracts.get(path) else {
                continue;
            };
            if extract.parse_failed {
                // Unknown files are never condemned.
                continue;
            }
            let node = graph.node(path).ok_or_else(|| Error::MissingNode {
                path: path.clone(),
            })?;

            let mut symbols = extract.symbols.clone();
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !symbols.iter().any(|s| s == stem) {
                    symbols.push(stem.to_string());
                }
            }

            let candidate = Candidate {
                path,
                in_degree: node.in_degree,
                only_type_imports: node.referenced_only_by_types(),
                is_architectural_core: node.is_architectural_core,
                symbols: &symbols,
                in_isolated_cycle: isolated_cycle_members.contains(path),
                is_empty: extract.is_empty,
                is_dynamic_import_target: dynamic_targets.contains(path),
            };

            if let Some(dead) = scorer.score(&candidate) {
                graph.set_confidence(path, dead.confidence)?;
                dead_files.push(dead);
            }
        }
        sort_dead_files(&mut dead_files);

        // 10. Result assembly
        let lines_of_code = program
            .source_files()
            .filter_map(|f| extracts.get(&f.path))
            .map(|(extract, _)| extract.lines_of_code)
            .sum();

        let dependency_graph = GraphStats {
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            reachable_files: reachable.len(),
            unreachable_files: graph.node_count().saturating_sub(reachable.len()),
            circular_dependencies: cycles,
        };

        Ok(AnalysisResult {
            timestamp,
            project_path: program.root().to_path_buf(),
            files_analyzed: program.file_count(),
            lines_of_code,
            performance_metrics: PerformanceMetrics {
                analysis_time_ms: start.elapsed().as_millis() as u64,
            },
            entry_points,
            dependency_graph,
            dead_files,
            dynamic_usage: usage,
            errors,
            warnings,
        })
    }

    /// Union of configured and discovered entry points, first-seen
    /// deduplicated, with the empty-set synthesis fallback.
    fn collect_entry_points(&self, program: &Program) -> (Vec<PathBuf>, usize) {
        let mut warnings = 0;
        let mut seen = HashSet::new();
        let mut entry_points = Vec::new();

        for configured in &self.config.entry_points {
            let path = if configured.is_absolute() {
                configured.clone()
            } else {
                program.root().join(configured)
            };
            let path = path.canonicalize().unwrap_or(path);
            if seen.insert(path.clone()) {
                entry_points.push(path);
            }
        }

        for discovered in discover_entry_points(program.root()) {
            if seen.insert(discovered.clone()) {
                entry_points.push(discovered);
            }
        }

        if entry_points.is_empty() {
            if let Some(synthesized) = self.synthesize_entry_point(program) {
                debug!(entry = %synthesized.display(), "synthesized entry point");
                entry_points.push(synthesized);
            } else {
                warn!("no entry points recognized; treating every file as an entry point");
                warnings += 1;
                entry_points.extend(program.source_files().map(|f| f.path.clone()));
            }
        }

        (entry_points, warnings)
    }

    /// First file matching `src/index.*` or `index.*`.
    fn synthesize_entry_point(&self, program: &Program) -> Option<PathBuf> {
        program
            .source_files()
            .map(|f| &f.path)
            .find(|path| {
                let Ok(relative) = path.strip_prefix(program.root()) else {
                    return false;
                };
                let stem_is_index = path
                    .file_stem()
                    .is_some_and(|s| s == "index");
                let parent = relative.parent().and_then(|p| p.to_str()).unwrap_or("");
                stem_is_index && (parent.is_empty() || parent == "src")
            })
            .cloned()
    }

    async fn run_extraction(
        &self,
        program: &Arc<Program>,
        detector: &Arc<PatternDetector>,
    ) -> (HashMap<PathBuf, (FileExtract, DynamicUsage)>, usize) {
        let workers = self
            .config
            .performance
            .max_workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            });
        let semaphore = Arc::new(Semaphore::new(workers));

        let mut join_set: JoinSet<Option<(FileExtract, DynamicUsage)>> = JoinSet::new();
        for file in program.source_files() {
            let file = Arc::clone(file);
            let detector = Arc::clone(detector);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                tokio::task::spawn_blocking(move || extract_file(&file, &detector))
                    .await
                    .ok()
            });
        }

        let mut extracts = HashMap::new();
        let mut failures = 0;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some((extract, file_usage))) => {
                    extracts.insert(extract.path.clone(), (extract, file_usage));
                }
                Ok(None) | Err(_) => {
                    warn!("extraction worker failed");
                    failures += 1;
                }
            }
        }
        (extracts, failures)
    }

    /// Resolve every observed dynamic-import specifier from each file
    /// that mentioned it.
    fn resolve_dynamic_targets(
        &self,
        program: &Program,
        usage: &DynamicUsage,
    ) -> HashSet<PathBuf> {
        let mut targets = HashSet::new();
        for (specifier, files) in &usage.dynamic_imports {
            for from in files {
                if let Some(target) = program.resolve_import(from, specifier) {
                    targets.insert(target);
                }
            }
        }
        targets
    }
}

/// Convenience wrapper: build an [`Analyzer`] and run one analysis.
pub fn analyze(project_path: &Path, config: AnalyzerConfig) -> Result<AnalysisResult> {
    Analyzer::new(config)?.analyze(project_path)
}
