//! Confidence scoring for dead-file candidates.
//!
//! The model is deterministic and additive: a base score for being
//! unreachable, bonuses for corroborating signals, penalties for
//! evidence of dynamic wiring, then a single multiplicative dampener for
//! architectural-core files, then clamping to [0, 100].

use deadwood_config::ConfidenceThresholds;
use deadwood_core::{DeadFile, DynamicUsage};
use std::path::Path;
use tracing::debug;

/// Fixed share of the symbol-registration rescue; the configurable
/// `dynamic_pattern_bonus` (default 20) is added on top, landing the
/// default penalty at 40.
const SYMBOL_RESCUE_BASE: f64 = 20.0;

/// Fixed share of the dynamic-import-target rescue; with the default
/// bonus the penalty is 50.
const DYNAMIC_TARGET_RESCUE_BASE: f64 = 30.0;

/// Everything known about one unreachable candidate.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub path: &'a Path,

    /// Deduplicated incoming edge count.
    pub in_degree: usize,

    /// All incoming edges are type-only imports.
    pub only_type_imports: bool,

    pub is_architectural_core: bool,

    /// Matchable symbols: exported identifiers, top-level class names,
    /// and the basename stem.
    pub symbols: &'a [String],

    /// Member of a cycle whose files are all unreachable.
    pub in_isolated_cycle: bool,

    /// Empty or comment-only file.
    pub is_empty: bool,

    /// Some dynamic-import specifier resolves to this file.
    pub is_dynamic_import_target: bool,
}

/// Scores candidates against one analysis run's dynamic usage.
pub struct Scorer<'a> {
    thresholds: &'a ConfidenceThresholds,
    usage: &'a DynamicUsage,
    keep_alive: &'a [String],
}

impl<'a> Scorer<'a> {
    pub fn new(
        thresholds: &'a ConfidenceThresholds,
        usage: &'a DynamicUsage,
        keep_alive: &'a [String],
    ) -> Self {
        Self {
            thresholds,
            usage,
            keep_alive,
        }
    }

    /// Score one candidate. Returns `None` when the candidate is rescued
    /// outright (keep-alive) or lands below the minimum threshold.
    pub fn score(&self, candidate: &Candidate<'_>) -> Option<DeadFile> {
        if self.is_kept_alive(candidate) {
            debug!(path = %candidate.path.display(), "kept alive by configuration");
            return None;
        }

        let mut confidence = 70.0;
        let mut reasons = vec!["not reachable from any entry point".to_string()];

        if candidate.in_degree == 0 {
            confidence += 15.0;
            reasons.push("no incoming references".to_string());
        } else if candidate.only_type_imports {
            confidence -= 10.0;
            reasons.push("referenced only by type-only imports".to_string());
        }

        let bonus = f64::from(self.thresholds.dynamic_pattern_bonus);

        if self.matches_registered_symbol(candidate) {
            confidence -= SYMBOL_RESCUE_BASE + bonus;
            reasons.push(
                "symbol appears in service-container/command-bus registration".to_string(),
            );
        }

        if candidate.is_dynamic_import_target {
            confidence -= DYNAMIC_TARGET_RESCUE_BASE + bonus;
            reasons.push("target of a dynamic import".to_string());
        }

        if candidate.in_isolated_cycle {
            confidence += 5.0;
            reasons.push("isolated cycle of unreferenced files".to_string());
        }

        if candidate.is_empty {
            confidence += 10.0;
            reasons.push("no executable content".to_string());
        }

        // Multiplicative dampener runs after all additive terms and
        // before clamping.
        if candidate.is_architectural_core {
            confidence *= self.thresholds.architectural_core_multiplier;
            reasons.push("file name matches architectural-core pattern".to_string());
        }

        let confidence = confidence.clamp(0.0, 100.0).round() as u8;
        if confidence < self.thresholds.minimum_threshold {
            debug!(
                path = %candidate.path.display(),
                confidence,
                threshold = self.thresholds.minimum_threshold,
                "below threshold"
            );
            return None;
        }

        let suggestions = (confidence >= 90 && candidate.in_degree == 0)
            .then(|| vec!["no incoming references; safe to delete".to_string()]);

        Some(DeadFile {
            path: candidate.path.to_path_buf(),
            confidence,
            reasons,
            suggestions,
        })
    }

    fn is_kept_alive(&self, candidate: &Candidate<'_>) -> bool {
        candidate
            .symbols
            .iter()
            .any(|symbol| self.keep_alive.iter().any(|kept| kept == symbol))
    }

    /// Case-sensitive whole-string match between the candidate's symbols
    /// and the registered dynamic-usage keys.
    fn matches_registered_symbol(&self, candidate: &Candidate<'_>) -> bool {
        self.usage
            .registered_symbols()
            .any(|registered| candidate.symbols.iter().any(|s| s == registered))
    }
}

/// Sort dead files for output: descending confidence, then path, so the
/// report is stable across runs.
pub fn sort_dead_files(dead_files: &mut [DeadFile]) {
    dead_files.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.path.cmp(&b.path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn thresholds() -> ConfidenceThresholds {
        ConfidenceThresholds::default()
    }

    fn candidate<'a>(path: &'a Path, symbols: &'a [String]) -> Candidate<'a> {
        Candidate {
            path,
            in_degree: 0,
            only_type_imports: false,
            is_architectural_core: false,
            symbols,
            in_isolated_cycle: false,
            is_empty: false,
            is_dynamic_import_target: false,
        }
    }

    #[test]
    fn test_base_plus_no_references() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec!["DeadService".to_string()];
        let dead = scorer
            .score(&candidate(Path::new("DeadService.ts"), &symbols))
            .unwrap();

        assert_eq!(dead.confidence, 85);
        assert_eq!(dead.reasons.len(), 2);
        assert_eq!(dead.reasons[0], "not reachable from any entry point");
    }

    #[test]
    fn test_type_only_references_soften_score() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec![];
        let mut c = candidate(Path::new("types.ts"), &symbols);
        c.in_degree = 1;
        c.only_type_imports = true;

        let dead = scorer.score(&c).unwrap();
        assert_eq!(dead.confidence, 60);
        assert!(dead
            .reasons
            .contains(&"referenced only by type-only imports".to_string()));
    }

    #[test]
    fn test_registered_symbol_rescue_drops_below_threshold() {
        let thresholds = thresholds();
        let mut usage = DynamicUsage::default();
        usage.record_service_container("UserService", Path::new("index.ts"));
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec!["UserService".to_string()];
        // 70 + 15 - 40 = 45 < 50: rescued by drop-out.
        assert!(scorer
            .score(&candidate(Path::new("UserService.ts"), &symbols))
            .is_none());
    }

    #[test]
    fn test_symbol_matching_is_case_sensitive() {
        let thresholds = thresholds();
        let mut usage = DynamicUsage::default();
        usage.record_service_container("userservice", Path::new("index.ts"));
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec!["UserService".to_string()];
        let dead = scorer
            .score(&candidate(Path::new("UserService.ts"), &symbols))
            .unwrap();
        assert_eq!(dead.confidence, 85);
    }

    #[test]
    fn test_dynamic_import_target_rescue() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec![];
        let mut c = candidate(Path::new("Lazy.ts"), &symbols);
        c.is_dynamic_import_target = true;

        // 70 + 15 - 50 = 35 < 50
        assert!(scorer.score(&c).is_none());
    }

    #[test]
    fn test_architectural_core_dampener_applies_last() {
        let mut thresholds = thresholds();
        thresholds.minimum_threshold = 0;
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec![];
        let mut c = candidate(Path::new("ApplicationContainer.ts"), &symbols);
        c.is_architectural_core = true;

        let dead = scorer.score(&c).unwrap();
        // (70 + 15) * 0.5 = 42.5, rounded to 43
        assert_eq!(dead.confidence, 43);
        assert_eq!(
            dead.reasons.last().unwrap(),
            "file name matches architectural-core pattern"
        );
    }

    #[test]
    fn test_cycle_and_empty_bonuses() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec![];
        let mut c = candidate(Path::new("orphan.ts"), &symbols);
        c.in_isolated_cycle = true;
        c.is_empty = true;

        let dead = scorer.score(&c).unwrap();
        assert_eq!(dead.confidence, 100);
    }

    #[test]
    fn test_confidence_clamped_to_valid_range() {
        let thresholds = ConfidenceThresholds {
            minimum_threshold: 0,
            ..Default::default()
        };
        let mut usage = DynamicUsage::default();
        usage.record_service_container("X", Path::new("a.ts"));
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec!["X".to_string()];
        let mut c = candidate(Path::new("X.ts"), &symbols);
        c.in_degree = 1;
        c.only_type_imports = true;
        c.is_dynamic_import_target = true;

        // 70 - 10 - 40 - 50 = -30, clamps to 0
        let dead = scorer.score(&c).unwrap();
        assert_eq!(dead.confidence, 0);
    }

    #[test]
    fn test_keep_alive_drops_candidate() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let keep_alive = vec!["LegacyBridge".to_string()];
        let scorer = Scorer::new(&thresholds, &usage, &keep_alive);

        let symbols = vec!["LegacyBridge".to_string()];
        assert!(scorer
            .score(&candidate(Path::new("LegacyBridge.ts"), &symbols))
            .is_none());
    }

    #[test]
    fn test_high_confidence_gets_deletion_suggestion() {
        let thresholds = thresholds();
        let usage = DynamicUsage::default();
        let scorer = Scorer::new(&thresholds, &usage, &[]);

        let symbols = vec![];
        let mut c = candidate(Path::new("empty.ts"), &symbols);
        c.is_empty = true;

        let dead = scorer.score(&c).unwrap();
        assert_eq!(dead.confidence, 95);
        assert!(dead.suggestions.is_some());
    }

    #[test]
    fn test_raising_threshold_never_adds_files() {
        let usage = DynamicUsage::default();
        let symbols = vec![];

        let mut flagged_at = Vec::new();
        for threshold in [0u8, 25, 50, 75, 100] {
            let thresholds = ConfidenceThresholds {
                minimum_threshold: threshold,
                ..Default::default()
            };
            let scorer = Scorer::new(&thresholds, &usage, &[]);
            let hit = scorer
                .score(&candidate(Path::new("dead.ts"), &symbols))
                .is_some();
            flagged_at.push(hit);
        }

        // Once a threshold drops the file, higher thresholds keep it dropped.
        let first_drop = flagged_at.iter().position(|hit| !hit);
        if let Some(pos) = first_drop {
            assert!(flagged_at[pos..].iter().all(|hit| !hit));
        }
    }

    #[test]
    fn test_sort_orders_by_confidence_then_path() {
        let mut files = vec![
            DeadFile {
                path: PathBuf::from("b.ts"),
                confidence: 85,
                reasons: vec![],
                suggestions: None,
            },
            DeadFile {
                path: PathBuf::from("a.ts"),
                confidence: 85,
                reasons: vec![],
                suggestions: None,
            },
            DeadFile {
                path: PathBuf::from("c.ts"),
                confidence: 95,
                reasons: vec![],
                suggestions: None,
            },
        ];

        sort_dead_files(&mut files);
        assert_eq!(files[0].path, PathBuf::from("c.ts"));
        assert_eq!(files[1].path, PathBuf::from("a.ts"));
        assert_eq!(files[2].path, PathBuf::from("b.ts"));
    }
}
