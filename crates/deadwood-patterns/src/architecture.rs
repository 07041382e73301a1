//! Architectural-core recognition.
//!
//! Infrastructure files (containers, kernels, registries, factories) are
//! frequently wired up in ways static analysis cannot see, so the scorer
//! halves the confidence of anything matching these name patterns.

use std::path::Path;

/// Name patterns indicating an architectural-core role. Matched
/// case-insensitively against the start of the basename stem; substring
/// containment would also catch `DeadService`-style leaf files, which is
/// exactly the population the analyzer exists to condemn.
const ARCHITECTURAL_PATTERNS: &[&str] = &[
    "application",
    "container",
    "servicecontainer",
    "commandbus",
    "config",
    "bootstrap",
    "kernel",
    "registry",
    "factory",
    "builder",
    "manager",
    "service",
    "provider",
];

/// Whether the file's basename marks it as architectural core.
pub fn is_architectural_core(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let stem = stem.to_ascii_lowercase();
    ARCHITECTURAL_PATTERNS
        .iter()
        .any(|pattern| stem.starts_with(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_names_match() {
        assert!(is_architectural_core(Path::new("src/ApplicationContainer.ts")));
        assert!(is_architectural_core(Path::new("src/CommandBus.ts")));
        assert!(is_architectural_core(Path::new("src/config.ts")));
        assert!(is_architectural_core(Path::new("src/Kernel.ts")));
        assert!(is_architectural_core(Path::new("src/ServiceContainer.ts")));
        assert!(is_architectural_core(Path::new("src/RegistryImpl.ts")));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert!(is_architectural_core(Path::new("BOOTSTRAP.ts")));
        assert!(is_architectural_core(Path::new("factoryHelpers.ts")));
    }

    #[test]
    fn test_leaf_files_do_not_match() {
        assert!(!is_architectural_core(Path::new("src/DeadService.ts")));
        assert!(!is_architectural_core(Path::new("src/RegularService.ts")));
        assert!(!is_architectural_core(Path::new("src/UserService.ts")));
        assert!(!is_architectural_core(Path::new("src/helpers.ts")));
        assert!(!is_architectural_core(Path::new("src/index.ts")));
    }
}
