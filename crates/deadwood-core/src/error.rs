//! Error types for deadwood core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for deadwood operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during analysis.
///
/// Errors split into two classes: *fatal* errors abort the whole analysis
/// and surface to the caller, *local* errors are logged, counted on the
/// result, and never change the verdict for other files.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is invalid or the project path does not exist. Fatal.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The project path handed to `analyze` does not exist. Fatal.
    #[error("Project path not found: {path}")]
    ProjectNotFound {
        /// The missing project root.
        path: PathBuf,
    },

    /// TOML parsing error (`.deadwood.toml`). Fatal.
    #[error("TOML parse error in {file}: {source}")]
    Toml {
        /// Path to the TOML file with the error.
        file: PathBuf,
        /// The underlying TOML parsing error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// JSON parsing error (tsconfig.json, package.json). Fatal when raised
    /// from configuration discovery.
    #[error("JSON parse error in {file}: {source}")]
    Json {
        /// Path to the JSON file with the error.
        file: PathBuf,
        /// The underlying JSON parsing error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be parsed. Local: the file becomes
    /// "unknown" and analysis continues.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// File that failed to parse.
        file: PathBuf,
        /// Parser diagnostic summary.
        message: String,
    },

    /// Exception during regex/AST pattern extraction. Local.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Graph too large for analysis.
    #[error("Graph has {module_count} modules, max allowed is {max_allowed}")]
    GraphTooLarge {
        module_count: usize,
        max_allowed: usize,
    },

    /// Circular dependency cycle too deep.
    #[error("Circular dependency depth {depth} exceeds max {max_allowed}")]
    CycleTooDeep { depth: usize, max_allowed: usize },

    /// Invalid path.
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Graph operation referenced a node that was never added. Internal
    /// invariant violation; fatal.
    #[error("Graph invariant violated: no node for {path}")]
    MissingNode { path: PathBuf },
}

impl Error {
    /// Whether this error aborts the whole analysis.
    ///
    /// Local errors (parse and pattern failures) accumulate into the
    /// result's `errors`/`warnings` counters instead.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Parse { .. } | Error::Pattern(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_local() {
        let err = Error::Parse {
            file: PathBuf::from("broken.ts"),
            message: "unexpected token".to_string(),
        };
        assert!(!err.is_fatal());

        let err = Error::Pattern("bad capture group".to_string());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = Error::Config {
            message: "minimum_threshold out of range".to_string(),
        };
        assert!(err.is_fatal());

        let err = Error::ProjectNotFound {
            path: PathBuf::from("/does/not/exist"),
        };
        assert!(err.is_fatal());
    }
}
