//! Deadwood Engine - the unified analysis orchestrator.
//!
//! Ties the compiler service, pattern detector and dependency graph into
//! one `analyze` call producing an [`deadwood_core::AnalysisResult`]:
//! dead-file candidates with calibrated confidence scores rather than
//! binary verdicts.
//!
//! The entry point is [`Analyzer`] (or the [`analyze`] convenience
//! function). Collaborators feed configuration in and consume the result
//! out; the engine holds no state across calls.

pub mod engine;
pub mod extract;
pub mod scoring;

pub use engine::{analyze, Analyzer};
pub use extract::{count_lines_of_code, extract_file, FileExtract, RawImport};
pub use scoring::{Candidate, Scorer};
