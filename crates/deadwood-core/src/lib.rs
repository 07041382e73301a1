//! Deadwood Core - Shared types and the dependency graph.
//!
//! This crate provides the foundational pieces for deadwood's dead-file
//! analysis:
//!
//! - [`DependencyGraph`]: Typed, directed multigraph over file paths with
//!   reachability and cycle queries
//! - [`EdgeKind`]: Classification of dependency edges
//! - [`DynamicUsage`]: Symbols observed in dynamic wiring patterns
//! - [`AnalysisResult`] and [`DeadFile`]: The analysis output contract
//!
//! # Architecture
//!
//! Deadwood splits the analysis into small collaborators driven by a
//! single engine:
//!
//! ```text
//! ┌──────────────────┐
//! │   deadwood-cli   │  (User interface)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ deadwood-engine  │  (Orchestration + scoring)
//! └───┬────┬─────┬───┘
//!     │    │     │
//!     ▼    ▼     ▼
//! ┌───────┐ ┌────────┐ ┌───────────────┐
//! │compiler│ │patterns│ │ core (graph)  │
//! └───────┘ └────────┘ └───────────────┘
//! ```
//!
//! Control flow is strictly one-way: the engine drives the compiler
//! service, the pattern detector and the graph; none of them call back.

pub mod error;
pub mod graph;
pub mod types;

// Re-export core types for convenience
pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphNode, NodeId};
pub use types::{
    AnalysisResult, DeadFile, DynamicUsage, EdgeKind, FileClass, GraphStats, PerformanceMetrics,
};
