//! Pattern detector: evidence of dynamic wiring.
//!
//! Naive reachability condemns files that are wired up dynamically -
//! dependency-injection containers, command buses, dynamic `import()`
//! calls, framework decorators. This crate extracts that evidence:
//!
//! - [`discover_entry_points`]: packaging metadata plus conventional
//!   layouts
//! - [`PatternDetector`]: the regex and AST passes filling a
//!   [`deadwood_core::DynamicUsage`] map
//! - [`is_architectural_core`]: file-name recognition of infrastructure
//!   files whose confidence the scorer dampens
//!
//! The detector never mutates the graph; it returns data the engine
//! integrates.

pub mod architecture;
mod constants;
pub mod dynamic;
pub mod entry_points;

pub use architecture::is_architectural_core;
pub use dynamic::PatternDetector;
pub use entry_points::discover_entry_points;
