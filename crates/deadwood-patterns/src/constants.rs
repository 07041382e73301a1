//! Limits applied to user-supplied patterns.
//!
//! Custom regexes come from configuration files that may be shared or
//! vendored; the limits below keep a pathological pattern from turning
//! into a ReDoS or memory-exhaustion problem.

/// Maximum regex pattern length (500 characters).
pub const MAX_REGEX_LENGTH: usize = 500;

/// Compiled regex size limit (10MB).
pub const REGEX_SIZE_LIMIT: usize = 10_000_000;

/// Regex DFA size limit (2MB).
pub const REGEX_DFA_SIZE_LIMIT: usize = 2_000_000;
