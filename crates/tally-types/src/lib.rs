//! Shared types for the Tally instruction-counting injector.
//!
//! This crate defines the AST node types, byte-offset source spans, error
//! types, and other shared data structures used across all pipeline stages.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostics, ErrorCategory, ErrorCode, Severity, TallyError, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// The reserved global binding the host engine provides to instrumented code.
///
/// Contract code may read it (lenient guard mode) but must never shadow or
/// redeclare it; the strict guard mode forbids any reference at all.
pub const COUNTER_NAME: &str = "_instruction_counter";

/// Result type used throughout the Tally pipeline.
pub type Result<T> = std::result::Result<T, TallyError>;
