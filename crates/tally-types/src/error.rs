use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error severity. The pipeline currently only emits `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Guard,
    Runtime,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNTERMINATED_COMMENT: Self = Self(102);
    pub const INVALID_NUMBER: Self = Self(103);
    pub const INVALID_CHARACTER: Self = Self(104);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(105);
    pub const NESTING_TOO_DEEP: Self = Self(106);

    // ── Guard errors (E200–E299) ──
    pub const COUNTER_REDEFINED: Self = Self(200);
    pub const COUNTER_REFERENCED: Self = Self(201);

    // ── Runtime/host errors (E300–E399) ──
    pub const BUDGET_EXCEEDED: Self = Self(300);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Guard,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Guard => write!(f, "guard"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// A structured Tally pipeline error.
///
/// Host tooling consumes these as JSON — it must not parse free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Byte range in the original source.
    pub span: Span,
    /// 1-based line of the span start.
    pub line: u32,
    /// 1-based column of the span start.
    pub column: u32,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl TallyError {
    /// Create a new error, resolving line/column context from the source file.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_file: &SourceFile,
    ) -> Self {
        let (line, column) = source_file.line_col(span.start);
        Self {
            file: source_file.name.clone(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            line,
            column,
            source_line: source_file.line_at_offset(span.start).to_string(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for TallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file, self.line, self.column, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for TallyError {}

/// Accumulator for pipeline errors, with a fail-fast cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<TallyError>,
    pub total_errors: usize,
}

impl Diagnostics {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the MAX_ERRORS cap is reached.
    pub fn at_capacity(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: TallyError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Take the first stored error, if any.
    pub fn into_first(self) -> Option<TallyError> {
        self.errors.into_iter().next()
    }
}
