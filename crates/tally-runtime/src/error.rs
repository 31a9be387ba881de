//! Runtime error types for the sandbox evaluator.

use thiserror::Error;

use crate::value::Value;

/// Evaluation error. The `Return`/`Break`/`Continue` variants are internal
/// control-flow signals that never escape a well-formed program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The source did not parse.
    #[error("parse failed: {0}")]
    Parse(String),

    /// Unknown variable.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    /// Operand types do not fit the operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(&'static str),

    /// Call target is not callable.
    #[error("not a function")]
    NotAFunction,

    /// A construct the reference evaluator does not execute (`with`,
    /// `new`, `yield`); the host engine is the execution authority there.
    #[error("unsupported at runtime: {0}")]
    Unsupported(&'static str),

    /// A `throw` from contract code.
    #[error("uncaught exception: {0}")]
    Thrown(String),

    /// The instruction budget was exhausted.
    #[error("instruction budget exceeded: {used} > {budget}")]
    BudgetExceeded { used: u64, budget: u64 },

    /// `return` control-flow signal.
    #[error("return outside function")]
    Return(Value),

    /// `break` control-flow signal.
    #[error("break outside loop")]
    Break,

    /// `continue` control-flow signal.
    #[error("continue outside loop")]
    Continue,
}

/// Result alias for evaluator operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
