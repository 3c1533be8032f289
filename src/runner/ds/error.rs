use thiserror::Error;

/// Errors surfaced by the graph engine to its callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Error during compiling code \"{code}\": \"{message}\".")]
    CompilationFailure { code: String, message: String },

    #[error(
        "Error running code \"{}\" in scope with variables \"{}\": \"{}\".",
        .code,
        .variables.join("\", \""),
        .message
    )]
    EvaluationFailure {
        code: String,
        variables: Vec<String>,
        message: String,
    },

    #[error("Invalid pattern \"{pattern}\": {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Errors raised while interpreting dynamic code. They never reach callers
/// directly; the evaluator wraps them into `GraphError::EvaluationFailure`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
    #[error("Uncaught syntax error: {0}.")]
    SyntaxError(String),
}

impl From<GraphError> for EvalErrorType {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::CompilationFailure { .. } => EvalErrorType::SyntaxError(e.to_string()),
            _ => EvalErrorType::TypeError(e.to_string()),
        }
    }
}
