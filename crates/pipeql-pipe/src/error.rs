//! Error types for SQL to pipe-syntax conversion

use thiserror::Error;

/// Failures that stop a conversion
///
/// Structurally unexpected but valid input never lands here: unsupported
/// clauses are dropped and unmatched stages simply carry no cost.
#[derive(Debug, Error)]
pub enum PipeError {
    #[error("SQL parse error: {0}")]
    Parse(#[from] sqlparser::parser::ParserError),

    #[error("Expected exactly one statement, found {0}")]
    StatementCount(usize),

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("Subqueries nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Result type alias for pipe-syntax conversion
pub type Result<T> = std::result::Result<T, PipeError>;
