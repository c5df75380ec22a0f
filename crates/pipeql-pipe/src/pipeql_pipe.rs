//! PipeQL Pipe - SQL to pipe syntax
//!
//! This crate provides functionality for:
//! - Reducing a `SELECT` statement to its clauses and emitting them as ordered
//!   pipe-syntax stages (`FROM ... |> WHERE ... |> SELECT ...`)
//! - Aligning the stages with the operators of an EXPLAIN plan to annotate costs
//! - Rendering a plan tree alone as pipe syntax when no SQL is available
//!
//! # Examples
//!
//! ```
//! use pipeql_pipe::{PipeOptions, sql_to_pipe};
//!
//! let pipe = sql_to_pipe("SELECT a FROM t WHERE a > 1 LIMIT 5", None, &PipeOptions::default())?;
//! assert_eq!(pipe, "FROM t\n|> WHERE a > 1\n|> SELECT a\n|> LIMIT 5");
//! # Ok::<(), pipeql_pipe::PipeError>(())
//! ```

pub mod align;
pub mod error;
pub mod extract;
pub mod options;
pub mod render;
pub mod statement;

pub use align::{PlanQueue, align};
pub use error::{PipeError, Result};
pub use extract::{ClauseFragment, ClauseKind, extract_clauses};
pub use options::{PipeOptions, SqlDialect};
pub use render::{render_fragments, render_plan};
pub use statement::{JoinClause, JoinKind, SelectStatement, TableSource, parse_select};

use pipeql_analyzer::PlanNode;

/// Converts a SQL statement to pipe syntax
///
/// When a plan is given, stages are bound to its operators and annotated with
/// their costs; otherwise the plain pipe syntax is returned.
#[tracing::instrument(skip_all, fields(dialect = options.dialect.display_name(), with_plan = plan.is_some()))]
pub fn sql_to_pipe(sql: &str, plan: Option<&PlanNode>, options: &PipeOptions) -> Result<String> {
    let statement = parse_select(sql, options)?;
    let fragments = extract_clauses(&statement, options)?;
    tracing::debug!(fragments = fragments.len(), "extracted clause fragments");

    let rendered = match plan {
        Some(root) => render_fragments(&align(fragments, root), options),
        None => render_fragments(&fragments, options),
    };
    Ok(rendered)
}
