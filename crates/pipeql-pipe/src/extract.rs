//! SQL Clause Extractor
//!
//! Walks a [`SelectStatement`] and emits one pipe-syntax fragment per clause,
//! always in the same order:
//!
//! `FROM`, each `JOIN` in source order, `WHERE`, `AGGREGATE` (or `SELECT` when
//! there is no `GROUP BY`), `HAVING`, `ORDER BY`, `LIMIT`.
//!
//! Subqueries in `FROM` and `JOIN` position are inlined: their own fragments
//! are spliced into the sequence where the outer source would have been.

use crate::error::{PipeError, Result};
use crate::options::PipeOptions;
use crate::statement::{JoinKind, SelectStatement, TableSource};
use pipeql_analyzer::{NodeCost, PlanNode};
use std::fmt;

/// Name given to an inlined subquery when it is joined
pub const SUBPLAN: &str = "subplan";

/// Clause a fragment was produced from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    From,
    Join(JoinKind),
    Where,
    Aggregate,
    Select,
    Having,
    OrderBy,
    Limit,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::From => f.write_str("FROM"),
            ClauseKind::Join(kind) => write!(f, "{kind} JOIN"),
            ClauseKind::Where => f.write_str("WHERE"),
            ClauseKind::Aggregate => f.write_str("AGGREGATE"),
            ClauseKind::Select => f.write_str("SELECT"),
            ClauseKind::Having => f.write_str("HAVING"),
            ClauseKind::OrderBy => f.write_str("ORDER BY"),
            ClauseKind::Limit => f.write_str("LIMIT"),
        }
    }
}

/// One pipe-syntax stage
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseFragment<'p> {
    pub kind: ClauseKind,
    /// SQL text following the clause keyword
    pub text: String,
    /// Subquery nesting level, 0 for the outer statement
    pub depth: usize,
    /// Plan operator bound by alignment
    pub plan: Option<&'p PlanNode>,
}

impl<'p> ClauseFragment<'p> {
    pub fn new(kind: ClauseKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            depth: 0,
            plan: None,
        }
    }

    fn nested(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Cost of the bound plan operator, if any
    pub fn cost(&self) -> Option<NodeCost> {
        self.plan.and_then(|node| node.cost)
    }
}

/// Extracts the pipe-syntax fragments of a statement in canonical order
pub fn extract_clauses(
    statement: &SelectStatement,
    options: &PipeOptions,
) -> Result<Vec<ClauseFragment<'static>>> {
    let mut extractor = Extractor {
        fragments: Vec::new(),
        max_depth: options.max_subquery_depth,
    };
    extractor.extract(statement, 0)?;
    Ok(extractor.fragments)
}

struct Extractor {
    fragments: Vec<ClauseFragment<'static>>,
    max_depth: usize,
}

impl Extractor {
    fn push(&mut self, kind: ClauseKind, text: impl Into<String>, depth: usize) {
        self.fragments
            .push(ClauseFragment::new(kind, text).nested(depth));
    }

    fn extract(&mut self, statement: &SelectStatement, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(PipeError::NestingTooDeep(self.max_depth));
        }

        match &statement.from {
            Some(TableSource::Table(table)) => self.push(ClauseKind::From, table.as_str(), depth),
            Some(TableSource::Subquery(subquery)) => self.extract(subquery, depth + 1)?,
            None => tracing::trace!(depth, "statement has no FROM clause"),
        }

        for join in &statement.joins {
            let kind = ClauseKind::Join(join.resolved_kind());
            let suffix = join.constraint_suffix();
            match &join.source {
                TableSource::Table(table) => self.push(kind, format!("{table}{suffix}"), depth),
                TableSource::Subquery(subquery) => {
                    self.extract(subquery, depth + 1)?;
                    self.push(kind, format!("{SUBPLAN}{suffix}"), depth);
                }
            }
        }

        if let Some(selection) = &statement.selection {
            self.push(ClauseKind::Where, selection.as_str(), depth);
        }

        // Grouped statements show their keys as the projection; aggregate
        // expressions of the select list are not itemized.
        if !statement.group_by.is_empty() {
            let keys = statement.group_by.join(", ");
            self.push(ClauseKind::Aggregate, format!("{keys} GROUP BY {keys}"), depth);
        } else if !statement.projection.is_empty() {
            self.push(ClauseKind::Select, statement.projection.join(", "), depth);
        } else {
            tracing::trace!(depth, "statement has an empty select list");
        }

        if let Some(having) = &statement.having {
            self.push(ClauseKind::Having, having.as_str(), depth);
        }

        if !statement.order_by.is_empty() {
            self.push(ClauseKind::OrderBy, statement.order_by.join(", "), depth);
        }

        if let Some(limit) = &statement.limit {
            self.push(ClauseKind::Limit, limit.as_str(), depth);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
