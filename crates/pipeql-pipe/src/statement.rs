//! SQL clause model and the `sqlparser` front end that fills it
//!
//! The extractor only ever sees [`SelectStatement`]: a fixed set of typed
//! clauses whose expressions are already rendered to SQL text. Expressions are
//! opaque from here on; nothing downstream interprets columns or tables.

use crate::error::{PipeError, Result};
use crate::options::PipeOptions;
use sqlparser::ast::{
    GroupByExpr, Join, JoinConstraint, JoinOperator, Query, Select, SetExpr, Statement,
    TableFactor,
};
use sqlparser::parser::Parser;
use std::fmt;

/// A parsed `SELECT` statement reduced to the clauses pipe syntax needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
    pub from: Option<TableSource>,
    /// Joins in source order
    pub joins: Vec<JoinClause>,
    /// `WHERE` predicate
    pub selection: Option<String>,
    /// Select list items
    pub projection: Vec<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    /// `ORDER BY` items, each with its direction
    pub order_by: Vec<String>,
    pub limit: Option<String>,
}

impl SelectStatement {
    /// Statement reading from a single table
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            from: Some(TableSource::Table(table.into())),
            ..Self::default()
        }
    }

    /// Statement reading from a subquery
    pub fn from_subquery(subquery: SelectStatement) -> Self {
        Self {
            from: Some(TableSource::Subquery(Box::new(subquery))),
            ..Self::default()
        }
    }
}

/// Row source of a `FROM` or `JOIN`
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// Table reference rendered verbatim, alias included
    Table(String),
    Subquery(Box<SelectStatement>),
}

/// A single join as written in the statement
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Declared kind; `Outer` still needs its side resolved
    pub kind: JoinKind,
    pub source: TableSource,
    /// `ON` predicate
    pub condition: Option<String>,
    /// `USING` columns
    pub using: Vec<String>,
    /// The whole join rendered as SQL
    pub sql: String,
}

impl JoinClause {
    pub fn new(kind: JoinKind, source: TableSource) -> Self {
        Self {
            kind,
            source,
            condition: None,
            using: Vec::new(),
            sql: String::new(),
        }
    }

    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = sql.into();
        self
    }

    /// Kind shown in pipe syntax
    ///
    /// An `Outer` join takes its side from the rendered join keywords: `LEFT`
    /// wins over `RIGHT`, which wins over `FULL`. Only the text before the
    /// `JOIN` keyword is inspected, so predicates never influence the side.
    pub fn resolved_kind(&self) -> JoinKind {
        match &self.kind {
            JoinKind::Outer => {
                let keywords = self.sql.split("JOIN").next().unwrap_or_default();
                if keywords.contains("LEFT") {
                    JoinKind::Left
                } else if keywords.contains("RIGHT") {
                    JoinKind::Right
                } else if keywords.contains("FULL") {
                    JoinKind::Full
                } else {
                    JoinKind::Outer
                }
            }
            other => other.clone(),
        }
    }

    /// ` ON <cond>` or ` USING (<cols>)`, empty when the join has neither
    pub fn constraint_suffix(&self) -> String {
        if let Some(condition) = &self.condition {
            format!(" ON {condition}")
        } else if !self.using.is_empty() {
            format!(" USING ({})", self.using.join(", "))
        } else {
            String::new()
        }
    }
}

/// Join kind keyword
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum JoinKind {
    #[default]
    Inner,
    /// Outer join whose side has not been resolved yet
    Outer,
    Left,
    Right,
    Full,
    Cross,
    /// Any other join flavour, e.g. `LEFT SEMI`
    Other(String),
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER"),
            JoinKind::Outer => f.write_str("OUTER"),
            JoinKind::Left => f.write_str("LEFT"),
            JoinKind::Right => f.write_str("RIGHT"),
            JoinKind::Full => f.write_str("FULL"),
            JoinKind::Cross => f.write_str("CROSS"),
            JoinKind::Other(label) => f.write_str(label),
        }
    }
}

// ============================================================================
// sqlparser front end
// ============================================================================

/// Parses a single `SELECT` statement into the clause model
pub fn parse_select(sql: &str, options: &PipeOptions) -> Result<SelectStatement> {
    let dialect = options.dialect.sqlparser_dialect();
    let statements = Parser::parse_sql(dialect.as_ref(), sql)?;

    let [statement] = statements.as_slice() else {
        return Err(PipeError::StatementCount(statements.len()));
    };

    match statement {
        Statement::Query(query) => from_query(query, 0, options.max_subquery_depth),
        other => {
            let kind = other.to_string();
            let kind = kind.split_whitespace().next().unwrap_or_default().to_uppercase();
            Err(PipeError::UnsupportedStatement(kind))
        }
    }
}

fn from_query(query: &Query, depth: usize, max_depth: usize) -> Result<SelectStatement> {
    if depth > max_depth {
        return Err(PipeError::NestingTooDeep(max_depth));
    }

    let mut statement = match query.body.as_ref() {
        SetExpr::Select(select) => from_select(select, depth, max_depth)?,
        SetExpr::Query(inner) => from_query(inner, depth + 1, max_depth)?,
        SetExpr::SetOperation { op, .. } => {
            return Err(PipeError::UnsupportedStatement(op.to_string()));
        }
        other => {
            let kind = other.to_string();
            let kind = kind.split_whitespace().next().unwrap_or_default().to_uppercase();
            return Err(PipeError::UnsupportedStatement(kind));
        }
    };

    if let Some(order_by) = &query.order_by {
        statement.order_by = order_by.exprs.iter().map(ToString::to_string).collect();
    }
    if let Some(limit) = &query.limit {
        statement.limit = Some(limit.to_string());
    }

    Ok(statement)
}

fn from_select(select: &Select, depth: usize, max_depth: usize) -> Result<SelectStatement> {
    let mut statement = SelectStatement::default();

    for (idx, table_with_joins) in select.from.iter().enumerate() {
        let source = table_source(&table_with_joins.relation, depth, max_depth)?;
        if idx == 0 {
            statement.from = Some(source);
        } else {
            // `FROM a, b` lists further sources without a join keyword
            statement.joins.push(
                JoinClause::new(JoinKind::Inner, source)
                    .with_sql(table_with_joins.relation.to_string()),
            );
        }

        for join in &table_with_joins.joins {
            statement.joins.push(join_clause(join, depth, max_depth)?);
        }
    }

    statement.selection = select.selection.as_ref().map(ToString::to_string);
    statement.projection = select.projection.iter().map(ToString::to_string).collect();
    statement.group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _) => exprs.iter().map(ToString::to_string).collect(),
        GroupByExpr::All(_) => vec!["ALL".to_string()],
    };
    statement.having = select.having.as_ref().map(ToString::to_string);

    Ok(statement)
}

fn table_source(factor: &TableFactor, depth: usize, max_depth: usize) -> Result<TableSource> {
    match factor {
        TableFactor::Derived { subquery, .. } => Ok(TableSource::Subquery(Box::new(
            from_query(subquery, depth + 1, max_depth)?,
        ))),
        other => Ok(TableSource::Table(other.to_string())),
    }
}

fn join_clause(join: &Join, depth: usize, max_depth: usize) -> Result<JoinClause> {
    let sql = join.to_string().trim().to_string();

    let label = sql.split("JOIN").next().unwrap_or_default().trim();

    let (kind, constraint) = match &join.join_operator {
        // NATURAL keeps its keywords since it has no condition to show
        JoinOperator::Inner(JoinConstraint::Natural)
        | JoinOperator::LeftOuter(JoinConstraint::Natural)
        | JoinOperator::RightOuter(JoinConstraint::Natural)
        | JoinOperator::FullOuter(JoinConstraint::Natural) => {
            (JoinKind::Other(label.to_string()), None)
        }
        JoinOperator::Inner(constraint) => (JoinKind::Inner, Some(constraint)),
        JoinOperator::LeftOuter(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint) => (JoinKind::Outer, Some(constraint)),
        JoinOperator::CrossJoin => (JoinKind::Cross, None),
        _ if label.is_empty() => (JoinKind::Inner, None),
        _ => (JoinKind::Other(label.to_string()), None),
    };

    let mut clause = JoinClause::new(kind, table_source(&join.relation, depth, max_depth)?);
    match constraint {
        Some(JoinConstraint::On(expr)) => clause.condition = Some(expr.to_string()),
        Some(JoinConstraint::Using(columns)) => {
            clause.using = columns.iter().map(ToString::to_string).collect();
        }
        _ => {}
    }
    clause.sql = sql;

    Ok(clause)
}

#[cfg(test)]
mod tests;
