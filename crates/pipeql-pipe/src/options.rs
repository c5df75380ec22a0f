//! Conversion options
//!
//! Options are plain serializable data so hosts can persist them in their own
//! settings files; every field has a default.

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    Dialect as SqlParserDialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};

/// Deepest subquery nesting followed by the extractor by default
pub const DEFAULT_MAX_SUBQUERY_DEPTH: usize = 32;

/// Options controlling SQL parsing and pipe-syntax output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeOptions {
    /// Append `-- cost=...` comments to stages bound to a plan node
    pub annotate_costs: bool,
    /// Maximum subquery nesting before extraction gives up
    pub max_subquery_depth: usize,
    /// Dialect used to parse SQL text
    pub dialect: SqlDialect,
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self {
            annotate_costs: true,
            max_subquery_depth: DEFAULT_MAX_SUBQUERY_DEPTH,
            dialect: SqlDialect::PostgreSql,
        }
    }
}

impl PipeOptions {
    pub fn with_costs(mut self, annotate: bool) -> Self {
        self.annotate_costs = annotate;
        self
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_max_subquery_depth(mut self, depth: usize) -> Self {
        self.max_subquery_depth = depth;
        self
    }
}

/// SQL dialect variants for the SQL parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    PostgreSql,
    MySql,
    Sqlite,
    /// Generic ANSI SQL (fallback)
    Ansi,
}

impl SqlDialect {
    /// Get the sqlparser dialect for this SQL variant
    pub fn sqlparser_dialect(&self) -> Box<dyn SqlParserDialect> {
        match self {
            SqlDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
            SqlDialect::Ansi => Box::new(GenericDialect {}),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSql => "PostgreSQL",
            SqlDialect::MySql => "MySQL",
            SqlDialect::Sqlite => "SQLite",
            SqlDialect::Ansi => "ANSI SQL",
        }
    }
}
