//! Query EXPLAIN Parser Module
//!
//! This module provides parsers for PostgreSQL EXPLAIN output:
//! - Text format, as printed by `EXPLAIN ANALYZE`
//! - JSON format, as printed by `EXPLAIN (FORMAT JSON)`
//!
//! Both produce the same [`PlanNode`] tree.
//!
//! # Example
//!
//! ```
//! use pipeql_analyzer::explain::{Operation, parse_json_plan_str, parse_text_plan};
//!
//! let text = parse_text_plan("Limit  (cost=0.00..0.04 rows=1 width=4)").unwrap();
//! assert_eq!(text.operation, Operation::Limit);
//!
//! let json = r#"[{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users"}}]"#;
//! let root = parse_json_plan_str(json).unwrap().unwrap();
//! assert_eq!(root.operation, Operation::Scan);
//! assert_eq!(root.table.as_deref(), Some("users"));
//! ```

pub mod plan;
pub mod postgres;

pub use plan::{
    NodeCost, NodeProperties, Operation, PlanMethod, PlanNode, PlanNodeIterator, SortOrder,
};
pub use postgres::{
    ExplainError, MAX_PLAN_DEPTH, parse_json_plan, parse_json_plan_str, parse_postgres_explain,
    parse_text_plan,
};
