//! PostgreSQL EXPLAIN Parser
//!
//! Parses EXPLAIN output from PostgreSQL into a [`PlanNode`] tree:
//! - Text format (`EXPLAIN ANALYZE`), indentation encodes nesting
//! - JSON format (`EXPLAIN (FORMAT JSON)`), nesting encodes nesting
//!
//! Malformed plans are not errors: every entry point yields `None` when there
//! is nothing to show. Only JSON that fails to tokenize is reported.
//!
//! # Examples
//!
//! ```
//! use pipeql_analyzer::explain::{Operation, parse_text_plan};
//!
//! let root = parse_text_plan("Seq Scan on customer  (cost=0.00..1.00 rows=1 width=4)").unwrap();
//! assert_eq!(root.operation, Operation::Scan);
//! assert_eq!(root.table.as_deref(), Some("customer"));
//! ```

use crate::explain::plan::{NodeCost, Operation, PlanNode, SortOrder};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Deepest JSON plan nesting that is followed; deeper subtrees are dropped
pub const MAX_PLAN_DEPTH: usize = 256;

/// Errors that can occur when reading PostgreSQL EXPLAIN output
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type for PostgreSQL EXPLAIN parsing
pub type Result<T> = std::result::Result<T, ExplainError>;

static OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"->\s+([A-Za-z ]+)").expect("valid operator regex"));

static COST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(cost=(\d+\.\d+)\.\.(\d+\.\d+)").expect("valid cost regex")
});

static RELATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bon\s+(\w+)").expect("valid relation regex"));

/// Operator lines mentioning these belong to parallel execution scaffolding
const PARALLEL_MARKERS: [&str; 4] = ["Partial", "Finalize", "Gather", "Worker"];

/// Parses PostgreSQL EXPLAIN output (JSON or text format)
///
/// Automatically detects the format based on the input.
pub fn parse_postgres_explain(output: &str) -> Result<Option<PlanNode>> {
    let trimmed = output.trim();

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json_plan_str(trimmed)
    } else {
        Ok(parse_text_plan(output))
    }
}

// ============================================================================
// Text format
// ============================================================================

/// Parses PostgreSQL text-format `EXPLAIN ANALYZE` output
///
/// The first line of the report carries no `->` arrow, so one is prepended to
/// make the root parse like every other operator line.
pub fn parse_text_plan(text: &str) -> Option<PlanNode> {
    let plan = format!("-> {text}");

    // (indent, node) frames; each frame's node is a child of the frame below it
    let mut stack: Vec<(usize, PlanNode)> = Vec::new();
    let mut root: Option<PlanNode> = None;
    // Annotations after a skipped operator describe that operator, not the stack top
    let mut in_skipped_operator = false;

    for line in plan.lines() {
        if !line.contains("->") {
            if !in_skipped_operator && let Some((_, current)) = stack.last_mut() {
                apply_annotation(current, line);
            }
            continue;
        }

        if PARALLEL_MARKERS.iter().any(|marker| line.contains(marker)) {
            tracing::trace!(line = line.trim(), "skipping parallel execution operator");
            in_skipped_operator = true;
            continue;
        }

        let Some(captures) = OPERATOR_RE.captures(line) else {
            tracing::trace!(line = line.trim(), "skipping line without operator label");
            continue;
        };
        in_skipped_operator = false;

        let label = captures[1].trim();
        if label.is_empty() {
            continue;
        }
        let indent = count_indent(line);
        let node = parse_operator_line(label, line);

        while stack.last().is_some_and(|(top, _)| *top >= indent) {
            close_frame(&mut stack, &mut root);
        }
        stack.push((indent, node));
    }

    while !stack.is_empty() {
        close_frame(&mut stack, &mut root);
    }

    if root.is_none() {
        tracing::debug!("text plan contained no operator lines");
    }
    root
}

/// Pops the top frame and attaches its node to the frame beneath it
///
/// A frame with nothing beneath it is a finished top-level tree.
fn close_frame(stack: &mut Vec<(usize, PlanNode)>, root: &mut Option<PlanNode>) {
    let Some((_, node)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => {
            parent.add_child(node);
        }
        None => {
            if root.is_some() {
                tracing::debug!("replacing previous top-level plan node");
            }
            *root = Some(node);
        }
    }
}

/// Builds a node from an operator line such as `->  Seq Scan on t  (cost=0.00..1.00 ...)`
fn parse_operator_line(label: &str, line: &str) -> PlanNode {
    let mut node = PlanNode::from_label(label);

    if let Some(cost) = COST_RE.captures(line)
        && let (Ok(startup), Ok(total)) = (cost[1].parse::<f64>(), cost[2].parse::<f64>())
    {
        node.cost = Some(NodeCost::new(startup, total));
    }

    if node.operation == Operation::Scan
        && let Some(relation) = RELATION_RE.captures(line)
    {
        node.table = Some(relation[1].to_string());
    }

    node
}

/// Applies a detail line (`Sort Key:`, `Filter:` ...) to the current operator
fn apply_annotation(node: &mut PlanNode, line: &str) {
    let props = &mut node.properties;

    if line.contains("Rows Removed by") {
        // row counts are not part of the canonical tree
    } else if let Some(key) = value_after(line, "Sort Key:") {
        props.sort_order = Some(SortOrder::infer(line));
        props.sort_key = Some(key);
    } else if let Some(key) = value_after(line, "Group Key:") {
        props.group_key = Some(key);
    } else if let Some(cond) = value_after(line, "Hash Cond:") {
        props.condition = Some(cond);
    } else if let Some(cond) = value_after(line, "Merge Cond:") {
        props.condition = Some(cond);
    } else if let Some(cond) = value_after(line, "Join Filter:") {
        props.condition.get_or_insert(cond);
    } else if let Some(filter) = value_after(line, "Filter:") {
        props.filter = Some(filter);
    }
}

/// Text following `marker` on the line, if the marker is present and the text is not empty
fn value_after(line: &str, marker: &str) -> Option<String> {
    let idx = line.find(marker)? + marker.len();
    let value = line[idx..].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Helper to count leading whitespace (indentation)
fn count_indent(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

// ============================================================================
// JSON format
// ============================================================================

/// Parses PostgreSQL EXPLAIN (FORMAT JSON) output from a string
///
/// Invalid JSON is an error; valid JSON of the wrong shape yields `None`.
pub fn parse_json_plan_str(json: &str) -> Result<Option<PlanNode>> {
    let value: Value = serde_json::from_str(json)?;
    Ok(parse_json_plan(&value))
}

/// Parses a PostgreSQL EXPLAIN (FORMAT JSON) document
///
/// The document must be a non-empty array whose first element has a `Plan`
/// object; anything else yields `None`. Parallel execution scaffolding is
/// skipped the same way as in text plans.
pub fn parse_json_plan(document: &Value) -> Option<PlanNode> {
    // PostgreSQL JSON EXPLAIN wraps the plan in an array
    let Some(plan_obj) = document
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("Plan"))
        .filter(|plan| plan.is_object())
    else {
        tracing::debug!("JSON plan is not an array with a leading Plan object");
        return None;
    };

    let mut roots = Vec::new();
    collect_plan_nodes(plan_obj, 0, &mut roots);
    if roots.len() > 1 {
        tracing::debug!(count = roots.len(), "skipped root left several subtrees, keeping the last");
    }

    let root = roots.pop();
    if root.is_none() {
        tracing::debug!("JSON plan has no operator with a Node Type");
    }
    root
}

/// Parses the plan node at `value` into `out`
///
/// A skipped parallel operator contributes its surviving children instead,
/// so they attach to the nearest kept ancestor. Nodes without `Node Type` are
/// dropped together with their subtree.
fn collect_plan_nodes(value: &Value, depth: usize, out: &mut Vec<PlanNode>) {
    let Some(node_type) = value.get("Node Type").and_then(|v| v.as_str()) else {
        tracing::warn!(depth, "skipping plan without Node Type");
        return;
    };

    let mut children = value.get("Plans").and_then(|v| v.as_array());
    if children.is_some() && depth + 1 >= MAX_PLAN_DEPTH {
        tracing::warn!(depth, "JSON plan nesting too deep, dropping subtree");
        children = None;
    }
    let children = children.into_iter().flatten();

    if is_parallel_scaffolding(node_type, value) {
        tracing::trace!(node_type, "skipping parallel execution operator");
        for child in children {
            collect_plan_nodes(child, depth + 1, out);
        }
        return;
    }

    let mut node = parse_plan_node(node_type, value);
    for child in children {
        collect_plan_nodes(child, depth + 1, &mut node.children);
    }
    out.push(node);
}

/// Gather nodes and the partial/finalize halves of a parallel aggregate
fn is_parallel_scaffolding(node_type: &str, value: &Value) -> bool {
    PARALLEL_MARKERS.iter().any(|marker| node_type.contains(marker))
        || matches!(
            value.get("Partial Mode").and_then(|v| v.as_str()),
            Some("Partial" | "Finalize")
        )
}

/// Builds a single node from its JSON keys, children excluded
fn parse_plan_node(node_type: &str, value: &Value) -> PlanNode {
    let mut node = PlanNode::from_label(node_type);

    if node.operation == Operation::Scan
        && let Some(rel) = value.get("Relation Name").and_then(|v| v.as_str())
    {
        node.table = Some(rel.to_string());
    }

    // Cost information
    let startup_cost = value.get("Startup Cost").and_then(|v| v.as_f64());
    let total_cost = value.get("Total Cost").and_then(|v| v.as_f64());
    if let (Some(startup), Some(total)) = (startup_cost, total_cost) {
        node.cost = Some(NodeCost::new(startup, total));
    }

    let props = &mut node.properties;

    if let Some(filter) = value.get("Filter").and_then(|v| v.as_str()) {
        props.filter = Some(filter.to_string());
    }

    props.condition = ["Hash Cond", "Merge Cond", "Join Filter"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(String::from);

    if let Some(keys) = value.get("Group Key").and_then(key_list) {
        props.group_key = Some(keys);
    }

    if let Some(keys) = value.get("Sort Key").and_then(key_list) {
        props.sort_order = Some(SortOrder::infer(&keys));
        props.sort_key = Some(keys);
    }

    node
}

/// Renders a key list (`["a", "b"]`) or a plain string key as `a, b`
fn key_list(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let keys: Vec<&str> = items.iter().filter_map(|k| k.as_str()).collect();
            (!keys.is_empty()).then(|| keys.join(", "))
        }
        _ => None,
    }
}
