//! Pipe-syntax rendering
//!
//! Two entry points produce the final `FROM ... |> OP ...` text: one from
//! aligned clause fragments, one from a plan tree when no SQL is available.
//! Both are deterministic: the same input always renders byte-identically.

use crate::extract::ClauseFragment;
use crate::options::PipeOptions;
use pipeql_analyzer::{Operation, PlanNode};

/// Prefix of every pipe stage after the first
pub const PIPE: &str = "|> ";

/// Renders clause fragments, one line each
pub fn render_fragments(fragments: &[ClauseFragment<'_>], options: &PipeOptions) -> String {
    let lines: Vec<String> = fragments
        .iter()
        .enumerate()
        .map(|(idx, fragment)| {
            let prefix = if idx == 0 { "" } else { PIPE };
            let mut line = format!("{prefix}{} {}", fragment.kind, fragment.text);
            if options.annotate_costs
                && let Some(cost) = fragment.cost()
            {
                line.push_str(&format!(" -- cost={cost}"));
            }
            line
        })
        .collect();

    lines.join("\n")
}

/// Renders a plan tree alone, one line per node in pre-order
///
/// A scan at the root becomes the `FROM` line itself. Any other root gets a
/// bare `FROM` line naming the first scanned table, followed by its own
/// operator line.
pub fn render_plan(root: &PlanNode, options: &PipeOptions) -> String {
    let mut lines = Vec::with_capacity(root.node_count() + 1);

    if root.operation == Operation::Scan
        && let Some(table) = &root.table
    {
        let mut line = format!("FROM {table}");
        if let Some(filter) = root.filter() {
            line.push_str(&format!(" WHERE {filter}"));
        }
        lines.push(with_costs(line, root, options));
    } else {
        let source = root
            .first_table()
            .map(String::from)
            .unwrap_or_else(|| root.operation.to_string());
        lines.push(format!("FROM {source}"));
        lines.push(with_costs(format!("{PIPE}{}", operator_line(root)), root, options));
    }

    for node in root.iter().skip(1) {
        lines.push(with_costs(format!("{PIPE}{}", operator_line(node)), node, options));
    }

    lines.join("\n")
}

/// Operator text built from the node's own kind and properties
fn operator_line(node: &PlanNode) -> String {
    let mut line = match &node.operation {
        Operation::Scan => match &node.table {
            Some(table) => format!("SCAN {table}"),
            None => "SCAN".to_string(),
        },
        Operation::Join => {
            let mut line = node.display_label();
            if let Some(condition) = node.join_condition() {
                line.push_str(&format!(" ON {condition}"));
            }
            line
        }
        Operation::Aggregate => match node.group_key() {
            Some(key) => format!("AGGREGATE GROUP BY {key}"),
            None => "AGGREGATE".to_string(),
        },
        Operation::Sort => match node.sort_spec() {
            Some((key, _)) if has_direction(key) => format!("ORDER BY {key}"),
            Some((key, order)) => format!("ORDER BY {key} {order}"),
            None => "SORT".to_string(),
        },
        Operation::Limit => "LIMIT".to_string(),
        Operation::Other(label) => label.clone(),
    };

    if let Some(filter) = node.filter() {
        line.push_str(&format!(" WHERE {filter}"));
    }
    line
}

/// Whether the last sort key already names its direction
fn has_direction(key: &str) -> bool {
    key.rsplit(',')
        .next()
        .is_some_and(|last| last.split_whitespace().any(|word| word == "ASC" || word == "DESC"))
}

fn with_costs(mut line: String, node: &PlanNode, options: &PipeOptions) -> String {
    if options.annotate_costs
        && let Some(cost) = node.cost
    {
        line.push_str(&format!(
            " -- startup cost: {:.2}, total cost: {:.2}",
            cost.startup, cost.total
        ));
    }
    line
}
