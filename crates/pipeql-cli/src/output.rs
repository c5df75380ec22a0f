//! Terminal formatting for plan trees

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use pipeql_analyzer::PlanNode;

const HEADER: [&str; 5] = ["Depth", "Operation", "Table", "Cost", "Properties"];

/// One row per node in pre-order, operation indented by depth
pub fn plan_rows(root: &PlanNode) -> Vec<[String; 5]> {
    let mut rows = Vec::with_capacity(root.node_count());
    collect_rows(root, 0, &mut rows);
    rows
}

fn collect_rows(node: &PlanNode, depth: usize, rows: &mut Vec<[String; 5]>) {
    let properties = node
        .property_map()
        .into_iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    rows.push([
        depth.to_string(),
        format!("{}{}", "  ".repeat(depth), node.display_label()),
        node.table.clone().unwrap_or_default(),
        node.cost_range().unwrap_or_default(),
        properties,
    ]);

    for child in &node.children {
        collect_rows(child, depth + 1, rows);
    }
}

pub fn plan_table(root: &PlanNode) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADER);
    for row in plan_rows(root) {
        table.add_row(row);
    }
    table
}

#[cfg(test)]
mod tests;
