use super::*;
use pipeql_analyzer::{Operation, PlanMethod};
use pretty_assertions::assert_eq;

#[test]
fn test_rows_follow_preorder() {
    let plan = PlanNode::new(Operation::Join)
        .with_method(PlanMethod::Hash)
        .with_condition("a.id = b.id")
        .with_cost(1.0, 2.5)
        .with_child(PlanNode::new(Operation::Scan).with_table("a"))
        .with_child(
            PlanNode::new(Operation::Other("Hash".to_string()))
                .with_child(PlanNode::new(Operation::Scan).with_table("b")),
        );

    let rows = plan_rows(&plan);
    let labels: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();

    assert_eq!(labels, vec!["HASH JOIN", "  SCAN", "  Hash", "    SCAN"]);
    assert_eq!(rows[0][3], "1.00..2.50");
    assert_eq!(rows[0][4], "condition: a.id = b.id\nmethod: HASH");
    assert_eq!(rows[3][0], "2");
    assert_eq!(rows[3][2], "b");
}

#[test]
fn test_table_contains_every_node() {
    let plan = PlanNode::new(Operation::Limit)
        .with_child(PlanNode::new(Operation::Scan).with_table("customer"));

    let rendered = plan_table(&plan).to_string();

    assert!(rendered.contains("Operation"));
    assert!(rendered.contains("LIMIT"));
    assert!(rendered.contains("customer"));
}
