//! Tests for clause extraction

use super::*;
use crate::statement::{JoinClause, parse_select};
use pretty_assertions::assert_eq;

fn extract(sql: &str) -> Vec<ClauseFragment<'static>> {
    let options = PipeOptions::default();
    let statement = parse_select(sql, &options).expect("parse failed");
    extract_clauses(&statement, &options).expect("extraction failed")
}

fn lines(fragments: &[ClauseFragment<'_>]) -> Vec<String> {
    fragments
        .iter()
        .map(|fragment| format!("{} {}", fragment.kind, fragment.text))
        .collect()
}

#[test]
fn test_simple_select_order() {
    let fragments = extract("SELECT a FROM t WHERE a > 1 LIMIT 5");

    assert_eq!(
        lines(&fragments),
        vec!["FROM t", "WHERE a > 1", "SELECT a", "LIMIT 5"]
    );
    assert!(fragments.iter().all(|f| f.depth == 0 && f.plan.is_none()));
}

#[test]
fn test_full_clause_order() {
    let fragments = extract(
        "SELECT c_name, SUM(o_total) FROM customer \
         JOIN orders ON c_custkey = o_custkey \
         WHERE o_total > 10 \
         GROUP BY c_name \
         HAVING SUM(o_total) > 100 \
         ORDER BY c_name DESC \
         LIMIT 10",
    );

    let kinds: Vec<ClauseKind> = fragments.iter().map(|f| f.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            ClauseKind::From,
            ClauseKind::Join(JoinKind::Inner),
            ClauseKind::Where,
            ClauseKind::Aggregate,
            ClauseKind::Having,
            ClauseKind::OrderBy,
            ClauseKind::Limit,
        ]
    );
}

#[test]
fn test_order_ignores_field_population_order() {
    // Fields populated in reverse clause order still come out canonically
    let statement = SelectStatement {
        limit: Some("3".to_string()),
        order_by: vec!["a".to_string()],
        projection: vec!["a".to_string()],
        selection: Some("a > 0".to_string()),
        ..SelectStatement::from_table("t")
    };

    let fragments = extract_clauses(&statement, &PipeOptions::default()).unwrap();
    assert_eq!(
        lines(&fragments),
        vec!["FROM t", "WHERE a > 0", "SELECT a", "ORDER BY a", "LIMIT 3"]
    );
}

#[test]
fn test_group_by_mirrors_keys() {
    let fragments = extract("SELECT c, d, COUNT(*) FROM t GROUP BY c, d");

    assert_eq!(
        lines(&fragments),
        vec!["FROM t", "AGGREGATE c, d GROUP BY c, d"]
    );
    assert!(!fragments.iter().any(|f| f.kind == ClauseKind::Select));
}

#[test]
fn test_join_kinds_resolved() {
    let fragments = extract(
        "SELECT * FROM a \
         LEFT OUTER JOIN b ON a.id = b.id \
         RIGHT JOIN c ON b.id = c.id \
         CROSS JOIN d",
    );

    assert_eq!(
        lines(&fragments),
        vec![
            "FROM a",
            "LEFT JOIN b ON a.id = b.id",
            "RIGHT JOIN c ON b.id = c.id",
            "CROSS JOIN d",
            "SELECT *",
        ]
    );
}

#[test]
fn test_natural_join_line() {
    let fragments = extract("SELECT * FROM a NATURAL JOIN b");

    assert_eq!(lines(&fragments), vec!["FROM a", "NATURAL JOIN b", "SELECT *"]);
}

#[test]
fn test_outer_join_left_keyword_wins() {
    let statement = SelectStatement {
        joins: vec![
            JoinClause::new(JoinKind::Outer, TableSource::Table("u".into()))
                .on("t.id = u.id")
                .with_sql("LEFT OUTER JOIN u ON t.id = u.id"),
        ],
        ..SelectStatement::from_table("t")
    };

    let fragments = extract_clauses(&statement, &PipeOptions::default()).unwrap();
    assert_eq!(fragments[1].kind, ClauseKind::Join(JoinKind::Left));
    assert_eq!(fragments[1].kind.to_string(), "LEFT JOIN");
}

#[test]
fn test_from_subquery_is_spliced() {
    let fragments = extract("SELECT x FROM (SELECT x FROM t WHERE x > 1) AS sub ORDER BY x");

    assert_eq!(
        lines(&fragments),
        vec!["FROM t", "WHERE x > 1", "SELECT x", "SELECT x", "ORDER BY x"]
    );
    let depths: Vec<usize> = fragments.iter().map(|f| f.depth).collect();
    assert_eq!(depths, vec![1, 1, 1, 0, 0]);
}

#[test]
fn test_join_subquery_ends_with_subplan_line() {
    let fragments = extract(
        "SELECT * FROM a JOIN (SELECT id FROM b WHERE flag) AS s ON a.id = s.id",
    );

    assert_eq!(
        lines(&fragments),
        vec![
            "FROM a",
            "FROM b",
            "WHERE flag",
            "SELECT id",
            "INNER JOIN subplan ON a.id = s.id",
            "SELECT *",
        ]
    );
    assert_eq!(fragments[4].depth, 0);
}

#[test]
fn test_empty_projection_has_no_select() {
    let statement = SelectStatement {
        selection: Some("a = 1".to_string()),
        ..SelectStatement::from_table("t")
    };

    let fragments = extract_clauses(&statement, &PipeOptions::default()).unwrap();
    assert_eq!(lines(&fragments), vec!["FROM t", "WHERE a = 1"]);
}

#[test]
fn test_nesting_limit_enforced() {
    let innermost = SelectStatement::from_table("t");
    let statement = SelectStatement::from_subquery(SelectStatement::from_subquery(innermost));

    let shallow = PipeOptions::default().with_max_subquery_depth(1);
    let err = extract_clauses(&statement, &shallow).unwrap_err();
    assert!(matches!(err, PipeError::NestingTooDeep(1)));

    let fragments = extract_clauses(&statement, &PipeOptions::default()).unwrap();
    assert_eq!(lines(&fragments), vec!["FROM t"]);
    assert_eq!(fragments[0].depth, 2);
}
