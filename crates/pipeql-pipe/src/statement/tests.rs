//! Tests for the SQL clause model and front end

use super::*;
use pretty_assertions::assert_eq;

fn parse(sql: &str) -> SelectStatement {
    parse_select(sql, &PipeOptions::default()).expect("parse failed")
}

#[test]
fn test_parse_simple_select() {
    let statement = parse("SELECT a FROM t WHERE a > 1 LIMIT 5");

    assert_eq!(statement.from, Some(TableSource::Table("t".to_string())));
    assert_eq!(statement.selection, Some("a > 1".to_string()));
    assert_eq!(statement.projection, vec!["a".to_string()]);
    assert_eq!(statement.limit, Some("5".to_string()));
    assert!(statement.joins.is_empty());
    assert!(statement.group_by.is_empty());
}

#[test]
fn test_parse_grouping_and_ordering() {
    let statement = parse(
        "SELECT c, COUNT(*) FROM t GROUP BY c HAVING COUNT(*) > 5 ORDER BY c DESC, d;",
    );

    assert_eq!(statement.projection, vec!["c", "COUNT(*)"]);
    assert_eq!(statement.group_by, vec!["c"]);
    assert_eq!(statement.having, Some("COUNT(*) > 5".to_string()));
    assert_eq!(statement.order_by, vec!["c DESC", "d"]);
}

#[test]
fn test_parse_joins_in_source_order() {
    let statement = parse(
        "SELECT * FROM customer \
         JOIN orders ON c_custkey = o_custkey \
         LEFT JOIN lineitem ON o_orderkey = l_orderkey \
         CROSS JOIN region",
    );

    let kinds: Vec<JoinKind> = statement.joins.iter().map(|j| j.kind.clone()).collect();
    assert_eq!(kinds, vec![JoinKind::Inner, JoinKind::Outer, JoinKind::Cross]);

    let left = &statement.joins[1];
    assert_eq!(left.source, TableSource::Table("lineitem".to_string()));
    assert_eq!(left.condition, Some("o_orderkey = l_orderkey".to_string()));
    assert_eq!(left.resolved_kind(), JoinKind::Left);

    assert_eq!(statement.joins[2].condition, None);
}

#[test]
fn test_parse_right_and_full_outer_joins() {
    let statement = parse(
        "SELECT * FROM a RIGHT OUTER JOIN b ON a.id = b.id FULL OUTER JOIN c ON b.id = c.id",
    );

    assert_eq!(statement.joins[0].resolved_kind(), JoinKind::Right);
    assert_eq!(statement.joins[1].resolved_kind(), JoinKind::Full);
}

#[test]
fn test_parse_join_using() {
    let statement = parse("SELECT * FROM a JOIN b USING (id, region)");

    let join = &statement.joins[0];
    assert_eq!(join.using, vec!["id", "region"]);
    assert_eq!(join.constraint_suffix(), " USING (id, region)");
}

#[test]
fn test_parse_natural_joins_keep_keyword() {
    let statement = parse("SELECT * FROM a NATURAL JOIN b NATURAL LEFT JOIN c");

    assert_eq!(statement.joins[0].resolved_kind(), JoinKind::Other("NATURAL".to_string()));
    assert_eq!(
        statement.joins[1].resolved_kind(),
        JoinKind::Other("NATURAL LEFT".to_string())
    );
    assert_eq!(statement.joins[0].constraint_suffix(), "");
}

#[test]
fn test_parse_comma_separated_sources() {
    let statement = parse("SELECT * FROM a, b WHERE a.id = b.id");

    assert_eq!(statement.from, Some(TableSource::Table("a".to_string())));
    assert_eq!(statement.joins.len(), 1);
    assert_eq!(statement.joins[0].kind, JoinKind::Inner);
    assert_eq!(statement.joins[0].source, TableSource::Table("b".to_string()));
}

#[test]
fn test_parse_derived_table() {
    let statement = parse("SELECT x FROM (SELECT x FROM t WHERE x > 1) AS sub");

    let Some(TableSource::Subquery(inner)) = &statement.from else {
        panic!("expected subquery source, got {:?}", statement.from);
    };
    assert_eq!(inner.from, Some(TableSource::Table("t".to_string())));
    assert_eq!(inner.selection, Some("x > 1".to_string()));
}

#[test]
fn test_parse_rejects_non_queries() {
    let err = parse_select("INSERT INTO t VALUES (1)", &PipeOptions::default()).unwrap_err();
    assert!(matches!(err, PipeError::UnsupportedStatement(ref kind) if kind == "INSERT"));

    let err = parse_select("SELECT a FROM t UNION SELECT a FROM u", &PipeOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipeError::UnsupportedStatement(ref op) if op == "UNION"));
}

#[test]
fn test_parse_requires_one_statement() {
    let err = parse_select("SELECT 1; SELECT 2", &PipeOptions::default()).unwrap_err();
    assert!(matches!(err, PipeError::StatementCount(2)));
}

#[test]
fn test_parse_error_is_reported() {
    let err = parse_select("SELECT * FROM", &PipeOptions::default()).unwrap_err();
    assert!(matches!(err, PipeError::Parse(_)));
}

#[test]
fn test_parse_nesting_limit() {
    let sql = "SELECT * FROM (SELECT * FROM (SELECT * FROM t) AS a) AS b";
    let options = PipeOptions::default().with_max_subquery_depth(1);

    let err = parse_select(sql, &options).unwrap_err();
    assert!(matches!(err, PipeError::NestingTooDeep(1)));

    assert!(parse_select(sql, &PipeOptions::default()).is_ok());
}

#[test]
fn test_outer_join_side_resolution() {
    let join = |sql: &str| {
        JoinClause::new(JoinKind::Outer, TableSource::Table("t".into())).with_sql(sql)
    };

    assert_eq!(join("LEFT OUTER JOIN t ON x = 1").resolved_kind(), JoinKind::Left);
    assert_eq!(join("RIGHT JOIN t ON x = 1").resolved_kind(), JoinKind::Right);
    assert_eq!(join("FULL JOIN t ON x = 1").resolved_kind(), JoinKind::Full);
    assert_eq!(join("OUTER JOIN t").resolved_kind(), JoinKind::Outer);
    // The predicate never decides the side
    assert_eq!(
        join("RIGHT JOIN t ON LEFT(t.code, 2) = 'AB'").resolved_kind(),
        JoinKind::Right
    );

    let inner = JoinClause::new(JoinKind::Inner, TableSource::Table("t".into()))
        .with_sql("LEFT JOIN t");
    assert_eq!(inner.resolved_kind(), JoinKind::Inner);
}
