//! Tests for SQL emission from validated plans.
//!
//! Every emitted statement is also parsed with sqlparser to catch syntax
//! regressions in quoting and casting.

use sqlgate::catalog::{allowed_columns, AuthorizedTable, ColumnMeta, Whitelist};
use sqlgate::plan::{AggOp, Literal, OrderItem, PlanDraft, Predicate, SelectItem, WhereOp};
use sqlgate::sql::{compile_column_listing, compile_select};
use sqlgate::validation::validate;
use sqlgate::Dialect;

use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn assert_parses(sql: &str, dialect: Dialect) {
    let result = match dialect {
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::DuckDb => Parser::parse_sql(&DuckDbDialect {}, sql),
    };
    assert!(result.is_ok(), "SQL should parse: {:?}\n{}", result.err(), sql);
}

fn whitelist() -> Whitelist {
    allowed_columns(&[
        ColumnMeta::new("zone", "text"),
        ColumnMeta::new("area", "numeric"),
        ColumnMeta::new("name", "text"),
    ])
}

fn compile(draft: PlanDraft, dialect: Dialect) -> String {
    let plan = validate(draft, &whitelist(), 100).unwrap();
    let table = AuthorizedTable::new("t").unwrap();
    let sql = compile_select(&plan, &table, dialect);
    assert_parses(&sql, dialect);
    sql
}

#[test]
fn test_grouped_sum_statement() {
    let draft = PlanDraft {
        select: vec![
            SelectItem::column("zone"),
            SelectItem::aggregate(AggOp::Sum, Some("area"), "Total"),
        ],
        filters: vec![Predicate::not_null("area"), Predicate::not_null("zone")],
        group_by: vec!["zone".into()],
        order_by: vec![OrderItem::desc("Total")],
        limit: Some(10),
        ..Default::default()
    };
    let sql = compile(draft, Dialect::Postgres);
    insta::assert_snapshot!(sql, @r#"
    SELECT "zone" AS "zone", SUM("area")::double precision AS "Total"
    FROM t
    WHERE "area" IS NOT NULL AND "zone" IS NOT NULL
    GROUP BY "zone"
    ORDER BY "Total" DESC
    LIMIT 10;
    "#);
}

#[test]
fn test_null_safe_equality() {
    let draft = PlanDraft {
        filters: vec![
            Predicate::new("zone", WhereOp::Eq, Literal::Null),
            Predicate::new("name", WhereOp::Ne, Literal::Null),
        ],
        ..Default::default()
    };
    let sql = compile(draft, Dialect::Postgres);
    insta::assert_snapshot!(sql, @r#"
    SELECT *
    FROM t
    WHERE "zone" IS NULL AND "name" IS NOT NULL
    LIMIT 100;
    "#);
}

#[test]
fn test_literals_are_escaped() {
    let draft = PlanDraft {
        filters: vec![
            Predicate::new("name", WhereOp::Eq, Literal::Text("O'Brien".into())),
            Predicate::new(
                "zone",
                WhereOp::In,
                Literal::List(vec!["ZEEC".into(), "ZPA".into()]),
            ),
        ],
        ..Default::default()
    };
    let sql = compile(draft, Dialect::Postgres);
    assert!(sql.contains("\"name\" = 'O''Brien'"));
    assert!(sql.contains("\"zone\" IN ('ZEEC', 'ZPA')"));
}

#[test]
fn test_distinct_with_offset() {
    let draft = PlanDraft {
        distinct: true,
        select: vec![SelectItem::column("zone")],
        order_by: vec![OrderItem::asc("zone")],
        limit: Some(5),
        offset: Some(10),
        ..Default::default()
    };
    let sql = compile(draft, Dialect::Postgres);
    insta::assert_snapshot!(sql, @r#"
    SELECT DISTINCT "zone" AS "zone"
    FROM t
    ORDER BY "zone" ASC
    LIMIT 5 OFFSET 10;
    "#);
}

#[test]
fn test_duckdb_casts() {
    let draft = PlanDraft {
        select: vec![
            SelectItem::aggregate(AggOp::Count, None, "n"),
            SelectItem::aggregate(AggOp::Avg, Some("area"), "media"),
        ],
        ..Default::default()
    };
    let sql = compile(draft, Dialect::DuckDb);
    insta::assert_snapshot!(sql, @r#"
    SELECT COUNT(*)::BIGINT AS "n", AVG("area")::DOUBLE AS "media"
    FROM t
    LIMIT 100;
    "#);
}

#[test]
fn test_compilation_is_deterministic() {
    let draft = || PlanDraft {
        select: vec![SelectItem::aggregate(AggOp::Max, Some("area"), "maior")],
        filters: vec![Predicate::new("zone", WhereOp::Like, Literal::Text("Z%".into()))],
        ..Default::default()
    };
    assert_eq!(compile(draft(), Dialect::Postgres), compile(draft(), Dialect::Postgres));
}

#[test]
fn test_column_listing() {
    let table = AuthorizedTable::from_identifier("1201_ce_zeec", "zcm").unwrap();
    let sql = compile_column_listing(&table, Dialect::Postgres).unwrap();
    assert_parses(&sql, Dialect::Postgres);
    insta::assert_snapshot!(sql, @r#"
    SELECT "column_name" AS "coluna", "data_type" AS "tipo", "is_nullable" AS "nula"
    FROM information_schema.columns
    WHERE "table_schema" = 'zcm' AND "table_name" = '1201_ce_zeec'
    ORDER BY "ordinal_position";
    "#);
}
