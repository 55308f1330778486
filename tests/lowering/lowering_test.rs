//! Tests for lowering intent and generic payloads into plan drafts.

use serde_json::json;
use sqlgate::catalog::{allowed_columns, ColumnMeta, Whitelist};
use sqlgate::lowering::{lower, Lowered};
use sqlgate::plan::{
    AggOp, DraftStatement, Literal, OrderItem, PlanDraft, PlanPayload, Predicate, SelectItem,
    WhereOp,
};
use sqlgate::GuardError;

fn whitelist() -> Whitelist {
    allowed_columns(&[
        ColumnMeta::new("zone", "text"),
        ColumnMeta::new("area", "numeric"),
        ColumnMeta::new("perimetro", "numeric"),
        ColumnMeta::geometry("geom"),
    ])
}

fn lower_json(value: serde_json::Value) -> Result<Lowered, GuardError> {
    lower(&PlanPayload::from_value(value)?, &whitelist())
}

fn draft(lowered: Lowered) -> PlanDraft {
    match lowered.statement {
        DraftStatement::Select(d) => d,
        DraftStatement::ColumnListing => panic!("expected a select draft"),
    }
}

// ============================================================================
// Intent plans
// ============================================================================

#[test]
fn test_grouped_sum_shape() {
    let lowered = lower_json(json!({
        "intent": "grouped_sum",
        "group_by": ["zone"],
        "value_column": "area",
        "limit": 10
    }))
    .unwrap();
    assert_eq!(lowered.reason, "fc:grouped_sum:zone:area");

    let d = draft(lowered);
    assert_eq!(
        d.select,
        vec![
            SelectItem::column("zone"),
            SelectItem::aggregate(AggOp::Sum, Some("area"), "Total"),
        ]
    );
    assert_eq!(
        d.filters,
        vec![Predicate::not_null("area"), Predicate::not_null("zone")]
    );
    assert_eq!(d.group_by, vec!["zone".to_string()]);
    assert_eq!(d.order_by, vec![OrderItem::desc("Total")]);
    assert_eq!(d.limit, Some(10));
}

#[test]
fn test_grouped_sum_repairs_target_column() {
    let d = draft(
        lower_json(json!({
            "intent": "grouped_sum",
            "group_by": "zone",
            "target_column": "area"
        }))
        .unwrap(),
    );
    assert_eq!(d.select[1], SelectItem::aggregate(AggOp::Sum, Some("area"), "Total"));
}

#[test]
fn test_grouped_sum_requires_group() {
    let err = lower_json(json!({"intent": "grouped_sum", "value_column": "area"})).unwrap_err();
    assert!(matches!(
        err,
        GuardError::MissingRequiredField { ref field, .. } if field == "group_by"
    ));
}

#[test]
fn test_distinct_single_column_alias() {
    let lowered = lower_json(json!({"intent": "distinct", "target_column": "zone"})).unwrap();
    assert_eq!(lowered.reason, "fc:distinct:zone");

    let d = draft(lowered);
    assert!(d.distinct);
    assert_eq!(
        d.select,
        vec![SelectItem::Column {
            name: "zone".into(),
            alias: "Valor".into()
        }]
    );
    assert_eq!(d.filters, vec![Predicate::not_null("zone")]);
    assert_eq!(d.order_by, vec![OrderItem::asc("zone")]);
}

#[test]
fn test_distinct_ignores_unselected_order() {
    let d = draft(
        lower_json(json!({
            "intent": "distinct",
            "select_columns": ["zone"],
            "order_by": "area",
            "order_dir": "desc"
        }))
        .unwrap(),
    );
    assert_eq!(d.order_by, vec![OrderItem::asc("zone")]);

    let d = draft(
        lower_json(json!({
            "intent": "distinct",
            "select_columns": ["zone", "area"],
            "order_by": "area",
            "order_dir": "desc"
        }))
        .unwrap(),
    );
    assert_eq!(d.order_by, vec![OrderItem::desc("area")]);
}

#[test]
fn test_count_keeps_filters() {
    let d = draft(
        lower_json(json!({
            "intent": "count",
            "filters": [{"column": "zone", "op": "=", "value": "ZEEC"}]
        }))
        .unwrap(),
    );
    assert_eq!(d.select, vec![SelectItem::aggregate(AggOp::Count, None, "Total")]);
    assert_eq!(
        d.filters,
        vec![Predicate::new("zone", WhereOp::Eq, Literal::Text("ZEEC".into()))]
    );
}

#[test]
fn test_schema_is_column_listing() {
    let lowered = lower_json(json!({"intent": "schema"})).unwrap();
    assert_eq!(lowered.statement, DraftStatement::ColumnListing);
    assert_eq!(lowered.reason, "fc:schema");
}

#[test]
fn test_intent_rejects_unknown_columns() {
    let err = lower_json(json!({"intent": "sum", "value_column": "geom"})).unwrap_err();
    assert_eq!(
        err,
        GuardError::InvalidColumn {
            column: "geom".into(),
            field: "value_column".into()
        }
    );

    let err = lower_json(json!({
        "intent": "count",
        "filters": [{"column": "bairro", "op": "=", "value": 1}]
    }))
    .unwrap_err();
    assert!(matches!(err, GuardError::InvalidColumn { ref field, .. } if field == "filters[0].column"));
}

#[test]
fn test_intent_rejects_bad_operator() {
    let err = lower_json(json!({
        "intent": "count",
        "filters": [{"column": "zone", "op": "BETWEEN", "value": 1}]
    }))
    .unwrap_err();
    assert!(matches!(err, GuardError::InvalidOperator { ref field, .. } if field == "filters[0].op"));
}

#[test]
fn test_unknown_and_empty_intent() {
    assert!(matches!(
        lower_json(json!({"intent": "pivot"})),
        Err(GuardError::InvalidPayload(_))
    ));
    assert!(matches!(
        lower_json(json!({"intent": " "})),
        Err(GuardError::MissingRequiredField { .. })
    ));
}

// ============================================================================
// Generic plans
// ============================================================================

#[test]
fn test_generic_infers_select() {
    let lowered = lower_json(json!({
        "table_fqn": "public.other",
        "aggregations": [{"op": "sum", "column": "area"}],
        "group_by": ["zone"],
        "order_by": [{"expr": "sum_area", "dir": "desc"}]
    }))
    .unwrap();
    assert_eq!(lowered.reason, "fc_args:v2");

    let d = draft(lowered);
    assert_eq!(
        d.select,
        vec![
            SelectItem::column("zone"),
            SelectItem::aggregate(AggOp::Sum, Some("area"), "sum_area"),
        ]
    );
    assert_eq!(d.order_by, vec![OrderItem::desc("sum_area")]);
}

#[test]
fn test_generic_select_items() {
    let d = draft(
        lower_json(json!({
            "select": [
                {"type": "column", "name": "zone", "alias": "Zona"},
                {"type": "agg", "agg": "count", "alias": "n"}
            ],
            "where": [{"column": "area", "op": ">", "value": 2.5}],
            "limit": "15"
        }))
        .unwrap(),
    );
    assert_eq!(
        d.select,
        vec![
            SelectItem::Column {
                name: "zone".into(),
                alias: "Zona".into()
            },
            SelectItem::aggregate(AggOp::Count, None, "n"),
        ]
    );
    assert_eq!(
        d.filters,
        vec![Predicate::new("area", WhereOp::Gt, Literal::Float(2.5))]
    );
    assert_eq!(d.limit, Some(15));
}

#[test]
fn test_generic_rejects_bad_aggregation() {
    let err = lower_json(json!({"aggregations": [{"op": "median", "column": "area"}]})).unwrap_err();
    assert!(matches!(
        err,
        GuardError::InvalidAggregation { ref field, .. } if field == "aggregations[0].op"
    ));

    let err = lower_json(json!({"aggregations": [{"op": "avg"}]})).unwrap_err();
    assert!(matches!(err, GuardError::MissingRequiredField { .. }));
}

#[test]
fn test_generic_rejects_blank_alias() {
    let err = lower_json(json!({
        "select": [{"type": "agg", "agg": "sum", "column": "area", "alias": "   "}]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        GuardError::MissingRequiredField { ref field, .. } if field == "select[0].alias"
    ));

    let err = lower_json(json!({
        "select": [{"type": "column", "name": "zone"}, {"type": "column", "name": "area", "alias": ""}]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        GuardError::MissingRequiredField { ref field, .. } if field == "select[1].alias"
    ));

    let err = lower_json(json!({
        "aggregations": [{"op": "sum", "column": "area", "alias": " "}]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        GuardError::MissingRequiredField { ref field, .. } if field == "aggregations[0].alias"
    ));

    // An absent alias still takes the default.
    let d = draft(lower_json(json!({"aggregations": [{"op": "sum", "column": "area"}]})).unwrap());
    assert_eq!(d.select.len(), 1);
}

#[test]
fn test_generic_rejects_bad_limit_shape() {
    assert!(matches!(
        lower_json(json!({"limit": "ten"})),
        Err(GuardError::InvalidPayload(_))
    ));
}
