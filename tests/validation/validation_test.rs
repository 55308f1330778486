//! Tests for plan validation: whitelist, operators, aliases and limits.

use sqlgate::catalog::{allowed_columns, ColumnMeta, Whitelist};
use sqlgate::plan::{AggOp, Literal, OrderItem, PlanDraft, Predicate, SelectItem, WhereOp};
use sqlgate::validation::validate;
use sqlgate::GuardError;

fn whitelist() -> Whitelist {
    allowed_columns(&[
        ColumnMeta::new("zone", "text"),
        ColumnMeta::new("area", "numeric"),
        ColumnMeta::geometry("geom"),
    ])
}

fn filtered(pred: Predicate) -> PlanDraft {
    PlanDraft {
        filters: vec![pred],
        ..Default::default()
    }
}

// ============================================================================
// Whitelist
// ============================================================================

#[test]
fn test_every_reference_is_checked() {
    let wl = whitelist();

    let select = PlanDraft {
        select: vec![SelectItem::column("geom")],
        ..Default::default()
    };
    assert_eq!(
        validate(select, &wl, 100).unwrap_err(),
        GuardError::InvalidColumn {
            column: "geom".into(),
            field: "select[0].name".into()
        }
    );

    let group = PlanDraft {
        group_by: vec!["zone".into(), "bairro".into()],
        ..Default::default()
    };
    assert!(matches!(
        validate(group, &wl, 100),
        Err(GuardError::InvalidColumn { ref field, .. }) if field == "group_by[1]"
    ));

    let filter = filtered(Predicate::new("bairro", WhereOp::Eq, "x".into()));
    assert!(matches!(
        validate(filter, &wl, 100),
        Err(GuardError::InvalidColumn { ref field, .. }) if field == "where[0].column"
    ));
}

#[test]
fn test_order_by_accepts_alias() {
    let draft = PlanDraft {
        select: vec![SelectItem::aggregate(AggOp::Sum, Some("area"), "Total")],
        order_by: vec![OrderItem::desc("Total")],
        ..Default::default()
    };
    assert!(validate(draft, &whitelist(), 100).is_ok());

    let unknown = PlanDraft {
        order_by: vec![OrderItem::asc("Total")],
        ..Default::default()
    };
    assert!(matches!(
        validate(unknown, &whitelist(), 100),
        Err(GuardError::InvalidColumn { .. })
    ));
}

// ============================================================================
// Operators and values
// ============================================================================

#[test]
fn test_null_only_with_equality() {
    let wl = whitelist();
    assert!(validate(filtered(Predicate::new("zone", WhereOp::Eq, Literal::Null)), &wl, 10).is_ok());
    assert!(validate(filtered(Predicate::new("zone", WhereOp::Ne, Literal::Null)), &wl, 10).is_ok());

    let err = validate(filtered(Predicate::new("area", WhereOp::Gt, Literal::Null)), &wl, 10)
        .unwrap_err();
    assert!(matches!(err, GuardError::MissingRequiredField { ref field, .. } if field == "where[0].value"));
}

#[test]
fn test_in_requires_flat_non_empty_list() {
    let wl = whitelist();
    let ok = Literal::List(vec!["a".into(), "b".into()]);
    assert!(validate(filtered(Predicate::new("zone", WhereOp::In, ok)), &wl, 10).is_ok());

    let empty = Literal::List(vec![]);
    assert!(matches!(
        validate(filtered(Predicate::new("zone", WhereOp::In, empty)), &wl, 10),
        Err(GuardError::MissingRequiredField { .. })
    ));

    let nested = Literal::List(vec![Literal::List(vec![Literal::Int(1)])]);
    assert!(matches!(
        validate(filtered(Predicate::new("zone", WhereOp::In, nested)), &wl, 10),
        Err(GuardError::InvalidPayload(_))
    ));

    assert!(matches!(
        validate(filtered(Predicate::new("zone", WhereOp::In, "a".into())), &wl, 10),
        Err(GuardError::MissingRequiredField { .. })
    ));
}

#[test]
fn test_like_requires_text() {
    let wl = whitelist();
    assert!(validate(filtered(Predicate::new("zone", WhereOp::ILike, "%z%".into())), &wl, 10).is_ok());
    assert!(matches!(
        validate(filtered(Predicate::new("zone", WhereOp::Like, Literal::Int(5))), &wl, 10),
        Err(GuardError::MissingRequiredField { .. })
    ));
}

// ============================================================================
// Select list
// ============================================================================

#[test]
fn test_aggregate_needs_column_unless_count() {
    let wl = whitelist();
    let count = PlanDraft {
        select: vec![SelectItem::aggregate(AggOp::Count, None, "Total")],
        ..Default::default()
    };
    assert!(validate(count, &wl, 10).is_ok());

    let sum = PlanDraft {
        select: vec![SelectItem::aggregate(AggOp::Sum, None, "Total")],
        ..Default::default()
    };
    assert!(matches!(
        validate(sum, &wl, 10),
        Err(GuardError::MissingRequiredField { ref field, .. }) if field == "select[0].column"
    ));
}

#[test]
fn test_duplicate_alias_rejected() {
    let draft = PlanDraft {
        select: vec![
            SelectItem::aggregate(AggOp::Sum, Some("area"), "x"),
            SelectItem::aggregate(AggOp::Avg, Some("area"), "x"),
        ],
        ..Default::default()
    };
    assert!(matches!(
        validate(draft, &whitelist(), 10),
        Err(GuardError::InvalidPayload(_))
    ));
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_limit_bounded_by_ceiling() {
    let wl = whitelist();
    let plan = |limit| {
        validate(
            PlanDraft {
                limit,
                ..Default::default()
            },
            &wl,
            20,
        )
    };
    assert_eq!(plan(None).unwrap().limit(), 20);
    assert_eq!(plan(Some(5)).unwrap().limit(), 5);
    assert_eq!(plan(Some(500)).unwrap().limit(), 20);
    assert!(matches!(plan(Some(0)), Err(GuardError::InvalidPayload(_))));
    assert!(matches!(plan(Some(-3)), Err(GuardError::InvalidPayload(_))));
}

#[test]
fn test_negative_offset_rejected() {
    let draft = PlanDraft {
        offset: Some(-1),
        ..Default::default()
    };
    assert!(matches!(
        validate(draft, &whitelist(), 10),
        Err(GuardError::InvalidPayload(_))
    ));
}
