//! Validation of lowered plans.
//!
//! [`validate`] is the only way to obtain a [`QueryPlan`]. It consumes a
//! [`PlanDraft`] and either returns a plan satisfying every invariant below or
//! the first violation found:
//!
//! - every referenced column is in the whitelist
//! - every aggregation except `count` names a column
//! - every alias is non-empty and unique
//! - `IN` takes a non-empty flat list, `LIKE`/`ILIKE` take text
//! - a null value is only compared with `=` or `!=`
//! - every ORDER BY expression is a whitelisted column or a select alias
//! - `limit` is positive and at most the row ceiling, `offset` is non-negative

use std::collections::HashSet;

use crate::catalog::Whitelist;
use crate::error::{GuardError, GuardResult};
use crate::plan::{
    AggOp, DraftStatement, Literal, PlanDraft, Predicate, QueryPlan, SelectItem, ValidatedStatement,
    WhereOp,
};

/// Validate a lowered statement.
pub fn validate_statement(
    statement: DraftStatement,
    whitelist: &Whitelist,
    row_ceiling: u64,
) -> GuardResult<ValidatedStatement> {
    match statement {
        DraftStatement::ColumnListing => Ok(ValidatedStatement::ColumnListing),
        DraftStatement::Select(draft) => {
            validate(draft, whitelist, row_ceiling).map(ValidatedStatement::Select)
        }
    }
}

/// Validate a draft plan against the whitelist and the row ceiling.
pub fn validate(draft: PlanDraft, whitelist: &Whitelist, row_ceiling: u64) -> GuardResult<QueryPlan> {
    let PlanDraft {
        distinct,
        select,
        filters,
        group_by,
        order_by,
        limit,
        offset,
    } = draft;

    validate_select(&select, whitelist)?;

    for (i, pred) in filters.iter().enumerate() {
        validate_predicate(pred, i, whitelist)?;
    }

    for (i, col) in group_by.iter().enumerate() {
        ensure_column(whitelist, col, format!("group_by[{}]", i))?;
    }

    let aliases: HashSet<&str> = select.iter().map(SelectItem::alias).collect();
    for (i, item) in order_by.iter().enumerate() {
        let expr = item.expr.as_str();
        if expr.trim().is_empty() {
            return Err(GuardError::missing(
                format!("order_by[{}].expr", i),
                "expression is empty",
            ));
        }
        if !whitelist.contains(expr) && !aliases.contains(expr) {
            return Err(GuardError::invalid_column(
                expr,
                format!("order_by[{}].expr", i),
            ));
        }
    }

    let limit = resolve_limit(limit, row_ceiling)?;
    let offset = match offset {
        None => None,
        Some(off) if off >= 0 => Some(off as u64),
        Some(off) => {
            return Err(GuardError::InvalidPayload(format!(
                "offset must be >= 0, got {}",
                off
            )))
        }
    };

    Ok(QueryPlan {
        distinct,
        select,
        filters,
        group_by,
        order_by,
        limit,
        offset,
    })
}

fn validate_select(select: &[SelectItem], whitelist: &Whitelist) -> GuardResult<()> {
    let mut seen = HashSet::new();
    for (i, item) in select.iter().enumerate() {
        match item {
            SelectItem::Column { name, .. } => {
                ensure_column(whitelist, name, format!("select[{}].name", i))?;
            }
            SelectItem::Aggregate { op, column, .. } => match column {
                Some(col) => ensure_column(whitelist, col, format!("select[{}].column", i))?,
                None if *op == AggOp::Count => {}
                None => {
                    return Err(GuardError::missing(
                        format!("select[{}].column", i),
                        format!("aggregation '{}' requires a column", op.as_str()),
                    ))
                }
            },
        }

        let alias = item.alias();
        if alias.trim().is_empty() {
            return Err(GuardError::missing(
                format!("select[{}].alias", i),
                "alias must not be empty",
            ));
        }
        if !seen.insert(alias) {
            return Err(GuardError::InvalidPayload(format!(
                "duplicate alias '{}' in select[{}]",
                alias, i
            )));
        }
    }
    Ok(())
}

fn validate_predicate(pred: &Predicate, index: usize, whitelist: &Whitelist) -> GuardResult<()> {
    ensure_column(whitelist, &pred.column, format!("where[{}].column", index))?;
    let field = || format!("where[{}].value", index);

    match (&pred.value, pred.op) {
        (Literal::Null, WhereOp::Eq | WhereOp::Ne) => Ok(()),
        (Literal::Null, op) => Err(GuardError::missing(
            field(),
            format!("operator {} requires a non-null value", op.as_str()),
        )),
        (Literal::List(items), WhereOp::In) => {
            if items.is_empty() {
                return Err(GuardError::missing(field(), "IN requires a non-empty list"));
            }
            if items.iter().any(|v| matches!(v, Literal::List(_))) {
                return Err(GuardError::InvalidPayload(format!(
                    "{} must be a flat list",
                    field()
                )));
            }
            Ok(())
        }
        (_, WhereOp::In) => Err(GuardError::missing(field(), "IN requires a list value")),
        (Literal::Text(_), WhereOp::Like | WhereOp::ILike) => Ok(()),
        (_, op @ (WhereOp::Like | WhereOp::ILike)) => Err(GuardError::missing(
            field(),
            format!("{} requires a string value", op.as_str()),
        )),
        (Literal::List(_), op) => Err(GuardError::InvalidPayload(format!(
            "{} cannot be a list for operator {}",
            field(),
            op.as_str()
        ))),
        _ => Ok(()),
    }
}

fn resolve_limit(limit: Option<i64>, row_ceiling: u64) -> GuardResult<u64> {
    if row_ceiling == 0 {
        return Err(GuardError::InvalidPayload(
            "row ceiling must be positive".into(),
        ));
    }
    match limit {
        None => Ok(row_ceiling),
        Some(n) if n > 0 => Ok((n as u64).min(row_ceiling)),
        Some(n) => Err(GuardError::InvalidPayload(format!(
            "limit must be > 0, got {}",
            n
        ))),
    }
}

pub(crate) fn ensure_column(
    whitelist: &Whitelist,
    column: &str,
    field: impl Into<String>,
) -> GuardResult<()> {
    if whitelist.contains(column) {
        Ok(())
    } else {
        Err(GuardError::invalid_column(column, field))
    }
}
