//! Lowering plan payloads to the canonical draft.
//!
//! Both surface shapes end up as a [`DraftStatement`] plus the reason tag that
//! describes how it was produced. Lowering coerces loosely-shaped fields,
//! applies the usual repairs for model output and infers a select list for
//! pure aggregate requests; whitelist and value checks that do not depend on
//! the surface shape are left to [`crate::validation`].

use tracing::debug;

use crate::catalog::Whitelist;
use crate::error::{GuardError, GuardResult};
use crate::plan::shape::{optional_int, str_list, trimmed};
use crate::plan::{
    AggOp, AggregationArgs, DraftStatement, FilterArgs, GenericPlanArgs, Intent, IntentPlanArgs,
    Literal, OrderByArgs, OrderItem, PlanDraft, PlanPayload, Predicate, SelectItem, SelectItemArgs,
    SortDir, WhereArgs, WhereOp,
};
use crate::validation::ensure_column;

/// Alias of the single aggregate in intent and template plans.
pub const TOTAL_ALIAS: &str = "Total";
/// Alias of the single column of a one-column distinct listing.
pub const VALUE_ALIAS: &str = "Valor";

/// Reason tag of every generic plan.
pub const GENERIC_PLAN_REASON: &str = "fc_args:v2";

/// A lowered statement and the reason tag describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub statement: DraftStatement,
    pub reason: String,
}

/// Lower either payload shape.
pub fn lower(payload: &PlanPayload, whitelist: &Whitelist) -> GuardResult<Lowered> {
    match payload {
        PlanPayload::Intent(args) => lower_intent(args, whitelist),
        PlanPayload::Generic(args) => lower_generic(args, whitelist),
    }
}

// =============================================================================
// Intent plans
// =============================================================================

/// Lower an intent-based plan.
///
/// Field names in errors are the payload's own (`target_column`,
/// `filters[0].column`, ...).
pub fn lower_intent(args: &IntentPlanArgs, whitelist: &Whitelist) -> GuardResult<Lowered> {
    let intent_name = args.intent.trim();
    if intent_name.is_empty() {
        return Err(GuardError::missing("intent", "intent is required"));
    }
    let intent = Intent::from_name(intent_name).ok_or_else(|| {
        GuardError::InvalidPayload(format!("unknown intent '{}'", intent_name))
    })?;

    let mut target = trimmed(args.target_column.as_deref());
    let mut value = trimmed(args.value_column.as_deref());
    let group = str_list(&args.group_by);
    let mut select = str_list(&args.select_columns);

    // Models often put the summed column in target_column.
    if matches!(intent, Intent::Sum | Intent::GroupedSum) && value.is_none() {
        if let Some(t) = target.take() {
            debug!(intent = %intent, column = %t, "moved target_column to value_column");
            value = Some(t);
        }
    }
    if matches!(intent, Intent::Distinct | Intent::Detail) && select.is_empty() {
        if let Some(t) = target.take() {
            debug!(intent = %intent, column = %t, "moved target_column to select_columns");
            select.push(t);
        }
    }

    if let Some(t) = &target {
        ensure_column(whitelist, t, "target_column")?;
    }
    if let Some(v) = &value {
        ensure_column(whitelist, v, "value_column")?;
    }
    for (i, g) in group.iter().enumerate() {
        ensure_column(whitelist, g, format!("group_by[{}]", i))?;
    }
    for (i, c) in select.iter().enumerate() {
        ensure_column(whitelist, c, format!("select_columns[{}]", i))?;
    }

    let filters = lower_filters(&args.filters, whitelist)?;

    let order = match trimmed(args.order_by.as_deref()) {
        Some(col) => {
            ensure_column(whitelist, &col, "order_by")?;
            let dir = parse_dir(args.order_dir.as_deref(), "order_dir")?;
            Some(OrderItem { expr: col, dir })
        }
        None => None,
    };

    let limit = optional_int(args.limit.as_ref(), "limit")?;
    let offset = optional_int(args.offset.as_ref(), "offset")?;

    let mut draft = PlanDraft {
        limit,
        offset,
        ..Default::default()
    };

    let reason = match intent {
        Intent::Schema => {
            return Ok(Lowered {
                statement: DraftStatement::ColumnListing,
                reason: "fc:schema".into(),
            })
        }
        Intent::Count => {
            draft.select = vec![SelectItem::aggregate(AggOp::Count, None, TOTAL_ALIAS)];
            draft.filters = filters;
            "fc:count".to_string()
        }
        Intent::Distinct => {
            if select.is_empty() {
                return Err(GuardError::missing(
                    "select_columns",
                    "distinct requires target_column or select_columns",
                ));
            }
            draft.distinct = true;
            draft.select = distinct_select(&select);
            draft.filters = select.iter().map(|c| Predicate::not_null(c)).collect();
            draft.filters.extend(filters);
            // DISTINCT can only be ordered by selected columns.
            draft.order_by = match order {
                Some(o) if select.contains(&o.expr) => vec![o],
                Some(o) => {
                    debug!(column = %o.expr, "distinct order_by not selected, using default order");
                    select.iter().map(|c| OrderItem::asc(c)).collect()
                }
                None => select.iter().map(|c| OrderItem::asc(c)).collect(),
            };
            format!("fc:distinct:{}", select.join("|"))
        }
        Intent::Sum => {
            let value = value.ok_or_else(|| {
                GuardError::missing("value_column", "sum requires value_column")
            })?;
            draft.select = vec![SelectItem::aggregate(AggOp::Sum, Some(&value), TOTAL_ALIAS)];
            draft.filters = filters;
            format!("fc:sum:{}", value)
        }
        Intent::GroupedSum => {
            if group.is_empty() {
                return Err(GuardError::missing(
                    "group_by",
                    "grouped_sum requires at least one group column",
                ));
            }
            let value = value.ok_or_else(|| {
                GuardError::missing("value_column", "grouped_sum requires value_column")
            })?;
            draft.select = grouped_sum_select(&group, &value);
            draft.filters = grouped_sum_filters(&group, &value);
            draft.filters.extend(filters);
            draft.group_by = group.clone();
            draft.order_by = vec![OrderItem::desc(TOTAL_ALIAS)];
            format!("fc:grouped_sum:{}:{}", group.join("|"), value)
        }
        Intent::Detail => {
            draft.select = select.iter().map(|c| SelectItem::column(c)).collect();
            draft.filters = filters;
            draft.order_by = order.into_iter().collect();
            "fc:detail".to_string()
        }
    };

    debug!(intent = %intent, reason = %reason, "lowered intent plan");
    Ok(Lowered {
        statement: DraftStatement::Select(draft),
        reason,
    })
}

/// Select list of a distinct listing: one column is aliased `Valor`, several
/// keep their own names.
pub(crate) fn distinct_select(columns: &[String]) -> Vec<SelectItem> {
    match columns {
        [single] => vec![SelectItem::Column {
            name: single.clone(),
            alias: VALUE_ALIAS.into(),
        }],
        many => many.iter().map(|c| SelectItem::column(c)).collect(),
    }
}

pub(crate) fn grouped_sum_select(group: &[String], value: &str) -> Vec<SelectItem> {
    let mut items: Vec<SelectItem> = group.iter().map(|g| SelectItem::column(g)).collect();
    items.push(SelectItem::aggregate(AggOp::Sum, Some(value), TOTAL_ALIAS));
    items
}

/// `value IS NOT NULL` then one `IS NOT NULL` per group column.
pub(crate) fn grouped_sum_filters(group: &[String], value: &str) -> Vec<Predicate> {
    std::iter::once(Predicate::not_null(value))
        .chain(group.iter().map(|g| Predicate::not_null(g)))
        .collect()
}

fn lower_filters(filters: &[FilterArgs], whitelist: &Whitelist) -> GuardResult<Vec<Predicate>> {
    filters
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let column = f.column.trim();
            if column.is_empty() {
                return Err(GuardError::missing(
                    format!("filters[{}].column", i),
                    "filter column is empty",
                ));
            }
            ensure_column(whitelist, column, format!("filters[{}].column", i))?;
            let op = parse_where_op(&f.op, format!("filters[{}].op", i))?;
            Ok(Predicate::new(column, op, Literal::from_json(&f.value)))
        })
        .collect()
}

// =============================================================================
// Generic plans
// =============================================================================

/// Lower a generic select/where/aggregate plan.
///
/// When `select` is empty the select list is inferred as the group-by columns
/// followed by the aggregations. When `select` is given, `aggregations` are
/// checked but not emitted.
pub fn lower_generic(args: &GenericPlanArgs, whitelist: &Whitelist) -> GuardResult<Lowered> {
    if let Some(fqn) = trimmed(args.table_fqn.as_deref()) {
        debug!(table_fqn = %fqn, "ignoring table_fqn from payload");
    }

    let group_by = str_list(&args.group_by);
    for (i, g) in group_by.iter().enumerate() {
        ensure_column(whitelist, g, format!("group_by[{}]", i))?;
    }

    let aggregations = args
        .aggregations
        .iter()
        .enumerate()
        .map(|(i, a)| lower_aggregation(a, i, whitelist))
        .collect::<GuardResult<Vec<_>>>()?;

    let select = if args.select.is_empty() {
        let mut inferred: Vec<SelectItem> = group_by.iter().map(|g| SelectItem::column(g)).collect();
        inferred.extend(aggregations);
        if !inferred.is_empty() {
            debug!(items = inferred.len(), "inferred select list");
        }
        inferred
    } else {
        args.select
            .iter()
            .enumerate()
            .map(|(i, item)| lower_select_item(item, i))
            .collect::<GuardResult<Vec<_>>>()?
    };

    let filters = args
        .where_
        .iter()
        .enumerate()
        .map(|(i, w)| lower_where(w, i))
        .collect::<GuardResult<Vec<_>>>()?;

    let order_by = args
        .order_by
        .iter()
        .enumerate()
        .map(|(i, o)| lower_order(o, i))
        .collect::<GuardResult<Vec<_>>>()?;

    let draft = PlanDraft {
        distinct: false,
        select,
        filters,
        group_by,
        order_by,
        limit: optional_int(args.limit.as_ref(), "limit")?,
        offset: optional_int(args.offset.as_ref(), "offset")?,
    };

    Ok(Lowered {
        statement: DraftStatement::Select(draft),
        reason: GENERIC_PLAN_REASON.into(),
    })
}

fn lower_aggregation(
    agg: &AggregationArgs,
    index: usize,
    whitelist: &Whitelist,
) -> GuardResult<SelectItem> {
    let op = parse_agg_op(&agg.op, format!("aggregations[{}].op", index))?;
    let column = trimmed(agg.column.as_deref());
    match &column {
        Some(col) => ensure_column(whitelist, col, format!("aggregations[{}].column", index))?,
        None if op == AggOp::Count => {}
        None => {
            return Err(GuardError::missing(
                format!("aggregations[{}].column", index),
                format!("aggregation '{}' requires a column", op.as_str()),
            ))
        }
    }
    let alias = explicit_alias(agg.alias.as_deref(), format!("aggregations[{}].alias", index))?
        .unwrap_or_else(|| op.default_alias(column.as_deref()));
    Ok(SelectItem::Aggregate { op, column, alias })
}

/// `None` when no alias was sent; an alias that is present but blank is an error.
fn explicit_alias(raw: Option<&str>, field: String) -> GuardResult<Option<String>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Err(GuardError::missing(field, "alias must not be empty")),
        Some(s) => Ok(Some(s.trim().to_string())),
    }
}

fn lower_select_item(item: &SelectItemArgs, index: usize) -> GuardResult<SelectItem> {
    let kind = trimmed(item.kind.as_deref())
        .unwrap_or_else(|| "column".into())
        .to_ascii_lowercase();
    match kind.as_str() {
        "column" => {
            let name = trimmed(item.name.as_deref()).ok_or_else(|| {
                GuardError::missing(format!("select[{}].name", index), "column item requires a name")
            })?;
            let alias = explicit_alias(item.alias.as_deref(), format!("select[{}].alias", index))?
                .unwrap_or_else(|| name.clone());
            Ok(SelectItem::Column { name, alias })
        }
        "agg" | "aggregate" | "aggregation" => {
            let raw_op = item.agg.as_deref().unwrap_or_default();
            let op = parse_agg_op(raw_op, format!("select[{}].agg", index))?;
            let column = trimmed(item.column.as_deref());
            let alias = explicit_alias(item.alias.as_deref(), format!("select[{}].alias", index))?
                .unwrap_or_else(|| op.default_alias(column.as_deref()));
            Ok(SelectItem::Aggregate { op, column, alias })
        }
        other => Err(GuardError::InvalidPayload(format!(
            "select[{}].type '{}' is unknown",
            index, other
        ))),
    }
}

fn lower_where(w: &WhereArgs, index: usize) -> GuardResult<Predicate> {
    let column = w.column.trim();
    if column.is_empty() {
        return Err(GuardError::missing(
            format!("where[{}].column", index),
            "where column is empty",
        ));
    }
    let op = parse_where_op(&w.op, format!("where[{}].op", index))?;
    Ok(Predicate::new(column, op, Literal::from_json(&w.value)))
}

fn lower_order(o: &OrderByArgs, index: usize) -> GuardResult<OrderItem> {
    let expr = o.expr.trim();
    if expr.is_empty() {
        return Err(GuardError::missing(
            format!("order_by[{}].expr", index),
            "order expression is empty",
        ));
    }
    let dir = parse_dir(o.dir.as_deref(), &format!("order_by[{}].dir", index))?;
    Ok(OrderItem {
        expr: expr.into(),
        dir,
    })
}

// =============================================================================
// Shared parsing
// =============================================================================

fn parse_agg_op(op: &str, field: String) -> GuardResult<AggOp> {
    AggOp::parse(op).ok_or_else(|| GuardError::InvalidAggregation {
        op: op.to_string(),
        field,
    })
}

fn parse_where_op(op: &str, field: String) -> GuardResult<WhereOp> {
    WhereOp::parse(op).ok_or_else(|| GuardError::InvalidOperator {
        op: op.to_string(),
        field,
    })
}

/// Absent direction is ascending.
fn parse_dir(dir: Option<&str>, field: &str) -> GuardResult<SortDir> {
    match trimmed(dir) {
        None => Ok(SortDir::Asc),
        Some(d) => SortDir::parse(&d).ok_or_else(|| {
            GuardError::InvalidPayload(format!("{} must be 'asc' or 'desc', got '{}'", field, d))
        }),
    }
}
