//! Template planner.
//!
//! Answers common questions without a model call. Templates are plan drafts,
//! not SQL strings: the caller still validates and compiles them, so they get
//! the same quoting, casting and whitelist checks as every other plan.

use tracing::debug;

use crate::catalog::Whitelist;
use crate::intent::columns::{detect_group_column, detect_sum_column, detect_target_column};
use crate::intent::QuestionSignals;
use crate::lowering::{distinct_select, grouped_sum_filters, grouped_sum_select, Lowered, TOTAL_ALIAS};
use crate::plan::{AggOp, DraftStatement, OrderItem, PlanDraft, Predicate, SelectItem};

/// Deterministic planner over one table's whitelist.
#[derive(Debug, Clone, Copy)]
pub struct TemplatePlanner<'a> {
    whitelist: &'a Whitelist,
}

impl<'a> TemplatePlanner<'a> {
    pub fn new(whitelist: &'a Whitelist) -> Self {
        Self { whitelist }
    }

    /// Try the templates in priority order: schema, distinct, sum (grouped
    /// when a group column is also found), count.
    ///
    /// Returns `None` when no template applies.
    pub fn plan(&self, question: &str) -> Option<Lowered> {
        let signals = QuestionSignals::detect(question);

        if signals.is_schema() {
            debug!("template: schema");
            return Some(Lowered {
                statement: DraftStatement::ColumnListing,
                reason: "schema_columns_template".into(),
            });
        }

        if signals.is_distinct() {
            match detect_target_column(question, self.whitelist) {
                Some(col) => {
                    debug!(column = col, "template: distinct");
                    return Some(distinct_template(col));
                }
                None => debug!("distinct question without a known column"),
            }
        }

        if signals.is_sum() {
            match detect_sum_column(&signals, self.whitelist) {
                Some(value) => {
                    if signals.wants_group_by() {
                        if let Some(group) = detect_group_column(question, self.whitelist, Some(value)) {
                            debug!(group, value, "template: grouped sum");
                            return Some(grouped_sum_template(group, value));
                        }
                    }
                    debug!(column = value, "template: sum");
                    return Some(sum_template(value));
                }
                None => debug!("sum question without a hinted column"),
            }
        }

        if signals.is_count() {
            debug!("template: count");
            return Some(Lowered {
                statement: DraftStatement::Select(PlanDraft {
                    select: vec![SelectItem::aggregate(AggOp::Count, None, TOTAL_ALIAS)],
                    ..Default::default()
                }),
                reason: "count_template".into(),
            });
        }

        debug!("no template applies");
        None
    }
}

fn distinct_template(column: &str) -> Lowered {
    let columns = [column.to_string()];
    Lowered {
        statement: DraftStatement::Select(PlanDraft {
            distinct: true,
            select: distinct_select(&columns),
            filters: vec![Predicate::not_null(column)],
            order_by: vec![OrderItem::asc(column)],
            ..Default::default()
        }),
        reason: format!("distinct_template:{}", column),
    }
}

fn sum_template(value: &str) -> Lowered {
    Lowered {
        statement: DraftStatement::Select(PlanDraft {
            select: vec![SelectItem::aggregate(AggOp::Sum, Some(value), TOTAL_ALIAS)],
            ..Default::default()
        }),
        reason: format!("sum_template:{}", value),
    }
}

fn grouped_sum_template(group: &str, value: &str) -> Lowered {
    let groups = [group.to_string()];
    Lowered {
        statement: DraftStatement::Select(PlanDraft {
            select: grouped_sum_select(&groups, value),
            filters: grouped_sum_filters(&groups, value),
            group_by: groups.to_vec(),
            order_by: vec![OrderItem::desc(TOTAL_ALIAS)],
            ..Default::default()
        }),
        reason: format!("grouped_sum_template:{}:{}", group, value),
    }
}
