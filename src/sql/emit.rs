//! Deterministic SQL emission for validated plans.
//!
//! The compiler is a pure function of `(plan, table, dialect)`. Every
//! identifier is quoted through the dialect, every literal is escaped, and
//! the authorized table is the only FROM target. Clauses are separated by a
//! newline. Every plan statement ends with `LIMIT n`; the column listing is
//! bounded by the catalog and carries no `LIMIT`. All statements end with `;`.

use crate::catalog::AuthorizedTable;
use crate::error::GuardResult;
use crate::plan::{Literal, OrderItem, Predicate, QueryPlan, SelectItem, SortDir, WhereOp};

use super::dialect::{Dialect, SqlDialect};
use super::token::{Token, TokenStream};

/// Compile a validated plan against the authorized table.
pub fn compile_select(plan: &QueryPlan, table: &AuthorizedTable, dialect: Dialect) -> String {
    let mut ts = TokenStream::new();

    ts.push(Token::Select).space();
    if plan.is_distinct() {
        ts.push(Token::Distinct).space();
    }
    emit_select_list(&mut ts, plan.select());

    ts.newline()
        .push(Token::From)
        .space()
        .push(Token::Table(table.as_str().into()));

    if !plan.filters().is_empty() {
        ts.newline().push(Token::Where).space();
        for (i, pred) in plan.filters().iter().enumerate() {
            if i > 0 {
                ts.space().push(Token::And).space();
            }
            emit_predicate(&mut ts, pred);
        }
    }

    if !plan.group_by().is_empty() {
        ts.newline().push(Token::GroupBy).space();
        emit_ident_list(&mut ts, plan.group_by());
    }

    if !plan.order_by().is_empty() {
        ts.newline().push(Token::OrderBy).space();
        for (i, item) in plan.order_by().iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            emit_order_item(&mut ts, item);
        }
    }

    ts.newline();
    ts.append(&dialect.emit_limit_offset(Some(plan.limit()), plan.offset()));
    ts.push(Token::Semicolon);

    ts.serialize(dialect)
}

/// Column listing for the authorized table, read from `information_schema`.
///
/// The table must be schema-qualified.
pub fn compile_column_listing(table: &AuthorizedTable, dialect: Dialect) -> GuardResult<String> {
    let (schema, name) = table.split_schema()?;

    let mut ts = TokenStream::new();
    ts.push(Token::Select)
        .space()
        .push(Token::Ident("column_name".into()))
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident("coluna".into()))
        .comma()
        .space()
        .push(Token::Ident("data_type".into()))
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident("tipo".into()))
        .comma()
        .space()
        .push(Token::Ident("is_nullable".into()))
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident("nula".into()));

    ts.newline()
        .push(Token::From)
        .space()
        .push(Token::Raw("information_schema.columns"));

    ts.newline()
        .push(Token::Where)
        .space()
        .push(Token::Ident("table_schema".into()))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitString(schema))
        .space()
        .push(Token::And)
        .space()
        .push(Token::Ident("table_name".into()))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitString(name));

    ts.newline()
        .push(Token::OrderBy)
        .space()
        .push(Token::Ident("ordinal_position".into()))
        .push(Token::Semicolon);

    Ok(ts.serialize(dialect))
}

fn emit_select_list(ts: &mut TokenStream, items: &[SelectItem]) {
    if items.is_empty() {
        ts.push(Token::Star);
        return;
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        match item {
            SelectItem::Column { name, alias } => {
                ts.push(Token::Ident(name.clone()));
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
            }
            SelectItem::Aggregate { op, column, alias } => {
                ts.push(Token::FunctionName(op.as_str().into())).lparen();
                match column {
                    Some(col) => ts.push(Token::Ident(col.clone())),
                    None => ts.push(Token::Star),
                };
                ts.rparen();
                if let Some(cast) = op.cast() {
                    ts.push(Token::Cast(cast));
                }
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
            }
        }
    }
}

fn emit_ident_list(ts: &mut TokenStream, names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.push(Token::Ident(name.clone()));
    }
}

fn emit_predicate(ts: &mut TokenStream, pred: &Predicate) {
    ts.push(Token::Ident(pred.column.clone())).space();

    // Null comparisons become IS [NOT] NULL; validation rejects any other
    // operator with a null value.
    if pred.value.is_null() {
        match pred.op {
            WhereOp::Ne => ts.push(Token::IsNotNull),
            _ => ts.push(Token::IsNull),
        };
        return;
    }

    ts.push(match pred.op {
        WhereOp::Eq => Token::Eq,
        WhereOp::Ne => Token::Ne,
        WhereOp::Gt => Token::Gt,
        WhereOp::Gte => Token::Gte,
        WhereOp::Lt => Token::Lt,
        WhereOp::Lte => Token::Lte,
        WhereOp::In => Token::In,
        WhereOp::Like => Token::Like,
        WhereOp::ILike => Token::ILike,
    });
    ts.space();

    match &pred.value {
        Literal::List(items) => {
            ts.lparen();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                emit_literal(ts, item);
            }
            ts.rparen();
        }
        other => emit_literal(ts, other),
    }
}

fn emit_literal(ts: &mut TokenStream, value: &Literal) {
    match value {
        Literal::Null => {
            ts.push(Token::LitNull);
        }
        Literal::Bool(b) => {
            ts.push(Token::LitBool(*b));
        }
        Literal::Int(n) => {
            ts.push(Token::LitInt(*n));
        }
        Literal::UInt(n) => {
            ts.push(Token::LitUInt(*n));
        }
        Literal::Float(f) if f.is_finite() => {
            ts.push(Token::LitFloat(*f));
        }
        Literal::Float(f) => {
            ts.push(Token::LitString(f.to_string()));
        }
        Literal::Text(s) => {
            ts.push(Token::LitString(s.clone()));
        }
        // Nested lists are rendered as their text; validation only admits
        // flat lists for IN.
        Literal::List(_) => {
            ts.push(Token::LitString(format!("{:?}", value)));
        }
    }
}

fn emit_order_item(ts: &mut TokenStream, item: &OrderItem) {
    ts.push(Token::Ident(item.expr.clone())).space();
    ts.push(match item.dir {
        SortDir::Asc => Token::Asc,
        SortDir::Desc => Token::Desc,
    });
}
