//! Query plan types.
//!
//! Two surface shapes arrive from a model function call (see [`payload`]):
//! an intent-based shape and a generic select/where/aggregate shape. Both are
//! lowered into the one canonical [`PlanDraft`], which
//! [`crate::validation::validate`] turns into a [`QueryPlan`]. Only a
//! `QueryPlan` can be compiled.

pub mod payload;
pub(crate) mod shape;

pub use payload::{
    extract_json_object, AggregationArgs, FilterArgs, GenericPlanArgs, IntentPlanArgs,
    OrderByArgs, PlanPayload, SelectItemArgs, WhereArgs,
};

use crate::sql::dialect::CastType;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enumerations
// =============================================================================

/// What a question or intent plan asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Schema,
    Count,
    Distinct,
    Sum,
    GroupedSum,
    Detail,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Schema => "schema",
            Intent::Count => "count",
            Intent::Distinct => "distinct",
            Intent::Sum => "sum",
            Intent::GroupedSum => "grouped_sum",
            Intent::Detail => "detail",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "schema" => Some(Intent::Schema),
            "count" => Some(Intent::Count),
            "distinct" => Some(Intent::Distinct),
            "sum" => Some(Intent::Sum),
            "grouped_sum" => Some(Intent::GroupedSum),
            "detail" => Some(Intent::Detail),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggOp {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggOp {
    /// Case-insensitive parse.
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_ascii_lowercase().as_str() {
            "sum" => Some(AggOp::Sum),
            "count" => Some(AggOp::Count),
            "avg" => Some(AggOp::Avg),
            "min" => Some(AggOp::Min),
            "max" => Some(AggOp::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggOp::Sum => "sum",
            AggOp::Count => "count",
            AggOp::Avg => "avg",
            AggOp::Min => "min",
            AggOp::Max => "max",
        }
    }

    /// Wire-type cast applied to the aggregate result, if any.
    pub fn cast(&self) -> Option<CastType> {
        match self {
            AggOp::Count => Some(CastType::BigInt),
            AggOp::Sum | AggOp::Avg => Some(CastType::DoublePrecision),
            AggOp::Min | AggOp::Max => None,
        }
    }

    /// Alias used when the caller gives none: `sum_area`, `count_all`.
    pub fn default_alias(&self, column: Option<&str>) -> String {
        format!("{}_{}", self.as_str(), column.unwrap_or("all"))
    }
}

/// Supported WHERE operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhereOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    ILike,
}

impl WhereOp {
    /// Parse an operator; word operators are case-insensitive.
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_ascii_uppercase().as_str() {
            "=" => Some(WhereOp::Eq),
            "!=" => Some(WhereOp::Ne),
            ">" => Some(WhereOp::Gt),
            ">=" => Some(WhereOp::Gte),
            "<" => Some(WhereOp::Lt),
            "<=" => Some(WhereOp::Lte),
            "IN" => Some(WhereOp::In),
            "LIKE" => Some(WhereOp::Like),
            "ILIKE" => Some(WhereOp::ILike),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WhereOp::Eq => "=",
            WhereOp::Ne => "!=",
            WhereOp::Gt => ">",
            WhereOp::Gte => ">=",
            WhereOp::Lt => "<",
            WhereOp::Lte => "<=",
            WhereOp::In => "IN",
            WhereOp::Like => "LIKE",
            WhereOp::ILike => "ILIKE",
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(dir: &str) -> Option<Self> {
        match dir.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDir::Asc),
            "desc" => Some(SortDir::Desc),
            _ => None,
        }
    }
}

// =============================================================================
// Literal values
// =============================================================================

/// A comparison value taken from a plan payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Convert a JSON value. Objects become their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Literal::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Literal::UInt(u)
                } else {
                    Literal::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => Literal::Text(s.clone()),
            Value::Array(items) => Literal::List(items.iter().map(Literal::from_json).collect()),
            Value::Object(_) => Literal::Text(value.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.into())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

// =============================================================================
// Plan items
// =============================================================================

/// One SELECT list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Column {
        name: String,
        alias: String,
    },
    Aggregate {
        op: AggOp,
        /// `None` only for `COUNT(*)`.
        column: Option<String>,
        alias: String,
    },
}

impl SelectItem {
    /// Plain column aliased by its own name.
    pub fn column(name: &str) -> Self {
        SelectItem::Column {
            name: name.into(),
            alias: name.into(),
        }
    }

    pub fn aggregate(op: AggOp, column: Option<&str>, alias: &str) -> Self {
        SelectItem::Aggregate {
            op,
            column: column.map(String::from),
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            SelectItem::Column { alias, .. } | SelectItem::Aggregate { alias, .. } => alias,
        }
    }

    /// Column this item reads, if any.
    pub fn source_column(&self) -> Option<&str> {
        match self {
            SelectItem::Column { name, .. } => Some(name),
            SelectItem::Aggregate { column, .. } => column.as_deref(),
        }
    }
}

/// One WHERE predicate; predicates are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: WhereOp,
    pub value: Literal,
}

impl Predicate {
    pub fn new(column: &str, op: WhereOp, value: Literal) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// `column IS NOT NULL`
    pub fn not_null(column: &str) -> Self {
        Self::new(column, WhereOp::Ne, Literal::Null)
    }
}

/// One ORDER BY entry: a whitelisted column or a declared alias.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: String,
    pub dir: SortDir,
}

impl OrderItem {
    pub fn asc(expr: &str) -> Self {
        Self {
            expr: expr.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(expr: &str) -> Self {
        Self {
            expr: expr.into(),
            dir: SortDir::Desc,
        }
    }
}

// =============================================================================
// Canonical plans
// =============================================================================

/// Canonical, not yet validated plan produced by lowering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDraft {
    pub distinct: bool,
    pub select: Vec<SelectItem>,
    pub filters: Vec<Predicate>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A lowered statement before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftStatement {
    /// Catalog lookup listing the table's columns.
    ColumnListing,
    Select(PlanDraft),
}

/// A plan that satisfied every whitelist and shape invariant.
///
/// Built only by [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub(crate) distinct: bool,
    pub(crate) select: Vec<SelectItem>,
    pub(crate) filters: Vec<Predicate>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) limit: u64,
    pub(crate) offset: Option<u64>,
}

impl QueryPlan {
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn select(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[OrderItem] {
        &self.order_by
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Every column name the plan reads, in clause order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self.select.iter().filter_map(SelectItem::source_column).collect();
        cols.extend(self.filters.iter().map(|p| p.column.as_str()));
        cols.extend(self.group_by.iter().map(String::as_str));
        cols
    }
}

/// A validated statement, ready for the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedStatement {
    ColumnListing,
    Select(QueryPlan),
}
