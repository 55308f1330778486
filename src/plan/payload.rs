//! Function-call payloads as a model emits them.
//!
//! These types mirror the JSON arguments of the two plan tools. They are
//! tolerant: unknown keys are ignored, missing keys take
//! defaults, and fields a model often mis-shapes (scalar vs list, numeric
//! strings) are kept as raw [`serde_json::Value`] until lowering coerces them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GuardError, GuardResult};

/// Arguments of the intent-based plan tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentPlanArgs {
    pub intent: String,
    pub target_column: Option<String>,
    pub value_column: Option<String>,
    /// Scalar or list of column names.
    pub group_by: Value,
    /// Scalar or list of column names.
    pub select_columns: Value,
    pub filters: Vec<FilterArgs>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub limit: Option<Value>,
    pub offset: Option<Value>,
}

/// One filter of an intent plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterArgs {
    pub column: String,
    #[serde(alias = "operator")]
    pub op: String,
    pub value: Value,
}

/// Arguments of the generic select/where/aggregate plan tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericPlanArgs {
    /// Informational only; the authorized table always wins.
    pub table_fqn: Option<String>,
    pub select: Vec<SelectItemArgs>,
    #[serde(rename = "where", alias = "filters")]
    pub where_: Vec<WhereArgs>,
    pub aggregations: Vec<AggregationArgs>,
    /// Scalar or list of column names.
    pub group_by: Value,
    pub order_by: Vec<OrderByArgs>,
    pub limit: Option<Value>,
    pub offset: Option<Value>,
}

/// One `select` entry: `{"type": "column", "name": ...}` or
/// `{"type": "agg", "agg": "sum", "column": ..., "alias": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectItemArgs {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "op")]
    pub agg: Option<String>,
    pub column: Option<String>,
    pub alias: Option<String>,
}

/// One `aggregations` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationArgs {
    pub op: String,
    pub column: Option<String>,
    pub alias: Option<String>,
}

/// One `where` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhereArgs {
    pub column: String,
    #[serde(alias = "operator")]
    pub op: String,
    pub value: Value,
}

/// One `order_by` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderByArgs {
    #[serde(alias = "column")]
    pub expr: String,
    #[serde(alias = "direction")]
    pub dir: Option<String>,
}

/// A plan payload of either shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanPayload {
    Intent(IntentPlanArgs),
    Generic(GenericPlanArgs),
}

impl PlanPayload {
    /// Route a decoded JSON object: objects carrying an `intent` key are
    /// intent plans, everything else is a generic plan.
    pub fn from_value(value: Value) -> GuardResult<Self> {
        if !value.is_object() {
            return Err(GuardError::InvalidPayload(
                "plan payload must be a JSON object".into(),
            ));
        }
        let decoded = if value.get("intent").is_some() {
            serde_json::from_value(value).map(PlanPayload::Intent)
        } else {
            serde_json::from_value(value).map(PlanPayload::Generic)
        };
        decoded.map_err(|e| GuardError::InvalidPayload(e.to_string()))
    }

    /// Decode the first JSON object embedded in model output.
    pub fn from_model_text(text: &str) -> GuardResult<Self> {
        let json = extract_json_object(text).ok_or_else(|| {
            GuardError::InvalidPayload("no JSON object found in model output".into())
        })?;
        let value: Value =
            serde_json::from_str(json).map_err(|e| GuardError::InvalidPayload(e.to_string()))?;
        Self::from_value(value)
    }
}

/// Slice from the first `{` to the last `}`.
///
/// Models often wrap arguments in prose or code fences; this recovers the
/// object without trying to understand the surrounding text.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
