//! High-level compile API.
//!
//! A [`Request`] binds the authorized table, the column whitelist derived
//! from its catalog, and the row ceiling. Each output path is one method and
//! every path returns the same [`CompiledPlan`] shape:
//!
//! - [`Request::plan_template`] - deterministic templates, no model call
//! - [`Request::compile_payload`] - intent or generic plan payloads
//! - [`Request::sanitize_model_sql`] - free-text SQL from a model
//! - [`Request::apply_cached_sql`] - SQL replayed from a cache

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{allowed_columns, AuthorizedTable, ColumnMeta, Whitelist};
use crate::error::GuardResult;
use crate::fingerprint::{compute_hash, sql_fingerprint};
use crate::limit::enforce_limit;
use crate::lowering::{lower, Lowered};
use crate::plan::{GenericPlanArgs, IntentPlanArgs, PlanPayload, ValidatedStatement};
use crate::sanitize::{sanitize_llm_sql, SANITIZED_REASON};
use crate::sql::dialect::Dialect;
use crate::sql::emit::{compile_column_listing, compile_select};
use crate::template::TemplatePlanner;
use crate::validation::validate_statement;

/// Default row-count ceiling.
pub const DEFAULT_ROW_CEILING: u64 = 100;

/// Reason tag of SQL replayed from a cache.
pub const CACHE_HIT_REASON: &str = "rag_exact_hit";

/// Options shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub dialect: Dialect,
    pub row_ceiling: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            row_ceiling: DEFAULT_ROW_CEILING,
        }
    }
}

/// A finished statement and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPlan {
    /// Always ends with `;` and always reads from the authorized table.
    pub sql: String,
    /// True when the SQL came from a template or a structured plan.
    pub used_template: bool,
    pub reason: String,
}

impl CompiledPlan {
    /// SHA-256 of the SQL text.
    pub fn fingerprint(&self) -> String {
        sql_fingerprint(&self.sql)
    }
}

/// One table's compile context.
#[derive(Debug, Clone)]
pub struct Request {
    table: AuthorizedTable,
    whitelist: Whitelist,
    options: CompileOptions,
}

impl Request {
    pub fn new(table: AuthorizedTable, catalog: &[ColumnMeta], options: CompileOptions) -> Self {
        Self {
            table,
            whitelist: allowed_columns(catalog),
            options,
        }
    }

    /// Override the row ceiling for this request.
    pub fn with_row_ceiling(mut self, row_ceiling: u64) -> Self {
        self.options.row_ceiling = row_ceiling;
        self
    }

    pub fn table(&self) -> &AuthorizedTable {
        &self.table
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Answer the question from a template, if one applies.
    pub fn plan_template(&self, question: &str) -> GuardResult<Option<CompiledPlan>> {
        match TemplatePlanner::new(&self.whitelist).plan(question) {
            Some(lowered) => self.finish(lowered).map(Some),
            None => Ok(None),
        }
    }

    /// Compile a plan payload of either shape.
    pub fn compile_payload(&self, payload: &PlanPayload) -> GuardResult<CompiledPlan> {
        if let Ok(hash) = compute_hash(payload) {
            debug!(payload = %hash, "compiling plan payload");
        }
        self.finish(lower(payload, &self.whitelist)?)
    }

    pub fn compile_intent_plan(&self, args: &IntentPlanArgs) -> GuardResult<CompiledPlan> {
        self.compile_payload(&PlanPayload::Intent(args.clone()))
    }

    pub fn compile_generic_plan(&self, args: &GenericPlanArgs) -> GuardResult<CompiledPlan> {
        self.compile_payload(&PlanPayload::Generic(args.clone()))
    }

    /// Decode the JSON object embedded in model output and compile it.
    pub fn compile_model_output(&self, text: &str) -> GuardResult<CompiledPlan> {
        self.compile_payload(&PlanPayload::from_model_text(text)?)
    }

    /// Sanitize model-written SQL and force it onto the authorized table.
    ///
    /// The row limit is left as the model wrote it; use
    /// [`crate::limit::enforce_limit`] to bound it.
    pub fn sanitize_model_sql(&self, raw: &str) -> GuardResult<CompiledPlan> {
        let sql = sanitize_llm_sql(raw, &self.table)?;
        Ok(self.emit(CompiledPlan {
            sql,
            used_template: false,
            reason: SANITIZED_REASON.into(),
        }))
    }

    /// Re-bound SQL from a previous successful run with this request's ceiling.
    pub fn apply_cached_sql(&self, sql: &str) -> CompiledPlan {
        self.emit(CompiledPlan {
            sql: enforce_limit(sql, self.options.row_ceiling),
            used_template: false,
            reason: CACHE_HIT_REASON.into(),
        })
    }

    fn finish(&self, lowered: Lowered) -> GuardResult<CompiledPlan> {
        let Lowered { statement, reason } = lowered;
        let ceiling = self.options.row_ceiling;
        let dialect = self.options.dialect;

        let sql = match validate_statement(statement, &self.whitelist, ceiling)? {
            ValidatedStatement::ColumnListing => compile_column_listing(&self.table, dialect)?,
            ValidatedStatement::Select(plan) => compile_select(&plan, &self.table, dialect),
        };

        Ok(self.emit(CompiledPlan {
            sql,
            used_template: true,
            reason,
        }))
    }

    fn emit(&self, plan: CompiledPlan) -> CompiledPlan {
        info!(
            table = %self.table,
            reason = %plan.reason,
            used_template = plan.used_template,
            fingerprint = %plan.fingerprint(),
            "compiled statement"
        );
        plan
    }
}
