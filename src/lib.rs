//! # sqlgate
//!
//! Turns model-generated query plans and free-text SQL into safe,
//! deterministic SQL against one caller-authorized table.
//!
//! ## Architecture
//!
//! ```text
//!   question          plan payload (JSON)          free-text SQL
//!      │                     │                          │
//!      ▼ [template]          ▼ [plan::payload]          ▼ [sanitize]
//!   PlanDraft ◄──────── [lowering]                 extract, re-space,
//!      │                                           safety policy,
//!      ▼ [validation] (column whitelist)           force FROM table
//!   QueryPlan                                           │
//!      │                                                │
//!      ▼ [sql::emit]                                    │
//!   SQL ───────────────────► CompiledPlan ◄─────────────┘
//!                       {sql, used_template, reason}
//! ```
//!
//! Every identifier that reaches a compiled statement is a whitelisted
//! column name, an alias, or the authorized table; all of them are quoted by
//! the dialect. Nothing here performs I/O: the column catalog and the table
//! are supplied by the caller.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod intent;
pub mod limit;
pub mod lowering;
pub mod plan;
pub mod sanitize;
pub mod sql;
pub mod template;
pub mod validation;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{allowed_columns, AuthorizedTable, ColumnMeta, Whitelist};
    pub use crate::compile::{CompileOptions, CompiledPlan, Request};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::error::{GuardError, GuardResult, UnsafeReason};
    pub use crate::intent::{classify, normalize_question, QuestionSignals};
    pub use crate::limit::{enforce_limit, ensure_limit};
    pub use crate::plan::{GenericPlanArgs, Intent, IntentPlanArgs, PlanPayload};
    pub use crate::sanitize::sanitize_llm_sql;
    pub use crate::template::TemplatePlanner;
}

// Also export at crate root for convenience
pub use compile::{CompileOptions, CompiledPlan, Request};
pub use dialect::Dialect;
pub use error::{GuardError, GuardResult};
