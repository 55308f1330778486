//! Error types for plan validation, compilation and free-text SQL sanitizing.
//!
//! Every failure is fail-closed: a function either returns a complete SQL
//! statement or one of these errors, never a partial statement.

/// Result type used across the crate.
pub type GuardResult<T> = Result<T, GuardError>;

/// Why a free-text statement was rejected by the safety policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsafeReason {
    /// Nothing left after extraction.
    #[error("statement is empty")]
    Empty,

    /// A `;` followed by more non-whitespace input.
    #[error("more than one statement")]
    MultipleStatements,

    /// The statement does not begin with `SELECT` or `WITH`.
    #[error("statement must start with SELECT or WITH")]
    NotSelect,

    /// A `--` or `/*` comment, which can hide tokens from table forcing.
    #[error("SQL comments are not allowed")]
    Comment,

    /// `FROM` glued to punctuation, e.g. `FROM(` or `FROM/`.
    #[error("FROM must be followed by whitespace")]
    GluedFrom,

    /// A DDL/DML keyword appears as a whole word.
    #[error("forbidden keyword '{0}'")]
    ForbiddenKeyword(String),

    /// No `FROM` target to force onto the authorized table.
    #[error("no FROM clause to rewrite")]
    MissingFrom,
}

/// Crate-wide error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    #[error("Invalid column '{column}' in {field}: not in the column whitelist")]
    InvalidColumn { column: String, field: String },

    #[error("Invalid operator '{op}' in {field}")]
    InvalidOperator { op: String, field: String },

    #[error("Invalid aggregation '{op}' in {field}")]
    InvalidAggregation { op: String, field: String },

    #[error("Missing required field {field}: {message}")]
    MissingRequiredField { field: String, message: String },

    #[error("Unsafe SQL detected: {0}")]
    UnsafeSqlDetected(UnsafeReason),

    #[error("Invalid table reference: {0}")]
    InvalidTableReference(String),

    #[error("Invalid plan payload: {0}")]
    InvalidPayload(String),
}

impl GuardError {
    pub(crate) fn invalid_column(column: &str, field: impl Into<String>) -> Self {
        GuardError::InvalidColumn {
            column: column.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>, message: impl Into<String>) -> Self {
        GuardError::MissingRequiredField {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<UnsafeReason> for GuardError {
    fn from(reason: UnsafeReason) -> Self {
        GuardError::UnsafeSqlDetected(reason)
    }
}
