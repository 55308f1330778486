//! SQL dialect definitions and formatting rules.
//!
//! Compiled statements target a PostgreSQL-compatible engine. The dialect
//! seam keeps identifier quoting, literal encoding, pagination and the
//! aggregate wire-type casts in exactly one place:
//!
//! - Identifier quoting: `"ident"` with embedded `"` doubled
//! - String literals: `'text'` with embedded `'` doubled
//! - Booleans: `TRUE` / `FALSE`
//! - Pagination: `LIMIT n OFFSET m`
//! - Casts: `::bigint` / `::double precision` (PostgreSQL), `::BIGINT` / `::DOUBLE` (DuckDB)
//!
//! # Usage
//!
//! ```ignore
//! use sqlgate::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```

mod duckdb;
pub mod helpers;
mod postgres;

pub use duckdb::DuckDb;
pub use postgres::Postgres;

use serde::{Deserialize, Serialize};

use super::token::TokenStream;

/// Target type of an aggregate cast.
///
/// `COUNT` is always cast to a 64-bit integer and `SUM`/`AVG` to floating
/// point so clients see a stable wire type whatever the source column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    BigInt,
    DoublePrecision,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (column, alias, table segment).
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_upper(b)
    }

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // Casts
    // =========================================================================

    /// Postfix cast appended to an aggregate call.
    fn cast_suffix(&self, cast: CastType) -> &'static str;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit `LIMIT n [OFFSET m]`.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }

    /// Parse a dialect name as written in settings files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "duckdb" => Some(Dialect::DuckDb),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn cast_suffix(&self, cast: CastType) -> &'static str {
        self.dialect().cast_suffix(cast)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }
}
