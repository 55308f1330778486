//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used here:
//! - ANSI identifier quoting (`"`)
//! - `::type` postfix casts
//! - ILIKE

use super::{CastType, SqlDialect};

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn cast_suffix(&self, cast: CastType) -> &'static str {
        match cast {
            CastType::BigInt => "::bigint",
            CastType::DoublePrecision => "::double precision",
        }
    }

    // Uses default quoting and emit_limit_offset (LIMIT ... OFFSET ...)
}
