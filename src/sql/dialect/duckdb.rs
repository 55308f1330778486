//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for everything a compiled plan emits;
//! only the cast type names differ.

use super::{CastType, SqlDialect};

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn cast_suffix(&self, cast: CastType) -> &'static str {
        match cast {
            CastType::BigInt => "::BIGINT",
            CastType::DoublePrecision => "::DOUBLE",
        }
    }
}
