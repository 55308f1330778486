//! Column catalog adapter.
//!
//! The catalog is supplied by the caller per table; this module only reads it.
//! [`Whitelist`] is the single source of truth for which column names may
//! appear anywhere in a plan or compiled statement.

mod table;

pub use table::AuthorizedTable;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One column of the target table, as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,

    /// Declared SQL type, informational only.
    #[serde(rename = "type", alias = "sql_type", alias = "data_type", default)]
    pub sql_type: String,

    #[serde(default)]
    pub is_geometry: bool,
}

impl ColumnMeta {
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            is_geometry: false,
        }
    }

    pub fn geometry(name: &str) -> Self {
        Self {
            name: name.into(),
            sql_type: "geometry".into(),
            is_geometry: true,
        }
    }
}

/// The set of non-geometry, non-blank column names of one table.
///
/// Membership is exact string equality. Iteration follows catalog order so
/// that every heuristic built on top of it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl Whitelist {
    /// Build the whitelist from a catalog, skipping geometry columns and blank names.
    pub fn from_catalog(catalog: &[ColumnMeta]) -> Self {
        let mut ordered = Vec::new();
        let mut members = HashSet::new();
        for column in catalog {
            let name = column.name.trim();
            if name.is_empty() || column.is_geometry {
                continue;
            }
            if members.insert(name.to_string()) {
                ordered.push(name.to_string());
            }
        }
        Self { ordered, members }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Columns in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Columns ordered longest name first; ties keep catalog order.
    pub fn longest_first(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.iter().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names
    }
}

/// Derive the whitelist for one table.
pub fn allowed_columns(catalog: &[ColumnMeta]) -> Whitelist {
    Whitelist::from_catalog(catalog)
}
