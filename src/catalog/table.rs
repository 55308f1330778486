//! The caller-authorized target table.

use crate::error::{GuardError, GuardResult};

/// Fully-qualified name of the one table a compiled statement may reference.
///
/// The text is rendered verbatim after `FROM`; it is authorized by the caller,
/// never taken from model output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizedTable {
    fqn: String,
}

impl AuthorizedTable {
    /// Wrap an already-qualified reference such as `zcm."zoneamento"`.
    pub fn new(fqn: &str) -> GuardResult<Self> {
        let fqn = fqn.trim();
        if fqn.is_empty() {
            return Err(GuardError::InvalidTableReference(
                "table reference is empty".into(),
            ));
        }
        if has_unquoted_separator(fqn) {
            return Err(GuardError::InvalidTableReference(format!(
                "'{}' is not a single table reference",
                fqn
            )));
        }
        Ok(Self { fqn: fqn.into() })
    }

    /// Qualify a bare table identifier with `default_schema`.
    ///
    /// `1201_zeec` becomes `zcm."1201_zeec"`. Identifiers that already contain
    /// a `.` are taken as qualified and kept as given.
    pub fn from_identifier(identifier: &str, default_schema: &str) -> GuardResult<Self> {
        let ident = identifier.trim();
        if ident.is_empty() {
            return Err(GuardError::InvalidTableReference(
                "table identifier is empty".into(),
            ));
        }
        if ident.contains('.') {
            return Self::new(ident);
        }
        Self::new(&format!(
            "{}.{}",
            default_schema.trim(),
            crate::sql::dialect::helpers::quote_double(ident)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.fqn
    }

    /// Split into unquoted `(schema, table)` for catalog lookups.
    pub fn split_schema(&self) -> GuardResult<(String, String)> {
        let (schema, table) = self.fqn.split_once('.').ok_or_else(|| {
            GuardError::InvalidTableReference(format!(
                "'{}' has no schema qualifier",
                self.fqn
            ))
        })?;
        Ok((unquote(schema), unquote(table)))
    }
}

impl std::fmt::Display for AuthorizedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqn)
    }
}

/// `;` anywhere, or whitespace outside a double-quoted segment.
fn has_unquoted_separator(fqn: &str) -> bool {
    let mut quoted = false;
    for c in fqn.chars() {
        match c {
            ';' => return true,
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => return true,
            _ => {}
        }
    }
    false
}

fn unquote(segment: &str) -> String {
    let s = segment.trim();
    match s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => s.to_string(),
    }
}
