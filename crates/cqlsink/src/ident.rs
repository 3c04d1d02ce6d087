//! Safe CQL identifier handling.
//!
//! Column and table names come from record data, so they are never pasted
//! into a statement as-is. [`Ident`] decides how a name is rendered:
//!
//! - Names matching `[a-z_][a-z0-9_]*` that are not reserved words render bare
//! - Everything else is double-quoted, with `"` escaped as `""`
//! - Empty names and names containing NUL are rejected
//!
//! Quoting keeps mixed-case names intact; an unquoted `UserId` would be
//! folded to `userid` by the cluster.
//!
//! # Example
//! ```
//! use cqlsink::ident::Ident;
//!
//! assert_eq!(Ident::new("user_id").unwrap().to_cql(), "user_id");
//! assert_eq!(Ident::new("UserId").unwrap().to_cql(), r#""UserId""#);
//! assert_eq!(Ident::new(r#"a"b"#).unwrap().to_cql(), r#""a""b""#);
//! # Ok::<(), cqlsink::SinkError>(())
//! ```

use crate::error::{SinkError, SinkResult};
use std::fmt;

/// CQL reserved keywords, lowercase and sorted. These cannot be used bare.
const RESERVED: &[&str] = &[
    "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch", "begin", "by",
    "columnfamily", "create", "delete", "desc", "describe", "drop", "entries", "execute",
    "from", "full", "grant", "if", "in", "index", "infinity", "insert", "into", "is",
    "keyspace", "limit", "materialized", "mbean", "mbeans", "modify", "nan", "norecursive",
    "not", "null", "of", "on", "or", "order", "primary", "rename", "replace", "revoke",
    "schema", "select", "set", "table", "to", "token", "truncate", "unlogged", "unset",
    "update", "use", "using", "view", "where", "with",
];

/// A validated CQL identifier (table or column name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    name: String,
}

impl Ident {
    /// Validate a raw name.
    pub fn new(name: impl Into<String>) -> SinkResult<Self> {
        let name = name.into();
        check(&name)?;
        Ok(Self { name })
    }

    /// The name exactly as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name renders without quotes.
    pub fn is_bare(&self) -> bool {
        is_bare(&self.name)
    }

    /// Render the identifier as CQL.
    pub fn to_cql(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        write_cql(&mut out, &self.name);
        out
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql())
    }
}

/// Reject names that cannot be expressed as CQL identifiers.
pub(crate) fn check(name: &str) -> SinkResult<()> {
    if name.is_empty() {
        return Err(SinkError::malformed("identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(SinkError::malformed(format!(
            "identifier {name:?} cannot contain NUL character"
        )));
    }
    Ok(())
}

fn is_bare(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_lowercase())
        && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
        && RESERVED.binary_search(&name).is_err()
}

/// Append `name` to `out`, quoting it when needed.
///
/// Callers validate with [`check`] before the statement is handed out.
pub(crate) fn write_cql(out: &mut String, name: &str) {
    if is_bare(name) {
        out.push_str(name);
        return;
    }
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cql(name: &str) -> String {
        Ident::new(name).unwrap().to_cql()
    }

    #[test]
    fn ident_simple() {
        assert_eq!(cql("users"), "users");
        assert_eq!(cql("_col_2"), "_col_2");
    }

    #[test]
    fn ident_mixed_case_is_quoted() {
        assert_eq!(cql("UserId"), r#""UserId""#);
        assert_eq!(cql("ID"), r#""ID""#);
        assert!(!Ident::new("UserId").unwrap().is_bare());
    }

    #[test]
    fn ident_reserved_word_is_quoted() {
        assert_eq!(cql("select"), r#""select""#);
        assert_eq!(cql("token"), r#""token""#);
    }

    #[test]
    fn ident_hostile_names_are_contained() {
        assert_eq!(cql("balance = 0, age"), r#""balance = 0, age""#);
        assert_eq!(cql("id?"), r#""id?""#);
        assert_eq!(cql(r#"x" = 1; DROP TABLE t; --"#), r#""x"" = 1; DROP TABLE t; --""#);
        assert_eq!(cql("1abc"), r#""1abc""#);
    }

    #[test]
    fn ident_rejects_empty_and_nul() {
        assert!(Ident::new("").unwrap_err().is_malformed_record());
        assert!(Ident::new("a\0b").unwrap_err().is_malformed_record());
    }

    #[test]
    fn reserved_list_is_sorted() {
        assert!(RESERVED.windows(2).all(|w| w[0] < w[1]));
    }
}
