//! Shared clause rendering.

use crate::error::SinkResult;
use crate::ident;
use crate::value::Value;

pub(crate) const SET_SEPARATOR: &str = ", ";
pub(crate) const WHERE_SEPARATOR: &str = " AND ";

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// `a, "B", c` with names quoted where needed.
pub(crate) fn column_list<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, col) in columns.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        ident::write_cql(&mut out, col);
    }
    out
}

/// `a = ?<sep>b = ?`; empty input yields an empty clause.
pub(crate) fn pair_with_placeholders(fields: &[(String, Value)], separator: &str) -> String {
    let mut out = String::new();
    for (i, (col, _)) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        ident::write_cql(&mut out, col);
        out.push_str(" = ?");
    }
    out
}

/// Validate the table and every column name.
pub(crate) fn check_idents<'a>(
    table: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> SinkResult<()> {
    ident::check(table)?;
    columns.into_iter().try_for_each(ident::check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_pairs() {
        let fields = vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ];
        assert_eq!(pair_with_placeholders(&fields, WHERE_SEPARATOR), "a = ? AND b = ?");
        assert_eq!(pair_with_placeholders(&fields, SET_SEPARATOR), "a = ?, b = ?");
        assert_eq!(pair_with_placeholders(&[], WHERE_SEPARATOR), "");
    }

    #[test]
    fn test_names_are_quoted_in_clauses() {
        let fields = vec![("UserId".to_string(), Value::Int(1))];
        assert_eq!(pair_with_placeholders(&fields, WHERE_SEPARATOR), r#""UserId" = ?"#);
        assert_eq!(column_list(["age", "Name"]), r#"age, "Name""#);
    }

    #[test]
    fn test_check_idents() {
        assert!(check_idents("t", ["a", "b"]).is_ok());
        assert!(check_idents("", ["a"]).is_err());
        assert!(check_idents("t", ["a", ""]).is_err());
    }
}
