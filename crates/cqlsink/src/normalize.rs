//! Splits a record's key and after-image into disjoint column/value sequences.

use crate::record::StructuredData;
use crate::value::Value;

/// Key and value columns of one record, each index-aligned with its values.
///
/// `key_columns[i]` pairs with `key_values[i]`, and likewise for the value
/// side. No value column shares its exact name with a key column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    pub key_columns: Vec<String>,
    pub key_values: Vec<Value>,
    pub value_columns: Vec<String>,
    pub value_values: Vec<Value>,
}

impl ColumnSet {
    /// Partition `key` and `after` into key and value pairs.
    ///
    /// Every key entry becomes a key pair. Every after-image entry becomes a
    /// value pair unless a key entry has exactly the same column name; a key
    /// column `id` never suppresses `id2`. A missing after-image yields no
    /// value pairs.
    pub fn from_record(key: &StructuredData, after: Option<&StructuredData>) -> Self {
        let mut set = ColumnSet {
            key_columns: Vec::with_capacity(key.len()),
            key_values: Vec::with_capacity(key.len()),
            value_columns: Vec::with_capacity(after.map_or(0, StructuredData::len)),
            value_values: Vec::with_capacity(after.map_or(0, StructuredData::len)),
        };

        for (col, val) in key {
            set.key_columns.push(col.clone());
            set.key_values.push(val.clone());
        }

        for (col, val) in after.into_iter().flatten() {
            if key.contains_column(col) {
                continue;
            }
            set.value_columns.push(col.clone());
            set.value_values.push(val.clone());
        }

        set
    }

    pub fn has_keys(&self) -> bool {
        !self.key_columns.is_empty()
    }

    pub fn has_values(&self) -> bool {
        !self.value_columns.is_empty()
    }

    /// Iterate key (column, value) pairs.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.key_columns
            .iter()
            .map(String::as_str)
            .zip(self.key_values.iter())
    }

    /// Iterate value (column, value) pairs.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.value_columns
            .iter()
            .map(String::as_str)
            .zip(self.value_values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, Value)]) -> StructuredData {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn test_key_overlap_is_excluded_from_values() {
        let key = data(&[("id", "6".into())]);
        let after = data(&[("age", 33.into()), ("id", "6".into())]);
        let set = ColumnSet::from_record(&key, Some(&after));

        assert_eq!(set.key_columns, ["id"]);
        assert_eq!(set.key_values, [Value::from("6")]);
        assert_eq!(set.value_columns, ["age"]);
        assert_eq!(set.value_values, [Value::Int(33)]);
    }

    #[test]
    fn test_exclusion_is_exact_match_not_substring() {
        let key = data(&[("id", "6".into()), ("id2", "6".into())]);
        let after = data(&[
            ("id2value", 1.into()),
            ("i", 2.into()),
            ("id2", "6".into()),
        ]);
        let set = ColumnSet::from_record(&key, Some(&after));

        assert_eq!(set.key_columns, ["id", "id2"]);
        assert_eq!(set.value_columns, ["i", "id2value"]);
    }

    #[test]
    fn test_key_id_does_not_suppress_id2() {
        let key = data(&[("id", 1.into())]);
        let after = data(&[("id2", 2.into())]);
        let set = ColumnSet::from_record(&key, Some(&after));
        assert_eq!(set.value_columns, ["id2"]);

        let key = data(&[("id2", 2.into())]);
        let after = data(&[("id", 1.into())]);
        let set = ColumnSet::from_record(&key, Some(&after));
        assert_eq!(set.value_columns, ["id"]);
    }

    #[test]
    fn test_missing_after_yields_no_values() {
        let key = data(&[("id", 1.into())]);
        let set = ColumnSet::from_record(&key, None);
        assert!(set.has_keys());
        assert!(!set.has_values());
    }

    #[test]
    fn test_empty_key() {
        let after = data(&[("age", 22.into())]);
        let set = ColumnSet::from_record(&StructuredData::new(), Some(&after));
        assert!(!set.has_keys());
        assert_eq!(set.value_columns, ["age"]);
    }

    #[test]
    fn test_disjointness_holds_for_mixed_records() {
        let key = data(&[("a", 1.into()), ("c", 3.into())]);
        let after = data(&[("a", 1.into()), ("b", 2.into()), ("c", 3.into()), ("d", 4.into())]);
        let set = ColumnSet::from_record(&key, Some(&after));
        for col in &set.value_columns {
            assert!(!set.key_columns.contains(col), "{col} appears on both sides");
        }
        assert_eq!(set.value_columns.len(), set.value_values.len());
        assert_eq!(set.key_columns.len(), set.key_values.len());
    }
}
