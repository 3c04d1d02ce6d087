//! Change records consumed by the sink.
//!
//! Records follow the OpenCDC JSON shape:
//!
//! ```json
//! {
//!   "position": "b2Zmc2V0OjQy",
//!   "operation": "update",
//!   "metadata": {"opencdc.collection": "users"},
//!   "key": {"id": "6"},
//!   "payload": {"before": null, "after": {"id": "6", "age": 33}}
//! }
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata key naming the collection (table) a record belongs to.
pub const METADATA_COLLECTION: &str = "opencdc.collection";

/// The kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Snapshot,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Snapshot => "snapshot",
        })
    }
}

/// Column name to value mapping.
///
/// Backed by a `BTreeMap`, so columns always enumerate in lexicographic
/// order and statements built from the same record are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredData(BTreeMap<String, Value>);

impl StructuredData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Exact column-name membership.
    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StructuredData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a StructuredData {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Record key or payload image: a column map, opaque bytes, or any other
/// JSON the source emitted.
///
/// `Other` keeps a bad shape loadable so only the record carrying it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    Structured(StructuredData),
    Raw(String),
    Other(serde_json::Value),
}

impl Data {
    pub fn as_structured(&self) -> Option<&StructuredData> {
        match self {
            Data::Structured(data) => Some(data),
            Data::Raw(_) | Data::Other(_) => None,
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Data::Structured(StructuredData::default())
    }
}

impl From<StructuredData> for Data {
    fn from(data: StructuredData) -> Self {
        Data::Structured(data)
    }
}

/// Before/after images of a changed row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub before: Option<Data>,
    #[serde(default)]
    pub after: Option<Data>,
}

/// One change-data-capture record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Opaque upstream position, used to identify the record in errors.
    #[serde(default)]
    pub position: String,
    pub operation: Operation,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub key: Data,
    #[serde(default)]
    pub payload: Change,
}

impl ChangeRecord {
    /// Create a record with the given operation, key and after-image.
    pub fn new(operation: Operation, key: impl Into<Data>, after: Option<Data>) -> Self {
        Self {
            position: String::new(),
            operation,
            metadata: BTreeMap::new(),
            key: key.into(),
            payload: Change {
                before: None,
                after,
            },
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The collection named in the record metadata, if any.
    pub fn collection(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_COLLECTION)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}
