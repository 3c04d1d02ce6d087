//! Error types for cqlsink

use thiserror::Error;

/// Result type alias for cqlsink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Error types for record translation and execution
#[derive(Debug, Error)]
pub enum SinkError {
    /// Record key or after-image is not structured where it must be
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// UPDATE/DELETE requested without any key column
    #[error("Empty predicate: {0}")]
    EmptyPredicate(String),

    /// UPDATE/INSERT requested without any value column
    #[error("Empty assignment: {0}")]
    EmptyAssignment(String),

    /// Invalid destination configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Cluster connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Statement timeout error
    #[error("Statement timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Destination used before it was opened (or after teardown)
    #[error("Destination is not open")]
    NotOpen,

    /// A record in a write batch failed
    #[error("Record {index} (position {position:?}): {source}")]
    Record {
        /// Zero-based index of the failing record; equals the number of records written before it.
        index: usize,
        position: String,
        #[source]
        source: Box<SinkError>,
    },
}

impl SinkError {
    /// Create a malformed record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Wrap an error with the failing record's batch index and position.
    pub fn at_record(self, index: usize, position: impl Into<String>) -> Self {
        Self::Record {
            index,
            position: position.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error, looking through `Record` wrappers.
    pub fn root(&self) -> &SinkError {
        match self {
            Self::Record { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a data-shape problem
    pub fn is_malformed_record(&self) -> bool {
        matches!(self.root(), Self::MalformedRecord(_))
    }

    /// Check if this is an empty predicate error
    pub fn is_empty_predicate(&self) -> bool {
        matches!(self.root(), Self::EmptyPredicate(_))
    }

    /// Check if this is an empty assignment error
    pub fn is_empty_assignment(&self) -> bool {
        matches!(self.root(), Self::EmptyAssignment(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout(_))
    }

    /// Number of records written before this error, if it came from a batch write.
    pub fn written(&self) -> Option<usize> {
        match self {
            Self::Record { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wrapper_reports_root() {
        let err = SinkError::EmptyPredicate("DELETE requires a key".into()).at_record(3, "pos-3");
        assert!(err.is_empty_predicate());
        assert!(!err.is_malformed_record());
        assert_eq!(err.written(), Some(3));
        assert_eq!(
            err.to_string(),
            "Record 3 (position \"pos-3\"): Empty predicate: DELETE requires a key"
        );
    }

    #[test]
    fn test_plain_error_has_no_written_count() {
        let err = SinkError::malformed("key should be structured data");
        assert!(err.is_malformed_record());
        assert_eq!(err.written(), None);
    }
}
