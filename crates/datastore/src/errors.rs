#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("No field named {field} has been declared")]
    UnknownField { field: String },

    #[error("{field}: value {value} does not satisfy rule {rule}")]
    RuleRejected {
        field: String,
        rule: String,
        value: serde_json::Value,
    },

    #[error("Either a field declaration or a value is missing: the store declares {expected} fields but the record has {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    #[error("Records must serialize to a map of field names to values")]
    NotAnObject,

    #[error("{table}: expected a value for each of {expected} columns but got {got}")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        got: usize,
    },

    #[error("{table}: no value for column {column}")]
    MissingColumn { table: String, column: String },

    #[error("{name:?} is not a valid field name")]
    InvalidName { name: String },

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    #[error("Sqlite error: {}", _0)]
    Persistence(#[from] rusqlite::Error),

    #[error("Could not render statement: {}", _0)]
    Template(#[from] tera::Error),

    #[error("Could not serialize record: {}", _0)]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Is this a failure of a record to match the declared fields?
    ///
    /// These are raised before anything reaches sqlite, so nothing was written.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            Error::UnknownField { .. }
                | Error::RuleRejected { .. }
                | Error::FieldCountMismatch { .. }
                | Error::NotAnObject
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
