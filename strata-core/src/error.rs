use thiserror::Error;

/// Error kinds raised by the mapper, the grammar and the session.
///
/// They travel inside [`crate::Error`] (an `anyhow::Error`), callers can recover
/// the kind with `error.downcast_ref::<StrataError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrataError {
    #[error("Missing table name")]
    TableMissing,
    #[error("Nothing to write, the {0} has no column")]
    ColumnSetEmpty(&'static str),
    #[error("Field `{field}` has an unsupported type ({kind})")]
    UnsupportedFieldType { field: String, kind: &'static str },
    #[error("Field `{field}` is a slice, only byte slices can be mapped")]
    FieldSliceType { field: String },
    #[error("Unsupported value shape: {0}")]
    UnsupportedValueShape(&'static str),
    #[error("Invalid where operator `{0}`")]
    InvalidOperator(String),
    #[error("Field `{field}` is null and cannot be assigned")]
    NullFieldUnassignable { field: String },
    #[error("The session already has an active transaction")]
    TransactionConflict,
    #[error("The session has no active transaction")]
    NoTransaction,
    #[error("No object to map")]
    ObjectNil,
    #[error("The object has no mappable field")]
    ObjectNoFields,
    #[error("Invalid tag `{tag}`: {reason}")]
    InvalidTag { tag: String, reason: String },
    #[error("The bounds of a between predicate must be scalar values")]
    InvalidBetweenValue,
    #[error("The transaction deadline has been exceeded")]
    DeadlineExceeded,
    #[error("No connection named `{0}` was found")]
    ConnectionNotFound(String),
    #[error("The connection is missing parameter: {0}")]
    MissingConnectionParameter(&'static str),
    #[error("Invalid connection url: {0}")]
    InvalidConnectionUrl(String),
    #[error("Cannot convert {from} to {to}")]
    ValueConversion { from: String, to: &'static str },
}

impl StrataError {
    pub fn conversion(from: &crate::Value, to: &'static str) -> Self {
        Self::ValueConversion {
            from: format!("{from:?}"),
            to,
        }
    }

    /// Returns the kind carried by `error`, if any.
    pub fn of(error: &crate::Error) -> Option<&StrataError> {
        error.downcast_ref::<StrataError>()
    }
}
