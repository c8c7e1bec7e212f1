use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::types::ValueType;

/// Convenience result type for marshalling operations.
pub type MarshalResult<T> = Result<T, MarshalError>;

/// Error type returned by every export/import operation.
///
/// All failures (unknown attribute, bad cell text, missing columns, duplicate rows, empty input,
/// codec errors) are reported through this one type. Its message names the offending field,
/// column, or condition; the wrapped library error (I/O, CSV, workbook) is available through
/// [`std::error::Error::source`].
pub struct MarshalError {
    context: Vec<String>,
    cause: ErrorCause,
}

impl MarshalError {
    pub(crate) fn new(cause: ErrorCause) -> Self {
        Self {
            context: Vec::new(),
            cause,
        }
    }

    /// Prefix the message with an outer context (`"import failed"`, `"row 3"`, ...).
    pub(crate) fn context(mut self, ctx: impl Into<String>) -> Self {
        self.context.insert(0, ctx.into());
        self
    }

    pub(crate) fn cause(&self) -> &ErrorCause {
        &self.cause
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{ctx}: ")?;
        }
        write!(f, "{}", self.cause)
    }
}

impl fmt::Debug for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalError")
            .field("context", &self.context)
            .field("cause", &self.cause)
            .finish()
    }
}

impl StdError for MarshalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.source()
    }
}

impl From<std::io::Error> for MarshalError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCause::Io(e))
    }
}

impl From<csv::Error> for MarshalError {
    fn from(e: csv::Error) -> Self {
        Self::new(ErrorCause::Csv(e))
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for MarshalError {
    fn from(e: calamine::Error) -> Self {
        Self::new(ErrorCause::Excel(e))
    }
}

#[cfg(feature = "excel")]
impl From<rust_xlsxwriter::XlsxError> for MarshalError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::new(ErrorCause::XlsxWriter(e))
    }
}

/// Underlying reason for a [`MarshalError`]. Kept crate-private: callers only see the message.
#[derive(Debug, Error)]
pub(crate) enum ErrorCause {
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[source] csv::Error),

    #[cfg(feature = "excel")]
    #[error("workbook error: {0}")]
    Excel(#[source] calamine::Error),

    #[cfg(feature = "excel")]
    #[error("workbook writer error: {0}")]
    XlsxWriter(#[source] rust_xlsxwriter::XlsxError),

    #[error("type {type_name} has no attribute '{attribute}'")]
    AttributeNotFound {
        type_name: &'static str,
        attribute: String,
    },

    #[error("attribute '{attribute}' of type {type_name} is a value, it has no attribute '{rest}'")]
    NotNested {
        type_name: &'static str,
        attribute: String,
        rest: String,
    },

    #[error("attribute '{attribute}' of type {type_name} is a nested record; map one of its attributes instead")]
    NotScalar {
        type_name: &'static str,
        attribute: String,
    },

    #[error("cannot assign '{path}': nested attribute '{attribute}' of type {type_name} is empty")]
    UnsupportedPath {
        path: String,
        type_name: &'static str,
        attribute: String,
    },

    #[error("value '{raw}' rejected by attribute of type {type_name}: {reason}")]
    Rejected {
        type_name: &'static str,
        raw: String,
        reason: String,
    },

    #[error("invalid numeric value '{raw}' for {expected}: {reason}")]
    InvalidNumericFormat {
        raw: String,
        expected: ValueType,
        reason: String,
    },

    #[error("invalid date '{raw}' (expected MM/dd/yyyy HH:mm): {reason}")]
    InvalidDateFormat { raw: String, reason: String },

    #[error("field map is empty")]
    EmptyFieldMap,

    #[error("field map maps attribute path '{0}' more than once")]
    DuplicateFieldPath(String),

    #[error("required columns missing: {}. headers={headers:?}", quote_all(.missing))]
    MissingRequiredColumns {
        missing: Vec<String>,
        headers: Vec<String>,
    },

    #[error("duplicate row detected: row {row} repeats key ({}) of row {duplicate_of}", .columns.join(", "))]
    DuplicateRow {
        row: usize,
        duplicate_of: usize,
        columns: Vec<String>,
    },

    #[error("no data in source ({0})")]
    EmptyDataSource(&'static str),

    #[error("type {type_name} cannot be instantiated (no default constructor registered)")]
    Instantiation { type_name: &'static str },

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),
}

fn quote_all(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
