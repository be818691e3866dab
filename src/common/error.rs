use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// A memdb error. All failures are deterministic given the same input, are
/// reported synchronously to the caller, and are never retried.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// An invalid table or column definition, e.g. a duplicate table name or
    /// an auto-increment column with an explicit default.
    Schema(String),
    /// A write rejected by a column constraint. The entire insert is rolled
    /// back; no partial row is ever stored.
    Constraint(ConstraintViolation),
    /// An unknown or ambiguous table or column reference.
    Resolution(String),
    /// Incompatible operand types in a predicate.
    Type(String),
}

/// The specific constraint rule an insert violated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstraintViolation {
    /// The value's type does not match the column's declared type.
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
    /// The value exceeds the column's declared size bound.
    SizeExceeded {
        column: String,
        max_size: u16,
        actual: u16,
    },
    /// A null value on a non-nullable column.
    NotNull { column: String },
    /// No value for a non-nullable column without a default.
    MissingValue { column: String },
    /// An explicit value for an auto-increment column, which is not
    /// externally assignable.
    AutoIncrementOverride { column: String },
    /// A positional insert with the wrong number of values.
    Arity { expected: usize, actual: usize },
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(msg) => write!(f, "schema error: {msg}"),
            Self::Constraint(violation) => write!(f, "constraint violation: {violation}"),
            Self::Resolution(msg) => write!(f, "resolution error: {msg}"),
            Self::Type(msg) => write!(f, "type error: {msg}"),
        }
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(f, "column {column} expects {expected}, got {actual}"),
            Self::SizeExceeded {
                column,
                max_size,
                actual,
            } => write!(f, "value of size {actual} exceeds size bound {max_size} of column {column}"),
            Self::NotNull { column } => write!(f, "NULL value on non-nullable column {column}"),
            Self::MissingValue { column } => write!(f, "missing required value for column {column}"),
            Self::AutoIncrementOverride { column } => {
                write!(f, "auto-increment column {column} cannot be assigned explicitly")
            }
            Self::Arity { expected, actual } => {
                write!(f, "row has {actual} values, table has {expected} columns")
            }
        }
    }
}

/// A memdb Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Allows using errschema!() and friends in both Error and Result contexts.
impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

impl From<ConstraintViolation> for Error {
    fn from(violation: ConstraintViolation) -> Self {
        Error::Constraint(violation)
    }
}

impl<T> From<ConstraintViolation> for Result<T> {
    fn from(violation: ConstraintViolation) -> Self {
        Err(Error::Constraint(violation))
    }
}

/// Constructs an Error::Schema via format!().
#[macro_export]
macro_rules! errschema {
    ($($args:tt)*) => {
        $crate::common::Error::Schema(format!($($args)*)).into()
    };
}

/// Constructs an Error::Resolution via format!().
#[macro_export]
macro_rules! errres {
    ($($args:tt)*) => {
        $crate::common::Error::Resolution(format!($($args)*)).into()
    };
}

/// Constructs an Error::Type via format!().
#[macro_export]
macro_rules! errtype {
    ($($args:tt)*) => {
        $crate::common::Error::Type(format!($($args)*)).into()
    };
}
