use crate::common::Result;
use crate::errtype;
use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A runtime value stored in a row or used in a predicate. A closed tagged
/// variant type, so validation and comparison stay exhaustive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Field {
    Null,
    Boolean(bool),
    Integer(i32),
    Float(f32),
    String(String),
}

impl PartialEq for Field {
    fn eq(&self, other: &Field) -> bool {
        match (self, other) {
            (Field::Null, Field::Null) => true,
            (Field::Boolean(b), Field::Boolean(b2)) => b == b2,
            (Field::Integer(i), Field::Integer(i2)) => i == i2,
            // match on NaN as well as equality
            (Field::Float(f), Field::Float(f2)) => (f == f2) || (f.is_nan() && f2.is_nan()),
            (Field::String(s), Field::String(s2)) => s == s2,
            _ => false,
        }
    }
}

impl Eq for Field {}

impl std::hash::Hash for Field {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Field::Null => 0.hash(state),
            Field::Boolean(b) => b.hash(state),
            Field::Integer(i) => i.hash(state),
            Field::Float(f) => {
                // Values that compare equal must hash alike: all NaNs share
                // one hash, and 0.0 and -0.0 (equal but distinct bit
                // patterns) share another.
                if f.is_nan() {
                    0.hash(state);
                } else if *f == 0.0 {
                    0.0_f32.to_bits().hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            Field::String(s) => s.hash(state),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Integer(integer) => integer.fmt(f),
            Self::Float(float) => write!(f, "{float:?}"),
            Self::String(string) => write!(f, "'{}'", string.escape_debug()),
        }
    }
}

impl From<f32> for Field {
    fn from(v: f32) -> Self {
        Field::Float(v)
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Integer(v)
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::String(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::String(v.to_owned())
    }
}

impl From<bool> for Field {
    fn from(v: bool) -> Self {
        Field::Boolean(v)
    }
}

impl Field {
    pub fn get_type(&self) -> Option<DataType> {
        match self {
            Field::Null => None,
            Field::Boolean(_) => Some(DataType::Bool),
            Field::Integer(_) => Some(DataType::Int),
            Field::Float(_) => Some(DataType::Float),
            Field::String(_) => Some(DataType::Text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns true if the value is undefined (NULL or NaN).
    pub fn is_undefined(&self) -> bool {
        *self == Self::Null || matches!(self, Self::Float(f) if f.is_nan())
    }

    /// Compares two values for predicate evaluation. Returns None if either
    /// operand is NULL (the caller collapses this to false), the ordering for
    /// compatible operands, and a type error otherwise. Integers widen to
    /// floats when compared against a float; there are no other implicit
    /// coercions.
    pub fn try_compare(&self, other: &Field) -> Result<Option<Ordering>> {
        use Field::*;
        Ok(match (self, other) {
            (Null, _) | (_, Null) => None,
            (Boolean(lhs), Boolean(rhs)) => Some(lhs.cmp(rhs)),
            (Integer(lhs), Integer(rhs)) => Some(lhs.cmp(rhs)),
            (Integer(lhs), Float(rhs)) => (*lhs as f32).partial_cmp(rhs),
            (Float(lhs), Integer(rhs)) => lhs.partial_cmp(&(*rhs as f32)),
            (Float(lhs), Float(rhs)) => lhs.partial_cmp(rhs),
            (String(lhs), String(rhs)) => Some(lhs.cmp(rhs)),
            (lhs, rhs) => return errtype!("cannot compare {lhs} and {rhs}"),
        })
    }

    pub fn to_string(&self) -> String {
        match self {
            Field::Null => "NULL".to_string(),
            Field::Boolean(b) => b.to_string(),
            Field::Integer(i) => i.to_string(),
            Field::Float(f) => f.to_string(),
            Field::String(s) => s.clone(),
        }
    }
}

/// A column label, used in query results and plans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Label {
    /// No label.
    None,
    /// An unqualified column name.
    Unqualified(String),
    /// A fully qualified table/column name.
    Qualified(String, String),
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, ""),
            Self::Unqualified(name) => write!(f, "{name}"),
            Self::Qualified(table, column) => write!(f, "{table}.{column}"),
        }
    }
}

impl Label {
    /// Formats the label as a short column header.
    pub fn as_header(&self) -> &str {
        match self {
            Self::Qualified(_, column) | Self::Unqualified(column) => column.as_str(),
            Self::None => "?",
        }
    }
}
