use crate::common::Result;
use crate::types::field::Field;
use crate::types::DataType;
use dyn_clone::DynClone;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::slice::Iter;

/// A row identity: the row's insertion-order position within its table.
/// Stable for the table's lifetime, never reused, and used only for
/// iteration bookkeeping; it is not a queryable column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identity carried by derived rows (join output), which no longer
/// correspond to a single stored row.
pub const INVALID_ROW_ID: RowId = RowId(u64::MAX);

/// A row iterator.
pub type Rows = Box<dyn RowIterator>;

/// A Row iterator trait, which requires the iterator to be both clonable and
/// object-safe. Cloning is needed to be able to reset an iterator back to an
/// initial state, e.g. during nested loop joins. It has a blanket
/// implementation for all matching iterators.
pub trait RowIterator: Iterator<Item = Result<(RowId, Row)>> + DynClone {}
impl<I: Iterator<Item = Result<(RowId, Row)>> + DynClone> RowIterator for I {}
dyn_clone::clone_trait_object!(RowIterator);

/// A fixed-arity sequence of field values, positionally aligned with the
/// owning table's column order. Immutable once stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Field>,
}

impl From<Vec<Field>> for Row {
    fn from(v: Vec<Field>) -> Self {
        Row { values: v }
    }
}

impl From<Vec<&Field>> for Row {
    fn from(v: Vec<&Field>) -> Self {
        Row {
            values: v.into_iter().cloned().collect(),
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values.eq(&other.values)
    }
}

impl IntoIterator for Row {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Row {
    pub fn iter(&self) -> Iter<Field> {
        self.values.iter()
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn get_field(&self, index: usize) -> Option<&Field> {
        self.values.get(index)
    }

    /// Joins this row with another, producing the concatenated left++right
    /// row used by join predicates and projections.
    pub fn join(&self, right: &Row) -> Row {
        Row::from(self.iter().chain(right.iter()).cloned().collect::<Vec<_>>())
    }

    pub fn to_string(&self, str_len: Option<usize>) -> String {
        self.values
            .iter()
            .map(|field| match field.get_type() {
                Some(DataType::Text) => {
                    let mut text = field.to_string();
                    if let Some(len) = str_len {
                        text.truncate(len);
                    }
                    text
                }
                _ => field.to_string(),
            })
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_concatenates() {
        let left = Row::from(vec![Field::Integer(1), Field::from("x")]);
        let right = Row::from(vec![Field::Boolean(true)]);
        let joined = left.join(&right);
        assert_eq!(joined.size(), 3);
        assert_eq!(joined.get_field(0), Some(&Field::Integer(1)));
        assert_eq!(joined.get_field(2), Some(&Field::Boolean(true)));
    }

    #[test]
    fn test_to_string() {
        let row = Row::from(vec![Field::Integer(1), Field::from("abc"), Field::Null]);
        assert_eq!(row.to_string(None), "1, abc, NULL");
    }
}
