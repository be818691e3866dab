use crate::common::Result;
use crate::errtype;
use crate::sql::planner::Expression;
use crate::storage::{Row, RowId, Rows, INVALID_ROW_ID};
use crate::types::field::Field;
use itertools::Itertools as _;
use std::collections::HashMap;
use std::iter::Peekable;

/// A nested loop inner join. Iterates over the right source for every row in
/// the left source, keeping joined rows for which the predicate holds. With
/// no predicate every pair is kept (a cross join). Pairs are emitted in
/// enumeration order: all right rows for the first left row, then all right
/// rows for the second left row, and so on.
pub fn nested_loop(left: Rows, right: Rows, predicate: Option<Expression>) -> Result<Rows> {
    Ok(Box::new(NestedLoopIterator::new(left, right, predicate)))
}

/// NestedLoopIterator implements nested loop inner joins.
#[derive(Clone)]
struct NestedLoopIterator {
    /// The left source.
    left: Peekable<Rows>,
    /// The right source.
    right: Rows,
    /// The initial right iterator state. Cloned to reset right.
    right_init: Rows,
    /// The join predicate.
    predicate: Option<Expression>,
}

impl NestedLoopIterator {
    fn new(left: Rows, right: Rows, predicate: Option<Expression>) -> Self {
        let left = left.peekable();
        let right_init = right.clone();
        Self {
            left,
            right,
            right_init,
            predicate,
        }
    }

    /// Returns the next joined row, if any. While there is a valid left row,
    /// looks for a right-hand match to return; once the right side is
    /// exhausted, advances the left row and resets the right side.
    fn try_next(&mut self) -> Result<Option<(RowId, Row)>> {
        while let Some(left_result) = self.left.peek() {
            let (_, left_row) = match left_result {
                Ok(pair) => pair.clone(),
                // Consume the element so the error is yielded once instead
                // of on every subsequent call.
                Err(_) => match self.left.next() {
                    Some(Err(error)) => return Err(error),
                    _ => continue,
                },
            };

            for right_result in self.right.by_ref() {
                let (_, right_row) = right_result?;
                let joined_row = left_row.join(&right_row);

                match &self.predicate {
                    Some(predicate) => {
                        if let Field::Boolean(true) = predicate.evaluate(&joined_row)? {
                            return Ok(Some((INVALID_ROW_ID, joined_row)));
                        }
                    }
                    // No predicate; every pair matches.
                    None => return Ok(Some((INVALID_ROW_ID, joined_row))),
                }
            }

            // Move to the next left row and reset the right iterator.
            self.left.next();
            self.right = self.right_init.clone();
        }
        Ok(None)
    }
}

impl Iterator for NestedLoopIterator {
    type Item = Result<(RowId, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

/// Executes a hash inner join. Builds a hash table of rows from the right
/// source keyed on the join column, then iterates over the left source and
/// looks up matching rows. Only planned for equality between same-typed
/// columns, where it emits exactly the nested-loop enumeration order.
pub fn hash(left: Rows, left_column: usize, right: Rows, right_column: usize) -> Result<Rows> {
    // Build the hash table from the right source.
    let mut rows = right;
    let mut table: HashMap<Field, Vec<Row>> = HashMap::new();
    while let Some((_, row)) = rows.next().transpose()? {
        let value = match row.get_field(right_column) {
            Some(field) => field.clone(),
            None => return errtype!("join column {right_column} out of row bounds"),
        };
        if value.is_undefined() {
            continue; // NULL and NaN equality is always false
        }
        table.entry(value).or_default().push(row);
    }

    // Probe the table for each left row, emitting matches in build order.
    let join = left.flat_map(move |result| -> Rows {
        // Pass through errors.
        let Ok((_, row)) = result else {
            return Box::new(std::iter::once(result));
        };
        let key = match row.get_field(left_column) {
            Some(field) => field.clone(),
            None => {
                let error = crate::common::Error::Type(format!(
                    "join column {left_column} out of row bounds"
                ));
                return Box::new(std::iter::once(Err(error)));
            }
        };
        if key.is_undefined() {
            return Box::new(std::iter::empty());
        }
        match table.get(&key) {
            Some(matches) => Box::new(
                std::iter::once(row)
                    .cartesian_product(matches.clone())
                    .map(|(l, r)| (INVALID_ROW_ID, l.join(&r)))
                    .map(Ok),
            ),
            None => Box::new(std::iter::empty()),
        }
    });
    Ok(Box::new(join))
}
