use crate::common::Result;
use crate::errtype;
use crate::sql::planner::Expression;
use crate::storage::Rows;
use crate::types::field::Field;

/// Filters the input rows, keeping those for which the predicate evaluates to
/// true. A NULL predicate result drops the row, like false; any other
/// non-boolean result is a type error.
pub fn filter(source: Rows, predicate: Expression) -> Rows {
    Box::new(source.filter_map(move |result| {
        result
            .and_then(|(rid, row)| match predicate.evaluate(&row)? {
                Field::Boolean(true) => Ok(Some((rid, row))),
                Field::Boolean(false) | Field::Null => Ok(None),
                value => errtype!("filter returned {value}, expected boolean"),
            })
            .transpose()
    }))
}

/// Projects each input row through the given expressions, in order. The row
/// identity of the source row is preserved.
pub fn project(source: Rows, expressions: Vec<Expression>) -> Rows {
    Box::new(source.map(move |result| {
        let (rid, row) = result?;
        let values = expressions
            .iter()
            .map(|expr| expr.evaluate(&row))
            .collect::<Result<Vec<_>>>()?;
        Ok((rid, values.into()))
    }))
}
