use crate::common::Result;
use crate::errtype;
use crate::storage::Row;
use crate::types::field::Field;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A bound predicate expression tree. Column references have been resolved
/// by the planner to positions in the row it is evaluated against (for
/// joins, the concatenated left++right row).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Constant(Field),
    Column(usize),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    LessThanOrEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    IsNull(Box<Expression>),
}

impl Expression {
    /// Evaluates the expression against a row, returning a field value.
    ///
    /// Comparison semantics: incompatible operand types are a type error
    /// (integers widen to floats, nothing else coerces), and any comparison
    /// with a NULL operand evaluates to false. Full SQL three-valued NULL
    /// logic is deliberately out of scope.
    pub fn evaluate(&self, row: &Row) -> Result<Field> {
        use Expression::*;
        Ok(match self {
            Constant(field) => field.clone(),
            Column(index) => match row.get_field(*index) {
                Some(field) => field.clone(),
                None => return errtype!("column index {index} out of row bounds"),
            },

            And(lhs, rhs) => match (lhs.evaluate(row)?, rhs.evaluate(row)?) {
                (Field::Boolean(lhs), Field::Boolean(rhs)) => Field::Boolean(lhs && rhs),
                (lhs, rhs) => return errtype!("can't and {lhs} and {rhs}"),
            },
            Or(lhs, rhs) => match (lhs.evaluate(row)?, rhs.evaluate(row)?) {
                (Field::Boolean(lhs), Field::Boolean(rhs)) => Field::Boolean(lhs || rhs),
                (lhs, rhs) => return errtype!("can't or {lhs} and {rhs}"),
            },
            Not(expr) => match expr.evaluate(row)? {
                Field::Boolean(b) => Field::Boolean(!b),
                field => return errtype!("can't negate {field}"),
            },

            Equal(lhs, rhs) => compare(lhs, rhs, row, |ord| ord == Ordering::Equal)?,
            NotEqual(lhs, rhs) => compare(lhs, rhs, row, |ord| ord != Ordering::Equal)?,
            LessThan(lhs, rhs) => compare(lhs, rhs, row, |ord| ord == Ordering::Less)?,
            LessThanOrEqual(lhs, rhs) => compare(lhs, rhs, row, |ord| ord != Ordering::Greater)?,
            GreaterThan(lhs, rhs) => compare(lhs, rhs, row, |ord| ord == Ordering::Greater)?,
            GreaterThanOrEqual(lhs, rhs) => compare(lhs, rhs, row, |ord| ord != Ordering::Less)?,

            IsNull(expr) => Field::Boolean(expr.evaluate(row)?.is_null()),
        })
    }
}

/// Evaluates both operands, compares them, and maps the ordering through the
/// given check. A comparison involving NULL collapses to false.
fn compare(
    lhs: &Expression,
    rhs: &Expression,
    row: &Row,
    check: impl Fn(Ordering) -> bool,
) -> Result<Field> {
    let lhs = lhs.evaluate(row)?;
    let rhs = rhs.evaluate(row)?;
    Ok(match lhs.try_compare(&rhs)? {
        Some(ordering) => Field::Boolean(check(ordering)),
        None => Field::Boolean(false),
    })
}
