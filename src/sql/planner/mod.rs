mod expression;
mod node;
mod plan;
mod planner;

pub use expression::Expression;
pub use node::{BoxedNode, Node};
pub use plan::{ColumnRef, Expr, Join, Projection, Query, TableRef};
pub use planner::Planner;
