use crate::sql::planner::Expression;
use crate::types::field::Label;
use crate::types::Schema;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A wrapper object holding a query plan node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxedNode {
    pub(crate) inner: Box<Node>,
}

impl From<Node> for BoxedNode {
    fn from(node: Node) -> Self {
        Self {
            inner: Box::new(node),
        }
    }
}

impl BoxedNode {
    /// Unwraps the node, consuming the wrapper.
    pub fn into_inner(self) -> Node {
        *self.inner
    }
}

impl Deref for BoxedNode {
    type Target = Node;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// An executable query plan node. Returns a row iterator, and can be nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A full table scan in insertion order. The schema was resolved from
    /// the catalog during planning; the alias only affects name resolution
    /// and plan formatting.
    Scan {
        table: Schema,
        alias: Option<String>,
    },
    /// Filters source rows, discarding rows for which the predicate does
    /// not evaluate to true.
    Filter {
        source: BoxedNode,
        predicate: Expression,
    },
    /// Inner-joins the left and right sources by iterating over the right
    /// source for every left row, keeping pairs for which the predicate
    /// holds. No predicate makes this a cross join.
    NestedLoopJoin {
        left: BoxedNode,
        right: BoxedNode,
        predicate: Option<Expression>,
    },
    /// Inner-joins the left and right sources on column equality by building
    /// an in-memory hash table of the right source and probing it for each
    /// left row. Chosen by the planner when the join condition is a single
    /// equality between same-typed columns; emits pairs in the same order a
    /// nested-loop join would.
    HashJoin {
        left: BoxedNode,
        left_column: usize,
        right: BoxedNode,
        right_column: usize,
    },
    /// Projects the source rows by evaluating the given expressions, in
    /// order.
    Projection {
        source: BoxedNode,
        expressions: Vec<Expression>,
    },
}

impl Node {
    /// Returns the number of columns emitted by the node.
    pub fn columns(&self) -> usize {
        match self {
            Self::Scan { table, .. } => table.col_count(),
            Self::Projection { expressions, .. } => expressions.len(),
            Self::NestedLoopJoin { left, right, .. } | Self::HashJoin { left, right, .. } => {
                left.columns() + right.columns()
            }
            Self::Filter { source, .. } => source.columns(),
        }
    }

    /// Returns a label for a column by tracing it through the plan tree.
    /// Used for query result headers.
    pub fn column_label(&self, index: usize) -> Label {
        match self {
            Self::Scan { table, alias } => Label::Qualified(
                alias.clone().unwrap_or_else(|| table.name().to_string()),
                table.get_column_name(index),
            ),
            Self::Projection {
                source,
                expressions,
            } => match expressions.get(index) {
                // Column references route to the source label.
                Some(Expression::Column(index)) => source.column_label(*index),
                Some(_) | None => Label::None,
            },
            Self::NestedLoopJoin { left, right, .. } | Self::HashJoin { left, right, .. } => {
                if index < left.columns() {
                    left.column_label(index)
                } else {
                    right.column_label(index - left.columns())
                }
            }
            Self::Filter { source, .. } => source.column_label(index),
        }
    }
}
