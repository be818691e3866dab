use crate::common::Result;
use crate::sql::engine::Catalog;
use crate::sql::execution::{join, source, transform};
use crate::sql::planner::{BoxedNode, Node};
use crate::storage::Rows;
use log::trace;

/// Recursively executes a query plan node, returning a row iterator.
///
/// Rows stream through the plan via iterators, with child nodes executed
/// eagerly (bottom-up) and pulled through lazily by the root consumer.
/// Errors are propagated as row items and short-circuit the consumer.
pub fn execute(node: BoxedNode, catalog: &impl Catalog) -> Result<Rows> {
    let node = node.into_inner();
    trace!("executing {node:?}");
    match node {
        Node::Scan { table, alias: _ } => source::scan(catalog, table.name()),

        Node::Filter { source, predicate } => {
            let source = execute(source, catalog)?;
            Ok(transform::filter(source, predicate))
        }

        Node::NestedLoopJoin {
            left,
            right,
            predicate,
        } => {
            let left = execute(left, catalog)?;
            let right = execute(right, catalog)?;
            join::nested_loop(left, right, predicate)
        }

        Node::HashJoin {
            left,
            left_column,
            right,
            right_column,
        } => {
            let left = execute(left, catalog)?;
            let right = execute(right, catalog)?;
            join::hash(left, left_column, right, right_column)
        }

        Node::Projection {
            source,
            expressions,
        } => {
            let source = execute(source, catalog)?;
            Ok(transform::project(source, expressions))
        }
    }
}
