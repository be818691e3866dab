use crate::common::Result;
use crate::errres;
use crate::errtype;
use crate::sql::engine::Catalog;
use crate::sql::planner::plan::{ColumnRef, Expr, Projection, Query, TableRef};
use crate::sql::planner::{BoxedNode, Expression, Node};
use crate::types::{DataType, Schema};
use log::debug;

/// Builds an executable node tree from a query description, resolving table
/// and column names against the catalog.
pub struct Planner<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> Planner<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Builds the plan: Scan → joins → Filter → Projection. Any unknown or
    /// ambiguous name fails the whole query here, before execution starts.
    pub fn build(&self, query: Query) -> Result<BoxedNode> {
        let mut scope = Scope::new();
        let mut node = self.build_scan(&query.from, &mut scope)?;

        for join in query.joins {
            let left_width = scope.len();
            let right = self.build_scan(&join.table, &mut scope)?;
            node = self.build_join(node, right, join.on, &scope, left_width)?;
        }

        if let Some(filter) = query.filter {
            let predicate = self.bind_expression(filter, &scope)?;
            node = Node::Filter {
                source: node,
                predicate,
            }
            .into();
        }

        if let Projection::Columns(columns) = query.projection {
            let expressions = columns
                .into_iter()
                .map(|column| Ok(Expression::Column(scope.resolve(&column)?)))
                .collect::<Result<Vec<_>>>()?;
            node = Node::Projection {
                source: node,
                expressions,
            }
            .into();
        }

        debug!("built plan {node:?}");
        Ok(node)
    }

    /// Resolves a table reference into a Scan node and adds its columns to
    /// the scope under the table's qualifier.
    fn build_scan(&self, table_ref: &TableRef, scope: &mut Scope) -> Result<BoxedNode> {
        let table = self.catalog.must_get_table(&table_ref.table)?;
        let schema = table.schema().clone();
        scope.add_table(table_ref.qualifier(), &schema)?;
        Ok(Node::Scan {
            table: schema,
            alias: table_ref.alias.clone(),
        }
        .into())
    }

    /// Builds a join of the accumulated left node with a right scan. A
    /// single equality between same-typed columns on opposite sides becomes
    /// a hash join; everything else is a nested-loop join over the bound
    /// predicate. `left_width` is the combined width of the left side.
    fn build_join(
        &self,
        left: BoxedNode,
        right: BoxedNode,
        on: Option<Expr>,
        scope: &Scope,
        left_width: usize,
    ) -> Result<BoxedNode> {
        let Some(on) = on else {
            // No condition: cross join.
            return Ok(Node::NestedLoopJoin {
                left,
                right,
                predicate: None,
            }
            .into());
        };

        let predicate = self.bind_expression(on, scope)?;
        if let Expression::Equal(lhs, rhs) = &predicate {
            if let (Expression::Column(a), Expression::Column(b)) = (lhs.as_ref(), rhs.as_ref()) {
                // Normalize operand order to left column, right column.
                let (l, r) = match (*a < left_width, *b < left_width) {
                    (true, false) => (*a, *b),
                    (false, true) => (*b, *a),
                    // Both on one side; fall through to nested loop.
                    _ => {
                        return Ok(Node::NestedLoopJoin {
                            left,
                            right,
                            predicate: Some(predicate),
                        }
                        .into())
                    }
                };
                match (scope.column_type(l), scope.column_type(r)) {
                    // Identical types hash to identical keys, so the hash
                    // join is equivalent to the nested loop. Mixed numeric
                    // types need the widening comparison and stay on the
                    // nested loop below.
                    (lt, rt) if lt == rt => {
                        return Ok(Node::HashJoin {
                            left,
                            left_column: l,
                            right,
                            right_column: r - left_width,
                        }
                        .into())
                    }
                    (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => {}
                    (lt, rt) => {
                        return errtype!("can't join on columns of types {lt} and {rt}")
                    }
                }
            }
        }
        Ok(Node::NestedLoopJoin {
            left,
            right,
            predicate: Some(predicate),
        }
        .into())
    }

    /// Binds a named expression into an index-based one.
    fn bind_expression(&self, expr: Expr, scope: &Scope) -> Result<Expression> {
        use Expression::*;
        let bind = |expr: Box<Expr>| -> Result<Box<Expression>> {
            Ok(Box::new(self.bind_expression(*expr, scope)?))
        };
        Ok(match expr {
            Expr::Constant(field) => Constant(field),
            Expr::Column(column) => Column(scope.resolve(&column)?),
            Expr::And(lhs, rhs) => And(bind(lhs)?, bind(rhs)?),
            Expr::Or(lhs, rhs) => Or(bind(lhs)?, bind(rhs)?),
            Expr::Not(inner) => Not(bind(inner)?),
            Expr::Equal(lhs, rhs) => Equal(bind(lhs)?, bind(rhs)?),
            Expr::NotEqual(lhs, rhs) => NotEqual(bind(lhs)?, bind(rhs)?),
            Expr::LessThan(lhs, rhs) => LessThan(bind(lhs)?, bind(rhs)?),
            Expr::LessThanOrEqual(lhs, rhs) => LessThanOrEqual(bind(lhs)?, bind(rhs)?),
            Expr::GreaterThan(lhs, rhs) => GreaterThan(bind(lhs)?, bind(rhs)?),
            Expr::GreaterThanOrEqual(lhs, rhs) => GreaterThanOrEqual(bind(lhs)?, bind(rhs)?),
            Expr::IsNull(inner) => IsNull(bind(inner)?),
        })
    }
}

/// The planner's name-resolution scope: the columns visible to the query, in
/// combined-row order, each under its table qualifier (the table's alias
/// when one was given).
struct Scope {
    /// (qualifier, column name, column type) per combined-row index.
    columns: Vec<(String, String, DataType)>,
    /// The qualifiers in scope, to reject duplicates and unknown ones.
    qualifiers: Vec<String>,
}

impl Scope {
    fn new() -> Self {
        Self {
            columns: Vec::new(),
            qualifiers: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column_type(&self, index: usize) -> DataType {
        self.columns[index].2
    }

    /// Adds a table's columns to the scope under the given qualifier.
    fn add_table(&mut self, qualifier: &str, schema: &Schema) -> Result<()> {
        if self.qualifiers.iter().any(|q| q == qualifier) {
            return errres!("duplicate table name {qualifier}; use an alias");
        }
        self.qualifiers.push(qualifier.to_string());
        for column in schema.columns() {
            self.columns.push((
                qualifier.to_string(),
                column.get_name(),
                column.get_data_type(),
            ));
        }
        Ok(())
    }

    /// Resolves a column reference to its combined-row index. Unqualified
    /// names matching more than one table are an ambiguity error.
    fn resolve(&self, column: &ColumnRef) -> Result<usize> {
        match &column.table {
            Some(table) => {
                if !self.qualifiers.iter().any(|q| q == table) {
                    return errres!("unknown table {table}");
                }
                self.columns
                    .iter()
                    .position(|(qualifier, name, _)| qualifier == table && name == &column.column)
                    .ok_or_else(|| {
                        crate::common::Error::Resolution(format!("unknown column {column}"))
                    })
            }
            None => {
                let mut matches = self
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, name, _))| name == &column.column)
                    .map(|(index, _)| index);
                match (matches.next(), matches.next()) {
                    (Some(index), None) => Ok(index),
                    (Some(_), Some(_)) => {
                        errres!("ambiguous column {}; qualify it with a table", column.column)
                    }
                    (None, _) => errres!("unknown column {}", column.column),
                }
            }
        }
    }
}
