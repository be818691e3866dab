use crate::types::field::Field;
use serde::{Deserialize, Serialize};

/// A query description, the crate's external query-plan representation. An
/// embedding parser builds one of these and hands it to
/// `Database::execute`; the planner resolves the names it carries against
/// the catalog and compiles it into an executable node tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The leftmost table.
    pub from: TableRef,
    /// Tables joined onto the accumulated left side, in order.
    pub joins: Vec<Join>,
    /// The WHERE predicate, applied after all joins.
    pub filter: Option<Expr>,
    /// The output columns.
    pub projection: Projection,
}

impl Query {
    pub fn from(table: TableRef) -> Self {
        Self {
            from: table,
            joins: Vec::new(),
            filter: None,
            projection: Projection::All,
        }
    }

    pub fn join(mut self, table: TableRef, on: Option<Expr>) -> Self {
        self.joins.push(Join { table, on });
        self
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn project(mut self, columns: Vec<ColumnRef>) -> Self {
        self.projection = Projection::Columns(columns);
        self
    }
}

/// A referenced table, optionally under an alias. The alias, when given, is
/// the name by which column references qualify this table within the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            alias: None,
        }
    }

    pub fn aliased(table: &str, alias: &str) -> Self {
        Self {
            table: table.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    /// The name that qualifies this table's columns in the query's scope.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// An inner join onto the accumulated left side. Without a condition this is
/// a cross join: every left row pairs with every right row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub table: TableRef,
    pub on: Option<Expr>,
}

/// The projection list: all columns, or named columns in the requested
/// order. Duplicate column names across joined tables must be qualified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    All,
    Columns(Vec<ColumnRef>),
}

/// A column reference, optionally qualified by table name or alias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: &str) -> Self {
        Self {
            table: None,
            column: column.to_string(),
        }
    }

    pub fn qualified(table: &str, column: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: column.to_string(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// An unbound predicate expression tree, referencing columns by name. The
/// planner binds these into index-based `Expression`s against the query's
/// scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal value.
    Constant(Field),
    /// A named column reference.
    Column(ColumnRef),
    /// a AND b: both operands must be boolean.
    And(Box<Expr>, Box<Expr>),
    /// a OR b: both operands must be boolean.
    Or(Box<Expr>, Box<Expr>),
    /// NOT a: operand must be boolean.
    Not(Box<Expr>),
    /// a = b. Comparisons involving NULL evaluate to false.
    Equal(Box<Expr>, Box<Expr>),
    /// a != b.
    NotEqual(Box<Expr>, Box<Expr>),
    /// a < b.
    LessThan(Box<Expr>, Box<Expr>),
    /// a <= b.
    LessThanOrEqual(Box<Expr>, Box<Expr>),
    /// a > b.
    GreaterThan(Box<Expr>, Box<Expr>),
    /// a >= b.
    GreaterThanOrEqual(Box<Expr>, Box<Expr>),
    /// a IS NULL. The only operator that observes NULL directly.
    IsNull(Box<Expr>),
}

impl Expr {
    pub fn constant(value: impl Into<Field>) -> Self {
        Self::Constant(value.into())
    }

    pub fn column(name: &str) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    pub fn qualified(table: &str, name: &str) -> Self {
        Self::Column(ColumnRef::qualified(table, name))
    }

    pub fn and(self, rhs: Expr) -> Self {
        Self::And(self.into(), rhs.into())
    }

    pub fn or(self, rhs: Expr) -> Self {
        Self::Or(self.into(), rhs.into())
    }

    pub fn not(self) -> Self {
        Self::Not(self.into())
    }

    pub fn eq(self, rhs: Expr) -> Self {
        Self::Equal(self.into(), rhs.into())
    }

    pub fn ne(self, rhs: Expr) -> Self {
        Self::NotEqual(self.into(), rhs.into())
    }

    pub fn lt(self, rhs: Expr) -> Self {
        Self::LessThan(self.into(), rhs.into())
    }

    pub fn le(self, rhs: Expr) -> Self {
        Self::LessThanOrEqual(self.into(), rhs.into())
    }

    pub fn gt(self, rhs: Expr) -> Self {
        Self::GreaterThan(self.into(), rhs.into())
    }

    pub fn ge(self, rhs: Expr) -> Self {
        Self::GreaterThanOrEqual(self.into(), rhs.into())
    }

    pub fn is_null(self) -> Self {
        Self::IsNull(self.into())
    }
}
