use crate::common::Result;
use crate::errschema;
use crate::sql::engine::Catalog;
use crate::sql::execution::execute;
use crate::sql::planner::{Planner, Query};
use crate::storage::{Row, RowId, Table};
use crate::types::field::{Field, Label};
use crate::types::Schema;
use itertools::Itertools as _;
use log::debug;
use std::collections::HashMap;

/// An in-memory database: a named collection of tables and the entry point
/// for query execution. Owns all table data; created empty and passed
/// explicitly by the embedding application.
///
/// All operations are synchronous and single-threaded. Queries run to
/// completion against the state at call time; callers embedding the database
/// across threads synchronize externally.
#[derive(Default)]
pub struct Database {
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table from a schema. The schema definition is validated
    /// here; a duplicate table name is a schema error.
    pub fn create_table(&mut self, schema: Schema) -> Result<()> {
        schema.validate_definition()?;
        if self.tables.contains_key(schema.name()) {
            return errschema!("table {} already exists", schema.name());
        }
        debug!("creating table {}", schema.name());
        self.tables
            .insert(schema.name().to_string(), Table::new(schema));
        Ok(())
    }

    /// Inserts a row into a table by column position. `None` entries fall
    /// back to the column's auto-increment counter or default value.
    pub fn insert(&mut self, table: &str, values: Vec<Option<Field>>) -> Result<RowId> {
        self.must_get_table_mut(table)?.insert(values)
    }

    /// Inserts a row into a table by column name. Omitted columns fall back
    /// as in [`Database::insert`]; unknown names are a resolution error.
    pub fn insert_named(&mut self, table: &str, values: HashMap<String, Field>) -> Result<RowId> {
        self.must_get_table_mut(table)?.insert_named(values)
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Plans and executes a query, materializing the result.
    pub fn execute(&self, query: Query) -> Result<QueryResult> {
        let plan = Planner::new(self).build(query)?;
        let columns = (0..plan.columns()).map(|i| plan.column_label(i)).collect();
        let rows = execute(plan, self)?
            .map_ok(|(_, row)| row)
            .collect::<Result<Vec<_>>>()?;
        Ok(QueryResult { columns, rows })
    }

    fn must_get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        // Mirrors Catalog::must_get_table for the mutable write path.
        match self.tables.get_mut(name) {
            Some(table) => Ok(table),
            None => crate::errres!("table {name} does not exist"),
        }
    }
}

impl Catalog for Database {
    fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

/// A materialized query result: column headers and the result rows, in
/// execution order.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<Label>,
    pub rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::types::{Column, DataType, Schema};

    fn movies_schema() -> Schema {
        Schema::builder()
            .name("movies")
            .column_from_definition(
                Column::builder()
                    .name("id")
                    .data_type(DataType::Int)
                    .auto_increment()
                    .build(),
            )
            .column("title", DataType::Text, false, None, Some(100))
            .build()
    }

    #[test]
    fn test_create_and_lookup() {
        let mut db = Database::new();
        db.create_table(movies_schema()).unwrap();
        assert!(db.table("movies").is_some());
        assert!(db.table("books").is_none());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut db = Database::new();
        db.create_table(movies_schema()).unwrap();
        let err = db.create_table(movies_schema()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_insert_into_unknown_table() {
        let mut db = Database::new();
        let err = db.insert("movies", vec![]).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut db = Database::new();
        let schema = Schema::builder()
            .name("bad")
            .column("x", DataType::Bool, false, None, None)
            .column("x", DataType::Int, false, None, None)
            .build();
        let err = db.create_table(schema).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
