use crate::common::constants::AUTO_INCREMENT_START;
use crate::common::{ConstraintViolation, Result};
use crate::errres;
use crate::storage::row::{Row, RowId, Rows};
use crate::types::field::Field;
use crate::types::Schema;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An in-memory table: a schema plus its row store. Owns its rows
/// exclusively; rows live exactly as long as the table. The auto-increment
/// counter is per table, starts at 1, and is strictly increasing; a value is
/// consumed only by a successful insert, never by a rejected one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
    next_auto_increment: i32,
}

impl Table {
    /// Creates an empty table for the given schema. The schema definition is
    /// validated by the database registry before it gets here.
    pub fn new(schema: Schema) -> Table {
        Table {
            schema,
            rows: Vec::new(),
            next_auto_increment: AUTO_INCREMENT_START,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Inserts a positional row. `None` marks a column with no provided
    /// value, to be resolved from the auto-increment counter, the column
    /// default, or Null for nullable columns, in that order. The insert is
    /// atomic: every effective value is resolved and validated before
    /// anything is stored, and a rejected insert leaves the table (and the
    /// auto-increment counter) untouched.
    pub fn insert(&mut self, values: Vec<Option<Field>>) -> Result<RowId> {
        if values.len() != self.schema.col_count() {
            return ConstraintViolation::Arity {
                expected: self.schema.col_count(),
                actual: values.len(),
            }
            .into();
        }

        let mut fields = Vec::with_capacity(values.len());
        let mut consumed_counter = false;
        for (column, value) in self.schema.columns().iter().zip(values) {
            let field = match value {
                // Auto-increment columns are not externally assignable.
                Some(_) if column.is_auto_increment() => {
                    return ConstraintViolation::AutoIncrementOverride {
                        column: column.get_name(),
                    }
                    .into()
                }
                Some(field) => field,
                None if column.is_auto_increment() => {
                    consumed_counter = true;
                    Field::Integer(self.next_auto_increment)
                }
                // Nullable columns carry an implicit Null default, so this
                // also resolves omitted nullable columns.
                None => match column.default() {
                    Some(default) => default.clone(),
                    None => {
                        return ConstraintViolation::MissingValue {
                            column: column.get_name(),
                        }
                        .into()
                    }
                },
            };
            column.validate(&field)?;
            fields.push(field);
        }

        let id = RowId(self.rows.len() as u64);
        self.rows.push(Row::from(fields));
        if consumed_counter {
            self.next_auto_increment += 1;
        }
        trace!("inserted row {} into table {}", id, self.name());
        Ok(id)
    }

    /// Inserts a row given as a column name → value mapping. Columns absent
    /// from the mapping count as not provided.
    pub fn insert_named(&mut self, values: HashMap<String, Field>) -> Result<RowId> {
        let mut positional: Vec<Option<Field>> = vec![None; self.schema.col_count()];
        for (name, field) in values {
            let Some(position) = self.schema.column_position(&name) else {
                return errres!("unknown column {name} in table {}", self.name());
            };
            positional[position] = Some(field);
        }
        self.insert(positional)
    }

    /// Returns a lazy iterator over the table's rows in insertion order.
    /// Each call snapshots the current rows, so the traversal is finite and
    /// restartable; a clone taken of a fresh scan replays it from the front.
    pub fn scan(&self) -> Rows {
        let rows: Vec<(RowId, Row)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (RowId(i as u64), row.clone()))
            .collect();
        Box::new(rows.into_iter().map(Ok))
    }

    pub fn get_row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id.0 as usize)
    }
}
