//! The database engine: the table catalog and the query entry point.

mod database;

pub use database::{Database, QueryResult};

use crate::common::{Error, Result};
use crate::storage::Table;

/// The catalog of tables that plans are resolved and executed against.
pub trait Catalog {
    /// Looks up a table by name.
    fn get_table(&self, name: &str) -> Option<&Table>;

    /// Looks up a table by name, erroring if it does not exist.
    fn must_get_table(&self, name: &str) -> Result<&Table> {
        self.get_table(name)
            .ok_or_else(|| Error::Resolution(format!("table {name} does not exist")))
    }
}
