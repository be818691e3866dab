use crate::common::Result;
use crate::sql::engine::Catalog;
use crate::storage::Rows;

/// A full table scan, emitting rows in insertion order.
pub fn scan(catalog: &impl Catalog, table: &str) -> Result<Rows> {
    Ok(catalog.must_get_table(table)?.scan())
}
