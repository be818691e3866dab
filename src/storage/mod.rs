mod row;
mod table;

pub use row::{Row, RowId, RowIterator, Rows, INVALID_ROW_ID};
pub use table::Table;
