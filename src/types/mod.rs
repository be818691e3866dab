pub mod field;
mod schema;

pub use field::{Field, Label};
pub use schema::{Column, ColumnBuilder, DataType, Schema, SchemaBuilder};
