//! Executes query plans against the catalog, streaming rows through
//! iterator-based operators.

mod execute;
mod join;
mod source;
mod transform;

pub use execute::execute;
