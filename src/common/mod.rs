pub mod constants;
mod error;
pub mod utility;

pub use error::{ConstraintViolation, Error, Result};
