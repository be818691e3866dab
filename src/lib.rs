#![crate_type = "lib"]
#![crate_name = "memdb"]

pub mod common;
pub mod sql;
pub mod storage;
pub mod types;
