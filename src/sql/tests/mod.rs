//! End-to-end query tests, driving `Database` through the plan types.

mod query_tests;
