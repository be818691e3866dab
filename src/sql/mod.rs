//! The SQL layer: plan representation, planning, execution, and the engine.

pub mod engine;
pub mod execution;
pub mod planner;

#[cfg(test)]
mod tests;
