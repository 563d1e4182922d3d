//! API route handlers, grouped by resource.

pub mod health;
pub mod operators;
pub mod statistics;
