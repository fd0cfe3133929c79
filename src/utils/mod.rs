//! General utilities and shared assertion macros

pub mod general;
pub mod macros;
