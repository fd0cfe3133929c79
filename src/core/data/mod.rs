//! Module containing anything and everything related to data and data
//! structures

pub mod matrix_store;
pub mod selection;
pub mod subset_view;
pub mod synthetic;
