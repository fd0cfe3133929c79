//! Core functionality: numeric base helpers, the data model and the
//! analysis methods, tied together by the selection pipeline

pub mod base;
pub mod data;
pub mod methods;
pub mod pipeline;
