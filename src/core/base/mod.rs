//! Module containing the shared numeric helpers: correlations, rank
//! transforms, means and distribution-based statistics

pub mod correlation;
pub mod stats;
pub mod utils;
