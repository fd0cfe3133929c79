//! The analysis methods running over an active subset

pub mod aggregate;
pub mod hclust;
pub mod moran;
pub mod ranking;
pub mod scoring;
