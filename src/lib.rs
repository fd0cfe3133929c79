//! Interactive exploratory analytics for spatial gene-expression data.
//!
//! Given a points-by-genes expression matrix and a user-selected spatial
//! region (a flood-fill or an explicit point selection), the crate scores
//! every gene for relevance to that region with one of four interchangeable
//! strategies, keeps the top scorers, groups them into clusters by expression
//! similarity through average-linkage clustering, and back-projects
//! per-cluster mean intensities onto the full point domain for visualisation.
//! Both point-level and cell-type pseudo-bulk matrices run through the same
//! pipeline.

pub mod core;
pub mod utils;

mod error;

pub use crate::core::base::correlation::{column_cor, cor_to_condensed_distance};
pub use crate::core::base::stats::{
    get_test_alternative, z_scores_to_pval, z_to_pval, TestAlternative,
};
pub use crate::core::data::matrix_store::{MatrixStore, RowUnit};
pub use crate::core::data::selection::{ActiveSubset, SliceRestriction};
pub use crate::core::data::subset_view::SubsetView;
pub use crate::core::data::synthetic::{generate_spatial_expression, SyntheticSpatialData};
pub use crate::core::methods::aggregate::cluster_color_scalars;
pub use crate::core::methods::hclust::{average_linkage, cut_tree, MergeStep};
pub use crate::core::methods::moran::{
    moran_summary, morans_i, morans_i_test, parse_weight_kernel, spatial_weights, MoranSummary,
    MoranTest, WeightKernel,
};
pub use crate::core::methods::ranking::top_k_by_abs;
pub use crate::core::methods::scoring::{
    parse_scoring_strategy, parse_spatial_axis, score_genes, ScoringStrategy, SpatialAxis,
};
pub use crate::core::pipeline::{analyse_selection, AnalysisParams, SelectionAnalysis};
pub use crate::error::{AnalysisError, Result};
