use rayon::prelude::*;

use crate::core::base::correlation::{pearson, weighted_pearson};
use crate::core::base::utils::weighted_mean;
use crate::core::data::subset_view::SubsetView;
use crate::core::methods::moran::{moran_summary, morans_i, spatial_weights, WeightKernel};
use crate::error::{AnalysisError, Result};

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// A fixed spatial coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpatialAxis {
    X,
    Y,
    Z,
}

impl SpatialAxis {
    /// Column of the positions matrix this axis reads.
    pub fn column(self) -> usize {
        match self {
            SpatialAxis::X => 0,
            SpatialAxis::Y => 1,
            SpatialAxis::Z => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SpatialAxis::X => "x",
            SpatialAxis::Y => "y",
            SpatialAxis::Z => "z",
        }
    }
}

/// The interchangeable gene-relevance scoring strategies.
///
/// Every variant carries only the configuration it needs and is dispatched
/// through [`score_genes`]; the data-shape branching (point-level versus
/// pseudo-bulk, 2D versus 3D) lives in the subset view, not here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoringStrategy {
    /// Subset mean minus global mean, per gene.
    DifferenceOfMeans,
    /// Pearson correlation of the gene against one coordinate axis.
    SpatialAxisCorrelation { axis: SpatialAxis },
    /// Pearson correlation of the gene against the inverted wave numbers.
    WaveCorrelation,
    /// Moran's I spatial autocorrelation over the subset's points.
    MoransI { kernel: WeightKernel },
}

/////////////
// Helpers //
/////////////

/// Function to parse the spatial axis
///
/// ### Params
///
/// * `s` - String to parse
///
/// ### Returns
///
/// Option<SpatialAxis>
pub fn parse_spatial_axis(s: &str) -> Option<SpatialAxis> {
    match s.to_lowercase().as_str() {
        "x" => Some(SpatialAxis::X),
        "y" => Some(SpatialAxis::Y),
        "z" => Some(SpatialAxis::Z),
        _ => None,
    }
}

/// Function to parse the scoring strategy
///
/// Axis and kernel variants come back with their defaults (`x`, inverse
/// distance); callers wanting another configuration construct the variant
/// directly.
///
/// ### Params
///
/// * `s` - String to parse
///
/// ### Returns
///
/// Option<ScoringStrategy>
pub fn parse_scoring_strategy(s: &str) -> Option<ScoringStrategy> {
    match s.to_lowercase().as_str() {
        "difference" | "difference_of_means" => Some(ScoringStrategy::DifferenceOfMeans),
        "spatial" | "spatial_axis" => Some(ScoringStrategy::SpatialAxisCorrelation {
            axis: SpatialAxis::X,
        }),
        "wave" | "wave_correlation" => Some(ScoringStrategy::WaveCorrelation),
        "moran" | "morans_i" => Some(ScoringStrategy::MoransI {
            kernel: WeightKernel::InverseDistance,
        }),
        _ => None,
    }
}

///////////////
// Functions //
///////////////

/// Score every enabled gene for the active subset
///
/// All strategies share the same numeric contract: any non-finite or
/// zero-variance result is clamped to exactly 0.0. An empty subset scores a
/// flat zero vector.
///
/// ### Params
///
/// * `view` - The prepared subset view.
/// * `strategy` - The scoring strategy to dispatch.
///
/// ### Returns
///
/// One score per enabled gene, aligned with the gene-name ordering.
pub fn score_genes(view: &SubsetView, strategy: ScoringStrategy) -> Result<Vec<f64>> {
    let n_genes = view.n_genes();
    if view.n_subset_points() == 0 {
        return Ok(vec![0.0; n_genes]);
    }

    match strategy {
        ScoringStrategy::DifferenceOfMeans => {
            let scores = (0..n_genes)
                .into_par_iter()
                .map(|gene| {
                    let values = view.gene_values(gene);
                    let shift = weighted_mean(&values, view.weights()) - view.global_means()[gene];
                    if shift.is_finite() {
                        shift
                    } else {
                        0.0
                    }
                })
                .collect();
            Ok(scores)
        }
        ScoringStrategy::SpatialAxisCorrelation { axis } => {
            let coords = view.coords();
            if axis.column() >= coords.ncols() {
                return Err(AnalysisError::InvalidParameter(format!(
                    "axis {} needs {}-axis positions, got {}",
                    axis.label(),
                    axis.column() + 1,
                    coords.ncols()
                )));
            }
            let covariate: Vec<f64> = coords.col(axis.column()).iter().copied().collect();
            Ok(correlate_genes(view, &covariate))
        }
        ScoringStrategy::WaveCorrelation => {
            let covariate = view.wave_covariate().to_vec();
            Ok(correlate_genes(view, &covariate))
        }
        ScoringStrategy::MoransI { kernel } => {
            let coords = view.point_positions();
            let weights = spatial_weights(coords.as_ref(), kernel);
            let summary = moran_summary(weights.as_ref());

            let scores = (0..n_genes)
                .into_par_iter()
                .map(|gene| {
                    let values = view.point_gene_values(gene);
                    morans_i(&values, weights.as_ref(), &summary)
                })
                .collect();
            Ok(scores)
        }
    }
}

/// Per-gene correlation against a shared per-row covariate, weighted in
/// pseudo-bulk mode.
fn correlate_genes(view: &SubsetView, covariate: &[f64]) -> Vec<f64> {
    let weighted = view.is_weighted();
    (0..view.n_genes())
        .into_par_iter()
        .map(|gene| {
            let values = view.gene_values(gene);
            if weighted {
                weighted_pearson(&values, covariate, view.weights())
            } else {
                pearson(&values, covariate)
            }
        })
        .collect()
}
