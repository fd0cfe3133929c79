//! The analyse-selection pipeline: subset view, scoring, ranking, gene-gene
//! correlation, clustering and back-projection in one pass.

use std::time::Instant;

use log::debug;
use rustc_hash::FxHashMap;

use crate::core::base::correlation::{column_cor, cor_to_condensed_distance};
use crate::core::data::matrix_store::MatrixStore;
use crate::core::data::selection::ActiveSubset;
use crate::core::data::subset_view::SubsetView;
use crate::core::methods::aggregate::cluster_color_scalars;
use crate::core::methods::hclust::{average_linkage, cut_tree, MergeStep};
use crate::core::methods::ranking::top_k_by_abs;
use crate::core::methods::scoring::{score_genes, ScoringStrategy};
use crate::error::{AnalysisError, Result};

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// Parameters of one analyse-selection call.
///
/// ### Fields
///
/// * `strategy` - The gene-relevance scoring strategy.
/// * `top_genes` - How many genes to keep by absolute score (clamped to the
///   enabled gene count).
/// * `n_clusters` - Number of flat clusters to cut.
/// * `spearman` - Rank-transform the gene-gene correlation matrix.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisParams {
    pub strategy: ScoringStrategy,
    pub top_genes: usize,
    pub n_clusters: usize,
    pub spearman: bool,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::DifferenceOfMeans,
            top_genes: 100,
            n_clusters: 5,
            spearman: false,
        }
    }
}

/// Full output of one analyse-selection call.
///
/// ### Fields
///
/// * `scores` - One score per enabled gene, aligned with the gene names.
/// * `filtered_genes` - The kept gene columns, in descending absolute-score
///   order.
/// * `assignments` - Gene name to flat cluster label in `[0, n_clusters)`.
/// * `merges` - The dendrogram merge sequence over the kept genes.
/// * `color_scalars` - Per cluster, one intensity per point of the dataset.
#[derive(Clone, Debug)]
pub struct SelectionAnalysis {
    pub scores: Vec<f64>,
    pub filtered_genes: Vec<usize>,
    pub assignments: FxHashMap<String, usize>,
    pub merges: Vec<MergeStep>,
    pub color_scalars: Vec<Vec<f32>>,
}

///////////////
// Functions //
///////////////

/// Run the full analysis for one active subset
///
/// Stages: prepare the subset view, score every enabled gene, keep the top-K
/// by absolute score, correlate and cluster the kept genes, cut into flat
/// clusters and back-project per-cluster means onto the full point domain.
///
/// An empty subset is quiescent: the call returns `Ok(None)` without touching
/// any stage, so previous outputs stay valid at the call site. Fewer kept
/// genes than requested clusters surface as `InsufficientGenes`.
///
/// ### Params
///
/// * `store` - The matrix store.
/// * `subset` - The active subset to analyse.
/// * `params` - Strategy, filter threshold and cluster count.
///
/// ### Returns
///
/// `Ok(None)` for an empty selection, otherwise the full analysis.
pub fn analyse_selection(
    store: &MatrixStore,
    subset: &ActiveSubset,
    params: &AnalysisParams,
) -> Result<Option<SelectionAnalysis>> {
    if subset.is_empty() {
        debug!("empty selection, nothing to analyse");
        return Ok(None);
    }
    if params.n_clusters == 0 {
        return Err(AnalysisError::InvalidParameter(
            "cluster count must be at least 1".into(),
        ));
    }

    let start = Instant::now();
    let view = SubsetView::new(store, subset)?;

    let scores = score_genes(&view, params.strategy)?;
    debug!(
        "scored {} genes over {} subset points in {:?}",
        scores.len(),
        view.n_subset_points(),
        start.elapsed()
    );

    let filtered = top_k_by_abs(&scores, params.top_genes);
    if filtered.len() < params.n_clusters {
        return Err(AnalysisError::InsufficientGenes {
            available: filtered.len(),
            requested: params.n_clusters,
        });
    }

    let clustering_start = Instant::now();
    let submatrix = view.submatrix(&filtered);
    let weights = if view.is_weighted() {
        Some(view.weights())
    } else {
        None
    };
    let cor = column_cor(submatrix.as_ref(), params.spearman, weights);
    let condensed = cor_to_condensed_distance(cor.as_ref());
    let merges = average_linkage(&condensed, filtered.len());
    let labels = cut_tree(&merges, filtered.len(), params.n_clusters)?;
    debug!(
        "clustered {} genes into {} clusters in {:?}",
        filtered.len(),
        params.n_clusters,
        clustering_start.elapsed()
    );

    let assignments: FxHashMap<String, usize> = filtered
        .iter()
        .zip(labels.iter())
        .map(|(&gene, &label)| (store.gene_names()[gene].clone(), label))
        .collect();

    let color_scalars =
        cluster_color_scalars(&view, submatrix.as_ref(), &labels, params.n_clusters);
    debug!("selection analysis finished in {:?}", start.elapsed());

    Ok(Some(SelectionAnalysis {
        scores,
        filtered_genes: filtered,
        assignments,
        merges,
        color_scalars,
    }))
}
