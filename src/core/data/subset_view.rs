use faer::{Mat, MatRef};

use crate::core::base::utils::{col_means_f32, gather_submatrix, weighted_col_means};
use crate::core::data::matrix_store::{MatrixStore, RowUnit};
use crate::core::data::selection::ActiveSubset;
use crate::error::Result;

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// Per-call working state over an active subset, shared by every scoring
/// strategy and the downstream stages.
///
/// The view collapses the point-level and pseudo-bulk data shapes into one
/// layout. `rows` are the expression rows participating in the subset (the
/// points themselves, or the cell-type profiles with at least one selected
/// point), `weights` their within-subset population counts, and the
/// covariates (`coords`, `waves`) are per-row values (per-label means in
/// pseudo-bulk mode). The per-point mapping back into the rows is kept for
/// spatial autocorrelation and back-projection.
pub struct SubsetView<'a> {
    store: &'a MatrixStore,
    rows: Vec<usize>,
    weights: Vec<f64>,
    coords: Mat<f64>,
    waves: Vec<f64>,
    global_means: Vec<f64>,
    point_indices: Vec<usize>,
    point_rows: Vec<usize>,
}

///////////////
// Functions //
///////////////

impl<'a> SubsetView<'a> {
    /// Prepare the working state for one subset over one store.
    ///
    /// Point mode: rows are the selected points, weights uniform 1, the
    /// covariates are the points' own coordinates and wave numbers.
    /// Pseudo-bulk mode: rows are the labels present in the subset (in
    /// profile-row order), weights the within-subset label counts, the
    /// covariates per-label means over the label's selected points, and the
    /// global means re-weighted by the dataset-wide label counts.
    ///
    /// ### Params
    ///
    /// * `store` - The matrix store.
    /// * `subset` - The active subset to analyse.
    ///
    /// ### Returns
    ///
    /// The view, or `IndexOutOfRange` for a subset stale against the store.
    pub fn new(store: &'a MatrixStore, subset: &ActiveSubset) -> Result<SubsetView<'a>> {
        subset.validate_against(store.n_points())?;

        let point_indices = subset.indices().to_vec();
        let positions = store.positions();
        let n_axes = store.n_axes();

        match store.unit() {
            RowUnit::Points => {
                let rows = point_indices.clone();
                let weights = vec![1.0_f64; rows.len()];
                let coords = Mat::from_fn(rows.len(), n_axes, |i, j| positions[(rows[i], j)]);
                let waves: Vec<f64> = subset.waves().iter().map(|&wave| wave as f64).collect();
                let global_means = col_means_f32(store.expression());
                let point_rows = (0..rows.len()).collect();

                Ok(Self {
                    store,
                    rows,
                    weights,
                    coords,
                    waves,
                    global_means,
                    point_indices,
                    point_rows,
                })
            }
            RowUnit::PseudoBulk {
                point_labels,
                counts_all,
                ..
            } => {
                let n_labels = store.n_rows();
                let mut counts_subset = vec![0.0_f64; n_labels];
                for &point in &point_indices {
                    counts_subset[point_labels[point]] += 1.0;
                }

                let rows: Vec<usize> =
                    (0..n_labels).filter(|&label| counts_subset[label] > 0.0).collect();
                let mut slot_of_label = vec![usize::MAX; n_labels];
                for (slot, &label) in rows.iter().enumerate() {
                    slot_of_label[label] = slot;
                }
                let weights: Vec<f64> = rows.iter().map(|&label| counts_subset[label]).collect();

                let mut coord_sums: Mat<f64> = Mat::zeros(rows.len(), n_axes);
                let mut wave_sums = vec![0.0_f64; rows.len()];
                for (position_in_subset, &point) in point_indices.iter().enumerate() {
                    let slot = slot_of_label[point_labels[point]];
                    for axis in 0..n_axes {
                        coord_sums[(slot, axis)] += positions[(point, axis)];
                    }
                    wave_sums[slot] += subset.waves()[position_in_subset] as f64;
                }
                let coords = Mat::from_fn(rows.len(), n_axes, |i, j| {
                    coord_sums[(i, j)] / weights[i]
                });
                let waves: Vec<f64> = wave_sums
                    .iter()
                    .zip(weights.iter())
                    .map(|(sum, weight)| sum / weight)
                    .collect();

                let global_means = weighted_col_means(store.expression(), counts_all);
                let point_rows = point_indices
                    .iter()
                    .map(|&point| slot_of_label[point_labels[point]])
                    .collect();

                Ok(Self {
                    store,
                    rows,
                    weights,
                    coords,
                    waves,
                    global_means,
                    point_indices,
                    point_rows,
                })
            }
        }
    }

    /// Number of participating expression rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of selected points.
    pub fn n_subset_points(&self) -> usize {
        self.point_indices.len()
    }

    /// Number of points in the whole dataset.
    pub fn n_total_points(&self) -> usize {
        self.store.n_points()
    }

    /// Number of enabled genes.
    pub fn n_genes(&self) -> usize {
        self.store.n_genes()
    }

    /// The participating expression rows.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Within-subset population weight per row (uniform 1 in point mode).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether the rows are population-weighted pseudo-bulk profiles.
    pub fn is_weighted(&self) -> bool {
        self.store.is_pseudobulk()
    }

    /// Per-row coordinates (per-label means in pseudo-bulk mode).
    pub fn coords(&self) -> MatRef<'_, f64> {
        self.coords.as_ref()
    }

    /// Per-row inverted wave numbers, as a correlation covariate.
    pub fn wave_covariate(&self) -> &[f64] {
        &self.waves
    }

    /// Per-gene global means (weighted by dataset-wide label counts in
    /// pseudo-bulk mode).
    pub fn global_means(&self) -> &[f64] {
        &self.global_means
    }

    /// The selected point indices, in selection order.
    pub fn point_indices(&self) -> &[usize] {
        &self.point_indices
    }

    /// Per selected point, its position in [`Self::rows`].
    pub fn point_rows(&self) -> &[usize] {
        &self.point_rows
    }

    /// The gene's values over the participating rows.
    pub fn gene_values(&self, gene: usize) -> Vec<f64> {
        let expr = self.store.expression();
        self.rows.iter().map(|&row| expr[(row, gene)] as f64).collect()
    }

    /// The gene's values expanded per selected point (pseudo-bulk points
    /// repeat their profile value).
    pub fn point_gene_values(&self, gene: usize) -> Vec<f64> {
        let expr = self.store.expression();
        self.point_rows
            .iter()
            .map(|&slot| expr[(self.rows[slot], gene)] as f64)
            .collect()
    }

    /// Coordinates of the selected points, gathered dense.
    pub fn point_positions(&self) -> Mat<f64> {
        let positions = self.store.positions();
        Mat::from_fn(self.point_indices.len(), positions.ncols(), |i, j| {
            positions[(self.point_indices[i], j)]
        })
    }

    /// Dense rows x genes copy restricted to the participating rows and the
    /// given gene columns.
    pub fn submatrix(&self, genes: &[usize]) -> Mat<f64> {
        gather_submatrix(self.store.expression(), &self.rows, genes)
    }
}
