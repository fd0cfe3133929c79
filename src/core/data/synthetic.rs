//! Generation of synthetic spatial expression data for testing purposes.

use faer::Mat;
use rand::prelude::*;
use rand_distr::{Distribution, Gamma, Normal};
use rayon::prelude::*;

use crate::core::data::matrix_store::MatrixStore;
use crate::error::Result;

////////////////
// Structures //
////////////////

/// Structure for synthetic spatial expression data
///
/// ### Fields
///
/// * `expression` - Points x genes expression values.
/// * `gene_names` - Gene names; structured genes are prefixed `spatial_`,
///   noise genes `noise_`.
/// * `positions` - Points x 2 jittered grid coordinates.
/// * `hotspots` - Per structured gene, the hotspot centre `(x, y)`.
#[derive(Clone, Debug)]
pub struct SyntheticSpatialData {
    pub expression: Mat<f32>,
    pub gene_names: Vec<String>,
    pub positions: Mat<f64>,
    pub hotspots: Vec<(f64, f64)>,
}

impl SyntheticSpatialData {
    /// Move the generated data into a matrix store.
    pub fn into_store(self) -> Result<MatrixStore> {
        MatrixStore::from_points(self.expression, self.gene_names, self.positions)
    }
}

////////////////////////////
// Synthetic spatial data //
////////////////////////////

/// Generate synthetic spatial expression data on a jittered grid
///
/// Structured genes follow a Gaussian hotspot over the grid with additive
/// noise; background genes are flat noise around a gamma-drawn baseline.
/// Expression is clamped at zero. Per-gene seeds keep the generation
/// reproducible under parallel execution.
///
/// ### Params
///
/// * `n_side` - Side length of the point grid (`n_side^2` points).
/// * `n_structured` - Number of genes carrying a spatial hotspot.
/// * `n_background` - Number of background noise genes.
/// * `seed` - Seed for reproducibility purposes.
///
/// ### Returns
///
/// The `SyntheticSpatialData` data.
pub fn generate_spatial_expression(
    n_side: usize,
    n_structured: usize,
    n_background: usize,
    seed: u64,
) -> SyntheticSpatialData {
    let n_points = n_side * n_side;
    let n_genes = n_structured + n_background;

    let mut rng = StdRng::seed_from_u64(seed);

    let mut positions: Mat<f64> = Mat::zeros(n_points, 2);
    for i in 0..n_side {
        for j in 0..n_side {
            let point = i * n_side + j;
            positions[(point, 0)] = i as f64 + rng.random_range(-0.3..0.3);
            positions[(point, 1)] = j as f64 + rng.random_range(-0.3..0.3);
        }
    }

    // hotspot centres come from the shared rng so they stay stable when the
    // background gene count changes
    let hotspots: Vec<(f64, f64)> = (0..n_structured)
        .map(|_| {
            (
                rng.random_range(0.0..n_side as f64),
                rng.random_range(0.0..n_side as f64),
            )
        })
        .collect();

    let amplitude = Gamma::new(4.0, 2.0).unwrap();
    let baseline = Gamma::new(2.0, 1.0).unwrap();

    let point_coords: Vec<(f64, f64)> = (0..n_points)
        .map(|point| (positions[(point, 0)], positions[(point, 1)]))
        .collect();

    let gene_data: Vec<Vec<f32>> = (0..n_genes)
        .into_par_iter()
        .map(|gene| {
            let mut local_rng = StdRng::seed_from_u64(seed.wrapping_add(gene as u64));
            let mut values = Vec::with_capacity(n_points);

            if gene < n_structured {
                let (centre_x, centre_y) = hotspots[gene];
                let amp = amplitude.sample(&mut local_rng);
                let width = local_rng.random_range(0.15..0.35) * n_side as f64;
                let noise = Normal::new(0.0, 0.3).unwrap();

                for &(x, y) in &point_coords {
                    let dist_sq = (x - centre_x).powi(2) + (y - centre_y).powi(2);
                    let signal = amp * (-dist_sq / (2.0 * width * width)).exp();
                    values.push((signal + noise.sample(&mut local_rng)).max(0.0) as f32);
                }
            } else {
                let base: f64 = baseline.sample(&mut local_rng);
                let noise = Normal::new(0.0, 0.5).unwrap();

                for _ in 0..n_points {
                    values.push((base + noise.sample(&mut local_rng)).max(0.0) as f32);
                }
            }

            values
        })
        .collect();

    let mut expression: Mat<f32> = Mat::zeros(n_points, n_genes);
    for (gene, values) in gene_data.into_iter().enumerate() {
        for (point, value) in values.into_iter().enumerate() {
            expression[(point, gene)] = value;
        }
    }

    let gene_names = (0..n_genes)
        .map(|gene| {
            if gene < n_structured {
                format!("spatial_{}", gene + 1)
            } else {
                format!("noise_{}", gene + 1 - n_structured)
            }
        })
        .collect();

    SyntheticSpatialData {
        expression,
        gene_names,
        positions,
        hotspots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::base::correlation::pearson;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate_spatial_expression(6, 3, 2, 42);
        let second = generate_spatial_expression(6, 3, 2, 42);
        let other_seed = generate_spatial_expression(6, 3, 2, 43);

        assert_eq!(first.expression.nrows(), 36);
        assert_eq!(first.expression.ncols(), 5);

        let mut any_diff = false;
        for i in 0..36 {
            for j in 0..5 {
                assert_eq!(first.expression[(i, j)], second.expression[(i, j)]);
                if first.expression[(i, j)] != other_seed.expression[(i, j)] {
                    any_diff = true;
                }
            }
        }
        assert!(any_diff);
    }

    #[test]
    fn test_names_and_values_are_well_formed() {
        let data = generate_spatial_expression(5, 2, 3, 7);

        assert_eq!(data.gene_names.len(), 5);
        assert_eq!(data.gene_names[0], "spatial_1");
        assert_eq!(data.gene_names[2], "noise_1");

        let unique: FxHashSet<&String> = data.gene_names.iter().collect();
        assert_eq!(unique.len(), 5);

        for i in 0..data.expression.nrows() {
            for j in 0..data.expression.ncols() {
                assert!(data.expression[(i, j)] >= 0.0);
            }
        }

        let store = data.into_store().unwrap();
        assert_eq!(store.n_points(), 25);
        assert_eq!(store.n_genes(), 5);
    }

    #[test]
    fn test_structured_gene_tracks_its_hotspot() {
        let data = generate_spatial_expression(12, 3, 2, 42);
        let (centre_x, centre_y) = data.hotspots[0];

        let n_points = data.positions.nrows();
        let values: Vec<f64> = (0..n_points)
            .map(|point| data.expression[(point, 0)] as f64)
            .collect();
        let neg_dist: Vec<f64> = (0..n_points)
            .map(|point| {
                let dx = data.positions[(point, 0)] - centre_x;
                let dy = data.positions[(point, 1)] - centre_y;
                -(dx * dx + dy * dy).sqrt()
            })
            .collect();

        let cor = pearson(&values, &neg_dist);
        assert!(cor > 0.2, "expected hotspot decay, got r = {}", cor);
    }
}
