//! Moran's I spatial autocorrelation over an active subset's coordinates.
//!
//! The weight matrix is built once per subset from a pairwise kernel; the
//! per-gene statistic then reuses the shared summary statistics. Quadratic in
//! subset size, and the first candidate for approximation should subsets grow
//! large.

use faer::{Mat, MatRef};
use rayon::prelude::*;

use crate::core::base::correlation::VAR_FLOOR;
use crate::core::base::stats::{z_to_pval, TestAlternative};
use crate::core::base::utils::mean;
use crate::utils::general::upper_triangle_indices;

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// Pairwise kernel turning point distances into spatial weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightKernel {
    /// `w = 1 / d`.
    InverseDistance,
    /// `w = exp(-((d * epsilon)^2))`.
    Gaussian { epsilon: f64 },
}

/// Summary statistics of a spatial weight matrix.
///
/// ### Fields
///
/// * `n` - Number of points.
/// * `w_sum` - Sum over all weights (`W`).
/// * `s1` - `0.5 * Σ_ij (w_ij + w_ji)^2`.
/// * `s2` - `Σ_i (row_i + col_i)^2` over row and column sums.
/// * `s4` - `(n^2 - 3n + 3) * S1 - n * S2 + 3 * W^2`.
/// * `s5` - `(n^2 - n) * S1 - 2n * S2 + 6 * W^2`.
#[derive(Clone, Debug)]
pub struct MoranSummary {
    pub n: usize,
    pub w_sum: f64,
    pub s1: f64,
    pub s2: f64,
    pub s4: f64,
    pub s5: f64,
}

/// Moran's I with its significance under the randomisation assumption.
#[derive(Clone, Debug)]
pub struct MoranTest {
    pub statistic: f64,
    pub expectation: f64,
    pub variance: f64,
    pub z_score: f64,
    pub p_value: f64,
}

/////////////
// Helpers //
/////////////

/// Function to parse the weight kernel type
///
/// ### Params
///
/// * `s` - String to parse
///
/// ### Returns
///
/// Option<WeightKernel> (Gaussian carries the default epsilon of 1).
pub fn parse_weight_kernel(s: &str) -> Option<WeightKernel> {
    match s.to_lowercase().as_str() {
        "inverse" | "inverse_distance" => Some(WeightKernel::InverseDistance),
        "gaussian" => Some(WeightKernel::Gaussian { epsilon: 1.0 }),
        _ => None,
    }
}

fn kernel_weight(dist: f64, kernel: WeightKernel) -> f64 {
    // coincident points carry no weight under either kernel
    if dist == 0.0 {
        return 0.0;
    }
    match kernel {
        WeightKernel::InverseDistance => 1.0 / dist,
        WeightKernel::Gaussian { epsilon } => (-((dist * epsilon).powi(2))).exp(),
    }
}

///////////////
// Functions //
///////////////

/// Build the symmetric spatial weight matrix over point coordinates
///
/// ### Params
///
/// * `coords` - Points x axes coordinates of the subset.
/// * `kernel` - The pairwise kernel.
///
/// ### Returns
///
/// Points x points weight matrix with a zero diagonal.
pub fn spatial_weights(coords: MatRef<f64>, kernel: WeightKernel) -> Mat<f64> {
    let n = coords.nrows();
    let n_axes = coords.ncols();
    let (rows, cols) = upper_triangle_indices(n, 1);

    let pair_weights: Vec<f64> = rows
        .par_iter()
        .zip(cols.par_iter())
        .map(|(&i, &j)| {
            let mut dist_sq = 0.0;
            for axis in 0..n_axes {
                let delta = coords[(i, axis)] - coords[(j, axis)];
                dist_sq += delta * delta;
            }
            kernel_weight(dist_sq.sqrt(), kernel)
        })
        .collect();

    let mut weights: Mat<f64> = Mat::zeros(n, n);
    for (pair, (&i, &j)) in rows.iter().zip(cols.iter()).enumerate() {
        weights[(i, j)] = pair_weights[pair];
        weights[(j, i)] = pair_weights[pair];
    }
    weights
}

/// Compute the summary statistics of a weight matrix
///
/// ### Params
///
/// * `weights` - The spatial weight matrix.
///
/// ### Returns
///
/// The `MoranSummary` with `W`, `S1`, `S2`, `S4` and `S5`.
pub fn moran_summary(weights: MatRef<f64>) -> MoranSummary {
    let n = weights.nrows();

    let mut w_sum = 0.0;
    let mut s1_acc = 0.0;
    let mut row_sums = vec![0.0_f64; n];
    let mut col_sums = vec![0.0_f64; n];

    for i in 0..n {
        for j in 0..n {
            let w = weights[(i, j)];
            w_sum += w;
            let pair = w + weights[(j, i)];
            s1_acc += pair * pair;
            row_sums[i] += w;
            col_sums[j] += w;
        }
    }

    let s1 = 0.5 * s1_acc;
    let s2 = (0..n)
        .map(|i| {
            let total = row_sums[i] + col_sums[i];
            total * total
        })
        .sum::<f64>();

    let nf = n as f64;
    let s4 = (nf * nf - 3.0 * nf + 3.0) * s1 - nf * s2 + 3.0 * w_sum * w_sum;
    let s5 = (nf * nf - nf) * s1 - 2.0 * nf * s2 + 6.0 * w_sum * w_sum;

    MoranSummary {
        n,
        w_sum,
        s1,
        s2,
        s4,
        s5,
    }
}

/// Moran's I for one value vector
///
/// `I = (n / W) * Σ_ij w_ij z_i z_j / Σ_i z_i^2` with `z` the centred values.
/// Zero variance, an empty weight mass, or fewer than two points clamp the
/// statistic to exactly 0.0.
///
/// ### Params
///
/// * `values` - One value per subset point, aligned with the weight matrix.
/// * `weights` - The spatial weight matrix.
/// * `summary` - Its precomputed summary statistics.
///
/// ### Returns
///
/// The statistic, 0.0 for degenerate inputs.
pub fn morans_i(values: &[f64], weights: MatRef<f64>, summary: &MoranSummary) -> f64 {
    let n = values.len();
    if n < 2 || summary.w_sum == 0.0 {
        return 0.0;
    }

    let centre = mean(values);
    let z: Vec<f64> = values.iter().map(|value| value - centre).collect();
    let denom: f64 = z.iter().map(|zi| zi * zi).sum();
    if denom < VAR_FLOOR {
        return 0.0;
    }

    let mut cross = 0.0;
    for i in 0..n {
        for j in 0..n {
            cross += weights[(i, j)] * z[i] * z[j];
        }
    }

    let result = (n as f64 / summary.w_sum) * (cross / denom);
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// Moran's I with expectation, randomisation variance, z-score and p-value
///
/// Under the randomisation assumption `E[I] = -1 / (n - 1)` and
///
/// `Var(I) = (n * S4 - b2 * S5) / ((n-1)(n-2)(n-3) * W^2) - E[I]^2`
///
/// with `b2` the sample kurtosis of the centred values. Fewer than four
/// points, empty weight mass, or a non-positive variance yield a null result
/// (`z = 0`, `p = 1`).
///
/// ### Params
///
/// * `values` - One value per subset point, aligned with the weight matrix.
/// * `weights` - The spatial weight matrix.
/// * `summary` - Its precomputed summary statistics.
/// * `alternative` - Sidedness of the test.
///
/// ### Returns
///
/// The `MoranTest` result.
pub fn morans_i_test(
    values: &[f64],
    weights: MatRef<f64>,
    summary: &MoranSummary,
    alternative: TestAlternative,
) -> MoranTest {
    let statistic = morans_i(values, weights, summary);
    let n = values.len();
    let nf = n as f64;

    if n < 2 {
        return MoranTest {
            statistic,
            expectation: 0.0,
            variance: 0.0,
            z_score: 0.0,
            p_value: 1.0,
        };
    }

    let expectation = -1.0 / (nf - 1.0);

    if n < 4 || summary.w_sum == 0.0 {
        return MoranTest {
            statistic,
            expectation,
            variance: 0.0,
            z_score: 0.0,
            p_value: 1.0,
        };
    }

    let centre = mean(values);
    let z: Vec<f64> = values.iter().map(|value| value - centre).collect();
    let sum_sq: f64 = z.iter().map(|zi| zi * zi).sum();
    if sum_sq < VAR_FLOOR {
        return MoranTest {
            statistic,
            expectation,
            variance: 0.0,
            z_score: 0.0,
            p_value: 1.0,
        };
    }

    let sum_quad: f64 = z.iter().map(|zi| zi.powi(4)).sum();
    let b2 = nf * sum_quad / (sum_sq * sum_sq);

    let denom = (nf - 1.0) * (nf - 2.0) * (nf - 3.0) * summary.w_sum * summary.w_sum;
    let variance = (nf * summary.s4 - b2 * summary.s5) / denom - expectation * expectation;

    if variance <= 0.0 || !variance.is_finite() {
        return MoranTest {
            statistic,
            expectation,
            variance: 0.0,
            z_score: 0.0,
            p_value: 1.0,
        };
    }

    let z_score = (statistic - expectation) / variance.sqrt();
    let p_value = z_to_pval(z_score, alternative);

    MoranTest {
        statistic,
        expectation,
        variance,
        z_score,
        p_value,
    }
}
