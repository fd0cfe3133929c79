use faer::{Mat, MatRef};

use crate::core::base::utils::{col_means, rank_matrix_col};
use crate::utils::general::upper_triangle_indices;
use crate::{assert_rows_match_len, assert_same_len, assert_symmetric_mat};

/// Sums of squares below this floor count as zero variance and clamp the
/// correlation to 0.0 instead of dividing.
pub(crate) const VAR_FLOOR: f64 = 1e-10;

//////////////////////
// Vector responses //
//////////////////////

/// Pearson correlation between two slices.
///
/// Mean-centers both operands and takes the normalised dot product. If either
/// operand has (near) zero variance the correlation is undefined and exactly
/// 0.0 is returned, never NaN.
///
/// ### Params
///
/// * `a` - First operand.
/// * `b` - Second operand, same length as `a`.
///
/// ### Returns
///
/// The correlation coefficient, 0.0 in the degenerate cases.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    assert_same_len!(a, b);
    if a.is_empty() {
        return 0.0;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < VAR_FLOOR || var_b < VAR_FLOOR {
        return 0.0;
    }
    let r = cov / (var_a * var_b).sqrt();
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Weighted Pearson correlation between two slices.
///
/// Weights act as population counts: centering uses the weighted mean and
/// every cross product is scaled by its row weight. Degenerate operands and a
/// non-positive weight total yield exactly 0.0.
///
/// ### Params
///
/// * `a` - First operand.
/// * `b` - Second operand, same length as `a`.
/// * `weights` - Per-element weights, same length as `a`.
///
/// ### Returns
///
/// The weighted correlation coefficient.
pub fn weighted_pearson(a: &[f64], b: &[f64], weights: &[f64]) -> f64 {
    assert_same_len!(a, b, weights);

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return 0.0;
    }

    let mut mean_a = 0.0;
    let mut mean_b = 0.0;
    for ((x, y), w) in a.iter().zip(b.iter()).zip(weights.iter()) {
        mean_a += x * w;
        mean_b += y * w;
    }
    mean_a /= weight_sum;
    mean_b /= weight_sum;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for ((x, y), w) in a.iter().zip(b.iter()).zip(weights.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += w * da * db;
        var_a += w * da * da;
        var_b += w * db * db;
    }

    if var_a < VAR_FLOOR || var_b < VAR_FLOOR {
        return 0.0;
    }
    let r = cov / (var_a * var_b).sqrt();
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

///////////////////////
// Column matrix ops //
///////////////////////

/// Calculates the column-by-column correlation matrix.
///
/// Columns are mean-centered (weighted mean when row weights are given, with
/// every centered row additionally scaled by the square root of its weight)
/// and the Gram product is normalised by the column norms. Columns without
/// spread produce 0.0 entries, including on the diagonal.
///
/// ### Params
///
/// * `mat` - The matrix whose columns to correlate.
/// * `spearman` - Rank-transform the columns first (Spearman correlation).
/// * `weights` - Optional per-row population weights.
///
/// ### Returns
///
/// The symmetric correlation matrix with NaN clamped to 0.0.
pub fn column_cor(mat: MatRef<f64>, spearman: bool, weights: Option<&[f64]>) -> Mat<f64> {
    let ranked;
    let mat = if spearman {
        ranked = rank_matrix_col(mat);
        ranked.as_ref()
    } else {
        mat
    };

    let (n_rows, n_cols) = mat.shape();

    let scaled = match weights {
        None => {
            let means = col_means(mat);
            Mat::from_fn(n_rows, n_cols, |i, j| mat[(i, j)] - means[j])
        }
        Some(w) => {
            assert_rows_match_len!(mat, w);
            let weight_sum: f64 = w.iter().sum();
            let means: Vec<f64> = if weight_sum <= 0.0 {
                vec![0.0; n_cols]
            } else {
                (0..n_cols)
                    .map(|j| {
                        let mut total = 0.0;
                        for (i, &wi) in w.iter().enumerate() {
                            total += mat[(i, j)] * wi;
                        }
                        total / weight_sum
                    })
                    .collect()
            };
            let sqrt_w: Vec<f64> = w.iter().map(|x| x.sqrt()).collect();
            Mat::from_fn(n_rows, n_cols, |i, j| (mat[(i, j)] - means[j]) * sqrt_w[i])
        }
    };

    let gram = scaled.transpose() * &scaled;
    let norms: Vec<f64> = (0..n_cols).map(|j| gram[(j, j)].sqrt()).collect();

    let mut cor: Mat<f64> = Mat::zeros(n_cols, n_cols);
    for i in 0..n_cols {
        for j in 0..n_cols {
            let denom = norms[i] * norms[j];
            let r = if denom < VAR_FLOOR {
                0.0
            } else {
                gram[(i, j)] / denom
            };
            cor[(i, j)] = if r.is_finite() { r } else { 0.0 };
        }
    }
    // exact ones on the diagonal for columns with spread
    for j in 0..n_cols {
        if norms[j] * norms[j] >= VAR_FLOOR {
            cor[(j, j)] = 1.0;
        }
    }

    cor
}

/// Turn a correlation matrix into a condensed distance vector.
///
/// The distance is `1 - correlation`, so identical columns sit at 0 and
/// maximally anti-correlated ones at 2. Only the strict upper triangle is
/// kept, row by row, matching [`crate::utils::general::condensed_index`].
/// Floating point drift on the correlation side is clamped so distances never
/// go negative.
///
/// ### Params
///
/// * `cor` - The symmetric correlation matrix.
///
/// ### Returns
///
/// The condensed distance vector of length `n * (n - 1) / 2`.
pub fn cor_to_condensed_distance(cor: MatRef<f64>) -> Vec<f64> {
    assert_symmetric_mat!(cor);
    let (rows, cols) = upper_triangle_indices(cor.ncols(), 1);
    rows.iter()
        .zip(cols.iter())
        .map(|(&i, &j)| (1.0 - cor[(i, j)]).max(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn test_pearson_basic_properties() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let c = vec![5.0, 4.0, 3.0, 2.0, 1.0];

        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c) + 1.0).abs() < 1e-12);
        assert!((pearson(&a, &a) - 1.0).abs() < 1e-12);

        let d = vec![0.3, 1.7, 0.9, 2.2, 1.1];
        assert!((pearson(&a, &d) - pearson(&d, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_clamps() {
        let flat = vec![3.0; 5];
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(pearson(&flat, &a), 0.0);
        assert_eq!(pearson(&a, &flat), 0.0);
        assert_eq!(pearson(&flat, &flat), 0.0);

        let empty: Vec<f64> = Vec::new();
        assert_eq!(pearson(&empty, &empty), 0.0);
    }

    #[test]
    fn test_weighted_pearson_uniform_matches_plain() {
        let a = vec![1.0, 4.0, 2.0, 8.0, 5.0];
        let b = vec![2.0, 3.0, 1.0, 9.0, 4.0];
        let w = vec![1.0; 5];
        assert!((weighted_pearson(&a, &b, &w) - pearson(&a, &b)).abs() < 1e-12);

        let zero_w = vec![0.0; 5];
        assert_eq!(weighted_pearson(&a, &b, &zero_w), 0.0);
    }

    #[test]
    fn test_weighted_pearson_matches_replication() {
        // weight 2 on a row behaves like duplicating that row
        let a = vec![1.0, 3.0, 5.0];
        let b = vec![2.0, 1.0, 9.0];
        let w = vec![1.0, 2.0, 1.0];

        let a_rep = vec![1.0, 3.0, 3.0, 5.0];
        let b_rep = vec![2.0, 1.0, 1.0, 9.0];

        let weighted = weighted_pearson(&a, &b, &w);
        let replicated = pearson(&a_rep, &b_rep);
        assert!((weighted - replicated).abs() < 1e-12);
    }

    #[test]
    fn test_column_cor_agrees_with_pairwise() {
        let mat = mat![
            [1.0, 2.0, 5.0],
            [2.0, 1.0, 4.0],
            [3.0, 5.0, 3.0],
            [4.0, 3.0, 2.0],
            [5.0, 6.0, 1.0]
        ];
        let cor = column_cor(mat.as_ref(), false, None);

        for j in 0..3 {
            assert!((cor[(j, j)] - 1.0).abs() < 1e-12);
        }
        for i in 0..3 {
            for j in (i + 1)..3 {
                let a: Vec<f64> = (0..5).map(|r| mat[(r, i)]).collect();
                let b: Vec<f64> = (0..5).map(|r| mat[(r, j)]).collect();
                let expected = pearson(&a, &b);
                assert!((cor[(i, j)] - expected).abs() < 1e-10);
                assert!((cor[(i, j)] - cor[(j, i)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_column_cor_zero_variance_column() {
        let mat = mat![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let cor = column_cor(mat.as_ref(), false, None);
        assert_eq!(cor[(0, 1)], 0.0);
        assert_eq!(cor[(1, 0)], 0.0);
        assert_eq!(cor[(1, 1)], 0.0);
        assert!((cor[(0, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_cor_spearman_monotone_invariance() {
        let mat = mat![[1.0, 1.0], [2.0, 8.0], [3.0, 27.0], [4.0, 64.0]];
        let cor = column_cor(mat.as_ref(), true, None);
        // a strictly monotone relation has perfect rank correlation
        assert!((cor[(0, 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_cor_weighted_matches_replication() {
        let mat = mat![[1.0, 2.0], [3.0, 1.0], [5.0, 9.0]];
        let weights = vec![1.0, 2.0, 1.0];
        let weighted = column_cor(mat.as_ref(), false, Some(&weights));

        let replicated_mat = mat![[1.0, 2.0], [3.0, 1.0], [3.0, 1.0], [5.0, 9.0]];
        let replicated = column_cor(replicated_mat.as_ref(), false, None);

        assert!((weighted[(0, 1)] - replicated[(0, 1)]).abs() < 1e-10);
    }

    #[test]
    fn test_cor_to_condensed_distance() {
        let cor = mat![[1.0, 0.5, -1.0], [0.5, 1.0, 0.0], [-1.0, 0.0, 1.0]];
        let condensed = cor_to_condensed_distance(cor.as_ref());
        assert_eq!(condensed.len(), 3);
        assert!((condensed[0] - 0.5).abs() < 1e-12);
        assert!((condensed[1] - 2.0).abs() < 1e-12);
        assert!((condensed[2] - 1.0).abs() < 1e-12);

        // drift beyond r = 1 must not produce negative distances
        let noisy = mat![[1.0, 1.0 + 1e-14], [1.0 + 1e-14, 1.0]];
        let condensed = cor_to_condensed_distance(noisy.as_ref());
        assert!(condensed[0] >= 0.0);
    }
}
