use faer::{Mat, MatRef};
use rayon::iter::*;

use crate::{assert_rows_match_len, assert_same_len};

//////////////////
// Vector means //
//////////////////

/// Arithmetic mean of a slice. Empty slices yield 0.0.
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Weighted arithmetic mean of a slice.
///
/// Row weights are population counts in the pseudo-bulk case, so weighting is
/// equivalent to scaling every row by its weight before the mean. A
/// non-positive weight total yields 0.0.
///
/// ### Params
///
/// * `x` - The values.
/// * `weights` - Per-value weights, same length as `x`.
///
/// ### Returns
///
/// The weighted mean.
pub fn weighted_mean(x: &[f64], weights: &[f64]) -> f64 {
    assert_same_len!(x, weights);
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return 0.0;
    }
    let total: f64 = x.iter().zip(weights.iter()).map(|(v, w)| v * w).sum();
    total / weight_sum
}

/////////////
// Ranking //
/////////////

/// Generate the rank of a vector with tie correction (average ranks for
/// tied values, 1-based).
///
/// ### Params
///
/// * `vec` - The slice of numericals to rank.
///
/// ### Returns
///
/// The ranked vector.
pub fn rank_vector(vec: &[f64]) -> Vec<f64> {
    let n = vec.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| {
        vec[a]
            .partial_cmp(&vec[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && vec[order[j + 1]] == vec[order[i]] {
            j += 1;
        }
        // ties share the average of the ranks they span
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    ranks
}

/// Column wise rank transformation of a matrix.
///
/// ### Params
///
/// * `mat` - The matrix on which to apply column-wise ranking.
///
/// ### Returns
///
/// The matrix with every column replaced by its tie-corrected ranks.
pub fn rank_matrix_col(mat: MatRef<f64>) -> Mat<f64> {
    let mut ranked_mat = Mat::zeros(mat.nrows(), mat.ncols());

    ranked_mat
        .par_col_iter_mut()
        .enumerate()
        .for_each(|(col_idx, mut col)| {
            let original_col: Vec<f64> = mat.col(col_idx).iter().copied().collect();
            let ranks = rank_vector(&original_col);
            for (row_idx, &rank) in ranks.iter().enumerate() {
                col[row_idx] = rank;
            }
        });

    ranked_mat
}

//////////////////
// Column means //
//////////////////

/// Calculates the column means of a matrix.
///
/// ### Params
///
/// * `mat` - The matrix for which to calculate the column-wise means.
///
/// ### Returns
///
/// Vector of the column means.
pub fn col_means(mat: MatRef<f64>) -> Vec<f64> {
    let n_rows = mat.nrows();
    let ones = Mat::from_fn(n_rows, 1, |_, _| 1.0);
    let means = (ones.transpose() * mat) / n_rows as f64;

    means.row(0).iter().cloned().collect()
}

/// Column means of a single-precision matrix, accumulated in f64.
///
/// ### Params
///
/// * `mat` - The matrix for which to calculate the column-wise means.
///
/// ### Returns
///
/// Vector of the column means.
pub fn col_means_f32(mat: MatRef<f32>) -> Vec<f64> {
    let n_rows = mat.nrows();
    if n_rows == 0 {
        return vec![0.0; mat.ncols()];
    }

    (0..mat.ncols())
        .into_par_iter()
        .map(|j| {
            let mut total = 0.0_f64;
            for i in 0..n_rows {
                total += mat[(i, j)] as f64;
            }
            total / n_rows as f64
        })
        .collect()
}

/// Weighted column means of a single-precision matrix, accumulated in f64.
///
/// ### Params
///
/// * `mat` - The matrix for which to calculate the column-wise means.
/// * `weights` - Per-row weights, aligned with the matrix rows.
///
/// ### Returns
///
/// Vector of the weighted column means; all zero if the weights sum to zero.
pub fn weighted_col_means(mat: MatRef<f32>, weights: &[f64]) -> Vec<f64> {
    assert_rows_match_len!(mat, weights);
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return vec![0.0; mat.ncols()];
    }

    (0..mat.ncols())
        .into_par_iter()
        .map(|j| {
            let mut total = 0.0_f64;
            for (i, &w) in weights.iter().enumerate() {
                total += mat[(i, j)] as f64 * w;
            }
            total / weight_sum
        })
        .collect()
}

///////////////
// Gathering //
///////////////

/// Copy an index-addressed submatrix into a dense double-precision matrix.
///
/// Row and column index lists may repeat or reorder freely; entries are read
/// through the index lists, so the copy is `rows.len() x cols.len()`.
///
/// ### Params
///
/// * `mat` - The source matrix.
/// * `rows` - Row indices to keep, in output order.
/// * `cols` - Column indices to keep, in output order.
///
/// ### Returns
///
/// The gathered submatrix.
pub fn gather_submatrix(mat: MatRef<f32>, rows: &[usize], cols: &[usize]) -> Mat<f64> {
    Mat::from_fn(rows.len(), cols.len(), |i, j| {
        mat[(rows[i], cols[j])] as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn test_mean_and_weighted_mean() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        assert!((mean(&x) - 2.5).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);

        let uniform = vec![1.0; 4];
        assert!((weighted_mean(&x, &uniform) - mean(&x)).abs() < 1e-12);

        let w = vec![0.0, 0.0, 1.0, 3.0];
        assert!((weighted_mean(&x, &w) - 3.75).abs() < 1e-12);

        let zero_w = vec![0.0; 4];
        assert_eq!(weighted_mean(&x, &zero_w), 0.0);
    }

    #[test]
    fn test_rank_vector_with_ties() {
        let ranks = rank_vector(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(ranks, vec![3.0, 1.5, 4.0, 1.5, 5.0]);

        let empty: Vec<f64> = Vec::new();
        assert!(rank_vector(&empty).is_empty());
    }

    #[test]
    fn test_col_means_variants() {
        let mat = mat![[1.0_f64, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let means = col_means(mat.as_ref());
        assert!((means[0] - 2.0).abs() < 1e-12);
        assert!((means[1] - 20.0).abs() < 1e-12);

        let mat32 = mat![[1.0_f32, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let means32 = col_means_f32(mat32.as_ref());
        assert!((means32[0] - 2.0).abs() < 1e-6);
        assert!((means32[1] - 20.0).abs() < 1e-6);

        let weighted = weighted_col_means(mat32.as_ref(), &[1.0, 0.0, 1.0]);
        assert!((weighted[0] - 2.0).abs() < 1e-6);
        assert!((weighted[1] - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_gather_submatrix() {
        let mat = mat![[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let sub = gather_submatrix(mat.as_ref(), &[2, 0], &[1, 2]);
        assert_eq!(sub.nrows(), 2);
        assert_eq!(sub.ncols(), 2);
        assert_eq!(sub[(0, 0)], 8.0);
        assert_eq!(sub[(0, 1)], 9.0);
        assert_eq!(sub[(1, 0)], 2.0);
        assert_eq!(sub[(1, 1)], 3.0);
    }
}
