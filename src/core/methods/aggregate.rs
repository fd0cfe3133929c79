use faer::MatRef;
use rayon::prelude::*;

use crate::core::data::subset_view::SubsetView;

/// Per-cluster intensity arrays over the full point domain
///
/// For every cluster, the mean expression over its member genes is computed
/// at each participating row, expanded to the subset's points (pseudo-bulk
/// points read their profile's row) and scattered into a full-length array.
/// Points outside the subset receive the minimum of the cluster's populated
/// values. The minimum is a visualisation convention, "unselected points
/// recede to background", not a missing-value sentinel, and is recomputed
/// per cluster after population.
///
/// Each cluster owns its output array outright, so parallel accumulation
/// never shares a slot.
///
/// ### Params
///
/// * `view` - The prepared subset view.
/// * `submatrix` - Subset rows x filtered genes expression copy.
/// * `labels` - Per filtered gene (submatrix column), its cluster label.
/// * `k` - Number of clusters; every label lies in `[0, k)`.
///
/// ### Returns
///
/// `k` arrays, each of length = total point count.
pub fn cluster_color_scalars(
    view: &SubsetView,
    submatrix: MatRef<f64>,
    labels: &[usize],
    k: usize,
) -> Vec<Vec<f32>> {
    assert_eq!(
        submatrix.ncols(),
        labels.len(),
        "One label per submatrix column expected"
    );
    assert_eq!(
        submatrix.nrows(),
        view.n_rows(),
        "Submatrix rows expected to match the subset view"
    );

    let n_total = view.n_total_points();
    let point_indices = view.point_indices();
    let point_rows = view.point_rows();

    if point_indices.is_empty() {
        return (0..k).map(|_| vec![0.0_f32; n_total]).collect();
    }

    (0..k)
        .into_par_iter()
        .map(|cluster| {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == cluster)
                .map(|(gene, _)| gene)
                .collect();
            if members.is_empty() {
                return vec![0.0_f32; n_total];
            }

            let inv_members = 1.0 / members.len() as f64;
            let row_means: Vec<f64> = (0..submatrix.nrows())
                .map(|row| {
                    let sum: f64 = members.iter().map(|&gene| submatrix[(row, gene)]).sum();
                    sum * inv_members
                })
                .collect();

            let point_values: Vec<f64> =
                point_rows.iter().map(|&slot| row_means[slot]).collect();
            let background = point_values.iter().copied().fold(f64::INFINITY, f64::min);

            let mut scalars = vec![background as f32; n_total];
            for (&point, &value) in point_indices.iter().zip(point_values.iter()) {
                scalars[point] = value as f32;
            }
            scalars
        })
        .collect()
}
