use log::warn;

/// Indices of the K genes with the largest absolute score
///
/// Selection is partial (`select_nth_unstable_by`) before the kept slice is
/// ordered, so the cost stays at O(n + k log k) instead of a full sort. The
/// returned indices are in descending absolute-score order; ties fall back to
/// the smaller gene index. A threshold beyond the number of enabled genes is
/// clamped, with a warning.
///
/// ### Params
///
/// * `scores` - One finite score per enabled gene.
/// * `k` - Number of genes to keep.
///
/// ### Returns
///
/// The kept gene indices.
pub fn top_k_by_abs(scores: &[f64], k: usize) -> Vec<usize> {
    let n = scores.len();
    if k == 0 || n == 0 {
        return Vec::new();
    }
    let k = if k > n {
        warn!("filter threshold {k} exceeds the {n} enabled genes, clamping");
        n
    } else {
        k
    };

    let compare = |a: &usize, b: &usize| {
        scores[*b]
            .abs()
            .total_cmp(&scores[*a].abs())
            .then(a.cmp(b))
    };

    let mut order: Vec<usize> = (0..n).collect();
    if k < n {
        order.select_nth_unstable_by(k - 1, compare);
        order.truncate(k);
    }
    order.sort_unstable_by(compare);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_descending_absolute() {
        let scores = [0.1, -5.0, 3.0, -0.5];
        assert_eq!(top_k_by_abs(&scores, 2), vec![1, 2]);
        assert_eq!(top_k_by_abs(&scores, 4), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_ties_keep_smaller_index_first() {
        let scores = [2.0, -2.0, 1.0];
        assert_eq!(top_k_by_abs(&scores, 2), vec![0, 1]);
        assert_eq!(top_k_by_abs(&scores, 1), vec![0]);
    }

    #[test]
    fn test_threshold_clamps_to_gene_count() {
        let scores = [1.0, -3.0, 2.0];
        assert_eq!(top_k_by_abs(&scores, 10), vec![1, 2, 0]);
    }

    #[test]
    fn test_degenerate_requests() {
        assert!(top_k_by_abs(&[1.0, 2.0], 0).is_empty());
        assert!(top_k_by_abs(&[], 3).is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let scores = [0.5, 0.5, -0.5, 0.25, -0.25, 0.5];
        let first = top_k_by_abs(&scores, 3);
        let second = top_k_by_abs(&scores, 3);
        assert_eq!(first, second);
        assert_eq!(first, vec![0, 1, 2]);
    }
}
