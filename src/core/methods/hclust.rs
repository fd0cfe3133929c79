//! Average-linkage agglomerative clustering over a condensed distance
//! triangle, with a flat cut into a fixed number of clusters.

use rustc_hash::FxHashMap;

use crate::error::{AnalysisError, Result};
use crate::utils::general::condensed_index;

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// One agglomerative merge step in the classic dendrogram encoding:
/// a negative code `-(g + 1)` is the original leaf `g`, a non-negative code
/// is the step that produced the merged cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeStep {
    pub left: i32,
    pub right: i32,
    pub height: f64,
}

///////////////
// Functions //
///////////////

/// Average-linkage clustering over a condensed upper-triangle distance
///
/// At every step the two active clusters with the smallest average pairwise
/// distance merge; ties keep the first minimal pair in scan order, which
/// makes the sequence reproducible for a fixed input. Distances are updated
/// in place through the Lance-Williams average rule
/// `d(ij,c) = (s_i * d(i,c) + s_j * d(j,c)) / (s_i + s_j)`.
///
/// ### Params
///
/// * `condensed` - Upper-triangle distances in row-major pair order.
/// * `n` - Number of leaves.
///
/// ### Returns
///
/// The `n - 1` merge steps with their heights.
pub fn average_linkage(condensed: &[f64], n: usize) -> Vec<MergeStep> {
    assert_eq!(
        condensed.len(),
        n * n.saturating_sub(1) / 2,
        "Condensed distance length does not match the leaf count"
    );
    if n < 2 {
        return Vec::new();
    }

    let mut dist = condensed.to_vec();
    let mut active = vec![true; n];
    let mut sizes = vec![1.0_f64; n];
    let mut codes: Vec<i32> = (0..n).map(|leaf| -(leaf as i32) - 1).collect();
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let mut best = (0, 0);
        let mut best_dist = f64::INFINITY;
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !active[j] {
                    continue;
                }
                let d = dist[condensed_index(n, i, j)];
                if d < best_dist {
                    best_dist = d;
                    best = (i, j);
                }
            }
        }

        let (i, j) = best;
        let size_i = sizes[i];
        let size_j = sizes[j];

        merges.push(MergeStep {
            left: codes[i],
            right: codes[j],
            height: best_dist,
        });

        // the merged cluster survives in the lower slot
        for c in 0..n {
            if !active[c] || c == i || c == j {
                continue;
            }
            let d_ic = dist[condensed_index(n, i.min(c), i.max(c))];
            let d_jc = dist[condensed_index(n, j.min(c), j.max(c))];
            dist[condensed_index(n, i.min(c), i.max(c))] =
                (size_i * d_ic + size_j * d_jc) / (size_i + size_j);
        }

        sizes[i] += size_j;
        active[j] = false;
        codes[i] = step as i32;
    }

    merges
}

/// Cut a merge sequence into exactly `k` flat clusters
///
/// The first `n - k` merges are replayed over a union-find; every leaf then
/// receives the label of its component, labels assigned by first appearance
/// in leaf order. The result always spans `[0, k)` with one label per leaf.
///
/// ### Params
///
/// * `merges` - The full merge sequence over `n` leaves.
/// * `n` - Number of leaves.
/// * `k` - Requested number of flat clusters.
///
/// ### Returns
///
/// One label per leaf, or `InsufficientGenes` when `k` exceeds the leaf
/// count.
pub fn cut_tree(merges: &[MergeStep], n: usize, k: usize) -> Result<Vec<usize>> {
    if k == 0 {
        return Err(AnalysisError::InvalidParameter(
            "cluster count must be at least 1".into(),
        ));
    }
    if k > n {
        return Err(AnalysisError::InsufficientGenes {
            available: n,
            requested: k,
        });
    }
    assert_eq!(
        merges.len() + 1,
        n,
        "Merge sequence does not match the leaf count"
    );

    let mut parent: Vec<usize> = (0..n).collect();
    let mut step_leaf = vec![0_usize; merges.len()];

    for (step, merge) in merges.iter().take(n - k).enumerate() {
        let left = resolve(merge.left, &step_leaf);
        let right = resolve(merge.right, &step_leaf);
        let left_root = find(&mut parent, left);
        let right_root = find(&mut parent, right);
        parent[right_root] = left_root;
        step_leaf[step] = left_root;
    }

    let mut labels = vec![0_usize; n];
    let mut root_label: FxHashMap<usize, usize> = FxHashMap::default();
    for leaf in 0..n {
        let root = find(&mut parent, leaf);
        let next = root_label.len();
        labels[leaf] = *root_label.entry(root).or_insert(next);
    }
    debug_assert_eq!(root_label.len(), k);

    Ok(labels)
}

fn resolve(code: i32, step_leaf: &[usize]) -> usize {
    if code < 0 {
        (-code - 1) as usize
    } else {
        step_leaf[code as usize]
    }
}

fn find(parent: &mut [usize], x: usize) -> usize {
    let mut root = x;
    while parent[root] != root {
        root = parent[root];
    }
    let mut current = x;
    while parent[current] != root {
        let next = parent[current];
        parent[current] = root;
        current = next;
    }
    root
}
