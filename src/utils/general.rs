//////////////////////////
// Index-pair utilities //
//////////////////////////

/// Generate the row and column indices of the upper triangle of a square
/// matrix.
///
/// ### Params
///
/// * `n_dim` - Dimension of the square matrix.
/// * `offset` - 0 includes the diagonal, 1 excludes it.
///
/// ### Returns
///
/// Tuple of (row indices, column indices), listed row by row.
pub fn upper_triangle_indices(n_dim: usize, offset: usize) -> (Vec<usize>, Vec<usize>) {
    assert!(offset <= 1, "The offset should be 0 or 1");
    if offset >= n_dim {
        return (Vec::new(), Vec::new());
    }

    let total_elements: usize = (0..n_dim)
        .map(|row| n_dim.saturating_sub(row + offset))
        .sum();

    let mut row_indices = Vec::with_capacity(total_elements);
    let mut col_indices = Vec::with_capacity(total_elements);

    for row in 0..n_dim {
        let start_col = row + offset;
        if start_col < n_dim {
            row_indices.extend(std::iter::repeat_n(row, n_dim - start_col));
            col_indices.extend(start_col..n_dim);
        }
    }

    (row_indices, col_indices)
}

/// Map an index pair `(i, j)` with `i < j` into the condensed upper-triangle
/// layout of a symmetric `n x n` distance matrix.
///
/// The condensed layout lists the strict upper triangle row by row, the same
/// order [`upper_triangle_indices`] with offset 1 produces.
///
/// ### Params
///
/// * `n` - Dimension of the square matrix.
/// * `i` - Row index, must be `< j`.
/// * `j` - Column index, must be `< n`.
///
/// ### Returns
///
/// Position within the condensed vector of length `n * (n - 1) / 2`.
pub fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    debug_assert!(
        i < j && j < n,
        "Expected i < j < n, got i = {i}, j = {j}, n = {n}"
    );
    i * n - i * (i + 1) / 2 + (j - i - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_triangle_indices() {
        let (rows, cols) = upper_triangle_indices(4, 1);
        assert_eq!(rows, vec![0, 0, 0, 1, 1, 2]);
        assert_eq!(cols, vec![1, 2, 3, 2, 3, 3]);

        let (rows, cols) = upper_triangle_indices(2, 0);
        assert_eq!(rows, vec![0, 0, 1]);
        assert_eq!(cols, vec![0, 1, 1]);

        let (rows, cols) = upper_triangle_indices(1, 1);
        assert!(rows.is_empty());
        assert!(cols.is_empty());
    }

    #[test]
    fn test_condensed_index_matches_triangle_order() {
        let n = 6;
        let (rows, cols) = upper_triangle_indices(n, 1);
        for (pos, (&i, &j)) in rows.iter().zip(cols.iter()).enumerate() {
            assert_eq!(condensed_index(n, i, j), pos);
        }
        assert_eq!(rows.len(), n * (n - 1) / 2);
    }
}
