///////////////////
// Matrix macros //
///////////////////

/// Assertion that a matrix is square, a precondition for anything that is
/// treated as symmetric (correlation and spatial weight matrices).
#[macro_export]
macro_rules! assert_symmetric_mat {
    ($matrix:expr) => {
        assert_eq!(
            $matrix.nrows(),
            $matrix.ncols(),
            "Matrix expected to be symmetric: {} rows != {} cols",
            $matrix.nrows(),
            $matrix.ncols()
        );
    };
}

/// Assertion that a per-row vector is aligned with the rows of a matrix.
#[macro_export]
macro_rules! assert_rows_match_len {
    ($matrix:expr, $vec:expr) => {
        assert_eq!(
            $matrix.nrows(),
            $vec.len(),
            "Vector of length {} not aligned with {} matrix rows",
            $vec.len(),
            $matrix.nrows()
        );
    };
}

///////////////////
// Vector macros //
///////////////////

/// Assertion that all vectors have the same length.
#[macro_export]
macro_rules! assert_same_len {
    ($($vec:expr),+ $(,)?) => {
        {
            let lengths: Vec<usize> = vec![$($vec.len()),+];
            let first_len = lengths[0];

            if !lengths.iter().all(|&len| len == first_len) {
                panic!(
                    "Vectors have different lengths: {:?}",
                    lengths
                );
            }
        }
    };
}
