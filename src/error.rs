use thiserror::Error;

/// Errors surfaced by the selection-analytics engine.
///
/// Empty selections are not an error: the pipeline treats them as a quiescent
/// no-op and returns `Ok(None)` instead. Degenerate statistics (zero variance
/// in a correlation operand) are recovered locally by clamping to `0.0` and
/// never surface here either.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A subset index points past the end of the matrix it is applied to,
    /// typically a stale selection kept across a dataset reload.
    #[error("point index {index} out of range for {n_points} points")]
    IndexOutOfRange { index: usize, n_points: usize },

    /// Fewer filtered genes than requested clusters; clustering is
    /// impossible and no partial result is produced.
    #[error("cannot form {requested} clusters from {available} genes")]
    InsufficientGenes { available: usize, requested: usize },

    /// A caller-supplied parameter is unusable (zero cluster count, an axis
    /// the positions do not have, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two inputs that must agree in shape do not.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
