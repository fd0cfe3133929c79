use faer::{Mat, MatRef};
use rustc_hash::FxHashMap;

use crate::error::{AnalysisError, Result};

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// How the rows of the expression matrix relate to the spatial points.
#[derive(Clone, Debug)]
pub enum RowUnit {
    /// Rows correspond one-to-one to spatial points.
    Points,
    /// Rows are cell-type pseudo-bulk profiles. Every point carries a label
    /// index selecting its profile row, and per-label population counts over
    /// the whole dataset re-weight global means.
    PseudoBulk {
        /// Per point, the profile row it belongs to.
        point_labels: Vec<usize>,
        /// Names of the kept labels, aligned with the profile rows.
        label_names: Vec<String>,
        /// Per label, the number of points carrying it across the dataset.
        counts_all: Vec<f64>,
    },
}

#[derive(Clone, Debug)]
struct ProjectionCache {
    dims: (usize, usize),
    coords: Mat<f32>,
}

/// Long-lived owner of the expression matrix, the gene-name ordering and the
/// point positions.
///
/// The store is the single shared, read-only dependency of every pipeline
/// stage; it hands out views instead of copies. The matrix is immutable once
/// built and replaced wholesale when the source dataset changes.
#[derive(Clone, Debug)]
pub struct MatrixStore {
    expr: Mat<f32>,
    gene_names: Vec<String>,
    gene_index: FxHashMap<String, usize>,
    positions: Mat<f64>,
    unit: RowUnit,
    projection: Option<ProjectionCache>,
}

//////////////////
// Construction //
//////////////////

impl MatrixStore {
    /// Build a store whose expression rows are the spatial points themselves.
    ///
    /// ### Params
    ///
    /// * `expr` - Points x genes expression matrix.
    /// * `gene_names` - Unique gene names, aligned with the matrix columns.
    /// * `positions` - Points x axes coordinates (2 or 3 axes).
    ///
    /// ### Returns
    ///
    /// The store, or a shape/parameter error.
    pub fn from_points(
        expr: Mat<f32>,
        gene_names: Vec<String>,
        positions: Mat<f64>,
    ) -> Result<Self> {
        let gene_index = Self::validate_common(&expr, &gene_names, &positions)?;
        if expr.nrows() != positions.nrows() {
            return Err(AnalysisError::ShapeMismatch(format!(
                "{} expression rows for {} points",
                expr.nrows(),
                positions.nrows()
            )));
        }

        Ok(Self {
            expr,
            gene_names,
            gene_index,
            positions,
            unit: RowUnit::Points,
            projection: None,
        })
    }

    /// Build a store over cell-type pseudo-bulk profiles.
    ///
    /// The expression rows are merged profiles rather than points; each point
    /// maps into the profile rows through `point_labels`. Per-label
    /// population counts across the dataset are derived here once.
    ///
    /// ### Params
    ///
    /// * `profiles` - Labels x genes pseudo-bulk expression matrix.
    /// * `gene_names` - Unique gene names, aligned with the matrix columns.
    /// * `label_names` - Label names, aligned with the profile rows.
    /// * `point_labels` - Per point, the profile row it belongs to.
    /// * `positions` - Points x axes coordinates (2 or 3 axes).
    ///
    /// ### Returns
    ///
    /// The store, or a shape/parameter error.
    pub fn from_pseudobulk(
        profiles: Mat<f32>,
        gene_names: Vec<String>,
        label_names: Vec<String>,
        point_labels: Vec<usize>,
        positions: Mat<f64>,
    ) -> Result<Self> {
        let gene_index = Self::validate_common(&profiles, &gene_names, &positions)?;
        if label_names.len() != profiles.nrows() {
            return Err(AnalysisError::ShapeMismatch(format!(
                "{} label names for {} profile rows",
                label_names.len(),
                profiles.nrows()
            )));
        }
        if point_labels.len() != positions.nrows() {
            return Err(AnalysisError::ShapeMismatch(format!(
                "{} point labels for {} points",
                point_labels.len(),
                positions.nrows()
            )));
        }

        let n_labels = profiles.nrows();
        let mut counts_all = vec![0.0_f64; n_labels];
        for (point, &label) in point_labels.iter().enumerate() {
            if label >= n_labels {
                return Err(AnalysisError::InvalidParameter(format!(
                    "point {point} carries label {label}, only {n_labels} profiles available"
                )));
            }
            counts_all[label] += 1.0;
        }

        Ok(Self {
            expr: profiles,
            gene_names,
            gene_index,
            positions,
            unit: RowUnit::PseudoBulk {
                point_labels,
                label_names,
                counts_all,
            },
            projection: None,
        })
    }

    fn validate_common(
        expr: &Mat<f32>,
        gene_names: &[String],
        positions: &Mat<f64>,
    ) -> Result<FxHashMap<String, usize>> {
        if expr.nrows() == 0 || expr.ncols() == 0 {
            return Err(AnalysisError::InvalidParameter(
                "expression matrix must have at least one row and one gene".into(),
            ));
        }
        if positions.nrows() == 0 {
            return Err(AnalysisError::InvalidParameter(
                "at least one point position required".into(),
            ));
        }
        if gene_names.len() != expr.ncols() {
            return Err(AnalysisError::ShapeMismatch(format!(
                "{} gene names for {} matrix columns",
                gene_names.len(),
                expr.ncols()
            )));
        }
        let n_axes = positions.ncols();
        if !(2..=3).contains(&n_axes) {
            return Err(AnalysisError::InvalidParameter(format!(
                "positions need 2 or 3 coordinate axes, got {n_axes}"
            )));
        }

        let mut gene_index = FxHashMap::default();
        for (column, name) in gene_names.iter().enumerate() {
            if gene_index.insert(name.clone(), column).is_some() {
                return Err(AnalysisError::InvalidParameter(format!(
                    "duplicate gene name '{name}'"
                )));
            }
        }
        Ok(gene_index)
    }
}

///////////////
// Accessors //
///////////////

impl MatrixStore {
    /// Number of spatial points.
    pub fn n_points(&self) -> usize {
        self.positions.nrows()
    }

    /// Number of enabled genes (matrix columns).
    pub fn n_genes(&self) -> usize {
        self.expr.ncols()
    }

    /// Number of expression rows (points, or profiles in pseudo-bulk mode).
    pub fn n_rows(&self) -> usize {
        self.expr.nrows()
    }

    /// Number of coordinate axes (2 or 3).
    pub fn n_axes(&self) -> usize {
        self.positions.ncols()
    }

    /// Read-only view of the expression matrix.
    pub fn expression(&self) -> MatRef<'_, f32> {
        self.expr.as_ref()
    }

    /// Read-only view of the point positions.
    pub fn positions(&self) -> MatRef<'_, f64> {
        self.positions.as_ref()
    }

    /// The gene names in column order.
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// Column index of a gene name, if present.
    pub fn gene_column(&self, name: &str) -> Option<usize> {
        self.gene_index.get(name).copied()
    }

    /// How the expression rows relate to the points.
    pub fn unit(&self) -> &RowUnit {
        &self.unit
    }

    /// Whether the rows are pseudo-bulk profiles.
    pub fn is_pseudobulk(&self) -> bool {
        matches!(self.unit, RowUnit::PseudoBulk { .. })
    }
}

/////////////////
// Projections //
/////////////////

impl MatrixStore {
    /// Two-column plotting projection over the selected dimension pair.
    ///
    /// The projection is cached and only rebuilt when the dimension pair
    /// changes; repeated calls with the same pair return the cached copy.
    ///
    /// ### Params
    ///
    /// * `dims` - The two expression columns to project onto.
    ///
    /// ### Returns
    ///
    /// Rows x 2 view of the projected values.
    pub fn projection(&mut self, dims: (usize, usize)) -> Result<MatRef<'_, f32>> {
        let n_genes = self.n_genes();
        for dim in [dims.0, dims.1] {
            if dim >= n_genes {
                return Err(AnalysisError::InvalidParameter(format!(
                    "projection dimension {dim} out of range for {n_genes} genes"
                )));
            }
        }

        let cache = match self.projection.take() {
            Some(cache) if cache.dims == dims => cache,
            _ => ProjectionCache {
                dims,
                coords: self.build_projection(dims),
            },
        };
        Ok(self.projection.insert(cache).coords.as_ref())
    }

    fn build_projection(&self, dims: (usize, usize)) -> Mat<f32> {
        Mat::from_fn(self.expr.nrows(), 2, |i, j| {
            let column = if j == 0 { dims.0 } else { dims.1 };
            self.expr[(i, column)]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn point_store() -> MatrixStore {
        let expr = mat![
            [1.0_f32, 5.0, 9.0],
            [2.0, 6.0, 10.0],
            [3.0, 7.0, 11.0],
            [4.0, 8.0, 12.0]
        ];
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let positions = mat![[0.0_f64, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        MatrixStore::from_points(expr, names, positions).unwrap()
    }

    #[test]
    fn test_point_store_accessors() {
        let store = point_store();
        assert_eq!(store.n_points(), 4);
        assert_eq!(store.n_genes(), 3);
        assert_eq!(store.n_rows(), 4);
        assert_eq!(store.n_axes(), 2);
        assert!(!store.is_pseudobulk());
        assert_eq!(store.gene_column("b"), Some(1));
        assert_eq!(store.gene_column("missing"), None);
    }

    #[test]
    fn test_construction_rejects_bad_shapes() {
        let expr = mat![[1.0_f32, 2.0], [3.0, 4.0]];
        let positions = mat![[0.0_f64, 0.0], [1.0, 0.0]];

        let too_few_names = MatrixStore::from_points(
            expr.clone(),
            vec!["a".to_string()],
            positions.clone(),
        );
        assert!(matches!(
            too_few_names,
            Err(AnalysisError::ShapeMismatch(_))
        ));

        let duplicate_names = MatrixStore::from_points(
            expr.clone(),
            vec!["a".to_string(), "a".to_string()],
            positions.clone(),
        );
        assert!(matches!(
            duplicate_names,
            Err(AnalysisError::InvalidParameter(_))
        ));

        let wrong_points = MatrixStore::from_points(
            expr,
            vec!["a".to_string(), "b".to_string()],
            mat![[0.0_f64, 0.0]],
        );
        assert!(matches!(wrong_points, Err(AnalysisError::ShapeMismatch(_))));
    }

    #[test]
    fn test_pseudobulk_counts_all() {
        let profiles = mat![[1.0_f32, 2.0], [3.0, 4.0]];
        let store = MatrixStore::from_pseudobulk(
            profiles,
            vec!["a".to_string(), "b".to_string()],
            vec!["t0".to_string(), "t1".to_string()],
            vec![0, 1, 1, 0, 1],
            mat![
                [0.0_f64, 0.0],
                [1.0, 0.0],
                [2.0, 0.0],
                [3.0, 0.0],
                [4.0, 0.0]
            ],
        )
        .unwrap();

        assert!(store.is_pseudobulk());
        assert_eq!(store.n_points(), 5);
        assert_eq!(store.n_rows(), 2);
        match store.unit() {
            RowUnit::PseudoBulk { counts_all, .. } => {
                assert_eq!(counts_all, &vec![2.0, 3.0]);
            }
            RowUnit::Points => panic!("expected pseudo-bulk unit"),
        }
    }

    #[test]
    fn test_pseudobulk_rejects_label_out_of_range() {
        let profiles = mat![[1.0_f32, 2.0], [3.0, 4.0]];
        let res = MatrixStore::from_pseudobulk(
            profiles,
            vec!["a".to_string(), "b".to_string()],
            vec!["t0".to_string(), "t1".to_string()],
            vec![0, 2],
            mat![[0.0_f64, 0.0], [1.0, 0.0]],
        );
        assert!(matches!(res, Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn test_projection_rebuilds_on_dimension_change() {
        let mut store = point_store();

        let first = store.projection((0, 1)).unwrap();
        assert_eq!(first.ncols(), 2);
        assert_eq!(first[(0, 0)], 1.0);
        assert_eq!(first[(0, 1)], 5.0);

        let swapped = store.projection((2, 0)).unwrap();
        assert_eq!(swapped[(1, 0)], 10.0);
        assert_eq!(swapped[(1, 1)], 2.0);

        let cached = store.projection((2, 0)).unwrap();
        assert_eq!(cached[(3, 0)], 12.0);

        let bad = store.projection((0, 7));
        assert!(matches!(bad, Err(AnalysisError::InvalidParameter(_))));
    }
}
