use rustc_hash::FxHashSet;

use crate::error::{AnalysisError, Result};

/// Sentinel marking a wave boundary in a flood-fill result stream.
const WAVE_SENTINEL: f64 = -1.0;

//////////////////////////////
// ENUMS, TYPES, STRUCTURES //
//////////////////////////////

/// An ordered set of selected point indices with a parallel wave ordinal per
/// index.
///
/// Wave numbers are positive and inverted relative to the flood-fill order:
/// the seed region carries the highest value, the farthest wave carries 1.
/// Indices are unique; both sequences always have equal length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveSubset {
    indices: Vec<usize>,
    waves: Vec<u32>,
}

/// For sliced 3D data, the intersection of an [`ActiveSubset`] with the
/// currently visible slice.
#[derive(Clone, Debug)]
pub struct SliceRestriction {
    on_slice_indices: Vec<usize>,
    on_slice_active: Vec<usize>,
    on_slice_waves: Vec<u32>,
    is_active_on_slice: Vec<bool>,
}

///////////////
// Functions //
///////////////

impl ActiveSubset {
    /// The empty selection. Downstream stages treat it as "nothing selected".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode a flood-fill result stream into an active subset.
    ///
    /// The stream holds per-point scalars in flood order. Every sentinel
    /// (`-1`) increments the wave counter; every other value is a point index
    /// belonging to the current wave. After the scan the wave numbers are
    /// inverted so the seed region receives the highest value and the
    /// farthest wave receives 1. Duplicate point indices keep their first
    /// occurrence.
    ///
    /// An invalid stream (non-finite entries, negative non-sentinel values,
    /// fractional values, indices beyond the point count) yields the empty
    /// subset rather than an error, matching the "nothing selected"
    /// quiescent behaviour.
    ///
    /// ### Params
    ///
    /// * `stream` - The flood-fill scalar stream.
    /// * `n_points` - Number of points in the dataset.
    ///
    /// ### Returns
    ///
    /// The decoded subset, empty when the stream is invalid.
    pub fn from_flood_fill(stream: &[f64], n_points: usize) -> Self {
        let mut raw: Vec<(usize, u32)> = Vec::with_capacity(stream.len());
        let mut seen = FxHashSet::default();
        let mut wave = 0_u32;

        for &value in stream {
            if value == WAVE_SENTINEL {
                wave += 1;
                continue;
            }
            if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                return Self::empty();
            }
            let index = value as usize;
            if index >= n_points {
                return Self::empty();
            }
            if seen.insert(index) {
                raw.push((index, wave));
            }
        }

        // Invert over the waves that actually hold points, so trailing
        // sentinels do not shift the values.
        let max_wave = raw.iter().map(|&(_, wave)| wave).max().unwrap_or(0);
        let (indices, waves) = raw
            .into_iter()
            .map(|(index, wave)| (index, max_wave + 1 - wave))
            .unzip();

        Self { indices, waves }
    }

    /// Build a subset from an explicit point selection.
    ///
    /// Every selected point receives the uniform wave number 1; a plain
    /// selection carries no distance ordering. Duplicates keep their first
    /// occurrence.
    ///
    /// ### Params
    ///
    /// * `selected` - The selected point indices.
    /// * `n_points` - Number of points in the dataset.
    ///
    /// ### Returns
    ///
    /// The subset, or `IndexOutOfRange` when a selected index does not fit
    /// the dataset.
    pub fn from_point_selection(selected: &[usize], n_points: usize) -> Result<Self> {
        let mut indices = Vec::with_capacity(selected.len());
        let mut seen = FxHashSet::default();
        for &index in selected {
            if index >= n_points {
                return Err(AnalysisError::IndexOutOfRange { index, n_points });
            }
            if seen.insert(index) {
                indices.push(index);
            }
        }

        let waves = vec![1; indices.len()];
        Ok(Self { indices, waves })
    }

    /// Number of selected points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The selected point indices, in selection order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The inverted wave numbers, aligned with the indices.
    pub fn waves(&self) -> &[u32] {
        &self.waves
    }

    /// Check the subset against the current point count.
    ///
    /// Guards against a stale subset held across a dataset swap; the
    /// constructors already reject out-of-range indices at build time.
    pub fn validate_against(&self, n_points: usize) -> Result<()> {
        for &index in &self.indices {
            if index >= n_points {
                return Err(AnalysisError::IndexOutOfRange { index, n_points });
            }
        }
        Ok(())
    }
}

impl SliceRestriction {
    /// Intersect an active subset with the visible slice's point-index set.
    ///
    /// Recomputed whenever the slice changes, independent of subset changes.
    ///
    /// ### Params
    ///
    /// * `subset` - The current active subset.
    /// * `on_slice_indices` - Point indices belonging to the visible slice.
    ///
    /// ### Returns
    ///
    /// The restriction, with a membership mask aligned to the slice indices
    /// and the intersected actives keeping their wave numbers.
    pub fn new(subset: &ActiveSubset, on_slice_indices: Vec<usize>) -> Self {
        let slice_set: FxHashSet<usize> = on_slice_indices.iter().copied().collect();
        let active_set: FxHashSet<usize> = subset.indices.iter().copied().collect();

        let is_active_on_slice = on_slice_indices
            .iter()
            .map(|index| active_set.contains(index))
            .collect();

        let mut on_slice_active = Vec::new();
        let mut on_slice_waves = Vec::new();
        for (&index, &wave) in subset.indices.iter().zip(subset.waves.iter()) {
            if slice_set.contains(&index) {
                on_slice_active.push(index);
                on_slice_waves.push(wave);
            }
        }

        Self {
            on_slice_indices,
            on_slice_active,
            on_slice_waves,
            is_active_on_slice,
        }
    }

    /// The visible slice's point indices.
    pub fn on_slice_indices(&self) -> &[usize] {
        &self.on_slice_indices
    }

    /// Membership mask aligned to [`Self::on_slice_indices`].
    pub fn membership_mask(&self) -> &[bool] {
        &self.is_active_on_slice
    }

    /// The intersected actives as a subset of their own, waves preserved.
    ///
    /// This is what the pipeline consumes when a slice is visible.
    pub fn restricted_subset(&self) -> ActiveSubset {
        ActiveSubset {
            indices: self.on_slice_active.clone(),
            waves: self.on_slice_waves.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flood_fill_decode_inverts_waves() {
        let stream = [-1.0, 5.0, 7.0, -1.0, 2.0];
        let subset = ActiveSubset::from_flood_fill(&stream, 10);

        assert_eq!(subset.indices(), &[5, 7, 2]);
        // Farthest wave at 1, seed-adjacent wave at the highest value.
        assert_eq!(subset.waves(), &[2, 2, 1]);
    }

    #[test]
    fn test_flood_fill_invalid_streams_yield_empty() {
        assert!(ActiveSubset::from_flood_fill(&[-1.0, f64::NAN], 10).is_empty());
        assert!(ActiveSubset::from_flood_fill(&[-1.0, -2.0], 10).is_empty());
        assert!(ActiveSubset::from_flood_fill(&[-1.0, 3.5], 10).is_empty());
        assert!(ActiveSubset::from_flood_fill(&[-1.0, 12.0], 10).is_empty());
        assert!(ActiveSubset::from_flood_fill(&[], 10).is_empty());
    }

    #[test]
    fn test_flood_fill_without_sentinel_is_uniform() {
        let subset = ActiveSubset::from_flood_fill(&[0.0, 3.0], 5);
        assert_eq!(subset.indices(), &[0, 3]);
        assert_eq!(subset.waves(), &[1, 1]);
    }

    #[test]
    fn test_flood_fill_duplicates_keep_first_wave() {
        let stream = [-1.0, 4.0, -1.0, 4.0, 1.0];
        let subset = ActiveSubset::from_flood_fill(&stream, 6);

        assert_eq!(subset.indices(), &[4, 1]);
        assert_eq!(subset.waves(), &[2, 1]);
    }

    #[test]
    fn test_point_selection_uniform_wave_and_dedup() {
        let subset = ActiveSubset::from_point_selection(&[3, 1, 3], 5).unwrap();
        assert_eq!(subset.indices(), &[3, 1]);
        assert_eq!(subset.waves(), &[1, 1]);

        let stale = ActiveSubset::from_point_selection(&[3, 9], 5);
        assert!(matches!(
            stale,
            Err(AnalysisError::IndexOutOfRange {
                index: 9,
                n_points: 5
            })
        ));
    }

    #[test]
    fn test_validate_against_detects_stale_subset() {
        let subset = ActiveSubset::from_point_selection(&[0, 8], 10).unwrap();
        assert!(subset.validate_against(10).is_ok());
        assert!(matches!(
            subset.validate_against(5),
            Err(AnalysisError::IndexOutOfRange {
                index: 8,
                n_points: 5
            })
        ));
    }

    #[test]
    fn test_slice_restriction_preserves_waves() {
        let stream = [-1.0, 5.0, 7.0, -1.0, 2.0];
        let subset = ActiveSubset::from_flood_fill(&stream, 10);
        let restriction = SliceRestriction::new(&subset, vec![2, 3, 5]);

        assert_eq!(restriction.on_slice_indices(), &[2, 3, 5]);
        assert_eq!(restriction.membership_mask(), &[true, false, true]);

        let restricted = restriction.restricted_subset();
        assert_eq!(restricted.indices(), &[5, 2]);
        assert_eq!(restricted.waves(), &[2, 1]);
    }
}
