//! Curve assembly: several 1-D sampled curves → one n-dimensional curve.
//!
//! Rather than scoring each curve on its own, every frame becomes one
//! point (a "pose") whose first coordinate is the frame index and whose
//! remaining coordinates are the curve values at that frame. Chord
//! distances measured in this space account for all curves at once.

use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};

/// One sampled value of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub frame: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(frame: f64, value: f64) -> Self {
        Self { frame, value }
    }
}

/// A multi-curve signal, one point per frame index.
///
/// Stored flat, row-major: point `k` occupies
/// `coords[k * dim .. (k + 1) * dim]` with `dim = n_curves + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct NCurve {
    coords: Vec<f64>,
    dim: usize,
    n_frames: usize,
}

impl NCurve {
    /// Build from per-curve value sequences, in curve order.
    ///
    /// Every sequence must have the same length; the first one sets the
    /// expected frame count.
    pub fn assemble<V: AsRef<[f64]>>(curves: &[V]) -> Result<Self> {
        let Some(first) = curves.first() else {
            return Err(ReduceError::InsufficientSamples(0));
        };
        let n_frames = first.as_ref().len();
        for (curve, values) in curves.iter().enumerate() {
            let found = values.as_ref().len();
            if found != n_frames {
                return Err(ReduceError::DimensionMismatch {
                    curve,
                    expected: n_frames,
                    found,
                });
            }
        }

        let dim = curves.len() + 1;
        let mut coords = vec![0.0; n_frames * dim];
        for (k, point) in coords.chunks_exact_mut(dim).enumerate() {
            point[0] = k as f64;
            for (c, values) in curves.iter().enumerate() {
                point[c + 1] = values.as_ref()[k];
            }
        }

        Ok(Self {
            coords,
            dim,
            n_frames,
        })
    }

    /// Build from `(frame, value)` sample sequences. Only the values are
    /// used; coordinate 0 is always the frame *index*.
    pub fn from_samples<S: AsRef<[Sample]>>(curves: &[S]) -> Result<Self> {
        let values: Vec<Vec<f64>> = curves
            .iter()
            .map(|c| c.as_ref().iter().map(|s| s.value).collect())
            .collect();
        Self::assemble(&values)
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn n_curves(&self) -> usize {
        self.dim - 1
    }

    /// Point dimension (`n_curves + 1`).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The point at frame index `k`.
    pub fn point(&self, k: usize) -> &[f64] {
        &self.coords[k * self.dim..(k + 1) * self.dim]
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        self.coords.chunks_exact(self.dim)
    }
}

/// The samples at `indices`, in the order given.
pub fn samples_at_indices(samples: &[Sample], indices: &[usize]) -> Result<Vec<Sample>> {
    indices
        .iter()
        .map(|&index| {
            samples.get(index).copied().ok_or(ReduceError::InvalidFrameIndex {
                index,
                n_frames: samples.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_indexed_samples() {
        let samples: Vec<Sample> = (0..5).map(|i| Sample::new(i as f64, i as f64 * 2.0)).collect();
        let kept = samples_at_indices(&samples, &[0, 3, 4]).unwrap();
        assert_eq!(kept, vec![samples[0], samples[3], samples[4]]);
        assert!(matches!(
            samples_at_indices(&samples, &[0, 5]),
            Err(ReduceError::InvalidFrameIndex { index: 5, n_frames: 5 })
        ));
    }

    #[test]
    fn frame_index_is_first_coordinate() {
        let curve = NCurve::assemble(&[vec![5.0, 6.0, 7.0], vec![-1.0, -2.0, -3.0]]).unwrap();
        assert_eq!(curve.n_frames(), 3);
        assert_eq!(curve.n_curves(), 2);
        assert_eq!(curve.point(0), &[0.0, 5.0, -1.0]);
        assert_eq!(curve.point(2), &[2.0, 7.0, -3.0]);
        assert_eq!(curve.points().count(), 3);
    }

    #[test]
    fn unequal_lengths_fail_fast() {
        let err = NCurve::assemble(&[vec![0.0; 4], vec![0.0; 3]]).unwrap_err();
        assert!(matches!(
            err,
            ReduceError::DimensionMismatch { curve: 1, expected: 4, found: 3 }
        ));
    }

    #[test]
    fn no_curves_is_insufficient() {
        let none: [Vec<f64>; 0] = [];
        assert!(matches!(
            NCurve::assemble(&none),
            Err(ReduceError::InsufficientSamples(0))
        ));
    }

    #[test]
    fn samples_use_index_not_frame_time() {
        let samples = vec![Sample::new(10.0, 1.0), Sample::new(12.0, 2.0)];
        let curve = NCurve::from_samples(&[samples]).unwrap();
        assert_eq!(curve.point(1), &[1.0, 2.0]);
    }
}
