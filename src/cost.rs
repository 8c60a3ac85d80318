//! Cost analysis for a proposed reduction.
//!
//! A reduction is a chain of segments, each running between two kept
//! frames. A segment's cost is the largest perpendicular distance from
//! any dropped sample to the chord joining its two ends; a reduction
//! costs as much as its worst segment.

use crate::geom::line_to_point_dist;
use crate::ncurve::NCurve;

/// Max chord distance over the interior frames of `[start, end]`.
///
/// Returns 0 when there are no interior frames.
pub fn segment_cost(curve: &NCurve, start: usize, end: usize) -> f64 {
    debug_assert!(start < end && end < curve.n_frames());
    let q1 = curve.point(start);
    let q2 = curve.point(end);
    ((start + 1)..end)
        .map(|k| line_to_point_dist(curve.point(k), q1, q2))
        .fold(0.0, f64::max)
}

/// Worst segment cost of a whole path of kept frame indices.
pub fn path_cost(curve: &NCurve, path: &[usize]) -> f64 {
    path.windows(2)
        .map(|w| segment_cost(curve, w[0], w[1]))
        .fold(0.0, f64::max)
}

/// Total roughness of a value sequence: the summed magnitude of the
/// discrete second derivative, `Σ |v[i+2] - 2·v[i+1] + v[i]|`.
pub fn roughness(values: &[f64]) -> f64 {
    values
        .windows(3)
        .map(|w| (w[2] - 2.0 * w[1] + w[0]).abs())
        .sum()
}
