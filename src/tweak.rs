//! Bezier handle tweaking for reduced curves.
//!
//! After the kept frames are fixed, each segment between two neighbouring
//! keys is re-shaped as a cubic whose two inner control values are found
//! by brute-force grid search. The candidates for each control value run
//! from half the segment's frame span below zero to half above, in
//! `steps` even increments; the pair whose cubic stays closest (minimax)
//! to the original samples wins.
//!
//! Segments are independent, so they are searched in parallel. Within a
//! segment the scan order is fixed and the first minimum is kept, so the
//! result does not depend on threading.

use kurbo::{CubicBez, ParamCurve, Point};
use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::ncurve::Sample;

/// Default number of candidates per control value.
pub const DEFAULT_TWEAK_STEPS: usize = 40;

/// Best control values found for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFit {
    /// Control value next to the segment start.
    pub p1: f64,
    /// Control value next to the segment end.
    pub p2: f64,
    /// Max absolute deviation from the original samples.
    pub error: f64,
}

/// Tangent-handle values of one keyframe.
///
/// The first key has no incoming handle and the last key no outgoing
/// one; those stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchor {
    /// Incoming handle.
    pub p1: Option<f64>,
    /// Outgoing handle.
    pub p2: Option<f64>,
}

/// The segment cubic in (frame, value) space.
///
/// Control frames sit at the thirds of the span, which makes the frame
/// coordinate linear in `t`.
pub fn segment_cubic(start: Sample, end: Sample, p1: f64, p2: f64) -> CubicBez {
    let span = end.frame - start.frame;
    CubicBez::new(
        Point::new(start.frame, start.value),
        Point::new(start.frame + span / 3.0, p1),
        Point::new(start.frame + 2.0 * span / 3.0, p2),
        Point::new(end.frame, end.value),
    )
}

/// Cubic value at `frame`.
///
/// `t = (frame - start) / (end - start)`; a zero-length segment uses the
/// raw offset `frame - start` as `t`.
pub fn interpolation_at(frame: f64, start: Sample, end: Sample, p1: f64, p2: f64) -> f64 {
    let numer = frame - start.frame;
    let denom = end.frame - start.frame;
    let t = if denom != 0.0 { numer / denom } else { numer };
    segment_cubic(start, end, p1, p2).eval(t).y
}

/// Samples whose frame lies in `[start, end)`. `original` must be sorted
/// by frame.
fn samples_in(original: &[Sample], start: f64, end: f64) -> &[Sample] {
    let lo = original.partition_point(|s| s.frame < start);
    let hi = original.partition_point(|s| s.frame < end).max(lo);
    &original[lo..hi]
}

/// Worst absolute deviation between the cubic and the original samples
/// inside the segment.
pub fn interpolation_cost(original: &[Sample], start: Sample, end: Sample, p1: f64, p2: f64) -> f64 {
    samples_in(original, start.frame, end.frame)
        .iter()
        .map(|s| (s.value - interpolation_at(s.frame, start, end, p1, p2)).abs())
        .fold(0.0, f64::max)
}

/// Grid-search the control values of one segment.
pub fn fit_segment(original: &[Sample], start: Sample, end: Sample, steps: usize) -> SegmentFit {
    let inside = samples_in(original, start.frame, end.frame);
    let half = (end.frame - start.frame) / 2.0;
    let inc = half / (steps as f64 * 0.5);
    let candidate = |s: usize| -half + s as f64 * inc;

    let mut best = SegmentFit {
        p1: 0.0,
        p2: 0.0,
        error: f64::INFINITY,
    };
    for si in 0..steps {
        let p1 = candidate(si);
        for sj in 0..steps {
            let p2 = candidate(sj);
            let error = interpolation_cost(inside, start, end, p1, p2);
            if error < best.error {
                best = SegmentFit { p1, p2, error };
            }
        }
    }
    if !best.error.is_finite() {
        best.error = interpolation_cost(inside, start, end, best.p1, best.p2);
    }
    best
}

/// Fit every segment of `reduced` against `original`.
///
/// Returns one fit per consecutive pair of reduced keys.
pub fn fit_segments(
    original: &[Sample],
    reduced: &[Sample],
    steps: usize,
    parallel: bool,
    cancel: Option<&CancelToken>,
) -> Result<Vec<SegmentFit>> {
    let fit = |(m, pair): (usize, &[Sample])| -> Result<SegmentFit> {
        if let Some(token) = cancel {
            token.check()?;
        }
        let best = fit_segment(original, pair[0], pair[1], steps);
        debug!(segment = m, p1 = best.p1, p2 = best.p2, error = best.error, "segment fit");
        Ok(best)
    };
    if parallel {
        reduced.par_windows(2).enumerate().map(fit).collect()
    } else {
        reduced.windows(2).enumerate().map(fit).collect()
    }
}

/// Spread segment fits onto the keys they join.
///
/// For segment `m → m+1`, key `m` takes the fit's `p2` as its outgoing
/// handle and key `m+1` takes `p1` as its incoming handle.
pub fn anchors_from_fits(fits: &[SegmentFit]) -> Vec<Anchor> {
    if fits.is_empty() {
        return Vec::new();
    }
    let mut anchors = vec![Anchor::default(); fits.len() + 1];
    for (m, fit) in fits.iter().enumerate() {
        anchors[m].p2 = Some(fit.p2);
        anchors[m + 1].p1 = Some(fit.p1);
    }
    anchors
}
