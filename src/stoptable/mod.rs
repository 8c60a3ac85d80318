//! Optimal keyframe placement via dynamic programming over stop tables.
//!
//! A stop table holds, for every frame pair `(i, j)` with `i < j`, the
//! best path from `i` to `j` using a fixed number of kept frames, and
//! that path's cost: the worst chord deviation of any of its segments.
//!
//! ## Algorithm
//!
//! 1. **Zero-stop table** (`StopTable::zero`) — every cell is the direct
//!    chord `[i, j]`, costing `segment_cost(i, j)`.
//! 2. **Recurrence** (`fill_step`) — each step inserts one more stop:
//!
//!    ```text
//!    N'[i][j] = min over i < k < j of max(N[i][k].cost, Z[k][j].cost)
//!    ```
//!
//!    `N[i][k]` is only valid once `k` leaves room for the stops it
//!    already holds, so step `n` fills the cells with `j >= i + n + 2`.
//! 3. **Termination** — after `n_stops - 2` steps, cell `[0][n_frames-1]`
//!    holds the best `n_stops`-frame path across the whole curve.
//!
//! The cost is a bottleneck (max), not a sum: the result minimizes the
//! single worst visual error along the curve. Each step costs
//! O(n_frames³); cells within a step are independent and are computed in
//! parallel rows. The `k` scan inside a cell stays sequential and keeps
//! the first minimum, so parallel and sequential runs agree exactly.

mod path;

pub use path::StopPath;

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::cost::segment_cost;
use crate::error::{ReduceError, Result};
use crate::ncurve::NCurve;

/// One stop-table cell.
#[derive(Debug, Clone)]
pub struct NStop {
    /// Worst segment cost along `path`; infinite while unset.
    pub cost: f64,
    /// Number of frames in `path`, endpoints included. 0 means unset.
    pub stop_count: usize,
    pub path: StopPath,
}

impl NStop {
    pub fn unset() -> Self {
        Self {
            cost: f64::INFINITY,
            stop_count: 0,
            path: StopPath::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.stop_count > 0
    }
}

/// Square `n_frames × n_frames` table, row = start frame, column = end frame.
#[derive(Debug, Clone)]
pub struct StopTable {
    n_frames: usize,
    cells: Vec<NStop>,
}

impl StopTable {
    /// A table with every cell unset.
    pub fn new(n_frames: usize) -> Self {
        Self {
            n_frames,
            cells: vec![NStop::unset(); n_frames * n_frames],
        }
    }

    /// The zero-stop table: every `i < j` cell is the bare chord `[i, j]`.
    pub fn zero(curve: &NCurve, parallel: bool) -> Self {
        let n_frames = curve.n_frames();
        let mut table = Self::new(n_frames);
        if n_frames == 0 {
            return table;
        }
        let fill = |(i, row): (usize, &mut [NStop])| {
            for (j, cell) in row.iter_mut().enumerate().skip(i + 1) {
                *cell = NStop {
                    cost: segment_cost(curve, i, j),
                    stop_count: 2,
                    path: StopPath::pair(i, j),
                };
            }
        };
        if parallel {
            table.cells.par_chunks_mut(n_frames).enumerate().for_each(fill);
        } else {
            table.cells.chunks_mut(n_frames).enumerate().for_each(fill);
        }
        table
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn get(&self, start: usize, end: usize) -> &NStop {
        &self.cells[start * self.n_frames + end]
    }
}

/// Derive step `n + 1` of the recurrence from `current` (step `n`) into
/// `next`, overwriting every cell of `next`.
fn fill_step(n: usize, current: &StopTable, zero: &StopTable, next: &mut StopTable, parallel: bool) {
    let n_frames = current.n_frames;
    let fill = |(i, row): (usize, &mut [NStop])| {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = if j >= i + n + 2 {
                best_split(current, zero, i, j)
            } else {
                NStop::unset()
            };
        }
    };
    if parallel {
        next.cells.par_chunks_mut(n_frames).enumerate().for_each(fill);
    } else {
        next.cells.chunks_mut(n_frames).enumerate().for_each(fill);
    }
}

/// Best last stop `k` before `j` on a path starting at `i`.
///
/// Strict `<` keeps the first `k` on ties.
fn best_split(current: &StopTable, zero: &StopTable, i: usize, j: usize) -> NStop {
    let mut best: Option<(f64, &NStop)> = None;
    for k in (i + 1)..j {
        let head = current.get(i, k);
        if !head.is_set() {
            continue;
        }
        let cost = head.cost.max(zero.get(k, j).cost);
        if best.map_or(true, |(best_cost, _)| cost < best_cost) {
            best = Some((cost, head));
        }
    }
    match best {
        Some((cost, head)) => NStop {
            cost,
            stop_count: head.stop_count + 1,
            path: head.path.append(j),
        },
        None => NStop::unset(),
    }
}

/// The chosen frame indices and their worst segment cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Ascending frame indices, first `0`, last `n_frames - 1`.
    pub indices: Vec<usize>,
    /// Worst chord deviation over all segments of `indices`, measured on
    /// the curve the search ran on. With `FrameSource::RoughestCurve` that
    /// is the roughest curve alone, not every curve.
    pub cost: f64,
}

/// Check that `n_stops` keys can be placed on `n_frames` frames.
pub fn validate(n_frames: usize, n_stops: usize) -> Result<()> {
    if n_frames < 2 {
        return Err(ReduceError::InsufficientSamples(n_frames));
    }
    if n_stops < 2 || n_stops > n_frames {
        return Err(ReduceError::InvalidStopCount { n_stops, n_frames });
    }
    Ok(())
}

/// Find the `n_stops` frames (ends included) with the lowest worst-case
/// chord deviation over `curve`.
///
/// Runs the recurrence as an explicit loop of `n_stops - 2` steps,
/// recycling two tables. `cancel` is polled before each step.
pub fn best_path(
    curve: &NCurve,
    n_stops: usize,
    parallel: bool,
    cancel: Option<&CancelToken>,
) -> Result<Reduction> {
    let n_frames = curve.n_frames();
    validate(n_frames, n_stops)?;

    let zero = StopTable::zero(curve, parallel);
    let last = n_frames - 1;
    let steps = n_stops - 2;

    let mut current = StopTable::new(n_frames);
    let mut next = StopTable::new(n_frames);
    for n in 0..steps {
        if let Some(token) = cancel {
            token.check()?;
        }
        let source = if n == 0 { &zero } else { &current };
        fill_step(n, source, &zero, &mut next, parallel);
        std::mem::swap(&mut current, &mut next);
        debug!(
            stops = n + 3,
            cost = current.get(0, last).cost,
            "stop table step"
        );
    }

    let cell = if steps == 0 {
        zero.get(0, last)
    } else {
        current.get(0, last)
    };
    debug_assert_eq!(cell.stop_count, n_stops);

    Ok(Reduction {
        indices: cell.path.to_vec(),
        cost: cell.cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(values: &[f64]) -> NCurve {
        NCurve::assemble(&[values.to_vec()]).unwrap()
    }

    fn sine(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.4).sin() * 5.0).collect()
    }

    #[test]
    fn zigzag_three_keys() {
        let c = curve(&[0.0, 10.0, 0.0, 10.0, 0.0]);
        let r = best_path(&c, 3, false, None).unwrap();
        // Splitting at the middle leaves two 10-high chords; splitting at
        // frame 1 or 3 leaves one sloped chord at 20/sqrt(109).
        let expected = 20.0 / 109f64.sqrt();
        assert!((r.cost - expected).abs() < 1e-12, "cost {}", r.cost);
        assert!(
            r.indices == vec![0, 1, 4] || r.indices == vec![0, 3, 4],
            "got {:?}",
            r.indices
        );
    }

    #[test]
    fn zigzag_two_keys_is_the_full_chord() {
        let c = curve(&[0.0, 10.0, 0.0, 10.0, 0.0]);
        let r = best_path(&c, 2, false, None).unwrap();
        assert_eq!(r.indices, vec![0, 4]);
        assert!((r.cost - 10.0).abs() < 1e-12);
    }

    #[test]
    fn linear_curve_needs_only_endpoints() {
        let values: Vec<f64> = (0..17).map(|i| 3.0 * i as f64 - 2.0).collect();
        let r = best_path(&curve(&values), 2, true, None).unwrap();
        assert_eq!(r.indices, vec![0, 16]);
        assert!(r.cost.abs() < 1e-9);
    }

    #[test]
    fn all_keys_is_identity() {
        let values = sine(9);
        let r = best_path(&curve(&values), 9, false, None).unwrap();
        assert_eq!(r.indices, (0..9).collect::<Vec<_>>());
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn path_shape_invariants() {
        let values = sine(24);
        let c = curve(&values);
        for n_stops in 2..=10 {
            let r = best_path(&c, n_stops, true, None).unwrap();
            assert_eq!(r.indices.len(), n_stops);
            assert_eq!(r.indices[0], 0);
            assert_eq!(*r.indices.last().unwrap(), 23);
            assert!(r.indices.windows(2).all(|w| w[0] < w[1]), "{:?}", r.indices);
            let recomputed = crate::cost::path_cost(&c, &r.indices);
            assert!((recomputed - r.cost).abs() < 1e-12);
        }
    }

    #[test]
    fn more_keys_never_cost_more() {
        // Gentle convex curve: splitting any segment can only lower its cost.
        let values: Vec<f64> = (0..21).map(|x| 0.01 * ((x - 10) * (x - 10)) as f64).collect();
        let c = curve(&values);
        let mut last = f64::INFINITY;
        for n_stops in 2..=8 {
            let r = best_path(&c, n_stops, false, None).unwrap();
            assert!(r.cost <= last + 1e-12, "{n_stops} keys: {} > {last}", r.cost);
            last = r.cost;
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let a = sine(30);
        let b: Vec<f64> = (0..30).map(|i| (i as f64 * 0.25).cos() * 3.0).collect();
        let c = NCurve::assemble(&[a, b]).unwrap();
        for n_stops in [2, 4, 7] {
            let seq = best_path(&c, n_stops, false, None).unwrap();
            let par = best_path(&c, n_stops, true, None).unwrap();
            assert_eq!(seq, par);
        }
    }

    #[test]
    fn rejects_bad_stop_counts() {
        let c = curve(&[0.0, 1.0, 2.0]);
        assert!(matches!(
            best_path(&c, 4, false, None),
            Err(ReduceError::InvalidStopCount { n_stops: 4, n_frames: 3 })
        ));
        assert!(matches!(
            best_path(&c, 1, false, None),
            Err(ReduceError::InvalidStopCount { .. })
        ));
        assert!(matches!(
            best_path(&curve(&[1.0]), 2, false, None),
            Err(ReduceError::InsufficientSamples(1))
        ));
    }

    #[test]
    fn cancelled_before_first_step() {
        let token = CancelToken::new();
        token.cancel();
        let c = curve(&sine(12));
        assert!(matches!(
            best_path(&c, 5, false, Some(&token)),
            Err(ReduceError::Cancelled)
        ));
        // Two keys never enter the recurrence.
        assert!(best_path(&c, 2, false, Some(&token)).is_ok());
    }

    #[test]
    fn zero_table_cells() {
        let c = curve(&[0.0, 10.0, 0.0, 10.0, 0.0]);
        let z = StopTable::zero(&c, false);
        assert_eq!(z.n_frames(), 5);
        let cell = z.get(1, 3);
        assert_eq!(cell.stop_count, 2);
        assert_eq!(cell.path.to_vec(), vec![1, 3]);
        assert!(!z.get(3, 1).is_set());
        assert!(!z.get(2, 2).is_set());
    }
}
