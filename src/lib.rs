//! keyreduce: dense animation samples → a few well-placed keyframes.
//!
//! Picks exactly `n_stops` frames (first and last included) so that the
//! worst chord deviation from the original samples is as small as
//! possible, then re-fits cubic handles on every kept segment.
//!
//! # Example
//!
//! ```
//! use keyreduce::{pick_best_frames, reduce, store::{Channel, MemoryStore}, ReductionConfig};
//!
//! let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.3).sin()).collect();
//! let frames = pick_best_frames(&[values.clone()], 6)?;
//! assert_eq!(frames.len(), 6);
//!
//! let mut store = MemoryStore::new(vec![Channel::from_values("rot.z", &values)]);
//! let config = ReductionConfig { n_stops: 6, ..ReductionConfig::default() };
//! let result = reduce(&mut store, &config, None)?;
//! assert_eq!(store.channels[0].keys.len(), 6);
//! assert_eq!(result.reduction.indices, frames);
//! # Ok::<(), keyreduce::ReduceError>(())
//! ```

#![forbid(unsafe_code)]

mod cancel;
mod config;
mod geom;

pub mod cost;
pub mod error;
pub mod export;
pub mod ncurve;
pub mod stoptable;
pub mod store;
pub mod tweak;

// Re-export kurbo so downstream users get the same version
// used by export::channel_path.
pub use kurbo;

pub use cancel::CancelToken;
pub use config::{FrameSource, ReductionConfig};
pub use error::{ReduceError, Result};
pub use ncurve::{NCurve, Sample};
pub use stoptable::Reduction;
pub use store::CurveStore;
pub use tweak::{Anchor, SegmentFit};

use std::time::Instant;

use tracing::{debug, info};

use cost::roughness;
use ncurve::samples_at_indices;

/// Best `n_stops` frame indices for a set of equal-length value curves,
/// measured jointly as one n-dimensional curve.
pub fn pick_best_frames<V: AsRef<[f64]>>(curves: &[V], n_stops: usize) -> Result<Vec<usize>> {
    let config = ReductionConfig {
        n_stops,
        ..ReductionConfig::default()
    };
    Ok(pick_frames(curves, &config, None)?.indices)
}

/// Placement with full control: frame source, threading, cancellation.
///
/// The returned cost is measured on whichever curves drove placement:
/// all of them jointly, or only the roughest one.
pub fn pick_frames<V: AsRef<[f64]>>(
    curves: &[V],
    config: &ReductionConfig,
    cancel: Option<&CancelToken>,
) -> Result<Reduction> {
    let t_start = Instant::now();

    let curve = match config.frame_source {
        FrameSource::AllCurves => NCurve::assemble(curves)?,
        FrameSource::RoughestCurve => {
            // Still check all lengths so the result applies to every curve.
            NCurve::assemble(curves)?;
            let roughest = roughest_curve(curves);
            debug!(curve = roughest, "placing frames on roughest curve");
            NCurve::assemble(&curves[roughest..=roughest])?
        }
    };
    info!(
        frames = curve.n_frames(),
        curves = curve.n_curves(),
        keys = config.n_stops,
        "building stop tables"
    );

    let reduction = stoptable::best_path(&curve, config.n_stops, config.parallel, cancel)?;
    info!(
        cost = reduction.cost,
        elapsed_ms = t_start.elapsed().as_millis() as u64,
        "placement done"
    );
    Ok(reduction)
}

/// Index of the roughest curve; the first one wins ties.
fn roughest_curve<V: AsRef<[f64]>>(curves: &[V]) -> usize {
    let mut best = 0;
    let mut best_roughness = f64::NEG_INFINITY;
    for (i, values) in curves.iter().enumerate() {
        let r = roughness(values.as_ref());
        if r > best_roughness {
            best_roughness = r;
            best = i;
        }
    }
    best
}

/// Per-channel outcome of [`apply_reduction`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    pub name: String,
    pub original_keys: usize,
    /// Keys written back, in frame order.
    pub keys: Vec<Sample>,
    /// One fit per segment; empty when handle tweaking is off.
    pub fits: Vec<SegmentFit>,
    /// Worst cubic deviation over all segments, when tweaked.
    pub max_error: Option<f64>,
}

/// Collapse every channel of `store` to `frame_indices` and fit handles.
///
/// `frame_indices` must hold exactly `config.n_stops` strictly ascending
/// indices, and every channel must have at least that many samples.
/// Everything is checked and computed before the first write, so a
/// failure leaves the store untouched.
pub fn apply_reduction<S: CurveStore + ?Sized>(
    store: &mut S,
    frame_indices: &[usize],
    config: &ReductionConfig,
    cancel: Option<&CancelToken>,
) -> Result<Vec<ChannelReport>> {
    config.validate()?;
    if frame_indices.len() != config.n_stops {
        return Err(ReduceError::InvalidConfig(format!(
            "got {} frame indices for {} keys",
            frame_indices.len(),
            config.n_stops
        )));
    }
    if frame_indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ReduceError::InvalidConfig(
            "frame indices must be strictly ascending".to_string(),
        ));
    }

    let t_start = Instant::now();
    let mut reports = Vec::with_capacity(store.channel_count());
    for channel in 0..store.channel_count() {
        let original = store.samples(channel)?;
        stoptable::validate(original.len(), frame_indices.len())?;
        let keys = samples_at_indices(&original, frame_indices)?;
        let fits = if config.tweak_handles {
            tweak::fit_segments(&original, &keys, config.tweak_steps, config.parallel, cancel)?
        } else {
            Vec::new()
        };
        let max_error = (!fits.is_empty()).then(|| fits.iter().map(|f| f.error).fold(0.0, f64::max));
        let name = store.channel_name(channel);
        debug!(
            channel = %name,
            original = original.len(),
            kept = keys.len(),
            max_error = ?max_error,
            "channel reduced"
        );
        reports.push(ChannelReport {
            name,
            original_keys: original.len(),
            keys,
            fits,
            max_error,
        });
    }

    for (channel, report) in reports.iter().enumerate() {
        store.replace_keys(channel, &report.keys)?;
        for (key, anchor) in tweak::anchors_from_fits(&report.fits).into_iter().enumerate() {
            store.set_handles(channel, key, anchor)?;
        }
    }

    info!(
        channels = reports.len(),
        keys = frame_indices.len(),
        elapsed_ms = t_start.elapsed().as_millis() as u64,
        "reduction applied"
    );
    Ok(reports)
}

/// The result of [`reduce`].
#[derive(Debug, Clone)]
pub struct ReduceResult {
    pub reduction: Reduction,
    pub channels: Vec<ChannelReport>,
}

/// Full pipeline: read every channel of `store`, place `config.n_stops`
/// keys, rewrite the store and fit handles.
pub fn reduce<S: CurveStore + ?Sized>(
    store: &mut S,
    config: &ReductionConfig,
    cancel: Option<&CancelToken>,
) -> Result<ReduceResult> {
    config.validate()?;
    let values = (0..store.channel_count())
        .map(|channel| {
            store
                .samples(channel)
                .map(|samples| samples.iter().map(|s| s.value).collect::<Vec<f64>>())
        })
        .collect::<Result<Vec<_>>>()?;

    let reduction = pick_frames(&values, config, cancel)?;
    let channels = apply_reduction(store, &reduction.indices, config, cancel)?;
    Ok(ReduceResult {
        reduction,
        channels,
    })
}
