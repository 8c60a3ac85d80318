use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};
use crate::tweak::DEFAULT_TWEAK_STEPS;

/// All reduction parameters in one struct.
/// Serializable (for saving presets) and adjustable at runtime
/// (for editor sliders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    // -- Placement stage --
    /// Number of keys to keep, first and last frame included.
    pub n_stops: usize,
    /// Which curves drive the placement search.
    pub frame_source: FrameSource,

    // -- Handle stage --
    /// Whether to grid-search tangent handles after placement.
    pub tweak_handles: bool,
    /// Candidates per handle value in the grid search. Even, >= 2.
    /// Cost grows with the square of this.
    pub tweak_steps: usize,

    // -- Execution --
    /// Spread stop-table rows and handle segments across threads.
    /// Results are identical either way.
    pub parallel: bool,
}

/// How frames are chosen when several curves are reduced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSource {
    /// Treat every curve as one dimension of a single n-D curve.
    AllCurves,
    /// Use only the curve with the largest summed second difference.
    RoughestCurve,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            n_stops: 10,
            frame_source: FrameSource::AllCurves,
            tweak_handles: true,
            tweak_steps: DEFAULT_TWEAK_STEPS,
            parallel: true,
        }
    }
}

impl ReductionConfig {
    /// Reject settings the search cannot run with. Frame-count checks
    /// happen later, once the curves are known.
    pub fn validate(&self) -> Result<()> {
        if self.n_stops < 2 {
            return Err(ReduceError::InvalidConfig(format!(
                "n_stops must be at least 2, got {}",
                self.n_stops
            )));
        }
        if self.tweak_steps < 2 || self.tweak_steps % 2 != 0 {
            return Err(ReduceError::InvalidConfig(format!(
                "tweak_steps must be even and at least 2, got {}",
                self.tweak_steps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ReductionConfig::default().validate().is_ok());
    }

    #[test]
    fn odd_steps_rejected() {
        let config = ReductionConfig {
            tweak_steps: 7,
            ..ReductionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReduceError::InvalidConfig(_))));
    }

    #[test]
    fn preset_round_trips_with_defaults() {
        let config: ReductionConfig =
            serde_json::from_str(r#"{ "n_stops": 4, "frame_source": "roughest_curve" }"#).unwrap();
        assert_eq!(config.n_stops, 4);
        assert_eq!(config.frame_source, FrameSource::RoughestCurve);
        assert_eq!(config.tweak_steps, DEFAULT_TWEAK_STEPS);
        assert!(config.tweak_handles);
    }
}
