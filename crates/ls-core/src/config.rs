//! Planner configuration.
//!
//! Numeric constants of the operational layer.  The defaults reproduce the
//! reference behaviour; applications typically load overrides from JSON and
//! call [`PlannerConfig::validate`] before handing the config to a builder.

use std::f64::consts::FRAC_PI_4;

use crate::{CoreError, CoreResult};

/// Tunables shared by the path builders and the lane-change tracker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Tolerance (m) used when concatenating consecutive lane centerlines.
    /// Also added once per join when deciding whether a path is long enough.
    /// Default: 0.5.
    pub lane_margin: f64,

    /// Speeds (m/s) at or below this count as standing still.  Default: 1e-3.
    pub drifting_speed: f64,

    /// Plans covering less than this distance (m) become standstill plans.
    /// Default: 1e-3.
    pub minimum_credible_path_length: f64,

    /// Length (m) of the stub path of a standstill plan.  Default: 1.0.
    pub standstill_path_length: f64,

    /// Progress fraction from which a lane change counts as complete.
    /// Default: 0.999.
    pub lane_change_completion: f64,

    /// Sample count of a full interpolated lane-change path.  Default: 64.
    pub interpolation_samples: usize,

    /// Maximum heading deviation (rad) of the first path segment from the
    /// current heading before leading samples are discarded.  Default: π/4.
    pub heading_repair_limit: f64,

    /// Minimum lane-change length as a multiple of the vehicle length.
    /// Default: 1.5.
    pub minimum_lane_change_length_factor: f64,

    /// Forced lateral shifts a forward path may perform before the agent is
    /// treated as stuck at a dead end.  Default: 2.
    pub maximum_forced_shifts: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lane_margin:                       0.5,
            drifting_speed:                    1e-3,
            minimum_credible_path_length:      1e-3,
            standstill_path_length:            1.0,
            lane_change_completion:            0.999,
            interpolation_samples:             64,
            heading_repair_limit:              FRAC_PI_4,
            minimum_lane_change_length_factor: 1.5,
            maximum_forced_shifts:             2,
        }
    }
}

impl PlannerConfig {
    /// Reject values that would make the planners divide by zero or loop.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("lane_margin", self.lane_margin),
            ("standstill_path_length", self.standstill_path_length),
            ("minimum_lane_change_length_factor", self.minimum_lane_change_length_factor),
            ("heading_repair_limit", self.heading_repair_limit),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("drifting_speed", self.drifting_speed),
            ("minimum_credible_path_length", self.minimum_credible_path_length),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CoreError::Config(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !(self.lane_change_completion > 0.0 && self.lane_change_completion <= 1.0) {
            return Err(CoreError::Config(format!(
                "lane_change_completion must be in (0, 1], got {}",
                self.lane_change_completion
            )));
        }
        if self.interpolation_samples < 2 {
            return Err(CoreError::Config(format!(
                "interpolation_samples must be at least 2, got {}",
                self.interpolation_samples
            )));
        }
        Ok(())
    }
}
