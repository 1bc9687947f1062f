use serde::{Deserialize, Serialize};

use super::edit_error::EditError;

pub const DEFAULT_EFFECT_DURATION: f64 = 1.0;
pub const DEFAULT_TARGET_FPS: f64 = 25.0;

/// Two removes closer than `factor * effect_duration` coalesce into one cut.
///
/// Empirical; needs calibration against real footage.
pub const DEFAULT_MERGE_TOLERANCE_FACTOR: f64 = 1.1;

/// Pass-through gaps no longer than `factor * effect_duration` are dropped
/// instead of being emitted as tiny slivers.
///
/// Empirical; needs calibration against real footage.
pub const DEFAULT_SEGMENT_THRESHOLD_FACTOR: f64 = 0.5;

/// Parameters for one editing run. Passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// Width in seconds of every operation's interval.
    #[serde(default = "default_effect_duration")]
    pub effect_duration: f64,
    /// Output frame rate; operation frames and segment frame ranges use it.
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    #[serde(default = "default_merge_tolerance_factor")]
    pub merge_tolerance_factor: f64,
    #[serde(default = "default_segment_threshold_factor")]
    pub segment_threshold_factor: f64,
}

fn default_effect_duration() -> f64 {
    DEFAULT_EFFECT_DURATION
}

fn default_target_fps() -> f64 {
    DEFAULT_TARGET_FPS
}

fn default_merge_tolerance_factor() -> f64 {
    DEFAULT_MERGE_TOLERANCE_FACTOR
}

fn default_segment_threshold_factor() -> f64 {
    DEFAULT_SEGMENT_THRESHOLD_FACTOR
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            effect_duration: DEFAULT_EFFECT_DURATION,
            target_fps: DEFAULT_TARGET_FPS,
            merge_tolerance_factor: DEFAULT_MERGE_TOLERANCE_FACTOR,
            segment_threshold_factor: DEFAULT_SEGMENT_THRESHOLD_FACTOR,
        }
    }
}

impl EditConfig {
    pub fn with_effect_duration(mut self, seconds: f64) -> Self {
        self.effect_duration = seconds;
        self
    }

    pub fn with_target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_merge_tolerance_factor(mut self, factor: f64) -> Self {
        self.merge_tolerance_factor = factor;
        self
    }

    pub fn with_segment_threshold_factor(mut self, factor: f64) -> Self {
        self.segment_threshold_factor = factor;
        self
    }

    /// Largest gap (seconds) between two removes that still merges them.
    pub fn merge_tolerance(&self) -> f64 {
        self.merge_tolerance_factor * self.effect_duration
    }

    /// Largest gap (seconds) that is not emitted as a pass-through segment.
    pub fn segment_threshold(&self) -> f64 {
        self.segment_threshold_factor * self.effect_duration
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if !(self.effect_duration.is_finite() && self.effect_duration > 0.0) {
            return Err(EditError::InvalidConfig(format!(
                "effect duration must be a positive number of seconds, got {}",
                self.effect_duration
            )));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(EditError::InvalidConfig(format!(
                "target frame rate must be positive, got {}",
                self.target_fps
            )));
        }
        if !(self.merge_tolerance_factor.is_finite() && self.merge_tolerance_factor >= 0.0) {
            return Err(EditError::InvalidConfig(format!(
                "merge tolerance factor must be non-negative, got {}",
                self.merge_tolerance_factor
            )));
        }
        if !(self.segment_threshold_factor.is_finite() && self.segment_threshold_factor >= 0.0) {
            return Err(EditError::InvalidConfig(format!(
                "segment threshold factor must be non-negative, got {}",
                self.segment_threshold_factor
            )));
        }
        Ok(())
    }
}
