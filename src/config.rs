//! Tunables for the tracking kernel. Defaults reproduce the shipped game.

use std::f32::consts::PI;

use crate::{error::KernelError, types::ControlMode};

/// T-pose calibration gate.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationConfig {
    /// Consecutive qualifying frames before unlocking (~3 s at 60 Hz).
    pub required_frames: u32,
    /// Per-frame confidence floor; a keypoint at or below it fails the frame.
    pub loose_confidence: f32,
    /// Confidence every core keypoint must exceed on the final frame.
    pub strict_confidence: f32,
    /// How far (px) an elbow must sit outside its shoulder.
    pub arm_out_margin: f32,
    /// How far (px) an elbow may hang below its shoulder.
    pub arm_drop_margin: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            required_frames: 180,
            loose_confidence: 0.3,
            strict_confidence: 0.5,
            arm_out_margin: 20.0,
            arm_drop_margin: 150.0,
        }
    }
}

/// Keypoint-to-angle stabilization.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothingConfig {
    pub min_confidence: f32,
    pub dead_zone: f32,
    pub knee_dead_zone: f32,
    pub max_change_per_frame: f32,
    pub smoothing_factor: f32,
    pub knee_smoothing_factor: f32,
    pub elbow_limit: f32,
    pub knee_limit: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            dead_zone: 0.02,
            knee_dead_zone: 0.01,
            max_change_per_frame: 0.3,
            smoothing_factor: 0.15,
            knee_smoothing_factor: 0.25,
            elbow_limit: PI,
            knee_limit: PI * 2.0 / 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Average joint distance (px) at which the score reaches zero.
    pub max_allowed_distance: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_allowed_distance: 30.0,
        }
    }
}

/// Score needed to clear a pose, per control mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassThresholds {
    pub mouse: f32,
    pub camera: f32,
}

impl PassThresholds {
    pub const POSE_MATCH: PassThresholds = PassThresholds {
        mouse: 90.0,
        camera: 55.0,
    };

    pub const WALL: PassThresholds = PassThresholds {
        mouse: 65.0,
        camera: 55.0,
    };

    pub fn for_mode(&self, mode: ControlMode) -> f32 {
        match mode {
            ControlMode::Mouse => self.mouse,
            ControlMode::Camera => self.camera,
        }
    }
}

impl Default for PassThresholds {
    fn default() -> Self {
        Self::POSE_MATCH
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WallConfig {
    /// Approach progress added per tick; the wall arrives at 1.0.
    pub speed: f32,
    /// Ticks the pass/crash verdict stays up before the next pose.
    pub feedback_ticks: u32,
    pub thresholds: PassThresholds,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            speed: 0.003,
            feedback_ticks: 90,
            thresholds: PassThresholds::WALL,
        }
    }
}

/// Body segment lengths for forward kinematics, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentLengths {
    pub torso_width: f32,
    pub upper_torso_height: f32,
    pub lower_torso_height: f32,
    pub head_radius: f32,
    pub upper_arm: f32,
    pub lower_arm: f32,
    pub upper_leg: f32,
    pub lower_leg: f32,
}

impl SegmentLengths {
    /// The small figure used by the free-drag ragdoll.
    pub fn compact() -> Self {
        Self {
            torso_width: 30.0,
            upper_torso_height: 30.0,
            lower_torso_height: 30.0,
            head_radius: 25.0,
            upper_arm: 45.0,
            lower_arm: 40.0,
            upper_leg: 50.0,
            lower_leg: 45.0,
        }
    }

    fn validate(&self) -> Result<(), KernelError> {
        let lengths = [
            ("torso_width", self.torso_width),
            ("upper_torso_height", self.upper_torso_height),
            ("lower_torso_height", self.lower_torso_height),
            ("head_radius", self.head_radius),
            ("upper_arm", self.upper_arm),
            ("lower_arm", self.lower_arm),
            ("upper_leg", self.upper_leg),
            ("lower_leg", self.lower_leg),
        ];
        for (label, value) in lengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(KernelError::InvalidConfig(format!(
                    "segment {label} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SegmentLengths {
    fn default() -> Self {
        Self {
            torso_width: 45.0,
            upper_torso_height: 45.0,
            lower_torso_height: 45.0,
            head_radius: 38.0,
            upper_arm: 68.0,
            lower_arm: 60.0,
            upper_leg: 75.0,
            lower_leg: 68.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelConfig {
    pub calibration: CalibrationConfig,
    pub smoothing: SmoothingConfig,
    pub matching: MatchConfig,
    pub segments: SegmentLengths,
    pub thresholds: PassThresholds,
    pub wall: WallConfig,
}

impl KernelConfig {
    pub fn validate(&self) -> Result<(), KernelError> {
        let calibration = &self.calibration;
        if calibration.required_frames == 0 {
            return Err(invalid("calibration.required_frames must be at least 1"));
        }
        unit_interval("calibration.loose_confidence", calibration.loose_confidence)?;
        unit_interval("calibration.strict_confidence", calibration.strict_confidence)?;

        let smoothing = &self.smoothing;
        unit_interval("smoothing.min_confidence", smoothing.min_confidence)?;
        unit_interval("smoothing.smoothing_factor", smoothing.smoothing_factor)?;
        unit_interval(
            "smoothing.knee_smoothing_factor",
            smoothing.knee_smoothing_factor,
        )?;
        for (label, value) in [
            ("smoothing.dead_zone", smoothing.dead_zone),
            ("smoothing.knee_dead_zone", smoothing.knee_dead_zone),
            ("smoothing.max_change_per_frame", smoothing.max_change_per_frame),
            ("smoothing.elbow_limit", smoothing.elbow_limit),
            ("smoothing.knee_limit", smoothing.knee_limit),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(&format!("{label} must be >= 0, got {value}")));
            }
        }

        if !(self.matching.max_allowed_distance.is_finite()
            && self.matching.max_allowed_distance > 0.0)
        {
            return Err(invalid("matching.max_allowed_distance must be positive"));
        }

        if !(self.wall.speed.is_finite() && self.wall.speed > 0.0) {
            return Err(invalid("wall.speed must be positive"));
        }

        self.segments.validate()
    }
}

fn invalid(message: &str) -> KernelError {
    KernelError::InvalidConfig(message.to_string())
}

fn unit_interval(label: &str, value: f32) -> Result<(), KernelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(&format!("{label} must lie in [0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(KernelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_required_frames() {
        let mut config = KernelConfig::default();
        config.calibration.required_frames = 0;
        assert!(matches!(
            config.validate(),
            Err(KernelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_negative_segment() {
        let mut config = KernelConfig::default();
        config.segments.upper_leg = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upper_leg"));
    }

    #[test]
    fn test_rejects_out_of_range_smoothing() {
        let mut config = KernelConfig::default();
        config.smoothing.smoothing_factor = 1.5;
        assert!(config.validate().is_err());
    }
}
