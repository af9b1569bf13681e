//! T-pose calibration gate.
//!
//! Camera tracking is only trusted after the player has held a T-pose for
//! `required_frames` consecutive frames. Any failing frame starts the count
//! over, and the final frame must also clear a stricter confidence check.

use crate::{
    config::CalibrationConfig,
    types::{KeypointName, PoseFrame},
};

/// Keypoints every calibration frame must contain.
pub const CORE_KEYPOINTS: [KeypointName; 12] = [
    KeypointName::LeftShoulder,
    KeypointName::RightShoulder,
    KeypointName::LeftElbow,
    KeypointName::RightElbow,
    KeypointName::LeftWrist,
    KeypointName::RightWrist,
    KeypointName::LeftHip,
    KeypointName::RightHip,
    KeypointName::LeftKnee,
    KeypointName::RightKnee,
    KeypointName::LeftAnkle,
    KeypointName::RightAnkle,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    Accumulating,
    Calibrated,
}

/// Body geometry captured on the frame that completed calibration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceData {
    pub shoulder_width: f32,
    pub hip_width: f32,
    pub center_x: f32,
    pub center_y: f32,
}

pub struct CalibrationGate {
    config: CalibrationConfig,
    consecutive_valid_frames: u32,
    reference: Option<ReferenceData>,
}

impl CalibrationGate {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            consecutive_valid_frames: 0,
            reference: None,
        }
    }

    pub fn state(&self) -> CalibrationState {
        if self.reference.is_some() {
            CalibrationState::Calibrated
        } else if self.consecutive_valid_frames > 0 {
            CalibrationState::Accumulating
        } else {
            CalibrationState::Idle
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.reference.is_some()
    }

    pub fn reference(&self) -> Option<&ReferenceData> {
        self.reference.as_ref()
    }

    pub fn consecutive_valid_frames(&self) -> u32 {
        self.consecutive_valid_frames
    }

    pub fn required_frames(&self) -> u32 {
        self.config.required_frames
    }

    /// Fraction of the hold completed, in [0, 1].
    pub fn progress(&self) -> f32 {
        let required = self.config.required_frames.max(1) as f32;
        (self.consecutive_valid_frames as f32 / required).clamp(0.0, 1.0)
    }

    /// Back to `Idle`, dropping any captured reference.
    pub fn reset(&mut self) {
        self.consecutive_valid_frames = 0;
        self.reference = None;
    }

    /// Feeds one frame. Returns `true` only on the frame that completes
    /// calibration. Frames arriving after that are ignored until `reset`.
    pub fn observe(&mut self, frame: &PoseFrame) -> bool {
        if self.is_calibrated() {
            return false;
        }

        if !self.all_core_above(frame, self.config.loose_confidence) || !self.is_t_pose(frame) {
            if self.consecutive_valid_frames > 0 {
                log::debug!(
                    "calibration hold broken after {} frames",
                    self.consecutive_valid_frames
                );
            }
            self.consecutive_valid_frames = 0;
            return false;
        }

        self.consecutive_valid_frames += 1;
        if self.consecutive_valid_frames < self.config.required_frames {
            return false;
        }

        if !self.all_core_above(frame, self.config.strict_confidence) {
            log::warn!(
                "calibration hold complete but confidence below {}; restarting",
                self.config.strict_confidence
            );
            self.consecutive_valid_frames = 0;
            return false;
        }

        match capture_reference(frame) {
            Some(reference) => {
                log::info!(
                    "calibrated: shoulder width {:.1}px, hip width {:.1}px, center ({:.1}, {:.1})",
                    reference.shoulder_width,
                    reference.hip_width,
                    reference.center_x,
                    reference.center_y
                );
                self.reference = Some(reference);
                true
            }
            None => {
                self.consecutive_valid_frames = 0;
                false
            }
        }
    }

    fn all_core_above(&self, frame: &PoseFrame, threshold: f32) -> bool {
        CORE_KEYPOINTS.iter().all(|name| {
            frame
                .get(*name)
                .is_some_and(|kp| kp.confidence > threshold)
        })
    }

    // Mirrored camera: the player's left elbow shows up to the right of the
    // left shoulder, and the right elbow to the left of the right shoulder.
    fn is_t_pose(&self, frame: &PoseFrame) -> bool {
        let (Some(ls), Some(rs), Some(le), Some(re)) = (
            frame.get(KeypointName::LeftShoulder),
            frame.get(KeypointName::RightShoulder),
            frame.get(KeypointName::LeftElbow),
            frame.get(KeypointName::RightElbow),
        ) else {
            return false;
        };

        let out = self.config.arm_out_margin;
        let drop = self.config.arm_drop_margin;

        let left_arm_out = le.x > ls.x + out;
        let right_arm_out = re.x < rs.x - out;
        let left_arm_up = le.y < ls.y + drop;
        let right_arm_up = re.y < rs.y + drop;

        left_arm_out && right_arm_out && left_arm_up && right_arm_up
    }
}

impl Default for CalibrationGate {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

fn capture_reference(frame: &PoseFrame) -> Option<ReferenceData> {
    let ls = frame.get(KeypointName::LeftShoulder)?.position();
    let rs = frame.get(KeypointName::RightShoulder)?.position();
    let lh = frame.get(KeypointName::LeftHip)?.position();
    let rh = frame.get(KeypointName::RightHip)?.position();

    Some(ReferenceData {
        shoulder_width: ls.distance(rs),
        hip_width: lh.distance(rh),
        center_x: ls.midpoint(rs).x,
        center_y: (ls.y + rs.y + lh.y + rh.y) / 4.0,
    })
}
