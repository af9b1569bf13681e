//! Camera keypoints to a smoothed [`AngleSet`].
//!
//! Each frame runs three stages per angle against the previous output:
//! a dead zone swallows jitter at rest, an outlier clamp caps single-frame
//! jumps such as swapped keypoints, and shortest-arc smoothing adds temporal
//! continuity. Knees get a tighter dead zone and faster smoothing so leg
//! bends do not visibly lag.

use std::f32::consts::FRAC_PI_2;

use crate::{
    angle::{lerp_angle_shortest, normalize, shortest_delta},
    config::SmoothingConfig,
    types::{AngleName, AngleSet, Keypoint, KeypointName, PoseFrame},
};

/// Keypoints that must be present (at any confidence) for a frame to count.
const REQUIRED_KEYPOINTS: [KeypointName; 6] = [
    KeypointName::LeftShoulder,
    KeypointName::RightShoulder,
    KeypointName::LeftElbow,
    KeypointName::RightElbow,
    KeypointName::LeftHip,
    KeypointName::RightHip,
];

/// Absolute limb directions for one frame; `None` when either endpoint was
/// missing or under the confidence floor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimbAngles {
    pub left_upper_arm: Option<f32>,
    pub left_forearm: Option<f32>,
    pub right_upper_arm: Option<f32>,
    pub right_forearm: Option<f32>,
    pub left_thigh: Option<f32>,
    pub left_shin: Option<f32>,
    pub right_thigh: Option<f32>,
    pub right_shin: Option<f32>,
}

impl LimbAngles {
    pub fn from_frame(frame: &PoseFrame, min_confidence: f32) -> Self {
        use KeypointName::*;
        let segment = |from, to| limb_angle(frame, from, to, min_confidence);

        Self {
            left_upper_arm: segment(LeftShoulder, LeftElbow),
            left_forearm: segment(LeftElbow, LeftWrist),
            right_upper_arm: segment(RightShoulder, RightElbow),
            right_forearm: segment(RightElbow, RightWrist),
            left_thigh: segment(LeftHip, LeftKnee),
            left_shin: segment(LeftKnee, LeftAnkle),
            right_thigh: segment(RightHip, RightKnee),
            right_shin: segment(RightKnee, RightAnkle),
        }
    }

    /// Relative figure angles, falling back to `prev` wherever a limb is
    /// unknown. Camera mode never drives waist or neck.
    pub fn to_relative(&self, prev: &AngleSet) -> AngleSet {
        let left_shoulder = self.left_upper_arm.unwrap_or(prev.left_shoulder);
        let right_shoulder = self.right_upper_arm.unwrap_or(prev.right_shoulder);

        AngleSet {
            neck: 0.0,
            waist: 0.0,
            left_shoulder,
            left_elbow: relative_or(self.left_forearm, Some(left_shoulder), prev.left_elbow),
            right_shoulder,
            right_elbow: relative_or(self.right_forearm, Some(right_shoulder), prev.right_elbow),
            left_hip: self
                .left_thigh
                .map(|thigh| normalize(thigh - FRAC_PI_2))
                .unwrap_or(prev.left_hip),
            left_knee: relative_or(self.left_shin, self.left_thigh, prev.left_knee),
            right_hip: self
                .right_thigh
                .map(|thigh| normalize(thigh - FRAC_PI_2))
                .unwrap_or(prev.right_hip),
            right_knee: relative_or(self.right_shin, self.right_thigh, prev.right_knee),
        }
    }
}

fn relative_or(child: Option<f32>, parent: Option<f32>, fallback: f32) -> f32 {
    match (child, parent) {
        (Some(child), Some(parent)) => normalize(child - parent),
        _ => fallback,
    }
}

fn limb_angle(
    frame: &PoseFrame,
    from: KeypointName,
    to: KeypointName,
    min_confidence: f32,
) -> Option<f32> {
    let confident = |kp: &&Keypoint| kp.confidence >= min_confidence;
    let a = frame.get(from).filter(confident)?;
    let b = frame.get(to).filter(confident)?;
    Some(mirrored_angle(b.x - a.x, b.y - a.y))
}

/// Direction of a screen vector after flipping x, so the player's left limb
/// drives the figure's left limb on a front-facing camera.
pub fn mirrored_angle(dx: f32, dy: f32) -> f32 {
    dy.atan2(-dx)
}

pub struct PoseSignalProcessor {
    config: SmoothingConfig,
    prev_angles: AngleSet,
}

impl PoseSignalProcessor {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            prev_angles: AngleSet::T_POSE,
        }
    }

    /// The angles carried into the next frame.
    pub fn last_angles(&self) -> &AngleSet {
        &self.prev_angles
    }

    /// Forgets smoothing history; the next frame starts from a T-pose.
    pub fn reset(&mut self) {
        self.prev_angles = AngleSet::T_POSE;
    }

    /// Processes one calibrated frame. Returns `None` when the torso and
    /// upper arms were not all detected, in which case nothing changes and
    /// the caller keeps its last angles.
    pub fn process(&mut self, frame: &PoseFrame) -> Option<AngleSet> {
        if let Some(missing) = REQUIRED_KEYPOINTS
            .iter()
            .find(|name| frame.get(**name).is_none())
        {
            log::trace!("no angle update: {} not detected", missing.part());
            return None;
        }

        let limbs = LimbAngles::from_frame(frame, self.config.min_confidence);
        let targets = limbs.to_relative(&self.prev_angles);

        let mut next = self.prev_angles;
        for name in AngleName::ALL {
            let value = self.stabilize(name, self.prev_angles.get(name), targets.get(name));
            next.set(name, value);
        }

        let elbow = self.config.elbow_limit;
        let knee = self.config.knee_limit;
        next.left_elbow = next.left_elbow.clamp(-elbow, elbow);
        next.right_elbow = next.right_elbow.clamp(-elbow, elbow);
        next.left_knee = next.left_knee.clamp(-knee, knee);
        next.right_knee = next.right_knee.clamp(-knee, knee);

        self.prev_angles = next;
        Some(next)
    }

    fn stabilize(&self, name: AngleName, prev: f32, raw_target: f32) -> f32 {
        let cfg = &self.config;
        let (dead_zone, factor) = if name.is_knee() {
            (cfg.knee_dead_zone, cfg.knee_smoothing_factor)
        } else {
            (cfg.dead_zone, cfg.smoothing_factor)
        };

        let mut target = normalize(raw_target);
        let delta = shortest_delta(prev, target);

        if delta.abs() < dead_zone {
            return prev;
        }

        if delta.abs() > cfg.max_change_per_frame {
            let capped = cfg.max_change_per_frame.copysign(delta);
            target = normalize(prev + capped);
        }

        lerp_angle_shortest(prev, target, factor)
    }
}

impl Default for PoseSignalProcessor {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::synthetic::{BodyLayout, render_keypoints};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn frame_for(angles: &AngleSet) -> PoseFrame {
        PoseFrame::new(render_keypoints(angles, &BodyLayout::default(), 0.9))
    }

    fn with_confidence(mut frame: PoseFrame, name: KeypointName, confidence: f32) -> PoseFrame {
        for kp in frame.keypoints.iter_mut() {
            if kp.name == name {
                kp.confidence = confidence;
            }
        }
        frame
    }

    #[test]
    fn test_mirrored_angle_convention() {
        // Elbow right of shoulder on screen is the player's left arm out.
        assert_abs_diff_eq!(mirrored_angle(60.0, 0.0), PI, epsilon = 1e-6);
        assert_abs_diff_eq!(mirrored_angle(-60.0, 0.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mirrored_angle(0.0, 80.0), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_required_keypoint_is_no_update() {
        let mut processor = PoseSignalProcessor::default();
        let mut frame = frame_for(&AngleSet::T_POSE);
        frame.keypoints.retain(|kp| kp.name != KeypointName::RightHip);
        assert!(processor.process(&frame).is_none());
        assert_eq!(*processor.last_angles(), AngleSet::T_POSE);
    }

    #[test]
    fn test_empty_frame_is_no_update() {
        let mut processor = PoseSignalProcessor::default();
        assert!(processor.process(&PoseFrame::empty()).is_none());
    }

    #[test]
    fn test_low_confidence_required_keypoint_still_updates() {
        let mut processor = PoseSignalProcessor::default();
        let frame = with_confidence(frame_for(&AngleSet::T_POSE), KeypointName::LeftHip, 0.1);
        assert!(processor.process(&frame).is_some());
    }

    #[test]
    fn test_dead_zone_keeps_previous_value_exactly() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_elbow = 0.015;
        target.right_hip = -0.015;
        let out = processor.process(&frame_for(&target)).unwrap();
        assert_eq!(out.left_elbow.to_bits(), AngleSet::T_POSE.left_elbow.to_bits());
        assert_eq!(out.right_hip.to_bits(), AngleSet::T_POSE.right_hip.to_bits());
        assert_eq!(out.left_shoulder.to_bits(), AngleSet::T_POSE.left_shoulder.to_bits());
    }

    #[test]
    fn test_knee_dead_zone_is_finer() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_knee = 0.015;
        let out = processor.process(&frame_for(&target)).unwrap();
        assert!(out.left_knee > 0.0);
    }

    #[test]
    fn test_outlier_jump_is_capped() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.right_shoulder = -2.0;
        let out = processor.process(&frame_for(&target)).unwrap();
        let cfg = SmoothingConfig::default();
        let moved = shortest_delta(AngleSet::T_POSE.right_shoulder, out.right_shoulder);
        assert!(moved < 0.0);
        assert!(moved.abs() <= cfg.max_change_per_frame * cfg.smoothing_factor + 1e-5);
    }

    #[test]
    fn test_knee_outlier_uses_knee_factor() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_knee = 1.5;
        let out = processor.process(&frame_for(&target)).unwrap();
        let cfg = SmoothingConfig::default();
        assert_abs_diff_eq!(
            out.left_knee,
            cfg.max_change_per_frame * cfg.knee_smoothing_factor,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_converges_to_held_pose() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_shoulder = PI * 3.0 / 4.0;
        target.right_elbow = PI / 2.0;
        target.left_hip = PI / 6.0;
        let frame = frame_for(&target);
        for _ in 0..200 {
            processor.process(&frame);
        }
        let out = processor.last_angles();
        assert_abs_diff_eq!(out.left_shoulder, target.left_shoulder, epsilon = 0.05);
        assert_abs_diff_eq!(out.right_elbow, target.right_elbow, epsilon = 0.05);
        assert_abs_diff_eq!(out.left_hip, target.left_hip, epsilon = 0.05);
    }

    #[test]
    fn test_low_confidence_wrist_carries_elbow_forward() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_shoulder = PI * 3.0 / 4.0;
        target.left_elbow = 1.0;
        let frame = with_confidence(frame_for(&target), KeypointName::LeftWrist, 0.2);
        let out = processor.process(&frame).unwrap();
        assert_eq!(out.left_elbow, AngleSet::T_POSE.left_elbow);
        assert!(out.left_shoulder < PI);
    }

    #[test]
    fn test_knee_needs_thigh_and_shin() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.right_knee = 1.0;
        let frame = with_confidence(frame_for(&target), KeypointName::RightHip, 0.1);
        let out = processor.process(&frame).unwrap();
        assert_eq!(out.right_knee, AngleSet::T_POSE.right_knee);
        assert_eq!(out.right_hip, AngleSet::T_POSE.right_hip);
    }

    #[test]
    fn test_waist_and_neck_stay_zero() {
        let mut processor = PoseSignalProcessor::default();
        let out = processor.process(&frame_for(&AngleSet::T_POSE)).unwrap();
        assert_eq!(out.waist, 0.0);
        assert_eq!(out.neck, 0.0);
    }

    #[test]
    fn test_reset_restores_t_pose() {
        let mut processor = PoseSignalProcessor::default();
        let mut target = AngleSet::T_POSE;
        target.left_hip = 1.0;
        processor.process(&frame_for(&target));
        assert_ne!(*processor.last_angles(), AngleSet::T_POSE);
        processor.reset();
        assert_eq!(*processor.last_angles(), AngleSet::T_POSE);
    }

    proptest! {
        #[test]
        fn knees_never_exceed_limit(
            knees in proptest::collection::vec((-PI..PI, -PI..PI, -PI..PI, -PI..PI), 1..60)
        ) {
            let limit = SmoothingConfig::default().knee_limit;
            let mut processor = PoseSignalProcessor::default();
            for (left_hip, left_knee, right_hip, right_knee) in knees {
                let target = AngleSet {
                    left_hip,
                    left_knee,
                    right_hip,
                    right_knee,
                    ..AngleSet::T_POSE
                };
                if let Some(out) = processor.process(&frame_for(&target)) {
                    prop_assert!(out.left_knee.abs() <= limit);
                    prop_assert!(out.right_knee.abs() <= limit);
                }
            }
        }
    }
}
