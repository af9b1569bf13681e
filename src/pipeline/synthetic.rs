//! Deterministic keypoint generator: renders figure angles back into what a
//! front-facing camera would report for a player holding that pose.

use std::{f32::consts::FRAC_PI_2, thread, time::Duration};

use anyhow::Result;

use super::KeypointSource;
use crate::{
    angle::lerp_angle_shortest,
    types::{AngleName, AngleSet, Keypoint, KeypointName, PoseFrame},
};

/// Player proportions in source pixels (640x480 frame).
#[derive(Clone, Debug, PartialEq)]
pub struct BodyLayout {
    pub center_x: f32,
    pub shoulder_y: f32,
    pub shoulder_width: f32,
    pub hip_y: f32,
    pub hip_width: f32,
    pub upper_arm: f32,
    pub forearm: f32,
    pub thigh: f32,
    pub shin: f32,
}

impl Default for BodyLayout {
    fn default() -> Self {
        Self {
            center_x: 320.0,
            shoulder_y: 160.0,
            shoulder_width: 80.0,
            hip_y: 280.0,
            hip_width: 40.0,
            upper_arm: 60.0,
            forearm: 55.0,
            thigh: 80.0,
            shin: 70.0,
        }
    }
}

// Inverse of the mirrored-angle transform: a limb at figure angle `angle`
// appears on screen along (-cos, sin).
fn mirrored_offset(x: f32, y: f32, angle: f32, length: f32) -> (f32, f32) {
    (x - angle.cos() * length, y + angle.sin() * length)
}

/// Keypoints for a player matching `angles`. Waist and neck are ignored:
/// camera tracking does not read torso lean.
pub fn render_keypoints(angles: &AngleSet, layout: &BodyLayout, confidence: f32) -> Vec<Keypoint> {
    use KeypointName::*;

    let half_shoulders = layout.shoulder_width / 2.0;
    let half_hips = layout.hip_width / 2.0;

    // The player's left side shows up on the right of the image.
    let left_shoulder = (layout.center_x + half_shoulders, layout.shoulder_y);
    let right_shoulder = (layout.center_x - half_shoulders, layout.shoulder_y);
    let left_hip = (layout.center_x + half_hips, layout.hip_y);
    let right_hip = (layout.center_x - half_hips, layout.hip_y);

    let arm = |shoulder: (f32, f32), upper: f32, elbow: f32| {
        let e = mirrored_offset(shoulder.0, shoulder.1, upper, layout.upper_arm);
        let w = mirrored_offset(e.0, e.1, upper + elbow, layout.forearm);
        (e, w)
    };
    let leg = |hip_pos: (f32, f32), hip: f32, knee: f32| {
        let thigh = hip + FRAC_PI_2;
        let k = mirrored_offset(hip_pos.0, hip_pos.1, thigh, layout.thigh);
        let a = mirrored_offset(k.0, k.1, thigh + knee, layout.shin);
        (k, a)
    };

    let (left_elbow, left_wrist) = arm(left_shoulder, angles.left_shoulder, angles.left_elbow);
    let (right_elbow, right_wrist) = arm(right_shoulder, angles.right_shoulder, angles.right_elbow);
    let (left_knee, left_ankle) = leg(left_hip, angles.left_hip, angles.left_knee);
    let (right_knee, right_ankle) = leg(right_hip, angles.right_hip, angles.right_knee);

    let nose = (layout.center_x, layout.shoulder_y - layout.shoulder_width * 0.6);

    [
        (Nose, nose),
        (LeftShoulder, left_shoulder),
        (RightShoulder, right_shoulder),
        (LeftElbow, left_elbow),
        (RightElbow, right_elbow),
        (LeftWrist, left_wrist),
        (RightWrist, right_wrist),
        (LeftHip, left_hip),
        (RightHip, right_hip),
        (LeftKnee, left_knee),
        (RightKnee, right_knee),
        (LeftAnkle, left_ankle),
        (RightAnkle, right_ankle),
    ]
    .into_iter()
    .map(|(name, (x, y))| Keypoint::new(name, x, y, confidence))
    .collect()
}

#[derive(Clone, Debug)]
struct Move {
    target: AngleSet,
    transition_frames: u32,
    hold_frames: u32,
}

/// Plays a scripted routine: hold each pose for a while, easing between
/// poses along the shortest arc.
pub struct SyntheticPerformer {
    layout: BodyLayout,
    confidence: f32,
    frame_interval: Option<Duration>,
    moves: Vec<Move>,
    current: AngleSet,
    move_index: usize,
    frame_in_move: u32,
    move_start: AngleSet,
}

impl SyntheticPerformer {
    pub fn new(layout: BodyLayout) -> Self {
        Self {
            layout,
            confidence: 0.9,
            frame_interval: None,
            moves: Vec::new(),
            current: AngleSet::T_POSE,
            move_index: 0,
            frame_in_move: 0,
            move_start: AngleSet::T_POSE,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sleep between frames to emulate a live camera.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn hold(mut self, target: AngleSet, transition_frames: u32, hold_frames: u32) -> Self {
        self.moves.push(Move {
            target,
            transition_frames,
            hold_frames,
        });
        self
    }

    pub fn total_frames(&self) -> u32 {
        self.moves
            .iter()
            .map(|m| m.transition_frames + m.hold_frames)
            .sum()
    }

    /// Next pose in the routine, or `None` once every move has played.
    pub fn next_angles(&mut self) -> Option<AngleSet> {
        loop {
            let step = self.moves.get(self.move_index)?.clone();
            let length = step.transition_frames + step.hold_frames;
            if self.frame_in_move >= length {
                self.move_index += 1;
                self.frame_in_move = 0;
                self.move_start = self.current;
                continue;
            }

            self.current = if self.frame_in_move < step.transition_frames {
                let t = (self.frame_in_move + 1) as f32 / step.transition_frames as f32;
                blend(&self.move_start, &step.target, t)
            } else {
                step.target
            };
            self.frame_in_move += 1;
            return Some(self.current);
        }
    }
}

fn blend(from: &AngleSet, to: &AngleSet, t: f32) -> AngleSet {
    let mut out = *from;
    for name in AngleName::ALL {
        out.set(name, lerp_angle_shortest(from.get(name), to.get(name), t));
    }
    out
}

impl KeypointSource for SyntheticPerformer {
    fn label(&self) -> String {
        format!("synthetic performer ({} frames)", self.total_frames())
    }

    fn open(&mut self) -> Result<()> {
        self.move_index = 0;
        self.frame_in_move = 0;
        self.current = AngleSet::T_POSE;
        self.move_start = AngleSet::T_POSE;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        let Some(angles) = self.next_angles() else {
            return Ok(None);
        };
        if let Some(interval) = self.frame_interval {
            thread::sleep(interval);
        }
        Ok(Some(PoseFrame::new(render_keypoints(
            &angles,
            &self.layout,
            self.confidence,
        ))))
    }
}
