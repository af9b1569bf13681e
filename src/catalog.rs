use std::f32::consts::PI;

use crate::{error::KernelError, types::AngleSet};

#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub name: String,
    pub angles: AngleSet,
}

impl Pose {
    pub fn new(name: impl Into<String>, angles: AngleSet) -> Self {
        Self {
            name: name.into(),
            angles,
        }
    }
}

/// Ordered target poses with a wrapping cursor.
#[derive(Clone, Debug)]
pub struct PoseCatalog {
    poses: Vec<Pose>,
    cursor: usize,
}

impl PoseCatalog {
    pub fn new(poses: Vec<Pose>) -> Result<Self, KernelError> {
        if poses.is_empty() {
            return Err(KernelError::EmptyCatalog);
        }
        let poses = poses
            .into_iter()
            .map(|pose| {
                Ok(Pose {
                    angles: pose.angles.validated()?,
                    name: pose.name,
                })
            })
            .collect::<Result<Vec<_>, KernelError>>()?;
        Ok(Self { poses, cursor: 0 })
    }

    pub fn current(&self) -> &Pose {
        &self.poses[self.cursor]
    }

    /// Moves to the next pose, wrapping after the last one.
    pub fn advance(&mut self) -> &Pose {
        self.cursor = (self.cursor + 1) % self.poses.len();
        log::debug!(
            "target pose {}/{}: {}",
            self.cursor + 1,
            self.poses.len(),
            self.poses[self.cursor].name
        );
        self.current()
    }

    pub fn count(&self) -> usize {
        self.poses.len()
    }

    /// Zero-based position of the current pose.
    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Poses for mouse mode, including torso lean and head tilt.
    pub fn free_drag() -> Self {
        Self::from_builtin(free_drag_poses())
    }

    /// Poses reachable in camera mode: no waist or neck motion, no arms
    /// raised overhead or crossed.
    pub fn camera() -> Self {
        Self::from_builtin(camera_poses())
    }

    fn from_builtin(poses: Vec<Pose>) -> Self {
        Self { poses, cursor: 0 }
    }
}

fn pose(name: &str, f: impl FnOnce(&mut AngleSet)) -> Pose {
    let mut angles = AngleSet::T_POSE;
    f(&mut angles);
    Pose::new(name, angles)
}

fn free_drag_poses() -> Vec<Pose> {
    vec![
        pose("T-Pose", |_| {}),
        pose("Y-Pose", |a| {
            a.left_shoulder = PI * 3.0 / 4.0;
            a.right_shoulder = -PI / 4.0;
        }),
        pose("Jump", |a| {
            a.left_shoulder = -PI / 2.0;
            a.right_shoulder = -PI / 2.0;
            a.left_hip = -PI / 6.0;
            a.right_hip = PI / 6.0;
        }),
        pose("Clasped Hands", |a| {
            a.left_shoulder = 0.0;
            a.left_elbow = PI / 2.0;
            a.right_shoulder = PI;
            a.right_elbow = -PI / 2.0;
        }),
        pose("Bow", |a| {
            a.neck = PI / 6.0;
            a.waist = PI / 8.0;
        }),
        pose("Lean Back", |a| {
            a.neck = -PI / 5.0;
            a.waist = -PI / 8.0;
            a.left_shoulder = -PI / 3.0;
            a.right_shoulder = -PI / 3.0;
        }),
        pose("Side Bend", |a| {
            a.waist = PI / 6.0;
            a.left_shoulder = PI / 2.0;
            a.right_shoulder = -PI / 2.0;
        }),
        pose("Head Tilt", |a| {
            a.neck = PI / 4.0;
            a.left_shoulder = PI * 3.0 / 4.0;
            a.left_elbow = -PI / 4.0;
            a.right_shoulder = PI / 4.0;
        }),
        pose("Stretch", |a| {
            a.neck = -PI / 6.0;
            a.waist = -PI / 10.0;
            a.left_shoulder = -PI / 2.0;
            a.right_shoulder = -PI / 2.0;
        }),
        pose("One Arm Up", |a| {
            a.waist = PI / 8.0;
            a.left_shoulder = -PI / 2.0;
            a.right_shoulder = PI / 2.0;
        }),
    ]
}

fn camera_poses() -> Vec<Pose> {
    vec![
        pose("T-Pose", |_| {}),
        pose("Arms Forward", |a| {
            a.left_shoulder = PI / 2.0;
            a.right_shoulder = PI / 2.0;
        }),
        pose("Arms Slightly Raised", |a| {
            a.left_shoulder = PI * 3.0 / 4.0;
            a.right_shoulder = PI / 4.0;
        }),
        pose("Elbows Bent", |a| {
            a.left_elbow = PI / 2.0;
            a.right_elbow = PI / 2.0;
        }),
        pose("Left Arm Forward", |a| {
            a.left_shoulder = PI / 2.0;
        }),
        pose("Right Arm Forward", |a| {
            a.right_shoulder = PI / 2.0;
        }),
        pose("Legs Apart", |a| {
            a.left_hip = PI / 6.0;
            a.right_hip = -PI / 6.0;
        }),
        pose("Left Knee Bend", |a| {
            a.left_hip = PI / 3.0;
            a.left_knee = -PI / 2.0;
        }),
        pose("Right Knee Bend", |a| {
            a.right_hip = -PI / 2.0;
            a.right_knee = PI / 2.0;
        }),
        pose("Hands Together", |a| {
            a.left_shoulder = PI / 2.0;
            a.left_elbow = PI / 4.0;
            a.right_shoulder = PI / 2.0;
            a.right_elbow = -PI / 4.0;
        }),
    ]
}
