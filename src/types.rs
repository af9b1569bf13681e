use std::{f32::consts::PI, time::Instant};

use crate::error::KernelError;

/// Body parts reported by the pose estimator (PoseNet's 17-part layout).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    pub const ALL: [KeypointName; 17] = [
        KeypointName::Nose,
        KeypointName::LeftEye,
        KeypointName::RightEye,
        KeypointName::LeftEar,
        KeypointName::RightEar,
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

    pub fn part(&self) -> &'static str {
        match self {
            KeypointName::Nose => "nose",
            KeypointName::LeftEye => "leftEye",
            KeypointName::RightEye => "rightEye",
            KeypointName::LeftEar => "leftEar",
            KeypointName::RightEar => "rightEar",
            KeypointName::LeftShoulder => "leftShoulder",
            KeypointName::RightShoulder => "rightShoulder",
            KeypointName::LeftElbow => "leftElbow",
            KeypointName::RightElbow => "rightElbow",
            KeypointName::LeftWrist => "leftWrist",
            KeypointName::RightWrist => "rightWrist",
            KeypointName::LeftHip => "leftHip",
            KeypointName::RightHip => "rightHip",
            KeypointName::LeftKnee => "leftKnee",
            KeypointName::RightKnee => "rightKnee",
            KeypointName::LeftAnkle => "leftAnkle",
            KeypointName::RightAnkle => "rightAnkle",
        }
    }

    /// Parses an estimator part label such as `"leftShoulder"`.
    pub fn from_part(part: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|name| name.part() == part)
    }
}

/// One landmark detection in source pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub name: KeypointName,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(name: KeypointName, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name,
            x,
            y,
            confidence,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.confidence.is_finite()
    }
}

/// All detections for the first person seen in one video frame.
#[derive(Clone, Debug)]
pub struct PoseFrame {
    pub keypoints: Vec<Keypoint>,
    pub timestamp: Instant,
}

impl PoseFrame {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            timestamp: Instant::now(),
        }
    }

    /// Empty frame: the estimator saw nobody.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn has_person(&self) -> bool {
        !self.keypoints.is_empty()
    }

    /// First detection of `name`. Detections carrying NaN or infinite values
    /// count as absent.
    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints
            .iter()
            .find(|kp| kp.name == name)
            .filter(|kp| kp.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Moves `length` along the direction `angle` (screen space, y down).
    pub fn polar_offset(&self, angle: f32, length: f32) -> Point {
        Point::new(self.x + angle.cos() * length, self.y + angle.sin() * length)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Keys of an [`AngleSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AngleName {
    Neck,
    Waist,
    LeftShoulder,
    LeftElbow,
    RightShoulder,
    RightElbow,
    LeftHip,
    LeftKnee,
    RightHip,
    RightKnee,
}

impl AngleName {
    pub const ALL: [AngleName; 10] = [
        AngleName::Neck,
        AngleName::Waist,
        AngleName::LeftShoulder,
        AngleName::LeftElbow,
        AngleName::RightShoulder,
        AngleName::RightElbow,
        AngleName::LeftHip,
        AngleName::LeftKnee,
        AngleName::RightHip,
        AngleName::RightKnee,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AngleName::Neck => "neck",
            AngleName::Waist => "waist",
            AngleName::LeftShoulder => "leftShoulder",
            AngleName::LeftElbow => "leftElbow",
            AngleName::RightShoulder => "rightShoulder",
            AngleName::RightElbow => "rightElbow",
            AngleName::LeftHip => "leftHip",
            AngleName::LeftKnee => "leftKnee",
            AngleName::RightHip => "rightHip",
            AngleName::RightKnee => "rightKnee",
        }
    }

    pub fn is_knee(&self) -> bool {
        matches!(self, AngleName::LeftKnee | AngleName::RightKnee)
    }

    pub fn is_elbow(&self) -> bool {
        matches!(self, AngleName::LeftElbow | AngleName::RightElbow)
    }
}

impl std::fmt::Display for AngleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative joint angles in radians, each in (-pi, pi].
///
/// Shoulders are absolute in the unrotated frame (left ~ pi points left,
/// right ~ 0 points right); elbows are relative to their upper arm; hips are
/// measured from "hanging straight down"; knees are relative to their thigh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleSet {
    pub neck: f32,
    pub waist: f32,
    pub left_shoulder: f32,
    pub left_elbow: f32,
    pub right_shoulder: f32,
    pub right_elbow: f32,
    pub left_hip: f32,
    pub left_knee: f32,
    pub right_hip: f32,
    pub right_knee: f32,
}

impl AngleSet {
    /// Arms horizontal, legs straight down, no lean.
    pub const T_POSE: AngleSet = AngleSet {
        neck: 0.0,
        waist: 0.0,
        left_shoulder: PI,
        left_elbow: 0.0,
        right_shoulder: 0.0,
        right_elbow: 0.0,
        left_hip: 0.0,
        left_knee: 0.0,
        right_hip: 0.0,
        right_knee: 0.0,
    };

    pub fn get(&self, name: AngleName) -> f32 {
        match name {
            AngleName::Neck => self.neck,
            AngleName::Waist => self.waist,
            AngleName::LeftShoulder => self.left_shoulder,
            AngleName::LeftElbow => self.left_elbow,
            AngleName::RightShoulder => self.right_shoulder,
            AngleName::RightElbow => self.right_elbow,
            AngleName::LeftHip => self.left_hip,
            AngleName::LeftKnee => self.left_knee,
            AngleName::RightHip => self.right_hip,
            AngleName::RightKnee => self.right_knee,
        }
    }

    pub fn set(&mut self, name: AngleName, value: f32) {
        let slot = match name {
            AngleName::Neck => &mut self.neck,
            AngleName::Waist => &mut self.waist,
            AngleName::LeftShoulder => &mut self.left_shoulder,
            AngleName::LeftElbow => &mut self.left_elbow,
            AngleName::RightShoulder => &mut self.right_shoulder,
            AngleName::RightElbow => &mut self.right_elbow,
            AngleName::LeftHip => &mut self.left_hip,
            AngleName::LeftKnee => &mut self.left_knee,
            AngleName::RightHip => &mut self.right_hip,
            AngleName::RightKnee => &mut self.right_knee,
        };
        *slot = value;
    }

    /// Rejects NaN/infinite entries and normalizes the rest into (-pi, pi].
    pub fn validated(mut self) -> Result<Self, KernelError> {
        for name in AngleName::ALL {
            let value = self.get(name);
            if !value.is_finite() {
                return Err(KernelError::NonFiniteAngle { angle: name, value });
            }
            self.set(name, crate::angle::normalize(value));
        }
        Ok(self)
    }
}

impl Default for AngleSet {
    fn default() -> Self {
        Self::T_POSE
    }
}

/// Positions of the figure's joints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointName {
    Waist,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHand,
    RightHand,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftFoot,
    RightFoot,
}

impl JointName {
    pub const ALL: [JointName; 15] = [
        JointName::Waist,
        JointName::Neck,
        JointName::Head,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftHand,
        JointName::RightHand,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftFoot,
        JointName::RightFoot,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointPositionSet {
    pub waist: Point,
    pub neck: Point,
    pub head: Point,
    pub left_shoulder: Point,
    pub right_shoulder: Point,
    pub left_elbow: Point,
    pub right_elbow: Point,
    pub left_hand: Point,
    pub right_hand: Point,
    pub left_hip: Point,
    pub right_hip: Point,
    pub left_knee: Point,
    pub right_knee: Point,
    pub left_foot: Point,
    pub right_foot: Point,
}

impl JointPositionSet {
    pub fn get(&self, name: JointName) -> Point {
        match name {
            JointName::Waist => self.waist,
            JointName::Neck => self.neck,
            JointName::Head => self.head,
            JointName::LeftShoulder => self.left_shoulder,
            JointName::RightShoulder => self.right_shoulder,
            JointName::LeftElbow => self.left_elbow,
            JointName::RightElbow => self.right_elbow,
            JointName::LeftHand => self.left_hand,
            JointName::RightHand => self.right_hand,
            JointName::LeftHip => self.left_hip,
            JointName::RightHip => self.right_hip,
            JointName::LeftKnee => self.left_knee,
            JointName::RightKnee => self.right_knee,
            JointName::LeftFoot => self.left_foot,
            JointName::RightFoot => self.right_foot,
        }
    }

    /// Line segments a renderer draws for the figure.
    pub fn bones(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        BONES.iter().map(|&(a, b)| (self.get(a), self.get(b)))
    }
}

pub const BONES: &[(JointName, JointName)] = &[
    (JointName::Waist, JointName::Neck),
    (JointName::Neck, JointName::Head),
    (JointName::LeftShoulder, JointName::RightShoulder),
    (JointName::LeftShoulder, JointName::LeftElbow),
    (JointName::LeftElbow, JointName::LeftHand),
    (JointName::RightShoulder, JointName::RightElbow),
    (JointName::RightElbow, JointName::RightHand),
    (JointName::LeftHip, JointName::RightHip),
    (JointName::LeftHip, JointName::LeftKnee),
    (JointName::LeftKnee, JointName::LeftFoot),
    (JointName::RightHip, JointName::RightKnee),
    (JointName::RightKnee, JointName::RightFoot),
];

/// How the figure is being driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlMode {
    #[default]
    Mouse,
    Camera,
}

impl ControlMode {
    pub fn label(&self) -> &'static str {
        match self {
            ControlMode::Mouse => "mouse",
            ControlMode::Camera => "camera",
        }
    }
}
