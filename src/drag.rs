//! Mouse-mode posing: grab a joint and point it somewhere.
//!
//! Dragging writes the angle that aims the grabbed joint's bone at the
//! pointer, measured against its already-placed parent. No smoothing or
//! calibration applies on this path.

use std::f32::consts::FRAC_PI_2;

use crate::{
    angle::normalize,
    error::KernelError,
    types::{AngleSet, JointName, JointPositionSet, Point},
};

pub const DEFAULT_GRAB_RADIUS: f32 = 15.0;

/// Joints the player can grab, in pick priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragHandle {
    LeftElbow,
    LeftHand,
    RightElbow,
    RightHand,
    LeftKnee,
    LeftFoot,
    RightKnee,
    RightFoot,
    Head,
    Neck,
}

impl DragHandle {
    pub const ALL: [DragHandle; 10] = [
        DragHandle::LeftElbow,
        DragHandle::LeftHand,
        DragHandle::RightElbow,
        DragHandle::RightHand,
        DragHandle::LeftKnee,
        DragHandle::LeftFoot,
        DragHandle::RightKnee,
        DragHandle::RightFoot,
        DragHandle::Head,
        DragHandle::Neck,
    ];

    pub fn joint(&self) -> JointName {
        match self {
            DragHandle::LeftElbow => JointName::LeftElbow,
            DragHandle::LeftHand => JointName::LeftHand,
            DragHandle::RightElbow => JointName::RightElbow,
            DragHandle::RightHand => JointName::RightHand,
            DragHandle::LeftKnee => JointName::LeftKnee,
            DragHandle::LeftFoot => JointName::LeftFoot,
            DragHandle::RightKnee => JointName::RightKnee,
            DragHandle::RightFoot => JointName::RightFoot,
            DragHandle::Head => JointName::Head,
            DragHandle::Neck => JointName::Neck,
        }
    }
}

fn direction(from: Point, to: Point) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

// Angle of `to` around `from` where 0 is straight up, matching the torso
// and head lean convention.
fn lean(from: Point, to: Point) -> f32 {
    (to.x - from.x).atan2(-(to.y - from.y))
}

/// Returns `angles` with the grabbed joint aimed at `pointer`.
pub fn apply_drag(
    handle: DragHandle,
    angles: &AngleSet,
    joints: &JointPositionSet,
    pointer: Point,
) -> AngleSet {
    let mut out = *angles;
    let waist = angles.waist;
    match handle {
        DragHandle::LeftElbow => {
            out.left_shoulder = normalize(direction(joints.left_shoulder, pointer) - waist);
        }
        DragHandle::LeftHand => {
            out.left_elbow =
                normalize(direction(joints.left_elbow, pointer) - angles.left_shoulder - waist);
        }
        DragHandle::RightElbow => {
            out.right_shoulder = normalize(direction(joints.right_shoulder, pointer) - waist);
        }
        DragHandle::RightHand => {
            out.right_elbow =
                normalize(direction(joints.right_elbow, pointer) - angles.right_shoulder - waist);
        }
        DragHandle::LeftKnee => {
            out.left_hip = normalize(direction(joints.left_hip, pointer) - FRAC_PI_2);
        }
        DragHandle::LeftFoot => {
            out.left_knee =
                normalize(direction(joints.left_knee, pointer) - FRAC_PI_2 - angles.left_hip);
        }
        DragHandle::RightKnee => {
            out.right_hip = normalize(direction(joints.right_hip, pointer) - FRAC_PI_2);
        }
        DragHandle::RightFoot => {
            out.right_knee =
                normalize(direction(joints.right_knee, pointer) - FRAC_PI_2 - angles.right_hip);
        }
        DragHandle::Head => {
            out.neck = normalize(lean(joints.neck, pointer) - waist);
        }
        DragHandle::Neck => {
            out.waist = normalize(lean(joints.waist, pointer));
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct JointDrag {
    grab_radius: f32,
    selected: Option<DragHandle>,
}

impl JointDrag {
    pub fn new(grab_radius: f32) -> Self {
        Self {
            grab_radius,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<DragHandle> {
        self.selected
    }

    /// Grabs the first handle within reach of `pointer`.
    pub fn start(&mut self, joints: &JointPositionSet, pointer: Point) -> Option<DragHandle> {
        self.selected = DragHandle::ALL
            .iter()
            .copied()
            .find(|handle| joints.get(handle.joint()).distance(pointer) < self.grab_radius);
        self.selected
    }

    /// Updates `angles` for the grabbed handle. Returns whether anything was
    /// grabbed.
    pub fn drag_to(
        &self,
        angles: &mut AngleSet,
        joints: &JointPositionSet,
        pointer: Point,
    ) -> Result<bool, KernelError> {
        if !pointer.is_finite() {
            return Err(KernelError::NonFinitePoint {
                x: pointer.x,
                y: pointer.y,
            });
        }
        let Some(handle) = self.selected else {
            return Ok(false);
        };
        *angles = apply_drag(handle, angles, joints, pointer);
        Ok(true)
    }

    pub fn end(&mut self) {
        self.selected = None;
    }
}

impl Default for JointDrag {
    fn default() -> Self {
        Self::new(DEFAULT_GRAB_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::KinematicsSolver;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    fn t_pose_joints() -> JointPositionSet {
        KinematicsSolver::default().solve(&AngleSet::T_POSE, Point::new(400.0, 300.0))
    }

    #[test]
    fn test_start_picks_handle_within_radius() {
        let joints = t_pose_joints();
        let mut drag = JointDrag::default();
        let near_hand = Point::new(joints.right_hand.x + 5.0, joints.right_hand.y);
        assert_eq!(drag.start(&joints, near_hand), Some(DragHandle::RightHand));
        drag.end();
        assert_eq!(drag.selected(), None);
        assert_eq!(drag.start(&joints, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_drag_elbow_straight_up() {
        let joints = t_pose_joints();
        let mut angles = AngleSet::T_POSE;
        let mut drag = JointDrag::default();
        drag.start(&joints, joints.left_elbow);
        let above = Point::new(joints.left_shoulder.x, joints.left_shoulder.y - 100.0);
        assert!(drag.drag_to(&mut angles, &joints, above).unwrap());
        assert_abs_diff_eq!(angles.left_shoulder, -PI / 2.0, epsilon = 1e-5);

        let solved = KinematicsSolver::default().solve(&angles, joints.waist);
        assert_abs_diff_eq!(solved.left_elbow.x, joints.left_shoulder.x, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_foot_sets_relative_knee() {
        let joints = t_pose_joints();
        let angles = AngleSet::T_POSE;
        let beside = Point::new(joints.right_knee.x + 50.0, joints.right_knee.y);
        let out = apply_drag(DragHandle::RightFoot, &angles, &joints, beside);
        assert_abs_diff_eq!(out.right_knee, -PI / 2.0, epsilon = 1e-5);
        assert_eq!(out.right_hip, angles.right_hip);
    }

    #[test]
    fn test_drag_hand_accounts_for_waist_lean() {
        let mut angles = AngleSet::T_POSE;
        angles.waist = 0.4;
        let joints = KinematicsSolver::default().solve(&angles, Point::new(0.0, 0.0));
        let target = Point::new(joints.right_elbow.x, joints.right_elbow.y + 40.0);
        let out = apply_drag(DragHandle::RightHand, &angles, &joints, target);
        let solved = KinematicsSolver::default().solve(&out, Point::new(0.0, 0.0));
        assert_abs_diff_eq!(solved.right_hand.x, joints.right_elbow.x, epsilon = 1e-3);
        assert!(solved.right_hand.y > joints.right_elbow.y);
    }

    #[test]
    fn test_drag_neck_leans_waist() {
        let joints = t_pose_joints();
        let right = Point::new(joints.waist.x + 60.0, joints.waist.y);
        let out = apply_drag(DragHandle::Neck, &AngleSet::T_POSE, &joints, right);
        assert_abs_diff_eq!(out.waist, PI / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_drag_head_tilts_neck_relative_to_waist() {
        let mut angles = AngleSet::T_POSE;
        angles.waist = 0.3;
        let joints = KinematicsSolver::default().solve(&angles, Point::new(0.0, 0.0));
        let straight_up = Point::new(joints.neck.x, joints.neck.y - 50.0);
        let out = apply_drag(DragHandle::Head, &angles, &joints, straight_up);
        assert_abs_diff_eq!(out.neck, -0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_non_finite_pointer_rejected() {
        let joints = t_pose_joints();
        let mut angles = AngleSet::T_POSE;
        let mut drag = JointDrag::default();
        drag.start(&joints, joints.left_hand);
        let err = drag
            .drag_to(&mut angles, &joints, Point::new(f32::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, KernelError::NonFinitePoint { .. }));
        assert_eq!(angles, AngleSet::T_POSE);
    }

    #[test]
    fn test_drag_without_selection_is_noop() {
        let joints = t_pose_joints();
        let mut angles = AngleSet::T_POSE;
        let drag = JointDrag::default();
        assert!(!drag.drag_to(&mut angles, &joints, Point::new(1.0, 1.0)).unwrap());
        assert_eq!(angles, AngleSet::T_POSE);
    }
}
