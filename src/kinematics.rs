use std::f32::consts::FRAC_PI_2;

use crate::{
    config::SegmentLengths,
    types::{AngleSet, JointPositionSet, Point},
};

/// Horizontal hip offset from the lower torso point. Hips do not follow the
/// waist lean.
pub const PELVIS_HALF_WIDTH: f32 = 10.0;

/// Forward kinematics for the ragdoll bone chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KinematicsSolver {
    segments: SegmentLengths,
}

impl KinematicsSolver {
    pub fn new(segments: SegmentLengths) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &SegmentLengths {
        &self.segments
    }

    /// Places every joint for `angles` with the waist pinned at `anchor`.
    ///
    /// Each joint is computed from already-placed ancestors only: waist,
    /// upper torso (neck), head, shoulders, arms, lower torso, hips, legs.
    pub fn solve(&self, angles: &AngleSet, anchor: Point) -> JointPositionSet {
        let seg = &self.segments;
        let waist_angle = angles.waist;

        let waist = anchor;

        // Waist angle tilts the whole upper body about the waist.
        let upper_torso = Point::new(
            waist.x + waist_angle.sin() * seg.upper_torso_height,
            waist.y - waist_angle.cos() * seg.upper_torso_height,
        );
        let neck = upper_torso;

        let head_angle = waist_angle + angles.neck;
        let head = Point::new(
            neck.x + head_angle.sin() * seg.head_radius,
            neck.y - head_angle.cos() * seg.head_radius,
        );

        let half_width = seg.torso_width / 2.0;
        let left_shoulder = Point::new(
            upper_torso.x - half_width * waist_angle.cos(),
            upper_torso.y - half_width * waist_angle.sin(),
        );
        let right_shoulder = Point::new(
            upper_torso.x + half_width * waist_angle.cos(),
            upper_torso.y + half_width * waist_angle.sin(),
        );

        let (left_elbow, left_hand) = arm(
            left_shoulder,
            angles.left_shoulder + waist_angle,
            angles.left_elbow,
            seg,
        );
        let (right_elbow, right_hand) = arm(
            right_shoulder,
            angles.right_shoulder + waist_angle,
            angles.right_elbow,
            seg,
        );

        let lower_torso = Point::new(
            waist.x - waist_angle.sin() * seg.lower_torso_height,
            waist.y + waist_angle.cos() * seg.lower_torso_height,
        );

        let left_hip = Point::new(lower_torso.x - PELVIS_HALF_WIDTH, lower_torso.y);
        let right_hip = Point::new(lower_torso.x + PELVIS_HALF_WIDTH, lower_torso.y);

        let (left_knee, left_foot) = leg(left_hip, angles.left_hip, angles.left_knee, seg);
        let (right_knee, right_foot) = leg(right_hip, angles.right_hip, angles.right_knee, seg);

        JointPositionSet {
            waist,
            neck,
            head,
            left_shoulder,
            right_shoulder,
            left_elbow,
            right_elbow,
            left_hand,
            right_hand,
            left_hip,
            right_hip,
            left_knee,
            right_knee,
            left_foot,
            right_foot,
        }
    }
}

// Left and right limbs share one formula; only the stored angles differ.
fn arm(shoulder: Point, upper_angle: f32, elbow: f32, seg: &SegmentLengths) -> (Point, Point) {
    let elbow_pos = shoulder.polar_offset(upper_angle, seg.upper_arm);
    let hand = elbow_pos.polar_offset(upper_angle + elbow, seg.lower_arm);
    (elbow_pos, hand)
}

// +pi/2 makes a zero hip angle hang the leg straight down.
fn leg(hip: Point, hip_angle: f32, knee: f32, seg: &SegmentLengths) -> (Point, Point) {
    let knee_pos = hip.polar_offset(hip_angle + FRAC_PI_2, seg.upper_leg);
    let foot = knee_pos.polar_offset(hip_angle + knee + FRAC_PI_2, seg.lower_leg);
    (knee_pos, foot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    fn solver() -> KinematicsSolver {
        KinematicsSolver::default()
    }

    #[test]
    fn test_solve_is_deterministic() {
        let mut angles = AngleSet::T_POSE;
        angles.waist = 0.3;
        angles.neck = -0.2;
        angles.left_elbow = 1.1;
        angles.right_knee = -0.7;
        let anchor = Point::new(400.0, 300.0);
        let a = solver().solve(&angles, anchor);
        let b = solver().solve(&angles, anchor);
        assert_eq!(a, b);
    }

    #[test]
    fn test_t_pose_arms_are_horizontal() {
        let joints = solver().solve(&AngleSet::T_POSE, Point::new(0.0, 0.0));
        assert_abs_diff_eq!(joints.left_elbow.y, joints.left_shoulder.y, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.left_hand.y, joints.left_elbow.y, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.right_hand.y, joints.right_shoulder.y, epsilon = 1e-4);
        assert!(joints.left_hand.x < joints.left_shoulder.x);
        assert!(joints.right_hand.x > joints.right_shoulder.x);
    }

    #[test]
    fn test_t_pose_reference_coordinates() {
        let seg = SegmentLengths::default();
        let joints = solver().solve(&AngleSet::T_POSE, Point::new(0.0, 0.0));
        assert_eq!(joints.waist, Point::new(0.0, 0.0));
        assert_abs_diff_eq!(joints.neck.y, -seg.upper_torso_height, epsilon = 1e-4);
        assert_abs_diff_eq!(
            joints.head.y,
            -seg.upper_torso_height - seg.head_radius,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(joints.left_shoulder.x, -seg.torso_width / 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(
            joints.left_hand.x,
            -seg.torso_width / 2.0 - seg.upper_arm - seg.lower_arm,
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(joints.left_hip.x, -PELVIS_HALF_WIDTH, epsilon = 1e-4);
        assert_abs_diff_eq!(
            joints.right_foot.y,
            seg.lower_torso_height + seg.upper_leg + seg.lower_leg,
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(joints.right_foot.x, PELVIS_HALF_WIDTH, epsilon = 1e-4);
    }

    #[test]
    fn test_waist_lean_rotates_upper_body_only() {
        let mut angles = AngleSet::T_POSE;
        angles.waist = PI / 2.0;
        let joints = solver().solve(&angles, Point::new(0.0, 0.0));
        let seg = SegmentLengths::default();
        // Upper torso swings to +x, lower torso to -x.
        assert_abs_diff_eq!(joints.neck.x, seg.upper_torso_height, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.neck.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.left_hip.x, -seg.lower_torso_height - PELVIS_HALF_WIDTH, epsilon = 1e-4);
        // Hips keep their horizontal offset regardless of lean.
        assert_abs_diff_eq!(joints.left_hip.y, joints.right_hip.y, epsilon = 1e-4);
    }

    #[test]
    fn test_bent_knee_moves_foot_not_knee() {
        let straight = solver().solve(&AngleSet::T_POSE, Point::new(0.0, 0.0));
        let mut angles = AngleSet::T_POSE;
        angles.left_knee = -PI / 2.0;
        let bent = solver().solve(&angles, Point::new(0.0, 0.0));
        assert_eq!(bent.left_knee, straight.left_knee);
        assert_ne!(bent.left_foot, straight.left_foot);
        assert_abs_diff_eq!(bent.left_foot.y, bent.left_knee.y, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_waist_and_neck_stack_vertically() {
        let seg = SegmentLengths::compact();
        let joints = KinematicsSolver::new(seg).solve(&AngleSet::T_POSE, Point::new(50.0, 80.0));
        assert_abs_diff_eq!(joints.neck.x, 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.head.x, 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(joints.left_hip.y, 80.0 + seg.lower_torso_height, epsilon = 1e-4);
    }
}
