use crate::{
    config::MatchConfig,
    kinematics::KinematicsSolver,
    types::{AngleSet, JointName, JointPositionSet, Point},
};

/// Joints compared when scoring. The waist is left out because both figures
/// are anchored there.
pub const COMPARED_JOINTS: [JointName; 9] = [
    JointName::Head,
    JointName::LeftElbow,
    JointName::LeftHand,
    JointName::RightElbow,
    JointName::RightHand,
    JointName::LeftKnee,
    JointName::LeftFoot,
    JointName::RightKnee,
    JointName::RightFoot,
];

/// Scores how closely a live figure matches a target pose, 0 to 100.
#[derive(Clone, Debug, Default)]
pub struct PoseMatcher {
    solver: KinematicsSolver,
    config: MatchConfig,
}

impl PoseMatcher {
    pub fn new(solver: KinematicsSolver, config: MatchConfig) -> Self {
        Self { solver, config }
    }

    pub fn max_allowed_distance(&self) -> f32 {
        self.config.max_allowed_distance
    }

    /// Solves `target_angles` at `target_anchor` with the live figure's
    /// segment lengths and scores the live positions against it.
    pub fn score(
        &self,
        live: &JointPositionSet,
        target_angles: &AngleSet,
        target_anchor: Point,
    ) -> f32 {
        let target = self.solver.solve(target_angles, target_anchor);
        self.score_positions(live, &target)
    }

    /// Scores against a target placed at the live figure's waist.
    pub fn score_at_waist(&self, live: &JointPositionSet, target_angles: &AngleSet) -> f32 {
        self.score(live, target_angles, live.waist)
    }

    pub fn score_positions(&self, live: &JointPositionSet, target: &JointPositionSet) -> f32 {
        let avg_distance = average_distance(live, target);
        // NaN positions collapse to 0 through `max`.
        (100.0 - avg_distance / self.config.max_allowed_distance * 100.0).max(0.0)
    }
}

pub fn average_distance(live: &JointPositionSet, target: &JointPositionSet) -> f32 {
    let total: f32 = COMPARED_JOINTS
        .iter()
        .map(|joint| live.get(*joint).distance(target.get(*joint)))
        .sum();
    total / COMPARED_JOINTS.len() as f32
}
