//! One player's game state: the figure, its input path and its targets.

use crate::{
    calibration::{CalibrationGate, CalibrationState},
    catalog::{Pose, PoseCatalog},
    config::KernelConfig,
    drag::{DragHandle, JointDrag},
    error::KernelError,
    kinematics::KinematicsSolver,
    matcher::PoseMatcher,
    pose_signal::PoseSignalProcessor,
    types::{AngleSet, ControlMode, JointPositionSet, Point, PoseFrame},
    wall::{WallEvent, WallRound},
};

/// What a camera frame did to the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraTick {
    /// The session is in mouse mode; the frame was dropped.
    Ignored,
    /// Still waiting for a held T-pose. `progress` is in `[0, 1]`.
    Calibrating { progress: f32 },
    /// This frame completed calibration. Tracking starts with the next one.
    Calibrated,
    /// The figure now follows the frame.
    Updated,
    /// Not enough of the player was visible; the figure kept its pose.
    Unchanged,
}

pub struct Session {
    config: KernelConfig,
    mode: ControlMode,
    anchor: Point,
    free_drag: PoseCatalog,
    camera: PoseCatalog,
    gate: CalibrationGate,
    processor: PoseSignalProcessor,
    angles: AngleSet,
    solver: KinematicsSolver,
    matcher: PoseMatcher,
    drag: JointDrag,
    wall: Option<WallRound>,
}

impl Session {
    /// A mouse-mode session with the built-in catalogs, figure waist pinned
    /// at `anchor`.
    pub fn new(config: KernelConfig, anchor: Point) -> Result<Self, KernelError> {
        Self::with_catalogs(config, anchor, PoseCatalog::free_drag(), PoseCatalog::camera())
    }

    pub fn with_catalogs(
        config: KernelConfig,
        anchor: Point,
        free_drag: PoseCatalog,
        camera: PoseCatalog,
    ) -> Result<Self, KernelError> {
        config.validate()?;
        if !anchor.is_finite() {
            return Err(KernelError::NonFinitePoint {
                x: anchor.x,
                y: anchor.y,
            });
        }

        let solver = KinematicsSolver::new(config.segments);
        Ok(Self {
            mode: ControlMode::default(),
            anchor,
            free_drag,
            camera,
            gate: CalibrationGate::new(config.calibration.clone()),
            processor: PoseSignalProcessor::new(config.smoothing.clone()),
            angles: AngleSet::T_POSE,
            solver,
            matcher: PoseMatcher::new(solver, config.matching.clone()),
            drag: JointDrag::default(),
            wall: None,
            config,
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Switches input mode. The new mode's catalog starts over from its
    /// first pose, the figure returns to a T-pose and calibration restarts.
    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            log::info!("control mode: {} -> {}", self.mode.label(), mode.label());
        }
        self.mode = mode;
        self.catalog_mut().rewind();
        self.gate.reset();
        self.drag.end();
        self.reset_figure();
        if let Some(wall) = self.wall.as_mut() {
            wall.restart();
        }
    }

    pub fn catalog(&self) -> &PoseCatalog {
        match self.mode {
            ControlMode::Mouse => &self.free_drag,
            ControlMode::Camera => &self.camera,
        }
    }

    fn catalog_mut(&mut self) -> &mut PoseCatalog {
        match self.mode {
            ControlMode::Mouse => &mut self.free_drag,
            ControlMode::Camera => &mut self.camera,
        }
    }

    pub fn target(&self) -> &Pose {
        self.catalog().current()
    }

    pub fn next_pose(&mut self) -> &Pose {
        self.catalog_mut().advance()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.gate.state()
    }

    pub fn calibration(&self) -> &CalibrationGate {
        &self.gate
    }

    /// Abandons calibration; the player has to hold the T-pose again.
    pub fn cancel_calibration(&mut self) {
        self.gate.reset();
        self.processor.reset();
    }

    /// Feeds one camera frame, in arrival order.
    pub fn tick_camera(&mut self, frame: &PoseFrame) -> CameraTick {
        if self.mode != ControlMode::Camera {
            return CameraTick::Ignored;
        }

        if !self.gate.is_calibrated() {
            if self.gate.observe(frame) {
                return CameraTick::Calibrated;
            }
            return CameraTick::Calibrating {
                progress: self.gate.progress(),
            };
        }

        match self.processor.process(frame) {
            Some(angles) => {
                self.angles = angles;
                CameraTick::Updated
            }
            None => CameraTick::Unchanged,
        }
    }

    pub fn angles(&self) -> &AngleSet {
        &self.angles
    }

    /// Poses the figure directly. Angles are normalized; non-finite values
    /// are rejected and leave the figure as it was.
    pub fn set_angles(&mut self, angles: AngleSet) -> Result<(), KernelError> {
        self.angles = angles.validated()?;
        Ok(())
    }

    /// Back to a T-pose, including the camera smoothing history.
    pub fn reset_figure(&mut self) {
        self.angles = AngleSet::T_POSE;
        self.processor.reset();
    }

    pub fn positions(&self) -> JointPositionSet {
        self.solver.solve(&self.angles, self.anchor)
    }

    pub fn target_positions(&self) -> JointPositionSet {
        self.solver.solve(&self.target().angles, self.anchor)
    }

    /// Match score of the figure against the current target, 0 to 100.
    pub fn score(&self) -> f32 {
        self.matcher
            .score(&self.positions(), &self.target().angles, self.anchor)
    }

    pub fn is_success(&self) -> bool {
        self.score() >= self.config.thresholds.for_mode(self.mode)
    }

    /// Grabs the joint under `pointer`. Only mouse mode can drag.
    pub fn start_drag(&mut self, pointer: Point) -> Option<DragHandle> {
        if self.mode != ControlMode::Mouse {
            return None;
        }
        let positions = self.positions();
        self.drag.start(&positions, pointer)
    }

    pub fn drag_to(&mut self, pointer: Point) -> Result<bool, KernelError> {
        let positions = self.positions();
        self.drag.drag_to(&mut self.angles, &positions, pointer)
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    pub fn dragging(&self) -> Option<DragHandle> {
        self.drag.selected()
    }

    pub fn start_wall(&mut self) {
        self.wall = Some(WallRound::new(self.config.wall.clone()));
    }

    pub fn stop_wall(&mut self) {
        self.wall = None;
    }

    pub fn wall(&self) -> Option<&WallRound> {
        self.wall.as_ref()
    }

    /// Advances the wall round by one frame. When the verdict has been shown
    /// long enough the session moves to the next pose, resets the figure and
    /// sends a new wall.
    pub fn tick_wall(&mut self) -> Option<WallEvent> {
        let score = self.score();
        let mode = self.mode;
        let event = self.wall.as_mut()?.tick(score, mode);
        if event == WallEvent::Advance {
            self.next_pose();
            self.reset_figure();
            if let Some(wall) = self.wall.as_mut() {
                wall.restart();
            }
        }
        Some(event)
    }
}
