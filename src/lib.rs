//! Pose-matching kernel for a ragdoll figure driven by mouse drags or by
//! camera keypoints.

pub mod angle;
pub mod calibration;
pub mod catalog;
pub mod config;
pub mod drag;
pub mod error;
pub mod kinematics;
pub mod matcher;
pub mod pipeline;
pub mod pose_signal;
pub mod session;
pub mod types;
pub mod wall;

pub use calibration::{CalibrationGate, CalibrationState, ReferenceData};
pub use catalog::{Pose, PoseCatalog};
pub use config::{
    CalibrationConfig, KernelConfig, MatchConfig, PassThresholds, SegmentLengths,
    SmoothingConfig, WallConfig,
};
pub use drag::{DragHandle, JointDrag};
pub use error::KernelError;
pub use kinematics::KinematicsSolver;
pub use matcher::PoseMatcher;
pub use pose_signal::PoseSignalProcessor;
pub use session::{CameraTick, Session};
pub use types::{
    AngleName, AngleSet, ControlMode, JointName, JointPositionSet, Keypoint, KeypointName,
    Point, PoseFrame,
};
pub use wall::{WallEvent, WallPhase, WallRound};
