use thiserror::Error;

use crate::types::AngleName;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("angle {angle} is not finite: {value}")]
    NonFiniteAngle { angle: AngleName, value: f32 },

    #[error("point ({x}, {y}) is not finite")]
    NonFinitePoint { x: f32, y: f32 },

    #[error("pose catalog must hold at least one pose")]
    EmptyCatalog,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
