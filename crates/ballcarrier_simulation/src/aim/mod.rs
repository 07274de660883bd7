//! Aim assist module
//!
//! - assist: snap-lock state machine (AimAssist engine)
//! - targets: кэш ссылок на партнёра и ворота

pub mod assist;
pub mod targets;


// Re-export основных типов
pub use assist::{angle_between_deg, lerp_heading, AimAssist, AimInputs, AimOutput, AimState, AimTarget};
pub use targets::{direction_towards, goal_aim_point, resolve_aim_targets, AimTargets};
