//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - body: кинематика (PhysicsBody, heading helpers)
//! - ball: possessable object (Ball, PossessionState)
//! - carrier: BallCarrier + CarryBout + SteeringInput
//! - team: Team, TeamMember, TeamColor, Goal

pub mod ball;
pub mod body;
pub mod carrier;
pub mod team;

// Re-exports для удобного импорта
pub use ball::*;
pub use body::*;
pub use carrier::*;
pub use team::*;
