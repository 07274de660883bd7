//! Carrier: агент, способный владеть мячом

use bevy::prelude::*;

use crate::aim::{AimAssist, AimTargets};
use crate::components::PhysicsBody;
use crate::config::CarrierTuning;
use crate::possession::CooldownGuard;

/// Один эпизод владения мячом
///
/// Живёт ровно от StartCarrying до DropBall; пока он есть, `carry_ball`
/// двигает мяч каждый fixed tick.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CarryBout {
    pub ball: Entity,
    /// Вычисляется один раз при подборе
    pub orbit_radius: f32,
    /// `Time<Fixed>::elapsed_secs()` на момент подбора
    pub started_at: f32,
}

/// Carrier
///
/// `StateManager` и `CarrierMovement` опциональны: без них подбор идёт
/// без state gating, а raw-поворот просто не применяется.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    PhysicsBody,
    SteeringInput,
    CarrierTuning,
    CooldownGuard,
    AimAssist,
    AimTargets
)]
pub struct BallCarrier {
    /// Половина ширины спрайта (с учётом scale)
    pub half_extent: f32,
    bout: Option<CarryBout>,
}

impl Default for BallCarrier {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl BallCarrier {
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent,
            bout: None,
        }
    }

    pub fn is_carrying(&self) -> bool {
        self.bout.is_some()
    }

    pub fn carried_ball(&self) -> Option<Entity> {
        self.bout.map(|bout| bout.ball)
    }

    pub fn bout(&self) -> Option<&CarryBout> {
        self.bout.as_ref()
    }

    /// Радиус орбиты для мяча с коллайдером `ball_radius`
    pub fn orbit_radius(&self, ball_radius: f32, multiplier: f32) -> f32 {
        multiplier * (self.half_extent + ball_radius)
    }

    pub fn begin_bout(&mut self, bout: CarryBout) {
        self.bout = Some(bout);
    }

    pub fn end_bout(&mut self) -> Option<CarryBout> {
        self.bout.take()
    }
}

/// Raw steering input (заполняется input/AI коллаборатором)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SteeringInput {
    pub direction: Vec2,
}

impl SteeringInput {
    pub fn new(direction: Vec2) -> Self {
        Self { direction }
    }

    pub fn is_idle(&self) -> bool {
        self.direction.length_squared() <= f32::EPSILON
    }
}
