//! Possession events
//!
//! Наружу (observers: slow-mo, laser guide, tutorial, audio) и внутрь
//! (`DropBallIntent` от input/AI коллаборатора).

use bevy::prelude::*;

/// Event: carrier получил мяч (после успешного StartCarrying)
///
/// Триггерит blowback.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallPickedUp {
    pub carrier: Entity,
    pub ball: Entity,
    /// Партнёр по команде, от которого пришёл пас
    pub passed_from: Option<Entity>,
}

/// Почему мяч был отпущен
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// `DropBallIntent` (пас, удар, просто отпустил)
    Released,
    /// Carrier вышел из Possession (stun и т.п.)
    Interrupted,
    /// Carrier удалён из мира (без cooldown)
    CarrierRemoved,
}

/// Event: мяч отпущен
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallDropped {
    pub carrier: Entity,
    pub ball: Entity,
    pub reason: DropReason,
}

/// Event: carrier оглушён (blowback или заряженный мяч)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CarrierStunned {
    pub carrier: Entity,
    /// Источник: carrier, подобравший мяч, или последний владелец заряженного мяча
    pub by: Option<Entity>,
    pub knockback: Vec2,
}

/// Event: запрос отпустить мяч
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DropBallIntent {
    pub carrier: Entity,
    /// Скорость, с которой мяч уходит (ноль = просто отпустить)
    pub launch: Vec2,
}

impl DropBallIntent {
    pub fn release(carrier: Entity) -> Self {
        Self {
            carrier,
            launch: Vec2::ZERO,
        }
    }

    pub fn launch(carrier: Entity, launch: Vec2) -> Self {
        Self { carrier, launch }
    }
}
