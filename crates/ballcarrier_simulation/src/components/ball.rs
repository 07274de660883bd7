//! Possessable object: единственный мяч сессии

use bevy::prelude::*;
use thiserror::Error;

use crate::components::{PhysicsBody, TeamColor};
use crate::possession::CooldownGuard;

/// Отказ в смене владельца мяча
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PossessionError {
    #[error("ball is already held by {0:?}")]
    AlreadyHeld(Entity),

    #[error("ball is not held by {0:?}")]
    NotHeldBy(Entity),
}

/// Наблюдаемое состояние владения мячом
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PossessionState {
    Free,
    Held(Entity),
    /// Свободен, но `carrier` ещё не может его подобрать
    CoolingDown { carrier: Entity, remaining: f32 },
}

/// Мяч
///
/// Инвариант: не больше одного владельца. Владелец меняется только через
/// `try_acquire` / `release` (possession systems).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform, PhysicsBody)]
pub struct Ball {
    /// Радиус коллайдера
    pub radius: f32,
    owner: Option<Entity>,
    pub last_owner: Option<Entity>,
    /// Заряд (ready flag): цвет команды, для которой мяч заряжен
    pub charge: Option<TeamColor>,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Ball {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            owner: None,
            last_owner: None,
            charge: None,
        }
    }

    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn is_ownable(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_charged_for(&self, color: TeamColor) -> bool {
        self.charge == Some(color)
    }

    /// Exclusive: первый успешный вызов выигрывает, остальные получают ошибку
    pub fn try_acquire(&mut self, carrier: Entity) -> Result<(), PossessionError> {
        match self.owner {
            Some(owner) => Err(PossessionError::AlreadyHeld(owner)),
            None => {
                self.owner = Some(carrier);
                Ok(())
            }
        }
    }

    pub fn release(&mut self, carrier: Entity) -> Result<(), PossessionError> {
        if self.owner != Some(carrier) {
            return Err(PossessionError::NotHeldBy(carrier));
        }
        self.owner = None;
        self.last_owner = Some(carrier);
        Ok(())
    }

    /// `last_owner_guard`: CooldownGuard последнего владельца (если есть)
    pub fn possession_state(&self, last_owner_guard: Option<&CooldownGuard>) -> PossessionState {
        if let Some(owner) = self.owner {
            return PossessionState::Held(owner);
        }

        match (self.last_owner, last_owner_guard) {
            (Some(carrier), Some(guard)) if guard.is_cooling_down() => PossessionState::CoolingDown {
                carrier,
                remaining: guard.remaining(),
            },
            _ => PossessionState::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut ball = Ball::new(0.5);

        assert!(ball.try_acquire(a).is_ok());
        assert_eq!(ball.try_acquire(b), Err(PossessionError::AlreadyHeld(a)));
        assert_eq!(ball.owner(), Some(a));
    }

    #[test]
    fn test_release_records_last_owner() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut ball = Ball::new(0.5);
        ball.try_acquire(a).unwrap();

        assert_eq!(ball.release(b), Err(PossessionError::NotHeldBy(b)));
        assert!(ball.release(a).is_ok());
        assert!(ball.is_ownable());
        assert_eq!(ball.last_owner, Some(a));
    }

    #[test]
    fn test_possession_state_view() {
        let a = Entity::from_raw(1);
        let mut ball = Ball::new(0.5);
        assert_eq!(ball.possession_state(None), PossessionState::Free);

        ball.try_acquire(a).unwrap();
        assert_eq!(ball.possession_state(None), PossessionState::Held(a));

        ball.release(a).unwrap();
        let mut guard = CooldownGuard::default();
        guard.arm(0.1);
        assert!(matches!(
            ball.possession_state(Some(&guard)),
            PossessionState::CoolingDown { carrier, .. } if carrier == a
        ));

        guard.tick(0.2);
        assert_eq!(ball.possession_state(Some(&guard)), PossessionState::Free);
    }
}
