//! Movement коллаборатор: raw-input поворот, freeze/unfreeze, интеграция скорости
//!
//! Архитектура:
//! - `SteeringInput` пишет input/AI слой (high-level intent)
//! - `steer_carriers` превращает его в heading + velocity для свободных carrier'ов
//! - Во время владения мячом carrier заморожен, heading ведёт `carry_ball`
//! - `integrate_bodies`: headless интеграция velocity → Transform

use bevy::prelude::*;

use crate::components::{face_direction, heading, BallCarrier, PhysicsBody, SteeringInput};
use crate::possession::arc_placement::signed_angle_deg;
use crate::state::{StateChanged, StateKind, StateManager};

/// Параметры движения carrier'а
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CarrierMovement {
    /// Скорость поворота к input (deg/sec)
    pub turn_speed: f32,
    /// Скорость бега (units/sec)
    pub move_speed: f32,
    /// Заморожен (не двигается, пока владеет мячом)
    pub frozen: bool,
}

impl Default for CarrierMovement {
    fn default() -> Self {
        Self {
            turn_speed: 720.0,
            move_speed: 6.0,
            frozen: false,
        }
    }
}

impl CarrierMovement {
    pub fn freeze(&mut self, body: &mut PhysicsBody) {
        self.frozen = true;
        body.stop();
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}

/// Повернуть `current` к `input` не больше чем на `turn_speed * delta` градусов
///
/// Нулевой input оставляет heading как есть.
pub fn rotate_towards(current: Vec2, input: Vec2, turn_speed: f32, delta: f32) -> Vec2 {
    let target = input.normalize_or_zero();
    if target == Vec2::ZERO {
        return current;
    }

    let current = current.normalize_or_zero();
    if current == Vec2::ZERO {
        return target;
    }

    let angle = signed_angle_deg(current, target);
    let max_step = turn_speed * delta;
    let step = angle.clamp(-max_step, max_step);

    Vec2::from_angle(step.to_radians()).rotate(current)
}

/// Система: raw steering для свободных carrier'ов
///
/// Пропускает замороженных и владеющих мячом, а также оглушённых: их velocity
/// задаётся knockback'ом и затухает в `integrate_bodies`.
pub fn steer_carriers(
    mut carriers: Query<(
        &SteeringInput,
        &CarrierMovement,
        &mut Transform,
        &mut PhysicsBody,
        &BallCarrier,
        Option<&StateManager>,
    )>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (input, movement, mut transform, mut body, carrier, state) in carriers.iter_mut() {
        // Heading carrier'а с мячом ведёт carry_ball
        if movement.frozen || carrier.is_carrying() {
            continue;
        }
        if state.is_some_and(|state| state.is_in(StateKind::Stunned)) {
            continue;
        }

        let new_heading = rotate_towards(heading(&transform), input.direction, movement.turn_speed, delta);
        face_direction(&mut transform, new_heading);
        body.velocity = input.direction.clamp_length_max(1.0) * movement.move_speed;
    }
}

/// Система: enter/exit hooks для Possession (freeze/unfreeze)
pub fn freeze_while_possessing(
    mut state_changes: EventReader<StateChanged>,
    mut carriers: Query<(&mut CarrierMovement, &mut PhysicsBody)>,
) {
    for change in state_changes.read() {
        let Ok((mut movement, mut body)) = carriers.get_mut(change.carrier) else {
            continue;
        };

        if change.entered(StateKind::Possession) {
            movement.freeze(&mut body);
        } else if change.exited(StateKind::Possession) {
            movement.unfreeze();
        }
    }
}

/// Система: интеграция velocity → Transform (headless, без Rapier)
pub fn integrate_bodies(
    mut bodies: Query<(&mut PhysicsBody, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut body, mut transform) in bodies.iter_mut() {
        if body.velocity == Vec2::ZERO && body.angular_velocity == 0.0 {
            continue;
        }

        transform.translation += (body.velocity * delta).extend(0.0);
        if body.angular_velocity != 0.0 {
            transform.rotate_z(body.angular_velocity * delta);
        }

        let damping = (1.0 - body.linear_damping * delta).max(0.0);
        body.velocity *= damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_towards_clamps_step() {
        // 90° разворот, 720 deg/s, dt = 1/60 → 12° за тик
        let rotated = rotate_towards(Vec2::X, Vec2::Y, 720.0, 1.0 / 60.0);
        let angle = signed_angle_deg(Vec2::X, rotated);
        assert!((angle - 12.0).abs() < 1e-3, "angle = {}", angle);
        assert!((rotated.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_reaches_target() {
        let rotated = rotate_towards(Vec2::X, Vec2::new(1.0, 0.05), 720.0, 1.0);
        assert!((rotated - Vec2::new(1.0, 0.05).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_clockwise() {
        let rotated = rotate_towards(Vec2::X, -Vec2::Y, 90.0, 0.5);
        let angle = signed_angle_deg(Vec2::X, rotated);
        assert!((angle + 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_input_keeps_heading() {
        assert_eq!(rotate_towards(Vec2::Y, Vec2::ZERO, 720.0, 0.1), Vec2::Y);
    }

    #[test]
    fn test_freeze_stops_body() {
        let mut movement = CarrierMovement::default();
        let mut body = PhysicsBody::default();
        body.velocity = Vec2::new(5.0, 0.0);

        movement.freeze(&mut body);
        assert!(movement.frozen);
        assert_eq!(body.velocity, Vec2::ZERO);

        movement.unfreeze();
        assert!(!movement.frozen);
    }
}
