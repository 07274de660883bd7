//! Кинематика: velocity + heading в плоскости XY

use bevy::prelude::*;

/// Скорость тела (headless интеграция, без Rapier forces)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// rad/sec вокруг Z
    pub angular_velocity: f32,
    /// Доля скорости, теряемая за секунду
    pub linear_damping: f32,
}

impl PhysicsBody {
    pub fn with_damping(linear_damping: f32) -> Self {
        Self {
            linear_damping,
            ..Default::default()
        }
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }
}

/// Позиция entity в плоскости симуляции
pub fn planar_position(transform: &Transform) -> Vec2 {
    transform.translation.truncate()
}

/// Heading = локальная +X ось, повёрнутая вокруг Z
pub fn heading(transform: &Transform) -> Vec2 {
    (transform.rotation * Vec3::X).truncate().normalize_or_zero()
}

/// Развернуть transform вдоль `direction` (нулевой вектор игнорируется)
pub fn face_direction(transform: &mut Transform, direction: Vec2) {
    if direction.length_squared() <= f32::EPSILON {
        return;
    }
    transform.rotation = Quat::from_rotation_z(direction.y.atan2(direction.x));
}
