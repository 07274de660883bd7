//! Arc placement: мяч движется по окружности радиуса r вокруг carrier'а
//!
//! В отличие от прямого lerp позиции, точка никогда не срезает хорду и
//! остаётся на орбите: |P′ − C| = r.

use std::f32::consts::PI;

use bevy::prelude::*;

/// Ниже этого угла (градусы) считаем, что мяч уже на месте
pub const ANGLE_TOLERANCE_DEG: f32 = 1e-4;

/// Ниже этого радиуса орбиты нет
pub const RADIUS_TOLERANCE: f32 = 1e-6;

/// Знаковый угол from → to в градусах, (−180, 180], против часовой = +
pub fn signed_angle_deg(from: Vec2, to: Vec2) -> f32 {
    let angle = from.perp_dot(to).atan2(from.dot(to)).to_degrees();
    // atan2 даёт −180 для строго противоположных векторов
    if angle <= -180.0 {
        180.0
    } else {
        angle
    }
}

/// Следующая позиция мяча на орбите
///
/// - `current`: текущая позиция мяча P
/// - `center`: центр carrier'а C
/// - `target`: целевая точка T = C + heading · radius
/// - `angular_speed`: максимальная длина дуги за секунду
///
/// δ ≈ 0 или r ≈ 0 → P без изменений (длина дуги была бы нулевой).
/// P == C: угла нет, мяч ставится сразу в T.
pub fn arc_placement(
    current: Vec2,
    center: Vec2,
    target: Vec2,
    radius: f32,
    delta: f32,
    angular_speed: f32,
) -> Vec2 {
    let from = (current - center).normalize_or_zero();
    let to = (target - center).normalize_or_zero();

    if radius <= RADIUS_TOLERANCE {
        return current;
    }
    if from == Vec2::ZERO {
        return if to == Vec2::ZERO { current } else { center + to * radius };
    }

    let angle = signed_angle_deg(from, to);
    if angle.abs() <= ANGLE_TOLERANCE_DEG {
        return current;
    }

    let arc_length = radius * 2.0 * PI * angle.abs() / 360.0;
    let max_travel = delta * angular_speed;
    let fraction = (max_travel / arc_length).clamp(0.0, 1.0);

    let rotation = Vec2::from_angle((angle * fraction).to_radians());
    center + rotation.rotate(from) * radius
}
