//! Area overlap query

use bevy::prelude::*;

/// Все тела, чей центр лежит в круге `center`/`radius` (граница включительно)
///
/// `bodies` играет роль layer filter: вызывающий передаёт только нужный слой.
pub fn overlap_circle<I>(center: Vec2, radius: f32, bodies: I) -> Vec<Entity>
where
    I: IntoIterator<Item = (Entity, Vec2)>,
{
    let radius_squared = radius * radius;

    bodies
        .into_iter()
        .filter(|(_, position)| position.distance_squared(center) <= radius_squared)
        .map(|(entity, _)| entity)
        .collect()
}
