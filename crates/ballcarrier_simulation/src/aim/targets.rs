//! Target lookup: партнёр по команде и ворота
//!
//! Ссылки резолвятся один раз и кэшируются в `AimTargets`. Повторный поиск
//! происходит только если закэшированная entity исчезла из мира.

use bevy::prelude::*;

use crate::components::{BallCarrier, Goal, Team, TeamMember};

/// Кэш целей aim assist для carrier'а
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AimTargets {
    pub teammate: Option<Entity>,
    pub goal: Option<Entity>,
}

/// Точка прицеливания в ворота (сдвиг по +Y)
pub fn goal_aim_point(goal_position: Vec2, offset: f32) -> Vec2 {
    goal_position + Vec2::Y * offset
}

/// Нормализованное направление from → to (None если точки совпадают)
pub fn direction_towards(from: Vec2, to: Vec2) -> Option<Vec2> {
    let direction = (to - from).normalize_or_zero();
    (direction != Vec2::ZERO).then_some(direction)
}

/// Система: резолв/ревалидация `AimTargets`
pub fn resolve_aim_targets(
    mut carriers: Query<(Entity, &mut AimTargets, Option<&TeamMember>)>,
    alive_carriers: Query<(), With<BallCarrier>>,
    teams: Query<&Team>,
    goals: Query<Entity, With<Goal>>,
) {
    let first_goal = goals.iter().next();

    for (entity, mut targets, member) in carriers.iter_mut() {
        if targets.teammate.is_some_and(|teammate| !alive_carriers.contains(teammate)) {
            targets.teammate = None;
        }
        if targets.goal.is_some_and(|goal| !goals.contains(goal)) {
            targets.goal = None;
        }

        if targets.teammate.is_none() {
            let teammate = member
                .and_then(|member| teams.get(member.team).ok())
                .and_then(|team| team.teammate_of(entity));

            if let Some(teammate) = teammate {
                crate::logger::log(&format!("🎯 {:?}: teammate resolved → {:?}", entity, teammate));
                targets.teammate = Some(teammate);
            }
        }

        if targets.goal.is_none() && first_goal.is_some() {
            targets.goal = first_goal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_aim_point_offset() {
        assert_eq!(goal_aim_point(Vec2::new(10.0, 0.0), 1.0), Vec2::new(10.0, 1.0));
    }

    #[test]
    fn test_direction_towards() {
        assert_eq!(direction_towards(Vec2::ZERO, Vec2::new(0.0, 3.0)), Some(Vec2::Y));
        assert_eq!(direction_towards(Vec2::ONE, Vec2::ONE), None);
    }
}
