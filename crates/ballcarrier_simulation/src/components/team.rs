//! Команды и ворота

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Цвет команды: идентичность для eligibility проверок
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum TeamColor {
    Blue,
    Red,
    Green,
    Yellow,
}

impl TeamColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamColor::Blue => "blue",
            TeamColor::Red => "red",
            TeamColor::Green => "green",
            TeamColor::Yellow => "yellow",
        }
    }
}

/// Команда: упорядоченный список участников
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Team {
    pub name: String,
    pub color: TeamColor,
    pub members: Vec<Entity>,
}

impl Team {
    pub fn new(name: impl Into<String>, color: TeamColor) -> Self {
        Self {
            name: name.into(),
            color,
            members: Vec::new(),
        }
    }

    /// Первый участник команды, отличный от `carrier`
    pub fn teammate_of(&self, carrier: Entity) -> Option<Entity> {
        self.members.iter().copied().find(|member| *member != carrier)
    }
}

/// Принадлежность carrier'а команде (цвет продублирован для быстрых сравнений)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct TeamMember {
    pub team: Entity,
    pub color: TeamColor,
}

impl TeamMember {
    pub fn is_opponent_of(&self, other: &TeamMember) -> bool {
        self.color != other.color
    }
}

/// Ворота: цель goal aim assist
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Goal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teammate_is_first_other_member() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let c = Entity::from_raw(3);

        let mut team = Team::new("blue", TeamColor::Blue);
        assert_eq!(team.teammate_of(a), None);

        team.members = vec![a, b, c];
        assert_eq!(team.teammate_of(a), Some(b));
        assert_eq!(team.teammate_of(b), Some(a));
    }

    #[test]
    fn test_opponents_compare_by_color() {
        let team = Entity::from_raw(10);
        let blue = TeamMember { team, color: TeamColor::Blue };
        let red = TeamMember { team: Entity::from_raw(11), color: TeamColor::Red };

        assert!(blue.is_opponent_of(&red));
        assert!(!blue.is_opponent_of(&blue));
    }
}
