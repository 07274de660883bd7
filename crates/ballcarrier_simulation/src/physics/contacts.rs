//! Contact events (physics → possession)
//!
//! Контакт всегда ориентирован от carrier'а: `carrier` коснулся `other`.
//! Begin/Persist: твёрдые коллайдеры (OnCollisionEnter/Stay),
//! Trigger: сенсор (засчитывается только в Dash).

use std::collections::BTreeSet;

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

use crate::components::{planar_position, Ball, BallCarrier};
use crate::SimulationSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Begin,
    Persist,
    Trigger,
}

/// Event: carrier коснулся другого тела
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub carrier: Entity,
    pub other: Entity,
    pub kind: ContactKind,
}

impl ContactEvent {
    pub fn begin(carrier: Entity, other: Entity) -> Self {
        Self { carrier, other, kind: ContactKind::Begin }
    }

    pub fn persist(carrier: Entity, other: Entity) -> Self {
        Self { carrier, other, kind: ContactKind::Persist }
    }

    pub fn trigger(carrier: Entity, other: Entity) -> Self {
        Self { carrier, other, kind: ContactKind::Trigger }
    }
}

/// Текущие твёрдые контакты (carrier, other): источник Persist событий
#[derive(Resource, Debug, Default)]
pub struct ActiveContacts {
    pairs: BTreeSet<(Entity, Entity)>,
}

impl ActiveContacts {
    /// true если пара новая
    pub fn insert(&mut self, carrier: Entity, other: Entity) -> bool {
        self.pairs.insert((carrier, other))
    }

    pub fn remove(&mut self, carrier: Entity, other: Entity) -> bool {
        self.pairs.remove(&(carrier, other))
    }

    pub fn contains(&self, carrier: Entity, other: Entity) -> bool {
        self.pairs.contains(&(carrier, other))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.pairs.iter().copied()
    }
}

// ============================================================================
// Headless: proximity contacts
// ============================================================================

/// Headless источник контактов: carrier касается мяча, когда расстояние между
/// центрами ≤ half extent + радиус мяча
pub struct ProximityContactsPlugin;

impl Plugin for ProximityContactsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveContacts>()
            .add_event::<ContactEvent>()
            .add_systems(FixedUpdate, detect_proximity_contacts.in_set(SimulationSet::Sensing));
    }
}

/// Система: Begin при первом касании, Persist пока касание длится
pub fn detect_proximity_contacts(
    carriers: Query<(Entity, &Transform, &BallCarrier)>,
    balls: Query<(Entity, &Transform, &Ball)>,
    mut active: ResMut<ActiveContacts>,
    mut contacts: EventWriter<ContactEvent>,
) {
    for (carrier, carrier_transform, ball_carrier) in carriers.iter() {
        for (ball_entity, ball_transform, ball) in balls.iter() {
            let distance = planar_position(carrier_transform).distance(planar_position(ball_transform));
            let touching = distance <= ball_carrier.half_extent + ball.radius;

            match (touching, active.contains(carrier, ball_entity)) {
                (true, false) => {
                    active.insert(carrier, ball_entity);
                    contacts.write(ContactEvent::begin(carrier, ball_entity));
                }
                (true, true) => {
                    contacts.write(ContactEvent::persist(carrier, ball_entity));
                }
                (false, true) => {
                    active.remove(carrier, ball_entity);
                }
                (false, false) => {}
            }
        }
    }
}

// ============================================================================
// Rapier bridge
// ============================================================================

/// Мост `bevy_rapier2d::CollisionEvent` → `ContactEvent`
///
/// Rapier сообщает только Started/Stopped, поэтому Persist переизлучается
/// каждый тик для всех активных твёрдых пар.
pub struct RapierContactsPlugin;

impl Plugin for RapierContactsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveContacts>()
            .add_event::<ContactEvent>()
            .add_event::<CollisionEvent>()
            .add_systems(
                FixedUpdate,
                (emit_persisting_contacts, forward_rapier_collisions)
                    .chain()
                    .in_set(SimulationSet::Sensing),
            );
    }
}

/// Система: Persist для пар, начавшихся на прошлых тиках
pub fn emit_persisting_contacts(
    active: Res<ActiveContacts>,
    mut contacts: EventWriter<ContactEvent>,
) {
    for (carrier, other) in active.iter() {
        contacts.write(ContactEvent::persist(carrier, other));
    }
}

/// Система: Started → Begin/Trigger, Stopped → забыть пару
pub fn forward_rapier_collisions(
    mut collisions: EventReader<CollisionEvent>,
    carriers: Query<(), With<BallCarrier>>,
    mut active: ResMut<ActiveContacts>,
    mut contacts: EventWriter<ContactEvent>,
) {
    for collision in collisions.read() {
        match *collision {
            CollisionEvent::Started(a, b, flags) => {
                let Some((carrier, other)) = orient_pair(a, b, &carriers) else {
                    continue;
                };

                if flags.contains(CollisionEventFlags::SENSOR) {
                    contacts.write(ContactEvent::trigger(carrier, other));
                } else {
                    active.insert(carrier, other);
                    contacts.write(ContactEvent::begin(carrier, other));
                }
            }
            CollisionEvent::Stopped(a, b, _) => {
                if let Some((carrier, other)) = orient_pair(a, b, &carriers) {
                    active.remove(carrier, other);
                }
            }
        }
    }
}

/// (carrier, other), если хотя бы одна сторона является carrier'ом
fn orient_pair(
    a: Entity,
    b: Entity,
    carriers: &Query<(), With<BallCarrier>>,
) -> Option<(Entity, Entity)> {
    if carriers.contains(a) {
        Some((a, b))
    } else if carriers.contains(b) {
        Some((b, a))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_contacts_set() {
        let carrier = Entity::from_raw(1);
        let ball = Entity::from_raw(2);
        let mut active = ActiveContacts::default();

        assert!(active.insert(carrier, ball));
        assert!(!active.insert(carrier, ball));
        assert!(active.contains(carrier, ball));
        assert_eq!(active.len(), 1);

        assert!(active.remove(carrier, ball));
        assert!(active.is_empty());
    }

    #[test]
    fn test_contact_constructors() {
        let carrier = Entity::from_raw(1);
        let ball = Entity::from_raw(2);
        assert_eq!(ContactEvent::begin(carrier, ball).kind, ContactKind::Begin);
        assert_eq!(ContactEvent::persist(carrier, ball).kind, ContactKind::Persist);
        assert_eq!(ContactEvent::trigger(carrier, ball).kind, ContactKind::Trigger);
    }
}
