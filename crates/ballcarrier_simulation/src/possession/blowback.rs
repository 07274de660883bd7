//! Blowback: радиальный импульс + stun соперникам при подборе мяча

use bevy::prelude::*;

use crate::components::{planar_position, BallCarrier, PhysicsBody, TeamMember};
use crate::config::CarrierTuning;
use crate::physics::overlap_circle;
use crate::possession::events::{BallPickedUp, CarrierStunned};
use crate::state::{StateChanged, StateManager};

/// Одна цель blowback'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlowbackHit {
    pub victim: Entity,
    /// normalize(victim − acquirer), ноль если центры совпали
    pub direction: Vec2,
}

/// Соперники в радиусе `radius` от `origin` (граница включительно)
///
/// Сам acquirer и его партнёры исключены. Кандидаты без команды не
/// считаются соперниками.
pub fn blowback_victims<I>(
    acquirer: Entity,
    origin: Vec2,
    acquirer_team: &TeamMember,
    radius: f32,
    candidates: I,
) -> Vec<BlowbackHit>
where
    I: IntoIterator<Item = (Entity, Vec2, Option<TeamMember>)>,
{
    let opponents: Vec<(Entity, Vec2)> = candidates
        .into_iter()
        .filter(|(entity, _, _)| *entity != acquirer)
        .filter(|(_, _, member)| member.is_some_and(|member| member.is_opponent_of(acquirer_team)))
        .map(|(entity, position, _)| (entity, position))
        .collect();

    overlap_circle(origin, radius, opponents.iter().copied())
        .into_iter()
        .filter_map(|victim| {
            opponents
                .iter()
                .find(|(entity, _)| *entity == victim)
                .map(|(_, position)| BlowbackHit {
                    victim,
                    direction: (*position - origin).normalize_or_zero(),
                })
        })
        .collect()
}

/// Система: BallPickedUp → stun + knockback соперникам рядом
///
/// Параметры (радиус, сила, длительность) берутся из tuning'а acquirer'а.
/// Отказ state manager'а (жертва уже оглушена): тихий no-op.
pub fn apply_pickup_blowback(
    mut pickups: EventReader<BallPickedUp>,
    mut carriers: Query<
        (
            Entity,
            &Transform,
            &CarrierTuning,
            Option<&TeamMember>,
            Option<&mut StateManager>,
            &mut PhysicsBody,
        ),
        With<BallCarrier>,
    >,
    mut state_changes: EventWriter<StateChanged>,
    mut stuns: EventWriter<CarrierStunned>,
) {
    for pickup in pickups.read() {
        let Ok((_, transform, tuning, member, _, _)) = carriers.get(pickup.carrier) else {
            continue;
        };
        if !tuning.push_away_other_players {
            continue;
        }
        let Some(acquirer_team) = member.copied() else {
            continue;
        };

        let origin = planar_position(transform);
        let (radius, force, stun_time) =
            (tuning.blowback_radius, tuning.blowback_force, tuning.blowback_stun_time);

        let candidates: Vec<(Entity, Vec2, Option<TeamMember>)> = carriers
            .iter()
            .map(|(entity, transform, _, member, _, _)| (entity, planar_position(transform), member.copied()))
            .collect();

        for hit in blowback_victims(pickup.carrier, origin, &acquirer_team, radius, candidates) {
            let Ok((_, _, _, _, Some(mut manager), mut body)) = carriers.get_mut(hit.victim) else {
                continue;
            };

            match manager.attempt_stun(stun_time) {
                Ok(transition) => {
                    let knockback = hit.direction * force;
                    body.apply_impulse(knockback);

                    crate::logger::log_info(&format!(
                        "💥 {:?} blown back by {:?} (knockback {:?})",
                        hit.victim, pickup.carrier, knockback
                    ));
                    state_changes.write(StateChanged::new(hit.victim, transition));
                    stuns.write(CarrierStunned {
                        carrier: hit.victim,
                        by: Some(pickup.carrier),
                        knockback,
                    });
                }
                Err(rejected) => {
                    crate::logger::log(&format!("{:?}: blowback skipped ({})", hit.victim, rejected));
                }
            }
        }
    }
}
