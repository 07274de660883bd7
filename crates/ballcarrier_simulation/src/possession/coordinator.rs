//! Possession coordinator: contacts → pickup, carry loop, drop
//!
//! Весь жизненный цикл владения:
//! 1. `handle_ball_contacts`: eligibility + транзакция state manager'а → StartCarrying
//! 2. `carry_ball`: каждый fixed tick aim assist → heading, arc placement → мяч
//! 3. `process_drop_intents` / `drop_on_possession_exit` / observer на despawn: DropBall
//!
//! Контакты обрабатываются последовательно в одной системе, поэтому из N
//! одновременных контактов со свободным мячом выигрывает ровно один.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::aim::{direction_towards, goal_aim_point, AimAssist, AimInputs, AimOutput, AimTargets};
use crate::components::{
    face_direction, heading, planar_position, Ball, BallCarrier, CarryBout, Goal, PhysicsBody,
    SteeringInput, TeamMember,
};
use crate::config::CarrierTuning;
use crate::movement::{rotate_towards, CarrierMovement};
use crate::physics::{ContactEvent, ContactKind};
use crate::possession::arc_placement::arc_placement;
use crate::possession::cooldown::CooldownGuard;
use crate::possession::events::{BallDropped, BallPickedUp, CarrierStunned, DropBallIntent, DropReason};
use crate::state::{StateChanged, StateKind, StateManager};

/// Мячи, доступные drop-системам
type DropBalls<'w, 's> = Query<'w, 's, (&'static mut Ball, &'static mut PhysicsBody), Without<BallCarrier>>;

/// Система: ContactEvent → StartCarrying (или stun заряженным мячом)
pub fn handle_ball_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut carriers: Query<
        (
            &mut BallCarrier,
            &Transform,
            &CarrierTuning,
            &CooldownGuard,
            &mut AimAssist,
            &mut PhysicsBody,
            Option<&mut StateManager>,
            Option<&TeamMember>,
        ),
        Without<Ball>,
    >,
    mut balls: Query<(&mut Ball, &Transform, &mut PhysicsBody), Without<BallCarrier>>,
    members: Query<&TeamMember>,
    time: Res<Time<Fixed>>,
    mut pickups: EventWriter<BallPickedUp>,
    mut state_changes: EventWriter<StateChanged>,
    mut stuns: EventWriter<CarrierStunned>,
) {
    for contact in contacts.read() {
        let Ok((mut ball, ball_transform, mut ball_body)) = balls.get_mut(contact.other) else {
            continue;
        };
        let Ok((mut carrier, transform, tuning, guard, mut aim, mut body, mut state, member)) =
            carriers.get_mut(contact.carrier)
        else {
            continue;
        };

        if !ball.is_ownable() || guard.is_cooling_down() || carrier.is_carrying() {
            continue;
        }

        // Trigger (сенсор) засчитывается только во время рывка
        if contact.kind == ContactKind::Trigger
            && !state.as_ref().is_some_and(|state| state.is_in(StateKind::Dash))
        {
            continue;
        }

        let color = member.map(|member| member.color);

        // Заряженный чужой командой мяч оглушает вместо подбора
        if let Some(manager) = state.as_deref_mut() {
            let charged_against = tuning.charged_ball_stuns
                && ball.charge.is_some_and(|charge| Some(charge) != color);

            if charged_against {
                let direction = planar_position(transform) - planar_position(ball_transform);
                let knockback = direction * ball_body.velocity.length();

                match manager.attempt_stun(tuning.charged_stun_time) {
                    Ok(transition) => {
                        body.apply_impulse(knockback);
                        crate::logger::log_info(&format!(
                            "⚡ {:?} stunned by charged ball {:?}",
                            contact.carrier, contact.other
                        ));
                        state_changes.write(StateChanged::new(contact.carrier, transition));
                        stuns.write(CarrierStunned {
                            carrier: contact.carrier,
                            by: ball.last_owner,
                            knockback,
                        });
                    }
                    Err(rejected) => {
                        crate::logger::log(&format!("{:?}: charged stun skipped ({})", contact.carrier, rejected));
                    }
                }
                continue;
            }
        }

        // Транзакция: state manager → владение мячом. Без StateManager gating не нужен.
        let transition = match state.as_deref_mut().map(StateManager::attempt_possession) {
            Some(Ok(transition)) => Some(transition),
            Some(Err(rejected)) => {
                crate::logger::log(&format!("{:?}: pickup skipped ({})", contact.carrier, rejected));
                continue;
            }
            None => None,
        };

        if let Err(error) = ball.try_acquire(contact.carrier) {
            if let Some(manager) = state.as_deref_mut() {
                manager.release_possession();
            }
            crate::logger::log_warning(&format!("{:?}: pickup rolled back ({})", contact.carrier, error));
            continue;
        }

        if let Some(transition) = transition {
            state_changes.write(StateChanged::new(contact.carrier, transition));
        }

        // StartCarrying
        ball_body.stop();
        let orbit_radius = carrier.orbit_radius(ball.radius, tuning.ball_offset_multiplier);

        // Пас, если предыдущий владелец был другим carrier'ом той же команды
        let passed_from = ball
            .last_owner
            .filter(|last| *last != contact.carrier)
            .filter(|last| {
                members
                    .get(*last)
                    .is_ok_and(|last_member| Some(last_member.color) == color)
            });
        ball.charge = passed_from.and(color);

        aim.reset();
        carrier.begin_bout(CarryBout {
            ball: contact.other,
            orbit_radius,
            started_at: time.elapsed_secs(),
        });

        crate::logger::log_info(&format!(
            "⚽ {:?} picked up {:?} (orbit {:.3}, pass from {:?})",
            contact.carrier, contact.other, orbit_radius, passed_from
        ));
        pickups.write(BallPickedUp {
            carrier: contact.carrier,
            ball: contact.other,
            passed_from,
        });
    }
}

/// Система: carry loop (aim assist → heading, arc placement → позиция мяча)
pub fn carry_ball(
    mut carriers: Query<
        (
            Entity,
            &BallCarrier,
            &mut Transform,
            &SteeringInput,
            &CarrierTuning,
            &AimTargets,
            &mut AimAssist,
            Option<&CarrierMovement>,
            Option<&TeamMember>,
        ),
        (Without<Ball>, Without<Goal>),
    >,
    mut balls: Query<(&Ball, &mut Transform), (Without<BallCarrier>, Without<Goal>)>,
    goals: Query<&Transform, (With<Goal>, Without<BallCarrier>, Without<Ball>)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    // Позиции партнёров (до того, как кто-то повернётся в этом тике)
    let positions: HashMap<Entity, Vec2> = carriers
        .iter()
        .map(|(entity, _, transform, ..)| (entity, planar_position(transform)))
        .collect();

    for (entity, carrier, mut transform, input, tuning, targets, mut aim, movement, member) in
        carriers.iter_mut()
    {
        let Some(bout) = carrier.bout().copied() else {
            continue;
        };
        let Ok((ball, mut ball_transform)) = balls.get_mut(bout.ball) else {
            continue;
        };
        if ball.owner() != Some(entity) {
            crate::logger::log_warning(&format!(
                "{:?}: carry bout for {:?} without ownership, ball left alone",
                entity, bout.ball
            ));
            continue;
        }

        let center = planar_position(&transform);
        let goal_direction = targets
            .goal
            .and_then(|goal| goals.get(goal).ok())
            .and_then(|goal| direction_towards(center, goal_aim_point(planar_position(goal), tuning.goal_aim_offset)));
        let teammate_direction = targets
            .teammate
            .and_then(|teammate| positions.get(&teammate))
            .and_then(|position| direction_towards(center, *position));

        let inputs = AimInputs {
            heading: heading(&transform),
            input: input.direction,
            goal_direction,
            teammate_direction,
            goal_eligible: member.is_some_and(|member| ball.is_charged_for(member.color)),
            delta,
        };

        let new_heading = match aim.tick(&inputs, tuning) {
            AimOutput::Steer(steered) => steered,
            AimOutput::Raw => match movement {
                Some(movement) => rotate_towards(inputs.heading, input.direction, movement.turn_speed, delta),
                None => inputs.heading,
            },
        };
        face_direction(&mut transform, new_heading);

        let target = center + new_heading * bout.orbit_radius;
        let next = arc_placement(
            planar_position(&ball_transform),
            center,
            target,
            bout.orbit_radius,
            delta,
            tuning.ball_turn_speed,
        );
        ball_transform.translation = next.extend(ball_transform.translation.z);
    }
}

/// DropBall: отпустить мяч и закончить bout одним вызовом
///
/// None если carrier ничего не нёс.
fn release_carried_ball(
    carrier_entity: Entity,
    carrier: &mut BallCarrier,
    balls: &mut DropBalls,
    launch: Vec2,
) -> Option<Entity> {
    let bout = carrier.end_bout()?;

    if let Ok((mut ball, mut body)) = balls.get_mut(bout.ball) {
        match ball.release(carrier_entity) {
            Ok(()) => body.velocity = launch,
            Err(error) => {
                crate::logger::log_warning(&format!("{:?}: drop of {:?} ({})", carrier_entity, bout.ball, error));
            }
        }
    }

    Some(bout.ball)
}

/// Система: DropBallIntent → DropBall + cooldown + выход из Possession
pub fn process_drop_intents(
    mut intents: EventReader<DropBallIntent>,
    mut carriers: Query<
        (&mut BallCarrier, &CarrierTuning, &mut CooldownGuard, Option<&mut StateManager>),
        Without<Ball>,
    >,
    mut balls: DropBalls,
    mut state_changes: EventWriter<StateChanged>,
    mut drops: EventWriter<BallDropped>,
) {
    for intent in intents.read() {
        let Ok((mut carrier, tuning, mut guard, state)) = carriers.get_mut(intent.carrier) else {
            continue;
        };

        let Some(ball) = release_carried_ball(intent.carrier, &mut carrier, &mut balls, intent.launch) else {
            crate::logger::log(&format!("{:?}: drop ignored, not carrying", intent.carrier));
            continue;
        };

        guard.arm(tuning.cool_down_time);

        if let Some(transition) = state.and_then(|mut manager| manager.release_possession()) {
            state_changes.write(StateChanged::new(intent.carrier, transition));
        }

        crate::logger::log_info(&format!("🏐 {:?} released {:?} (launch {:?})", intent.carrier, ball, intent.launch));
        drops.write(BallDropped {
            carrier: intent.carrier,
            ball,
            reason: DropReason::Released,
        });
    }
}

/// Система: exit hook Possession (stun и т.п.) → DropBall
///
/// Exit-событие может устареть: drop intent и повторный подбор в том же тике
/// дают Possession → Normal → Possession. Мяч отпускается, только если
/// carrier всё ещё вне Possession.
pub fn drop_on_possession_exit(
    mut state_changes: EventReader<StateChanged>,
    mut carriers: Query<
        (&mut BallCarrier, &CarrierTuning, &mut CooldownGuard, Option<&StateManager>),
        Without<Ball>,
    >,
    mut balls: DropBalls,
    mut drops: EventWriter<BallDropped>,
) {
    for change in state_changes.read() {
        if !change.exited(StateKind::Possession) {
            continue;
        }
        let Ok((mut carrier, tuning, mut guard, state)) = carriers.get_mut(change.carrier) else {
            continue;
        };
        if state.is_some_and(|manager| manager.is_in(StateKind::Possession)) {
            crate::logger::log(&format!("{:?}: stale Possession exit ignored", change.carrier));
            continue;
        }

        let Some(ball) = release_carried_ball(change.carrier, &mut carrier, &mut balls, Vec2::ZERO) else {
            continue;
        };
        guard.arm(tuning.cool_down_time);

        crate::logger::log_info(&format!(
            "🏐 {:?} lost {:?} ({:?} → {:?})",
            change.carrier, ball, change.from, change.to
        ));
        drops.write(BallDropped {
            carrier: change.carrier,
            ball,
            reason: DropReason::Interrupted,
        });
    }
}

/// Observer: carrier удаляется с мячом → мяч свободен, cooldown не взводится
pub fn drop_ball_on_carrier_removed(
    trigger: Trigger<OnRemove, BallCarrier>,
    carriers: Query<&BallCarrier>,
    mut balls: Query<&mut Ball>,
    mut drops: EventWriter<BallDropped>,
) {
    let entity = trigger.target();
    let Some(ball_entity) = carriers.get(entity).ok().and_then(BallCarrier::carried_ball) else {
        return;
    };
    let Ok(mut ball) = balls.get_mut(ball_entity) else {
        return;
    };

    if ball.release(entity).is_ok() {
        crate::logger::log_info(&format!("🏐 {:?} removed while carrying {:?}, ball freed", entity, ball_entity));
        drops.write(BallDropped {
            carrier: entity,
            ball: ball_entity,
            reason: DropReason::CarrierRemoved,
        });
    }
}
