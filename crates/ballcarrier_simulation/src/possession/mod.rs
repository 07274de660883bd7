//! Possession module
//!
//! Архитектура:
//! - arc_placement: чистая функция движения мяча по орбите
//! - cooldown: CooldownGuard (запрет повторного подбора)
//! - coordinator: contacts → pickup, carry loop, drop
//! - blowback: stun + knockback соперникам при подборе
//! - events: BallPickedUp / BallDropped / CarrierStunned / DropBallIntent
//! - stats: накопительные счётчики событий

use bevy::prelude::*;

pub mod arc_placement;
pub mod blowback;
pub mod cooldown;
pub mod coordinator;
pub mod events;
pub mod stats;


// Re-export основных типов
pub use arc_placement::{arc_placement, signed_angle_deg};
pub use blowback::{apply_pickup_blowback, blowback_victims, BlowbackHit};
pub use cooldown::{tick_cooldown_guards, CooldownGuard};
pub use coordinator::{
    carry_ball, drop_ball_on_carrier_removed, drop_on_possession_exit, handle_ball_contacts,
    process_drop_intents,
};
pub use events::{BallDropped, BallPickedUp, CarrierStunned, DropBallIntent, DropReason};
pub use stats::{record_possession_stats, PossessionStats};

use crate::aim::resolve_aim_targets;
use crate::physics::ContactEvent;
use crate::state::StateChanged;
use crate::SimulationSet;

/// Possession plugin
///
/// Порядок внутри тика:
/// - Timers: cooldown guards
/// - Contacts: drop intents → contacts → blowback → drop on Possession exit
/// - Carry: target lookup → carry loop
/// - Movement: счётчики событий
pub struct PossessionPlugin;

impl Plugin for PossessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PossessionStats>()
            .add_event::<ContactEvent>()
            .add_event::<StateChanged>()
            .add_event::<BallPickedUp>()
            .add_event::<BallDropped>()
            .add_event::<CarrierStunned>()
            .add_event::<DropBallIntent>()
            .add_systems(FixedUpdate, tick_cooldown_guards.in_set(SimulationSet::Timers))
            .add_systems(
                FixedUpdate,
                (
                    process_drop_intents,
                    handle_ball_contacts,
                    apply_pickup_blowback,
                    drop_on_possession_exit,
                )
                    .chain()
                    .in_set(SimulationSet::Contacts),
            )
            .add_systems(
                FixedUpdate,
                (resolve_aim_targets, carry_ball).chain().in_set(SimulationSet::Carry),
            )
            .add_systems(FixedUpdate, record_possession_stats.in_set(SimulationSet::Movement))
            .add_observer(drop_ball_on_carrier_removed);
    }
}
