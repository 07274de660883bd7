//! Счётчики possession-событий за всю симуляцию

use bevy::prelude::*;

use crate::possession::events::{BallDropped, BallPickedUp, CarrierStunned};

/// Накопительные счётчики (буферы событий живут только два тика)
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PossessionStats {
    pub pickups: usize,
    pub drops: usize,
    pub stuns: usize,
}

/// Система: BallPickedUp / BallDropped / CarrierStunned → PossessionStats
pub fn record_possession_stats(
    mut stats: ResMut<PossessionStats>,
    mut pickups: EventReader<BallPickedUp>,
    mut drops: EventReader<BallDropped>,
    mut stuns: EventReader<CarrierStunned>,
) {
    stats.pickups += pickups.read().count();
    stats.drops += drops.read().count();
    stats.stuns += stuns.read().count();
}
