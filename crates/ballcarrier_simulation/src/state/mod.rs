//! Carrier state manager
//!
//! Конечный автомат carrier'а: Normal / Possession / Dash / Stunned.
//! Каждая попытка перехода это транзакция: либо переход целиком, либо отказ
//! (`TransitionRejected`) без побочных эффектов. Успешные переходы пишутся в
//! `StateChanged`, на них висят enter/exit hooks (freeze movement, drop мяча).

use bevy::prelude::*;
use thiserror::Error;


/// Состояние carrier'а
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum CarrierState {
    #[default]
    Normal,
    /// Владеет мячом
    Possession,
    /// Рывок: trigger-контакты с мячом засчитываются только здесь
    Dash { remaining: f32 },
    Stunned { remaining: f32 },
}

/// Вид состояния без payload (для `is_in` и событий)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum StateKind {
    Normal,
    Possession,
    Dash,
    Stunned,
}

impl CarrierState {
    pub fn kind(&self) -> StateKind {
        match self {
            CarrierState::Normal => StateKind::Normal,
            CarrierState::Possession => StateKind::Possession,
            CarrierState::Dash { .. } => StateKind::Dash,
            CarrierState::Stunned { .. } => StateKind::Stunned,
        }
    }
}

/// Успешный переход
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateKind,
    pub to: StateKind,
}

/// Отказ state manager'а (рутинный, не ошибка игры)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transition {from:?} -> {requested:?} rejected")]
pub struct TransitionRejected {
    pub from: StateKind,
    pub requested: StateKind,
}

/// Event: carrier сменил состояние
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StateChanged {
    pub carrier: Entity,
    pub from: StateKind,
    pub to: StateKind,
}

impl StateChanged {
    pub fn new(carrier: Entity, transition: Transition) -> Self {
        Self {
            carrier,
            from: transition.from,
            to: transition.to,
        }
    }

    pub fn entered(&self, kind: StateKind) -> bool {
        self.to == kind && self.from != kind
    }

    pub fn exited(&self, kind: StateKind) -> bool {
        self.from == kind && self.to != kind
    }
}

/// Event: запрос на рывок (input/AI коллаборатор)
#[derive(Event, Debug, Clone, Copy)]
pub struct DashIntent {
    pub carrier: Entity,
    pub duration: f32,
}

/// State manager carrier'а
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct StateManager {
    state: CarrierState,
}

impl StateManager {
    pub fn current(&self) -> CarrierState {
        self.state
    }

    pub fn is_in(&self, kind: StateKind) -> bool {
        self.state.kind() == kind
    }

    /// Normal/Dash → Possession
    pub fn attempt_possession(&mut self) -> Result<Transition, TransitionRejected> {
        match self.state {
            CarrierState::Normal | CarrierState::Dash { .. } => {
                Ok(self.enter(CarrierState::Possession))
            }
            _ => Err(self.reject(StateKind::Possession)),
        }
    }

    /// Любое состояние, кроме Stunned → Stunned (повторный stun отклоняется)
    pub fn attempt_stun(&mut self, duration: f32) -> Result<Transition, TransitionRejected> {
        match self.state {
            CarrierState::Stunned { .. } => Err(self.reject(StateKind::Stunned)),
            _ => Ok(self.enter(CarrierState::Stunned { remaining: duration })),
        }
    }

    /// Normal → Dash
    pub fn attempt_dash(&mut self, duration: f32) -> Result<Transition, TransitionRejected> {
        match self.state {
            CarrierState::Normal => Ok(self.enter(CarrierState::Dash { remaining: duration })),
            _ => Err(self.reject(StateKind::Dash)),
        }
    }

    /// Possession → Normal (None если carrier не владел мячом)
    pub fn release_possession(&mut self) -> Option<Transition> {
        if self.is_in(StateKind::Possession) {
            Some(self.enter(CarrierState::Normal))
        } else {
            None
        }
    }

    /// Отсчёт таймеров Dash/Stunned; по истечении → Normal
    pub fn tick(&mut self, delta: f32) -> Option<Transition> {
        let expired = match &mut self.state {
            CarrierState::Dash { remaining } | CarrierState::Stunned { remaining } => {
                *remaining -= delta;
                *remaining <= 0.0
            }
            _ => false,
        };

        expired.then(|| self.enter(CarrierState::Normal))
    }

    fn enter(&mut self, next: CarrierState) -> Transition {
        let from = self.state.kind();
        self.state = next;
        Transition { from, to: next.kind() }
    }

    fn reject(&self, requested: StateKind) -> TransitionRejected {
        TransitionRejected {
            from: self.state.kind(),
            requested,
        }
    }
}

/// Система: таймеры Dash/Stunned
pub fn tick_carrier_states(
    mut managers: Query<(Entity, &mut StateManager)>,
    mut state_changes: EventWriter<StateChanged>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut manager) in managers.iter_mut() {
        if let Some(transition) = manager.tick(delta) {
            crate::logger::log(&format!(
                "⏱️ {:?}: {:?} → {:?} (timer expired)",
                entity, transition.from, transition.to
            ));
            state_changes.write(StateChanged::new(entity, transition));
        }
    }
}

/// Система: DashIntent → Dash
pub fn process_dash_intents(
    mut intents: EventReader<DashIntent>,
    mut managers: Query<&mut StateManager>,
    mut state_changes: EventWriter<StateChanged>,
) {
    for intent in intents.read() {
        let Ok(mut manager) = managers.get_mut(intent.carrier) else {
            continue;
        };

        match manager.attempt_dash(intent.duration) {
            Ok(transition) => {
                state_changes.write(StateChanged::new(intent.carrier, transition));
            }
            Err(rejected) => {
                crate::logger::log(&format!("{:?}: dash skipped ({})", intent.carrier, rejected));
            }
        }
    }
}
