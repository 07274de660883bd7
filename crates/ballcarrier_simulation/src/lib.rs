//! Ballcarrier Simulation Core
//!
//! Headless ECS-симуляция владения мячом на Bevy 0.16:
//! подбор мяча по контакту, ведение по орбите с aim assist, drop + cooldown,
//! blowback соперникам. Рендер, input и физика: внешние коллабораторы
//! (события контактов, `SteeringInput`, `DropBallIntent`).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod aim;
pub mod components;
pub mod config;
pub mod logger;
pub mod movement;
pub mod physics;
pub mod possession;
pub mod state;

// Re-export базовых типов для удобства
pub use aim::{AimAssist, AimState, AimTarget, AimTargets};
pub use components::*;
pub use config::{CarrierTuning, SettingsError, SimulationSettings, TuningError};
pub use logger::init_logger;
pub use movement::CarrierMovement;
pub use physics::{ActiveContacts, ContactEvent, ContactKind, ProximityContactsPlugin, RapierContactsPlugin};
pub use possession::{
    arc_placement, BallDropped, BallPickedUp, CarrierStunned, CooldownGuard, DropBallIntent, DropReason,
    PossessionPlugin, PossessionStats,
};
pub use state::{CarrierState, DashIntent, StateChanged, StateKind, StateManager};

/// Порядок систем внутри одного FixedUpdate тика
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Таймеры: stun/dash, cooldown guards
    Timers,
    /// Источники контактов (proximity / Rapier bridge)
    Sensing,
    /// Drop intents, подбор, blowback
    Contacts,
    /// Carry loop
    Carry,
    /// Steering + интеграция скоростей
    Movement,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Настройки берутся из `SimulationSettings` (если ресурс вставлен до plugin'а).
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<SimulationSettings>()
            .cloned()
            .unwrap_or_default();

        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(error) => {
                logger::log_error(&format!("Invalid simulation settings ({}), using defaults", error));
                SimulationSettings::default()
            }
        };

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(settings.tick_hz))
            // Детерминистичный RNG
            .insert_resource(DeterministicRng::new(settings.seed))
            .insert_resource(settings)
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Timers,
                    SimulationSet::Sensing,
                    SimulationSet::Contacts,
                    SimulationSet::Carry,
                    SimulationSet::Movement,
                )
                    .chain(),
            )
            .add_event::<StateChanged>()
            .add_event::<DashIntent>()
            .add_systems(
                FixedUpdate,
                (state::tick_carrier_states, state::process_dash_intents)
                    .chain()
                    .in_set(SimulationSet::Timers),
            )
            .add_systems(
                FixedUpdate,
                (
                    movement::freeze_while_possessing,
                    movement::steer_carriers,
                    movement::integrate_bodies,
                )
                    .chain()
                    .in_set(SimulationSet::Movement),
            )
            .add_plugins(PossessionPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (без gameplay систем)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Headless App с полной симуляцией владения мячом
///
/// Источник контактов не подключён: добавьте `ProximityContactsPlugin`,
/// `RapierContactsPlugin` или пишите `ContactEvent` вручную.
pub fn create_simulation_app(settings: SimulationSettings) -> App {
    let mut app = create_headless_app(settings.seed);
    app.insert_resource(settings).add_plugins(SimulationPlugin);
    app
}

/// Ровно один FixedUpdate тик (детерминированно, без wall clock)
///
/// Main schedule не запускается, поэтому буферы событий обновляются здесь,
/// как это делает `app.update()`: событие читается в тике отправки и в
/// следующем, потом удаляется. Итоги за всю симуляцию: `PossessionStats`.
pub fn step_fixed(app: &mut App) {
    let world = app.world_mut();
    update_simulation_events(world);

    let timestep = world.resource::<Time<Fixed>>().timestep();
    world.resource_mut::<Time<Fixed>>().advance_by(timestep);
    world.run_schedule(FixedUpdate);
}

/// Swap буферов для всех событий симуляции (зарегистрированных plugin'ами)
fn update_simulation_events(world: &mut World) {
    fn update<E: Event>(world: &mut World) {
        if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
            events.update();
        }
    }

    update::<ContactEvent>(world);
    update::<bevy_rapier2d::prelude::CollisionEvent>(world);
    update::<StateChanged>(world);
    update::<DashIntent>(world);
    update::<BallPickedUp>(world);
    update::<BallDropped>(world);
    update::<CarrierStunned>(world);
    update::<DropBallIntent>(world);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

// ============================================================================
// Spawn helpers
// ============================================================================

pub fn spawn_team(world: &mut World, name: &str, color: TeamColor) -> Entity {
    world.spawn(Team::new(name, color)).id()
}

/// Carrier с StateManager и CarrierMovement, tuning из `SimulationSettings`
///
/// Если `team` указывает на `Team`, carrier добавляется в её `members`.
pub fn spawn_carrier(world: &mut World, team: Entity, position: Vec2) -> Entity {
    let tuning = world
        .get_resource::<SimulationSettings>()
        .map(|settings| settings.carrier.clone())
        .unwrap_or_default();

    let carrier = world
        .spawn((
            BallCarrier::default(),
            Transform::from_translation(position.extend(0.0)),
            PhysicsBody::with_damping(8.0),
            tuning,
            StateManager::default(),
            CarrierMovement::default(),
        ))
        .id();

    let color = world.get_mut::<Team>(team).map(|mut team_component| {
        team_component.members.push(carrier);
        team_component.color
    });
    if let Some(color) = color {
        world.entity_mut(carrier).insert(TeamMember { team, color });
    }

    carrier
}

pub fn spawn_ball(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Ball::default(),
            Transform::from_translation(position.extend(0.0)),
            PhysicsBody::with_damping(0.8),
        ))
        .id()
}

pub fn spawn_goal(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((Goal, Transform::from_translation(position.extend(0.0))))
        .id()
}
