//! Headless симуляция Ballcarrier
//!
//! Две команды по два carrier'а гоняются за мячом: seeded random steering,
//! proximity contacts, периодические пасы через `DropBallIntent`.
//! Первый аргумент (опционально): путь к JSON с `SimulationSettings`.

use bevy::prelude::*;
use rand::Rng;

use ballcarrier_simulation::logger;
use ballcarrier_simulation::{
    create_simulation_app, planar_position, spawn_ball, spawn_carrier, spawn_goal, spawn_team, step_fixed,
    Ball, BallCarrier, DeterministicRng, DropBallIntent, PossessionStats, ProximityContactsPlugin,
    SimulationSet, SimulationSettings, SteeringInput, TeamColor,
};

const TICK_COUNT: usize = 3600;

/// Сколько тиков carrier держит мяч, прежде чем отдать пас
const HOLD_TICKS: u32 = 45;

fn main() {
    let settings = match std::env::args().nth(1) {
        Some(path) => match SimulationSettings::load(&path) {
            Ok(settings) => settings,
            Err(error) => {
                eprintln!("Failed to load settings from {}: {}", path, error);
                std::process::exit(1);
            }
        },
        None => SimulationSettings::default(),
    };

    let seed = settings.seed;
    let mut app = create_simulation_app(settings);
    app.add_plugins(ProximityContactsPlugin)
        .add_systems(
            FixedUpdate,
            (chase_ball, pass_after_hold).chain().before(SimulationSet::Timers),
        );

    logger::log_info(&format!("Starting Ballcarrier headless simulation (seed: {})", seed));

    let world = app.world_mut();
    spawn_ball(world, Vec2::ZERO);
    spawn_goal(world, Vec2::new(20.0, 0.0));
    for (name, color, x) in [("blue", TeamColor::Blue, -6.0), ("red", TeamColor::Red, 6.0)] {
        let team = spawn_team(world, name, color);
        spawn_carrier(world, team, Vec2::new(x, 3.0));
        spawn_carrier(world, team, Vec2::new(x, -3.0));
    }

    for tick in 0..TICK_COUNT {
        step_fixed(&mut app);

        if tick % 600 == 0 {
            let owner = ball_owner(app.world_mut());
            logger::log_info(&format!("Tick {}: ball owner {:?}", tick, owner));
        }
    }

    let stats = *app.world().resource::<PossessionStats>();
    logger::log_info(&format!(
        "Simulation complete: {} pickups, {} drops, {} stuns",
        stats.pickups, stats.drops, stats.stuns
    ));
}

fn ball_owner(world: &mut World) -> Option<Entity> {
    let mut balls = world.query::<&Ball>();
    balls.iter(world).find_map(Ball::owner)
}

/// Свободные carrier'ы бегут к мячу с небольшим случайным шумом
fn chase_ball(
    mut carriers: Query<(&BallCarrier, &Transform, &mut SteeringInput), Without<Ball>>,
    balls: Query<&Transform, With<Ball>>,
    mut rng: ResMut<DeterministicRng>,
) {
    let Some(ball_position) = balls.iter().next().map(planar_position) else {
        return;
    };

    for (carrier, transform, mut input) in carriers.iter_mut() {
        let noise = Vec2::new(rng.rng.gen_range(-0.3..0.3), rng.rng.gen_range(-0.3..0.3));
        let to_ball = (ball_position - planar_position(transform)).normalize_or_zero();

        input.direction = if carrier.is_carrying() {
            // С мячом: стик в сторону ворот соперника, aim assist доводит
            Vec2::X + noise
        } else {
            to_ball + noise
        };
    }
}

/// Держим мяч HOLD_TICKS тиков, потом отдаём его по heading
fn pass_after_hold(
    carriers: Query<(Entity, &BallCarrier, &Transform)>,
    mut held_for: Local<u32>,
    mut intents: EventWriter<DropBallIntent>,
) {
    let Some((entity, transform)) = carriers
        .iter()
        .find(|(_, carrier, _)| carrier.is_carrying())
        .map(|(entity, _, transform)| (entity, transform))
    else {
        *held_for = 0;
        return;
    };

    *held_for += 1;
    if *held_for >= HOLD_TICKS {
        *held_for = 0;
        let launch = ballcarrier_simulation::heading(transform) * 15.0;
        intents.write(DropBallIntent::launch(entity, launch));
    }
}
