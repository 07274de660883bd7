//! Possession integration test
//!
//! Проверяем полный цикл на headless App:
//! - Carrier подбегает к мячу (proximity contacts) и подбирает его
//! - Мяч ведётся по орбите, carrier заморожен
//! - Drop с launch → cooldown → повторный подбор
//! - Rapier bridge: Started/Stopped → Begin/Persist/Trigger

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

use ballcarrier_simulation::*;

fn distance(app: &App, a: Entity, b: Entity) -> f32 {
    let world = app.world();
    let a = planar_position(world.get::<Transform>(a).unwrap());
    let b = planar_position(world.get::<Transform>(b).unwrap());
    a.distance(b)
}

fn owner(app: &App, ball: Entity) -> Option<Entity> {
    app.world().get::<Ball>(ball).and_then(Ball::owner)
}

/// Test: carrier бежит к мячу, подбирает его и держит на орбите
#[test]
fn test_run_to_ball_and_carry() {
    let mut app = create_simulation_app(SimulationSettings::default());
    app.add_plugins(ProximityContactsPlugin);

    let world = app.world_mut();
    let team = spawn_team(world, "blue", TeamColor::Blue);
    let ball = spawn_ball(world, Vec2::new(5.0, 0.0));
    let carrier = spawn_carrier(world, team, Vec2::ZERO);
    world.get_mut::<SteeringInput>(carrier).unwrap().direction = Vec2::X;

    // 6 units/sec → ~4 units до касания ≈ 40 тиков
    let mut picked_at = None;
    for tick in 0..120 {
        step_fixed(&mut app);
        if owner(&app, ball) == Some(carrier) {
            picked_at = Some(tick);
            break;
        }
    }
    assert!(picked_at.is_some(), "carrier never reached the ball");

    let movement = app.world().get::<CarrierMovement>(carrier).unwrap();
    assert!(movement.frozen);
    assert_eq!(app.world().get::<PhysicsBody>(carrier).unwrap().velocity, Vec2::ZERO);

    // Пока carrier держит мяч, тот остаётся на орбите впереди carrier'а
    for _ in 0..60 {
        step_fixed(&mut app);
    }
    assert_eq!(owner(&app, ball), Some(carrier));
    assert!((distance(&app, carrier, ball) - 1.07).abs() < 0.2);

    assert_eq!(app.world().resource::<PossessionStats>().pickups, 1);
}

/// Test: drop → мяч улетает, cooldown → carrier догоняет и снова подбирает
#[test]
fn test_drop_then_reacquire_after_cooldown() {
    let mut app = create_simulation_app(SimulationSettings::default());
    app.add_plugins(ProximityContactsPlugin);

    let world = app.world_mut();
    let team = spawn_team(world, "blue", TeamColor::Blue);
    let ball = spawn_ball(world, Vec2::new(0.9, 0.0));
    let carrier = spawn_carrier(world, team, Vec2::ZERO);

    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), Some(carrier));

    // Отпускаем мяч без скорости: carrier продолжает его касаться (Persist),
    // но cooldown не даёт подобрать сразу
    app.world_mut().send_event(DropBallIntent::release(carrier));
    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), None);

    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), None);
    assert!(app.world().get::<CooldownGuard>(carrier).unwrap().is_cooling_down());

    for _ in 0..12 {
        step_fixed(&mut app);
    }
    assert_eq!(owner(&app, ball), Some(carrier));
    assert_eq!(app.world().resource::<PossessionStats>().pickups, 2);
}

/// Test: лобовая атака: два соперника касаются мяча в одном тике
#[test]
fn test_contested_ball_single_owner() {
    let mut app = create_simulation_app(SimulationSettings::default());
    app.add_plugins(ProximityContactsPlugin);

    let world = app.world_mut();
    let blue = spawn_team(world, "blue", TeamColor::Blue);
    let red = spawn_team(world, "red", TeamColor::Red);
    let ball = spawn_ball(world, Vec2::ZERO);
    let blue_carrier = spawn_carrier(world, blue, Vec2::new(-0.9, 0.0));
    let red_carrier = spawn_carrier(world, red, Vec2::new(0.9, 0.0));

    step_fixed(&mut app);

    // Первый по порядку обработки подобрал, второй отброшен blowback'ом
    assert_eq!(owner(&app, ball), Some(blue_carrier));
    let red_state = app.world().get::<StateManager>(red_carrier).unwrap();
    assert!(red_state.is_in(StateKind::Stunned));
    assert!(distance(&app, blue_carrier, red_carrier) > 1.8);
}

/// Test: буферы событий не растут, итоги копятся в PossessionStats
#[test]
fn test_event_buffers_stay_bounded_over_long_run() {
    let mut app = create_simulation_app(SimulationSettings::default());
    app.add_plugins(ProximityContactsPlugin);

    let world = app.world_mut();
    let team = spawn_team(world, "blue", TeamColor::Blue);
    let ball = spawn_ball(world, Vec2::new(0.9, 0.0));
    let carrier = spawn_carrier(world, team, Vec2::ZERO);

    for _ in 0..300 {
        step_fixed(&mut app);
    }
    assert_eq!(owner(&app, ball), Some(carrier));

    // Не больше двух тиков контактов одной пары
    let world = app.world();
    assert!(world.resource::<Events<ContactEvent>>().len() <= 4);
    assert!(world.resource::<Events<StateChanged>>().is_empty());
    assert!(world.resource::<Events<BallPickedUp>>().is_empty());

    let stats = world.resource::<PossessionStats>();
    assert_eq!((stats.pickups, stats.drops, stats.stuns), (1, 0, 0));
}

/// Test: Rapier bridge: Started (solid) → Begin, Started (sensor) → Trigger
#[test]
fn test_rapier_bridge_contacts() {
    let mut app = create_simulation_app(SimulationSettings::default());
    app.add_plugins(RapierContactsPlugin);

    let world = app.world_mut();
    let team = spawn_team(world, "blue", TeamColor::Blue);
    let ball = spawn_ball(world, Vec2::new(0.9, 0.0));
    let dasher = spawn_carrier(world, team, Vec2::ZERO);
    let walker = spawn_carrier(world, team, Vec2::new(0.0, 5.0));

    // Сенсор без Dash не засчитывается; порядок сторон в событии не важен
    app.world_mut()
        .send_event(CollisionEvent::Started(ball, dasher, CollisionEventFlags::SENSOR));
    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), None);

    app.world_mut().send_event(DashIntent { carrier: dasher, duration: 0.3 });
    app.world_mut()
        .send_event(CollisionEvent::Started(dasher, ball, CollisionEventFlags::SENSOR));
    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), Some(dasher));

    app.world_mut().send_event(DropBallIntent::release(dasher));
    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), None);

    // Твёрдый контакт: Begin, затем Persist каждый тик до Stopped
    app.world_mut()
        .send_event(CollisionEvent::Started(walker, ball, CollisionEventFlags::empty()));
    step_fixed(&mut app);
    assert_eq!(owner(&app, ball), Some(walker));
    assert!(app.world().resource::<ActiveContacts>().contains(walker, ball));

    app.world_mut()
        .send_event(CollisionEvent::Stopped(walker, ball, CollisionEventFlags::empty()));
    step_fixed(&mut app);
    assert!(app.world().resource::<ActiveContacts>().is_empty());
}

/// Test: настройки из JSON доходят до carrier'ов и Time<Fixed>
#[test]
fn test_settings_from_json() {
    let settings = SimulationSettings::from_json_str(
        r#"{ "tick_hz": 30.0, "seed": 7, "carrier": { "cool_down_time": 0.5, "blowback_radius": 2.0 } }"#,
    )
    .unwrap();

    let mut app = create_simulation_app(settings);
    let world = app.world_mut();
    let team = spawn_team(world, "blue", TeamColor::Blue);
    let carrier = spawn_carrier(world, team, Vec2::ZERO);

    let tuning = app.world().get::<CarrierTuning>(carrier).unwrap();
    assert_eq!(tuning.cool_down_time, 0.5);
    assert_eq!(tuning.blowback_radius, 2.0);
    assert_eq!(tuning.aim_assist_threshold, 7.5);

    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    assert!((timestep.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    assert_eq!(app.world().resource::<DeterministicRng>().seed, 7);
}

#[test]
fn test_invalid_settings_rejected() {
    let result = SimulationSettings::from_json_str(r#"{ "carrier": { "snap_lerp_strength": 1.5 } }"#);
    assert!(matches!(
        result,
        Err(SettingsError::Invalid(TuningError::LerpStrengthOutOfRange(_)))
    ));

    let result = SimulationSettings::from_json_str("{ not json");
    assert!(matches!(result, Err(SettingsError::Parse(_))));
}
