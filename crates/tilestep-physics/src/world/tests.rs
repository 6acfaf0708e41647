use super::*;
use crate::body::ActorSettings;
use crate::capability::{Groundable, Movable, Slideable};
use crate::collider::Collider;
use crate::contact::Contact;
use crate::gravity::GravitySettings;
use crate::level::{TileLayer, TileLegend, TileLevel};
use crate::material::PhysicsMaterial;
use crate::player::{PlayerSettings, ease_out_expo};
use crate::ray::BodyMask;
use crate::slide::SlideSettings;
use tilestep_core::Axis;

const STEP: f32 = 1.0 / 16.0;

fn config(schedule: ScheduleMode) -> PhysicsConfig {
    PhysicsConfig::default().with_step_size(STEP).with_schedule(schedule)
}

/// A 16x16 level with no tiles, centred on the origin
fn open_level() -> LevelSet {
    let mut levels = LevelSet::new();
    levels.add(TileLevel::new("open", Vec2::new(-8.0, 8.0), 16, 16)).unwrap();
    levels
}

/// An 8x8 level whose bottom row is solid ground, top at y = 1
fn floored_level() -> LevelSet {
    let mut rows = vec!["........"; 7];
    rows.push("########");
    let layer = TileLayer::from_rows("ground", &rows, &TileLegend::default()).unwrap();
    let mut levels = LevelSet::new();
    levels
        .add(TileLevel::new("floored", Vec2::new(0.0, 8.0), 8, 8).with_layer(layer))
        .unwrap();
    levels
}

fn open_world(schedule: ScheduleMode) -> World {
    World::new(config(schedule), open_level()).unwrap()
}

fn unit_box(position: Vec2) -> BodyDesc {
    BodyDesc::actor(position).with_collider(Collider::square(Vec2::ONE))
}

fn block(position: Vec2, size: Vec2) -> BodyDesc {
    BodyDesc::solid(position).with_collider(Collider::square(size))
}

/// Ten units wide with its top at y = 0
fn add_floor(world: &mut World) -> BodyId {
    world.register(block(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0))).unwrap()
}

fn position(world: &World, id: BodyId) -> Vec2 {
    world.body(id).unwrap().position()
}

#[test]
fn test_actor_settles_on_floor() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let floor = add_floor(&mut world);
    let actor = world
        .register(
            unit_box(Vec2::new(0.0, 5.0))
                .with_velocity(Vec2::new(0.0, -10.0))
                .with_gravity(GravitySettings::default()),
        )
        .unwrap();

    for _ in 0..120 {
        world.tick();
    }

    let body = world.body(actor).unwrap();
    assert_eq!(body.position().y, 0.5);
    assert!(body.is_grounded());
    assert_eq!(body.ground_contact().unwrap().remote, floor);
    assert_eq!(body.velocity().y, 0.0);
    assert!(world.relations().is_attached(actor, floor));
}

fn slide_onto_step(schedule: ScheduleMode) {
    let mut world = open_world(schedule);
    let actor = world
        .register(
            unit_box(Vec2::new(0.0, 0.5))
                .with_velocity(Vec2::new(3.0, 0.0))
                .with_slide(SlideSettings::default()),
        )
        .unwrap();
    // top one unit above the actor's feet
    world.register(block(Vec2::new(1.0, -0.4375), Vec2::ONE)).unwrap();

    world.tick();

    let body = world.body(actor).unwrap();
    // three units: the first converted into a rise, the other two forward
    assert_eq!(body.position(), Vec2::new(2.0 * STEP, 0.5 + STEP));
    assert!(body.is_sliding_up());
    assert_eq!(world.diagnostics().slides, 1);
}

#[test]
fn test_slide_up_low_step_interleaved() {
    slide_onto_step(ScheduleMode::Interleaved);
}

#[test]
fn test_slide_up_low_step_sequential() {
    slide_onto_step(ScheduleMode::Sequential);
}

#[test]
fn test_heavier_actor_wins_head_on_push() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let light = world
        .register(
            unit_box(Vec2::new(0.0, 0.5))
                .with_velocity(Vec2::new(2.0, 0.0))
                .with_actor(ActorSettings {
                    weight: 1.0,
                    strength: 5.0,
                    ..ActorSettings::default()
                }),
        )
        .unwrap();
    let heavy = world
        .register(
            unit_box(Vec2::new(1.0, 0.5))
                .with_velocity(Vec2::new(-2.0, 0.0))
                .with_actor(ActorSettings {
                    weight: 10.0,
                    strength: 5.0,
                    ..ActorSettings::default()
                }),
        )
        .unwrap();

    for _ in 0..40 {
        world.tick();
    }

    let (light_x, heavy_x) = (position(&world, light).x, position(&world, heavy).x);
    assert!(light_x < 0.0, "light actor should be driven back, ended at {light_x}");
    assert!(heavy_x - light_x >= 1.0, "actors overlap: {light_x} vs {heavy_x}");
    // pushes only move pending units around
    assert_eq!(world.body(light).unwrap().velocity(), Vec2::new(2.0, 0.0));
    assert_eq!(world.body(heavy).unwrap().velocity(), Vec2::new(-2.0, 0.0));
    assert!(world.diagnostics().pushes > 0);
}

#[test]
fn test_moving_solid_carries_rider() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let platform = world
        .register(block(Vec2::ZERO, Vec2::new(4.0, 1.0)).with_velocity(Vec2::new(2.0, 0.0)))
        .unwrap();
    let rider = world
        .register(unit_box(Vec2::new(0.0, 1.0)).with_gravity(GravitySettings::default()))
        .unwrap();

    for _ in 0..10 {
        world.tick();
    }

    assert_eq!(position(&world, platform).x, 20.0 * STEP);
    // the rider lands during the first tick, after the platform already moved
    assert_eq!(position(&world, rider), Vec2::new(18.0 * STEP, 1.0));
    assert!(world.body(rider).unwrap().is_grounded());
}

#[test]
fn test_solid_squishes_actor_against_wall() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let wall = world.register(block(Vec2::new(-2.0, 0.5), Vec2::new(1.0, 3.0))).unwrap();
    let actor = world.register(unit_box(Vec2::new(-1.0, 0.5))).unwrap();
    world
        .register(block(Vec2::new(0.0, 0.5), Vec2::ONE).with_velocity(Vec2::new(-1.0, 0.0)))
        .unwrap();
    world.drain_events();

    world.tick();

    assert_eq!(position(&world, actor).x, -1.0);
    assert!(
        world
            .events()
            .contains(&PhysicsEvent::Squished { body: actor, against: wall })
    );
}

#[test]
fn test_units_applied_match_accumulated_velocity() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let actor = world
        .register(unit_box(Vec2::ZERO).with_velocity(Vec2::new(0.75, -1.5)))
        .unwrap();

    for tick in 1..=20 {
        world.tick();
        let travelled = position(&world, actor) / STEP;
        let expected = tick as f32;
        assert_eq!(travelled.x, (expected * 0.75).floor());
        assert_eq!(travelled.y, -(expected * 1.5).floor());
    }
    assert_eq!(world.diagnostics().ticks, 20);
}

#[test]
fn test_actor_never_enters_solid() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let actor = world
        .register(unit_box(Vec2::new(-4.0, 0.5)).with_velocity(Vec2::new(0.7, 0.0)))
        .unwrap();
    world.register(block(Vec2::new(0.0, 0.5), Vec2::ONE)).unwrap();

    for _ in 0..200 {
        world.tick();
        assert!(position(&world, actor).x + 0.5 <= -0.5 + 1e-6);
    }
    assert_eq!(position(&world, actor).x, -1.0);
}

#[test]
fn test_resting_actor_stays_grounded() {
    let mut world = World::new(config(ScheduleMode::Interleaved), floored_level()).unwrap();
    let actor = world
        .register(unit_box(Vec2::new(3.5, 1.5)).with_gravity(GravitySettings::default()))
        .unwrap();
    world.tick();
    assert!(world.body(actor).unwrap().is_grounded());
    world.drain_events();

    for _ in 0..200 {
        world.tick();
        assert!(world.body(actor).unwrap().is_grounded());
    }
    assert!(
        !world
            .events()
            .iter()
            .any(|event| matches!(event, PhysicsEvent::Ungrounded { .. }))
    );
    assert_eq!(position(&world, actor).y, 1.5);
}

#[test]
fn test_ground_disabled_never_grounds() {
    let mut world = World::new(config(ScheduleMode::Interleaved), floored_level()).unwrap();
    let actor = world
        .register(unit_box(Vec2::new(3.5, 1.5)).with_gravity(GravitySettings {
            ground_enabled: false,
            ..GravitySettings::default()
        }))
        .unwrap();
    for _ in 0..10 {
        world.tick();
    }
    assert!(!world.body(actor).unwrap().is_grounded());
    assert_eq!(position(&world, actor).y, 1.5);
}

#[test]
fn test_attach_detach_round_trip() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let a = world.register(unit_box(Vec2::ZERO)).unwrap();
    let b = world.register(unit_box(Vec2::new(3.0, 0.0))).unwrap();

    assert!(world.attach(a, b).unwrap());
    assert!(!world.attach(b, a).unwrap());
    assert!(world.relations().is_attached(b, a));
    assert_eq!(world.relations().len(), 1);

    assert!(world.detach(b, a).unwrap());
    assert!(world.relations().is_empty());
    assert!(!world.detach(a, b).unwrap());

    let missing = BodyId::new(99, 0);
    assert!(matches!(world.attach(a, missing), Err(PhysicsError::BodyNotFound(id)) if id == missing));
}

#[test]
fn test_ignoring_ground_ungrounds() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let floor = add_floor(&mut world);
    let actor = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_gravity(GravitySettings::default()))
        .unwrap();
    world.tick();
    assert!(world.body(actor).unwrap().is_grounded());

    world.ignore(actor, floor, None).unwrap();
    assert!(!world.nearby(actor).contains(&floor));
    world.tick();

    assert!(!world.body(actor).unwrap().is_grounded());
    assert!(world.events().contains(&PhysicsEvent::Ungrounded { body: actor }));
    // one way: the floor still sees the actor
    assert!(!world.ignores().is_ignored(floor, actor));
}

#[test]
fn test_register_and_unregister() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let floor = add_floor(&mut world);
    let actor = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_gravity(GravitySettings::default()))
        .unwrap();
    assert_eq!(
        world.drain_events(),
        vec![PhysicsEvent::Spawned { body: floor }, PhysicsEvent::Spawned { body: actor }]
    );
    assert_eq!(world.bodies().count(), 2);

    world.tick();
    assert!(world.body(actor).unwrap().is_grounded());

    world.unregister(floor).unwrap();
    assert!(!world.contains(floor));
    assert!(!world.body(actor).unwrap().is_grounded());
    assert!(world.relations().is_empty());
    assert!(world.events().contains(&PhysicsEvent::Ungrounded { body: actor }));
    assert_eq!(world.events().last(), Some(&PhysicsEvent::Despawned { body: floor }));

    assert!(matches!(world.unregister(floor), Err(PhysicsError::BodyNotFound(_))));
    assert!(matches!(
        world.register(BodyDesc::actor(Vec2::ZERO).with_name("ghost")),
        Err(PhysicsError::NoColliders(_))
    ));
}

#[test]
fn test_tiles_are_spawned_from_layers() {
    let mut world = World::new(config(ScheduleMode::Interleaved), floored_level()).unwrap();
    let layer = world.levels().get(0).unwrap().layer("ground").unwrap();
    let tile = layer.body(3, 7).unwrap();
    assert!(layer.body(3, 6).is_none());

    let body = world.body(tile).unwrap();
    assert_eq!(body.kind(), BodyKind::Tile);
    assert_eq!(body.position(), Vec2::new(3.5, 0.5));
    // tiles are level geometry, not registered bodies
    assert_eq!(world.bodies().count(), 0);
    assert!(world.unregister(tile).is_err());
}

#[test]
fn test_raycast_hits_floor_tile() {
    let world = World::new(config(ScheduleMode::Interleaved), floored_level()).unwrap();
    let tile = world.levels().get(0).unwrap().layer("ground").unwrap().body(3, 7).unwrap();

    let hit = world
        .raycast(Vec2::new(3.5, 5.0), Vec2::NEG_Y, 10.0, BodyMask::all())
        .unwrap();
    assert_eq!(hit.body, tile);
    assert!((hit.distance - 4.0).abs() < 1e-4);
    assert!((hit.point.y - 1.0).abs() < 1e-4);

    assert!(world.raycast(Vec2::new(3.5, 5.0), Vec2::NEG_Y, 10.0, BodyMask::ACTORS).is_none());
    assert!(world.raycast(Vec2::new(3.5, 5.0), Vec2::Y, 10.0, BodyMask::all()).is_none());
    assert!(world.raycast(Vec2::new(3.5, 5.0), Vec2::ZERO, 10.0, BodyMask::all()).is_none());
}

#[test]
fn test_iteration_cap_discards_pending_units() {
    let mut config = config(ScheduleMode::Interleaved);
    config.max_iterations = 1;
    let mut world = World::new(config, open_level()).unwrap();
    let actor = world
        .register(unit_box(Vec2::ZERO).with_velocity(Vec2::new(5.0, 0.0)))
        .unwrap();

    world.tick();

    assert_eq!(position(&world, actor).x, STEP);
    assert_eq!(world.diagnostics().iteration_cap_hits, 1);
    assert!(world.events().contains(&PhysicsEvent::IterationCapReached { body: actor }));
}

#[test]
fn test_player_jumps_from_ground() {
    let mut world = open_world(ScheduleMode::Interleaved);
    add_floor(&mut world);
    let player = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_player(PlayerSettings::default()))
        .unwrap();

    world.tick();
    assert!(world.body(player).unwrap().player().unwrap().can_jump());

    assert!(world.jump(player).unwrap());
    let body = world.body(player).unwrap();
    assert_eq!(body.velocity().y, PlayerSettings::default().jump_speed);
    assert!(!body.is_grounded());
    assert!(!body.player().unwrap().can_jump());
}

#[test]
fn test_banked_jump_fires_on_landing() {
    let mut world = open_world(ScheduleMode::Interleaved);
    add_floor(&mut world);
    let player = world
        .register(unit_box(Vec2::new(0.0, 0.5 + STEP)).with_player(PlayerSettings::default()))
        .unwrap();

    assert!(!world.jump(player).unwrap());
    assert!(world.body(player).unwrap().player().unwrap().is_jump_banked());

    for _ in 0..5 {
        world.tick();
    }

    let body = world.body(player).unwrap();
    assert!(body.position().y > 0.5 + STEP);
    assert!(!body.player().unwrap().is_jump_banked());
}

#[test]
fn test_player_operations_need_player_feature() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let actor = world.register(unit_box(Vec2::ZERO)).unwrap();
    assert!(matches!(world.jump(actor), Err(PhysicsError::MissingFeature(id, _)) if id == actor));
    assert!(!world.is_player(actor));
}

#[test]
fn test_advance_runs_due_ticks() {
    let mut world = open_world(ScheduleMode::Interleaved);
    assert_eq!(world.advance(0.055), 3);
    assert_eq!(world.diagnostics().ticks, 3);
    assert!(world.interpolation() > 0.25 && world.interpolation() < 0.35);
}

/// Open world with a few extra materials
fn material_world() -> World {
    let mut config = config(ScheduleMode::Interleaved);
    config.materials.insert("rubber", PhysicsMaterial::new(0.0, 1.0, 1.0));
    config.materials.insert("spring", PhysicsMaterial::new(0.0, 1.0, 0.5));
    config.materials.insert("ice", PhysicsMaterial::new(0.2, 0.25, 0.0));
    config.materials.insert("glue", PhysicsMaterial::new(2.0, 1.0, 0.0));
    World::new(config, open_level()).unwrap()
}

/// A player standing on a ten unit floor made of `material`
fn grounded_player(world: &mut World, material: &str) -> BodyId {
    world
        .register(block(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0)).with_material(material))
        .unwrap();
    let player = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_player(PlayerSettings::default()))
        .unwrap();
    world.tick();
    assert!(world.body(player).unwrap().is_grounded());
    player
}

fn player_state(world: &World, id: BodyId) -> &crate::player::PlayerState {
    world.body(id).unwrap().player().unwrap()
}

#[test]
fn test_rider_is_pulled_toward_faster_carrier() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let carrier = world
        .register(
            unit_box(Vec2::new(0.0, 0.5))
                .with_velocity(Vec2::new(3.0, 0.0))
                .with_actor(ActorSettings {
                    strength: 1.0,
                    ..ActorSettings::default()
                }),
        )
        .unwrap();
    let rider = world
        .register(
            unit_box(Vec2::new(0.0, 1.5))
                .with_velocity(Vec2::new(1.0, 0.0))
                .with_gravity(GravitySettings::default())
                .with_actor(ActorSettings {
                    weight: 4.0,
                    ..ActorSettings::default()
                }),
        )
        .unwrap();
    world.ground(rider, Contact::new(rider, 0, carrier, 0));

    // a quarter of the way from 1 to 3
    world.inherit_motion(rider);
    assert_eq!(world.body(rider).unwrap().velocity(), Vec2::new(1.5, 0.0));

    // slower horizontally, rising vertically
    world.set_velocity(carrier, Vec2::new(0.5, 2.0)).unwrap();
    world.set_velocity(rider, Vec2::new(1.0, 0.0)).unwrap();
    world.inherit_motion(rider);
    assert_eq!(world.body(rider).unwrap().velocity(), Vec2::new(1.0, 0.5));
}

#[test]
fn test_last_support_becomes_ground() {
    let mut world = open_world(ScheduleMode::Interleaved);
    world.register(block(Vec2::new(-0.5, -0.5), Vec2::ONE)).unwrap();
    let right = world.register(block(Vec2::new(0.5, -0.5), Vec2::ONE)).unwrap();
    let actor = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_gravity(GravitySettings::default()))
        .unwrap();

    world.update_grounded(actor);

    assert_eq!(world.body(actor).unwrap().ground_contact().unwrap().remote, right);
}

#[test]
fn test_friction_decays_ground_speed() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let floor = add_floor(&mut world);
    let actor = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_gravity(GravitySettings::default()))
        .unwrap();
    world.ground(actor, Contact::new(actor, 0, floor, 0));
    world.set_velocity(actor, Vec2::new(2.0, 0.0)).unwrap();

    let friction = world.surface(actor).friction();
    world.apply_friction(actor);

    let vx = world.body(actor).unwrap().velocity().x;
    assert_eq!(vx, 2.0 - friction * 2.0);
    assert!(vx > 0.0 && vx < 2.0);
}

#[test]
fn test_friction_never_reverses_velocity() {
    let mut world = material_world();
    let floor = world
        .register(block(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0)).with_material("glue"))
        .unwrap();
    let actor = world
        .register(
            unit_box(Vec2::new(0.0, 0.5))
                .with_material("glue")
                .with_gravity(GravitySettings::default()),
        )
        .unwrap();
    world.ground(actor, Contact::new(actor, 0, floor, 0));
    world.set_velocity(actor, Vec2::new(-3.0, 0.0)).unwrap();

    world.apply_friction(actor);

    assert_eq!(world.body(actor).unwrap().velocity().x, 0.0);
}

#[test]
fn test_elastic_bounce() {
    let mut world = material_world();
    let floor = world
        .register(block(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0)).with_material("spring"))
        .unwrap();
    let wall = world
        .register(block(Vec2::new(1.0, 0.5), Vec2::ONE).with_material("spring"))
        .unwrap();
    let actor = world
        .register(
            unit_box(Vec2::new(0.0, 0.5))
                .with_material("rubber")
                .with_gravity(GravitySettings::default()),
        )
        .unwrap();
    let against_wall = Contact::new(actor, 0, wall, 0);
    let against_floor = Contact::new(actor, 0, floor, 0);

    // airborne: rubber against the atmosphere, then the wall halves it
    world.set_velocity(actor, Vec2::new(2.0, 0.0)).unwrap();
    world.bounce(actor, Axis::Horizontal, &[against_wall]);
    assert_eq!(world.body(actor).unwrap().velocity().x, 1.0);

    world.set_velocity(actor, Vec2::new(0.0, 2.0)).unwrap();
    world.bounce(actor, Axis::Vertical, &[against_wall]);
    assert_eq!(world.body(actor).unwrap().velocity().y, -1.0);

    // the ground sets the surface but is not a bouncing contact
    world.ground(actor, against_floor);
    world.set_velocity(actor, Vec2::new(2.0, 0.0)).unwrap();
    world.bounce(actor, Axis::Horizontal, &[against_floor, against_wall]);
    assert_eq!(world.body(actor).unwrap().velocity().x, 1.5);
}

#[test]
fn test_timed_ignore_expires_during_tick() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let a = world.register(unit_box(Vec2::ZERO)).unwrap();
    let b = world.register(unit_box(Vec2::new(3.0, 0.0))).unwrap();
    world.ignore(a, b, Some(2.5 * STEP)).unwrap();
    assert!(!world.nearby(a).contains(&b));

    world.tick();
    world.tick();
    assert!(world.ignores().is_ignored(a, b));

    world.tick();
    assert!(!world.ignores().is_ignored(a, b));
    assert!(world.nearby(a).contains(&b));
}

#[test]
fn test_walk_accelerates_with_traction() {
    let mut world = material_world();
    let player = grounded_player(&mut world, "default");
    let dt = world.config().dt();

    world.walk(player, 1.0).unwrap();
    let normal = world.body(player).unwrap().velocity().x;
    assert_eq!(normal, 60.0 * dt);
    assert_eq!(player_state(&world, player).input(), 1.0);

    for _ in 0..10 {
        world.walk(player, 1.0).unwrap();
    }
    assert_eq!(world.body(player).unwrap().velocity().x, PlayerSettings::default().movement_max);

    let mut icy = material_world();
    let slipping = grounded_player(&mut icy, "ice");
    icy.walk(slipping, 1.0).unwrap();
    assert_eq!(icy.body(slipping).unwrap().velocity().x, normal * 0.25);

    // inside the dead zone nothing happens
    icy.walk(slipping, 0.05).unwrap();
    assert_eq!(icy.body(slipping).unwrap().velocity().x, normal * 0.25);
    assert_eq!(player_state(&icy, slipping).input(), 0.0);
}

#[test]
fn test_coyote_time_allows_late_jump() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let player = grounded_player(&mut world, "default");

    // off the right end of the floor
    world.set_position(player, Vec2::new(6.0, 0.5)).unwrap();
    world.update_grounded(player);
    assert!(world.body(player).unwrap().is_grounded());
    assert!(player_state(&world, player).in_coyote_time());

    assert!(world.jump(player).unwrap());
    let body = world.body(player).unwrap();
    assert_eq!(body.velocity().y, PlayerSettings::default().jump_speed);
    assert!(!body.is_grounded());
}

#[test]
fn test_coyote_time_runs_out() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let player = grounded_player(&mut world, "default");
    world.set_position(player, Vec2::new(6.0, 0.5)).unwrap();
    world.update_grounded(player);
    world.drain_events();

    world.tick_player_timers(player, 0.2);

    assert!(!world.body(player).unwrap().is_grounded());
    assert!(!player_state(&world, player).can_jump());
    assert!(world.events().contains(&PhysicsEvent::Ungrounded { body: player }));
    assert!(!world.jump(player).unwrap());
    assert!(player_state(&world, player).is_jump_banked());
}

#[test]
fn test_coyote_time_cancelled_by_contact() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let player = grounded_player(&mut world, "default");
    world.set_position(player, Vec2::new(6.0, 0.5)).unwrap();
    world.update_grounded(player);
    assert!(player_state(&world, player).in_coyote_time());

    world.set_position(player, Vec2::new(0.0, 0.5)).unwrap();
    world.update_grounded(player);

    assert!(!player_state(&world, player).in_coyote_time());
    world.tick_player_timers(player, 0.2);
    assert!(world.body(player).unwrap().is_grounded());
}

/// An airborne player touching a one unit wall on `side`
fn player_beside_wall(world: &mut World, side: f32) -> (BodyId, BodyId) {
    let wall = world.register(block(Vec2::new(side, 0.5), Vec2::ONE)).unwrap();
    let player = world
        .register(unit_box(Vec2::new(0.0, 0.5)).with_player(PlayerSettings::default()))
        .unwrap();
    (player, wall)
}

#[test]
fn test_wallplant_entry() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let (player, wall) = player_beside_wall(&mut world, 1.0);
    let contact = [Contact::new(player, 0, wall, 0)];

    // rising too fast
    world.set_velocity(player, Vec2::new(1.0, 3.0)).unwrap();
    assert!(!world.try_wallplant(player, 1.0, &contact));

    world.set_velocity(player, Vec2::new(1.0, -0.5)).unwrap();
    assert!(world.try_wallplant(player, 1.0, &contact));

    let body = world.body(player).unwrap();
    assert_eq!(body.velocity(), Vec2::ZERO);
    let state = body.player().unwrap();
    assert!(state.is_wallplanted());
    assert_eq!(state.wallplant_side(), 1.0);
    assert!(state.can_jump());
    assert!(world.events().contains(&PhysicsEvent::Wallplanted { body: player, wall }));

    // one plant per flight
    assert!(!state.can_wallplant);
    assert!(!world.try_wallplant(player, 1.0, &contact));
}

#[test]
fn test_wallplant_slip_eases_out_until_timer_ends() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let (player, wall) = player_beside_wall(&mut world, 1.0);
    assert!(world.try_wallplant(player, 1.0, &[Contact::new(player, 0, wall, 0)]));
    let slip = PlayerSettings::default().wallplant_slip_speed;

    world.update_wallplant(player);
    assert_eq!(world.body(player).unwrap().velocity(), Vec2::ZERO);

    world.tick_player_timers(player, 0.5);
    world.update_wallplant(player);
    let velocity = world.body(player).unwrap().velocity();
    assert_eq!(velocity.x, 0.0);
    assert_eq!(velocity.y, -slip * ease_out_expo(0.5));
    assert!(velocity.y < 0.0 && velocity.y > -slip);

    world.tick_player_timers(player, 0.5);
    let state = player_state(&world, player);
    assert!(!state.is_wallplanted());
    assert!(!state.can_jump());
}

#[test]
fn test_wallplant_exit_after_steering_away() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let (player, wall) = player_beside_wall(&mut world, 1.0);
    assert!(world.try_wallplant(player, 1.0, &[Contact::new(player, 0, wall, 0)]));

    world.walk(player, -1.0).unwrap();
    assert!(player_state(&world, player).wallplant_exit.is_running());
    // steering back toward the wall holds on
    world.walk(player, 1.0).unwrap();
    assert!(!player_state(&world, player).wallplant_exit.is_running());

    world.walk(player, -1.0).unwrap();
    world.tick_player_timers(player, 0.1);
    assert!(player_state(&world, player).is_wallplanted());
    world.walk(player, -1.0).unwrap();
    world.tick_player_timers(player, 0.1);

    assert!(!player_state(&world, player).is_wallplanted());
    // planted players do not walk
    assert_eq!(world.body(player).unwrap().velocity(), Vec2::ZERO);
}

#[test]
fn test_wall_jump_leaps_away_from_wall() {
    for side in [1.0, -1.0] {
        let mut world = open_world(ScheduleMode::Interleaved);
        let (player, wall) = player_beside_wall(&mut world, side);
        assert!(world.try_wallplant(player, side, &[Contact::new(player, 0, wall, 0)]));

        assert!(world.jump(player).unwrap());

        // airborne traction halves the launch
        let settings = PlayerSettings::default();
        let velocity = world.body(player).unwrap().velocity();
        assert_eq!(velocity.x, -side * settings.wall_jump_horizontal * 0.5);
        assert_eq!(velocity.y, settings.wall_jump_vertical * 0.5);
        assert!(!player_state(&world, player).is_wallplanted());
    }
}

#[test]
fn test_crouch_cooldown() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let player = grounded_player(&mut world, "default");

    assert!(world.crouch(player, true).unwrap());
    assert!(player_state(&world, player).is_crouched());
    // crouched on the ground the player stays put
    world.walk(player, 1.0).unwrap();
    assert_eq!(world.body(player).unwrap().velocity().x, 0.0);

    assert!(!world.crouch(player, false).unwrap());
    assert!(!world.crouch(player, true).unwrap());
    assert!(!player_state(&world, player).is_crouched());

    world.tick_player_timers(player, PlayerSettings::default().crouch_cooldown);
    assert!(world.crouch(player, true).unwrap());
}

#[test]
fn test_long_jump_boosts_within_window() {
    let mut world = open_world(ScheduleMode::Interleaved);
    let player = grounded_player(&mut world, "default");
    let settings = PlayerSettings::default();
    let dt = world.config().dt();

    assert!(world.jump(player).unwrap());
    assert_eq!(world.body(player).unwrap().velocity().y, settings.jump_speed);

    world.long_jump(player, 0.1).unwrap();
    let boosted = settings.jump_speed + settings.long_jump_speed * 0.5 * dt;
    assert_eq!(world.body(player).unwrap().velocity().y, boosted);

    // held past the window: the long jump is over for this jump
    world.long_jump(player, 0.3).unwrap();
    world.long_jump(player, 0.2).unwrap();
    assert_eq!(world.body(player).unwrap().velocity().y, boosted);
    assert!(!player_state(&world, player).can_long_jump);
}
