use std::time::{Duration, Instant};

use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{XorShift, run_system_once};

fn real_time_with_delta(dt: f32) -> Time<Real> {
    let mut t = Time::<Real>::new(Instant::now());
    t.update_with_duration(Duration::from_secs_f32(dt));
    t
}

/// World with a camera, a cached overlay and a fresh clock.
fn fx_world(dt: f32) -> (World, Entity, Entity) {
    let mut world = World::new();
    world.init_resource::<GlobalFx>();
    world.init_resource::<FxHandles>();
    world.insert_resource(real_time_with_delta(dt));
    world.insert_resource(Time::<Virtual>::default());

    let cam = world.spawn((Camera2d, Transform::default())).id();
    run_system_once(&mut world, ensure_fx_handles);
    let overlay = world.resource::<FxHandles>().overlay.expect("overlay spawned");
    (world, cam, overlay)
}

fn advance_real(world: &mut World, dt: f32) {
    world
        .resource_mut::<Time<Real>>()
        .update_with_duration(Duration::from_secs_f32(dt));
}

#[test]
fn unit_values_stay_clamped() {
    let mut x = UnitF32::new_clamped(1.7);
    assert_eq!(x.get(), 1.0);
    x.decay_to_zero(2.0, 0.25);
    assert_eq!(x.get(), 0.5);
    x.raise_to(0.2);
    assert_eq!(x.get(), 0.5);
    x.add_clamped(-3.0);
    assert_eq!(x.get(), 0.0);
}

#[test]
fn real_seconds_only_extend_through_set_max() {
    let mut t = RealSeconds::new(-1.0);
    assert!(!t.is_positive());
    t.set_max(0.3);
    t.set_max(0.1);
    assert_eq!(t.get(), 0.3);
    t.tick_down(1.0);
    assert_eq!(t.get(), 0.0);
}

#[test]
fn decay_is_independent_of_step_splitting() {
    let mut rng = XorShift::new(0x5eed_f00d);
    for _ in 0..2000 {
        let start = (rng.next_u32() % 1000) as f32 / 1000.0;
        let rate = (rng.next_u32() % 400) as f32 / 10.0;
        let steps = (rng.next_u32() % 8 + 1) as usize;
        let dt = (rng.next_u32() % 100) as f32 / 1000.0;

        let mut whole = UnitF32::new_clamped(start);
        whole.decay_to_zero(rate, dt * steps as f32);
        let mut split = UnitF32::new_clamped(start);
        for _ in 0..steps {
            split.decay_to_zero(rate, dt);
        }
        assert!((whole.get() - split.get()).abs() < 1e-4);
    }
}

#[test]
fn smootherstep_is_monotonic_between_endpoints() {
    assert_eq!(smootherstep(0.0), 0.0);
    assert!((smootherstep(1.0) - 1.0).abs() < 1e-6);
    let mut prev = 0.0;
    for i in 1..=200 {
        let y = smootherstep(i as f32 / 200.0);
        assert!(y + 1e-6 >= prev);
        prev = y;
    }
}

#[test]
fn quiet_messages_leave_fx_idle() {
    let mut fx = GlobalFx::default();
    for msg in [GameFeedback::Jump, GameFeedback::Landed, GameFeedback::Spawned] {
        fx.react(msg);
    }
    assert_eq!(fx.trauma.get(), 0.0);
    assert_eq!(fx.flash.get(), 0.0);
    assert_eq!(fx.time_speed(), 1.0);
}

#[test]
fn death_freezes_then_eases_time_back() {
    let mut fx = GlobalFx::default();
    fx.react(GameFeedback::Died);
    assert_eq!(fx.time_speed(), 0.0);
    assert!(fx.flash.get() > 0.9);

    fx.tick_timers(0.2);
    let slow = fx.time_speed();
    assert!((0.3..1.0).contains(&slow));

    fx.tick_timers(0.5);
    assert!(fx.time_speed() > slow);
    fx.tick_timers(1.0);
    assert_eq!(fx.time_speed(), 1.0);
}

#[test]
fn repeated_hits_saturate_trauma() {
    let mut fx = GlobalFx::default();
    for _ in 0..10 {
        fx.react(GameFeedback::Hurt);
    }
    assert_eq!(fx.trauma.get(), 1.0);
    assert!(fx.shake_offset().length() <= 18.0 + 1e-4);
}

#[test]
fn collected_messages_reach_global_fx() {
    let mut world = World::new();
    world.init_resource::<GlobalFx>();
    world.init_resource::<bevy::ecs::message::Messages<GameFeedback>>();
    world
        .resource_mut::<bevy::ecs::message::Messages<GameFeedback>>()
        .write(GameFeedback::Stomp);

    run_system_once(&mut world, collect_feedback);

    assert!(world.resource::<GlobalFx>().trauma.get() > 0.0);
    assert!(world.resource::<GlobalFx>().hitstop.is_positive());
}

#[test]
fn overlay_is_spawned_only_with_a_camera() {
    let mut world = World::new();
    world.init_resource::<FxHandles>();
    run_system_once(&mut world, ensure_fx_handles);
    assert!(world.resource::<FxHandles>().overlay.is_none());

    let cam = world.spawn((Camera2d, Transform::default())).id();
    run_system_once(&mut world, ensure_fx_handles);
    let handles = *world.resource::<FxHandles>();
    assert_eq!(handles.camera, Some(cam));
    let overlay = handles.overlay.expect("overlay spawned");
    assert!(world.get::<ScreenFlashOverlay>(overlay).is_some());
}

#[test]
fn flash_shows_the_overlay_in_the_preset_colour() {
    let (mut world, _, overlay) = fx_world(0.016);
    world.resource_mut::<GlobalFx>().react(GameFeedback::Hurt);

    run_system_once(&mut world, apply_global_fx);

    assert_eq!(*world.get::<Visibility>(overlay).unwrap(), Visibility::Visible);
    let c = world.get::<Sprite>(overlay).unwrap().color.to_srgba();
    assert!(c.red > c.green && c.alpha > 0.0);
    assert_eq!(world.resource::<Time<Virtual>>().relative_speed(), 0.0);
}

#[test]
fn shake_returns_the_camera_to_rest() {
    let (mut world, cam, _) = fx_world(0.016);
    world.entity_mut(cam).get_mut::<Transform>().unwrap().translation = Vec3::new(50.0, -20.0, 0.0);
    world.resource_mut::<GlobalFx>().trauma = UnitF32::new_clamped(1.0);

    run_system_once(&mut world, apply_global_fx);
    let shaken = world.get::<Transform>(cam).unwrap().translation;
    assert_ne!(shaken, Vec3::new(50.0, -20.0, 0.0));

    world.resource_mut::<GlobalFx>().trauma = UnitF32::new_clamped(0.0);
    advance_real(&mut world, 0.016);
    run_system_once(&mut world, apply_global_fx);

    let rest = world.get::<Transform>(cam).unwrap().translation;
    assert!((rest - Vec3::new(50.0, -20.0, 0.0)).length() < 1e-3);
}

#[test]
fn hitstop_holds_time_until_it_runs_out() {
    let (mut world, _, _) = fx_world(0.01);
    {
        let mut fx = world.resource_mut::<GlobalFx>();
        fx.hitstop = RealSeconds::new(0.045);
        fx.slowmo(1.0, 0.25);
    }

    let mut speeds = Vec::new();
    for _ in 0..8 {
        advance_real(&mut world, 0.01);
        run_system_once(&mut world, apply_global_fx);
        speeds.push(world.resource::<Time<Virtual>>().relative_speed());
    }

    assert!(speeds[..5].iter().all(|s| *s == 0.0));
    assert!(speeds[5..].iter().all(|s| (0.25..=1.0).contains(s)));
}
