use bevy::math::Vec2;

use super::*;
use crate::common::test_utils::floor_grid;
use crate::sim::level::TileType;

fn tun() -> Tunables {
    Tunables::default()
}

fn walk_right() -> PlayerInput {
    PlayerInput {
        right: true,
        ..Default::default()
    }
}

fn dying_session(tun: &Tunables) -> Session {
    let mut grid = floor_grid(12, 8, 2);
    grid.set(3, 6, TileType::Hazard);
    let mut s = Session::new(grid, tun);
    for _ in 0..120 {
        s.tick(&walk_right(), tun);
        if s.is_dying() {
            break;
        }
    }
    assert!(s.is_dying());
    s
}

#[test]
fn new_session_places_player_on_marker() {
    let tun = tun();
    let s = Session::new(floor_grid(12, 8, 4), &tun);
    let hitbox = s.player_hitbox(&tun);
    assert_eq!(hitbox.center().x, 4.0 * 32.0 + 16.0);
    assert!((hitbox.bottom() - 224.0).abs() < 1e-3);
    assert_eq!(s.player.health, tun.session.max_health);
}

#[test]
fn missing_marker_falls_back_to_bottom_left() {
    let tun = tun();
    let grid = crate::common::test_utils::boxed_grid(12, 8);
    let s = Session::new(grid, &tun);
    assert!((s.player_hitbox(&tun).bottom() - 224.0).abs() < 1e-3);
    assert_eq!(s.player.pos.x, 48.0);
}

#[test]
fn reaching_the_exit_wins_and_freezes() {
    let tun = tun();
    let mut grid = floor_grid(12, 8, 2);
    grid.set_unique(4, 6, TileType::ExitMarker);
    let mut s = Session::new(grid, &tun);

    let mut won = false;
    for _ in 0..240 {
        if s.tick(&walk_right(), &tun).contains(FrameEvents::VICTORY) {
            won = true;
            break;
        }
    }

    assert!(won);
    assert!(s.victory());
    assert!(s.score_ms() > 0);
    assert_eq!(s.score_ms(), (s.player.run_time * 1000.0) as u32);

    let frozen = (s.ticks(), s.player.pos);
    assert!(s.tick(&walk_right(), &tun).is_empty());
    assert_eq!((s.ticks(), s.player.pos), frozen);
}

#[test]
fn hazard_stripe_starts_dying_not_death() {
    let tun = tun();
    let s = dying_session(&tun);
    assert!(!s.death());
    assert_eq!(s.player.health, 0);
    assert_eq!(s.player.vel, Vec2::new(0.0, -tun.session.death_pop_speed));
}

#[test]
fn hazard_check_is_idempotent() {
    let tun = tun();
    let mut s = dying_session(&tun);
    let snapshot = s.player.clone();

    assert!(!s.check_hazards(&tun));
    assert!(!s.check_hazards(&tun));
    assert!(!s.trigger_death(&tun));
    assert_eq!(s.player, snapshot);
}

#[test]
fn death_reports_only_after_the_animation() {
    let tun = tun();
    let mut s = dying_session(&tun);
    let expected = (tun.session.death_anim_time / tun.base_dt()).ceil() as u32;

    let mut ticks = 0;
    let mut done = false;
    while ticks < expected + 5 {
        ticks += 1;
        let events = s.tick(&PlayerInput::default(), &tun);
        assert!(s.is_dying());
        if events.contains(FrameEvents::DEATH_DONE) {
            done = true;
            break;
        }
        assert!(!s.death());
    }

    assert!(done);
    assert!(s.death());
    let elapsed = ticks as f32 * tun.base_dt();
    assert!((elapsed - tun.session.death_anim_time).abs() <= tun.base_dt() * 1.5);
    assert!(s.tick(&PlayerInput::default(), &tun).is_empty());
}

#[test]
fn dying_body_drifts_through_the_floor() {
    let tun = tun();
    let mut s = dying_session(&tun);
    for _ in 0..120 {
        s.tick(&PlayerInput::default(), &tun);
    }
    assert!(s.player_hitbox(&tun).y > 224.0);
    assert_eq!(s.player_hitbox(&tun).h, tun.hitbox.death.1);
}

#[test]
fn death_visuals_progress_and_hide_near_the_end() {
    let tun = tun();
    let mut s = dying_session(&tun);
    assert_eq!(s.death_progress(&tun), 0.0);
    assert_eq!(s.death_scale(&tun), 1.0);
    assert!(!s.player_hidden(&tun));

    let hide_ticks = (tun.session.death_anim_time * tun.session.death_hide_at / tun.base_dt()).ceil() as usize;
    for _ in 0..hide_ticks + 1 {
        s.tick(&PlayerInput::default(), &tun);
    }
    assert!(s.player_hidden(&tun));
    assert!(s.death_rotation(&tun) > 0.0);
    assert!(s.death_scale(&tun) < 1.0);
}

#[test]
fn clear_outcome_resets_flags_and_enemies() {
    let tun = tun();
    let mut grid = floor_grid(12, 8, 2);
    grid.set(3, 6, TileType::Hazard);
    grid.set(8, 6, TileType::Spawner);
    let mut s = Session::new(grid, &tun);
    for _ in 0..120 {
        s.tick(&walk_right(), &tun);
        if s.is_dying() {
            break;
        }
    }
    assert!(s.enemies.active_count() > 0);

    s.clear_outcome();

    assert!(!s.is_dying());
    assert!(!s.death());
    assert!(!s.victory());
    assert_eq!(s.enemies.active_count(), 0);
    assert!(s.enemies.spawners().is_empty());
}

#[test]
fn restart_respawns_a_fresh_player() {
    let tun = tun();
    let mut s = dying_session(&tun);
    s.restart(&tun);

    assert!(!s.is_dying());
    assert_eq!(s.player.health, tun.session.max_health);
    assert_eq!(s.player.pos.x, 2.0 * 32.0 + 16.0);
    assert_eq!(s.player.run_time, 0.0);
}

#[test]
fn enemy_hits_down_to_zero_health_trigger_death() {
    let tun = tun();
    let grid = floor_grid(12, 8, 5);
    let mut s = Session::new(grid, &tun);
    s.player.health = 1;
    let feet = s.player_hitbox(&tun).bottom();
    s.enemies.spawn_at(&s.level, Vec2::new(s.player.pos.x - 12.0, feet - 24.0 - 0.01));

    let events = s.tick(&PlayerInput::default(), &tun);

    assert!(events.contains(FrameEvents::HURT));
    assert!(events.contains(FrameEvents::DIED));
    assert!(s.is_dying());
    assert!(!s.death());
}

#[test]
fn stomped_enemy_leaves_health_untouched() {
    let tun = tun();
    let grid = floor_grid(12, 8, 5);
    let mut s = Session::new(grid, &tun);
    let level = s.level.clone();
    let slot = s.enemies.spawn_at(&level, Vec2::new(160.0, 200.0 - 0.01)).expect("free slot");
    s.player.pos = Vec2::new(172.0, 200.0 - 17.0 + 3.0);
    s.player.vel = Vec2::new(0.0, 300.0);
    s.player.grounded = false;

    let events = s.tick(&PlayerInput::default(), &tun);

    assert!(events.contains(FrameEvents::STOMP));
    assert!(!s.enemies.slots()[slot].active);
    assert_eq!(s.player.vel.y, -tun.enemy.stomp_bounce_speed);
    assert_eq!(s.player.health, tun.session.max_health);
}
