use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{boxed_grid, run_system_once};

fn world_with_level(grid: TileGrid) -> World {
    let mut world = World::new();
    let tun = Tunables::default();
    world.insert_resource(Session::new(grid, &tun));
    world.insert_resource(tun);
    world.init_resource::<Autotiler>();
    world.init_resource::<Messages<LevelChanged>>();
    world
}

fn tile_count(world: &mut World) -> usize {
    world.query::<&LevelTile>().iter(world).count()
}

#[test]
fn sim_and_world_coordinates_mirror_vertically() {
    let size = Vec2::new(640.0, 480.0);
    assert_eq!(sim_to_world(size, Vec2::ZERO), Vec2::new(-320.0, 240.0));
    assert_eq!(sim_to_world(size, size), Vec2::new(320.0, -240.0));
    let p = Vec2::new(123.5, 77.25);
    assert_eq!(world_to_sim(size, sim_to_world(size, p)), p);
}

#[test]
fn spawns_one_sprite_per_non_empty_tile() {
    let mut grid = boxed_grid(8, 6);
    grid.set(3, 3, TileType::Hazard);
    grid.set(4, 2, TileType::Spawner);
    let expected = grid.cells().filter(|(_, t)| *t != TileType::Empty).count();
    let mut world = world_with_level(grid);

    run_system_once(&mut world, spawn_level);

    assert_eq!(tile_count(&mut world), expected);
}

#[test]
fn hazard_sprite_matches_the_kill_stripe() {
    let mut grid = TileGrid::new(4, 4, 32.0);
    grid.set(1, 2, TileType::Hazard);
    let mut world = world_with_level(grid);

    run_system_once(&mut world, spawn_level);

    let (tf, sprite) = world
        .query::<(&Transform, &Sprite)>()
        .single(&world)
        .expect("one hazard sprite");
    assert_eq!(sprite.custom_size, Some(Vec2::new(32.0, 3.0)));
    // Stripe spans sim y 65..68 in a 128 px tall level.
    assert_eq!(tf.translation.truncate(), Vec2::new(-16.0, 64.0 - 66.5));
}

#[test]
fn level_changes_rebuild_the_tiles() {
    let mut world = world_with_level(boxed_grid(8, 6));
    run_system_once(&mut world, spawn_level);
    let before = tile_count(&mut world);

    world.resource_mut::<Session>().level.set(3, 3, TileType::Block);
    run_system_once(&mut world, rebuild_on_change);
    assert_eq!(tile_count(&mut world), before);

    world.resource_mut::<Messages<LevelChanged>>().write(LevelChanged);
    run_system_once(&mut world, rebuild_on_change);
    assert_eq!(tile_count(&mut world), before + 1);
}

#[test]
fn exposed_tops_are_lighter_than_interiors() {
    let top = block_color(BlockPiece::TopEdge).to_srgba();
    let inner = block_color(BlockPiece::InteriorFull).to_srgba();
    assert!(top.red > inner.red);
}
