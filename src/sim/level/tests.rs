use bevy::math::{IVec2, Vec2};

use super::{TileGrid, TileType};

#[test]
fn classification_predicates() {
    assert!(TileType::Block.is_solid());
    assert!(!TileType::Hazard.is_solid());
    assert!(!TileType::Spawner.is_solid());
    assert!(!TileType::ExitMarker.is_solid());
    assert!(TileType::Hazard.is_hazard());
    assert!(TileType::Spawner.is_spawner());
    assert!(TileType::PlayerMarker.is_unique());
    assert!(!TileType::Block.is_unique());
}

#[test]
fn out_of_bounds_reads_as_block_and_ignores_writes() {
    let mut grid = TileGrid::new(4, 3, 32.0);
    assert_eq!(grid.get(-1, 0), TileType::Block);
    assert_eq!(grid.get(4, 0), TileType::Block);
    assert_eq!(grid.get(0, 3), TileType::Block);
    assert!(!grid.set(10, 10, TileType::Hazard));
    assert_eq!(grid.count(TileType::Hazard), 0);
}

#[test]
fn set_unique_keeps_a_single_marker() {
    let mut grid = TileGrid::new(8, 8, 32.0);
    grid.set_unique(1, 1, TileType::PlayerMarker);
    grid.set_unique(5, 6, TileType::PlayerMarker);
    assert_eq!(grid.count(TileType::PlayerMarker), 1);
    assert_eq!(grid.find(TileType::PlayerMarker), Some(IVec2::new(5, 6)));
    assert_eq!(grid.get(1, 1), TileType::Empty);
    assert!(!grid.set_unique(5, 6, TileType::PlayerMarker));
}

#[test]
fn default_level_has_solid_perimeter_and_markers() {
    let grid = TileGrid::default_level(40, 30, 32.0);
    for x in 0..40 {
        assert!(grid.is_solid_cell(x, 0));
        assert!(grid.is_solid_cell(x, 29));
    }
    for y in 0..30 {
        assert!(grid.is_solid_cell(0, y));
        assert!(grid.is_solid_cell(39, y));
    }
    assert_eq!(grid.find(TileType::PlayerMarker), Some(IVec2::new(1, 28)));
    assert_eq!(grid.find(TileType::ExitMarker), Some(IVec2::new(38, 28)));
    assert_eq!(grid.pixel_size(), Vec2::new(1280.0, 960.0));
}

#[test]
fn only_blocks_have_collision_rects() {
    let grid = TileGrid::from_ascii(&["#^S.", "PE.."], 32.0);
    assert_eq!(grid.solid_rect(0, 0).map(|r| r.x), Some(0.0));
    assert!(grid.solid_rect(1, 0).is_none());
    assert!(grid.solid_rect(2, 0).is_none());
    assert!(grid.solid_rect(3, 0).is_none());
    assert!(grid.solid_rect(0, 1).is_none());
}

#[test]
fn hazard_stripe_is_thinner_than_the_tile() {
    let grid = TileGrid::new(4, 4, 32.0);
    let r = grid.hazard_rect(2, 1, 1.0, 3.0);
    assert_eq!((r.x, r.y, r.w, r.h), (64.0, 33.0, 32.0, 3.0));
}

#[test]
fn world_cell_conversion_floors_negative_values() {
    let grid = TileGrid::new(4, 4, 32.0);
    assert_eq!(grid.world_to_cell(31.999), 0);
    assert_eq!(grid.world_to_cell(32.0), 1);
    assert_eq!(grid.world_to_cell(-0.5), -1);
    assert_eq!(grid.cell_to_world(3), 96.0);
}

#[test]
fn player_spawn_is_feet_on_marker_floor() {
    let grid = TileGrid::from_ascii(&["....", ".P..", "####"], 32.0);
    assert_eq!(grid.player_spawn(), Some(Vec2::new(48.0, 64.0)));
    assert_eq!(grid.exit_rect(), None);
}

#[test]
fn spawner_cells_are_listed_in_row_order() {
    let grid = TileGrid::from_ascii(&["S..S", "....", ".S.."], 32.0);
    let cells: Vec<_> = grid.spawner_cells().collect();
    assert_eq!(cells, vec![IVec2::new(0, 0), IVec2::new(3, 0), IVec2::new(1, 2)]);
}
