//! World plugin: one sprite per non-empty tile of the session's level.
//!
//! The level is asset-free: blocks are flat colour squares shaded by their autotile piece,
//! hazards are thin stripes matching their kill rectangle, markers are translucent.
//! Sprites are rebuilt from scratch on startup and whenever `LevelChanged` is published.
//!
//! Simulation space is y-down with the origin at the level's top-left corner. World space
//! is y-up with the level centred on the origin; `sim_to_world` converts between them.

use bevy::prelude::*;
use bevy_firefly::prelude::Occluder2d;

use crate::common::layers;
use crate::common::tunables::Tunables;
use crate::plugins::session::LevelChanged;
use crate::sim::autotile::{AutotileTable, BlockPiece};
use crate::sim::{Aabb, Session, TileGrid, TileType};

/// Tile sprite tag, keyed by cell.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTile {
    pub cell: IVec2,
}

#[derive(Resource, Deref, Default)]
pub struct Autotiler(AutotileTable);

pub fn plugin(app: &mut App) {
    app.init_resource::<Autotiler>()
        .add_systems(Startup, spawn_level)
        .add_systems(Update, rebuild_on_change);
}

/// Simulation pixel position to world position.
#[inline]
pub fn sim_to_world(level_size: Vec2, p: Vec2) -> Vec2 {
    Vec2::new(p.x - level_size.x * 0.5, level_size.y * 0.5 - p.y)
}

/// World position to simulation pixel position.
#[inline]
pub fn world_to_sim(level_size: Vec2, w: Vec2) -> Vec2 {
    Vec2::new(w.x + level_size.x * 0.5, level_size.y * 0.5 - w.y)
}

/// World-space centre of a simulation rectangle.
#[inline]
pub fn rect_to_world(level_size: Vec2, rect: &Aabb) -> Vec2 {
    sim_to_world(level_size, rect.center())
}

fn block_color(piece: BlockPiece) -> Color {
    if piece.exposed_top() {
        return Color::srgb(0.42, 0.46, 0.55);
    }
    // Deeper atlas rows are further from an open edge.
    let row = piece.atlas_cell().y as f32;
    let shade = 0.30 - row * 0.02;
    Color::srgb(shade, shade + 0.02, shade + 0.07)
}

/// Sprite for one cell, or `None` for empty cells.
fn tile_sprite(
    grid: &TileGrid,
    table: &AutotileTable,
    tunables: &Tunables,
    cx: i32,
    cy: i32,
) -> Option<(Sprite, Aabb, f32)> {
    let cell = grid.tile_rect(cx, cy);
    let (color, rect, z) = match grid.get(cx, cy) {
        TileType::Empty => return None,
        TileType::Block => (block_color(table.piece_at(grid, cx, cy)), cell, layers::TILES),
        TileType::Hazard => {
            let s = &tunables.session;
            let stripe = grid.hazard_rect(cx, cy, s.hazard_stripe_offset, s.hazard_stripe_thickness);
            (Color::srgb(0.95, 0.2, 0.25), stripe, layers::MARKERS)
        }
        TileType::PlayerMarker => (Color::srgba(0.2, 0.75, 0.9, 0.25), cell, layers::MARKERS),
        TileType::ExitMarker => (Color::srgba(0.3, 0.95, 0.45, 0.6), cell, layers::MARKERS),
        TileType::Spawner => (Color::srgba(0.7, 0.3, 0.9, 0.35), cell, layers::MARKERS),
    };
    let sprite = Sprite {
        color,
        custom_size: Some(Vec2::new(rect.w, rect.h)),
        ..default()
    };
    Some((sprite, rect, z))
}

fn spawn_level(
    mut commands: Commands,
    session: Res<Session>,
    table: Res<Autotiler>,
    tunables: Res<Tunables>,
) {
    spawn_tiles(&mut commands, &session.level, &table, &tunables);
}

fn spawn_tiles(commands: &mut Commands, grid: &TileGrid, table: &AutotileTable, tunables: &Tunables) {
    let size = grid.pixel_size();
    let ts = grid.tile_size();

    grid.cells().for_each(|(cell, tile)| {
        let Some((sprite, rect, z)) = tile_sprite(grid, table, tunables, cell.x, cell.y) else {
            return;
        };
        let pos = rect_to_world(size, &rect);
        let mut e = commands.spawn((
            Name::new(format!("Tile{}x{}", cell.x, cell.y)),
            LevelTile { cell },
            sprite,
            Transform::from_xyz(pos.x, pos.y, z),
        ));
        if tile.is_solid() {
            e.insert(Occluder2d::rectangle(ts, ts));
        }
    });
}

fn rebuild_on_change(
    mut commands: Commands,
    mut changed: MessageReader<LevelChanged>,
    session: Res<Session>,
    table: Res<Autotiler>,
    tunables: Res<Tunables>,
    q_tiles: Query<Entity, With<LevelTile>>,
) {
    if changed.read().count() == 0 {
        return;
    }
    for e in &q_tiles {
        commands.entity(e).despawn();
    }
    spawn_tiles(&mut commands, &session.level, &table, &tunables);
}

#[cfg(test)]
mod tests;
