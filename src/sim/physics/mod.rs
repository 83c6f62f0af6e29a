//! Swept, axis-separated movement against the tile grid.
//!
//! Entities are centre-anchored here. Horizontal motion is resolved before vertical
//! motion, so a corner hit can differ from a true simultaneous sweep.

use bevy::math::Vec2;

use crate::sim::geom::Aabb;
use crate::sim::level::TileGrid;

/// Gap left between an entity and the tile it was clamped against.
pub const SKIN: f32 = 0.001;
/// Perpendicular inset when scanning the leading edge, so flush neighbours don't snag.
pub const EDGE_INSET: f32 = 0.01;

bitflags::bitflags! {
    /// Sides that hit a solid during one `move_entity` call.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Contacts: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const TOP    = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    #[inline]
    pub fn from_sign(dir: f32) -> Self {
        if dir < 0.0 { Self::Left } else { Self::Right }
    }
}

/// True if any solid tile rectangle overlaps `rect`. Cells outside the grid are solid.
pub fn overlaps_solid(grid: &TileGrid, rect: Aabb) -> bool {
    let left = grid.world_to_cell(rect.x);
    let right = grid.world_to_cell(rect.right() - SKIN);
    let top = grid.world_to_cell(rect.y);
    let bottom = grid.world_to_cell(rect.bottom() - SKIN);
    for cy in top..=bottom {
        for cx in left..=right {
            if let Some(tile) = grid.solid_rect(cx, cy) {
                if !tile.is_degenerate() && rect.overlaps(&tile) {
                    return true;
                }
            }
        }
    }
    false
}

/// Move a centre-anchored box by `vel * dt`, X first then Y.
///
/// Each axis is stepped in increments shorter than a tile so fast bodies can't skip a
/// thin wall. On a hit the box is clamped just outside the blocking cell and that
/// axis's velocity is zeroed.
pub fn move_entity(grid: &TileGrid, pos: &mut Vec2, vel: &mut Vec2, size: Vec2, dt: f32) -> Contacts {
    let mut contacts = Contacts::empty();
    let half = size * 0.5;
    let max_step = (grid.tile_size() - 1.0).max(1.0);

    let mut remaining = vel.x * dt;
    while remaining != 0.0 {
        let step = remaining.clamp(-max_step, max_step);
        let next_x = pos.x + step;
        let leading = if step > 0.0 { next_x + half.x } else { next_x - half.x };
        let cell_x = grid.world_to_cell(leading);
        let first = grid.world_to_cell(pos.y - half.y + EDGE_INSET);
        let last = grid.world_to_cell(pos.y + half.y - EDGE_INSET);
        if (first..=last).any(|cy| grid.is_solid_cell(cell_x, cy)) {
            if step > 0.0 {
                contacts |= Contacts::RIGHT;
                pos.x = grid.cell_to_world(cell_x) - half.x - SKIN;
            } else {
                contacts |= Contacts::LEFT;
                pos.x = grid.cell_to_world(cell_x + 1) + half.x + SKIN;
            }
            vel.x = 0.0;
            break;
        }
        pos.x = next_x;
        remaining -= step;
    }

    let mut remaining = vel.y * dt;
    while remaining != 0.0 {
        let step = remaining.clamp(-max_step, max_step);
        let next_y = pos.y + step;
        let leading = if step > 0.0 { next_y + half.y } else { next_y - half.y };
        let cell_y = grid.world_to_cell(leading);
        let first = grid.world_to_cell(pos.x - half.x + EDGE_INSET);
        let last = grid.world_to_cell(pos.x + half.x - EDGE_INSET);
        if (first..=last).any(|cx| grid.is_solid_cell(cx, cell_y)) {
            if step > 0.0 {
                contacts |= Contacts::BOTTOM;
                pos.y = grid.cell_to_world(cell_y) - half.y - SKIN;
            } else {
                contacts |= Contacts::TOP;
                pos.y = grid.cell_to_world(cell_y + 1) + half.y + SKIN;
            }
            vel.y = 0.0;
            break;
        }
        pos.y = next_y;
        remaining -= step;
    }

    contacts
}

/// Nudge a centre-anchored box out of any solid it overlaps.
///
/// Each axis is probed pixel by pixel against the direction of travel (`facing` stands in
/// for a zero horizontal velocity; a zero vertical velocity probes upward). The smaller
/// of the two corrections wins; on a tie the vertical one does. Returns whether the box
/// moved.
pub fn push_out_of_solids(grid: &TileGrid, pos: &mut Vec2, vel: &mut Vec2, size: Vec2, facing: f32) -> bool {
    let rect = Aabb::from_center(*pos, size);
    if !overlaps_solid(grid, rect) {
        return false;
    }

    let dir_x = if vel.x != 0.0 {
        if vel.x > 0.0 { -1.0 } else { 1.0 }
    } else if facing < 0.0 {
        1.0
    } else {
        -1.0
    };
    let dir_y = if vel.y >= 0.0 { -1.0 } else { 1.0 };

    let probe = |dir: f32, extent: f32, along_x: bool| {
        let steps = extent.ceil() as i32 + 2;
        (1..=steps).map(|i| dir * i as f32).find(|d| {
            let offset = if along_x { Vec2::new(*d, 0.0) } else { Vec2::new(0.0, *d) };
            !overlaps_solid(grid, rect.translated(offset))
        })
    };
    let best_x = probe(dir_x, size.x, true);
    let best_y = probe(dir_y, size.y, false);

    match (best_x, best_y) {
        (Some(dx), Some(dy)) if dx.abs() < dy.abs() => {
            pos.x += dx;
            vel.x = 0.0;
            true
        }
        (_, Some(dy)) => {
            pos.y += dy;
            vel.y = 0.0;
            true
        }
        (Some(dx), None) => {
            pos.x += dx;
            vel.x = 0.0;
            true
        }
        (None, None) => false,
    }
}

/// One-pixel probe just outside the given side of a centre-anchored box.
pub fn touching_wall(grid: &TileGrid, pos: Vec2, size: Vec2, side: WallSide) -> bool {
    let rect = Aabb::from_center(pos, size);
    let x = match side {
        WallSide::Left => rect.x - 1.0,
        WallSide::Right => rect.right(),
    };
    overlaps_solid(grid, Aabb::new(x, rect.y, 1.0, rect.h))
}

/// Whether any solid cell sits in the row one pixel below the box, ignoring the
/// outermost pixel column on each side.
pub fn ground_below(grid: &TileGrid, pos: Vec2, size: Vec2) -> bool {
    let half = size * 0.5;
    let below = grid.world_to_cell(pos.y + half.y + 1.0);
    let first = grid.world_to_cell(pos.x - half.x + 1.0);
    let last = grid.world_to_cell(pos.x + half.x - 1.0);
    (first..=last).any(|cx| grid.is_solid_cell(cx, below))
}
