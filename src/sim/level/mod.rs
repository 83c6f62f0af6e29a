//! Tile grid and level data.

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::sim::geom::Aabb;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    Block,
    Hazard,
    PlayerMarker,
    ExitMarker,
    Spawner,
}

impl TileType {
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Block)
    }

    #[inline]
    pub fn is_hazard(self) -> bool {
        matches!(self, Self::Hazard)
    }

    #[inline]
    pub fn is_spawner(self) -> bool {
        matches!(self, Self::Spawner)
    }

    /// Markers that may appear at most once per grid.
    #[inline]
    pub fn is_unique(self) -> bool {
        matches!(self, Self::PlayerMarker | Self::ExitMarker)
    }

    /// Parse one cell of the ASCII level notation.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '.' | ' ' => Self::Empty,
            '#' => Self::Block,
            '^' => Self::Hazard,
            'P' => Self::PlayerMarker,
            'E' => Self::ExitMarker,
            'S' => Self::Spawner,
            _ => return None,
        })
    }
}

/// Fixed-size `cols x rows` tile matrix, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    tile_size: f32,
    tiles: Vec<TileType>,
}

impl TileGrid {
    pub fn new(cols: usize, rows: usize, tile_size: f32) -> Self {
        Self {
            cols,
            rows,
            tile_size,
            tiles: vec![TileType::Empty; cols * rows],
        }
    }

    /// Perimeter walls, player marker bottom-left, exit marker bottom-right.
    pub fn default_level(cols: usize, rows: usize, tile_size: f32) -> Self {
        let mut grid = Self::new(cols, rows, tile_size);
        grid.fill_perimeter();
        let floor_row = rows as i32 - 2;
        grid.set_unique(1, floor_row, TileType::PlayerMarker);
        grid.set_unique(cols as i32 - 2, floor_row, TileType::ExitMarker);
        grid
    }

    /// Build a grid from ASCII rows (`#` block, `^` hazard, `P` player, `E` exit,
    /// `S` spawner, `.` empty). Short rows are padded with empty cells; unknown
    /// characters read as empty.
    pub fn from_ascii(rows: &[&str], tile_size: f32) -> Self {
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(cols, rows.len(), tile_size);
        for (cy, row) in rows.iter().enumerate() {
            for (cx, c) in row.chars().enumerate() {
                let t = TileType::from_char(c).unwrap_or_default();
                if t.is_unique() {
                    grid.set_unique(cx as i32, cy as i32, t);
                } else {
                    grid.set(cx as i32, cy as i32, t);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level extent in pixels.
    #[inline]
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32, self.rows as f32) * self.tile_size
    }

    #[inline]
    pub fn in_bounds(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cy >= 0 && (cx as usize) < self.cols && (cy as usize) < self.rows
    }

    #[inline]
    fn index(&self, cx: i32, cy: i32) -> usize {
        cy as usize * self.cols + cx as usize
    }

    /// Out-of-bounds cells read as `Block`.
    #[inline]
    pub fn get(&self, cx: i32, cy: i32) -> TileType {
        if !self.in_bounds(cx, cy) {
            return TileType::Block;
        }
        self.tiles[self.index(cx, cy)]
    }

    /// Returns whether the cell changed. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cx: i32, cy: i32, t: TileType) -> bool {
        if !self.in_bounds(cx, cy) {
            return false;
        }
        let i = self.index(cx, cy);
        let changed = self.tiles[i] != t;
        self.tiles[i] = t;
        changed
    }

    /// Clear every existing `t` before placing it at `(cx, cy)`.
    pub fn set_unique(&mut self, cx: i32, cy: i32, t: TileType) -> bool {
        if !self.in_bounds(cx, cy) {
            return false;
        }
        if self.get(cx, cy) == t && self.count(t) == 1 {
            return false;
        }
        let mut changed = false;
        for cell in self.tiles.iter_mut().filter(|c| **c == t) {
            *cell = TileType::Empty;
            changed = true;
        }
        self.set(cx, cy, t) || changed
    }

    /// First cell holding `t`, scanning rows top to bottom.
    pub fn find(&self, t: TileType) -> Option<IVec2> {
        self.tiles
            .iter()
            .position(|c| *c == t)
            .map(|i| IVec2::new((i % self.cols) as i32, (i / self.cols) as i32))
    }

    pub fn count(&self, t: TileType) -> usize {
        self.tiles.iter().filter(|c| **c == t).count()
    }

    pub fn fill_perimeter(&mut self) {
        let (cols, rows) = (self.cols as i32, self.rows as i32);
        for x in 0..cols {
            self.set(x, 0, TileType::Block);
            self.set(x, rows - 1, TileType::Block);
        }
        for y in 1..rows - 1 {
            self.set(0, y, TileType::Block);
            self.set(cols - 1, y, TileType::Block);
        }
    }

    pub fn clear(&mut self) {
        self.tiles.fill(TileType::Empty);
    }

    /// Every cell with its coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, TileType)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (IVec2::new((i % self.cols) as i32, (i / self.cols) as i32), *t))
    }

    pub fn spawner_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells().filter(|(_, t)| t.is_spawner()).map(|(c, _)| c)
    }

    #[inline]
    pub fn world_to_cell(&self, v: f32) -> i32 {
        (v / self.tile_size).floor() as i32
    }

    #[inline]
    pub fn cell_to_world(&self, c: i32) -> f32 {
        c as f32 * self.tile_size
    }

    /// Solidity by cell, with out-of-bounds treated as solid.
    #[inline]
    pub fn is_solid_cell(&self, cx: i32, cy: i32) -> bool {
        self.get(cx, cy).is_solid()
    }

    #[inline]
    pub fn tile_rect(&self, cx: i32, cy: i32) -> Aabb {
        Aabb::new(
            self.cell_to_world(cx),
            self.cell_to_world(cy),
            self.tile_size,
            self.tile_size,
        )
    }

    /// Collision rectangle of a solid tile. Non-blocking tiles have none.
    pub fn solid_rect(&self, cx: i32, cy: i32) -> Option<Aabb> {
        match self.get(cx, cy) {
            TileType::Block => Some(self.tile_rect(cx, cy)),
            _ => None,
        }
    }

    /// Thin stripe near the top of a hazard cell; only this part hurts.
    pub fn hazard_rect(&self, cx: i32, cy: i32, offset: f32, thickness: f32) -> Aabb {
        Aabb::new(
            self.cell_to_world(cx),
            self.cell_to_world(cy) + offset,
            self.tile_size,
            thickness,
        )
    }

    /// Feet position for the player: bottom-centre of the player marker cell.
    pub fn player_spawn(&self) -> Option<Vec2> {
        self.find(TileType::PlayerMarker).map(|c| {
            Vec2::new(
                self.cell_to_world(c.x) + self.tile_size * 0.5,
                self.cell_to_world(c.y + 1),
            )
        })
    }

    pub fn exit_rect(&self) -> Option<Aabb> {
        self.find(TileType::ExitMarker).map(|c| self.tile_rect(c.x, c.y))
    }
}

#[cfg(test)]
mod tests;
