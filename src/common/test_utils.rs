//! Test helpers.
//!
//! Systems run through `World::run_system_once` skip the schedule's `ApplyDeferred`, so
//! `run_system_once` flushes the world afterwards to apply queued commands before assertions.

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::sim::level::{TileGrid, TileType};
use crate::sim::player::{PlayerInput, PlayerState};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Empty grid with solid perimeter walls.
pub fn boxed_grid(cols: usize, rows: usize) -> TileGrid {
    let mut grid = TileGrid::new(cols, rows, Tunables::default().tile_size);
    grid.fill_perimeter();
    grid
}

/// Boxed grid with the player marker standing on the floor at column `cx`.
pub fn floor_grid(cols: usize, rows: usize, cx: i32) -> TileGrid {
    let mut grid = boxed_grid(cols, rows);
    grid.set_unique(cx, rows as i32 - 2, TileType::PlayerMarker);
    grid
}

/// Tick `player` with no input until it rests on the ground, up to `max_ticks`.
pub fn settle(player: &mut PlayerState, grid: &TileGrid, tun: &Tunables, max_ticks: usize) -> bool {
    for _ in 0..max_ticks {
        player.update(grid, &PlayerInput::default(), tun, tun.base_dt());
        if player.grounded && player.vel.length() < 1.0 {
            return true;
        }
    }
    false
}

/// Tiny xorshift generator for reproducible sweeps.
pub struct XorShift(u32);

impl XorShift {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    pub fn chance(&mut self, num: u32, den: u32) -> bool {
        self.next_u32() % den < num
    }
}
