//! Simulation core.
//!
//! Plain data and functions with no ECS access. The bevy plugins own a `Session` resource
//! and call `Session::tick` once per fixed step; everything below is deterministic given
//! the same grid, tunables, and input sequence.
//!
//! Coordinates are pixels, y grows downward, and tile `(cx, cy)` covers
//! `[cx * tile, (cx + 1) * tile) x [cy * tile, (cy + 1) * tile)`.

pub mod autotile;
pub mod editor;
pub mod enemy;
pub mod events;
pub mod geom;
pub mod level;
pub mod physics;
pub mod player;
pub mod session;

pub use events::FrameEvents;
pub use geom::Aabb;
pub use level::{TileGrid, TileType};
pub use player::{PlayerInput, PlayerState};
pub use session::Session;
