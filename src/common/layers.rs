//! Render depth per layer.
//!
//! Everything is a flat 2D sprite; `z` alone decides what draws on top.

pub const TILES: f32 = 0.0;
pub const MARKERS: f32 = 0.5;
pub const ENEMIES: f32 = 1.0;
pub const PLAYER: f32 = 2.0;
pub const EDITOR_CURSOR: f32 = 5.0;
pub const LIGHTS: f32 = 10.0;
pub const CAMERA: f32 = 999.0;
pub const SCREEN_FLASH: f32 = 10_000.0;
