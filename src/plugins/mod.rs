//! Feature plugins.
//!
//! Order matters: `core` inserts the tunables every later plugin reads at build time,
//! and `session` owns the resource and system sets the presentation plugins hang off.

use bevy::prelude::*;

pub mod core;
pub mod enemies;
pub mod feedback;
pub mod input;
pub mod physics;
pub mod player;
pub mod session;
pub mod world;

// Render-only
pub mod camera;
pub mod editor;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    input::plugin(app);
    session::plugin(app);
    world::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    feedback::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
    editor::plugin(app);
}
