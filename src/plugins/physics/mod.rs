//! Physics plugin: fixed-step clock and render smoothing.
//!
//! The simulation does its own tile collision (`sim::physics`); avian only supplies
//! transform interpolation so sprites written once per fixed step move smoothly
//! between steps. No colliders or rigid bodies are spawned and gravity is off.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>();
    let hz = tunables.fixed_hz;
    let max_delta = tunables.max_frame_delta;
    let tile = tunables.tile_size;

    app.insert_resource(Time::<Fixed>::from_hz(hz));
    // A stalled frame is clamped, so at most this much time is replayed as fixed steps.
    if let Some(mut virt) = app.world_mut().get_resource_mut::<Time<Virtual>>() {
        virt.set_max_delta(Duration::from_secs_f32(max_delta));
    }

    app.add_plugins(PhysicsPlugins::default().with_length_unit(tile));
    app.insert_resource(Gravity(Vec2::ZERO));
}

#[cfg(test)]
mod tests;
