//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `bevy_platformer::game::configure_headless` to install gameplay plugins.
//!
//! Virtual time is frozen, so fixed steps only run when a test calls `fixed_tick`.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use bevy_platformer::common::state::GameState;

pub fn app_headless() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));

    bevy_platformer::game::configure_headless(&mut app);

    // Run Startup and the initial OnEnter(InGame).
    app.update();
    app
}

/// Run exactly one simulation step.
pub fn fixed_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

pub fn set_state(app: &mut App, next: GameState) {
    app.world_mut().resource_mut::<NextState<GameState>>().set(next);
    app.update();
}
