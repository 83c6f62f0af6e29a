//! Camera plugin (render-only).
//!
//! One camera for the whole app, spawned at startup so the editor can use it too.
//! During play it eases toward the player; the target is clamped so the view never
//! leaves the level, and a level smaller than the view stays centred.
//!
//! The camera's `Transform` is also written by the feedback shake. Follow runs first
//! (`before(FxSystems)`), the shake offset is layered on afterwards.
//!
//! B0001: the player and camera queries both touch `Transform`; `Without<...>` filters
//! prove them disjoint.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::{layers, state::GameState};
use crate::plugins::feedback::FxSystems;
use crate::plugins::player::Player;
use crate::sim::Session;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera).add_systems(
        PostUpdate,
        follow_target
            .before(FxSystems)
            .before(TransformSystems::Propagate),
    );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, layers::CAMERA),
    ));
}

/// Clamp a camera centre so a `view`-sized window stays inside a `level`-sized area
/// centred on the origin.
pub fn clamp_to_level(target: Vec2, level: Vec2, view: Vec2) -> Vec2 {
    let slack = ((level - view) * 0.5).max(Vec2::ZERO);
    target.clamp(-slack, slack)
}

fn follow_target(
    time: Res<Time>,
    state: Res<State<GameState>>,
    session: Res<Session>,
    player: Option<Single<&Transform, (With<Player>, Without<MainCamera>)>>,
    camera: Option<Single<(&mut Transform, &MainCamera, &Camera), Without<Player>>>,
) {
    let Some(camera) = camera else {
        return;
    };
    let (mut tf_cam, main_cam, cam) = camera.into_inner();

    let level = session.level.pixel_size();
    let view = cam.logical_viewport_size().unwrap_or(level);
    let target = match (state.get(), player) {
        (GameState::InGame, Some(player)) => player.translation.truncate(),
        _ => Vec2::ZERO,
    };
    let target = clamp_to_level(target, level, view);

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();
    let pos = tf_cam.translation.truncate();
    let next = pos + (target - pos) * alpha;
    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}

#[cfg(test)]
mod tests;
