//! Lighting plugin (Firefly) (render-only).
//!
//! A warm light rides with the player during play and a green glow marks the exit.
//! Solid tiles and enemies carry `Occluder2d`, so both lights cast shadows.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::{layers, state::GameState};
use crate::plugins::player::Player;
use crate::plugins::session::LevelChanged;
use crate::plugins::world::rect_to_world;
use crate::sim::Session;

#[derive(Component)]
pub struct PlayerLight;

#[derive(Component)]
pub struct ExitLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), spawn_player_light)
        .add_systems(Startup, place_exit_light)
        .add_systems(
            Update,
            (
                follow_player_light.run_if(in_state(GameState::InGame)),
                place_exit_light.run_if(on_message::<LevelChanged>),
            ),
        );
}

fn spawn_player_light(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, layers::LIGHTS),
        DespawnOnExit(GameState::InGame),
    ));
}

/// Move the exit glow to the current exit marker, or remove it when there is none.
fn place_exit_light(
    mut commands: Commands,
    session: Res<Session>,
    q_light: Query<Entity, With<ExitLight>>,
) {
    for e in &q_light {
        commands.entity(e).despawn();
    }
    let Some(exit) = session.level.exit_rect() else {
        return;
    };
    let pos = rect_to_world(session.level.pixel_size(), &exit);
    commands.spawn((
        Name::new("ExitLight"),
        ExitLight,
        PointLight2d {
            color: Color::srgb(0.4, 1.0, 0.55),
            radius: 160.0,
            ..default()
        },
        Transform::from_translation(pos.extend(layers::LIGHTS)),
    ));
}

fn follow_player_light(
    player: Option<Single<&Transform, (With<Player>, Without<PlayerLight>)>>,
    light: Option<Single<&mut Transform, (With<PlayerLight>, Without<Player>)>>,
) {
    let (Some(player), Some(mut light)) = (player, light) else {
        return;
    };
    light.translation.x = player.translation.x;
    light.translation.y = player.translation.y;
}
