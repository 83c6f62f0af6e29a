//! Player plugin: the sprite that mirrors `Session::player`.
//!
//! Pipeline:
//! - OnEnter(InGame): spawn the sprite
//! - FixedUpdate / `SessionSystems::Present`: copy position, hitbox, facing and the
//!   death animation from the session
//!
//! The transform only changes on fixed steps, so the sprite opts in to avian's transform
//! interpolation to render smoothly between them.
//!
//! `sync_sprite` takes the sprite as `Option<Single<..>>`: fixed steps can run before
//! OnEnter has spawned it, and those steps skip the copy.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers, state::GameState, tunables::Tunables};
use crate::plugins::session::SessionSystems;
use crate::plugins::world::sim_to_world;
use crate::sim::player::AnimState;
use crate::sim::Session;

/// Render offset into the floor at full grounded weight.
const GROUND_SINK_PX: f32 = 1.0;

#[derive(Component)]
pub struct Player;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(FixedUpdate, sync_sprite.in_set(SessionSystems::Present));
}

fn spawn(mut commands: Commands) {
    commands.spawn((
        Name::new("Player"),
        Player,
        Sprite::from_color(Color::WHITE, Vec2::ONE),
        Transform::from_xyz(0.0, 0.0, layers::PLAYER),
        TransformInterpolation,
        DespawnOnExit(GameState::InGame),
    ));
}

fn anim_color(anim: AnimState) -> Color {
    match anim {
        AnimState::Hurt | AnimState::Death => Color::srgb(0.95, 0.35, 0.3),
        AnimState::WallSlide | AnimState::Ladder | AnimState::LedgeHang => Color::srgb(0.45, 0.85, 0.75),
        AnimState::Dash | AnimState::Slide => Color::srgb(0.55, 0.9, 1.0),
        _ => Color::srgb(0.2, 0.75, 0.9),
    }
}

fn sync_sprite(
    tunables: Res<Tunables>,
    session: Res<Session>,
    player: Option<Single<(&mut Transform, &mut Sprite, &mut Visibility), With<Player>>>,
) {
    let Some(player) = player else {
        return;
    };
    let (mut tf, mut sprite, mut vis) = player.into_inner();
    let dying = session.is_dying();
    let p = &session.player;

    let mut pos = sim_to_world(session.level.pixel_size(), p.pos);
    pos.y -= p.ground_sink * GROUND_SINK_PX;
    tf.translation = pos.extend(layers::PLAYER);
    // Sim space is y-down, so a clockwise sim spin is a negative world angle.
    tf.rotation = Quat::from_rotation_z(-session.death_rotation(&tunables));
    tf.scale = Vec3::splat(session.death_scale(&tunables));

    let anim = p.anim_state(&tunables, dying);
    let mut color = anim_color(anim).to_srgba();
    if p.is_invincible() && !dying && (p.invincibility_timer * 20.0) as i32 % 2 == 0 {
        color.alpha = 0.35;
    }
    sprite.color = color.into();
    sprite.custom_size = Some(p.hitbox_size(&tunables, dying));
    sprite.flip_x = p.facing < 0.0;

    *vis = if session.player_hidden(&tunables) {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
}
