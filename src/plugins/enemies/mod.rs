//! Enemies plugin: a fixed pool of sprites, one per simulation enemy slot.
//!
//! The simulation's enemy pool never grows, so the sprites are spawned once per entry
//! into InGame and only toggled and moved afterwards. No per-spawn structural changes.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;

use crate::common::{layers, state::GameState};
use crate::plugins::session::SessionSystems;
use crate::plugins::world::sim_to_world;
use crate::sim::Session;

/// Index into `EnemyField::slots`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySlot(pub usize);

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_pool)
        .add_systems(FixedUpdate, sync_pool.in_set(SessionSystems::Present));
}

fn spawn_pool(mut commands: Commands, session: Res<Session>) {
    let size = session.enemies.size();
    for slot in 0..session.enemies.capacity() {
        commands.spawn((
            Name::new(format!("Enemy{slot}")),
            EnemySlot(slot),
            Sprite {
                color: Color::srgb(0.9, 0.25, 0.25),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, layers::ENEMIES),
            Visibility::Hidden,
            Occluder2d::rectangle(size.x, size.y),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn sync_pool(
    session: Res<Session>,
    mut q: Query<(&EnemySlot, &mut Transform, &mut Visibility)>,
) {
    let field = &session.enemies;
    let half = field.size() * 0.5;
    let level = session.level.pixel_size();

    for (slot, mut tf, mut vis) in &mut q {
        let Some(enemy) = field.slots().get(slot.0).filter(|e| e.active) else {
            vis.set_if_neq(Visibility::Hidden);
            continue;
        };
        let pos = sim_to_world(level, enemy.pos + half);
        tf.translation = pos.extend(layers::ENEMIES);
        vis.set_if_neq(Visibility::Inherited);
    }
}
