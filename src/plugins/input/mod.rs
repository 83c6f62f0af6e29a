//! Input plugin: keyboard sampling for the fixed-step simulation.
//!
//! Pipeline:
//! - PreUpdate: sample keys once per rendered frame into `PendingInput`
//! - FixedUpdate: the session takes one `PlayerInput` per tick
//!
//! Held keys are levels and are simply overwritten each frame. A jump press is an edge:
//! it is latched until a fixed tick takes it, so a frame with no fixed step does not lose
//! it and a frame with several steps does not repeat it.

use bevy::input::InputSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::sim::PlayerInput;

const LEFT: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const DOWN: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const JUMP: [KeyCode; 3] = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];

#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PendingInput {
    latest: PlayerInput,
}

impl PendingInput {
    /// Record one frame of key state. A press stays latched until `take`.
    pub fn sample(&mut self, held: PlayerInput, jump_just_pressed: bool) {
        let latched = self.latest.jump_pressed;
        self.latest = PlayerInput {
            jump_pressed: latched || jump_just_pressed,
            ..held
        };
    }

    /// Controls for one fixed tick. The jump edge is handed out once.
    pub fn take(&mut self) -> PlayerInput {
        let out = self.latest;
        self.latest.jump_pressed = false;
        out
    }

    pub fn clear(&mut self) {
        self.latest = PlayerInput::default();
    }
}

pub fn plugin(app: &mut App) {
    // Present with or without `InputPlugin` so headless apps can drive keys directly.
    app.init_resource::<ButtonInput<KeyCode>>()
        .init_resource::<PendingInput>()
        .add_systems(OnEnter(GameState::InGame), reset_input)
        .add_systems(
            PreUpdate,
            gather_input
                .after(InputSystems)
                .run_if(in_state(GameState::InGame)),
        );
}

fn reset_input(mut pending: ResMut<PendingInput>) {
    pending.clear();
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut pending: ResMut<PendingInput>) {
    let held = PlayerInput {
        left: keys.any_pressed(LEFT),
        right: keys.any_pressed(RIGHT),
        down: keys.any_pressed(DOWN),
        jump_held: keys.any_pressed(JUMP),
        jump_pressed: false,
    };
    pending.sample(held, keys.any_just_pressed(JUMP));
}

#[cfg(test)]
mod tests;
