use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;

#[test]
fn held_keys_map_to_levels() {
    let mut world = World::new();
    let mut keys = ButtonInput::<KeyCode>::default();
    keys.press(KeyCode::ArrowLeft);
    keys.press(KeyCode::KeyS);
    world.insert_resource(keys);
    world.init_resource::<PendingInput>();

    run_system_once(&mut world, gather_input);

    let input = world.resource_mut::<PendingInput>().take();
    assert!(input.left);
    assert!(input.down);
    assert!(!input.right);
    assert!(!input.jump_held);
}

#[test]
fn jump_press_survives_until_taken_once() {
    let mut world = World::new();
    let mut keys = ButtonInput::<KeyCode>::default();
    keys.press(KeyCode::Space);
    world.insert_resource(keys);
    world.init_resource::<PendingInput>();

    run_system_once(&mut world, gather_input);

    // Key released before any fixed tick ran.
    {
        let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
        keys.release(KeyCode::Space);
        keys.clear();
    }
    run_system_once(&mut world, gather_input);

    let mut pending = world.resource_mut::<PendingInput>();
    let first = pending.take();
    assert!(first.jump_pressed);
    assert!(!first.jump_held);
    assert!(!pending.take().jump_pressed);
}

#[test]
fn take_keeps_held_levels() {
    let mut pending = PendingInput::default();
    let held = PlayerInput {
        right: true,
        jump_held: true,
        ..default()
    };
    pending.sample(held, true);

    let a = pending.take();
    let b = pending.take();
    assert!(a.jump_pressed && !b.jump_pressed);
    assert!(a.right && b.right);
    assert!(b.jump_held);
}
