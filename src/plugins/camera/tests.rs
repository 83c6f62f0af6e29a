use bevy::prelude::*;

use super::clamp_to_level;

#[test]
fn view_larger_than_level_stays_centred() {
    let level = Vec2::new(640.0, 480.0);
    let view = Vec2::new(1280.0, 960.0);
    assert_eq!(clamp_to_level(Vec2::new(300.0, -200.0), level, view), Vec2::ZERO);
}

#[test]
fn target_is_held_inside_the_level() {
    let level = Vec2::new(2000.0, 1000.0);
    let view = Vec2::new(1000.0, 1000.0);
    assert_eq!(clamp_to_level(Vec2::new(900.0, 50.0), level, view), Vec2::new(500.0, 0.0));
    assert_eq!(clamp_to_level(Vec2::new(-120.0, 0.0), level, view), Vec2::new(-120.0, 0.0));
}
