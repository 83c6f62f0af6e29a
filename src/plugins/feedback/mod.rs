//! Feedback plugin: "game feel" effects driven by `GameFeedback` messages.
//!
//! Three global effects, all owned by the `GlobalFx` resource:
//! - camera shake from accumulated trauma
//! - a fullscreen colour flash
//! - hitstop (virtual time frozen) followed by an optional slow-motion tail
//!
//! Producers never touch the camera or the clock. `react` turns a message into intent on
//! `GlobalFx`, and `apply_global_fx` is the only writer of camera offset, overlay alpha
//! and virtual time speed.
//!
//! Timers tick on real time so they keep running while virtual time is frozen. Without a
//! camera (headless apps) the effects decay but are never applied.

use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy::time::{Real, Virtual};

use crate::common::layers;
use crate::plugins::session::GameFeedback;

/// A value kept in `0..=1`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct UnitF32(f32);

impl UnitF32 {
    #[inline]
    fn new_clamped(v: f32) -> Self {
        Self(v.clamp(0.0, 1.0))
    }
    #[inline]
    fn get(self) -> f32 {
        self.0
    }
    #[inline]
    fn add_clamped(&mut self, dv: f32) {
        self.0 = (self.0 + dv).clamp(0.0, 1.0);
    }
    #[inline]
    fn raise_to(&mut self, v: f32) {
        self.0 = self.0.max(v.clamp(0.0, 1.0));
    }
    #[inline]
    fn decay_to_zero(&mut self, rate_per_sec: f32, dt: f32) {
        self.0 = (self.0 - rate_per_sec * dt).max(0.0);
    }
}

/// Non-negative wall-clock seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RealSeconds(f32);

impl RealSeconds {
    #[inline]
    fn new(v: f32) -> Self {
        Self(v.max(0.0))
    }
    #[inline]
    fn get(self) -> f32 {
        self.0
    }
    #[inline]
    fn set_max(&mut self, v: f32) {
        self.0 = self.0.max(v.max(0.0));
    }
    #[inline]
    fn tick_down(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }
    #[inline]
    fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

/// Fullscreen flash sprite, centred on the camera every frame.
#[derive(Component, Debug, Clone, Copy)]
struct ScreenFlashOverlay;

/// Cached camera and overlay entities plus the shake offset applied last frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
struct FxHandles {
    camera: Option<Entity>,
    overlay: Option<Entity>,
    prev_shake_offset: Vec2,
}

#[derive(Resource, Debug)]
pub struct GlobalFx {
    trauma: UnitF32,
    shake_phase: f32,
    flash: UnitF32,
    flash_color: Color,
    hitstop: RealSeconds,
    slowmo_remaining: RealSeconds,
    slowmo_duration: RealSeconds,
    /// Speed at the start of the slow-motion tail, `0..=1`.
    slowmo_min_speed: f32,
}

impl Default for GlobalFx {
    fn default() -> Self {
        Self {
            trauma: UnitF32::default(),
            shake_phase: 0.0,
            flash: UnitF32::default(),
            flash_color: Color::WHITE,
            hitstop: RealSeconds::default(),
            slowmo_remaining: RealSeconds::default(),
            slowmo_duration: RealSeconds::new(1.0),
            slowmo_min_speed: 1.0,
        }
    }
}

impl GlobalFx {
    /// Queue the effect preset for one feedback message. Presets stack: trauma adds up,
    /// timers only ever extend.
    pub fn react(&mut self, msg: GameFeedback) {
        match msg {
            GameFeedback::Stomp => {
                self.trauma.add_clamped(0.35);
                self.hitstop.set_max(0.04);
            }
            GameFeedback::HardLanding => {
                self.trauma.add_clamped(0.3);
            }
            GameFeedback::Hurt => {
                self.trauma.add_clamped(0.6);
                self.flash_to(0.55, Color::srgb(1.0, 0.2, 0.15));
                self.hitstop.set_max(0.07);
            }
            GameFeedback::Died => {
                self.trauma.add_clamped(0.9);
                self.flash_to(1.0, Color::srgb(1.0, 0.25, 0.2));
                self.hitstop.set_max(0.12);
                self.slowmo(0.8, 0.3);
            }
            GameFeedback::Victory { .. } => {
                self.flash_to(0.8, Color::srgb(0.75, 1.0, 0.8));
                self.slowmo(0.6, 0.4);
            }
            _ => {}
        }
    }

    fn flash_to(&mut self, intensity: f32, color: Color) {
        self.flash.raise_to(intensity);
        self.flash_color = color;
    }

    fn slowmo(&mut self, duration: f32, min_speed: f32) {
        self.slowmo_duration = RealSeconds::new(duration);
        self.slowmo_remaining.set_max(duration);
        self.slowmo_min_speed = min_speed.clamp(0.0, 1.0);
    }

    /// Virtual time speed for this frame: frozen during hitstop, then eased back to 1.
    fn time_speed(&self) -> f32 {
        if self.hitstop.is_positive() {
            return 0.0;
        }
        if !self.slowmo_remaining.is_positive() {
            return 1.0;
        }
        let dur = self.slowmo_duration.get().max(0.0001);
        let progress = 1.0 - (self.slowmo_remaining.get() / dur).clamp(0.0, 1.0);
        let min = self.slowmo_min_speed;
        min + (1.0 - min) * smootherstep(progress)
    }

    /// Hitstop runs out before the slow-motion tail starts counting.
    fn tick_timers(&mut self, dt: f32) {
        if self.hitstop.is_positive() {
            self.hitstop.tick_down(dt);
        } else {
            self.slowmo_remaining.tick_down(dt);
        }
    }

    /// Shake offset for the current trauma, zero when calm.
    fn shake_offset(&self) -> Vec2 {
        let trauma = self.trauma.get();
        if trauma <= 0.0 {
            return Vec2::ZERO;
        }
        let amp = 18.0 * trauma * trauma;
        let t = self.shake_phase;
        let x = (t * 37.0 * TAU).sin() + 0.5 * (t * 61.0 * TAU).sin();
        let y = (t * 41.0 * TAU).cos() + 0.5 * (t * 53.0 * TAU).cos();
        Vec2::new(x, y).clamp_length_max(1.0) * amp
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FxSystems;

pub fn plugin(app: &mut App) {
    app.init_resource::<GlobalFx>()
        .init_resource::<FxHandles>()
        .add_systems(Update, collect_feedback)
        .add_systems(
            PostUpdate,
            (ensure_fx_handles, apply_global_fx).chain().in_set(FxSystems),
        );
}

fn collect_feedback(mut reader: MessageReader<GameFeedback>, mut fx: ResMut<GlobalFx>) {
    for msg in reader.read() {
        fx.react(*msg);
    }
}

/// Cache the camera, and spawn the overlay the first time one is needed.
fn ensure_fx_handles(
    mut commands: Commands,
    mut handles: ResMut<FxHandles>,
    q_cam: Query<Entity, With<Camera2d>>,
    q_overlay: Query<Entity, With<ScreenFlashOverlay>>,
) {
    if handles.camera.is_some_and(|e| q_cam.contains(e)) && handles.overlay.is_some() {
        return;
    }
    handles.camera = q_cam.iter().next();
    if handles.camera.is_none() {
        return;
    }
    if handles.overlay.is_none() {
        handles.overlay = q_overlay.iter().next().or_else(|| {
            let e = commands
                .spawn((
                    Name::new("ScreenFlash"),
                    ScreenFlashOverlay,
                    Sprite {
                        color: Color::srgba(1.0, 1.0, 1.0, 0.0),
                        custom_size: Some(Vec2::splat(5000.0)),
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, layers::SCREEN_FLASH),
                    Visibility::Hidden,
                ))
                .id();
            Some(e)
        });
    }
}

/// Quintic ease, `0..=1` to `0..=1` with zero slope at both ends.
#[inline]
fn smootherstep(x: f32) -> f32 {
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

fn apply_global_fx(
    real_time: Res<Time<Real>>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut fx: ResMut<GlobalFx>,
    mut handles: ResMut<FxHandles>,
    mut q_cam_tf: Query<&mut Transform, (With<Camera2d>, Without<ScreenFlashOverlay>)>,
    mut q_overlay: Query<
        (&mut Transform, &mut Sprite, &mut Visibility),
        (With<ScreenFlashOverlay>, Without<Camera2d>),
    >,
) {
    let dt = real_time.delta_secs();

    virtual_time.set_relative_speed(fx.time_speed());
    fx.tick_timers(dt);

    fx.shake_phase += dt;
    fx.trauma.decay_to_zero(0.9, dt);
    fx.flash.decay_to_zero(3.0, dt);

    let Some(cam_e) = handles.camera else {
        return;
    };

    // Undo last frame's shake before applying this frame's.
    let offset = fx.shake_offset();
    let Ok(mut cam_tf) = q_cam_tf.get_mut(cam_e) else {
        return;
    };
    cam_tf.translation += (offset - handles.prev_shake_offset).extend(0.0);
    handles.prev_shake_offset = offset;
    let cam_pos = cam_tf.translation.truncate();

    let Some(overlay_e) = handles.overlay else {
        return;
    };
    if let Ok((mut tf, mut sprite, mut vis)) = q_overlay.get_mut(overlay_e) {
        tf.translation = cam_pos.extend(layers::SCREEN_FLASH);
        if fx.flash.get() > 0.001 {
            *vis = Visibility::Visible;
            sprite.color = fx.flash_color.with_alpha((fx.flash.get() * 0.85).clamp(0.0, 0.85));
        } else {
            *vis = Visibility::Hidden;
        }
    }
}

#[cfg(test)]
mod tests;
