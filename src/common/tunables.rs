//! Tunable gameplay constants.
//!
//! Everything the simulation reads lives here, grouped by the subsystem that owns it.
//! The whole tree deserializes from RON with `#[serde(default)]`, so a config file only
//! needs to name the values it changes.

use std::fmt;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Side of one square tile in pixels.
    pub tile_size: f32,
    pub grid_cols: usize,
    pub grid_rows: usize,
    /// Simulation rate. One `Session::tick` per fixed step.
    pub fixed_hz: f64,
    /// Upper bound for a single rendered frame's delta (seconds).
    pub max_frame_delta: f32,
    pub movement: MovementTuning,
    pub hitbox: HitboxTuning,
    pub enemy: EnemyTuning,
    pub session: SessionTuning,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            grid_cols: 40,
            grid_rows: 30,
            fixed_hz: 120.0,
            max_frame_delta: 0.25,
            movement: MovementTuning::default(),
            hitbox: HitboxTuning::default(),
            enemy: EnemyTuning::default(),
            session: SessionTuning::default(),
        }
    }
}

impl Tunables {
    /// Fixed simulation step in seconds.
    #[inline]
    pub fn base_dt(&self) -> f32 {
        (1.0 / self.fixed_hz) as f32
    }

    /// Load tunables from a RON file.
    pub fn load(path: &Path) -> Result<Self, TunablesError> {
        let contents = fs::read_to_string(path).map_err(|source| TunablesError::Io {
            file: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&contents).map_err(|message| TunablesError::Parse {
            file: path.display().to_string(),
            message,
        })
    }

    /// Parse tunables from RON text. Missing fields keep their defaults.
    pub fn from_ron(text: &str) -> Result<Self, String> {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(text)
            .map_err(|e| e.to_string())
    }

    /// Load from `path`, falling back to defaults when the file is absent or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(t) => {
                info!("Loaded tunables from {}", path.display());
                t
            }
            Err(e) => {
                warn!("{e}; using default tunables");
                Self::default()
            }
        }
    }
}

/// Errors from reading a tunables file.
#[derive(Debug)]
pub enum TunablesError {
    Io { file: String, source: std::io::Error },
    Parse { file: String, message: String },
}

impl fmt::Display for TunablesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => write!(f, "Failed to read {file}: {source}"),
            Self::Parse { file, message } => write!(f, "Failed to parse {file}: {message}"),
        }
    }
}

impl std::error::Error for TunablesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

/// Player locomotion. Speeds are pixels per second, the simulation is y-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub gravity: f32,
    pub gravity_fall_mult: f32,
    pub move_accel: f32,
    pub air_accel: f32,
    /// Per-frame multiplicative decay at the base rate.
    pub ground_friction: f32,
    pub air_friction: f32,
    pub crouch_friction: f32,
    pub max_speed_x: f32,
    pub max_speed_x_crouch: f32,
    pub max_speed_y: f32,
    /// Upward launch speed (applied as negative y).
    pub jump_speed: f32,
    pub jump_cut_mult: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub ground_stick_time: f32,
    pub wall_jump_push_x: f32,
    pub wall_slide_max_fall: f32,
    pub wall_slide_accel: f32,
    pub wall_coyote_time: f32,
    pub wall_stick_time: f32,
    /// Fraction of the hitbox height, measured from the top, where the hand probe sits.
    pub ledge_hand_frac: f32,
    pub ledge_snap_padding: f32,
    /// How far below the ledge surface the head may be and still grab.
    pub ledge_top_tolerance: f32,
    /// Ledges are not grabbed while rising faster than this.
    pub ledge_max_rise_speed: f32,
    pub crouch_anim_time: f32,
    pub hurt_time: f32,
    pub hurt_land_speed: f32,
    pub dash_speed_frac: f32,
    pub slide_speed: f32,
    pub ladder_slide_speed: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            gravity_fall_mult: 1.5,
            move_accel: 1200.0,
            air_accel: 750.0,
            ground_friction: 0.88,
            air_friction: 0.985,
            crouch_friction: 0.97,
            max_speed_x: 320.0,
            max_speed_x_crouch: 320.0,
            max_speed_y: 1400.0,
            jump_speed: 760.0,
            jump_cut_mult: 0.5,
            coyote_time: 0.12,
            jump_buffer_time: 0.12,
            ground_stick_time: 0.030,
            wall_jump_push_x: 320.0,
            wall_slide_max_fall: 400.0,
            wall_slide_accel: 2000.0,
            wall_coyote_time: 0.12,
            wall_stick_time: 0.10,
            ledge_hand_frac: 0.35,
            ledge_snap_padding: 2.0,
            ledge_top_tolerance: 6.0,
            ledge_max_rise_speed: 40.0,
            crouch_anim_time: 0.3,
            hurt_time: 0.35,
            hurt_land_speed: 950.0,
            dash_speed_frac: 1.2,
            slide_speed: 80.0,
            ladder_slide_speed: 40.0,
        }
    }
}

/// Collision box per animation state, `(width, height)` in pixels.
///
/// Tuples rather than `Vec2` keep the RON schema independent of math-crate serde features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxTuning {
    pub idle: (f32, f32),
    pub run: (f32, f32),
    pub dash: (f32, f32),
    pub crouch: (f32, f32),
    pub slide: (f32, f32),
    pub jump: (f32, f32),
    pub up_to_fall: (f32, f32),
    pub fall: (f32, f32),
    pub wall_slide: (f32, f32),
    pub ladder: (f32, f32),
    pub hurt: (f32, f32),
    pub death: (f32, f32),
}

impl Default for HitboxTuning {
    fn default() -> Self {
        Self {
            idle: (20.0, 33.0),
            run: (20.0, 31.0),
            dash: (20.0, 31.0),
            crouch: (20.0, 24.0),
            slide: (20.0, 24.0),
            jump: (20.0, 33.0),
            up_to_fall: (20.0, 32.0),
            fall: (20.0, 34.0),
            wall_slide: (20.0, 36.0),
            ladder: (20.0, 40.0),
            hurt: (20.0, 32.0),
            death: (20.0, 43.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Seconds between spawns per spawner. Zero disables spawning.
    pub spawn_interval: f32,
    pub speed: f32,
    pub max_fall: f32,
    pub size: (f32, f32),
    pub stomp_bounce_speed: f32,
    pub stomp_grace: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub invincibility_time: f32,
    pub max_enemies: usize,
    pub max_spawners: usize,
}

impl EnemyTuning {
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.size.0, self.size.1)
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 1.5,
            speed: 220.0,
            max_fall: 900.0,
            size: (24.0, 24.0),
            stomp_bounce_speed: 520.0,
            stomp_grace: 10.0,
            knockback_x: 260.0,
            knockback_y: 380.0,
            invincibility_time: 1.0,
            max_enemies: 128,
            max_spawners: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub max_health: i32,
    pub death_anim_time: f32,
    /// Upward speed given to the body when the death animation starts.
    pub death_pop_speed: f32,
    /// Full turns the body spins over the death animation.
    pub death_spin_turns: f32,
    /// Progress after which the dying sprite is hidden.
    pub death_hide_at: f32,
    pub hazard_stripe_offset: f32,
    pub hazard_stripe_thickness: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            death_anim_time: 1.2,
            death_pop_speed: 360.0,
            death_spin_turns: 2.0,
            death_hide_at: 0.85,
            hazard_stripe_offset: 1.0,
            hazard_stripe_thickness: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_the_other_defaults() {
        let t = Tunables::from_ron("(fixed_hz: 60.0, movement: (jump_speed: 500.0))").unwrap();
        assert_eq!(t.fixed_hz, 60.0);
        assert_eq!(t.movement.jump_speed, 500.0);
        assert_eq!(t.movement.gravity, MovementTuning::default().gravity);
        assert_eq!(t.enemy, EnemyTuning::default());
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(Tunables::from_ron("(fixed_hz: \"fast\")").is_err());
    }

    #[test]
    fn shipped_config_matches_the_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/tunables.ron");
        assert_eq!(Tunables::load(&path).unwrap(), Tunables::default());
    }

    #[test]
    fn missing_file_reports_io() {
        let err = Tunables::load(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(matches!(err, TunablesError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.ron"));
    }

    #[test]
    fn base_dt_is_the_fixed_step() {
        let t = Tunables::default();
        assert!((t.base_dt() - 1.0 / 120.0).abs() < 1e-9);
    }
}
