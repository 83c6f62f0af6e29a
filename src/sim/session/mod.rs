//! Game session: one level, one player, one enemy field, and the run outcome.
//!
//! `tick` advances everything by one fixed step. Outcomes are one-way: once `victory` or
//! `death` is set every further tick is a no-op until `clear_outcome`.
//!
//! Death has two phases. `is_dying` turns on the moment death triggers and stays on
//! through the death animation; `death` only turns on once the animation has run its
//! full length.

use std::f32::consts::TAU;

use bevy::math::{IVec2, Vec2};
use bevy::prelude::Resource;

use crate::common::tunables::Tunables;
use crate::sim::enemy::EnemyField;
use crate::sim::events::FrameEvents;
use crate::sim::geom::Aabb;
use crate::sim::level::TileGrid;
use crate::sim::player::{PlayerInput, PlayerState};

/// Smallest sprite scale reached at the end of the death animation.
const DEATH_END_SCALE: f32 = 0.4;

#[derive(Resource, Clone, Debug)]
pub struct Session {
    pub level: TileGrid,
    pub player: PlayerState,
    pub enemies: EnemyField,
    victory: bool,
    death: bool,
    dying: bool,
    death_timer: f32,
    score_ms: u32,
    ticks: u64,
}

impl Session {
    pub fn new(level: TileGrid, tun: &Tunables) -> Self {
        let player = PlayerState::spawn(spawn_point(&level), tun);
        let mut enemies = EnemyField::new(&tun.enemy);
        enemies.build_from_level(&level);
        Self {
            level,
            player,
            enemies,
            victory: false,
            death: false,
            dying: false,
            death_timer: 0.0,
            score_ms: 0,
            ticks: 0,
        }
    }

    /// Fresh run on the current level.
    pub fn restart(&mut self, tun: &Tunables) {
        self.clear_outcome();
        self.player = PlayerState::spawn(spawn_point(&self.level), tun);
        self.enemies.build_from_level(&self.level);
        self.score_ms = 0;
    }

    pub fn load_level(&mut self, level: TileGrid, tun: &Tunables) {
        self.level = level;
        self.restart(tun);
    }

    pub fn tick(&mut self, input: &PlayerInput, tun: &Tunables) -> FrameEvents {
        if self.victory || self.death {
            return FrameEvents::empty();
        }
        let dt = tun.base_dt();
        self.ticks += 1;

        if self.dying {
            return self.tick_death(tun, dt);
        }

        let mut events = self.player.update(&self.level, input, tun, dt);
        events |= self.enemies.update(&self.level, self.player.pos.x, tun, dt);
        events |= self.enemies.resolve_player(&mut self.player, tun);
        if self.player.health <= 0 && self.trigger_death(tun) {
            events |= FrameEvents::DIED;
        }
        if self.dying {
            return events;
        }

        if self.touches_exit(tun) {
            self.victory = true;
            self.score_ms = (self.player.run_time * 1000.0) as u32;
            events |= FrameEvents::VICTORY;
        } else if self.check_hazards(tun) {
            events |= FrameEvents::DIED;
        }
        events
    }

    fn tick_death(&mut self, tun: &Tunables, dt: f32) -> FrameEvents {
        self.death_timer += dt;
        let p = &mut self.player;
        p.vel.y += tun.movement.gravity * dt;
        p.pos += p.vel * dt;
        if self.death_timer >= tun.session.death_anim_time {
            self.death = true;
            return FrameEvents::DEATH_DONE;
        }
        FrameEvents::empty()
    }

    /// Start the death animation. Returns `false` if death was already under way.
    pub fn trigger_death(&mut self, tun: &Tunables) -> bool {
        if self.dying || self.death {
            return false;
        }
        self.dying = true;
        self.death_timer = 0.0;
        self.player.vel = Vec2::new(0.0, -tun.session.death_pop_speed);
        self.player.edge_hang = None;
        true
    }

    /// Kill the player if any hazard stripe overlaps the hitbox. Returns whether this
    /// call started the death; repeated calls after that change nothing.
    pub fn check_hazards(&mut self, tun: &Tunables) -> bool {
        if self.dying || self.death {
            return false;
        }
        let hitbox = self.player_hitbox(tun);
        if !self.overlaps_hazard(hitbox, tun) {
            return false;
        }
        self.player.health = 0;
        self.trigger_death(tun)
    }

    fn overlaps_hazard(&self, rect: Aabb, tun: &Tunables) -> bool {
        let grid = &self.level;
        let (x0, x1) = (grid.world_to_cell(rect.x), grid.world_to_cell(rect.right()));
        let (y0, y1) = (grid.world_to_cell(rect.y), grid.world_to_cell(rect.bottom()));
        (y0..=y1)
            .flat_map(|cy| (x0..=x1).map(move |cx| IVec2::new(cx, cy)))
            .filter(|c| grid.in_bounds(c.x, c.y) && grid.get(c.x, c.y).is_hazard())
            .any(|c| {
                let stripe = grid.hazard_rect(
                    c.x,
                    c.y,
                    tun.session.hazard_stripe_offset,
                    tun.session.hazard_stripe_thickness,
                );
                rect.overlaps(&stripe)
            })
    }

    fn touches_exit(&self, tun: &Tunables) -> bool {
        self.level
            .exit_rect()
            .is_some_and(|exit| self.player_hitbox(tun).overlaps(&exit))
    }

    /// Reset both outcome flags and empty the enemy field.
    pub fn clear_outcome(&mut self) {
        self.victory = false;
        self.death = false;
        self.dying = false;
        self.death_timer = 0.0;
        self.enemies.clear();
    }

    #[inline]
    pub fn player_hitbox(&self, tun: &Tunables) -> Aabb {
        self.player.hitbox(tun, self.dying)
    }

    #[inline]
    pub fn victory(&self) -> bool {
        self.victory
    }

    /// True only once the death animation has finished.
    #[inline]
    pub fn death(&self) -> bool {
        self.death
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.dying
    }

    #[inline]
    pub fn score_ms(&self) -> u32 {
        self.score_ms
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Death animation progress in `0..=1`.
    pub fn death_progress(&self, tun: &Tunables) -> f32 {
        if !self.dying {
            return 0.0;
        }
        if tun.session.death_anim_time <= 0.0 {
            return 1.0;
        }
        (self.death_timer / tun.session.death_anim_time).clamp(0.0, 1.0)
    }

    /// Sprite rotation in radians for the death spin.
    pub fn death_rotation(&self, tun: &Tunables) -> f32 {
        self.death_progress(tun) * tun.session.death_spin_turns * TAU
    }

    pub fn death_scale(&self, tun: &Tunables) -> f32 {
        1.0 - (1.0 - DEATH_END_SCALE) * self.death_progress(tun)
    }

    pub fn player_hidden(&self, tun: &Tunables) -> bool {
        self.dying && self.death_progress(tun) >= tun.session.death_hide_at
    }
}

/// Feet position for a new player: the marker, or the bottom-left interior cell.
fn spawn_point(level: &TileGrid) -> Vec2 {
    level.player_spawn().unwrap_or_else(|| {
        let ts = level.tile_size();
        Vec2::new(ts * 1.5, level.cell_to_world(level.rows() as i32 - 1))
    })
}

#[cfg(test)]
mod tests;
