//! Enemy pool, spawners, crowding and player contact.
//!
//! Storage is fixed at construction: `max_enemies` slots and at most `max_spawners`
//! spawners. A spawn with no free slot, or whose footprint is inside a solid, is dropped.
//! Enemy positions are top-left corners.

use bevy::math::Vec2;

use crate::common::tunables::{EnemyTuning, Tunables};
use crate::sim::events::FrameEvents;
use crate::sim::geom::Aabb;
use crate::sim::level::TileGrid;
use crate::sim::physics::{move_entity, overlaps_solid};
use crate::sim::player::PlayerState;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Enemy {
    pub active: bool,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Enemy {
    #[inline]
    pub fn rect(&self, size: Vec2) -> Aabb {
        Aabb::from_top_left(self.pos, size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawner {
    /// Top-left of the spawner cell.
    pub pos: Vec2,
    /// Seconds until the next spawn. Starts at zero so the first spawn is immediate.
    pub timer: f32,
}

#[derive(Clone, Debug)]
pub struct EnemyField {
    enemies: Vec<Enemy>,
    spawners: Vec<Spawner>,
    max_spawners: usize,
    size: Vec2,
}

impl EnemyField {
    pub fn new(tun: &EnemyTuning) -> Self {
        Self {
            enemies: vec![Enemy::default(); tun.max_enemies],
            spawners: Vec::with_capacity(tun.max_spawners),
            max_spawners: tun.max_spawners,
            size: tun.size(),
        }
    }

    /// Drop every enemy and spawner.
    pub fn clear(&mut self) {
        self.enemies.fill(Enemy::default());
        self.spawners.clear();
    }

    /// Reset, then register one spawner per spawner tile in row order, up to the cap.
    pub fn build_from_level(&mut self, grid: &TileGrid) {
        self.clear();
        for cell in grid.spawner_cells().take(self.max_spawners) {
            self.spawners.push(Spawner {
                pos: Vec2::new(grid.cell_to_world(cell.x), grid.cell_to_world(cell.y)),
                timer: 0.0,
            });
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.enemies.len()
    }

    #[inline]
    pub fn slots(&self) -> &[Enemy] {
        &self.enemies
    }

    #[inline]
    pub fn slots_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    #[inline]
    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    pub fn active(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.iter().filter(|e| e.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Activate the first free slot at `top_left`. Refused if the footprint overlaps a
    /// solid or the pool is full.
    pub fn spawn_at(&mut self, grid: &TileGrid, top_left: Vec2) -> Option<usize> {
        if overlaps_solid(grid, Aabb::from_top_left(top_left, self.size)) {
            return None;
        }
        let (slot, enemy) = self.enemies.iter_mut().enumerate().find(|(_, e)| !e.active)?;
        *enemy = Enemy {
            active: true,
            pos: top_left,
            vel: Vec2::ZERO,
        };
        Some(slot)
    }

    /// Spawners, then chase and gravity, then crowding.
    pub fn update(&mut self, grid: &TileGrid, player_x: f32, tun: &Tunables, dt: f32) -> FrameEvents {
        let e = &tun.enemy;
        let mut events = FrameEvents::empty();

        if e.spawn_interval > 0.0 {
            let ts = grid.tile_size();
            let offset = Vec2::new((ts - self.size.x) * 0.5, ts - self.size.y);
            for i in 0..self.spawners.len() {
                self.spawners[i].timer -= dt;
                while self.spawners[i].timer <= 0.0 {
                    let at = self.spawners[i].pos + offset;
                    events |= match self.spawn_at(grid, at) {
                        Some(_) => FrameEvents::SPAWNED,
                        None => FrameEvents::SPAWN_BLOCKED,
                    };
                    self.spawners[i].timer += e.spawn_interval;
                }
            }
        }

        let size = self.size;
        let half = size * 0.5;
        let bounds = grid.pixel_size();
        for enemy in self.enemies.iter_mut().filter(|en| en.active) {
            let mid_x = enemy.pos.x + half.x;
            let dir = if player_x >= mid_x { 1.0 } else { -1.0 };
            enemy.vel.x = dir * e.speed;
            enemy.vel.y = (enemy.vel.y + tun.movement.gravity * dt).min(e.max_fall);

            let mut center = enemy.pos + half;
            move_entity(grid, &mut center, &mut enemy.vel, size, dt);
            enemy.pos = center - half;

            if enemy.pos.x < 0.0 {
                enemy.pos.x = 0.0;
                enemy.vel.x = 0.0;
            }
            if enemy.pos.x > bounds.x - size.x {
                enemy.pos.x = bounds.x - size.x;
                enemy.vel.x = 0.0;
            }
            if enemy.pos.y > bounds.y + size.y * 2.0 {
                enemy.active = false;
            }
        }

        self.resolve_crowding(grid);
        events
    }

    /// Separate overlapping pairs along the shallower axis, half each. A share that would
    /// land in a solid is skipped.
    fn resolve_crowding(&mut self, grid: &TileGrid) {
        let size = self.size;
        let n = self.enemies.len();
        for i in 0..n {
            if !self.enemies[i].active {
                continue;
            }
            for j in (i + 1)..n {
                if !self.enemies[j].active {
                    continue;
                }
                let (ra, rb) = (self.enemies[i].rect(size), self.enemies[j].rect(size));
                let Some(pen) = ra.penetration(&rb) else {
                    continue;
                };

                let push = if pen.x < pen.y {
                    let dir = if ra.x < rb.x { -1.0 } else { 1.0 };
                    self.enemies[i].vel.x = 0.0;
                    self.enemies[j].vel.x = 0.0;
                    Vec2::new(dir * pen.x * 0.5, 0.0)
                } else {
                    let dir = if ra.y < rb.y { -1.0 } else { 1.0 };
                    self.enemies[i].vel.y = 0.0;
                    self.enemies[j].vel.y = 0.0;
                    Vec2::new(0.0, dir * pen.y * 0.5)
                };

                if !overlaps_solid(grid, ra.translated(push)) {
                    self.enemies[i].pos += push;
                }
                if !overlaps_solid(grid, rb.translated(-push)) {
                    self.enemies[j].pos -= push;
                }
            }
        }
    }

    /// Stomp or damage for every enemy the player box touches.
    ///
    /// A stomp needs downward motion with the feet no deeper than `stomp_grace` below the
    /// enemy's top. Motion and box are taken at contact time, so one landing can stomp
    /// several enemies. The scan stops once damage lands; contacts absorbed by
    /// invincibility are skipped.
    pub fn resolve_player(&mut self, player: &mut PlayerState, tun: &Tunables) -> FrameEvents {
        let mut events = FrameEvents::empty();
        let player_box = player.hitbox(tun, false);
        let falling = player.vel.y > 0.0;
        let size = self.size;
        for enemy in self.enemies.iter_mut().filter(|en| en.active) {
            let rect = enemy.rect(size);
            if !player_box.overlaps(&rect) {
                continue;
            }
            let stomping = falling && player_box.bottom() <= rect.y + tun.enemy.stomp_grace;
            if stomping {
                enemy.active = false;
                player.stomp_bounce(tun);
                events |= FrameEvents::STOMP;
            } else if player.take_damage(enemy.pos, tun) {
                events |= FrameEvents::HURT;
                break;
            }
        }
        events
    }
}
