//! Player controller.
//!
//! Movement is a set of independent timers and flags evaluated in a fixed order each tick,
//! not a single state enum: coyote, jump buffer, ground stick, wall coyote, wall stick, hurt
//! and invincibility all run side by side.
//!
//! The collision box is never stored. `hitbox_size` derives it from the current flags and
//! velocity through `anim_state`, and whenever the derived height changes the centre is
//! moved so the feet stay put.

use bevy::math::Vec2;

use crate::common::tunables::{HitboxTuning, Tunables};
use crate::sim::events::FrameEvents;
use crate::sim::geom::Aabb;
use crate::sim::level::TileGrid;
use crate::sim::physics::{
    Contacts, WallSide, ground_below, move_entity, overlaps_solid, push_out_of_solids, touching_wall,
};

/// The hand may sit at most this fraction of a tile below the ledge surface.
const LEDGE_HAND_REACH: f32 = 0.7;
const RISING_SPEED: f32 = -60.0;
const FALLING_SPEED: f32 = 80.0;
const RUN_SPEED_FRAC: f32 = 0.4;
const GROUND_SINK_RATE: f32 = 12.0;

/// Abstract per-tick controls. `jump_pressed` is an edge, the rest are levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub jump_pressed: bool,
    pub jump_held: bool,
}

/// Visual state. Also selects the collision box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimState {
    Idle,
    Run,
    Dash,
    Crouch,
    Slide,
    Jump,
    UpToFall,
    Fall,
    WallSlide,
    LedgeHang,
    Ladder,
    Hurt,
    Death,
}

impl AnimState {
    pub fn hitbox(self, dims: &HitboxTuning) -> Vec2 {
        let (w, h) = match self {
            Self::Idle => dims.idle,
            Self::Run => dims.run,
            Self::Dash => dims.dash,
            Self::Crouch => dims.crouch,
            Self::Slide => dims.slide,
            Self::Jump => dims.jump,
            // Hanging uses the apex box.
            Self::UpToFall | Self::LedgeHang => dims.up_to_fall,
            Self::Fall => dims.fall,
            Self::WallSlide => dims.wall_slide,
            Self::Ladder => dims.ladder,
            Self::Hurt => dims.hurt,
            Self::Death => dims.death,
        };
        Vec2::new(w, h)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Centre of the collision box.
    pub pos: Vec2,
    pub vel: Vec2,
    /// `1.0` facing right, `-1.0` facing left.
    pub facing: f32,
    pub health: i32,
    pub grounded: bool,
    pub crouching: bool,
    /// `1` while the crouch-down animation plays, `-1` while standing back up.
    pub crouch_anim_dir: i8,
    pub crouch_anim_time: f32,
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub ground_stick_timer: f32,
    pub wall_coyote_timer: f32,
    pub wall_coyote_dir: f32,
    pub wall_stick_timer: f32,
    pub hurt_timer: f32,
    pub invincibility_timer: f32,
    pub edge_hang: Option<WallSide>,
    pub wall_sliding: bool,
    pub wall_contact_left: bool,
    pub wall_contact_right: bool,
    pub jump_prev_down: bool,
    pub anim_dash: bool,
    pub anim_slide: bool,
    pub anim_ladder: bool,
    pub run_time: f32,
    /// Eased 0..1 landing squash, purely visual.
    pub ground_sink: f32,
}

impl PlayerState {
    /// Standing at rest with the feet at `feet` (bottom-centre).
    pub fn spawn(feet: Vec2, tun: &Tunables) -> Self {
        let mut p = Self {
            pos: feet,
            vel: Vec2::ZERO,
            facing: 1.0,
            health: tun.session.max_health,
            grounded: true,
            crouching: false,
            crouch_anim_dir: 0,
            crouch_anim_time: 0.0,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            ground_stick_timer: 0.0,
            wall_coyote_timer: 0.0,
            wall_coyote_dir: 0.0,
            wall_stick_timer: 0.0,
            hurt_timer: 0.0,
            invincibility_timer: 0.0,
            edge_hang: None,
            wall_sliding: false,
            wall_contact_left: false,
            wall_contact_right: false,
            jump_prev_down: false,
            anim_dash: false,
            anim_slide: false,
            anim_ladder: false,
            run_time: 0.0,
            ground_sink: 1.0,
        };
        p.pos.y = feet.y - p.hitbox_size(tun, false).y * 0.5;
        p
    }

    /// Priority-ordered classification of the current flags and velocity.
    pub fn anim_state(&self, tun: &Tunables, dying: bool) -> AnimState {
        let m = &tun.movement;
        let speed = self.vel.x.abs();
        let max_x = if self.crouching { m.max_speed_x_crouch } else { m.max_speed_x };

        if dying {
            return AnimState::Death;
        }
        if self.hurt_timer > 0.0 {
            return AnimState::Hurt;
        }
        if self.anim_ladder {
            return AnimState::Ladder;
        }
        if self.wall_sliding {
            return AnimState::WallSlide;
        }
        if self.anim_slide {
            return AnimState::Slide;
        }
        if self.anim_dash {
            return AnimState::Dash;
        }
        if self.crouch_anim_dir != 0 {
            return AnimState::Crouch;
        }
        if !self.grounded {
            return if self.edge_hang.is_some() {
                AnimState::LedgeHang
            } else if self.vel.y < RISING_SPEED {
                AnimState::Jump
            } else if self.vel.y > FALLING_SPEED {
                AnimState::Fall
            } else {
                AnimState::UpToFall
            };
        }
        if self.crouching {
            return AnimState::Crouch;
        }
        if speed > RUN_SPEED_FRAC * max_x {
            return AnimState::Run;
        }
        AnimState::Idle
    }

    #[inline]
    pub fn hitbox_size(&self, tun: &Tunables, dying: bool) -> Vec2 {
        self.anim_state(tun, dying).hitbox(&tun.hitbox)
    }

    #[inline]
    pub fn hitbox(&self, tun: &Tunables, dying: bool) -> Aabb {
        Aabb::from_center(self.pos, self.hitbox_size(tun, dying))
    }

    /// Box the player would have with the given crouch flag and no crouch animation.
    fn settled_size(&self, tun: &Tunables, crouching: bool) -> Vec2 {
        let mut probe = self.clone();
        probe.crouching = crouching;
        probe.crouch_anim_dir = 0;
        probe.hitbox_size(tun, false)
    }

    /// Move the centre so the bottom edge stays where it was under `from`.
    fn anchor_feet(&mut self, from: Vec2, to: Vec2) {
        if (to.y - from.y).abs() > 0.001 {
            self.pos.y += (from.y - to.y) * 0.5;
        }
    }

    /// Advance one tick. Not called while the death animation plays.
    pub fn update(&mut self, grid: &TileGrid, input: &PlayerInput, tun: &Tunables, dt: f32) -> FrameEvents {
        let m = &tun.movement;
        let mut events = FrameEvents::empty();
        let start_size = self.hitbox_size(tun, false);

        tick_down(&mut self.hurt_timer, dt);
        tick_down(&mut self.invincibility_timer, dt);
        self.anim_dash = false;
        self.anim_slide = false;
        self.anim_ladder = false;
        if self.crouch_anim_dir != 0 {
            self.crouch_anim_time += dt;
            if self.crouch_anim_time >= m.crouch_anim_time {
                self.crouch_anim_time = m.crouch_anim_time;
                self.crouch_anim_dir = 0;
            }
        }

        self.run_time += dt;
        tick_down(&mut self.coyote_timer, dt);
        tick_down(&mut self.jump_buffer_timer, dt);
        tick_down(&mut self.ground_stick_timer, dt);
        tick_down(&mut self.wall_coyote_timer, dt);

        if input.jump_pressed {
            self.jump_buffer_timer = m.jump_buffer_time;
        }

        // Crouch. Standing up needs headroom for the standing box at the current feet.
        let feet = self.pos.y + start_size.y * 0.5;
        let was_crouching = self.crouching;
        let mut want_crouch = input.down;
        if was_crouching && !want_crouch {
            let stand = self.settled_size(tun, false);
            let stand_rect = Aabb::new(self.pos.x - stand.x * 0.5, feet - stand.y, stand.x, stand.y);
            if overlaps_solid(grid, stand_rect) {
                want_crouch = true;
            }
        }
        self.crouching = want_crouch;
        if was_crouching != self.crouching {
            self.crouch_anim_time = 0.0;
            self.crouch_anim_dir = if self.crouching { 1 } else { -1 };
        }
        let mut body = self.hitbox_size(tun, false);
        self.anchor_feet(start_size, body);

        let max_x = if self.crouching { m.max_speed_x_crouch } else { m.max_speed_x };
        let mut touch_left = touching_wall(grid, self.pos, body, WallSide::Left);
        let mut touch_right = touching_wall(grid, self.pos, body, WallSide::Right);

        let accel = if self.grounded { m.move_accel } else { m.air_accel };
        let mut accel_applied = false;
        if !self.crouching && self.edge_hang.is_none() {
            if input.left && !input.right {
                self.vel.x -= accel * dt;
                accel_applied = true;
            } else if input.right && !input.left {
                self.vel.x += accel * dt;
                accel_applied = true;
            }
        }
        let frames = dt / tun.base_dt();
        if !accel_applied && self.grounded {
            let friction = if self.crouching { m.crouch_friction } else { m.ground_friction };
            if frames > 0.0 {
                self.vel.x *= friction.powf(frames);
            }
        } else if !accel_applied && self.edge_hang.is_none() {
            if frames > 0.0 {
                self.vel.x *= m.air_friction.powf(frames);
            }
        } else if self.edge_hang.is_some() {
            self.vel.x = 0.0;
        }
        self.vel.x = self.vel.x.clamp(-max_x, max_x);

        if self.edge_hang.is_none() {
            let mult = if self.vel.y > 0.0 { m.gravity_fall_mult } else { 1.0 };
            self.vel.y = (self.vel.y + m.gravity * mult * dt).min(m.max_speed_y);
        } else {
            self.vel.y = 0.0;
        }

        if self.grounded {
            touch_left = false;
            touch_right = false;
            self.wall_coyote_timer = 0.0;
        }
        if !self.grounded && (touch_left || touch_right) {
            self.wall_coyote_timer = m.wall_coyote_time;
            self.wall_coyote_dir = if touch_left { -1.0 } else { 1.0 };
        }

        let can_ground_jump = self.grounded || self.coyote_timer > 0.0 || self.edge_hang.is_some();
        if self.jump_buffer_timer > 0.0 && can_ground_jump {
            self.vel.y = -m.jump_speed;
            if self.edge_hang.take().is_some() {
                self.vel.x = 0.0;
                self.wall_coyote_timer = 0.0;
            }
            self.grounded = false;
            self.coyote_timer = 0.0;
            self.jump_buffer_timer = 0.0;
            events |= FrameEvents::JUMP;
        }

        let can_wall_jump = !self.grounded
            && self.edge_hang.is_none()
            && (touch_left || touch_right || self.wall_coyote_timer > 0.0);
        if self.jump_buffer_timer > 0.0 && can_wall_jump {
            let wall_dir = if touch_left {
                -1.0
            } else if touch_right {
                1.0
            } else {
                self.wall_coyote_dir
            };
            self.vel.y = -m.jump_speed;
            self.vel.x = -wall_dir * m.wall_jump_push_x;
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
            self.wall_coyote_timer = 0.0;
            events |= FrameEvents::WALL_JUMP;
        }

        if self.jump_prev_down && !input.jump_held && self.vel.y < 0.0 {
            self.vel.y *= m.jump_cut_mult;
        }

        let pre_move_vy = self.vel.y;
        let was_grounded = self.grounded;
        let hits = move_entity(grid, &mut self.pos, &mut self.vel, body, dt);

        self.grounded = hits.contains(Contacts::BOTTOM) || ground_below(grid, self.pos, body);
        let landed = !was_grounded && self.grounded;
        self.wall_contact_left =
            hits.contains(Contacts::LEFT) || touching_wall(grid, self.pos, body, WallSide::Left);
        self.wall_contact_right =
            hits.contains(Contacts::RIGHT) || touching_wall(grid, self.pos, body, WallSide::Right);
        if self.ground_stick_timer > 0.0 {
            self.grounded = true;
        }
        if landed {
            self.ground_stick_timer = m.ground_stick_time;
            events |= FrameEvents::LANDED;
            if pre_move_vy > m.hurt_land_speed {
                self.hurt_timer = m.hurt_time;
                events |= FrameEvents::HARD_LANDING;
            }
        }

        if self.grounded {
            self.edge_hang = None;
        } else {
            let mut released = false;
            if let Some(side) = self.edge_hang {
                let still_touching = match side {
                    WallSide::Left => self.wall_contact_left,
                    WallSide::Right => self.wall_contact_right,
                };
                let pressing_away = match side {
                    WallSide::Left => input.right,
                    WallSide::Right => input.left,
                };
                if !still_touching || input.down || pressing_away {
                    self.edge_hang = None;
                    released = true;
                } else {
                    self.vel = Vec2::ZERO;
                }
            }
            // Holding down drops past ledges instead of grabbing them.
            if self.edge_hang.is_none() && !released && !input.down {
                let side = if self.wall_contact_left {
                    Some(WallSide::Left)
                } else if self.wall_contact_right {
                    Some(WallSide::Right)
                } else {
                    None
                };
                if let Some(side) = side {
                    if let Some(ledge_y) = self.ledge_top(grid, side, body, tun) {
                        self.edge_hang = Some(side);
                        self.vel = Vec2::ZERO;
                        self.wall_sliding = false;
                        body = self.hitbox_size(tun, false);
                        self.pos.y = ledge_y + m.ledge_snap_padding + body.y * 0.5;
                        events |= FrameEvents::LEDGE_GRAB;
                    }
                }
            }
        }

        let wall_contact = self.wall_contact_left || self.wall_contact_right;
        if !self.grounded && self.edge_hang.is_none() && wall_contact {
            self.wall_stick_timer = m.wall_stick_time;
            self.wall_coyote_timer = m.wall_coyote_time;
            self.wall_coyote_dir = if self.wall_contact_left { -1.0 } else { 1.0 };
        } else {
            tick_down(&mut self.wall_stick_timer, dt);
        }

        let slide_active =
            !self.grounded && self.edge_hang.is_none() && (wall_contact || self.wall_stick_timer > 0.0);
        if slide_active {
            if self.vel.y > m.wall_slide_max_fall {
                self.vel.y = (self.vel.y - m.wall_slide_accel * dt).max(m.wall_slide_max_fall);
            }
            if self.wall_contact_left && self.vel.x < 0.0 {
                self.vel.x = 0.0;
            }
            if self.wall_contact_right && self.vel.x > 0.0 {
                self.vel.x = 0.0;
            }
        }
        self.wall_sliding = slide_active;
        self.jump_prev_down = input.jump_held;

        if self.vel.x > 1.0 {
            self.facing = 1.0;
        } else if self.vel.x < -1.0 {
            self.facing = -1.0;
        }
        let speed = self.vel.x.abs();
        self.anim_slide = self.crouching && self.grounded && speed > m.slide_speed;
        self.anim_dash = !self.crouching && self.grounded && speed > m.max_speed_x * m.dash_speed_frac;
        self.anim_ladder = self.wall_sliding && self.vel.y.abs() < m.ladder_slide_speed;
        if self.grounded {
            self.coyote_timer = m.coyote_time;
        }
        let target_sink = if self.grounded { 1.0 } else { 0.0 };
        self.ground_sink += (target_sink - self.ground_sink) * (GROUND_SINK_RATE * dt);

        let end_size = self.hitbox_size(tun, false);
        self.anchor_feet(body, end_size);
        push_out_of_solids(grid, &mut self.pos, &mut self.vel, end_size, self.facing);

        events
    }

    /// Top of a graspable ledge on `side`, if the hand is level with one.
    fn ledge_top(&self, grid: &TileGrid, side: WallSide, size: Vec2, tun: &Tunables) -> Option<f32> {
        let m = &tun.movement;
        if self.vel.y < -m.ledge_max_rise_speed {
            return None;
        }
        let top = self.pos.y - size.y * 0.5;
        let hand_y = top + size.y * m.ledge_hand_frac;
        let probe_x = self.pos.x + side.sign() * (size.x * 0.5 + 1.0);
        let wall_cx = grid.world_to_cell(probe_x);
        let hand_cy = grid.world_to_cell(hand_y);
        let ledge_y = grid.cell_to_world(hand_cy);

        if !grid.is_solid_cell(wall_cx, hand_cy) || grid.is_solid_cell(wall_cx, hand_cy - 1) {
            return None;
        }
        if top > ledge_y + m.ledge_top_tolerance {
            return None;
        }
        if hand_y > ledge_y + grid.tile_size() * LEDGE_HAND_REACH {
            return None;
        }
        Some(ledge_y)
    }

    /// Knock the player away from `source` and start invincibility.
    ///
    /// Ignored while invincible or already out of health. Returns whether damage landed;
    /// the caller decides what zero health means.
    pub fn take_damage(&mut self, source: Vec2, tun: &Tunables) -> bool {
        if self.invincibility_timer > 0.0 || self.health <= 0 {
            return false;
        }
        let before = self.hitbox_size(tun, false);
        self.health -= 1;
        self.invincibility_timer = tun.enemy.invincibility_time;
        self.hurt_timer = tun.movement.hurt_time;

        let dir = if self.pos.x < source.x { -1.0 } else { 1.0 };
        self.vel = Vec2::new(dir * tun.enemy.knockback_x, -tun.enemy.knockback_y);
        self.grounded = false;
        self.edge_hang = None;
        let after = self.hitbox_size(tun, false);
        self.anchor_feet(before, after);
        true
    }

    /// Bounce off a stomped enemy as if freshly airborne.
    pub fn stomp_bounce(&mut self, tun: &Tunables) {
        let before = self.hitbox_size(tun, false);
        self.vel.y = -tun.enemy.stomp_bounce_speed;
        self.grounded = false;
        self.coyote_timer = 0.0;
        self.jump_buffer_timer = 0.0;
        let after = self.hitbox_size(tun, false);
        self.anchor_feet(before, after);
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }
}

#[inline]
fn tick_down(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}
