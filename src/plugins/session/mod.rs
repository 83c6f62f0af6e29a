//! Session plugin: owns the `Session` resource and advances it once per fixed step.
//!
//! Pipeline:
//! - FixedUpdate / `SessionSystems::Tick`: take input, `Session::tick`, publish feedback,
//!   then resolve outcomes (death restarts, victory opens the editor)
//! - FixedUpdate / `SessionSystems::Present`: presentation plugins copy sim state to sprites
//! - Update: Escape leaves play for the editor
//!
//! The session keeps no ECS state of its own; sprites and effects are derived from it.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::input::PendingInput;
use crate::sim::{FrameEvents, Session, TileGrid};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSystems {
    Tick,
    Present,
}

/// Something worth a sound, an effect or a log line happened this tick.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameFeedback {
    Jump,
    WallJump,
    Landed,
    HardLanding,
    LedgeGrab,
    Stomp,
    Hurt,
    Died,
    DeathDone,
    Victory { score_ms: u32 },
    Spawned,
    SpawnBlocked,
}

impl GameFeedback {
    /// One message per raised flag, in flag bit order.
    pub fn from_events(events: FrameEvents, score_ms: u32) -> impl Iterator<Item = Self> {
        events.iter().filter_map(move |flag| Self::from_flag(flag, score_ms))
    }

    fn from_flag(flag: FrameEvents, score_ms: u32) -> Option<Self> {
        Some(match flag {
            FrameEvents::JUMP => Self::Jump,
            FrameEvents::WALL_JUMP => Self::WallJump,
            FrameEvents::LANDED => Self::Landed,
            FrameEvents::HARD_LANDING => Self::HardLanding,
            FrameEvents::LEDGE_GRAB => Self::LedgeGrab,
            FrameEvents::STOMP => Self::Stomp,
            FrameEvents::HURT => Self::Hurt,
            FrameEvents::DIED => Self::Died,
            FrameEvents::DEATH_DONE => Self::DeathDone,
            FrameEvents::VICTORY => Self::Victory { score_ms },
            FrameEvents::SPAWNED => Self::Spawned,
            FrameEvents::SPAWN_BLOCKED => Self::SpawnBlocked,
            _ => return None,
        })
    }
}

/// The level layout was replaced or edited; tile sprites must be rebuilt.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct LevelChanged;

pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>();
    let level = TileGrid::default_level(tunables.grid_cols, tunables.grid_rows, tunables.tile_size);
    let session = Session::new(level, tunables);
    app.insert_resource(session);

    app.init_resource::<Messages<GameFeedback>>();
    app.init_resource::<Messages<LevelChanged>>();
    app.add_systems(PostUpdate, (update_feedback_messages, update_level_messages));

    app.configure_sets(
        FixedUpdate,
        (
            SessionSystems::Tick.run_if(in_state(GameState::InGame)),
            SessionSystems::Present
                .after(SessionSystems::Tick)
                .run_if(in_state(GameState::InGame)),
        ),
    );
    app.add_systems(
        FixedUpdate,
        (tick_session, resolve_outcome)
            .chain()
            .in_set(SessionSystems::Tick),
    );

    app.add_systems(OnEnter(GameState::InGame), start_run)
        .add_systems(OnEnter(GameState::Editor), pause_run)
        .add_systems(
            Update,
            open_editor.run_if(in_state(GameState::InGame)),
        );
}

fn update_feedback_messages(mut msgs: ResMut<Messages<GameFeedback>>) {
    msgs.update();
}

fn update_level_messages(mut msgs: ResMut<Messages<LevelChanged>>) {
    msgs.update();
}

fn start_run(tunables: Res<Tunables>, mut session: ResMut<Session>) {
    session.restart(&tunables);
    info!(
        "Level started: {}x{} tiles, {} spawners",
        session.level.cols(),
        session.level.rows(),
        session.enemies.spawners().len()
    );
}

fn pause_run(mut session: ResMut<Session>) {
    session.clear_outcome();
}

fn tick_session(
    tunables: Res<Tunables>,
    mut pending: ResMut<PendingInput>,
    mut session: ResMut<Session>,
    mut feedback: MessageWriter<GameFeedback>,
) {
    let input = pending.take();
    let events = session.tick(&input, &tunables);
    if events.is_empty() {
        return;
    }

    let score_ms = session.score_ms();
    for msg in GameFeedback::from_events(events, score_ms) {
        match msg {
            GameFeedback::Died => info!("Player died at tick {}", session.ticks()),
            GameFeedback::Victory { score_ms } => info!("Exit reached in {score_ms} ms"),
            GameFeedback::SpawnBlocked => debug!("Spawner blocked by solid tiles"),
            other => debug!("{other:?}"),
        }
        feedback.write(msg);
    }
}

/// Restart once the death animation is over; hand a finished run to the editor.
fn resolve_outcome(
    tunables: Res<Tunables>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if session.death() {
        info!("Restarting level");
        session.restart(&tunables);
    } else if session.victory() {
        next_state.set(GameState::Editor);
    }
}

fn open_editor(keys: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Escape) {
        info!("Entering editor");
        next_state.set(GameState::Editor);
    }
}
