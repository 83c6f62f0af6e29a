//! Editor plugin (render-only): paint the session's level with the mouse.
//!
//! Controls while in `GameState::Editor`:
//! - `1`..`6` pick a tool, Tab cycles
//! - left mouse applies the tool under the cursor, right mouse erases
//! - F5 restores the default level
//! - Enter or Escape starts play on the edited level
//!
//! Edits go straight into `Session::level`; every change publishes `LevelChanged` so the
//! world sprites follow. Entering play restarts the session on whatever was drawn.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::window::PrimaryWindow;

use crate::common::{layers, state::GameState, tunables::Tunables};
use crate::plugins::camera::MainCamera;
use crate::plugins::session::LevelChanged;
use crate::plugins::world::{sim_to_world, world_to_sim};
use crate::sim::editor::{EditorTool, apply_tool};
use crate::sim::{Session, TileGrid};

const TOOL_KEYS: [(KeyCode, u8); 6] = [
    (KeyCode::Digit1, 1),
    (KeyCode::Digit2, 2),
    (KeyCode::Digit3, 3),
    (KeyCode::Digit4, 4),
    (KeyCode::Digit5, 5),
    (KeyCode::Digit6, 6),
];

#[derive(Resource, Debug, Default)]
pub struct EditorState {
    pub tool: EditorTool,
    /// Cell under the mouse, if the mouse is over the level.
    pub hover: Option<IVec2>,
}

#[derive(Component)]
struct EditorCursor;

pub fn plugin(app: &mut App) {
    app.init_resource::<EditorState>()
        .add_systems(OnEnter(GameState::Editor), enter_editor)
        .add_systems(
            Update,
            (
                select_tool,
                track_cursor,
                paint.after(track_cursor).after(select_tool),
                draw_cursor.after(track_cursor),
                reset_level,
                start_play,
            )
                .run_if(in_state(GameState::Editor)),
        );
}

/// Cell containing a simulation-space point, or `None` outside the grid.
pub fn cell_under(grid: &TileGrid, sim: Vec2) -> Option<IVec2> {
    let cell = IVec2::new(grid.world_to_cell(sim.x), grid.world_to_cell(sim.y));
    grid.in_bounds(cell.x, cell.y).then_some(cell)
}

fn tool_color(tool: EditorTool) -> Color {
    match tool {
        EditorTool::Player => Color::srgba(0.2, 0.75, 0.9, 0.45),
        EditorTool::AddBlock => Color::srgba(0.6, 0.65, 0.75, 0.45),
        EditorTool::RemoveBlock => Color::srgba(0.1, 0.1, 0.1, 0.55),
        EditorTool::Exit => Color::srgba(0.3, 0.95, 0.45, 0.45),
        EditorTool::Hazard => Color::srgba(0.95, 0.2, 0.25, 0.45),
        EditorTool::Spawner => Color::srgba(0.7, 0.3, 0.9, 0.45),
    }
}

fn enter_editor(mut commands: Commands, session: Res<Session>, editor: Res<EditorState>) {
    info!("Editor open, tool: {}", editor.tool.label());
    let ts = session.level.tile_size();
    commands.spawn((
        Name::new("EditorCursor"),
        EditorCursor,
        Sprite::from_color(tool_color(editor.tool), Vec2::splat(ts)),
        Transform::from_xyz(0.0, 0.0, layers::EDITOR_CURSOR),
        Visibility::Hidden,
        DespawnOnExit(GameState::Editor),
    ));
}

fn select_tool(keys: Res<ButtonInput<KeyCode>>, mut editor: ResMut<EditorState>) {
    let picked = TOOL_KEYS
        .iter()
        .filter(|(key, _)| keys.just_pressed(*key))
        .find_map(|(_, digit)| EditorTool::from_digit(*digit));
    let tool = match picked {
        Some(tool) => tool,
        None if keys.just_pressed(KeyCode::Tab) => editor.tool.next(),
        None => return,
    };
    if tool != editor.tool {
        editor.tool = tool;
        info!("Editor tool: {}", tool.label());
    }
}

fn track_cursor(
    session: Res<Session>,
    mut editor: ResMut<EditorState>,
    window: Option<Single<&Window, With<PrimaryWindow>>>,
    camera: Option<Single<(&Camera, &GlobalTransform), With<MainCamera>>>,
) {
    let (Some(window), Some(camera)) = (window, camera) else {
        editor.hover = None;
        return;
    };
    let (camera, cam_tf) = *camera;
    editor.hover = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world_2d(cam_tf, cursor).ok())
        .map(|world| world_to_sim(session.level.pixel_size(), world))
        .and_then(|sim| cell_under(&session.level, sim));
}

fn paint(
    mouse: Res<ButtonInput<MouseButton>>,
    editor: Res<EditorState>,
    mut session: ResMut<Session>,
    mut changed: MessageWriter<LevelChanged>,
) {
    let Some(cell) = editor.hover else {
        return;
    };
    let tool = if mouse.pressed(MouseButton::Left) {
        editor.tool
    } else if mouse.pressed(MouseButton::Right) {
        EditorTool::RemoveBlock
    } else {
        return;
    };
    if apply_tool(&mut session.level, tool, cell.x, cell.y) {
        changed.write(LevelChanged);
    }
}

fn draw_cursor(
    session: Res<Session>,
    editor: Res<EditorState>,
    cursor: Option<Single<(&mut Transform, &mut Sprite, &mut Visibility), With<EditorCursor>>>,
) {
    let Some(cursor) = cursor else {
        return;
    };
    let (mut tf, mut sprite, mut vis) = cursor.into_inner();
    let Some(cell) = editor.hover else {
        *vis = Visibility::Hidden;
        return;
    };
    let level = &session.level;
    let center = level.tile_rect(cell.x, cell.y).center();
    tf.translation = sim_to_world(level.pixel_size(), center).extend(layers::EDITOR_CURSOR);
    sprite.color = tool_color(editor.tool);
    *vis = Visibility::Visible;
}

fn reset_level(
    keys: Res<ButtonInput<KeyCode>>,
    tunables: Res<Tunables>,
    mut session: ResMut<Session>,
    mut changed: MessageWriter<LevelChanged>,
) {
    if !keys.just_pressed(KeyCode::F5) {
        return;
    }
    let level = TileGrid::default_level(tunables.grid_cols, tunables.grid_rows, tunables.tile_size);
    session.load_level(level, &tunables);
    changed.write(LevelChanged);
    info!("Editor: default level restored");
}

fn start_play(keys: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<GameState>>) {
    if keys.any_just_pressed([KeyCode::Enter, KeyCode::Escape]) {
        info!("Editor closed, starting play");
        next_state.set(GameState::InGame);
    }
}
