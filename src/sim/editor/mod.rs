//! Level editing tools.

use bevy::math::IVec2;

use crate::sim::level::{TileGrid, TileType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorTool {
    #[default]
    Player,
    AddBlock,
    RemoveBlock,
    Exit,
    Hazard,
    Spawner,
}

impl EditorTool {
    pub const ALL: [Self; 6] = [
        Self::Player,
        Self::AddBlock,
        Self::RemoveBlock,
        Self::Exit,
        Self::Hazard,
        Self::Spawner,
    ];

    /// Cycle to the following tool, wrapping at the end.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Number-key shortcut, `1` for the first tool.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.get(usize::from(digit).checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "Player Location",
            Self::AddBlock => "Add Block",
            Self::RemoveBlock => "Remove Block",
            Self::Exit => "Level Exit",
            Self::Hazard => "Hazard",
            Self::Spawner => "Enemy Spawner",
        }
    }
}

/// Apply `tool` at a cell. Returns whether the grid changed.
///
/// Markers are only moved by their own tools; the erase tool never removes them.
pub fn apply_tool(grid: &mut TileGrid, tool: EditorTool, cx: i32, cy: i32) -> bool {
    if !grid.in_bounds(cx, cy) {
        return false;
    }
    let current = grid.get(cx, cy);
    match tool {
        EditorTool::Player => grid.set_unique(cx, cy, TileType::PlayerMarker),
        EditorTool::Exit => grid.set_unique(cx, cy, TileType::ExitMarker),
        EditorTool::AddBlock if !current.is_unique() => grid.set(cx, cy, TileType::Block),
        EditorTool::Hazard if !current.is_unique() => grid.set(cx, cy, TileType::Hazard),
        EditorTool::Spawner if !current.is_unique() => grid.set(cx, cy, TileType::Spawner),
        EditorTool::RemoveBlock
            if matches!(current, TileType::Block | TileType::Hazard | TileType::Spawner) =>
        {
            grid.set(cx, cy, TileType::Empty)
        }
        _ => false,
    }
}

/// Keep a cursor cell inside the grid.
pub fn clamp_cell(grid: &TileGrid, cell: IVec2) -> IVec2 {
    let max = IVec2::new(grid.cols() as i32 - 1, grid.rows() as i32 - 1).max(IVec2::ZERO);
    cell.clamp(IVec2::ZERO, max)
}
