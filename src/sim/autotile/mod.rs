//! Block autotiling.
//!
//! Each solid cell is drawn with a piece chosen from the solidity of its eight
//! neighbours. The choice is precomputed for all 256 neighbour masks once, so drawing
//! is a single table lookup per cell.

use bevy::math::IVec2;

use crate::sim::level::TileGrid;

pub const UP: u8 = 1 << 0;
pub const DOWN: u8 = 1 << 1;
pub const LEFT: u8 = 1 << 2;
pub const RIGHT: u8 = 1 << 3;
pub const UP_LEFT: u8 = 1 << 4;
pub const UP_RIGHT: u8 = 1 << 5;
pub const DOWN_LEFT: u8 = 1 << 6;
pub const DOWN_RIGHT: u8 = 1 << 7;

/// Columns in the tileset atlas.
pub const ATLAS_COLUMNS: i32 = 8;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockPiece {
    // Single row, nothing above or below.
    RowIsolated,
    RowLeftEnd,
    RowRightEnd,
    RowMiddle,
    // Open above, solid below.
    TopIsolated,
    TopInnerBottom,
    TopInnerBottomLeft,
    TopInnerBottomRight,
    TopEdge,
    TopLeftOpenBelow,
    TopLeftCorner,
    TopRightOpenBelow,
    TopRightCorner,
    // Solid above, open below.
    BottomIsolated,
    BottomInnerTop,
    BottomInnerTopLeft,
    BottomInnerTopRight,
    BottomEdge,
    BottomLeftOpenAbove,
    BottomLeftCorner,
    BottomRightOpenAbove,
    BottomRightCorner,
    // Solid on all four sides; only diagonals vary.
    InteriorAllOpen,
    InteriorUpDiagonals,
    InteriorRightDiagonals,
    InteriorLeftDiagonals,
    InteriorDownLeft,
    InteriorDownRight,
    InteriorUpLeftDownRight,
    InteriorUpRightDownLeft,
    InteriorUpLeft,
    InteriorUpRight,
    InteriorUpOpen,
    InteriorUpLeftOpen,
    InteriorUpRightOpen,
    InteriorDownRightOpen,
    #[default]
    InteriorFull,
    // Vertical run, open on the left.
    OpenLeftAllOpen,
    OpenLeftDownRightOpen,
    OpenLeftUpRightOpen,
    OpenLeftEdge,
    // Vertical run, open on the right.
    OpenRightAllOpen,
    OpenRightDownLeftOpen,
    OpenRightUpLeftOpen,
    OpenRightEdge,
    IsolatedVertical,
}

impl BlockPiece {
    /// Cell in the tileset atlas, laid out row-major in declaration order.
    pub fn atlas_cell(self) -> IVec2 {
        let i = self as i32;
        IVec2::new(i % ATLAS_COLUMNS, i / ATLAS_COLUMNS)
    }

    /// Whether the piece shows a walkable top surface.
    pub fn exposed_top(self) -> bool {
        (self as u8) <= (Self::TopRightCorner as u8)
    }
}

/// Solidity of the eight neighbours of `(cx, cy)`. Outside the grid counts as solid.
pub fn neighbor_mask(grid: &TileGrid, cx: i32, cy: i32) -> u8 {
    const OFFSETS: [(i32, i32, u8); 8] = [
        (0, -1, UP),
        (0, 1, DOWN),
        (-1, 0, LEFT),
        (1, 0, RIGHT),
        (-1, -1, UP_LEFT),
        (1, -1, UP_RIGHT),
        (-1, 1, DOWN_LEFT),
        (1, 1, DOWN_RIGHT),
    ];
    OFFSETS
        .iter()
        .filter(|(dx, dy, _)| grid.is_solid_cell(cx + dx, cy + dy))
        .fold(0, |mask, (_, _, bit)| mask | bit)
}

/// Decision rules for one neighbour mask.
pub fn classify(mask: u8) -> BlockPiece {
    use BlockPiece::*;
    let has = |bit: u8| mask & bit != 0;
    let (up, down, left, right) = (has(UP), has(DOWN), has(LEFT), has(RIGHT));
    let (ul, ur, dl, dr) = (has(UP_LEFT), has(UP_RIGHT), has(DOWN_LEFT), has(DOWN_RIGHT));

    if !up && !down {
        return match (left, right) {
            (false, false) => RowIsolated,
            (false, true) => RowLeftEnd,
            (true, false) => RowRightEnd,
            (true, true) => RowMiddle,
        };
    }
    if !up {
        return match (left, right) {
            (false, false) => TopIsolated,
            (true, true) => match (dl, dr) {
                (false, false) => TopInnerBottom,
                (false, true) => TopInnerBottomLeft,
                (true, false) => TopInnerBottomRight,
                (true, true) => TopEdge,
            },
            (false, true) if !dr => TopLeftOpenBelow,
            (false, true) => TopLeftCorner,
            (true, false) if !dl => TopRightOpenBelow,
            (true, false) => TopRightCorner,
        };
    }
    if !down {
        return match (left, right) {
            (false, false) => BottomIsolated,
            (true, true) => match (ul, ur) {
                (false, false) => BottomInnerTop,
                (false, true) => BottomInnerTopLeft,
                (true, false) => BottomInnerTopRight,
                (true, true) => BottomEdge,
            },
            (false, true) if !ur => BottomLeftOpenAbove,
            (false, true) => BottomLeftCorner,
            (true, false) if !ul => BottomRightOpenAbove,
            (true, false) => BottomRightCorner,
        };
    }
    match (left, right) {
        (true, true) => interior(ul, ur, dl, dr),
        (false, true) => match (ur, dr) {
            (false, false) => OpenLeftAllOpen,
            (_, false) => OpenLeftDownRightOpen,
            (false, _) => OpenLeftUpRightOpen,
            _ => OpenLeftEdge,
        },
        (true, false) => match (ul, dl) {
            (false, false) => OpenRightAllOpen,
            (_, false) => OpenRightDownLeftOpen,
            (false, _) => OpenRightUpLeftOpen,
            _ => OpenRightEdge,
        },
        (false, false) => IsolatedVertical,
    }
}

fn interior(ul: bool, ur: bool, dl: bool, dr: bool) -> BlockPiece {
    use BlockPiece::*;
    match (ul, ur, dl, dr) {
        (false, false, false, false) => InteriorAllOpen,
        (true, true, false, false) => InteriorUpDiagonals,
        (false, true, false, true) => InteriorRightDiagonals,
        (true, false, true, false) => InteriorLeftDiagonals,
        (false, false, true, false) => InteriorDownLeft,
        (false, false, false, true) => InteriorDownRight,
        (true, false, false, true) => InteriorUpLeftDownRight,
        (false, true, true, false) => InteriorUpRightDownLeft,
        (true, false, false, false) => InteriorUpLeft,
        (false, true, false, false) => InteriorUpRight,
        (false, false, _, _) => InteriorUpOpen,
        (false, _, _, _) => InteriorUpLeftOpen,
        (_, false, _, _) => InteriorUpRightOpen,
        (_, _, _, false) => InteriorDownRightOpen,
        _ => InteriorFull,
    }
}

/// Piece lookup for every neighbour mask.
#[derive(Clone, Debug)]
pub struct AutotileTable {
    pieces: [BlockPiece; 256],
}

impl AutotileTable {
    pub fn new() -> Self {
        let mut pieces = [BlockPiece::default(); 256];
        for (mask, piece) in pieces.iter_mut().enumerate() {
            *piece = classify(mask as u8);
        }
        Self { pieces }
    }

    #[inline]
    pub fn piece(&self, mask: u8) -> BlockPiece {
        self.pieces[usize::from(mask)]
    }

    #[inline]
    pub fn piece_at(&self, grid: &TileGrid, cx: i32, cy: i32) -> BlockPiece {
        self.piece(neighbor_mask(grid, cx, cy))
    }
}

impl Default for AutotileTable {
    fn default() -> Self {
        Self::new()
    }
}
