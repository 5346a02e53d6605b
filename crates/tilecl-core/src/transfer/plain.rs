use tilecl_common::Element;
use tilecl_runtime::Instruction;

use super::{TransferPath, Way};
use crate::{
    layout::{GlobalLayout, TileLayout},
    GlobalView, MemorySpace, Tile,
};

/// Copy whole contiguous lines: rows for [TransferPath::RowMajor], columns
/// for [TransferPath::ColMajor].
pub(super) fn lines<S, E, const ROWS: usize, const COLS: usize, L, G>(
    way: Way,
    global: &mut [u8],
    staging: &mut [u8],
    view: &GlobalView<E, G>,
    tile: &Tile<S, E, ROWS, COLS, L>,
    path: TransferPath,
) -> (Instruction, u64)
where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
    G: GlobalLayout,
{
    let (lines, len) = match path {
        TransferPath::RowMajor => (tile.valid_rows(), tile.valid_cols()),
        _ => (tile.valid_cols(), tile.valid_rows()),
    };

    for line in 0..lines {
        let (row, col) = match path {
            TransferPath::RowMajor => (line, 0),
            _ => (0, line),
        };
        way.copy(
            global,
            view.address(row, col) * E::SIZE,
            staging,
            tile.byte_offset(row, col),
            len * E::SIZE,
        );
    }

    (Instruction::LineCopy, lines as u64)
}

/// Copy element by element, for layouts that don't share a contiguous dimension.
pub(super) fn elements<S, E, const ROWS: usize, const COLS: usize, L, G>(
    way: Way,
    global: &mut [u8],
    staging: &mut [u8],
    view: &GlobalView<E, G>,
    tile: &Tile<S, E, ROWS, COLS, L>,
) -> (Instruction, u64)
where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
    G: GlobalLayout,
{
    for row in 0..tile.valid_rows() {
        for col in 0..tile.valid_cols() {
            way.copy(
                global,
                view.address(row, col) * E::SIZE,
                staging,
                tile.byte_offset(row, col),
                E::SIZE,
            );
        }
    }

    (Instruction::ElementCopy, tile.valid_rows() as u64)
}
