use tilecl_common::{Element, BLOCK_BYTES};
use tilecl_runtime::Instruction;

use super::Way;
use crate::{
    layout::{GlobalLayout, TileLayout, TileLayoutKind},
    GlobalView, MemorySpace, Tile,
};

/// Copy between a fractal view and a fractal tile sharing the same boxes.
///
/// Row-major boxes are copied one column of boxes per block copy, the valid
/// part of every box row being contiguous on both sides. Column-major `Zn`
/// boxes are copied one row of boxes per block copy, by contiguous box columns.
pub(super) fn blocks<S, E, const ROWS: usize, const COLS: usize, L, G>(
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
    let c0 = BLOCK_BYTES / E::SIZE;
    let column_boxes = L::KIND == TileLayoutKind::Zn;
    let (lines, outer) = if column_boxes {
        (tile.valid_cols(), tile.valid_rows())
    } else {
        (tile.valid_rows(), tile.valid_cols())
    };
    let blocks = outer.div_ceil(c0);

    for block in 0..blocks {
        let start = block * c0;
        let width = c0.min(outer - start);
        for line in 0..lines {
            let (row, col) = if column_boxes { (start, line) } else { (line, start) };
            way.copy(
                global,
                view.address(row, col) * E::SIZE,
                staging,
                tile.byte_offset(row, col),
                width * E::SIZE,
            );
        }
    }

    (Instruction::BlockCopy, blocks as u64)
}
