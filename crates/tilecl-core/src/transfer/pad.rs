use tilecl_common::Element;
use tilecl_runtime::StagingArea;

use crate::{layout::TileLayout, MemorySpace, Tile};

/// Write the padding value to every physical cell outside of the valid region.
///
/// Returns whether any cell was written.
pub(super) fn fill<S, E, const ROWS: usize, const COLS: usize, L>(
    area: &mut StagingArea,
    tile: &Tile<S, E, ROWS, COLS, L>,
) -> bool
where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
{
    let Some(value) = tile.pad().value::<E>() else {
        return false;
    };
    if tile.valid_rows() == ROWS && tile.valid_cols() == COLS {
        return false;
    }

    for row in 0..ROWS {
        for col in 0..COLS {
            if row >= tile.valid_rows() || col >= tile.valid_cols() {
                area.write(tile.byte_offset(row, col), value);
            }
        }
    }
    true
}
