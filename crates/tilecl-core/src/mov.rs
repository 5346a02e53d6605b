use tilecl_common::Element;
use tilecl_runtime::{CubeEngine, Engine, Instruction};

use crate::{
    layout::TileLayout,
    space::{Bias, Left, Matrix, Right},
    MemorySpace, Tile,
};

/// Cube spaces fed from the staging matrix memory.
pub trait MoveTarget: MemorySpace<Engine = CubeEngine> {}

impl MoveTarget for Left {}
impl MoveTarget for Right {}
impl MoveTarget for Bias {}

/// Copy the valid region of `dst` from `src`, starting at the cell
/// `(row, col)` of `src`, converting between the two layouts.
///
/// Cells outside the valid region of `dst` are padded. Reading the padding
/// of `src` is allowed, as long as the copied window stays inside its
/// physical shape.
///
/// # Panics
/// If the window exceeds the physical shape of `src`.
pub fn extract<D, E, const ROWS: usize, const COLS: usize, L, const SROWS: usize, const SCOLS: usize, SL>(
    engine: &mut CubeEngine,
    dst: &Tile<D, E, ROWS, COLS, L>,
    src: &Tile<Matrix, E, SROWS, SCOLS, SL>,
    row: usize,
    col: usize,
) where
    D: MoveTarget,
    E: Element,
    L: TileLayout,
    SL: TileLayout,
{
    let (rows, cols) = (dst.valid_rows(), dst.valid_cols());
    if rows == 0 || cols == 0 {
        return;
    }
    assert!(
        row + rows <= SROWS && col + cols <= SCOLS,
        "Window {rows}x{cols} at ({row}, {col}) exceeds the {SROWS}x{SCOLS} source tile"
    );

    let (from, to) = engine.area_pair(Matrix::KIND, D::KIND);
    for r in 0..rows {
        for c in 0..cols {
            let value: E = from.read(src.byte_offset(row + r, col + c));
            to.write(dst.byte_offset(r, c), value);
        }
    }
    engine.trace_mut().issue(Instruction::Move, 1);

    if let Some(value) = dst.pad().value::<E>() {
        fill_outside(engine, dst, value);
    }
}

/// Copy the top-left corner of `src` into `dst`.
pub fn mov<D, E, const ROWS: usize, const COLS: usize, L, const SROWS: usize, const SCOLS: usize, SL>(
    engine: &mut CubeEngine,
    dst: &Tile<D, E, ROWS, COLS, L>,
    src: &Tile<Matrix, E, SROWS, SCOLS, SL>,
) where
    D: MoveTarget,
    E: Element,
    L: TileLayout,
    SL: TileLayout,
{
    extract(engine, dst, src, 0, 0)
}

/// Broadcast `value` to every valid cell of `tile`.
pub fn fill<S, E, const ROWS: usize, const COLS: usize, L>(
    engine: &mut S::Engine,
    tile: &Tile<S, E, ROWS, COLS, L>,
    value: E,
) where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
{
    if tile.valid_rows() == 0 || tile.valid_cols() == 0 {
        return;
    }
    let area = engine.area_mut(S::KIND);
    for row in 0..tile.valid_rows() {
        for col in 0..tile.valid_cols() {
            area.write(tile.byte_offset(row, col), value);
        }
    }
    engine.trace_mut().issue(Instruction::VDup, 1);
}

fn fill_outside<S, E, const ROWS: usize, const COLS: usize, L>(
    engine: &mut S::Engine,
    tile: &Tile<S, E, ROWS, COLS, L>,
    value: E,
) where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
{
    if tile.valid_rows() == ROWS && tile.valid_cols() == COLS {
        return;
    }
    let area = engine.area_mut(S::KIND);
    for row in 0..ROWS {
        for col in 0..COLS {
            if row >= tile.valid_rows() || col >= tile.valid_cols() {
                area.write(tile.byte_offset(row, col), value);
            }
        }
    }
    engine.trace_mut().issue(Instruction::VDup, 1);
}
