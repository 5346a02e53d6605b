use tilecl_common::Numeric;
use tilecl_core::{layout::RowMajor, space::Vector, Tile};
use tilecl_runtime::{Engine, VectorEngine};

use crate::{vbinary, vcopy, ColReducePlan, ReduceInstruction, VecOperand};

/// Reduce every valid column of `src` into one element of the row `dst`.
///
/// Rows are combined pairwise into `tmp`, one pass-wide column block at a
/// time, so `tmp` needs [ColReducePlan::workspace_rows] rows and
/// [ColReducePlan::workspace_cols] columns. Zero valid rows or columns leave
/// `dst` untouched.
///
/// # Panics
/// If the valid extents of the tiles are inconsistent or `tmp` is too small.
pub fn col_reduce<
    I: ReduceInstruction,
    E: Numeric,
    const DR: usize,
    const DC: usize,
    const R: usize,
    const C: usize,
    const TR: usize,
    const TC: usize,
>(
    engine: &mut VectorEngine,
    _op: I,
    dst: &Tile<Vector, E, DR, DC, RowMajor>,
    src: &Tile<Vector, E, R, C, RowMajor>,
    tmp: &Tile<Vector, E, TR, TC, RowMajor>,
) {
    let rows = src.valid_rows();
    let cols = src.valid_cols();
    assert_eq!(
        dst.valid_cols(),
        cols,
        "Destination has {} valid columns, the source has {cols}",
        dst.valid_cols()
    );
    if rows == 0 || cols == 0 {
        return;
    }
    assert_eq!(
        dst.valid_rows(),
        1,
        "A column reduction writes a single row, got {} valid rows",
        dst.valid_rows()
    );

    let plan = ColReducePlan::new::<E>(engine.properties(), rows, cols);
    log::debug!(
        "col {} of {rows}x{cols} {} in {} blocks",
        I::NAME,
        E::ELEM,
        plan.blocks
    );
    assert!(
        TR >= plan.workspace_rows() && TC >= plan.workspace_cols(),
        "Workspace of {TR}x{TC} is too small, a {rows}x{cols} column reduction needs {}x{}",
        plan.workspace_rows(),
        plan.workspace_cols()
    );

    let dst_row = VecOperand::new(dst.offset(), 0);
    let src_rows = VecOperand::new(src.offset(), C);
    let tmp_rows = VecOperand::new(tmp.offset(), TC);

    for block in 0..plan.blocks {
        let first_col = block * plan.pass;
        let width = plan.block_width(block);
        let dst = dst_row.at::<E>(first_col);
        let src = src_rows.at::<E>(first_col);

        if rows == 1 {
            vcopy::<E>(engine, dst, src, width, 1);
            continue;
        }

        combine_rows::<E, I>(engine, &plan, tmp_rows, src, rows, width);
        vcopy::<E>(engine, dst, tmp_rows, width, 1);
    }
}

/// Fold `rows` rows of one column block into the first workspace row.
fn combine_rows<E: Numeric, I: ReduceInstruction>(
    engine: &mut VectorEngine,
    plan: &ColReducePlan,
    tmp: VecOperand,
    src: VecOperand,
    rows: usize,
    width: usize,
) {
    let src_row = |row: usize| src.at::<E>(row * src.stride);
    let tmp_row = |row: usize| tmp.at::<E>(row * tmp.stride);

    for (first, count) in plan.chunks(plan.pairs) {
        let lhs = src_row(2 * first).with_stride(2 * src.stride);
        let rhs = src_row(2 * first + 1).with_stride(2 * src.stride);
        vbinary::<E, I>(engine, tmp_row(first), lhs, rhs, width, count);
    }
    if rows % 2 == 1 {
        vbinary::<E, I>(engine, tmp_row(0), tmp_row(0), src_row(rows - 1), width, 1);
    }

    let mut height = plan.pairs;
    while height > 1 {
        let half = height / 2;
        for (first, count) in plan.chunks(half) {
            vbinary::<E, I>(
                engine,
                tmp_row(first),
                tmp_row(first),
                tmp_row(first + half),
                width,
                count,
            );
        }
        if height % 2 == 1 {
            vbinary::<E, I>(engine, tmp_row(0), tmp_row(0), tmp_row(height - 1), width, 1);
        }
        height = half;
    }
}
