use tilecl_common::Numeric;
use tilecl_core::{
    layout::{PlainLayout, RowMajor},
    space::Vector,
    Tile,
};
use tilecl_runtime::{Engine, VectorEngine};

use crate::{vbinary, vcopy, vreduce, RowReducePlan, RowReducible, RowStrategy, VecOperand};

/// Reduce every valid row of `src` into one element of `dst`.
///
/// `dst` is a column: its valid rows must match the valid rows of `src` and it
/// must have a single valid column. Rows wider than one pass are folded
/// through `tmp`, which needs `rows` rows and
/// [RowReducePlan::workspace_cols] columns.
///
/// Zero valid rows or columns leave `dst` untouched.
///
/// # Panics
/// If the valid extents of the tiles are inconsistent or `tmp` is too small.
pub fn row_reduce<
    I: RowReducible,
    E: Numeric,
    const DR: usize,
    const DC: usize,
    DL: PlainLayout,
    const R: usize,
    const C: usize,
    const TR: usize,
    const TC: usize,
>(
    engine: &mut VectorEngine,
    _op: I,
    dst: &Tile<Vector, E, DR, DC, DL>,
    src: &Tile<Vector, E, R, C, RowMajor>,
    tmp: &Tile<Vector, E, TR, TC, RowMajor>,
) {
    let rows = src.valid_rows();
    let cols = src.valid_cols();
    assert_eq!(
        dst.valid_rows(),
        rows,
        "Destination has {} valid rows, the source has {rows}",
        dst.valid_rows()
    );
    if rows == 0 || cols == 0 {
        return;
    }
    assert_eq!(
        dst.valid_cols(),
        1,
        "A row reduction writes a single column, got {} valid columns",
        dst.valid_cols()
    );

    let plan = RowReducePlan::new::<E>(engine.properties(), cols);
    log::debug!(
        "row {} of {rows}x{cols} {} as {:?}",
        I::NAME,
        E::ELEM,
        plan.strategy
    );

    let dst_base = VecOperand::new(dst.offset(), DL::row_pitch(DR, DC));
    let src_base = VecOperand::new(src.offset(), C);

    if plan.strategy != RowStrategy::Tree {
        for (first, count) in plan.chunks(rows) {
            vreduce::<E, I>(
                engine,
                dst_base.at::<E>(first * dst_base.stride),
                src_base.at::<E>(first * C),
                cols,
                count,
            );
        }
        return;
    }

    assert!(
        TC >= plan.workspace_cols() && TR >= rows,
        "Workspace of {TR}x{TC} is too small, a {rows}x{cols} row reduction needs {rows}x{}",
        plan.workspace_cols()
    );
    let tmp_base = VecOperand::new(tmp.offset(), TC);

    for (first, count) in plan.chunks(rows) {
        let dst = dst_base.at::<E>(first * dst_base.stride);
        let src = src_base.at::<E>(first * C);
        let tmp = tmp_base.at::<E>(first * TC);
        fold_passes::<E, I>(engine, &plan, tmp, src, count);
        vreduce::<E, I>(engine, dst, tmp, plan.pass, count);
    }
}

/// Fold the passes of `count` rows into the first workspace pass.
fn fold_passes<E: Numeric, I: RowReducible>(
    engine: &mut VectorEngine,
    plan: &RowReducePlan,
    tmp: VecOperand,
    src: VecOperand,
    count: usize,
) {
    let pass = plan.pass;
    let src_pass = |index: usize| src.at::<E>(index * pass);
    let tmp_pass = |index: usize| tmp.at::<E>(index * pass);

    if plan.pairs == 0 {
        vcopy::<E>(engine, tmp_pass(0), src_pass(0), pass, count);
    }
    for pair in 0..plan.pairs {
        vbinary::<E, I>(
            engine,
            tmp_pass(pair),
            src_pass(2 * pair),
            src_pass(2 * pair + 1),
            pass,
            count,
        );
    }

    if plan.full_passes > 1 && plan.full_passes % 2 == 1 {
        let last = src_pass(plan.full_passes - 1);
        vbinary::<E, I>(engine, tmp_pass(0), tmp_pass(0), last, pass, count);
    }
    if plan.remainder > 0 {
        let rest = src_pass(plan.full_passes);
        vbinary::<E, I>(engine, tmp_pass(0), tmp_pass(0), rest, plan.remainder, count);
    }

    let mut width = plan.pairs.max(1);
    while width > 1 {
        let half = width / 2;
        for index in 0..half {
            vbinary::<E, I>(
                engine,
                tmp_pass(index),
                tmp_pass(index),
                tmp_pass(index + half),
                pass,
                count,
            );
        }
        if width % 2 == 1 {
            let last = tmp_pass(width - 1);
            vbinary::<E, I>(engine, tmp_pass(0), tmp_pass(0), last, pass, count);
        }
        width = half;
    }
}
