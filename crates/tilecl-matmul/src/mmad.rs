use tilecl_common::Numeric;
use tilecl_core::{
    layout::{Nz, RowMajor, TileLayout, Zn, Zz},
    space::{Acc, Bias, Left, Right},
    MemorySpace, Tile,
};
use tilecl_runtime::{CubeEngine, Engine, Instruction};

use crate::MatmulPrecision;

/// Largest `m`, `n` or `k` a single multiply-accumulate instruction accepts.
pub const MAX_EXTENT: usize = 4095;

/// How the accumulator is initialised before the products are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatmulPhase {
    /// Start from zero.
    Full,
    /// Continue from the current accumulator content, e.g. for the next
    /// slice of a split `k` dimension.
    Accumulate,
    /// Start from the bias row, broadcast over every row.
    Bias,
}

/// `acc[m, n] (+)= Σ_k left[m, k] · right[k, n] (+ bias[n])`.
///
/// `m`, `n` and `k` are the valid extents of the tiles: `acc` is `m × n`,
/// `left` is `m × k` and `right` is `k × n`. A bias tile must be given for
/// [MatmulPhase::Bias] and only then. Products are summed in `k` order in
/// the accumulator precision.
///
/// # Panics
/// If the valid extents disagree or exceed [MAX_EXTENT], or if the bias
/// doesn't match the phase.
pub fn matmul<L, R, A, const M: usize, const N: usize, const K: usize>(
    engine: &mut CubeEngine,
    acc: &Tile<Acc, A, M, N, Nz>,
    left: &Tile<Left, L, M, K, Zz>,
    right: &Tile<Right, R, K, N, Zn>,
    bias: Option<&Tile<Bias, A, 1, N, RowMajor>>,
    phase: MatmulPhase,
) where
    L: Numeric,
    R: Numeric,
    A: Numeric,
    (L, R, A): MatmulPrecision<Lhs = L, Rhs = R, Acc = A>,
{
    let (m, n, k) = (acc.valid_rows(), acc.valid_cols(), left.valid_cols());
    assert!(
        left.valid_rows() == m && right.valid_rows() == k && right.valid_cols() == n,
        "Operands {}x{} and {}x{} don't multiply into {m}x{n}",
        left.valid_rows(),
        k,
        right.valid_rows(),
        right.valid_cols()
    );
    assert!(
        m <= MAX_EXTENT && n <= MAX_EXTENT && k <= MAX_EXTENT,
        "Matmul of {m}x{n}x{k} exceeds the limit of {MAX_EXTENT} per dimension"
    );
    assert_eq!(
        bias.is_some(),
        phase == MatmulPhase::Bias,
        "A bias tile is required by the bias phase and only by it, got {phase:?}"
    );
    if let Some(bias) = bias {
        assert!(
            bias.valid_cols() >= n,
            "Bias of {} columns doesn't cover the {n} output columns",
            bias.valid_cols()
        );
    }
    if m == 0 || n == 0 {
        return;
    }
    log::debug!("mmad {m}x{n}x{k} {:?} {phase:?}", A::ELEM);

    let lhs = read(engine, left, m, k);
    let rhs = read(engine, right, k, n);
    let mut out = match (phase, bias) {
        (_, Some(bias)) => {
            let row = read(engine, bias, 1, n);
            (0..m).flat_map(|_| row.iter().copied()).collect()
        }
        (MatmulPhase::Accumulate, None) => read(engine, acc, m, n),
        _ => vec![A::zero(); m * n],
    };

    for row in 0..m {
        for col in 0..n {
            let mut sum = out[row * n + col];
            for index in 0..k {
                let product = <(L, R, A) as MatmulPrecision>::multiply(lhs[row * k + index], rhs[index * n + col]);
                sum = sum.add(product);
            }
            out[row * n + col] = sum;
        }
    }

    let area = engine.area_mut(Acc::KIND);
    for (index, value) in out.into_iter().enumerate() {
        area.write(acc.byte_offset(index / n, index % n), value);
    }
    engine.trace_mut().issue(Instruction::Mmad, 1);
}

fn read<S, E, const ROWS: usize, const COLS: usize, Lay>(
    engine: &CubeEngine,
    tile: &Tile<S, E, ROWS, COLS, Lay>,
    rows: usize,
    cols: usize,
) -> Vec<E>
where
    S: MemorySpace<Engine = CubeEngine>,
    E: Numeric,
    Lay: TileLayout,
{
    let area = engine.area(S::KIND);
    let mut values = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            values.push(area.read(tile.byte_offset(row, col)));
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tilecl_runtime::config::HardwareProperties;

    fn engine() -> CubeEngine {
        CubeEngine::detached(HardwareProperties::default())
    }

    #[test]
    fn identity_right_operand() {
        let mut engine = engine();
        let left = Tile::<Left, f32, 16, 8, Zz>::bind(&engine, 0)
            .unwrap()
            .with_valid(3, 4);
        let right = Tile::<Right, f32, 8, 16, Zn>::bind(&engine, 0)
            .unwrap()
            .with_valid(4, 4);
        let acc = Tile::<Acc, f32, 16, 16, Nz>::bind(&engine, 0)
            .unwrap()
            .with_valid(3, 4);

        let values = (0..12).map(|v| v as f32).collect::<Vec<_>>();
        left.write_slice(&mut engine, &values);
        let mut identity = vec![0.0; 16];
        for i in 0..4 {
            identity[i * 4 + i] = 1.0;
        }
        right.write_slice(&mut engine, &identity);

        matmul(&mut engine, &acc, &left, &right, None, MatmulPhase::Full);

        assert_eq!(acc.to_vec(&engine), values);
        assert_eq!(engine.trace().count(Instruction::Mmad), 1);
    }

    #[test]
    fn bias_is_broadcast_over_rows() {
        let mut engine = engine();
        let left = Tile::<Left, i8, 16, 32, Zz>::bind(&engine, 0)
            .unwrap()
            .with_valid(2, 1);
        let right = Tile::<Right, i8, 32, 16, Zn>::bind(&engine, 0)
            .unwrap()
            .with_valid(1, 2);
        let acc = Tile::<Acc, i32, 16, 16, Nz>::bind(&engine, 0)
            .unwrap()
            .with_valid(2, 2);
        let bias = Tile::<Bias, i32, 1, 16, RowMajor>::bind(&engine, 0)
            .unwrap()
            .with_valid(1, 2);

        left.write_slice(&mut engine, &[3, -4]);
        right.write_slice(&mut engine, &[10, 100]);
        bias.write_slice(&mut engine, &[1, 2]);

        matmul(&mut engine, &acc, &left, &right, Some(&bias), MatmulPhase::Bias);

        assert_eq!(acc.to_vec(&engine), vec![31, 302, -39, -398]);
    }

    #[test]
    #[should_panic(expected = "required by the bias phase")]
    fn bias_phase_needs_a_bias() {
        let mut engine = engine();
        let left = Tile::<Left, f32, 16, 8, Zz>::bind(&engine, 0).unwrap();
        let right = Tile::<Right, f32, 8, 16, Zn>::bind(&engine, 0).unwrap();
        let acc = Tile::<Acc, f32, 16, 16, Nz>::bind(&engine, 0).unwrap();

        matmul(&mut engine, &acc, &left, &right, None, MatmulPhase::Bias);
    }

    #[test]
    #[should_panic(expected = "don't multiply")]
    fn inner_extents_must_agree() {
        let mut engine = engine();
        let left = Tile::<Left, f32, 16, 8, Zz>::bind(&engine, 0)
            .unwrap()
            .with_valid(16, 5);
        let right = Tile::<Right, f32, 8, 16, Zn>::bind(&engine, 0).unwrap();
        let acc = Tile::<Acc, f32, 16, 16, Nz>::bind(&engine, 0).unwrap();

        matmul(&mut engine, &acc, &left, &right, None, MatmulPhase::Full);
    }
}
