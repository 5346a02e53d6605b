use half::{bf16, f16};
use tilecl_common::{Element, Numeric};

/// Operand and accumulator element types supported by the matrix unit.
///
/// Implemented for `(lhs, rhs, acc)` tuples. Any other combination is
/// rejected at compile time:
///
/// ```compile_fail
/// use tilecl_matmul::MatmulPrecision;
///
/// fn accumulator<P: MatmulPrecision>() {}
/// // 8-bit operands only accumulate in 32-bit integers.
/// accumulator::<(i8, i8, f32)>();
/// ```
pub trait MatmulPrecision: Send + Sync + 'static {
    /// Element type of the left operand.
    type Lhs: Numeric;
    /// Element type of the right operand.
    type Rhs: Numeric;
    /// Element type of the accumulator and of the bias.
    type Acc: Numeric;

    /// Product of two operands, widened to the accumulator type.
    fn multiply(lhs: Self::Lhs, rhs: Self::Rhs) -> Self::Acc {
        // Exact in f64 for every supported pair, so the only rounding is the
        // one of the accumulator type.
        Self::Acc::from_f64(lhs.to_f64() * rhs.to_f64())
    }
}

impl MatmulPrecision for (i8, i8, i32) {
    type Lhs = i8;
    type Rhs = i8;
    type Acc = i32;
}

impl MatmulPrecision for (f16, f16, f32) {
    type Lhs = f16;
    type Rhs = f16;
    type Acc = f32;
}

impl MatmulPrecision for (bf16, bf16, f32) {
    type Lhs = bf16;
    type Rhs = bf16;
    type Acc = f32;
}

impl MatmulPrecision for (f32, f32, f32) {
    type Lhs = f32;
    type Rhs = f32;
    type Acc = f32;
}
