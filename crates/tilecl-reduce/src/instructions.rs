use core::fmt::Debug;

use tilecl_common::Numeric;

/// A binary associative operator the vector engine can reduce with.
pub trait ReduceInstruction: 'static + Send + Sync + Clone + Copy + Default + Debug {
    /// Name used in logs.
    const NAME: &'static str;

    /// Combine two partial results.
    fn combine<E: Numeric>(lhs: E, rhs: E) -> E;
}

/// Operators with a dedicated per-row reduction instruction.
///
/// There is no row product instruction:
///
/// ```compile_fail
/// use tilecl_core::{layout::{ColMajor, RowMajor}, space::Vector, Tile};
/// use tilecl_reduce::{row_reduce, Prod};
/// use tilecl_runtime::{config::HardwareProperties, VectorEngine};
///
/// let mut engine = VectorEngine::detached(HardwareProperties::default());
/// let src = Tile::<Vector, f32, 8, 64, RowMajor>::bind(&engine, 0).unwrap();
/// let tmp = Tile::<Vector, f32, 8, 64, RowMajor>::bind(&engine, 2048).unwrap();
/// let dst = Tile::<Vector, f32, 8, 1, ColMajor>::bind(&engine, 4096).unwrap();
/// row_reduce(&mut engine, Prod, &dst.with_valid(8, 1), &src, &tmp);
/// ```
pub trait RowReducible: ReduceInstruction {}

/// Sum of the elements. Integer sums wrap around.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sum;

/// Largest element.
#[derive(Debug, Default, Clone, Copy)]
pub struct Max;

/// Smallest element.
#[derive(Debug, Default, Clone, Copy)]
pub struct Min;

/// Product of the elements. Only available for column reductions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Prod;

impl ReduceInstruction for Sum {
    const NAME: &'static str = "sum";

    fn combine<E: Numeric>(lhs: E, rhs: E) -> E {
        lhs.add(rhs)
    }
}

impl ReduceInstruction for Max {
    const NAME: &'static str = "max";

    fn combine<E: Numeric>(lhs: E, rhs: E) -> E {
        lhs.max(rhs)
    }
}

impl ReduceInstruction for Min {
    const NAME: &'static str = "min";

    fn combine<E: Numeric>(lhs: E, rhs: E) -> E {
        lhs.min(rhs)
    }
}

impl ReduceInstruction for Prod {
    const NAME: &'static str = "prod";

    fn combine<E: Numeric>(lhs: E, rhs: E) -> E {
        lhs.mul(rhs)
    }
}

impl RowReducible for Sum {}
impl RowReducible for Max {}
impl RowReducible for Min {}
