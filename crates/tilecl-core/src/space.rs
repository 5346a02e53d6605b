use core::fmt::Debug;

use tilecl_runtime::{CubeEngine, Engine, SpaceKind, VectorEngine};

/// Type level tag of the staging area a tile lives in.
///
/// The associated engine is the only one that can address the area, so a tile
/// can't be handed to an operation running on the other engine type.
pub trait MemorySpace: 'static + Send + Sync + Clone + Copy + Debug {
    /// The space as a value.
    const KIND: SpaceKind;
    /// Engine owning the staging area.
    type Engine: Engine;
}

/// Spaces global memory can be loaded into.
pub trait Loadable: MemorySpace {}

/// Spaces that can be stored to global memory.
pub trait Storable: MemorySpace {}

/// Vector unified buffer.
#[derive(Clone, Copy, Debug)]
pub struct Vector;

/// Cube staging matrix memory.
#[derive(Clone, Copy, Debug)]
pub struct Matrix;

/// Left operand memory.
#[derive(Clone, Copy, Debug)]
pub struct Left;

/// Right operand memory.
#[derive(Clone, Copy, Debug)]
pub struct Right;

/// Accumulator memory.
#[derive(Clone, Copy, Debug)]
pub struct Acc;

/// Bias table.
#[derive(Clone, Copy, Debug)]
pub struct Bias;

macro_rules! memory_space {
    ($name:ident, $kind:ident, $engine:ty) => {
        impl MemorySpace for $name {
            const KIND: SpaceKind = SpaceKind::$kind;
            type Engine = $engine;
        }
    };
}

memory_space!(Vector, Vector, VectorEngine);
memory_space!(Matrix, Matrix, CubeEngine);
memory_space!(Left, Left, CubeEngine);
memory_space!(Right, Right, CubeEngine);
memory_space!(Acc, Acc, CubeEngine);
memory_space!(Bias, Bias, CubeEngine);

impl Loadable for Vector {}
impl Loadable for Matrix {}

impl Storable for Vector {}
impl Storable for Matrix {}
impl Storable for Acc {}
