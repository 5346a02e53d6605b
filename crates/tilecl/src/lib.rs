//! Tile-level kernel primitives for a simulated accelerator made of one
//! matrix-multiply engine and a few SIMD vector sub-engines.
//!
//! Kernels move tiles between global memory and the engine staging areas,
//! reduce them on the vector engines, multiply them on the cube engine and
//! hand them off between engines through the flag based sync protocol.

pub use tilecl_core::*;

pub use tilecl_common as common;
pub use tilecl_runtime as runtime;

#[cfg(feature = "matmul")]
pub use tilecl_matmul as matmul;

#[cfg(feature = "reduce")]
pub use tilecl_reduce as reduce;
