//! Matrix multiply-accumulate on the cube engine.
//!
//! Operands live in the left and right operand memories in their hardware
//! fractal layouts, the result lands in the accumulator memory. Moving data
//! in and out of those memories is done with the load, move and store
//! operations of `tilecl-core`.

#![warn(missing_docs)]

mod mmad;
mod precision;

pub use mmad::*;
pub use precision::*;
