#![warn(missing_docs)]

//! Common types shared by every TileCL crate: the closed set of element
//! types the accelerator understands and the padding bit-pattern tables.

mod elem;
mod pad;

pub use elem::*;
pub use pad::*;

/// Size in bytes of the smallest addressable block of a staging area.
///
/// Every plain tile row (or column, for column-major tiles) must be a multiple
/// of this size, and it is the row width of a fractal box.
pub const BLOCK_BYTES: usize = 32;

/// Number of rows of a fractal box.
pub const FRACTAL_ROWS: usize = 16;
