//! Row and column reductions of vector tiles.
//!
//! The vector engine reduces at most one pass of `P` elements per row and
//! addresses at most `max_repeat` rows per instruction. The schedulers in this
//! crate split an arbitrary reduction into such bounded instructions: masked
//! or single passes when a row fits in one pass, and a pairwise combine tree
//! over a workspace tile otherwise.

#![warn(missing_docs)]

#[macro_use]
extern crate derive_new;

mod col;
mod instructions;
mod ops;
mod plan;
mod row;

pub use col::*;
pub use instructions::*;
pub use ops::*;
pub use plan::*;
pub use row::*;


#[cfg(test)]
mod tests {
    crate::testgen_reduce!();
}
