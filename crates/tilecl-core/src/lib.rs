//! Tiles and their movement between global memory and the staging areas.
//!
//! A [Tile] is a typed window over an engine staging area. Its memory space,
//! element type, physical shape and storage order are type parameters, so that
//! unsupported combinations fail to compile. A [GlobalView] addresses a
//! [DeviceBuffer](tilecl_runtime::DeviceBuffer) through a 5-D shape and strides.
//! [load] and [store] convert between the two under every supported
//! [TransferPair].

#![warn(missing_docs)]

#[macro_use]
extern crate derive_new;

/// Storage orders of tiles and global memory views.
pub mod layout;
/// Memory space markers.
pub mod space;

mod error;
mod mov;
mod tile;
mod transfer;
mod view;

pub use error::*;
pub use mov::*;
pub use space::{Loadable, MemorySpace, Storable};
pub use tile::*;
pub use transfer::*;
pub use view::*;
