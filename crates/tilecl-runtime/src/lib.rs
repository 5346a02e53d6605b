//! Simulated accelerator runtime.
//!
//! The accelerator is made of one cube (matrix) engine and a small number of
//! vector sub-engines. Each engine owns private staging areas and they only
//! exchange data through [DeviceBuffer]s, gated by the flag based protocol in
//! [sync].

#![warn(missing_docs)]

#[macro_use]
extern crate derive_new;

/// Global configuration and hardware properties.
pub mod config;
/// Cross-engine synchronization protocol.
pub mod sync;

mod engine;
mod launch;
mod memory;
mod staging;
mod trace;

pub use engine::*;
pub use launch::*;
pub use memory::*;
pub use staging::*;
pub use trace::*;
