//! Flag based hand-off between the cube engine and the vector sub-engines.
//!
//! A [SyncEdge] is a four operation handshake: the producer `allocate`s a free
//! buffer, fills it and `record`s; the consumer `wait`s, reads and `free`s.
//! The vector role is played by several independent sub-engines, which makes
//! the protocol asymmetric:
//!
//! | edge            | `record`                        | `wait`                          |
//! |-----------------|---------------------------------|---------------------------------|
//! | cube → vector   | cube raises every sub-engine    | each sub-engine waits its flag  |
//! | vector → cube   | each sub-engine raises its slot | cube waits every slot (barrier) |
//!
//! The `free` / `allocate` back-pressure direction mirrors the same asymmetry.
//! There is no timeout: an unmatched `wait` blocks forever.

mod edge;
mod flags;

pub use edge::*;
pub use flags::*;
