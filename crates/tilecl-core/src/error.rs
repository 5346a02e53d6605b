use std::fmt::{Debug, Display};

use tilecl_runtime::SpaceKind;

use crate::layout::{Coords5d, GlobalLayoutKind};

/// Errors raised when describing global memory with a [GlobalView](crate::GlobalView).
pub enum ViewError {
    /// A shape dimension is zero.
    EmptyDimension {
        /// Index of the dimension, outermost first.
        dim: usize,
    },

    /// The strides do not match the declared layout.
    InconsistentStrides {
        /// Declared layout.
        layout: GlobalLayoutKind,
        /// Shape of the view.
        shape: Coords5d,
        /// Strides of the view.
        strides: Coords5d,
    },

    /// The innermost dimensions of a fractal view are not a single box.
    FractalBox {
        /// Shape of the view.
        shape: Coords5d,
        /// Expected `(16, C0)` inner dimensions.
        expected: (usize, usize),
    },

    /// The view addresses elements past the end of its buffer.
    OutOfBounds {
        /// Elements needed by the view, counted from the start of the buffer.
        required: usize,
        /// Elements held by the buffer.
        available: usize,
    },
}

/// Errors raised when placing a [Tile](crate::Tile) in its staging area.
pub enum PlacementError {
    /// The offset is not a multiple of the staging block size.
    Misaligned {
        /// Requested offset in bytes.
        offset: usize,
        /// Required alignment in bytes.
        alignment: usize,
    },

    /// The tile would extend past the end of its staging area.
    OutOfBounds {
        /// The staging area.
        space: SpaceKind,
        /// End of the tile in bytes.
        end: usize,
        /// Capacity of the area in bytes.
        capacity: usize,
    },
}

impl Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::EmptyDimension { dim } => {
                write!(f, "Invalid view: dimension {dim} is empty, every dimension should be at least 1")
            }
            ViewError::InconsistentStrides {
                layout,
                shape,
                strides,
            } => write!(
                f,
                "Invalid view: strides {strides:?} are inconsistent with the {layout:?} layout of shape {shape:?}"
            ),
            ViewError::FractalBox { shape, expected } => write!(
                f,
                "Invalid view: fractal shape {shape:?} should end with a {}x{} box",
                expected.0, expected.1
            ),
            ViewError::OutOfBounds {
                required,
                available,
            } => write!(
                f,
                "Invalid view: {required} elements are addressed but the buffer only holds {available}"
            ),
        }
    }
}

impl std::error::Error for ViewError {}

impl Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::Misaligned { offset, alignment } => write!(
                f,
                "Unable to place tile at offset {offset}: offsets should be multiples of {alignment} bytes"
            ),
            PlacementError::OutOfBounds {
                space,
                end,
                capacity,
            } => write!(
                f,
                "Unable to place tile: it ends at byte {end} but the {space:?} area holds {capacity} bytes"
            ),
        }
    }
}

impl std::error::Error for PlacementError {}
