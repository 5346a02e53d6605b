use core::fmt::Debug;

use tilecl_common::{BLOCK_BYTES, FRACTAL_ROWS};

use super::Coords2d;

/// Storage order of a tile inside its staging area.
///
/// Fractal orders group elements into boxes of `16 × C0` (or `C0 × 16`)
/// elements, where `C0 = 32 / size_of(E)` so that a box row fills exactly one
/// 32-byte block.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum TileLayoutKind {
    /// Rows are contiguous.
    RowMajor,
    /// Columns are contiguous.
    ColMajor,
    /// Column-major order of row-major `16 × C0` boxes.
    Nz,
    /// Row-major order of column-major `C0 × 16` boxes.
    Zn,
    /// Row-major order of row-major `16 × C0` boxes.
    Zz,
}

impl TileLayoutKind {
    /// Whether elements are grouped in boxes.
    pub const fn is_fractal(self) -> bool {
        matches!(self, Self::Nz | Self::Zn | Self::Zz)
    }

    /// Shape `(rows, cols)` of a box, `(1, 1)` for plain layouts.
    pub const fn box_shape(self, elem_size: usize) -> Coords2d {
        let c0 = BLOCK_BYTES / elem_size;
        match self {
            Self::RowMajor | Self::ColMajor => (1, 1),
            Self::Nz | Self::Zz => (FRACTAL_ROWS, c0),
            Self::Zn => (c0, FRACTAL_ROWS),
        }
    }

    /// Whether a `rows × cols` tile of `elem_size` byte elements can use this layout.
    ///
    /// Plain layouts need their contiguous lines to be made of whole blocks,
    /// fractal layouts need whole boxes.
    pub const fn is_aligned(self, rows: usize, cols: usize, elem_size: usize) -> bool {
        match self {
            Self::RowMajor => (cols * elem_size) % BLOCK_BYTES == 0,
            Self::ColMajor => (rows * elem_size) % BLOCK_BYTES == 0,
            Self::Nz | Self::Zn | Self::Zz => {
                let (box_rows, box_cols) = self.box_shape(elem_size);
                rows % box_rows == 0 && cols % box_cols == 0
            }
        }
    }

    /// Position, in elements, of `(row, col)` inside a `rows × cols` tile.
    pub const fn offset(self, rows: usize, cols: usize, elem_size: usize, row: usize, col: usize) -> usize {
        let (box_rows, box_cols) = self.box_shape(elem_size);
        match self {
            Self::RowMajor => row * cols + col,
            Self::ColMajor => col * rows + row,
            Self::Nz => {
                (col / box_cols) * (rows * box_cols)
                    + (row / box_rows) * (box_rows * box_cols)
                    + (row % box_rows) * box_cols
                    + col % box_cols
            }
            Self::Zn => {
                (row / box_rows) * (cols * box_rows)
                    + (col / box_cols) * (box_rows * box_cols)
                    + (col % box_cols) * box_rows
                    + row % box_rows
            }
            Self::Zz => {
                (row / box_rows) * (box_rows * cols)
                    + (col / box_cols) * (box_rows * box_cols)
                    + (row % box_rows) * box_cols
                    + col % box_cols
            }
        }
    }
}

/// Type level storage order of a tile.
pub trait TileLayout: 'static + Send + Sync + Clone + Copy + Debug {
    /// The layout as a value.
    const KIND: TileLayoutKind;
}

/// Rows stored one after the other.
///
/// ```text
/// ┌───┬───┬───┐
/// │ 0 │ 1 │ 2 │
/// ├───┼───┼───┤
/// │ 3 │ 4 │ 5 │
/// └───┴───┴───┘
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RowMajor;

/// Columns stored one after the other.
///
/// ```text
/// ┌───┬───┬───┐
/// │ 0 │ 2 │ 4 │
/// ├───┼───┼───┤
/// │ 1 │ 3 │ 5 │
/// └───┴───┴───┘
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ColMajor;

/// Boxes of `16 × C0` elements, each row-major, stacked down the columns.
///
/// Box indices:
///
/// ```text
/// ┌───┬───┐
/// │ 0 │ 2 │
/// ├───┼───┤
/// │ 1 │ 3 │
/// └───┴───┘
/// ```
///
/// Used by accumulator tiles and by the fractal global memory layout.
#[derive(Clone, Copy, Debug)]
pub struct Nz;

/// Boxes of `C0 × 16` elements, each column-major, placed along the rows.
///
/// Box indices:
///
/// ```text
/// ┌───┬───┐
/// │ 0 │ 1 │
/// ├───┼───┤
/// │ 2 │ 3 │
/// └───┴───┘
/// ```
///
/// Used by right operand tiles.
#[derive(Clone, Copy, Debug)]
pub struct Zn;

/// Boxes of `16 × C0` elements, each row-major, placed along the rows.
///
/// Used by left operand tiles.
#[derive(Clone, Copy, Debug)]
pub struct Zz;

/// Layouts without boxes, where every row and every column is evenly strided.
pub trait PlainLayout: TileLayout {
    /// Distance, in elements, between two vertically adjacent cells.
    fn row_pitch(rows: usize, cols: usize) -> usize;
    /// Distance, in elements, between two horizontally adjacent cells.
    fn col_pitch(rows: usize, cols: usize) -> usize;
}

impl PlainLayout for RowMajor {
    fn row_pitch(_rows: usize, cols: usize) -> usize {
        cols
    }

    fn col_pitch(_rows: usize, _cols: usize) -> usize {
        1
    }
}

impl PlainLayout for ColMajor {
    fn row_pitch(_rows: usize, _cols: usize) -> usize {
        1
    }

    fn col_pitch(rows: usize, _cols: usize) -> usize {
        rows
    }
}

impl TileLayout for RowMajor {
    const KIND: TileLayoutKind = TileLayoutKind::RowMajor;
}

impl TileLayout for ColMajor {
    const KIND: TileLayoutKind = TileLayoutKind::ColMajor;
}

impl TileLayout for Nz {
    const KIND: TileLayoutKind = TileLayoutKind::Nz;
}

impl TileLayout for Zn {
    const KIND: TileLayoutKind = TileLayoutKind::Zn;
}

impl TileLayout for Zz {
    const KIND: TileLayoutKind = TileLayoutKind::Zz;
}
