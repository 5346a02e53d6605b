use core::marker::PhantomData;

use tilecl_common::{Element, BLOCK_BYTES, FRACTAL_ROWS};
use tilecl_runtime::DeviceBuffer;

use crate::{
    layout::{unravel, Coords5d, GlobalLayout, GlobalLayoutKind, Nd},
    ViewError,
};

/// Strided 5-D addressing over a [DeviceBuffer].
///
/// Transfers see the view as a 2-D matrix. For [Nd] views the four outer
/// dimensions are stacked into rows and the innermost dimension gives the
/// columns. For [Dn](crate::layout::Dn) views dimension 3 gives the rows and
/// the other dimensions are stacked into columns. Fractal
/// [Nz](crate::layout::global::Nz) views of shape
/// `(batch, col_blocks, row_blocks, 16, C0)` expose
/// `batch * row_blocks * 16` rows and `col_blocks * C0` columns. Fractal
/// [Zn](crate::layout::global::Zn) views of shape
/// `(batch, row_blocks, col_blocks, 16, C0)` expose `batch * row_blocks * C0`
/// rows and `col_blocks * 16` columns.
pub struct GlobalView<E: Element, L: GlobalLayout = Nd> {
    buffer: DeviceBuffer,
    offset: usize,
    shape: Coords5d,
    strides: Coords5d,
    _phantom: PhantomData<(E, L)>,
}

impl<E: Element, L: GlobalLayout> GlobalView<E, L> {
    /// Describe the elements of `buffer` starting at element `offset`.
    pub fn new(
        buffer: DeviceBuffer,
        offset: usize,
        shape: Coords5d,
        strides: Coords5d,
    ) -> Result<Self, ViewError> {
        if let Some(dim) = shape.iter().position(|dim| *dim == 0) {
            return Err(ViewError::EmptyDimension { dim });
        }

        let c0 = BLOCK_BYTES / E::SIZE;
        let fractal = matches!(L::KIND, GlobalLayoutKind::Nz | GlobalLayoutKind::Zn);
        if fractal && (shape[3] != FRACTAL_ROWS || shape[4] != c0) {
            return Err(ViewError::FractalBox {
                shape,
                expected: (FRACTAL_ROWS, c0),
            });
        }

        let consistent = match L::KIND {
            GlobalLayoutKind::Nd => strides[4] == 1 && strides[3] >= shape[4],
            GlobalLayoutKind::Dn => strides[3] == 1 && strides[4] >= shape[3],
            GlobalLayoutKind::Nz | GlobalLayoutKind::Zn => {
                strides[4] == 1 && strides[3] == c0 && strides[2] == FRACTAL_ROWS * c0
            }
        };
        if !consistent {
            return Err(ViewError::InconsistentStrides {
                layout: L::KIND,
                shape,
                strides,
            });
        }

        let last = shape
            .iter()
            .zip(strides.iter())
            .map(|(dim, stride)| (dim - 1) * stride)
            .sum::<usize>();
        let required = offset + last + 1;
        let available = buffer.len() / E::SIZE;
        if required > available {
            return Err(ViewError::OutOfBounds {
                required,
                available,
            });
        }

        Ok(Self {
            buffer,
            offset,
            shape,
            strides,
            _phantom: PhantomData,
        })
    }

    /// Describe `buffer` as a densely packed tensor of the given shape.
    pub fn contiguous(buffer: DeviceBuffer, shape: Coords5d) -> Result<Self, ViewError> {
        let mut order = [0, 1, 2, 3, 4];
        if L::KIND == GlobalLayoutKind::Dn {
            order = [0, 1, 2, 4, 3];
        }

        let mut strides = [0; 5];
        let mut stride = 1;
        for &dim in order.iter().rev() {
            strides[dim] = stride;
            stride *= shape[dim];
        }

        Self::new(buffer, 0, shape, strides)
    }

    /// Describe `buffer` as a densely packed `rows × cols` matrix.
    ///
    /// Fractal views round the extents up to whole boxes.
    pub fn matrix(buffer: DeviceBuffer, rows: usize, cols: usize) -> Result<Self, ViewError> {
        let shape = match L::KIND {
            GlobalLayoutKind::Nd | GlobalLayoutKind::Dn => [1, 1, 1, rows, cols],
            GlobalLayoutKind::Nz => {
                let c0 = BLOCK_BYTES / E::SIZE;
                [
                    1,
                    cols.div_ceil(c0),
                    rows.div_ceil(FRACTAL_ROWS),
                    FRACTAL_ROWS,
                    c0,
                ]
            }
            GlobalLayoutKind::Zn => {
                let c0 = BLOCK_BYTES / E::SIZE;
                [
                    1,
                    rows.div_ceil(c0),
                    cols.div_ceil(FRACTAL_ROWS),
                    FRACTAL_ROWS,
                    c0,
                ]
            }
        };
        Self::contiguous(buffer, shape)
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &DeviceBuffer {
        &self.buffer
    }

    /// Offset of the first element, in elements.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Shape, outermost first.
    pub fn shape(&self) -> Coords5d {
        self.shape
    }

    /// Strides in elements, outermost first.
    pub fn strides(&self) -> Coords5d {
        self.strides
    }

    /// Storage order.
    pub fn layout(&self) -> GlobalLayoutKind {
        L::KIND
    }

    /// Number of rows of the 2-D interpretation.
    pub fn rows(&self) -> usize {
        let [s0, s1, s2, s3, s4] = self.shape;
        match L::KIND {
            GlobalLayoutKind::Nd => s0 * s1 * s2 * s3,
            GlobalLayoutKind::Dn => s3,
            GlobalLayoutKind::Nz => s0 * s2 * s3,
            GlobalLayoutKind::Zn => s0 * s1 * s4,
        }
    }

    /// Number of columns of the 2-D interpretation.
    pub fn cols(&self) -> usize {
        let [s0, s1, s2, s3, s4] = self.shape;
        match L::KIND {
            GlobalLayoutKind::Nd => s4,
            GlobalLayoutKind::Dn => s0 * s1 * s2 * s4,
            GlobalLayoutKind::Nz => s1 * s4,
            GlobalLayoutKind::Zn => s2 * s3,
        }
    }

    /// Whether the three outer dimensions are all of size 1.
    pub fn is_2d(&self) -> bool {
        match L::KIND {
            GlobalLayoutKind::Nd | GlobalLayoutKind::Dn => self.shape[..3].iter().all(|dim| *dim == 1),
            GlobalLayoutKind::Nz | GlobalLayoutKind::Zn => self.shape[0] == 1,
        }
    }

    /// Position in the buffer, in elements, of the 2-D cell `(row, col)`.
    pub fn address(&self, row: usize, col: usize) -> usize {
        let [s0, s1, s2, s3, s4] = self.shape;
        let index: Coords5d = match L::KIND {
            GlobalLayoutKind::Nd => {
                let [i0, i1, i2, i3] = unravel(row, [s0, s1, s2, s3]);
                [i0, i1, i2, i3, col]
            }
            GlobalLayoutKind::Dn => {
                let [i0, i1, i2, i4] = unravel(col, [s0, s1, s2, s4]);
                [i0, i1, i2, row, i4]
            }
            GlobalLayoutKind::Nz => {
                let [i0, i2, i3] = unravel(row, [s0, s2, s3]);
                let [i1, i4] = unravel(col, [s1, s4]);
                [i0, i1, i2, i3, i4]
            }
            GlobalLayoutKind::Zn => {
                let [i0, i1, i4] = unravel(row, [s0, s1, s4]);
                let [i2, i3] = unravel(col, [s2, s3]);
                [i0, i1, i2, i3, i4]
            }
        };

        self.offset
            + index
                .iter()
                .zip(self.strides.iter())
                .map(|(i, stride)| i * stride)
                .sum::<usize>()
    }

    /// Read the 2-D cell `(row, col)`.
    pub fn read(&self, row: usize, col: usize) -> E {
        self.buffer.read(self.address(row, col) * E::SIZE)
    }

    /// Write the 2-D cell `(row, col)`.
    pub fn write(&self, row: usize, col: usize, value: E) {
        self.buffer.write(self.address(row, col) * E::SIZE, value)
    }

    /// The first `rows × cols` cells of the 2-D interpretation, row by row.
    pub fn to_vec(&self, rows: usize, cols: usize) -> Vec<E> {
        let mut out = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                out.push(self.read(row, col));
            }
        }
        out
    }
}

impl<E: Element, L: GlobalLayout> Clone for GlobalView<E, L> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            offset: self.offset,
            shape: self.shape,
            strides: self.strides,
            _phantom: PhantomData,
        }
    }
}

impl<E: Element, L: GlobalLayout> core::fmt::Debug for GlobalView<E, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlobalView")
            .field("elem", &E::ELEM)
            .field("layout", &L::KIND)
            .field("offset", &self.offset)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .finish()
    }
}
