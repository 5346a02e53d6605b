/// A position or an extent in a 2-D tile, as `(row, col)`.
pub type Coords2d = (usize, usize);

/// Shape or strides of a global memory view, outermost dimension first.
pub type Coords5d = [usize; 5];

/// Split a linear `index` into one index per dimension of `dims`, row-major.
pub fn unravel<const N: usize>(mut index: usize, dims: [usize; N]) -> [usize; N] {
    let mut out = [0; N];
    for axis in (0..N).rev() {
        out[axis] = index % dims[axis];
        index /= dims[axis];
    }
    out
}

/// Number of elements addressed by a shape.
pub fn num_elements(shape: &Coords5d) -> usize {
    shape.iter().product()
}
