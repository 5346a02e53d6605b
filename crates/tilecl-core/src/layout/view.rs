use core::fmt::Debug;

/// Storage order of a global memory view.
///
/// Scale-factor layouts have no variant. Views over quantization scales are
/// described as [Nd](GlobalLayoutKind::Nd) and no transfer treats them specially.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum GlobalLayoutKind {
    /// Row-major: the innermost dimension is contiguous.
    Nd,
    /// Transposed: the second innermost dimension is contiguous.
    Dn,
    /// Fractal boxes of `16 × C0` elements, stored as `(batch, col_blocks, row_blocks, 16, C0)`.
    Nz,
    /// Fractal boxes of `C0 × 16` elements, stored as `(batch, row_blocks, col_blocks, 16, C0)`.
    Zn,
}

/// Type level storage order of a global memory view.
pub trait GlobalLayout: 'static + Send + Sync + Clone + Copy + Debug {
    /// The layout as a value.
    const KIND: GlobalLayoutKind;
}

/// Row-major global layout.
#[derive(Clone, Copy, Debug)]
pub struct Nd;

/// Transposed global layout.
#[derive(Clone, Copy, Debug)]
pub struct Dn;

/// Fractal global layouts.
pub mod global {
    use super::{GlobalLayout, GlobalLayoutKind};

    /// Fractal global layout, made of row-major `16 × C0` boxes stacked down the columns.
    #[derive(Clone, Copy, Debug)]
    pub struct Nz;

    impl GlobalLayout for Nz {
        const KIND: GlobalLayoutKind = GlobalLayoutKind::Nz;
    }

    /// Fractal global layout, made of column-major `C0 × 16` boxes laid out along the rows.
    #[derive(Clone, Copy, Debug)]
    pub struct Zn;

    impl GlobalLayout for Zn {
        const KIND: GlobalLayoutKind = GlobalLayoutKind::Zn;
    }
}

impl GlobalLayout for Nd {
    const KIND: GlobalLayoutKind = GlobalLayoutKind::Nd;
}

impl GlobalLayout for Dn {
    const KIND: GlobalLayoutKind = GlobalLayoutKind::Dn;
}
