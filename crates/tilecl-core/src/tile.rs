use core::marker::PhantomData;

use tilecl_common::{Element, PadValue, BLOCK_BYTES};
use tilecl_runtime::{Engine, SpaceKind};

use crate::{
    layout::{RowMajor, TileLayout, TileLayoutKind},
    MemorySpace, PlacementError,
};

/// An on-chip 2-D buffer placed at a fixed offset of an engine staging area.
///
/// The physical shape `ROWS × COLS` and the layout are part of the type, the
/// valid extents and the padding policy are runtime values. Cells outside of
/// the valid region are filled with the padding value when the tile is loaded.
///
/// Invalid combinations are rejected at compile time, when the tile is bound:
///
/// - plain rows (or columns, for [ColMajor](crate::layout::ColMajor)) must be
///   made of whole 32-byte blocks;
/// - fractal shapes must be made of whole boxes;
/// - matmul operand spaces only accept their hardware layout
///   (`Left`: [Zz](crate::layout::Zz), `Right`: [Zn](crate::layout::Zn),
///   `Acc`: [Nz](crate::layout::Nz), `Bias`: a single row-major row).
///
/// ```compile_fail
/// use tilecl_core::{layout::RowMajor, space::Vector, Tile};
/// use tilecl_runtime::{config::HardwareProperties, VectorEngine};
///
/// let engine = VectorEngine::detached(HardwareProperties::default());
/// // 3 f32 columns are 12 bytes, not a whole block.
/// let tile = Tile::<Vector, f32, 8, 3, RowMajor>::bind(&engine, 0);
/// ```
///
/// ```compile_fail
/// use tilecl_core::{layout::RowMajor, space::Left, Tile};
/// use tilecl_runtime::{config::HardwareProperties, CubeEngine};
///
/// let engine = CubeEngine::detached(HardwareProperties::default());
/// // The left operand memory only holds Zz tiles.
/// let tile = Tile::<Left, f32, 16, 16, RowMajor>::bind(&engine, 0);
/// ```
///
/// ```compile_fail
/// use tilecl_core::{layout::RowMajor, space::Bias, Tile};
/// use tilecl_runtime::{config::HardwareProperties, CubeEngine};
///
/// let engine = CubeEngine::detached(HardwareProperties::default());
/// // A bias tile is a single row.
/// let tile = Tile::<Bias, f32, 2, 16, RowMajor>::bind(&engine, 0);
/// ```
///
/// ```compile_fail
/// use tilecl_core::{layout::RowMajor, space::Matrix, Tile};
/// use tilecl_runtime::{config::HardwareProperties, VectorEngine};
///
/// let engine = VectorEngine::detached(HardwareProperties::default());
/// // The matrix memory belongs to the cube engine.
/// let tile = Tile::<Matrix, f32, 16, 16, RowMajor>::bind(&engine, 0);
/// ```
pub struct Tile<
    S: MemorySpace,
    E: Element,
    const ROWS: usize,
    const COLS: usize,
    L: TileLayout = RowMajor,
> {
    offset: usize,
    valid_rows: usize,
    valid_cols: usize,
    pad: PadValue,
    _phantom: PhantomData<(S, E, L)>,
}

const fn layout_allowed(space: SpaceKind, layout: TileLayoutKind, rows: usize) -> bool {
    match space {
        SpaceKind::Left => matches!(layout, TileLayoutKind::Zz),
        SpaceKind::Right => matches!(layout, TileLayoutKind::Zn),
        SpaceKind::Acc => matches!(layout, TileLayoutKind::Nz),
        SpaceKind::Bias => matches!(layout, TileLayoutKind::RowMajor) && rows == 1,
        SpaceKind::Vector | SpaceKind::Matrix => true,
    }
}

impl<S: MemorySpace, E: Element, const ROWS: usize, const COLS: usize, L: TileLayout>
    Tile<S, E, ROWS, COLS, L>
{
    const CHECK: () = {
        assert!(ROWS > 0 && COLS > 0, "A tile needs at least one row and one column");
        assert!(
            L::KIND.is_aligned(ROWS, COLS, E::SIZE),
            "Tile shape is not aligned to the blocks of its layout"
        );
        assert!(
            layout_allowed(S::KIND, L::KIND, ROWS),
            "Tile layout is not supported by its memory space"
        );
    };

    /// Size of the tile in its staging area.
    pub const BYTES: usize = ROWS * COLS * E::SIZE;

    /// Place a tile at `offset` bytes inside the staging area of `engine`.
    ///
    /// The tile starts fully valid and without padding. Overlap with other
    /// tiles is not checked.
    pub fn bind(engine: &S::Engine, offset: usize) -> Result<Self, PlacementError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::CHECK;

        if offset % BLOCK_BYTES != 0 {
            return Err(PlacementError::Misaligned {
                offset,
                alignment: BLOCK_BYTES,
            });
        }

        let end = offset + Self::BYTES;
        let capacity = engine.area(S::KIND).capacity();
        if end > capacity {
            return Err(PlacementError::OutOfBounds {
                space: S::KIND,
                end,
                capacity,
            });
        }

        Ok(Self {
            offset,
            valid_rows: ROWS,
            valid_cols: COLS,
            pad: PadValue::Null,
            _phantom: PhantomData,
        })
    }

    /// Restrict the valid region to the first `rows × cols` cells.
    ///
    /// # Panics
    /// If the valid region exceeds the physical shape.
    pub fn with_valid(mut self, rows: usize, cols: usize) -> Self {
        assert!(
            rows <= ROWS && cols <= COLS,
            "Valid region {rows}x{cols} exceeds the physical tile {ROWS}x{COLS}"
        );
        self.valid_rows = rows;
        self.valid_cols = cols;
        self
    }

    /// Set the value written to cells outside of the valid region on load.
    pub fn with_pad(mut self, pad: PadValue) -> Self {
        self.pad = pad;
        self
    }

    /// Offset of the tile in its staging area, in bytes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of valid rows.
    pub fn valid_rows(&self) -> usize {
        self.valid_rows
    }

    /// Number of valid columns.
    pub fn valid_cols(&self) -> usize {
        self.valid_cols
    }

    /// Padding policy.
    pub fn pad(&self) -> PadValue {
        self.pad
    }

    /// Storage order.
    pub fn layout(&self) -> TileLayoutKind {
        L::KIND
    }

    /// Staging area the tile lives in.
    pub fn space(&self) -> SpaceKind {
        S::KIND
    }

    /// Position of the cell `(row, col)` in the staging area, in bytes.
    pub fn byte_offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < ROWS && col < COLS, "Cell ({row}, {col}) is outside of the tile");
        self.offset + L::KIND.offset(ROWS, COLS, E::SIZE, row, col) * E::SIZE
    }

    /// Read the cell `(row, col)`.
    pub fn read(&self, engine: &S::Engine, row: usize, col: usize) -> E {
        engine.area(S::KIND).read(self.byte_offset(row, col))
    }

    /// Write the cell `(row, col)`.
    pub fn write(&self, engine: &mut S::Engine, row: usize, col: usize, value: E) {
        let offset = self.byte_offset(row, col);
        engine.area_mut(S::KIND).write(offset, value);
    }

    /// The valid region, row by row.
    pub fn to_vec(&self, engine: &S::Engine) -> Vec<E> {
        let area = engine.area(S::KIND);
        let mut out = Vec::with_capacity(self.valid_rows * self.valid_cols);
        for row in 0..self.valid_rows {
            for col in 0..self.valid_cols {
                out.push(area.read(self.byte_offset(row, col)));
            }
        }
        out
    }

    /// Overwrite the valid region with `values`, given row by row.
    ///
    /// # Panics
    /// If `values` doesn't hold exactly one value per valid cell.
    pub fn write_slice(&self, engine: &mut S::Engine, values: &[E]) {
        assert_eq!(
            values.len(),
            self.valid_rows * self.valid_cols,
            "Expected one value per valid cell"
        );
        let area = engine.area_mut(S::KIND);
        for (index, value) in values.iter().enumerate() {
            let (row, col) = (index / self.valid_cols, index % self.valid_cols);
            area.write(self.byte_offset(row, col), *value);
        }
    }
}

impl<S: MemorySpace, E: Element, const ROWS: usize, const COLS: usize, L: TileLayout> Clone
    for Tile<S, E, ROWS, COLS, L>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: MemorySpace, E: Element, const ROWS: usize, const COLS: usize, L: TileLayout> Copy
    for Tile<S, E, ROWS, COLS, L>
{
}

impl<S: MemorySpace, E: Element, const ROWS: usize, const COLS: usize, L: TileLayout>
    core::fmt::Debug for Tile<S, E, ROWS, COLS, L>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tile")
            .field("space", &S::KIND)
            .field("elem", &E::ELEM)
            .field("shape", &(ROWS, COLS))
            .field("layout", &L::KIND)
            .field("offset", &self.offset)
            .field("valid", &(self.valid_rows, self.valid_cols))
            .field("pad", &self.pad)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::{ColMajor, Nz},
        space::{Acc, Vector},
    };
    use tilecl_runtime::{config::HardwareProperties, CubeEngine, VectorEngine};

    #[test]
    fn bind_checks_alignment_and_capacity() {
        let engine = VectorEngine::detached(HardwareProperties::default());
        let capacity = engine.area(SpaceKind::Vector).capacity();

        assert!(matches!(
            Tile::<Vector, f32, 8, 8>::bind(&engine, 16),
            Err(PlacementError::Misaligned { offset: 16, .. })
        ));
        assert!(matches!(
            Tile::<Vector, f32, 8, 8>::bind(&engine, capacity - 128),
            Err(PlacementError::OutOfBounds { end, .. }) if end == capacity + 128
        ));
        assert!(Tile::<Vector, f32, 8, 8>::bind(&engine, capacity - 256).is_ok());
    }

    #[test]
    fn cells_follow_the_layout() {
        let mut engine = VectorEngine::detached(HardwareProperties::default());
        let tile = Tile::<Vector, u16, 16, 4, ColMajor>::bind(&engine, 64).unwrap();

        tile.write(&mut engine, 1, 2, 7);
        assert_eq!(engine.area(SpaceKind::Vector).read::<u16>(64 + (2 * 16 + 1) * 2), 7);
        assert_eq!(tile.read(&engine, 1, 2), 7);
    }

    #[test]
    fn valid_region_round_trip() {
        let mut engine = CubeEngine::detached(HardwareProperties::default());
        let tile = Tile::<Acc, f32, 16, 16, Nz>::bind(&engine, 0)
            .unwrap()
            .with_valid(3, 5);
        let values = (0..15).map(|v| v as f32).collect::<Vec<_>>();

        tile.write_slice(&mut engine, &values);
        assert_eq!(tile.to_vec(&engine), values);
        assert_eq!(tile.read(&engine, 2, 4), 14.0);
    }

    #[test]
    #[should_panic(expected = "exceeds the physical tile")]
    fn valid_region_is_bounded() {
        let engine = VectorEngine::detached(HardwareProperties::default());
        let _ = Tile::<Vector, f32, 8, 8>::bind(&engine, 0)
            .unwrap()
            .with_valid(9, 1);
    }
}
