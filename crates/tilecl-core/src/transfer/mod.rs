mod burst;
mod fractal;
mod pad;
mod plain;

pub use burst::*;

use tilecl_common::Element;
use tilecl_runtime::{Engine, Instruction};

use crate::{
    layout::{global, ColMajor, Dn, GlobalLayout, Nd, Nz, RowMajor, TileLayout, Zn, Zz},
    GlobalView, Loadable, Storable, Tile,
};

/// Address mapping used to move elements between a view and a tile.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum TransferPath {
    /// Rows are contiguous on both sides.
    RowMajor,
    /// Columns are contiguous on both sides.
    ColMajor,
    /// Plain layouts with opposite contiguous dimensions.
    Transpose,
    /// Plain view, fractal tile. Only defined for 2-D views.
    Fractal,
    /// Fractal view, fractal tile with the same boxes.
    FractalBlock,
}

/// Pairs of global layout and tile layout that can be converted into each other.
///
/// ```compile_fail
/// use tilecl_core::{layout::{global, RowMajor}, space::Vector, load, GlobalView, Tile};
/// use tilecl_runtime::{config::HardwareProperties, DeviceBuffer, VectorEngine};
///
/// let mut engine = VectorEngine::detached(HardwareProperties::default());
/// let view = GlobalView::<f32, global::Nz>::matrix(DeviceBuffer::zeros(16 * 8 * 4), 16, 8).unwrap();
/// let tile = Tile::<Vector, f32, 16, 8, RowMajor>::bind(&engine, 0).unwrap();
/// // Fractal views only convert to fractal tiles.
/// load(&mut engine, &tile, &view);
/// ```
pub trait TransferPair<G: GlobalLayout>: TileLayout {
    /// The address mapping of the pair.
    const PATH: TransferPath;
}

macro_rules! transfer_pair {
    ($global:ty => $($tile:ty),* : $path:ident) => {
        $(
            impl TransferPair<$global> for $tile {
                const PATH: TransferPath = TransferPath::$path;
            }
        )*
    };
}

transfer_pair!(Nd => RowMajor : RowMajor);
transfer_pair!(Nd => ColMajor : Transpose);
transfer_pair!(Dn => ColMajor : ColMajor);
transfer_pair!(Dn => RowMajor : Transpose);
transfer_pair!(Nd => Nz, Zn, Zz : Fractal);
transfer_pair!(Dn => Nz, Zn, Zz : Fractal);
transfer_pair!(global::Nz => Nz : FractalBlock);
transfer_pair!(global::Zn => Zn : FractalBlock);

/// Direction of a transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Way {
    Load,
    Store,
}

impl Way {
    /// Copy `len` bytes between global memory and a staging area.
    fn copy(self, global: &mut [u8], global_at: usize, staging: &mut [u8], staging_at: usize, len: usize) {
        match self {
            Way::Load => staging[staging_at..staging_at + len]
                .copy_from_slice(&global[global_at..global_at + len]),
            Way::Store => global[global_at..global_at + len]
                .copy_from_slice(&staging[staging_at..staging_at + len]),
        }
    }
}

/// Copy the valid region of `dst` from `src`, then pad the rest of `dst`.
///
/// The valid cell `(row, col)` of the tile receives the cell `(row, col)` of
/// the 2-D interpretation of the view. Nothing happens when the valid region
/// is empty.
///
/// # Panics
/// If the view doesn't cover the valid region, or if a fractal conversion is
/// requested from a view with non-unit outer dimensions.
pub fn load<S, E, const ROWS: usize, const COLS: usize, L, G>(
    engine: &mut S::Engine,
    dst: &Tile<S, E, ROWS, COLS, L>,
    src: &GlobalView<E, G>,
) where
    S: Loadable,
    E: Element,
    L: TransferPair<G>,
    G: GlobalLayout,
{
    if dst.valid_rows() == 0 || dst.valid_cols() == 0 {
        return;
    }
    check_extents(src, dst.valid_rows(), dst.valid_cols(), L::PATH);
    log::debug!("Load {:?} -> {:?} via {:?}", G::KIND, L::KIND, L::PATH);

    let area = engine.area_mut(S::KIND);
    let issued = src.buffer().with_bytes_mut(|global| {
        let staging = area.bytes_mut();
        match L::PATH {
            TransferPath::RowMajor | TransferPath::ColMajor => {
                plain::lines(Way::Load, global, staging, src, dst, L::PATH)
            }
            TransferPath::Transpose | TransferPath::Fractal => {
                plain::elements(Way::Load, global, staging, src, dst)
            }
            TransferPath::FractalBlock => fractal::blocks(Way::Load, global, staging, src, dst),
        }
    });
    engine.trace_mut().issue(issued.0, issued.1);

    if pad::fill(engine.area_mut(S::KIND), dst) {
        engine.trace_mut().issue(Instruction::VDup, 1);
    }
}

/// Copy the valid region of `src` into `dst`. Padding cells are never written.
///
/// Row-major tiles are stored to [Nd] views with burst descriptors, falling
/// back to one copy per row when a descriptor field would overflow.
///
/// # Panics
/// Under the same conditions as [load].
pub fn store<S, E, const ROWS: usize, const COLS: usize, L, G>(
    engine: &mut S::Engine,
    dst: &GlobalView<E, G>,
    src: &Tile<S, E, ROWS, COLS, L>,
) where
    S: Storable,
    E: Element,
    L: TransferPair<G>,
    G: GlobalLayout,
{
    if src.valid_rows() == 0 || src.valid_cols() == 0 {
        return;
    }
    check_extents(dst, src.valid_rows(), src.valid_cols(), L::PATH);
    log::debug!("Store {:?} -> {:?} via {:?}", L::KIND, G::KIND, L::PATH);

    let properties = engine.properties().clone();
    let area = engine.area_mut(S::KIND);
    let issued = dst.buffer().with_bytes_mut(|global| {
        let staging = area.bytes_mut();
        match L::PATH {
            TransferPath::RowMajor => burst::store_rows(global, staging, dst, src, &properties),
            TransferPath::ColMajor => {
                vec![plain::lines(Way::Store, global, staging, dst, src, L::PATH)]
            }
            TransferPath::Transpose | TransferPath::Fractal => {
                vec![plain::elements(Way::Store, global, staging, dst, src)]
            }
            TransferPath::FractalBlock => {
                vec![fractal::blocks(Way::Store, global, staging, dst, src)]
            }
        }
    });

    for (instruction, count) in issued {
        engine.trace_mut().issue(instruction, count);
    }
}

fn check_extents<E: Element, G: GlobalLayout>(
    view: &GlobalView<E, G>,
    rows: usize,
    cols: usize,
    path: TransferPath,
) {
    assert!(
        rows <= view.rows() && cols <= view.cols(),
        "Valid region {rows}x{cols} exceeds the {}x{} view",
        view.rows(),
        view.cols()
    );
    if path == TransferPath::Fractal {
        assert!(
            view.is_2d(),
            "Fractal conversion needs unit outer dimensions, got shape {:?}",
            view.shape()
        );
    }
}
