use tilecl_common::Element;
use tilecl_runtime::{config::HardwareProperties, Instruction};

use super::Way;
use crate::{
    layout::{GlobalLayout, TileLayout},
    GlobalView, MemorySpace, Tile,
};

/// A strided bulk copy: `count` bursts of `len` bytes, skipping `src_gap`
/// bytes on the source and `dst_gap` bytes on the destination between bursts.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstDescriptor {
    /// Number of bursts.
    pub count: usize,
    /// Bytes per burst.
    pub len: usize,
    /// Bytes skipped on the source after each burst.
    pub src_gap: usize,
    /// Bytes skipped on the destination after each burst.
    pub dst_gap: usize,
}

impl BurstDescriptor {
    /// Whether every field fits in its descriptor bit width.
    pub fn fits(&self, properties: &HardwareProperties) -> bool {
        self.count <= properties.max_burst_count()
            && self.len <= properties.max_burst_len()
            && self.src_gap <= properties.max_burst_gap()
            && self.dst_gap <= properties.max_burst_gap()
    }

    fn run(&self, src: &[u8], src_at: usize, dst: &mut [u8], dst_at: usize) {
        for burst in 0..self.count {
            let from = src_at + burst * (self.len + self.src_gap);
            let to = dst_at + burst * (self.len + self.dst_gap);
            dst[to..to + self.len].copy_from_slice(&src[from..from + self.len]);
        }
    }
}

/// Rows of a view that are evenly spaced, starting from any multiple of the result.
///
/// Every stacked dimension of more than one element must step by the pitch of
/// the rows already in the run. Unit dimensions are never stepped over.
fn uniform_rows(shape: [usize; 5], strides: [usize; 5]) -> usize {
    let pitch = strides[3];
    let mut rows = shape[3];
    for dim in (0..3).rev() {
        if shape[dim] == 1 {
            continue;
        }
        if strides[dim] != rows * pitch {
            break;
        }
        rows *= shape[dim];
    }
    rows
}

/// Store the valid rows of a row-major tile, one descriptor per evenly spaced run of rows.
pub(super) fn store_rows<S, E, const ROWS: usize, const COLS: usize, L, G>(
    global: &mut [u8],
    staging: &mut [u8],
    view: &GlobalView<E, G>,
    tile: &Tile<S, E, ROWS, COLS, L>,
    properties: &HardwareProperties,
) -> Vec<(Instruction, u64)>
where
    S: MemorySpace,
    E: Element,
    L: TileLayout,
    G: GlobalLayout,
{
    let rows = tile.valid_rows();
    let cols = tile.valid_cols();
    let run = uniform_rows(view.shape(), view.strides());
    let len = cols * E::SIZE;
    let src_gap = (COLS - cols) * E::SIZE;
    let dst_gap = (view.strides()[3] - cols) * E::SIZE;

    let mut bursts = 0;
    let mut lines = 0;
    let mut row = 0;
    while row < rows {
        let count = run.min(rows - row);
        let descriptor = BurstDescriptor::new(count, len, src_gap, dst_gap);
        let src_at = tile.byte_offset(row, 0);
        let dst_at = view.address(row, 0) * E::SIZE;

        if descriptor.fits(properties) {
            descriptor.run(staging, src_at, global, dst_at);
            bursts += 1;
        } else {
            if lines == 0 {
                log::warn!("Burst descriptor {descriptor:?} overflows its fields, storing row by row");
            }
            for line in row..row + count {
                Way::Store.copy(
                    global,
                    view.address(line, 0) * E::SIZE,
                    staging,
                    tile.byte_offset(line, 0),
                    len,
                );
            }
            lines += count as u64;
        }
        row += count;
    }

    vec![(Instruction::BurstCopy, bursts), (Instruction::LineCopy, lines)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_limits() {
        let properties = HardwareProperties::default();
        assert!(BurstDescriptor::new(4095, 256, 0, 65535).fits(&properties));
        assert!(!BurstDescriptor::new(4096, 256, 0, 0).fits(&properties));
        assert!(!BurstDescriptor::new(1, 256, 65536, 0).fits(&properties));
    }

    #[test]
    fn packed_outer_dims_merge_into_one_run() {
        assert_eq!(uniform_rows([1, 2, 3, 4, 8], [192, 96, 32, 8, 1]), 24);
        // Dimension 2 is padded, runs stop at dimension 3.
        assert_eq!(uniform_rows([1, 1, 3, 4, 8], [128, 128, 40, 8, 1]), 4);
        // A unit dimension with a padded stride doesn't hide the gap below it.
        assert_eq!(uniform_rows([1, 2, 1, 4, 8], [80, 40, 40, 8, 1]), 4);
        assert_eq!(uniform_rows([1, 2, 1, 4, 8], [80, 32, 40, 8, 1]), 8);
    }

    #[test]
    fn bursts_skip_gaps() {
        let src = (0..16u8).collect::<Vec<_>>();
        let mut dst = vec![0u8; 12];
        BurstDescriptor::new(2, 3, 5, 2).run(&src, 1, &mut dst, 0);
        assert_eq!(dst, vec![1, 2, 3, 0, 0, 9, 10, 11, 0, 0, 0, 0]);
    }
}
