use tilecl_common::Element;

use crate::SpaceKind;

/// An engine-private on-chip staging memory.
///
/// Staging areas are byte addressed and zero initialised. Placement of tiles
/// inside an area is the caller's responsibility: overlapping live tiles are
/// never detected.
#[derive(Clone)]
pub struct StagingArea {
    space: SpaceKind,
    bytes: Vec<u8>,
}

impl core::fmt::Debug for StagingArea {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StagingArea")
            .field("space", &self.space)
            .field("capacity", &self.bytes.len())
            .finish()
    }
}

impl StagingArea {
    /// Create a zeroed staging area.
    pub fn new(space: SpaceKind, capacity: usize) -> Self {
        Self {
            space,
            bytes: vec![0; capacity],
        }
    }

    /// The memory space this area implements.
    pub fn space(&self) -> SpaceKind {
        self.space
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Read one element at the given byte offset.
    pub fn read<E: Element>(&self, offset: usize) -> E {
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + E::SIZE])
    }

    /// Write one element at the given byte offset.
    pub fn write<E: Element>(&mut self, offset: usize, value: E) {
        self.bytes[offset..offset + E::SIZE].copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Raw bytes of the area.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw bytes of the area.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unaligned_element_access() {
        let mut area = StagingArea::new(SpaceKind::Vector, 64);
        area.write(3, 1.5f32);
        area.write(9, -7i16);

        assert_eq!(area.read::<f32>(3), 1.5);
        assert_eq!(area.read::<i16>(9), -7);
        assert_eq!(area.read::<u8>(0), 0);
        assert_eq!(area.capacity(), 64);
    }
}
