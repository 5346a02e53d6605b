use std::sync::Arc;

use tilecl_common::Element;

/// Where a [DeviceBuffer] physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Off-chip global memory, visible to every engine.
    Global,
    /// The shared on-chip staging region both engine types can address.
    OnChip,
}

/// A buffer visible to every engine of a launch.
///
/// Cloning the buffer clones the handle, not the data. Accesses are serialized
/// by a lock; ordering between engines is the job of the sync protocol.
#[derive(Clone)]
pub struct DeviceBuffer {
    data: Arc<spin::Mutex<Vec<u8>>>,
    kind: BufferKind,
    len: usize,
}

impl core::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("kind", &self.kind)
            .field("len", &self.len)
            .finish()
    }
}

impl DeviceBuffer {
    /// Allocate a zeroed global memory buffer of `len` bytes.
    pub fn zeros(len: usize) -> Self {
        Self::with_kind(vec![0; len], BufferKind::Global)
    }

    /// Allocate a zeroed shared on-chip buffer of `len` bytes.
    pub fn on_chip(len: usize) -> Self {
        Self::with_kind(vec![0; len], BufferKind::OnChip)
    }

    /// Allocate a global memory buffer holding the given elements.
    pub fn from_slice<E: Element>(data: &[E]) -> Self {
        Self::with_kind(bytemuck::cast_slice(data).to_vec(), BufferKind::Global)
    }

    fn with_kind(bytes: Vec<u8>, kind: BufferKind) -> Self {
        Self {
            len: bytes.len(),
            data: Arc::new(spin::Mutex::new(bytes)),
            kind,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Where the buffer lives.
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Read the whole buffer as elements of type `E`.
    pub fn to_vec<E: Element>(&self) -> Vec<E> {
        let data = self.data.lock();
        bytemuck::pod_collect_to_vec(data.as_slice())
    }

    /// Read one element at the given byte offset.
    pub fn read<E: Element>(&self, offset: usize) -> E {
        bytemuck::pod_read_unaligned(&self.data.lock()[offset..offset + E::SIZE])
    }

    /// Write one element at the given byte offset.
    pub fn write<E: Element>(&self, offset: usize, value: E) {
        self.data.lock()[offset..offset + E::SIZE].copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Run `func` with shared access to the raw bytes.
    pub fn with_bytes<R>(&self, func: impl FnOnce(&[u8]) -> R) -> R {
        func(&self.data.lock())
    }

    /// Run `func` with exclusive access to the raw bytes.
    pub fn with_bytes_mut<R>(&self, func: impl FnOnce(&mut [u8]) -> R) -> R {
        func(&mut self.data.lock())
    }
}
