/// Buffer kinds, access capabilities, buffer descriptor and the untyped
/// backend memory trait

use bitflags::bitflags;
use crate::error::Result;

bitflags! {
    /// CPU access permissions implied by a buffer kind
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The CPU may read the mapped memory
        const READABLE = 0b01;
        /// The CPU may write the mapped memory
        const WRITABLE = 0b10;
    }
}

/// Declared kind of a buffer
///
/// The kind fixes both the CPU access capabilities and the number of
/// physical slots backing the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Immutable, uploaded once at creation, never mapped
    Static,
    /// GPU writes, CPU reads
    ReadOnly,
    /// CPU writes, GPU reads
    WriteOnly,
    /// CPU reads and writes
    ReadWrite,
    /// WriteOnly, double buffered
    WriteOnlyDouble,
    /// WriteOnly, triple buffered
    WriteOnlyTriple,
    /// ReadWrite, double buffered
    ReadWriteDouble,
    /// ReadWrite, triple buffered
    ReadWriteTriple,
}

impl BufferKind {
    /// Every buffer kind, in declaration order
    pub const ALL: [BufferKind; 8] = [
        BufferKind::Static,
        BufferKind::ReadOnly,
        BufferKind::WriteOnly,
        BufferKind::ReadWrite,
        BufferKind::WriteOnlyDouble,
        BufferKind::WriteOnlyTriple,
        BufferKind::ReadWriteDouble,
        BufferKind::ReadWriteTriple,
    ];

    /// Number of physical backing slots (1, 2 or 3)
    pub fn slot_count(&self) -> usize {
        match self {
            BufferKind::Static
            | BufferKind::ReadOnly
            | BufferKind::WriteOnly
            | BufferKind::ReadWrite => 1,
            BufferKind::WriteOnlyDouble | BufferKind::ReadWriteDouble => 2,
            BufferKind::WriteOnlyTriple | BufferKind::ReadWriteTriple => 3,
        }
    }

    /// CPU access capabilities
    pub fn capabilities(&self) -> Capabilities {
        match self {
            BufferKind::Static => Capabilities::empty(),
            BufferKind::ReadOnly => Capabilities::READABLE,
            BufferKind::WriteOnly
            | BufferKind::WriteOnlyDouble
            | BufferKind::WriteOnlyTriple => Capabilities::WRITABLE,
            BufferKind::ReadWrite
            | BufferKind::ReadWriteDouble
            | BufferKind::ReadWriteTriple => Capabilities::READABLE | Capabilities::WRITABLE,
        }
    }

    /// True when the CPU may read the buffer
    pub fn is_readable(&self) -> bool {
        self.capabilities().contains(Capabilities::READABLE)
    }

    /// True when the CPU may write the buffer
    pub fn is_writable(&self) -> bool {
        self.capabilities().contains(Capabilities::WRITABLE)
    }

    /// True for the double and triple buffered kinds
    pub fn is_multi_buffered(&self) -> bool {
        self.slot_count() > 1
    }

    /// True when the buffer needs a persistent CPU mapping
    pub fn is_mapped(&self) -> bool {
        !self.capabilities().is_empty()
    }
}

/// Buffer usage, selects the binding target on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
    /// Uniform/constant buffer
    Uniform,
    /// Storage buffer
    Storage,
    /// Pixel source for texture uploads
    PixelUnpack,
}

/// Descriptor for creating backend buffer memory
#[derive(Debug, Clone)]
pub struct BufferDesc<'a> {
    /// Debug name
    pub name: &'a str,
    /// Size of ONE slot in bytes
    pub size: u64,
    /// Buffer kind (capabilities and slot count)
    pub kind: BufferKind,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Optional initial contents, replicated into every slot
    pub initial_data: Option<&'a [u8]>,
}

impl BufferDesc<'_> {
    /// Total allocation size covering every slot
    pub fn total_size(&self) -> u64 {
        self.size * self.kind.slot_count() as u64
    }
}

/// Untyped GPU buffer memory
///
/// Implemented by backend-specific buffers (e.g., OpenGL persistent-mapped
/// buffers). A single allocation spans every slot contiguously; offsets are
/// absolute byte offsets into that allocation. The memory is released when
/// dropped.
pub trait BufferMemory {
    /// Native resource identity (e.g., the GL buffer name)
    fn id(&self) -> u64;

    /// Total size in bytes across all slots
    fn size(&self) -> u64;

    /// Copy `data` into the mapped memory at `offset`
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()>;

    /// Copy mapped memory at `offset` into `out`
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()>;
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
