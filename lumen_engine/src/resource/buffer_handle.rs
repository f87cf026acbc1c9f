/// Untyped buffer identity and checked byte access.
///
/// A `BufferHandle` is what client code holds for one logical buffer: it
/// exposes a single mutable region of `byte_size` bytes while the engine
/// cycles among the 1 to 3 physical slots of its backing store. Every CPU
/// access is checked against the kind's capabilities and the fixed capacity
/// before anything touches memory, so a rejected access never mutates the
/// buffer.

use crate::context::RenderContext;
use crate::error::{Access, Error, Result};
use crate::renderer::{BufferDesc, BufferKind, BufferUsage};
use crate::resource::{BackingStore, Layout, SlotState};
use crate::{engine_debug, engine_error};

pub struct BufferHandle {
    name: String,
    kind: BufferKind,
    usage: BufferUsage,
    /// Size of one slot in bytes (the logical buffer size)
    byte_size: u64,
    element_count: u64,
    active_slot: usize,
    layout: Layout,
    store: BackingStore,
}

impl BufferHandle {
    /// Allocate GPU memory for every slot of `desc.kind`
    ///
    /// `desc.initial_data` is copied into every slot. STATIC buffers must
    /// provide it.
    pub fn create(ctx: &mut RenderContext, desc: &BufferDesc<'_>, element_count: u64) -> Result<Self> {
        // ========== VALIDATION ==========
        if desc.size == 0 {
            engine_error!("lumen::Buffer", "Buffer '{}' has a size of 0 bytes", desc.name);
            return Err(Error::InvalidResource(format!("buffer '{}' has a size of 0 bytes", desc.name)));
        }
        if desc.kind == BufferKind::Static && desc.initial_data.is_none() {
            engine_error!("lumen::Buffer", "Static buffer '{}' created without initial data", desc.name);
            return Err(Error::MissingInitialData { buffer: desc.name.to_string() });
        }
        if let Some(initial) = desc.initial_data {
            if initial.len() as u64 > desc.size {
                engine_error!("lumen::Buffer",
                    "Initial data of buffer '{}' ({} bytes) exceeds its size ({} bytes)",
                    desc.name, initial.len(), desc.size);
                return Err(Error::CapacityExceeded {
                    buffer: desc.name.to_string(),
                    requested: initial.len() as u64,
                    capacity: desc.size,
                });
            }
        }

        // ========== CREATE GPU MEMORY ==========
        let memory = ctx.renderer_mut().create_buffer(desc)?;
        let slot_count = desc.kind.slot_count();
        let store = BackingStore::new(
            memory,
            slot_count,
            desc.size,
            ctx.fence_provider(),
            ctx.config().sync,
        )?;

        engine_debug!("lumen::Buffer",
            "Allocated buffer '{}' ({:?}, {} x {} bytes, id {})",
            desc.name, desc.kind, slot_count, desc.size, store.id());

        Ok(Self {
            name: desc.name.to_string(),
            kind: desc.kind,
            usage: desc.usage,
            byte_size: desc.size,
            element_count,
            active_slot: 0,
            layout: Layout::new(),
            store,
        })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str { &self.name }

    /// Native identity of the backend memory
    pub fn id(&self) -> u64 { self.store.id() }

    pub fn kind(&self) -> BufferKind { self.kind }

    pub fn usage(&self) -> BufferUsage { self.usage }

    /// Logical size in bytes (one slot)
    pub fn byte_size(&self) -> u64 { self.byte_size }

    pub fn element_count(&self) -> u64 { self.element_count }

    pub fn active_slot(&self) -> usize { self.active_slot }

    pub fn slot_count(&self) -> usize { self.store.slot_count() }

    /// Absolute byte offset of the active slot, for binding the buffer
    /// range on the GPU
    pub fn active_offset(&self) -> u64 { self.store.slot_offset(self.active_slot) }

    pub fn layout(&self) -> &Layout { &self.layout }

    pub fn slot_state(&self, slot: usize) -> SlotState { self.store.slot_state(slot) }

    pub fn store(&self) -> &BackingStore { &self.store }

    // ===== FORMAT =====

    /// Adopt `layout`, finalized with `element_byte_size`
    ///
    /// The element count becomes the number of whole layout strides fitting
    /// in the buffer (0 for a zero stride).
    pub fn set_format(&mut self, mut layout: Layout, element_byte_size: u64) {
        layout.finalize(element_byte_size);
        self.element_count = layout.element_count(self.byte_size);
        self.layout = layout;
    }

    /// Raise the element count to at least `count`
    pub fn grow_element_count(&mut self, count: u64) {
        self.element_count = self.element_count.max(count);
    }

    // ===== SLOTS =====

    /// Make the next slot active (no-op for single slot buffers)
    pub fn swap_slot(&mut self) {
        self.active_slot = (self.active_slot + 1) % self.store.slot_count();
    }

    /// Wait until the GPU no longer reads the active slot
    pub fn wait(&mut self) -> Result<()> {
        self.wait_slot(self.active_slot)
    }

    /// Fence the active slot after a draw that reads it
    pub fn lock(&mut self) -> Result<()> {
        self.lock_slot(self.active_slot)
    }

    /// Wait on a specific slot; STATIC buffers never hold fences
    pub fn wait_slot(&mut self, slot: usize) -> Result<()> {
        if self.kind == BufferKind::Static {
            return Ok(());
        }
        self.store.wait_slot(slot)
    }

    /// Fence a specific slot; STATIC buffers never hold fences
    pub fn lock_slot(&mut self, slot: usize) -> Result<()> {
        if self.kind == BufferKind::Static {
            return Ok(());
        }
        self.store.lock_slot(slot)
    }

    /// Wait on every slot
    pub fn wait_all(&mut self) -> Result<()> {
        self.store.wait_all()
    }

    // ===== BYTE ACCESS =====

    /// Copy `data` into the active slot at byte `offset`
    pub fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.check_access(Access::Write)?;
        self.check_capacity(offset, data.len() as u64)?;
        self.store.write(self.active_slot, offset, data)
    }

    /// Copy active slot bytes at `offset` into `out`
    pub fn read_bytes(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        self.check_access(Access::Read)?;
        self.check_capacity(offset, out.len() as u64)?;
        self.store.read(self.active_slot, offset, out)
    }

    /// Repeat `pattern` `count` times into the active slot at `offset`
    pub fn fill_bytes(&mut self, offset: u64, pattern: &[u8], count: usize) -> Result<()> {
        self.check_access(Access::Write)?;
        let len = (pattern.len() as u64)
            .checked_mul(count as u64)
            .ok_or_else(|| self.capacity_exceeded(offset, u64::MAX))?;
        self.check_capacity(offset, len)?;
        self.store.fill(self.active_slot, offset, pattern, count)
    }

    fn check_access(&self, access: Access) -> Result<()> {
        let allowed = match access {
            Access::Read => self.kind.is_readable(),
            Access::Write => self.kind.is_writable(),
        };
        if !allowed {
            engine_error!("lumen::Buffer",
                "CPU {} rejected on buffer '{}' of kind {:?}", access, self.name, self.kind);
            return Err(Error::CapabilityViolation {
                buffer: self.name.clone(),
                kind: self.kind,
                access,
            });
        }
        Ok(())
    }

    fn check_capacity(&self, offset: u64, len: u64) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.byte_size => Ok(()),
            end => Err(self.capacity_exceeded(offset, end.unwrap_or(u64::MAX))),
        }
    }

    /// Log and build the error for an access ending at byte `requested`
    ///
    /// `requested` saturates at `u64::MAX` when the range itself overflows.
    pub(crate) fn capacity_exceeded(&self, offset: u64, requested: u64) -> Error {
        engine_error!("lumen::Buffer",
            "Access to bytes [{}, {}) of buffer '{}' exceeds its {} bytes",
            offset, requested, self.name, self.byte_size);
        Error::CapacityExceeded {
            buffer: self.name.clone(),
            requested,
            capacity: self.byte_size,
        }
    }
}

impl std::fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferHandle")
            .field("name", &self.name)
            .field("id", &self.id())
            .field("kind", &self.kind)
            .field("byte_size", &self.byte_size)
            .field("element_count", &self.element_count)
            .field("active_slot", &self.active_slot)
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_handle_tests.rs"]
mod tests;
