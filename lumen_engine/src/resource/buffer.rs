/// Resource-level typed GPU buffer.
///
/// `Buffer<T>` is a typed view over a `BufferHandle`: element indices are in
/// units of `T` and values are copied in and out through `bytemuck`. The
/// buffer looks like one mutable array to client code while consecutive
/// frames write to different physical slots.
///
/// Per-frame usage for a multi-buffered buffer:
///
/// ```text
/// wait()          block until the GPU released the active slot
/// flush()/write() fill the active slot
/// (draw)          GPU reads the active slot
/// lock()          fence the active slot
/// swap()          next frame uses the next slot
/// ```

use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::Pod;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::renderer::{BufferDesc, BufferKind, BufferUsage};
use crate::resource::{BufferHandle, Layout, SlotState};
use crate::engine_error;

pub struct Buffer<T: Pod> {
    handle: BufferHandle,
    _marker: PhantomData<T>,
}

impl<T: Pod> Buffer<T> {
    /// Allocate a vertex buffer of `byte_size` bytes per slot
    ///
    /// When `initial_data` is given it is copied into every slot and the
    /// element count is `byte_size / size_of::<T>()`; otherwise the buffer
    /// starts empty. STATIC buffers require initial data.
    pub fn allocate(
        ctx: &mut RenderContext,
        name: &str,
        initial_data: Option<&[T]>,
        byte_size: u64,
        kind: BufferKind,
    ) -> Result<Self> {
        Self::allocate_with_usage(ctx, name, BufferUsage::Vertex, initial_data, byte_size, kind)
    }

    /// Allocate a buffer bound to a specific usage
    pub fn allocate_with_usage(
        ctx: &mut RenderContext,
        name: &str,
        usage: BufferUsage,
        initial_data: Option<&[T]>,
        byte_size: u64,
        kind: BufferKind,
    ) -> Result<Self> {
        let element_size = size_of::<T>() as u64;
        if element_size == 0 {
            engine_error!("lumen::Buffer", "Buffer '{}' has a zero-sized element type", name);
            return Err(Error::InvalidResource(format!("buffer '{}' has a zero-sized element type", name)));
        }

        let element_count = match initial_data {
            Some(_) => byte_size / element_size,
            None => 0,
        };
        let desc = BufferDesc {
            name,
            size: byte_size,
            kind,
            usage,
            initial_data: initial_data.map(bytemuck::cast_slice::<T, u8>),
        };
        let handle = BufferHandle::create(ctx, &desc, element_count)?;

        Ok(Self { handle, _marker: PhantomData })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str { self.handle.name() }

    /// Size of the buffer in bytes (one slot)
    pub fn size(&self) -> u64 { self.handle.byte_size() }

    /// Number of elements currently considered valid
    pub fn count(&self) -> u64 { self.handle.element_count() }

    /// Number of `T` that fit in the buffer
    pub fn capacity(&self) -> u64 { self.handle.byte_size() / size_of::<T>() as u64 }

    pub fn kind(&self) -> BufferKind { self.handle.kind() }

    pub fn active_slot_index(&self) -> usize { self.handle.active_slot() }

    pub fn slot_count(&self) -> usize { self.handle.slot_count() }

    pub fn slot_state(&self, slot: usize) -> SlotState { self.handle.slot_state(slot) }

    pub fn layout(&self) -> &Layout { self.handle.layout() }

    /// Underlying untyped handle (native id, active slot offset...)
    pub fn handle(&self) -> &BufferHandle { &self.handle }

    // ===== FORMAT =====

    /// Adopt `layout`, with `size_of::<T>()` as the default component size
    ///
    /// The element count becomes `size() / stride` (0 for an empty layout).
    pub fn set_format(&mut self, layout: Layout) {
        self.handle.set_format(layout, size_of::<T>() as u64);
    }

    // ===== DATA =====

    /// Copy `data` into the active slot starting at element `offset_index`
    ///
    /// Waits for the GPU to release the active slot first. The element count
    /// grows to cover the written range.
    pub fn flush(&mut self, data: &[T], offset_index: u64) -> Result<()> {
        let offset = self.byte_offset(offset_index)?;
        self.handle.write_bytes(offset, bytemuck::cast_slice(data))?;
        // The write fit in the buffer, so the end index cannot overflow
        self.handle.grow_element_count(offset_index + data.len() as u64);
        Ok(())
    }

    /// Read element `index` of the active slot
    pub fn read(&self, index: u64) -> Result<T> {
        let mut value = T::zeroed();
        self.handle.read_bytes(self.byte_offset(index)?, bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Write element `index` of the active slot
    pub fn write(&mut self, index: u64, value: T) -> Result<()> {
        self.handle.write_bytes(self.byte_offset(index)?, bytemuck::bytes_of(&value))?;
        self.handle.grow_element_count(index + 1);
        Ok(())
    }

    /// Set the first `count()` elements of the active slot to `value`
    ///
    /// A layout stride smaller than `T` can report more elements than fit;
    /// the fill stops at `capacity()`.
    pub fn clear(&mut self, value: T) -> Result<()> {
        let count = self.count().min(self.capacity()) as usize;
        self.handle.fill_bytes(0, bytemuck::bytes_of(&value), count)
    }

    /// Read the first `count()` elements of the active slot
    pub fn read_all(&self) -> Result<Vec<T>> {
        let count = self.count().min(self.capacity()) as usize;
        let mut values = vec![T::zeroed(); count];
        self.handle.read_bytes(0, bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }

    /// Byte offset of element `index`, rejecting indices past the addressable range
    fn byte_offset(&self, index: u64) -> Result<u64> {
        index
            .checked_mul(size_of::<T>() as u64)
            .ok_or_else(|| self.handle.capacity_exceeded(u64::MAX, u64::MAX))
    }

    // ===== SLOTS =====

    /// Make the next slot active
    pub fn swap(&mut self) {
        self.handle.swap_slot();
    }

    /// Wait until the GPU released the active slot
    pub fn wait(&mut self) -> Result<()> {
        self.handle.wait()
    }

    /// Fence the active slot after submitting a draw that reads it
    pub fn lock(&mut self) -> Result<()> {
        self.handle.lock()
    }

    pub fn wait_slot(&mut self, slot: usize) -> Result<()> {
        self.handle.wait_slot(slot)
    }

    pub fn lock_slot(&mut self, slot: usize) -> Result<()> {
        self.handle.lock_slot(slot)
    }
}

impl<T: Pod> std::fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("element", &std::any::type_name::<T>())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
