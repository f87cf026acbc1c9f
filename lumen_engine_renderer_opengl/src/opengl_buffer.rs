/// Buffer - OpenGL implementation of the BufferMemory trait
///
/// Immutable storage (`glBufferStorage`) spanning every slot, persistently
/// and coherently mapped for the lifetime of the buffer. Coherent mapping
/// makes CPU copies visible to the GPU without explicit flushes; slot fences
/// keep them from racing GPU reads.

use glow::HasContext;
use lumen_engine::lumen::render::{BufferDesc, BufferKind, BufferMemory, BufferUsage};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_err, engine_error};
use std::rc::Rc;

use crate::opengl_context::GlContext;
use crate::opengl_format::{buffer_target, persistent_flags};

/// Generic target used while creating and mapping buffers
const STAGING_TARGET: u32 = glow::COPY_WRITE_BUFFER;

/// OpenGL buffer
pub struct Buffer {
    ctx: Rc<GlContext>,
    pub(crate) buffer: glow::NativeBuffer,
    /// Persistent mapping of the whole buffer (null for STATIC buffers)
    mapped: *mut u8,
    size: u64,
    kind: BufferKind,
    usage: BufferUsage,
}

impl Buffer {
    /// Create immutable storage for every slot of `desc.kind`
    pub fn new(ctx: Rc<GlContext>, desc: &BufferDesc<'_>) -> Result<Self> {
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("buffer '{}' has a size of 0 bytes", desc.name)));
        }
        let size = desc.total_size();
        let gl_size = i32::try_from(size).map_err(|_| {
            engine_err!("lumen::opengl", "Buffer '{}' of {} bytes exceeds the GL size range", desc.name, size)
        })?;

        // Initial contents replicated into every slot
        let initial: Option<Vec<u8>> = desc.initial_data.map(|data| {
            let mut bytes = vec![0u8; size as usize];
            for slot in bytes.chunks_mut(desc.size as usize) {
                slot[..data.len()].copy_from_slice(data);
            }
            bytes
        });

        let flags = persistent_flags(desc.kind);
        let buffer = unsafe {
            ctx.gl.create_buffer()
                .map_err(|e| engine_err!("lumen::opengl", "glCreateBuffer failed: {}", e))?
        };

        let mapped = unsafe {
            ctx.gl.bind_buffer(STAGING_TARGET, Some(buffer));
            ctx.gl.buffer_storage(STAGING_TARGET, gl_size, initial.as_deref(), flags);
            let mapped = if desc.kind.is_mapped() {
                ctx.gl.map_buffer_range(STAGING_TARGET, 0, gl_size, flags)
            } else {
                std::ptr::null_mut()
            };
            ctx.gl.bind_buffer(STAGING_TARGET, None);
            mapped
        };

        let result = ctx.check_error("glBufferStorage");
        if result.is_err() || (desc.kind.is_mapped() && mapped.is_null()) {
            unsafe { ctx.gl.delete_buffer(buffer) };
            result?;
            engine_error!("lumen::opengl", "glMapBufferRange failed for buffer '{}'", desc.name);
            return Err(Error::BackendError(format!("could not map buffer '{}'", desc.name)));
        }

        {
            let mut stats = ctx.stats.borrow_mut();
            stats.buffers += 1;
            stats.gpu_memory_used += size;
        }
        engine_debug!("lumen::opengl", "Buffer '{}' created (GL name {}, {} bytes, flags {:#x})",
            desc.name, buffer.0, size, flags);

        Ok(Self {
            ctx,
            buffer,
            mapped,
            size,
            kind: desc.kind,
            usage: desc.usage,
        })
    }

    /// Binding target for draw-time use
    pub fn target(&self) -> u32 {
        buffer_target(self.usage)
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    fn mapped_range(&self, offset: u64, len: usize) -> Result<*mut u8> {
        if self.mapped.is_null() {
            return Err(Error::BackendError(format!("buffer {} is not mapped", self.buffer.0)));
        }
        if offset + len as u64 > self.size {
            return Err(Error::BackendError(format!(
                "range [{}, {}) outside buffer {} of {} bytes",
                offset, offset + len as u64, self.buffer.0, self.size
            )));
        }
        // In bounds of the mapping, checked above
        Ok(unsafe { self.mapped.add(offset as usize) })
    }
}

impl BufferMemory for Buffer {
    fn id(&self) -> u64 {
        self.buffer.0.get() as u64
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let dst = self.mapped_range(offset, data.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let src = self.mapped_range(offset, out.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if !self.mapped.is_null() {
                self.ctx.gl.bind_buffer(STAGING_TARGET, Some(self.buffer));
                self.ctx.gl.unmap_buffer(STAGING_TARGET);
                self.ctx.gl.bind_buffer(STAGING_TARGET, None);
            }
            self.ctx.gl.delete_buffer(self.buffer);
        }
        let mut stats = self.ctx.stats.borrow_mut();
        stats.buffers = stats.buffers.saturating_sub(1);
        stats.gpu_memory_used = stats.gpu_memory_used.saturating_sub(self.size);
    }
}
