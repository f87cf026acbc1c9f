/// Engine enum to OpenGL enum conversions

use lumen_engine::lumen::render::{BufferKind, BufferUsage, FenceStatus, TextureFormat};
use std::time::Duration;

/// GL texture format triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    /// Sized internal format (`glTexStorage2D`)
    pub internal_format: u32,
    /// Pixel data format (`glTexSubImage2D`)
    pub format: u32,
    /// Pixel data type (`glTexSubImage2D`)
    pub data_type: u32,
}

pub fn texture_format(format: TextureFormat) -> GlTextureFormat {
    let (internal_format, format, data_type) = match format {
        TextureFormat::R8G8B8A8_UNORM => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::R8G8B8A8_SRGB => (glow::SRGB8_ALPHA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::R32G32B32A32_SFLOAT => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
        TextureFormat::D16_UNORM => (glow::DEPTH_COMPONENT16, glow::DEPTH_COMPONENT, glow::UNSIGNED_SHORT),
        TextureFormat::D32_FLOAT => (glow::DEPTH_COMPONENT32F, glow::DEPTH_COMPONENT, glow::FLOAT),
        TextureFormat::D24_UNORM_S8_UINT => (glow::DEPTH24_STENCIL8, glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8),
    };
    GlTextureFormat { internal_format, format, data_type }
}

/// Framebuffer attachment point of a depth format
pub fn depth_attachment_point(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::D24_UNORM_S8_UINT => glow::DEPTH_STENCIL_ATTACHMENT,
        _ => glow::DEPTH_ATTACHMENT,
    }
}

/// Binding target of a buffer usage
pub fn buffer_target(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Vertex => glow::ARRAY_BUFFER,
        BufferUsage::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferUsage::Uniform => glow::UNIFORM_BUFFER,
        BufferUsage::Storage => glow::SHADER_STORAGE_BUFFER,
        BufferUsage::PixelUnpack => glow::PIXEL_UNPACK_BUFFER,
    }
}

/// `glBufferStorage` flags, also used as `glMapBufferRange` access bits
///
/// STATIC buffers are immutable and never mapped (0). Every other kind is
/// mapped persistently and coherently with the bits its capabilities allow.
pub fn persistent_flags(kind: BufferKind) -> u32 {
    if !kind.is_mapped() {
        return 0;
    }
    let mut flags = glow::MAP_PERSISTENT_BIT | glow::MAP_COHERENT_BIT;
    if kind.is_readable() {
        flags |= glow::MAP_READ_BIT;
    }
    if kind.is_writable() {
        flags |= glow::MAP_WRITE_BIT;
    }
    flags
}

/// Result of `glClientWaitSync`
pub fn fence_status(status: u32) -> FenceStatus {
    match status {
        glow::ALREADY_SIGNALED => FenceStatus::AlreadySignaled,
        glow::CONDITION_SATISFIED => FenceStatus::Signaled,
        glow::TIMEOUT_EXPIRED => FenceStatus::TimeoutExpired,
        _ => FenceStatus::WaitFailed,
    }
}

/// `glClientWaitSync` timeout, saturated to the parameter range
pub fn timeout_nanos(timeout: Duration) -> i32 {
    timeout.as_nanos().min(i32::MAX as u128) as i32
}

#[cfg(test)]
#[path = "opengl_format_tests.rs"]
mod tests;
