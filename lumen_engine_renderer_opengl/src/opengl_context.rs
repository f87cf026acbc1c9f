/// GlContext - Shared OpenGL state for all backend objects
///
/// Every buffer, texture, framebuffer and the fence provider keep an
/// `Rc<GlContext>` so they can release their GL objects on drop. The
/// context also carries the live resource statistics.

use glow::HasContext;
use lumen_engine::lumen::render::RendererStats;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::engine_error;
use std::cell::RefCell;
use std::num::NonZeroU32;

/// Shared GL context
pub struct GlContext {
    /// glow function table (the GL context must be current on this thread)
    pub gl: glow::Context,

    /// Check `glGetError` after every resource operation
    pub validation: bool,

    /// Live resource counters, updated on creation and drop
    pub(crate) stats: RefCell<RendererStats>,
}

impl GlContext {
    pub fn new(gl: glow::Context, validation: bool) -> Self {
        Self {
            gl,
            validation,
            stats: RefCell::new(RendererStats::default()),
        }
    }

    /// Drain the GL error queue and report the first error of `operation`
    ///
    /// No-op when validation is disabled.
    pub fn check_error(&self, operation: &str) -> Result<()> {
        if !self.validation {
            return Ok(());
        }

        let mut first = None;
        loop {
            let error = unsafe { self.gl.get_error() };
            if error == glow::NO_ERROR {
                break;
            }
            engine_error!("lumen::opengl", "{} raised {}", operation, error_name(error));
            first.get_or_insert(error);
        }

        match first {
            None => Ok(()),
            Some(glow::OUT_OF_MEMORY) => Err(Error::OutOfMemory),
            Some(error) => Err(Error::BackendError(format!(
                "{} raised {}", operation, error_name(error)
            ))),
        }
    }
}

/// Human readable name of a GL error code
pub fn error_name(error: u32) -> &'static str {
    match error {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown GL error",
    }
}

// ===== NATIVE IDS =====
//
// Resources are identified across the backend boundary by their GL object
// name widened to u64.

pub(crate) fn native_name(id: u64) -> Result<NonZeroU32> {
    u32::try_from(id)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| Error::InvalidResource(format!("{} is not a GL object name", id)))
}

pub(crate) fn native_buffer(id: u64) -> Result<glow::NativeBuffer> {
    Ok(glow::NativeBuffer(native_name(id)?))
}

pub(crate) fn native_texture(id: u64) -> Result<glow::NativeTexture> {
    Ok(glow::NativeTexture(native_name(id)?))
}
