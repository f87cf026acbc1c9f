/// Render context - explicit owner of the active renderer
///
/// Every resource is created through a `RenderContext` passed by reference;
/// there is no global renderer. The context also carries the configuration
/// (notably the slot synchronization policy) handed to new buffers.
///
/// # Example
///
/// ```no_run
/// use lumen_engine::lumen::RenderContext;
/// use lumen_engine::lumen::render::BufferKind;
///
/// fn frame(ctx: &mut RenderContext) -> lumen_engine::lumen::Result<()> {
///     let mut quads = ctx.allocate::<f32>("quads", None, 1024, BufferKind::WriteOnlyTriple)?;
///     quads.wait()?;
///     quads.flush(&[0.0, 1.0, 0.0], 0)?;
///     // ... draw ...
///     quads.lock()?;
///     quads.swap();
///     Ok(())
/// }
/// ```

use std::rc::Rc;

use bytemuck::Pod;

use crate::error::Result;
use crate::renderer::{BufferKind, FenceProvider, Renderer, RendererConfig, RendererStats};
use crate::resource::Buffer;
use crate::engine_info;

pub struct RenderContext {
    renderer: Box<dyn Renderer>,
    config: RendererConfig,
}

impl RenderContext {
    /// Take ownership of a renderer
    pub fn new(renderer: Box<dyn Renderer>, config: RendererConfig) -> Self {
        engine_info!("lumen::RenderContext",
            "Render context created for '{}' ({:?})", config.app_name, renderer.api());
        Self { renderer, config }
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Fence provider shared by every buffer of this context
    pub fn fence_provider(&self) -> Rc<dyn FenceProvider> {
        self.renderer.fence_provider()
    }

    pub fn stats(&self) -> RendererStats {
        self.renderer.stats()
    }

    /// Wait for all GPU work to complete
    pub fn wait_idle(&self) -> Result<()> {
        self.renderer.wait_idle()
    }

    /// Allocate a typed vertex buffer
    ///
    /// Shorthand for `Buffer::allocate(self, ...)`.
    pub fn allocate<T: Pod>(
        &mut self,
        name: &str,
        initial_data: Option<&[T]>,
        byte_size: u64,
        kind: BufferKind,
    ) -> Result<Buffer<T>> {
        Buffer::allocate(self, name, initial_data, byte_size, kind)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
