/// Fence provider - OpenGL sync objects behind opaque fence handles

use glow::HasContext;
use lumen_engine::lumen::render::{FenceHandle, FenceProvider as RendererFenceProvider, FenceStatus};
use lumen_engine::lumen::Result;
use lumen_engine::{engine_err, engine_trace};
use slotmap::SlotMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::opengl_context::GlContext;
use crate::opengl_format::{fence_status, timeout_nanos};

type GlFence = <glow::Context as HasContext>::Fence;

/// `glFenceSync` / `glClientWaitSync` fence provider
pub struct FenceProvider {
    ctx: Rc<GlContext>,
    fences: RefCell<SlotMap<FenceHandle, GlFence>>,
}

impl FenceProvider {
    pub fn new(ctx: Rc<GlContext>) -> Self {
        Self {
            ctx,
            fences: RefCell::new(SlotMap::with_key()),
        }
    }
}

impl RendererFenceProvider for FenceProvider {
    fn submit(&self) -> Result<FenceHandle> {
        let fence = unsafe {
            self.ctx.gl.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0)
                .map_err(|e| engine_err!("lumen::opengl", "glFenceSync failed: {}", e))?
        };
        Ok(self.fences.borrow_mut().insert(fence))
    }

    fn poll(&self, fence: FenceHandle, timeout: Duration) -> FenceStatus {
        let Some(sync) = self.fences.borrow().get(fence).copied() else {
            return FenceStatus::WaitFailed;
        };
        // Flushing makes sure the fence itself reaches the GPU, otherwise
        // the wait could never complete
        let status = unsafe {
            self.ctx.gl.client_wait_sync(sync, glow::SYNC_FLUSH_COMMANDS_BIT, timeout_nanos(timeout))
        };
        let status = fence_status(status);
        if status == FenceStatus::WaitFailed {
            engine_trace!("lumen::opengl", "glClientWaitSync failed for {:?}", fence);
        }
        status
    }

    fn release(&self, fence: FenceHandle) {
        if let Some(sync) = self.fences.borrow_mut().remove(fence) {
            unsafe { self.ctx.gl.delete_sync(sync) };
        }
    }

    fn in_flight(&self) -> usize {
        self.fences.borrow().len()
    }
}

impl Drop for FenceProvider {
    fn drop(&mut self) {
        for (_, sync) in self.fences.get_mut().drain() {
            unsafe { self.ctx.gl.delete_sync(sync) };
        }
    }
}
