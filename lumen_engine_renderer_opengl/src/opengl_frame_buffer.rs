/// Framebuffer - OpenGL implementation of the Framebuffer trait

use glow::HasContext;
use lumen_engine::glam::Vec4;
use lumen_engine::lumen::render::{Framebuffer as RendererFramebuffer, FramebufferDesc};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_err, engine_error};
use std::rc::Rc;

use crate::opengl_context::{native_texture, GlContext};
use crate::opengl_format::depth_attachment_point;

/// OpenGL framebuffer object
pub struct Framebuffer {
    ctx: Rc<GlContext>,
    pub(crate) framebuffer: glow::NativeFramebuffer,
    width: u32,
    height: u32,
    clear_color: Vec4,
}

impl Framebuffer {
    /// Bind the attachments and check completeness
    pub fn new(ctx: Rc<GlContext>, desc: &FramebufferDesc) -> Result<Self> {
        let color = native_texture(desc.color_attachment.texture)?;
        let depth = desc
            .depth_stencil_attachment
            .map(|a| native_texture(a.texture).map(|t| (t, depth_attachment_point(a.format))))
            .transpose()?;

        let (framebuffer, status) = unsafe {
            let framebuffer = ctx.gl.create_framebuffer()
                .map_err(|e| engine_err!("lumen::opengl", "glCreateFramebuffer failed: {}", e))?;
            ctx.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            ctx.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER, glow::COLOR_ATTACHMENT0, glow::TEXTURE_2D, Some(color), 0,
            );
            if let Some((depth, attachment)) = depth {
                ctx.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER, attachment, glow::TEXTURE_2D, Some(depth), 0,
                );
            }
            let status = ctx.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            ctx.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            (framebuffer, status)
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            unsafe { ctx.gl.delete_framebuffer(framebuffer) };
            engine_error!("lumen::opengl", "Framebuffer incomplete (status {:#x})", status);
            return Err(Error::InitializationFailed(format!(
                "framebuffer incomplete (status {:#x})", status
            )));
        }
        if let Err(error) = ctx.check_error("glFramebufferTexture2D") {
            unsafe { ctx.gl.delete_framebuffer(framebuffer) };
            return Err(error);
        }

        ctx.stats.borrow_mut().framebuffers += 1;

        Ok(Self {
            ctx,
            framebuffer,
            width: desc.width,
            height: desc.height,
            clear_color: desc.clear_color,
        })
    }
}

impl RendererFramebuffer for Framebuffer {
    fn id(&self) -> u64 {
        self.framebuffer.0.get() as u64
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_color(&self) -> Vec4 {
        self.clear_color
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe { self.ctx.gl.delete_framebuffer(self.framebuffer) };
        let mut stats = self.ctx.stats.borrow_mut();
        stats.framebuffers = stats.framebuffers.saturating_sub(1);
    }
}
