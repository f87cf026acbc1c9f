/// Resource-level framebuffer.
///
/// Owns a color texture, a depth/stencil texture and the GPU framebuffer
/// binding them. Everything is released together on drop.

use glam::Vec4;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::renderer::{
    Framebuffer as RenderFramebuffer, FramebufferAttachment, FramebufferDesc, TextureDesc,
    TextureFormat, TextureUsage,
};
use crate::resource::Texture;
use crate::{engine_debug, engine_error};

pub struct Framebuffer {
    // Dropped before its attachments
    framebuffer: Box<dyn RenderFramebuffer>,
    color: Texture,
    depth: Texture,
}

impl Framebuffer {
    /// Create a framebuffer with fresh color and depth attachments
    pub fn new(
        ctx: &mut RenderContext,
        name: &str,
        width: u32,
        height: u32,
        color_format: TextureFormat,
        depth_format: TextureFormat,
        clear_color: Vec4,
    ) -> Result<Self> {
        if color_format.is_depth() {
            engine_error!("lumen::Framebuffer",
                "Framebuffer '{}' color attachment uses depth format {:?}", name, color_format);
            return Err(Error::InvalidResource(format!(
                "framebuffer '{}' color format {:?} is a depth format", name, color_format
            )));
        }
        if !depth_format.is_depth() {
            engine_error!("lumen::Framebuffer",
                "Framebuffer '{}' depth attachment uses color format {:?}", name, depth_format);
            return Err(Error::InvalidResource(format!(
                "framebuffer '{}' depth format {:?} is not a depth format", name, depth_format
            )));
        }

        let color = Texture::new(
            ctx,
            &format!("{}.color", name),
            &TextureDesc { width, height, format: color_format, usage: TextureUsage::SampledAndRenderTarget },
            None,
        )?;
        let depth = Texture::new(
            ctx,
            &format!("{}.depth", name),
            &TextureDesc { width, height, format: depth_format, usage: TextureUsage::DepthStencil },
            None,
        )?;
        let framebuffer = ctx.renderer_mut().create_framebuffer(&FramebufferDesc {
            color_attachment: FramebufferAttachment { texture: color.id(), format: color_format },
            depth_stencil_attachment: Some(FramebufferAttachment { texture: depth.id(), format: depth_format }),
            width,
            height,
            clear_color,
        })?;

        engine_debug!("lumen::Framebuffer", "Created framebuffer '{}' ({}x{}, id {})",
            name, width, height, framebuffer.id());

        Ok(Self { framebuffer, color, depth })
    }

    // ===== ACCESSORS =====

    /// Native identity of the GPU framebuffer
    pub fn id(&self) -> u64 { self.framebuffer.id() }

    pub fn width(&self) -> u32 { self.framebuffer.width() }

    pub fn height(&self) -> u32 { self.framebuffer.height() }

    pub fn clear_color(&self) -> Vec4 { self.framebuffer.clear_color() }

    pub fn color(&self) -> &Texture { &self.color }

    pub fn depth(&self) -> &Texture { &self.depth }

    pub fn render_framebuffer(&self) -> &dyn RenderFramebuffer { self.framebuffer.as_ref() }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("id", &self.id())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color", &self.color)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
