/// Texture - OpenGL implementation of the Texture trait

use glow::HasContext;
use lumen_engine::lumen::render::{Texture as RendererTexture, TextureDesc, TextureInfo};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::engine_err;
use std::rc::Rc;

use crate::opengl_context::GlContext;
use crate::opengl_format::texture_format;

/// OpenGL 2D texture with immutable storage (one mip level)
pub struct Texture {
    ctx: Rc<GlContext>,
    pub(crate) texture: glow::NativeTexture,
    info: TextureInfo,
    byte_size: u64,
}

impl Texture {
    pub fn new(ctx: Rc<GlContext>, desc: &TextureDesc) -> Result<Self> {
        let width = i32::try_from(desc.width)
            .map_err(|_| Error::InvalidResource(format!("texture width {} too large", desc.width)))?;
        let height = i32::try_from(desc.height)
            .map_err(|_| Error::InvalidResource(format!("texture height {} too large", desc.height)))?;
        let format = texture_format(desc.format);

        let texture = unsafe {
            let texture = ctx.gl.create_texture()
                .map_err(|e| engine_err!("lumen::opengl", "glCreateTexture failed: {}", e))?;
            ctx.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            ctx.gl.tex_storage_2d(glow::TEXTURE_2D, 1, format.internal_format, width, height);
            ctx.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            ctx.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            ctx.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };
        if let Err(error) = ctx.check_error("glTexStorage2D") {
            unsafe { ctx.gl.delete_texture(texture) };
            return Err(error);
        }

        let byte_size = desc.byte_size();
        {
            let mut stats = ctx.stats.borrow_mut();
            stats.textures += 1;
            stats.gpu_memory_used += byte_size;
        }

        Ok(Self {
            ctx,
            texture,
            info: TextureInfo::from(desc),
            byte_size,
        })
    }
}

impl RendererTexture for Texture {
    fn id(&self) -> u64 {
        self.texture.0.get() as u64
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe { self.ctx.gl.delete_texture(self.texture) };
        let mut stats = self.ctx.stats.borrow_mut();
        stats.textures = stats.textures.saturating_sub(1);
        stats.gpu_memory_used = stats.gpu_memory_used.saturating_sub(self.byte_size);
    }
}
