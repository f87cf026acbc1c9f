/// OpenGLRenderer - OpenGL implementation of the Renderer trait
///
/// Wraps a `glow::Context` created by the application (window and context
/// creation live outside the engine). The context must stay current on the
/// rendering thread for the lifetime of the renderer and its resources.

use glow::HasContext;
use lumen_engine::lumen::render::{
    Api, BufferDesc, BufferMemory, FenceProvider as RendererFenceProvider,
    Framebuffer as RendererFramebuffer, FramebufferDesc, Renderer, RendererConfig, RendererStats,
    Texture as RendererTexture, TextureDesc,
};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_error, engine_info};
use std::rc::Rc;

use crate::opengl_buffer::Buffer;
use crate::opengl_context::{native_buffer, native_texture, GlContext};
use crate::opengl_fence::FenceProvider;
use crate::opengl_format::texture_format;
use crate::opengl_frame_buffer::Framebuffer;
use crate::opengl_texture::Texture;

/// Minimum version with `glBufferStorage` in core
const MIN_CORE_VERSION: (u32, u32) = (4, 4);

/// Extension providing `glBufferStorage` on older contexts
const BUFFER_STORAGE_EXTENSION: &str = "GL_ARB_buffer_storage";

/// OpenGL renderer
pub struct OpenGLRenderer {
    ctx: Rc<GlContext>,
    fences: Rc<FenceProvider>,
}

impl OpenGLRenderer {
    /// Wrap a current GL context
    ///
    /// Fails with `InitializationFailed` when the context cannot provide
    /// persistent buffer mappings.
    pub fn new(gl: glow::Context, config: &RendererConfig) -> Result<Self> {
        let (version, renderer_name, vendor) = unsafe {
            (
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VENDOR),
            )
        };
        engine_info!("lumen::opengl", "OpenGL Version: {}", version);
        engine_info!("lumen::opengl", "OpenGL Renderer: {}", renderer_name);
        engine_info!("lumen::opengl", "OpenGL Vendor: {}", vendor);

        let parsed = gl.version();
        let core_storage = !parsed.is_embedded && (parsed.major, parsed.minor) >= MIN_CORE_VERSION;
        if !core_storage && !gl.supported_extensions().contains(BUFFER_STORAGE_EXTENSION) {
            engine_error!("lumen::opengl",
                "OpenGL {}.{} without {} cannot persistently map buffers",
                parsed.major, parsed.minor, BUFFER_STORAGE_EXTENSION);
            return Err(Error::InitializationFailed(format!(
                "OpenGL {}.{} lacks {}", parsed.major, parsed.minor, BUFFER_STORAGE_EXTENSION
            )));
        }

        let ctx = Rc::new(GlContext::new(gl, config.enable_validation));
        let fences = Rc::new(FenceProvider::new(ctx.clone()));
        engine_info!("lumen::opengl", "OpenGL renderer ready for '{}' (validation {})",
            config.app_name, config.enable_validation);

        Ok(Self { ctx, fences })
    }

    /// Shared GL context
    pub fn context(&self) -> &Rc<GlContext> {
        &self.ctx
    }
}

impl Renderer for OpenGLRenderer {
    fn api(&self) -> Api {
        Api::OpenGL
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<Box<dyn BufferMemory>> {
        Ok(Box::new(Buffer::new(self.ctx.clone(), desc)?))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn RendererTexture>> {
        Ok(Box::new(Texture::new(self.ctx.clone(), desc)?))
    }

    fn upload_texture(&mut self, texture: &dyn RendererTexture, source: u64, offset: u64) -> Result<()> {
        let info = texture.info();
        let format = texture_format(info.format);
        let target = native_texture(texture.id())?;
        let buffer = native_buffer(source)?;
        let offset = u32::try_from(offset)
            .map_err(|_| Error::InvalidResource(format!("upload offset {} out of range", offset)))?;

        unsafe {
            let gl = &self.ctx.gl;
            gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, Some(buffer));
            gl.bind_texture(glow::TEXTURE_2D, Some(target));
            gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                info.width as i32,
                info.height as i32,
                format.format,
                format.data_type,
                glow::PixelUnpackData::BufferOffset(offset),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, None);
        }
        self.ctx.check_error("glTexSubImage2D")
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Box<dyn RendererFramebuffer>> {
        Ok(Box::new(Framebuffer::new(self.ctx.clone(), desc)?))
    }

    fn fence_provider(&self) -> Rc<dyn RendererFenceProvider> {
        self.fences.clone()
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.ctx.gl.finish() };
        self.ctx.check_error("glFinish")
    }

    fn stats(&self) -> RendererStats {
        RendererStats {
            fences_in_flight: self.fences.in_flight() as u32,
            ..*self.ctx.stats.borrow()
        }
    }
}
