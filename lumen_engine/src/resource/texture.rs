/// Resource-level texture.
///
/// A `Texture` owns a GPU texture plus the internal data buffer its pixels
/// are streamed through. A texture created with pixels keeps them in a
/// STATIC buffer; an empty one gets a WRITE_ONLY pixel-unpack buffer that
/// `write_pixels` refills.

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::renderer::{
    BufferKind, BufferUsage, Texture as RenderTexture, TextureDesc, TextureFormat, TextureInfo,
};
use crate::resource::Buffer;
use crate::{engine_debug, engine_error};

pub struct Texture {
    texture: Box<dyn RenderTexture>,
    data: Buffer<u8>,
}

impl Texture {
    /// Create a texture, optionally uploading a full image
    ///
    /// `pixels` must hold exactly `desc.byte_size()` bytes.
    pub fn new(
        ctx: &mut RenderContext,
        name: &str,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> Result<Self> {
        // ========== VALIDATION ==========
        let byte_size = desc.byte_size();
        if byte_size == 0 {
            engine_error!("lumen::Texture", "Texture '{}' has a zero extent ({}x{})",
                name, desc.width, desc.height);
            return Err(Error::InvalidResource(format!(
                "texture '{}' has a zero extent ({}x{})", name, desc.width, desc.height
            )));
        }
        if let Some(pixels) = pixels {
            if pixels.len() as u64 != byte_size {
                engine_error!("lumen::Texture",
                    "Texture '{}' expects {} bytes of pixels, got {}", name, byte_size, pixels.len());
                return Err(Error::InvalidResource(format!(
                    "texture '{}' expects {} bytes of pixels, got {}", name, byte_size, pixels.len()
                )));
            }
        }

        // ========== CREATE GPU RESOURCES ==========
        let kind = match pixels {
            Some(_) => BufferKind::Static,
            None => BufferKind::WriteOnly,
        };
        let data = Buffer::allocate_with_usage(
            ctx,
            &format!("{}.data", name),
            BufferUsage::PixelUnpack,
            pixels,
            byte_size,
            kind,
        )?;
        let texture = ctx.renderer_mut().create_texture(desc)?;
        if pixels.is_some() {
            ctx.renderer_mut().upload_texture(texture.as_ref(), data.handle().id(), 0)?;
        }

        engine_debug!("lumen::Texture", "Created texture '{}' ({}x{} {:?}, id {})",
            name, desc.width, desc.height, desc.format, texture.id());

        Ok(Self { texture, data })
    }

    // ===== ACCESSORS =====

    /// Native identity of the GPU texture
    pub fn id(&self) -> u64 { self.texture.id() }

    pub fn info(&self) -> &TextureInfo { self.texture.info() }

    pub fn width(&self) -> u32 { self.info().width }

    pub fn height(&self) -> u32 { self.info().height }

    pub fn format(&self) -> TextureFormat { self.info().format }

    pub fn render_texture(&self) -> &dyn RenderTexture { self.texture.as_ref() }

    /// Internal pixel buffer
    pub fn data_buffer(&self) -> &Buffer<u8> { &self.data }

    // ===== UPLOAD =====

    /// Replace the whole image
    ///
    /// Waits for the previous upload to release the pixel buffer, copies the
    /// pixels, issues the upload and fences the buffer behind it. Textures
    /// created with initial pixels are immutable.
    pub fn write_pixels(&mut self, ctx: &mut RenderContext, pixels: &[u8]) -> Result<()> {
        if pixels.len() as u64 != self.data.size() {
            return Err(Error::InvalidResource(format!(
                "texture {} expects {} bytes of pixels, got {}",
                self.id(), self.data.size(), pixels.len()
            )));
        }

        self.data.wait()?;
        self.data.flush(pixels, 0)?;
        let offset = self.data.handle().active_offset();
        ctx.renderer_mut()
            .upload_texture(self.texture.as_ref(), self.data.handle().id(), offset)?;
        self.data.lock()
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id())
            .field("info", self.info())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
