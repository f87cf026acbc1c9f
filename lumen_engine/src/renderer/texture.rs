/// Backend texture interface and the plain data describing a 2D image

/// Pixel layout of a texture, named after the matching GPU formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R32G32B32A32_SFLOAT,
    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::D16_UNORM => 2,
            Self::R8G8B8A8_UNORM | Self::R8G8B8A8_SRGB | Self::D32_FLOAT | Self::D24_UNORM_S8_UINT => 4,
            Self::R32G32B32A32_SFLOAT => 16,
        }
    }

    /// Depth or packed depth/stencil
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::D16_UNORM | Self::D32_FLOAT | Self::D24_UNORM_S8_UINT)
    }
}

/// How the GPU will use the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    Sampled,
    RenderTarget,
    SampledAndRenderTarget,
    DepthStencil,
}

/// What a backend needs to create a single-level 2D texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Bytes in one full image (`width * height * bytes_per_pixel`)
    pub fn byte_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * u64::from(self.format.bytes_per_pixel())
    }
}

/// Immutable facts about a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        let TextureDesc { width, height, format, usage } = *desc;
        Self { width, height, format, usage }
    }
}

/// GPU image owned by a backend; dropping it frees the native object
pub trait Texture {
    /// Native name (the GL texture name for the OpenGL backend)
    fn id(&self) -> u64;

    fn info(&self) -> &TextureInfo;
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
