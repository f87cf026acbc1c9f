/// Framebuffer trait - groups render target attachments
///
/// A framebuffer binds together a color and an optional depth/stencil
/// texture. Created once and reused each frame; recreated only when its
/// attachments change (e.g., window resize).

use glam::Vec4;
use crate::renderer::TextureFormat;

/// Framebuffer - groups color and depth/stencil attachments together
pub trait Framebuffer {
    /// Native resource identity (e.g., the GL framebuffer name)
    fn id(&self) -> u64;

    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    /// Color used when the framebuffer is cleared
    fn clear_color(&self) -> Vec4;
}

/// A texture bound to a framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferAttachment {
    /// Native identity of the texture
    pub texture: u64,
    /// Texture format (selects depth vs depth/stencil binding)
    pub format: TextureFormat,
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    /// Color attachment
    pub color_attachment: FramebufferAttachment,
    /// Depth/stencil attachment
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color used when the framebuffer is cleared
    pub clear_color: Vec4,
}
