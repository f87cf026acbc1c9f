/// Renderer - backend entry point that creates GPU objects and hands out fences

use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;
use crate::renderer::{
    BufferDesc, BufferMemory, FenceProvider, Framebuffer, FramebufferDesc, Texture, TextureDesc,
};

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Graphics API implemented by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// OpenGL 4.4+ (or earlier with GL_ARB_buffer_storage)
    OpenGL,
    /// No GPU (tests, offline tools)
    Headless,
}

/// Fence polling policy for slot waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Upper bound of a single fence poll
    pub poll_timeout: Duration,
    /// Total time a slot wait may take before failing with `SyncTimeout`.
    /// `None` keeps polling forever.
    pub deadline: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(1),
            deadline: Some(Duration::from_secs(1)),
        }
    }
}

/// Settings handed to a backend at creation
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Check and report backend errors after every resource creation
    pub enable_validation: bool,
    /// Reported in the startup log
    pub app_name: String,
    /// Slot synchronization policy
    pub sync: SyncConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Lumen Application".to_string(),
            sync: SyncConfig::default(),
        }
    }
}

/// Live object counts reported by a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Buffers currently alive
    pub buffers: u32,
    /// Textures currently alive
    pub textures: u32,
    /// Framebuffers currently alive
    pub framebuffers: u32,
    /// GPU memory held by live buffers and textures (bytes)
    pub gpu_memory_used: u64,
    /// Fences created and not yet released
    pub fences_in_flight: u32,
}

// ============================================================================
// Renderer trait
// ============================================================================

/// GPU backend
///
/// Every buffer, texture and framebuffer of a `RenderContext` comes from
/// one renderer, driven from the thread that owns the graphics context.
pub trait Renderer {
    /// Graphics API of this renderer
    fn api(&self) -> Api;

    /// Create buffer memory for every slot of `desc.kind`
    ///
    /// When `desc.initial_data` is set it is copied into every slot.
    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<Box<dyn BufferMemory>>;

    /// Allocate storage for one image level; contents start undefined
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>>;

    /// Copy a full level-0 image from buffer `source` at byte `offset` into `texture`
    fn upload_texture(&mut self, texture: &dyn Texture, source: u64, offset: u64) -> Result<()>;

    /// Create a framebuffer from existing attachments
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Box<dyn Framebuffer>>;

    /// Fence provider shared by every buffer created from this renderer
    fn fence_provider(&self) -> Rc<dyn FenceProvider>;

    /// Block until the GPU has drained every submitted command
    fn wait_idle(&self) -> Result<()>;

    fn stats(&self) -> RendererStats;
}
