/// Renderer module - backend-facing types and traits

// Module declarations
pub mod renderer;
pub mod buffer;
pub mod fence;
pub mod texture;
pub mod frame_buffer;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use buffer::*;
pub use fence::*;
pub use texture::*;
pub use frame_buffer::*;

// Mock renderer for tests (no GPU required)
#[cfg(test)]
pub mod mock_renderer;
