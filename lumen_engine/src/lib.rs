/*!
# Lumen Engine

Core traits and types for the Lumen real-time rendering engine.

The heart of the crate is the multi-buffered GPU buffer subsystem: client
code sees one mutable buffer while the engine cycles among 1 to 3 physical
slots of persistent-mapped memory, synchronized with the GPU through fences.
Backend implementations (OpenGL) provide the memory, fences and textures
behind the `renderer` traits.

## Architecture

- **Renderer**: Factory trait for buffer memory, textures and framebuffers
- **FenceProvider**: GPU fences behind opaque handles
- **BufferMemory**: Untyped persistent-mapped backend memory
- **RenderContext**: Explicit owner of the active renderer
- **Buffer<T>**: Typed multi-buffered view (allocate / flush / wait / lock / swap)
- **Texture / Framebuffer**: Composites owning their buffers and attachments
*/

// Internal modules
mod error;
mod engine;
mod context;
pub mod log;
pub mod renderer;
pub mod resource;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Access, Error, Result};

    // Engine services (global logger)
    pub use crate::engine::Engine;

    // Explicit render context
    pub use crate::context::RenderContext;

    // Renderer factory trait
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with all backend-facing types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math and cast libraries at crate root
pub use glam;
pub use bytemuck;
