/*!
# Lumen Engine - OpenGL Renderer Backend

OpenGL 4.4+ implementation of the Lumen engine renderer traits, built on the
`glow` bindings.

Buffers use immutable storage with persistent, coherent mappings; slot
fences are `glFenceSync` sync objects. Contexts older than 4.4 are accepted
when they expose `GL_ARB_buffer_storage`.
*/

// OpenGL implementation modules
mod opengl_context;
mod opengl_format;
mod opengl_buffer;
mod opengl_fence;
mod opengl_texture;
mod opengl_frame_buffer;
mod opengl_renderer;

// Main lumen namespace module
pub mod lumen {
    pub use crate::opengl_renderer::OpenGLRenderer;
    pub use crate::opengl_context::GlContext;
    pub use crate::opengl_buffer::Buffer as OpenGLBuffer;
    pub use crate::opengl_fence::FenceProvider as OpenGLFenceProvider;
    pub use crate::opengl_texture::Texture as OpenGLTexture;
    pub use crate::opengl_frame_buffer::Framebuffer as OpenGLFramebuffer;
}

pub use opengl_renderer::OpenGLRenderer;
