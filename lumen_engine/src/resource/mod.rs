//! Resource layer
//!
//! Backend-independent buffers, textures and framebuffers built on the
//! `renderer` traits.

pub mod layout;
pub mod backing_store;
pub mod buffer_handle;
pub mod buffer;
pub mod texture;
pub mod framebuffer;

pub use layout::{AttributeKind, AttributeDescriptor, Layout};
pub use backing_store::{BackingStore, SlotState};
pub use buffer_handle::BufferHandle;
pub use buffer::Buffer;
pub use texture::Texture;
pub use framebuffer::Framebuffer;
