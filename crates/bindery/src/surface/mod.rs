//! Textures and off-screen framebuffers.
//!
//! Texture formats are split into three families (color, depth,
//! depth-stencil) carried in the texture's type, so a framebuffer slot can
//! only be filled by a texture of the matching family.

mod format;
mod framebuffer;
mod texture;

pub use format::{ColorFormat, DepthFormat, DepthStencilFormat, TextureFormat};
pub use framebuffer::{DepthAttachment, Framebuffer};
pub use texture::{Filter, SampledTexture, Sampling, Texture, TextureDescriptor, Wrap};
