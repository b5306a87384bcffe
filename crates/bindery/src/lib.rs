//! Bindery: a structured layer over a stateful GL context.
//!
//! This crate owns the binding discipline and draw dispatch used by higher
//! layers: a [`Device`] with push/pop binding registers, compiled
//! [`Command`]s with typed uniforms, [`VertexArray`] geometry, and
//! [`Framebuffer`]s built from validated [`Texture`] attachments. Drawing
//! always goes through a [`Target`].
//!
//! The GL itself sits behind the [`backend::Gl`] trait.

pub mod backend;
pub mod device;
pub mod geometry;
pub mod program;
pub mod render;
pub mod surface;

pub mod logging;

mod error;

#[cfg(test)]
mod test_support;

pub use device::{Device, DeviceInit, Viewport};
pub use error::{Error, Result};
pub use geometry::{Attribute, VertexArray};
pub use program::{Command, Primitive, Source, Uniform};
pub use render::{BufferBits, ClearValues, Target};
pub use surface::{Framebuffer, Texture, TextureDescriptor};
