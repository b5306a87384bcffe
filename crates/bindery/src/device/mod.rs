//! Device and binding-stack discipline.
//!
//! This module is responsible for:
//! - owning the rendering context for one surface
//! - the draw-framebuffer / read-framebuffer / viewport registers
//! - scoped push/pop so nested operations never corrupt the caller's bindings

mod context;
mod init;
mod registers;
mod viewport;

pub use context::{Device, Scope};
pub use init::DeviceInit;
pub use registers::{Register, StackDepths};
pub use viewport::Viewport;

pub(crate) use viewport::gl_size;
