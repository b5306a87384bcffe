//! Drawing into targets.
//!
//! A [`Target`] is the default surface or a framebuffer's attachments. Every
//! operation on it enters through the device's registers and leaves them as
//! it found them.

mod clear;
mod target;

pub use clear::{BufferBits, ClearValues};
pub use target::{Batch, Target};
