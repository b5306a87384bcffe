//! Drawable geometry.
//!
//! Attribute buffers are keyed by resolved program location; names are
//! resolved by [`Command::locate`](crate::program::Command::locate).

mod vertex_array;

pub use vertex_array::{Attribute, VertexArray};
