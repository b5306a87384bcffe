//! Draw programs.
//!
//! This module is responsible for:
//! - compiling and linking shader pairs
//! - the typed uniform schema and per-draw resolution against props
//! - mapping attribute names to program locations

mod attribute;
mod command;
mod primitive;
mod shader;
mod uniform;

pub use attribute::AttributeKey;
pub use command::{Command, CommandBuilder, UniformBinding};
pub use primitive::Primitive;
pub use shader::ShaderStage;
pub use uniform::{Source, TextureSource, Uniform, UniformKind};
