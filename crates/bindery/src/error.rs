use thiserror::Error;

use crate::program::ShaderStage;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time failures.
///
/// Every variant is reported before the offending object is handed back to
/// the caller. The draw path itself never fails: once a `Command`,
/// `VertexArray` or `Framebuffer` exists, misuse is left to the driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Program errors
    // ========================================================================
    /// A shader stage failed to compile. `log` is the driver's info log.
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// The program failed to link. `log` is the driver's info log.
    #[error("program failed to link: {log}")]
    Link { log: String },

    /// A declared uniform has no location in the linked program.
    ///
    /// Uniforms the compiler optimized away land here as well.
    #[error("uniform `{0}` has no location in the linked program")]
    MissingUniformLocation(String),

    /// A named attribute has no location in the linked program.
    #[error("attribute `{0}` has no location in the linked program")]
    MissingAttributeLocation(String),

    // ========================================================================
    // Geometry errors
    // ========================================================================
    /// Two attribute buffers were bound to the same location.
    #[error("attribute location {0} is bound more than once")]
    DuplicateAttributeLocation(u32),

    /// A vertex or instance count does not fit the GL draw count.
    #[error("count {0} exceeds the GL draw count range")]
    CountOverflow(usize),

    // ========================================================================
    // Surface errors
    // ========================================================================
    /// An attachment's extent disagrees with the framebuffer's declared extent.
    #[error(
        "{slot} attachment is {found_width}x{found_height}, framebuffer is {width}x{height}"
    )]
    DimensionMismatch {
        slot: String,
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },

    /// The driver rejected the attachment combination.
    #[error("framebuffer incomplete (status 0x{status:04x})")]
    FramebufferIncomplete { status: u32 },

    /// No attachment was supplied where at least one color attachment is required.
    #[error("framebuffer requires at least one color attachment")]
    EmptyAttachmentList,

    /// Initial pixel data does not cover the texture exactly.
    #[error("texture data is {found} bytes, expected {expected}")]
    TextureDataSize { expected: usize, found: usize },

    /// The driver refused to allocate an object handle.
    #[error("failed to create GPU object: {0}")]
    ObjectCreation(String),
}
