use bitflags::bitflags;

bitflags! {
    /// Selects buffers for [`Target::clear`](super::Target::clear) and
    /// [`Target::blit`](super::Target::blit).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BufferBits: u32 {
        const COLOR   = glow::COLOR_BUFFER_BIT;
        const DEPTH   = glow::DEPTH_BUFFER_BIT;
        const STENCIL = glow::STENCIL_BUFFER_BIT;
    }
}

/// Clear values, used both as per-call options and as a `Command`'s
/// configured clear.
///
/// Unset fields clear to zero when passed to `Target::clear`. As a
/// `Command` configuration, only the set fields are cleared.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearValues {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
    pub stencil: Option<i32>,
}

impl ClearValues {
    #[inline]
    pub const fn color(rgba: [f32; 4]) -> Self {
        Self { color: Some(rgba), depth: None, stencil: None }
    }

    #[inline]
    pub const fn with_depth(mut self, depth: f32) -> Self {
        self.depth = Some(depth);
        self
    }

    #[inline]
    pub const fn with_stencil(mut self, stencil: i32) -> Self {
        self.stencil = Some(stencil);
        self
    }

    /// Buffers whose value is set.
    pub fn bits(&self) -> BufferBits {
        let mut bits = BufferBits::empty();
        bits.set(BufferBits::COLOR, self.color.is_some());
        bits.set(BufferBits::DEPTH, self.depth.is_some());
        bits.set(BufferBits::STENCIL, self.stencil.is_some());
        bits
    }
}
