/// Viewport rectangle in physical pixels, origin bottom-left.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole surface of the given extent.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Converts a pixel extent to the signed size GL expects, saturating at
/// `i32::MAX`.
#[inline]
pub(crate) fn gl_size(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX)
}
