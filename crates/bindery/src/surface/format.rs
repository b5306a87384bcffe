use std::fmt::Debug;

/// A family of texture internal formats.
///
/// Families are disjoint: a [`Texture`](super::Texture) carries its family in
/// its type, which decides the framebuffer slot it can fill.
pub trait TextureFormat: Copy + Debug + 'static {
    /// Sized internal format (`glTexImage2D` `internalformat`).
    fn internal_format(self) -> i32;

    /// Pixel format of uploaded data.
    fn format(self) -> u32;

    /// Component type of uploaded data.
    fn ty(self) -> u32;

    fn bytes_per_texel(self) -> usize;
}

/// Color-renderable formats; fill `COLOR_ATTACHMENTi` slots.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ColorFormat {
    R8,
    Rg8,
    Rgb8,
    #[default]
    Rgba8,
    Srgb8Alpha8,
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgba32F,
}

impl TextureFormat for ColorFormat {
    fn internal_format(self) -> i32 {
        (match self {
            Self::R8 => glow::R8,
            Self::Rg8 => glow::RG8,
            Self::Rgb8 => glow::RGB8,
            Self::Rgba8 => glow::RGBA8,
            Self::Srgb8Alpha8 => glow::SRGB8_ALPHA8,
            Self::R16F => glow::R16F,
            Self::Rg16F => glow::RG16F,
            Self::Rgba16F => glow::RGBA16F,
            Self::R32F => glow::R32F,
            Self::Rg32F => glow::RG32F,
            Self::Rgba32F => glow::RGBA32F,
        }) as i32
    }

    fn format(self) -> u32 {
        match self {
            Self::R8 | Self::R16F | Self::R32F => glow::RED,
            Self::Rg8 | Self::Rg16F | Self::Rg32F => glow::RG,
            Self::Rgb8 => glow::RGB,
            Self::Rgba8 | Self::Srgb8Alpha8 | Self::Rgba16F | Self::Rgba32F => glow::RGBA,
        }
    }

    fn ty(self) -> u32 {
        match self {
            Self::R8 | Self::Rg8 | Self::Rgb8 | Self::Rgba8 | Self::Srgb8Alpha8 => {
                glow::UNSIGNED_BYTE
            }
            Self::R16F | Self::Rg16F | Self::Rgba16F => glow::HALF_FLOAT,
            Self::R32F | Self::Rg32F | Self::Rgba32F => glow::FLOAT,
        }
    }

    fn bytes_per_texel(self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rg8 | Self::R16F => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 | Self::Srgb8Alpha8 | Self::Rg16F | Self::R32F => 4,
            Self::Rgba16F | Self::Rg32F => 8,
            Self::Rgba32F => 16,
        }
    }
}

/// Depth-only formats; fill the `DEPTH_ATTACHMENT` slot.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DepthFormat {
    Depth16,
    #[default]
    Depth24,
    Depth32F,
}

impl TextureFormat for DepthFormat {
    fn internal_format(self) -> i32 {
        (match self {
            Self::Depth16 => glow::DEPTH_COMPONENT16,
            Self::Depth24 => glow::DEPTH_COMPONENT24,
            Self::Depth32F => glow::DEPTH_COMPONENT32F,
        }) as i32
    }

    fn format(self) -> u32 {
        glow::DEPTH_COMPONENT
    }

    fn ty(self) -> u32 {
        match self {
            Self::Depth16 => glow::UNSIGNED_SHORT,
            Self::Depth24 => glow::UNSIGNED_INT,
            Self::Depth32F => glow::FLOAT,
        }
    }

    fn bytes_per_texel(self) -> usize {
        match self {
            Self::Depth16 => 2,
            Self::Depth24 | Self::Depth32F => 4,
        }
    }
}

/// Packed depth + stencil formats; fill the `DEPTH_STENCIL_ATTACHMENT` slot.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DepthStencilFormat {
    #[default]
    Depth24Stencil8,
    Depth32FStencil8,
}

impl TextureFormat for DepthStencilFormat {
    fn internal_format(self) -> i32 {
        (match self {
            Self::Depth24Stencil8 => glow::DEPTH24_STENCIL8,
            Self::Depth32FStencil8 => glow::DEPTH32F_STENCIL8,
        }) as i32
    }

    fn format(self) -> u32 {
        glow::DEPTH_STENCIL
    }

    fn ty(self) -> u32 {
        match self {
            Self::Depth24Stencil8 => glow::UNSIGNED_INT_24_8,
            Self::Depth32FStencil8 => glow::FLOAT_32_UNSIGNED_INT_24_8_REV,
        }
    }

    fn bytes_per_texel(self) -> usize {
        match self {
            Self::Depth24Stencil8 => 4,
            Self::Depth32FStencil8 => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_formats_pair_layout_with_size() {
        assert_eq!(ColorFormat::Rgba8.bytes_per_texel(), 4);
        assert_eq!(ColorFormat::Rgba8.format(), glow::RGBA);
        assert_eq!(ColorFormat::Rgba16F.ty(), glow::HALF_FLOAT);
        assert_eq!(ColorFormat::Rgba32F.bytes_per_texel(), 16);
        assert_eq!(ColorFormat::Srgb8Alpha8.internal_format(), glow::SRGB8_ALPHA8 as i32);
    }

    #[test]
    fn depth_families_use_depth_pixel_formats() {
        assert_eq!(DepthFormat::default().format(), glow::DEPTH_COMPONENT);
        assert_eq!(DepthFormat::Depth16.bytes_per_texel(), 2);
        assert_eq!(DepthStencilFormat::default().format(), glow::DEPTH_STENCIL);
        assert_eq!(DepthStencilFormat::Depth24Stencil8.ty(), glow::UNSIGNED_INT_24_8);
    }
}
