use std::cell::Cell;
use std::rc::Rc;

use crate::backend::Gl;
use crate::device::{gl_size, Device};
use crate::error::{Error, Result};

use super::{ColorFormat, TextureFormat};

/// Minification / magnification filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

impl Filter {
    const fn gl_enum(self) -> i32 {
        (match self {
            Self::Nearest => glow::NEAREST,
            Self::Linear => glow::LINEAR,
        }) as i32
    }
}

/// Texture coordinate wrapping.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl Wrap {
    const fn gl_enum(self) -> i32 {
        (match self {
            Self::ClampToEdge => glow::CLAMP_TO_EDGE,
            Self::Repeat => glow::REPEAT,
            Self::MirroredRepeat => glow::MIRRORED_REPEAT,
        }) as i32
    }
}

/// Sampler state applied at allocation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Sampling {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl Sampling {
    /// Nearest filtering on both axes, clamped.
    pub const fn nearest() -> Self {
        Self {
            min_filter: Filter::Nearest,
            mag_filter: Filter::Nearest,
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
        }
    }
}

/// Texture allocation parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureDescriptor<F: TextureFormat = ColorFormat> {
    pub width: u32,
    pub height: u32,
    pub format: F,
    pub sampling: Sampling,
}

impl<F: TextureFormat> TextureDescriptor<F> {
    pub fn new(width: u32, height: u32, format: F) -> Self {
        Self { width, height, format, sampling: Sampling::default() }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Size in bytes of a full upload.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_texel()
    }
}

/// A texture a sampler uniform can read, whatever its format family.
pub trait SampledTexture<G: Gl> {
    fn raw(&self) -> G::Texture;
}

/// A 2D GPU image.
///
/// The format family `F` is part of the type, so only textures of a matching
/// family can be handed to a framebuffer slot. Initial pixel data is kept so
/// the image can be re-uploaded after context loss.
pub struct Texture<G: Gl, F: TextureFormat = ColorFormat> {
    device: Rc<Device<G>>,
    handle: Cell<G::Texture>,
    descriptor: TextureDescriptor<F>,
    data: Option<Vec<u8>>,
}

impl<G: Gl, F: TextureFormat> Texture<G, F> {
    /// Allocates the texture and uploads `data` if given.
    ///
    /// `data` must be exactly `width * height * bytes_per_texel` bytes.
    pub fn new(
        device: &Rc<Device<G>>,
        descriptor: TextureDescriptor<F>,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        if let Some(bytes) = data {
            let expected = descriptor.byte_len();
            if bytes.len() != expected {
                return Err(Error::TextureDataSize { expected, found: bytes.len() });
            }
        }

        let data = data.map(<[u8]>::to_vec);
        let handle = allocate(device, &descriptor, data.as_deref())?;
        log::debug!(
            "texture {handle:?}: {}x{} {:?}",
            descriptor.width,
            descriptor.height,
            descriptor.format
        );

        Ok(Self {
            device: Rc::clone(device),
            handle: Cell::new(handle),
            descriptor,
            data,
        })
    }

    /// Re-creates the texture if the driver no longer knows the handle.
    ///
    /// A still-valid texture is left untouched.
    pub fn restore(&self) -> Result<()> {
        let stale = self.handle.get();
        if self.device.gl().is_texture(stale) {
            return Ok(());
        }

        self.device.forget_texture(stale);
        let handle = allocate(&self.device, &self.descriptor, self.data.as_deref())?;
        log::info!("texture {:?} restored as {handle:?}", self.handle.get());
        self.handle.set(handle);
        Ok(())
    }

    #[inline]
    pub fn raw(&self) -> G::Texture {
        self.handle.get()
    }

    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.descriptor.width, self.descriptor.height)
    }

    pub fn format(&self) -> F {
        self.descriptor.format
    }

    pub fn descriptor(&self) -> &TextureDescriptor<F> {
        &self.descriptor
    }
}

impl<G: Gl, F: TextureFormat> SampledTexture<G> for Texture<G, F> {
    fn raw(&self) -> G::Texture {
        self.handle.get()
    }
}

impl<G: Gl, F: TextureFormat> Drop for Texture<G, F> {
    fn drop(&mut self) {
        let handle = self.handle.get();
        self.device.forget_texture(handle);
        self.device.gl().delete_texture(handle);
    }
}

/// Creates and fills a texture on the active unit. The unit's previous
/// binding is put back afterwards, so allocating inside a batch leaves the
/// sampler bindings alone.
fn allocate<G: Gl, F: TextureFormat>(
    device: &Device<G>,
    descriptor: &TextureDescriptor<F>,
    data: Option<&[u8]>,
) -> Result<G::Texture> {
    let texture = device.gl().create_texture().map_err(Error::ObjectCreation)?;
    let TextureDescriptor { width, height, format, sampling } = *descriptor;

    device.with_texture_2d(texture, |gl| {
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            format.internal_format(),
            gl_size(width),
            gl_size(height),
            format.format(),
            format.ty(),
            data,
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, sampling.min_filter.gl_enum());
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, sampling.mag_filter.gl_enum());
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, sampling.wrap_s.gl_enum());
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, sampling.wrap_t.gl_enum());
    });

    Ok(texture)
}
