use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::backend::Gl;
use crate::surface::{SampledTexture, Texture, TextureFormat};

/// Where a uniform's value comes from on each draw.
///
/// `Computed` accessors run on every draw with that draw's props; results are
/// never cached across draws.
pub enum Source<P, T> {
    Static(T),
    Computed(Box<dyn Fn(&P) -> T>),
}

impl<P, T: Clone> Source<P, T> {
    /// Wraps an accessor evaluated against per-draw props.
    pub fn computed(f: impl Fn(&P) -> T + 'static) -> Self {
        Self::Computed(Box::new(f))
    }

    /// Resolves the value for one draw. Static values are borrowed.
    #[inline]
    pub fn resolve(&self, props: &P) -> Cow<'_, T> {
        match self {
            Self::Static(value) => Cow::Borrowed(value),
            Self::Computed(f) => Cow::Owned(f(props)),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

impl<P, T> From<T> for Source<P, T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<P, T: fmt::Debug> fmt::Debug for Source<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Texture value bound to a sampler uniform.
pub type TextureSource<G, P> = Source<P, Rc<dyn SampledTexture<G>>>;

/// A typed uniform declaration.
///
/// The variant is the uniform's type tag and fixes the value type, so an
/// accessor can never produce a value of the wrong shape. Vector (`*v`)
/// variants take flat component arrays; matrices are column-major.
///
/// Texture uniforms take the next texture unit, starting at 0, in
/// declaration order on every draw.
pub enum Uniform<G: Gl, P> {
    F1(Source<P, f32>),
    F2(Source<P, [f32; 2]>),
    F3(Source<P, [f32; 3]>),
    F4(Source<P, [f32; 4]>),
    F1v(Source<P, Vec<f32>>),
    F2v(Source<P, Vec<f32>>),
    F3v(Source<P, Vec<f32>>),
    F4v(Source<P, Vec<f32>>),

    I1(Source<P, i32>),
    I2(Source<P, [i32; 2]>),
    I3(Source<P, [i32; 3]>),
    I4(Source<P, [i32; 4]>),
    I1v(Source<P, Vec<i32>>),
    I2v(Source<P, Vec<i32>>),
    I3v(Source<P, Vec<i32>>),
    I4v(Source<P, Vec<i32>>),

    U1(Source<P, u32>),
    U2(Source<P, [u32; 2]>),
    U3(Source<P, [u32; 3]>),
    U4(Source<P, [u32; 4]>),
    U1v(Source<P, Vec<u32>>),
    U2v(Source<P, Vec<u32>>),
    U3v(Source<P, Vec<u32>>),
    U4v(Source<P, Vec<u32>>),

    Mat2(Source<P, [f32; 4]>),
    Mat3(Source<P, [f32; 9]>),
    Mat4(Source<P, [f32; 16]>),

    Texture(TextureSource<G, P>),
}

impl<G: Gl + 'static, P: 'static> Uniform<G, P> {
    /// Sampler bound to a fixed texture.
    pub fn texture<F: TextureFormat>(texture: Rc<Texture<G, F>>) -> Self {
        Self::Texture(Source::Static(texture as Rc<dyn SampledTexture<G>>))
    }

    /// Sampler whose texture is picked from the props on every draw.
    pub fn texture_fn<F: TextureFormat>(f: impl Fn(&P) -> Rc<Texture<G, F>> + 'static) -> Self {
        Self::Texture(Source::Computed(Box::new(move |props: &P| {
            f(props) as Rc<dyn SampledTexture<G>>
        })))
    }
}

impl<G: Gl, P> Uniform<G, P> {
    /// Returns the type tag.
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::F1(_) => UniformKind::F1,
            Self::F2(_) => UniformKind::F2,
            Self::F3(_) => UniformKind::F3,
            Self::F4(_) => UniformKind::F4,
            Self::F1v(_) => UniformKind::F1v,
            Self::F2v(_) => UniformKind::F2v,
            Self::F3v(_) => UniformKind::F3v,
            Self::F4v(_) => UniformKind::F4v,
            Self::I1(_) => UniformKind::I1,
            Self::I2(_) => UniformKind::I2,
            Self::I3(_) => UniformKind::I3,
            Self::I4(_) => UniformKind::I4,
            Self::I1v(_) => UniformKind::I1v,
            Self::I2v(_) => UniformKind::I2v,
            Self::I3v(_) => UniformKind::I3v,
            Self::I4v(_) => UniformKind::I4v,
            Self::U1(_) => UniformKind::U1,
            Self::U2(_) => UniformKind::U2,
            Self::U3(_) => UniformKind::U3,
            Self::U4(_) => UniformKind::U4,
            Self::U1v(_) => UniformKind::U1v,
            Self::U2v(_) => UniformKind::U2v,
            Self::U3v(_) => UniformKind::U3v,
            Self::U4v(_) => UniformKind::U4v,
            Self::Mat2(_) => UniformKind::Mat2,
            Self::Mat3(_) => UniformKind::Mat3,
            Self::Mat4(_) => UniformKind::Mat4,
            Self::Texture(_) => UniformKind::Texture,
        }
    }
}

/// Uniform type tag without a value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    F1,
    F2,
    F3,
    F4,
    F1v,
    F2v,
    F3v,
    F4v,
    I1,
    I2,
    I3,
    I4,
    I1v,
    I2v,
    I3v,
    I4v,
    U1,
    U2,
    U3,
    U4,
    U1v,
    U2v,
    U3v,
    U4v,
    Mat2,
    Mat3,
    Mat4,
    Texture,
}

impl UniformKind {
    /// Conventional tag name (`"3fv"`, `"matrix4fv"`, `"texture"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::F1 => "1f",
            Self::F2 => "2f",
            Self::F3 => "3f",
            Self::F4 => "4f",
            Self::F1v => "1fv",
            Self::F2v => "2fv",
            Self::F3v => "3fv",
            Self::F4v => "4fv",
            Self::I1 => "1i",
            Self::I2 => "2i",
            Self::I3 => "3i",
            Self::I4 => "4i",
            Self::I1v => "1iv",
            Self::I2v => "2iv",
            Self::I3v => "3iv",
            Self::I4v => "4iv",
            Self::U1 => "1ui",
            Self::U2 => "2ui",
            Self::U3 => "3ui",
            Self::U4 => "4ui",
            Self::U1v => "1uiv",
            Self::U2v => "2uiv",
            Self::U3v => "3uiv",
            Self::U4v => "4uiv",
            Self::Mat2 => "matrix2fv",
            Self::Mat3 => "matrix3fv",
            Self::Mat4 => "matrix4fv",
            Self::Texture => "texture",
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
