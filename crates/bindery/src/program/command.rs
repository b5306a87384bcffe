use std::rc::Rc;

use crate::backend::Gl;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::geometry::Attribute;
use crate::render::ClearValues;

use super::shader::link_program;
use super::{AttributeKey, Primitive, Uniform, UniformKind};

/// A uniform resolved against a linked program.
pub struct UniformBinding<G: Gl, P> {
    name: String,
    location: G::UniformLocation,
    uniform: Uniform<G, P>,
}

impl<G: Gl, P> UniformBinding<G, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &G::UniformLocation {
        &self.location
    }

    pub fn kind(&self) -> UniformKind {
        self.uniform.kind()
    }
}

/// A compiled draw program: shader pair, typed uniform schema, primitive
/// topology and optional clear.
///
/// `P` is the per-draw props type consumed by computed uniforms. Build once
/// and reuse across frames; only [`restore`](Self::restore) changes it.
pub struct Command<G: Gl, P> {
    device: Rc<Device<G>>,
    vertex: String,
    fragment: String,
    program: G::Program,
    primitive: Primitive,
    uniforms: Vec<UniformBinding<G, P>>,
    clear: Option<ClearValues>,
}

impl<G: Gl, P> Command<G, P> {
    /// Starts describing a command from vertex and fragment source text.
    ///
    /// Source text is handed to the driver as-is.
    pub fn builder(vertex: impl Into<String>, fragment: impl Into<String>) -> CommandBuilder<G, P> {
        CommandBuilder {
            vertex: vertex.into(),
            fragment: fragment.into(),
            primitive: Primitive::default(),
            uniforms: Vec::new(),
            clear: None,
        }
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    /// Re-links the program after context loss.
    ///
    /// A program the driver still reports valid is left untouched. Otherwise
    /// both stages are recompiled and every uniform location is resolved
    /// again; on failure the current handle is kept.
    pub fn restore(&mut self) -> Result<()> {
        let gl = self.device.gl();
        if gl.is_program(self.program) {
            return Ok(());
        }

        let program = link_program(gl, &self.vertex, &self.fragment)?;
        let locations =
            resolve_locations(gl, program, self.uniforms.iter().map(|b| b.name.as_str()))?;
        for (binding, location) in self.uniforms.iter_mut().zip(locations) {
            binding.location = location;
        }

        log::info!("program {:?} restored as {program:?}", self.program);
        self.program = program;
        Ok(())
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Clear performed by every draw (and once per batch), if configured.
    pub fn clear_values(&self) -> Option<&ClearValues> {
        self.clear.as_ref()
    }

    /// Uniform bindings in declaration order.
    pub fn uniforms(&self) -> &[UniformBinding<G, P>] {
        &self.uniforms
    }

    /// Maps attribute keys to program locations.
    ///
    /// Integer keys pass through unchanged; names are looked up in the
    /// program and fail with `MissingAttributeLocation` when absent.
    pub fn locate<'a, K: Into<AttributeKey>>(
        &self,
        attributes: impl IntoIterator<Item = (K, Attribute<'a>)>,
    ) -> Result<Vec<(u32, Attribute<'a>)>> {
        let gl = self.device.gl();
        attributes
            .into_iter()
            .map(|(key, attribute)| {
                let location = match key.into() {
                    AttributeKey::Location(location) => location,
                    AttributeKey::Name(name) => gl
                        .get_attrib_location(self.program, &name)
                        .ok_or_else(|| Error::MissingAttributeLocation(name))?,
                };
                Ok((location, attribute))
            })
            .collect()
    }

    pub(crate) fn bind(&self) {
        self.device.gl().use_program(Some(self.program));
    }

    /// Resolves every uniform against `props` and uploads it.
    ///
    /// Texture uniforms take units 0, 1, 2, ... in declaration order on every
    /// call; nothing is cached between calls.
    pub(crate) fn update_uniforms(&self, props: &P) {
        let gl = self.device.gl();
        let mut unit = 0u32;

        for binding in &self.uniforms {
            let loc = &binding.location;
            match &binding.uniform {
                Uniform::F1(s) => gl.uniform_1_f32(loc, *s.resolve(props)),
                Uniform::F2(s) => {
                    let [x, y] = *s.resolve(props);
                    gl.uniform_2_f32(loc, x, y);
                }
                Uniform::F3(s) => {
                    let [x, y, z] = *s.resolve(props);
                    gl.uniform_3_f32(loc, x, y, z);
                }
                Uniform::F4(s) => {
                    let [x, y, z, w] = *s.resolve(props);
                    gl.uniform_4_f32(loc, x, y, z, w);
                }
                Uniform::F1v(s) => gl.uniform_1_f32_slice(loc, s.resolve(props).as_slice()),
                Uniform::F2v(s) => gl.uniform_2_f32_slice(loc, s.resolve(props).as_slice()),
                Uniform::F3v(s) => gl.uniform_3_f32_slice(loc, s.resolve(props).as_slice()),
                Uniform::F4v(s) => gl.uniform_4_f32_slice(loc, s.resolve(props).as_slice()),

                Uniform::I1(s) => gl.uniform_1_i32(loc, *s.resolve(props)),
                Uniform::I2(s) => {
                    let [x, y] = *s.resolve(props);
                    gl.uniform_2_i32(loc, x, y);
                }
                Uniform::I3(s) => {
                    let [x, y, z] = *s.resolve(props);
                    gl.uniform_3_i32(loc, x, y, z);
                }
                Uniform::I4(s) => {
                    let [x, y, z, w] = *s.resolve(props);
                    gl.uniform_4_i32(loc, x, y, z, w);
                }
                Uniform::I1v(s) => gl.uniform_1_i32_slice(loc, s.resolve(props).as_slice()),
                Uniform::I2v(s) => gl.uniform_2_i32_slice(loc, s.resolve(props).as_slice()),
                Uniform::I3v(s) => gl.uniform_3_i32_slice(loc, s.resolve(props).as_slice()),
                Uniform::I4v(s) => gl.uniform_4_i32_slice(loc, s.resolve(props).as_slice()),

                Uniform::U1(s) => gl.uniform_1_u32(loc, *s.resolve(props)),
                Uniform::U2(s) => {
                    let [x, y] = *s.resolve(props);
                    gl.uniform_2_u32(loc, x, y);
                }
                Uniform::U3(s) => {
                    let [x, y, z] = *s.resolve(props);
                    gl.uniform_3_u32(loc, x, y, z);
                }
                Uniform::U4(s) => {
                    let [x, y, z, w] = *s.resolve(props);
                    gl.uniform_4_u32(loc, x, y, z, w);
                }
                Uniform::U1v(s) => gl.uniform_1_u32_slice(loc, s.resolve(props).as_slice()),
                Uniform::U2v(s) => gl.uniform_2_u32_slice(loc, s.resolve(props).as_slice()),
                Uniform::U3v(s) => gl.uniform_3_u32_slice(loc, s.resolve(props).as_slice()),
                Uniform::U4v(s) => gl.uniform_4_u32_slice(loc, s.resolve(props).as_slice()),

                Uniform::Mat2(s) => gl.uniform_matrix_2_f32_slice(loc, s.resolve(props).as_slice()),
                Uniform::Mat3(s) => gl.uniform_matrix_3_f32_slice(loc, s.resolve(props).as_slice()),
                Uniform::Mat4(s) => gl.uniform_matrix_4_f32_slice(loc, s.resolve(props).as_slice()),

                Uniform::Texture(s) => {
                    let texture = s.resolve(props);
                    self.device.bind_texture_unit(unit, texture.raw());
                    gl.uniform_1_i32(loc, unit as i32);
                    unit += 1;
                }
            }
        }
    }
}

impl<G: Gl, P> Drop for Command<G, P> {
    fn drop(&mut self) {
        self.device.gl().delete_program(self.program);
    }
}

/// Describes a [`Command`] before it is compiled.
pub struct CommandBuilder<G: Gl, P> {
    vertex: String,
    fragment: String,
    primitive: Primitive,
    uniforms: Vec<(String, Uniform<G, P>)>,
    clear: Option<ClearValues>,
}

impl<G: Gl, P> CommandBuilder<G, P> {
    pub fn primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = primitive;
        self
    }

    /// Declares a uniform. Declaring a name again replaces the earlier
    /// declaration in place.
    pub fn uniform(mut self, name: impl Into<String>, uniform: Uniform<G, P>) -> Self {
        let name = name.into();
        match self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = uniform,
            None => self.uniforms.push((name, uniform)),
        }
        self
    }

    /// Clears these buffers on every draw.
    pub fn clear(mut self, clear: ClearValues) -> Self {
        self.clear = Some(clear);
        self
    }

    /// Compiles, links and resolves every uniform location.
    pub fn build(self, device: &Rc<Device<G>>) -> Result<Command<G, P>> {
        let gl = device.gl();
        let program = link_program(gl, &self.vertex, &self.fragment)?;
        let locations = resolve_locations(gl, program, self.uniforms.iter().map(|(n, _)| n.as_str()))?;

        let uniforms: Vec<UniformBinding<G, P>> = self
            .uniforms
            .into_iter()
            .zip(locations)
            .map(|((name, uniform), location)| UniformBinding { name, location, uniform })
            .collect();

        log::debug!(
            "command linked: program {program:?}, {:?}, {} uniforms",
            self.primitive,
            uniforms.len()
        );

        Ok(Command {
            device: Rc::clone(device),
            vertex: self.vertex,
            fragment: self.fragment,
            program,
            primitive: self.primitive,
            uniforms,
            clear: self.clear,
        })
    }
}

/// Looks up every uniform in `program`, in order.
///
/// Fails on the first name without a location; the program is released and
/// no uniform is silently skipped.
fn resolve_locations<'n, G: Gl>(
    gl: &G,
    program: G::Program,
    names: impl IntoIterator<Item = &'n str>,
) -> Result<Vec<G::UniformLocation>> {
    let mut locations = Vec::new();
    for name in names {
        let Some(location) = gl.get_uniform_location(program, name) else {
            gl.delete_program(program);
            return Err(Error::MissingUniformLocation(name.to_string()));
        };
        locations.push(location);
    }
    Ok(locations)
}
