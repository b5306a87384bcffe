use std::collections::HashSet;
use std::rc::Rc;

use crate::backend::Gl;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::program::Primitive;

/// One attribute buffer: tightly packed `f32` components.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Attribute<'a> {
    pub data: &'a [f32],

    /// Components per vertex (1..=4).
    pub size: i32,

    /// Instances per advance; 0 advances per vertex.
    pub divisor: u32,
}

impl<'a> Attribute<'a> {
    pub fn new(data: &'a [f32], size: i32) -> Self {
        Self { data, size, divisor: 0 }
    }

    /// Advances this attribute once every `divisor` instances.
    pub fn per_instance(mut self, divisor: u32) -> Self {
        self.divisor = divisor;
        self
    }

    /// Number of whole elements in `data`.
    fn elements(&self) -> usize {
        match usize::try_from(self.size) {
            Ok(size) if size > 0 => self.data.len() / size,
            _ => 0,
        }
    }
}

/// An attribute as uploaded, kept so the array can be rebuilt.
struct Layout {
    location: u32,
    data: Vec<f32>,
    size: i32,
    divisor: u32,
}

/// Attribute buffers keyed by location plus an optional `u32` element
/// buffer, uploaded into one vertex array object.
///
/// The array keeps its own copy of the uploaded data for [`restore`](Self::restore).
pub struct VertexArray<G: Gl> {
    device: Rc<Device<G>>,
    layouts: Vec<Layout>,
    indices: Option<Vec<u32>>,
    vao: Option<G::VertexArray>,
    buffers: Vec<G::Buffer>,
    elements: Option<G::Buffer>,
    count: i32,
    instance_count: i32,
}

impl<G: Gl> VertexArray<G> {
    /// Uploads `attributes` (usually from [`Command::locate`](crate::program::Command::locate))
    /// and `elements`.
    ///
    /// Fails with `DuplicateAttributeLocation` or `CountOverflow` before any
    /// GPU object is created.
    pub fn new(
        device: &Rc<Device<G>>,
        attributes: Vec<(u32, Attribute<'_>)>,
        elements: Option<&[u32]>,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(attributes.len());
        for (location, _) in &attributes {
            if !seen.insert(*location) {
                return Err(Error::DuplicateAttributeLocation(*location));
            }
        }

        let count = match elements {
            Some(indices) => indices.len(),
            None => attributes
                .iter()
                .filter(|(_, a)| a.divisor == 0)
                .map(|(_, a)| a.elements())
                .min()
                .unwrap_or(0),
        };
        let instance_count = attributes
            .iter()
            .filter(|(_, a)| a.divisor > 0)
            .map(|(_, a)| a.elements().saturating_mul(a.divisor as usize))
            .min()
            .unwrap_or(0);

        let count = i32::try_from(count).map_err(|_| Error::CountOverflow(count))?;
        let instance_count =
            i32::try_from(instance_count).map_err(|_| Error::CountOverflow(instance_count))?;

        // Partially built arrays release what they own on drop.
        let mut this = Self {
            device: Rc::clone(device),
            layouts: attributes
                .into_iter()
                .map(|(location, a)| Layout {
                    location,
                    data: a.data.to_vec(),
                    size: a.size,
                    divisor: a.divisor,
                })
                .collect(),
            indices: elements.map(<[u32]>::to_vec),
            vao: None,
            buffers: Vec::new(),
            elements: None,
            count,
            instance_count,
        };
        this.upload()?;

        log::debug!(
            "vertex array {:?}: {} attributes, count {}, instances {}, indexed {}",
            this.vao,
            this.layouts.len(),
            this.count,
            this.instance_count,
            this.elements.is_some()
        );
        Ok(this)
    }

    /// Rebuilds the GPU objects from the retained data when any buffer has
    /// been invalidated, usually by a context loss.
    ///
    /// A no-op while every buffer is still valid. An array without buffers
    /// has nothing to rebuild.
    pub fn restore(&mut self) -> Result<()> {
        let gl = self.device.gl();
        if self.buffers.iter().chain(&self.elements).all(|&b| gl.is_buffer(b)) {
            return Ok(());
        }

        let previous = self.vao;
        self.release();
        self.upload()?;
        log::info!("vertex array {previous:?} restored as {:?}", self.vao);
        Ok(())
    }

    /// Creates the vertex array and its buffers from the retained layouts.
    fn upload(&mut self) -> Result<()> {
        let device = Rc::clone(&self.device);
        let gl = device.gl();

        let vao = gl.create_vertex_array().map_err(Error::ObjectCreation)?;
        self.vao = Some(vao);

        gl.bind_vertex_array(Some(vao));
        let uploaded = self.upload_buffers(gl);
        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        uploaded
    }

    fn upload_buffers(&mut self, gl: &G) -> Result<()> {
        self.buffers.reserve(self.layouts.len());
        for layout in &self.layouts {
            let buffer = gl.create_buffer().map_err(Error::ObjectCreation)?;
            self.buffers.push(buffer);

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&layout.data),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(layout.location);
            gl.vertex_attrib_pointer_f32(layout.location, layout.size, glow::FLOAT, false, 0, 0);
            if layout.divisor > 0 {
                gl.vertex_attrib_divisor(layout.location, layout.divisor);
            }
        }

        if let Some(indices) = &self.indices {
            let buffer = gl.create_buffer().map_err(Error::ObjectCreation)?;
            self.elements = Some(buffer);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
        }
        Ok(())
    }

    /// Deletes every object this array holds. Stale names are ignored by GL.
    fn release(&mut self) {
        let gl = self.device.gl();
        for buffer in self.buffers.drain(..).chain(self.elements.take()) {
            gl.delete_buffer(buffer);
        }
        if let Some(vao) = self.vao.take() {
            gl.delete_vertex_array(vao);
        }
    }

    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    /// Vertices (or indices, when indexed) per draw.
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Instances per draw; 0 for a non-instanced array.
    pub fn instance_count(&self) -> i32 {
        self.instance_count
    }

    pub(crate) fn bind(&self) {
        self.device.gl().bind_vertex_array(self.vao);
    }

    pub(crate) fn unbind(&self) {
        self.device.gl().bind_vertex_array(None);
    }

    /// Issues one draw. Must be called while bound.
    pub(crate) fn draw(&self, primitive: Primitive) {
        let gl = self.device.gl();
        let mode = primitive.gl_mode();

        match (self.has_elements(), self.instance_count > 0) {
            (false, false) => gl.draw_arrays(mode, 0, self.count),
            (false, true) => gl.draw_arrays_instanced(mode, 0, self.count, self.instance_count),
            (true, false) => gl.draw_elements(mode, self.count, glow::UNSIGNED_INT, 0),
            (true, true) => gl.draw_elements_instanced(
                mode,
                self.count,
                glow::UNSIGNED_INT,
                0,
                self.instance_count,
            ),
        }
    }
}

impl<G: Gl> Drop for VertexArray<G> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::Call;
    use crate::test_support::device;

    const POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn draws(calls: Vec<Call>) -> Vec<Call> {
        calls
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::DrawArrays { .. }
                        | Call::DrawArraysInstanced { .. }
                        | Call::DrawElements { .. }
                        | Call::DrawElementsInstanced { .. }
                )
            })
            .collect()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn duplicate_location_fails_before_any_gpu_object() {
        let (gl, device) = device();
        let result = VertexArray::new(
            &device,
            vec![(0, Attribute::new(&POSITIONS, 3)), (0, Attribute::new(&POSITIONS, 3))],
            None,
        );
        assert_eq!(result.err(), Some(Error::DuplicateAttributeLocation(0)));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn uploads_each_attribute_into_its_own_buffer() {
        let (gl, device) = device();
        let colors = [1.0f32; 12];
        let va = VertexArray::new(
            &device,
            vec![(0, Attribute::new(&POSITIONS, 3)), (3, Attribute::new(&colors, 4))],
            None,
        )
        .unwrap();

        assert_eq!(va.count(), 3);
        assert_eq!(va.instance_count(), 0);
        assert!(!va.has_elements());

        let calls = gl.take_calls();
        assert_eq!(gl.live_objects(), 3);
        assert!(calls.contains(&Call::BufferData {
            target: glow::ARRAY_BUFFER,
            len: 36,
            usage: glow::STATIC_DRAW,
        }));
        assert!(calls.contains(&Call::VertexAttribPointer { index: 3, size: 4, data_type: glow::FLOAT }));
        assert!(calls.contains(&Call::EnableVertexAttribArray(0)));
        // The vertex array is released before the buffer bindings.
        let unbind_vao = calls.iter().position(|c| *c == Call::BindVertexArray(None)).unwrap();
        let unbind_buffer = calls
            .iter()
            .position(|c| *c == Call::BindBuffer { target: glow::ARRAY_BUFFER, buffer: None })
            .unwrap();
        assert!(unbind_vao < unbind_buffer);
    }

    #[test]
    fn vertex_count_is_the_shortest_attribute() {
        let (_gl, device) = device();
        let uvs = [0.0f32; 4];
        let va = VertexArray::new(
            &device,
            vec![(0, Attribute::new(&POSITIONS, 3)), (1, Attribute::new(&uvs, 2))],
            None,
        )
        .unwrap();
        assert_eq!(va.count(), 2);
    }

    #[test]
    fn drop_releases_buffers_and_vertex_array() {
        let (gl, device) = device();
        let va = VertexArray::new(&device, vec![(0, Attribute::new(&POSITIONS, 3))], Some(&[0, 1, 2]))
            .unwrap();
        assert_eq!(gl.live_objects(), 3);
        drop(va);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn oversized_instance_count_fails_before_any_gpu_object() {
        let (gl, device) = device();
        let offsets = [0.0f32; 2];
        let result = VertexArray::new(
            &device,
            vec![(0, Attribute::new(&offsets, 1).per_instance(u32::MAX))],
            None,
        );
        assert_eq!(result.err(), Some(Error::CountOverflow(2 * u32::MAX as usize)));
        assert!(gl.calls().is_empty());
    }

    // ── restore ───────────────────────────────────────────────────────────

    fn created_buffers(gl: &crate::backend::RecordingGl) -> Vec<u32> {
        gl.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateBuffer(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn restore_keeps_a_valid_array() {
        let (gl, device) = device();
        let mut va = VertexArray::new(&device, vec![(0, Attribute::new(&POSITIONS, 3))], None).unwrap();
        gl.take_calls();

        va.restore().unwrap();
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn restore_reuploads_retained_data_after_context_loss() {
        let (gl, device) = device();
        let mut va = {
            let positions = POSITIONS.to_vec();
            let indices = vec![0u32, 1, 2, 2, 1, 0];
            VertexArray::new(&device, vec![(0, Attribute::new(&positions, 3))], Some(&indices)).unwrap()
        };
        gl.lose_context();
        gl.take_calls();

        va.restore().unwrap();

        let calls = gl.take_calls();
        assert_eq!(gl.live_objects(), 3);
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::CreateVertexArray(_))).count(), 1);
        assert!(calls.contains(&Call::BufferData {
            target: glow::ARRAY_BUFFER,
            len: 36,
            usage: glow::STATIC_DRAW,
        }));
        assert!(calls.contains(&Call::BufferData {
            target: glow::ELEMENT_ARRAY_BUFFER,
            len: 24,
            usage: glow::STATIC_DRAW,
        }));
        assert!(calls.contains(&Call::VertexAttribPointer { index: 0, size: 3, data_type: glow::FLOAT }));
        assert_eq!(calls.last(), Some(&Call::BindBuffer { target: glow::ELEMENT_ARRAY_BUFFER, buffer: None }));
        assert_eq!(va.count(), 6);

        va.bind();
        va.draw(Primitive::Triangles);
        assert_eq!(
            draws(gl.take_calls()),
            vec![Call::DrawElements {
                mode: glow::TRIANGLES,
                count: 6,
                element_type: glow::UNSIGNED_INT,
                offset: 0,
            }]
        );
    }

    #[test]
    fn restore_after_one_dead_buffer_releases_the_survivors() {
        let (gl, device) = device();
        let mut va =
            VertexArray::new(&device, vec![(0, Attribute::new(&POSITIONS, 3))], Some(&[0, 1, 2]))
                .unwrap();
        let buffers = created_buffers(&gl);
        assert_eq!(buffers.len(), 2);
        gl.invalidate(buffers[0]);
        gl.take_calls();

        va.restore().unwrap();

        assert!(gl.calls().contains(&Call::DeleteBuffer(buffers[1])));
        assert_eq!(created_buffers(&gl).len(), 2);
        assert_eq!(gl.live_objects(), 3);
        drop(va);
        assert_eq!(gl.live_objects(), 0);
    }

    // ── draw dispatch ─────────────────────────────────────────────────────

    #[test]
    fn dispatch_covers_indexed_and_instanced_combinations() {
        let (gl, device) = device();
        let offsets = [0.0f32; 8];
        let cases = [
            (None, 0, Call::DrawArrays { mode: glow::TRIANGLES, first: 0, count: 3 }),
            (
                None,
                1,
                Call::DrawArraysInstanced { mode: glow::TRIANGLES, first: 0, count: 3, instances: 4 },
            ),
            (
                Some(&[0u32, 1, 2, 2, 1, 0][..]),
                0,
                Call::DrawElements {
                    mode: glow::TRIANGLES,
                    count: 6,
                    element_type: glow::UNSIGNED_INT,
                    offset: 0,
                },
            ),
            (
                Some(&[0u32, 1, 2][..]),
                2,
                Call::DrawElementsInstanced {
                    mode: glow::TRIANGLES,
                    count: 3,
                    element_type: glow::UNSIGNED_INT,
                    offset: 0,
                    instances: 8,
                },
            ),
        ];

        for (elements, divisor, expected) in cases {
            let mut attributes = vec![(0, Attribute::new(&POSITIONS, 3))];
            if divisor > 0 {
                attributes.push((1, Attribute::new(&offsets, 2).per_instance(divisor)));
            }
            let va = VertexArray::new(&device, attributes, elements).unwrap();
            gl.take_calls();

            va.bind();
            va.draw(Primitive::Triangles);
            va.unbind();
            assert_eq!(draws(gl.take_calls()), vec![expected]);
        }
    }

    #[test]
    fn instanced_attribute_sets_divisor() {
        let (gl, device) = device();
        let offsets = [0.0f32; 6];
        let va = VertexArray::new(
            &device,
            vec![
                (0, Attribute::new(&POSITIONS, 3)),
                (2, Attribute::new(&offsets, 2).per_instance(1)),
            ],
            None,
        )
        .unwrap();

        assert_eq!(va.instance_count(), 3);
        assert!(gl.calls().contains(&Call::VertexAttribDivisor { index: 2, divisor: 1 }));
        assert_eq!(gl.count(|c| matches!(c, Call::VertexAttribDivisor { .. })), 1);
    }
}
