//! Headless [`Gl`] implementation that records calls instead of issuing them.
//!
//! `RecordingGl` is a cheap handle over shared state: clone it before handing
//! it to a `Device` and keep the clone to inspect what the core did.
//!
//! Driver behaviour it emulates:
//! - object handles are unique non-zero integers; live objects are tracked so
//!   `is_texture` / `is_framebuffer` / `is_program` / `is_buffer` answer
//!   truthfully
//! - [`RecordingGl::lose_context`] invalidates every live object, and
//!   [`RecordingGl::invalidate`] a single one
//! - a shader whose source contains an `#error` directive fails to compile
//! - linking introspects `uniform` declarations in every stage and
//!   `in` / `attribute` declarations in the vertex stage, handing out
//!   sequential locations in declaration order
//! - linking can be forced to fail, and the framebuffer status can be chosen

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::Gl;

/// Values passed to a uniform setter.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    U32(Vec<u32>),
}

/// One recorded GL call.
///
/// Pure queries (`get_*`, `is_*`) and source/attach bookkeeping are not
/// recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader { shader: u32, stage: u32 },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    /// `kind` is the uniform tag, e.g. `"3fv"` or `"matrix4fv"`.
    Uniform { location: u32, kind: &'static str, data: UniformData },

    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferData { target: u32, len: usize, usage: u32 },
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, data_type: u32 },
    VertexAttribDivisor { index: u32, divisor: u32 },

    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawArraysInstanced { mode: u32, first: i32, count: i32, instances: i32 },
    DrawElements { mode: u32, count: i32, element_type: u32, offset: i32 },
    DrawElementsInstanced { mode: u32, count: i32, element_type: u32, offset: i32, instances: i32 },

    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: Option<u32> },
    TexImage2d { internal_format: i32, width: i32, height: i32, with_data: bool },
    TexParameter { parameter: u32, value: i32 },
    DeleteTexture(u32),

    CreateFramebuffer(u32),
    BindFramebuffer { target: u32, framebuffer: Option<u32> },
    FramebufferTexture2d { target: u32, attachment: u32, texture: Option<u32> },
    CheckFramebufferStatus(u32),
    DrawBuffers(Vec<u32>),
    BlitFramebuffer { src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32 },
    DeleteFramebuffer(u32),

    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(u32),
}

#[derive(Debug)]
struct ShaderObject {
    stage: u32,
    source: String,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: HashMap<String, u32>,
    attributes: HashMap<String, u32>,
}

#[derive(Debug)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    live: HashSet<u32>,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    fail_links: bool,
    framebuffer_status: u32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_id: 1,
            calls: Vec::new(),
            live: HashSet::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            fail_links: false,
            framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
        }
    }
}

impl State {
    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        id
    }
}

/// Recording backend. See the module docs.
#[derive(Debug, Clone, Default)]
pub struct RecordingGl {
    state: Rc<RefCell<State>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Returns the recorded calls and starts a fresh log.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// Counts recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Number of objects the emulated driver currently considers valid.
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Simulates context loss: every existing handle becomes invalid.
    pub fn lose_context(&self) {
        let mut state = self.state.borrow_mut();
        state.live.clear();
        state.programs.clear();
        state.shaders.clear();
    }

    /// Invalidates one object, as if the driver had dropped it.
    ///
    /// Programs lose their link state too.
    pub fn invalidate(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        state.live.remove(&id);
        state.programs.remove(&id);
        state.shaders.remove(&id);
    }

    /// Makes every subsequent link fail (or succeed again).
    pub fn set_fail_links(&self, fail: bool) {
        self.state.borrow_mut().fail_links = fail;
    }

    /// Sets the status reported by `check_framebuffer_status`.
    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().framebuffer_status = status;
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn create(&self, call: impl FnOnce(u32) -> Call) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.calls.push(call(id));
        id
    }

    fn delete(&self, id: u32, call: Call) {
        let mut state = self.state.borrow_mut();
        state.live.remove(&id);
        state.calls.push(call);
    }

    fn is_live(&self, id: u32) -> bool {
        self.state.borrow().live.contains(&id)
    }

    fn uniform(&self, location: u32, kind: &'static str, data: UniformData) {
        self.record(Call::Uniform { location, kind, data });
    }
}

/// Names declared by lines starting with one of `qualifiers`.
///
/// Handles `layout(...)` prefixes, precision qualifiers and array suffixes.
fn declared_names(source: &str, qualifiers: &[&str]) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if line.starts_with("layout") {
                line = line.split_once(')')?.1.trim_start();
            }
            let rest = qualifiers.iter().find_map(|q| {
                line.strip_prefix(q)
                    .filter(|r| r.starts_with(char::is_whitespace))
            })?;
            let decl = rest.split(';').next()?;
            let name = decl.split_whitespace().last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

fn assign_locations(names: impl IntoIterator<Item = String>) -> HashMap<String, u32> {
    let mut out = HashMap::new();
    for name in names {
        let next = out.len() as u32;
        out.entry(name).or_insert(next);
    }
    out
}

impl Gl for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: u32) -> Result<u32, String> {
        let shader = self.create(|shader| Call::CreateShader { shader, stage });
        self.state.borrow_mut().shaders.insert(
            shader,
            ShaderObject { stage, source: String::new(), error: None },
        );
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CompileShader(shader));
        if let Some(obj) = state.shaders.get_mut(&shader) {
            obj.error = obj
                .source
                .lines()
                .enumerate()
                .find(|(_, l)| l.trim_start().starts_with("#error"))
                .map(|(i, l)| format!("ERROR: 0:{}: {}", i + 1, l.trim()));
        }
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.error.is_none())
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|s| s.error.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.delete(shader, Call::DeleteShader(shader));
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.create(Call::CreateProgram);
        self.state
            .borrow_mut()
            .programs
            .insert(program, ProgramObject::default());
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::LinkProgram(program));

        let attached = match state.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => return,
        };
        let stages: Vec<&ShaderObject> =
            attached.iter().filter_map(|s| state.shaders.get(s)).collect();

        let failure = if state.fail_links {
            Some("error: linking with uncompiled/unlinked program".to_string())
        } else if stages.iter().any(|s| s.error.is_some()) {
            Some("error: program has uncompiled shader stages".to_string())
        } else {
            None
        };

        let uniforms = assign_locations(
            stages
                .iter()
                .flat_map(|s| declared_names(&s.source, &["uniform"])),
        );
        let attributes = assign_locations(
            stages
                .iter()
                .filter(|s| s.stage == glow::VERTEX_SHADER)
                .flat_map(|s| declared_names(&s.source, &["in", "attribute"])),
        );

        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = failure.is_none();
            p.log = failure.unwrap_or_default();
            if p.linked {
                p.uniforms = uniforms;
                p.attributes = attributes;
            }
        }
    }

    fn get_program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn get_program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn is_program(&self, program: u32) -> bool {
        self.is_live(program)
    }

    fn delete_program(&self, program: u32) {
        self.delete(program, Call::DeleteProgram(program));
        self.state.borrow_mut().programs.remove(&program);
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get(name).copied())
    }

    fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.attributes.get(name).copied())
    }

    fn uniform_1_f32(&self, location: &u32, x: f32) {
        self.uniform(*location, "1f", UniformData::F32(vec![x]));
    }

    fn uniform_2_f32(&self, location: &u32, x: f32, y: f32) {
        self.uniform(*location, "2f", UniformData::F32(vec![x, y]));
    }

    fn uniform_3_f32(&self, location: &u32, x: f32, y: f32, z: f32) {
        self.uniform(*location, "3f", UniformData::F32(vec![x, y, z]));
    }

    fn uniform_4_f32(&self, location: &u32, x: f32, y: f32, z: f32, w: f32) {
        self.uniform(*location, "4f", UniformData::F32(vec![x, y, z, w]));
    }

    fn uniform_1_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "1fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_2_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "2fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_3_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "3fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_4_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "4fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_1_i32(&self, location: &u32, x: i32) {
        self.uniform(*location, "1i", UniformData::I32(vec![x]));
    }

    fn uniform_2_i32(&self, location: &u32, x: i32, y: i32) {
        self.uniform(*location, "2i", UniformData::I32(vec![x, y]));
    }

    fn uniform_3_i32(&self, location: &u32, x: i32, y: i32, z: i32) {
        self.uniform(*location, "3i", UniformData::I32(vec![x, y, z]));
    }

    fn uniform_4_i32(&self, location: &u32, x: i32, y: i32, z: i32, w: i32) {
        self.uniform(*location, "4i", UniformData::I32(vec![x, y, z, w]));
    }

    fn uniform_1_i32_slice(&self, location: &u32, v: &[i32]) {
        self.uniform(*location, "1iv", UniformData::I32(v.to_vec()));
    }

    fn uniform_2_i32_slice(&self, location: &u32, v: &[i32]) {
        self.uniform(*location, "2iv", UniformData::I32(v.to_vec()));
    }

    fn uniform_3_i32_slice(&self, location: &u32, v: &[i32]) {
        self.uniform(*location, "3iv", UniformData::I32(v.to_vec()));
    }

    fn uniform_4_i32_slice(&self, location: &u32, v: &[i32]) {
        self.uniform(*location, "4iv", UniformData::I32(v.to_vec()));
    }

    fn uniform_1_u32(&self, location: &u32, x: u32) {
        self.uniform(*location, "1ui", UniformData::U32(vec![x]));
    }

    fn uniform_2_u32(&self, location: &u32, x: u32, y: u32) {
        self.uniform(*location, "2ui", UniformData::U32(vec![x, y]));
    }

    fn uniform_3_u32(&self, location: &u32, x: u32, y: u32, z: u32) {
        self.uniform(*location, "3ui", UniformData::U32(vec![x, y, z]));
    }

    fn uniform_4_u32(&self, location: &u32, x: u32, y: u32, z: u32, w: u32) {
        self.uniform(*location, "4ui", UniformData::U32(vec![x, y, z, w]));
    }

    fn uniform_1_u32_slice(&self, location: &u32, v: &[u32]) {
        self.uniform(*location, "1uiv", UniformData::U32(v.to_vec()));
    }

    fn uniform_2_u32_slice(&self, location: &u32, v: &[u32]) {
        self.uniform(*location, "2uiv", UniformData::U32(v.to_vec()));
    }

    fn uniform_3_u32_slice(&self, location: &u32, v: &[u32]) {
        self.uniform(*location, "3uiv", UniformData::U32(v.to_vec()));
    }

    fn uniform_4_u32_slice(&self, location: &u32, v: &[u32]) {
        self.uniform(*location, "4uiv", UniformData::U32(v.to_vec()));
    }

    fn uniform_matrix_2_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "matrix2fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_matrix_3_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "matrix3fv", UniformData::F32(v.to_vec()));
    }

    fn uniform_matrix_4_f32_slice(&self, location: &u32, v: &[f32]) {
        self.uniform(*location, "matrix4fv", UniformData::F32(v.to_vec()));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        Ok(self.create(Call::CreateBuffer))
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        self.record(Call::BindBuffer { target, buffer });
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        self.record(Call::BufferData { target, len: data.len(), usage });
    }

    fn is_buffer(&self, buffer: u32) -> bool {
        self.is_live(buffer)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.delete(buffer, Call::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        Ok(self.create(Call::CreateVertexArray))
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.delete(vertex_array, Call::DeleteVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        self.record(Call::VertexAttribPointer { index, size, data_type });
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        self.record(Call::VertexAttribDivisor { index, divisor });
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_arrays_instanced(&self, mode: u32, first: i32, count: i32, instance_count: i32) {
        self.record(Call::DrawArraysInstanced { mode, first, count, instances: instance_count });
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.record(Call::DrawElements { mode, count, element_type, offset });
    }

    fn draw_elements_instanced(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        instance_count: i32,
    ) {
        self.record(Call::DrawElementsInstanced {
            mode,
            count,
            element_type,
            offset,
            instances: instance_count,
        });
    }

    fn create_texture(&self) -> Result<u32, String> {
        Ok(self.create(Call::CreateTexture))
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        self.record(Call::BindTexture { target, texture });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        _format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(Call::TexImage2d {
            internal_format,
            width,
            height,
            with_data: pixels.is_some(),
        });
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(Call::TexParameter { parameter, value });
    }

    fn is_texture(&self, texture: u32) -> bool {
        self.is_live(texture)
    }

    fn delete_texture(&self, texture: u32) {
        self.delete(texture, Call::DeleteTexture(texture));
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        Ok(self.create(Call::CreateFramebuffer))
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: Option<u32>) {
        self.record(Call::BindFramebuffer { target, framebuffer });
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: Option<u32>,
        _level: i32,
    ) {
        self.record(Call::FramebufferTexture2d { target, attachment, texture });
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        let status = state.framebuffer_status;
        state.calls.push(Call::CheckFramebufferStatus(status));
        status
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        self.record(Call::DrawBuffers(buffers.to_vec()));
    }

    fn blit_framebuffer(&self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        self.record(Call::BlitFramebuffer { src, dst, mask, filter });
    }

    fn is_framebuffer(&self, framebuffer: u32) -> bool {
        self.is_live(framebuffer)
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.delete(framebuffer, Call::DeleteFramebuffer(framebuffer));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport { x, y, width, height });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear_depth(&self, depth: f32) {
        self.record(Call::ClearDepth(depth));
    }

    fn clear_stencil(&self, stencil: i32) {
        self.record(Call::ClearStencil(stencil));
    }

    fn clear(&self, mask: u32) {
        self.record(Call::Clear(mask));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── introspection ─────────────────────────────────────────────────────

    #[test]
    fn declared_names_handles_qualifiers_and_arrays() {
        let src = "\
            #version 300 es\n\
            precision highp float;\n\
            uniform highp vec3 u_color;\n\
            uniform mat4 u_bones[16];\n\
            layout(location = 0) in vec3 a_position;\n\
            in vec2 a_uv;\n\
            int index;\n";
        assert_eq!(declared_names(src, &["uniform"]), vec!["u_color", "u_bones"]);
        assert_eq!(declared_names(src, &["in", "attribute"]), vec!["a_position", "a_uv"]);
    }

    #[test]
    fn declared_names_ignores_identifiers_with_qualifier_prefix() {
        // `int` starts with `in` but is not an input declaration.
        assert!(declared_names("int count;\n", &["in"]).is_empty());
        assert!(declared_names("uniformity = 1;\n", &["uniform"]).is_empty());
    }

    #[test]
    fn link_assigns_locations_in_declaration_order() {
        let gl = RecordingGl::new();
        let vs = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vs, "in vec3 a_pos;\nuniform mat4 u_mvp;\n");
        gl.compile_shader(vs);
        let fs = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(fs, "uniform vec3 u_color;\nin vec3 v_normal;\n");
        gl.compile_shader(fs);

        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);

        assert!(gl.get_program_link_status(p));
        assert_eq!(gl.get_uniform_location(p, "u_mvp"), Some(0));
        assert_eq!(gl.get_uniform_location(p, "u_color"), Some(1));
        assert_eq!(gl.get_attrib_location(p, "a_pos"), Some(0));
        // Fragment inputs are varyings, not attributes.
        assert_eq!(gl.get_attrib_location(p, "v_normal"), None);
    }

    #[test]
    fn error_directive_fails_compilation_with_log() {
        let gl = RecordingGl::new();
        let s = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(s, "void main() {}\n#error broken\n");
        gl.compile_shader(s);
        assert!(!gl.get_shader_compile_status(s));
        assert_eq!(gl.get_shader_info_log(s), "ERROR: 0:2: #error broken");
    }

    // ── liveness ──────────────────────────────────────────────────────────

    #[test]
    fn lose_context_invalidates_every_object() {
        let gl = RecordingGl::new();
        let t = gl.create_texture().unwrap();
        let f = gl.create_framebuffer().unwrap();
        assert!(gl.is_texture(t) && gl.is_framebuffer(f));

        gl.lose_context();
        assert!(!gl.is_texture(t));
        assert!(!gl.is_framebuffer(f));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn invalidate_drops_one_object() {
        let gl = RecordingGl::new();
        let b = gl.create_buffer().unwrap();
        let t = gl.create_texture().unwrap();

        gl.invalidate(b);
        assert!(!gl.is_buffer(b));
        assert!(gl.is_texture(t));
        assert_eq!(gl.live_objects(), 1);
    }

    #[test]
    fn clones_share_the_call_log() {
        let gl = RecordingGl::new();
        let other = gl.clone();
        other.clear(glow::COLOR_BUFFER_BIT);
        assert_eq!(gl.take_calls(), vec![Call::Clear(glow::COLOR_BUFFER_BIT)]);
        assert!(other.calls().is_empty());
    }
}
