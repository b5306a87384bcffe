use glow::HasContext;

use super::Gl;

/// [`Gl`] over any `glow` context.
///
/// # Safety
///
/// `glow` calls are `unsafe` because they require a current context and
/// handles that belong to it. [`GlowContext::new`] moves that obligation to
/// construction time; afterwards every call is issued on the wrapped context
/// only, with handles produced by that same context.
pub struct GlowContext<C: HasContext> {
    gl: C,
}

impl<C: HasContext> GlowContext<C> {
    /// Wraps a `glow` context.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for as long as the wrapper
    /// (and any object created through it) is alive, and must not be made
    /// current elsewhere in the meantime.
    pub unsafe fn new(gl: C) -> Self {
        Self { gl }
    }

    /// Returns the wrapped context.
    pub fn inner(&self) -> &C {
        &self.gl
    }
}

// SAFETY (all methods below): the context is current for the lifetime of
// `self` per the contract of `GlowContext::new`, and every handle passed in
// was produced by this context.
impl<C: HasContext> Gl for GlowContext<C> {
    type Shader = C::Shader;
    type Program = C::Program;
    type Buffer = C::Buffer;
    type VertexArray = C::VertexArray;
    type Texture = C::Texture;
    type Framebuffer = C::Framebuffer;
    type UniformLocation = C::UniformLocation;

    fn create_shader(&self, stage: u32) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn is_program(&self, program: Self::Program) -> bool {
        unsafe { self.gl.is_program(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), x) }
    }

    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { self.gl.uniform_2_f32(Some(location), x, y) }
    }

    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { self.gl.uniform_3_f32(Some(location), x, y, z) }
    }

    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe { self.gl.uniform_4_f32(Some(location), x, y, z, w) }
    }

    fn uniform_1_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_1_f32_slice(Some(location), v) }
    }

    fn uniform_2_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_2_f32_slice(Some(location), v) }
    }

    fn uniform_3_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_3_f32_slice(Some(location), v) }
    }

    fn uniform_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_4_f32_slice(Some(location), v) }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), x) }
    }

    fn uniform_2_i32(&self, location: &Self::UniformLocation, x: i32, y: i32) {
        unsafe { self.gl.uniform_2_i32(Some(location), x, y) }
    }

    fn uniform_3_i32(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32) {
        unsafe { self.gl.uniform_3_i32(Some(location), x, y, z) }
    }

    fn uniform_4_i32(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32, w: i32) {
        unsafe { self.gl.uniform_4_i32(Some(location), x, y, z, w) }
    }

    fn uniform_1_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]) {
        unsafe { self.gl.uniform_1_i32_slice(Some(location), v) }
    }

    fn uniform_2_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]) {
        unsafe { self.gl.uniform_2_i32_slice(Some(location), v) }
    }

    fn uniform_3_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]) {
        unsafe { self.gl.uniform_3_i32_slice(Some(location), v) }
    }

    fn uniform_4_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]) {
        unsafe { self.gl.uniform_4_i32_slice(Some(location), v) }
    }

    fn uniform_1_u32(&self, location: &Self::UniformLocation, x: u32) {
        unsafe { self.gl.uniform_1_u32(Some(location), x) }
    }

    fn uniform_2_u32(&self, location: &Self::UniformLocation, x: u32, y: u32) {
        unsafe { self.gl.uniform_2_u32(Some(location), x, y) }
    }

    fn uniform_3_u32(&self, location: &Self::UniformLocation, x: u32, y: u32, z: u32) {
        unsafe { self.gl.uniform_3_u32(Some(location), x, y, z) }
    }

    fn uniform_4_u32(&self, location: &Self::UniformLocation, x: u32, y: u32, z: u32, w: u32) {
        unsafe { self.gl.uniform_4_u32(Some(location), x, y, z, w) }
    }

    fn uniform_1_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]) {
        unsafe { self.gl.uniform_1_u32_slice(Some(location), v) }
    }

    fn uniform_2_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]) {
        unsafe { self.gl.uniform_2_u32_slice(Some(location), v) }
    }

    fn uniform_3_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]) {
        unsafe { self.gl.uniform_3_u32_slice(Some(location), v) }
    }

    fn uniform_4_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]) {
        unsafe { self.gl.uniform_4_u32_slice(Some(location), v) }
    }

    fn uniform_matrix_2_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_matrix_2_f32_slice(Some(location), false, v) }
    }

    fn uniform_matrix_3_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_matrix_3_f32_slice(Some(location), false, v) }
    }

    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(location), false, v) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target, buffer) }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) }
    }

    fn is_buffer(&self, buffer: Self::Buffer) -> bool {
        unsafe { self.gl.is_buffer(buffer) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset)
        }
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        unsafe { self.gl.vertex_attrib_divisor(index, divisor) }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn draw_arrays_instanced(&self, mode: u32, first: i32, count: i32, instance_count: i32) {
        unsafe { self.gl.draw_arrays_instanced(mode, first, count, instance_count) }
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, element_type, offset) }
    }

    fn draw_elements_instanced(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        instance_count: i32,
    ) {
        unsafe {
            self.gl
                .draw_elements_instanced(mode, count, element_type, offset, instance_count)
        }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { self.gl.create_texture() }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) }
    }

    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(target, texture) }
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) }
    }

    fn is_texture(&self, texture: Self::Texture) -> bool {
        unsafe { self.gl.is_texture(texture) }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn create_framebuffer(&self) -> Result<Self::Framebuffer, String> {
        unsafe { self.gl.create_framebuffer() }
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: Option<Self::Framebuffer>) {
        unsafe { self.gl.bind_framebuffer(target, framebuffer) }
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    ) {
        unsafe {
            self.gl
                .framebuffer_texture_2d(target, attachment, texture_target, texture, level)
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        unsafe { self.gl.draw_buffers(buffers) }
    }

    fn blit_framebuffer(&self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        let [sx0, sy0, sx1, sy1] = src;
        let [dx0, dy0, dx1, dy1] = dst;
        unsafe {
            self.gl
                .blit_framebuffer(sx0, sy0, sx1, sy1, dx0, dy0, dx1, dy1, mask, filter)
        }
    }

    fn is_framebuffer(&self, framebuffer: Self::Framebuffer) -> bool {
        unsafe { self.gl.is_framebuffer(framebuffer) }
    }

    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer) {
        unsafe { self.gl.delete_framebuffer(framebuffer) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_depth(&self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) }
    }

    fn clear_stencil(&self, stencil: i32) {
        unsafe { self.gl.clear_stencil(stencil) }
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) }
    }
}
