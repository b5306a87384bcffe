//! GPU API seam.
//!
//! The core never talks to a driver directly. Everything goes through [`Gl`],
//! a narrow mirror of the OpenGL ES 3 / WebGL2 calls this crate needs.
//!
//! Two implementations ship with the crate:
//! - [`GlowContext`] forwards to any `glow::HasContext`
//! - [`RecordingGl`] is headless and records every call, for tests and tooling
//!
//! GL enums are passed as raw `u32` values using the `glow` constants.

mod glow_context;
pub mod recording;

pub use glow_context::GlowContext;
pub use recording::RecordingGl;

use std::fmt::Debug;

/// The subset of a GL context the core depends on.
///
/// Methods are safe: implementations are responsible for upholding the
/// driver's contract (current context, valid handles for live objects).
pub trait Gl {
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;
    type Buffer: Copy + Eq + Debug;
    type VertexArray: Copy + Eq + Debug;
    type Texture: Copy + Eq + Debug;
    type Framebuffer: Copy + Eq + Debug;
    type UniformLocation: Clone + Debug;

    // ── shaders & programs ───────────────────────────────────────────────

    fn create_shader(&self, stage: u32) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn get_program_link_status(&self, program: Self::Program) -> bool;
    fn get_program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn is_program(&self, program: Self::Program) -> bool;
    fn delete_program(&self, program: Self::Program);

    fn get_uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    // ── uniforms ─────────────────────────────────────────────────────────

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);
    fn uniform_2_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);
    fn uniform_3_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);
    fn uniform_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);
    fn uniform_2_i32(&self, location: &Self::UniformLocation, x: i32, y: i32);
    fn uniform_3_i32(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32);
    fn uniform_4_i32(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32, w: i32);
    fn uniform_1_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]);
    fn uniform_2_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]);
    fn uniform_3_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]);
    fn uniform_4_i32_slice(&self, location: &Self::UniformLocation, v: &[i32]);

    fn uniform_1_u32(&self, location: &Self::UniformLocation, x: u32);
    fn uniform_2_u32(&self, location: &Self::UniformLocation, x: u32, y: u32);
    fn uniform_3_u32(&self, location: &Self::UniformLocation, x: u32, y: u32, z: u32);
    fn uniform_4_u32(&self, location: &Self::UniformLocation, x: u32, y: u32, z: u32, w: u32);
    fn uniform_1_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]);
    fn uniform_2_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]);
    fn uniform_3_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]);
    fn uniform_4_u32_slice(&self, location: &Self::UniformLocation, v: &[u32]);

    fn uniform_matrix_2_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);
    fn uniform_matrix_3_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);
    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);

    // ── buffers & vertex arrays ──────────────────────────────────────────

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    fn is_buffer(&self, buffer: Self::Buffer) -> bool;
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn vertex_attrib_divisor(&self, index: u32, divisor: u32);

    // ── draw calls ───────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_arrays_instanced(&self, mode: u32, first: i32, count: i32, instance_count: i32);
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);
    fn draw_elements_instanced(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        instance_count: i32,
    );

    // ── textures ─────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
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
    );
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    fn is_texture(&self, texture: Self::Texture) -> bool;
    fn delete_texture(&self, texture: Self::Texture);

    // ── framebuffers ─────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> Result<Self::Framebuffer, String>;
    fn bind_framebuffer(&self, target: u32, framebuffer: Option<Self::Framebuffer>);
    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    );
    fn check_framebuffer_status(&self, target: u32) -> u32;
    fn draw_buffers(&self, buffers: &[u32]);
    fn blit_framebuffer(
        &self,
        src: [i32; 4],
        dst: [i32; 4],
        mask: u32,
        filter: u32,
    );
    fn is_framebuffer(&self, framebuffer: Self::Framebuffer) -> bool;
    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);

    // ── fixed-function state ─────────────────────────────────────────────

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, depth: f32);
    fn clear_stencil(&self, stencil: i32);
    fn clear(&self, mask: u32);
}
