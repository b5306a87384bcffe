use std::fmt;

use crate::backend::Gl;
use crate::error::{Error, Result};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    #[inline]
    pub const fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

fn compile<G: Gl>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader> {
    let shader = gl.create_shader(stage.gl_enum()).map_err(Error::ObjectCreation)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(Error::Compile { stage, log });
    }
    Ok(shader)
}

/// Compiles both stages and links them into a program.
///
/// Shader objects are released whether or not linking succeeds; on failure
/// the program is released too.
pub(crate) fn link_program<G: Gl>(gl: &G, vertex: &str, fragment: &str) -> Result<G::Program> {
    let vs = compile(gl, ShaderStage::Vertex, vertex)?;
    let fs = match compile(gl, ShaderStage::Fragment, fragment) {
        Ok(fs) => fs,
        Err(err) => {
            gl.delete_shader(vs);
            return Err(err);
        }
    };

    let program = match gl.create_program() {
        Ok(program) => program,
        Err(msg) => {
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(Error::ObjectCreation(msg));
        }
    };

    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    let linked = gl.get_program_link_status(program);
    let log = if linked { String::new() } else { gl.get_program_info_log(program) };

    for shader in [vs, fs] {
        gl.detach_shader(program, shader);
        gl.delete_shader(shader);
    }

    if !linked {
        gl.delete_program(program);
        return Err(Error::Link { log });
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingGl;
    use crate::backend::recording::Call;

    const VS: &str = "in vec3 a_position;\nvoid main() {}\n";
    const FS: &str = "uniform vec4 u_color;\nvoid main() {}\n";

    #[test]
    fn compile_error_reports_stage_and_log() {
        let gl = RecordingGl::new();
        let err = link_program(&gl, VS, "#error missing semicolon\n").unwrap_err();
        assert_eq!(
            err,
            Error::Compile {
                stage: ShaderStage::Fragment,
                log: "ERROR: 0:1: #error missing semicolon".into(),
            }
        );
        // Both shader objects were released and no program was created.
        assert_eq!(gl.live_objects(), 0);
        assert_eq!(gl.count(|c| matches!(c, Call::CreateProgram(_))), 0);
    }

    #[test]
    fn link_error_releases_program() {
        let gl = RecordingGl::new();
        gl.set_fail_links(true);
        let err = link_program(&gl, VS, FS).unwrap_err();
        assert!(matches!(err, Error::Link { .. }));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn successful_link_keeps_only_the_program() {
        let gl = RecordingGl::new();
        let program = link_program(&gl, VS, FS).unwrap();
        assert_eq!(gl.live_objects(), 1);
        assert_eq!(gl.get_uniform_location(program, "u_color"), Some(0));
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.gl_enum(), glow::FRAGMENT_SHADER);
    }
}
