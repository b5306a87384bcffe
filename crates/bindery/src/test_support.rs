//! Fixtures shared by the unit tests.

use std::rc::Rc;

use crate::backend::RecordingGl;
use crate::device::{Device, DeviceInit};
use crate::geometry::{Attribute, VertexArray};
use crate::program::Command;

pub const VERTEX: &str = "\
#version 300 es
in vec3 a_position;
void main() { gl_Position = vec4(a_position, 1.0); }
";

pub const FRAGMENT: &str = "\
#version 300 es
precision mediump float;
uniform vec3 u_color;
out vec4 frag_color;
void main() { frag_color = vec4(u_color, 1.0); }
";

/// A recording backend and a 640x480 device over it.
pub fn device() -> (RecordingGl, Rc<Device<RecordingGl>>) {
    let gl = RecordingGl::new();
    let device = Device::new(gl.clone(), DeviceInit { width: 640, height: 480 });
    (gl, device)
}

/// A non-indexed three-vertex triangle located against `command`.
pub fn triangle<P>(
    device: &Rc<Device<RecordingGl>>,
    command: &Command<RecordingGl, P>,
) -> VertexArray<RecordingGl> {
    let positions = [0.0f32, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0];
    let attributes = command
        .locate([("a_position", Attribute::new(&positions, 3))])
        .unwrap();
    VertexArray::new(device, attributes, None).unwrap()
}
