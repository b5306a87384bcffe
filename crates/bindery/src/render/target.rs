use std::rc::Rc;

use crate::backend::Gl;
use crate::device::{gl_size, Device, Viewport};
use crate::geometry::VertexArray;
use crate::program::Command;
use crate::surface::Framebuffer;

use super::{BufferBits, ClearValues};

/// A drawable surface: the default surface or a framebuffer's attachments.
///
/// Every operation enters the target through the device's registers (draw
/// framebuffer + viewport) and leaves it on every exit path, so targets can
/// be nested freely.
pub struct Target<G: Gl> {
    device: Rc<Device<G>>,

    /// `None` draws to the default surface.
    framebuffer: Option<G::Framebuffer>,

    /// `COLOR_ATTACHMENTi` slots written by this target, in order.
    color_attachments: Vec<u32>,

    /// Fixed extent; `None` follows the device surface.
    extent: Option<(u32, u32)>,
}

impl<G: Gl> Clone for Target<G> {
    fn clone(&self) -> Self {
        Self {
            device: Rc::clone(&self.device),
            framebuffer: self.framebuffer,
            color_attachments: self.color_attachments.clone(),
            extent: self.extent,
        }
    }
}

impl<G: Gl> Target<G> {
    pub(crate) fn surface(device: Rc<Device<G>>) -> Self {
        Self {
            device,
            framebuffer: None,
            color_attachments: vec![glow::BACK],
            extent: None,
        }
    }

    pub(crate) fn offscreen(
        device: Rc<Device<G>>,
        framebuffer: G::Framebuffer,
        color_attachments: Vec<u32>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            device,
            framebuffer: Some(framebuffer),
            color_attachments,
            extent: Some((width, height)),
        }
    }

    /// Returns `(width, height)` in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.extent.unwrap_or_else(|| self.device.surface_size())
    }

    /// Returns the framebuffer handle, `None` for the default surface.
    pub fn framebuffer(&self) -> Option<G::Framebuffer> {
        self.framebuffer
    }

    /// Returns the color attachment slots this target draws into.
    pub fn color_attachments(&self) -> &[u32] {
        &self.color_attachments
    }

    /// Binds this target (framebuffer + full viewport), runs `f`, then
    /// restores the previous bindings, also when `f` fails or unwinds.
    pub fn with<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let (width, height) = self.size();
        let _framebuffer = self.device.scope_draw_framebuffer(self.framebuffer);
        let _viewport = self.device.scope_viewport(Viewport::full(width, height));
        f(self)
    }

    /// Clears the selected buffers.
    ///
    /// Values missing from `values` clear to zero; a `Command`'s configured
    /// clear is never consulted here.
    pub fn clear(&self, bits: BufferBits, values: &ClearValues) {
        self.with(|target| target.apply_clear(bits, values));
    }

    /// Issues one draw of `vertex_array` with `command`, evaluating every
    /// uniform against `props`.
    pub fn draw<P>(&self, command: &Command<G, P>, vertex_array: &VertexArray<G>, props: &P) {
        log::trace!(
            "draw {:?}: count {}, instances {}, target {:?}",
            command.primitive(),
            vertex_array.count(),
            vertex_array.instance_count(),
            self.framebuffer
        );
        self.with(|target| {
            command.bind();
            command.update_uniforms(props);
            vertex_array.bind();
            if let Some(clear) = command.clear_values() {
                target.apply_clear(clear.bits(), clear);
            }
            vertex_array.draw(command.primitive());
            vertex_array.unbind();
        });
    }

    /// Binds `command` once and lets `f` issue any number of draws with it.
    ///
    /// The command's configured clear, if any, runs once before `f`.
    pub fn batch<P, R>(&self, command: &Command<G, P>, f: impl FnOnce(&Batch<'_, G, P>) -> R) -> R {
        self.with(|target| {
            command.bind();
            if let Some(clear) = command.clear_values() {
                target.apply_clear(clear.bits(), clear);
            }
            f(&Batch { command })
        })
    }

    /// Copies the selected buffers of `source` into this target.
    ///
    /// The whole source extent is stretched onto the whole target extent with
    /// nearest filtering. Extent compatibility is the caller's concern.
    pub fn blit(&self, source: &Framebuffer<G>, bits: BufferBits) {
        let (sw, sh) = source.size();
        let (tw, th) = self.size();

        let _read = self.device.scope_read_framebuffer(Some(source.raw()));
        let _draw = self.device.scope_draw_framebuffer(self.framebuffer);
        self.device.gl().blit_framebuffer(
            [0, 0, gl_size(sw), gl_size(sh)],
            [0, 0, gl_size(tw), gl_size(th)],
            bits.bits(),
            glow::NEAREST,
        );
    }

    fn apply_clear(&self, bits: BufferBits, values: &ClearValues) {
        if bits.is_empty() {
            return;
        }

        let gl = self.device.gl();
        if bits.contains(BufferBits::COLOR) {
            let [r, g, b, a] = values.color.unwrap_or([0.0; 4]);
            gl.clear_color(r, g, b, a);
        }
        if bits.contains(BufferBits::DEPTH) {
            gl.clear_depth(values.depth.unwrap_or(0.0));
        }
        if bits.contains(BufferBits::STENCIL) {
            gl.clear_stencil(values.stencil.unwrap_or(0));
        }
        gl.clear(bits.bits());
    }
}

/// Draw handle passed to the [`Target::batch`] callback.
///
/// The program is already bound; each draw only updates uniforms and
/// dispatches geometry.
pub struct Batch<'a, G: Gl, P> {
    command: &'a Command<G, P>,
}

impl<G: Gl, P> Batch<'_, G, P> {
    pub fn draw(&self, vertex_array: &VertexArray<G>, props: &P) {
        self.command.update_uniforms(props);
        vertex_array.bind();
        vertex_array.draw(self.command.primitive());
        vertex_array.unbind();
    }
}
