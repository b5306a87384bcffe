use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backend::Gl;
use crate::render::Target;

use super::registers::{Register, Registers, StackDepths};
use super::viewport::gl_size;
use super::{DeviceInit, Viewport};

/// Owns the rendering context and the binding-stack registers.
///
/// This is the only type that issues framebuffer and viewport binds. Every
/// other component changes bind state by pushing onto a register and popping
/// when done, usually through a [`Scope`] guard so that early returns and
/// unwinding restore the caller's binding.
///
/// Exactly one `Device` exists per surface; resources hold an `Rc` to it.
pub struct Device<G: Gl> {
    /// Rendering context.
    gl: G,

    /// Draw-framebuffer, read-framebuffer and viewport stacks.
    registers: RefCell<Registers<G::Framebuffer>>,

    /// Default surface extent in physical pixels.
    surface: Cell<(u32, u32)>,

    /// `TEXTURE_2D` bindings issued through the device.
    texture_units: RefCell<TextureUnits<G::Texture>>,
}

/// Active texture unit and the last texture bound on each unit.
struct TextureUnits<T> {
    active: u32,
    bound: Vec<Option<T>>,
}

impl<T: Copy + PartialEq> TextureUnits<T> {
    fn new() -> Self {
        Self { active: 0, bound: Vec::new() }
    }

    fn bound(&self, unit: u32) -> Option<T> {
        self.bound.get(unit as usize).copied().flatten()
    }

    fn set(&mut self, unit: u32, texture: Option<T>) {
        let unit = unit as usize;
        if self.bound.len() <= unit {
            self.bound.resize(unit + 1, None);
        }
        self.bound[unit] = texture;
    }
}

impl<G: Gl> Device<G> {
    /// Takes ownership of a rendering context bound to one surface.
    pub fn new(gl: G, init: DeviceInit) -> Rc<Self> {
        let DeviceInit { width, height } = init;
        log::debug!("device created for {width}x{height} surface");

        Rc::new(Self {
            gl,
            registers: RefCell::new(Registers::new()),
            surface: Cell::new((width, height)),
            texture_units: RefCell::new(TextureUnits::new()),
        })
    }

    /// Returns the rendering context.
    ///
    /// Crate-private: outside components must not bind state directly.
    #[inline]
    pub(crate) fn gl(&self) -> &G {
        &self.gl
    }

    /// Returns the default surface extent (physical pixels).
    #[inline]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface.get()
    }

    /// Updates the default surface extent after a host resize.
    ///
    /// If no viewport is pushed, the live viewport is updated immediately;
    /// otherwise the new base takes effect once the stack unwinds.
    pub fn resize(&self, width: u32, height: u32) {
        self.surface.set((width, height));
        if self.registers.borrow().viewport.is_empty() {
            self.apply_viewport(Viewport::full(width, height));
        }
    }

    /// Returns a [`Target`] for the default surface.
    ///
    /// Its extent follows [`resize`](Self::resize).
    pub fn target(self: &Rc<Self>) -> Target<G> {
        Target::surface(Rc::clone(self))
    }

    /// Returns the depth of every register.
    pub fn stack_depths(&self) -> StackDepths {
        self.registers.borrow().depths()
    }

    // ── push / pop ────────────────────────────────────────────────────────

    /// Binds `framebuffer` (or the default surface for `None`) as the draw
    /// framebuffer. Must be balanced with [`pop_draw_framebuffer`](Self::pop_draw_framebuffer).
    pub fn push_draw_framebuffer(&self, framebuffer: Option<G::Framebuffer>) {
        self.registers.borrow_mut().draw_framebuffer.push(framebuffer);
        self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer);
    }

    /// Restores the draw framebuffer that was live before the matching push.
    pub fn pop_draw_framebuffer(&self) {
        self.pop(Register::DrawFramebuffer);
    }

    /// Binds `framebuffer` (or the default surface for `None`) as the read
    /// framebuffer. Must be balanced with [`pop_read_framebuffer`](Self::pop_read_framebuffer).
    pub fn push_read_framebuffer(&self, framebuffer: Option<G::Framebuffer>) {
        self.registers.borrow_mut().read_framebuffer.push(framebuffer);
        self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, framebuffer);
    }

    /// Restores the read framebuffer that was live before the matching push.
    pub fn pop_read_framebuffer(&self) {
        self.pop(Register::ReadFramebuffer);
    }

    /// Sets the viewport. Must be balanced with [`pop_viewport`](Self::pop_viewport).
    pub fn push_viewport(&self, viewport: Viewport) {
        self.registers.borrow_mut().viewport.push(viewport);
        self.apply_viewport(viewport);
    }

    /// Restores the viewport that was live before the matching push.
    pub fn pop_viewport(&self) {
        self.pop(Register::Viewport);
    }

    fn pop(&self, register: Register) {
        let mut registers = self.registers.borrow_mut();
        let applied = match register {
            Register::DrawFramebuffer => {
                Registers::pop_framebuffer(&mut registers.draw_framebuffer).map(|fb| {
                    self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, fb);
                })
            }
            Register::ReadFramebuffer => {
                Registers::pop_framebuffer(&mut registers.read_framebuffer).map(|fb| {
                    self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, fb);
                })
            }
            Register::Viewport => registers.viewport.pop().map(|_| {
                let (w, h) = self.surface.get();
                let next = registers
                    .viewport
                    .last()
                    .copied()
                    .unwrap_or(Viewport::full(w, h));
                self.apply_viewport(next);
            }),
        };

        if applied.is_none() {
            log::warn!("{register:?} register popped while empty; ignored");
        }
    }

    fn apply_viewport(&self, viewport: Viewport) {
        self.gl.viewport(
            viewport.x,
            viewport.y,
            gl_size(viewport.width),
            gl_size(viewport.height),
        );
    }

    // ── scopes ────────────────────────────────────────────────────────────

    /// Pushes the draw framebuffer and returns a guard that pops it on drop.
    pub fn scope_draw_framebuffer(&self, framebuffer: Option<G::Framebuffer>) -> Scope<'_, G> {
        self.push_draw_framebuffer(framebuffer);
        Scope::new(self, Register::DrawFramebuffer)
    }

    /// Pushes the read framebuffer and returns a guard that pops it on drop.
    pub fn scope_read_framebuffer(&self, framebuffer: Option<G::Framebuffer>) -> Scope<'_, G> {
        self.push_read_framebuffer(framebuffer);
        Scope::new(self, Register::ReadFramebuffer)
    }

    /// Pushes the viewport and returns a guard that pops it on drop.
    pub fn scope_viewport(&self, viewport: Viewport) -> Scope<'_, G> {
        self.push_viewport(viewport);
        Scope::new(self, Register::Viewport)
    }

    /// Runs `f` with `framebuffer` bound for drawing.
    pub fn with_draw_framebuffer<R>(
        &self,
        framebuffer: Option<G::Framebuffer>,
        f: impl FnOnce() -> R,
    ) -> R {
        let _scope = self.scope_draw_framebuffer(framebuffer);
        f()
    }

    /// Runs `f` with `framebuffer` bound for reading.
    pub fn with_read_framebuffer<R>(
        &self,
        framebuffer: Option<G::Framebuffer>,
        f: impl FnOnce() -> R,
    ) -> R {
        let _scope = self.scope_read_framebuffer(framebuffer);
        f()
    }

    /// Runs `f` with `viewport` applied.
    pub fn with_viewport<R>(&self, viewport: Viewport, f: impl FnOnce() -> R) -> R {
        let _scope = self.scope_viewport(viewport);
        f()
    }

    // ── texture units ─────────────────────────────────────────────────────

    /// Binds `texture` to `TEXTURE_2D` on texture unit `unit`.
    pub(crate) fn bind_texture_unit(&self, unit: u32, texture: G::Texture) {
        let mut units = self.texture_units.borrow_mut();
        units.active = unit;
        units.set(unit, Some(texture));
        self.gl.active_texture(glow::TEXTURE0 + unit);
        self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    }

    /// Runs `f` with `texture` bound to `TEXTURE_2D` on the active unit, then
    /// rebinds whatever the device last bound there.
    pub(crate) fn with_texture_2d<R>(&self, texture: G::Texture, f: impl FnOnce(&G) -> R) -> R {
        let previous = {
            let units = self.texture_units.borrow();
            units.bound(units.active)
        };
        self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        let result = f(&self.gl);
        self.gl.bind_texture(glow::TEXTURE_2D, previous);
        result
    }

    /// Drops every recorded binding of `texture`.
    ///
    /// Called when the texture is deleted or found invalid, since GL unbinds
    /// deleted names from every unit.
    pub(crate) fn forget_texture(&self, texture: G::Texture) {
        for slot in &mut self.texture_units.borrow_mut().bound {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

/// Guard returned by the `scope_*` methods of [`Device`].
///
/// Pops its register when dropped, including during unwinding.
#[must_use = "the binding is popped as soon as the scope is dropped"]
pub struct Scope<'d, G: Gl> {
    device: &'d Device<G>,
    register: Register,
    depth: usize,
}

impl<'d, G: Gl> Scope<'d, G> {
    fn new(device: &'d Device<G>, register: Register) -> Self {
        let depth = device.registers.borrow().depth(register);
        Self { device, register, depth }
    }

    /// Register this scope will pop.
    pub fn register(&self) -> Register {
        self.register
    }
}

impl<G: Gl> Drop for Scope<'_, G> {
    fn drop(&mut self) {
        // A second panic while unwinding would abort.
        if !std::thread::panicking() {
            debug_assert_eq!(
                self.device.registers.borrow().depth(self.register),
                self.depth,
                "{:?} scope closed out of order",
                self.register
            );
        }
        self.device.pop(self.register);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingGl;
    use crate::backend::recording::Call;

    fn device() -> (RecordingGl, Rc<Device<RecordingGl>>) {
        let gl = RecordingGl::new();
        let device = Device::new(gl.clone(), DeviceInit { width: 640, height: 480 });
        (gl, device)
    }

    fn bind_draw(fb: Option<u32>) -> Call {
        Call::BindFramebuffer { target: glow::DRAW_FRAMEBUFFER, framebuffer: fb }
    }

    // ── framebuffer registers ─────────────────────────────────────────────

    #[test]
    fn nested_pushes_restore_in_reverse_order() {
        let (gl, device) = device();
        device.push_draw_framebuffer(Some(10));
        device.push_draw_framebuffer(Some(20));
        device.pop_draw_framebuffer();
        device.pop_draw_framebuffer();

        assert_eq!(
            gl.take_calls(),
            vec![bind_draw(Some(10)), bind_draw(Some(20)), bind_draw(Some(10)), bind_draw(None)]
        );
        assert_eq!(device.stack_depths(), StackDepths::default());
    }

    #[test]
    fn read_and_draw_registers_are_independent() {
        let (gl, device) = device();
        device.with_read_framebuffer(Some(1), || {
            device.with_draw_framebuffer(Some(2), || {
                assert_eq!(
                    device.stack_depths(),
                    StackDepths { draw_framebuffer: 1, read_framebuffer: 1, viewport: 0 }
                );
            });
        });

        let calls = gl.take_calls();
        assert_eq!(
            calls.last(),
            Some(&Call::BindFramebuffer { target: glow::READ_FRAMEBUFFER, framebuffer: None })
        );
        assert_eq!(device.stack_depths(), StackDepths::default());
    }

    #[test]
    fn scope_pops_during_unwind() {
        let (_gl, device) = device();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            device.with_draw_framebuffer(Some(5), || panic!("callback failed"));
        }));
        assert!(result.is_err());
        assert_eq!(device.stack_depths().draw_framebuffer, 0);
    }

    #[test]
    fn out_of_order_scopes_still_unwind() {
        let (_gl, device) = device();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            // Tuple fields drop first to last, so the outer scope closes first.
            let _scopes = (
                device.scope_draw_framebuffer(Some(1)),
                device.scope_draw_framebuffer(Some(2)),
            );
            panic!("callback failed");
        }));
        assert!(result.is_err());
        assert_eq!(device.stack_depths().draw_framebuffer, 0);
    }

    #[test]
    fn popping_empty_register_is_ignored() {
        let (gl, device) = device();
        device.pop_draw_framebuffer();
        device.pop_viewport();
        assert!(gl.calls().is_empty());
    }

    // ── viewport register ─────────────────────────────────────────────────

    #[test]
    fn viewport_pop_falls_back_to_surface() {
        let (gl, device) = device();
        device.with_viewport(Viewport::full(64, 64), || {});
        assert_eq!(
            gl.take_calls(),
            vec![
                Call::Viewport { x: 0, y: 0, width: 64, height: 64 },
                Call::Viewport { x: 0, y: 0, width: 640, height: 480 },
            ]
        );
    }

    #[test]
    fn resize_applies_only_when_no_viewport_is_pushed() {
        let (gl, device) = device();
        device.push_viewport(Viewport::full(8, 8));
        gl.take_calls();

        device.resize(800, 600);
        assert!(gl.take_calls().is_empty());
        assert_eq!(device.surface_size(), (800, 600));

        device.pop_viewport();
        assert_eq!(
            gl.take_calls(),
            vec![Call::Viewport { x: 0, y: 0, width: 800, height: 600 }]
        );

        device.resize(1024, 768);
        assert_eq!(
            gl.take_calls(),
            vec![Call::Viewport { x: 0, y: 0, width: 1024, height: 768 }]
        );
    }

    // ── texture units ─────────────────────────────────────────────────────

    #[test]
    fn with_texture_2d_rebinds_the_unit_binding() {
        let (gl, device) = device();
        device.bind_texture_unit(1, 7);
        gl.take_calls();

        let seen = device.with_texture_2d(9, |_| 3);
        assert_eq!(seen, 3);
        assert_eq!(
            gl.take_calls(),
            vec![
                Call::BindTexture { target: glow::TEXTURE_2D, texture: Some(9) },
                Call::BindTexture { target: glow::TEXTURE_2D, texture: Some(7) },
            ]
        );
    }

    #[test]
    fn forgotten_texture_is_not_rebound() {
        let (gl, device) = device();
        device.bind_texture_unit(0, 7);
        device.forget_texture(7);
        gl.take_calls();

        device.with_texture_2d(9, |_| ());
        assert_eq!(
            gl.take_calls().last(),
            Some(&Call::BindTexture { target: glow::TEXTURE_2D, texture: None })
        );
    }

    #[test]
    fn bind_texture_unit_selects_unit_first() {
        let (gl, device) = device();
        device.bind_texture_unit(2, 9);
        assert_eq!(
            gl.take_calls(),
            vec![
                Call::ActiveTexture(glow::TEXTURE0 + 2),
                Call::BindTexture { target: glow::TEXTURE_2D, texture: Some(9) },
            ]
        );
    }
}
