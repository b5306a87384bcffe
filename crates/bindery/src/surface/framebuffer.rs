use std::rc::Rc;

use crate::backend::Gl;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::render::Target;

use super::{DepthFormat, DepthStencilFormat, Texture};

/// The single depth-role attachment of a framebuffer.
pub enum DepthAttachment<G: Gl> {
    Depth(Rc<Texture<G, DepthFormat>>),
    DepthStencil(Rc<Texture<G, DepthStencilFormat>>),
}

impl<G: Gl> Clone for DepthAttachment<G> {
    fn clone(&self) -> Self {
        match self {
            Self::Depth(t) => Self::Depth(Rc::clone(t)),
            Self::DepthStencil(t) => Self::DepthStencil(Rc::clone(t)),
        }
    }
}

impl<G: Gl> DepthAttachment<G> {
    /// Slot name used in diagnostics.
    pub fn slot(&self) -> &'static str {
        match self {
            Self::Depth(_) => "depth",
            Self::DepthStencil(_) => "depth-stencil",
        }
    }

    fn attachment_point(&self) -> u32 {
        match self {
            Self::Depth(_) => glow::DEPTH_ATTACHMENT,
            Self::DepthStencil(_) => glow::DEPTH_STENCIL_ATTACHMENT,
        }
    }

    pub fn raw(&self) -> G::Texture {
        match self {
            Self::Depth(t) => t.raw(),
            Self::DepthStencil(t) => t.raw(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Depth(t) => t.size(),
            Self::DepthStencil(t) => t.size(),
        }
    }

    fn restore(&self) -> Result<()> {
        match self {
            Self::Depth(t) => t.restore(),
            Self::DepthStencil(t) => t.restore(),
        }
    }
}

/// An off-screen surface over caller-owned texture attachments.
///
/// Attachments are shared, not owned: the same texture may back several
/// framebuffers or be sampled by a command. Dropping a framebuffer deletes
/// only the framebuffer object.
pub struct Framebuffer<G: Gl> {
    device: Rc<Device<G>>,
    width: u32,
    height: u32,
    color: Vec<Rc<Texture<G>>>,
    depth: Option<DepthAttachment<G>>,
    framebuffer: G::Framebuffer,
    target: Target<G>,
}

impl<G: Gl> Framebuffer<G> {
    /// Color attachments only. `color` must not be empty.
    pub fn with_color(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        color: Vec<Rc<Texture<G>>>,
    ) -> Result<Self> {
        if color.is_empty() {
            return Err(Error::EmptyAttachmentList);
        }
        Self::new(device, width, height, color, None)
    }

    /// Depth attachment only; nothing is drawn to color.
    pub fn with_depth(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        depth: Rc<Texture<G, DepthFormat>>,
    ) -> Result<Self> {
        Self::new(device, width, height, Vec::new(), Some(DepthAttachment::Depth(depth)))
    }

    /// Depth-stencil attachment only; nothing is drawn to color.
    pub fn with_depth_stencil(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        depth_stencil: Rc<Texture<G, DepthStencilFormat>>,
    ) -> Result<Self> {
        Self::new(
            device,
            width,
            height,
            Vec::new(),
            Some(DepthAttachment::DepthStencil(depth_stencil)),
        )
    }

    /// Color attachments plus depth. `color` must not be empty.
    pub fn with_color_depth(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        color: Vec<Rc<Texture<G>>>,
        depth: Rc<Texture<G, DepthFormat>>,
    ) -> Result<Self> {
        if color.is_empty() {
            return Err(Error::EmptyAttachmentList);
        }
        Self::new(device, width, height, color, Some(DepthAttachment::Depth(depth)))
    }

    /// Color attachments plus depth-stencil. `color` must not be empty.
    pub fn with_color_depth_stencil(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        color: Vec<Rc<Texture<G>>>,
        depth_stencil: Rc<Texture<G, DepthStencilFormat>>,
    ) -> Result<Self> {
        if color.is_empty() {
            return Err(Error::EmptyAttachmentList);
        }
        Self::new(
            device,
            width,
            height,
            color,
            Some(DepthAttachment::DepthStencil(depth_stencil)),
        )
    }

    /// Validates the attachments, then creates and checks the framebuffer.
    ///
    /// Every attachment must be exactly `width` x `height`; at least one
    /// attachment is required. Validation failures create no GPU object.
    pub fn new(
        device: &Rc<Device<G>>,
        width: u32,
        height: u32,
        color: Vec<Rc<Texture<G>>>,
        depth: Option<DepthAttachment<G>>,
    ) -> Result<Self> {
        if color.is_empty() && depth.is_none() {
            return Err(Error::EmptyAttachmentList);
        }

        let mismatch = |slot: String, (found_width, found_height): (u32, u32)| {
            (found_width != width || found_height != height).then(|| Error::DimensionMismatch {
                slot,
                width,
                height,
                found_width,
                found_height,
            })
        };
        for (i, texture) in color.iter().enumerate() {
            if let Some(err) = mismatch(format!("color {i}"), texture.size()) {
                return Err(err);
            }
        }
        if let Some(depth) = &depth {
            if let Some(err) = mismatch(depth.slot().to_string(), depth.size()) {
                return Err(err);
            }
        }

        let framebuffer = init(device, &color, depth.as_ref())?;
        let target = Target::offscreen(
            Rc::clone(device),
            framebuffer,
            color_slots(color.len()),
            width,
            height,
        );
        log::debug!(
            "framebuffer {framebuffer:?}: {width}x{height}, {} color, depth {:?}",
            color.len(),
            depth.as_ref().map(DepthAttachment::slot)
        );

        Ok(Self {
            device: Rc::clone(device),
            width,
            height,
            color,
            depth,
            framebuffer,
            target,
        })
    }

    /// Recovers after context loss.
    ///
    /// Attachments restore themselves first. The framebuffer object is then
    /// re-created only if the driver no longer reports it valid; a valid one
    /// has any re-created attachment attached again in place.
    pub fn restore(&mut self) -> Result<()> {
        let before = self.attachment_handles();
        for texture in &self.color {
            texture.restore()?;
        }
        if let Some(depth) = &self.depth {
            depth.restore()?;
        }

        if self.device.gl().is_framebuffer(self.framebuffer) {
            if self.attachment_handles() != before {
                self.device.with_draw_framebuffer(Some(self.framebuffer), || {
                    attach(self.device.gl(), &self.color, self.depth.as_ref());
                });
                log::info!("framebuffer {:?} reattached restored textures", self.framebuffer);
            }
            return Ok(());
        }

        let framebuffer = init(&self.device, &self.color, self.depth.as_ref())?;
        log::info!("framebuffer {:?} restored as {framebuffer:?}", self.framebuffer);
        self.framebuffer = framebuffer;
        self.target = Target::offscreen(
            Rc::clone(&self.device),
            framebuffer,
            color_slots(self.color.len()),
            self.width,
            self.height,
        );
        Ok(())
    }

    /// Runs `f` with this framebuffer bound as the draw target.
    pub fn target<R>(&self, f: impl FnOnce(&Target<G>) -> R) -> R {
        self.target.with(f)
    }

    #[inline]
    pub fn raw(&self) -> G::Framebuffer {
        self.framebuffer
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_depth_only(&self) -> bool {
        self.color.is_empty()
    }

    fn attachment_handles(&self) -> Vec<G::Texture> {
        self.color
            .iter()
            .map(|t| t.raw())
            .chain(self.depth.as_ref().map(DepthAttachment::raw))
            .collect()
    }

    pub fn color_attachments(&self) -> &[Rc<Texture<G>>] {
        &self.color
    }

    pub fn depth_attachment(&self) -> Option<&DepthAttachment<G>> {
        self.depth.as_ref()
    }
}

impl<G: Gl> Drop for Framebuffer<G> {
    fn drop(&mut self) {
        self.device.gl().delete_framebuffer(self.framebuffer);
    }
}

fn color_slots(count: usize) -> Vec<u32> {
    (0..count as u32).map(|i| glow::COLOR_ATTACHMENT0 + i).collect()
}

/// Attaches every texture to the bound draw framebuffer and returns the color
/// slots used.
fn attach<G: Gl>(gl: &G, color: &[Rc<Texture<G>>], depth: Option<&DepthAttachment<G>>) -> Vec<u32> {
    let slots = color_slots(color.len());
    for (slot, texture) in slots.iter().zip(color) {
        gl.framebuffer_texture_2d(
            glow::DRAW_FRAMEBUFFER,
            *slot,
            glow::TEXTURE_2D,
            Some(texture.raw()),
            0,
        );
    }
    if let Some(depth) = depth {
        gl.framebuffer_texture_2d(
            glow::DRAW_FRAMEBUFFER,
            depth.attachment_point(),
            glow::TEXTURE_2D,
            Some(depth.raw()),
            0,
        );
    }
    slots
}

/// Creates the framebuffer object and attaches everything, bound through the
/// draw register so the caller's binding survives.
fn init<G: Gl>(
    device: &Device<G>,
    color: &[Rc<Texture<G>>],
    depth: Option<&DepthAttachment<G>>,
) -> Result<G::Framebuffer> {
    let gl = device.gl();
    let framebuffer = gl.create_framebuffer().map_err(Error::ObjectCreation)?;

    let status = device.with_draw_framebuffer(Some(framebuffer), || {
        let slots = attach(gl, color, depth);
        if slots.is_empty() {
            gl.draw_buffers(&[glow::NONE]);
        } else {
            gl.draw_buffers(&slots);
        }
        gl.check_framebuffer_status(glow::DRAW_FRAMEBUFFER)
    });

    if status != glow::FRAMEBUFFER_COMPLETE {
        gl.delete_framebuffer(framebuffer);
        return Err(Error::FramebufferIncomplete { status });
    }
    Ok(framebuffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingGl;
    use crate::backend::recording::Call;
    use crate::render::{BufferBits, ClearValues};
    use crate::surface::{ColorFormat, TextureDescriptor};
    use crate::test_support::device;

    fn color(device: &Rc<Device<RecordingGl>>, w: u32, h: u32) -> Rc<Texture<RecordingGl>> {
        Rc::new(Texture::new(device, TextureDescriptor::new(w, h, ColorFormat::Rgba8), None).unwrap())
    }

    fn depth(device: &Rc<Device<RecordingGl>>, w: u32, h: u32) -> Rc<Texture<RecordingGl, DepthFormat>> {
        Rc::new(Texture::new(device, TextureDescriptor::new(w, h, DepthFormat::Depth24), None).unwrap())
    }

    fn created_framebuffers(gl: &RecordingGl) -> usize {
        gl.count(|c| matches!(c, Call::CreateFramebuffer(_)))
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn mismatched_color_fails_without_creating_a_framebuffer() {
        let (gl, device) = device();
        let small = color(&device, 128, 128);

        let err = Framebuffer::with_color(&device, 256, 256, vec![small]).err();

        assert_eq!(
            err,
            Some(Error::DimensionMismatch {
                slot: "color 0".into(),
                width: 256,
                height: 256,
                found_width: 128,
                found_height: 128,
            })
        );
        assert_eq!(created_framebuffers(&gl), 0);
    }

    #[test]
    fn mismatched_depth_names_its_slot() {
        let (gl, device) = device();
        let err = Framebuffer::with_color_depth(
            &device,
            64,
            64,
            vec![color(&device, 64, 64)],
            depth(&device, 64, 32),
        )
        .err();

        assert!(matches!(err, Some(Error::DimensionMismatch { ref slot, .. }) if slot == "depth"));
        assert_eq!(created_framebuffers(&gl), 0);
    }

    #[test]
    fn color_variants_require_a_color_attachment() {
        let (gl, device) = device();
        assert_eq!(
            Framebuffer::with_color(&device, 8, 8, Vec::new()).err(),
            Some(Error::EmptyAttachmentList)
        );
        assert_eq!(
            Framebuffer::new(&device, 8, 8, Vec::new(), None).err(),
            Some(Error::EmptyAttachmentList)
        );
        assert_eq!(created_framebuffers(&gl), 0);
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn init_attaches_in_slot_order_and_restores_binding() {
        let (gl, device) = device();
        let (a, b) = (color(&device, 16, 16), color(&device, 16, 16));
        let d = depth(&device, 16, 16);
        gl.take_calls();

        let fb = Framebuffer::with_color_depth(&device, 16, 16, vec![a.clone(), b.clone()], d.clone())
            .unwrap();

        let attachments: Vec<Call> = gl
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::FramebufferTexture2d { .. } | Call::DrawBuffers(_)))
            .collect();
        assert_eq!(
            attachments,
            vec![
                Call::FramebufferTexture2d {
                    target: glow::DRAW_FRAMEBUFFER,
                    attachment: glow::COLOR_ATTACHMENT0,
                    texture: Some(a.raw()),
                },
                Call::FramebufferTexture2d {
                    target: glow::DRAW_FRAMEBUFFER,
                    attachment: glow::COLOR_ATTACHMENT1,
                    texture: Some(b.raw()),
                },
                Call::FramebufferTexture2d {
                    target: glow::DRAW_FRAMEBUFFER,
                    attachment: glow::DEPTH_ATTACHMENT,
                    texture: Some(d.raw()),
                },
                Call::DrawBuffers(vec![glow::COLOR_ATTACHMENT0, glow::COLOR_ATTACHMENT1]),
            ]
        );
        assert_eq!(
            gl.calls().last(),
            Some(&Call::BindFramebuffer { target: glow::DRAW_FRAMEBUFFER, framebuffer: None })
        );
        assert!(!fb.is_depth_only());
        assert_eq!(device.stack_depths(), Default::default());
    }

    #[test]
    fn depth_only_draws_to_no_color_buffer() {
        let (gl, device) = device();
        let fb = Framebuffer::with_depth(&device, 32, 32, depth(&device, 32, 32)).unwrap();
        assert!(fb.is_depth_only());
        assert!(gl.calls().contains(&Call::DrawBuffers(vec![glow::NONE])));
    }

    #[test]
    fn construction_inside_another_target_keeps_its_binding() {
        let (gl, device) = device();
        let outer = Framebuffer::with_color(&device, 8, 8, vec![color(&device, 8, 8)]).unwrap();
        let inner_color = color(&device, 4, 4);

        let inner = outer.target(|_| {
            gl.take_calls();
            let inner = Framebuffer::with_color(&device, 4, 4, vec![inner_color]).unwrap();
            assert_eq!(
                gl.calls().last(),
                Some(&Call::BindFramebuffer {
                    target: glow::DRAW_FRAMEBUFFER,
                    framebuffer: Some(outer.raw()),
                })
            );
            inner
        });
        assert_ne!(inner.raw(), outer.raw());
        assert_eq!(device.stack_depths(), Default::default());
    }

    #[test]
    fn incomplete_framebuffer_is_deleted() {
        let (gl, device) = device();
        let texture = color(&device, 8, 8);
        gl.set_framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT);

        let err = Framebuffer::with_color(&device, 8, 8, vec![texture]).err();

        assert_eq!(
            err,
            Some(Error::FramebufferIncomplete { status: glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT })
        );
        assert_eq!(gl.count(|c| matches!(c, Call::DeleteFramebuffer(_))), 1);
        assert_eq!(device.stack_depths(), Default::default());
    }

    // ── restore ───────────────────────────────────────────────────────────

    #[test]
    fn restore_keeps_a_valid_framebuffer() {
        let (gl, device) = device();
        let mut fb = Framebuffer::with_color(&device, 8, 8, vec![color(&device, 8, 8)]).unwrap();
        let before = fb.raw();
        gl.take_calls();

        fb.restore().unwrap();

        assert_eq!(fb.raw(), before);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn restore_reattaches_a_dead_texture_to_a_valid_framebuffer() {
        let (gl, device) = device();
        let texture = color(&device, 8, 8);
        let mut fb = Framebuffer::with_color(&device, 8, 8, vec![texture.clone()]).unwrap();
        let old_texture = texture.raw();
        let old_fb = fb.raw();
        gl.invalidate(old_texture);
        gl.take_calls();

        fb.restore().unwrap();

        assert_eq!(fb.raw(), old_fb);
        assert_ne!(texture.raw(), old_texture);
        assert_eq!(created_framebuffers(&gl), 0);
        let calls = gl.take_calls();
        assert!(calls.contains(&Call::CreateTexture(texture.raw())));
        assert!(calls.contains(&Call::FramebufferTexture2d {
            target: glow::DRAW_FRAMEBUFFER,
            attachment: glow::COLOR_ATTACHMENT0,
            texture: Some(texture.raw()),
        }));
        assert_eq!(calls.last(), Some(&Call::BindFramebuffer { target: glow::DRAW_FRAMEBUFFER, framebuffer: None }));
        assert_eq!(device.stack_depths().draw_framebuffer, 0);
    }

    #[test]
    fn restore_rebuilds_after_context_loss() {
        let (gl, device) = device();
        let texture = color(&device, 8, 8);
        let mut fb = Framebuffer::with_color(&device, 8, 8, vec![texture.clone()]).unwrap();
        let old_texture = texture.raw();
        let old_fb = fb.raw();
        gl.lose_context();
        gl.take_calls();

        fb.restore().unwrap();

        assert_ne!(texture.raw(), old_texture);
        assert_ne!(fb.raw(), old_fb);
        let calls = gl.take_calls();
        let texture_created = calls.iter().position(|c| matches!(c, Call::CreateTexture(_))).unwrap();
        let fb_created = calls.iter().position(|c| matches!(c, Call::CreateFramebuffer(_))).unwrap();
        assert!(texture_created < fb_created);
        assert!(calls.contains(&Call::FramebufferTexture2d {
            target: glow::DRAW_FRAMEBUFFER,
            attachment: glow::COLOR_ATTACHMENT0,
            texture: Some(texture.raw()),
        }));

        // The target follows the new object.
        fb.target(|t| t.clear(BufferBits::COLOR, &ClearValues::default()));
        assert!(gl.calls().contains(&Call::BindFramebuffer {
            target: glow::DRAW_FRAMEBUFFER,
            framebuffer: Some(fb.raw()),
        }));

        // Calling again is a no-op.
        gl.take_calls();
        fb.restore().unwrap();
        assert!(gl.calls().is_empty());
    }

    // ── target ────────────────────────────────────────────────────────────

    #[test]
    fn target_uses_framebuffer_extent_and_slots() {
        let (gl, device) = device();
        let fb = Framebuffer::with_color(&device, 32, 16, vec![color(&device, 32, 16)]).unwrap();
        gl.take_calls();

        fb.target(|t| {
            assert_eq!(t.size(), (32, 16));
            assert_eq!(t.color_attachments(), &[glow::COLOR_ATTACHMENT0]);
            assert_eq!(t.framebuffer(), Some(fb.raw()));
        });
        assert!(gl.calls().contains(&Call::Viewport { x: 0, y: 0, width: 32, height: 16 }));
    }

    #[test]
    fn drop_keeps_shared_attachments_alive() {
        let (gl, device) = device();
        let texture = color(&device, 8, 8);
        let fb = Framebuffer::with_color(&device, 8, 8, vec![texture.clone()]).unwrap();
        drop(fb);
        assert_eq!(gl.count(|c| matches!(c, Call::DeleteTexture(_))), 0);
        assert_eq!(gl.live_objects(), 1);
    }
}
