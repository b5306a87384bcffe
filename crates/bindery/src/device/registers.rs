use super::Viewport;

/// One binding-stack register owned by a [`Device`](super::Device).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Register {
    /// `DRAW_FRAMEBUFFER` binding; `None` entries mean the default surface.
    DrawFramebuffer,
    /// `READ_FRAMEBUFFER` binding; `None` entries mean the default surface.
    ReadFramebuffer,
    /// Viewport rectangle.
    Viewport,
}

/// Depth of every register, for diagnostics.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StackDepths {
    pub draw_framebuffer: usize,
    pub read_framebuffer: usize,
    pub viewport: usize,
}

/// Register stacks. The top of each stack is the live binding; an empty
/// stack means the default (surface framebuffer, full-surface viewport).
#[derive(Debug)]
pub(crate) struct Registers<F> {
    pub draw_framebuffer: Vec<Option<F>>,
    pub read_framebuffer: Vec<Option<F>>,
    pub viewport: Vec<Viewport>,
}

impl<F: Copy> Registers<F> {
    pub fn new() -> Self {
        Self {
            draw_framebuffer: Vec::new(),
            read_framebuffer: Vec::new(),
            viewport: Vec::new(),
        }
    }

    pub fn depths(&self) -> StackDepths {
        StackDepths {
            draw_framebuffer: self.draw_framebuffer.len(),
            read_framebuffer: self.read_framebuffer.len(),
            viewport: self.viewport.len(),
        }
    }

    pub fn depth(&self, register: Register) -> usize {
        match register {
            Register::DrawFramebuffer => self.draw_framebuffer.len(),
            Register::ReadFramebuffer => self.read_framebuffer.len(),
            Register::Viewport => self.viewport.len(),
        }
    }

    /// Binding that becomes live after popping `stack`, or `None` if the
    /// stack was already empty.
    pub fn pop_framebuffer(stack: &mut Vec<Option<F>>) -> Option<Option<F>> {
        stack.pop()?;
        Some(stack.last().copied().flatten())
    }
}
