// ── GPU binding state ─────────────────────────────────────────────────────────
//
// The renderer's mirror of what is currently bound on the GPU.  Every bind
// goes through `Renderer`, which consults this cache first and only talks to
// the context when the requested value differs.  Nothing in here issues GL
// calls itself.

use crate::gl::{BufferId, FramebufferId, ProgramId, TextureId};

/// Rects the scissor stack can hold before pushes are dropped.
pub const SCISSOR_STACK_CAPACITY: usize = 1000;

/// Scissor rectangle in drawing-buffer pixels with a top-left origin.
pub type ScissorRect = [i32; 4];

// ── GpuBindingState ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct GpuBindingState {
    /// Texture bound to each unit.
    pub textures: Vec<Option<TextureId>>,
    pub active_unit: u32,
    pub program: Option<ProgramId>,
    pub vertex_buffer: Option<BufferId>,
    pub index_buffer: Option<BufferId>,
    pub framebuffer: Option<FramebufferId>,
    pub scissor: ScissorState,
}

impl GpuBindingState {
    pub fn new(texture_units: u32) -> Self {
        Self {
            textures: vec![None; texture_units as usize],
            ..Self::default()
        }
    }

    pub fn texture_units(&self) -> u32 {
        self.textures.len() as u32
    }

    pub fn texture(&self, unit: u32) -> Option<TextureId> {
        self.textures.get(unit as usize).copied().flatten()
    }

    /// Drop every reference to `texture` so a recycled id is rebound.
    pub fn forget_texture(&mut self, texture: TextureId) {
        for slot in &mut self.textures {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

// ── ScissorState ──────────────────────────────────────────────────────────────

/// Current scissor rect, whether the GL scissor test is on, the last rect
/// actually sent to GL and the push/pop stack.
#[derive(Clone, Debug)]
pub struct ScissorState {
    pub current: ScissorRect,
    pub enabled: bool,
    pub last_issued: Option<ScissorRect>,
    stack: Vec<ScissorRect>,
}

impl Default for ScissorState {
    fn default() -> Self {
        Self {
            current: [0, 0, 0, 0],
            enabled: false,
            last_issued: None,
            stack: Vec::with_capacity(SCISSOR_STACK_CAPACITY),
        }
    }
}

impl ScissorState {
    pub fn new(width: i32, height: i32) -> Self {
        Self { current: [0, 0, width, height], ..Self::default() }
    }

    /// Save the current rect. Returns `false` when the stack is full.
    pub fn push(&mut self) -> bool {
        if self.stack.len() >= SCISSOR_STACK_CAPACITY {
            return false;
        }
        self.stack.push(self.current);
        true
    }

    /// The rect saved by the matching `push`, if any.
    pub fn pop(&mut self) -> Option<ScissorRect> {
        self.stack.pop()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
