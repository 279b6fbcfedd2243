// ── Blend modes ───────────────────────────────────────────────────────────────
//
// A registry of blend equations and factors addressed by stable handles.
// The 17 built-in modes occupy fixed slots; custom modes are appended.
// Removing a custom mode leaves an empty slot behind so handles held by game
// objects never start pointing at a different mode.

use log::warn;

use crate::gl::{BlendEquation, BlendFactor};

// ── BlendModeId ───────────────────────────────────────────────────────────────

/// Handle into the blend-mode registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlendModeId(pub u32);

impl BlendModeId {
    /// Tells `set_blend_mode` to leave the current mode alone.
    pub const SKIP_CHECK: Self = Self(u32::MAX);

    pub const NORMAL: Self = Self(0);
    pub const ADD: Self = Self(1);
    pub const MULTIPLY: Self = Self(2);
    pub const SCREEN: Self = Self(3);
    pub const OVERLAY: Self = Self(4);
    pub const DARKEN: Self = Self(5);
    pub const LIGHTEN: Self = Self(6);
    pub const COLOR_DODGE: Self = Self(7);
    pub const COLOR_BURN: Self = Self(8);
    pub const HARD_LIGHT: Self = Self(9);
    pub const SOFT_LIGHT: Self = Self(10);
    pub const DIFFERENCE: Self = Self(11);
    pub const EXCLUSION: Self = Self(12);
    pub const HUE: Self = Self(13);
    pub const SATURATION: Self = Self(14);
    pub const COLOR: Self = Self(15);
    pub const LUMINOSITY: Self = Self(16);

    pub const BUILTIN_COUNT: u32 = 17;

    pub fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }
}

impl Default for BlendModeId {
    fn default() -> Self {
        Self::NORMAL
    }
}

// ── BlendMode ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendFunc {
    Combined { src: BlendFactor, dst: BlendFactor },
    Separate {
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlendMode {
    pub func: BlendFunc,
    pub equation: BlendEquation,
}

impl BlendMode {
    pub const fn new(src: BlendFactor, dst: BlendFactor, equation: BlendEquation) -> Self {
        Self { func: BlendFunc::Combined { src, dst }, equation }
    }

    const PREMULTIPLIED: Self =
        Self::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha, BlendEquation::Add);
}

// ── BlendModes ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct BlendModes {
    modes: Vec<Option<BlendMode>>,
}

impl Default for BlendModes {
    fn default() -> Self {
        Self::new()
    }
}

impl BlendModes {
    /// The built-in table. Modes WebGL cannot express with fixed-function
    /// blending fall back to premultiplied NORMAL.
    pub fn new() -> Self {
        let mut modes = vec![Some(BlendMode::PREMULTIPLIED); BlendModeId::BUILTIN_COUNT as usize];
        modes[BlendModeId::ADD.0 as usize] =
            Some(BlendMode::new(BlendFactor::One, BlendFactor::DstAlpha, BlendEquation::Add));
        modes[BlendModeId::MULTIPLY.0 as usize] = Some(BlendMode::new(
            BlendFactor::DstColor,
            BlendFactor::OneMinusSrcAlpha,
            BlendEquation::Add,
        ));
        modes[BlendModeId::SCREEN.0 as usize] = Some(BlendMode::new(
            BlendFactor::One,
            BlendFactor::OneMinusSrcColor,
            BlendEquation::Add,
        ));
        Self { modes }
    }

    pub fn get(&self, id: BlendModeId) -> Option<&BlendMode> {
        self.modes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn add(&mut self, mode: BlendMode) -> BlendModeId {
        self.modes.push(Some(mode));
        BlendModeId(self.modes.len() as u32 - 1)
    }

    /// Replace an existing mode. Returns `false` for unknown or removed ids.
    pub fn update(&mut self, id: BlendModeId, mode: BlendMode) -> bool {
        match self.modes.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = Some(mode);
                true
            }
            _ => {
                warn!("update_blend_mode: no blend mode {id:?}");
                false
            }
        }
    }

    /// Remove a custom mode. Built-ins stay.
    pub fn remove(&mut self, id: BlendModeId) -> bool {
        if id.is_builtin() {
            warn!("remove_blend_mode: built-in mode {id:?} cannot be removed");
            return false;
        }
        match self.modes.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.modes.iter().filter(|m| m.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
