// ── Renderer configuration ────────────────────────────────────────────────────
//
// Every option is read once when the renderer is created.  Missing keys take
// their defaults, so a partial JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{RenderError, Result};

// ── PowerPreference ───────────────────────────────────────────────────────────

/// GPU selection hint passed through to context creation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    Default,
    HighPerformance,
    LowPower,
}

impl PowerPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerPreference::Default => "default",
            PowerPreference::HighPerformance => "high-performance",
            PowerPreference::LowPower => "low-power",
        }
    }
}

// ── ContextAttributes ─────────────────────────────────────────────────────────

/// Attributes requested when the drawing context is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAttributes {
    pub alpha: bool,
    pub depth: bool,
    pub stencil: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
    pub fail_if_major_performance_caveat: bool,
    pub power_preference: PowerPreference,
}

// ── RendererConfig ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererConfig {
    /// Game width in CSS pixels.
    pub width: u32,
    /// Game height in CSS pixels.
    pub height: u32,
    /// Clear the drawing buffer at the start of every frame.
    pub clear_before_render: bool,
    pub antialias: bool,
    /// Clear color used by `pre_render`.
    pub background_color: Color,
    /// Drawing-buffer pixels per CSS pixel.
    pub resolution: f32,
    pub auto_resize: bool,
    pub round_pixels: bool,
    /// Texture units to use. `0` asks the context.
    pub max_textures: u32,
    /// Largest texture edge. `0` asks the context.
    pub max_texture_size: u32,
    /// Quads per batch before a pipeline flushes.
    pub batch_size: u32,
    pub transparent: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
    pub fail_if_major_performance_caveat: bool,
    pub power_preference: PowerPreference,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_before_render: true,
            antialias: true,
            background_color: Color::BLACK,
            resolution: 1.0,
            auto_resize: false,
            round_pixels: false,
            max_textures: 0,
            max_texture_size: 0,
            batch_size: 2000,
            transparent: false,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            fail_if_major_performance_caveat: false,
            power_preference: PowerPreference::Default,
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "game size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.batch_size == 0 {
            return Err(RenderError::InvalidConfig("batch size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn context_attributes(&self) -> ContextAttributes {
        ContextAttributes {
            alpha: self.transparent,
            depth: false,
            stencil: true,
            antialias: self.antialias,
            premultiplied_alpha: self.premultiplied_alpha,
            preserve_drawing_buffer: self.preserve_drawing_buffer,
            fail_if_major_performance_caveat: self.fail_if_major_performance_caveat,
            power_preference: self.power_preference,
        }
    }

    /// Clear color as used by `pre_render`: a transparent game clears to
    /// fully transparent black regardless of the background color.
    pub fn clear_color(&self) -> [f32; 4] {
        if self.transparent {
            [0.0, 0.0, 0.0, 0.0]
        } else {
            self.background_color.gl()
        }
    }
}
