// =============================================================================
// GAMEOBJECT.RS — what the renderer draws
//
// The renderer only needs a handful of things from a display-list entry: is
// it visible to this camera, which blend mode and mask does it use, and how
// does it put itself into a pipeline.  `Renderable` is that seam; `Sprite`,
// `Rectangle` and `BitmapMask` are the concrete objects shipped here.
// =============================================================================

use std::rc::Rc;

use glam::Vec2;
use log::warn;

use crate::camera::{Camera, Follow};
use crate::color::{get_tint_append_float_alpha_and_swap, Color};
use crate::error::Result;
use crate::gl::{FramebufferId, TextureId};
use crate::matrix::TransformMatrix;
use crate::renderer::pipeline::{
    BitmapMaskPipeline, FlatTintPipeline, TextureQuad, BITMAP_MASK, FLAT_TINT, TEXTURE_TINT,
};
use crate::renderer::{BlendModeId, Renderer, TextureOptions};

// ── Traits ────────────────────────────────────────────────────────────────────

/// Geometry the camera needs to decide whether an object is in view.
pub trait Cullable {
    /// Unscaled size. `None` opts out of culling.
    fn cull_size(&self) -> Option<Vec2>;
    fn position(&self) -> Vec2;
    /// Normalized origin.
    fn origin(&self) -> Vec2;
    fn scroll_factor(&self) -> Vec2;

    /// Objects inside a container are never culled individually.
    fn has_parent(&self) -> bool {
        false
    }
}

pub trait Renderable: Cullable {
    fn render_webgl(&self, renderer: &mut Renderer, camera: &Camera, interpolation: f32);

    fn camera_filter(&self) -> u32;
    fn set_camera_filter(&mut self, filter: u32);

    fn visible(&self) -> bool {
        true
    }

    fn alpha(&self) -> f32 {
        1.0
    }

    fn blend_mode(&self) -> BlendModeId {
        BlendModeId::NORMAL
    }

    fn mask(&self) -> Option<&dyn Mask> {
        None
    }

    fn normal_map(&self) -> Option<TextureId> {
        None
    }

    /// Visible, not fully transparent and not ignored by `camera`.
    fn will_render(&self, camera: &Camera) -> bool {
        self.visible() && self.alpha() > 0.0 && self.camera_filter() & camera.id == 0
    }
}

/// Hooks the renderer runs around a masked object.
pub trait Mask {
    fn pre_render_webgl(&self, renderer: &mut Renderer, masked: &dyn Renderable, camera: &Camera);
    fn post_render_webgl(&self, renderer: &mut Renderer, camera: &Camera);
}

// ── Texture / Frame ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureId,
    pub width: u32,
    pub height: u32,
    /// Framebuffer-backed; its rows are stored bottom-up.
    pub is_render_texture: bool,
    /// Pixel data was uploaded with premultiplied alpha.
    pub premultiplied: bool,
}

impl Texture {
    pub fn new(handle: TextureId, width: u32, height: u32) -> Self {
        Self { handle, width, height, is_render_texture: false, premultiplied: false }
    }

    /// A texture drawn into through a framebuffer.
    pub fn render_target(handle: TextureId, width: u32, height: u32) -> Self {
        Self { is_render_texture: true, premultiplied: true, ..Self::new(handle, width, height) }
    }
}

/// A rectangular region of a texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub texture: Texture,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(texture: Texture, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { texture, x, y, width, height }
    }

    pub fn whole(texture: Texture) -> Self {
        Self::new(texture, 0.0, 0.0, texture.width as f32, texture.height as f32)
    }

    /// `[u0, v0, u1, v1]`.
    pub fn uvs(&self) -> [f32; 4] {
        let tw = self.texture.width as f32;
        let th = self.texture.height as f32;
        [self.x / tw, self.y / th, (self.x + self.width) / tw, (self.y + self.height) / th]
    }
}

// ── Sprite ────────────────────────────────────────────────────────────────────

pub struct Sprite {
    pub frame: Frame,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub scroll_factor_x: f32,
    pub scroll_factor_y: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub visible: bool,
    /// `0xRRGGBB` per corner: top-left, top-right, bottom-left, bottom-right.
    pub tint: [u32; 4],
    pub alpha: [f32; 4],
    /// Replace texel color with the tint instead of multiplying.
    pub tint_fill: bool,
    pub blend_mode: BlendModeId,
    pub pipeline: String,
    pub normal_map: Option<TextureId>,
    pub mask: Option<Rc<dyn Mask>>,
    /// World transform of the enclosing container.
    pub parent: Option<TransformMatrix>,
    camera_filter: u32,
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sprite")
            .field("frame", &self.frame)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("pipeline", &self.pipeline)
            .field("masked", &self.mask.is_some())
            .finish_non_exhaustive()
    }
}

impl Sprite {
    pub fn new(frame: Frame, x: f32, y: f32) -> Self {
        Self {
            frame,
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            origin_x: 0.5,
            origin_y: 0.5,
            scroll_factor_x: 1.0,
            scroll_factor_y: 1.0,
            flip_x: false,
            flip_y: false,
            visible: true,
            tint: [0xffffff; 4],
            alpha: [1.0; 4],
            tint_fill: false,
            blend_mode: BlendModeId::NORMAL,
            pipeline: TEXTURE_TINT.to_string(),
            normal_map: None,
            mask: None,
            parent: None,
            camera_filter: 0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_origin(&mut self, x: f32, y: f32) -> &mut Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32) -> &mut Self {
        self.scale_x = x;
        self.scale_y = y;
        self
    }

    pub fn set_scroll_factor(&mut self, x: f32, y: f32) -> &mut Self {
        self.scroll_factor_x = x;
        self.scroll_factor_y = y;
        self
    }

    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.alpha = [alpha.clamp(0.0, 1.0); 4];
        self
    }

    pub fn set_tint(&mut self, rgb: u32) -> &mut Self {
        self.tint = [rgb & 0xffffff; 4];
        self.tint_fill = false;
        self
    }

    pub fn set_tint_fill(&mut self, rgb: u32) -> &mut Self {
        self.set_tint(rgb);
        self.tint_fill = true;
        self
    }

    pub fn set_blend_mode(&mut self, mode: BlendModeId) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    pub fn set_pipeline(&mut self, name: &str) -> &mut Self {
        self.pipeline = name.to_string();
        self
    }

    pub fn set_mask(&mut self, mask: Rc<dyn Mask>) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn clear_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    pub fn display_origin(&self) -> Vec2 {
        Vec2::new(self.origin_x * self.frame.width, self.origin_y * self.frame.height)
    }

    /// The quad this sprite batches as, with `camera.alpha` folded into the
    /// corner tints.
    pub fn texture_quad(&self, camera: &Camera) -> TextureQuad {
        let origin = self.display_origin();
        let tint = |corner: usize| {
            get_tint_append_float_alpha_and_swap(self.tint[corner], camera.alpha * self.alpha[corner])
        };
        TextureQuad {
            texture: self.frame.texture.handle,
            texture_width: self.frame.texture.width as f32,
            texture_height: self.frame.texture.height as f32,
            x: self.x,
            y: self.y,
            width: self.frame.width,
            height: self.frame.height,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            rotation: self.rotation,
            flip_x: self.flip_x,
            flip_y: self.flip_y != self.frame.texture.is_render_texture,
            scroll_factor_x: self.scroll_factor_x,
            scroll_factor_y: self.scroll_factor_y,
            display_origin_x: origin.x,
            display_origin_y: origin.y,
            frame_x: self.frame.x,
            frame_y: self.frame.y,
            frame_width: self.frame.width,
            frame_height: self.frame.height,
            tint_tl: tint(0),
            tint_tr: tint(1),
            tint_bl: tint(2),
            tint_br: tint(3),
            tint_effect: if self.tint_fill { 1.0 } else { 0.0 },
            u_offset: 0.0,
            v_offset: 0.0,
            normal_map: self.normal_map,
        }
    }
}

impl Cullable for Sprite {
    fn cull_size(&self) -> Option<Vec2> {
        Some(Vec2::new(self.frame.width, self.frame.height))
    }

    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }

    fn scroll_factor(&self) -> Vec2 {
        Vec2::new(self.scroll_factor_x, self.scroll_factor_y)
    }

    fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

impl Renderable for Sprite {
    fn render_webgl(&self, renderer: &mut Renderer, camera: &Camera, _interpolation: f32) {
        let parent = self.parent.as_ref();
        let drawn = renderer.with_pipeline(&self.pipeline, |pipeline, r| match pipeline.as_batcher() {
            Some(batcher) => {
                batcher.batch_sprite(r, self, camera, parent);
                true
            }
            None => false,
        });
        match drawn {
            Some(true) => {}
            Some(false) => warn!("pipeline '{}' cannot batch sprites", self.pipeline),
            None => warn!("pipeline '{}' is not available", self.pipeline),
        }
    }

    fn camera_filter(&self) -> u32 {
        self.camera_filter
    }

    fn set_camera_filter(&mut self, filter: u32) {
        self.camera_filter = filter;
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn alpha(&self) -> f32 {
        self.alpha.iter().copied().fold(0.0, f32::max)
    }

    fn blend_mode(&self) -> BlendModeId {
        self.blend_mode
    }

    fn mask(&self) -> Option<&dyn Mask> {
        self.mask.as_deref()
    }

    fn normal_map(&self) -> Option<TextureId> {
        self.normal_map
    }
}

impl Follow for Sprite {
    fn follow_position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

// ── Rectangle ─────────────────────────────────────────────────────────────────

/// A solid, untextured rectangle drawn through the FlatTint pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub scroll_factor_x: f32,
    pub scroll_factor_y: f32,
    pub fill: Color,
    pub visible: bool,
    pub blend_mode: BlendModeId,
    camera_filter: u32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, fill: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            origin_x: 0.5,
            origin_y: 0.5,
            scroll_factor_x: 1.0,
            scroll_factor_y: 1.0,
            fill,
            visible: true,
            blend_mode: BlendModeId::NORMAL,
            camera_filter: 0,
        }
    }
}

impl Cullable for Rectangle {
    fn cull_size(&self) -> Option<Vec2> {
        Some(Vec2::new(self.width, self.height))
    }

    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }

    fn scroll_factor(&self) -> Vec2 {
        Vec2::new(self.scroll_factor_x, self.scroll_factor_y)
    }
}

impl Renderable for Rectangle {
    fn render_webgl(&self, renderer: &mut Renderer, camera: &Camera, _interpolation: f32) {
        let mut local = TransformMatrix::IDENTITY;
        local.apply_itrs(
            self.x - camera.scroll_x() * self.scroll_factor_x,
            self.y - camera.scroll_y() * self.scroll_factor_y,
            self.rotation,
            1.0,
            1.0,
        );
        let current = camera.matrix.product(&local);

        let tint = get_tint_append_float_alpha_and_swap(
            self.fill.to_hex(),
            self.fill.alpha_gl() * camera.alpha,
        );
        let x = -self.origin_x * self.width;
        let y = -self.origin_y * self.height;

        let drawn = renderer.with_pipeline_as::<FlatTintPipeline, _>(FLAT_TINT, |flat, r| {
            flat.batch_fill_rect(r, x, y, self.width, self.height, tint, &current, None);
        });
        if drawn.is_none() {
            warn!("rectangle skipped: {FLAT_TINT} is not available");
        }
    }

    fn camera_filter(&self) -> u32 {
        self.camera_filter
    }

    fn set_camera_filter(&mut self, filter: u32) {
        self.camera_filter = filter;
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn alpha(&self) -> f32 {
        self.fill.alpha_gl()
    }

    fn blend_mode(&self) -> BlendModeId {
        self.blend_mode
    }
}

// ── BitmapMask ────────────────────────────────────────────────────────────────

/// Masks an object by the alpha channel of another renderable.
///
/// Owns two screen-sized render targets: one for the mask source and one for
/// the masked object.  Both are tied to the GL context and must be rebuilt
/// with `recreate` after a context restore.
pub struct BitmapMask {
    source: Box<dyn Renderable>,
    main_texture: TextureId,
    main_framebuffer: FramebufferId,
    mask_texture: TextureId,
    mask_framebuffer: FramebufferId,
    pub invert_alpha: bool,
}

impl BitmapMask {
    pub fn new(renderer: &mut Renderer, source: Box<dyn Renderable>) -> Result<Self> {
        let (main_texture, main_framebuffer) = Self::render_target(renderer)?;
        let (mask_texture, mask_framebuffer) = match Self::render_target(renderer) {
            Ok(target) => target,
            Err(e) => {
                renderer.delete_framebuffer(main_framebuffer);
                renderer.delete_texture(main_texture);
                return Err(e);
            }
        };
        Ok(Self {
            source,
            main_texture,
            main_framebuffer,
            mask_texture,
            mask_framebuffer,
            invert_alpha: false,
        })
    }

    fn render_target(renderer: &mut Renderer) -> Result<(TextureId, FramebufferId)> {
        let (width, height) = (renderer.width(), renderer.height());
        let texture = renderer.create_texture_2d(width, height, None, TextureOptions::default())?;
        match renderer.create_framebuffer(width, height, texture, false) {
            Ok(framebuffer) => Ok((texture, framebuffer)),
            Err(e) => {
                renderer.delete_texture(texture);
                Err(e)
            }
        }
    }

    pub fn source(&self) -> &dyn Renderable {
        self.source.as_ref()
    }

    pub fn main_texture(&self) -> TextureId {
        self.main_texture
    }

    pub fn main_framebuffer(&self) -> FramebufferId {
        self.main_framebuffer
    }

    pub fn mask_texture(&self) -> TextureId {
        self.mask_texture
    }

    pub fn mask_framebuffer(&self) -> FramebufferId {
        self.mask_framebuffer
    }

    pub fn set_invert_alpha(&mut self, invert: bool) -> &mut Self {
        self.invert_alpha = invert;
        self
    }

    /// Build fresh render targets, e.g. after the context was restored.
    pub fn recreate(&mut self, renderer: &mut Renderer) -> Result<()> {
        let (main_texture, main_framebuffer) = Self::render_target(renderer)?;
        let (mask_texture, mask_framebuffer) = Self::render_target(renderer)?;
        self.main_texture = main_texture;
        self.main_framebuffer = main_framebuffer;
        self.mask_texture = mask_texture;
        self.mask_framebuffer = mask_framebuffer;
        Ok(())
    }

    pub fn destroy(&self, renderer: &mut Renderer) {
        renderer.delete_framebuffer(self.main_framebuffer);
        renderer.delete_framebuffer(self.mask_framebuffer);
        renderer.delete_texture(self.main_texture);
        renderer.delete_texture(self.mask_texture);
    }
}

impl Mask for BitmapMask {
    fn pre_render_webgl(&self, renderer: &mut Renderer, _masked: &dyn Renderable, camera: &Camera) {
        let began = renderer
            .with_pipeline_as::<BitmapMaskPipeline, _>(BITMAP_MASK, |p, r| p.begin_mask(r, self, camera));
        if began.is_none() {
            warn!("mask skipped: {BITMAP_MASK} is not available");
        }
    }

    fn post_render_webgl(&self, renderer: &mut Renderer, _camera: &Camera) {
        renderer.with_pipeline_as::<BitmapMaskPipeline, _>(BITMAP_MASK, |p, r| p.end_mask(r, self));
    }
}
