// =============================================================================
// CAMERA — viewport, scroll, zoom, bounds, follow and per-frame transform
//
// A camera draws a region of the world (`scroll`, `zoom`, `rotation`) into a
// rectangle of the canvas (`x`, `y`, `width`, `height`).  Once per frame the
// renderer calls `pre_render`, which resolves follow/deadzone/bounds into the
// final scroll and rebuilds `matrix`:
//
//   identity → scale(resolution) → translate(x + originX, y + originY)
//            → rotate(rotation) → scale(zoom) → translate(-originX, -originY)
//
// Scroll is NOT part of the matrix; objects subtract `scroll * scrollFactor`
// from their own position before the camera matrix is applied.
// =============================================================================

pub mod effects;
pub mod manager;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use crate::color::Color;
use crate::ease::Ease;
use crate::gameobject::{Cullable, Renderable};
use crate::geometry::{clamp, linear, Rect};
use crate::matrix::TransformMatrix;

pub use effects::{CameraEvent, EffectCallback, Fade, FadeDirection, Flash, Pan, Shake, Zoom};
pub use manager::CameraManager;

// ── Follow targets ────────────────────────────────────────────────────────────

/// Anything a camera can track. Only the position is read, once per frame.
pub trait Follow {
    fn follow_position(&self) -> Vec2;
}

impl Follow for Cell<Vec2> {
    fn follow_position(&self) -> Vec2 {
        self.get()
    }
}

impl<T: Follow> Follow for RefCell<T> {
    fn follow_position(&self) -> Vec2 {
        self.borrow().follow_position()
    }
}

pub type FollowTarget = Rc<dyn Follow>;

// ── Serialized form ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraJson {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub rotation: f32,
    pub round_pixels: bool,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub background_color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

// ── Camera ────────────────────────────────────────────────────────────────────

pub struct Camera {
    /// Bitmask id assigned by the camera manager; `0` when unmanaged.
    pub id: u32,
    pub name: String,
    /// Viewport position in canvas pixels.
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
    pub round_pixels: bool,
    pub visible: bool,
    pub input_enabled: bool,
    use_bounds: bool,
    bounds: Rect,
    /// World-space rectangle visible through the camera, refreshed in `pre_render`.
    pub world_view: Rect,
    /// Set whenever size, scroll, zoom or rotation change. The renderer
    /// clears it after drawing the camera.
    pub dirty: bool,
    scroll_x: f32,
    scroll_y: f32,
    zoom: f32,
    rotation: f32,
    pub matrix: TransformMatrix,
    /// Renderer resolution baked into `matrix` by the last `pre_render`.
    resolution: f32,
    /// `true` when the background color is fully transparent.
    pub transparent: bool,
    pub background_color: Color,
    pub alpha: f32,
    pub disable_cull: bool,
    pub lerp: Vec2,
    pub follow_offset: Vec2,
    pub mid_point: Vec2,
    /// Normalized rotation / zoom pivot.
    pub origin_x: f32,
    pub origin_y: f32,
    deadzone: Option<Rect>,
    follow: Option<FollowTarget>,

    pub fade_effect: Fade,
    pub flash_effect: Flash,
    pub shake_effect: Shake,
    pub pan_effect: Pan,
    pub zoom_effect: Zoom,
    events: Vec<CameraEvent>,
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("viewport", &Rect::new(self.x, self.y, self.width, self.height))
            .field("scroll", &(self.scroll_x, self.scroll_y))
            .field("zoom", &self.zoom)
            .field("rotation", &self.rotation)
            .field("following", &self.follow.is_some())
            .finish_non_exhaustive()
    }
}

impl Camera {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: 0,
            name: String::new(),
            x,
            y,
            width,
            height,
            round_pixels: false,
            visible: true,
            input_enabled: true,
            use_bounds: false,
            bounds: Rect::default(),
            world_view: Rect::default(),
            dirty: true,
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            rotation: 0.0,
            matrix: TransformMatrix::IDENTITY,
            resolution: 1.0,
            transparent: true,
            background_color: Color::TRANSPARENT,
            alpha: 1.0,
            disable_cull: false,
            lerp: Vec2::ONE,
            follow_offset: Vec2::ZERO,
            mid_point: Vec2::new(width / 2.0, height / 2.0),
            origin_x: 0.5,
            origin_y: 0.5,
            deadzone: None,
            follow: None,
            fade_effect: Fade::default(),
            flash_effect: Flash::default(),
            shake_effect: Shake::default(),
            pan_effect: Pan::default(),
            zoom_effect: Zoom::default(),
            events: Vec::new(),
        }
    }

    // ── Dirty-tracked properties ──────────────────────────────────────────

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_scroll_x(&mut self, value: f32) {
        self.scroll_x = value;
        self.dirty = true;
    }

    fn set_scroll_y(&mut self, value: f32) {
        self.scroll_y = value;
        self.dirty = true;
    }

    pub fn display_width(&self) -> f32 {
        self.width / self.zoom
    }

    pub fn display_height(&self) -> f32 {
        self.height / self.zoom
    }

    pub fn center_x(&self) -> f32 {
        self.x + 0.5 * self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + 0.5 * self.height
    }

    // ── Setters ───────────────────────────────────────────────────────────

    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.set_size(width, height)
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.width = width;
        self.height = height;
        self.dirty = true;
        self
    }

    pub fn set_scroll(&mut self, x: f32, y: f32) -> &mut Self {
        self.set_scroll_x(x);
        self.set_scroll_y(y);
        self
    }

    /// Zero is replaced by 0.001 so display sizes stay finite.
    pub fn set_zoom(&mut self, value: f32) -> &mut Self {
        self.zoom = if value == 0.0 { 0.001 } else { value };
        self.dirty = true;
        self
    }

    pub fn set_rotation(&mut self, radians: f32) -> &mut Self {
        self.rotation = radians;
        self.dirty = true;
        self
    }

    pub fn set_angle(&mut self, degrees: f32) -> &mut Self {
        self.set_rotation(degrees.to_radians())
    }

    pub fn set_origin(&mut self, x: f32, y: f32) -> &mut Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.alpha = alpha;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    pub fn set_round_pixels(&mut self, round: bool) -> &mut Self {
        self.round_pixels = round;
        self
    }

    pub fn set_background_color(&mut self, color: Color) -> &mut Self {
        self.background_color = color;
        self.transparent = color.a == 0;
        self
    }

    pub fn set_lerp(&mut self, x: f32, y: f32) -> &mut Self {
        self.lerp = Vec2::new(x, y);
        self
    }

    pub fn set_follow_offset(&mut self, x: f32, y: f32) -> &mut Self {
        self.follow_offset = Vec2::new(x, y);
        self
    }

    // ── Centering ─────────────────────────────────────────────────────────

    /// The scroll that would center the camera on `(x, y)`, bounds applied.
    pub fn get_scroll(&self, x: f32, y: f32) -> Vec2 {
        let mut out = Vec2::new(x - self.width * 0.5, y - self.height * 0.5);
        if self.use_bounds {
            out.x = self.clamp_x(out.x);
            out.y = self.clamp_y(out.y);
        }
        out
    }

    pub fn center_on(&mut self, x: f32, y: f32) -> &mut Self {
        self.mid_point = Vec2::new(x, y);
        let scroll = self.get_scroll(x, y);
        self.set_scroll(scroll.x, scroll.y)
    }

    /// Center on the middle of the bounds. No-op without bounds.
    pub fn center_to_bounds(&mut self) -> &mut Self {
        if self.use_bounds {
            let (cx, cy) = (self.bounds.center_x(), self.bounds.center_y());
            self.mid_point = Vec2::new(cx, cy);
            self.set_scroll(cx - self.width * 0.5, cy - self.height * 0.5);
        }
        self
    }

    pub fn center_to_size(&mut self) -> &mut Self {
        let (w, h) = (self.width, self.height);
        self.set_scroll(w * 0.5, h * 0.5)
    }

    // ── Bounds ────────────────────────────────────────────────────────────

    pub fn set_bounds(&mut self, x: f32, y: f32, width: f32, height: f32, center_on: bool) -> &mut Self {
        self.bounds.set_to(x, y, width, height);
        self.dirty = true;
        self.use_bounds = true;
        if center_on {
            self.center_to_bounds();
        } else {
            let sx = self.clamp_x(self.scroll_x);
            let sy = self.clamp_y(self.scroll_y);
            self.set_scroll(sx, sy);
        }
        self
    }

    pub fn remove_bounds(&mut self) -> &mut Self {
        self.use_bounds = false;
        self.dirty = true;
        self.bounds = Rect::default();
        self
    }

    pub fn get_bounds(&self) -> Option<Rect> {
        self.use_bounds.then_some(self.bounds)
    }

    pub fn uses_bounds(&self) -> bool {
        self.use_bounds
    }

    /// Clamp a horizontal scroll value into the range that keeps the display
    /// area inside the bounds. When the bounds are narrower than the display,
    /// the range collapses to a single value.
    pub fn clamp_x(&self, x: f32) -> f32 {
        let dw = self.display_width();
        let bx = self.bounds.x + (dw - self.width) / 2.0;
        let bw = bx.max(bx + self.bounds.width - dw);
        clamp(x, bx, bw)
    }

    pub fn clamp_y(&self, y: f32) -> f32 {
        let dh = self.display_height();
        let by = self.bounds.y + (dh - self.height) / 2.0;
        let bh = by.max(by + self.bounds.height - dh);
        clamp(y, by, bh)
    }

    // ── Follow ────────────────────────────────────────────────────────────

    /// Track `target`. Lerp values are clamped to `0..=1`; the camera snaps
    /// to the target immediately.
    pub fn start_follow(
        &mut self,
        target: FollowTarget,
        round_pixels: bool,
        lerp_x: f32,
        lerp_y: f32,
        offset_x: f32,
        offset_y: f32,
    ) -> &mut Self {
        self.round_pixels = round_pixels;
        self.lerp = Vec2::new(lerp_x.clamp(0.0, 1.0), lerp_y.clamp(0.0, 1.0));
        self.follow_offset = Vec2::new(offset_x, offset_y);

        let p = target.follow_position() - self.follow_offset;
        self.follow = Some(target);
        self.mid_point = p;
        let (w, h) = (self.width, self.height);
        self.set_scroll(p.x - w / 2.0, p.y - h / 2.0)
    }

    pub fn stop_follow(&mut self) -> &mut Self {
        self.follow = None;
        self
    }

    pub fn is_following(&self) -> bool {
        self.follow.is_some()
    }

    /// Set (or with `None`, clear) the deadzone. When following, the camera
    /// recenters on the target first.
    pub fn set_deadzone(&mut self, size: Option<(f32, f32)>) -> &mut Self {
        let Some((width, height)) = size else {
            self.deadzone = None;
            return self;
        };
        let mut zone = self.deadzone.unwrap_or_default();
        zone.width = width;
        zone.height = height;

        if let Some(target) = &self.follow {
            let p = target.follow_position() - self.follow_offset;
            self.mid_point = p;
            let (w, h) = (self.width, self.height);
            self.set_scroll(p.x - w / 2.0, p.y - h / 2.0);
        }
        zone.center_on(self.mid_point.x, self.mid_point.y);
        self.deadzone = Some(zone);
        self
    }

    pub fn deadzone(&self) -> Option<Rect> {
        self.deadzone
    }

    // ── Per-frame ─────────────────────────────────────────────────────────

    /// Resolve follow, deadzone and bounds into the final scroll, refresh the
    /// world view and rebuild the camera matrix.
    pub fn pre_render(&mut self, base_scale: f32, resolution: f32) {
        let width = self.width;
        let height = self.height;
        let half_width = width * 0.5;
        let half_height = height * 0.5;
        let zoom = self.zoom * base_scale;
        let mut origin_x = width * self.origin_x;
        let mut origin_y = height * self.origin_y;
        let mut sx = self.scroll_x;
        let mut sy = self.scroll_y;

        if let Some(zone) = self.deadzone.as_mut() {
            zone.center_on(self.mid_point.x, self.mid_point.y);
        }

        if let Some(target) = &self.follow {
            let f = target.follow_position() - self.follow_offset;
            if let Some(zone) = self.deadzone {
                if f.x < zone.x {
                    sx = linear(sx, sx - (zone.x - f.x), self.lerp.x);
                } else if f.x > zone.right() {
                    sx = linear(sx, sx + (f.x - zone.right()), self.lerp.x);
                }
                if f.y < zone.y {
                    sy = linear(sy, sy - (zone.y - f.y), self.lerp.y);
                } else if f.y > zone.bottom() {
                    sy = linear(sy, sy + (f.y - zone.bottom()), self.lerp.y);
                }
            } else {
                sx = linear(sx, f.x - origin_x, self.lerp.x);
                sy = linear(sy, f.y - origin_y, self.lerp.y);
            }
        }

        if self.use_bounds {
            sx = self.clamp_x(sx);
            sy = self.clamp_y(sy);
        }

        // Only the pivot is snapped; the stored scroll keeps its fraction.
        if self.round_pixels {
            origin_x = origin_x.round();
            origin_y = origin_y.round();
        }

        self.set_scroll(sx, sy);

        let mid_x = sx + half_width;
        let mid_y = sy + half_height;
        self.mid_point = Vec2::new(mid_x, mid_y);

        let display_width = width / zoom;
        let display_height = height / zoom;
        self.world_view.set_to(
            mid_x - display_width / 2.0,
            mid_y - display_height / 2.0,
            display_width,
            display_height,
        );

        self.resolution = resolution;
        self.matrix
            .load_identity()
            .scale(resolution, resolution)
            .translate(self.x + origin_x, self.y + origin_y)
            .rotate(self.rotation)
            .scale(zoom, zoom)
            .translate(-origin_x, -origin_y);

        let shake = self.shake_effect.offset();
        if shake != Vec2::ZERO {
            self.matrix.translate(shake.x, shake.y);
        }
    }

    /// Filter `objects` down to those that intersect the camera's view.
    ///
    /// Corners are tested in viewport-local pixels, so a camera placed away
    /// from the canvas origin keeps what it shows. Objects without a size, or
    /// with a parent container, always pass.
    pub fn cull<'a, T: Cullable + ?Sized>(&self, objects: &[&'a T]) -> Vec<&'a T> {
        if self.disable_cull {
            return objects.to_vec();
        }
        let m = &self.matrix;
        if m.determinant() == 0.0 {
            return objects.to_vec();
        }

        let camera_w = self.width;
        let camera_h = self.height;
        let res = self.resolution;

        objects
            .iter()
            .copied()
            .filter(|object| {
                let Some(size) = object.cull_size() else { return true };
                if object.has_parent() {
                    return true;
                }
                let pos = object.position();
                let origin = object.origin();
                let factor = object.scroll_factor();
                let (ow, oh) = (size.x, size.y);

                let ox = (pos.x - self.scroll_x * factor.x) - ow * origin.x;
                let oy = (pos.y - self.scroll_y * factor.y) - oh * origin.y;
                let tx = m.get_x(ox, oy) / res - self.x;
                let ty = m.get_y(ox, oy) / res - self.y;
                let tw = m.get_x(ox + ow, oy + oh) / res - self.x;
                let th = m.get_y(ox + ow, oy + oh) / res - self.y;
                let cull_w = camera_w + ow;
                let cull_h = camera_h + oh;

                tx > -ow && ty > -oh && tx < cull_w && ty < cull_h
                    && tw > -ow && th > -oh && tw < cull_w && th < cull_h
            })
            .collect()
    }

    /// Map a point in camera space back into the world. Returns the input
    /// unchanged if the camera matrix is singular.
    pub fn get_world_point(&self, x: f32, y: f32) -> Vec2 {
        let Some(inverse) = self.matrix.try_inverse() else {
            return Vec2::new(x, y);
        };
        let (s, c) = self.rotation.sin_cos();
        let zoom = self.zoom;
        let res = self.resolution;
        let sx = (x + (self.scroll_x * c - self.scroll_y * s) * zoom) * res;
        let sy = (y + (self.scroll_x * s + self.scroll_y * c) * zoom) * res;
        inverse.transform_point(sx, sy)
    }

    /// Exclude `objects` from this camera.
    pub fn ignore<T: Renderable + ?Sized>(&self, objects: &mut [&mut T]) -> &Self {
        for object in objects.iter_mut() {
            let filter = object.camera_filter() | self.id;
            object.set_camera_filter(filter);
        }
        self
    }

    // ── Effects ───────────────────────────────────────────────────────────

    pub fn fade_in(&mut self, duration: f32, color: Color, callback: Option<EffectCallback>) -> bool {
        self.fade_effect.start(FadeDirection::In, duration, color, true, callback, &mut self.events)
    }

    pub fn fade_out(&mut self, duration: f32, color: Color, callback: Option<EffectCallback>) -> bool {
        self.fade_effect.start(FadeDirection::Out, duration, color, true, callback, &mut self.events)
    }

    pub fn fade_from(&mut self, duration: f32, color: Color, force: bool, callback: Option<EffectCallback>) -> bool {
        self.fade_effect.start(FadeDirection::In, duration, color, force, callback, &mut self.events)
    }

    pub fn fade(&mut self, duration: f32, color: Color, force: bool, callback: Option<EffectCallback>) -> bool {
        self.fade_effect.start(FadeDirection::Out, duration, color, force, callback, &mut self.events)
    }

    pub fn flash(&mut self, duration: f32, color: Color, force: bool, callback: Option<EffectCallback>) -> bool {
        self.flash_effect.start(duration, color, force, callback, &mut self.events)
    }

    pub fn shake(&mut self, duration: f32, intensity: Vec2, force: bool, callback: Option<EffectCallback>) -> bool {
        self.shake_effect.start(duration, intensity, force, callback, &mut self.events)
    }

    /// Pan so the camera midpoint ends on `(x, y)`.
    pub fn pan(
        &mut self,
        x: f32,
        y: f32,
        duration: f32,
        ease: Ease,
        force: bool,
        callback: Option<EffectCallback>,
    ) -> bool {
        let from = self.mid_point;
        self.pan_effect
            .start(from, Vec2::new(x, y), duration, ease, force, callback, &mut self.events)
    }

    pub fn zoom_to(
        &mut self,
        zoom: f32,
        duration: f32,
        ease: Ease,
        force: bool,
        callback: Option<EffectCallback>,
    ) -> bool {
        let from = self.zoom;
        self.zoom_effect
            .start(from, zoom, duration, ease, force, callback, &mut self.events)
    }

    pub fn reset_fx(&mut self) -> &mut Self {
        self.pan_effect.reset();
        self.zoom_effect.reset();
        self.shake_effect.reset();
        self.flash_effect.reset();
        self.fade_effect.reset();
        self
    }

    /// Advance every running effect by `delta` milliseconds.
    pub fn update(&mut self, _time: f32, delta: f32) {
        if !self.visible {
            return;
        }
        if let Some(mid) = self.pan_effect.update(delta, &mut self.events) {
            self.center_on(mid.x, mid.y);
        }
        if let Some(zoom) = self.zoom_effect.update(delta, &mut self.events) {
            self.set_zoom(zoom);
        }
        let size = Vec2::new(self.width, self.height);
        self.shake_effect
            .update(delta, size, self.zoom, self.round_pixels, &mut self.events);
        self.flash_effect.update(delta, &mut self.events);
        self.fade_effect.update(delta, &mut self.events);
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<CameraEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Misc ──────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> CameraJson {
        CameraJson {
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            zoom: self.zoom,
            rotation: self.rotation,
            round_pixels: self.round_pixels,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            background_color: self.background_color,
            bounds: self.get_bounds(),
        }
    }

    /// Emit `CameraEvent::Destroy`, stop every effect and drop the follow
    /// target, deadzone and bounds.
    pub fn destroy(&mut self) {
        self.events.push(CameraEvent::Destroy);
        self.reset_fx();
        self.follow = None;
        self.deadzone = None;
        self.use_bounds = false;
        self.bounds = Rect::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_zoom_is_replaced() {
        let mut cam = Camera::new(0.0, 0.0, 100.0, 100.0);
        cam.set_zoom(0.0);
        assert_eq!(cam.zoom(), 0.001);
    }

    #[test]
    fn setters_mark_dirty() {
        let mut cam = Camera::new(0.0, 0.0, 100.0, 100.0);
        cam.dirty = false;
        cam.set_scroll(1.0, 1.0);
        assert!(cam.dirty);
        cam.dirty = false;
        cam.set_rotation(0.1);
        assert!(cam.dirty);
        cam.dirty = false;
        cam.set_position(5.0, 5.0);
        assert!(!cam.dirty);
    }

    #[test]
    fn start_follow_clamps_lerp_and_snaps() {
        let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
        let target: FollowTarget = Rc::new(Cell::new(Vec2::new(500.0, 300.0)));
        cam.start_follow(target, false, 4.0, -1.0, 0.0, 0.0);
        assert_eq!(cam.lerp, Vec2::new(1.0, 0.0));
        assert_eq!((cam.scroll_x(), cam.scroll_y()), (400.0, 250.0));
    }

    #[test]
    fn round_pixels_rounds_origin_but_not_scroll() {
        let mut cam = Camera::new(0.0, 0.0, 101.0, 101.0);
        cam.set_round_pixels(true).set_scroll(10.25, 0.0);
        cam.pre_render(1.0, 1.0);
        assert_eq!(cam.scroll_x(), 10.25);
        assert!(cam.matrix.e.abs() < 1e-4);
    }

    #[test]
    fn json_includes_bounds_only_when_set() {
        let mut cam = Camera::new(0.0, 0.0, 100.0, 100.0);
        let json = serde_json::to_value(cam.to_json()).unwrap();
        assert!(json.get("bounds").is_none());
        assert_eq!(json["scrollX"], 0.0);

        cam.set_bounds(0.0, 0.0, 500.0, 500.0, false);
        let json = serde_json::to_value(cam.to_json()).unwrap();
        assert_eq!(json["bounds"]["width"], 500.0);
    }

    #[test]
    fn destroy_emits_event_and_clears_follow() {
        let mut cam = Camera::new(0.0, 0.0, 100.0, 100.0);
        cam.start_follow(Rc::new(Cell::new(Vec2::ZERO)), false, 1.0, 1.0, 0.0, 0.0);
        cam.destroy();
        assert!(!cam.is_following());
        assert_eq!(cam.drain_events(), vec![CameraEvent::Destroy]);
        assert!(cam.drain_events().is_empty());
    }
}
