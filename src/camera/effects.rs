// ── Camera effects ────────────────────────────────────────────────────────────
//
// Five small time-driven state machines owned by every `Camera`.  Each one
// advances its own `progress` from 0 to 1 over `duration` milliseconds when
// the camera is updated, calls its optional per-tick callback with the
// current progress, and pushes start / complete events onto the camera's
// event queue.
//
// Effects never reach back into the camera.  `Pan` and `Zoom` return the
// value the camera should apply this tick, `Shake` exposes an offset that
// the camera adds to its matrix in `pre_render`, and `Fade` / `Flash` expose
// an overlay that the renderer draws after the camera's objects.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::color::Color;
use crate::ease::Ease;

/// Called once per tick with the effect's progress (0..=1).
pub type EffectCallback = Box<dyn FnMut(f32)>;

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum CameraEvent {
    FadeInStart { duration: f32, color: Color },
    FadeInComplete,
    FadeOutStart { duration: f32, color: Color },
    FadeOutComplete,
    FlashStart { duration: f32, color: Color },
    FlashComplete,
    ShakeStart { duration: f32, intensity: Vec2 },
    ShakeComplete,
    PanStart { duration: f32, x: f32, y: f32 },
    PanComplete,
    ZoomStart { duration: f32, zoom: f32 },
    ZoomComplete,
    Destroy,
}

// ── Shared timing ─────────────────────────────────────────────────────────────

/// Elapsed-time bookkeeping shared by every effect.
#[derive(Default)]
struct Timeline {
    running: bool,
    duration: f32,
    elapsed: f32,
    progress: f32,
    callback: Option<EffectCallback>,
}

impl Timeline {
    fn begin(&mut self, duration: f32, callback: Option<EffectCallback>) {
        self.running = true;
        self.duration = duration;
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.callback = callback;
    }

    /// Advance by `delta` ms. Returns `true` while the effect is still inside
    /// its duration, `false` on the tick it finishes.
    fn advance(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        self.progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if let Some(cb) = self.callback.as_mut() {
            cb(self.progress);
        }
        self.elapsed < self.duration
    }

    fn finish(&mut self) {
        self.running = false;
        self.callback = None;
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("running", &self.running)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("progress", &self.progress)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

// ── Fade ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FadeDirection {
    /// From clear to the fade color.
    #[default]
    Out,
    /// From the fade color to clear.
    In,
}

/// Fades the camera to or from a solid color.
#[derive(Debug, Default)]
pub struct Fade {
    timeline: Timeline,
    complete: bool,
    direction: FadeDirection,
    color: Color,
    alpha: f32,
}

impl Fade {
    pub const DEFAULT_DURATION: f32 = 1000.0;

    pub fn start(
        &mut self,
        direction: FadeDirection,
        duration: f32,
        color: Color,
        force: bool,
        callback: Option<EffectCallback>,
        events: &mut Vec<CameraEvent>,
    ) -> bool {
        if !force && self.timeline.running {
            return false;
        }
        self.timeline.begin(duration, callback);
        self.complete = false;
        self.direction = direction;
        self.color = Color::rgb(color.r, color.g, color.b);
        self.alpha = match direction {
            FadeDirection::Out => f32::MIN_POSITIVE,
            FadeDirection::In => 1.0,
        };
        events.push(match direction {
            FadeDirection::Out => CameraEvent::FadeOutStart { duration, color: self.color },
            FadeDirection::In => CameraEvent::FadeInStart { duration, color: self.color },
        });
        true
    }

    pub fn update(&mut self, delta: f32, events: &mut Vec<CameraEvent>) {
        if !self.timeline.running {
            return;
        }
        if self.timeline.advance(delta) {
            let p = self.timeline.progress;
            self.alpha = match self.direction {
                FadeDirection::Out => p,
                FadeDirection::In => 1.0 - p,
            };
        } else {
            self.alpha = match self.direction {
                FadeDirection::Out => 1.0,
                FadeDirection::In => 0.0,
            };
            self.timeline.finish();
            self.complete = true;
            events.push(match self.direction {
                FadeDirection::Out => CameraEvent::FadeOutComplete,
                FadeDirection::In => CameraEvent::FadeInComplete,
            });
        }
    }

    /// Color and alpha to draw over the camera, if any. A completed fade keeps
    /// its final overlay until `reset`.
    pub fn overlay(&self) -> Option<(Color, f32)> {
        if !self.timeline.running && !self.complete {
            return None;
        }
        Some((self.color, self.alpha))
    }

    pub fn reset(&mut self) {
        self.timeline.finish();
        self.complete = false;
    }

    pub fn is_running(&self) -> bool {
        self.timeline.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

// ── Flash ─────────────────────────────────────────────────────────────────────

/// A full-camera color flash that fades from opaque to clear.
#[derive(Debug, Default)]
pub struct Flash {
    timeline: Timeline,
    color: Color,
    alpha: f32,
}

impl Flash {
    pub const DEFAULT_DURATION: f32 = 250.0;

    pub fn start(
        &mut self,
        duration: f32,
        color: Color,
        force: bool,
        callback: Option<EffectCallback>,
        events: &mut Vec<CameraEvent>,
    ) -> bool {
        if !force && self.timeline.running {
            return false;
        }
        self.timeline.begin(duration, callback);
        self.color = Color::rgb(color.r, color.g, color.b);
        self.alpha = 1.0;
        events.push(CameraEvent::FlashStart { duration, color: self.color });
        true
    }

    pub fn update(&mut self, delta: f32, events: &mut Vec<CameraEvent>) {
        if !self.timeline.running {
            return;
        }
        if self.timeline.advance(delta) {
            self.alpha = 1.0 - self.timeline.progress;
        } else {
            self.alpha = 0.0;
            self.timeline.finish();
            events.push(CameraEvent::FlashComplete);
        }
    }

    pub fn overlay(&self) -> Option<(Color, f32)> {
        self.timeline.running.then_some((self.color, self.alpha))
    }

    pub fn reset(&mut self) {
        self.timeline.finish();
    }

    pub fn is_running(&self) -> bool {
        self.timeline.running
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

// ── Shake ─────────────────────────────────────────────────────────────────────

/// Every shake draws from the same seeded sequence.
const SHAKE_SEED: u64 = 0x5eed_cafe;

/// Jitters the camera matrix by a random offset each tick.
#[derive(Debug)]
pub struct Shake {
    timeline: Timeline,
    intensity: Vec2,
    offset: Vec2,
    rng: SmallRng,
}

impl Default for Shake {
    fn default() -> Self {
        Self {
            timeline: Timeline::default(),
            intensity: Vec2::ZERO,
            offset: Vec2::ZERO,
            rng: SmallRng::seed_from_u64(SHAKE_SEED),
        }
    }
}

impl Shake {
    pub const DEFAULT_DURATION: f32 = 100.0;
    pub const DEFAULT_INTENSITY: f32 = 0.05;

    pub fn start(
        &mut self,
        duration: f32,
        intensity: Vec2,
        force: bool,
        callback: Option<EffectCallback>,
        events: &mut Vec<CameraEvent>,
    ) -> bool {
        if !force && self.timeline.running {
            return false;
        }
        self.timeline.begin(duration, callback);
        self.intensity = intensity;
        self.offset = Vec2::ZERO;
        events.push(CameraEvent::ShakeStart { duration, intensity });
        true
    }

    /// `size` is the camera's viewport size; the offset scales with it and
    /// with the zoom.
    pub fn update(
        &mut self,
        delta: f32,
        size: Vec2,
        zoom: f32,
        round_pixels: bool,
        events: &mut Vec<CameraEvent>,
    ) {
        if !self.timeline.running {
            return;
        }
        if self.timeline.advance(delta) {
            let ix = self.intensity.x * size.x;
            let iy = self.intensity.y * size.y;
            let rx: f32 = self.rng.gen_range(0.0..1.0);
            let ry: f32 = self.rng.gen_range(0.0..1.0);
            let mut offset = Vec2::new((rx * ix * 2.0 - ix) * zoom, (ry * iy * 2.0 - iy) * zoom);
            if round_pixels {
                offset = offset.round();
            }
            self.offset = offset;
        } else {
            self.offset = Vec2::ZERO;
            self.timeline.finish();
            events.push(CameraEvent::ShakeComplete);
        }
    }

    /// Matrix translation to apply this frame. Zero when idle.
    pub fn offset(&self) -> Vec2 {
        if self.timeline.running { self.offset } else { Vec2::ZERO }
    }

    pub fn reset(&mut self) {
        self.timeline.finish();
        self.offset = Vec2::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.timeline.running
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress
    }
}

// ── Pan ───────────────────────────────────────────────────────────────────────

/// Scrolls the camera so its midpoint travels to a destination.
#[derive(Debug, Default)]
pub struct Pan {
    timeline: Timeline,
    source: Vec2,
    destination: Vec2,
    ease: Ease,
}

impl Pan {
    pub const DEFAULT_DURATION: f32 = 1000.0;

    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        from: Vec2,
        to: Vec2,
        duration: f32,
        ease: Ease,
        force: bool,
        callback: Option<EffectCallback>,
        events: &mut Vec<CameraEvent>,
    ) -> bool {
        if !force && self.timeline.running {
            return false;
        }
        self.timeline.begin(duration, callback);
        self.source = from;
        self.destination = to;
        self.ease = ease;
        events.push(CameraEvent::PanStart { duration, x: to.x, y: to.y });
        true
    }

    /// The midpoint the camera should center on this tick, if panning.
    pub fn update(&mut self, delta: f32, events: &mut Vec<CameraEvent>) -> Option<Vec2> {
        if !self.timeline.running {
            return None;
        }
        if self.timeline.advance(delta) {
            let v = self.ease.apply(self.timeline.progress);
            Some(self.source.lerp(self.destination, v))
        } else {
            self.timeline.finish();
            events.push(CameraEvent::PanComplete);
            Some(self.destination)
        }
    }

    pub fn reset(&mut self) {
        self.timeline.finish();
    }

    pub fn is_running(&self) -> bool {
        self.timeline.running
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress
    }
}

// ── Zoom ──────────────────────────────────────────────────────────────────────

/// Eases the camera zoom to a target value.
#[derive(Debug, Default)]
pub struct Zoom {
    timeline: Timeline,
    source: f32,
    destination: f32,
    ease: Ease,
}

impl Zoom {
    pub const DEFAULT_DURATION: f32 = 1000.0;

    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        from: f32,
        to: f32,
        duration: f32,
        ease: Ease,
        force: bool,
        callback: Option<EffectCallback>,
        events: &mut Vec<CameraEvent>,
    ) -> bool {
        if !force && self.timeline.running {
            return false;
        }
        self.timeline.begin(duration, callback);
        self.source = from;
        self.destination = to;
        self.ease = ease;
        events.push(CameraEvent::ZoomStart { duration, zoom: to });
        true
    }

    /// The zoom the camera should use this tick, if zooming.
    pub fn update(&mut self, delta: f32, events: &mut Vec<CameraEvent>) -> Option<f32> {
        if !self.timeline.running {
            return None;
        }
        if self.timeline.advance(delta) {
            let v = self.ease.apply(self.timeline.progress);
            Some(self.source + (self.destination - self.source) * v)
        } else {
            self.timeline.finish();
            events.push(CameraEvent::ZoomComplete);
            Some(self.destination)
        }
    }

    pub fn reset(&mut self) {
        self.timeline.finish();
    }

    pub fn is_running(&self) -> bool {
        self.timeline.running
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fade_out_holds_overlay_after_completion() {
        let mut events = Vec::new();
        let mut fade = Fade::default();
        assert!(fade.start(FadeDirection::Out, 100.0, Color::rgb(255, 0, 0), false, None, &mut events));
        fade.update(50.0, &mut events);
        assert!((fade.alpha() - 0.5).abs() < 1e-5);
        fade.update(60.0, &mut events);
        assert!(!fade.is_running());
        assert!(fade.is_complete());
        assert_eq!(fade.overlay(), Some((Color::rgb(255, 0, 0), 1.0)));
        assert_eq!(events.last(), Some(&CameraEvent::FadeOutComplete));

        fade.reset();
        assert_eq!(fade.overlay(), None);
    }

    #[test]
    fn running_effect_ignores_start_without_force() {
        let mut events = Vec::new();
        let mut flash = Flash::default();
        assert!(flash.start(250.0, Color::WHITE, false, None, &mut events));
        assert!(!flash.start(500.0, Color::BLACK, false, None, &mut events));
        assert!(flash.start(500.0, Color::BLACK, true, None, &mut events));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn callback_receives_progress_each_tick() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut events = Vec::new();
        let mut zoom = Zoom::default();
        zoom.start(1.0, 3.0, 100.0, Ease::Linear, false, Some(Box::new(move |p| sink.borrow_mut().push(p))), &mut events);
        assert_eq!(zoom.update(25.0, &mut events), Some(1.5));
        assert_eq!(zoom.update(100.0, &mut events), Some(3.0));
        assert_eq!(zoom.update(10.0, &mut events), None);
        assert_eq!(*seen.borrow(), vec![0.25, 1.0]);
    }

    #[test]
    fn shake_offset_stays_within_intensity_and_resets() {
        let mut events = Vec::new();
        let mut shake = Shake::default();
        shake.start(100.0, Vec2::splat(0.05), false, None, &mut events);
        for _ in 0..5 {
            shake.update(10.0, Vec2::new(800.0, 600.0), 1.0, false, &mut events);
            let o = shake.offset();
            assert!(o.x.abs() <= 40.0 && o.y.abs() <= 30.0, "{o:?}");
        }
        shake.update(100.0, Vec2::new(800.0, 600.0), 1.0, false, &mut events);
        assert_eq!(shake.offset(), Vec2::ZERO);
        assert_eq!(events.last(), Some(&CameraEvent::ShakeComplete));
    }

    #[test]
    fn shakes_replay_the_same_offsets() {
        let size = Vec2::new(800.0, 600.0);
        let mut events = Vec::new();
        let mut a = Shake::default();
        let mut b = Shake::default();
        a.start(100.0, Vec2::splat(0.05), false, None, &mut events);
        b.start(100.0, Vec2::splat(0.05), false, None, &mut events);

        let mut moved = false;
        for _ in 0..5 {
            a.update(16.0, size, 1.0, false, &mut events);
            b.update(16.0, size, 1.0, false, &mut events);
            assert_eq!(a.offset(), b.offset());
            moved |= a.offset() != Vec2::ZERO;
        }
        assert!(moved);
    }
}
