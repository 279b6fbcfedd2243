// =============================================================================
// LIGHTS.RS — point lights for the Light2D pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::camera::Camera;

pub const DEFAULT_MAX_LIGHTS: usize = 10;

/// Normalized RGB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LightColor {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`.
    pub fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: LightColor,
    pub intensity: f32,
    pub scroll_factor_x: f32,
    pub scroll_factor_y: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 0xffffff, 1.0)
    }
}

impl Light {
    pub fn new(x: f32, y: f32, radius: f32, rgb: u32, intensity: f32) -> Self {
        Self {
            x,
            y,
            radius,
            color: LightColor::from_hex(rgb),
            intensity,
            scroll_factor_x: 1.0,
            scroll_factor_y: 1.0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_color(&mut self, rgb: u32) -> &mut Self {
        self.color = LightColor::from_hex(rgb);
        self
    }

    pub fn set_intensity(&mut self, intensity: f32) -> &mut Self {
        self.intensity = intensity;
        self
    }

    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.radius = radius;
        self
    }

    pub fn set_scroll_factor(&mut self, x: f32, y: f32) -> &mut Self {
        self.scroll_factor_x = x;
        self.scroll_factor_y = y;
        self
    }
}

// ── LightsManager ─────────────────────────────────────────────────────────────

/// Per-scene light list. Starts disabled; `enable` turns lighting on.
#[derive(Clone, Debug, PartialEq)]
pub struct LightsManager {
    lights: Vec<Light>,
    pub ambient_color: LightColor,
    pub active: bool,
    /// Upper bound on what `cull` returns.
    pub max_lights: usize,
}

impl Default for LightsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LightsManager {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            ambient_color: LightColor::new(0.1, 0.1, 0.1),
            active: false,
            max_lights: DEFAULT_MAX_LIGHTS,
        }
    }

    pub fn enable(&mut self) -> &mut Self {
        self.active = true;
        self
    }

    pub fn disable(&mut self) -> &mut Self {
        self.active = false;
        self
    }

    pub fn set_ambient_color(&mut self, rgb: u32) -> &mut Self {
        self.ambient_color = LightColor::from_hex(rgb);
        self
    }

    /// Add a light and return its index.
    pub fn add_light(&mut self, x: f32, y: f32, radius: f32, rgb: u32, intensity: f32) -> usize {
        self.lights.push(Light::new(x, y, radius, rgb, intensity));
        self.lights.len() - 1
    }

    pub fn remove_light(&mut self, index: usize) -> Option<Light> {
        (index < self.lights.len()).then(|| self.lights.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// Lights whose radius reaches the camera's bounding circle, in insertion
    /// order, at most `max_lights` of them.
    ///
    /// Light positions are measured in the flipped-y space the lighting
    /// shader works in, so `viewport_height` is the game height.
    pub fn cull(&self, camera: &Camera, viewport_height: f32) -> Vec<&Light> {
        let center_x = camera.x + camera.width() / 2.0;
        let center_y = camera.y + camera.height() / 2.0;
        let camera_radius = (camera.width() + camera.height()) / 2.0;
        let zoom = camera.zoom();

        self.lights
            .iter()
            .filter(|light| {
                let point = camera.matrix.transform_point(light.x, light.y);
                let dx = center_x - (point.x - camera.scroll_x() * light.scroll_factor_x * zoom);
                let dy = center_y
                    - (viewport_height - (point.y - camera.scroll_y() * light.scroll_factor_y * zoom));
                (dx * dx + dy * dy).sqrt() < light.radius + camera_radius
            })
            .take(self.max_lights)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_normalizes_channels() {
        let c = LightColor::from_hex(0xff8000);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn cull_keeps_nearby_lights_and_caps_count() {
        let camera = Camera::new(0.0, 0.0, 800.0, 600.0);
        let mut lights = LightsManager::new();
        for _ in 0..15 {
            // The shader's y axis is flipped, so y = 300 sits at the center.
            lights.add_light(400.0, 300.0, 50.0, 0xffffff, 1.0);
        }
        lights.add_light(100_000.0, 100_000.0, 10.0, 0xffffff, 1.0);

        assert_eq!(lights.cull(&camera, 600.0).len(), 10);
        lights.max_lights = 100;
        assert_eq!(lights.cull(&camera, 600.0).len(), 15);
    }

    #[test]
    fn remove_light_out_of_range_is_none() {
        let mut lights = LightsManager::new();
        lights.add_light(0.0, 0.0, 10.0, 0xffffff, 1.0);
        assert!(lights.remove_light(3).is_none());
        assert!(lights.remove_light(0).is_some());
        assert!(lights.is_empty());
    }
}
