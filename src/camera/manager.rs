// ── Camera manager ────────────────────────────────────────────────────────────
//
// Owns a scene's cameras.  Each camera gets a distinct single-bit id so game
// objects can ignore a set of cameras with one `u32` filter; with 32 bits
// the 33rd camera gets id 0 and cannot be ignored by anything.

use log::{debug, warn};

use crate::gameobject::Renderable;
use crate::renderer::Renderer;
use crate::scene::Scene;

use super::Camera;

/// Most cameras that can carry a filterable id.
pub const MAX_CAMERA_IDS: u32 = 32;

#[derive(Debug)]
pub struct CameraManager {
    cameras: Vec<Camera>,
    main: usize,
    width: f32,
    height: f32,
    pub round_pixels: bool,
    /// Scale applied on top of camera zoom (the game's base scale).
    pub base_scale: f32,
}

impl CameraManager {
    /// A manager with one full-size main camera.
    pub fn new(width: f32, height: f32) -> Self {
        let mut manager = Self {
            cameras: Vec::new(),
            main: 0,
            width,
            height,
            round_pixels: false,
            base_scale: 1.0,
        };
        manager.add(0.0, 0.0, width, height, true, "");
        manager
    }

    /// First free id bit, or 0 when all 32 are taken.
    fn next_id(&self) -> u32 {
        let taken = self.cameras.iter().fold(0u32, |mask, cam| mask | cam.id);
        (0..MAX_CAMERA_IDS)
            .map(|bit| 1u32 << bit)
            .find(|id| taken & id == 0)
            .unwrap_or(0)
    }

    /// Add a camera and return a handle to it. A zero `width` or `height`
    /// means the full game size.
    pub fn add(&mut self, x: f32, y: f32, width: f32, height: f32, make_main: bool, name: &str) -> &mut Camera {
        let width = if width > 0.0 { width } else { self.width };
        let height = if height > 0.0 { height } else { self.height };

        let mut camera = Camera::new(x, y, width, height);
        camera.set_name(name);
        camera.set_round_pixels(self.round_pixels);
        camera.id = self.next_id();
        if camera.id == 0 {
            warn!("camera limit of {MAX_CAMERA_IDS} reached; '{name}' cannot be ignored by objects");
        }
        debug!("camera '{name}' added with id {:#x}", camera.id);

        self.cameras.push(camera);
        let index = self.cameras.len() - 1;
        if make_main {
            self.main = index;
        }
        &mut self.cameras[index]
    }

    /// Remove the camera with `id`. The main camera falls back to the first
    /// remaining one. Returns the removed camera.
    pub fn remove(&mut self, id: u32) -> Option<Camera> {
        let index = self.cameras.iter().position(|cam| cam.id == id)?;
        let mut camera = self.cameras.remove(index);
        camera.destroy();

        if index == self.main || self.main >= self.cameras.len() {
            self.main = 0;
        } else if index < self.main {
            self.main -= 1;
        }
        Some(camera)
    }

    pub fn get_camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.iter().find(|cam| cam.name == name)
    }

    pub fn get_camera_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|cam| cam.name == name)
    }

    /// `None` only after every camera has been removed.
    pub fn main(&self) -> Option<&Camera> {
        self.cameras.get(self.main)
    }

    pub fn main_mut(&mut self) -> Option<&mut Camera> {
        self.cameras.get_mut(self.main)
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut [Camera] {
        &mut self.cameras
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Drop every camera and start over with a single main camera.
    pub fn reset_all(&mut self) -> &mut Camera {
        for camera in &mut self.cameras {
            camera.destroy();
        }
        self.cameras.clear();
        self.main = 0;
        let (width, height) = (self.width, self.height);
        self.add(0.0, 0.0, width, height, true, "")
    }

    /// New game size. The main camera follows it.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        if let Some(main) = self.main_mut() {
            main.set_size(width, height);
        }
    }

    pub fn update(&mut self, time: f32, delta: f32) {
        for camera in &mut self.cameras {
            camera.update(time, delta);
        }
    }

    /// Draw `scene` through every visible camera, in insertion order.
    pub fn render(&mut self, renderer: &mut Renderer, scene: &Scene, interpolation: f32) {
        let resolution = renderer.config().resolution;
        let children: Vec<&dyn Renderable> = scene.display_list.iter().map(|child| child.as_ref()).collect();

        for camera in &mut self.cameras {
            if !camera.visible || camera.alpha <= 0.0 {
                continue;
            }
            camera.pre_render(self.base_scale, resolution);

            let visible: Vec<&dyn Renderable> = camera
                .cull(&children)
                .into_iter()
                .filter(|child| child.camera_filter() & camera.id == 0)
                .collect();
            renderer.render(scene, &visible, interpolation, camera);
        }
    }
}
