// =============================================================================
// SCENE.RS — display list, lights and the per-frame render driver
// =============================================================================

use crate::camera::CameraManager;
use crate::gameobject::Renderable;
use crate::lights::LightsManager;
use crate::renderer::Renderer;

/// Everything one scene draws. The display list is drawn in order, so later
/// entries end up on top.
#[derive(Default)]
pub struct Scene {
    pub display_list: Vec<Box<dyn Renderable>>,
    pub lights: LightsManager,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("display_list", &self.display_list.len())
            .field("lights", &self.lights)
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the display list and return the new entry's index.
    pub fn add(&mut self, object: Box<dyn Renderable>) -> usize {
        self.display_list.push(object);
        self.display_list.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Renderable>> {
        (index < self.display_list.len()).then(|| self.display_list.remove(index))
    }

    pub fn len(&self) -> usize {
        self.display_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_list.is_empty()
    }
}

/// One full frame: clear, draw `scene` through every camera, then run the
/// end-of-frame work (snapshots, pipeline hooks).
pub fn render_scene(renderer: &mut Renderer, scene: &Scene, cameras: &mut CameraManager, interpolation: f32) {
    renderer.pre_render();
    cameras.render(renderer, scene, interpolation);
    renderer.post_render();
}
