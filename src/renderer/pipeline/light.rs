// ── Light2D (forward diffuse) pipeline ────────────────────────────────────────
//
// TextureTint batching with a lighting fragment shader.  Each object's normal
// map is sampled from texture unit 1.  Up to `LIGHT_COUNT` lights, picked by
// `LightsManager::cull`, are uploaded per camera in `on_render`; when a scene
// has no lights the pipeline stays inactive and drops whatever is batched
// through it.

use crate::camera::Camera;
use crate::error::Result;
use crate::gameobject::{Renderable, Sprite};
use crate::gl::TextureId;
use crate::matrix::TransformMatrix;
use crate::renderer::{Renderer, TextureOptions};
use crate::scene::Scene;

use super::texture_tint::{self, TextureTintPipeline};
use super::{Pipeline, PipelineCore, TextureBatcher, TextureQuad, LIGHT_2D};

pub const LIGHT_COUNT: usize = 10;

pub const FRAGMENT_SHADER: &str = include_str!("../shaders/forward_diffuse.frag");

/// Flat "straight up" normal used for objects without a normal map.
const DEFAULT_NORMAL: [u8; 4] = [127, 127, 255, 255];

pub struct ForwardDiffuseLightPipeline {
    inner: TextureTintPipeline,
    default_normal_map: TextureId,
    active: bool,
}

impl ForwardDiffuseLightPipeline {
    pub fn new(renderer: &mut Renderer) -> Result<Self> {
        let fragment = FRAGMENT_SHADER.replace("%LIGHT_COUNT%", &LIGHT_COUNT.to_string());
        let inner =
            TextureTintPipeline::with_shaders(renderer, LIGHT_2D, texture_tint::VERTEX_SHADER, &fragment)?;
        let default_normal_map =
            match renderer.create_texture_2d(1, 1, Some(&DEFAULT_NORMAL), TextureOptions::default()) {
                Ok(texture) => texture,
                Err(e) => {
                    inner.core().destroy(renderer);
                    return Err(e);
                }
            };
        Ok(Self { inner, default_normal_map, active: false })
    }

    /// Whether the last `on_render` found lights to draw with.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn default_normal_map(&self) -> TextureId {
        self.default_normal_map
    }

    pub fn inner(&self) -> &TextureTintPipeline {
        &self.inner
    }

    fn set_normal_map(&mut self, normal_map: Option<TextureId>) {
        self.inner.set_texture_2d(normal_map.unwrap_or(self.default_normal_map), 1);
    }

    fn append(
        &mut self,
        renderer: &mut Renderer,
        quad: &TextureQuad,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        self.inner.ensure_capacity(renderer, 6);
        self.set_normal_map(quad.normal_map);
        self.inner.append_texture_quad(renderer, quad, camera, parent);
    }
}

impl Pipeline for ForwardDiffuseLightPipeline {
    fn core(&self) -> &PipelineCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut PipelineCore {
        self.inner.core_mut()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn on_bind(&mut self, renderer: &mut Renderer, object: Option<&dyn Renderable>) {
        self.inner.on_bind(renderer, object);

        let program = self.inner.core().program;
        let (width, height) = (self.inner.core().width, self.inner.core().height);
        renderer.set_int1(program, "uNormSampler", 1);
        renderer.set_float2(program, "uResolution", width, height);

        if let Some(object) = object {
            self.set_normal_map(object.normal_map());
        }
    }

    fn on_render(&mut self, renderer: &mut Renderer, scene: &Scene, camera: &Camera) {
        self.active = false;

        let manager = &scene.lights;
        if !manager.active || manager.is_empty() {
            return;
        }

        let viewport_height = renderer.config().height as f32;
        let lights = manager.cull(camera, viewport_height);
        if lights.is_empty() {
            return;
        }
        self.active = true;

        let program = self.inner.core().program;
        for index in 0..LIGHT_COUNT {
            renderer.set_float1(program, &format!("uLights[{index}].radius"), 0.0);
        }

        let ambient = manager.ambient_color;
        renderer.set_float4(program, "uCamera", camera.x, camera.y, camera.rotation(), camera.zoom());
        renderer.set_float3(program, "uAmbientLightColor", ambient.r, ambient.g, ambient.b);

        let height = renderer.height() as f32;
        let zoom = camera.zoom();
        for (index, light) in lights.iter().take(LIGHT_COUNT).enumerate() {
            let point = camera.matrix.transform_point(light.x, light.y);
            let x = point.x - camera.scroll_x() * light.scroll_factor_x * zoom;
            let y = height - (point.y - camera.scroll_y() * light.scroll_factor_y * zoom);

            let name = format!("uLights[{index}]");
            renderer.set_float2(program, &format!("{name}.position"), x, y);
            renderer.set_float3(program, &format!("{name}.color"), light.color.r, light.color.g, light.color.b);
            renderer.set_float1(program, &format!("{name}.intensity"), light.intensity);
            renderer.set_float1(program, &format!("{name}.radius"), light.radius);
        }
    }

    fn flush(&mut self, renderer: &mut Renderer) {
        self.inner.flush(renderer);
    }

    fn resize(&mut self, width: f32, height: f32, resolution: f32) {
        self.inner.resize(width, height, resolution);
    }

    fn as_batcher(&mut self) -> Option<&mut dyn TextureBatcher> {
        Some(self)
    }

    fn destroy(&mut self, renderer: &mut Renderer) {
        renderer.delete_texture(self.default_normal_map);
        self.inner.destroy(renderer);
    }
}

impl TextureBatcher for ForwardDiffuseLightPipeline {
    fn batch_sprite(
        &mut self,
        renderer: &mut Renderer,
        sprite: &Sprite,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        if !self.active {
            return;
        }
        renderer.set_pipeline(self, Some(sprite as &dyn Renderable));
        let quad = sprite.texture_quad(camera);
        self.append(renderer, &quad, camera, parent);
    }

    fn batch_texture(
        &mut self,
        renderer: &mut Renderer,
        quad: &TextureQuad,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        if !self.active {
            return;
        }
        renderer.set_pipeline(self, None);
        self.append(renderer, quad, camera, parent);
    }
}
