// =============================================================================
// PIPELINE — program + vertex layout + batching strategy
//
// A pipeline owns one shader program, one vertex buffer and a CPU-side vertex
// array.  Objects append vertices; `flush` uploads them and issues the draws.
//
// The renderer keeps its pipelines in an ordered registry.  While a pipeline
// is running (batching, flushing, handling a lifecycle hook) it is taken out
// of its slot, so `Renderer::flush` cannot re-enter it: a pipeline that is
// not in the registry is by definition busy and is skipped.
// =============================================================================

use std::any::Any;

use log::warn;

use crate::camera::Camera;
use crate::error::Result;
use crate::gameobject::{Renderable, Sprite};
use crate::gl::{AttribType, BufferId, BufferUsage, ProgramId, TextureId, Topology};
use crate::matrix::TransformMatrix;
use crate::renderer::Renderer;
use crate::scene::Scene;

pub mod bitmap_mask;
pub mod flat_tint;
pub mod light;
pub mod texture_tint;

pub use bitmap_mask::BitmapMaskPipeline;
pub use flat_tint::{FlatTintPipeline, FlatVertex};
pub use light::{ForwardDiffuseLightPipeline, LIGHT_COUNT};
pub use texture_tint::{TextureTintPipeline, TintVertex};

pub const TEXTURE_TINT: &str = "TextureTintPipeline";
pub const FLAT_TINT: &str = "FlatTintPipeline";
pub const BITMAP_MASK: &str = "BitmapMaskPipeline";
pub const LIGHT_2D: &str = "Light2D";

// ── Vertex layout ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub size: i32,
    pub ty: AttribType,
    pub normalized: bool,
    pub offset: i32,
    /// Resolved when the pipeline is created. `None` means the linker
    /// optimised the attribute away.
    pub location: Option<u32>,
}

impl VertexAttribute {
    pub const fn new(name: &'static str, size: i32, ty: AttribType, normalized: bool, offset: i32) -> Self {
        Self { name, size, ty, normalized, offset, location: None }
    }
}

pub struct PipelineDescriptor<'a> {
    pub name: &'a str,
    pub vertex_shader: &'a str,
    pub fragment_shader: &'a str,
    pub attributes: Vec<VertexAttribute>,
    pub topology: Topology,
    /// Bytes per vertex.
    pub vertex_size: u32,
    pub vertex_capacity: u32,
    /// Fixed vertex data. Pipelines that batch leave this empty and get a
    /// dynamic buffer of `vertex_capacity * vertex_size` bytes instead.
    pub vertices: Option<&'a [u8]>,
}

// ── PipelineCore ──────────────────────────────────────────────────────────────

/// State every pipeline carries.
#[derive(Debug)]
pub struct PipelineCore {
    pub name: String,
    pub program: ProgramId,
    pub vertex_buffer: BufferId,
    pub attributes: Vec<VertexAttribute>,
    pub topology: Topology,
    pub vertex_size: u32,
    pub vertex_capacity: u32,
    pub vertex_count: u32,
    pub width: f32,
    pub height: f32,
    pub resolution: f32,
}

impl PipelineCore {
    pub fn new(renderer: &mut Renderer, desc: PipelineDescriptor<'_>) -> Result<Self> {
        let program = renderer.create_program(desc.vertex_shader, desc.fragment_shader)?;

        let vertex_buffer = match desc.vertices {
            Some(data) => renderer.create_vertex_buffer_with(data, BufferUsage::Static),
            None => renderer.create_vertex_buffer(
                (desc.vertex_capacity * desc.vertex_size) as usize,
                BufferUsage::Dynamic,
            ),
        };
        let vertex_buffer = match vertex_buffer {
            Ok(buffer) => buffer,
            Err(e) => {
                renderer.delete_program(program);
                return Err(e);
            }
        };

        let mut attributes = desc.attributes;
        for attribute in &mut attributes {
            attribute.location = renderer.gl_mut().attrib_location(program, attribute.name);
        }

        Ok(Self {
            name: desc.name.to_string(),
            program,
            vertex_buffer,
            attributes,
            topology: desc.topology,
            vertex_size: desc.vertex_size,
            vertex_capacity: desc.vertex_capacity,
            vertex_count: 0,
            width: renderer.width() as f32,
            height: renderer.height() as f32,
            resolution: renderer.config().resolution,
        })
    }

    /// Make this pipeline's program and vertex buffer current and point every
    /// attribute at it.
    pub fn bind(&self, renderer: &mut Renderer) {
        renderer.set_program(Some(self.program));
        renderer.set_vertex_buffer(Some(self.vertex_buffer));

        let stride = self.vertex_size as i32;
        let gl = renderer.gl_mut();
        for attribute in &self.attributes {
            match attribute.location {
                Some(location) => {
                    gl.enable_vertex_attrib_array(location);
                    gl.vertex_attrib_pointer(
                        location,
                        attribute.size,
                        attribute.ty,
                        attribute.normalized,
                        stride,
                        attribute.offset,
                    );
                }
                None => warn!("{}: attribute '{}' is not active", self.name, attribute.name),
            }
        }
    }

    /// `true` once another quad would not fit.
    pub fn should_flush(&self) -> bool {
        self.vertex_count >= self.vertex_capacity
    }

    pub fn has_room_for(&self, vertices: u32) -> bool {
        self.vertex_count + vertices <= self.vertex_capacity
    }

    pub fn resize(&mut self, width: f32, height: f32, resolution: f32) {
        self.width = width * resolution;
        self.height = height * resolution;
        self.resolution = resolution;
    }

    pub fn destroy(&self, renderer: &mut Renderer) {
        renderer.delete_program(self.program);
        renderer.delete_buffer(self.vertex_buffer);
    }
}

// ── Model-view-projection ─────────────────────────────────────────────────────

/// Column-major 4x4 matrices uploaded as `uModelMatrix`, `uViewMatrix` and
/// `uProjectionMatrix`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelViewProjection {
    pub model: [f32; 16],
    pub view: [f32; 16],
    pub projection: [f32; 16],
    pub dirty: bool,
}

const IDENTITY_4: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl ModelViewProjection {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            model: IDENTITY_4,
            view: IDENTITY_4,
            projection: ortho(0.0, width, height, 0.0, -1000.0, 1000.0),
            dirty: true,
        }
    }

    pub fn set_ortho(&mut self, width: f32, height: f32) {
        self.projection = ortho(0.0, width, height, 0.0, -1000.0, 1000.0);
        self.dirty = true;
    }

    /// Upload whatever changed since the last call.
    pub fn upload(&mut self, renderer: &mut Renderer, program: ProgramId) {
        if !self.dirty {
            return;
        }
        renderer.set_matrix4(program, "uModelMatrix", false, &self.model);
        renderer.set_matrix4(program, "uViewMatrix", false, &self.view);
        renderer.set_matrix4(program, "uProjectionMatrix", false, &self.projection);
        self.dirty = false;
    }
}

pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> [f32; 16] {
    let lr = 1.0 / (left - right);
    let bt = 1.0 / (bottom - top);
    let nf = 1.0 / (near - far);
    let mut m = [0.0; 16];
    m[0] = -2.0 * lr;
    m[5] = -2.0 * bt;
    m[10] = 2.0 * nf;
    m[12] = (left + right) * lr;
    m[13] = (top + bottom) * bt;
    m[14] = (far + near) * nf;
    m[15] = 1.0;
    m
}

// ── Pipeline trait ────────────────────────────────────────────────────────────

pub trait Pipeline: Any {
    fn core(&self) -> &PipelineCore;
    fn core_mut(&mut self) -> &mut PipelineCore;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn name(&self) -> &str {
        &self.core().name
    }

    /// Called once after the pipeline has been registered.
    fn boot(&mut self, _renderer: &mut Renderer) {}

    fn bind(&mut self, renderer: &mut Renderer) {
        self.core().bind(renderer);
    }

    /// Runs on every `set_pipeline`, whether or not a rebind happened.
    fn on_bind(&mut self, _renderer: &mut Renderer, _object: Option<&dyn Renderable>) {}

    fn on_pre_render(&mut self, _renderer: &mut Renderer) {}

    fn on_render(&mut self, _renderer: &mut Renderer, _scene: &Scene, _camera: &Camera) {}

    fn on_post_render(&mut self, _renderer: &mut Renderer) {}

    /// Upload pending vertices and draw them.
    fn flush(&mut self, renderer: &mut Renderer);

    fn resize(&mut self, width: f32, height: f32, resolution: f32) {
        self.core_mut().resize(width, height, resolution);
    }

    fn should_flush(&self) -> bool {
        self.core().should_flush()
    }

    fn as_batcher(&mut self) -> Option<&mut dyn TextureBatcher> {
        None
    }

    fn destroy(&mut self, renderer: &mut Renderer) {
        self.core().destroy(renderer);
    }
}

/// Pipelines that can draw textured game objects.
pub trait TextureBatcher {
    fn batch_sprite(
        &mut self,
        renderer: &mut Renderer,
        sprite: &Sprite,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    );

    fn batch_texture(
        &mut self,
        renderer: &mut Renderer,
        quad: &TextureQuad,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    );
}

/// Everything `batch_texture` needs to place one textured quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureQuad {
    pub texture: TextureId,
    pub texture_width: f32,
    pub texture_height: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub scroll_factor_x: f32,
    pub scroll_factor_y: f32,
    pub display_origin_x: f32,
    pub display_origin_y: f32,
    pub frame_x: f32,
    pub frame_y: f32,
    pub frame_width: f32,
    pub frame_height: f32,
    pub tint_tl: u32,
    pub tint_tr: u32,
    pub tint_bl: u32,
    pub tint_br: u32,
    pub tint_effect: f32,
    pub u_offset: f32,
    pub v_offset: f32,
    pub normal_map: Option<TextureId>,
}

impl TextureQuad {
    /// A whole texture drawn at `(x, y)` with a top-left origin and no tint.
    pub fn new(texture: TextureId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            texture,
            texture_width: width,
            texture_height: height,
            x,
            y,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            scroll_factor_x: 1.0,
            scroll_factor_y: 1.0,
            display_origin_x: 0.0,
            display_origin_y: 0.0,
            frame_x: 0.0,
            frame_y: 0.0,
            frame_width: width,
            frame_height: height,
            tint_tl: 0xffff_ffff,
            tint_tr: 0xffff_ffff,
            tint_bl: 0xffff_ffff,
            tint_br: 0xffff_ffff,
            tint_effect: 0.0,
            u_offset: 0.0,
            v_offset: 0.0,
            normal_map: None,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

type Slot = (String, Option<Box<dyn Pipeline>>);

/// Named pipelines in registration order.
#[derive(Default)]
pub struct PipelineRegistry {
    slots: Vec<Slot>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|(n, _)| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Register `pipeline` under `name`. An existing entry wins.
    pub fn insert(&mut self, name: &str, pipeline: Box<dyn Pipeline>) -> std::result::Result<(), Box<dyn Pipeline>> {
        if self.contains(name) {
            return Err(pipeline);
        }
        self.slots.push((name.to_string(), Some(pipeline)));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Pipeline> {
        let i = self.index(name)?;
        self.slots[i].1.as_deref()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Pipeline + 'static)> {
        let i = self.index(name)?;
        self.slots[i].1.as_deref_mut()
    }

    /// Borrow a pipeline out of its slot. `None` if unknown or already out.
    pub fn take(&mut self, name: &str) -> Option<Box<dyn Pipeline>> {
        let i = self.index(name)?;
        self.slots[i].1.take()
    }

    /// Put a taken pipeline back. Hands it back if its slot is gone.
    pub fn restore(&mut self, name: &str, pipeline: Box<dyn Pipeline>) -> Option<Box<dyn Pipeline>> {
        match self.index(name) {
            Some(i) if self.slots[i].1.is_none() => {
                self.slots[i].1 = Some(pipeline);
                None
            }
            _ => Some(pipeline),
        }
    }

    /// Unregister. The slot disappears even if the pipeline is currently out.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Pipeline>> {
        let i = self.index(name)?;
        self.slots.remove(i).1
    }

    pub fn drain(&mut self) -> Vec<(String, Box<dyn Pipeline>)> {
        self.slots
            .drain(..)
            .filter_map(|(name, p)| p.map(|p| (name, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_maps_corners_to_clip_space() {
        let m = ortho(0.0, 800.0, 600.0, 0.0, -1000.0, 1000.0);
        let project = |x: f32, y: f32| (m[0] * x + m[12], m[5] * y + m[13]);
        let (x0, y0) = project(0.0, 0.0);
        let (x1, y1) = project(800.0, 600.0);
        assert!((x0 + 1.0).abs() < 1e-6 && (y0 - 1.0).abs() < 1e-6);
        assert!((x1 - 1.0).abs() < 1e-6 && (y1 + 1.0).abs() < 1e-6);
    }

    #[test]
    fn vertex_attribute_starts_unresolved() {
        let a = VertexAttribute::new("inPosition", 2, AttribType::Float, false, 0);
        assert_eq!(a.location, None);
    }
}
