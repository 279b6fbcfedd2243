// ── TextureTint pipeline ──────────────────────────────────────────────────────
//
// The default pipeline for textured quads.  Vertices are grouped into batches
// by texture; a texture switch opens a new batch instead of flushing, and
// `flush` issues one draw per batch.

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::color::get_tint_append_float_alpha_and_swap;
use crate::error::Result;
use crate::gameobject::{Frame, Renderable, Sprite};
use crate::gl::{AttribType, BufferTarget, TextureId, Topology};
use crate::matrix::TransformMatrix;
use crate::renderer::Renderer;

use super::{
    ModelViewProjection, Pipeline, PipelineCore, PipelineDescriptor, TextureBatcher, TextureQuad,
    VertexAttribute, TEXTURE_TINT,
};

pub const VERTEX_SHADER: &str = include_str!("../shaders/texture_tint.vert");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/texture_tint.frag");

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TintVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// 0 multiplies the texel by the tint, 1 replaces its color.
    pub tint_effect: f32,
    /// ABGR, uploaded as four normalized bytes.
    pub tint: u32,
}

impl TintVertex {
    pub const SIZE: u32 = std::mem::size_of::<TintVertex>() as u32;

    pub fn attributes() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute::new("inPosition", 2, AttribType::Float, false, 0),
            VertexAttribute::new("inTexCoord", 2, AttribType::Float, false, 8),
            VertexAttribute::new("inTintEffect", 1, AttribType::Float, false, 16),
            VertexAttribute::new("inTint", 4, AttribType::UnsignedByte, true, 20),
        ]
    }
}

/// A run of vertices that share textures.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub first: u32,
    /// Texture on unit 0.
    pub texture: Option<TextureId>,
    /// Textures on units 1.. (normal maps).
    pub textures: Vec<Option<TextureId>>,
}

impl Batch {
    fn starting_at(first: u32) -> Self {
        Self { first, ..Self::default() }
    }
}

pub struct TextureTintPipeline {
    core: PipelineCore,
    vertices: Vec<TintVertex>,
    batches: Vec<Batch>,
    mvp: ModelViewProjection,
}

impl TextureTintPipeline {
    pub fn new(renderer: &mut Renderer) -> Result<Self> {
        Self::with_shaders(renderer, TEXTURE_TINT, VERTEX_SHADER, FRAGMENT_SHADER)
    }

    /// Same vertex layout and batching, different program. The light
    /// pipeline is built this way.
    pub fn with_shaders(
        renderer: &mut Renderer,
        name: &str,
        vertex_shader: &str,
        fragment_shader: &str,
    ) -> Result<Self> {
        let capacity = renderer.config().batch_size * 6;
        let core = PipelineCore::new(
            renderer,
            PipelineDescriptor {
                name,
                vertex_shader,
                fragment_shader,
                attributes: TintVertex::attributes(),
                topology: Topology::Triangles,
                vertex_size: TintVertex::SIZE,
                vertex_capacity: capacity,
                vertices: None,
            },
        )?;
        let mvp = ModelViewProjection::new(core.width, core.height);
        Ok(Self {
            core,
            vertices: Vec::with_capacity(capacity as usize),
            batches: vec![Batch::starting_at(0)],
            mvp,
        })
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn vertices(&self) -> &[TintVertex] {
        &self.vertices
    }

    pub fn projection(&self) -> &[f32; 16] {
        &self.mvp.projection
    }

    /// Open a batch at the current vertex count. It starts with the
    /// bindings of the batch before it.
    pub fn push_batch(&mut self) {
        let first = self.core.vertex_count;
        let batch = match self.batches.last() {
            Some(open) => Batch { first, texture: open.texture, textures: open.textures.clone() },
            None => Batch::starting_at(first),
        };
        self.batches.push(batch);
    }

    /// Bind `texture` to `unit` for the vertices that follow. The open batch
    /// is split when it already holds vertices drawn with another binding.
    pub fn set_texture_2d(&mut self, texture: TextureId, unit: u32) {
        let vertex_count = self.core.vertex_count;
        let (bound, started) = match self.batches.last() {
            Some(open) => {
                let bound = if unit == 0 {
                    open.texture
                } else {
                    open.textures.get(unit as usize - 1).copied().flatten()
                };
                (bound, open.first < vertex_count)
            }
            None => (None, false),
        };
        if bound == Some(texture) {
            return;
        }
        if started || self.batches.is_empty() {
            self.push_batch();
        }

        let Some(batch) = self.batches.last_mut() else { return };
        if unit == 0 {
            batch.texture = Some(texture);
        } else {
            let slot = unit as usize - 1;
            if batch.textures.len() <= slot {
                batch.textures.resize(slot + 1, None);
            }
            batch.textures[slot] = Some(texture);
        }
    }

    /// Flush if fewer than `vertices` slots remain. Returns whether it did.
    pub fn ensure_capacity(&mut self, renderer: &mut Renderer, vertices: u32) -> bool {
        if self.core.has_room_for(vertices) {
            return false;
        }
        self.flush(renderer);
        true
    }

    /// Append one quad given its corners in top-left, bottom-left,
    /// bottom-right, top-right order and its `[u0, v0, u1, v1]` rect.
    #[allow(clippy::too_many_arguments)]
    pub fn batch_vertices(
        &mut self,
        renderer: &mut Renderer,
        corners: [[f32; 2]; 4],
        uv: [f32; 4],
        tints: [u32; 4],
        tint_effect: f32,
        texture: TextureId,
    ) {
        self.ensure_capacity(renderer, 6);
        self.set_texture_2d(texture, 0);

        let [tl, bl, br, tr] = corners;
        let [u0, v0, u1, v1] = uv;
        let [tint_tl, tint_tr, tint_bl, tint_br] = tints;
        let v = |position: [f32; 2], uv: [f32; 2], tint: u32| TintVertex { position, uv, tint_effect, tint };

        self.vertices.extend_from_slice(&[
            v(tl, [u0, v0], tint_tl),
            v(bl, [u0, v1], tint_bl),
            v(br, [u1, v1], tint_br),
            v(tl, [u0, v0], tint_tl),
            v(br, [u1, v1], tint_br),
            v(tr, [u1, v0], tint_tr),
        ]);
        self.core.vertex_count += 6;
    }

    /// Place a quad through the camera (and optional parent) transform.
    /// Does not touch the current pipeline.
    pub fn append_texture_quad(
        &mut self,
        renderer: &mut Renderer,
        quad: &TextureQuad,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        let mut width = quad.width;
        let mut height = quad.height;
        let mut x = -quad.display_origin_x;
        let mut y = -quad.display_origin_y;

        if quad.flip_x {
            width = -width;
            x += quad.width;
        }
        if quad.flip_y {
            height = -height;
            y += quad.height;
        }
        let xw = x + width;
        let yh = y + height;

        let mut sprite_matrix = TransformMatrix::IDENTITY;
        sprite_matrix.apply_itrs(quad.x, quad.y, quad.rotation, quad.scale_x, quad.scale_y);
        let mut cam_matrix = camera.matrix;

        let scroll_x = camera.scroll_x() * quad.scroll_factor_x;
        let scroll_y = camera.scroll_y() * quad.scroll_factor_y;
        let calc = match parent {
            Some(parent) => {
                cam_matrix.multiply_with_offset(parent, -scroll_x, -scroll_y);
                cam_matrix.product(&sprite_matrix)
            }
            None => {
                sprite_matrix.e -= scroll_x;
                sprite_matrix.f -= scroll_y;
                cam_matrix.product(&sprite_matrix)
            }
        };

        let mut corners = [
            [calc.get_x(x, y), calc.get_y(x, y)],
            [calc.get_x(x, yh), calc.get_y(x, yh)],
            [calc.get_x(xw, yh), calc.get_y(xw, yh)],
            [calc.get_x(xw, y), calc.get_y(xw, y)],
        ];
        if camera.round_pixels {
            for corner in &mut corners {
                corner[0] = corner[0].round();
                corner[1] = corner[1].round();
            }
        }

        let u0 = quad.frame_x / quad.texture_width + quad.u_offset;
        let v0 = quad.frame_y / quad.texture_height + quad.v_offset;
        let u1 = (quad.frame_x + quad.frame_width) / quad.texture_width + quad.u_offset;
        let v1 = (quad.frame_y + quad.frame_height) / quad.texture_height + quad.v_offset;

        self.batch_vertices(
            renderer,
            corners,
            [u0, v0, u1, v1],
            [quad.tint_tl, quad.tint_tr, quad.tint_bl, quad.tint_br],
            quad.tint_effect,
            quad.texture,
        );
    }

    /// Draw `frame` at `(x, y)` in the space of `transform`, optionally
    /// nested under `parent`. `tint` is `0xRRGGBB`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_texture_frame(
        &mut self,
        renderer: &mut Renderer,
        frame: &Frame,
        x: f32,
        y: f32,
        tint: u32,
        alpha: f32,
        transform: &TransformMatrix,
        parent: Option<&TransformMatrix>,
    ) {
        renderer.set_pipeline(self, None);

        let calc = match parent {
            Some(parent) => parent.product(transform),
            None => *transform,
        };
        let xw = x + frame.width;
        let yh = y + frame.height;
        let corners = [
            [calc.get_x(x, y), calc.get_y(x, y)],
            [calc.get_x(x, yh), calc.get_y(x, yh)],
            [calc.get_x(xw, yh), calc.get_y(xw, yh)],
            [calc.get_x(xw, y), calc.get_y(xw, y)],
        ];

        let tint = get_tint_append_float_alpha_and_swap(tint, alpha);
        self.batch_vertices(renderer, corners, frame.uvs(), [tint; 4], 0.0, frame.texture.handle);
    }
}

impl Pipeline for TextureTintPipeline {
    fn core(&self) -> &PipelineCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PipelineCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn on_bind(&mut self, renderer: &mut Renderer, _object: Option<&dyn Renderable>) {
        if self.batches.is_empty() {
            self.push_batch();
        }
        self.mvp.upload(renderer, self.core.program);
    }

    fn flush(&mut self, renderer: &mut Renderer) {
        let count = self.core.vertex_count;
        if count == 0 {
            return;
        }

        renderer.gl_mut().buffer_sub_data(
            BufferTarget::Array,
            0,
            bytemuck::cast_slice(&self.vertices[..count as usize]),
        );

        let topology = self.core.topology;
        for (i, batch) in self.batches.iter().enumerate() {
            let end = self.batches.get(i + 1).map_or(count, |next| next.first);

            for (offset, texture) in batch.textures.iter().enumerate() {
                if let Some(texture) = texture {
                    renderer.set_texture_2d(Some(*texture), 1 + offset as u32);
                }
            }

            let Some(texture) = batch.texture else { continue };
            let batch_count = end.saturating_sub(batch.first);
            if batch_count == 0 {
                continue;
            }
            renderer.set_texture_2d(Some(texture), 0);
            renderer.gl_mut().draw_arrays(topology, batch.first as i32, batch_count as i32);
        }

        self.core.vertex_count = 0;
        self.vertices.clear();
        self.batches.clear();
        self.push_batch();
    }

    fn resize(&mut self, width: f32, height: f32, resolution: f32) {
        self.core.resize(width, height, resolution);
        self.mvp.set_ortho(self.core.width, self.core.height);
    }

    fn as_batcher(&mut self) -> Option<&mut dyn TextureBatcher> {
        Some(self)
    }
}

impl TextureBatcher for TextureTintPipeline {
    fn batch_sprite(
        &mut self,
        renderer: &mut Renderer,
        sprite: &Sprite,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        renderer.set_pipeline(self, Some(sprite as &dyn Renderable));
        let quad = sprite.texture_quad(camera);
        self.append_texture_quad(renderer, &quad, camera, parent);
    }

    fn batch_texture(
        &mut self,
        renderer: &mut Renderer,
        quad: &TextureQuad,
        camera: &Camera,
        parent: Option<&TransformMatrix>,
    ) {
        renderer.set_pipeline(self, None);
        self.append_texture_quad(renderer, quad, camera, parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_24_bytes() {
        assert_eq!(TintVertex::SIZE, 24);
        let offsets: Vec<i32> = TintVertex::attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 20]);
    }
}
