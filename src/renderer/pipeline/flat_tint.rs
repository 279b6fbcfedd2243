// ── FlatTint pipeline ─────────────────────────────────────────────────────────
//
// Untextured, per-vertex colored triangles.  Used for camera backgrounds,
// flash and fade overlays and anything else drawn as solid geometry.

use bytemuck::{Pod, Zeroable};

use crate::error::Result;
use crate::gameobject::Renderable;
use crate::gl::{AttribType, BufferTarget, Topology};
use crate::matrix::TransformMatrix;
use crate::renderer::Renderer;

use super::{ModelViewProjection, Pipeline, PipelineCore, PipelineDescriptor, VertexAttribute, FLAT_TINT};

pub const VERTEX_SHADER: &str = include_str!("../shaders/flat_tint.vert");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/flat_tint.frag");

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FlatVertex {
    pub position: [f32; 2],
    /// ABGR.
    pub color: u32,
}

impl FlatVertex {
    pub const SIZE: u32 = std::mem::size_of::<FlatVertex>() as u32;

    pub fn attributes() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute::new("inPosition", 2, AttribType::Float, false, 0),
            VertexAttribute::new("inTint", 4, AttribType::UnsignedByte, true, 8),
        ]
    }
}

pub struct FlatTintPipeline {
    core: PipelineCore,
    vertices: Vec<FlatVertex>,
    mvp: ModelViewProjection,
}

impl FlatTintPipeline {
    pub fn new(renderer: &mut Renderer) -> Result<Self> {
        let capacity = renderer.config().batch_size * 6;
        let core = PipelineCore::new(
            renderer,
            PipelineDescriptor {
                name: FLAT_TINT,
                vertex_shader: VERTEX_SHADER,
                fragment_shader: FRAGMENT_SHADER,
                attributes: FlatVertex::attributes(),
                topology: Topology::Triangles,
                vertex_size: FlatVertex::SIZE,
                vertex_capacity: capacity,
                vertices: None,
            },
        )?;
        let mvp = ModelViewProjection::new(core.width, core.height);
        Ok(Self { core, vertices: Vec::with_capacity(capacity as usize), mvp })
    }

    pub fn vertices(&self) -> &[FlatVertex] {
        &self.vertices
    }

    fn ensure_capacity(&mut self, renderer: &mut Renderer, vertices: u32) {
        if !self.core.has_room_for(vertices) {
            self.flush(renderer);
        }
    }

    /// Two triangles from corners in top-left, bottom-left, bottom-right,
    /// top-right order.
    pub fn batch_quad(&mut self, renderer: &mut Renderer, corners: [[f32; 2]; 4], tints: [u32; 4]) {
        self.ensure_capacity(renderer, 6);
        let [tl, bl, br, tr] = corners;
        let [tint_tl, tint_tr, tint_bl, tint_br] = tints;
        let v = |position: [f32; 2], color: u32| FlatVertex { position, color };
        self.vertices.extend_from_slice(&[
            v(tl, tint_tl),
            v(bl, tint_bl),
            v(br, tint_br),
            v(tl, tint_tl),
            v(br, tint_br),
            v(tr, tint_tr),
        ]);
        self.core.vertex_count += 6;
    }

    pub fn batch_tri(&mut self, renderer: &mut Renderer, points: [[f32; 2]; 3], tints: [u32; 3]) {
        self.ensure_capacity(renderer, 3);
        for (position, color) in points.into_iter().zip(tints) {
            self.vertices.push(FlatVertex { position, color });
        }
        self.core.vertex_count += 3;
    }

    /// A rectangle transformed by `current`, itself placed inside `parent`.
    #[allow(clippy::too_many_arguments)]
    pub fn batch_fill_rect(
        &mut self,
        renderer: &mut Renderer,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        tint: u32,
        current: &TransformMatrix,
        parent: Option<&TransformMatrix>,
    ) {
        renderer.set_pipeline(self, None);

        let calc = match parent {
            Some(parent) => parent.product(current),
            None => *current,
        };
        let xw = x + width;
        let yh = y + height;
        let corners = [
            [calc.get_x(x, y), calc.get_y(x, y)],
            [calc.get_x(x, yh), calc.get_y(x, yh)],
            [calc.get_x(xw, yh), calc.get_y(xw, yh)],
            [calc.get_x(xw, y), calc.get_y(xw, y)],
        ];
        self.batch_quad(renderer, corners, [tint; 4]);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn batch_fill_triangle(
        &mut self,
        renderer: &mut Renderer,
        points: [[f32; 2]; 3],
        tint: u32,
        current: &TransformMatrix,
        parent: Option<&TransformMatrix>,
    ) {
        renderer.set_pipeline(self, None);

        let calc = match parent {
            Some(parent) => parent.product(current),
            None => *current,
        };
        let points = points.map(|[x, y]| [calc.get_x(x, y), calc.get_y(x, y)]);
        self.batch_tri(renderer, points, [tint; 3]);
    }

    /// Screen-space rectangle in drawing-buffer pixels.
    pub fn fill_rect(&mut self, renderer: &mut Renderer, x: f32, y: f32, width: f32, height: f32, tint: u32) {
        self.batch_fill_rect(renderer, x, y, width, height, tint, &TransformMatrix::IDENTITY, None);
    }
}

impl Pipeline for FlatTintPipeline {
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
        self.mvp.upload(renderer, self.core.program);
    }

    fn flush(&mut self, renderer: &mut Renderer) {
        let count = self.core.vertex_count;
        if count == 0 {
            return;
        }
        renderer.set_blank_texture(false);
        renderer.gl_mut().buffer_sub_data(
            BufferTarget::Array,
            0,
            bytemuck::cast_slice(&self.vertices[..count as usize]),
        );
        renderer.gl_mut().draw_arrays(self.core.topology, 0, count as i32);
        self.core.vertex_count = 0;
        self.vertices.clear();
    }

    fn resize(&mut self, width: f32, height: f32, resolution: f32) {
        self.core.resize(width, height, resolution);
        self.mvp.set_ortho(self.core.width, self.core.height);
    }
}
