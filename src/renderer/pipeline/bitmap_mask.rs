// ── BitmapMask pipeline ───────────────────────────────────────────────────────
//
// Masking happens in two passes.  `begin_mask` renders the mask source into
// the mask framebuffer and redirects drawing into the main framebuffer;
// `end_mask` composites the main texture back onto the screen, weighted by
// the mask texture's alpha, with a single oversized triangle.

use crate::camera::Camera;
use crate::error::Result;
use crate::gameobject::{BitmapMask, Renderable};
use crate::gl::{AttribType, ClearMask, Topology};
use crate::renderer::Renderer;

use super::{Pipeline, PipelineCore, PipelineDescriptor, VertexAttribute, BITMAP_MASK};

pub const VERTEX_SHADER: &str = include_str!("../shaders/bitmap_mask.vert");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/bitmap_mask.frag");

/// One triangle that covers all of clip space.
const FULLSCREEN_TRIANGLE: [f32; 6] = [-1.0, 1.0, -1.0, -7.0, 7.0, 1.0];

pub struct BitmapMaskPipeline {
    core: PipelineCore,
}

impl BitmapMaskPipeline {
    pub fn new(renderer: &mut Renderer) -> Result<Self> {
        let core = PipelineCore::new(
            renderer,
            PipelineDescriptor {
                name: BITMAP_MASK,
                vertex_shader: VERTEX_SHADER,
                fragment_shader: FRAGMENT_SHADER,
                attributes: vec![VertexAttribute::new("inPosition", 2, AttribType::Float, false, 0)],
                topology: Topology::Triangles,
                vertex_size: 8,
                vertex_capacity: 3,
                vertices: Some(bytemuck::cast_slice(&FULLSCREEN_TRIANGLE)),
            },
        )?;
        Ok(Self { core })
    }

    /// Draw `mask`'s source into its mask framebuffer, then leave the main
    /// framebuffer bound so the masked object renders off-screen.
    pub fn begin_mask(&mut self, renderer: &mut Renderer, mask: &BitmapMask, camera: &Camera) {
        renderer.flush();
        renderer.set_framebuffer(Some(mask.mask_framebuffer()));
        renderer.gl_mut().clear_color(0.0, 0.0, 0.0, 0.0);
        renderer.gl_mut().clear(ClearMask::COLOR);

        mask.source().render_webgl(renderer, camera, 0.0);
        renderer.flush();

        renderer.set_framebuffer(Some(mask.main_framebuffer()));
        renderer.gl_mut().clear_color(0.0, 0.0, 0.0, 0.0);
        renderer.gl_mut().clear(ClearMask::COLOR);
    }

    /// Composite the main framebuffer onto the screen through the mask.
    pub fn end_mask(&mut self, renderer: &mut Renderer, mask: &BitmapMask) {
        renderer.set_framebuffer(None);
        renderer.set_pipeline(self, None);
        renderer.set_texture_2d(Some(mask.mask_texture()), 1);
        renderer.set_texture_2d(Some(mask.main_texture()), 0);
        renderer.set_int1(self.core.program, "uInvertMaskAlpha", i32::from(mask.invert_alpha));
        renderer.gl_mut().draw_arrays(self.core.topology, 0, 3);
    }
}

impl Pipeline for BitmapMaskPipeline {
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
        let program = self.core.program;
        renderer.set_float2(program, "uResolution", self.core.width, self.core.height);
        renderer.set_int1(program, "uMainSampler", 0);
        renderer.set_int1(program, "uMaskSampler", 1);
    }

    /// Nothing is batched; the composite draws immediately.
    fn flush(&mut self, _renderer: &mut Renderer) {}
}
