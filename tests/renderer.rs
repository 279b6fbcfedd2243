use std::cell::{Cell, RefCell};
use std::rc::Rc;

use prism2d::camera::CameraManager;
use prism2d::color::Color;
use prism2d::config::RendererConfig;
use prism2d::error::RenderError;
use prism2d::gameobject::{BitmapMask, Frame, Rectangle, Renderable, Sprite, Texture};
use prism2d::gl::headless::{GlCall, HeadlessContext, HeadlessHandle, UniformValue};
use prism2d::gl::{
    rgba_byte_len, BlendEquation, BlendFactor, Capability, FramebufferStatus, ShaderStage, TextureId,
    Topology,
};
use prism2d::renderer::pipeline::texture_tint::{self, TextureTintPipeline};
use prism2d::renderer::{
    BlendFunc, BlendModeId, ImageKind, Pipeline, Renderer, Snapshot, TextureOptions, BITMAP_MASK,
    FLAT_TINT, LIGHT_2D, TEXTURE_TINT,
};
use prism2d::scene::{render_scene, Scene};

// ── Helpers ───────────────────────────────────────────────────────────────

fn renderer_with(config: RendererConfig) -> (Renderer, HeadlessHandle) {
    let gl = HeadlessContext::new(config.width, config.height);
    let handle = gl.handle();
    let renderer = Renderer::new(Box::new(gl), config).expect("headless renderer");
    (renderer, handle)
}

fn renderer() -> (Renderer, HeadlessHandle) {
    renderer_with(RendererConfig::default())
}

fn texture(renderer: &mut Renderer) -> Texture {
    let id = renderer
        .create_texture_2d(4, 4, None, TextureOptions::default())
        .expect("texture");
    Texture::new(id, 4, 4)
}

fn sprite(texture: Texture, x: f32, y: f32) -> Box<dyn Renderable> {
    Box::new(Sprite::new(Frame::whole(texture), x, y))
}

fn draw_frame(renderer: &mut Renderer, handle: &HeadlessHandle, scene: &Scene) -> usize {
    let mut cameras = CameraManager::new(800.0, 600.0);
    handle.clear_calls();
    render_scene(renderer, scene, &mut cameras, 1.0);
    handle.draw_calls()
}

// ── Construction ──────────────────────────────────────────────────────────

#[test]
fn new_registers_default_pipelines_in_order() {
    let (renderer, _) = renderer();
    assert_eq!(renderer.pipeline_names(), vec![TEXTURE_TINT, FLAT_TINT, BITMAP_MASK, LIGHT_2D]);
    assert_eq!(renderer.current_blend_mode(), Some(BlendModeId::NORMAL));
    assert!(renderer.blank_texture().is_some());
}

#[test]
fn new_scales_drawing_buffer_by_resolution() {
    let config = RendererConfig { resolution: 2.0, ..RendererConfig::default() };
    let (renderer, _) = renderer_with(config);
    assert_eq!((renderer.width(), renderer.height()), (1600, 1200));
}

#[test]
fn new_fails_when_context_is_already_lost() {
    let gl = HeadlessContext::new(800, 600);
    gl.handle().lose_context();
    let err = Renderer::new(Box::new(gl), RendererConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::ContextUnavailable));
}

#[test]
fn new_fails_on_shader_compile_error() {
    let gl = HeadlessContext::new(800, 600);
    gl.handle().fail_compile(Some(ShaderStage::Fragment));
    let err = Renderer::new(Box::new(gl), RendererConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
}

#[test]
fn new_rejects_invalid_config() {
    let config = RendererConfig { batch_size: 0, ..RendererConfig::default() };
    let gl = HeadlessContext::new(800, 600);
    let err = Renderer::new(Box::new(gl), config).unwrap_err();
    assert!(matches!(err, RenderError::InvalidConfig(_)));
}

#[test]
fn max_textures_is_capped_by_the_context() {
    let config = RendererConfig { max_textures: 64, ..RendererConfig::default() };
    let (renderer, _) = renderer_with(config);
    assert_eq!(renderer.get_max_textures(), 16);
    assert_eq!(renderer.get_max_texture_size(), 4096);
}

// ── State tracking ────────────────────────────────────────────────────────

#[test]
fn set_texture_2d_skips_redundant_binds() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    handle.clear_calls();

    renderer.set_texture_2d(Some(tex.handle), 0);
    renderer.set_texture_2d(Some(tex.handle), 0);

    assert_eq!(handle.count(|c| matches!(c, GlCall::BindTexture(_))), 1);
    assert_eq!(renderer.state().texture(0), Some(tex.handle));
}

#[test]
fn set_texture_2d_ignores_out_of_range_units() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    handle.clear_calls();

    renderer.set_texture_2d(Some(tex.handle), 99);
    assert!(handle.calls().is_empty());
}

#[test]
fn set_program_skips_redundant_binds() {
    let (mut renderer, handle) = renderer();
    let program = renderer.create_program("void main() {}", "void main() {}").unwrap();
    handle.clear_calls();

    renderer.set_program(Some(program));
    renderer.set_program(Some(program));
    assert_eq!(handle.count(|c| matches!(c, GlCall::UseProgram(_))), 1);
}

#[test]
fn set_blend_mode_only_issues_on_change() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    let issued = |h: &HeadlessHandle| {
        h.count(|c| matches!(c, GlCall::BlendFunc(..) | GlCall::BlendFuncSeparate(..)))
    };

    assert!(!renderer.set_blend_mode(BlendModeId::NORMAL));
    assert!(renderer.set_blend_mode(BlendModeId::ADD));
    assert!(!renderer.set_blend_mode(BlendModeId::ADD));
    assert!(!renderer.set_blend_mode(BlendModeId::SKIP_CHECK));
    assert_eq!(issued(&handle), 1);
    assert_eq!(renderer.current_blend_mode(), Some(BlendModeId::ADD));
}

#[test]
fn custom_blend_modes_can_be_added_and_removed() {
    let (mut renderer, _) = renderer();
    let id = renderer.add_blend_mode(
        BlendFunc::Combined { src: BlendFactor::One, dst: BlendFactor::One },
        BlendEquation::Subtract,
    );
    assert!(renderer.set_blend_mode(id));
    assert!(renderer.remove_blend_mode(id));
    assert!(!renderer.remove_blend_mode(BlendModeId::MULTIPLY));
    assert_eq!(renderer.current_blend_mode(), None);
}

#[test]
fn scissor_push_pop_flips_y_and_toggles_test() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();

    assert!(renderer.push_scissor(10, 20, 100, 50));
    renderer.pop_scissor();

    assert_eq!(
        handle.calls(),
        vec![
            GlCall::Enable(Capability::ScissorTest),
            GlCall::Scissor(10, 530, 100, 50),
            GlCall::Disable(Capability::ScissorTest),
        ]
    );
    assert_eq!(renderer.state().scissor.depth(), 0);
}

#[test]
fn nested_scissors_restore_each_level() {
    let (mut renderer, handle) = renderer();
    let full = [0, 0, 800, 600];
    let outer = [10, 20, 100, 50];
    let inner = [30, 40, 20, 10];
    handle.clear_calls();

    assert!(renderer.push_scissor(10, 20, 100, 50));
    assert!(renderer.push_scissor(30, 40, 20, 10));
    assert_eq!(renderer.state().scissor.current, inner);
    assert_eq!(renderer.state().scissor.depth(), 2);
    assert_eq!(
        handle.calls(),
        vec![
            GlCall::Enable(Capability::ScissorTest),
            GlCall::Scissor(10, 530, 100, 50),
            GlCall::Scissor(30, 550, 20, 10),
        ]
    );

    handle.clear_calls();
    renderer.pop_scissor();
    assert_eq!(renderer.state().scissor.current, outer);
    assert!(renderer.state().scissor.enabled);
    assert_eq!(handle.calls(), vec![GlCall::Scissor(10, 530, 100, 50)]);

    handle.clear_calls();
    renderer.pop_scissor();
    assert_eq!(renderer.state().scissor.current, full);
    assert!(!renderer.state().scissor.enabled);
    assert_eq!(handle.calls(), vec![GlCall::Disable(Capability::ScissorTest)]);
    assert_eq!(renderer.state().scissor.depth(), 0);
}

#[test]
fn full_viewport_scissor_issues_nothing() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    renderer.push_scissor(0, 0, 800, 600);
    renderer.pop_scissor();
    assert!(handle.calls().is_empty());
}

#[test]
fn pop_scissor_on_empty_stack_is_harmless() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    renderer.pop_scissor();
    assert!(handle.calls().is_empty());
}

// ── Resources ─────────────────────────────────────────────────────────────

#[test]
fn create_framebuffer_reports_incomplete_status() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    handle.set_framebuffer_status(FramebufferStatus::IncompleteAttachment);

    let err = renderer.create_framebuffer(4, 4, tex.handle, false).unwrap_err();
    assert!(matches!(
        err,
        RenderError::FramebufferIncomplete(FramebufferStatus::IncompleteAttachment)
    ));
}

#[test]
fn create_texture_rejects_oversized_textures() {
    let (mut renderer, _) = renderer();
    let err = renderer
        .create_texture_2d(8192, 1, None, TextureOptions::default())
        .unwrap_err();
    assert!(matches!(err, RenderError::ResourceCreation(_)));
}

#[test]
fn canvas_upload_into_existing_texture_is_checked() {
    let (mut renderer, _) = renderer();
    let target = texture(&mut renderer).handle;

    let oversized = renderer.canvas_to_texture(8192, 1, &[], Some(target)).unwrap_err();
    assert!(matches!(oversized, RenderError::ResourceCreation(_)));
    let short = renderer.canvas_to_texture(2, 2, &[0; 4], Some(target)).unwrap_err();
    assert!(matches!(short, RenderError::ResourceCreation(_)));
    assert_eq!(renderer.canvas_to_texture(2, 2, &[0; 16], Some(target)).unwrap(), target);
}

#[test]
fn rgba_sizes_that_overflow_are_refused() {
    assert_eq!(rgba_byte_len(2, 3), Some(24));
    assert_eq!(rgba_byte_len(u32::MAX, u32::MAX), None);
}

#[test]
fn create_program_reports_link_failure() {
    let (mut renderer, handle) = renderer();
    handle.fail_link(true);
    let err = renderer.create_program("v", "f").unwrap_err();
    assert!(matches!(err, RenderError::ProgramLink(_)));
}

#[test]
fn extensions_fail_softly() {
    let (mut renderer, _) = renderer();
    assert!(renderer.has_extension("OES_texture_float"));
    assert!(renderer.get_extension("OES_texture_float"));
    assert!(!renderer.has_extension("WEBGL_draw_buffers"));
    assert!(!renderer.get_extension("WEBGL_draw_buffers"));
}

#[test]
fn resize_updates_viewport_and_size() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    renderer.resize(400, 300);
    assert_eq!((renderer.width(), renderer.height()), (400, 300));
    assert!(handle.calls().contains(&GlCall::Viewport(0, 0, 400, 300)));
}

// ── Pipelines ─────────────────────────────────────────────────────────────

#[test]
fn duplicate_pipeline_name_keeps_the_original() {
    let (mut renderer, _) = renderer();
    let duplicate = TextureTintPipeline::new(&mut renderer).unwrap();
    assert!(!renderer.add_pipeline(TEXTURE_TINT, Box::new(duplicate)));
    assert_eq!(renderer.pipeline_names().len(), 4);
}

#[test]
fn custom_pipeline_can_be_added_and_removed() {
    let (mut renderer, _) = renderer();
    let custom = TextureTintPipeline::with_shaders(
        &mut renderer,
        "Custom",
        texture_tint::VERTEX_SHADER,
        texture_tint::FRAGMENT_SHADER,
    )
    .unwrap();
    assert!(renderer.add_pipeline("Custom", Box::new(custom)));
    assert!(renderer.has_pipeline("Custom"));

    let mut removed = renderer.remove_pipeline("Custom").expect("registered");
    removed.destroy(&mut renderer);
    assert!(!renderer.has_pipeline("Custom"));
    assert!(renderer.remove_pipeline("Custom").is_none());
}

#[test]
fn set_pipeline_by_name_binds_once() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    assert!(renderer.set_pipeline_by_name(FLAT_TINT, None));
    assert!(renderer.set_pipeline_by_name(FLAT_TINT, None));
    assert_eq!(handle.count(|c| matches!(c, GlCall::UseProgram(_))), 1);
    assert_eq!(renderer.current_pipeline_name(), Some(FLAT_TINT));
    assert!(!renderer.set_pipeline_by_name("Missing", None));
}

// ── Frames ────────────────────────────────────────────────────────────────

#[test]
fn sprites_sharing_a_texture_draw_in_one_call() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    for i in 0..5 {
        scene.add(sprite(tex, 50.0 + i as f32 * 20.0, 100.0));
    }
    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 1);
    assert_eq!(handle.count(|c| matches!(c, GlCall::BufferSubData { .. })), 1);
}

#[test]
fn texture_switches_split_draws_not_uploads() {
    let (mut renderer, handle) = renderer();
    let a = texture(&mut renderer);
    let b = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(a, 100.0, 100.0));
    scene.add(sprite(b, 200.0, 100.0));
    scene.add(sprite(a, 300.0, 100.0));

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 3);
    assert_eq!(handle.count(|c| matches!(c, GlCall::BufferSubData { .. })), 1);
}

#[test]
fn pipeline_switch_flushes_pending_vertices() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(tex, 100.0, 100.0));
    scene.add(Box::new(Rectangle::new(200.0, 200.0, 50.0, 50.0, Color::rgb(255, 0, 0))));
    scene.add(sprite(tex, 300.0, 100.0));

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 3);
}

#[test]
fn blend_mode_change_flushes() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(tex, 100.0, 100.0));
    let mut additive = Sprite::new(Frame::whole(tex), 200.0, 100.0);
    additive.set_blend_mode(BlendModeId::ADD);
    scene.add(Box::new(additive));

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 2);
    assert_eq!(renderer.current_blend_mode(), Some(BlendModeId::NORMAL));
}

#[test]
fn full_batch_flushes_mid_frame() {
    let config = RendererConfig { batch_size: 2, ..RendererConfig::default() };
    let (mut renderer, handle) = renderer_with(config);
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    for i in 0..5 {
        scene.add(sprite(tex, 50.0 + i as f32 * 20.0, 100.0));
    }
    // Two quads per batch: 2 + 2 + 1.
    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 3);
}

#[test]
fn objects_outside_the_camera_are_not_drawn() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(tex, 5000.0, 5000.0));
    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 0);
}

#[test]
fn ignored_objects_are_skipped() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut cameras = CameraManager::new(800.0, 600.0);
    let mut hidden = Sprite::new(Frame::whole(tex), 100.0, 100.0);
    if let Some(main) = cameras.main() {
        main.ignore(&mut [&mut hidden]);
    }
    let mut scene = Scene::new();
    scene.add(Box::new(hidden));

    handle.clear_calls();
    render_scene(&mut renderer, &scene, &mut cameras, 1.0);
    assert_eq!(handle.draw_calls(), 0);
}

#[test]
fn opaque_camera_background_is_filled() {
    let (mut renderer, handle) = renderer();
    let mut cameras = CameraManager::new(800.0, 600.0);
    if let Some(main) = cameras.main_mut() {
        main.set_background_color(Color::rgb(255, 0, 0));
    }
    handle.clear_calls();
    render_scene(&mut renderer, &Scene::new(), &mut cameras, 1.0);
    assert_eq!(handle.draw_calls(), 1);
}

#[test]
fn running_flash_draws_an_overlay() {
    let (mut renderer, handle) = renderer();
    let mut cameras = CameraManager::new(800.0, 600.0);
    if let Some(main) = cameras.main_mut() {
        assert!(main.flash(250.0, Color::WHITE, false, None));
    }
    cameras.update(0.0, 16.0);
    handle.clear_calls();
    render_scene(&mut renderer, &Scene::new(), &mut cameras, 1.0);
    assert_eq!(handle.draw_calls(), 1);
}

#[test]
fn light_pipeline_is_inert_without_lights() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut lit = Sprite::new(Frame::whole(tex), 400.0, 300.0);
    lit.set_pipeline(LIGHT_2D);
    let mut scene = Scene::new();
    scene.add(Box::new(lit));

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 0);
}

#[test]
fn light_pipeline_uploads_culled_lights() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut lit = Sprite::new(Frame::whole(tex), 400.0, 300.0);
    lit.set_pipeline(LIGHT_2D);
    let mut scene = Scene::new();
    scene.add(Box::new(lit));
    scene.lights.enable();
    scene.lights.add_light(400.0, 300.0, 100.0, 0xffffff, 1.0);

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 1);
    assert_eq!(
        handle.last_uniform("uLights[0].radius"),
        Some(UniformValue::Float(vec![100.0]))
    );
    assert_eq!(
        handle.last_uniform("uLights[1].radius"),
        Some(UniformValue::Float(vec![0.0]))
    );
}

/// Replays the recorded binds and returns the (unit 0, unit 1) textures
/// in effect at each draw.
fn textures_at_draws(handle: &HeadlessHandle) -> Vec<(Option<TextureId>, Option<TextureId>)> {
    let mut active = 0usize;
    let mut units = [None; 2];
    let mut seen = Vec::new();
    for call in handle.calls() {
        match call {
            GlCall::ActiveTexture(unit) => active = unit as usize,
            GlCall::BindTexture(texture) if active < units.len() => units[active] = texture,
            GlCall::DrawArrays(..) => seen.push((units[0], units[1])),
            _ => {}
        }
    }
    seen
}

#[test]
fn light_pipeline_keeps_normal_maps_per_sprite() {
    let (mut renderer, handle) = renderer();
    let (t1, t2) = (texture(&mut renderer), texture(&mut renderer));
    let (n1, n2) = (texture(&mut renderer), texture(&mut renderer));

    let mut scene = Scene::new();
    for (tex, normal, x) in [(t1, n1, 380.0), (t2, n1, 400.0), (t2, n2, 420.0)] {
        let mut lit = Sprite::new(Frame::whole(tex), x, 300.0);
        lit.set_pipeline(LIGHT_2D);
        lit.normal_map = Some(normal.handle);
        scene.add(Box::new(lit));
    }
    scene.lights.enable();
    scene.lights.add_light(400.0, 300.0, 100.0, 0xffffff, 1.0);

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 3);
    assert_eq!(
        textures_at_draws(&handle),
        vec![
            (Some(t1.handle), Some(n1.handle)),
            (Some(t2.handle), Some(n1.handle)),
            (Some(t2.handle), Some(n2.handle)),
        ]
    );
}

#[test]
fn bitmap_mask_composites_with_one_fullscreen_triangle() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let source = Rectangle::new(100.0, 100.0, 80.0, 80.0, Color::WHITE);
    let mask = BitmapMask::new(&mut renderer, Box::new(source)).unwrap();

    let mut masked = Sprite::new(Frame::whole(tex), 100.0, 100.0);
    masked.set_mask(Rc::new(mask));
    let mut scene = Scene::new();
    scene.add(Box::new(masked));

    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 3);
    let composites = handle.count(|c| matches!(c, GlCall::DrawArrays(Topology::Triangles, 0, 3)));
    assert_eq!(composites, 1);
    assert_eq!(renderer.state().framebuffer, None);
}

// ── Snapshot ──────────────────────────────────────────────────────────────

#[test]
fn snapshot_fires_once_at_end_of_frame() {
    let (mut renderer, _) = renderer();
    let shots: Rc<RefCell<Vec<Snapshot>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shots);
    renderer.snapshot(
        Box::new(move |result| sink.borrow_mut().push(result.expect("snapshot"))),
        ImageKind::Png,
        1.0,
    );
    assert!(renderer.has_pending_snapshot());

    renderer.pre_render();
    renderer.post_render();
    renderer.pre_render();
    renderer.post_render();

    let shots = shots.borrow();
    assert_eq!(shots.len(), 1);
    assert_eq!((shots[0].width, shots[0].height), (800, 600));
    assert_eq!(&shots[0].data[..4], b"\x89PNG");
}

// ── Context loss ──────────────────────────────────────────────────────────

#[test]
fn context_loss_suspends_rendering_and_restore_rebuilds() {
    let (mut renderer, handle) = renderer();
    let lost = Rc::new(Cell::new(0));
    let restored = Rc::new(Cell::new(0));
    let (l, r) = (Rc::clone(&lost), Rc::clone(&restored));
    renderer.on_context_lost_callback(Box::new(move |_| l.set(l.get() + 1)));
    renderer.on_context_restored_callback(Box::new(move |_| r.set(r.get() + 1)));

    let custom = TextureTintPipeline::with_shaders(
        &mut renderer,
        "Custom",
        texture_tint::VERTEX_SHADER,
        texture_tint::FRAGMENT_SHADER,
    )
    .unwrap();
    renderer.add_pipeline("Custom", Box::new(custom));

    handle.lose_context();
    renderer.pre_render();
    assert!(renderer.is_context_lost());
    assert_eq!(lost.get(), 1);

    // Still lost: restoring must fail.
    assert!(matches!(renderer.on_context_restored(), Err(RenderError::ContextLost)));

    handle.restore_context();
    renderer.on_context_restored().unwrap();
    assert!(!renderer.is_context_lost());
    assert_eq!(restored.get(), 1);
    assert_eq!(renderer.pipeline_names(), vec![TEXTURE_TINT, FLAT_TINT, BITMAP_MASK, LIGHT_2D]);
    assert!(!renderer.has_pipeline("Custom"));
}

#[test]
fn lost_context_skips_frames() {
    let (mut renderer, handle) = renderer();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(tex, 100.0, 100.0));

    handle.lose_context();
    let mut cameras = CameraManager::new(800.0, 600.0);
    render_scene(&mut renderer, &scene, &mut cameras, 1.0);
    assert!(renderer.is_context_lost());

    handle.restore_context();
    renderer.on_context_restored().unwrap();
    let tex = texture(&mut renderer);
    let mut scene = Scene::new();
    scene.add(sprite(tex, 100.0, 100.0));
    assert_eq!(draw_frame(&mut renderer, &handle, &scene), 1);
}

#[test]
fn destroy_releases_pipelines() {
    let (mut renderer, handle) = renderer();
    handle.clear_calls();
    renderer.destroy();
    assert!(renderer.is_destroyed());
    assert!(renderer.pipeline_names().is_empty());
    assert!(handle.count(|c| matches!(c, GlCall::DeleteProgram(_))) >= 4);
}
