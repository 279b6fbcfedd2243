// Headless demo: renders a few frames of a small scene against the recording
// GL backend and prints what reached the GPU.
//
//   RUST_LOG=debug cargo run

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};

use prism2d::camera::CameraManager;
use prism2d::color::Color;
use prism2d::config::RendererConfig;
use prism2d::ease::Ease;
use prism2d::gameobject::{Frame, Rectangle, Sprite, Texture};
use prism2d::gl::headless::{GlCall, HeadlessContext};
use prism2d::renderer::{BlendModeId, ImageKind, Renderer, Snapshot, TextureOptions, LIGHT_2D};
use prism2d::scene::{render_scene, Scene};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const FRAME_MS: f32 = 1000.0 / 60.0;

fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / 4 + y / 4) % 2 == 0 { [255, 255, 255, 255] } else { [40, 40, 60, 255] }
        })
        .collect()
}

fn run() -> prism2d::Result<()> {
    let config = RendererConfig::from_json(
        r##"{ "width": 320, "height": 240, "backgroundColor": "#102030", "batchSize": 64 }"##,
    )?;

    let gl = HeadlessContext::new(WIDTH, HEIGHT);
    let handle = gl.handle();
    let mut renderer = Renderer::new(Box::new(gl), config)?;

    let pixels = checkerboard(16);
    let handle_id = renderer.create_texture_2d(16, 16, Some(&pixels), TextureOptions::default())?;
    let texture = Texture::new(handle_id, 16, 16);

    let mut scene = Scene::new();
    for i in 0..40 {
        let mut sprite = Sprite::new(Frame::whole(texture), (i % 10) as f32 * 32.0 + 16.0, (i / 10) as f32 * 32.0 + 16.0);
        sprite.set_tint(0xff8040 + i as u32 * 0x000100);
        if i % 7 == 0 {
            sprite.set_blend_mode(BlendModeId::ADD);
        }
        scene.add(Box::new(sprite));
    }
    scene.add(Box::new(Rectangle::new(160.0, 200.0, 300.0, 20.0, Color::rgba(200, 40, 40, 180))));

    let mut lit = Sprite::new(Frame::whole(texture), 200.0, 120.0);
    lit.set_pipeline(LIGHT_2D);
    scene.add(Box::new(lit));
    scene.lights.enable().set_ambient_color(0x202020);
    scene.lights.add_light(200.0, 120.0, 150.0, 0xffeecc, 1.5);

    let mut cameras = CameraManager::new(WIDTH as f32, HEIGHT as f32);
    if let Some(main) = cameras.main_mut() {
        main.set_background_color(Color::rgb(16, 32, 48));
        main.pan(240.0, 160.0, 500.0, Ease::QuadInOut, false, None);
    }
    let minimap = cameras.add(WIDTH as f32 - 80.0, 0.0, 80.0, 60.0, false, "minimap");
    minimap.set_zoom(0.25).set_background_color(Color::BLACK);

    for frame in 0..30 {
        handle.clear_calls();
        cameras.update(frame as f32 * FRAME_MS, FRAME_MS);
        render_scene(&mut renderer, &scene, &mut cameras, 1.0);

        if frame % 10 == 0 {
            let draws = handle.draw_calls();
            let binds = handle.count(|c| matches!(c, GlCall::BindTexture(_)));
            let programs = handle.count(|c| matches!(c, GlCall::UseProgram(_)));
            info!("frame {frame}: {draws} draws, {binds} texture binds, {programs} program switches");
        }
    }

    let captured: Rc<RefCell<Option<Snapshot>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&captured);
    renderer.snapshot(
        Box::new(move |result| match result {
            Ok(shot) => *sink.borrow_mut() = Some(shot),
            Err(e) => error!("snapshot failed: {e}"),
        }),
        ImageKind::Png,
        1.0,
    );
    render_scene(&mut renderer, &scene, &mut cameras, 1.0);
    if let Some(shot) = captured.borrow().as_ref() {
        info!("snapshot: {}x{}, {} bytes of {}", shot.width, shot.height, shot.data.len(), shot.kind.mime());
    }

    handle.lose_context();
    render_scene(&mut renderer, &scene, &mut cameras, 1.0);
    handle.restore_context();
    renderer.on_context_restored()?;
    info!("pipelines after restore: {:?}", renderer.pipeline_names());

    renderer.destroy();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
