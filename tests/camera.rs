use std::cell::Cell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::Vec2;

use prism2d::camera::{Camera, CameraEvent, CameraManager};
use prism2d::color::Color;
use prism2d::ease::Ease;
use prism2d::gameobject::{Frame, Renderable, Sprite, Texture};
use prism2d::geometry::Rect;
use prism2d::gl::TextureId;

fn sprite_at(x: f32, y: f32, size: u32) -> Sprite {
    let mut sprite = Sprite::new(Frame::whole(Texture::new(TextureId(1), size, size)), x, y);
    sprite.set_origin(0.0, 0.0);
    sprite
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ── Scroll, world view and culling ────────────────────────────────────────────

#[test]
fn scrolled_camera_culls_and_places_object() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_scroll(100.0, 50.0);
    cam.pre_render(1.0, 1.0);

    assert_eq!(cam.world_view, Rect::new(100.0, 50.0, 800.0, 600.0));

    let sprite = sprite_at(150.0, 100.0, 50);
    let objects = [&sprite];
    assert_eq!(cam.cull(&objects).len(), 1);

    let screen = cam.matrix.transform_point(sprite.x - cam.scroll_x(), sprite.y - cam.scroll_y());
    assert_eq!(screen, Vec2::new(50.0, 50.0));
}

#[test]
fn cull_drops_objects_outside_the_view() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_scroll(100.0, 50.0);
    cam.pre_render(1.0, 1.0);

    let inside = sprite_at(400.0, 300.0, 50);
    let far_right = sprite_at(2000.0, 100.0, 50);
    let above = sprite_at(400.0, -200.0, 50);
    let straddling_left = sprite_at(60.0, 100.0, 50);
    let objects = [&inside, &far_right, &above, &straddling_left];

    let kept = cam.cull(&objects);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().any(|s| s.x == 400.0));
    assert!(kept.iter().any(|s| s.x == 60.0));
}

#[test]
fn scroll_factor_zero_pins_object_to_the_screen() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_scroll(5000.0, 5000.0);
    cam.pre_render(1.0, 1.0);

    let mut hud = sprite_at(10.0, 10.0, 32);
    hud.set_scroll_factor(0.0, 0.0);
    let world = sprite_at(10.0, 10.0, 32);
    let objects = [&hud, &world];
    let kept = cam.cull(&objects);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].scroll_factor_x, 0.0);
}

#[test]
fn disabled_cull_and_parented_objects_always_pass() {
    let mut cam = Camera::new(0.0, 0.0, 100.0, 100.0);
    cam.pre_render(1.0, 1.0);

    let mut child = sprite_at(5000.0, 5000.0, 10);
    child.parent = Some(prism2d::matrix::TransformMatrix::IDENTITY);
    let lost = sprite_at(5000.0, 5000.0, 10);
    let objects = [&child, &lost];
    assert_eq!(cam.cull(&objects).len(), 1);

    cam.disable_cull = true;
    assert_eq!(cam.cull(&objects).len(), 2);
}

#[test]
fn zoom_shrinks_the_world_view_around_the_midpoint() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_zoom(2.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.world_view, Rect::new(200.0, 150.0, 400.0, 300.0));
    assert_eq!((cam.display_width(), cam.display_height()), (400.0, 300.0));
}

#[test]
fn offset_viewport_culls_in_its_own_space() {
    let mut minimap = Camera::new(720.0, 0.0, 80.0, 60.0);
    minimap.set_zoom(0.25);
    minimap.pre_render(1.0, 1.0);
    assert_eq!(minimap.world_view, Rect::new(-120.0, -90.0, 320.0, 240.0));

    let shown = sprite_at(100.0, 100.0, 10);
    let beyond = sprite_at(1000.0, 100.0, 10);
    let objects = [&shown, &beyond];
    let kept = minimap.cull(&objects);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].x, 100.0);
}

#[test]
fn resolution_scales_the_matrix() {
    let mut cam = Camera::new(10.0, 20.0, 800.0, 600.0);
    cam.pre_render(1.0, 2.0);
    assert_eq!(cam.matrix.to_array(), [2.0, 0.0, 0.0, 2.0, 20.0, 40.0]);
}

#[test]
fn rotation_spins_around_the_viewport_center() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    cam.set_rotation(FRAC_PI_2);
    cam.pre_render(1.0, 1.0);
    let center = cam.matrix.transform_point(100.0, 50.0);
    assert!(approx(center.x, 100.0) && approx(center.y, 50.0), "{center:?}");
}

#[test]
fn world_point_inverts_scroll_and_zoom() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_scroll(100.0, 50.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.get_world_point(10.0, 20.0), Vec2::new(110.0, 70.0));

    cam.set_zoom(2.0);
    cam.pre_render(1.0, 1.0);
    let p = cam.get_world_point(400.0, 300.0);
    assert!(approx(p.x, 500.0) && approx(p.y, 350.0), "{p:?}");
}

#[test]
fn world_point_accounts_for_resolution() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.pre_render(1.0, 2.0);
    let p = cam.get_world_point(100.0, 100.0);
    assert!(approx(p.x, 100.0) && approx(p.y, 100.0), "{p:?}");

    cam.set_scroll(10.0, 0.0);
    cam.pre_render(1.0, 2.0);
    let p = cam.get_world_point(100.0, 100.0);
    assert!(approx(p.x, 110.0) && approx(p.y, 100.0), "{p:?}");
}

// ── Bounds ────────────────────────────────────────────────────────────────────

#[test]
fn bounds_clamp_scroll_during_pre_render() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_bounds(0.0, 0.0, 1000.0, 1000.0, false);
    cam.set_scroll(900.0, 900.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (200.0, 400.0));

    cam.set_scroll(-50.0, -50.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (0.0, 0.0));
}

#[test]
fn clamping_is_idempotent() {
    for zoom in [0.5, 1.0, 2.0] {
        let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
        cam.set_zoom(zoom);
        cam.set_bounds(0.0, 0.0, 1000.0, 1000.0, false);
        for step in -50..=50 {
            let v = step as f32 * 37.5;
            let x = cam.clamp_x(v);
            let y = cam.clamp_y(v);
            assert_eq!(cam.clamp_x(x), x, "zoom {zoom}, x {v}");
            assert_eq!(cam.clamp_y(y), y, "zoom {zoom}, y {v}");
        }
    }
}

#[test]
fn bounds_smaller_than_the_view_pin_scroll() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_bounds(0.0, 0.0, 400.0, 400.0, false);
    assert_eq!(cam.clamp_x(50.0), 0.0);
    assert_eq!(cam.clamp_y(-50.0), 0.0);
}

#[test]
fn zoomed_bounds_account_for_display_size() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_zoom(2.0);
    cam.set_bounds(0.0, 0.0, 1000.0, 1000.0, false);
    assert_eq!(cam.clamp_x(500.0), 400.0);
    assert_eq!(cam.clamp_x(-500.0), -200.0);
}

#[test]
fn center_to_bounds_and_remove_bounds() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.set_bounds(0.0, 0.0, 1000.0, 1000.0, true);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (100.0, 200.0));
    assert_eq!(cam.get_bounds(), Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)));

    cam.remove_bounds();
    assert!(!cam.uses_bounds());
    cam.set_scroll(5000.0, 5000.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.scroll_x(), 5000.0);
}

#[test]
fn center_on_respects_bounds() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.center_on(1000.0, 1000.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (600.0, 700.0));

    cam.set_bounds(0.0, 0.0, 1000.0, 1000.0, false);
    cam.center_on(1000.0, 1000.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (200.0, 400.0));
}

// ── Follow ────────────────────────────────────────────────────────────────────

#[test]
fn follow_with_full_lerp_tracks_target() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    let target = Rc::new(Cell::new(Vec2::new(500.0, 300.0)));
    cam.start_follow(target.clone(), false, 1.0, 1.0, 0.0, 0.0);

    target.set(Vec2::new(600.0, 300.0));
    cam.pre_render(1.0, 1.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (500.0, 250.0));
}

#[test]
fn follow_lerp_moves_part_way() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    let target = Rc::new(Cell::new(Vec2::new(500.0, 300.0)));
    cam.start_follow(target.clone(), false, 0.5, 0.5, 0.0, 0.0);

    target.set(Vec2::new(600.0, 300.0));
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.scroll_x(), 450.0);
    assert_eq!(cam.scroll_y(), 250.0);
}

#[test]
fn follow_offset_shifts_the_tracked_point() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    let target = Rc::new(Cell::new(Vec2::new(500.0, 300.0)));
    cam.start_follow(target, false, 1.0, 1.0, 50.0, -20.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (350.0, 270.0));
}

#[test]
fn deadzone_holds_scroll_until_target_leaves_it() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    let target = Rc::new(Cell::new(Vec2::new(100.0, 50.0)));
    cam.start_follow(target.clone(), false, 1.0, 1.0, 0.0, 0.0);
    cam.set_deadzone(Some((50.0, 50.0)));
    assert_eq!(cam.deadzone(), Some(Rect::new(75.0, 25.0, 50.0, 50.0)));

    target.set(Vec2::new(110.0, 50.0));
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.scroll_x(), 0.0);

    target.set(Vec2::new(140.0, 50.0));
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.scroll_x(), 15.0);
    assert_eq!(cam.mid_point, Vec2::new(115.0, 50.0));

    cam.set_deadzone(None);
    assert_eq!(cam.deadzone(), None);
}

#[test]
fn stop_follow_leaves_scroll_alone() {
    let mut cam = Camera::new(0.0, 0.0, 200.0, 100.0);
    let target = Rc::new(Cell::new(Vec2::new(500.0, 300.0)));
    cam.start_follow(target.clone(), false, 1.0, 1.0, 0.0, 0.0);
    cam.stop_follow();
    target.set(Vec2::new(9000.0, 9000.0));
    cam.pre_render(1.0, 1.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (400.0, 250.0));
}

// ── Effects driven through the camera ─────────────────────────────────────────

#[test]
fn pan_moves_the_midpoint_over_time() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    assert!(cam.pan(1400.0, 300.0, 1000.0, Ease::Linear, false, None));
    cam.update(0.0, 500.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (500.0, 0.0));

    cam.update(500.0, 600.0);
    assert_eq!((cam.scroll_x(), cam.scroll_y()), (1000.0, 0.0));
    assert_eq!(
        cam.drain_events(),
        vec![CameraEvent::PanStart { duration: 1000.0, x: 1400.0, y: 300.0 }, CameraEvent::PanComplete]
    );
}

#[test]
fn zoom_to_eases_the_zoom() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.zoom_to(2.0, 100.0, Ease::Linear, false, None);
    cam.update(0.0, 50.0);
    assert_eq!(cam.zoom(), 1.5);
    cam.update(50.0, 100.0);
    assert_eq!(cam.zoom(), 2.0);
}

#[test]
fn fade_out_then_reset_fx_clears_overlay() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    assert!(cam.fade_out(100.0, Color::rgba(255, 0, 0, 10), None));
    cam.update(0.0, 200.0);
    assert_eq!(cam.fade_effect.overlay(), Some((Color::rgb(255, 0, 0), 1.0)));
    assert_eq!(
        cam.drain_events(),
        vec![
            CameraEvent::FadeOutStart { duration: 100.0, color: Color::rgb(255, 0, 0) },
            CameraEvent::FadeOutComplete,
        ]
    );

    cam.reset_fx();
    assert_eq!(cam.fade_effect.overlay(), None);
}

#[test]
fn flash_without_force_does_not_restart() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    assert!(cam.flash(250.0, Color::WHITE, false, None));
    assert!(!cam.flash(250.0, Color::WHITE, false, None));
    assert!(cam.flash(250.0, Color::WHITE, true, None));
}

#[test]
fn hidden_camera_does_not_advance_effects() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.flash(100.0, Color::WHITE, false, None);
    cam.set_visible(false);
    cam.update(0.0, 500.0);
    assert!(cam.flash_effect.is_running());
}

#[test]
fn shake_completes_and_returns_matrix_to_rest() {
    let mut cam = Camera::new(0.0, 0.0, 800.0, 600.0);
    cam.shake(50.0, Vec2::splat(0.05), false, None);
    cam.update(0.0, 16.0);
    cam.update(16.0, 100.0);
    cam.pre_render(1.0, 1.0);
    assert_eq!(cam.matrix.to_array(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert!(cam.drain_events().contains(&CameraEvent::ShakeComplete));
}

// ── Ignore / manager ──────────────────────────────────────────────────────────

#[test]
fn ignored_objects_do_not_render_for_that_camera() {
    let mut cameras = CameraManager::new(800.0, 600.0);
    cameras.add(0.0, 0.0, 200.0, 200.0, false, "mini");

    let mut sprite = sprite_at(10.0, 10.0, 16);
    let mini = cameras.get_camera("mini").expect("mini camera");
    mini.ignore(&mut [&mut sprite]);
    assert_eq!(sprite.camera_filter(), 2);

    let main = cameras.main().expect("main camera");
    let mini = cameras.get_camera("mini").expect("mini camera");
    assert!(sprite.will_render(main));
    assert!(!sprite.will_render(mini));
}

#[test]
fn manager_resize_follows_main_camera_only() {
    let mut cameras = CameraManager::new(800.0, 600.0);
    cameras.add(0.0, 0.0, 100.0, 100.0, false, "mini");
    cameras.resize(1024.0, 768.0);

    let main = cameras.main().expect("main camera");
    assert_eq!((main.width(), main.height()), (1024.0, 768.0));
    let mini = cameras.get_camera("mini").expect("mini camera");
    assert_eq!((mini.width(), mini.height()), (100.0, 100.0));
}

#[test]
fn manager_update_ticks_every_camera() {
    let mut cameras = CameraManager::new(800.0, 600.0);
    cameras.add(0.0, 0.0, 100.0, 100.0, false, "mini");
    for cam in cameras.cameras_mut() {
        cam.zoom_to(3.0, 10.0, Ease::Linear, false, None);
    }
    cameras.update(0.0, 20.0);
    assert!(cameras.cameras().iter().all(|c| c.zoom() == 3.0));
}
