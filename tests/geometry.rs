use std::f32::consts::{FRAC_PI_2, PI};

use prism2d::geometry::*;
use prism2d::matrix::TransformMatrix;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ── Scalars ───────────────────────────────────────────────────────────────

#[test]
fn test_clamp() {
    assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
    assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
    assert_eq!(clamp(5.0, 10.0, 0.0), 0.0);
}

#[test]
fn test_linear() {
    assert_eq!(linear(10.0, 20.0, 0.5), 15.0);
    assert_eq!(linear(10.0, 20.0, 1.5), 25.0);
}

#[test]
fn test_distance() {
    assert!(close(distance(0.0, 0.0, 3.0, 4.0), 5.0));
    assert_eq!(distance(2.0, 2.0, 2.0, 2.0), 0.0);
}

// ── Rect ──────────────────────────────────────────────────────────────────

#[test]
fn test_rect_edges_and_center() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!((r.left(), r.right(), r.top(), r.bottom()), (10.0, 40.0, 20.0, 60.0));
    assert_eq!((r.center_x(), r.center_y()), (25.0, 40.0));
}

#[test]
fn test_rect_intersects_is_strict() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(0.0, 20.0, 10.0, 10.0)));
}

#[test]
fn test_empty_rect_contains_nothing() {
    let r = Rect::new(0.0, 0.0, 0.0, 10.0);
    assert!(r.is_empty());
    assert!(!r.contains(0.0, 0.0));
}

// ── TransformMatrix ───────────────────────────────────────────────────────

#[test]
fn test_identity_leaves_points_alone() {
    let m = TransformMatrix::IDENTITY;
    assert_eq!((m.get_x(3.0, 4.0), m.get_y(3.0, 4.0)), (3.0, 4.0));
    assert_eq!(m.determinant(), 1.0);
}

#[test]
fn test_translate_then_rotate_orbits_point() {
    let mut m = TransformMatrix::IDENTITY;
    m.translate(100.0, 0.0).rotate(FRAC_PI_2);
    let p = m.transform_point(10.0, 0.0);
    assert!(close(p.x, 100.0) && close(p.y, 10.0), "{p:?}");
}

#[test]
fn test_multiply_composes_left_to_right() {
    let mut parent = TransformMatrix::IDENTITY;
    parent.translate(50.0, 50.0);
    let mut child = TransformMatrix::IDENTITY;
    child.scale(2.0, 2.0);

    let combined = parent.product(&child);
    assert_eq!(combined.transform_point(1.0, 1.0).to_array(), [52.0, 52.0]);

    let mut in_place = parent;
    in_place.multiply(&child);
    assert_eq!(in_place, combined);

    let mut out = TransformMatrix::IDENTITY;
    parent.multiply_into(&child, &mut out);
    assert_eq!(out, combined);
}

#[test]
fn test_apply_itrs_discards_previous_contents() {
    let mut m = TransformMatrix::new(9.0, 9.0, 9.0, 9.0, 9.0, 9.0);
    m.apply_itrs(10.0, 20.0, 0.0, 2.0, 3.0);
    assert_eq!(m.to_array(), [2.0, 0.0, 0.0, 3.0, 10.0, 20.0]);
}

#[test]
fn test_invert_and_apply_inverse() {
    let mut m = TransformMatrix::IDENTITY;
    m.translate(10.0, -5.0).rotate(0.3).scale(2.0, 0.5);
    let world = m.transform_point(7.0, 3.0);
    let back = m.apply_inverse(world.x, world.y);
    assert!(close(back.x, 7.0) && close(back.y, 3.0), "{back:?}");

    let mut inv = m;
    assert!(inv.invert());
    let p = inv.transform_point(world.x, world.y);
    assert!(close(p.x, 7.0) && close(p.y, 3.0));
}

#[test]
fn test_singular_matrix_keeps_point() {
    let mut m = TransformMatrix::IDENTITY;
    m.scale(0.0, 1.0);
    assert!(m.try_inverse().is_none());
    assert_eq!(m.apply_inverse(4.0, 5.0).to_array(), [4.0, 5.0]);
    assert!(!m.invert());
}

#[test]
fn test_decompose_recovers_rotation_and_scale() {
    let mut m = TransformMatrix::IDENTITY;
    m.apply_itrs(1.0, 2.0, PI / 4.0, 3.0, 3.0);
    let d = m.decompose();
    assert_eq!((d.translate_x, d.translate_y), (1.0, 2.0));
    assert!(close(d.scale_x, 3.0) && close(d.scale_y, 3.0));
    assert!(close(d.rotation, PI / 4.0));
}

#[test]
fn test_uniform_layout_is_column_major() {
    let m = TransformMatrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    assert_eq!(m.to_uniform(), [1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 5.0, 6.0, 1.0]);
}

#[test]
fn test_load_identity_and_copy_from() {
    let src = TransformMatrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    let mut m = TransformMatrix::IDENTITY;
    m.copy_from(&src);
    assert_eq!(m, src);
    m.load_identity();
    assert_eq!(m, TransformMatrix::IDENTITY);
    m.set_transform(1.0, 0.0, 0.0, 1.0, 7.0, 8.0);
    assert_eq!(m.transform_point(0.0, 0.0).to_array(), [7.0, 8.0]);
}
