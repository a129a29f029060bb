#![allow(clippy::float_cmp)]

use proptest::prelude::*;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn unit_square() -> Vec<Point> {
    vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]
}

// =============================================================
// distance
// =============================================================

#[test]
fn distance_three_four_five() {
    assert_eq!(distance(pt(0.0, 0.0), pt(3.0, 4.0)), 5.0);
}

#[test]
fn distance_to_self_is_zero() {
    assert_eq!(distance(pt(7.5, -2.0), pt(7.5, -2.0)), 0.0);
}

proptest! {
    #[test]
    fn distance_is_symmetric(ax in -1e4..1e4f64, ay in -1e4..1e4f64, bx in -1e4..1e4f64, by in -1e4..1e4f64) {
        let a = pt(ax, ay);
        let b = pt(bx, by);
        prop_assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn real_area_scales_quadratically(area in 0.0..1e6f64, scale in 0.01..1e3f64) {
        let lhs = to_real_area(area, 2.0 * scale);
        let rhs = to_real_area(area, scale) / 4.0;
        prop_assert!((lhs - rhs).abs() <= 1e-9 * rhs.abs().max(1.0));
    }
}

// =============================================================
// polygon_area
// =============================================================

#[test]
fn polygon_area_unit_square_is_one() {
    assert_eq!(polygon_area(&unit_square()), Ok(1.0));
}

#[test]
fn polygon_area_is_orientation_independent() {
    let mut square = unit_square();
    square.reverse();
    assert_eq!(polygon_area(&square), Ok(1.0));
}

#[test]
fn polygon_area_triangle() {
    let tri = [pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 10.0)];
    assert_eq!(polygon_area(&tri), Ok(50.0));
}

#[test]
fn polygon_area_rejects_two_points() {
    assert_eq!(polygon_area(&[pt(0.0, 0.0), pt(1.0, 1.0)]), Err(GeometryError::TooFewPoints(2)));
}

#[test]
fn polygon_area_rejects_empty() {
    assert_eq!(polygon_area(&[]), Err(GeometryError::TooFewPoints(0)));
}

#[test]
fn polygon_area_error_message_names_count() {
    let err = polygon_area(&[pt(0.0, 0.0)]).unwrap_err();
    assert_eq!(err.to_string(), "polygon needs at least 3 points, got 1");
}

// =============================================================
// polyline_length
// =============================================================

#[test]
fn polyline_length_sums_segments_without_closing() {
    let pts = [pt(0.0, 0.0), pt(3.0, 4.0), pt(3.0, 10.0)];
    assert_eq!(polyline_length(&pts), 11.0);
}

#[test]
fn polyline_length_single_point_is_zero() {
    assert_eq!(polyline_length(&[pt(1.0, 1.0)]), 0.0);
}

// =============================================================
// Unit conversion
// =============================================================

#[test]
fn to_real_length_divides_by_scale() {
    assert_eq!(to_real_length(100.0, 50.0), 2.0);
}

#[test]
fn to_real_area_divides_by_scale_squared() {
    assert_eq!(to_real_area(2500.0, 50.0), 1.0);
}

#[test]
fn to_real_length_floors_zero_scale() {
    let v = to_real_length(1.0, 0.0);
    assert!(v.is_finite());
    assert!(v > 0.0);
}

#[test]
fn to_real_area_floors_negative_scale() {
    assert!(to_real_area(1.0, -5.0).is_finite());
}

// =============================================================
// Rect
// =============================================================

#[test]
fn rect_from_corners_normalizes() {
    let r = Rect::from_corners(pt(110.0, 60.0), pt(10.0, 10.0));
    assert_eq!(r, Rect::new(10.0, 10.0, 100.0, 50.0));
}

#[test]
fn rect_intersects_overlapping_and_touching() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    assert!(a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    assert!(!a.intersects(&Rect::new(10.1, 0.0, 5.0, 5.0)));
    assert!(!a.intersects(&Rect::new(0.0, -6.0, 5.0, 5.0)));
}

#[test]
fn rect_contains_rect() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(outer.contains_rect(&Rect::new(10.0, 10.0, 5.0, 5.0)));
    assert!(!outer.contains_rect(&Rect::new(90.0, 90.0, 20.0, 5.0)));
}

#[test]
fn rect_bounding_of_points() {
    let r = Rect::bounding(&[pt(3.0, -1.0), pt(-2.0, 4.0), pt(0.0, 0.0)]);
    assert_eq!(r, Some(Rect::new(-2.0, -1.0, 5.0, 5.0)));
    assert_eq!(Rect::bounding(&[]), None);
}

#[test]
fn rect_union_covers_both() {
    let u = Rect::new(0.0, 0.0, 1.0, 1.0).union(&Rect::new(5.0, 5.0, 1.0, 1.0));
    assert_eq!(u, Rect::new(0.0, 0.0, 6.0, 6.0));
}

#[test]
fn rect_clamp_point_projects_onto_edge() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert_eq!(r.clamp_point(pt(0.0, 15.0)), pt(10.0, 15.0));
    assert_eq!(r.clamp_point(pt(50.0, 50.0)), pt(30.0, 30.0));
    assert_eq!(r.clamp_point(pt(20.0, 20.0)), pt(20.0, 20.0));
}

#[test]
fn rect_serializes_with_short_size_keys() {
    let json = serde_json::to_value(Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 1.0, "y": 2.0, "w": 3.0, "h": 4.0 }));
}

// =============================================================
// Rotation and segments
// =============================================================

#[test]
fn rotate_point_quarter_turn_is_clockwise_on_page() {
    let r = rotate_point(pt(10.0, 0.0), pt(0.0, 0.0), 90.0);
    assert!(approx_eq(r.x, 0.0));
    assert!(approx_eq(r.y, 10.0));
}

#[test]
fn rotate_point_zero_is_identity() {
    assert_eq!(rotate_point(pt(3.0, 4.0), pt(1.0, 1.0), 0.0), pt(3.0, 4.0));
}

#[test]
fn distance_to_segment_projects_onto_interior() {
    assert_eq!(distance_to_segment(pt(5.0, 3.0), pt(0.0, 0.0), pt(10.0, 0.0)), 3.0);
}

#[test]
fn distance_to_segment_clamps_to_endpoints() {
    assert_eq!(distance_to_segment(pt(13.0, 4.0), pt(0.0, 0.0), pt(10.0, 0.0)), 5.0);
}

#[test]
fn distance_to_degenerate_segment() {
    assert_eq!(distance_to_segment(pt(3.0, 4.0), pt(0.0, 0.0), pt(0.0, 0.0)), 5.0);
}

#[test]
fn point_in_polygon_square() {
    let sq = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
    assert!(point_in_polygon(pt(5.0, 5.0), &sq));
    assert!(!point_in_polygon(pt(15.0, 5.0), &sq));
}

#[test]
fn centroid_of_square() {
    let sq = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
    assert_eq!(centroid(&sq), Some(pt(5.0, 5.0)));
    assert_eq!(centroid(&[]), None);
}

#[test]
fn normalize_degrees_wraps_negative_and_large() {
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert_eq!(normalize_degrees(720.0), 0.0);
    assert_eq!(normalize_degrees(45.0), 45.0);
}
