//! Polygon geometry for creature shapes
//!
//! Everything here is a pure function of its inputs. Shapes are convex
//! (squares and isosceles triangles), which is what makes the separating-axis
//! test below exact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GEOM_EPSILON;

/// Creature kind, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Square,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Square, ShapeKind::Triangle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
        }
    }
}

/// Local-space geometry of a shape, centred on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Square {
        half_extent: f32,
    },
    /// Isosceles triangle, apex pointing up (negative y)
    Triangle {
        /// Distance from centre to the apex
        apex: f32,
        base_half_width: f32,
        /// Distance from centre down to the base
        base_offset: f32,
    },
}

impl Shape {
    /// Build the outline for a kind at a given visual size
    pub fn from_kind(kind: ShapeKind, size: f32) -> Self {
        match kind {
            ShapeKind::Square => Shape::Square {
                half_extent: size * 0.5,
            },
            ShapeKind::Triangle => Shape::Triangle {
                apex: size * 0.6,
                base_half_width: size * 0.5,
                base_offset: size * 0.4,
            },
        }
    }

    /// Collision outline: the visual outline shrunk by `margin`
    pub fn inset(kind: ShapeKind, size: f32, margin: f32) -> Self {
        Self::from_kind(kind, (size - margin).max(0.0))
    }

    /// Radius of the smallest origin-centred circle containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Square { half_extent } => half_extent * std::f32::consts::SQRT_2,
            Shape::Triangle {
                apex,
                base_half_width,
                base_offset,
            } => apex.max(Vec2::new(base_half_width, base_offset).length()),
        }
    }
}

/// Most vertices any supported shape has
pub const MAX_VERTICES: usize = 4;

/// A world-space convex polygon with inline storage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    verts: [Vec2; MAX_VERTICES],
    len: usize,
}

impl Polygon {
    pub fn vertices(&self) -> &[Vec2] {
        &self.verts[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn from_local(local: &[Vec2], center: Vec2, angle: f32) -> Self {
        let rot = Vec2::from_angle(angle);
        let mut verts = [Vec2::ZERO; MAX_VERTICES];
        for (dst, &v) in verts.iter_mut().zip(local) {
            *dst = center + rot.rotate(v);
        }
        Self {
            verts,
            len: local.len(),
        }
    }
}

/// World-space vertices of `shape` rotated by `angle` and moved to `center`
pub fn polygon_vertices(shape: &Shape, center: Vec2, angle: f32) -> Polygon {
    match *shape {
        Shape::Square { half_extent: h } => Polygon::from_local(
            &[
                Vec2::new(-h, -h),
                Vec2::new(h, -h),
                Vec2::new(h, h),
                Vec2::new(-h, h),
            ],
            center,
            angle,
        ),
        Shape::Triangle {
            apex,
            base_half_width,
            base_offset,
        } => {
            let top = Vec2::new(0.0, -apex);
            let base_left = Vec2::new(-base_half_width, base_offset);
            let base_right = Vec2::new(base_half_width, base_offset);
            Polygon::from_local(&[top, base_right, base_left], center, angle)
        }
    }
}

/// Ray-casting point-in-polygon test
pub fn point_in_polygon(p: Vec2, verts: &[Vec2]) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (verts[i], verts[j]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on segment `a`-`b`
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared().max(GEOM_EPSILON);
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point on (or in) the polygon; `p` itself when it lies inside
pub fn closest_point_on_polygon(p: Vec2, verts: &[Vec2]) -> Vec2 {
    if point_in_polygon(p, verts) {
        return p;
    }

    let n = verts.len();
    let mut best = p;
    let mut best_dist_sq = f32::INFINITY;
    for i in 0..n {
        let candidate = closest_point_on_segment(p, verts[i], verts[(i + 1) % n]);
        let dist_sq = candidate.distance_squared(p);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = candidate;
        }
    }
    best
}

pub fn circle_intersects_polygon(center: Vec2, radius: f32, verts: &[Vec2]) -> bool {
    closest_point_on_polygon(center, verts).distance_squared(center) <= radius * radius
}

/// Minimum translation vector between two overlapping convex polygons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mtv {
    /// Unit axis, oriented from polygon A toward polygon B
    pub normal: Vec2,
    /// Overlap along `normal`
    pub overlap: f32,
}

fn project(verts: &[Vec2], axis: Vec2) -> (f32, f32) {
    verts.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        let d = v.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Separating-axis test over the edge normals of both polygons
///
/// Returns `None` if any axis separates the projections, otherwise the axis of
/// least overlap.
pub fn sat_mtv(a: &[Vec2], b: &[Vec2], center_a: Vec2, center_b: Vec2) -> Option<Mtv> {
    let mut best: Option<Mtv> = None;

    for verts in [a, b] {
        let n = verts.len();
        for i in 0..n {
            let edge = verts[(i + 1) % n] - verts[i];
            let len = edge.length();
            if len < GEOM_EPSILON {
                continue;
            }
            let axis = edge.perp() / len;

            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            if max_a < min_b || max_b < min_a {
                return None;
            }

            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if best.is_none_or(|m| overlap < m.overlap) {
                best = Some(Mtv {
                    normal: axis,
                    overlap,
                });
            }
        }
    }

    best.map(|mut mtv| {
        if mtv.normal.dot(center_b - center_a) < 0.0 {
            mtv.normal = -mtv.normal;
        }
        mtv
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn square(center: Vec2, size: f32) -> Polygon {
        polygon_vertices(&Shape::from_kind(ShapeKind::Square, size), center, 0.0)
    }

    #[test]
    fn test_square_vertices_axis_aligned() {
        let poly = square(Vec2::new(10.0, 20.0), 4.0);
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.vertices()[0], Vec2::new(8.0, 18.0));
        assert_eq!(poly.vertices()[2], Vec2::new(12.0, 22.0));
    }

    #[test]
    fn test_triangle_apex_points_up() {
        let shape = Shape::from_kind(ShapeKind::Triangle, 10.0);
        let poly = polygon_vertices(&shape, Vec2::ZERO, 0.0);
        assert_eq!(poly.len(), 3);
        assert!((poly.vertices()[0] - Vec2::new(0.0, -6.0)).length() < 1e-5);
        assert!(poly.vertices()[1].y > 0.0 && poly.vertices()[2].y > 0.0);
    }

    #[test]
    fn test_rotation_moves_apex() {
        let shape = Shape::from_kind(ShapeKind::Triangle, 10.0);
        let poly = polygon_vertices(&shape, Vec2::ZERO, FRAC_PI_2);
        // Apex (0, -6) rotated a quarter turn lands on (6, 0)
        let apex = poly.vertices()[0];
        assert!((apex - Vec2::new(6.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_inset_is_smaller() {
        let full = Shape::from_kind(ShapeKind::Square, 40.0);
        let inset = Shape::inset(ShapeKind::Square, 40.0, 2.0);
        assert!(inset.bounding_radius() < full.bounding_radius());
        assert_eq!(inset, Shape::Square { half_extent: 19.0 });
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square(Vec2::ZERO, 2.0);
        assert!(point_in_polygon(Vec2::new(0.5, 0.5), poly.vertices()));
        assert!(!point_in_polygon(Vec2::new(1.5, 0.0), poly.vertices()));
        assert!(!point_in_polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::X]));
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(5.0, 3.0), a, b), Vec2::new(5.0, 0.0));
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec2::new(15.0, -3.0), a, b), b);
    }

    #[test]
    fn test_closest_point_degenerate_segment() {
        let a = Vec2::new(1.0, 1.0);
        let p = closest_point_on_segment(Vec2::new(4.0, 5.0), a, a);
        assert!(p.is_finite());
        assert_eq!(p, a);
    }

    #[test]
    fn test_closest_point_on_polygon() {
        let poly = square(Vec2::ZERO, 2.0);
        let inside = Vec2::new(0.2, -0.3);
        assert_eq!(closest_point_on_polygon(inside, poly.vertices()), inside);
        let outside = Vec2::new(5.0, 0.0);
        assert_eq!(closest_point_on_polygon(outside, poly.vertices()), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_circle_intersects_polygon() {
        let poly = square(Vec2::ZERO, 2.0);
        assert!(circle_intersects_polygon(Vec2::new(2.0, 0.0), 1.0, poly.vertices()));
        assert!(!circle_intersects_polygon(Vec2::new(2.5, 0.0), 1.0, poly.vertices()));
        // Corner case: nearest feature is a vertex
        assert!(!circle_intersects_polygon(Vec2::new(1.8, 1.8), 1.0, poly.vertices()));
    }

    #[test]
    fn test_sat_separated() {
        let a = square(Vec2::ZERO, 2.0);
        let b = square(Vec2::new(3.0, 0.0), 2.0);
        assert!(sat_mtv(a.vertices(), b.vertices(), Vec2::ZERO, Vec2::new(3.0, 0.0)).is_none());
    }

    #[test]
    fn test_sat_overlap_points_from_a_to_b() {
        let ca = Vec2::ZERO;
        let cb = Vec2::new(1.5, 0.2);
        let a = square(ca, 2.0);
        let b = square(cb, 2.0);
        let mtv = sat_mtv(a.vertices(), b.vertices(), ca, cb).expect("overlapping");
        assert!((mtv.overlap - 0.5).abs() < 1e-5);
        assert!((mtv.normal - Vec2::X).length() < 1e-5);

        let flipped = sat_mtv(b.vertices(), a.vertices(), cb, ca).expect("overlapping");
        assert!((flipped.normal + Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_sat_triangle_vs_square() {
        let tri = polygon_vertices(&Shape::from_kind(ShapeKind::Triangle, 10.0), Vec2::ZERO, 0.0);
        let sq = square(Vec2::new(0.0, 8.0), 10.0);
        let mtv = sat_mtv(tri.vertices(), sq.vertices(), Vec2::ZERO, Vec2::new(0.0, 8.0))
            .expect("base overlaps square top");
        // Triangle base sits at y=4, square top at y=3
        assert!((mtv.overlap - 1.0).abs() < 1e-4);
        assert!(mtv.normal.y > 0.99);
    }
}
