/// Chromaticity geometry: 2D points and the triangular gamut a lamp can reach.
///
/// Containment uses the barycentric basis method; the basis constants are
/// computed once when the gamut is built so per-color tests are a handful of
/// multiplies.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A CIE 1931 chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference, usable in const context.
    pub const fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub const fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(self, other: Self) -> f64 {
        let d = self - other;
        d.dot(d).sqrt()
    }
}

impl Sub for Point2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        self.minus(other)
    }
}

impl Add for Point2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// The reachable triangle of a lamp class, with its containment basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gamut {
    pub red: Point2,
    pub green: Point2,
    pub blue: Point2,
    v0: Point2,
    v1: Point2,
    dot00: f64,
    dot01: f64,
    dot11: f64,
    inv_denom: f64,
}

/// Living Colors, LightStrips (first generation).
pub const GAMUT_A: Gamut = Gamut::from_corners(
    Point2::new(0.704, 0.296),
    Point2::new(0.2151, 0.7106),
    Point2::new(0.138, 0.08),
);

/// Hue bulbs (first generation).
pub const GAMUT_B: Gamut = Gamut::from_corners(
    Point2::new(0.675, 0.322),
    Point2::new(0.409, 0.518),
    Point2::new(0.167, 0.04),
);

/// Hue bulbs and strips from the third generation on.
pub const GAMUT_C: Gamut = Gamut::from_corners(
    Point2::new(0.692, 0.308),
    Point2::new(0.17, 0.7),
    Point2::new(0.153, 0.048),
);

const fn basis(red: Point2, green: Point2, blue: Point2) -> (Point2, Point2, f64, f64, f64, f64) {
    let v0 = green.minus(red);
    let v1 = blue.minus(red);
    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot11 = v1.dot(v1);
    let det = dot00 * dot11 - dot01 * dot01;
    (v0, v1, dot00, dot01, dot11, det)
}

/// Collinear corners leave `det` as rounding noise rather than exactly zero,
/// so compare against the scale of the edges.
const fn is_degenerate(dot00: f64, dot11: f64, det: f64) -> bool {
    let magnitude = if det < 0.0 { -det } else { det };
    !det.is_finite() || magnitude <= COLLINEAR_TOLERANCE * dot00 * dot11
}

const COLLINEAR_TOLERANCE: f64 = 1e-12;

impl Gamut {
    /// Build a gamut from trusted constants. Panics (at compile time when
    /// used in a `const`) if the corners are collinear.
    pub const fn from_corners(red: Point2, green: Point2, blue: Point2) -> Self {
        let (v0, v1, dot00, dot01, dot11, det) = basis(red, green, blue);
        assert!(!is_degenerate(dot00, dot11, det), "gamut corners must not be collinear");
        let inv_denom = 1.0 / det;
        Self { red, green, blue, v0, v1, dot00, dot01, dot11, inv_denom }
    }

    /// Build a gamut from runtime input, rejecting collinear corners.
    pub fn new(red: Point2, green: Point2, blue: Point2) -> Result<Self> {
        let (v0, v1, dot00, dot01, dot11, det) = basis(red, green, blue);
        if is_degenerate(dot00, dot11, det) {
            return Err(Error::DegenerateGamut { red, green, blue });
        }
        let inv_denom = 1.0 / det;
        Ok(Self { red, green, blue, v0, v1, dot00, dot01, dot11, inv_denom })
    }

    /// True if `p` lies inside the triangle. The edge where `u + v == 1`
    /// (green to blue) counts as outside, the other two edges as inside.
    pub fn contains(&self, p: Point2) -> bool {
        let v2 = p - self.red;
        let dot02 = self.v0.dot(v2);
        let dot12 = self.v1.dot(v2);

        let u = (self.dot11 * dot02 - self.dot01 * dot12) * self.inv_denom;
        let v = (self.dot00 * dot12 - self.dot01 * dot02) * self.inv_denom;

        u >= 0.0 && v >= 0.0 && u + v < 1.0
    }

    /// Closest point on the triangle's perimeter. Edges are tried in the
    /// order red-green, blue-red, green-blue; the first minimum wins.
    pub fn nearest_boundary_point(&self, p: Point2) -> Point2 {
        let edges = [
            (self.red, self.green),
            (self.blue, self.red),
            (self.green, self.blue),
        ];

        let mut best = closest_on_segment(edges[0].0, edges[0].1, p);
        let mut best_dist = p.distance(best);
        for &(a, b) in &edges[1..] {
            let candidate = closest_on_segment(a, b, p);
            let d = p.distance(candidate);
            if d < best_dist {
                best = candidate;
                best_dist = d;
            }
        }
        best
    }
}

/// Project `p` onto the segment `a`-`b`.
pub fn closest_on_segment(a: Point2, b: Point2, p: Point2) -> Point2 {
    let ab = b - a;
    let t = (p - a).dot(ab) / ab.dot(ab);
    a + ab * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroid(g: &Gamut) -> Point2 {
        (g.red + g.green + g.blue) * (1.0 / 3.0)
    }

    #[test]
    fn interior_points_are_contained() {
        for g in [GAMUT_A, GAMUT_B, GAMUT_C] {
            assert!(g.contains(centroid(&g)));
            // Halfway between centroid and each corner
            for corner in [g.red, g.green, g.blue] {
                let mid = (centroid(&g) + corner) * 0.5;
                assert!(g.contains(mid), "{mid} should be inside");
            }
        }
    }

    #[test]
    fn points_past_vertices_and_far_points_are_not_contained() {
        for g in [GAMUT_A, GAMUT_B, GAMUT_C] {
            let c = centroid(&g);
            for corner in [g.red, g.green, g.blue] {
                let past = corner + (corner - c) * 1e-6;
                assert!(!g.contains(past), "{past} should be outside");
            }
            assert!(!g.contains(Point2::new(0.0, 0.0)));
            assert!(!g.contains(Point2::new(1.0, 1.0)));
            assert!(!g.contains(Point2::new(0.9, 0.1)));
        }
    }

    #[test]
    fn red_corner_is_inclusive() {
        // u = v = 0 exactly at the red corner.
        assert!(GAMUT_B.contains(GAMUT_B.red));
    }

    #[test]
    fn green_blue_edge_is_exclusive() {
        let g = GAMUT_B;
        let mid = (g.green + g.blue) * 0.5;
        // Nudge slightly inward to stay clear of rounding on the edge itself.
        let inward = mid + (g.red - mid) * 1e-6;
        assert!(g.contains(inward));
        assert!(!g.contains(mid + (mid - g.red) * 1e-6));
    }

    #[test]
    fn segment_projection_clamps_to_ends() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(closest_on_segment(a, b, Point2::new(0.5, 1.0)), Point2::new(0.5, 0.0));
        assert_eq!(closest_on_segment(a, b, Point2::new(-2.0, 0.3)), a);
        assert_eq!(closest_on_segment(a, b, Point2::new(3.0, -0.3)), b);
    }

    #[test]
    fn nearest_boundary_point_picks_closest_edge() {
        let g = GAMUT_B;
        // Far beyond the red corner: the clamp lands on red itself.
        let p = g.nearest_boundary_point(Point2::new(0.9, 0.3));
        assert!(p.distance(g.red) < 1e-3);

        // Outside the red-green edge, on its perpendicular through the midpoint.
        let mid = (g.red + g.green) * 0.5;
        let edge = g.green - g.red;
        let normal = Point2::new(edge.y, -edge.x);
        let outside = mid + normal * 0.1;
        assert!(!g.contains(outside));
        let q = g.nearest_boundary_point(outside);
        assert!(q.distance(mid) < 1e-9);
    }

    #[test]
    fn nearest_boundary_point_result_is_on_perimeter() {
        let g = GAMUT_A;
        let q = g.nearest_boundary_point(Point2::new(0.05, 0.9));
        let on_edge = |a: Point2, b: Point2| {
            (q.distance(a) + q.distance(b) - a.distance(b)).abs() < 1e-9
        };
        assert!(on_edge(g.red, g.green) || on_edge(g.blue, g.red) || on_edge(g.green, g.blue));
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let err = Gamut::new(
            Point2::new(0.1, 0.1),
            Point2::new(0.2, 0.2),
            Point2::new(0.3, 0.3),
        );
        assert!(matches!(err, Err(Error::DegenerateGamut { .. })));
        assert!(Gamut::new(GAMUT_B.red, GAMUT_B.green, GAMUT_B.blue).is_ok());
    }

    #[test]
    fn unevenly_spaced_collinear_corners_are_rejected() {
        // The determinant here is rounding noise, not exactly zero.
        let on_diagonal = Gamut::new(
            Point2::new(0.1, 0.1),
            Point2::new(0.2, 0.2),
            Point2::new(0.4, 0.4),
        );
        assert!(matches!(on_diagonal, Err(Error::DegenerateGamut { .. })));

        let sloped = Gamut::new(
            Point2::new(0.13, 0.07),
            Point2::new(0.61, 0.31),
            Point2::new(0.37, 0.19),
        );
        assert!(matches!(sloped, Err(Error::DegenerateGamut { .. })));

        let repeated_corner = Gamut::new(GAMUT_B.red, GAMUT_B.red, GAMUT_B.blue);
        assert!(matches!(repeated_corner, Err(Error::DegenerateGamut { .. })));
    }

    #[test]
    fn boundary_ties_go_to_the_earlier_edge() {
        // Right isosceles triangle with dyadic corners so distances are exact.
        let g = Gamut::new(
            Point2::new(0.25, 0.25),
            Point2::new(0.75, 0.25),
            Point2::new(0.25, 0.75),
        )
        .unwrap();
        // 0.125 from both red-green (y = 0.25) and blue-red (x = 0.25), with
        // different projections on each.
        let p = Point2::new(0.375, 0.375);
        assert_eq!(closest_on_segment(g.red, g.green, p), Point2::new(0.375, 0.25));
        assert_eq!(closest_on_segment(g.blue, g.red, p), Point2::new(0.25, 0.375));
        assert_eq!(g.nearest_boundary_point(p), Point2::new(0.375, 0.25));

        // Mirror image: the tie is now between blue-red and green-blue, and
        // blue-red comes first.
        let g = Gamut::new(
            Point2::new(0.25, 0.25),
            Point2::new(0.75, 0.75),
            Point2::new(0.25, 0.75),
        )
        .unwrap();
        // Distance 0.125 from x = 0.25 (blue-red) and from y = 0.75 (green-blue).
        let p = Point2::new(0.375, 0.625);
        assert_eq!(closest_on_segment(g.green, g.blue, p), Point2::new(0.375, 0.75));
        assert_eq!(g.nearest_boundary_point(p), Point2::new(0.25, 0.625));
    }

    #[test]
    fn point_serializes_as_pair() {
        let p = Point2::new(0.25, 0.5);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[0.25,0.5]");
        let back: Point2 = serde_json::from_str("[0.25,0.5]").unwrap();
        assert_eq!(back, p);
    }
}
