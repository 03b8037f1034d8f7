// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Delaunay triangulation of a point cloud in the plane
//!
//! Bowyer-Watson.  Start from one triangle big enough to hold every
//! point, then add the points one at a time: every triangle whose
//! circumcircle holds the new point is removed, and the hole left
//! behind is fanned out from the new point.  Triangles still touching
//! the enclosing triangle's corners are dropped at the end.
//!
//! Quadratic in the number of points, which is plenty for a database
//! of a few thousand images.

use crate::hull::Point;
use std::cmp::Ordering;

// How far out the enclosing triangle's corners go, in spans of the
// cloud.  Too close and thin triangles along the hull go missing.
const ENCLOSING_SCALE: f64 = 1e4;

// Circumcircle tests at or below this count as "on the circle", which
// keeps four cocircular points from being split both ways.
const CIRCLE_EPSILON: f64 = 1e-12;

// > 0 when a -> b -> c turns left.
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

// > 0 when `p` is strictly inside the circumcircle of the
// counter-clockwise triangle `a, b, c`.
fn in_circumcircle(a: Point, b: Point, c: Point, p: Point) -> bool {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);
    let det = (ax * ax + ay * ay) * (bx * cy - cx * by)
        - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);
    det > CIRCLE_EPSILON
}

/// A triangulation, as triples of corners, each counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    triangles: Vec<[Point; 3]>,
}

impl Triangulation {
    /// Triangulate a point cloud.  Duplicates and non-finite points are
    /// ignored; a cloud with no area gives no triangles.
    pub fn new(points: &[Point]) -> Self {
        let mut vertices: Vec<Point> = points
            .iter()
            .cloned()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        vertices.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        });
        vertices.dedup();
        if vertices.len() < 3 {
            return Triangulation {
                triangles: Vec::new(),
            };
        }

        let n = vertices.len();
        let (min_x, max_x) = vertices
            .iter()
            .fold((std::f64::INFINITY, std::f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });
        let (min_y, max_y) = vertices
            .iter()
            .fold((std::f64::INFINITY, std::f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let far = ENCLOSING_SCALE * span;
        vertices.push(Point::new(mid_x - far, mid_y - span));
        vertices.push(Point::new(mid_x + far, mid_y - span));
        vertices.push(Point::new(mid_x, mid_y + far));

        let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];
        for i in 0..n {
            let p = vertices[i];
            let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
                .into_iter()
                .partition(|t| in_circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]], p));

            // The edges of the hole are the edges of exactly one bad
            // triangle.
            let edges: Vec<(usize, usize)> = bad
                .iter()
                .flat_map(|t| vec![(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
                .collect();
            let boundary: Vec<(usize, usize)> = edges
                .iter()
                .cloned()
                .filter(|&(a, b)| !edges.iter().any(|&(c, d)| c == b && d == a))
                .collect();

            triangles = good;
            for (a, b) in boundary {
                // Keep every triangle counter-clockwise.
                if orientation(vertices[a], vertices[b], p) > 0.0 {
                    triangles.push([a, b, i]);
                }
            }
        }

        let triangles = triangles
            .into_iter()
            .filter(|t| t.iter().all(|&v| v < n))
            .map(|t| [vertices[t[0]], vertices[t[1]], vertices[t[2]]])
            .collect();
        Triangulation { triangles }
    }

    pub fn triangles(&self) -> &[[Point; 3]] {
        &self.triangles
    }

    /// Every edge once, as drawn.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges: Vec<(Point, Point)> = Vec::with_capacity(self.triangles.len() * 3);
        for t in &self.triangles {
            for &(a, b) in &[(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                if !edges.iter().any(|&(c, d)| (c == a && d == b) || (c == b && d == a)) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn area(t: &[Point; 3]) -> f64 {
        orientation(t[0], t[1], t[2]) / 2.0
    }

    #[test]
    fn a_triangle_is_its_own_triangulation() {
        let tri = Triangulation::new(&pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]));
        assert_eq!(tri.triangles().len(), 1);
        assert_eq!(tri.edges().len(), 3);
    }

    #[test]
    fn a_square_with_a_centre_makes_four_triangles() {
        let tri = Triangulation::new(&pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.5, 0.5),
        ]));
        assert_eq!(tri.triangles().len(), 4);
        assert_eq!(tri.edges().len(), 8);
        let total: f64 = tri.triangles().iter().map(area).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn triangles_tile_the_hull_and_no_circumcircle_holds_a_point() {
        let points: Vec<Point> = (0..40u32)
            .map(|i| {
                let x = f64::from((i * 37 + 11) % 101) / 100.0;
                let y = f64::from((i * 61 + 7) % 97) / 96.0;
                Point::new(x, y)
            })
            .collect();
        let tri = Triangulation::new(&points);
        let hull = crate::hull::ConvexHull::new(&points).unwrap();

        assert!(tri.triangles().iter().all(|t| area(t) > 0.0));
        let total: f64 = tri.triangles().iter().map(area).sum();
        assert!((total - hull.area()).abs() < 1e-9, "{} vs {}", total, hull.area());
        for t in tri.triangles() {
            for &p in &points {
                assert!(!in_circumcircle(t[0], t[1], t[2], p));
            }
        }
    }

    #[test]
    fn a_lattice_is_covered_completely() {
        let points: Vec<Point> = (0..11u32)
            .flat_map(|i| {
                (0..11u32).map(move |j| Point::new(f64::from(i) / 10.0, f64::from(j) / 10.0))
            })
            .collect();
        let tri = Triangulation::new(&points);
        // 2n - 2 - h triangles, with all 40 boundary points on the hull.
        assert_eq!(tri.triangles().len(), 2 * 121 - 2 - 40);
        let total: f64 = tri.triangles().iter().map(area).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_have_no_triangles() {
        let tri = Triangulation::new(&pts(&[(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]));
        assert!(tri.triangles().is_empty());
    }
}
