// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convex hull of a point cloud in the plane
//!
//! Andrew's monotone chain: sort the points, sweep once for the lower
//! chain and once for the upper, dropping every turn that isn't to the
//! left.  Collinear points on an edge are dropped too, so the hull is
//! made only of true corners, in counter-clockwise order.

use serde::Serialize;
use std::cmp::Ordering;

// Cross products at or below this are treated as "no turn".
const COLLINEAR_EPSILON: f64 = 1e-12;

/// A point in the (CF, SI) plane.  `x` is colorfulness, `y` spatial
/// information, whatever their scale.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

// > 0 when o -> a -> b turns left.
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn by_coordinates(a: &Point, b: &Point) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// The corners of a convex polygon, counter-clockwise, at least three
/// of them and never all on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvexHull {
    vertices: Vec<Point>,
}

impl ConvexHull {
    /// Build the hull of a point cloud.  Returns `None` when the cloud
    /// has fewer than three points that aren't on a single line, since
    /// such a cloud encloses no area at all.
    pub fn new(points: &[Point]) -> Option<Self> {
        let mut sorted: Vec<Point> = points
            .iter()
            .cloned()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        sorted.sort_by(by_coordinates);
        sorted.dedup();
        if sorted.len() < 3 {
            return None;
        }

        fn half_hull<'a, I: Iterator<Item = &'a Point>>(points: I) -> Vec<Point> {
            points.fold(Vec::new(), |mut chain: Vec<Point>, p| {
                while chain.len() >= 2
                    && cross(chain[chain.len() - 2], chain[chain.len() - 1], *p)
                        <= COLLINEAR_EPSILON
                {
                    chain.pop();
                }
                chain.push(*p);
                chain
            })
        }

        let mut lower = half_hull(sorted.iter());
        let mut upper = half_hull(sorted.iter().rev());
        // Each chain ends where the other begins.
        lower.pop();
        upper.pop();
        lower.append(&mut upper);

        if lower.len() < 3 {
            None
        } else {
            Some(ConvexHull { vertices: lower })
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// The corners paired with their successors, closing the polygon.
    pub fn edges<'a>(&'a self) -> impl Iterator<Item = (Point, Point)> + 'a {
        let next = self.vertices.iter().cycle().skip(1);
        self.vertices.iter().cloned().zip(next.cloned())
    }

    /// Enclosed area, by the shoelace formula.
    pub fn area(&self) -> f64 {
        0.5 * self
            .edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
            .abs()
    }
}
