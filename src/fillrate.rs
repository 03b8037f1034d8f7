// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fill rate - how much of the hull the samples actually occupy
//!
//! Every sample gets a disk of fixed radius around it.  The fill rate
//! is the fraction of the hull's area covered by the union of those
//! disks.  Working that out exactly means intersecting a polygon with
//! a union of circles; instead, we draw it.
//!
//! The raster estimator paints the hull solid black on a white canvas,
//! then paints it again with white disks stamped on top at every
//! sample.  Wherever the two renders disagree, a disk covered part of
//! the hull.  Counting those pixels against the black ones in the plain
//! render gives the ratio, with a small bias that shrinks as the canvas
//! grows.

use crate::hull::{ConvexHull, Point};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

/// Points per inch.  Marker radii are given in points, so they keep
/// the same size relative to the canvas at every precision.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Anything that differs from the plain render by at least half the
/// intensity range counts as covered.
pub const MID_INTENSITY: u8 = 128;

const BACKGROUND: Luma<u8> = Luma([255]);
const FILL: Luma<u8> = Luma([0]);
const MARKER: Luma<u8> = Luma([255]);

/// Something that can tell how much of a hull is covered by disks
/// around a set of points.
pub trait AreaEstimator {
    /// The covered fraction of the hull, between 0 and 1.  `points` are
    /// in the unit square, as is the hull.
    fn fill_rate(&self, hull: &ConvexHull, points: &[Point]) -> f64;
}

/// The rasterizing estimator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterAreaEstimator {
    /// Dots per inch of the off-screen canvas.
    pub precision: f64,
    /// Side of the square canvas, in inches.
    pub figure_inches: f64,
    /// Radius of the disk around each sample, in points.
    pub marker_radius: f64,
}

impl Default for RasterAreaEstimator {
    fn default() -> Self {
        RasterAreaEstimator {
            precision: 600.0,
            figure_inches: 6.0,
            marker_radius: 60.0,
        }
    }
}

impl RasterAreaEstimator {
    /// Side of the canvas in pixels.
    pub fn canvas_size(&self) -> u32 {
        (self.figure_inches * self.precision).round().max(2.0) as u32
    }

    /// Marker radius in device pixels.
    pub fn radius_pixels(&self) -> i32 {
        (self.marker_radius * self.precision / POINTS_PER_INCH)
            .round()
            .max(0.0) as i32
    }

    // Unit square onto the canvas, y pointing up.
    fn to_pixel(&self, p: Point) -> PixelPoint<i32> {
        let span = f64::from(self.canvas_size() - 1);
        PixelPoint::new(
            (p.x * span).round() as i32,
            ((1.0 - p.y) * span).round() as i32,
        )
    }

    /// Paint the hull, and if `radius` is non-zero, a disk of that many
    /// pixels at every point on top of it.
    pub fn render(&self, hull: &ConvexHull, points: &[Point], radius: i32) -> GrayImage {
        let size = self.canvas_size();
        let mut canvas = GrayImage::from_pixel(size, size, BACKGROUND);

        // Two corners can land on the same pixel.  The polygon drawer
        // refuses a closing point equal to the opening one, so a hull
        // that shrinks to a single pixel paints nothing.
        let mut polygon: Vec<PixelPoint<i32>> = Vec::with_capacity(hull.vertices().len());
        for vertex in hull.vertices() {
            let p = self.to_pixel(*vertex);
            if polygon.last() != Some(&p) {
                polygon.push(p);
            }
        }
        while polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }
        if polygon.len() > 1 {
            draw_polygon_mut(&mut canvas, &polygon, FILL);
        }

        if radius > 0 {
            for point in points {
                let p = self.to_pixel(*point);
                draw_filled_circle_mut(&mut canvas, (p.x, p.y), radius, MARKER);
            }
        }
        canvas
    }
}

/// Count the pixels where two renders of the same size differ by at
/// least `MID_INTENSITY`.
pub fn differing_pixels(a: &GrayImage, b: &GrayImage) -> usize {
    a.pixels()
        .zip(b.pixels())
        .filter(|(pa, pb)| (i16::from(pa[0]) - i16::from(pb[0])).abs() >= i16::from(MID_INTENSITY))
        .count()
}

/// Count the pixels painted with the hull fill.
pub fn fill_pixels(render: &GrayImage) -> usize {
    render
        .pixels()
        .filter(|p| 255 - p[0] >= MID_INTENSITY)
        .count()
}

impl AreaEstimator for RasterAreaEstimator {
    fn fill_rate(&self, hull: &ConvexHull, points: &[Point]) -> f64 {
        let solid = self.render(hull, points, 0);
        let marked = self.render(hull, points, self.radius_pixels());
        let full = fill_pixels(&solid);
        if full == 0 {
            return 0.0;
        }
        (differing_pixels(&marked, &solid) as f64 / full as f64).min(1.0)
    }
}
