// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plots
//!
//! Each database gets three pictures of its raw (CF, SI) cloud: the
//! scatter alone, the scatter with its convex hull drawn around it, and
//! the Delaunay triangulation inside the hull.  All use the same fixed
//! axis limits so databases can be laid side by side and compared by
//! eye.

use crate::basis::CrossDatabaseBasis;
use crate::database::DatabaseFeatureSet;
use crate::delaunay::Triangulation;
use crate::error::{DiversityError, Result};
use crate::hull::Point;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const SAMPLE: Rgb<u8> = Rgb([76, 114, 176]);
const HULL: Rgb<u8> = Rgb([0, 0, 0]);
const TRIANGLE: Rgb<u8> = Rgb([196, 78, 82]);

pub const MIN_PLOT_SIZE: u32 = 2;

/// Something that produces artifacts for a database once its metrics
/// are known.
pub trait Renderer {
    fn render(&self, set: &DatabaseFeatureSet) -> Result<()>;
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Side of the square plot, in pixels.  At least `MIN_PLOT_SIZE`.
    pub size: u32,
    /// Colorfulness at the right edge.
    pub xlim: f64,
    /// Spatial information at the top edge.
    pub ylim: f64,
    /// Radius of a sample dot, in pixels.
    pub dot_radius: i32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            size: 600,
            xlim: 165.0,
            ylim: 170.0,
            dot_radius: 4,
        }
    }
}

/// Writes `<label>_si_cf_plane.png`, `<label>_convex_hull.png` and
/// `<label>_delaunay.png` into the output directory.  Without an
/// output directory it does nothing at all.
#[derive(Debug, Clone)]
pub struct PlotRenderer {
    output: Option<PathBuf>,
    config: PlotConfig,
}

impl PlotRenderer {
    pub fn new(output: Option<&Path>, config: PlotConfig) -> Self {
        PlotRenderer {
            output: output.map(Path::to_path_buf),
            config,
        }
    }

    fn to_pixel(&self, p: Point) -> (f32, f32) {
        let span = f64::from(self.config.size.saturating_sub(1));
        (
            (p.x / self.config.xlim * span) as f32,
            ((1.0 - p.y / self.config.ylim) * span) as f32,
        )
    }

    fn canvas(&self) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.config.size, self.config.size, WHITE);
        let edge = self.config.size.saturating_sub(1) as f32;
        draw_line_segment_mut(&mut canvas, (0.0, edge), (edge, edge), AXIS);
        draw_line_segment_mut(&mut canvas, (0.0, 0.0), (0.0, edge), AXIS);
        canvas
    }

    fn scatter(&self, canvas: &mut RgbImage, points: &[Point]) {
        for p in points {
            let (x, y) = self.to_pixel(*p);
            draw_filled_circle_mut(
                canvas,
                (x.round() as i32, y.round() as i32),
                self.config.dot_radius,
                SAMPLE,
            );
        }
    }

    /// The raw sample cloud.
    pub fn si_cf_plane(&self, set: &DatabaseFeatureSet) -> RgbImage {
        let mut canvas = self.canvas();
        self.scatter(&mut canvas, &set.raw_points());
        canvas
    }

    // Draw normalized edges at their raw positions.
    fn edges<I>(
        &self,
        canvas: &mut RgbImage,
        basis: CrossDatabaseBasis,
        edges: I,
        colour: Rgb<u8>,
    ) where
        I: IntoIterator<Item = (Point, Point)>,
    {
        let raw = |p: Point| self.to_pixel(Point::new(p.x * basis.max_cf(), p.y * basis.max_si()));
        for (a, b) in edges {
            draw_line_segment_mut(canvas, raw(a), raw(b), colour);
        }
    }

    /// The raw sample cloud and its hull.  The hull is found on the
    /// normalized points and scaled back by the basis.
    pub fn convex_hull(&self, set: &DatabaseFeatureSet) -> Result<RgbImage> {
        let hull = set.hull()?;
        let mut canvas = self.canvas();
        self.scatter(&mut canvas, &set.raw_points());
        self.edges(&mut canvas, set.basis(), hull.edges(), HULL);
        Ok(canvas)
    }

    /// The Delaunay triangulation of the cloud, inside its hull.
    pub fn delaunay(&self, set: &DatabaseFeatureSet) -> Result<RgbImage> {
        let hull = set.hull()?;
        let triangulation = Triangulation::new(set.normalized_points());
        let mut canvas = self.canvas();
        self.edges(&mut canvas, set.basis(), triangulation.edges(), TRIANGLE);
        self.edges(&mut canvas, set.basis(), hull.edges(), HULL);
        Ok(canvas)
    }
}

pub(crate) fn save(image: &RgbImage, path: &Path) -> Result<()> {
    debug!("Writing {}", path.display());
    image.save(path).map_err(|e| DiversityError::Output {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl Renderer for PlotRenderer {
    fn render(&self, set: &DatabaseFeatureSet) -> Result<()> {
        let output = match &self.output {
            Some(output) => output,
            None => return Ok(()),
        };
        fs::create_dir_all(output).map_err(|e| DiversityError::Output {
            path: output.clone(),
            reason: e.to_string(),
        })?;
        save(
            &self.si_cf_plane(set),
            &output.join(format!("{}_si_cf_plane.png", set.name())),
        )?;
        save(
            &self.convex_hull(set)?,
            &output.join(format!("{}_convex_hull.png", set.name())),
        )?;
        save(
            &self.delaunay(set)?,
            &output.join(format!("{}_delaunay.png", set.name())),
        )
    }
}
