// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-image features
//!
//! Given an image, calculate the two numbers that place it in the
//! diversity plane: Spatial Information, a measure of how much edge
//! energy the image carries, and Colorfulness, the Hasler-Süsstrunk
//! measure of chromatic spread.  Both are pure functions of the pixel
//! content.
//!
//! Channels are always treated as red, green, blue.  The `image` crate
//! already decodes in that order, so unlike BGR-first libraries there is
//! nothing to remap before the luma weights are applied.

use crate::cq;
use crate::error::{DiversityError, Result};
use crate::plane::{rgb_planes, Plane};
use crate::stats::{mean, std_dev};
use image::{GenericImageView, Pixel, Primitive};
use itertools::iproduct;
use log::debug;
use serde::Serialize;
use std::path::Path;

/// The height, in rows, at which the resolution correction of SI is 1.
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// ITU-R BT.601 luma weights, red first.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// One image's position in the diversity plane.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ImageSample {
    pub si: f64,
    pub cf: f64,
}

// Sobel with reflect-101 borders: the pixel one step outside the edge
// is the mirror of the pixel one step inside it, without repeating
// the edge pixel itself.  A plane that is one pixel wide reflects onto
// itself.
fn gradient_energy(plane: &Plane) -> f64 {
    let (width, height) = (plane.width, plane.height);
    let (mw, mh) = (width - 1, height - 1);

    iproduct!(0..height, 0..width)
        .map(|(y, x)| {
            let (l, r, u, d) = (
                cq!(x == 0, cq!(mw > 0, 1, 0), x - 1),
                cq!(x >= mw, cq!(mw > 0, mw - 1, 0), x + 1),
                cq!(y == 0, cq!(mh > 0, 1, 0), y - 1),
                cq!(y >= mh, cq!(mh > 0, mh - 1, 0), y + 1),
            );
            let gx = (plane[(r, u)] + 2.0 * plane[(r, y)] + plane[(r, d)])
                - (plane[(l, u)] + 2.0 * plane[(l, y)] + plane[(l, d)]);
            let gy = (plane[(l, d)] + 2.0 * plane[(x, d)] + plane[(r, d)])
                - (plane[(l, u)] + 2.0 * plane[(x, u)] + plane[(r, u)]);
            gx * gx + gy * gy
        })
        .sum()
}

fn channel_spatial_information(plane: &Plane) -> f64 {
    let mean_energy = gradient_energy(plane) / plane.len() as f64;
    (f64::from(plane.height) / REFERENCE_HEIGHT).sqrt() * mean_energy.sqrt()
}

fn spatial_information_of(planes: &[Plane; 3]) -> f64 {
    planes
        .iter()
        .zip(LUMA_WEIGHTS.iter())
        .map(|(plane, weight)| weight * channel_spatial_information(plane))
        .sum()
}

fn colorfulness_of(planes: &[Plane; 3]) -> f64 {
    let [r, g, b] = planes;
    let (rg, yb): (Vec<f64>, Vec<f64>) = r
        .values()
        .iter()
        .zip(g.values())
        .zip(b.values())
        .map(|((r, g), b)| (r - g, 0.5 * (r + g) - b))
        .unzip();

    let (sigma_rg, sigma_yb) = (std_dev(&rg), std_dev(&yb));
    let (mu_rg, mu_yb) = (mean(&rg), mean(&yb));
    (sigma_rg.powi(2) + sigma_yb.powi(2)).sqrt() + 0.3 * (mu_rg.powi(2) + mu_yb.powi(2)).sqrt()
}

// The planes of an image, or None if it has no pixels.
fn planes_of<I, P, S>(image: &I) -> Option<[Plane; 3]>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    cq!(width == 0 || height == 0, None, Some(rgb_planes(image)))
}

/// Spatial Information of an image.  `None` for an image with no
/// pixels.
pub fn spatial_information<I, P, S>(image: &I) -> Option<f64>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    planes_of(image).map(|planes| spatial_information_of(&planes))
}

/// Colorfulness of an image.  `None` for an image with no pixels.
pub fn colorfulness<I, P, S>(image: &I) -> Option<f64>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    planes_of(image).map(|planes| colorfulness_of(&planes))
}

/// Compute both features of an image, splitting it into planes only
/// once.  Returns `None` for an image with no pixels.
pub fn measure<I, P, S>(image: &I) -> Option<ImageSample>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    planes_of(image).map(|planes| ImageSample {
        si: spatial_information_of(&planes),
        cf: colorfulness_of(&planes),
    })
}

/// Decode an image file as 8-bit RGB and measure it.
pub fn extract_path(path: &Path) -> Result<ImageSample> {
    debug!("Loading {}", path.display());
    let image = image::open(path)
        .map_err(|e| DiversityError::InvalidImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .to_rgb8();
    let sample = measure(&image).ok_or_else(|| DiversityError::InvalidImage {
        path: path.to_path_buf(),
        reason: "image has no pixels".to_string(),
    })?;
    debug!("{}: SI {:.4}, CF {:.4}", path.display(), sample.si, sample.cf);
    Ok(sample)
}
