// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Single-channel floating point planes
//!
//! The extractor splits an image into one plane per colour channel and
//! works on those, in `f64`, so that the gradient and opponent colour
//! arithmetic never has to think about the subpixel type again.

use image::{GenericImageView, Pixel, Primitive};
use itertools::iproduct;
use num_traits::NumCast;
use std::ops::{Index, IndexMut};

/// An addressable two-dimensional field of `f64` values, one per
/// pixel, stored row-major.
#[derive(Debug, Clone)]
pub struct Plane {
    pub width: u32,
    pub height: u32,
    values: Vec<f64>,
}

impl Plane {
    pub fn new(width: u32, height: u32) -> Self {
        Plane {
            width,
            height,
            values: vec![0.0; width as usize * height as usize],
        }
    }

    // Keep the index math in one place and never touch it again.  Same
    // layout as ImageBuffer.
    fn get_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// All the values, row by row.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl Index<(u32, u32)> for Plane {
    type Output = f64;

    fn index(&self, (x, y): (u32, u32)) -> &f64 {
        let index = self.get_index(x, y);
        &self.values[index]
    }
}

impl IndexMut<(u32, u32)> for Plane {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut f64 {
        let index = self.get_index(x, y);
        &mut self.values[index]
    }
}

/// Split an image into its red, green and blue planes.  Whatever the
/// pixel type, it goes through `to_rgb()` first, so grey images come
/// back as three identical planes and alpha is dropped.
pub fn rgb_planes<I, P, S>(image: &I) -> [Plane; 3]
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    let mut planes = [
        Plane::new(width, height),
        Plane::new(width, height),
        Plane::new(width, height),
    ];
    for (y, x) in iproduct!(0..height, 0..width) {
        let rgb = image.get_pixel(x, y).to_rgb();
        for (plane, channel) in planes.iter_mut().zip(rgb.0.iter()) {
            plane[(x, y)] = <f64 as NumCast>::from(*channel).unwrap_or(0.0);
        }
    }
    planes
}
