// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic databases for the integration tests.

#![allow(dead_code)]

use dbdiversity::AnalysisConfig;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

pub const SIDE: u32 = 16;

pub const GREY: Rgb<u8> = Rgb([128, 128, 128]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

pub fn solid(colour: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(SIDE, SIDE, colour)
}

/// Left half one colour, right half the other.
pub fn step(left: Rgb<u8>, right: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(SIDE, SIDE, |x, _| if x < SIDE / 2 { left } else { right })
}

/// Write a database directory of PNGs under `parent`.
pub fn database(parent: &Path, name: &str, images: &[RgbImage]) -> PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (i, image) in images.iter().enumerate() {
        image.save(dir.join(format!("img{:02}.png", i))).unwrap();
    }
    dir
}

/// Two databases whose points are not collinear.
pub fn two_databases(parent: &Path) {
    database(
        parent,
        "db1",
        &[solid(GREY), solid(RED), step(BLACK, WHITE)],
    );
    database(
        parent,
        "db2",
        &[solid(GREEN), step(BLACK, WHITE), step(BLACK, RED)],
    );
}

/// A database of two images; its hull can never have an area.
pub fn collinear_database(parent: &Path) {
    database(parent, "flat", &[solid(GREY), step(BLACK, WHITE)]);
}

/// The default configuration, with a canvas small enough to be quick.
pub fn quick_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.fill_rate.precision = 50.0;
    config
}
