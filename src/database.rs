// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-database features and metrics
//!
//! A database is measured in two halves.  `DatabaseFeatures` is the
//! raw half: one sample per image and the largest SI and CF seen.  It
//! needs nothing from any other database.  `DatabaseFeatureSet` is
//! the raw half plus the cross-database basis; only with that in hand
//! can the points be normalized and the diversity metrics computed.
//! Splitting them this way means a feature set simply cannot exist
//! before the basis does.

use crate::basis::CrossDatabaseBasis;
use crate::collection::{Database, ImageCollection};
use crate::error::{DatabaseFailure, DiversityError, Result, Stage};
use crate::features::{extract_path, ImageSample};
use crate::fillrate::AreaEstimator;
use crate::hull::{ConvexHull, Point};
use crate::policy::OnFailure;
use crate::stats::{entropy, relative_range};
use log::info;

/// Entropy base for uniformity.
pub const UNIFORMITY_BASE: f64 = 10.0;

/// The raw samples of one database.
#[derive(Debug, Clone)]
pub struct DatabaseFeatures {
    name: String,
    samples: Vec<ImageSample>,
    raw_max_si: f64,
    raw_max_cf: f64,
}

impl DatabaseFeatures {
    /// Build from samples already measured.  A database with no samples
    /// is an error; the directory is reported as empty.
    pub fn from_samples(database: &Database, samples: Vec<ImageSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(DiversityError::EmptyOrMissingDirectory {
                path: database.path.clone(),
                wanted: "readable images",
            });
        }
        let raw_max_si = samples.iter().map(|s| s.si).fold(0.0, f64::max);
        let raw_max_cf = samples.iter().map(|s| s.cf).fold(0.0, f64::max);
        Ok(DatabaseFeatures {
            name: database.name.clone(),
            samples,
            raw_max_si,
            raw_max_cf,
        })
    }

    /// Measure every image of a database.  An image that won't decode
    /// either fails the whole database or is left out, depending on
    /// `on_invalid_image`.  Images left out come back as failures, one
    /// per image, for the caller to record.
    pub fn extract(
        database: &Database,
        on_invalid_image: OnFailure,
    ) -> Result<(Self, Vec<DatabaseFailure>)> {
        let images = ImageCollection::new(&database.path)?;
        let mut samples = Vec::with_capacity(images.len());
        let mut skipped = Vec::new();
        for path in &images {
            match extract_path(path) {
                Ok(sample) => samples.push(sample),
                Err(e) => match on_invalid_image {
                    OnFailure::Abort => return Err(e),
                    OnFailure::Skip => {
                        skipped.push(DatabaseFailure::new(&database.name, Stage::Extraction, e))
                    }
                },
            }
        }
        let features = Self::from_samples(database, samples)?;
        info!(
            "{}: {} images, max SI {:.4}, max CF {:.4}",
            features.name,
            features.samples.len(),
            features.raw_max_si,
            features.raw_max_cf
        );
        Ok((features, skipped))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[ImageSample] {
        &self.samples
    }

    pub fn raw_max_si(&self) -> f64 {
        self.raw_max_si
    }

    pub fn raw_max_cf(&self) -> f64 {
        self.raw_max_cf
    }

    pub fn si(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.si).collect()
    }

    pub fn cf(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.cf).collect()
    }
}

// x / basis, with a zero basis mapping everything to zero.  A zero
// basis means every sample in the batch was zero on that axis.
fn scale(value: f64, basis: f64) -> f64 {
    if basis > 0.0 {
        value / basis
    } else {
        0.0
    }
}

/// One database, normalized against the whole batch.
#[derive(Debug, Clone)]
pub struct DatabaseFeatureSet {
    features: DatabaseFeatures,
    basis: CrossDatabaseBasis,
    normalized: Vec<Point>,
    hull: Option<ConvexHull>,
}

impl DatabaseFeatureSet {
    /// Attach the basis.  Fails with `InconsistentBasis` if the
    /// database's own maxima exceed it, which means the basis was
    /// computed without this database.
    pub fn new(features: DatabaseFeatures, basis: CrossDatabaseBasis) -> Result<Self> {
        if features.raw_max_si > basis.max_si() || features.raw_max_cf > basis.max_cf() {
            return Err(DiversityError::InconsistentBasis {
                database: features.name.clone(),
                raw_si: features.raw_max_si,
                raw_cf: features.raw_max_cf,
                basis_si: basis.max_si(),
                basis_cf: basis.max_cf(),
            });
        }
        let normalized: Vec<Point> = features
            .samples
            .iter()
            .map(|s| Point::new(scale(s.cf, basis.max_cf()), scale(s.si, basis.max_si())))
            .collect();
        let hull = ConvexHull::new(&normalized);
        Ok(DatabaseFeatureSet {
            features,
            basis,
            normalized,
            hull,
        })
    }

    pub fn name(&self) -> &str {
        self.features.name()
    }

    pub fn features(&self) -> &DatabaseFeatures {
        &self.features
    }

    pub fn basis(&self) -> CrossDatabaseBasis {
        self.basis
    }

    /// `(cf / max_cf, si / max_si)` for every sample, in sample order.
    pub fn normalized_points(&self) -> &[Point] {
        &self.normalized
    }

    /// The raw `(cf, si)` points, in sample order.
    pub fn raw_points(&self) -> Vec<Point> {
        self.features
            .samples
            .iter()
            .map(|s| Point::new(s.cf, s.si))
            .collect()
    }

    /// The hull of the normalized points.
    pub fn hull(&self) -> Result<&ConvexHull> {
        self.hull
            .as_ref()
            .ok_or_else(|| DiversityError::DegenerateHull {
                database: self.name().to_string(),
            })
    }

    /// Square root of the hull's area.  Always in `[0, 1]`.
    pub fn coverage_area(&self) -> Result<f64> {
        Ok(self.hull()?.area().sqrt())
    }

    pub fn fill_rate(&self, estimator: &dyn AreaEstimator) -> Result<f64> {
        Ok(estimator.fill_rate(self.hull()?, &self.normalized))
    }

    /// `(si, cf)` relative ranges.
    pub fn relative_ranges(&self) -> (f64, f64) {
        (
            relative_range(&self.features.si(), self.basis.max_si()),
            relative_range(&self.features.cf(), self.basis.max_cf()),
        )
    }

    /// `(si, cf)` uniformity, as base-10 entropy of the raw values.
    pub fn uniformity(&self) -> (f64, f64) {
        (
            entropy(&self.features.si(), UNIFORMITY_BASE),
            entropy(&self.features.cf(), UNIFORMITY_BASE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fillrate::RasterAreaEstimator;
    use std::path::PathBuf;

    fn db(name: &str) -> Database {
        Database {
            name: name.to_string(),
            path: PathBuf::from(name),
        }
    }

    fn features(name: &str, samples: &[(f64, f64)]) -> DatabaseFeatures {
        let samples = samples
            .iter()
            .map(|&(si, cf)| ImageSample { si, cf })
            .collect();
        DatabaseFeatures::from_samples(&db(name), samples).unwrap()
    }

    fn small_estimator() -> RasterAreaEstimator {
        RasterAreaEstimator {
            precision: 50.0,
            ..RasterAreaEstimator::default()
        }
    }

    #[test]
    fn raw_maxima_are_per_axis() {
        let f = features("db", &[(10.0, 80.0), (40.0, 5.0), (25.0, 30.0)]);
        assert_eq!(f.raw_max_si(), 40.0);
        assert_eq!(f.raw_max_cf(), 80.0);
    }

    #[test]
    fn undecodable_images_are_returned_when_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let image = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        image.save(dir.path().join("good.png")).unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let database = Database {
            name: "mixed".to_string(),
            path: dir.path().to_path_buf(),
        };

        let (features, skipped) = DatabaseFeatures::extract(&database, OnFailure::Skip).unwrap();
        assert_eq!(features.samples().len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].database, "mixed");
        assert_eq!(skipped[0].stage, Stage::Extraction);
        match skipped[0].error {
            DiversityError::InvalidImage { ref path, .. } => {
                assert_eq!(path, &dir.path().join("broken.png"))
            }
            ref other => panic!("expected InvalidImage, got {:?}", other),
        }

        match DatabaseFeatures::extract(&database, OnFailure::Abort) {
            Err(DiversityError::InvalidImage { .. }) => (),
            other => panic!("expected InvalidImage, got {:?}", other),
        }
    }

    #[test]
    fn no_samples_is_an_error() {
        assert!(DatabaseFeatures::from_samples(&db("empty"), vec![]).is_err());
    }

    #[test]
    fn normalized_points_stay_in_the_unit_square() {
        let f = features("db", &[(10.0, 80.0), (40.0, 5.0), (25.0, 30.0)]);
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(50.0, 100.0)).unwrap();
        assert_eq!(set.normalized_points()[0], Point::new(0.8, 0.2));
        for p in set.normalized_points() {
            assert!((0.0..=1.0).contains(&p.x));
            assert!((0.0..=1.0).contains(&p.y));
        }
    }

    #[test]
    fn a_basis_smaller_than_the_data_is_a_contract_violation() {
        let f = features("db", &[(10.0, 80.0), (40.0, 5.0), (25.0, 30.0)]);
        match DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(1.0, 1.0)) {
            Err(DiversityError::InconsistentBasis { database, .. }) => assert_eq!(database, "db"),
            other => panic!("expected InconsistentBasis, got {:?}", other),
        }
    }

    #[test]
    fn coverage_of_a_right_triangle() {
        let f = features("db", &[(0.0, 0.0), (0.0, 10.0), (10.0, 0.0)]);
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(10.0, 10.0)).unwrap();
        assert!((set.coverage_area().unwrap() - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn two_images_cannot_cover_anything() {
        let f = features("pair", &[(10.0, 20.0), (30.0, 60.0)]);
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(30.0, 60.0)).unwrap();
        match set.coverage_area() {
            Err(DiversityError::DegenerateHull { database }) => assert_eq!(database, "pair"),
            other => panic!("expected DegenerateHull, got {:?}", other),
        }
        assert!(set.fill_rate(&small_estimator()).is_err());
    }

    #[test]
    fn collinear_samples_are_degenerate() {
        let f = features("line", &[(10.0, 20.0), (20.0, 40.0), (30.0, 60.0)]);
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(30.0, 60.0)).unwrap();
        assert!(set.coverage_area().is_err());
        // The hull-free metrics still work.
        let (si_rr, cf_rr) = set.relative_ranges();
        assert!((si_rr - 2.0 / 3.0).abs() < 1e-12);
        assert!((cf_rr - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn metrics_stay_in_range() {
        let f = features(
            "db",
            &[(12.0, 3.0), (60.0, 44.0), (33.0, 90.0), (41.0, 41.0), (5.0, 70.0)],
        );
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(112.02, 85.83 + 10.0)).unwrap();
        let area = set.coverage_area().unwrap();
        let fill = set.fill_rate(&small_estimator()).unwrap();
        let (si_rr, cf_rr) = set.relative_ranges();
        for value in &[area, fill, si_rr, cf_rr] {
            assert!((0.0..=1.0).contains(value), "{}", value);
        }
    }

    #[test]
    fn uniformity_uses_raw_values() {
        let f = features("db", &[(5.0, 1.0), (5.0, 1.0), (5.0, 0.0)]);
        let set = DatabaseFeatureSet::new(f, CrossDatabaseBasis::new(50.0, 50.0)).unwrap();
        let (si_u, cf_u) = set.uniformity();
        assert!((si_u - 3f64.log10()).abs() < 1e-12);
        assert!((cf_u - 2f64.log10()).abs() < 1e-12);
    }
}
