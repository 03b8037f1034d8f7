// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The cross-database normalization pass
//!
//! Before any database can be scored, we need the largest SI and the
//! largest CF over the whole batch.  This pass measures every image of
//! every database once for that purpose alone.  The result is an
//! immutable `CrossDatabaseBasis`, handed by value to every feature set
//! built afterwards.
//!
//! Each database is independent here and `max` doesn't care about
//! order, so with the `threaded` feature the databases are measured on
//! a pool of scoped threads.

use crate::collection::{Database, DatabaseCollection};
use crate::database::DatabaseFeatures;
use crate::error::{DatabaseFailure, Result, Stage};
use crate::policy::{FailurePolicy, OnFailure};
use log::{info, warn};
use serde::Serialize;

/// The largest SI and CF in a batch.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CrossDatabaseBasis {
    max_si: f64,
    max_cf: f64,
}

impl Default for CrossDatabaseBasis {
    /// The identity of `fold`.
    fn default() -> Self {
        CrossDatabaseBasis {
            max_si: 0.0,
            max_cf: 0.0,
        }
    }
}

impl CrossDatabaseBasis {
    pub fn new(max_si: f64, max_cf: f64) -> Self {
        CrossDatabaseBasis { max_si, max_cf }
    }

    pub fn max_si(&self) -> f64 {
        self.max_si
    }

    pub fn max_cf(&self) -> f64 {
        self.max_cf
    }

    /// Widen the basis to cover one more database.
    pub fn fold(self, features: &DatabaseFeatures) -> Self {
        CrossDatabaseBasis {
            max_si: self.max_si.max(features.raw_max_si()),
            max_cf: self.max_cf.max(features.raw_max_cf()),
        }
    }

    /// The basis of a set of databases.
    pub fn from_features<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a DatabaseFeatures>,
    {
        features
            .into_iter()
            .fold(CrossDatabaseBasis::default(), CrossDatabaseBasis::fold)
    }
}

/// What the normalization pass found: the basis, the features it
/// measured along the way, in collection order, and the databases it
/// had to leave out.
#[derive(Debug)]
pub struct NormalizationPass {
    pub basis: CrossDatabaseBasis,
    pub features: Vec<DatabaseFeatures>,
    pub failures: Vec<DatabaseFailure>,
}

// A database's features and the images it had to leave out.
type Extracted = Result<(DatabaseFeatures, Vec<DatabaseFailure>)>;

#[cfg(not(feature = "threaded"))]
fn extract_all(databases: &[Database], on_invalid_image: OnFailure) -> Vec<Extracted> {
    databases
        .iter()
        .map(|db| DatabaseFeatures::extract(db, on_invalid_image))
        .collect()
}

// One chunk of databases per worker; results come back in the same
// order the databases went in.
#[cfg(feature = "threaded")]
fn extract_all(databases: &[Database], on_invalid_image: OnFailure) -> Vec<Extracted> {
    use std::panic::resume_unwind;

    if databases.is_empty() {
        return Vec::new();
    }
    let workers = num_cpus::get().max(1);
    let chunk = (databases.len() + workers - 1) / workers;

    crossbeam::thread::scope(|s| {
        let handles: Vec<_> = databases
            .chunks(chunk)
            .map(|dbs| {
                s.spawn(move |_| {
                    dbs.iter()
                        .map(|db| DatabaseFeatures::extract(db, on_invalid_image))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| resume_unwind(e)))
            .collect()
    })
    .unwrap_or_else(|e| resume_unwind(e))
}

/// Measure every database and fold the basis.  A database that fails
/// to extract is left out of the basis when the policy skips it, and
/// aborts the pass otherwise.  Images the policy left out are recorded
/// here, once; the scoring pass sees the same images and drops them
/// silently.
pub fn normalization_pass(
    databases: &DatabaseCollection,
    policy: &FailurePolicy,
) -> std::result::Result<NormalizationPass, DatabaseFailure> {
    let all = databases.as_slice();
    let mut features = Vec::with_capacity(all.len());
    let mut failures = Vec::new();

    for (db, extracted) in all.iter().zip(extract_all(all, policy.invalid_image)) {
        match extracted {
            Ok((f, skipped)) => {
                for failure in skipped {
                    warn!("{}", failure);
                    failures.push(failure);
                }
                features.push(f);
            }
            Err(e) => policy.handle(&db.name, Stage::Extraction, e, &mut failures)?,
        }
    }

    let basis = CrossDatabaseBasis::from_features(&features);
    info!("Max SI: {:.4}, Max CF: {:.4}", basis.max_si, basis.max_cf);
    Ok(NormalizationPass {
        basis,
        features,
        failures,
    })
}
