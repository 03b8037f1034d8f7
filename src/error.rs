// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors
//!
//! Everything that can go wrong while measuring a batch of databases.
//! The per-database kinds are wrapped in a `DatabaseFailure` by the
//! orchestrator, which adds the name of the database and the stage at
//! which it broke, so the failure policy has enough to decide whether
//! to keep going.

use failure::Fail;
use std::fmt;
use std::path::PathBuf;

/// The failure taxonomy of the diversity engine.
#[derive(Debug, Fail)]
pub enum DiversityError {
    /// A required directory is absent or holds nothing we can use.
    #[fail(display = "directory {:?} is missing or contains no {}", path, wanted)]
    EmptyOrMissingDirectory { path: PathBuf, wanted: &'static str },

    /// A file could not be decoded into pixels, or decoded into nothing.
    #[fail(display = "cannot read image {:?}: {}", path, reason)]
    InvalidImage { path: PathBuf, reason: String },

    /// Fewer than three non-collinear normalized points.
    #[fail(
        display = "database {} has fewer than three non-collinear points",
        database
    )]
    DegenerateHull { database: String },

    #[fail(display = "no metadata found at {:?}", path)]
    MetadataUnavailable { path: PathBuf },

    #[fail(display = "malformed metadata in {:?}: {}", path, reason)]
    MetadataMalformed { path: PathBuf, reason: String },

    /// A database's own maximum exceeds the basis it was handed.  The
    /// basis is the maximum over every database, so this can only
    /// happen if a feature set was built before the normalization pass
    /// finished.
    #[fail(
        display = "database {} (SI {}, CF {}) exceeds the supplied basis (SI {}, CF {})",
        database, raw_si, raw_cf, basis_si, basis_cf
    )]
    InconsistentBasis {
        database: String,
        raw_si: f64,
        raw_cf: f64,
        basis_si: f64,
        basis_cf: f64,
    },

    #[fail(display = "invalid configuration in {:?}: {}", path, reason)]
    InvalidConfig { path: PathBuf, reason: String },

    #[fail(display = "cannot write {:?}: {}", path, reason)]
    Output { path: PathBuf, reason: String },
}

/// Where in the run a database broke.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Normalization,
    Geometry,
    Metadata,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "feature extraction",
            Stage::Normalization => "normalization",
            Stage::Geometry => "hull geometry",
            Stage::Metadata => "metadata",
            Stage::Render => "rendering",
        };
        f.write_str(name)
    }
}

/// A per-database error, tagged with enough context for the
/// orchestrator to report it or abort on it.
#[derive(Debug, Fail)]
#[fail(display = "database {} failed during {}: {}", database, stage, error)]
pub struct DatabaseFailure {
    pub database: String,
    pub stage: Stage,
    #[fail(cause)]
    pub error: DiversityError,
}

impl DatabaseFailure {
    pub fn new(database: &str, stage: Stage, error: DiversityError) -> Self {
        DatabaseFailure {
            database: database.to_string(),
            stage,
            error,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiversityError>;
