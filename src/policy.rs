// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What to do when one database breaks
//!
//! Each stage of a run has its own knob.  The defaults abort on
//! anything that would leave a hole in the numeric results, and carry
//! on without the display-only metadata.

use crate::error::{DatabaseFailure, DiversityError, Stage};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Stop the whole run.
    Abort,
    /// Record the failure, leave the item out, keep going.
    Skip,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// A single image that won't decode: fail its database, or drop
    /// the image.
    pub invalid_image: OnFailure,
    /// A database whose features can't be extracted.
    pub extraction: OnFailure,
    /// A database with a degenerate hull.
    pub geometry: OnFailure,
    /// A database with missing or malformed `info.yaml`.
    pub metadata: OnFailure,
    /// Plots that can't be written.
    pub render: OnFailure,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy {
            invalid_image: OnFailure::Abort,
            extraction: OnFailure::Abort,
            geometry: OnFailure::Abort,
            metadata: OnFailure::Skip,
            render: OnFailure::Abort,
        }
    }
}

impl FailurePolicy {
    /// Carry on past everything that can be carried on past.
    pub fn lenient() -> Self {
        FailurePolicy {
            invalid_image: OnFailure::Skip,
            extraction: OnFailure::Skip,
            geometry: OnFailure::Skip,
            metadata: OnFailure::Skip,
            render: OnFailure::Skip,
        }
    }

    pub fn for_stage(&self, stage: Stage) -> OnFailure {
        match stage {
            Stage::Extraction => self.extraction,
            Stage::Geometry => self.geometry,
            Stage::Metadata => self.metadata,
            Stage::Render => self.render,
            // A basis that doesn't cover its own databases is a bug.
            Stage::Normalization => OnFailure::Abort,
        }
    }

    /// Apply the policy to a failed stage.  On `Skip` the failure is
    /// logged and recorded and `Ok` comes back; on `Abort` it is
    /// returned for the caller to stop on.
    pub fn handle(
        &self,
        database: &str,
        stage: Stage,
        error: DiversityError,
        failures: &mut Vec<DatabaseFailure>,
    ) -> Result<(), DatabaseFailure> {
        let failure = DatabaseFailure::new(database, stage, error);
        match self.for_stage(stage) {
            OnFailure::Abort => Err(failure),
            OnFailure::Skip => {
                warn!("{}", failure);
                failures.push(failure);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degenerate() -> DiversityError {
        DiversityError::DegenerateHull {
            database: "db".to_string(),
        }
    }

    #[test]
    fn reference_policy_is_asymmetric() {
        let policy = FailurePolicy::default();
        assert_eq!(policy.for_stage(Stage::Extraction), OnFailure::Abort);
        assert_eq!(policy.for_stage(Stage::Metadata), OnFailure::Skip);
    }

    #[test]
    fn skipped_failures_are_recorded() {
        let mut failures = Vec::new();
        FailurePolicy::lenient()
            .handle("db", Stage::Geometry, degenerate(), &mut failures)
            .unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, Stage::Geometry);
        assert_eq!(failures[0].database, "db");
    }

    #[test]
    fn aborts_come_back_with_context() {
        let mut failures = Vec::new();
        let failure = FailurePolicy::default()
            .handle("db", Stage::Geometry, degenerate(), &mut failures)
            .unwrap_err();
        assert!(failures.is_empty());
        assert_eq!(
            failure.to_string(),
            "database db failed during hull geometry: \
             database db has fewer than three non-collinear points"
        );
    }

    #[test]
    fn normalization_always_aborts() {
        assert_eq!(
            FailurePolicy::lenient().for_stage(Stage::Normalization),
            OnFailure::Abort
        );
    }
}
