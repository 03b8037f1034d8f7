// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run configuration
//!
//! Everything a run can be tuned with, with the defaults the published
//! numbers were made with.  It can be read from a YAML file; any key
//! left out keeps its default.  The command line layers its flags and
//! environment variables on top.

use crate::error::{DiversityError, Result};
use crate::fillrate::RasterAreaEstimator;
use crate::policy::FailurePolicy;
use crate::render::{PlotConfig, MIN_PLOT_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Canvas precision and marker size of the fill-rate estimator.
    pub fill_rate: RasterAreaEstimator,
    /// Size and axis limits of the per-database plots.
    pub plot: PlotConfig,
    pub policy: FailurePolicy,
    /// Keep the samples measured by the normalization pass instead of
    /// measuring every image a second time.  Results are identical.
    pub cache_features: bool,
}

impl AnalysisConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| DiversityError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        config.check().map_err(invalid)?;
        Ok(config)
    }

    /// Reject settings that leave nothing to draw on.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.plot.size < MIN_PLOT_SIZE {
            return Err(format!(
                "plot.size must be at least {}, got {}",
                MIN_PLOT_SIZE, self.plot.size
            ));
        }
        let estimator = &self.fill_rate;
        if !(estimator.precision > 0.0 && estimator.figure_inches > 0.0) {
            return Err("fill_rate.precision and fill_rate.figure_inches must be positive".into());
        }
        if !(estimator.marker_radius >= 0.0) {
            return Err("fill_rate.marker_radius must not be negative".into());
        }
        Ok(())
    }
}
