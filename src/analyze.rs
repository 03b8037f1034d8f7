// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Analyze a batch of databases
//!
//! The run happens in two phases.  The normalization pass measures
//! everything to find the basis.  Only once it has returned does the
//! scoring pass start: each database is measured again (or taken from
//! the pass, if caching is on), normalized against that basis, scored,
//! and handed to the renderer.  The basis is passed by value from the
//! first phase to the second, and nothing in the second can change it.

use crate::basis::{normalization_pass, CrossDatabaseBasis};
use crate::charts::ChartRenderer;
use crate::collection::{Database, DatabaseCollection};
use crate::config::AnalysisConfig;
use crate::database::{DatabaseFeatureSet, DatabaseFeatures};
use crate::error::{DatabaseFailure, DiversityError, Stage};
use crate::metadata::load_info;
use crate::render::{PlotRenderer, Renderer};
use crate::results::{Axis, DoubleRow, ResultsTable, SingleRow};
use failure::Error;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const RESULTS_FILENAME: &str = "results.json";

/// Everything a run produced.
#[derive(Debug)]
pub struct AnalysisReport {
    pub basis: CrossDatabaseBasis,
    pub table: ResultsTable,
    /// Databases, or parts of them, that the policy chose to skip.
    pub failures: Vec<DatabaseFailure>,
}

/// A batch of databases under one parent directory.
pub struct DatabaseAnalyze {
    databases: DatabaseCollection,
    config: AnalysisConfig,
    renderer: Box<dyn Renderer>,
}

impl DatabaseAnalyze {
    /// Find the databases under `parent`.  Fails, before any image is
    /// opened, if `parent` isn't a directory with subdirectories in it.
    /// Renders nothing until given a renderer.
    pub fn new(parent: &Path, config: AnalysisConfig) -> Result<Self, Error> {
        debug!("DatabaseAnalyze init for dir: {}", parent.display());
        let databases = DatabaseCollection::new(parent)?;
        let renderer = Box::new(PlotRenderer::new(None, config.plot));
        Ok(DatabaseAnalyze {
            databases,
            config,
            renderer,
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn databases(&self) -> &DatabaseCollection {
        &self.databases
    }

    /// Run both phases.  A failure that the policy aborts on comes back
    /// as a `DatabaseFailure`, naming the database and the stage.
    pub fn analyze(&self) -> Result<AnalysisReport, Error> {
        let pass = normalization_pass(&self.databases, &self.config.policy)?;
        let basis = pass.basis;
        let mut failures = pass.failures;

        // Anything not measured was left out, whole, by the policy.
        let measured: HashSet<String> =
            pass.features.iter().map(|f| f.name().to_string()).collect();
        let mut cached: HashMap<String, DatabaseFeatures> = if self.config.cache_features {
            pass.features
                .into_iter()
                .map(|f| (f.name().to_string(), f))
                .collect()
        } else {
            HashMap::new()
        };

        let mut table = ResultsTable::new();
        for db in &self.databases {
            if !measured.contains(&db.name) {
                continue;
            }
            let features = match cached.remove(&db.name) {
                Some(features) => features,
                None => match DatabaseFeatures::extract(db, self.config.policy.invalid_image) {
                    // Skipped images were recorded by the normalization pass.
                    Ok((features, _)) => features,
                    Err(e) => {
                        self.config
                            .policy
                            .handle(&db.name, Stage::Extraction, e, &mut failures)?;
                        continue;
                    }
                },
            };
            let set = DatabaseFeatureSet::new(features, basis)
                .map_err(|e| DatabaseFailure::new(&db.name, Stage::Normalization, e))?;
            self.score(db, &set, &mut table, &mut failures)?;
        }

        info!("Analyzed {} databases", table.len());
        Ok(AnalysisReport {
            basis,
            table,
            failures,
        })
    }

    // Metrics, metadata and plots for one database.
    fn score(
        &self,
        db: &Database,
        set: &DatabaseFeatureSet,
        table: &mut ResultsTable,
        failures: &mut Vec<DatabaseFailure>,
    ) -> Result<(), DatabaseFailure> {
        let policy = &self.config.policy;

        let geometry = set
            .coverage_area()
            .and_then(|area| Ok((area, set.fill_rate(&self.config.fill_rate)?)));
        let (area, fill_rate) = match geometry {
            Ok(metrics) => metrics,
            Err(e) => return policy.handle(&db.name, Stage::Geometry, e, failures),
        };

        let info = match load_info(&db.path) {
            Ok(info) => Some(info),
            Err(e) => {
                policy.handle(&db.name, Stage::Metadata, e, failures)?;
                None
            }
        };

        let (si_rr, cf_rr) = set.relative_ranges();
        let (si_u, cf_u) = set.uniformity();
        info!(
            "{}: area {:.4}, fill rate {:.4}, relative ranges ({:.4}, {:.4}), uniformity ({:.4}, {:.4})",
            db.name, area, fill_rate, si_rr, cf_rr, si_u, cf_u
        );

        table.push_single(SingleRow {
            database: db.name.clone(),
            area,
            fill_rate,
            info,
        });
        for &(axis, uniformity, relative_range) in &[(Axis::Si, si_u, si_rr), (Axis::Cf, cf_u, cf_rr)] {
            table.push_double(DoubleRow {
                database: db.name.clone(),
                axis,
                uniformity,
                relative_range,
            });
        }

        if let Err(e) = self.renderer.render(set) {
            policy.handle(&db.name, Stage::Render, e, failures)?;
        }
        Ok(())
    }
}

/// Analyze every database under `parent`.  With an output directory,
/// each database's plots, the bar charts across databases and the
/// results table, as `results.json`, are written into it; without one,
/// nothing is written.
pub fn analyze_directory(
    parent: &Path,
    output: Option<&Path>,
    config: AnalysisConfig,
) -> Result<AnalysisReport, Error> {
    let plot = config.plot;
    let renderer = Box::new(PlotRenderer::new(output, plot));
    let report = DatabaseAnalyze::new(parent, config)?
        .with_renderer(renderer)
        .analyze()?;
    if let Some(output) = output {
        std::fs::create_dir_all(output).map_err(|e| DiversityError::Output {
            path: PathBuf::from(output),
            reason: e.to_string(),
        })?;
        report.table.write_json(&output.join(RESULTS_FILENAME))?;
        ChartRenderer::new(output, plot).render(&report.table)?;
    }
    Ok(report)
}
