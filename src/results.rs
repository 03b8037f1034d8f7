// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The results table
//!
//! Two sections.  Single metrics have one row per database.  Double
//! metrics are split by axis, so each database gets a pair of rows,
//! one for SI and one for CF.

use crate::error::{DiversityError, Result};
use crate::metadata::DatabaseInfo;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Axis {
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "CF")]
    Cf,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Axis::Si => "SI",
            Axis::Cf => "CF",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleRow {
    pub database: String,
    pub area: f64,
    pub fill_rate: f64,
    /// Absent when the database has no usable `info.yaml`.
    pub info: Option<DatabaseInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleRow {
    pub database: String,
    pub axis: Axis,
    pub uniformity: f64,
    pub relative_range: f64,
}

/// Append-only during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsTable {
    single: Vec<SingleRow>,
    double: Vec<DoubleRow>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_single(&mut self, row: SingleRow) {
        self.single.push(row);
    }

    pub fn push_double(&mut self, row: DoubleRow) {
        self.double.push(row);
    }

    pub fn single(&self) -> &[SingleRow] {
        &self.single
    }

    pub fn double(&self) -> &[DoubleRow] {
        &self.double
    }

    /// The single row of a database.
    pub fn row(&self, database: &str) -> Option<&SingleRow> {
        self.single.iter().find(|r| r.database == database)
    }

    /// The double row of a database on one axis.
    pub fn row_pair(&self, database: &str, axis: Axis) -> Option<&DoubleRow> {
        self.double
            .iter()
            .find(|r| r.database == database && r.axis == axis)
    }

    /// Number of databases in the table.
    pub fn len(&self) -> usize {
        self.single.len()
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let output = |e: String| DiversityError::Output {
            path: path.to_path_buf(),
            reason: e,
        };
        let file = File::create(path).map_err(|e| output(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| output(e.to_string()))?;
        writer.flush().map_err(|e| output(e.to_string()))
    }
}

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>8} {:>10} {:>6} {:>10} {:>10} {:>10} {:>10}",
            "Database",
            "Area",
            "Fill rate",
            "Year",
            "Dist. img",
            "Dist. typ",
            "Dist. lvl",
            "Applied"
        )?;
        for row in &self.single {
            let info = row.info.clone().unwrap_or_default();
            writeln!(
                f,
                "{:<20} {:>8.4} {:>10.4} {:>6} {:>10} {:>10} {:>10} {:>10}",
                row.database,
                row.area,
                row.fill_rate,
                or_dash(info.year),
                or_dash(info.distorted_images),
                or_dash(info.distortion_types),
                or_dash(info.distortion_levels),
                or_dash(info.applied_distortion)
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:>4} {:>10} {:>15}",
            "Database", "Axis", "Uniformity", "Relative range"
        )?;
        for row in &self.double {
            writeln!(
                f,
                "{:<20} {:>4} {:>10.4} {:>15.4}",
                row.database, row.axis, row.uniformity, row.relative_range
            )?;
        }
        Ok(())
    }
}
