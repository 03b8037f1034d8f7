// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Database metadata
//!
//! A database directory may carry an `info.yaml` describing where it
//! came from.  None of it feeds the diversity metrics; it's carried
//! into the results table for display only, and every field is
//! optional.

use crate::error::{DiversityError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const INFO_FILENAME: &str = "info.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInfo {
    pub year: Option<u32>,
    pub distorted_images: Option<u64>,
    pub distortion_types: Option<u64>,
    pub distortion_levels: Option<u64>,
    pub applied_distortion: Option<u64>,
}

/// Read `info.yaml` from a database directory.
pub fn load_info(database: &Path) -> Result<DatabaseInfo> {
    let path = database.join(INFO_FILENAME);
    let text = fs::read_to_string(&path)
        .map_err(|_| DiversityError::MetadataUnavailable { path: path.clone() })?;
    serde_yaml::from_str(&text).map_err(|e| DiversityError::MetadataMalformed {
        path,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_every_field() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(INFO_FILENAME),
            "year: 2008\ndistorted_images: 1700\ndistortion_types: 17\n\
             distortion_levels: 4\napplied_distortion: 1\n",
        )
        .unwrap();
        let info = load_info(dir.path()).unwrap();
        assert_eq!(info.year, Some(2008));
        assert_eq!(info.distortion_types, Some(17));
        assert_eq!(info.applied_distortion, Some(1));
    }

    #[test]
    fn fields_are_optional() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(INFO_FILENAME), "year: 2013\n").unwrap();
        let info = load_info(dir.path()).unwrap();
        assert_eq!(
            info,
            DatabaseInfo {
                year: Some(2013),
                ..DatabaseInfo::default()
            }
        );
    }

    #[test]
    fn missing_and_malformed_are_told_apart() {
        let dir = tempdir().unwrap();
        match load_info(dir.path()) {
            Err(DiversityError::MetadataUnavailable { .. }) => (),
            other => panic!("expected MetadataUnavailable, got {:?}", other),
        }
        fs::write(dir.path().join(INFO_FILENAME), "year: [not, a, year\n").unwrap();
        match load_info(dir.path()) {
            Err(DiversityError::MetadataMalformed { .. }) => (),
            other => panic!("expected MetadataMalformed, got {:?}", other),
        }
    }
}
