// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image and database collections
//!
//! A database is a directory of images; a batch is a parent directory
//! of databases.  Both collections read their directory once, up
//! front, and can then be iterated as many times as needed.  Entries
//! are sorted by name, but nothing downstream should rely on that.

use crate::error::{DiversityError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::slice;

/// File extensions, lower case, that we try to decode.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "jpeg", "jpg", "gif", "tiff"];

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
}

// Entries of a directory that pass `keep`, sorted.  A directory we
// can't list counts as missing.
fn entries<F>(directory: &Path, wanted: &'static str, keep: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let missing = || DiversityError::EmptyOrMissingDirectory {
        path: directory.to_path_buf(),
        wanted,
    };
    if !directory.is_dir() {
        return Err(missing());
    }
    let mut found: Vec<PathBuf> = fs::read_dir(directory)
        .map_err(|_| missing())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| keep(p.as_path()))
        .collect();
    if found.is_empty() {
        return Err(missing());
    }
    found.sort();
    Ok(found)
}

/// The images of a single database directory.
#[derive(Debug, Clone)]
pub struct ImageCollection {
    files: Vec<PathBuf>,
}

impl ImageCollection {
    pub fn new(directory: &Path) -> Result<Self> {
        Ok(ImageCollection {
            files: entries(directory, "images", is_image)?,
        })
    }

    pub fn iter(&self) -> slice::Iter<PathBuf> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImageCollection {
    type Item = &'a PathBuf;
    type IntoIter = slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One database: its name (the directory's own name) and where it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub path: PathBuf,
}

/// The databases under a parent directory: every immediate
/// subdirectory is one database.
#[derive(Debug, Clone)]
pub struct DatabaseCollection {
    databases: Vec<Database>,
}

impl DatabaseCollection {
    pub fn new(parent: &Path) -> Result<Self> {
        let databases = entries(parent, "database directories", |p| p.is_dir())?
            .into_iter()
            .map(|path| Database {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path,
            })
            .collect();
        Ok(DatabaseCollection { databases })
    }

    pub fn iter(&self) -> slice::Iter<Database> {
        self.databases.iter()
    }

    pub fn as_slice(&self) -> &[Database] {
        &self.databases
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.databases.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

impl<'a> IntoIterator for &'a DatabaseCollection {
    type Item = &'a Database;
    type IntoIter = slice::Iter<'a, Database>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
