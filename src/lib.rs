// #![deny(missing_docs)]

//! Visual diversity of image databases
//!
//! Every image is placed in a plane by two numbers, its Spatial
//! Information and its Colorfulness.  Every database is then a cloud
//! of points in that plane, and the shape of that cloud, measured
//! against every other database in the batch, says how visually
//! diverse the database is.

extern crate image;

pub mod ternary;

pub mod error;
pub use error::{DatabaseFailure, DiversityError, Stage};

mod plane;
pub mod stats;

pub mod features;
pub use features::{extract_path, measure, ImageSample};

pub mod collection;
pub use collection::{Database, DatabaseCollection, ImageCollection};

pub mod hull;
pub mod delaunay;
pub mod fillrate;
pub use fillrate::{AreaEstimator, RasterAreaEstimator};

pub mod metadata;
pub mod policy;
pub use policy::{FailurePolicy, OnFailure};

pub mod database;
pub use database::{DatabaseFeatureSet, DatabaseFeatures};

pub mod basis;
pub use basis::{normalization_pass, CrossDatabaseBasis};

pub mod render;
pub mod charts;
pub mod results;
pub use results::{Axis, ResultsTable};

pub mod config;
pub use config::AnalysisConfig;

pub mod analyze;
pub use analyze::{analyze_directory, AnalysisReport, DatabaseAnalyze};
