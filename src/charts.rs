// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bar charts across the batch
//!
//! Once every database has been scored, each metric gets one chart
//! with a bar per database, largest first.  Single metrics colour each
//! database the same way on every chart.  Double metrics put the SI
//! and CF bars of a database side by side, SI first, in the two axis
//! colours.  Metrics that are fractions share a fixed 0 to 1 scale;
//! the others scale to their largest bar.
//!
//! Files are named after the metric: `Area.png`, `Fill rate.png`,
//! `Uniformity.png`, `Relative ranges.png`, and one per metadata
//! column that at least one database reported.

use crate::render::{save, PlotConfig};
use crate::results::{Axis, DoubleRow, ResultsTable, SingleRow};
use crate::error::{DiversityError, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// One colour per database, in table order, repeating after ten.
pub const PALETTE: [Rgb<u8>; 10] = [
    Rgb([76, 114, 176]),
    Rgb([221, 132, 82]),
    Rgb([85, 168, 104]),
    Rgb([196, 78, 82]),
    Rgb([129, 114, 179]),
    Rgb([147, 120, 96]),
    Rgb([218, 139, 195]),
    Rgb([140, 140, 140]),
    Rgb([204, 185, 116]),
    Rgb([100, 181, 205]),
];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);

// Share of a slot covered by its bars.
const GROUP_WIDTH: f64 = 0.8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SingleMetric {
    Area,
    FillRate,
    DistortedImages,
    DistortionTypes,
    DistortionLevels,
    AppliedDistortion,
}

impl SingleMetric {
    pub const ALL: [SingleMetric; 6] = [
        SingleMetric::Area,
        SingleMetric::FillRate,
        SingleMetric::DistortedImages,
        SingleMetric::DistortionTypes,
        SingleMetric::DistortionLevels,
        SingleMetric::AppliedDistortion,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SingleMetric::Area => "Area",
            SingleMetric::FillRate => "Fill rate",
            SingleMetric::DistortedImages => "Distorted images",
            SingleMetric::DistortionTypes => "Distortion types",
            SingleMetric::DistortionLevels => "Distortion levels",
            SingleMetric::AppliedDistortion => "Applied distortions",
        }
    }

    fn unit_scale(self) -> bool {
        match self {
            SingleMetric::Area | SingleMetric::FillRate => true,
            _ => false,
        }
    }

    fn value(self, row: &SingleRow) -> Option<f64> {
        let info = row.info.as_ref();
        let count = match self {
            SingleMetric::Area => return Some(row.area),
            SingleMetric::FillRate => return Some(row.fill_rate),
            SingleMetric::DistortedImages => info.and_then(|i| i.distorted_images),
            SingleMetric::DistortionTypes => info.and_then(|i| i.distortion_types),
            SingleMetric::DistortionLevels => info.and_then(|i| i.distortion_levels),
            SingleMetric::AppliedDistortion => info.and_then(|i| i.applied_distortion),
        };
        count.map(|c| c as f64)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DoubleMetric {
    Uniformity,
    RelativeRange,
}

impl DoubleMetric {
    pub const ALL: [DoubleMetric; 2] = [DoubleMetric::Uniformity, DoubleMetric::RelativeRange];

    pub fn title(self) -> &'static str {
        match self {
            DoubleMetric::Uniformity => "Uniformity",
            DoubleMetric::RelativeRange => "Relative ranges",
        }
    }

    // Uniformity is an entropy and grows past 1 with more than ten
    // images.
    fn unit_scale(self) -> bool {
        self == DoubleMetric::RelativeRange
    }

    fn value(self, row: &DoubleRow) -> f64 {
        match self {
            DoubleMetric::Uniformity => row.uniformity,
            DoubleMetric::RelativeRange => row.relative_range,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Bar {
    value: f64,
    colour: Rgb<u8>,
}

// NaN sorts below everything, so it lands at the end of a descending
// chart.
fn descending(a: f64, b: f64) -> Ordering {
    let key = |v: f64| if v.is_nan() { std::f64::NEG_INFINITY } else { v };
    key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal)
}

fn axis_colour(axis: Axis) -> Rgb<u8> {
    match axis {
        Axis::Si => PALETTE[0],
        Axis::Cf => PALETTE[1],
    }
}

// One group per database, one bar each, largest first.
fn single_bars(table: &ResultsTable, metric: SingleMetric) -> Vec<Vec<Bar>> {
    let mut bars: Vec<Bar> = table
        .single()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            metric.value(row).map(|value| Bar {
                value,
                colour: PALETTE[i % PALETTE.len()],
            })
        })
        .collect();
    bars.sort_by(|a, b| descending(a.value, b.value));
    bars.into_iter().map(|bar| vec![bar]).collect()
}

// One group per database, SI then CF.  Databases come in the order of
// their largest bar.
fn double_bars(table: &ResultsTable, metric: DoubleMetric) -> Vec<Vec<Bar>> {
    let mut rows: Vec<&DoubleRow> = table.double().iter().collect();
    rows.sort_by(|a, b| descending(metric.value(a), metric.value(b)));
    let mut order: Vec<&str> = Vec::new();
    for row in &rows {
        if !order.contains(&row.database.as_str()) {
            order.push(&row.database);
        }
    }
    order
        .into_iter()
        .map(|database| {
            [Axis::Si, Axis::Cf]
                .iter()
                .filter_map(|&axis| table.row_pair(database, axis))
                .map(|row| Bar {
                    value: metric.value(row),
                    colour: axis_colour(row.axis),
                })
                .collect()
        })
        .collect()
}

/// Draws every chart of a results table into one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output: PathBuf,
    config: PlotConfig,
}

impl ChartRenderer {
    pub fn new(output: &Path, config: PlotConfig) -> Self {
        ChartRenderer {
            output: output.to_path_buf(),
            config,
        }
    }

    fn draw(&self, groups: &[Vec<Bar>], unit_scale: bool) -> RgbImage {
        let size = self.config.size;
        let mut canvas = RgbImage::from_pixel(size, size, WHITE);
        let margin = size / 12;
        let (left, bottom) = (margin, size.saturating_sub(margin + 1));
        let width = size.saturating_sub(2 * margin);
        let height = bottom.saturating_sub(margin);
        if groups.is_empty() || width == 0 || height == 0 {
            return canvas;
        }

        let largest = groups
            .iter()
            .flatten()
            .map(|bar| bar.value)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        let top = if unit_scale || largest <= 0.0 { 1.0 } else { largest };

        let slot = f64::from(width) / groups.len() as f64;
        for (g, group) in groups.iter().enumerate() {
            let bar_width = slot * GROUP_WIDTH / group.len() as f64;
            let start = f64::from(left) + slot * (g as f64 + (1.0 - GROUP_WIDTH) / 2.0);
            for (b, bar) in group.iter().enumerate() {
                if !bar.value.is_finite() {
                    continue;
                }
                let h = (bar.value.max(0.0).min(top) / top * f64::from(height)).round() as u32;
                let w = bar_width.floor().max(1.0) as u32;
                if h == 0 {
                    continue;
                }
                let x = (start + bar_width * b as f64).round() as i32;
                let rect = Rect::at(x, (bottom - h) as i32).of_size(w, h);
                draw_filled_rect_mut(&mut canvas, rect, bar.colour);
            }
        }

        let (l, b, r) = (left as f32, bottom as f32, (left + width) as f32);
        draw_line_segment_mut(&mut canvas, (l, b), (r, b), AXIS);
        draw_line_segment_mut(&mut canvas, (l, b), (l, margin as f32), AXIS);
        canvas
    }

    /// The chart of one single metric, or `None` if no database has a
    /// value for it.
    pub fn single_chart(&self, table: &ResultsTable, metric: SingleMetric) -> Option<RgbImage> {
        let groups = single_bars(table, metric);
        if groups.is_empty() {
            return None;
        }
        Some(self.draw(&groups, metric.unit_scale()))
    }

    /// The chart of one double metric, or `None` for an empty table.
    pub fn double_chart(&self, table: &ResultsTable, metric: DoubleMetric) -> Option<RgbImage> {
        let groups = double_bars(table, metric);
        if groups.is_empty() {
            return None;
        }
        Some(self.draw(&groups, metric.unit_scale()))
    }

    /// Write every chart that has something on it.
    pub fn render(&self, table: &ResultsTable) -> Result<()> {
        fs::create_dir_all(&self.output).map_err(|e| DiversityError::Output {
            path: self.output.clone(),
            reason: e.to_string(),
        })?;
        for &metric in &SingleMetric::ALL {
            if let Some(chart) = self.single_chart(table, metric) {
                save(&chart, &self.output.join(format!("{}.png", metric.title())))?;
            }
        }
        for &metric in &DoubleMetric::ALL {
            if let Some(chart) = self.double_chart(table, metric) {
                save(&chart, &self.output.join(format!("{}.png", metric.title())))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DatabaseInfo;
    use tempfile::tempdir;

    fn table(rows: &[(&str, f64, f64, f64)]) -> ResultsTable {
        let mut table = ResultsTable::new();
        for &(database, area, si, cf) in rows {
            table.push_single(SingleRow {
                database: database.to_string(),
                area,
                fill_rate: area / 2.0,
                info: None,
            });
            for &(axis, value) in &[(Axis::Si, si), (Axis::Cf, cf)] {
                table.push_double(DoubleRow {
                    database: database.to_string(),
                    axis,
                    uniformity: value * 3.0,
                    relative_range: value,
                });
            }
        }
        table
    }

    fn values(groups: &[Vec<Bar>]) -> Vec<Vec<f64>> {
        groups
            .iter()
            .map(|g| g.iter().map(|b| b.value).collect())
            .collect()
    }

    #[test]
    fn single_bars_are_largest_first_in_their_database_colour() {
        let t = table(&[("a", 0.2, 0.0, 0.0), ("b", 0.9, 0.0, 0.0), ("c", 0.5, 0.0, 0.0)]);
        let groups = single_bars(&t, SingleMetric::Area);
        assert_eq!(values(&groups), vec![vec![0.9], vec![0.5], vec![0.2]]);
        let colours: Vec<_> = groups.iter().map(|g| g[0].colour).collect();
        assert_eq!(colours, vec![PALETTE[1], PALETTE[2], PALETTE[0]]);
    }

    #[test]
    fn double_bars_follow_the_largest_bar_of_each_database() {
        let t = table(&[("a", 0.5, 0.3, 0.8), ("b", 0.5, 0.9, 0.1)]);
        let groups = double_bars(&t, DoubleMetric::RelativeRange);
        assert_eq!(values(&groups), vec![vec![0.9, 0.1], vec![0.3, 0.8]]);
        assert_eq!(groups[0][0].colour, axis_colour(Axis::Si));
        assert_eq!(groups[0][1].colour, axis_colour(Axis::Cf));
    }

    #[test]
    fn nan_bars_go_last() {
        let t = table(&[("a", std::f64::NAN, 0.0, 0.0), ("b", 0.1, 0.0, 0.0)]);
        let groups = single_bars(&t, SingleMetric::Area);
        assert_eq!(groups[0][0].value, 0.1);
        assert!(groups[1][0].value.is_nan());
    }

    #[test]
    fn metadata_charts_need_metadata() {
        let mut t = table(&[("a", 0.4, 0.2, 0.2), ("b", 0.6, 0.2, 0.2)]);
        let charts = ChartRenderer::new(Path::new("unused"), PlotConfig::default());
        assert!(charts.single_chart(&t, SingleMetric::DistortionTypes).is_none());

        t.push_single(SingleRow {
            database: "c".to_string(),
            area: 0.5,
            fill_rate: 0.5,
            info: Some(DatabaseInfo {
                distortion_types: Some(24),
                ..DatabaseInfo::default()
            }),
        });
        let groups = single_bars(&t, SingleMetric::DistortionTypes);
        assert_eq!(values(&groups), vec![vec![24.0]]);
        assert_eq!(groups[0][0].colour, PALETTE[2]);
    }

    #[test]
    fn every_database_shows_up_in_its_colour() {
        let t = table(&[("a", 0.3, 0.0, 0.0), ("b", 1.0, 0.0, 0.0)]);
        let charts = ChartRenderer::new(Path::new("unused"), PlotConfig::default());
        let chart = charts.single_chart(&t, SingleMetric::Area).unwrap();
        assert!(chart.pixels().any(|p| *p == PALETTE[0]));
        assert!(chart.pixels().any(|p| *p == PALETTE[1]));
        assert!(chart.pixels().all(|p| *p != PALETTE[2]));
    }

    #[test]
    fn charts_are_named_after_their_metric() {
        let dir = tempdir().unwrap();
        let t = table(&[("a", 0.3, 0.2, 0.4), ("b", 0.7, 0.5, 0.1)]);
        ChartRenderer::new(dir.path(), PlotConfig::default())
            .render(&t)
            .unwrap();
        for name in &["Area", "Fill rate", "Uniformity", "Relative ranges"] {
            assert!(dir.path().join(format!("{}.png", name)).is_file(), "{}", name);
        }
        assert!(!dir.path().join("Distortion types.png").exists());
    }
}
