// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Small statistics over lists of samples
//!
//! Means, population standard deviation, per-axis spans and the
//! entropy used for uniformity.

use itertools::{Itertools, MinMaxResult};

/// Arithmetic mean.  NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n, not n - 1), computed
/// in two passes.
pub fn std_dev(values: &[f64]) -> f64 {
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// How much of the cross-database dynamic range a list of values
/// spans: `(max - min) / global_max`.  An empty list, or a zero basis,
/// spans nothing.
pub fn relative_range(values: &[f64], global_max: f64) -> f64 {
    if global_max <= 0.0 {
        return 0.0;
    }
    match values.iter().minmax() {
        MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0.0,
        MinMaxResult::MinMax(lo, hi) => (hi - lo) / global_max,
    }
}

/// Shannon entropy of a list of non-negative magnitudes, in the given
/// base.
///
/// The list is not a probability distribution.  It is scaled by its
/// own sum first, zero entries contribute nothing (`0 log 0 = 0`), and
/// a list that sums to zero has no defined entropy, so the result is
/// NaN.  This is the behaviour of the estimator the published numbers
/// were computed with, and it is reproduced here as-is.
pub fn entropy(values: &[f64], base: f64) -> f64 {
    let total: f64 = values.iter().sum();
    let nats: f64 = values
        .iter()
        .map(|v| v / total)
        .map(|p| match p {
            p if p > 0.0 => -p * p.ln(),
            p if p == 0.0 => 0.0,
            p if p.is_nan() => p,
            _ => std::f64::NEG_INFINITY,
        })
        .sum();
    nats / base.ln()
}
