/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

use crate::error::Result;
use error_chain::ensure;
use serde_derive::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Write;

/// One benchmark run of HashJoin-Then-Aggregation versus GroupJoin.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DataPoint {
    pub size_a: usize,
    pub size_b: usize,
    pub uniqueness: f64,
    pub uniqueness_percent: f64,
    pub hashjoin_s: f64,
    pub groupjoin_s: f64,
    pub speedup: f64,
}

/// Sorts data points by table A size, then by uniqueness.
pub fn sort(points: &mut [DataPoint]) {
    points.sort_by(|a, b| {
        a.size_a.cmp(&b.size_a).then_with(|| {
            a.uniqueness
                .partial_cmp(&b.uniqueness)
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Groups data points into one series per table A size.
///
/// Each series retains the order of `points`.
pub fn series_by_size(points: &[DataPoint]) -> BTreeMap<usize, Vec<&DataPoint>> {
    let mut series: BTreeMap<usize, Vec<&DataPoint>> = BTreeMap::new();
    for point in points {
        series.entry(point.size_a).or_default().push(point);
    }
    series
}

pub fn write_csv<W: Write>(points: &[DataPoint], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    ensure!(
        points.iter().try_for_each(|row| csv.serialize(row)).is_ok(),
        "Couldn't write serialized data points"
    );
    csv.flush()?;
    Ok(())
}

/// Prints the execution time and speed-up series of each table size.
pub fn print_summary(points: &[DataPoint]) {
    for (size, series) in series_by_size(points) {
        println!("\nTable size: {}", size);
        println!(
            "{:>12} {:>16} {:>16} {:>10}",
            "uniqueness", "hashjoin [s]", "groupjoin [s]", "speed up"
        );
        for point in &series {
            println!(
                "{:>11.0}% {:>16.6} {:>16.6} {:>10.3}",
                point.uniqueness_percent, point.hashjoin_s, point.groupjoin_s, point.speedup
            );
        }

        if let Some(best) = series
            .iter()
            .max_by(|a, b| a.speedup.partial_cmp(&b.speedup).unwrap_or(Ordering::Equal))
        {
            println!(
                "Best speed up: {:.3}x at {:.0}% uniqueness",
                best.speedup, best.uniqueness_percent
            );
        }
    }
}
