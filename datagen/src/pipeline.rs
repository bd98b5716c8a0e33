/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019-2021, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

//! Generates and writes tables A and B concurrently.
//!
//! Each table is produced by its own pipeline on its own thread. The
//! pipelines share no mutable state. A failing pipeline does not abort its
//! sibling.

use crate::error::{ErrorKind, Result};
use crate::relation::{KeyAttribute, SharedPoolRelation, Uniqueness};
use crate::table::{GeneratedTable, KeyDistribution, TableA, TableB, TableId};
use crate::writer::TableWriter;

use crossbeam_utils::thread::{scope, ScopedJoinHandle};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DataGenMethod {
    /// Per-table key pools with a fraction of unique keys.
    Uniqueness,
    /// One key pool shared by both tables.
    SharedPool,
    /// Uniformly random keys and values over the full key type range.
    Random,
}

/// Outcome of a successful table pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSummary {
    pub table: TableId,
    pub path: PathBuf,
    pub rows: usize,
    pub gen_time: Duration,
    pub write_time: Duration,
}

/// Outcome of both table pipelines.
///
/// A pipeline that failed leaves its file missing or incomplete, while the
/// sibling's result remains valid.
#[derive(Debug)]
pub struct GeneratorReport {
    pub table_a: Result<TableSummary>,
    pub table_b: Result<TableSummary>,
}

impl GeneratorReport {
    pub fn is_complete(&self) -> bool {
        self.table_a.is_ok() && self.table_b.is_ok()
    }
}

pub struct GeneratorBuilder {
    inner_len: usize,
    outer_len: usize,
    method: DataGenMethod,
    uniqueness: Option<f64>,
    table_a_path: PathBuf,
    table_b_path: PathBuf,
    delimiter: u8,
    seed: Option<u64>,
}

impl Default for GeneratorBuilder {
    fn default() -> GeneratorBuilder {
        GeneratorBuilder {
            inner_len: 0,
            outer_len: 0,
            method: DataGenMethod::Uniqueness,
            uniqueness: None,
            table_a_path: PathBuf::from("A.txt"),
            table_b_path: PathBuf::from("B.txt"),
            delimiter: b',',
            seed: None,
        }
    }
}

impl GeneratorBuilder {
    pub fn inner_len(&mut self, inner_len: usize) -> &mut Self {
        self.inner_len = inner_len;
        self
    }

    pub fn outer_len(&mut self, outer_len: usize) -> &mut Self {
        self.outer_len = outer_len;
        self
    }

    pub fn method(&mut self, method: DataGenMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn uniqueness(&mut self, uniqueness: f64) -> &mut Self {
        self.uniqueness = Some(uniqueness);
        self
    }

    pub fn table_a_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.table_a_path = path.into();
        self
    }

    pub fn table_b_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.table_b_path = path.into();
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Generates and writes both tables.
    ///
    /// Arguments are validated before any file is touched. Returns an error
    /// only if the arguments are invalid; pipeline failures are reported per
    /// table in the `GeneratorReport`.
    pub fn run<T: KeyAttribute>(&self) -> Result<GeneratorReport> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(thread_rng())?,
        };

        let shared_pool: Vec<T>;
        let distribution = match self.method {
            DataGenMethod::Uniqueness => {
                let fraction = self.uniqueness.ok_or_else(|| {
                    ErrorKind::InvalidArgument(
                        "Uniqueness is required for the Uniqueness method".to_string(),
                    )
                })?;
                let uniqueness = Uniqueness::new(fraction)?;
                info!("Key uniqueness: {:.2}%", uniqueness.percent());
                KeyDistribution::Uniqueness(uniqueness)
            }
            DataGenMethod::SharedPool => {
                self.warn_unused_uniqueness();
                let pool_len = SharedPoolRelation::pool_len(self.inner_len, self.outer_len);
                shared_pool = SharedPoolRelation::gen_key_pool(pool_len, &mut rng)?;
                info!("Generated shared key pool with {} keys", pool_len);
                KeyDistribution::SharedPool(&shared_pool)
            }
            DataGenMethod::Random => {
                self.warn_unused_uniqueness();
                KeyDistribution::Random
            }
        };

        let rng_a = StdRng::from_rng(&mut rng)?;
        let rng_b = StdRng::from_rng(&mut rng)?;
        let distribution = &distribution;

        info!("Table A rows: {}", self.inner_len);
        info!("Table B rows: {}", self.outer_len);

        let (table_a, table_b) = scope(|s| {
            let handle_a: ScopedJoinHandle<'_, Result<TableSummary>> = s.spawn(move |_| {
                run_pipeline::<TableA<T>>(
                    self.inner_len,
                    distribution,
                    &self.table_a_path,
                    self.delimiter,
                    rng_a,
                )
            });
            let handle_b: ScopedJoinHandle<'_, Result<TableSummary>> = s.spawn(move |_| {
                run_pipeline::<TableB<T>>(
                    self.outer_len,
                    distribution,
                    &self.table_b_path,
                    self.delimiter,
                    rng_b,
                )
            });

            (
                join_pipeline(TableId::A, handle_a),
                join_pipeline(TableId::B, handle_b),
            )
        })
        .map_err(|_| ErrorKind::ThreadPanic("Failure inside pipeline scope".to_string()))?;

        Ok(GeneratorReport { table_a, table_b })
    }

    fn warn_unused_uniqueness(&self) {
        if self.uniqueness.is_some() {
            warn!("Ignoring uniqueness for the {:?} method", self.method);
        }
    }
}

fn join_pipeline(
    table: TableId,
    handle: ScopedJoinHandle<'_, Result<TableSummary>>,
) -> Result<TableSummary> {
    handle.join().unwrap_or_else(|_| {
        let msg = format!("Pipeline of table {} panicked", table);
        error!("{}", msg);
        Err(ErrorKind::ThreadPanic(msg).into())
    })
}

/// Generates one table and writes it to `path`.
///
/// Errors are logged here, so that the caller only collects them.
fn run_pipeline<G: GeneratedTable>(
    len: usize,
    distribution: &KeyDistribution<'_, G::Key>,
    path: &Path,
    delimiter: u8,
    mut rng: StdRng,
) -> Result<TableSummary> {
    let result = generate_and_write::<G>(len, distribution, path, delimiter, &mut rng);

    match result {
        Ok(ref summary) => info!(
            "Table {}: {} created successfully",
            G::ID,
            summary.path.display()
        ),
        Err(ref e) => error!("Table {}: error writing {}: {}", G::ID, path.display(), e),
    }

    result
}

fn generate_and_write<G: GeneratedTable>(
    len: usize,
    distribution: &KeyDistribution<'_, G::Key>,
    path: &Path,
    delimiter: u8,
    rng: &mut StdRng,
) -> Result<TableSummary> {
    info!("Table {}: generating {} rows", G::ID, len);
    let timer = Instant::now();
    let table = G::generate(len, distribution, rng)?;
    let gen_time = timer.elapsed();

    info!("Table {}: writing {}", G::ID, path.display());
    let timer = Instant::now();
    let mut writer = TableWriter::create(path, delimiter)?;
    table.write(&mut writer)?;
    let rows = writer.finish()?;
    let write_time = timer.elapsed();

    Ok(TableSummary {
        table: G::ID,
        path: path.to_path_buf(),
        rows,
        gen_time,
        write_time,
    })
}
