/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

mod data_point;
mod error;
mod parser;

use crate::error::{ErrorKind, Result, ResultExt};
use crate::parser::LogParser;
use error_chain::bail;
use log::info;
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse commandline arguments
    let cmd = CmdOpt::from_args();

    info!("Reading and parsing '{}'", cmd.input.display());
    let content = fs::read_to_string(&cmd.input).chain_err(|| {
        format!(
            "Couldn't read '{}'; run the benchmark first to produce it",
            cmd.input.display()
        )
    })?;

    let mut points = LogParser::new()?.parse(&content)?;
    info!("Successfully parsed {} data points", points.len());

    if let Some(size) = cmd.size {
        points.retain(|p| p.size_a == size);
        if points.is_empty() {
            bail!(ErrorKind::InvalidArgument(format!(
                "No data points with table size {}",
                size
            )));
        }
    }

    data_point::sort(&mut points);

    if let Some(ref csv_path) = cmd.csv {
        let file = fs::File::create(csv_path)?;
        data_point::write_csv(&points, file)?;
        info!("Saved data points: {}", csv_path.display());
    } else {
        data_point::print_summary(&points);
    }

    Ok(())
}

#[derive(StructOpt)]
#[structopt(
    name = "bench-report",
    about = "Extracts execution time and speed-up series from HashJoin vs. GroupJoin benchmark logs"
)]
struct CmdOpt {
    /// Benchmark log to parse
    #[structopt(long = "input", default_value = "times.txt", parse(from_os_str))]
    input: PathBuf,

    /// Output filename for data point CSV file
    #[structopt(long = "csv", parse(from_os_str))]
    csv: Option<PathBuf>,

    /// Only report runs with this table A size (tuples)
    #[structopt(long = "size")]
    size: Option<usize>,
}
