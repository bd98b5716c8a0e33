/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

use datagen::pipeline::{DataGenMethod, GeneratorBuilder, GeneratorReport, TableSummary};
use std::path::PathBuf;
use std::process;
use structopt::clap::arg_enum;
use structopt::StructOpt;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse commandline arguments
    let cmd = CmdOpt::from_args();

    match generate(&cmd) {
        Ok(report) if report.is_complete() => {
            print_summary(&report);
        }
        Ok(report) => {
            print_summary(&report);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: generate [ROWS_A] [ROWS_B] [UNIQUENESS]");
            eprintln!("Example: generate 1000 10000 0.9");
            process::exit(2);
        }
    }
}

fn generate(cmd: &CmdOpt) -> Result<GeneratorReport> {
    let mut builder = GeneratorBuilder::default();
    builder
        .inner_len(cmd.inner_rel_tuples)
        .outer_len(cmd.outer_rel_tuples)
        .method(cmd.method.into())
        .table_a_path(cmd.table_a.clone())
        .table_b_path(cmd.table_b.clone())
        .delimiter(cmd.file_type.delimiter());

    if let Some(uniqueness) = cmd.uniqueness {
        builder.uniqueness(uniqueness);
    }
    if let Some(seed) = cmd.seed {
        builder.seed(seed);
    }

    let report = match cmd.tuple_bytes {
        ArgTupleBytes::Bytes8 => builder.run::<i32>()?,
        ArgTupleBytes::Bytes16 => builder.run::<i64>()?,
    };

    Ok(report)
}

fn print_summary(report: &GeneratorReport) {
    let print_table = |result: &datagen::error::Result<TableSummary>| match result {
        Ok(summary) => println!(
            ">> Table {}: {} rows written to {} (generate: {:.3} s, write: {:.3} s)",
            summary.table,
            summary.rows,
            summary.path.display(),
            summary.gen_time.as_secs_f64(),
            summary.write_time.as_secs_f64()
        ),
        Err(e) => println!(">> Failed: {}", e),
    };

    print_table(&report.table_a);
    print_table(&report.table_b);

    if report.is_complete() {
        println!("\nAll tasks completed.");
    }
}

arg_enum! {
    #[derive(Copy, Clone, Debug, PartialEq)]
    pub enum ArgMethod {
        Uniqueness,
        SharedPool,
        Random,
    }
}

impl From<ArgMethod> for DataGenMethod {
    fn from(method: ArgMethod) -> Self {
        match method {
            ArgMethod::Uniqueness => DataGenMethod::Uniqueness,
            ArgMethod::SharedPool => DataGenMethod::SharedPool,
            ArgMethod::Random => DataGenMethod::Random,
        }
    }
}

arg_enum! {
    #[derive(Copy, Clone, Debug, PartialEq)]
    #[repr(usize)]
    pub enum ArgTupleBytes {
        Bytes8 = 8,
        Bytes16 = 16,
    }
}

arg_enum! {
    #[derive(Copy, Clone, Debug, PartialEq)]
    pub enum ArgFileType {
        Csv,
        Tsv,
    }
}

impl ArgFileType {
    fn delimiter(self) -> u8 {
        match self {
            ArgFileType::Csv => b',',
            ArgFileType::Tsv => b' ',
        }
    }
}

#[derive(StructOpt)]
#[structopt(
    name = "generate",
    about = "Generates tables A (key,value) and B (key) for join-aggregation benchmarks"
)]
struct CmdOpt {
    /// Key generation method
    //   uniqueness: per-table key pools with UNIQUENESS fraction of distinct keys
    //   sharedpool: both tables sample keys from one shared pool
    //   random: keys and values drawn from the full integer range
    #[structopt(
        long = "method",
        default_value = "Uniqueness",
        possible_values = &ArgMethod::variants(),
        case_insensitive = true
    )]
    method: ArgMethod,

    /// Set the tuple size (bytes)
    #[structopt(
        long = "tuple-bytes",
        default_value = "Bytes8",
        possible_values = &ArgTupleBytes::variants(),
        case_insensitive = true
    )]
    tuple_bytes: ArgTupleBytes,

    /// Set the output file type
    #[structopt(
        long = "file-type",
        default_value = "Csv",
        possible_values = &ArgFileType::variants(),
        case_insensitive = true
    )]
    file_type: ArgFileType,

    /// Table A output file (gzip-compressed if it ends with .gz)
    #[structopt(long = "table-a", default_value = "A.txt", parse(from_os_str))]
    table_a: PathBuf,

    /// Table B output file (gzip-compressed if it ends with .gz)
    #[structopt(long = "table-b", default_value = "B.txt", parse(from_os_str))]
    table_b: PathBuf,

    /// Seed for the random generator; random if omitted
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Table A size (tuples)
    inner_rel_tuples: usize,

    /// Table B size (tuples)
    outer_rel_tuples: usize,

    /// Fraction of unique keys per table, between 0.0 and 1.0
    uniqueness: Option<f64>,
}
