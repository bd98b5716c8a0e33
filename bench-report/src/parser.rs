/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

//! Parser for the benchmark log.
//!
//! The benchmark prints one block per run:
//!
//! ```text
//! TableA size: 100000
//! TableB size: 100000
//! Uniqueness: 0.9
//! ...
//! Execution Time (HashJoin-Then-Aggregation): 12.5 ms
//! Execution Time (GroupJoin): 5.0 ms
//! Speed Up: 2.5
//! ```
//!
//! Any lines between `Uniqueness` and the first execution time are skipped,
//! as is any text between blocks.

use crate::data_point::DataPoint;
use crate::error::{ErrorKind, Result};
use datagen::relation::Uniqueness;
use error_chain::bail;
use log::debug;
use regex::{Captures, Regex};

const BLOCK_HEADER: &str = "TableA size:";

const BLOCK_PATTERN: &str = concat!(
    r"(?s)TableA size:\s*(?P<size_a>\d+)\s*\n",
    r"TableB size:\s*(?P<size_b>\d+)\s*\n",
    r"Uniqueness:\s*(?P<uniqueness>[\d.]+)\s*\n",
    r".*?Execution Time \(HashJoin-Then-Aggregation\):\s*(?P<hashjoin>[\d.eE+\-]+)\s*(?P<hashjoin_unit>ms|s)\s*\n",
    r"Execution Time \(GroupJoin\):\s*(?P<groupjoin>[\d.eE+\-]+)\s*(?P<groupjoin_unit>ms|s)\s*\n",
    r"Speed Up:\s*(?P<speedup>[\d.eE+\-]+)",
);

pub struct LogParser {
    block: Regex,
}

impl LogParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            block: Regex::new(BLOCK_PATTERN)?,
        })
    }

    /// Parses all complete blocks in `content`, in log order.
    ///
    /// Fails if the log contains no complete block.
    pub fn parse(&self, content: &str) -> Result<Vec<DataPoint>> {
        let points = Self::split_blocks(content)
            .filter_map(|block| self.block.captures(block))
            .map(|caps| Self::parse_block(&caps))
            .collect::<Result<Vec<_>>>()?;

        if points.is_empty() {
            bail!(ErrorKind::ParseError(
                "No valid data blocks were found".to_string()
            ));
        }

        debug!("Parsed {} data points", points.len());
        Ok(points)
    }

    /// Splits the log at each block header.
    ///
    /// Matching each block on its own keeps an incomplete block from
    /// borrowing the execution times of the block after it.
    fn split_blocks(content: &str) -> impl Iterator<Item = &str> {
        let starts: Vec<usize> = content
            .match_indices(BLOCK_HEADER)
            .map(|(start, _)| start)
            .collect();
        let ends: Vec<usize> = starts
            .iter()
            .skip(1)
            .copied()
            .chain(std::iter::once(content.len()))
            .collect();

        starts
            .into_iter()
            .zip(ends.into_iter())
            .map(move |(start, end)| &content[start..end])
    }

    fn parse_block(caps: &Captures<'_>) -> Result<DataPoint> {
        let uniqueness = Uniqueness::new(caps["uniqueness"].parse()?)?;

        Ok(DataPoint {
            size_a: caps["size_a"].parse()?,
            size_b: caps["size_b"].parse()?,
            uniqueness: uniqueness.fraction(),
            uniqueness_percent: uniqueness.percent(),
            hashjoin_s: to_secs(caps["hashjoin"].parse()?, &caps["hashjoin_unit"]),
            groupjoin_s: to_secs(caps["groupjoin"].parse()?, &caps["groupjoin_unit"]),
            speedup: caps["speedup"].parse()?,
        })
    }
}

fn to_secs(time: f64, unit: &str) -> f64 {
    match unit {
        "ms" => time / 1000.0,
        _ => time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BLOCKS: &str = "\
TableA size: 1000
TableB size: 10000
Uniqueness: 0.9
Loading tables...
Execution Time (HashJoin-Then-Aggregation): 1.5 s
Execution Time (GroupJoin): 0.5 s
Speed Up: 3
------
TableA size: 2000
TableB size: 2000
Uniqueness: 0.1
Execution Time (HashJoin-Then-Aggregation): 120 ms
Execution Time (GroupJoin): 60 ms
Speed Up: 2
";

    #[test]
    fn parses_blocks_in_order() {
        let points = LogParser::new().unwrap().parse(TWO_BLOCKS).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].size_a, 1000);
        assert_eq!(points[0].size_b, 10000);
        assert_eq!(points[0].uniqueness, 0.9);
        assert_eq!(points[0].hashjoin_s, 1.5);
        assert_eq!(points[0].groupjoin_s, 0.5);
        assert_eq!(points[0].speedup, 3.0);
        assert_eq!(points[1].size_a, 2000);
    }

    #[test]
    fn normalizes_milliseconds() {
        let points = LogParser::new().unwrap().parse(TWO_BLOCKS).unwrap();

        assert!((points[1].hashjoin_s - 0.12).abs() < 1e-12);
        assert!((points[1].groupjoin_s - 0.06).abs() < 1e-12);
    }

    #[test]
    fn parses_scientific_notation() {
        let log = "TableA size: 10\nTableB size: 10\nUniqueness: 1.0\n\
                   Execution Time (HashJoin-Then-Aggregation): 2.5e-05 s\n\
                   Execution Time (GroupJoin): 1e-05 s\n\
                   Speed Up: 2.5\n";
        let points = LogParser::new().unwrap().parse(log).unwrap();

        assert_eq!(points.len(), 1);
        assert!((points[0].hashjoin_s - 2.5e-5).abs() < 1e-15);
    }

    #[test]
    fn skips_incomplete_blocks() {
        let log = "TableA size: 10\nTableB size: 10\nUniqueness: 0.5\nFatal Error:\n";
        let result = LogParser::new().unwrap().parse(log);

        match result {
            Err(crate::error::Error(ErrorKind::ParseError(_), _)) => {}
            other => panic!("Expected ParseError, got {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn incomplete_block_does_not_merge_with_next() {
        let log = "TableA size: 10\nTableB size: 10\nUniqueness: 0.5\nFatal Error:\n\
                   TableA size: 20\nTableB size: 30\nUniqueness: 0.25\n\
                   Execution Time (HashJoin-Then-Aggregation): 4 s\n\
                   Execution Time (GroupJoin): 2 s\n\
                   Speed Up: 2\n";
        let points = LogParser::new().unwrap().parse(log).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].size_a, 20);
        assert_eq!(points[0].size_b, 30);
        assert_eq!(points[0].uniqueness, 0.25);
    }

    #[test]
    fn rejects_uniqueness_above_one() {
        let log = "TableA size: 10\nTableB size: 10\nUniqueness: 90\n\
                   Execution Time (HashJoin-Then-Aggregation): 2 s\n\
                   Execution Time (GroupJoin): 1 s\n\
                   Speed Up: 2\n";

        assert!(LogParser::new().unwrap().parse(log).is_err());
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let log = TWO_BLOCKS.replace('\n', "\r\n");
        let points = LogParser::new().unwrap().parse(&log).unwrap();

        assert_eq!(points.len(), 2);
    }
}
