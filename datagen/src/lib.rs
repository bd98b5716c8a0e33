/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

//! # Data generator for join-aggregation benchmarks
//!
//! `datagen` generates the two input tables of a join followed by a group-by
//! aggregation. Table A holds `(key, value)` tuples, table B holds keys only.
//! The fraction of unique keys per table is configurable, which controls the
//! number of groups and the join fan-out.
//!
//! ```no_run
//! use datagen::pipeline::GeneratorBuilder;
//!
//! # fn main() -> datagen::error::Result<()> {
//! let report = GeneratorBuilder::default()
//!     .inner_len(1000)
//!     .outer_len(10000)
//!     .uniqueness(0.9)
//!     .run::<i32>()?;
//! assert!(report.is_complete());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod relation;
pub mod table;
pub mod writer;
