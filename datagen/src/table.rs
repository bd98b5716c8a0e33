/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright 2019 German Research Center for Artificial Intelligence (DFKI)
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

//! The two tables of the join-aggregation benchmark.
//!
//! Table A holds `(key, value)` tuples and is aggregated by key after the
//! join. Table B holds only keys.

use crate::error::Result;
use crate::relation::{
    KeyAttribute, SharedPoolRelation, UniformRelation, Uniqueness, UniquenessRelation,
};
use crate::writer::TableWriter;

use rand::Rng;
use serde_derive::Serialize;

use std::fmt;
use std::ops::RangeInclusive;

/// The range of the payload values in table A. Both bounds are inclusive.
pub const VALUE_RANGE: RangeInclusive<usize> = 1..=100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableId {
    A,
    B,
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::A => write!(f, "A"),
            TableId::B => write!(f, "B"),
        }
    }
}

/// Specifies how the keys of a table are distributed.
#[derive(Clone, Copy, Debug)]
pub enum KeyDistribution<'p, T> {
    /// Each table gets its own pool with a fraction of unique keys.
    Uniqueness(Uniqueness),

    /// All tables sample their keys from the same pool.
    SharedPool(&'p [T]),

    /// Keys and values are drawn from the full range of the key type.
    Random,
}

impl<'p, T: KeyAttribute> KeyDistribution<'p, T> {
    pub fn gen_keys<R: Rng + ?Sized>(&self, keys: &mut [T], rng: &mut R) -> Result<()> {
        match self {
            KeyDistribution::Uniqueness(uniqueness) => {
                UniquenessRelation::gen_attr(keys, *uniqueness, rng)
            }
            KeyDistribution::SharedPool(pool) => SharedPoolRelation::gen_attr(keys, pool, rng),
            KeyDistribution::Random => {
                UniformRelation::gen_full_range_par(keys, rng);
                Ok(())
            }
        }
    }

    pub fn gen_values<R: Rng + ?Sized>(&self, values: &mut [T], rng: &mut R) -> Result<()> {
        match self {
            KeyDistribution::Random => {
                UniformRelation::gen_full_range_par(values, rng);
                Ok(())
            }
            _ => UniformRelation::gen_attr_par(values, VALUE_RANGE, rng),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordA<T> {
    pub key: T,
    pub value: T,
}

#[derive(Debug, Serialize)]
pub struct RecordB<T> {
    pub key: T,
}

/// A table that is generated and written by a pipeline.
pub trait GeneratedTable: Sized {
    const ID: TableId;

    type Key: KeyAttribute;

    fn generate<R: Rng + ?Sized>(
        len: usize,
        distribution: &KeyDistribution<'_, Self::Key>,
        rng: &mut R,
    ) -> Result<Self>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the tuples in generation order.
    fn write(&self, writer: &mut TableWriter) -> Result<()>;
}

/// Table A with `(key, value)` tuples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableA<T> {
    pub keys: Vec<T>,
    pub values: Vec<T>,
}

impl<T: KeyAttribute> TableA<T> {
    pub fn records<'a>(&'a self) -> impl Iterator<Item = RecordA<T>> + 'a {
        self.keys
            .iter()
            .zip(self.values.iter())
            .map(|(&key, &value)| RecordA { key, value })
    }
}

impl<T: KeyAttribute> GeneratedTable for TableA<T> {
    const ID: TableId = TableId::A;

    type Key = T;

    fn generate<R: Rng + ?Sized>(
        len: usize,
        distribution: &KeyDistribution<'_, T>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut keys = vec![T::default(); len];
        let mut values = vec![T::default(); len];

        distribution.gen_keys(&mut keys, rng)?;
        distribution.gen_values(&mut values, rng)?;

        Ok(Self { keys, values })
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn write(&self, writer: &mut TableWriter) -> Result<()> {
        writer.write_records(self.records())?;
        Ok(())
    }
}

/// Table B with key-only tuples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableB<T> {
    pub keys: Vec<T>,
}

impl<T: KeyAttribute> TableB<T> {
    pub fn records<'a>(&'a self) -> impl Iterator<Item = RecordB<T>> + 'a {
        self.keys.iter().map(|&key| RecordB { key })
    }
}

impl<T: KeyAttribute> GeneratedTable for TableB<T> {
    const ID: TableId = TableId::B;

    type Key = T;

    fn generate<R: Rng + ?Sized>(
        len: usize,
        distribution: &KeyDistribution<'_, T>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut keys = vec![T::default(); len];
        distribution.gen_keys(&mut keys, rng)?;

        Ok(Self { keys })
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn write(&self, writer: &mut TableWriter) -> Result<()> {
        writer.write_records(self.records())?;
        Ok(())
    }
}

/// Generates tables A and B with the given key uniqueness.
///
/// Each table gets its own key pool sized from its own length. The pools are
/// unrelated, i.e., A and B share keys only by chance.
///
/// Fails with `InvalidArgument` if `uniqueness` lies outside `[0.0, 1.0]`.
pub fn generate<T: KeyAttribute, R: Rng + ?Sized>(
    inner_len: usize,
    outer_len: usize,
    uniqueness: f64,
    rng: &mut R,
) -> Result<(TableA<T>, TableB<T>)> {
    let distribution = KeyDistribution::Uniqueness(Uniqueness::new(uniqueness)?);

    let table_a = TableA::generate(inner_len, &distribution, rng)?;
    let table_b = TableB::generate(outer_len, &distribution, rng)?;

    Ok((table_a, table_b))
}
