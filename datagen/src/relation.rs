/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright 2019 German Research Center for Artificial Intelligence (DFKI)
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

//! Data set generators for generating database relations.
//!
//! The generators fill relation attributes following a random distribution.
//! All generators take the random source as an argument. Seeding that source
//! makes the generated relations reproducible.

use num_traits::FromPrimitive;

use crate::error::{ErrorKind, Result};

use serde::ser::Serialize;

use std::collections::HashSet;
use std::convert::TryFrom;
use std::ops::RangeInclusive;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use rayon::prelude::*;

/// Number of attribute values filled by one task of the parallel generators.
const PAR_CHUNK_LEN: usize = 1 << 16;

pub trait KeyAttribute: Copy + Default + Send + Sync + Serialize + FromPrimitive {
    fn try_from_usize(x: usize) -> Result<Self>;

    /// Draws a value uniformly from the full range of the type.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl KeyAttribute for i32 {
    fn try_from_usize(x: usize) -> Result<Self> {
        Self::try_from(x).map_err(|_| {
            ErrorKind::IntegerOverflow(format!("Failed to convert {} from usize to i32", x)).into()
        })
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen()
    }
}

impl KeyAttribute for i64 {
    fn try_from_usize(x: usize) -> Result<Self> {
        Self::try_from(x).map_err(|_| {
            ErrorKind::IntegerOverflow(format!("Failed to convert {} from usize to i64", x)).into()
        })
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen()
    }
}

/// Fraction of a relation's rows that carry a key drawn without repeats.
///
/// Guaranteed to lie within `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Uniqueness(f64);

impl Uniqueness {
    pub fn new(fraction: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(ErrorKind::InvalidArgument(format!(
                "Uniqueness must be between 0.0 and 1.0, but is {}",
                fraction
            ))
            .into())
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }

    /// Number of distinct keys in a relation with `rows` tuples.
    ///
    /// Computes `floor(rows * fraction)`. A non-empty relation always has at
    /// least one key, even at 0% uniqueness.
    pub fn unique_keys(&self, rows: usize) -> usize {
        if rows == 0 {
            return 0;
        }

        let unique = (rows as f64 * self.0).floor() as usize;
        unique.max(1).min(rows)
    }
}

impl TryFrom<f64> for Uniqueness {
    type Error = crate::error::Error;

    fn try_from(fraction: f64) -> Result<Self> {
        Self::new(fraction)
    }
}

/// Generator for relations with a controlled fraction of unique keys.
pub struct UniquenessRelation;

impl UniquenessRelation {
    /// The range from which keys of a relation with `rows` tuples are drawn.
    ///
    /// Both bounds are inclusive.
    pub fn key_range(rows: usize) -> Result<RangeInclusive<usize>> {
        let max = rows.checked_mul(2).ok_or_else(|| {
            ErrorKind::IntegerOverflow(format!("Key range of {} rows exceeds usize", rows))
        })?;
        Ok(0..=max)
    }

    /// Generates the pool of distinct keys.
    ///
    /// Keys are sampled from `range` until the pool contains `unique_keys`
    /// distinct values. The pool retains the sampling order.
    pub fn gen_key_pool<R: Rng + ?Sized>(
        unique_keys: usize,
        range: RangeInclusive<usize>,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let range_len = range.end().saturating_sub(*range.start()).saturating_add(1);
        if unique_keys > range_len {
            return Err(ErrorKind::InvalidArgument(format!(
                "Cannot draw {} distinct keys from a range of {} keys",
                unique_keys, range_len
            ))
            .into());
        }

        let between = Uniform::from(range);
        let mut seen = HashSet::with_capacity(unique_keys);
        let mut pool = Vec::with_capacity(unique_keys);

        while pool.len() < unique_keys {
            let key = between.sample(rng);
            if seen.insert(key) {
                pool.push(key);
            }
        }

        Ok(pool)
    }

    /// Generates a key attribute with the given uniqueness.
    ///
    /// The attribute contains exactly `uniqueness.unique_keys(attr.len())`
    /// distinct keys, sampled from `key_range(attr.len())`. The remaining
    /// tuples repeat keys drawn with replacement from the distinct keys. Keys
    /// are placed at random locations within the slice.
    pub fn gen_attr<T: KeyAttribute, R: Rng + ?Sized>(
        attr: &mut [T],
        uniqueness: Uniqueness,
        rng: &mut R,
    ) -> Result<()> {
        if attr.is_empty() {
            return Ok(());
        }

        let range = Self::key_range(attr.len())?;
        T::try_from_usize(*range.end())?;

        let pool = Self::gen_key_pool(uniqueness.unique_keys(attr.len()), range, rng)?;
        let pick = Uniform::from(0..pool.len());
        let duplicates: Vec<usize> = (pool.len()..attr.len())
            .map(|_| pool[pick.sample(rng)])
            .collect();

        attr.iter_mut()
            .zip(pool.iter().chain(duplicates.iter()))
            .map(|(x, &key)| T::try_from_usize(key).map(|key| *x = key))
            .collect::<Result<()>>()?;

        attr.shuffle(rng);
        Ok(())
    }
}

/// Generator for relations that draw their keys from one shared pool.
///
/// Relations generated from the same pool share keys, and thus produce join
/// results.
pub struct SharedPoolRelation;

impl SharedPoolRelation {
    /// Size of the shared pool for two relations.
    ///
    /// The pool holds one key per 20 tuples of both relations combined, and
    /// at least one key.
    pub fn pool_len(inner_len: usize, outer_len: usize) -> usize {
        (inner_len.saturating_add(outer_len) / 20).max(1)
    }

    /// The range from which pool keys are drawn. Both bounds are inclusive.
    pub fn key_range(pool_len: usize) -> Result<RangeInclusive<usize>> {
        let max = pool_len.checked_mul(5).ok_or_else(|| {
            ErrorKind::IntegerOverflow(format!("Key range of pool {} exceeds usize", pool_len))
        })?;
        Ok(0..=max)
    }

    /// Generates the shared pool.
    ///
    /// Keys are sampled with replacement, so the pool may contain duplicates.
    pub fn gen_key_pool<T: KeyAttribute, R: Rng + ?Sized>(
        pool_len: usize,
        rng: &mut R,
    ) -> Result<Vec<T>> {
        let range = Self::key_range(pool_len)?;
        T::try_from_usize(*range.end())?;

        let between = Uniform::from(range);
        (0..pool_len)
            .map(|_| T::try_from_usize(between.sample(rng)))
            .collect()
    }

    /// Generates a key attribute by sampling `pool` with replacement.
    pub fn gen_attr<T: Copy, R: Rng + ?Sized>(
        attr: &mut [T],
        pool: &[T],
        rng: &mut R,
    ) -> Result<()> {
        if attr.is_empty() {
            return Ok(());
        }

        if pool.is_empty() {
            return Err(ErrorKind::InvalidArgument(
                "Cannot sample keys from an empty pool".to_string(),
            )
            .into());
        }

        let pick = Uniform::from(0..pool.len());
        attr.iter_mut().for_each(|x| *x = pool[pick.sample(rng)]);

        Ok(())
    }
}

/// Generator for relations with uniform distribution.
pub struct UniformRelation;

impl UniformRelation {
    /// Generates a uniformly distributed attribute.
    ///
    /// The generated values are sampled from `range`.
    pub fn gen_attr<T: FromPrimitive, R: Rng + ?Sized>(
        attr: &mut [T],
        range: RangeInclusive<usize>,
        rng: &mut R,
    ) -> Result<()> {
        let between = Uniform::from(range);

        attr.iter_mut()
            .by_ref()
            .map(|x| {
                FromPrimitive::from_usize(between.sample(rng))
                    .ok_or_else(|| {
                        ErrorKind::IntegerOverflow("Failed to convert from usize".to_string())
                            .into()
                    })
                    .map(|r| *x = r)
            })
            .collect::<Result<()>>()?;

        Ok(())
    }

    /// Generates a uniformly distributed attribute in parallel.
    ///
    /// The generated values are sampled from `range`. Each chunk of the
    /// attribute is filled by its own generator, which is seeded from `rng`.
    pub fn gen_attr_par<T: FromPrimitive + Send, R: Rng + ?Sized>(
        attr: &mut [T],
        range: RangeInclusive<usize>,
        rng: &mut R,
    ) -> Result<()> {
        let seeds = Self::chunk_seeds(attr.len(), rng);

        attr.par_chunks_mut(PAR_CHUNK_LEN)
            .zip_eq(seeds.into_par_iter())
            .map(|(chunk, seed)| {
                let mut chunk_rng = StdRng::seed_from_u64(seed);
                Self::gen_attr(chunk, range.clone(), &mut chunk_rng)
            })
            .collect::<Result<()>>()?;

        Ok(())
    }

    /// Generates an attribute with values drawn from the full range of `T`
    /// in parallel.
    pub fn gen_full_range_par<T: KeyAttribute, R: Rng + ?Sized>(attr: &mut [T], rng: &mut R) {
        let seeds = Self::chunk_seeds(attr.len(), rng);

        attr.par_chunks_mut(PAR_CHUNK_LEN)
            .zip_eq(seeds.into_par_iter())
            .for_each(|(chunk, seed)| {
                let mut chunk_rng = StdRng::seed_from_u64(seed);
                chunk.iter_mut().for_each(|x| *x = T::random(&mut chunk_rng));
            });
    }

    fn chunk_seeds<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<u64> {
        let chunks = (len + PAR_CHUNK_LEN - 1) / PAR_CHUNK_LEN;
        (0..chunks).map(|_| rng.gen()).collect()
    }
}
