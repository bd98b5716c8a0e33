/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

use datagen::error::ErrorKind;
use datagen::relation::{
    KeyAttribute, SharedPoolRelation, UniformRelation, Uniqueness, UniquenessRelation,
};
use datagen::table::{self, GeneratedTable, KeyDistribution, TableA, TableB, VALUE_RANGE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::error::Error;
use std::hash::Hash;
use std::result::Result;

fn distinct<T: Copy + Eq + Hash>(keys: &[T]) -> usize {
    keys.iter().copied().collect::<HashSet<_>>().len()
}

fn gen_keys<T: KeyAttribute>(
    len: usize,
    fraction: f64,
    seed: u64,
) -> Result<Vec<T>, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys = vec![T::default(); len];
    UniquenessRelation::gen_attr(&mut keys, Uniqueness::new(fraction)?, &mut rng)?;
    Ok(keys)
}

#[test]
fn uniqueness_rejects_out_of_range_fraction() {
    for &fraction in &[-0.1, 1.000_001, 2.0, std::f64::NAN] {
        let result = Uniqueness::new(fraction);
        match result.as_ref().map_err(|e| e.kind()) {
            Err(ErrorKind::InvalidArgument(_)) => {}
            _ => panic!("Expected InvalidArgument for {}", fraction),
        }
    }
}

#[test]
fn uniqueness_unique_keys_floors_and_clamps() -> Result<(), Box<dyn Error>> {
    assert_eq!(Uniqueness::new(0.9)?.unique_keys(100), 90);
    assert_eq!(Uniqueness::new(0.5)?.unique_keys(7), 3);
    assert_eq!(Uniqueness::new(1.0)?.unique_keys(42), 42);
    assert_eq!(Uniqueness::new(0.0)?.unique_keys(42), 1);
    assert_eq!(Uniqueness::new(0.001)?.unique_keys(10), 1);
    assert_eq!(Uniqueness::new(0.5)?.unique_keys(0), 0);
    Ok(())
}

#[test]
fn full_uniqueness_yields_distinct_keys() -> Result<(), Box<dyn Error>> {
    let keys = gen_keys::<i32>(10_000, 1.0, 1)?;

    assert_eq!(keys.len(), 10_000);
    assert_eq!(distinct(&keys), 10_000);
    Ok(())
}

#[test]
fn zero_uniqueness_yields_single_key() -> Result<(), Box<dyn Error>> {
    let keys = gen_keys::<i32>(1000, 0.0, 2)?;

    assert_eq!(keys.len(), 1000);
    assert_eq!(distinct(&keys), 1);
    Ok(())
}

#[test]
fn distinct_keys_follow_uniqueness() -> Result<(), Box<dyn Error>> {
    for &(len, fraction) in &[(100, 0.9), (1000, 0.25), (999, 0.5), (12_345, 0.75), (3, 0.1)] {
        let keys = gen_keys::<i64>(len, fraction, 3)?;
        let expected = Uniqueness::new(fraction)?.unique_keys(len);

        assert_eq!(keys.len(), len);
        assert_eq!(distinct(&keys), expected, "len {} fraction {}", len, fraction);
    }
    Ok(())
}

#[test]
fn keys_lie_within_twice_the_row_count() -> Result<(), Box<dyn Error>> {
    let len = 5000;
    let keys = gen_keys::<i32>(len, 0.6, 4)?;
    let max = 2 * len as i32;

    assert!(keys.iter().all(|&k| k >= 0 && k <= max));
    Ok(())
}

#[test]
fn empty_attribute_is_a_no_op() -> Result<(), Box<dyn Error>> {
    let keys = gen_keys::<i32>(0, 0.0, 5)?;

    assert!(keys.is_empty());
    Ok(())
}

#[test]
fn same_seed_reproduces_keys() -> Result<(), Box<dyn Error>> {
    let first = gen_keys::<i32>(2000, 0.3, 6)?;
    let second = gen_keys::<i32>(2000, 0.3, 6)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn key_pool_rejects_too_many_distinct_keys() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = UniquenessRelation::gen_key_pool(11, 0..=9, &mut rng);

    assert!(result.is_err());
}

#[test]
fn shared_pool_keys_are_pool_members() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(8);
    let pool_len = SharedPoolRelation::pool_len(1000, 3000);
    assert_eq!(pool_len, 200);

    let pool: Vec<i32> = SharedPoolRelation::gen_key_pool(pool_len, &mut rng)?;
    assert_eq!(pool.len(), pool_len);
    assert!(pool.iter().all(|&k| k >= 0 && k <= 5 * pool_len as i32));

    let mut keys = vec![0_i32; 3000];
    SharedPoolRelation::gen_attr(&mut keys, &pool, &mut rng)?;
    let members: HashSet<_> = pool.iter().copied().collect();
    assert!(keys.iter().all(|k| members.contains(k)));
    Ok(())
}

#[test]
fn shared_pool_has_at_least_one_key() {
    assert_eq!(SharedPoolRelation::pool_len(0, 0), 1);
    assert_eq!(SharedPoolRelation::pool_len(3, 4), 1);
}

#[test]
fn shared_pool_rejects_empty_pool() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut keys = vec![0_i32; 10];

    assert!(SharedPoolRelation::gen_attr(&mut keys, &[], &mut rng).is_err());
}

#[test]
fn uniform_par_values_lie_in_range() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(10);
    let mut values = vec![0_i64; 200_000];
    UniformRelation::gen_attr_par(&mut values, VALUE_RANGE, &mut rng)?;

    assert!(values.iter().all(|&v| v >= 1 && v <= 100));
    assert!(values.contains(&1));
    assert!(values.contains(&100));
    Ok(())
}

#[test]
fn uniform_par_is_reproducible() -> Result<(), Box<dyn Error>> {
    let mut first = vec![0_i32; 150_000];
    let mut second = vec![0_i32; 150_000];
    UniformRelation::gen_attr_par(&mut first, 0..=1000, &mut StdRng::seed_from_u64(11))?;
    UniformRelation::gen_attr_par(&mut second, 0..=1000, &mut StdRng::seed_from_u64(11))?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn i32_key_range_overflow_is_reported() {
    let mut rng = StdRng::seed_from_u64(12);
    let pool_len = std::i32::MAX as usize / 5 + 1;
    let result = SharedPoolRelation::gen_key_pool::<i32, _>(pool_len, &mut rng);

    match result.as_ref().map_err(|e| e.kind()) {
        Err(ErrorKind::IntegerOverflow(_)) => {}
        _ => panic!("Expected IntegerOverflow"),
    }
}

#[test]
fn generate_produces_both_tables() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(13);
    let (table_a, table_b) = table::generate::<i32, _>(100, 100, 0.9, &mut rng)?;

    assert_eq!(table_a.len(), 100);
    assert_eq!(table_a.values.len(), 100);
    assert_eq!(table_b.len(), 100);
    assert_eq!(distinct(&table_a.keys), 90);
    assert_eq!(distinct(&table_b.keys), 90);
    assert!(table_a.values.iter().all(|&v| v >= 1 && v <= 100));
    Ok(())
}

#[test]
fn generate_handles_empty_table() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(14);
    let (table_a, table_b) = table::generate::<i64, _>(0, 50, 0.5, &mut rng)?;

    assert!(table_a.is_empty());
    assert_eq!(table_b.len(), 50);
    assert_eq!(distinct(&table_b.keys), 25);
    Ok(())
}

#[test]
fn generate_rejects_invalid_uniqueness() {
    let mut rng = StdRng::seed_from_u64(15);

    assert!(table::generate::<i32, _>(10, 10, 1.5, &mut rng).is_err());
}

#[test]
fn random_distribution_covers_negative_keys() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(16);
    let distribution: KeyDistribution<'_, i32> = KeyDistribution::Random;
    let table_a = TableA::generate(10_000, &distribution, &mut rng)?;
    let table_b = TableB::generate(10_000, &distribution, &mut rng)?;

    assert!(table_a.keys.iter().any(|&k| k < 0));
    assert!(table_a.values.iter().any(|&v| v > 100));
    assert_eq!(table_b.len(), 10_000);
    Ok(())
}
