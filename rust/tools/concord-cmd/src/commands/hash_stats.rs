//! Hash-stats command implementation

use std::time::Instant;

use anyhow::{Context, Result};
use concord_io::MemoryBudget;
use concord_perfect_hash::{HasherParams, PerfectHasher, best_compression, check_perfect_hasher};
use concord_text_index::{IndexOptions, MetaIndex};
use serde::Serialize;

use crate::utils::validate_file_exists;

#[derive(Serialize)]
struct HashStats {
    key_count: usize,
    lam: f64,
    load: f64,
    outer_table_size: u64,
    final_table_size: u64,
    max_seed: u32,
    clashes: usize,
    seed_bit_width: u32,
    seed_array_bits: u64,
    bits_per_key: f64,
    build_millis: u128,
}

pub fn run(lam: f64, load: f64, index_path: String) -> Result<()> {
    validate_file_exists(&index_path)?;
    let options = IndexOptions::default();
    let meta = MetaIndex::build(
        &index_path,
        MemoryBudget::new(options.memory_budget_bytes),
        options.scan_fraction,
    )
    .with_context(|| format!("Failed to scan index {index_path}"))?;
    let keys = meta
        .entries()
        .into_iter()
        .map(|(key, _)| key)
        .collect::<Vec<_>>();

    let params = HasherParams::new(lam, load);
    let started = Instant::now();
    let hasher = PerfectHasher::build(&keys, &params)
        .with_context(|| format!("Perfect hash construction failed for {} keys", keys.len()))?;
    let build_millis = started.elapsed().as_millis();

    let estimate = best_compression(&hasher);
    let stats = HashStats {
        key_count: hasher.n(),
        lam,
        load,
        outer_table_size: hasher.r(),
        final_table_size: hasher.m(),
        max_seed: hasher.seeds().iter().copied().max().unwrap_or(0),
        clashes: check_perfect_hasher(&keys, &hasher).len(),
        seed_bit_width: estimate.bit_width,
        seed_array_bits: estimate.total_bits,
        bits_per_key: estimate.bits_per_key,
        build_millis,
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
