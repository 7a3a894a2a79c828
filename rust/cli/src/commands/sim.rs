//! `popcorn sim`: tier distribution of many single draws.
//!
//! Without a pool directory the simulation runs against a pool holding one
//! card per tier, so the report reflects the raw draw weights. With a real
//! pool, tiers that hold no cards are re-rolled and the expected shares are
//! renormalised over the tiers that do.

use super::{load_config, open_pool};
use crate::error::CliError;
use crate::validation::validate_draws;
use popcorn_engine::cards::Rarity;
use popcorn_engine::gacha::{Drawer, STANDARD_WEIGHTS};
use popcorn_engine::pool::CardPool;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SimReport {
    pool: String,
    draws: u32,
    seed: u64,
    generated_at: String,
    tiers: Vec<TierShare>,
}

#[derive(Debug, Serialize)]
struct TierShare {
    rarity: Rarity,
    count: u32,
    share: f64,
    expected: f64,
}

pub fn handle_sim_command(
    draws: u32,
    seed: Option<u64>,
    pool_dir: Option<String>,
    pool: Option<String>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    validate_draws(draws)?;
    let config = load_config()?;
    let pool = if pool_dir.is_some() || pool.is_some() || config.pool_dir.is_some() {
        open_pool(pool_dir, pool, &config)?
    } else {
        weight_pool()
    };
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);

    let mut drawer = Drawer::new(Some(seed));
    let mut counts: HashMap<Rarity, u32> = HashMap::new();
    for _ in 0..draws {
        let card = drawer.draw_one(&pool)?;
        if let Some(rarity) = pool.rarity_of(&card) {
            *counts.entry(rarity).or_insert(0) += 1;
        }
    }

    let stocked_weight: u32 = STANDARD_WEIGHTS
        .iter()
        .filter(|(r, _)| !pool.cards(*r).is_empty())
        .map(|(_, w)| w)
        .sum();
    let tiers = Rarity::RAREST_FIRST
        .iter()
        .map(|&rarity| {
            let count = counts.get(&rarity).copied().unwrap_or(0);
            let weight = STANDARD_WEIGHTS
                .iter()
                .find(|(r, _)| *r == rarity)
                .map(|(_, w)| *w)
                .unwrap_or(0);
            let expected = if pool.cards(rarity).is_empty() || stocked_weight == 0 {
                0.0
            } else {
                weight as f64 / stocked_weight as f64
            };
            TierShare {
                rarity,
                count,
                share: count as f64 / draws as f64,
                expected,
            }
        })
        .collect();

    let report = SimReport {
        pool: pool.name.clone(),
        draws,
        seed,
        generated_at: chrono::Utc::now().to_rfc3339(),
        tiers,
    };
    let json_str = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

/// One card per tier: draws land on tiers exactly as the weights say.
fn weight_pool() -> CardPool {
    Rarity::ALL
        .iter()
        .fold(CardPool::new("weights"), |pool, &rarity| {
            pool.with_tier(rarity, [rarity.as_str()])
        })
}
