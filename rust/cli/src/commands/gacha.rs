//! `popcorn gacha`: draw from a pool directory against a scratch ledger.
//!
//! Prints each card with its tier, the cost and remaining balance, then a
//! per-tier collection summary for the cards just drawn. A pool without a
//! card back still draws; the web client falls back to a plain back.

use super::{load_config, open_pool};
use crate::error::CliError;
use crate::formatters::format_draw_line;
use crate::ui;
use popcorn_engine::collection::{CollectionQuery, InMemoryOwnership, OwnershipStore, list_collection};
use popcorn_engine::gacha::Drawer;
use popcorn_engine::ledger::InMemoryLedger;
use std::io::Write;

const PLAYER: &str = "player";

pub fn handle_gacha_command(
    pool_dir: Option<String>,
    pool: Option<String>,
    draws: u32,
    seed: Option<u64>,
    balance: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let config = load_config()?;
    let pool = open_pool(pool_dir, pool, &config)?;
    let balance = balance.unwrap_or(config.starting_balance);
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);
    if pool.card_back.is_none() {
        ui::display_warning(err, &format!("pool {} has no card back image", pool.name))?;
    }

    let ledger = InMemoryLedger::new();
    ledger.open_account_with_balance(PLAYER, "Player", balance)?;
    let ownership = InMemoryOwnership::new();
    let mut drawer = Drawer::new(Some(seed));

    writeln!(
        out,
        "gacha: pool={} draws={} seed={} balance={}",
        pool.name, draws, seed, balance
    )?;
    let result = drawer.perform_draw(draws, &pool, PLAYER, &ledger, &ownership)?;

    for card in &result.cards {
        writeln!(out, "{}", format_draw_line(pool.rarity_of(card), card))?;
    }
    writeln!(out, "Cost: {} Balance: {}", result.cost, result.balance)?;

    let owned = ownership.owned(PLAYER, &pool.name)?;
    let collection = list_collection(&pool, &owned, &CollectionQuery::default());
    writeln!(out, "Collection:")?;
    for tier in &collection.tiers {
        writeln!(
            out,
            "  {:<3} {}/{}",
            tier.rarity.as_str(),
            tier.owned_distinct,
            tier.total_distinct
        )?;
    }
    Ok(())
}
