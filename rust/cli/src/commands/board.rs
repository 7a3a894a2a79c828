//! `popcorn board`: deal a memory board face up.
//!
//! The same seed and pair count always give the same layout, which makes
//! this the quickest way to inspect what a seeded web session will deal.

use super::load_config;
use crate::error::CliError;
use crate::formatters::format_board;
use crate::validation::validate_pairs;
use popcorn_engine::memory::{MatchConfig, MatchSession};
use std::io::Write;
use std::time::Instant;

/// Cards per printed row.
const BOARD_COLUMNS: usize = 7;

pub fn handle_board_command(
    seed: Option<u64>,
    pairs: Option<usize>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config = load_config()?;
    let pairs = pairs.unwrap_or(config.memory_pairs);
    validate_pairs(pairs)?;
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);

    let match_config = MatchConfig {
        pair_count: pairs,
        ..MatchConfig::classic()
    };
    let session = MatchSession::new(match_config, Some(seed), Instant::now());

    writeln!(out, "board: pairs={} seed={}", pairs, seed)?;
    writeln!(out, "{}", format_board(session.board(), BOARD_COLUMNS))?;
    Ok(())
}
