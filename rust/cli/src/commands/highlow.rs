//! # High-Low Command
//!
//! Interactive high-low rounds read from stdin. Each round stakes part of a
//! scratch balance, picks one of the face-down cards, then calls whether it
//! is bigger or smaller than the computer's card. Nothing is persisted; the
//! balance lives in an in-memory ledger for the length of the command.
//!
//! Typing `q` (or closing stdin) at any prompt ends the session. Quitting
//! before the call costs nothing; once both cards are shown the round is
//! settled before the next prompt.

use super::load_config;
use crate::error::CliError;
use crate::formatters::{format_direction, format_outcome, format_slots};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{
    ParseResult, parse_bet, parse_direction, parse_play_again, parse_slot,
};
use popcorn_engine::ledger::{InMemoryLedger, Ledger};
use popcorn_engine::settlement::Settlement;
use popcorn_engine::wager::WagerSession;
use std::io::{BufRead, Write};

const PLAYER: &str = "player";

pub fn handle_highlow_command(
    seed: Option<u64>,
    balance: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let config = load_config()?;
    let balance = balance.unwrap_or(config.starting_balance);
    if balance == 0 {
        return Err(CliError::InvalidInput("balance must be >= 1".to_string()));
    }
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);

    let ledger = InMemoryLedger::new();
    ledger.open_account_with_balance(PLAYER, "Player", balance)?;
    let mut round = WagerSession::new(Some(seed));

    writeln!(out, "highlow: seed={} balance={}", seed, balance)?;

    let mut rounds = 0u32;
    loop {
        let balance = ledger.balance(PLAYER)?;
        if balance == 0 {
            writeln!(out, "Out of popcorn.")?;
            break;
        }

        let bet_prompt = format!("Bet (1-{}, q to quit): ", balance);
        let Some(bet) = prompt_until(out, err, stdin, &bet_prompt, |s| parse_bet(s, balance))?
        else {
            break;
        };
        round.place_bet(bet, balance)?;

        let remaining = round.deck().remaining();
        writeln!(out, "Cards: {}", format_slots(remaining))?;
        let slot_prompt = format!("Pick a card (0-{}): ", remaining.saturating_sub(1));
        let Some(slot) =
            prompt_until(out, err, stdin, &slot_prompt, |s| parse_slot(s, remaining))?
        else {
            break;
        };
        let (player, computer) = round.choose_card(slot)?;
        writeln!(out, "Your card: {}", player)?;

        let Some(direction) =
            prompt_until(out, err, stdin, "Bigger or smaller? (b/s): ", parse_direction)?
        else {
            break;
        };
        let outcome = round.guess(direction)?;
        writeln!(
            out,
            "You called {}. Computer card: {}. Result: {}",
            format_direction(direction),
            computer,
            format_outcome(outcome)
        )?;

        match round.settle(&ledger, PLAYER)? {
            Settlement::Applied {
                delta,
                balance: Some(balance),
            } => writeln!(out, "Balance: {} ({:+})", balance, delta)?,
            Settlement::Applied { balance: None, .. } => {
                writeln!(out, "Balance: {} (+0)", ledger.balance(PLAYER)?)?
            }
            Settlement::AlreadySettled => {}
        }
        rounds += 1;

        if ledger.balance(PLAYER)? == 0 {
            writeln!(out, "Out of popcorn.")?;
            break;
        }
        match prompt_until(out, err, stdin, "Play again? (y/n): ", parse_play_again)? {
            Some(true) => round.reset(),
            _ => break,
        }
    }

    writeln!(out, "Rounds played: {}", rounds)?;
    writeln!(out, "Final balance: {}", ledger.balance(PLAYER)?)?;
    Ok(())
}

/// Re-prompts on invalid input; `None` when the player quits or input ends.
fn prompt_until<T>(
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
    message: &str,
    parse: impl Fn(&str) -> ParseResult<T>,
) -> Result<Option<T>, CliError> {
    loop {
        ui::prompt(out, message)?;
        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            return Ok(None);
        };
        match parse(&line) {
            ParseResult::Value(value) => return Ok(Some(value)),
            ParseResult::Quit => return Ok(None),
            ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
        }
    }
}
