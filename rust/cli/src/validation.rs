//! Input parsing and validation for interactive and one-shot commands.
//!
//! Interactive prompts return a [`ParseResult`] so the caller can tell a
//! quit request from a typo that deserves a re-prompt.

use popcorn_engine::cards::MEMORY_FACES;
use popcorn_engine::wager::Direction;

#[derive(Debug, PartialEq)]
pub enum ParseResult<T> {
    Value(T),
    Quit,
    Invalid(String),
}

fn is_quit(input: &str) -> bool {
    matches!(input, "q" | "quit")
}

/// Parses a stake between 1 and `balance`.
pub fn parse_bet(input: &str, balance: u64) -> ParseResult<u64> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return ParseResult::Invalid("Empty input".to_string());
    }
    if is_quit(&input) {
        return ParseResult::Quit;
    }
    match input.parse::<u64>() {
        Ok(0) => ParseResult::Invalid("Bet amount must be positive".to_string()),
        Ok(amount) if amount > balance => ParseResult::Invalid(format!(
            "Bet amount {} exceeds balance {}",
            amount, balance
        )),
        Ok(amount) => ParseResult::Value(amount),
        Err(_) => ParseResult::Invalid(format!("Invalid bet amount '{}'", input)),
    }
}

/// Parses a face-down card slot in `0..remaining`.
pub fn parse_slot(input: &str, remaining: usize) -> ParseResult<usize> {
    let input = input.trim().to_lowercase();
    if is_quit(&input) {
        return ParseResult::Quit;
    }
    match input.parse::<usize>() {
        Ok(slot) if slot < remaining => ParseResult::Value(slot),
        Ok(slot) => ParseResult::Invalid(format!(
            "Slot {} is out of range (0-{})",
            slot,
            remaining.saturating_sub(1)
        )),
        Err(_) => ParseResult::Invalid(format!("Invalid slot '{}'", input)),
    }
}

pub fn parse_direction(input: &str) -> ParseResult<Direction> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "b" | "bigger" | "big" | "high" | "h" => ParseResult::Value(Direction::Bigger),
        "s" | "smaller" | "small" | "low" | "l" => ParseResult::Value(Direction::Smaller),
        other if is_quit(other) => ParseResult::Quit,
        other => ParseResult::Invalid(format!(
            "Unrecognized guess '{}'. Valid guesses: bigger (b), smaller (s), q",
            other
        )),
    }
}

/// `Value(true)` to play another round.
pub fn parse_play_again(input: &str) -> ParseResult<bool> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" | "y" | "yes" => ParseResult::Value(true),
        "n" | "no" => ParseResult::Value(false),
        other if is_quit(other) => ParseResult::Quit,
        other => ParseResult::Invalid(format!("Answer y or n, not '{}'", other)),
    }
}

pub fn validate_pairs(pairs: usize) -> Result<(), String> {
    if pairs == 0 || pairs > MEMORY_FACES.len() {
        return Err(format!(
            "pairs must be between 1 and {}",
            MEMORY_FACES.len()
        ));
    }
    Ok(())
}

pub fn validate_draws(draws: u32) -> Result<(), String> {
    if draws == 0 {
        return Err("draws must be >= 1".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bets_are_bounded_by_balance() {
        assert_eq!(parse_bet("30", 100), ParseResult::Value(30));
        assert_eq!(parse_bet(" 100 ", 100), ParseResult::Value(100));
        assert!(matches!(parse_bet("101", 100), ParseResult::Invalid(_)));
        assert!(matches!(parse_bet("0", 100), ParseResult::Invalid(_)));
        assert!(matches!(parse_bet("lots", 100), ParseResult::Invalid(_)));
        assert_eq!(parse_bet("Q", 100), ParseResult::Quit);
    }

    #[test]
    fn slots_must_be_on_the_table() {
        assert_eq!(parse_slot("6", 7), ParseResult::Value(6));
        assert!(matches!(parse_slot("7", 7), ParseResult::Invalid(_)));
        assert!(matches!(parse_slot("-1", 7), ParseResult::Invalid(_)));
        assert_eq!(parse_slot("quit", 7), ParseResult::Quit);
    }

    #[test]
    fn directions_accept_short_forms() {
        assert_eq!(parse_direction("B"), ParseResult::Value(Direction::Bigger));
        assert_eq!(parse_direction("smaller"), ParseResult::Value(Direction::Smaller));
        assert!(matches!(parse_direction("same"), ParseResult::Invalid(_)));
    }

    #[test]
    fn play_again_defaults_to_yes() {
        assert_eq!(parse_play_again(""), ParseResult::Value(true));
        assert_eq!(parse_play_again("n"), ParseResult::Value(false));
        assert_eq!(parse_play_again("q"), ParseResult::Quit);
    }

    #[test]
    fn pair_and_draw_limits() {
        assert!(validate_pairs(1).is_ok());
        assert!(validate_pairs(21).is_ok());
        assert!(validate_pairs(0).is_err());
        assert!(validate_pairs(22).is_err());
        assert!(validate_draws(0).is_err());
        assert!(validate_draws(1).is_ok());
    }
}
