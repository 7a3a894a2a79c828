//! Card, board and outcome formatters for terminal display.
//!
//! Pure functions only; commands decide where the text goes.
//!
//! ```rust
//! use popcorn_engine::cards::CardId;
//! use popcorn_cli::formatters::{card_label, format_board};
//!
//! assert_eq!(card_label(&CardId::new("pools/spring/SSR/fox.jpg")), "fox");
//!
//! let board = vec![CardId::new("12-1"), CardId::new("12-2")];
//! assert_eq!(format_board(&board, 7), "12-1 12-2");
//! ```

use popcorn_engine::cards::{CardId, Rarity};
use popcorn_engine::wager::{Direction, Outcome};

/// Short display name for a card: the file stem of asset paths, the id
/// itself otherwise.
pub fn card_label(card: &CardId) -> &str {
    let name = card.as_str().rsplit('/').next().unwrap_or(card.as_str());
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Lays the board out in rows of `columns` cards.
pub fn format_board(board: &[CardId], columns: usize) -> String {
    if board.is_empty() {
        return "[]".to_string();
    }
    board
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|c| format!("{:<4}", c.as_str()))
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `[?]` per face-down slot, numbered from zero.
pub fn format_slots(remaining: usize) -> String {
    (0..remaining)
        .map(|i| format!("[{}]", i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Bigger => "bigger",
        Direction::Smaller => "smaller",
    }
}

pub fn format_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "win",
        Outcome::Lose => "lose",
        Outcome::Tie => "tie",
    }
}

pub fn format_draw_line(rarity: Option<Rarity>, card: &CardId) -> String {
    let tier = rarity.map(|r| r.as_str()).unwrap_or("?");
    format!("{:<3} {}", tier, card_label(card))
}
