//! Timed memory-pairing game.
//!
//! Mismatched pairs stay face up until the player's next selection, which
//! turns them back over before the new card is revealed. Matched pairs are
//! locked in as soon as the second card is shown. The timer is polled: every
//! call to [`MatchSession::tick`] (and every selection) re-evaluates expiry,
//! so the game ends at or after the deadline, never before.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::cards::{paired_faces, CardId, MEMORY_FACES};
use crate::deck::seeded_rng;
use crate::errors::GameError;
use crate::ledger::Ledger;
use crate::settlement::Settlement;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Playing,
    GameOver,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Playing => "playing",
            MatchStage::GameOver => "game_over",
        }
    }
}

/// Board size and timer for one memory game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub pair_count: usize,
    pub time_limit_secs: u64,
}

impl MatchConfig {
    /// Full 42-card board against a 60 second clock.
    pub fn classic() -> Self {
        Self {
            pair_count: MEMORY_FACES.len(),
            time_limit_secs: 60,
        }
    }

    pub fn relaxed() -> Self {
        Self {
            time_limit_secs: 90,
            ..Self::classic()
        }
    }

    pub fn marathon() -> Self {
        Self {
            time_limit_secs: 120,
            ..Self::classic()
        }
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// What a single selection did to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SelectOutcome {
    /// First card of a pair turned face up.
    Flipped { index: usize },
    /// Second card matched the first; both are locked.
    Matched { first: usize, second: usize },
    /// Second card differs; both stay up until the next selection.
    Mismatched { first: usize, second: usize },
    /// Position was already face up or matched.
    Ignored { index: usize },
}

#[derive(Debug, Clone)]
pub struct MatchSession {
    board: Vec<CardId>,
    status: Vec<CardStatus>,
    /// Face-up positions not yet resolved (0, 1 or 2 entries).
    flipped: Vec<usize>,
    matched_count: usize,
    total_pairs: usize,
    started_at: Instant,
    time_limit: Duration,
    stage: MatchStage,
    reward_claimed: bool,
}

impl MatchSession {
    /// Deals a shuffled board of `config.pair_count` pairs (capped to the
    /// available faces) and starts the clock at `now`.
    pub fn new(config: MatchConfig, seed: Option<u64>, now: Instant) -> Self {
        let pairs = config.pair_count.clamp(1, MEMORY_FACES.len());
        let mut board = paired_faces(&MEMORY_FACES[..pairs]);
        let mut rng = seeded_rng(seed);
        board.shuffle(&mut rng);
        Self::start(board, config.time_limit(), now)
    }

    /// Starts a game on a fixed board layout. The board must hold a
    /// positive, even number of cards.
    pub fn with_board(
        board: Vec<CardId>,
        time_limit: Duration,
        now: Instant,
    ) -> Result<Self, GameError> {
        if board.is_empty() || board.len() % 2 != 0 {
            return Err(GameError::InvalidBoard(board.len()));
        }
        Ok(Self::start(board, time_limit, now))
    }

    fn start(board: Vec<CardId>, time_limit: Duration, now: Instant) -> Self {
        let len = board.len();
        Self {
            board,
            status: vec![CardStatus::Hidden; len],
            flipped: Vec::with_capacity(2),
            matched_count: 0,
            total_pairs: len / 2,
            started_at: now,
            time_limit,
            stage: MatchStage::Playing,
            reward_claimed: false,
        }
    }

    pub fn board(&self) -> &[CardId] {
        &self.board
    }

    pub fn status(&self) -> &[CardStatus] {
        &self.status
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    pub fn stage(&self) -> MatchStage {
        self.stage
    }

    pub fn is_over(&self) -> bool {
        self.stage == MatchStage::GameOver
    }

    pub fn reward_claimed(&self) -> bool {
        self.reward_claimed
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Re-evaluates the clock and returns the time left.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let remaining = self.remaining(now);
        if remaining.is_zero() && self.stage == MatchStage::Playing {
            self.stage = MatchStage::GameOver;
        }
        remaining
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started_at);
        self.time_limit.saturating_sub(elapsed)
    }

    pub fn select(&mut self, index: usize, now: Instant) -> Result<SelectOutcome, GameError> {
        self.tick(now);
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if index >= self.board.len() {
            return Err(GameError::PositionOutOfRange {
                index,
                len: self.board.len(),
            });
        }
        if self.status[index] != CardStatus::Hidden {
            return Ok(SelectOutcome::Ignored { index });
        }

        if self.flipped.len() == 2 {
            self.resolve_pending();
        }
        debug_assert!(self.flipped.len() < 2, "flipped set overflow");

        self.status[index] = CardStatus::Flipped;
        self.flipped.push(index);

        let [first, second] = match self.flipped[..] {
            [first, second] => [first, second],
            _ => return Ok(SelectOutcome::Flipped { index }),
        };

        if self.board[first].same_face(&self.board[second]) {
            self.status[first] = CardStatus::Matched;
            self.status[second] = CardStatus::Matched;
            self.matched_count += 1;
            self.flipped.clear();
            if self.matched_count == self.total_pairs {
                self.stage = MatchStage::GameOver;
            }
            Ok(SelectOutcome::Matched { first, second })
        } else {
            Ok(SelectOutcome::Mismatched { first, second })
        }
    }

    /// Turns an unresolved mismatched pair face down again.
    fn resolve_pending(&mut self) {
        for idx in self.flipped.drain(..) {
            if self.status[idx] == CardStatus::Flipped {
                self.status[idx] = CardStatus::Hidden;
            }
        }
    }

    /// Credits one unit per matched pair, once per game.
    ///
    /// The claim flag is only set after the ledger accepts the credit, so a
    /// failed call can be retried.
    pub fn settle_reward(&mut self, ledger: &dyn Ledger, user: &str) -> Result<Settlement, GameError> {
        if !self.is_over() {
            return Err(GameError::WrongStage {
                action: "settle",
                stage: self.stage.as_str(),
            });
        }
        if self.reward_claimed {
            return Ok(Settlement::AlreadySettled);
        }
        let delta = self.matched_count as i64;
        let balance = if delta == 0 {
            None
        } else {
            Some(ledger.adjust(user, delta)?)
        };
        self.reward_claimed = true;
        Ok(Settlement::Applied { delta, balance })
    }

    pub fn snapshot(&self, now: Instant) -> MatchSnapshot {
        let cards = self
            .board
            .iter()
            .zip(&self.status)
            .enumerate()
            .map(|(index, (card, status))| CardView {
                index,
                status: *status,
                face: match status {
                    CardStatus::Hidden => None,
                    _ => Some(card.clone()),
                },
            })
            .collect();
        MatchSnapshot {
            stage: self.stage,
            cards,
            matched_count: self.matched_count,
            total_pairs: self.total_pairs,
            remaining_secs: self.remaining(now).as_secs(),
            reward_claimed: self.reward_claimed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub index: usize,
    pub status: CardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<CardId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub stage: MatchStage,
    pub cards: Vec<CardView>,
    pub matched_count: usize,
    pub total_pairs: usize,
    pub remaining_secs: u64,
    pub reward_claimed: bool,
}
