use thiserror::Error;

use crate::ledger::LedgerError;

/// Coarse classification used by presentation layers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected action; state is unchanged.
    InvalidAction,
    /// Balance store failed; the operation may be retried.
    LedgerFailure,
    /// Card pool or tier setup is unusable; retrying will not help.
    Configuration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Action {action} is not allowed during {stage}")]
    WrongStage {
        action: &'static str,
        stage: &'static str,
    },
    #[error("Position {index} is out of range (board has {len} cards)")]
    PositionOutOfRange { index: usize, len: usize },
    #[error("Slot {slot} is out of range ({remaining} cards left)")]
    SlotOutOfRange { slot: usize, remaining: usize },
    #[error("Invalid bet amount: {amount}, balance: {balance}")]
    InvalidBetAmount { amount: u64, balance: u64 },
    #[error("Insufficient balance: need {needed}, have {balance}")]
    InsufficientBalance { needed: u64, balance: u64 },
    #[error("Unsupported draw count: {0}")]
    UnsupportedDrawCount(u32),
    #[error("Game is over")]
    GameOver,
    #[error("No game in progress")]
    NoGameInProgress,
    #[error("No card pool selected")]
    NoPoolSelected,
    #[error("Ledger failure: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Card pool {0} has no cards")]
    EmptyPool(String),
    #[error("Unknown card pool: {0}")]
    UnknownPool(String),
    #[error("A memory board needs a positive even number of cards, got {0}")]
    InvalidBoard(usize),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Ledger(LedgerError::InsufficientFunds { .. }) => ErrorKind::InvalidAction,
            GameError::Ledger(_) => ErrorKind::LedgerFailure,
            GameError::EmptyPool(_) | GameError::UnknownPool(_) | GameError::InvalidBoard(_) => {
                ErrorKind::Configuration
            }
            _ => ErrorKind::InvalidAction,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::LedgerFailure
    }
}
