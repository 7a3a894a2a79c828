use serde::{Deserialize, Serialize};

use crate::deck::RankDeck;
use crate::errors::GameError;
use crate::ledger::Ledger;
use crate::settlement::Settlement;

/// Stages of a high-low round, in play order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerStage {
    /// Waiting for the stake
    Betting,
    /// Stake placed, player picks a face-down card
    Choosing,
    /// Player card shown, waiting for the call
    Guessing,
    /// Both cards shown, waiting for settlement
    Revealed,
}

impl WagerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagerStage::Betting => "betting",
            WagerStage::Choosing => "choosing",
            WagerStage::Guessing => "guessing",
            WagerStage::Revealed => "revealed",
        }
    }
}

/// The player's call on their own card relative to the computer's.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bigger,
    Smaller,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

/// Decides a round. Equal ranks tie regardless of the call.
///
/// ```
/// use popcorn_engine::wager::{judge, Direction, Outcome};
///
/// assert_eq!(judge(Direction::Bigger, 5, 3), Outcome::Win);
/// assert_eq!(judge(Direction::Smaller, 5, 3), Outcome::Lose);
/// assert_eq!(judge(Direction::Bigger, 4, 4), Outcome::Tie);
/// ```
pub fn judge(direction: Direction, player: u8, computer: u8) -> Outcome {
    if player == computer {
        return Outcome::Tie;
    }
    let player_bigger = player > computer;
    match (direction, player_bigger) {
        (Direction::Bigger, true) | (Direction::Smaller, false) => Outcome::Win,
        _ => Outcome::Lose,
    }
}

#[derive(Debug, Clone)]
pub struct WagerSession {
    stage: WagerStage,
    deck: RankDeck,
    player_card: Option<u8>,
    computer_card: Option<u8>,
    bet_amount: u64,
    outcome: Option<Outcome>,
    result_claimed: bool,
}

impl WagerSession {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_deck(RankDeck::new_with_seed(seed))
    }

    pub fn with_deck(deck: RankDeck) -> Self {
        let mut session = Self {
            stage: WagerStage::Betting,
            deck,
            player_card: None,
            computer_card: None,
            bet_amount: 0,
            outcome: None,
            result_claimed: false,
        };
        session.deck.shuffle();
        session
    }

    pub fn stage(&self) -> WagerStage {
        self.stage
    }

    pub fn player_card(&self) -> Option<u8> {
        self.player_card
    }

    pub fn computer_card(&self) -> Option<u8> {
        self.computer_card
    }

    pub fn bet_amount(&self) -> u64 {
        self.bet_amount
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn result_claimed(&self) -> bool {
        self.result_claimed
    }

    pub fn deck(&self) -> &RankDeck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut RankDeck {
        &mut self.deck
    }

    fn expect_stage(&self, expected: WagerStage, action: &'static str) -> Result<(), GameError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(GameError::WrongStage {
                action,
                stage: self.stage.as_str(),
            })
        }
    }

    /// Stakes `amount` out of `balance`. The ledger is not touched until
    /// settlement.
    pub fn place_bet(&mut self, amount: u64, balance: u64) -> Result<(), GameError> {
        self.expect_stage(WagerStage::Betting, "bet")?;
        if amount == 0 || amount > balance {
            return Err(GameError::InvalidBetAmount { amount, balance });
        }
        self.bet_amount = amount;
        self.deck.shuffle();
        self.stage = WagerStage::Choosing;
        Ok(())
    }

    /// Takes the card at `slot` for the player and deals the computer a
    /// different card from what is left. Returns `(player, computer)`.
    pub fn choose_card(&mut self, slot: usize) -> Result<(u8, u8), GameError> {
        self.expect_stage(WagerStage::Choosing, "choose")?;
        let remaining = self.deck.remaining();
        if slot >= remaining || remaining < 2 {
            return Err(GameError::SlotOutOfRange { slot, remaining });
        }
        let player = self
            .deck
            .take(slot)
            .ok_or(GameError::SlotOutOfRange { slot, remaining })?;
        let computer = self
            .deck
            .draw_random()
            .ok_or(GameError::SlotOutOfRange { slot, remaining })?;
        self.player_card = Some(player);
        self.computer_card = Some(computer);
        self.stage = WagerStage::Guessing;
        Ok((player, computer))
    }

    pub fn guess(&mut self, direction: Direction) -> Result<Outcome, GameError> {
        self.expect_stage(WagerStage::Guessing, "guess")?;
        let (player, computer) = match (self.player_card, self.computer_card) {
            (Some(p), Some(c)) => (p, c),
            _ => {
                return Err(GameError::WrongStage {
                    action: "guess",
                    stage: self.stage.as_str(),
                })
            }
        };
        let outcome = judge(direction, player, computer);
        self.outcome = Some(outcome);
        self.stage = WagerStage::Revealed;
        Ok(outcome)
    }

    /// Ledger movement for the revealed outcome.
    pub fn payout(&self) -> Option<i64> {
        let bet = self.bet_amount as i64;
        self.outcome.map(|o| match o {
            Outcome::Win => bet,
            Outcome::Lose => -bet,
            Outcome::Tie => 0,
        })
    }

    /// Applies the revealed outcome at most once; a failed ledger call
    /// leaves the round unsettled.
    pub fn settle(&mut self, ledger: &dyn Ledger, user: &str) -> Result<Settlement, GameError> {
        self.expect_stage(WagerStage::Revealed, "settle")?;
        if self.result_claimed {
            return Ok(Settlement::AlreadySettled);
        }
        let delta = self.payout().unwrap_or(0);
        let balance = if delta == 0 {
            None
        } else {
            Some(ledger.adjust(user, delta)?)
        };
        self.result_claimed = true;
        Ok(Settlement::Applied { delta, balance })
    }

    /// Starts a new round with a freshly shuffled deck.
    pub fn reset(&mut self) {
        self.stage = WagerStage::Betting;
        self.player_card = None;
        self.computer_card = None;
        self.bet_amount = 0;
        self.outcome = None;
        self.result_claimed = false;
        self.deck.shuffle();
    }

    pub fn snapshot(&self) -> WagerSnapshot {
        let revealed = self.stage == WagerStage::Revealed;
        WagerSnapshot {
            stage: self.stage,
            bet_amount: self.bet_amount,
            slots: match self.stage {
                WagerStage::Choosing => self.deck.remaining(),
                _ => 0,
            },
            player_card: self.player_card,
            computer_card: if revealed { self.computer_card } else { None },
            outcome: self.outcome,
            result_claimed: self.result_claimed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerSnapshot {
    pub stage: WagerStage,
    pub bet_amount: u64,
    /// Face-down cards to choose from while choosing
    pub slots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_card: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_card: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub result_claimed: bool,
}
