//! Per-player session controller.
//!
//! A [`PlayerSession`] is either in the lobby or holds the state of exactly
//! one game. Every player input is an [`Action`] applied through [`dispatch`],
//! which returns the event it produced together with a fresh view of the
//! session. Rejected actions leave the session untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::collection::{list_collection, Collection, CollectionQuery, OwnershipStore};
use crate::deck::{seeded_rng, GameRng};
use crate::errors::GameError;
use crate::gacha::{DrawResult, DrawSession, DrawSnapshot};
use crate::ledger::Ledger;
use crate::memory::{MatchConfig, MatchSession, MatchSnapshot, SelectOutcome};
use crate::pool::PoolProvider;
use crate::settlement::{GameKind, Settlement};
use crate::wager::{Direction, Outcome, WagerSession, WagerSnapshot, WagerStage};

/// Where a player currently is.
#[derive(Debug, Clone)]
pub enum ArcadeStage {
    Lobby,
    Memory(MatchSession),
    HighLow(WagerSession),
    Gacha(DrawSession),
}

impl ArcadeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcadeStage::Lobby => "lobby",
            ArcadeStage::Memory(_) => "memory",
            ArcadeStage::HighLow(_) => "high_low",
            ArcadeStage::Gacha(_) => "gacha",
        }
    }

    pub fn game(&self) -> Option<GameKind> {
        match self {
            ArcadeStage::Lobby => None,
            ArcadeStage::Memory(_) => Some(GameKind::Memory),
            ArcadeStage::HighLow(_) => Some(GameKind::HighLow),
            ArcadeStage::Gacha(_) => Some(GameKind::Gacha),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Leave the lobby for a game with fresh state.
    Enter { game: GameKind },
    /// Leave the current game. A game still in progress is discarded
    /// without settlement; a finished one is settled first.
    ReturnToLobby,
    /// Replace the current game with a freshly initialised one, settling
    /// the finished one first.
    PlayAgain,
    /// Apply a finished memory or high-low game to the ledger. Finished
    /// games also settle automatically; this retries a failed attempt.
    Settle,
    /// Re-render the current stage; advances the memory timer.
    Refresh,
    Select { index: usize },
    PlaceBet { amount: u64 },
    ChooseCard { slot: usize },
    Guess { direction: Direction },
    SelectPool { pool: String },
    Draw {
        count: u32,
        #[serde(default)]
        pool: Option<String>,
    },
    ViewCollection {
        #[serde(default)]
        pool: Option<String>,
        #[serde(flatten)]
        query: CollectionQuery,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Enter { .. } => "enter",
            Action::ReturnToLobby => "return_to_lobby",
            Action::PlayAgain => "play_again",
            Action::Settle => "settle",
            Action::Refresh => "refresh",
            Action::Select { .. } => "select",
            Action::PlaceBet { .. } => "place_bet",
            Action::ChooseCard { .. } => "choose_card",
            Action::Guess { .. } => "guess",
            Action::SelectPool { .. } => "select_pool",
            Action::Draw { .. } => "draw",
            Action::ViewCollection { .. } => "view_collection",
        }
    }
}

/// Collaborators and clock for one dispatched action.
#[derive(Clone, Copy)]
pub struct TurnContext<'a> {
    pub ledger: &'a dyn Ledger,
    pub pools: &'a dyn PoolProvider,
    pub ownership: &'a dyn OwnershipStore,
    pub now: Instant,
}

/// A balance change caused by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMovement {
    pub game: GameKind,
    pub delta: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActionEvent {
    Entered { game: GameKind },
    ReturnedToLobby,
    Restarted { game: GameKind },
    Refreshed,
    Selected(SelectOutcome),
    BetPlaced { amount: u64 },
    CardChosen { player_card: u8 },
    Guessed { outcome: Outcome },
    Settled(Settlement),
    PoolSelected { pool: String },
    Drew(DrawResult),
    Collection(Collection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum SessionView {
    Lobby,
    Memory(MatchSnapshot),
    HighLow(WagerSnapshot),
    Gacha(DrawSnapshot),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub event: ActionEvent,
    /// Ledger change made by this action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<LedgerMovement>,
    /// Set when an automatic settlement failed and will be retried on the
    /// next action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_error: Option<String>,
    pub view: SessionView,
}

#[derive(Debug, Clone)]
pub struct PlayerSession {
    user: String,
    stage: ArcadeStage,
    match_config: MatchConfig,
    rng: GameRng,
}

impl PlayerSession {
    pub fn new(user: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            user: user.into(),
            stage: ArcadeStage::Lobby,
            match_config: MatchConfig::default(),
            rng: seeded_rng(seed),
        }
    }

    pub fn with_match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn stage(&self) -> &ArcadeStage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut ArcadeStage {
        &mut self.stage
    }

    pub fn match_config(&self) -> MatchConfig {
        self.match_config
    }

    pub fn view(&self, now: Instant) -> SessionView {
        match &self.stage {
            ArcadeStage::Lobby => SessionView::Lobby,
            ArcadeStage::Memory(game) => SessionView::Memory(game.snapshot(now)),
            ArcadeStage::HighLow(game) => SessionView::HighLow(game.snapshot()),
            ArcadeStage::Gacha(game) => SessionView::Gacha(game.snapshot()),
        }
    }

    fn fresh_game(&mut self, game: GameKind, now: Instant) -> ArcadeStage {
        let seed = Some(self.rng.random::<u64>());
        match game {
            GameKind::Memory => ArcadeStage::Memory(MatchSession::new(self.match_config, seed, now)),
            GameKind::HighLow => ArcadeStage::HighLow(WagerSession::new(seed)),
            GameKind::Gacha => ArcadeStage::Gacha(DrawSession::new(seed)),
        }
    }

    /// Settles the current game if it has finished and its result has not
    /// been claimed yet. The memory clock is advanced first so an expired
    /// board counts as finished.
    fn settle_finished(
        &mut self,
        now: Instant,
        ledger: &dyn Ledger,
    ) -> Result<Option<LedgerMovement>, GameError> {
        match &mut self.stage {
            ArcadeStage::Memory(game) => {
                game.tick(now);
                if game.is_over() && !game.reward_claimed() {
                    let settlement = game.settle_reward(ledger, &self.user)?;
                    return Ok(applied(GameKind::Memory, &settlement));
                }
            }
            ArcadeStage::HighLow(round)
                if round.stage() == WagerStage::Revealed && !round.result_claimed() =>
            {
                let settlement = round.settle(ledger, &self.user)?;
                return Ok(applied(GameKind::HighLow, &settlement));
            }
            _ => {}
        }
        Ok(None)
    }

    fn wrong_stage(&self, action: &Action) -> GameError {
        GameError::WrongStage {
            action: action.name(),
            stage: self.stage.as_str(),
        }
    }
}

fn applied(game: GameKind, settlement: &Settlement) -> Option<LedgerMovement> {
    match settlement {
        Settlement::Applied { delta, balance } if *delta != 0 => Some(LedgerMovement {
            game,
            delta: *delta,
            balance: *balance,
        }),
        _ => None,
    }
}

/// Applies one action to the session.
pub fn dispatch(
    session: &mut PlayerSession,
    action: Action,
    ctx: &TurnContext<'_>,
) -> Result<ActionOutcome, GameError> {
    let mut movement = None;
    let event = match (&mut session.stage, &action) {
        (ArcadeStage::Lobby, Action::Enter { game }) => {
            let game = *game;
            session.stage = session.fresh_game(game, ctx.now);
            ActionEvent::Entered { game }
        }
        (ArcadeStage::Lobby, Action::Refresh) => ActionEvent::Refreshed,
        (ArcadeStage::Lobby, Action::PlayAgain) => return Err(GameError::NoGameInProgress),
        (ArcadeStage::Lobby, Action::ReturnToLobby) => ActionEvent::ReturnedToLobby,
        (ArcadeStage::Lobby, _) => return Err(session.wrong_stage(&action)),

        // A finished game must be settled before it can be left.
        (_, Action::ReturnToLobby) => {
            movement = session.settle_finished(ctx.now, ctx.ledger)?;
            session.stage = ArcadeStage::Lobby;
            ActionEvent::ReturnedToLobby
        }
        (_, Action::PlayAgain) => {
            movement = session.settle_finished(ctx.now, ctx.ledger)?;
            let game = session.stage.game().ok_or(GameError::NoGameInProgress)?;
            if let ArcadeStage::HighLow(round) = &mut session.stage {
                round.reset();
            } else {
                session.stage = session.fresh_game(game, ctx.now);
            }
            ActionEvent::Restarted { game }
        }

        (ArcadeStage::Memory(game), _) => {
            game.tick(ctx.now);
            match &action {
                Action::Refresh => ActionEvent::Refreshed,
                Action::Select { index } => ActionEvent::Selected(game.select(*index, ctx.now)?),
                Action::Settle => {
                    let settlement = game.settle_reward(ctx.ledger, &session.user)?;
                    movement = applied(GameKind::Memory, &settlement);
                    ActionEvent::Settled(settlement)
                }
                _ => return Err(session.wrong_stage(&action)),
            }
        }

        (ArcadeStage::HighLow(round), _) => match &action {
            Action::Refresh => ActionEvent::Refreshed,
            Action::PlaceBet { amount } => {
                let balance = ctx.ledger.balance(&session.user)?;
                round.place_bet(*amount, balance)?;
                ActionEvent::BetPlaced { amount: *amount }
            }
            Action::ChooseCard { slot } => {
                let (player_card, _) = round.choose_card(*slot)?;
                ActionEvent::CardChosen { player_card }
            }
            Action::Guess { direction } => ActionEvent::Guessed {
                outcome: round.guess(*direction)?,
            },
            Action::Settle => {
                let settlement = round.settle(ctx.ledger, &session.user)?;
                movement = applied(GameKind::HighLow, &settlement);
                ActionEvent::Settled(settlement)
            }
            _ => return Err(session.wrong_stage(&action)),
        },

        (ArcadeStage::Gacha(draws), _) => match &action {
            Action::Refresh => ActionEvent::Refreshed,
            Action::SelectPool { pool } => {
                let pool = ctx.pools.pool(pool)?;
                draws.select_pool(pool.name.clone());
                ActionEvent::PoolSelected { pool: pool.name }
            }
            Action::Draw { count, pool } => {
                let name = pool
                    .as_deref()
                    .or(draws.selected_pool())
                    .ok_or(GameError::NoPoolSelected)?;
                let pool = ctx.pools.pool(name)?;
                let result = draws.draw(*count, &pool, &session.user, ctx.ledger, ctx.ownership)?;
                movement = Some(LedgerMovement {
                    game: GameKind::Gacha,
                    delta: -(result.cost as i64),
                    balance: Some(result.balance),
                });
                ActionEvent::Drew(result)
            }
            Action::ViewCollection { pool, query } => {
                let name = pool
                    .as_deref()
                    .or(draws.selected_pool())
                    .ok_or(GameError::NoPoolSelected)?;
                let pool = ctx.pools.pool(name)?;
                let owned = ctx.ownership.owned(&session.user, &pool.name)?;
                ActionEvent::Collection(list_collection(&pool, &owned, query))
            }
            _ => return Err(session.wrong_stage(&action)),
        },
    };

    let mut settlement_error = None;
    match session.settle_finished(ctx.now, ctx.ledger) {
        Ok(Some(settled)) => movement = Some(settled),
        Ok(None) => {}
        Err(err) => settlement_error = Some(err.to_string()),
    }

    Ok(ActionOutcome {
        event,
        movement,
        settlement_error,
        view: session.view(ctx.now),
    })
}
