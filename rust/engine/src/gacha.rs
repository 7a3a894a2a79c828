//! Weighted card draws with a ten-pull guarantee.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, Rarity};
use crate::collection::OwnershipStore;
use crate::deck::{seeded_rng, GameRng};
use crate::errors::GameError;
use crate::ledger::Ledger;
use crate::pool::CardPool;

/// Price of a single draw.
pub const DRAW_COST: u64 = 10;

/// Size of the batch that carries the guaranteed slot.
pub const TEN_PULL: u32 = 10;

/// Relative tier weights for an ordinary draw.
pub const STANDARD_WEIGHTS: [(Rarity, u32); 4] = [
    (Rarity::R, 60),
    (Rarity::SR, 25),
    (Rarity::SSR, 10),
    (Rarity::SP, 5),
];

/// Relative tier weights for the guaranteed slot of a ten-pull.
pub const GUARANTEED_WEIGHTS: [(Rarity, u32); 2] = [(Rarity::SSR, 90), (Rarity::SP, 10)];

pub fn draw_cost(count: u32) -> u64 {
    u64::from(count) * DRAW_COST
}

/// Single weighted selection over `weights`.
pub fn pick_tier<R: Rng + ?Sized>(rng: &mut R, weights: &[(Rarity, u32)]) -> Rarity {
    let total: u32 = weights.iter().map(|(_, w)| *w).sum();
    let mut roll = rng.random_range(0..total.max(1));
    for (rarity, weight) in weights {
        if roll < *weight {
            return *rarity;
        }
        roll -= weight;
    }
    weights.last().map(|(r, _)| *r).unwrap_or(Rarity::R)
}

#[derive(Debug, Clone)]
pub struct Drawer {
    rng: GameRng,
}

impl Drawer {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }

    pub fn pick_tier(&mut self, weights: &[(Rarity, u32)]) -> Rarity {
        pick_tier(&mut self.rng, weights)
    }

    fn pick_card(&mut self, cards: &[CardId]) -> Option<CardId> {
        if cards.is_empty() {
            None
        } else {
            Some(cards[self.rng.random_range(0..cards.len())].clone())
        }
    }

    /// Draws with the standard weights, re-rolling the tier whenever the
    /// chosen one has no cards in `pool`.
    pub fn draw_one(&mut self, pool: &CardPool) -> Result<CardId, GameError> {
        if pool.is_empty() {
            return Err(GameError::EmptyPool(pool.name.clone()));
        }
        loop {
            let tier = self.pick_tier(&STANDARD_WEIGHTS);
            if let Some(card) = self.pick_card(pool.cards(tier)) {
                return Ok(card);
            }
        }
    }

    /// Nine ordinary draws plus one from the guaranteed table, returned in
    /// random order. If the guaranteed tier is empty that slot becomes an
    /// ordinary draw.
    pub fn draw_ten(&mut self, pool: &CardPool) -> Result<Vec<CardId>, GameError> {
        if pool.is_empty() {
            return Err(GameError::EmptyPool(pool.name.clone()));
        }
        let mut cards = Vec::with_capacity(TEN_PULL as usize);
        let tier = self.pick_tier(&GUARANTEED_WEIGHTS);
        let guaranteed = match self.pick_card(pool.cards(tier)) {
            Some(card) => card,
            None => self.draw_one(pool)?,
        };
        cards.push(guaranteed);
        for _ in 1..TEN_PULL {
            cards.push(self.draw_one(pool)?);
        }
        cards.shuffle(&mut self.rng);
        Ok(cards)
    }

    /// Charges the player, draws, and records the new cards.
    ///
    /// The debit happens before any card is drawn; a rejected debit leaves
    /// both the ledger and the collection untouched. If the collection
    /// cannot be updated the charge is refunded.
    pub fn perform_draw(
        &mut self,
        count: u32,
        pool: &CardPool,
        user: &str,
        ledger: &dyn Ledger,
        ownership: &dyn OwnershipStore,
    ) -> Result<DrawResult, GameError> {
        if count != 1 && count != TEN_PULL {
            return Err(GameError::UnsupportedDrawCount(count));
        }
        if pool.is_empty() {
            return Err(GameError::EmptyPool(pool.name.clone()));
        }
        let cost = draw_cost(count);
        let balance = ledger.balance(user)?;
        if balance < cost {
            return Err(GameError::InsufficientBalance {
                needed: cost,
                balance,
            });
        }
        let balance = ledger.adjust(user, -(cost as i64))?;

        let cards = if count == TEN_PULL {
            self.draw_ten(pool)?
        } else {
            vec![self.draw_one(pool)?]
        };

        if let Err(err) = record_ownership(ownership, user, &pool.name, &cards) {
            ledger.adjust(user, cost as i64)?;
            return Err(err.into());
        }

        Ok(DrawResult {
            pool: pool.name.clone(),
            cards,
            cost,
            balance,
        })
    }
}

/// Adds one owned copy per drawn card; repeated cards keep accumulating.
pub fn record_ownership(
    ownership: &dyn OwnershipStore,
    user: &str,
    pool: &str,
    cards: &[CardId],
) -> Result<(), crate::ledger::LedgerError> {
    for card in cards {
        ownership.increment(user, pool, card, 1)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub pool: String,
    pub cards: Vec<CardId>,
    pub cost: u64,
    /// Balance right after the debit
    pub balance: u64,
}

/// Per-player gacha state: the pool being drawn from and the latest results.
#[derive(Debug, Clone)]
pub struct DrawSession {
    drawer: Drawer,
    selected_pool: Option<String>,
    last_results: Option<DrawResult>,
}

impl DrawSession {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            drawer: Drawer::new(seed),
            selected_pool: None,
            last_results: None,
        }
    }

    pub fn select_pool(&mut self, pool: impl Into<String>) {
        self.selected_pool = Some(pool.into());
        self.last_results = None;
    }

    pub fn selected_pool(&self) -> Option<&str> {
        self.selected_pool.as_deref()
    }

    pub fn last_results(&self) -> Option<&DrawResult> {
        self.last_results.as_ref()
    }

    /// Results are shown once and then cleared.
    pub fn take_last_results(&mut self) -> Option<DrawResult> {
        self.last_results.take()
    }

    pub fn draw(
        &mut self,
        count: u32,
        pool: &CardPool,
        user: &str,
        ledger: &dyn Ledger,
        ownership: &dyn OwnershipStore,
    ) -> Result<DrawResult, GameError> {
        let result = self
            .drawer
            .perform_draw(count, pool, user, ledger, ownership)?;
        self.selected_pool = Some(pool.name.clone());
        self.last_results = Some(result.clone());
        Ok(result)
    }

    pub fn snapshot(&self) -> DrawSnapshot {
        DrawSnapshot {
            selected_pool: self.selected_pool.clone(),
            last_results: self.last_results.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_results: Option<DrawResult>,
}
