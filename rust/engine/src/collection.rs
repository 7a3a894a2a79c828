use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::cards::{CardId, Rarity};
use crate::ledger::LedgerError;
use crate::pool::CardPool;

/// Per-player record of drawn cards and how many copies each holds.
pub trait OwnershipStore: Send + Sync {
    /// Owned copies of cards from `pool`; cards never drawn are absent.
    fn owned(&self, user: &str, pool: &str) -> Result<HashMap<CardId, u64>, LedgerError>;

    /// Adds `delta` copies and returns the new count.
    fn increment(&self, user: &str, pool: &str, card: &CardId, delta: u64)
        -> Result<u64, LedgerError>;

    /// Drops every card the player owns across all pools.
    fn forget(&self, user: &str) -> Result<(), LedgerError>;
}

type PoolCounts = HashMap<String, HashMap<CardId, u64>>;

#[derive(Debug, Default)]
pub struct InMemoryOwnership {
    users: RwLock<HashMap<String, PoolCounts>>,
}

impl InMemoryOwnership {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OwnershipStore for InMemoryOwnership {
    fn owned(&self, user: &str, pool: &str) -> Result<HashMap<CardId, u64>, LedgerError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users
            .get(&user.to_ascii_lowercase())
            .and_then(|pools| pools.get(pool))
            .cloned()
            .unwrap_or_default())
    }

    fn increment(
        &self,
        user: &str,
        pool: &str,
        card: &CardId,
        delta: u64,
    ) -> Result<u64, LedgerError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let count = users
            .entry(user.to_ascii_lowercase())
            .or_default()
            .entry(pool.to_string())
            .or_default()
            .entry(card.clone())
            .or_insert(0);
        *count = count.saturating_add(delta);
        Ok(*count)
    }

    fn forget(&self, user: &str) -> Result<(), LedgerError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.remove(&user.to_ascii_lowercase());
        Ok(())
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Unavailable("ownership lock poisoned".into())
}

/// Filters for a collection listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionQuery {
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub owned_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub card: CardId,
    /// Copies owned; zero for cards not yet drawn
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierListing {
    pub rarity: Rarity,
    pub owned_distinct: usize,
    pub total_distinct: usize,
    pub cards: Vec<CollectionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub pool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_back: Option<String>,
    pub tiers: Vec<TierListing>,
}

impl Collection {
    pub fn owned_distinct(&self) -> usize {
        self.tiers.iter().map(|t| t.owned_distinct).sum()
    }
}

/// Lists `pool` rarest tier first, annotating each card with the player's
/// copy count. Tiers with no cards are skipped; with `owned_only` unowned
/// cards and tiers holding none of the player's cards are skipped too.
pub fn list_collection(
    pool: &CardPool,
    owned: &HashMap<CardId, u64>,
    query: &CollectionQuery,
) -> Collection {
    let mut tiers = Vec::new();
    for rarity in Rarity::RAREST_FIRST {
        if query.rarity.is_some_and(|r| r != rarity) {
            continue;
        }
        let cards = pool.cards(rarity);
        if cards.is_empty() {
            continue;
        }
        let count_of = |card: &CardId| owned.get(card).copied().unwrap_or(0);
        let owned_distinct = cards.iter().filter(|c| count_of(c) > 0).count();
        if query.owned_only && owned_distinct == 0 {
            continue;
        }
        let entries = cards
            .iter()
            .map(|card| CollectionEntry {
                card: card.clone(),
                count: count_of(card),
            })
            .filter(|e| !query.owned_only || e.count > 0)
            .collect();
        tiers.push(TierListing {
            rarity,
            owned_distinct,
            total_distinct: cards.len(),
            cards: entries,
        });
    }
    Collection {
        pool: pool.name.clone(),
        card_back: pool.card_back.clone(),
        tiers,
    }
}
