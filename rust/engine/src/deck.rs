use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// RNG shared by every game engine.
pub type GameRng = ChaCha20Rng;

/// Highest rank in the default high-low deck.
pub const DEFAULT_TOP_RANK: u8 = 7;

/// Seeds a game RNG; `None` picks a fresh random seed.
pub fn seeded_rng(seed: Option<u64>) -> GameRng {
    ChaCha20Rng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// Deck of distinct ranks for the high-low game. Cards leave the deck when
/// taken, so two draws can never return the same rank.
#[derive(Debug, Clone)]
pub struct RankDeck {
    ranks: Vec<u8>,
    top: u8,
    rng: GameRng,
}

impl RankDeck {
    pub fn new_with_seed(seed: Option<u64>) -> Self {
        Self::with_top_rank(DEFAULT_TOP_RANK, seed)
    }

    pub fn with_top_rank(top: u8, seed: Option<u64>) -> Self {
        // Keep initial order until shuffle is called explicitly
        Self {
            ranks: (1..=top).collect(),
            top,
            rng: seeded_rng(seed),
        }
    }

    /// Restores every rank and shuffles.
    pub fn shuffle(&mut self) {
        self.reset();
        self.ranks.shuffle(&mut self.rng);
    }

    /// Removes the rank at `slot` in the current order.
    pub fn take(&mut self, slot: usize) -> Option<u8> {
        if slot < self.ranks.len() {
            Some(self.ranks.remove(slot))
        } else {
            None
        }
    }

    /// Removes one of the remaining ranks uniformly at random.
    pub fn draw_random(&mut self) -> Option<u8> {
        if self.ranks.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.ranks.len());
        Some(self.ranks.remove(idx))
    }

    pub fn reset(&mut self) {
        self.ranks = (1..=self.top).collect();
    }

    pub fn remaining(&self) -> usize {
        self.ranks.len()
    }

    pub fn ranks(&self) -> &[u8] {
        &self.ranks
    }

    /// Overrides the deck contents; used to stage fixed rounds.
    pub fn set_ranks(&mut self, ranks: Vec<u8>) {
        self.ranks = ranks;
    }
}
