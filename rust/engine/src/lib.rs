//! # popcorn-engine: Arcade Game Engine Core
//!
//! Session state machines for the popcorn arcade: a timed memory-pairing
//! game, a high-low wager and a weighted gacha draw, plus the ledger they
//! settle against. Every engine takes an optional seed so play is
//! reproducible in tests and from the CLI.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identifiers, rarity tiers and the memory board faces
//! - [`deck`] - Seeded RNG and the high-low rank deck
//! - [`ledger`] - Balance store trait and the in-memory account ledger
//! - [`memory`] - Memory-pairing game with a polled timer
//! - [`wager`] - High-low betting round
//! - [`pool`] - Gacha pool catalogues and providers
//! - [`gacha`] - Weighted draws, ten-pull guarantee and draw pricing
//! - [`collection`] - Ownership store and collection listings
//! - [`controller`] - Per-player session and action dispatch
//! - [`settlement`] - Settlement results and the JSONL journal
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Instant;
//! use popcorn_engine::collection::InMemoryOwnership;
//! use popcorn_engine::controller::{dispatch, Action, PlayerSession, TurnContext};
//! use popcorn_engine::ledger::InMemoryLedger;
//! use popcorn_engine::pool::StaticPoolProvider;
//! use popcorn_engine::settlement::GameKind;
//!
//! let ledger = InMemoryLedger::new();
//! ledger.open_account("amy", "Amy").unwrap();
//! let pools = StaticPoolProvider::default();
//! let ownership = InMemoryOwnership::new();
//! let ctx = TurnContext {
//!     ledger: &ledger,
//!     pools: &pools,
//!     ownership: &ownership,
//!     now: Instant::now(),
//! };
//!
//! let mut session = PlayerSession::new("amy", Some(42));
//! dispatch(&mut session, Action::Enter { game: GameKind::HighLow }, &ctx).unwrap();
//! dispatch(&mut session, Action::PlaceBet { amount: 10 }, &ctx).unwrap();
//! ```
//!
//! ## Idempotent Settlement
//!
//! Finished games are applied to the ledger at most once:
//!
//! ```rust
//! use popcorn_engine::ledger::{InMemoryLedger, Ledger};
//! use popcorn_engine::settlement::Settlement;
//! use popcorn_engine::wager::{Direction, WagerSession};
//!
//! let ledger = InMemoryLedger::new();
//! ledger.open_account("amy", "Amy").unwrap();
//!
//! let mut round = WagerSession::new(Some(7));
//! round.place_bet(20, 100).unwrap();
//! round.choose_card(0).unwrap();
//! round.guess(Direction::Bigger).unwrap();
//!
//! let first = round.settle(&ledger, "amy").unwrap();
//! assert!(matches!(first, Settlement::Applied { .. }));
//! assert_eq!(round.settle(&ledger, "amy").unwrap(), Settlement::AlreadySettled);
//! ```

pub mod cards;
pub mod collection;
pub mod controller;
pub mod deck;
pub mod errors;
pub mod gacha;
pub mod ledger;
pub mod memory;
pub mod pool;
pub mod settlement;
pub mod wager;
