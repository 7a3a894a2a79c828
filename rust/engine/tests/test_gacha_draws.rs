use std::collections::HashMap;
use std::fs;

use popcorn_engine::cards::{CardId, Rarity};
use popcorn_engine::collection::{list_collection, CollectionQuery, InMemoryOwnership, OwnershipStore};
use popcorn_engine::errors::{ErrorKind, GameError};
use popcorn_engine::gacha::{Drawer, DrawSession, DRAW_COST, STANDARD_WEIGHTS};
use popcorn_engine::ledger::{InMemoryLedger, Ledger, LedgerError};
use popcorn_engine::pool::{CardPool, DirectoryPoolProvider, PoolProvider};

fn full_pool() -> CardPool {
    CardPool::new("spring")
        .with_tier(Rarity::R, ["r1", "r2", "r3", "r4"])
        .with_tier(Rarity::SR, ["sr1", "sr2", "sr3"])
        .with_tier(Rarity::SSR, ["ssr1", "ssr2"])
        .with_tier(Rarity::SP, ["sp1"])
}

fn ledger_with_balance(user: &str, balance: u64) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    ledger.open_account(user, "").unwrap();
    ledger.adjust(user, balance as i64 - 100).unwrap();
    ledger
}

/// Ledger that rejects every debit.
struct ReadOnlyLedger(InMemoryLedger);

impl Ledger for ReadOnlyLedger {
    fn balance(&self, user: &str) -> Result<u64, LedgerError> {
        self.0.balance(user)
    }

    fn adjust(&self, _user: &str, _delta: i64) -> Result<u64, LedgerError> {
        Err(LedgerError::Unavailable("read only".into()))
    }
}

#[test]
fn tier_frequencies_match_weights() {
    const N: usize = 100_000;
    let pool = full_pool();
    let mut drawer = Drawer::new(Some(2024));
    let mut counts: HashMap<Rarity, usize> = HashMap::new();
    for _ in 0..N {
        let card = drawer.draw_one(&pool).unwrap();
        let tier = pool.rarity_of(&card).expect("drawn card belongs to pool");
        *counts.entry(tier).or_default() += 1;
    }
    let total: u32 = STANDARD_WEIGHTS.iter().map(|(_, w)| w).sum();
    for (rarity, weight) in STANDARD_WEIGHTS {
        let p = f64::from(weight) / f64::from(total);
        let observed = counts.get(&rarity).copied().unwrap_or(0) as f64 / N as f64;
        let std_err = (p * (1.0 - p) / N as f64).sqrt();
        assert!(
            (observed - p).abs() < 5.0 * std_err,
            "{rarity}: observed {observed:.4}, expected {p:.4}"
        );
    }
}

#[test]
fn ten_pull_always_contains_an_elevated_card() {
    let pool = full_pool();
    let mut drawer = Drawer::new(Some(77));
    for _ in 0..500 {
        let cards = drawer.draw_ten(&pool).unwrap();
        assert_eq!(cards.len(), 10);
        let elevated = cards
            .iter()
            .filter(|c| matches!(pool.rarity_of(c), Some(Rarity::SSR | Rarity::SP)))
            .count();
        assert!(elevated >= 1);
    }
}

#[test]
fn ten_pull_falls_back_when_elevated_tiers_are_empty() {
    let pool = CardPool::new("plain")
        .with_tier(Rarity::R, ["r1"])
        .with_tier(Rarity::SR, ["sr1"]);
    let mut drawer = Drawer::new(Some(3));
    let cards = drawer.draw_ten(&pool).unwrap();
    assert_eq!(cards.len(), 10);
    assert!(cards
        .iter()
        .all(|c| matches!(pool.rarity_of(c), Some(Rarity::R | Rarity::SR))));
}

#[test]
fn empty_pool_is_a_configuration_error() {
    let pool = CardPool::new("void");
    let mut drawer = Drawer::new(Some(1));
    let err = drawer.draw_one(&pool).unwrap_err();
    assert_eq!(err, GameError::EmptyPool("void".into()));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(drawer.draw_ten(&pool).is_err());
}

#[test]
fn single_draw_debits_before_drawing() {
    let ledger = ledger_with_balance("amy", 50);
    let ownership = InMemoryOwnership::new();
    let mut drawer = Drawer::new(Some(8));
    let result = drawer
        .perform_draw(1, &full_pool(), "amy", &ledger, &ownership)
        .unwrap();
    assert_eq!(result.cost, DRAW_COST);
    assert_eq!(result.balance, 40);
    assert_eq!(result.cards.len(), 1);
    assert_eq!(ledger.balance("amy").unwrap(), 40);
    let owned = ownership.owned("amy", "spring").unwrap();
    assert_eq!(owned.get(&result.cards[0]), Some(&1));
}

#[test]
fn failed_debit_draws_nothing() {
    let ledger = ReadOnlyLedger(ledger_with_balance("amy", 50));
    let ownership = InMemoryOwnership::new();
    let mut drawer = Drawer::new(Some(8));
    let err = drawer
        .perform_draw(1, &full_pool(), "amy", &ledger, &ownership)
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(ledger.balance("amy").unwrap(), 50);
    assert!(ownership.owned("amy", "spring").unwrap().is_empty());
}

#[test]
fn short_balance_is_rejected_up_front() {
    let ledger = ledger_with_balance("amy", 90);
    let ownership = InMemoryOwnership::new();
    let mut drawer = Drawer::new(Some(8));
    assert_eq!(
        drawer.perform_draw(10, &full_pool(), "amy", &ledger, &ownership),
        Err(GameError::InsufficientBalance {
            needed: 100,
            balance: 90
        })
    );
    assert_eq!(ledger.balance("amy").unwrap(), 90);
}

#[test]
fn only_single_and_ten_pulls_are_sold() {
    let ledger = ledger_with_balance("amy", 100);
    let ownership = InMemoryOwnership::new();
    let mut drawer = Drawer::new(Some(8));
    assert_eq!(
        drawer.perform_draw(3, &full_pool(), "amy", &ledger, &ownership),
        Err(GameError::UnsupportedDrawCount(3))
    );
    assert_eq!(ledger.balance("amy").unwrap(), 100);
}

#[test]
fn repeated_draws_accumulate_ownership() {
    let ledger = ledger_with_balance("amy", 1_000);
    let ownership = InMemoryOwnership::new();
    let pool = CardPool::new("tiny").with_tier(Rarity::R, ["only"]);
    let mut session = DrawSession::new(Some(5));
    session.draw(10, &pool, "amy", &ledger, &ownership).unwrap();
    session.draw(1, &pool, "amy", &ledger, &ownership).unwrap();
    let owned = ownership.owned("amy", "tiny").unwrap();
    assert_eq!(owned.get(&CardId::new("only")), Some(&11));
    assert_eq!(session.last_results().map(|r| r.cards.len()), Some(1));
    assert_eq!(ledger.balance("amy").unwrap(), 1_000 - 110);
}

#[test]
fn collection_counts_stay_within_totals() {
    let ledger = ledger_with_balance("amy", 1_000);
    let ownership = InMemoryOwnership::new();
    let pool = full_pool();
    let mut drawer = Drawer::new(Some(42));
    for _ in 0..5 {
        drawer
            .perform_draw(10, &pool, "amy", &ledger, &ownership)
            .unwrap();
    }
    let owned = ownership.owned("amy", "spring").unwrap();
    for owned_only in [false, true] {
        let listing = list_collection(
            &pool,
            &owned,
            &CollectionQuery {
                rarity: None,
                owned_only,
            },
        );
        for tier in &listing.tiers {
            assert!(tier.owned_distinct <= tier.total_distinct);
            assert_eq!(tier.total_distinct, pool.cards(tier.rarity).len());
        }
    }
    let total: u64 = owned.values().sum();
    assert_eq!(total, 50);
}

#[test]
fn rarity_filter_limits_listing() {
    let listing = list_collection(
        &full_pool(),
        &HashMap::new(),
        &CollectionQuery {
            rarity: Some(Rarity::SSR),
            owned_only: false,
        },
    );
    assert_eq!(listing.tiers.len(), 1);
    assert_eq!(listing.tiers[0].cards.len(), 2);
    assert!(listing.tiers[0].cards.iter().all(|e| e.count == 0));
}

#[test]
fn directory_provider_reads_asset_layout() {
    let dir = tempfile::tempdir().unwrap();
    let spring = dir.path().join("spring");
    for tier in ["R", "SSR", "SR"] {
        fs::create_dir_all(spring.join(tier)).unwrap();
    }
    fs::write(spring.join("R").join("a.jpg"), b"").unwrap();
    fs::write(spring.join("R").join("b.JPG"), b"").unwrap();
    fs::write(spring.join("SSR").join("c.jpg"), b"").unwrap();
    fs::write(spring.join("SR").join("notes.txt"), b"").unwrap();
    fs::write(spring.join("card_back.jpg"), b"").unwrap();

    let provider = DirectoryPoolProvider::new(dir.path());
    assert_eq!(provider.list_pools(), vec!["spring".to_string()]);

    let pool = provider.pool("spring").unwrap();
    assert_eq!(pool.cards(Rarity::R).len(), 2);
    assert_eq!(pool.cards(Rarity::SSR).len(), 1);
    assert!(pool.cards(Rarity::SR).is_empty());
    assert!(pool.cards(Rarity::SP).is_empty());
    assert!(pool.cards(Rarity::SSR)[0].as_str().ends_with("spring/SSR/c.jpg"));
    assert!(pool
        .card_back
        .as_deref()
        .is_some_and(|b| b.ends_with("card_back.jpg")));

    assert_eq!(
        provider.pool("winter"),
        Err(GameError::UnknownPool("winter".into()))
    );
}

#[test]
fn directory_provider_stays_inside_its_root() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("assets");
    fs::create_dir_all(assets.join("spring").join("R")).unwrap();
    fs::write(assets.join("spring").join("R").join("a.jpg"), b"").unwrap();
    let secret = dir.path().join("secret").join("R");
    fs::create_dir_all(&secret).unwrap();
    fs::write(secret.join("private.jpg"), b"").unwrap();

    let provider = DirectoryPoolProvider::new(&assets);
    assert_eq!(provider.list_pools(), vec!["spring".to_string()]);
    for name in ["../secret", "spring/..", "spring/R", ".", "..", ""] {
        assert_eq!(
            provider.pool(name),
            Err(GameError::UnknownPool(name.to_string())),
            "{name:?} should be rejected"
        );
    }
    assert!(provider.pool("spring").is_ok());
}
