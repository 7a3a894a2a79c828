use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cards::{CardId, Rarity};
use crate::errors::GameError;

/// Static catalogue of one gacha pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPool {
    pub name: String,
    tiers: BTreeMap<Rarity, Vec<CardId>>,
    #[serde(default)]
    pub card_back: Option<String>,
}

impl CardPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a tier; the card list is kept sorted.
    pub fn with_tier<I, C>(mut self, rarity: Rarity, cards: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CardId>,
    {
        let mut list: Vec<CardId> = cards.into_iter().map(Into::into).collect();
        list.sort();
        list.dedup();
        self.tiers.insert(rarity, list);
        self
    }

    pub fn with_card_back(mut self, back: impl Into<String>) -> Self {
        self.card_back = Some(back.into());
        self
    }

    /// Cards of one tier; empty when the tier is missing.
    pub fn cards(&self, rarity: Rarity) -> &[CardId] {
        self.tiers.get(&rarity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        Rarity::ALL.iter().all(|r| self.cards(*r).is_empty())
    }

    pub fn len(&self) -> usize {
        Rarity::ALL.iter().map(|r| self.cards(*r).len()).sum()
    }

    pub fn rarity_of(&self, card: &CardId) -> Option<Rarity> {
        Rarity::ALL
            .into_iter()
            .find(|r| self.cards(*r).binary_search(card).is_ok())
    }
}

/// Source of gacha pool catalogues.
pub trait PoolProvider: Send + Sync {
    fn list_pools(&self) -> Vec<String>;

    fn pool(&self, name: &str) -> Result<CardPool, GameError>;
}

/// Fixed set of pools held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPoolProvider {
    pools: BTreeMap<String, CardPool>,
}

impl StaticPoolProvider {
    pub fn new<I: IntoIterator<Item = CardPool>>(pools: I) -> Self {
        Self {
            pools: pools.into_iter().map(|p| (p.name.clone(), p)).collect(),
        }
    }
}

impl PoolProvider for StaticPoolProvider {
    fn list_pools(&self) -> Vec<String> {
        self.pools.keys().cloned().collect()
    }

    fn pool(&self, name: &str) -> Result<CardPool, GameError> {
        self.pools
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::UnknownPool(name.to_string()))
    }
}

/// File name of the optional card back inside a pool directory.
pub const CARD_BACK_FILE: &str = "card_back.jpg";

/// Reads pools from an asset tree laid out as
/// `<root>/<pool>/<tier>/*.jpg` with an optional `<root>/<pool>/card_back.jpg`.
/// Card ids are the forward-slash asset paths.
#[derive(Debug, Clone)]
pub struct DirectoryPoolProvider {
    root: PathBuf,
}

impl DirectoryPoolProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PoolProvider for DirectoryPoolProvider {
    fn list_pools(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// Only names returned by [`list_pools`](PoolProvider::list_pools) are
    /// accepted, so a name can never reach outside the asset root.
    fn pool(&self, name: &str) -> Result<CardPool, GameError> {
        if !self.list_pools().iter().any(|known| known == name) {
            return Err(GameError::UnknownPool(name.to_string()));
        }
        let base = self.root.join(name);
        let mut pool = CardPool::new(name);
        for rarity in Rarity::ALL {
            let dir = base.join(rarity.as_str());
            if dir.is_dir() {
                pool = pool.with_tier(rarity, list_images(&dir));
            }
        }
        let back = base.join(CARD_BACK_FILE);
        if back.is_file() {
            pool = pool.with_card_back(as_posix(&back));
        }
        Ok(pool)
    }
}

fn list_images(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("jpg"))
        })
        .map(|p| as_posix(&p))
        .collect()
}

fn as_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
