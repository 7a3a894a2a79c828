use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A gacha asset tree: `<root>/<pool>/<tier>/*.jpg` plus optional card backs.
#[derive(Debug)]
pub struct PoolFixture {
    root: TempDir,
    root_arg: String,
}

impl PoolFixture {
    pub fn empty() -> Self {
        let root = TempDir::new().expect("pool root");
        let root_arg = root.path().to_string_lossy().into_owned();
        Self { root, root_arg }
    }

    /// `spring` with every tier stocked and a card back.
    pub fn standard() -> Self {
        let fixture = Self::empty();
        fixture.add_pool(
            "spring",
            &[
                ("R", &["r1", "r2", "r3"][..]),
                ("SR", &["sr1", "sr2"][..]),
                ("SSR", &["ssr1"][..]),
                ("SP", &["sp1"][..]),
            ],
            true,
        );
        fixture
    }

    pub fn add_pool(&self, name: &str, tiers: &[(&str, &[&str])], card_back: bool) {
        let base = self.root.path().join(name);
        for (tier, cards) in tiers {
            let dir = base.join(tier);
            fs::create_dir_all(&dir).expect("tier dir");
            for card in *cards {
                fs::write(dir.join(format!("{card}.jpg")), b"").expect("card image");
            }
        }
        if card_back {
            fs::create_dir_all(&base).expect("pool dir");
            fs::write(base.join("card_back.jpg"), b"").expect("card back");
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn root_arg(&self) -> &str {
        &self.root_arg
    }
}
