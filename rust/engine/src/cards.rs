use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a single card face.
///
/// Memory boards carry two instances of every face, told apart by a numeric
/// suffix (`"12-1"` and `"12-2"`). Gacha cards use their asset path as the id.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the `n`-th instance of a base face, e.g. `instance("12", 2)` is `"12-2"`.
    pub fn instance(base: &str, n: u8) -> Self {
        Self(format!("{}-{}", base, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The face with any instance suffix stripped.
    ///
    /// ```
    /// use popcorn_engine::cards::CardId;
    ///
    /// assert_eq!(CardId::new("12-1").base(), "12");
    /// assert_eq!(CardId::new("12-2").base(), "12");
    /// assert_eq!(CardId::new("A").base(), "A");
    /// ```
    pub fn base(&self) -> &str {
        match self.0.split_once('-') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    pub fn same_face(&self, other: &CardId) -> bool {
        self.base() == other.base()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Rarity tier of a drawable card.
/// Declaration order runs from most common to rarest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rarity {
    /// Rare
    R,
    /// Super rare
    SR,
    /// Super super rare
    SSR,
    /// Special
    SP,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::R, Rarity::SR, Rarity::SSR, Rarity::SP];

    /// Listing order for collections.
    pub const RAREST_FIRST: [Rarity; 4] = [Rarity::SP, Rarity::SSR, Rarity::SR, Rarity::R];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::R => "R",
            Rarity::SR => "SR",
            Rarity::SSR => "SSR",
            Rarity::SP => "SP",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" => Ok(Rarity::R),
            "SR" => Ok(Rarity::SR),
            "SSR" => Ok(Rarity::SSR),
            "SP" => Ok(Rarity::SP),
            other => Err(format!("unknown rarity: {other}")),
        }
    }
}

/// Base faces of the canonical memory board: every unordered pair drawn from 1..=7.
pub const MEMORY_FACES: [&str; 21] = [
    "12", "13", "14", "15", "16", "17", "23", "24", "25", "26", "27", "34", "35", "36", "37",
    "45", "46", "47", "56", "57", "67",
];

/// Lays out two suffixed instances of each face, unshuffled.
pub fn paired_faces(faces: &[&str]) -> Vec<CardId> {
    let mut v = Vec::with_capacity(faces.len() * 2);
    for n in 1..=2u8 {
        for face in faces {
            v.push(CardId::instance(face, n));
        }
    }
    v
}
