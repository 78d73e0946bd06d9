use serde::{Deserialize, Serialize};
use std::fmt;

use crate::number::{round_places, Weight};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    #[serde(rename = "veryrare")]
    VeryRare,
    Alien,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Alien,
        Rarity::Legendary,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::VeryRare => "veryrare",
            Rarity::Alien => "alien",
            Rarity::Legendary => "legendary",
        }
    }
}

/// The three gear-quality profiles a player can pick between.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RarityPreset {
    Excellent,
    Better,
    Stock,
}

impl RarityPreset {
    /// Output order. The first preset is the one enabled by default.
    pub const ALL: [RarityPreset; 3] = [
        RarityPreset::Excellent,
        RarityPreset::Better,
        RarityPreset::Stock,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RarityPreset::Excellent => "excellent",
            RarityPreset::Better => "better",
            RarityPreset::Stock => "stock",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RarityPreset::Excellent => "Enemies Have Excellent Gear",
            RarityPreset::Better => "Enemies Have Better Gear",
            RarityPreset::Stock => "Enemies Have Roughly Stock Gear",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyClass {
    Regular,
    Badass,
}

impl EnemyClass {
    pub const ALL: [EnemyClass; 2] = [EnemyClass::Regular, EnemyClass::Badass];

    /// Key used for this class in template placeholders and data file names.
    pub fn key(self) -> &'static str {
        match self {
            EnemyClass::Regular => "regular",
            EnemyClass::Badass => "badass",
        }
    }
}

/// Six category weights for one (enemy class, preset) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: Weight,
    pub uncommon: Weight,
    pub rare: Weight,
    pub veryrare: Weight,
    pub alien: Weight,
    pub legendary: Weight,
}

impl RarityWeights {
    pub fn get(&self, rarity: Rarity) -> Weight {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::VeryRare => self.veryrare,
            Rarity::Alien => self.alien,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn total(&self) -> f64 {
        Rarity::ALL.iter().map(|r| self.get(*r).as_f64()).sum()
    }

    pub fn percentages(&self) -> RarityPercentages {
        let total = self.total();
        let pct = |r: Rarity| pct_chance(self.get(r).as_f64(), total);
        RarityPercentages {
            common: pct(Rarity::Common),
            uncommon: pct(Rarity::Uncommon),
            rare: pct(Rarity::Rare),
            veryrare: pct(Rarity::VeryRare),
            alien: pct(Rarity::Alien),
            legendary: pct(Rarity::Legendary),
        }
    }
}

/// A display percentage. Only ever shown to players in mod comments; the
/// rendered tables always carry the raw weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percent {
    Zero,
    Whole(i64),
    Fraction(f64),
}

impl Percent {
    pub fn value(self) -> f64 {
        match self {
            Percent::Zero => 0.0,
            Percent::Whole(v) => v as f64,
            Percent::Fraction(v) => v,
        }
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percent::Zero => f.write_str("0"),
            Percent::Whole(v) => write!(f, "{}", v),
            Percent::Fraction(v) => write!(f, "{}", Weight::Float(*v)),
        }
    }
}

/// `weight / total * 100`, rounded to a whole number above 1% and to two
/// decimals at or below it.
pub fn pct_chance(weight: f64, total: f64) -> Percent {
    if total <= 0.0 {
        return Percent::Zero;
    }
    let chance = weight / total * 100.0;
    if chance == 0.0 {
        Percent::Zero
    } else if chance > 1.0 {
        Percent::Whole(chance.round_ties_even() as i64)
    } else {
        Percent::Fraction(round_places(chance, 2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityPercentages {
    pub common: Percent,
    pub uncommon: Percent,
    pub rare: Percent,
    pub veryrare: Percent,
    pub alien: Percent,
    pub legendary: Percent,
}

impl RarityPercentages {
    pub fn get(&self, rarity: Rarity) -> Percent {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::VeryRare => self.veryrare,
            Rarity::Alien => self.alien,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn sum(&self) -> f64 {
        Rarity::ALL.iter().map(|r| self.get(*r).value()).sum()
    }
}
