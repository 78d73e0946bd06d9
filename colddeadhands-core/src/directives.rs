//! Data-driven level hotfixes for boss drops and one-off pool fixes.

use serde::{Deserialize, Serialize};

use crate::balanced::{render_balanced_item, render_balanced_items, DropTableEntry};
use crate::data::{BossTier, ClassConfig, WeaponType};
use crate::hotfix::DirectiveRegistry;
use crate::number::Weight;
use crate::{GeneratorError, Result};

/// How likely a boss is to drop one of its unique items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chance {
    /// The tier's unique drop chance.
    Unique,
    /// The tier's rare drop chance.
    Rare,
    Fixed(Weight),
    /// The rare chance split between this many items.
    RareDiv(Weight),
    /// The unique chance, but never above this value.
    UniqueCapped(Weight),
}

impl Chance {
    pub fn resolve(self, tier: &BossTier) -> Result<Weight> {
        let chance = match self {
            Chance::Unique => tier.unique_pct,
            Chance::Rare => tier.rare_pct,
            Chance::Fixed(w) => w,
            Chance::RareDiv(d) => {
                if d == Weight::ZERO {
                    return Err(GeneratorError::Config(
                        "rare_div chance divides the rare chance by zero".to_string(),
                    ));
                }
                tier.rare_pct / d
            }
            Chance::UniqueCapped(cap) => {
                if tier.unique_pct > cap {
                    cap
                } else {
                    tier.unique_pct
                }
            }
        };
        Ok(chance)
    }

    /// The chance when no boss tier applies. Only fixed chances have one.
    fn fixed(self) -> Option<Weight> {
        match self {
            Chance::Fixed(w) => Some(w),
            _ => None,
        }
    }
}

/// A pool named outright, or one of the shared boss-level pools by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolRef {
    Level { level_pool: usize },
    Named(String),
}

impl PoolRef {
    pub fn resolve<'a>(&'a self, level_pools: &'a [String]) -> Result<&'a str> {
        match self {
            PoolRef::Named(name) => Ok(name.as_str()),
            PoolRef::Level { level_pool } => level_pools
                .get(*level_pool)
                .map(String::as_str)
                .ok_or_else(|| {
                    GeneratorError::Config(format!("level pool {} is not defined", level_pool))
                }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueGear {
    pub item: String,
    pub chance: Chance,
    /// Set when `item` is a single weapon or item rather than a pool.
    #[serde(default)]
    pub balance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepWeight {
    /// The regular enemy drop probability for a weapon type.
    DropProb(WeaponType),
    Fixed(Weight),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BalancedTarget {
    Pool { pool: String },
    RarityPool { rarity_pool: WeaponType },
    Item { balance_item: String, balance: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancedEntry {
    #[serde(flatten)]
    pub target: BalancedTarget,
    pub weight: StepWeight,
}

/// One hotfix described in the data tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveStep {
    BossPool {
        id: String,
        #[serde(default)]
        level: String,
        pool: PoolRef,
        #[serde(default)]
        default_gear: Option<String>,
        unique_gear: Vec<UniqueGear>,
    },
    DiplPool {
        id: String,
        #[serde(rename = "class")]
        class_name: String,
        index: usize,
        pool: PoolRef,
        #[serde(default)]
        level: String,
    },
    PtCiplPool {
        id: String,
        #[serde(rename = "class")]
        class_name: String,
        playthrough: usize,
        index: usize,
        pool: PoolRef,
        #[serde(default)]
        level: String,
    },
    DiplProb {
        id: String,
        #[serde(rename = "class")]
        class_name: String,
        index: usize,
        #[serde(default)]
        level: String,
        #[serde(default)]
        prob: Option<Weight>,
    },
    PtCiplProb {
        id: String,
        #[serde(rename = "class")]
        class_name: String,
        playthrough: usize,
        index: usize,
        #[serde(default)]
        level: String,
        #[serde(default)]
        prob: Option<Weight>,
    },
    BiProb {
        id: String,
        #[serde(rename = "class")]
        class_name: String,
        index: usize,
        #[serde(default)]
        level: String,
        #[serde(default)]
        prob: Option<Weight>,
    },
    BalancedItems {
        id: String,
        category: String,
        #[serde(default)]
        level: String,
        object: String,
        entries: Vec<BalancedEntry>,
    },
    Raw {
        id: String,
        category: String,
        body: String,
    },
}

/// What a step may draw on while being applied.
pub struct StepContext<'a> {
    pub tier: Option<&'a BossTier>,
    pub level_pools: &'a [String],
    pub drop_config: &'a ClassConfig,
    pub activated: bool,
}

impl DirectiveStep {
    pub fn id(&self) -> &str {
        match self {
            DirectiveStep::BossPool { id, .. }
            | DirectiveStep::DiplPool { id, .. }
            | DirectiveStep::PtCiplPool { id, .. }
            | DirectiveStep::DiplProb { id, .. }
            | DirectiveStep::PtCiplProb { id, .. }
            | DirectiveStep::BiProb { id, .. }
            | DirectiveStep::BalancedItems { id, .. }
            | DirectiveStep::Raw { id, .. } => id,
        }
    }

    /// Build this step's hotfix and register it under its id.
    pub fn apply<R>(&self, registry: &mut R, ctx: &StepContext<'_>) -> Result<()>
    where
        R: DirectiveRegistry + ?Sized,
    {
        let (category, body) = match self {
            DirectiveStep::BossPool {
                id,
                level,
                pool,
                default_gear,
                unique_gear,
            } => {
                let entries = boss_pool_entries(id, default_gear.as_deref(), unique_gear, ctx.tier)?;
                let pool = pool.resolve(ctx.level_pools)?;
                ("BossPool", boss_pool_body(level, pool, &entries))
            }
            DirectiveStep::DiplPool {
                class_name,
                index,
                pool,
                level,
                ..
            } => (
                "DIPLItemPool",
                dipl_pool_body(level, class_name, *index, pool.resolve(ctx.level_pools)?),
            ),
            DirectiveStep::PtCiplPool {
                class_name,
                playthrough,
                index,
                pool,
                level,
                ..
            } => (
                "PTCIPLItemPool",
                pt_cipl_pool_body(
                    level,
                    class_name,
                    *playthrough,
                    *index,
                    pool.resolve(ctx.level_pools)?,
                ),
            ),
            DirectiveStep::DiplProb {
                class_name,
                index,
                level,
                prob,
                ..
            } => (
                DISABLE_CATEGORY,
                prob_body(
                    level,
                    class_name,
                    &format!("DefaultItemPoolList[{}].PoolProbability", index),
                    *prob,
                ),
            ),
            DirectiveStep::PtCiplProb {
                class_name,
                playthrough,
                index,
                level,
                prob,
                ..
            } => (
                DISABLE_CATEGORY,
                prob_body(
                    level,
                    class_name,
                    &format!(
                        "PlayThroughs[{}].CustomItemPoolList[{}].PoolProbability",
                        playthrough, index
                    ),
                    *prob,
                ),
            ),
            DirectiveStep::BiProb {
                class_name,
                index,
                level,
                prob,
                ..
            } => (
                DISABLE_CATEGORY,
                prob_body(
                    level,
                    class_name,
                    &format!("BalancedItems[{}].Probability", index),
                    *prob,
                ),
            ),
            DirectiveStep::BalancedItems {
                category,
                level,
                object,
                entries,
                ..
            } => {
                let rendered: Vec<DropTableEntry> = entries
                    .iter()
                    .map(|entry| balanced_entry(entry, ctx.drop_config))
                    .collect();
                (
                    category.as_str(),
                    level_table_body(BodyLayout::Stacked, level, object, &rendered),
                )
            }
            DirectiveStep::Raw { category, body, .. } => (category.as_str(), body.clone()),
        };

        registry.register(self.id(), category, &body, ctx.activated)
    }
}

pub const DISABLE_CATEGORY: &str = "Disable";

fn balanced_entry(entry: &BalancedEntry, config: &ClassConfig) -> DropTableEntry {
    let weight = match entry.weight {
        StepWeight::DropProb(weapon) => *config.drop_probs.get(weapon),
        StepWeight::Fixed(w) => w,
    };
    match &entry.target {
        BalancedTarget::Pool { pool } => DropTableEntry::pool(pool.as_str(), weight),
        BalancedTarget::RarityPool { rarity_pool } => {
            DropTableEntry::pool(config.rarity_pools.get(*rarity_pool).as_str(), weight)
        }
        BalancedTarget::Item {
            balance_item,
            balance,
        } => DropTableEntry::balance(balance_item.as_str(), weight, balance.as_str()),
    }
}

/// Unique gear first, then the boss's regular pool filling whatever
/// probability the uniques leave.
fn boss_pool_entries(
    id: &str,
    default_gear: Option<&str>,
    unique_gear: &[UniqueGear],
    tier: Option<&BossTier>,
) -> Result<Vec<DropTableEntry>> {
    let mut total = Weight::ZERO;
    let mut entries = Vec::with_capacity(unique_gear.len() + 1);
    for gear in unique_gear {
        let chance = match tier {
            Some(tier) => gear.chance.resolve(tier)?,
            None => gear.chance.fixed().ok_or_else(|| {
                GeneratorError::Config(format!(
                    "boss pool '{}' uses a tier-relative chance outside a boss tier",
                    id
                ))
            })?,
        };
        total = total + chance;
        entries.push(match &gear.balance {
            Some(def_type) => DropTableEntry::balance(gear.item.as_str(), chance, def_type.as_str()),
            None => DropTableEntry::pool(gear.item.as_str(), chance),
        });
    }
    if let Some(default_gear) = default_gear {
        if total < Weight::ONE {
            entries.push(DropTableEntry::pool(
                default_gear,
                (Weight::ONE - total).round_to(6),
            ));
        }
    }
    Ok(entries)
}

pub fn boss_pool_body(level: &str, pool: &str, entries: &[DropTableEntry]) -> String {
    level_table_body(BodyLayout::Inline, level, pool, entries)
}

/// How the level and object open a hotfix body. Whitespace collapses to
/// single spaces on registration, so the line breaks become spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLayout {
    /// `level,object,attribute` on one line.
    Inline,
    /// Level and object each end their own line.
    Stacked,
}

impl BodyLayout {
    fn target(self, level: &str, object: &str, attribute: &str) -> String {
        match self {
            BodyLayout::Inline => format!("{},{},{}", level, object, attribute),
            BodyLayout::Stacked if level.is_empty() => {
                format!(",{},\n        {}", object, attribute)
            }
            BodyLayout::Stacked => format!("{},\n        {},\n        {}", level, object, attribute),
        }
    }
}

/// Replace an object's whole `BalancedItems` through a level hotfix.
pub fn level_table_body(
    layout: BodyLayout,
    level: &str,
    object: &str,
    entries: &[DropTableEntry],
) -> String {
    format!(
        "{},,{}",
        layout.target(level, object, "BalancedItems"),
        render_balanced_items(entries)
    )
}

/// Replace a single `BalancedItems[index]` element.
pub fn balanced_slot_body(
    layout: BodyLayout,
    level: &str,
    object: &str,
    index: usize,
    entry: &DropTableEntry,
) -> String {
    format!(
        "{},,{}",
        layout.target(level, object, &format!("BalancedItems[{}]", index)),
        render_balanced_item(entry)
    )
}

fn pool_list_entry_body(level: &str, class_name: &str, attribute: &str, pool: &str) -> String {
    format!(
        "{},{},{},,
        (
            ItemPool=ItemPoolDefinition'{}',
            PoolProbability=(
                BaseValueConstant=1,
                BaseValueAttribute=None,
                InitializationDefinition=None,
                BaseValueScaleConstant=1
            )
        )",
        level, class_name, attribute, pool
    )
}

pub fn dipl_pool_body(level: &str, class_name: &str, index: usize, pool: &str) -> String {
    pool_list_entry_body(
        level,
        class_name,
        &format!("DefaultItemPoolList[{}]", index),
        pool,
    )
}

pub fn pt_cipl_pool_body(
    level: &str,
    class_name: &str,
    playthrough: usize,
    index: usize,
    pool: &str,
) -> String {
    pool_list_entry_body(
        level,
        class_name,
        &format!("PlayThroughs[{}].CustomItemPoolList[{}]", playthrough, index),
        pool,
    )
}

/// Set a probability attribute. A missing `prob` disables the slot.
pub fn prob_body(level: &str, class_name: &str, attribute: &str, prob: Option<Weight>) -> String {
    format!(
        "{},{},{},,
        (
            BaseValueConstant={},
            BaseValueAttribute=None,
            InitializationDefinition=None,
            BaseValueScaleConstant=1
        )",
        level,
        class_name,
        attribute,
        prob.unwrap_or(Weight::ZERO)
    )
}
