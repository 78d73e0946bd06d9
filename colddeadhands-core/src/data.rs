use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::assign::{AssignmentKind, AssignmentRecord, Slot};
use crate::directives::DirectiveStep;
use crate::number::Weight;
use crate::rarity::{EnemyClass, Rarity, RarityPreset, RarityWeights};
use crate::{GeneratorError, Result};

pub const REGULAR_FILE: &str = "regular.json";
pub const BADASS_FILE: &str = "badass.json";
pub const RARITY_TABLES_FILE: &str = "rarity_tables.json";
pub const POOLS_FILE: &str = "pools.json";
pub const BOSSES_FILE: &str = "bosses.json";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponType {
    Pistols,
    Ar,
    Smg,
    Shotguns,
    Snipers,
    Launchers,
}

impl WeaponType {
    /// Order of the branches in every mixed-weapon equip table.
    pub const ALL: [WeaponType; 6] = [
        WeaponType::Pistols,
        WeaponType::Ar,
        WeaponType::Smg,
        WeaponType::Shotguns,
        WeaponType::Snipers,
        WeaponType::Launchers,
    ];
}

/// One value per weapon type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponTable<T> {
    pub pistols: T,
    pub ar: T,
    pub smg: T,
    pub shotguns: T,
    pub snipers: T,
    pub launchers: T,
}

impl<T> WeaponTable<T> {
    pub fn get(&self, weapon: WeaponType) -> &T {
        match weapon {
            WeaponType::Pistols => &self.pistols,
            WeaponType::Ar => &self.ar,
            WeaponType::Smg => &self.smg,
            WeaponType::Shotguns => &self.shotguns,
            WeaponType::Snipers => &self.snipers,
            WeaponType::Launchers => &self.launchers,
        }
    }
}

/// The custom pools enemies are pointed at, one per equip profile.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolCategory {
    Ar,
    Pistols,
    Shotguns,
    Smg,
    All,
    Launchers,
    Snipers,
    OnlyShotguns,
    Shields,
}

impl PoolCategory {
    /// Order in which assignments are emitted within each kind.
    pub const ALL: [PoolCategory; 9] = [
        PoolCategory::Ar,
        PoolCategory::Pistols,
        PoolCategory::Shotguns,
        PoolCategory::Smg,
        PoolCategory::All,
        PoolCategory::Launchers,
        PoolCategory::Snipers,
        PoolCategory::OnlyShotguns,
        PoolCategory::Shields,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PoolCategory::Ar => "ar",
            PoolCategory::Pistols => "pistols",
            PoolCategory::Shotguns => "shotguns",
            PoolCategory::Smg => "smg",
            PoolCategory::All => "all",
            PoolCategory::Launchers => "launchers",
            PoolCategory::Snipers => "snipers",
            PoolCategory::OnlyShotguns => "only_shotguns",
            PoolCategory::Shields => "shields",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipPools {
    pub all: String,
    pub ar: String,
    pub launchers: String,
    pub pistols: String,
    pub shotguns: String,
    pub smg: String,
    pub snipers: String,
    pub only_shotguns: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetWeights {
    pub excellent: RarityWeights,
    pub better: RarityWeights,
    pub stock: RarityWeights,
}

impl PresetWeights {
    pub fn get(&self, preset: RarityPreset) -> &RarityWeights {
        match preset {
            RarityPreset::Excellent => &self.excellent,
            RarityPreset::Better => &self.better,
            RarityPreset::Stock => &self.stock,
        }
    }
}

/// Enemy assignment tables, keyed by the pool the listed enemies should use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assignments {
    #[serde(default)]
    pub dipl: BTreeMap<PoolCategory, Vec<(usize, String)>>,
    #[serde(default)]
    pub pt_cipl: BTreeMap<PoolCategory, Vec<(usize, usize, String)>>,
    #[serde(default)]
    pub level_ipl: BTreeMap<PoolCategory, Vec<(String, usize, String)>>,
    #[serde(default)]
    pub dl_ia: BTreeMap<PoolCategory, Vec<(usize, usize, String)>>,
    #[serde(default)]
    pub nipl: BTreeMap<PoolCategory, Vec<(usize, String)>>,
}

impl Assignments {
    /// Records of one kind for one pool category, in declaration order.
    pub fn records(&self, kind: AssignmentKind, category: PoolCategory) -> Vec<AssignmentRecord> {
        match kind {
            AssignmentKind::Dipl => self
                .dipl
                .get(&category)
                .into_iter()
                .flatten()
                .map(|(idx, class)| AssignmentRecord::new(class, Slot::DefaultItemPool(*idx)))
                .collect(),
            AssignmentKind::PtCipl => self
                .pt_cipl
                .get(&category)
                .into_iter()
                .flatten()
                .map(|(pt, cipl, class)| {
                    AssignmentRecord::new(
                        class,
                        Slot::CustomItemPool {
                            playthrough: *pt,
                            index: *cipl,
                        },
                    )
                })
                .collect(),
            AssignmentKind::LevelIpl => self
                .level_ipl
                .get(&category)
                .into_iter()
                .flatten()
                .map(|(level, idx, class)| {
                    AssignmentRecord::new(class, Slot::LevelItemPool(*idx)).in_level(level)
                })
                .collect(),
            AssignmentKind::DlIa => self
                .dl_ia
                .get(&category)
                .into_iter()
                .flatten()
                .map(|(dl, ia, class)| {
                    AssignmentRecord::new(
                        class,
                        Slot::ItemAttachment {
                            loot: *dl,
                            attachment: *ia,
                        },
                    )
                })
                .collect(),
            AssignmentKind::Nipl => self
                .nipl
                .get(&category)
                .into_iter()
                .flatten()
                .map(|(idx, class)| AssignmentRecord::new(class, Slot::NewItemPool(*idx)))
                .collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.dipl.values().map(Vec::len).sum::<usize>()
            + self.pt_cipl.values().map(Vec::len).sum::<usize>()
            + self.level_ipl.values().map(Vec::len).sum::<usize>()
            + self.dl_ia.values().map(Vec::len).sum::<usize>()
            + self.nipl.values().map(Vec::len).sum::<usize>()
    }
}

/// Everything that differs between regular and badass enemies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    pub hotfix_prefix: String,
    pub rarities: PresetWeights,
    pub drop_probs: WeaponTable<Weight>,
    pub weight_scale: Weight,
    pub rarity_pools: WeaponTable<String>,
    pub equip_pools: EquipPools,
    pub shield_pool: String,
    #[serde(default)]
    pub assignments: Assignments,
}

impl ClassConfig {
    /// The custom pool enemies in `category` get pointed at.
    pub fn pool_for(&self, category: PoolCategory) -> &str {
        let pools = &self.equip_pools;
        match category {
            PoolCategory::Ar => &pools.ar,
            PoolCategory::Pistols => &pools.pistols,
            PoolCategory::Shotguns => &pools.shotguns,
            PoolCategory::Smg => &pools.smg,
            PoolCategory::All => &pools.all,
            PoolCategory::Launchers => &pools.launchers,
            PoolCategory::Snipers => &pools.snipers,
            PoolCategory::OnlyShotguns => &pools.only_shotguns,
            PoolCategory::Shields => &self.shield_pool,
        }
    }

    pub fn rarity_target(&self, target: RarityTarget) -> &str {
        match target {
            RarityTarget::Shields => &self.shield_pool,
            RarityTarget::Ar => self.rarity_pools.get(WeaponType::Ar),
            RarityTarget::Launchers => self.rarity_pools.get(WeaponType::Launchers),
            RarityTarget::Pistols => self.rarity_pools.get(WeaponType::Pistols),
            RarityTarget::Smg => self.rarity_pools.get(WeaponType::Smg),
            RarityTarget::Shotguns => self.rarity_pools.get(WeaponType::Shotguns),
            RarityTarget::Snipers => self.rarity_pools.get(WeaponType::Snipers),
        }
    }
}

/// Pool whose BalancedItems a class rarity table replaces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTarget {
    Ar,
    Launchers,
    Pistols,
    Smg,
    Shotguns,
    Snipers,
    Shields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityEntry {
    pub item: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub balance: Option<String>,
}

/// A rarity table rendered as a `set` command on a class pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRarityTable {
    pub name: String,
    pub target: RarityTarget,
    pub entries: Vec<RarityEntry>,
}

/// A rarity table applied to a fixed object through a level hotfix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelRarityTable {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub level: String,
    pub object: String,
    pub enemy_class: EnemyClass,
    pub entries: Vec<RarityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityTables {
    pub class_tables: Vec<ClassRarityTable>,
    pub body_double: LevelRarityTable,
    pub gang_tables: Vec<LevelRarityTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSlot {
    pub pool: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendaryPool {
    pub gun_type: String,
    pub legendaries: Vec<String>,
    #[serde(default)]
    pub uniques: Vec<String>,
    #[serde(default)]
    pub pearls: Vec<String>,
    #[serde(default)]
    pub seraphs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendaryShield {
    pub label: String,
    pub index: usize,
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldPool {
    pub pool: String,
    pub shields: Vec<LegendaryShield>,
}

/// World-level pool edits that apply regardless of enemy class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalPools {
    pub world_drop_replacement: String,
    pub world_drop_disables: Vec<PoolSlot>,
    pub legendary_pools: Vec<LegendaryPool>,
    pub legendary_shields: Vec<ShieldPool>,
    pub directives: Vec<DirectiveStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTier {
    pub label: String,
    pub key: String,
    pub unique_pct: Weight,
    pub rare_pct: Weight,
}

impl BossTier {
    /// Section heading, e.g. `Improved (33% Uniques, 60% Rares)`.
    pub fn heading(&self) -> String {
        format!(
            "{} ({}% Uniques, {}% Rares)",
            self.label,
            (self.unique_pct * Weight::Int(100)).round_whole(),
            (self.rare_pct * Weight::Int(100)).round_whole()
        )
    }

    /// `key` with its first letter upper-cased, used in hotfix prefixes.
    pub fn capitalized_key(&self) -> String {
        let mut chars = self.key.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossGroup {
    pub name: String,
    pub steps: Vec<DirectiveStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTables {
    #[serde(default)]
    pub level_pools: Vec<String>,
    pub tiers: Vec<BossTier>,
    pub bosses: Vec<BossGroup>,
}

/// All static tables the generator runs from.
#[derive(Debug, Clone)]
pub struct GameData {
    pub regular: ClassConfig,
    pub badass: ClassConfig,
    pub rarity: RarityTables,
    pub pools: GlobalPools,
    pub bosses: BossTables,
}

impl GameData {
    pub fn load(dir: &Path) -> Result<Self> {
        let data = Self {
            regular: load_json(&dir.join(REGULAR_FILE))?,
            badass: load_json(&dir.join(BADASS_FILE))?,
            rarity: load_json(&dir.join(RARITY_TABLES_FILE))?,
            pools: load_json(&dir.join(POOLS_FILE))?,
            bosses: load_json(&dir.join(BOSSES_FILE))?,
        };
        if data.bosses.tiers.is_empty() {
            return Err(GeneratorError::Config(format!(
                "{} defines no boss tiers",
                dir.join(BOSSES_FILE).display()
            )));
        }
        Ok(data)
    }

    pub fn class(&self, class: EnemyClass) -> &ClassConfig {
        match class {
            EnemyClass::Regular => &self.regular,
            EnemyClass::Badass => &self.badass,
        }
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(GeneratorError::Config(format!(
            "Data file does not exist: {}",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| GeneratorError::Json {
        path: path.to_path_buf(),
        source,
    })
}
