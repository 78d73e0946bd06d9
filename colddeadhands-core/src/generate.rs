//! The generation pipeline: data tables in, one mod file out.

use tracing::{debug, info};

use crate::assign::emit_assignments;
use crate::balanced::{render_balanced_set, DropTableEntry, INVENTORY_BALANCE, WEAPON_BALANCE};
use crate::data::{
    ClassConfig, GameData, GlobalPools, LevelRarityTable, PoolCategory, RarityEntry, WeaponType,
};
use crate::directives::{balanced_slot_body, level_table_body, BodyLayout, StepContext};
use crate::hotfix::{DirectiveRegistry, HotfixRegistry};
use crate::number::Weight;
use crate::rarity::{EnemyClass, Rarity, RarityPreset, RarityWeights};
use crate::template::{load_template, render_named, Substitutions};
use crate::{Result, MOD_NAME, MOD_VERSION};
use std::path::Path;

pub const RARITY_TEMPLATE: &str = "rarity.txt";
pub const BOSSES_TEMPLATE: &str = "bosses.txt";
pub const MOD_TEMPLATE: &str = "mod.txt";

const INDENT_12: &str = "            ";
const INDENT_16: &str = "                ";

/// The three template files.
#[derive(Debug, Clone)]
pub struct Templates {
    pub rarity: String,
    pub bosses: String,
    pub mod_file: String,
}

impl Templates {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            rarity: load_template(dir, RARITY_TEMPLATE)?,
            bosses: load_template(dir, BOSSES_TEMPLATE)?,
            mod_file: load_template(dir, MOD_TEMPLATE)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedMod {
    pub text: String,
    /// Human-readable summary of the computed tables.
    pub report: String,
}

/// Presentation of a mutually exclusive section. Only the first option of a
/// group is live; the others are emitted commented out and switched off.
#[derive(Debug, Clone, Copy)]
struct Toggle {
    line_prefix: &'static str,
    line_suffix: &'static str,
    activated: bool,
}

impl Toggle {
    fn for_option(index: usize) -> Self {
        if index == 0 {
            Toggle {
                line_prefix: "",
                line_suffix: "",
                activated: true,
            }
        } else {
            Toggle {
                line_prefix: "#",
                line_suffix: "<off>",
                activated: false,
            }
        }
    }

    fn insert_into(self, subs: &mut Substitutions) {
        subs.insert("line_prefix", self.line_prefix);
        subs.insert("line_suffix", self.line_suffix);
    }
}

pub fn generate(data: &GameData, templates: &Templates) -> Result<GeneratedMod> {
    let mut hotfixes = HotfixRegistry::new();
    let mut subs = Substitutions::new();
    let mut log = String::new();

    log.push_str(&format!("{} v{}\n\n", MOD_NAME, MOD_VERSION));

    info!("Redirecting world drops");
    let disables = disable_world_drops(&data.pools, &mut hotfixes)?;
    subs.insert("other.disable_world_sets", disables);

    info!("Building rarity presets");
    for (idx, preset) in RarityPreset::ALL.into_iter().enumerate() {
        let section = rarity_section(data, preset, Toggle::for_option(idx), &mut hotfixes, templates, &mut log)?;
        subs.insert(format!("rarity_{}", preset.key()), section);
    }

    info!("Building equip pools");
    for class in EnemyClass::ALL {
        let config = data.class(class);
        for category in PoolCategory::ALL {
            if let Some(entries) = equip_entries(config, category) {
                subs.insert(
                    format!("{}.set_equip_{}", class.key(), category.key()),
                    render_balanced_set(config.pool_for(category), &entries),
                );
            }
        }
    }

    info!("Applying global pool fixes");
    let global_ctx = StepContext {
        tier: None,
        level_pools: &data.bosses.level_pools,
        drop_config: &data.regular,
        activated: true,
    };
    for step in &data.pools.directives {
        step.apply(&mut hotfixes, &global_ctx)?;
    }

    info!("Rebuilding legendary pools");
    legendary_pools(&data.pools, &mut hotfixes, &mut subs)?;
    legendary_shields(&data.pools, &mut hotfixes, &mut subs)?;
    log.push_str(&format!(
        "main hotfixes before boss tiers: {}\n\n",
        hotfixes.len()
    ));

    info!("Building boss drop tiers");
    for (idx, tier) in data.bosses.tiers.iter().enumerate() {
        let toggle = Toggle::for_option(idx);
        let mut registry = HotfixRegistry::with_prefix(format!("ApocBoss{}", tier.capitalized_key()));
        let ctx = StepContext {
            tier: Some(tier),
            level_pools: &data.bosses.level_pools,
            drop_config: &data.regular,
            activated: toggle.activated,
        };

        let mut groups = Vec::with_capacity(data.bosses.bosses.len());
        for boss in &data.bosses.bosses {
            let mut lines = Vec::with_capacity(boss.steps.len() + 2);
            lines.push(format!("{}#<{}>", INDENT_12, boss.name));
            for step in &boss.steps {
                step.apply(&mut registry, &ctx)?;
                lines.push(format!("{}{}", INDENT_16, registry.rendered(step.id())?));
            }
            lines.push(format!("{}#</{}>", INDENT_12, boss.name));
            groups.push(lines.join("\n\n"));
        }

        let mut section = Substitutions::new();
        section.insert("boss_label", tier.heading());
        section.insert("unique_pct", tier.unique_pct);
        section.insert("rare_pct", tier.rare_pct);
        section.insert("boss_drops", groups.join("\n\n"));
        subs.insert(
            format!("boss_drops_{}", tier.key),
            render_named(BOSSES_TEMPLATE, &templates.bosses, &section)?,
        );

        debug!(tier = %tier.key, hotfixes = registry.len(), "boss tier built");
        log.push_str(&format!(
            "boss tier {}: unique {}, rare {}, {} hotfixes\n",
            tier.heading(),
            tier.unique_pct,
            tier.rare_pct,
            registry.len()
        ));
    }
    log.push('\n');

    info!("Assigning enemies to custom pools");
    for class in EnemyClass::ALL {
        let block = emit_assignments(data.class(class), &mut hotfixes)?;
        subs.insert(format!("{}.hotfix_assignments", class.key()), block);
        log.push_str(&format!(
            "{} assignments: {}\n",
            class.key(),
            data.class(class).assignments.total()
        ));
    }

    for hotfix in hotfixes.iter() {
        subs.insert(format!("hotfixes.{}", hotfix.name), hotfix);
    }
    subs.insert("mod_name", MOD_NAME);
    subs.insert("mod_version", MOD_VERSION);

    let text = render_named(MOD_TEMPLATE, &templates.mod_file, &subs)?;
    log.push_str(&format!("main hotfixes total: {}\n", hotfixes.len()));
    debug!(hotfixes = hotfixes.len(), "mod file assembled");

    Ok(GeneratedMod { text, report: log })
}

/// Point each listed pool slot at the cash-and-ammo locker pool instead of
/// deleting it, so the remaining weights in the pool are unchanged.
fn disable_world_drops<R>(pools: &GlobalPools, registry: &mut R) -> Result<String>
where
    R: DirectiveRegistry + ?Sized,
{
    let mut lines = Vec::with_capacity(pools.world_drop_disables.len() * 2);
    for slot in &pools.world_drop_disables {
        let n = registry.len();
        let itm_id = format!("disable_balanced_itmpool_{}", n);
        let inv_id = format!("disable_balanced_invbal_{}", n);
        registry.register(
            &itm_id,
            "DisableBalanced",
            &format!(
                ",{},BalancedItems[{}].ItmPoolDefinition,,ItemPoolDefinition'{}'",
                slot.pool, slot.index, pools.world_drop_replacement
            ),
            true,
        )?;
        registry.register(
            &inv_id,
            "DisableBalanced",
            &format!(",{},BalancedItems[{}].InvBalanceDefinition,,None", slot.pool, slot.index),
            true,
        )?;
        lines.push(format!("{}{}", INDENT_12, registry.rendered(&itm_id)?));
        lines.push(format!("{}{}", INDENT_12, registry.rendered(&inv_id)?));
    }
    Ok(lines.join("\n\n"))
}

fn rarity_entries(entries: &[RarityEntry], weights: &RarityWeights) -> Vec<DropTableEntry> {
    entries
        .iter()
        .map(|entry| {
            let weight = weights.get(entry.rarity);
            match &entry.balance {
                Some(def_type) => DropTableEntry::balance(entry.item.as_str(), weight, def_type.as_str()),
                None => DropTableEntry::pool(entry.item.as_str(), weight),
            }
        })
        .collect()
}

fn register_level_table<R>(
    registry: &mut R,
    name: &str,
    table: &LevelRarityTable,
    weights: &RarityWeights,
    activated: bool,
) -> Result<String>
where
    R: DirectiveRegistry + ?Sized,
{
    let body = level_table_body(
        BodyLayout::Stacked,
        &table.level,
        &table.object,
        &rarity_entries(&table.entries, weights),
    );
    registry.register(name, &table.category, &body, activated)?;
    registry.rendered(name)
}

fn rarity_section(
    data: &GameData,
    preset: RarityPreset,
    toggle: Toggle,
    hotfixes: &mut HotfixRegistry,
    templates: &Templates,
    log: &mut String,
) -> Result<String> {
    let mut section = Substitutions::new();
    section.insert("section_label", preset.label());
    toggle.insert_into(&mut section);

    for class in EnemyClass::ALL {
        let config = data.class(class);
        let weights = config.rarities.get(preset);
        let pct = weights.percentages();

        log.push_str(&format!("{} / {}:\n", class.key(), preset.label()));
        for rarity in Rarity::ALL {
            section.insert(format!("{}.weight_{}", class.key(), rarity.key()), weights.get(rarity));
            section.insert(format!("{}.pct_{}", class.key(), rarity.key()), pct.get(rarity));
            log.push_str(&format!(
                "  {:<10} weight {:<8} {}%\n",
                rarity.key(),
                weights.get(rarity).to_string(),
                pct.get(rarity)
            ));
        }
        debug!(
            class = class.key(),
            preset = preset.key(),
            total = weights.total(),
            "rarity weights"
        );

        for table in &data.rarity.class_tables {
            section.insert(
                format!("{}.{}", class.key(), table.name),
                render_balanced_set(
                    config.rarity_target(table.target),
                    &rarity_entries(&table.entries, weights),
                ),
            );
        }
    }

    // Jack's body double lives in the main registry.
    let body_double = &data.rarity.body_double;
    let body_double_id = format!("{}_{}", preset.key(), body_double.id);
    let rendered = register_level_table(
        hotfixes,
        &body_double_id,
        body_double,
        data.class(body_double.enemy_class).rarities.get(preset),
        toggle.activated,
    )?;
    section.insert("body_double_hotfix", rendered);

    let mut gangs = HotfixRegistry::with_prefix(format!("{}TorgueRarity", preset.key()));
    for table in &data.rarity.gang_tables {
        let rendered = register_level_table(
            &mut gangs,
            &table.id,
            table,
            data.class(table.enemy_class).rarities.get(preset),
            toggle.activated,
        )?;
        section.insert(format!("torgue.{}", table.id), rendered);
    }
    log.push_str(&format!("  gang hotfixes: {}\n\n", gangs.len()));

    render_named(RARITY_TEMPLATE, &templates.rarity, &section)
}

/// Weapon-type mix for an equip pool. Shields have no equip stage.
fn equip_entries(config: &ClassConfig, category: PoolCategory) -> Option<Vec<DropTableEntry>> {
    let mixed = |boosted: Option<WeaponType>| -> Vec<DropTableEntry> {
        WeaponType::ALL
            .into_iter()
            .map(|weapon| {
                let prob = *config.drop_probs.get(weapon);
                let weight = if Some(weapon) == boosted {
                    prob * config.weight_scale
                } else {
                    prob
                };
                DropTableEntry::pool(config.rarity_pools.get(weapon).as_str(), weight)
            })
            .collect()
    };
    let single =
        |weapon: WeaponType| vec![DropTableEntry::pool(config.rarity_pools.get(weapon).as_str(), Weight::ONE)];

    match category {
        PoolCategory::All => Some(mixed(None)),
        PoolCategory::Ar => Some(mixed(Some(WeaponType::Ar))),
        PoolCategory::Pistols => Some(mixed(Some(WeaponType::Pistols))),
        PoolCategory::Shotguns => Some(mixed(Some(WeaponType::Shotguns))),
        PoolCategory::Smg => Some(mixed(Some(WeaponType::Smg))),
        PoolCategory::Launchers => Some(single(WeaponType::Launchers)),
        PoolCategory::Snipers => Some(single(WeaponType::Snipers)),
        PoolCategory::OnlyShotguns => Some(single(WeaponType::Shotguns)),
        PoolCategory::Shields => None,
    }
}

/// Each legendary pool is reset to its legendaries plus empty slots, then the
/// uniques, pearls and seraphs are written into those slots one by one.
fn legendary_pools<R>(pools: &GlobalPools, registry: &mut R, subs: &mut Substitutions) -> Result<()>
where
    R: DirectiveRegistry + ?Sized,
{
    const ADD_KINDS: [(&str, &str); 3] = [("unique", "Unique"), ("pearl", "Pearl"), ("seraph", "Seraph")];

    let mut clears = Vec::with_capacity(pools.legendary_pools.len());
    let mut adds: [Vec<String>; 3] = Default::default();

    for gun in &pools.legendary_pools {
        let object = format!("GD_Itempools.WeaponPools.Pool_Weapons_{}_06_Legendary", gun.gun_type);
        let gun_key = gun.gun_type.to_lowercase();
        let extra = gun.uniques.len() + gun.pearls.len() + gun.seraphs.len();

        let entries: Vec<DropTableEntry> = gun
            .legendaries
            .iter()
            .map(|weapon| DropTableEntry::balance(weapon.as_str(), Weight::ONE, WEAPON_BALANCE))
            .chain(std::iter::repeat_with(DropTableEntry::empty).take(extra))
            .collect();
        let clear_id = format!("weapon_pool_clear_{}", gun_key);
        registry.register(
            &clear_id,
            &format!("WeaponPoolClear{}", gun.gun_type),
            &level_table_body(BodyLayout::Stacked, "", &object, &entries),
            true,
        )?;
        clears.push(format!("{}{}", INDENT_12, registry.rendered(&clear_id)?));

        let mut index = gun.legendaries.len();
        let lists = [&gun.uniques, &gun.pearls, &gun.seraphs];
        for (slot, ((prefix, word), list)) in ADD_KINDS.iter().zip(lists).enumerate() {
            for (n, weapon) in list.iter().enumerate() {
                let id = format!("{}_weap_add_{}_{}", prefix, gun_key, n);
                let entry = DropTableEntry::balance(weapon.as_str(), Weight::ONE, WEAPON_BALANCE);
                registry.register(
                    &id,
                    &format!("Weapon{}Add{}", word, gun.gun_type),
                    &balanced_slot_body(BodyLayout::Stacked, "", &object, index, &entry),
                    true,
                )?;
                adds[slot].push(format!("{}{}", INDENT_12, registry.rendered(&id)?));
                index += 1;
            }
        }
    }

    let [uniques, pearls, seraphs] = adds;
    subs.insert("other.legendary_pool_clears", clears.join("\n\n"));
    subs.insert("other.legendary_unique_adds", uniques.join("\n\n"));
    subs.insert("other.legendary_pearl_adds", pearls.join("\n\n"));
    subs.insert("other.legendary_seraph_adds", seraphs.join("\n\n"));
    Ok(())
}

fn legendary_shields<R>(pools: &GlobalPools, registry: &mut R, subs: &mut Substitutions) -> Result<()>
where
    R: DirectiveRegistry + ?Sized,
{
    let mut lines = Vec::new();
    for pool in &pools.legendary_shields {
        for shield in &pool.shields {
            let id = format!("shield_{}", shield.label);
            let entry = DropTableEntry::balance(shield.balance.as_str(), Weight::ONE, INVENTORY_BALANCE);
            registry.register(
                &id,
                "SetBIItem",
                &balanced_slot_body(BodyLayout::Inline, "", &pool.pool, shield.index, &entry),
                true,
            )?;
            lines.push(format!("{}{}", INDENT_12, registry.rendered(&id)?));
        }
    }
    subs.insert("other.legendary_shield_adds", lines.join("\n\n"));
    Ok(())
}
