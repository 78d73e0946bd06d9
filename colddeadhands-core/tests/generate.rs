use std::fs;
use std::path::{Path, PathBuf};

use colddeadhands_core::rarity::{EnemyClass, Percent, Rarity, RarityPreset};
use colddeadhands_core::{output_file_name, run, GameData, GeneratorError, GeneratorSettings, DEBUG_LOG_NAME};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

fn settings(output: &Path, debug: bool) -> GeneratorSettings {
    GeneratorSettings {
        data_path: repo_root().join("data"),
        template_path: repo_root().join("templates"),
        output_path: output.to_path_buf(),
        debug,
    }
}

fn generate_into(dir: &Path) -> String {
    run(settings(dir, false)).unwrap();
    fs::read_to_string(dir.join(output_file_name())).unwrap()
}

fn line_with<'a>(text: &'a str, needle: &str) -> &'a str {
    text.lines()
        .find(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no line containing {needle}"))
}

#[test]
fn repeated_runs_are_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let a = generate_into(first.path());
    let b = generate_into(second.path());
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn output_is_fully_substituted() {
    let dir = tempfile::tempdir().unwrap();
    let text = generate_into(dir.path());
    assert!(text.starts_with("BL2\n#<BL2 Cold Dead Hands>"));
    assert!(text.contains("BL2 Cold Dead Hands v1.0.0-prerelease"));
    assert!(!text.contains('{'));
    assert!(!text.contains('}'));
    assert!(text.contains("#<Enemies Have Excellent Gear>"));
    assert!(text.contains("#<Improved (33% Uniques, 60% Rares)>"));
}

#[test]
fn stock_regular_percentages() {
    let data = GameData::load(&repo_root().join("data")).unwrap();
    let pct = data
        .class(EnemyClass::Regular)
        .rarities
        .get(RarityPreset::Stock)
        .percentages();
    assert_eq!(pct.get(Rarity::Common), Percent::Whole(90));
    assert_eq!(pct.get(Rarity::Uncommon), Percent::Whole(9));
    assert_eq!(pct.get(Rarity::Rare), Percent::Fraction(0.9));
    assert_eq!(pct.get(Rarity::VeryRare), Percent::Fraction(0.09));
    assert_eq!(pct.get(Rarity::Alien), Percent::Fraction(0.09));
    assert_eq!(pct.get(Rarity::Legendary), Percent::Fraction(0.01));
    assert!((pct.sum() - 100.0).abs() < 1.0);
}

#[test]
fn only_the_first_option_of_each_group_is_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let text = generate_into(dir.path());

    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBodyDouble1\"").ends_with("<on>"));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBodyDouble3\"").ends_with("<off>"));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-excellentTorgueRarityEquip1\"").ends_with("<on>"));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-betterTorgueRarityEquip1\"").ends_with("<off>"));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBossGuaranteedBossPool1\"").ends_with("<on>"));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBossStockBossPool1\"").ends_with("<off>"));
}

#[test]
fn enemy_assignments_use_the_class_pools() {
    let dir = tempfile::tempdir().unwrap();
    let text = generate_into(dir.path());
    let data = GameData::load(&repo_root().join("data")).unwrap();

    let total = data.regular.assignments.total() + data.badass.assignments.total();
    assert_eq!(text.matches("SparkLevelPatchEntry-ApocEnemyDrop").count(), total);

    let first = line_with(&text, "\"SparkLevelPatchEntry-ApocEnemyDrop1\"");
    assert!(first.starts_with("                #<hotfix>"));
    assert!(first.contains(&format!("ItemPoolDefinition'{}'", data.regular.equip_pools.ar)));
}

#[test]
fn hotfix_bodies_keep_their_authored_spacing() {
    let dir = tempfile::tempdir().unwrap();
    let text = generate_into(dir.path());

    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBodyDouble1\"").contains(
        "<value>\"HyperionCity_P, GD_JacksBodyDouble.WeaponPools.Pool_Weapons_JackBodyDouble_EnemyUse, \
         BalancedItems,,( ( ItmPoolDefinition=None,"
    ));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocTorgueEquip1\"").contains(
        "<value>\",GD_Iris_ItemPoolsEnemyUse.WeaponPools.Pool_AngelGang_All_ButLaunchers_Use, BalancedItems,,( ( "
    ));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBossGuaranteedBossPool1\"").contains(
        "<value>\"Cove_P,GD_CustomItemPools_allium.Mercenary.AlliumXmasSkins,BalancedItems,,( ( \
         ItmPoolDefinition=ItemPoolDefinition'GD_Itempools.Runnables.Pool_WarMong',"
    ));
    assert!(line_with(&text, "\"SparkLevelPatchEntry-ApocBossGuaranteedDIPLItemPool1\"").contains(
        "<value>\"Cove_P,GD_Population_Midget.Balance.PawnBalance_MidgetBadass,DefaultItemPoolList[0],, \
         ( ItemPool=ItemPoolDefinition'GD_CustomItemPools_allium.Mercenary.AlliumXmasSkins', \
         PoolProbability=( BaseValueConstant=1, BaseValueAttribute=None, \
         InitializationDefinition=None, BaseValueScaleConstant=1 ) )\"</value>"
    ));
}

#[test]
fn debug_run_writes_generation_log() {
    let dir = tempfile::tempdir().unwrap();
    run(settings(dir.path(), true)).unwrap();
    let log = fs::read_to_string(dir.path().join(DEBUG_LOG_NAME)).unwrap();
    assert!(log.contains("regular / Enemies Have Roughly Stock Gear:"));
    assert!(log.contains("boss tier Guaranteed (100% Uniques, 100% Rares)"));
    assert!(log.contains("main hotfixes total:"));
}

#[test]
fn missing_templates_abort_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let empty_templates = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path(), false);
    settings.template_path = empty_templates.path().to_path_buf();

    let err = run(settings).unwrap_err();
    assert!(matches!(err, GeneratorError::Config(msg) if msg.contains("rarity.txt")));
    assert!(!dir.path().join(output_file_name()).exists());
}

#[test]
fn missing_placeholder_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let templates = tempfile::tempdir().unwrap();
    for name in ["rarity.txt", "bosses.txt"] {
        fs::copy(repo_root().join("templates").join(name), templates.path().join(name)).unwrap();
    }
    fs::write(templates.path().join("mod.txt"), "#<{mod_name}>\n{no_such_value}\n").unwrap();

    let mut settings = settings(dir.path(), false);
    settings.template_path = templates.path().to_path_buf();
    let err = run(settings).unwrap_err();
    assert!(matches!(err, GeneratorError::Template { ref template, .. } if template == "mod.txt"));
    assert!(err.to_string().contains("no_such_value"));
    assert!(err.to_string().contains("line 2"));
    assert!(!dir.path().join(output_file_name()).exists());
}
