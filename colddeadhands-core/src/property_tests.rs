//! Property tests for the weight tables, the renderer and the template filler.

use proptest::prelude::*;

use crate::balanced::{render_balanced_items, DropTableEntry, WEAPON_BALANCE};
use crate::number::Weight;
use crate::rarity::{pct_chance, Rarity, RarityWeights};
use crate::template::{render_template, Substitutions};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators
// ═══════════════════════════════════════════════════════════════════════════

/// Six integer weights with a non-zero total.
fn weights_strategy() -> impl Strategy<Value = RarityWeights> {
    (1..=10_000i64, 0..=10_000i64, 0..=10_000i64, 0..=1_000i64, 0..=1_000i64, 0..=100i64).prop_map(
        |(common, uncommon, rare, veryrare, alien, legendary)| RarityWeights {
            common: Weight::Int(common),
            uncommon: Weight::Int(uncommon),
            rare: Weight::Int(rare),
            veryrare: Weight::Int(veryrare),
            alien: Weight::Int(alien),
            legendary: Weight::Int(legendary),
        },
    )
}

fn entry_strategy() -> impl Strategy<Value = DropTableEntry> {
    prop_oneof![
        ("[A-Za-z_]{1,12}", 0..=500i64).prop_map(|(name, w)| DropTableEntry::pool(name, w)),
        ("[A-Za-z_]{1,12}", 0.0f64..10.0).prop_map(|(name, w)| DropTableEntry::balance(name, w, WEAPON_BALANCE)),
        Just(DropTableEntry::empty()),
    ]
}

fn entries_strategy() -> impl Strategy<Value = Vec<DropTableEntry>> {
    prop::collection::vec(entry_strategy(), 0..12).prop_map(|mut entries| {
        // Unique names so positions can be located in the output.
        for (idx, entry) in entries.iter_mut().enumerate() {
            if let Some(name) = entry.target.as_mut() {
                name.push_str(&format!("_{}", idx));
            }
        }
        entries
    })
}

fn target_positions(rendered: &str, entries: &[DropTableEntry]) -> Vec<usize> {
    entries
        .iter()
        .filter_map(|e| e.target.as_ref())
        .map(|name| rendered.find(&format!("'{}'", name)).unwrap_or(usize::MAX))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Display percentages stay within rounding distance of 100.
    #[test]
    fn prop_percentages_sum_to_about_100(weights in weights_strategy()) {
        let sum = weights.percentages().sum();
        prop_assert!((sum - 100.0).abs() <= 3.0, "sum {} too far from 100", sum);
    }

    /// Raising one weight never lowers its displayed share.
    #[test]
    fn prop_percentage_is_monotonic(
        weights in weights_strategy(),
        rarity_idx in 0usize..6,
        bump in 1..=5_000i64,
    ) {
        let rarity = Rarity::ALL[rarity_idx];
        let before = weights.percentages().get(rarity).value();

        let mut raised = weights;
        let bumped = raised.get(rarity) + Weight::Int(bump);
        match rarity {
            Rarity::Common => raised.common = bumped,
            Rarity::Uncommon => raised.uncommon = bumped,
            Rarity::Rare => raised.rare = bumped,
            Rarity::VeryRare => raised.veryrare = bumped,
            Rarity::Alien => raised.alien = bumped,
            Rarity::Legendary => raised.legendary = bumped,
        }
        let after = raised.percentages().get(rarity).value();
        prop_assert!(after >= before, "{:?}: {} -> {}", rarity, before, after);
    }

    /// Rounding an already rounded percentage changes nothing.
    #[test]
    fn prop_rounding_is_idempotent(weight in 0..=10_000i64, rest in 1..=10_000i64) {
        let once = pct_chance(weight as f64, (weight + rest) as f64);
        let twice = pct_chance(once.value(), 100.0);
        prop_assert!((once.value() - twice.value()).abs() < 1e-9, "{} -> {}", once, twice);
    }

    /// Every entry is rendered, in input order, and rendering is repeatable.
    #[test]
    fn prop_renderer_preserves_order_and_count(entries in entries_strategy()) {
        let rendered = render_balanced_items(&entries);
        prop_assert_eq!(rendered.matches("bDropOnDeath=True").count(), entries.len());
        prop_assert_eq!(&rendered, &render_balanced_items(&entries));

        let positions = target_positions(&rendered, &entries);
        prop_assert!(positions.iter().all(|p| *p != usize::MAX));
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let reversed: Vec<DropTableEntry> = entries.iter().rev().cloned().collect();
        let rendered_rev = render_balanced_items(&reversed);
        let rev_positions = target_positions(&rendered_rev, &reversed);
        prop_assert!(rev_positions.windows(2).all(|w| w[0] < w[1]));
    }

    /// Float spellings read back to the same value.
    #[test]
    fn prop_float_spelling_round_trips(value in prop::num::f64::NORMAL | prop::num::f64::ZERO) {
        let spelled = Weight::Float(value).to_string();
        let parsed: f64 = spelled.parse().unwrap();
        prop_assert_eq!(parsed, value);
    }

    /// Substituted values are inserted verbatim, braces included.
    #[test]
    fn prop_values_are_inserted_verbatim(value in ".*", key in "[a-z]{1,8}(\\.[a-z_]{1,8})?") {
        let mut subs = Substitutions::new();
        subs.insert(key.clone(), &value);
        let rendered = render_template(&format!("<{{{}}}>", key), &subs).unwrap();
        prop_assert_eq!(rendered, format!("<{}>", value));
    }
}
