//! Rendering of `BalancedItems` arrays, the weighted-choice tables that item
//! pools are built from.

use crate::number::Weight;

/// Object type prefix used when an entry names a weapon directly.
pub const WEAPON_BALANCE: &str = "WeaponBalanceDefinition";
/// Object type prefix used for shields and other non-weapon gear.
pub const INVENTORY_BALANCE: &str = "InventoryBalanceDefinition";

/// How a drop table entry's target is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropKind {
    /// The target is another item pool (`ItmPoolDefinition`).
    Pool,
    /// The target is a single item, linked through `InvBalanceDefinition`
    /// with the given object type.
    Balance(String),
}

/// One weighted branch of a `BalancedItems` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableEntry {
    pub target: Option<String>,
    pub weight: Weight,
    pub kind: DropKind,
}

impl DropTableEntry {
    pub fn pool(target: impl Into<String>, weight: impl Into<Weight>) -> Self {
        Self {
            target: Some(target.into()),
            weight: weight.into(),
            kind: DropKind::Pool,
        }
    }

    pub fn balance(
        target: impl Into<String>,
        weight: impl Into<Weight>,
        def_type: impl Into<String>,
    ) -> Self {
        Self {
            target: Some(target.into()),
            weight: weight.into(),
            kind: DropKind::Balance(def_type.into()),
        }
    }

    /// A placeholder slot. Keeps array indices stable for later single-slot
    /// edits.
    pub fn empty() -> Self {
        Self {
            target: None,
            weight: Weight::ZERO,
            kind: DropKind::Pool,
        }
    }

    /// The `(ItmPoolDefinition, InvBalanceDefinition)` pair. At most one side
    /// is ever set.
    fn references(&self) -> (String, String) {
        match (&self.target, &self.kind) {
            (None, _) => ("None".to_string(), "None".to_string()),
            (Some(name), DropKind::Pool) => {
                (format!("ItemPoolDefinition'{}'", name), "None".to_string())
            }
            (Some(name), DropKind::Balance(def_type)) => {
                ("None".to_string(), format!("{}'{}'", def_type, name))
            }
        }
    }
}

/// Render a single array element, as used by both full tables and
/// `BalancedItems[n]` edits.
pub fn render_balanced_item(entry: &DropTableEntry) -> String {
    let (itm_pool, inv_bal) = entry.references();
    format!(
        "
            (
                ItmPoolDefinition={},
                InvBalanceDefinition={},
                Probability=(
                    BaseValueConstant={},
                    BaseValueAttribute=None,
                    InitializationDefinition=None,
                    BaseValueScaleConstant=1
                ),
                bDropOnDeath=True
            )
            ",
        itm_pool, inv_bal, entry.weight
    )
}

/// Render the full parenthesised array. Entry order is preserved.
pub fn render_balanced_items(entries: &[DropTableEntry]) -> String {
    let items: Vec<String> = entries.iter().map(render_balanced_item).collect();
    format!("({})", items.join(","))
}

/// A console `set` command replacing an object's whole `BalancedItems`.
pub fn render_balanced_set(object: &str, entries: &[DropTableEntry]) -> String {
    format!("set {} BalancedItems\n{}", object, render_balanced_items(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_entry_uses_itm_pool_reference() {
        let out = render_balanced_item(&DropTableEntry::pool("GD_Pool.Test", 100));
        assert!(out.contains("ItmPoolDefinition=ItemPoolDefinition'GD_Pool.Test',"));
        assert!(out.contains("InvBalanceDefinition=None,"));
        assert!(out.contains("BaseValueConstant=100,"));
        assert!(out.contains("bDropOnDeath=True"));
    }

    #[test]
    fn balance_entry_uses_inv_balance_reference() {
        let entry = DropTableEntry::balance("GD_Weap.Gun", 1, WEAPON_BALANCE);
        let out = render_balanced_item(&entry);
        assert!(out.contains("ItmPoolDefinition=None,"));
        assert!(out.contains("InvBalanceDefinition=WeaponBalanceDefinition'GD_Weap.Gun',"));
    }

    #[test]
    fn empty_entry_is_rendered_not_omitted() {
        let out = render_balanced_items(&[DropTableEntry::empty(), DropTableEntry::empty()]);
        assert_eq!(out.matches("ItmPoolDefinition=None").count(), 2);
        assert_eq!(out.matches("InvBalanceDefinition=None").count(), 2);
        assert_eq!(out.matches("BaseValueConstant=0,").count(), 2);
    }

    #[test]
    fn array_is_wrapped_and_comma_joined() {
        let out = render_balanced_items(&[
            DropTableEntry::pool("A", 1),
            DropTableEntry::pool("B", Weight::Float(0.5)),
        ]);
        assert!(out.starts_with("(\n            (\n"));
        assert!(out.ends_with(")\n            )"));
        assert!(out.contains(")\n            ,\n            (\n"));
        let a = out.find("'A'").unwrap();
        let b = out.find("'B'").unwrap();
        assert!(a < b);
        assert!(out.contains("BaseValueConstant=0.5,"));
    }

    #[test]
    fn set_command_names_the_object() {
        let out = render_balanced_set("GD_Obj.Pool", &[DropTableEntry::pool("A", 1)]);
        assert!(out.starts_with("set GD_Obj.Pool BalancedItems\n(\n"));
    }

    #[test]
    fn no_entries_renders_empty_array() {
        assert_eq!(render_balanced_items(&[]), "()");
    }
}
