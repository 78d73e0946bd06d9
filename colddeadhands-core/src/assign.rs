//! Pointing enemies at the custom item pools.
//!
//! Every enemy listed in a class's assignment tables gets one hotfix that
//! rewrites a single pool slot on its balance definition (or on a specific
//! pawn in a level) to the custom pool for its category.

use tracing::debug;

use crate::data::{ClassConfig, PoolCategory};
use crate::hotfix::DirectiveRegistry;
use crate::Result;

pub const ASSIGNMENT_CATEGORY: &str = "EnemyDrop";

/// Indentation of assignment hotfixes inside the mod file.
const LINE_INDENT: &str = "                ";

/// The ways an enemy can reference the pools it draws equipment from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignmentKind {
    Dipl,
    PtCipl,
    LevelIpl,
    DlIa,
    Nipl,
}

impl AssignmentKind {
    /// Emission order.
    pub const ALL: [AssignmentKind; 5] = [
        AssignmentKind::Dipl,
        AssignmentKind::PtCipl,
        AssignmentKind::LevelIpl,
        AssignmentKind::DlIa,
        AssignmentKind::Nipl,
    ];
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    DefaultItemPool(usize),
    CustomItemPool { playthrough: usize, index: usize },
    LevelItemPool(usize),
    ItemAttachment { loot: usize, attachment: usize },
    NewItemPool(usize),
}

impl Slot {
    pub fn kind(&self) -> AssignmentKind {
        match self {
            Slot::DefaultItemPool(_) => AssignmentKind::Dipl,
            Slot::CustomItemPool { .. } => AssignmentKind::PtCipl,
            Slot::LevelItemPool(_) => AssignmentKind::LevelIpl,
            Slot::ItemAttachment { .. } => AssignmentKind::DlIa,
            Slot::NewItemPool(_) => AssignmentKind::Nipl,
        }
    }

    /// Attribute path of the `ItemPool` field this slot refers to.
    pub fn attribute(&self) -> String {
        match self {
            Slot::DefaultItemPool(i) => format!("DefaultItemPoolList[{}].ItemPool", i),
            Slot::CustomItemPool { playthrough, index } => format!(
                "PlayThroughs[{}].CustomItemPoolList[{}].ItemPool",
                playthrough, index
            ),
            Slot::LevelItemPool(i) => format!("ItemPoolList[{}].ItemPool", i),
            Slot::ItemAttachment { loot, attachment } => format!(
                "DefaultLoot[{}].ItemAttachments[{}].ItemPool",
                loot, attachment
            ),
            Slot::NewItemPool(i) => format!("NewItemPoolList[{}].ItemPool", i),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssignmentRecord {
    pub class: String,
    pub slot: Slot,
    pub level: Option<String>,
}

impl AssignmentRecord {
    pub fn new(class: impl Into<String>, slot: Slot) -> Self {
        Self {
            class: class.into(),
            slot,
            level: None,
        }
    }

    pub fn in_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// A directive ready to be registered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssignmentDirective {
    pub name: String,
    pub category: &'static str,
    pub body: String,
}

/// Naming state for one enemy class. Names are `{prefix}_{n}` with `n`
/// counting from zero across every kind and category.
#[derive(Clone, Debug)]
pub struct EmitContext {
    prefix: String,
    counter: usize,
}

impl EmitContext {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Build the directive for `record` and return the context to use for
    /// the next one.
    pub fn emit(self, record: &AssignmentRecord, pool: &str) -> (EmitContext, AssignmentDirective) {
        let directive = AssignmentDirective {
            name: format!("{}_{}", self.prefix, self.counter),
            category: ASSIGNMENT_CATEGORY,
            body: format!(
                "{},{},{},,ItemPoolDefinition'{}'",
                record.level.as_deref().unwrap_or(""),
                record.class,
                record.slot.attribute(),
                pool
            ),
        };
        let next = EmitContext {
            prefix: self.prefix,
            counter: self.counter + 1,
        };
        (next, directive)
    }
}

/// Register every assignment for `config` and return the rendered block for
/// the mod file.
pub fn emit_assignments<R>(config: &ClassConfig, registry: &mut R) -> Result<String>
where
    R: DirectiveRegistry + ?Sized,
{
    let mut ctx = EmitContext::new(config.hotfix_prefix.as_str());
    let mut lines = Vec::with_capacity(config.assignments.total());

    for kind in AssignmentKind::ALL {
        for category in PoolCategory::ALL {
            let pool = config.pool_for(category);
            for record in config.assignments.records(kind, category) {
                let (next, directive) = ctx.emit(&record, pool);
                ctx = next;
                registry.register(&directive.name, directive.category, &directive.body, true)?;
                lines.push(format!("{}{}", LINE_INDENT, registry.rendered(&directive.name)?));
            }
        }
    }

    debug!(
        prefix = %config.hotfix_prefix,
        count = ctx.counter(),
        "emitted enemy assignments"
    );
    Ok(lines.join("\n\n"))
}
