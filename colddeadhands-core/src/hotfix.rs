use std::collections::HashMap;
use std::fmt;

use crate::{GeneratorError, Result};

/// Name prefix used by the main registry.
pub const DEFAULT_PREFIX: &str = "Apoc";

/// The narrow contract the generators need from a directive store.
pub trait DirectiveRegistry {
    /// Record a directive under `name`. Names are unique per registry.
    fn register(&mut self, name: &str, category: &str, body: &str, activated: bool) -> Result<()>;

    /// The mod-file text for a previously registered directive.
    fn rendered(&self, name: &str) -> Result<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single level hotfix as it appears in the mod file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotfix {
    pub name: String,
    pub key: String,
    pub body: String,
    pub activated: bool,
}

impl fmt::Display for Hotfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#<hotfix><key>\"{}\"</key><value>\"{}\"</value>{}",
            self.key,
            self.body,
            if self.activated { "<on>" } else { "<off>" }
        )
    }
}

/// Ordered store of level hotfixes.
///
/// Keys are `SparkLevelPatchEntry-{prefix}{category}{n}` where `n` counts
/// registrations per category starting at 1, so two registries with
/// different prefixes never produce colliding keys in one mod file.
#[derive(Debug, Clone)]
pub struct HotfixRegistry {
    prefix: String,
    entries: Vec<Hotfix>,
    by_name: HashMap<String, usize>,
    category_counts: HashMap<String, usize>,
}

impl Default for HotfixRegistry {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl HotfixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Vec::new(),
            by_name: HashMap::new(),
            category_counts: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Hotfix> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Registered hotfixes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Hotfix> {
        self.entries.iter()
    }
}

/// Collapse every run of whitespace (including newlines) to a single space.
fn collapse_whitespace(body: &str) -> String {
    body.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl DirectiveRegistry for HotfixRegistry {
    fn register(&mut self, name: &str, category: &str, body: &str, activated: bool) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(GeneratorError::DuplicateDirective(name.to_string()));
        }

        let count = self.category_counts.entry(category.to_string()).or_insert(0);
        *count += 1;
        let key = format!("SparkLevelPatchEntry-{}{}{}", self.prefix, category, count);

        self.by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(Hotfix {
            name: name.to_string(),
            key,
            body: collapse_whitespace(body),
            activated,
        });
        Ok(())
    }

    fn rendered(&self, name: &str) -> Result<String> {
        self.get(name)
            .map(|hotfix| hotfix.to_string())
            .ok_or_else(|| GeneratorError::UnknownDirective(name.to_string()))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
