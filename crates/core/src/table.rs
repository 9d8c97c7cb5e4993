//! Mapping table: exact-match token lookup with category-grouped ordering

use crate::models::{ConditionKind, MappingEntry};
use std::collections::HashMap;

/// Ordered set of replacement rules keyed by source text.
///
/// Matching is a keyed lookup. The category/insertion order only matters for
/// [`MappingTable::all`], which is what import/export and listings display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, MappingEntry>,
    /// Categories in first-seen order, each with its sources in insertion order
    order: Vec<(String, Vec<String>)>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table; later entries with the same source win
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.upsert(entry);
        }
        table
    }

    /// Table holding the built-in mappings
    pub fn defaults() -> Self {
        Self::from_entries(crate::settings::default_entries())
    }

    /// Exact-match lookup of a token's text
    pub fn lookup(&self, token_text: &str) -> Option<&MappingEntry> {
        self.entries.get(token_text)
    }

    /// Entries grouped by category (first-seen order), insertion order within
    pub fn all(&self) -> Vec<&MappingEntry> {
        self.order
            .iter()
            .flat_map(|(_, sources)| sources.iter())
            .filter_map(|source| self.entries.get(source))
            .collect()
    }

    /// Insert or replace the entry with the same source.
    ///
    /// Keeping the category edits the entry in place; a new category moves it
    /// to the end of that category. Returns the replaced entry.
    pub fn upsert(&mut self, entry: MappingEntry) -> Option<MappingEntry> {
        if entry.source.is_empty() {
            tracing::warn!(replacement = %entry.replacement, "ignoring mapping with empty source");
            return None;
        }

        let previous = self.entries.remove(&entry.source);
        match &previous {
            Some(old) if old.category == entry.category => {}
            Some(old) => {
                self.detach(&old.category, &old.source);
                self.attach(&entry.category, &entry.source);
            }
            None => self.attach(&entry.category, &entry.source),
        }

        self.entries.insert(entry.source.clone(), entry);
        previous
    }

    /// Remove by source; absent keys are a no-op
    pub fn remove(&mut self, source: &str) -> Option<MappingEntry> {
        let removed = self.entries.remove(source)?;
        self.detach(&removed.category, &removed.source);
        Some(removed)
    }

    /// Category labels in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        self.order.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Entries of one category in insertion order
    pub fn entries_in(&self, category: &str) -> Vec<&MappingEntry> {
        self.order
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, sources)| {
                sources
                    .iter()
                    .filter_map(|source| self.entries.get(source))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct non-`None` conditions referenced by the table
    pub fn conditions(&self) -> Vec<&ConditionKind> {
        let mut kinds: Vec<&ConditionKind> = Vec::new();
        for entry in self.all() {
            if !entry.condition.is_none() && !kinds.contains(&&entry.condition) {
                kinds.push(&entry.condition);
            }
        }
        kinds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn attach(&mut self, category: &str, source: &str) {
        match self.order.iter_mut().find(|(name, _)| name == category) {
            Some((_, sources)) => sources.push(source.to_string()),
            None => self
                .order
                .push((category.to_string(), vec![source.to_string()])),
        }
    }

    fn detach(&mut self, category: &str, source: &str) {
        if let Some(pos) = self.order.iter().position(|(name, _)| name == category) {
            let sources = &mut self.order[pos].1;
            sources.retain(|s| s != source);
            if sources.is_empty() {
                self.order.remove(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(table: &MappingTable) -> Vec<&str> {
        table.all().iter().map(|e| e.source.as_str()).collect()
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = MappingTable::from_entries([MappingEntry::new("lambda", "λ", "Keyword")]);
        assert!(table.lookup("lambda").is_some());
        assert!(table.lookup("notlambda").is_none());
        assert!(table.lookup("lamb").is_none());
    }

    #[test]
    fn test_all_groups_by_first_seen_category() {
        let table = MappingTable::from_entries([
            MappingEntry::new(">=", "≥", "Comparison"),
            MappingEntry::new("->", "➔", "Arrow"),
            MappingEntry::new("<=", "≤", "Comparison"),
        ]);

        assert_eq!(sources(&table), vec![">=", "<=", "->"]);
        assert_eq!(table.categories(), vec!["Comparison", "Arrow"]);
    }

    #[test]
    fn test_upsert_overrides_replacement() {
        let mut table = MappingTable::from_entries([MappingEntry::new("->", "➔", "Arrow")]);
        let previous = table.upsert(MappingEntry::new("->", "⇒", "Arrow"));

        assert_eq!(previous.map(|e| e.replacement), Some("➔".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("->").unwrap().replacement, "⇒");
    }

    #[test]
    fn test_upsert_in_place_keeps_position() {
        let mut table = MappingTable::from_entries([
            MappingEntry::new(">=", "≥", "Comparison"),
            MappingEntry::new("<=", "≤", "Comparison"),
        ]);
        table.upsert(MappingEntry::new(">=", ">", "Comparison"));
        assert_eq!(sources(&table), vec![">=", "<="]);
    }

    #[test]
    fn test_upsert_moves_between_categories() {
        let mut table = MappingTable::from_entries([
            MappingEntry::new("**", "^", "Operator"),
            MappingEntry::new(">=", "≥", "Comparison"),
            MappingEntry::new("<=", "≤", "Comparison"),
        ]);
        table.upsert(MappingEntry::new("**", "^", "Comparison"));

        assert_eq!(table.categories(), vec!["Comparison"]);
        assert_eq!(sources(&table), vec![">=", "<=", "**"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut table = MappingTable::from_entries([MappingEntry::new("!=", "≠", "Comparison")]);
        assert!(table.remove("!=").is_some());
        assert!(table.remove("!=").is_none());
        assert!(table.is_empty());
        assert!(table.categories().is_empty());
    }

    #[test]
    fn test_empty_source_is_ignored() {
        let mut table = MappingTable::new();
        assert!(table.upsert(MappingEntry::new("", "?", "")).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_conditions_are_distinct() {
        let table = MappingTable::from_entries([
            MappingEntry::new("**", "^", "Operator")
                .with_condition(ConditionKind::ParentIsBinaryExpression),
            MappingEntry::new("//", "⫽", "Operator")
                .with_condition(ConditionKind::ParentIsBinaryExpression),
            MappingEntry::new(">=", "≥", "Comparison"),
        ]);
        assert_eq!(
            table.conditions(),
            vec![&ConditionKind::ParentIsBinaryExpression]
        );
    }

    #[test]
    fn test_entries_in_unknown_category() {
        let table = MappingTable::defaults();
        assert!(table.entries_in("Nope").is_empty());
        assert!(!table.entries_in("Comparison").is_empty());
    }
}
