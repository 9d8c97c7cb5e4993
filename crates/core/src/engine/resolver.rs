use crate::conditions::{ConditionEvaluator, NodeContext};
use crate::guard::{in_string_literal, QuotedSpans};
use crate::models::FoldRegion;
use crate::syntax::{Grammar, SyntaxNode};
use crate::table::MappingTable;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Mapping `{mapping}` uses condition `{condition}` which has no registered predicate")]
    UnregisteredCondition { condition: String, mapping: String },
    #[error("Failed to build token pattern: {0}")]
    PatternError(#[from] regex::Error),
}

/// Computes glyph fold regions from a syntax tree or raw text.
///
/// Holds a snapshot of the mapping table; every call recomputes from scratch.
#[derive(Debug)]
pub struct FoldResolver {
    table: Arc<MappingTable>,
    evaluator: Arc<ConditionEvaluator>,
    /// Alternation of all unconditional sources, for text mode
    text_pattern: Option<Regex>,
}

impl FoldResolver {
    /// Validate every condition in `table` up front and build the resolver
    pub fn new(table: MappingTable, evaluator: ConditionEvaluator) -> Result<Self, ResolveError> {
        Self::from_shared(Arc::new(table), Arc::new(evaluator))
    }

    pub fn from_shared(
        table: Arc<MappingTable>,
        evaluator: Arc<ConditionEvaluator>,
    ) -> Result<Self, ResolveError> {
        evaluator.validate(&table)?;
        let text_pattern = build_text_pattern(&table)?;
        Ok(Self {
            table,
            evaluator,
            text_pattern,
        })
    }

    /// Swap in a new table wholesale; the old one stays if validation fails
    pub fn replace_table(&mut self, table: MappingTable) -> Result<(), ResolveError> {
        self.evaluator.validate(&table)?;
        self.text_pattern = build_text_pattern(&table)?;
        self.table = Arc::new(table);
        Ok(())
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Fold regions for every qualifying leaf under `root`, in document order
    pub fn resolve<N: SyntaxNode>(&self, root: N, grammar: &dyn Grammar) -> Vec<FoldRegion> {
        let mut regions = Vec::new();
        if self.table.is_empty() {
            return regions;
        }

        let mut stack = vec![root];
        let mut leaves = 0usize;
        while let Some(node) = stack.pop() {
            if !node.is_leaf() {
                let mut children = node.children();
                children.reverse();
                stack.extend(children);
                continue;
            }
            leaves += 1;
            if let Some(region) = self.resolve_leaf(&node, grammar) {
                regions.push(region);
            }
        }

        tracing::debug!(leaves, folds = regions.len(), "resolved tree");
        regions
    }

    fn resolve_leaf<N: SyntaxNode>(&self, node: &N, grammar: &dyn Grammar) -> Option<FoldRegion> {
        let text = node.text().filter(|t| !t.is_empty())?;
        let entry = self.table.lookup(text)?;

        if in_string_literal(node, grammar) {
            return None;
        }

        if !entry.condition.is_none() {
            let parent = node.parent();
            let ctx = NodeContext {
                kind: node.kind(),
                text,
                parent_kind: parent.as_ref().map(|p| p.kind()),
                grammar,
            };
            if !self.evaluator.evaluate(&entry.condition, &ctx) {
                return None;
            }
        }

        Some(FoldRegion::token(node.text_range(), entry.replacement.as_str()))
    }

    /// Degraded mode: scan flat text without a tree.
    ///
    /// Conditional entries never fold here since there is no node to inspect.
    pub fn resolve_text(&self, text: &str) -> Vec<FoldRegion> {
        let Some(pattern) = &self.text_pattern else {
            return Vec::new();
        };

        let quoted = QuotedSpans::scan(text);
        let regions: Vec<FoldRegion> = pattern
            .find_iter(text)
            .filter(|m| !quoted.contains(&m.range()))
            .filter_map(|m| {
                self.table
                    .lookup(m.as_str())
                    .map(|entry| FoldRegion::token(m.range(), entry.replacement.as_str()))
            })
            .collect();

        tracing::debug!(folds = regions.len(), "resolved text");
        regions
    }
}

/// Longest-first alternation so `<=` wins over `<` at the same position.
/// Word-like ends get `\b` so `notlambda` never yields `lambda`.
fn build_text_pattern(table: &MappingTable) -> Result<Option<Regex>, regex::Error> {
    let mut sources: Vec<&str> = table
        .all()
        .into_iter()
        .filter(|e| e.condition.is_none())
        .map(|e| e.source.as_str())
        .collect();
    if sources.is_empty() {
        return Ok(None);
    }
    sources.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternatives: Vec<String> = sources
        .iter()
        .map(|source| {
            let mut alt = String::new();
            if source.starts_with(is_word_char) {
                alt.push_str(r"\b");
            }
            alt.push_str(&regex::escape(source));
            if source.ends_with(is_word_char) {
                alt.push_str(r"\b");
            }
            alt
        })
        .collect();

    Regex::new(&alternatives.join("|")).map(Some)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionKind, Language, MappingEntry};
    use crate::syntax::TokenTree;

    fn resolver(entries: Vec<MappingEntry>) -> FoldResolver {
        FoldResolver::new(
            MappingTable::from_entries(entries),
            ConditionEvaluator::with_builtins(),
        )
        .unwrap()
    }

    fn power() -> MappingEntry {
        MappingEntry::new("**", "^", "Operator")
            .with_condition(ConditionKind::ParentIsBinaryExpression)
    }

    /// `a ** b` and `f(**kw)` built by hand, shaped like tree-sitter-python
    fn power_and_splat_tree() -> TokenTree {
        let source = "a ** b\nf(**kw)";
        let mut tree = TokenTree::new(source, "module");
        let root = tree.root_id();
        let bin = tree.push(root, "binary_operator", 0..6);
        tree.push(bin, "identifier", 0..1);
        tree.push(bin, "**", 2..4);
        tree.push(bin, "identifier", 5..6);
        let call = tree.push(root, "call", 7..14);
        tree.push(call, "identifier", 7..8);
        let args = tree.push(call, "argument_list", 8..14);
        tree.push(args, "(", 8..9);
        let splat = tree.push(args, "dictionary_splat", 9..13);
        tree.push(splat, "**", 9..11);
        tree.push(splat, "identifier", 11..13);
        tree.push(args, ")", 13..14);
        tree
    }

    fn string_and_comparison_tree() -> TokenTree {
        let source = r#"x = ">=" if a >= b else y"#;
        let mut tree = TokenTree::new(source, "module");
        let root = tree.root_id();
        let assign = tree.push(root, "assignment", 0..source.len());
        tree.push(assign, "identifier", 0..1);
        tree.push(assign, "=", 2..3);
        let cond = tree.push(assign, "conditional_expression", 4..source.len());
        let string = tree.push(cond, "string", 4..8);
        tree.push(string, "string_start", 4..5);
        tree.push(string, "string_content", 5..7);
        tree.push(string, "string_end", 7..8);
        tree.push(cond, "if", 9..11);
        let cmp = tree.push(cond, "comparison_operator", 12..18);
        tree.push(cmp, "identifier", 12..13);
        tree.push(cmp, ">=", 14..16);
        tree.push(cmp, "identifier", 17..18);
        tree.push(cond, "else", 19..23);
        tree.push(cond, "identifier", 24..25);
        tree
    }

    #[test]
    fn test_power_folds_only_in_binary_expression() {
        let tree = power_and_splat_tree();
        let folds = resolver(vec![power()]).resolve(tree.root(), &Language::Python);

        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].range(), 2..4);
        assert_eq!(folds[0].placeholder_text(), "^");
        assert!(folds[0].collapsed_by_default());
        assert!(folds[0].is_non_expandable());
    }

    #[test]
    fn test_string_literal_excluded_in_tree_mode() {
        let tree = string_and_comparison_tree();
        let folds = resolver(vec![MappingEntry::new(">=", "≥", "Comparison")])
            .resolve(tree.root(), &Language::Python);

        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].range(), 14..16);
    }

    #[test]
    fn test_exact_match_only() {
        let mut tree = TokenTree::new("notlambda", "module");
        let root = tree.root_id();
        tree.push(root, "identifier", 0..9);

        let folds = resolver(vec![MappingEntry::new("lambda", "λ", "Keyword")])
            .resolve(tree.root(), &Language::Python);
        assert!(folds.is_empty());
    }

    #[test]
    fn test_empty_table_returns_nothing() {
        let tree = string_and_comparison_tree();
        let resolver = resolver(vec![]);
        assert!(resolver.resolve(tree.root(), &Language::Python).is_empty());
        assert!(resolver.resolve_text(tree.source()).is_empty());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let tree = power_and_splat_tree();
        let resolver = resolver(vec![power(), MappingEntry::new("kw", "κ", "Greek")]);
        let first = resolver.resolve(tree.root(), &Language::Python);
        let second = resolver.resolve(tree.root(), &Language::Python);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[0].start_offset() < first[1].start_offset());
    }

    #[test]
    fn test_leaf_root() {
        let tree = TokenTree::new("lambda", "lambda");
        let folds = resolver(vec![MappingEntry::new("lambda", "λ", "Keyword")])
            .resolve(tree.root(), &Language::Python);
        assert_eq!(folds, vec![FoldRegion::token(0..6, "λ")]);
    }

    #[test]
    fn test_upsert_override_reflected_after_replace() {
        let mut table = MappingTable::from_entries([MappingEntry::new("->", "➔", "Arrow")]);
        let mut resolver =
            FoldResolver::new(table.clone(), ConditionEvaluator::with_builtins()).unwrap();

        table.upsert(MappingEntry::new("->", "⇒", "Arrow"));
        resolver.replace_table(table).unwrap();

        let folds = resolver.resolve_text("def f() -> int: ...");
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].placeholder_text(), "⇒");
    }

    #[test]
    fn test_tree_override_after_replace() {
        let source = "def f() -> int: ...";
        let mut tree = TokenTree::new(source, "module");
        let root = tree.root_id();
        let def = tree.push(root, "function_definition", 0..source.len());
        tree.push(def, "def", 0..3);
        tree.push(def, "identifier", 4..5);
        tree.push(def, "parameters", 5..7);
        tree.push(def, "->", 8..10);
        tree.push(def, "type", 11..14);

        let mut table = MappingTable::from_entries([MappingEntry::new("->", "➔", "Arrow")]);
        let mut resolver =
            FoldResolver::new(table.clone(), ConditionEvaluator::with_builtins()).unwrap();
        let before = resolver.resolve(tree.root(), &Language::Python);
        assert_eq!(before, vec![FoldRegion::token(8..10, "➔")]);

        table.upsert(MappingEntry::new("->", "⇒", "Arrow"));
        resolver.replace_table(table).unwrap();

        let after = resolver.resolve(tree.root(), &Language::Python);
        assert_eq!(after, vec![FoldRegion::token(8..10, "⇒")]);
        assert!(after.iter().all(|f| f.placeholder_text() != "➔"));
    }

    #[test]
    fn test_leaf_without_text_is_skipped() {
        // the first leaf's range runs past the source, so it has no text even
        // though the source starts with a mapped token
        let source = "lambda";
        let mut tree = TokenTree::new(source, "module");
        let root = tree.root_id();
        tree.push(root, "identifier", 0..40);
        tree.push(root, "lambda", 0..6);

        let folds = resolver(vec![MappingEntry::new("lambda", "λ", "Keyword")])
            .resolve(tree.root(), &Language::Python);
        assert_eq!(folds, vec![FoldRegion::token(0..6, "λ")]);
    }

    #[test]
    fn test_unregistered_condition_fails_fast() {
        let table = MappingTable::from_entries([power()]);
        let err = FoldResolver::new(table, ConditionEvaluator::empty()).unwrap_err();
        assert!(matches!(err, ResolveError::UnregisteredCondition { .. }));
    }

    #[test]
    fn test_replace_table_keeps_old_on_error() {
        let mut resolver = resolver(vec![MappingEntry::new(">=", "≥", "Comparison")]);
        let bad = MappingTable::from_entries([MappingEntry::new("@", "∘", "Operator")
            .with_condition(ConditionKind::Custom("is_matmul".to_string()))]);

        assert!(resolver.replace_table(bad).is_err());
        assert!(resolver.table().lookup(">=").is_some());
    }

    #[test]
    fn test_text_mode_string_exclusion() {
        let text = r#"x = ">=" if a >= b else y"#;
        let folds = resolver(vec![MappingEntry::new(">=", "≥", "Comparison")]).resolve_text(text);

        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].range(), 14..16);
    }

    #[test]
    fn test_text_mode_word_boundaries() {
        let resolver = resolver(vec![MappingEntry::new("lambda", "λ", "Keyword")]);
        assert!(resolver.resolve_text("notlambda = lambda_x").is_empty());

        let folds = resolver.resolve_text("f = lambda x: x");
        assert_eq!(folds, vec![FoldRegion::token(4..10, "λ")]);
    }

    #[test]
    fn test_text_mode_prefers_longest_operator() {
        let resolver = resolver(vec![
            MappingEntry::new("<", "‹", "Comparison"),
            MappingEntry::new("<=", "≤", "Comparison"),
        ]);
        let folds = resolver.resolve_text("a <= b < c");
        let glyphs: Vec<&str> = folds.iter().map(|f| f.placeholder_text()).collect();
        assert_eq!(glyphs, vec!["≤", "‹"]);
    }

    #[test]
    fn test_text_mode_skips_conditional_entries() {
        let folds = resolver(vec![power()]).resolve_text("a ** b");
        assert!(folds.is_empty());
    }
}
