//! Keeps folds out of string literals.
//!
//! The tree-aware check trusts node kinds. The text fallback pairs each `"`
//! with the next `"`; escaped quotes, single quotes and triple-quoted strings
//! are not understood.

use crate::syntax::{Grammar, SyntaxNode};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static QUOTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("quoted span pattern is valid"));

/// Leaf is (part of) a string literal: its own kind, or its parent's kind
/// for grammars that split strings into start/content/end tokens.
pub fn in_string_literal<N: SyntaxNode>(node: &N, grammar: &dyn Grammar) -> bool {
    if grammar.is_string_literal(node.kind()) {
        return true;
    }
    node.parent()
        .is_some_and(|parent| grammar.is_string_literal(parent.kind()))
}

/// Quoted spans of a flat text, in document order
#[derive(Debug, Clone, Default)]
pub struct QuotedSpans {
    spans: Vec<Range<usize>>,
}

impl QuotedSpans {
    pub fn scan(text: &str) -> Self {
        Self {
            spans: QUOTED_SPAN.find_iter(text).map(|m| m.range()).collect(),
        }
    }

    /// `range` lies entirely within one quoted span
    pub fn contains(&self, range: &Range<usize>) -> bool {
        let idx = self.spans.partition_point(|span| span.end < range.end);
        self.spans
            .get(idx)
            .is_some_and(|span| span.start <= range.start && range.end <= span.end)
    }

    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::syntax::TokenTree;

    #[test]
    fn test_quoted_spans_pairing() {
        let text = r#"a = ">=" if b >= "c" else d"#;
        let spans = QuotedSpans::scan(text);
        assert_eq!(spans.spans().len(), 2);

        let inner = text.find(">=").unwrap();
        assert!(spans.contains(&(inner..inner + 2)));

        let outer = text.rfind(">=").unwrap();
        assert!(!spans.contains(&(outer..outer + 2)));
    }

    #[test]
    fn test_partial_overlap_is_not_contained() {
        let text = r#"x"ab"y"#;
        let spans = QuotedSpans::scan(text);
        assert!(!spans.contains(&(0..3)));
        assert!(spans.contains(&(1..5)));
    }

    #[test]
    fn test_escaped_quote_is_not_understood() {
        // the escaped quote closes the first span, so the next one opens
        // before `>=` and wrongly swallows it
        let text = r#""a\"" >= "b""#;
        let spans = QuotedSpans::scan(text);
        let pos = text.find(">=").unwrap();
        assert!(spans.contains(&(pos..pos + 2)));
    }

    #[test]
    fn test_unterminated_quote() {
        let spans = QuotedSpans::scan(r#"x = "abc >= d"#);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_tree_guard_checks_leaf_and_parent() {
        let mut tree = TokenTree::new(r#"">=" >= x"#, "module");
        let root = tree.root_id();
        let cmp = tree.push(root, "comparison_operator", 0..9);
        let string = tree.push(cmp, "string", 0..4);
        tree.push(string, "string_start", 0..1);
        let content = tree.push(string, "string_content", 1..3);
        tree.push(string, "string_end", 3..4);
        let op = tree.push(cmp, ">=", 5..7);
        tree.push(cmp, "identifier", 8..9);

        let grammar = Language::Python;
        assert!(in_string_literal(&tree.node(content).unwrap(), &grammar));
        assert!(!in_string_literal(&tree.node(op).unwrap(), &grammar));
    }
}
