//! Host-facing syntax tree contract.
//!
//! The resolver never parses; it walks whatever tree the host hands it through
//! [`SyntaxNode`], and asks a [`Grammar`] to classify node kinds.

use crate::models::Language;
use std::ops::Range;

/// A node in a host syntax tree
pub trait SyntaxNode: Sized {
    /// Grammar-specific node kind
    fn kind(&self) -> &str;

    /// Exact source text of the node, if it can be extracted
    fn text(&self) -> Option<&str>;

    /// Byte range of the node in the document
    fn text_range(&self) -> Range<usize>;

    /// Children in document order
    fn children(&self) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// Node kind classification for one grammar
pub trait Grammar {
    /// Kind denotes a string literal or a piece of one
    fn is_string_literal(&self, kind: &str) -> bool;

    /// Kind denotes a binary expression
    fn is_binary_expression(&self, kind: &str) -> bool;
}

const PYTHON_STRING_KINDS: &[&str] = &[
    "string",
    "concatenated_string",
    "string_start",
    "string_content",
    "string_end",
    "escape_sequence",
];

const PYTHON_BINARY_KINDS: &[&str] = &["binary_operator", "boolean_operator", "comparison_operator"];

const JS_STRING_KINDS: &[&str] = &[
    "string",
    "string_fragment",
    "template_string",
    "escape_sequence",
    "regex",
    "regex_pattern",
    "jsx_text",
];

const JS_BINARY_KINDS: &[&str] = &["binary_expression"];

impl Grammar for Language {
    fn is_string_literal(&self, kind: &str) -> bool {
        match self {
            Language::Python => PYTHON_STRING_KINDS.contains(&kind),
            Language::JavaScript | Language::TypeScript => JS_STRING_KINDS.contains(&kind),
        }
    }

    fn is_binary_expression(&self, kind: &str) -> bool {
        match self {
            Language::Python => PYTHON_BINARY_KINDS.contains(&kind),
            Language::JavaScript | Language::TypeScript => JS_BINARY_KINDS.contains(&kind),
        }
    }
}

/// Handle to a node inside a [`TokenTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct TreeEntry {
    kind: String,
    range: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Small in-memory syntax tree for hosts that build their own token trees
/// (semantic-token streams, other parsers) instead of using tree-sitter.
#[derive(Debug, Clone)]
pub struct TokenTree {
    source: String,
    nodes: Vec<TreeEntry>,
}

impl TokenTree {
    /// New tree whose root spans the whole source
    pub fn new(source: impl Into<String>, root_kind: impl Into<String>) -> Self {
        let source = source.into();
        let root = TreeEntry {
            kind: root_kind.into(),
            range: 0..source.len(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            source,
            nodes: vec![root],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> TokenNode<'_> {
        TokenNode {
            tree: self,
            id: self.root_id(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Append a child under `parent`; children must be pushed in document order
    pub fn push(
        &mut self,
        parent: NodeId,
        kind: impl Into<String>,
        range: Range<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeEntry {
            kind: kind.into(),
            range,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(entry) = self.nodes.get_mut(parent.0) {
            entry.children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<TokenNode<'_>> {
        (id.0 < self.nodes.len()).then_some(TokenNode { tree: self, id })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenNode<'a> {
    tree: &'a TokenTree,
    id: NodeId,
}

impl<'a> TokenNode<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn entry(&self) -> &'a TreeEntry {
        &self.tree.nodes[self.id.0]
    }
}

impl<'a> SyntaxNode for TokenNode<'a> {
    fn kind(&self) -> &str {
        &self.entry().kind
    }

    fn text(&self) -> Option<&str> {
        self.tree.source.get(self.entry().range.clone())
    }

    fn text_range(&self) -> Range<usize> {
        self.entry().range.clone()
    }

    fn children(&self) -> Vec<Self> {
        self.entry()
            .children
            .iter()
            .map(|&id| TokenNode {
                tree: self.tree,
                id,
            })
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.entry().parent.map(|id| TokenNode {
            tree: self.tree,
            id,
        })
    }

    fn is_leaf(&self) -> bool {
        self.entry().children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_classification() {
        assert!(Language::Python.is_string_literal("string_content"));
        assert!(Language::Python.is_binary_expression("binary_operator"));
        assert!(!Language::Python.is_binary_expression("dictionary_splat"));
    }

    #[test]
    fn test_javascript_classification() {
        assert!(Language::TypeScript.is_string_literal("template_string"));
        assert!(Language::JavaScript.is_binary_expression("binary_expression"));
        assert!(!Language::JavaScript.is_binary_expression("spread_element"));
    }

    #[test]
    fn test_token_tree_navigation() {
        let mut tree = TokenTree::new("a >= b", "module");
        let root = tree.root_id();
        let cmp = tree.push(root, "comparison_operator", 0..6);
        tree.push(cmp, "identifier", 0..1);
        let op = tree.push(cmp, ">=", 2..4);
        tree.push(cmp, "identifier", 5..6);

        let node = tree.node(op).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.text(), Some(">="));
        assert_eq!(node.parent().unwrap().kind(), "comparison_operator");
        assert_eq!(tree.root().children().len(), 1);
        assert!(!tree.root().is_leaf());
    }

    #[test]
    fn test_token_tree_out_of_bounds_text() {
        let mut tree = TokenTree::new("ab", "module");
        let root = tree.root_id();
        let bad = tree.push(root, "identifier", 1..9);
        assert_eq!(tree.node(bad).unwrap().text(), None);
    }
}
