use crate::syntax::SyntaxNode;
use std::ops::Range;
use tree_sitter::Node;

/// A tree-sitter node paired with the source it was parsed from
#[derive(Debug, Clone, Copy)]
pub struct TsNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> TsNode<'t> {
    pub fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    pub fn inner(&self) -> Node<'t> {
        self.node
    }
}

impl<'t> SyntaxNode for TsNode<'t> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn text(&self) -> Option<&str> {
        // MISSING nodes inserted by error recovery have no source text
        if self.node.is_missing() {
            return None;
        }
        self.source.get(self.node.byte_range())
    }

    fn text_range(&self) -> Range<usize> {
        self.node.byte_range()
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|child| TsNode::new(child, self.source))
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.node.parent().map(|p| TsNode::new(p, self.source))
    }

    fn is_leaf(&self) -> bool {
        self.node.child_count() == 0
    }
}
