mod javascript;
mod node;
mod python;

pub use javascript::JavaScriptParser;
pub use node::TsNode;
pub use python::PythonParser;

use crate::engine::FoldResolver;
use crate::models::{FoldRegion, Language};
use thiserror::Error;
use tree_sitter::Tree;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to initialize parser: {0}")]
    InitError(String),
    #[error("Failed to parse source code: {0}")]
    ParseError(String),
}

/// Tree-sitter host for one language: parses source and feeds the resolver
pub trait FoldParser: Send {
    /// Parse source code into a syntax tree
    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParserError>;

    /// Get the language this parser handles
    fn language(&self) -> Language;

    /// Parse and resolve glyph folds for the whole document
    fn parse(&mut self, source: &str, resolver: &FoldResolver) -> Result<Vec<FoldRegion>, ParserError> {
        let tree = self.parse_tree(source)?;
        let language = self.language();
        Ok(resolver.resolve(TsNode::new(tree.root_node(), source), &language))
    }
}

/// Create a parser for the given language
pub fn create_parser(language: Language) -> Result<Box<dyn FoldParser>, ParserError> {
    match language {
        Language::Python => Ok(Box::new(PythonParser::new()?)),
        Language::JavaScript => Ok(Box::new(JavaScriptParser::new(false)?)),
        Language::TypeScript => Ok(Box::new(JavaScriptParser::new(true)?)),
    }
}
