use crate::models::Language;
use tree_sitter::{Parser, Tree};

use super::{FoldParser, ParserError};

/// JavaScript parser; TypeScript sources go through the TSX grammar
pub struct JavaScriptParser {
    parser: Parser,
    is_typescript: bool,
}

impl JavaScriptParser {
    pub fn new(is_typescript: bool) -> Result<Self, ParserError> {
        let mut parser = Parser::new();

        if is_typescript {
            parser
                .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
                .map_err(|e| ParserError::InitError(e.to_string()))?;
        } else {
            parser
                .set_language(&tree_sitter_javascript::LANGUAGE.into())
                .map_err(|e| ParserError::InitError(e.to_string()))?;
        }

        Ok(Self {
            parser,
            is_typescript,
        })
    }
}

impl FoldParser for JavaScriptParser {
    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser.parse(source, None).ok_or_else(|| {
            ParserError::ParseError(format!("{} parser returned no tree", self.language().as_str()))
        })
    }

    fn language(&self) -> Language {
        if self.is_typescript {
            Language::TypeScript
        } else {
            Language::JavaScript
        }
    }
}
