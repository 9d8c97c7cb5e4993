use crate::models::Language;
use tree_sitter::{Parser, Tree};

use super::{FoldParser, ParserError};

pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::InitError(e.to_string()))?;

        Ok(Self { parser })
    }
}

impl FoldParser for PythonParser {
    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| ParserError::ParseError("python parser returned no tree".to_string()))
    }

    fn language(&self) -> Language {
        Language::Python
    }
}
