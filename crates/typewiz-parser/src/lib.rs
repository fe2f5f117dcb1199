//! TypeScript scanner and parser for typewiz.
//!
//! This crate provides the syntactic front end:
//! - `SyntaxKind` - token and node kinds
//! - `ScannerState` - tokenizer state machine with rescanning hooks
//! - `ParserState` - recursive-descent parser building a `NodeArena`
//!
//! All positions are byte offsets into the UTF-8 source text. A node's `pos` is
//! the start of its first token (leading trivia excluded) and `end` is the end
//! of its last token, so `&text[pos..end]` is exactly the node's source text.

pub mod parser;
pub mod scanner;

pub use parser::{
    ModifierFlags, Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, ParseDiagnostic,
    ParserState,
};
pub use scanner::{ScannerState, SyntaxKind};

/// Parsed file: its arena, root node and syntax diagnostics.
#[derive(Debug)]
pub struct ParsedFile {
    pub file_name: String,
    pub text: std::sync::Arc<str>,
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parse `text` as a TypeScript source file.
#[must_use]
pub fn parse_source(file_name: &str, text: &str) -> ParsedFile {
    let mut parser = ParserState::new(file_name.to_string(), text.to_string());
    let root = parser.parse_source_file();
    let diagnostics = parser.get_diagnostics().to_vec();
    let text = parser.source_text_arc();
    let mut arena = parser.into_arena();
    arena.set_parents(root);
    ParsedFile {
        file_name: file_name.to_string(),
        text,
        arena,
        root,
        diagnostics,
    }
}

impl ParsedFile {
    /// Source text covered by a node.
    #[must_use]
    pub fn node_text(&self, idx: NodeIndex) -> &str {
        self.arena
            .get(idx)
            .and_then(|node| self.text.get(node.pos as usize..node.end as usize))
            .unwrap_or("")
    }

    #[must_use]
    pub fn is_declaration_file(&self) -> bool {
        self.file_name.ends_with(".d.ts")
            || self.file_name.ends_with(".d.mts")
            || self.file_name.ends_with(".d.cts")
    }
}
