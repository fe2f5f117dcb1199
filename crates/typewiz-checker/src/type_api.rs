//! Position-based type queries.

use crate::state::CheckerState;
use crate::types::Type;
use typewiz_parser::{NodeArena, NodeIndex, SyntaxKind};

impl CheckerState<'_> {
    /// Type of the outermost expression that starts exactly at `offset`.
    ///
    /// `None` when no expression starts there.
    pub fn type_at_position(&mut self, offset: u32) -> Option<Type> {
        let node = find_expression_starting_at(&self.file.arena, self.file.root, offset)?;
        Some(self.get_type_of_node(node))
    }

    /// Display string of [`Self::type_at_position`].
    pub fn type_to_string_at_position(&mut self, offset: u32) -> Option<String> {
        self.type_at_position(offset).map(|ty| ty.to_string())
    }
}

/// Walk down from `root` along the nodes containing `offset` and return the
/// first expression whose range begins at `offset`.
#[must_use]
pub fn find_expression_starting_at(arena: &NodeArena, root: NodeIndex, offset: u32) -> Option<NodeIndex> {
    let mut current = root;
    'descend: loop {
        for child in arena.get_children(current) {
            let Some(node) = arena.get(child) else {
                continue;
            };
            if !node.contains(offset) {
                continue;
            }
            if node.pos == offset && is_expression_kind(node.kind) {
                return Some(child);
            }
            current = child;
            continue 'descend;
        }
        return None;
    }
}

#[must_use]
pub fn is_expression_kind(kind: SyntaxKind) -> bool {
    match kind {
        SyntaxKind::Identifier
        | SyntaxKind::NumericLiteral
        | SyntaxKind::BigIntLiteral
        | SyntaxKind::StringLiteral
        | SyntaxKind::RegularExpressionLiteral
        | SyntaxKind::NoSubstitutionTemplateLiteral
        | SyntaxKind::ThisKeyword
        | SyntaxKind::SuperKeyword
        | SyntaxKind::NullKeyword
        | SyntaxKind::TrueKeyword
        | SyntaxKind::FalseKeyword => true,
        SyntaxKind::SpreadElement | SyntaxKind::OmittedExpression | SyntaxKind::ExpressionWithTypeArguments => false,
        _ => kind >= SyntaxKind::ArrayLiteralExpression && kind <= SyntaxKind::SatisfiesExpression,
    }
}
