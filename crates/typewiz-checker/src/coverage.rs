//! Identifier type coverage: how many identifiers have a type other than
//! `any`.

use crate::state::CheckerState;
use crate::types::Type;
use serde::Serialize;
use typewiz_parser::{Node, NodeData, NodeIndex, SyntaxKind};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCoverage {
    pub known_types: u32,
    pub total_types: u32,
    pub percentage: f64,
}

impl Default for TypeCoverage {
    fn default() -> Self {
        Self {
            known_types: 0,
            total_types: 0,
            percentage: 100.0,
        }
    }
}

impl TypeCoverage {
    /// Add the counts of another file.
    pub fn merge(&mut self, other: &TypeCoverage) {
        self.known_types += other.known_types;
        self.total_types += other.total_types;
        self.update_percentage();
    }

    fn update_percentage(&mut self) {
        self.percentage = if self.total_types == 0 {
            100.0
        } else {
            100.0 * f64::from(self.known_types) / f64::from(self.total_types)
        };
    }
}

impl CheckerState<'_> {
    /// Count the identifiers of this file and those whose type is known.
    ///
    /// Names of function and class declarations are not counted, nor is the
    /// `constructor` name.
    pub fn type_coverage(&mut self) -> TypeCoverage {
        let file = self.file;
        let arena = &file.arena;
        let mut coverage = TypeCoverage::default();
        let identifiers: Vec<NodeIndex> = arena
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == SyntaxKind::Identifier)
            .map(|(i, _)| NodeIndex(i as u32))
            .collect();

        for identifier in identifiers {
            let parent = arena.parent_of(identifier);
            if matches!(
                arena.kind(parent),
                Some(SyntaxKind::FunctionDeclaration | SyntaxKind::ClassDeclaration | SyntaxKind::Constructor)
            ) {
                continue;
            }
            // Synthesized names from error recovery have no source.
            if arena.get(identifier).is_some_and(|n| n.width() == 0) {
                continue;
            }
            coverage.total_types += 1;
            if !self.type_of_identifier_location(identifier).is_any() {
                coverage.known_types += 1;
            }
        }
        coverage.update_percentage();
        coverage
    }

    /// Type of an identifier as it appears: a declaration name has its
    /// declaration's type, a property name the accessed member's type, and a
    /// type name the type it denotes.
    fn type_of_identifier_location(&mut self, identifier: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let parent = arena.parent_of(identifier);
        let Some(parent_node) = arena.get(parent) else {
            return self.get_type_of_node(identifier);
        };
        match parent_node.kind {
            SyntaxKind::PropertyAccessExpression => {
                let is_name = arena
                    .get_access_expr(parent_node)
                    .is_some_and(|d| d.name_or_argument == identifier);
                if is_name {
                    self.get_type_of_node(parent)
                } else {
                    self.get_type_of_node(identifier)
                }
            }
            SyntaxKind::TypeReference => self.get_type_from_type_node(parent),
            SyntaxKind::PropertyAssignment => match arena.get_property_assignment(parent_node) {
                Some(data) if data.name == identifier => {
                    let initializer = data.initializer;
                    self.get_type_of_node(initializer).widen()
                }
                _ => self.get_type_of_node(identifier),
            },
            _ if declaration_name(parent_node) == Some(identifier) => self.get_type_of_declaration(parent),
            _ => self.get_type_of_node(identifier),
        }
    }
}

/// Name node of a declaration that carries a type.
fn declaration_name(node: &Node) -> Option<NodeIndex> {
    match (node.kind, &node.data) {
        (SyntaxKind::VariableDeclaration, NodeData::VariableDeclaration(data)) => Some(data.name),
        (SyntaxKind::Parameter, NodeData::Parameter(data)) => Some(data.name),
        (SyntaxKind::BindingElement, NodeData::BindingElement(data)) => Some(data.name),
        (SyntaxKind::PropertyDeclaration | SyntaxKind::PropertySignature, NodeData::PropertyDecl(data)) => {
            Some(data.name)
        }
        (
            SyntaxKind::MethodDeclaration
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor
            | SyntaxKind::FunctionExpression,
            NodeData::Function(data),
        ) => Some(data.name),
        (SyntaxKind::EnumMember, NodeData::EnumMember(data)) => Some(data.name),
        _ => None,
    }
}
