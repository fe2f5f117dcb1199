//! Types written in source: annotations, assertions and heritage clauses.

use crate::state::CheckerState;
use crate::types::{FunctionType, ParameterType, PropertyType, Type};
use typewiz_parser::{ModifierFlags, NodeData, NodeIndex, SyntaxKind};

impl CheckerState<'_> {
    /// Type denoted by a type node. Syntax without a structural model is
    /// kept as its source text.
    pub fn get_type_from_type_node(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(node) = arena.get(idx) else {
            return Type::Any;
        };
        match node.kind {
            SyntaxKind::AnyKeyword => Type::Any,
            SyntaxKind::UnknownKeyword => Type::Unknown,
            SyntaxKind::NeverKeyword => Type::Never,
            SyntaxKind::VoidKeyword => Type::Void,
            SyntaxKind::UndefinedKeyword => Type::Undefined,
            SyntaxKind::NumberKeyword => Type::Number,
            SyntaxKind::StringKeyword => Type::String,
            SyntaxKind::BooleanKeyword => Type::Boolean,
            SyntaxKind::BigIntKeyword => Type::BigInt,
            SyntaxKind::SymbolKeyword => Type::Symbol,
            SyntaxKind::ObjectKeyword => Type::NonPrimitive,
            SyntaxKind::ParenthesizedType => {
                let inner = arena.get_wrapped_type(node).map_or(NodeIndex::NONE, |d| d.type_node);
                self.get_type_from_type_node(inner)
            }
            SyntaxKind::ArrayType => {
                let element = arena.get_array_type(node).map_or(NodeIndex::NONE, |d| d.element_type);
                Type::array(self.get_type_from_type_node(element))
            }
            SyntaxKind::UnionType | SyntaxKind::IntersectionType => {
                let members: Vec<NodeIndex> = arena
                    .get_composite_type(node)
                    .map(|d| d.types.nodes.clone())
                    .unwrap_or_default();
                let is_union = node.kind == SyntaxKind::UnionType;
                let types: Vec<Type> = members.into_iter().map(|m| self.get_type_from_type_node(m)).collect();
                if is_union {
                    Type::union(types)
                } else {
                    Type::Intersection(types)
                }
            }
            SyntaxKind::LiteralType => {
                let literal = arena.get_literal_type(node).map_or(NodeIndex::NONE, |d| d.literal);
                self.literal_type_of(literal).unwrap_or_else(|| self.text_type(idx))
            }
            SyntaxKind::TypeReference => self.type_reference(idx),
            SyntaxKind::ExpressionWithTypeArguments => {
                let Some(data) = arena.get_expr_type_args(node) else {
                    return Type::Any;
                };
                let name = file.node_text(data.expression).to_string();
                let arguments = data.type_arguments.as_ref().map(|l| l.nodes.clone()).unwrap_or_default();
                let type_arguments = arguments.into_iter().map(|a| self.get_type_from_type_node(a)).collect();
                Type::Reference { name, type_arguments }
            }
            SyntaxKind::TupleType => self.tuple_type(idx),
            SyntaxKind::FunctionType => {
                let Some(data) = arena.get_signature(node) else {
                    return Type::Any;
                };
                let parameters = data.parameters.nodes.clone();
                let return_node = data.type_annotation;
                let parameters = self.parameter_types(&parameters);
                let return_type = self.get_type_from_type_node(return_node);
                Type::Function(Box::new(FunctionType {
                    parameters,
                    return_type,
                }))
            }
            SyntaxKind::TypeLiteral => self.type_literal(idx),
            SyntaxKind::TypeQuery => match arena.get_type_query(node) {
                Some(data) if data.type_arguments.is_none() => {
                    Type::TypeOf(file.node_text(data.expr_name).to_string())
                }
                _ => self.text_type(idx),
            },
            _ => self.text_type(idx),
        }
    }

    fn text_type(&self, idx: NodeIndex) -> Type {
        Type::Text(self.file.node_text(idx).to_string())
    }

    /// Literal type of a literal node, in type or expression position.
    pub(crate) fn literal_type_of(&self, literal: NodeIndex) -> Option<Type> {
        let file = self.file;
        let arena = &file.arena;
        let node = arena.get(literal)?;
        match node.kind {
            SyntaxKind::StringLiteral | SyntaxKind::NoSubstitutionTemplateLiteral => {
                arena.get_literal(node).map(|d| Type::StringLiteral(d.text.clone()))
            }
            SyntaxKind::NumericLiteral => Some(Type::NumberLiteral(file.node_text(literal).to_string())),
            SyntaxKind::BigIntLiteral => Some(Type::Text(file.node_text(literal).to_string())),
            SyntaxKind::TrueKeyword => Some(Type::BooleanLiteral(true)),
            SyntaxKind::FalseKeyword => Some(Type::BooleanLiteral(false)),
            SyntaxKind::NullKeyword => Some(Type::Null),
            SyntaxKind::PrefixUnaryExpression => {
                let data = arena.get_unary_expr(node)?;
                if data.operator != SyntaxKind::MinusToken
                    || arena.kind(data.operand) != Some(SyntaxKind::NumericLiteral)
                {
                    return None;
                }
                Some(Type::NumberLiteral(format!("-{}", file.node_text(data.operand))))
            }
            _ => None,
        }
    }

    fn type_reference(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(idx).and_then(|node| arena.get_type_ref(node)) else {
            return Type::Any;
        };
        let name = file.node_text(data.type_name).to_string();
        let arguments = data.type_arguments.as_ref().map(|l| l.nodes.clone()).unwrap_or_default();
        let mut type_arguments: Vec<Type> = arguments.into_iter().map(|a| self.get_type_from_type_node(a)).collect();
        if name == "Array" && type_arguments.len() == 1 {
            if let Some(element) = type_arguments.pop() {
                return Type::array(element);
            }
        }
        Type::Reference { name, type_arguments }
    }

    fn tuple_type(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let elements: Vec<NodeIndex> = arena
            .get(idx)
            .and_then(|node| arena.get_tuple_type(node))
            .map(|d| d.elements.nodes.clone())
            .unwrap_or_default();
        let plain = elements.iter().all(|&e| {
            !matches!(
                arena.kind(e),
                Some(SyntaxKind::NamedTupleMember | SyntaxKind::OptionalType | SyntaxKind::RestType)
            )
        });
        if !plain {
            return self.text_type(idx);
        }
        Type::Tuple(elements.into_iter().map(|e| self.get_type_from_type_node(e)).collect())
    }

    fn type_literal(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let members: Vec<NodeIndex> = arena
            .get(idx)
            .and_then(|node| arena.get_type_literal(node))
            .map(|d| d.members.nodes.clone())
            .unwrap_or_default();
        let mut properties = Vec::with_capacity(members.len());
        for member in members {
            let Some(node) = arena.get(member) else {
                continue;
            };
            let property = match (&node.data, node.kind) {
                (NodeData::PropertyDecl(data), SyntaxKind::PropertySignature) => {
                    let Some(name) = arena.get_property_name_text(data.name) else {
                        return self.text_type(idx);
                    };
                    let readonly = arena
                        .modifier_flags(data.modifiers.as_ref())
                        .contains(ModifierFlags::READONLY);
                    let (name, optional, annotation) = (name.to_string(), data.question_token, data.type_annotation);
                    PropertyType {
                        name,
                        optional,
                        readonly,
                        ty: self.get_type_from_type_node(annotation),
                    }
                }
                (NodeData::Signature(data), SyntaxKind::MethodSignature) => {
                    let Some(name) = arena.get_property_name_text(data.name) else {
                        return self.text_type(idx);
                    };
                    let (name, optional) = (name.to_string(), data.question_token);
                    let parameters = data.parameters.nodes.clone();
                    let return_node = data.type_annotation;
                    let parameters = self.parameter_types(&parameters);
                    let return_type = self.get_type_from_type_node(return_node);
                    PropertyType {
                        name,
                        optional,
                        readonly: false,
                        ty: Type::Function(Box::new(FunctionType {
                            parameters,
                            return_type,
                        })),
                    }
                }
                _ => return self.text_type(idx),
            };
            properties.push(property);
        }
        Type::Object(properties)
    }

    /// Parameter list of a signature, without an explicit `this` parameter.
    pub(crate) fn parameter_types(&mut self, parameters: &[NodeIndex]) -> Vec<ParameterType> {
        let mut out = Vec::with_capacity(parameters.len());
        for (position, &parameter) in parameters.iter().enumerate() {
            let file = self.file;
            let arena = &file.arena;
            let Some(data) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
                continue;
            };
            let name = match arena.get_identifier_text(data.name) {
                Some("this") => continue,
                Some(text) => text.to_string(),
                None => format!("__{position}"),
            };
            let optional = data.question_token || data.initializer.is_some();
            let rest = data.dot_dot_dot_token;
            let ty = self.get_type_of_parameter(parameter);
            out.push(ParameterType {
                name,
                optional,
                rest,
                ty,
            });
        }
        out
    }
}
