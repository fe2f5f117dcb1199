//! Types of expressions and declarations.
//!
//! This is a declaration-level checker: annotations are taken as written,
//! initializers and return expressions are typed structurally, and anything
//! that would need inference across calls falls back to `any`.

use crate::binder::SymbolId;
use crate::state::CheckerState;
use crate::types::{FunctionType, PropertyType, Type};
use tracing::trace;
use typewiz_common::limits::MAX_EXPR_CHECK_DEPTH;
use typewiz_parser::{ModifierFlags, NodeData, NodeFlags, NodeIndex, ParsedFile, SyntaxKind};

/// Base-class chains longer than this are not followed.
const MAX_HERITAGE_DEPTH: u32 = 16;

impl CheckerState<'_> {
    /// Type of an expression (or declaration name) node.
    pub fn get_type_of_node(&mut self, idx: NodeIndex) -> Type {
        if let Some(cached) = self.ctx.node_types.get(&idx) {
            return cached.clone();
        }
        if self.ctx.depth >= MAX_EXPR_CHECK_DEPTH {
            trace!(node = idx.0, "expression too deeply nested, using any");
            return Type::Any;
        }
        self.ctx.depth += 1;
        let ty = self.compute_type_of_node(idx);
        self.ctx.depth -= 1;
        self.ctx.node_types.insert(idx, ty.clone());
        ty
    }

    fn compute_type_of_node(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(node) = arena.get(idx) else {
            return Type::Any;
        };
        match node.kind {
            SyntaxKind::Identifier => self.get_type_of_identifier(idx),
            SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword => self.literal_type_of(idx).unwrap_or(Type::Any),
            SyntaxKind::BigIntLiteral => Type::BigInt,
            SyntaxKind::RegularExpressionLiteral => Type::reference("RegExp"),
            SyntaxKind::TemplateExpression => Type::String,
            SyntaxKind::ThisKeyword => self.get_type_of_this(idx),
            SyntaxKind::ArrayLiteralExpression => self.get_type_of_array_literal(idx),
            SyntaxKind::ObjectLiteralExpression => self.get_type_of_object_literal(idx),
            SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction => {
                Type::Function(Box::new(self.get_function_type(idx)))
            }
            SyntaxKind::ClassExpression => Type::TypeOf(self.class_name(idx)),
            SyntaxKind::ParenthesizedExpression | SyntaxKind::SpreadElement => {
                let inner = arena.get_unary_expr_ex(node).map_or(NodeIndex::NONE, |d| d.expression);
                self.get_type_of_node(inner)
            }
            SyntaxKind::NonNullExpression => {
                let inner = arena.get_unary_expr_ex(node).map_or(NodeIndex::NONE, |d| d.expression);
                let ty = self.get_type_of_node(inner);
                remove_nullable(ty)
            }
            SyntaxKind::AwaitExpression => {
                let inner = arena.get_unary_expr_ex(node).map_or(NodeIndex::NONE, |d| d.expression);
                awaited(self.get_type_of_node(inner))
            }
            SyntaxKind::TypeOfExpression => Type::String,
            SyntaxKind::VoidExpression => Type::Undefined,
            SyntaxKind::DeleteExpression => Type::Boolean,
            SyntaxKind::PrefixUnaryExpression => self.get_type_of_prefix_unary(idx),
            SyntaxKind::PostfixUnaryExpression => Type::Number,
            SyntaxKind::BinaryExpression => self.get_type_of_binary(idx),
            SyntaxKind::ConditionalExpression => {
                let Some(data) = arena.get_conditional_expr(node) else {
                    return Type::Any;
                };
                let (when_true, when_false) = (data.when_true, data.when_false);
                let when_true = self.get_type_of_node(when_true);
                let when_false = self.get_type_of_node(when_false);
                Type::union(vec![when_true, when_false])
            }
            SyntaxKind::AsExpression | SyntaxKind::TypeAssertionExpression => {
                let Some(data) = arena.get_type_assertion(node) else {
                    return Type::Any;
                };
                let (expression, type_node) = (data.expression, data.type_node);
                if is_const_reference(file, type_node) {
                    self.get_type_of_node(expression)
                } else {
                    self.get_type_from_type_node(type_node)
                }
            }
            SyntaxKind::SatisfiesExpression => {
                let inner = arena.get_type_assertion(node).map_or(NodeIndex::NONE, |d| d.expression);
                self.get_type_of_node(inner)
            }
            SyntaxKind::CallExpression | SyntaxKind::TaggedTemplateExpression => {
                let callee = match &node.data {
                    NodeData::Call(data) => data.expression,
                    NodeData::TaggedTemplate(data) => data.tag,
                    _ => NodeIndex::NONE,
                };
                match self.get_type_of_node(callee) {
                    Type::Function(function) => function.return_type,
                    _ => Type::Any,
                }
            }
            SyntaxKind::NewExpression => self.get_type_of_new_expression(idx),
            SyntaxKind::PropertyAccessExpression => {
                let Some(data) = arena.get_access_expr(node) else {
                    return Type::Any;
                };
                let (object, name) = (data.expression, data.name_or_argument);
                let Some(name) = arena.get_identifier_text(name) else {
                    return Type::Any;
                };
                let object_type = self.get_type_of_node(object);
                self.get_property_of_type(&object_type, name, idx)
            }
            SyntaxKind::ElementAccessExpression => self.get_type_of_element_access(idx),
            _ => Type::Any,
        }
    }

    fn get_type_of_identifier(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        match self.binder.resolve_identifier(arena, idx) {
            Some(symbol) => self.get_type_of_symbol(symbol),
            None if arena.get_identifier_text(idx) == Some("undefined") => Type::Undefined,
            None => Type::Any,
        }
    }

    // =========================================================================
    // Symbols and declarations
    // =========================================================================

    /// Type of the value a symbol denotes. Circular references resolve to
    /// `any`.
    pub fn get_type_of_symbol(&mut self, symbol_id: SymbolId) -> Type {
        if let Some(cached) = self.ctx.symbol_types.get(&symbol_id) {
            return cached.clone();
        }
        if !self.ctx.resolving.insert(symbol_id) {
            return Type::Any;
        }
        let binder = self.binder;
        let ty = match binder.get_symbol(symbol_id) {
            Some(symbol) => {
                let declaration = symbol.value_declaration();
                match self.file.arena.kind(declaration) {
                    Some(SyntaxKind::ClassDeclaration | SyntaxKind::EnumDeclaration | SyntaxKind::ModuleDeclaration) => {
                        Type::TypeOf(symbol.name.clone())
                    }
                    Some(SyntaxKind::InterfaceDeclaration | SyntaxKind::TypeAliasDeclaration) => {
                        Type::reference(symbol.name.clone())
                    }
                    Some(
                        SyntaxKind::ImportClause
                        | SyntaxKind::NamespaceImport
                        | SyntaxKind::ImportSpecifier
                        | SyntaxKind::ImportEqualsDeclaration,
                    ) => Type::Any,
                    _ => self.get_type_of_declaration(declaration),
                }
            }
            None => Type::Any,
        };
        self.ctx.resolving.remove(&symbol_id);
        self.ctx.symbol_types.insert(symbol_id, ty.clone());
        ty
    }

    /// Declared (or initializer-inferred) type of a declaration node.
    pub fn get_type_of_declaration(&mut self, declaration: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(node) = arena.get(declaration) else {
            return Type::Any;
        };
        match node.kind {
            SyntaxKind::VariableDeclaration => {
                let Some(data) = arena.get_variable_declaration(node) else {
                    return Type::Any;
                };
                let (annotation, initializer) = (data.type_annotation, data.initializer);
                if annotation.is_some() {
                    return self.get_type_from_type_node(annotation);
                }
                let list = arena.get(node.parent);
                if initializer.is_some() {
                    let ty = self.get_type_of_node(initializer);
                    let is_const = list.is_some_and(|l| l.flags.contains(NodeFlags::CONST));
                    return if is_const { ty } else { ty.widen() };
                }
                self.get_type_of_loop_variable(node.parent)
            }
            SyntaxKind::Parameter => self.get_type_of_parameter(declaration),
            SyntaxKind::BindingElement => self.get_type_of_binding_element(declaration),
            SyntaxKind::PropertyDeclaration | SyntaxKind::PropertySignature => {
                self.get_type_of_property_declaration(declaration)
            }
            SyntaxKind::EnumMember => {
                let enum_decl = node.parent;
                let enum_name = arena
                    .get(enum_decl)
                    .and_then(|n| arena.get_enum(n))
                    .and_then(|d| arena.get_identifier_text(d.name))
                    .unwrap_or("");
                Type::reference(enum_name)
            }
            kind if kind.is_function_like() => Type::Function(Box::new(self.get_function_type(declaration))),
            _ => Type::Any,
        }
    }

    /// Variable of a `for ... of` / `for ... in` head without initializer.
    fn get_type_of_loop_variable(&mut self, list: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let statement = arena.parent_of(list);
        let Some(node) = arena.get(statement) else {
            return Type::Any;
        };
        match (node.kind, arena.get_for_in_of(node)) {
            (SyntaxKind::ForInStatement, Some(_)) => Type::String,
            (SyntaxKind::ForOfStatement, Some(data)) if data.initializer == list => {
                let iterated = data.expression;
                match self.get_type_of_node(iterated) {
                    Type::Array(element) => *element,
                    Type::Tuple(elements) => Type::union(elements),
                    Type::String | Type::StringLiteral(_) => Type::String,
                    _ => Type::Any,
                }
            }
            _ => Type::Any,
        }
    }

    pub(crate) fn get_type_of_parameter(&mut self, parameter: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
            return Type::Any;
        };
        let (annotation, initializer, rest) = (data.type_annotation, data.initializer, data.dot_dot_dot_token);
        if annotation.is_some() {
            self.get_type_from_type_node(annotation)
        } else if initializer.is_some() {
            self.get_type_of_node(initializer).widen()
        } else if rest {
            Type::array(Type::Any)
        } else {
            Type::Any
        }
    }

    fn get_type_of_binding_element(&mut self, element: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(node) = arena.get(element) else {
            return Type::Any;
        };
        let Some(data) = arena.get_binding_element(node) else {
            return Type::Any;
        };
        let pattern = node.parent;
        let holder = arena.parent_of(pattern);
        let parent_type = match arena.kind(holder) {
            Some(SyntaxKind::VariableDeclaration) => self.get_type_of_declaration(holder),
            Some(SyntaxKind::Parameter) => self.get_type_of_parameter(holder),
            Some(SyntaxKind::BindingElement) => self.get_type_of_binding_element(holder),
            _ => Type::Any,
        };

        let ty = match arena.kind(pattern) {
            Some(SyntaxKind::ObjectBindingPattern) if !data.dot_dot_dot_token => {
                let key = if data.property_name.is_some() {
                    arena.get_property_name_text(data.property_name)
                } else {
                    arena.get_identifier_text(data.name)
                };
                match key {
                    Some(key) => self.get_property_of_type(&parent_type, key, element),
                    None => Type::Any,
                }
            }
            Some(SyntaxKind::ArrayBindingPattern) => {
                let position = arena
                    .get(pattern)
                    .and_then(|p| arena.get_binding_pattern(p))
                    .and_then(|p| p.elements.nodes.iter().position(|&e| e == element))
                    .unwrap_or(0);
                match parent_type {
                    Type::Array(element_type) if data.dot_dot_dot_token => Type::Array(element_type),
                    Type::Array(element_type) => *element_type,
                    Type::Tuple(elements) if !data.dot_dot_dot_token => {
                        elements.get(position).cloned().unwrap_or(Type::Undefined)
                    }
                    _ => Type::Any,
                }
            }
            _ => Type::Any,
        };

        if ty.is_any() && data.initializer.is_some() {
            return self.get_type_of_node(data.initializer).widen();
        }
        ty
    }

    fn get_type_of_property_declaration(&mut self, declaration: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(declaration).and_then(|n| arena.get_property_decl(n)) else {
            return Type::Any;
        };
        let (annotation, initializer) = (data.type_annotation, data.initializer);
        let readonly = arena
            .modifier_flags(data.modifiers.as_ref())
            .contains(ModifierFlags::READONLY);
        if annotation.is_some() {
            self.get_type_from_type_node(annotation)
        } else if initializer.is_some() {
            let ty = self.get_type_of_node(initializer);
            if readonly { ty } else { ty.widen() }
        } else {
            Type::Any
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Signature of a function-like node. Without a return annotation the
    /// return type is inferred from the body.
    pub fn get_function_type(&mut self, function: NodeIndex) -> FunctionType {
        let file = self.file;
        let arena = &file.arena;
        let Some(node) = arena.get(function) else {
            return FunctionType {
                parameters: Vec::new(),
                return_type: Type::Any,
            };
        };
        let kind = node.kind;
        let Some(data) = arena.get_function(node) else {
            return FunctionType {
                parameters: Vec::new(),
                return_type: Type::Any,
            };
        };
        let parameters = data.parameters.nodes.clone();
        let annotation = data.type_annotation;
        let parameters = self.parameter_types(&parameters);
        let return_type = if annotation.is_some() {
            self.get_type_from_type_node(annotation)
        } else if matches!(kind, SyntaxKind::Constructor | SyntaxKind::SetAccessor) {
            Type::Void
        } else {
            self.infer_return_type(function)
        };
        FunctionType {
            parameters,
            return_type,
        }
    }

    fn infer_return_type(&mut self, function: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(function).and_then(|n| arena.get_function(n)) else {
            return Type::Any;
        };
        let (body, is_async, is_generator) = (data.body, data.is_async, data.asterisk_token);
        if is_generator || body.is_none() {
            return Type::Any;
        }

        let ty = if arena.kind(body) == Some(SyntaxKind::Block) {
            let mut returns = Vec::new();
            self.collect_return_expressions(body, &mut returns);
            if returns.is_empty() {
                Type::Void
            } else {
                let types = returns.into_iter().map(|r| self.get_type_of_node(r).widen()).collect();
                Type::union(types)
            }
        } else {
            self.get_type_of_node(body).widen()
        };

        if is_async {
            Type::Reference {
                name: "Promise".to_string(),
                type_arguments: vec![awaited(ty)],
            }
        } else {
            ty
        }
    }

    /// Expressions of the `return` statements belonging to a function body,
    /// not descending into nested functions or classes.
    fn collect_return_expressions(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        let file = self.file;
        let arena = &file.arena;
        for child in arena.get_children(idx) {
            let Some(node) = arena.get(child) else {
                continue;
            };
            match node.kind {
                SyntaxKind::ReturnStatement => {
                    if let Some(data) = arena.get_expression_statement(node) {
                        if data.expression.is_some() {
                            out.push(data.expression);
                        }
                    }
                }
                kind if kind.is_function_like() => {}
                SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => {}
                _ => self.collect_return_expressions(child, out),
            }
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn get_type_of_prefix_unary(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_unary_expr(n)) else {
            return Type::Any;
        };
        let (operator, operand) = (data.operator, data.operand);
        match operator {
            SyntaxKind::ExclamationToken => Type::Boolean,
            SyntaxKind::MinusToken if arena.kind(operand) == Some(SyntaxKind::NumericLiteral) => {
                self.literal_type_of(idx).unwrap_or(Type::Number)
            }
            SyntaxKind::MinusToken | SyntaxKind::TildeToken => match self.get_type_of_node(operand) {
                Type::BigInt => Type::BigInt,
                _ => Type::Number,
            },
            _ => Type::Number,
        }
    }

    fn get_type_of_binary(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_binary_expr(n)) else {
            return Type::Any;
        };
        let (left, operator, right) = (data.left, data.operator_token, data.right);
        match operator {
            SyntaxKind::CommaToken | SyntaxKind::EqualsToken => self.get_type_of_node(right),
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken
            | SyntaxKind::InstanceOfKeyword
            | SyntaxKind::InKeyword => Type::Boolean,
            SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AmpersandAmpersandEqualsToken => {
                self.get_type_of_node(right).widen()
            }
            SyntaxKind::BarBarToken
            | SyntaxKind::QuestionQuestionToken
            | SyntaxKind::BarBarEqualsToken
            | SyntaxKind::QuestionQuestionEqualsToken => {
                let left = remove_nullable(self.get_type_of_node(left));
                let right = self.get_type_of_node(right);
                Type::union(vec![left, right]).widen()
            }
            SyntaxKind::PlusToken | SyntaxKind::PlusEqualsToken => {
                let left = self.get_type_of_node(left).widen();
                let right = self.get_type_of_node(right).widen();
                match (left, right) {
                    (Type::String, _) | (_, Type::String) => Type::String,
                    (Type::Any, _) | (_, Type::Any) => Type::Any,
                    (Type::Number, Type::Number) => Type::Number,
                    (Type::BigInt, Type::BigInt) => Type::BigInt,
                    _ => Type::Any,
                }
            }
            _ => {
                let left = self.get_type_of_node(left).widen();
                let right = self.get_type_of_node(right).widen();
                if left == Type::BigInt && right == Type::BigInt {
                    Type::BigInt
                } else {
                    Type::Number
                }
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn get_type_of_array_literal(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let elements: Vec<NodeIndex> = arena
            .get(idx)
            .and_then(|n| arena.get_literal_expr(n))
            .map(|d| d.elements.nodes.clone())
            .unwrap_or_default();
        if elements.is_empty() {
            return Type::array(Type::Any);
        }
        let mut types = Vec::with_capacity(elements.len());
        for element in elements {
            let ty = match arena.kind(element) {
                Some(SyntaxKind::SpreadElement) => match self.get_type_of_node(element) {
                    Type::Array(inner) => *inner,
                    Type::Tuple(inner) => Type::union(inner).widen(),
                    Type::String => Type::String,
                    _ => Type::Any,
                },
                Some(SyntaxKind::OmittedExpression) => Type::Undefined,
                _ => self.get_type_of_node(element).widen(),
            };
            types.push(ty);
        }
        Type::array(Type::union(types))
    }

    fn get_type_of_object_literal(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let members: Vec<NodeIndex> = arena
            .get(idx)
            .and_then(|n| arena.get_literal_expr(n))
            .map(|d| d.elements.nodes.clone())
            .unwrap_or_default();
        let mut properties: Vec<PropertyType> = Vec::with_capacity(members.len());
        for member in members {
            let Some(node) = arena.get(member) else {
                continue;
            };
            match (node.kind, &node.data) {
                (SyntaxKind::PropertyAssignment, NodeData::PropertyAssignment(data)) => {
                    let Some(name) = arena.get_property_name_text(data.name) else {
                        continue;
                    };
                    let ty = self.get_type_of_node(data.initializer).widen();
                    set_property(&mut properties, name, ty);
                }
                (SyntaxKind::ShorthandPropertyAssignment, NodeData::ShorthandProperty(data)) => {
                    let Some(name) = arena.get_identifier_text(data.name) else {
                        continue;
                    };
                    let ty = self.get_type_of_node(data.name).widen();
                    set_property(&mut properties, name, ty);
                }
                (SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor, NodeData::Function(data)) => {
                    let Some(name) = arena.get_property_name_text(data.name) else {
                        continue;
                    };
                    let function = self.get_function_type(member);
                    let ty = if node.kind == SyntaxKind::GetAccessor {
                        function.return_type
                    } else {
                        Type::Function(Box::new(function))
                    };
                    set_property(&mut properties, name, ty);
                }
                (SyntaxKind::SetAccessor, NodeData::Function(data)) => {
                    let Some(name) = arena.get_property_name_text(data.name) else {
                        continue;
                    };
                    if properties.iter().any(|p| p.name == name) {
                        continue;
                    }
                    let ty = self
                        .get_function_type(member)
                        .parameters
                        .into_iter()
                        .next()
                        .map_or(Type::Any, |p| p.ty);
                    set_property(&mut properties, name, ty);
                }
                (SyntaxKind::SpreadAssignment, NodeData::UnaryExprEx(data)) => {
                    if let Type::Object(spread) = self.get_type_of_node(data.expression) {
                        for property in spread {
                            set_property(&mut properties, &property.name, property.ty);
                        }
                    }
                }
                _ => {}
            }
        }
        Type::Object(properties)
    }

    // =========================================================================
    // Construction and member access
    // =========================================================================

    fn get_type_of_new_expression(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_call_expr(n)) else {
            return Type::Any;
        };
        let callee = data.expression;
        let arguments = data.type_arguments.as_ref().map(|l| l.nodes.clone()).unwrap_or_default();
        let type_arguments: Vec<Type> = arguments.into_iter().map(|a| self.get_type_from_type_node(a)).collect();

        if arena.kind(callee) == Some(SyntaxKind::Identifier)
            && self.binder.resolve_identifier(arena, callee).is_none()
        {
            let name = arena.get_identifier_text(callee).unwrap_or_default().to_string();
            return Type::Reference { name, type_arguments };
        }
        match self.get_type_of_node(callee) {
            Type::TypeOf(name) => Type::Reference { name, type_arguments },
            _ => Type::Any,
        }
    }

    fn get_type_of_element_access(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_access_expr(n)) else {
            return Type::Any;
        };
        let (object, argument) = (data.expression, data.name_or_argument);
        let object_type = self.get_type_of_node(object);
        match object_type {
            Type::Array(element) => *element,
            Type::String | Type::StringLiteral(_) => Type::String,
            Type::Tuple(elements) => {
                let position = arena
                    .get(argument)
                    .filter(|n| n.kind == SyntaxKind::NumericLiteral)
                    .and_then(|_| file.node_text(argument).parse::<usize>().ok());
                match position {
                    Some(position) => elements.get(position).cloned().unwrap_or(Type::Undefined),
                    None => Type::union(elements),
                }
            }
            other => match arena.get_property_name_text(argument) {
                Some(name) if arena.kind(argument) != Some(SyntaxKind::NumericLiteral) => {
                    self.get_property_of_type(&other, name, idx)
                }
                _ => Type::Any,
            },
        }
    }

    /// Type of property `name` on values of type `ty`, as seen from
    /// `location`.
    pub fn get_property_of_type(&mut self, ty: &Type, name: &str, location: NodeIndex) -> Type {
        match ty {
            Type::Array(_) | Type::Tuple(_) | Type::String | Type::StringLiteral(_) if name == "length" => {
                Type::Number
            }
            Type::Object(properties) => properties
                .iter()
                .find(|p| p.name == name)
                .map_or(Type::Any, |p| p.ty.clone()),
            Type::Reference {
                name: type_name, ..
            } => self
                .get_member_of_named_type(type_name, name, false, location, 0)
                .unwrap_or(Type::Any),
            Type::TypeOf(type_name) => self
                .get_member_of_named_type(type_name, name, true, location, 0)
                .unwrap_or(Type::Any),
            Type::Union(members) => {
                let types = members
                    .iter()
                    .filter(|m| !matches!(m, Type::Null | Type::Undefined))
                    .map(|m| self.get_property_of_type(m, name, location))
                    .collect();
                Type::union(types)
            }
            _ => Type::Any,
        }
    }

    fn get_member_of_named_type(
        &mut self,
        type_name: &str,
        member: &str,
        is_static: bool,
        location: NodeIndex,
        depth: u32,
    ) -> Option<Type> {
        if depth > MAX_HERITAGE_DEPTH {
            return None;
        }
        let file = self.file;
        let arena = &file.arena;
        let symbol = self.binder.resolve_name(arena, type_name, location)?;
        let declarations = self.binder.get_symbol(symbol)?.declarations.clone();
        for declaration in declarations {
            let Some(node) = arena.get(declaration) else {
                continue;
            };
            let found = match node.kind {
                SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => {
                    self.get_class_member_type(declaration, member, is_static, depth)
                }
                SyntaxKind::InterfaceDeclaration if !is_static => {
                    self.get_interface_member_type(declaration, member, depth)
                }
                SyntaxKind::EnumDeclaration if is_static => {
                    let has_member = arena.get_enum(node).is_some_and(|data| {
                        data.members.iter().any(|m| {
                            arena
                                .get(m)
                                .and_then(|n| arena.get_enum_member(n))
                                .and_then(|d| arena.get_property_name_text(d.name))
                                == Some(member)
                        })
                    });
                    has_member.then(|| Type::reference(type_name))
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn get_class_member_type(&mut self, class: NodeIndex, member: &str, is_static: bool, depth: u32) -> Option<Type> {
        let file = self.file;
        let arena = &file.arena;
        let data = arena.get(class).and_then(|n| arena.get_class(n))?;

        for &m in &data.members.nodes {
            let Some(node) = arena.get(m) else {
                continue;
            };
            let member_static = arena.has_modifier(node, ModifierFlags::STATIC);
            match (node.kind, &node.data) {
                (SyntaxKind::PropertyDeclaration, NodeData::PropertyDecl(prop)) => {
                    if member_static == is_static && arena.get_property_name_text(prop.name) == Some(member) {
                        return Some(self.get_type_of_property_declaration(m));
                    }
                }
                (SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor | SyntaxKind::SetAccessor, NodeData::Function(function)) => {
                    if member_static != is_static || arena.get_property_name_text(function.name) != Some(member) {
                        continue;
                    }
                    let signature = self.get_function_type(m);
                    return Some(match node.kind {
                        SyntaxKind::MethodDeclaration => Type::Function(Box::new(signature)),
                        SyntaxKind::GetAccessor => signature.return_type,
                        _ => signature.parameters.into_iter().next().map_or(Type::Any, |p| p.ty),
                    });
                }
                (SyntaxKind::Constructor, NodeData::Function(function)) if !is_static => {
                    for &parameter in &function.parameters.nodes {
                        let Some(param_node) = arena.get(parameter) else {
                            continue;
                        };
                        let Some(param) = arena.get_parameter(param_node) else {
                            continue;
                        };
                        let is_property = arena.modifier_flags(param.modifiers.as_ref()).intersects(
                            ModifierFlags::PUBLIC
                                | ModifierFlags::PRIVATE
                                | ModifierFlags::PROTECTED
                                | ModifierFlags::READONLY,
                        );
                        if is_property && arena.get_identifier_text(param.name) == Some(member) {
                            return Some(self.get_type_of_parameter(parameter));
                        }
                    }
                }
                _ => {}
            }
        }

        let base = self.extends_clause_name(data.heritage_clauses.as_ref().map(|l| l.nodes.as_slice()))?;
        self.get_member_of_named_type(&base, member, is_static, class, depth + 1)
    }

    fn get_interface_member_type(&mut self, interface: NodeIndex, member: &str, depth: u32) -> Option<Type> {
        let file = self.file;
        let arena = &file.arena;
        let data = arena.get(interface).and_then(|n| arena.get_interface(n))?;
        for &m in &data.members.nodes {
            let Some(node) = arena.get(m) else {
                continue;
            };
            match (node.kind, &node.data) {
                (SyntaxKind::PropertySignature, NodeData::PropertyDecl(prop))
                    if arena.get_property_name_text(prop.name) == Some(member) =>
                {
                    return Some(self.get_type_of_property_declaration(m));
                }
                (SyntaxKind::MethodSignature, NodeData::Signature(signature))
                    if arena.get_property_name_text(signature.name) == Some(member) =>
                {
                    let parameters = self.parameter_types(&signature.parameters.nodes);
                    let return_type = self.get_type_from_type_node(signature.type_annotation);
                    return Some(Type::Function(Box::new(FunctionType {
                        parameters,
                        return_type,
                    })));
                }
                _ => {}
            }
        }
        let base = self.extends_clause_name(data.heritage_clauses.as_ref().map(|l| l.nodes.as_slice()))?;
        self.get_member_of_named_type(&base, member, false, interface, depth + 1)
    }

    /// Name of the first type in an `extends` clause.
    fn extends_clause_name(&self, clauses: Option<&[NodeIndex]>) -> Option<String> {
        let file = self.file;
        let arena = &file.arena;
        clauses?.iter().find_map(|&clause| {
            let data = arena.get(clause).and_then(|n| arena.get_heritage_clause(n))?;
            if data.token != SyntaxKind::ExtendsKeyword {
                return None;
            }
            let first = data.types.first()?;
            let expression = arena.get(first).and_then(|n| arena.get_expr_type_args(n))?.expression;
            Some(file.node_text(expression).to_string())
        })
    }

    // =========================================================================
    // `this`
    // =========================================================================

    fn get_type_of_this(&mut self, idx: NodeIndex) -> Type {
        let file = self.file;
        let arena = &file.arena;
        let container = self.this_container(idx);
        let Some(node) = arena.get(container) else {
            return Type::Any;
        };
        match node.kind {
            SyntaxKind::FunctionDeclaration | SyntaxKind::FunctionExpression => {
                if !self.has_this_parameter(container) {
                    return Type::Any;
                }
                let annotation = arena
                    .get_function(node)
                    .and_then(|d| d.parameters.first())
                    .and_then(|p| arena.get(p).and_then(|n| arena.get_parameter(n)))
                    .map_or(NodeIndex::NONE, |p| p.type_annotation);
                self.get_type_from_type_node(annotation)
            }
            SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor => {
                let class = node.parent;
                if !matches!(
                    arena.kind(class),
                    Some(SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression)
                ) {
                    return Type::Any;
                }
                let name = self.class_name(class);
                if arena.has_modifier(node, ModifierFlags::STATIC) {
                    Type::TypeOf(name)
                } else {
                    Type::reference(name)
                }
            }
            SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => {
                let property = arena.find_ancestor(idx, |n| n.kind == SyntaxKind::PropertyDeclaration);
                let is_static = arena
                    .get(property)
                    .is_some_and(|member| arena.has_modifier(member, ModifierFlags::STATIC));
                let name = self.class_name(container);
                if is_static {
                    Type::TypeOf(name)
                } else {
                    Type::reference(name)
                }
            }
            _ => Type::Any,
        }
    }

    /// Declared name of a class, or the variable it initializes.
    fn class_name(&self, class: NodeIndex) -> String {
        let file = self.file;
        let arena = &file.arena;
        let own = arena
            .get(class)
            .and_then(|n| arena.get_class(n))
            .and_then(|d| arena.get_identifier_text(d.name));
        if let Some(name) = own {
            return name.to_string();
        }
        let parent = arena.parent_of(class);
        arena
            .get(parent)
            .and_then(|n| arena.get_variable_declaration(n))
            .and_then(|d| arena.get_identifier_text(d.name))
            .map_or_else(|| "(Anonymous class)".to_string(), str::to_string)
    }
}

fn set_property(properties: &mut Vec<PropertyType>, name: &str, ty: Type) {
    if let Some(existing) = properties.iter_mut().find(|p| p.name == name) {
        existing.ty = ty;
        return;
    }
    properties.push(PropertyType {
        name: name.to_string(),
        optional: false,
        readonly: false,
        ty,
    });
}

fn remove_nullable(ty: Type) -> Type {
    match ty {
        Type::Union(members) => Type::union(
            members
                .into_iter()
                .filter(|m| !matches!(m, Type::Null | Type::Undefined))
                .collect(),
        ),
        other => other,
    }
}

/// `T` for `Promise<T>`, otherwise the type itself.
fn awaited(ty: Type) -> Type {
    match ty {
        Type::Reference {
            name,
            mut type_arguments,
        } if name == "Promise" && type_arguments.len() == 1 => type_arguments.pop().unwrap_or(Type::Any),
        other => other,
    }
}

/// `as const` / `<const>`.
fn is_const_reference(file: &ParsedFile, type_node: NodeIndex) -> bool {
    file.arena.kind(type_node) == Some(SyntaxKind::ConstKeyword)
}
