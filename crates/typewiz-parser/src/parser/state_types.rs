//! Parser state - type annotations, type members and type arguments.

use super::state::{CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, ParserState};
use crate::parser::{
    NodeIndex, NodeList,
    node::{
        ArrayTypeData, CompositeTypeData, ConditionalTypeData, ImportTypeData,
        IndexedAccessTypeData, InferTypeData, LiteralTypeData, MappedTypeData,
        NamedTupleMemberData, NodeData, PropertyDeclData, QualifiedNameData, SignatureData,
        TemplateExprData, TemplateSpanData, TupleTypeData, TypeLiteralData, TypeOperatorData,
        TypeParameterData, TypePredicateData, TypeQueryData, TypeRefData, UnaryExprData,
        WrappedTypeData,
    },
};
use crate::scanner::SyntaxKind;
use typewiz_common::diagnostics::diagnostic_codes;

impl ParserState {
    // =========================================================================
    // Entry points
    // =========================================================================

    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier();
        }
        let result = self.parse_type_worker();
        self.exit_recursion();
        result
    }

    fn parse_type_worker(&mut self) -> NodeIndex {
        if self.is_start_of_function_or_constructor_type() {
            return self.parse_function_or_constructor_type();
        }
        let pos = self.token_pos();
        let check_type = self.parse_union_type_or_higher();
        if self.in_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES)
            || self.has_preceding_line_break()
            || !self.is_token(SyntaxKind::ExtendsKeyword)
        {
            return check_type;
        }
        self.next_token();
        let extends_type = self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, 0, |p| p.parse_type());
        self.parse_expected(SyntaxKind::QuestionToken);
        let true_type = self.with_context(0, CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, |p| p.parse_type());
        self.parse_expected(SyntaxKind::ColonToken);
        let false_type = self.with_context(0, CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, |p| p.parse_type());
        self.arena.add_node(
            SyntaxKind::ConditionalType,
            pos,
            self.prev_token_end,
            NodeData::ConditionalType(ConditionalTypeData {
                check_type,
                extends_type,
                true_type,
                false_type,
            }),
        )
    }

    /// Return type after `kind` (`:` for declarations, `=>` for function
    /// types). NONE when `kind` is absent.
    pub(crate) fn parse_return_type(&mut self, kind: SyntaxKind) -> NodeIndex {
        if !self.parse_optional(kind) {
            return NodeIndex::NONE;
        }
        self.parse_type_or_type_predicate()
    }

    fn parse_type_or_type_predicate(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let is_asserts = self.is_token(SyntaxKind::AssertsKeyword)
            && self.next_token_is_on_same_line(|p| {
                p.is_identifier() || p.is_token(SyntaxKind::ThisKeyword)
            });
        let is_predicate = !is_asserts
            && (self.is_identifier() || self.is_token(SyntaxKind::ThisKeyword))
            && self.next_token_is_on_same_line(|p| p.is_token(SyntaxKind::IsKeyword));
        if !is_asserts && !is_predicate {
            return self.parse_type();
        }
        if is_asserts {
            self.next_token();
        }
        let parameter_name = self.parse_predicate_parameter_name();
        let type_node = if self.parse_optional(SyntaxKind::IsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_node(
            SyntaxKind::TypePredicate,
            pos,
            self.prev_token_end,
            NodeData::TypePredicate(TypePredicateData {
                asserts_modifier: is_asserts,
                parameter_name,
                type_node,
            }),
        )
    }

    fn parse_predicate_parameter_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::ThisKeyword) {
            let (pos, end) = (self.token_pos(), self.token_end());
            self.next_token();
            return self.arena.add_token(SyntaxKind::ThisType, pos, end);
        }
        self.parse_identifier()
    }

    /// `<T, U>` after a type or expression name, if present.
    pub(crate) fn parse_type_arguments_if_present(&mut self) -> Option<NodeList> {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return None;
        }
        let after_open = self.token_end();
        self.next_token();
        let mut list = self.parse_delimited_list(SyntaxKind::GreaterThanToken, Self::parse_type);
        list.pos = after_open;
        list.end = self.token_pos();
        self.parse_expected(SyntaxKind::GreaterThanToken);
        Some(list)
    }

    /// `A` or `A.B.C`.
    pub(crate) fn parse_entity_name(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut entity = if self.is_token(SyntaxKind::ThisKeyword) {
            self.create_identifier()
        } else {
            self.parse_identifier()
        };
        while self.is_token(SyntaxKind::DotToken) {
            // `A.<T>` is not an entity name continuation.
            if self.next_token_is(|p| p.is_token(SyntaxKind::LessThanToken)) {
                break;
            }
            self.next_token();
            let right = self.parse_identifier_name();
            entity = self.arena.add_node(
                SyntaxKind::QualifiedName,
                pos,
                self.prev_token_end,
                NodeData::QualifiedName(QualifiedNameData {
                    left: entity,
                    right,
                }),
            );
        }
        entity
    }

    // =========================================================================
    // Function and constructor types
    // =========================================================================

    fn is_start_of_function_or_constructor_type(&mut self) -> bool {
        match self.token() {
            SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::AbstractKeyword => self.next_token_is(|p| p.is_token(SyntaxKind::NewKeyword)),
            SyntaxKind::OpenParenToken => self.look_ahead(|p| {
                p.next_token();
                if matches!(
                    p.token(),
                    SyntaxKind::CloseParenToken | SyntaxKind::DotDotDotToken
                ) {
                    return true;
                }
                if !p.skip_parameter_start() {
                    return false;
                }
                match p.token() {
                    SyntaxKind::ColonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::EqualsToken => true,
                    SyntaxKind::CloseParenToken => {
                        p.next_token();
                        p.is_token(SyntaxKind::EqualsGreaterThanToken)
                    }
                    _ => false,
                }
            }),
            _ => false,
        }
    }

    /// Skip the name of a would-be parameter; false if there is none.
    fn skip_parameter_start(&mut self) -> bool {
        while self.token().is_modifier_kind() && self.next_token_is(|p| p.is_identifier()) {
            self.next_token();
        }
        if self.is_identifier() || self.is_token(SyntaxKind::ThisKeyword) {
            self.next_token();
            return true;
        }
        if matches!(
            self.token(),
            SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
        ) {
            let errors_before = self.error_count;
            self.parse_binding_name();
            return self.error_count == errors_before;
        }
        false
    }

    fn parse_function_or_constructor_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut modifiers = None;
        if self.is_token(SyntaxKind::AbstractKeyword) {
            let (start, end) = (self.token_pos(), self.token_end());
            self.next_token();
            let token = self.arena.add_token(SyntaxKind::AbstractKeyword, start, end);
            modifiers = Some(NodeList::new(vec![token], start, end));
        }
        let kind = if self.parse_optional(SyntaxKind::NewKeyword) {
            SyntaxKind::ConstructorType
        } else {
            SyntaxKind::FunctionType
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let type_annotation = if self.is_token(SyntaxKind::EqualsGreaterThanToken) {
            self.parse_return_type(SyntaxKind::EqualsGreaterThanToken)
        } else {
            self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
            NodeIndex::NONE
        };
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Signature(SignatureData {
                modifiers,
                name: NodeIndex::NONE,
                question_token: false,
                type_parameters,
                parameters,
                type_annotation,
            }),
        )
    }

    // =========================================================================
    // Unions, intersections and operators
    // =========================================================================

    fn parse_union_type_or_higher(&mut self) -> NodeIndex {
        self.parse_composite_type(SyntaxKind::BarToken, SyntaxKind::UnionType, Self::parse_intersection_type_or_higher)
    }

    fn parse_intersection_type_or_higher(&mut self) -> NodeIndex {
        self.parse_composite_type(
            SyntaxKind::AmpersandToken,
            SyntaxKind::IntersectionType,
            Self::parse_type_operator_or_higher,
        )
    }

    fn parse_composite_type(
        &mut self,
        operator: SyntaxKind,
        kind: SyntaxKind,
        parse_constituent: fn(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.token_pos();
        let has_leading_operator = self.parse_optional(operator);
        let first = if has_leading_operator && self.is_start_of_function_or_constructor_type() {
            self.parse_function_or_constructor_type()
        } else {
            parse_constituent(self)
        };
        if !self.is_token(operator) && !has_leading_operator {
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(operator) {
            if self.is_start_of_function_or_constructor_type() {
                types.push(self.parse_function_or_constructor_type());
            } else {
                types.push(parse_constituent(self));
            }
        }
        if types.len() == 1 {
            return first;
        }
        let list = self.arena.make_list(types, pos);
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::CompositeType(CompositeTypeData { types: list }),
        )
    }

    fn parse_type_operator_or_higher(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::KeyOfKeyword | SyntaxKind::UniqueKeyword | SyntaxKind::ReadonlyKeyword => {
                let operator = self.token();
                self.next_token();
                let type_node = self.parse_type_operator_or_higher();
                self.arena.add_node(
                    SyntaxKind::TypeOperator,
                    pos,
                    self.prev_token_end,
                    NodeData::TypeOperator(TypeOperatorData {
                        operator,
                        type_node,
                    }),
                )
            }
            SyntaxKind::InferKeyword => {
                self.next_token();
                let parameter_pos = self.token_pos();
                let name = self.parse_identifier();
                let constraint = if self.is_token(SyntaxKind::ExtendsKeyword) {
                    // `infer U extends X ? A : B` keeps `extends` for the conditional.
                    self.try_parse(|p| {
                        p.next_token();
                        let constraint = p.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, 0, |q| q.parse_type());
                        let keeps_constraint = p.in_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES)
                            || !p.is_token(SyntaxKind::QuestionToken);
                        keeps_constraint.then_some(constraint)
                    })
                    .unwrap_or(NodeIndex::NONE)
                } else {
                    NodeIndex::NONE
                };
                let type_parameter = self.arena.add_node(
                    SyntaxKind::TypeParameter,
                    parameter_pos,
                    self.prev_token_end,
                    NodeData::TypeParameter(TypeParameterData {
                        modifiers: None,
                        name,
                        constraint,
                        default: NodeIndex::NONE,
                    }),
                );
                self.arena.add_node(
                    SyntaxKind::InferType,
                    pos,
                    self.prev_token_end,
                    NodeData::InferType(InferTypeData { type_parameter }),
                )
            }
            _ => self.with_context(0, CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, |p| {
                p.parse_postfix_type_or_higher()
            }),
        }
    }

    fn parse_postfix_type_or_higher(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while !self.has_preceding_line_break() && self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                type_node = self.arena.add_node(
                    SyntaxKind::ArrayType,
                    pos,
                    self.prev_token_end,
                    NodeData::ArrayType(ArrayTypeData {
                        element_type: type_node,
                    }),
                );
            } else {
                let index_type = self.parse_type();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                type_node = self.arena.add_node(
                    SyntaxKind::IndexedAccessType,
                    pos,
                    self.prev_token_end,
                    NodeData::IndexedAccessType(IndexedAccessTypeData {
                        object_type: type_node,
                        index_type,
                    }),
                );
            }
        }
        type_node
    }

    // =========================================================================
    // Primary types
    // =========================================================================

    fn parse_non_array_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::AnyKeyword
            | SyntaxKind::UnknownKeyword
            | SyntaxKind::StringKeyword
            | SyntaxKind::NumberKeyword
            | SyntaxKind::BigIntKeyword
            | SyntaxKind::SymbolKeyword
            | SyntaxKind::BooleanKeyword
            | SyntaxKind::UndefinedKeyword
            | SyntaxKind::NeverKeyword
            | SyntaxKind::ObjectKeyword
            | SyntaxKind::VoidKeyword
                if !self.next_token_is(|p| p.is_token(SyntaxKind::DotToken)) =>
            {
                let kind = self.token();
                let end = self.token_end();
                self.next_token();
                self.arena.add_token(kind, pos, end)
            }
            SyntaxKind::ThisKeyword => {
                let end = self.token_end();
                self.next_token();
                self.arena.add_token(SyntaxKind::ThisType, pos, end)
            }
            SyntaxKind::NullKeyword | SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let kind = self.token();
                let end = self.token_end();
                self.next_token();
                let literal = self.arena.add_token(kind, pos, end);
                self.make_literal_type(pos, literal)
            }
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                let kind = self.token();
                let end = self.token_end();
                let text = self.token_value();
                self.next_token();
                let literal = self.arena.add_literal(kind, pos, end, text);
                self.make_literal_type(pos, literal)
            }
            SyntaxKind::MinusToken
                if self.next_token_is(|p| {
                    matches!(p.token(), SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral)
                }) =>
            {
                self.next_token();
                let operand_pos = self.token_pos();
                let kind = self.token();
                let end = self.token_end();
                let text = self.token_value();
                self.next_token();
                let operand = self.arena.add_literal(kind, operand_pos, end, text);
                let literal = self.arena.add_node(
                    SyntaxKind::PrefixUnaryExpression,
                    pos,
                    self.prev_token_end,
                    NodeData::UnaryExpr(UnaryExprData {
                        operator: SyntaxKind::MinusToken,
                        operand,
                    }),
                );
                self.make_literal_type(pos, literal)
            }
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                let end = self.token_end();
                let text = self.token_value();
                self.next_token();
                let literal =
                    self.arena
                        .add_literal(SyntaxKind::NoSubstitutionTemplateLiteral, pos, end, text);
                self.make_literal_type(pos, literal)
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(),
            SyntaxKind::TypeOfKeyword => self.parse_type_query(),
            SyntaxKind::ImportKeyword => self.parse_import_type(false, pos),
            SyntaxKind::OpenBraceToken => {
                if self.is_start_of_mapped_type() {
                    self.parse_mapped_type()
                } else {
                    self.parse_type_literal()
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let type_node = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_node(
                    SyntaxKind::ParenthesizedType,
                    pos,
                    self.prev_token_end,
                    NodeData::WrappedType(WrappedTypeData { type_node }),
                )
            }
            _ if self.is_identifier()
                || (self.token().is_keyword()
                    && self.next_token_is(|p| p.is_token(SyntaxKind::DotToken))) =>
            {
                self.parse_type_reference()
            }
            _ => {
                self.error_at_current_token(diagnostic_codes::TYPE_EXPECTED, &[]);
                self.create_missing_identifier()
            }
        }
    }

    fn make_literal_type(&mut self, pos: u32, literal: NodeIndex) -> NodeIndex {
        self.arena.add_node(
            SyntaxKind::LiteralType,
            pos,
            self.prev_token_end,
            NodeData::LiteralType(LiteralTypeData { literal }),
        )
    }

    fn parse_type_reference(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let type_name = if self.is_identifier() {
            self.parse_entity_name()
        } else {
            // `undefined.x` and friends: keyword as the first name part.
            let first = self.parse_identifier_name();
            self.continue_entity_name(pos, first)
        };
        let type_arguments = if self.has_preceding_line_break() {
            None
        } else {
            self.parse_type_arguments_if_present()
        };
        self.arena.add_node(
            SyntaxKind::TypeReference,
            pos,
            self.prev_token_end,
            NodeData::TypeRef(TypeRefData {
                type_name,
                type_arguments,
            }),
        )
    }

    fn continue_entity_name(&mut self, pos: u32, mut entity: NodeIndex) -> NodeIndex {
        while self.parse_optional(SyntaxKind::DotToken) {
            let right = self.parse_identifier_name();
            entity = self.arena.add_node(
                SyntaxKind::QualifiedName,
                pos,
                self.prev_token_end,
                NodeData::QualifiedName(QualifiedNameData {
                    left: entity,
                    right,
                }),
            );
        }
        entity
    }

    fn parse_type_query(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::TypeOfKeyword);
        if self.is_token(SyntaxKind::ImportKeyword) {
            return self.parse_import_type(true, pos);
        }
        let name_pos = self.token_pos();
        let first = if self.is_token(SyntaxKind::ThisKeyword) || self.is_identifier() {
            self.create_identifier()
        } else {
            self.parse_identifier_name()
        };
        let expr_name = self.continue_entity_name(name_pos, first);
        let type_arguments = if self.has_preceding_line_break() {
            None
        } else {
            self.parse_type_arguments_if_present()
        };
        self.arena.add_node(
            SyntaxKind::TypeQuery,
            pos,
            self.prev_token_end,
            NodeData::TypeQuery(TypeQueryData {
                expr_name,
                type_arguments,
            }),
        )
    }

    fn parse_import_type(&mut self, is_type_of: bool, pos: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::ImportKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let argument = self.parse_type();
        // Import attributes (`, { with: ... }`) are skipped.
        if self.parse_optional(SyntaxKind::CommaToken) && !self.is_token(SyntaxKind::CloseParenToken) {
            self.parse_type_literal();
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let qualifier = if self.parse_optional(SyntaxKind::DotToken) {
            let qualifier_pos = self.token_pos();
            let first = self.parse_identifier_name();
            self.continue_entity_name(qualifier_pos, first)
        } else {
            NodeIndex::NONE
        };
        let type_arguments = if self.has_preceding_line_break() {
            None
        } else {
            self.parse_type_arguments_if_present()
        };
        self.arena.add_node(
            SyntaxKind::ImportType,
            pos,
            self.prev_token_end,
            NodeData::ImportType(ImportTypeData {
                is_type_of,
                argument,
                qualifier,
                type_arguments,
            }),
        )
    }

    fn parse_template_literal_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let head_end = self.token_end();
        let head_text = self.token_value();
        self.next_token();
        let head = self
            .arena
            .add_literal(SyntaxKind::TemplateHead, pos, head_end, head_text);

        let spans_pos = self.token_pos();
        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let type_node = self.parse_type();
            let literal_kind = if self.is_token(SyntaxKind::CloseBraceToken) {
                self.rescan_template_token()
            } else {
                self.error_at_current_token(diagnostic_codes::EXPECTED, &["}"]);
                SyntaxKind::TemplateTail
            };
            let (literal_pos, literal_end, literal_text) =
                (self.token_pos(), self.token_end(), self.token_value());
            if self.is_token(literal_kind)
                && matches!(literal_kind, SyntaxKind::TemplateMiddle | SyntaxKind::TemplateTail)
            {
                self.next_token();
            }
            let literal = self
                .arena
                .add_literal(literal_kind, literal_pos, literal_end, literal_text);
            spans.push(self.arena.add_node(
                SyntaxKind::TemplateLiteralTypeSpan,
                span_pos,
                self.prev_token_end,
                NodeData::TemplateSpan(TemplateSpanData {
                    expression: type_node,
                    literal,
                }),
            ));
            if literal_kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        let template_spans = NodeList::new(spans, spans_pos, self.prev_token_end);
        self.arena.add_node(
            SyntaxKind::TemplateLiteralType,
            pos,
            self.prev_token_end,
            NodeData::TemplateExpr(TemplateExprData {
                head,
                template_spans,
            }),
        )
    }

    // =========================================================================
    // Tuples
    // =========================================================================

    fn parse_tuple_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let elements = self.parse_delimited_list(SyntaxKind::CloseBracketToken, Self::parse_tuple_element);
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add_node(
            SyntaxKind::TupleType,
            pos,
            self.prev_token_end,
            NodeData::TupleType(TupleTypeData { elements }),
        )
    }

    fn parse_tuple_element(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let is_named = self.look_ahead(|p| {
            p.parse_optional(SyntaxKind::DotDotDotToken);
            if !p.token().is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            p.parse_optional(SyntaxKind::QuestionToken);
            p.is_token(SyntaxKind::ColonToken)
        });
        if is_named {
            let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_identifier_name();
            let question_token = self.parse_optional(SyntaxKind::QuestionToken);
            self.parse_expected(SyntaxKind::ColonToken);
            let type_node = self.parse_type();
            return self.arena.add_node(
                SyntaxKind::NamedTupleMember,
                pos,
                self.prev_token_end,
                NodeData::NamedTupleMember(NamedTupleMemberData {
                    dot_dot_dot_token,
                    name,
                    question_token,
                    type_node,
                }),
            );
        }
        if self.parse_optional(SyntaxKind::DotDotDotToken) {
            let type_node = self.parse_type();
            return self.arena.add_node(
                SyntaxKind::RestType,
                pos,
                self.prev_token_end,
                NodeData::WrappedType(WrappedTypeData { type_node }),
            );
        }
        let type_node = self.parse_type();
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return self.arena.add_node(
                SyntaxKind::OptionalType,
                pos,
                self.prev_token_end,
                NodeData::WrappedType(WrappedTypeData { type_node }),
            );
        }
        type_node
    }

    // =========================================================================
    // Mapped types
    // =========================================================================

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if matches!(p.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
                p.next_token();
                if !p.is_token(SyntaxKind::ReadonlyKeyword) {
                    return false;
                }
            }
            if p.is_token(SyntaxKind::ReadonlyKeyword) {
                p.next_token();
            }
            if !p.is_token(SyntaxKind::OpenBracketToken) {
                return false;
            }
            p.next_token();
            if !p.is_identifier() {
                return false;
            }
            p.next_token();
            p.is_token(SyntaxKind::InKeyword)
        })
    }

    fn parse_mapped_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);

        let mut readonly_token = None;
        if matches!(
            self.token(),
            SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::ReadonlyKeyword
        ) {
            readonly_token = Some(self.token());
            if !self.is_token(SyntaxKind::ReadonlyKeyword) {
                self.next_token();
            }
            self.parse_expected(SyntaxKind::ReadonlyKeyword);
        }

        self.parse_expected(SyntaxKind::OpenBracketToken);
        let parameter_pos = self.token_pos();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::InKeyword);
        let constraint = self.parse_type();
        let type_parameter = self.arena.add_node(
            SyntaxKind::TypeParameter,
            parameter_pos,
            self.prev_token_end,
            NodeData::TypeParameter(TypeParameterData {
                modifiers: None,
                name,
                constraint,
                default: NodeIndex::NONE,
            }),
        );
        let name_type = if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::CloseBracketToken);

        let mut question_token = None;
        if matches!(
            self.token(),
            SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::QuestionToken
        ) {
            question_token = Some(self.token());
            if !self.is_token(SyntaxKind::QuestionToken) {
                self.next_token();
            }
            self.parse_expected(SyntaxKind::QuestionToken);
        }

        let type_node = self.parse_type_annotation();
        self.parse_type_member_separator();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            SyntaxKind::MappedType,
            pos,
            self.prev_token_end,
            NodeData::MappedType(MappedTypeData {
                readonly_token,
                type_parameter,
                name_type,
                question_token,
                type_node,
            }),
        )
    }

    // =========================================================================
    // Type literals and interface members
    // =========================================================================

    fn parse_type_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let members = self.parse_object_type_members();
        self.arena.add_node(
            SyntaxKind::TypeLiteral,
            pos,
            self.prev_token_end,
            NodeData::TypeLiteral(TypeLiteralData { members }),
        )
    }

    /// `{ member; member }` of an interface or type literal.
    pub(crate) fn parse_object_type_members(&mut self) -> NodeList {
        let list_pos = self.token_end();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeList::empty_at(self.token_pos());
        }
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            let member = self.parse_type_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == before {
                self.unexpected_token();
                self.next_token();
            }
        }
        let list = NodeList::new(members, list_pos, self.token_pos());
        self.parse_expected(SyntaxKind::CloseBraceToken);
        list
    }

    /// `;` or `,` between members; a line break also separates.
    pub(crate) fn parse_type_member_separator(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) || self.parse_optional(SyntaxKind::CommaToken) {
            return;
        }
        if !self.is_token(SyntaxKind::CloseBraceToken) && !self.has_preceding_line_break() {
            self.parse_expected(SyntaxKind::SemicolonToken);
        }
    }

    fn parse_type_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();

        if matches!(self.token(), SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken) {
            return self.parse_signature_member(SyntaxKind::CallSignature, pos, None, NodeIndex::NONE, false);
        }
        if self.is_token(SyntaxKind::NewKeyword)
            && self.next_token_is(|p| {
                matches!(p.token(), SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken)
            })
        {
            self.next_token();
            return self.parse_signature_member(SyntaxKind::ConstructSignature, pos, None, NodeIndex::NONE, false);
        }

        let modifiers = self.parse_modifiers(false);

        if matches!(self.token(), SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && self.next_token_is(|p| p.is_property_name_start() && !p.has_preceding_line_break())
        {
            let kind = if self.is_token(SyntaxKind::GetKeyword) {
                SyntaxKind::GetAccessor
            } else {
                SyntaxKind::SetAccessor
            };
            self.next_token();
            let name = self.parse_property_name();
            return self.parse_signature_member(kind, pos, modifiers, name, false);
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.is_index_signature_start() {
            return self.parse_index_signature(pos, modifiers);
        }

        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        if matches!(self.token(), SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken) {
            return self.parse_signature_member(
                SyntaxKind::MethodSignature,
                pos,
                modifiers,
                name,
                question_token,
            );
        }

        let type_annotation = self.parse_type_annotation();
        // Initializers are invalid in type members but tolerated.
        let initializer = self.parse_initializer();
        self.parse_type_member_separator();
        self.arena.add_node(
            SyntaxKind::PropertySignature,
            pos,
            self.prev_token_end,
            NodeData::PropertyDecl(PropertyDeclData {
                modifiers,
                name,
                question_token,
                exclamation_token: false,
                type_annotation,
                initializer,
            }),
        )
    }

    fn parse_signature_member(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        modifiers: Option<NodeList>,
        name: NodeIndex,
        question_token: bool,
    ) -> NodeIndex {
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let type_annotation = self.parse_return_type(SyntaxKind::ColonToken);
        self.parse_type_member_separator();
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Signature(SignatureData {
                modifiers,
                name,
                question_token,
                type_parameters,
                parameters,
                type_annotation,
            }),
        )
    }
}

#[cfg(test)]
#[path = "tests/state_types_tests.rs"]
mod tests;
