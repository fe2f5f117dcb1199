//! Parser state - expressions, including arrow functions and literals.

use super::state::{
    CONTEXT_FLAG_ASYNC, CONTEXT_FLAG_DISALLOW_IN, CONTEXT_FLAG_FUNCTION_BODY,
    CONTEXT_FLAG_GENERATOR, ParserState,
};
use crate::parser::{
    NodeIndex, NodeList,
    node::{
        AccessExprData, BinaryExprData, CallExprData, ConditionalExprData, FunctionData,
        LiteralExprData, MetaPropertyData, NodeData, NodeFlags, ParameterData,
        PropertyAssignmentData, ShorthandPropertyData, TaggedTemplateData, TemplateExprData,
        TemplateSpanData, TypeAssertionData, UnaryExprData, UnaryExprDataEx,
    },
};
use crate::scanner::SyntaxKind;
use typewiz_common::diagnostics::diagnostic_codes;

/// Binding power of a binary operator; 0 when `kind` is not one.
pub(crate) fn binary_operator_precedence(kind: SyntaxKind) -> u8 {
    use SyntaxKind as K;
    match kind {
        K::QuestionQuestionToken => 4,
        K::BarBarToken => 5,
        K::AmpersandAmpersandToken => 6,
        K::BarToken => 7,
        K::CaretToken => 8,
        K::AmpersandToken => 9,
        K::EqualsEqualsToken
        | K::ExclamationEqualsToken
        | K::EqualsEqualsEqualsToken
        | K::ExclamationEqualsEqualsToken => 10,
        K::LessThanToken
        | K::GreaterThanToken
        | K::LessThanEqualsToken
        | K::GreaterThanEqualsToken
        | K::InstanceOfKeyword
        | K::InKeyword
        | K::AsKeyword
        | K::SatisfiesKeyword => 11,
        K::LessThanLessThanToken
        | K::GreaterThanGreaterThanToken
        | K::GreaterThanGreaterThanGreaterThanToken => 12,
        K::PlusToken | K::MinusToken => 13,
        K::AsteriskToken | K::SlashToken | K::PercentToken => 14,
        K::AsteriskAsteriskToken => 15,
        _ => 0,
    }
}

impl ParserState {
    // =========================================================================
    // Expression entry points
    // =========================================================================

    /// Comma expression.
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut expr = self.parse_assignment_expression();
        while self.is_token(SyntaxKind::CommaToken) {
            self.next_token();
            let right = self.parse_assignment_expression();
            expr = self.make_binary(pos, expr, SyntaxKind::CommaToken, right);
        }
        expr
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier();
        }
        let expr = self.parse_assignment_expression_worker();
        self.exit_recursion();
        expr
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::YieldKeyword) && self.in_context(CONTEXT_FLAG_GENERATOR) {
            return self.parse_yield_expression();
        }
        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }

        let pos = self.token_pos();
        let expr = self.parse_binary_expression_or_higher(0);
        if self.token().is_assignment_operator() {
            let operator = self.token();
            self.next_token();
            let right = self.parse_assignment_expression();
            return self.make_binary(pos, expr, operator, right);
        }
        self.parse_conditional_expression_rest(pos, expr)
    }

    fn parse_conditional_expression_rest(&mut self, pos: u32, condition: NodeIndex) -> NodeIndex {
        if !self.parse_optional(SyntaxKind::QuestionToken) {
            return condition;
        }
        let when_true = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_assignment_expression()
        });
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression();
        self.arena.add_node(
            SyntaxKind::ConditionalExpression,
            pos,
            self.prev_token_end,
            NodeData::Conditional(ConditionalExprData {
                condition,
                when_true,
                when_false,
            }),
        )
    }

    fn parse_yield_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut asterisk_token = false;
        let mut expression = NodeIndex::NONE;
        if !self.has_preceding_line_break() {
            asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
            if asterisk_token || self.is_start_of_expression() {
                expression = self.parse_assignment_expression();
            }
        }
        self.arena.add_node(
            SyntaxKind::YieldExpression,
            pos,
            self.prev_token_end,
            NodeData::UnaryExprEx(UnaryExprDataEx {
                expression,
                asterisk_token,
            }),
        )
    }

    fn is_start_of_expression(&self) -> bool {
        use SyntaxKind as K;
        match self.token() {
            K::CloseParenToken
            | K::CloseBracketToken
            | K::CloseBraceToken
            | K::SemicolonToken
            | K::CommaToken
            | K::ColonToken
            | K::EqualsGreaterThanToken
            | K::EndOfFileToken => false,
            kind if kind.is_assignment_operator() => false,
            K::PlusToken
            | K::MinusToken
            | K::TildeToken
            | K::ExclamationToken
            | K::PlusPlusToken
            | K::MinusMinusToken
            | K::LessThanToken
            | K::SlashToken
            | K::SlashEqualsToken
            | K::OpenParenToken
            | K::OpenBracketToken
            | K::OpenBraceToken
            | K::NumericLiteral
            | K::BigIntLiteral
            | K::StringLiteral
            | K::NoSubstitutionTemplateLiteral
            | K::TemplateHead
            | K::AtToken
            | K::DotDotDotToken
            | K::PrivateIdentifier => true,
            kind => kind.is_identifier_or_keyword() && binary_operator_precedence(kind) == 0,
        }
    }

    fn make_binary(&mut self, pos: u32, left: NodeIndex, operator_token: SyntaxKind, right: NodeIndex) -> NodeIndex {
        self.arena.add_node(
            SyntaxKind::BinaryExpression,
            pos,
            self.prev_token_end,
            NodeData::BinaryExpr(BinaryExprData {
                left,
                operator_token,
                right,
            }),
        )
    }

    // =========================================================================
    // Binary operators
    // =========================================================================

    fn parse_binary_expression_or_higher(&mut self, precedence: u8) -> NodeIndex {
        let pos = self.token_pos();
        let left = self.parse_unary_expression_or_higher();
        self.parse_binary_expression_rest(pos, precedence, left)
    }

    /// Target of a type assertion: a type, or the `const` keyword of a const
    /// assertion.
    fn parse_asserted_type(&mut self) -> NodeIndex {
        if !self.is_token(SyntaxKind::ConstKeyword) {
            return self.parse_type();
        }
        let (start, end) = (self.token_pos(), self.token_end());
        self.next_token();
        self.arena.add_token(SyntaxKind::ConstKeyword, start, end)
    }

    fn parse_binary_expression_rest(&mut self, pos: u32, precedence: u8, mut left: NodeIndex) -> NodeIndex {
        loop {
            self.rescan_greater_token();
            let operator = self.token();
            let new_precedence = binary_operator_precedence(operator);
            if new_precedence == 0 {
                break;
            }
            // `**` is right-associative.
            let consume = if operator == SyntaxKind::AsteriskAsteriskToken {
                new_precedence >= precedence
            } else {
                new_precedence > precedence
            };
            if !consume {
                break;
            }
            if operator == SyntaxKind::InKeyword && self.in_context(CONTEXT_FLAG_DISALLOW_IN) {
                break;
            }
            if matches!(operator, SyntaxKind::AsKeyword | SyntaxKind::SatisfiesKeyword) {
                if self.has_preceding_line_break() {
                    break;
                }
                self.next_token();
                let type_node = if operator == SyntaxKind::AsKeyword {
                    self.parse_asserted_type()
                } else {
                    self.parse_type()
                };
                let kind = if operator == SyntaxKind::AsKeyword {
                    SyntaxKind::AsExpression
                } else {
                    SyntaxKind::SatisfiesExpression
                };
                left = self.arena.add_node(
                    kind,
                    pos,
                    self.prev_token_end,
                    NodeData::TypeAssertion(TypeAssertionData {
                        expression: left,
                        type_node,
                    }),
                );
                continue;
            }
            self.next_token();
            let right = self.parse_binary_expression_or_higher(new_precedence);
            left = self.make_binary(pos, left, operator, right);
        }
        left
    }

    // =========================================================================
    // Unary operators
    // =========================================================================

    fn parse_unary_expression_or_higher(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression_or_higher();
                self.arena.add_node(
                    SyntaxKind::PrefixUnaryExpression,
                    pos,
                    self.prev_token_end,
                    NodeData::UnaryExpr(UnaryExprData { operator, operand }),
                )
            }
            SyntaxKind::DeleteKeyword | SyntaxKind::TypeOfKeyword | SyntaxKind::VoidKeyword => {
                let kind = match self.token() {
                    SyntaxKind::DeleteKeyword => SyntaxKind::DeleteExpression,
                    SyntaxKind::TypeOfKeyword => SyntaxKind::TypeOfExpression,
                    _ => SyntaxKind::VoidExpression,
                };
                self.next_token();
                let expression = self.parse_unary_expression_or_higher();
                self.make_wrapper(kind, pos, expression)
            }
            SyntaxKind::AwaitKeyword if self.is_await_expression() => {
                self.next_token();
                let expression = self.parse_unary_expression_or_higher();
                self.make_wrapper(SyntaxKind::AwaitExpression, pos, expression)
            }
            SyntaxKind::LessThanToken => {
                // `<T>expr` type assertion.
                self.next_token();
                let type_node = self.parse_asserted_type();
                self.parse_expected(SyntaxKind::GreaterThanToken);
                let expression = self.parse_unary_expression_or_higher();
                self.arena.add_node(
                    SyntaxKind::TypeAssertionExpression,
                    pos,
                    self.prev_token_end,
                    NodeData::TypeAssertion(TypeAssertionData {
                        expression,
                        type_node,
                    }),
                )
            }
            _ => self.parse_update_expression(),
        }
    }

    fn is_await_expression(&mut self) -> bool {
        if self.in_context(CONTEXT_FLAG_ASYNC) {
            return true;
        }
        if self.in_context(CONTEXT_FLAG_FUNCTION_BODY) {
            return false;
        }
        // Top-level await: `await` followed by an operand on the same line.
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break()
                && (p.is_identifier()
                    || matches!(
                        p.token(),
                        SyntaxKind::OpenParenToken
                            | SyntaxKind::OpenBracketToken
                            | SyntaxKind::NumericLiteral
                            | SyntaxKind::StringLiteral
                            | SyntaxKind::ThisKeyword
                            | SyntaxKind::NewKeyword
                            | SyntaxKind::FunctionKeyword
                            | SyntaxKind::NoSubstitutionTemplateLiteral
                            | SyntaxKind::TemplateHead
                    ))
        })
    }

    fn make_wrapper(&mut self, kind: SyntaxKind, pos: u32, expression: NodeIndex) -> NodeIndex {
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::UnaryExprEx(UnaryExprDataEx {
                expression,
                asterisk_token: false,
            }),
        )
    }

    fn parse_update_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_left_hand_side_expression();
        if matches!(self.token(), SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken)
            && !self.has_preceding_line_break()
        {
            let operator = self.token();
            self.next_token();
            return self.arena.add_node(
                SyntaxKind::PostfixUnaryExpression,
                pos,
                self.prev_token_end,
                NodeData::UnaryExpr(UnaryExprData {
                    operator,
                    operand: expression,
                }),
            );
        }
        expression
    }

    // =========================================================================
    // Left-hand-side expressions
    // =========================================================================

    pub(crate) fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = match self.token() {
            SyntaxKind::ImportKeyword
                if self.next_token_is(|p| {
                    matches!(p.token(), SyntaxKind::OpenParenToken | SyntaxKind::DotToken)
                }) =>
            {
                self.parse_import_call_or_meta()
            }
            SyntaxKind::SuperKeyword => {
                let end = self.token_end();
                self.next_token();
                self.arena.add_token(SyntaxKind::SuperKeyword, pos, end)
            }
            _ => self.parse_member_expression_or_higher(),
        };
        self.parse_call_expression_rest(pos, expression, true)
    }

    /// Member expression without call suffixes, as in `extends Base.Mixin<T>`.
    pub(crate) fn parse_left_hand_side_expression_without_call(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_primary_expression();
        self.parse_call_expression_rest(pos, expression, false)
    }

    fn parse_import_call_or_meta(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        self.next_token();
        if self.parse_optional(SyntaxKind::DotToken) {
            let name = self.parse_identifier_name();
            return self.arena.add_node(
                SyntaxKind::MetaProperty,
                pos,
                self.prev_token_end,
                NodeData::MetaProperty(MetaPropertyData {
                    keyword_token: SyntaxKind::ImportKeyword,
                    name,
                }),
            );
        }
        self.arena.add_token(SyntaxKind::ImportKeyword, pos, end)
    }

    fn parse_member_expression_or_higher(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::NewKeyword) {
            return self.parse_new_expression();
        }
        self.parse_primary_expression()
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        if self.parse_optional(SyntaxKind::DotToken) {
            let name = self.parse_identifier_name();
            return self.arena.add_node(
                SyntaxKind::MetaProperty,
                pos,
                self.prev_token_end,
                NodeData::MetaProperty(MetaPropertyData {
                    keyword_token: SyntaxKind::NewKeyword,
                    name,
                }),
            );
        }
        let callee_pos = self.token_pos();
        let callee = self.parse_member_expression_or_higher();
        let expression = self.parse_call_expression_rest(callee_pos, callee, false);
        let type_arguments = if self.is_token(SyntaxKind::LessThanToken) {
            self.try_parse(|p| {
                let args = p.parse_type_arguments_if_present();
                p.is_token(SyntaxKind::OpenParenToken).then_some(args)
            })
            .flatten()
        } else {
            None
        };
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            Some(self.parse_arguments())
        } else {
            None
        };
        self.arena.add_node(
            SyntaxKind::NewExpression,
            pos,
            self.prev_token_end,
            NodeData::Call(CallExprData {
                expression,
                type_arguments,
                arguments,
            }),
        )
    }

    /// Property/element access, non-null assertions, tagged templates and
    /// (when `allow_calls`) call suffixes, including optional chains.
    fn parse_call_expression_rest(&mut self, pos: u32, mut expression: NodeIndex, allow_calls: bool) -> NodeIndex {
        loop {
            let question_dot_token =
                allow_calls && self.parse_optional(SyntaxKind::QuestionDotToken);
            let chain_flags = if question_dot_token {
                NodeFlags::OPTIONAL_CHAIN
            } else {
                NodeFlags::empty()
            };

            if self.parse_optional(SyntaxKind::DotToken)
                || (question_dot_token
                    && (self.token().is_identifier_or_keyword()
                        || self.is_token(SyntaxKind::PrivateIdentifier)))
            {
                let name = self.parse_identifier_name();
                expression = self.make_access(
                    SyntaxKind::PropertyAccessExpression,
                    pos,
                    expression,
                    name,
                    question_dot_token,
                );
                self.arena.set_flags(expression, chain_flags);
                continue;
            }

            if self.is_token(SyntaxKind::ExclamationToken) && !self.has_preceding_line_break() {
                self.next_token();
                expression = self.make_wrapper(SyntaxKind::NonNullExpression, pos, expression);
                continue;
            }

            if self.is_token(SyntaxKind::OpenBracketToken) {
                self.next_token();
                let argument =
                    self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
                self.parse_expected(SyntaxKind::CloseBracketToken);
                expression = self.make_access(
                    SyntaxKind::ElementAccessExpression,
                    pos,
                    expression,
                    argument,
                    question_dot_token,
                );
                self.arena.set_flags(expression, chain_flags);
                continue;
            }

            if !question_dot_token
                && matches!(
                    self.token(),
                    SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead
                )
            {
                let template = self.parse_template_literal();
                expression = self.arena.add_node(
                    SyntaxKind::TaggedTemplateExpression,
                    pos,
                    self.prev_token_end,
                    NodeData::TaggedTemplate(TaggedTemplateData {
                        tag: expression,
                        type_arguments: None,
                        template,
                    }),
                );
                continue;
            }

            if allow_calls {
                let type_arguments = if self.is_token(SyntaxKind::LessThanToken) {
                    self.try_parse(|p| {
                        let args = p.parse_type_arguments_if_present();
                        p.is_token(SyntaxKind::OpenParenToken).then_some(args)
                    })
                    .flatten()
                } else {
                    None
                };
                if self.is_token(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    expression = self.arena.add_node(
                        SyntaxKind::CallExpression,
                        pos,
                        self.prev_token_end,
                        NodeData::Call(CallExprData {
                            expression,
                            type_arguments,
                            arguments: Some(arguments),
                        }),
                    );
                    self.arena.set_flags(expression, chain_flags);
                    continue;
                }
            }

            if question_dot_token {
                self.error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            }
            break;
        }
        expression
    }

    fn make_access(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        expression: NodeIndex,
        name_or_argument: NodeIndex,
        question_dot_token: bool,
    ) -> NodeIndex {
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Access(AccessExprData {
                expression,
                name_or_argument,
                question_dot_token,
            }),
        )
    }

    /// `( args )`; the list's `pos` is right after `(`.
    pub(crate) fn parse_arguments(&mut self) -> NodeList {
        let after_open = self.token_end();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut list = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_delimited_list(SyntaxKind::CloseParenToken, Self::parse_argument)
        });
        list.pos = after_open;
        list.end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseParenToken);
        list
    }

    fn parse_argument(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::DotDotDotToken) {
            let pos = self.token_pos();
            self.next_token();
            let expression = self.parse_assignment_expression();
            return self.make_wrapper(SyntaxKind::SpreadElement, pos, expression);
        }
        self.parse_assignment_expression()
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let kind = self.token();
                let end = self.token_end();
                let text = self.token_value();
                self.next_token();
                self.arena.add_literal(kind, pos, end, text)
            }
            SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => {
                let kind = self.token();
                let end = self.token_end();
                self.next_token();
                self.arena.add_token(kind, pos, end)
            }
            SyntaxKind::TemplateHead => self.parse_template_literal(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression =
                    self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.make_wrapper(SyntaxKind::ParenthesizedExpression, pos, expression)
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::AsyncKeyword
                if self.next_token_is_on_same_line(|p| p.is_token(SyntaxKind::FunctionKeyword)) =>
            {
                let modifiers = self.parse_modifiers(false);
                self.parse_function_expression(pos, modifiers, true)
            }
            SyntaxKind::FunctionKeyword => self.parse_function_expression(pos, None, false),
            SyntaxKind::ClassKeyword => self.parse_class_expression(),
            SyntaxKind::AtToken => {
                // Decorators on a class expression are not kept.
                self.parse_modifiers(false);
                self.parse_class_expression()
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.rescan_slash_token();
                let end = self.token_end();
                let text = self.scanner.get_token_text().to_string();
                self.next_token();
                self.arena
                    .add_literal(SyntaxKind::RegularExpressionLiteral, pos, end, text)
            }
            SyntaxKind::PrivateIdentifier => self.create_identifier(),
            _ if self.is_identifier() => self.create_identifier(),
            _ => {
                self.error_at_current_token(diagnostic_codes::EXPRESSION_EXPECTED, &[]);
                self.create_missing_identifier()
            }
        }
    }

    fn parse_function_expression(&mut self, pos: u32, modifiers: Option<NodeList>, is_async: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let (set, clear) = Self::function_context(is_async, asterisk_token);
        let name = if self.with_context(set, clear, |p| p.is_identifier()) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let function = self.parse_function_rest(modifiers, is_async, asterisk_token, name, false);
        self.finish_function(SyntaxKind::FunctionExpression, pos, function)
    }

    /// No-substitution template or `head ${expr} middle ${expr} tail`.
    fn parse_template_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        let text = self.token_value();
        let kind = self.token();
        self.next_token();
        let head = self.arena.add_literal(kind, pos, end, text);
        if kind == SyntaxKind::NoSubstitutionTemplateLiteral {
            return head;
        }

        let spans_pos = self.token_pos();
        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let expression = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
            let literal_kind = if self.is_token(SyntaxKind::CloseBraceToken) {
                self.rescan_template_token()
            } else {
                self.error_at_current_token(diagnostic_codes::EXPECTED, &["}"]);
                SyntaxKind::TemplateTail
            };
            let literal_pos = self.token_pos();
            let literal_end = self.token_end();
            let literal_text = self.token_value();
            if self.is_token(literal_kind)
                && matches!(literal_kind, SyntaxKind::TemplateMiddle | SyntaxKind::TemplateTail)
            {
                self.next_token();
            }
            let literal = self
                .arena
                .add_literal(literal_kind, literal_pos, literal_end, literal_text);
            spans.push(self.arena.add_node(
                SyntaxKind::TemplateSpan,
                span_pos,
                self.prev_token_end,
                NodeData::TemplateSpan(TemplateSpanData {
                    expression,
                    literal,
                }),
            ));
            if literal_kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        let template_spans = NodeList::new(spans, spans_pos, self.prev_token_end);
        self.arena.add_node(
            SyntaxKind::TemplateExpression,
            pos,
            self.prev_token_end,
            NodeData::TemplateExpr(TemplateExprData {
                head,
                template_spans,
            }),
        )
    }

    fn parse_array_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let multi_line = self.has_preceding_line_break();
        let elements = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_delimited_list(SyntaxKind::CloseBracketToken, Self::parse_array_element)
        });
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add_node(
            SyntaxKind::ArrayLiteralExpression,
            pos,
            self.prev_token_end,
            NodeData::LiteralExpr(LiteralExprData {
                elements,
                multi_line,
            }),
        )
    }

    fn parse_array_element(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::CommaToken) {
            let pos = self.token_pos();
            return self
                .arena
                .add_token(SyntaxKind::OmittedExpression, pos, pos);
        }
        self.parse_argument()
    }

    fn parse_object_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let multi_line = self.has_preceding_line_break();
        let elements = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_delimited_list(SyntaxKind::CloseBraceToken, Self::parse_object_literal_element)
        });
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            SyntaxKind::ObjectLiteralExpression,
            pos,
            self.prev_token_end,
            NodeData::LiteralExpr(LiteralExprData {
                elements,
                multi_line,
            }),
        )
    }

    fn parse_object_literal_element(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if self.is_token(SyntaxKind::DotDotDotToken) {
            self.next_token();
            let expression = self.parse_assignment_expression();
            return self.make_wrapper(SyntaxKind::SpreadAssignment, pos, expression);
        }

        if matches!(self.token(), SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && self.next_token_is(|p| p.is_property_name_start())
        {
            let kind = if self.is_token(SyntaxKind::GetKeyword) {
                SyntaxKind::GetAccessor
            } else {
                SyntaxKind::SetAccessor
            };
            self.next_token();
            let name = self.parse_property_name();
            let function = self.parse_function_rest(None, false, false, name, false);
            return self.finish_function(kind, pos, function);
        }

        let is_async = self.is_token(SyntaxKind::AsyncKeyword)
            && self.next_token_is_on_same_line(|p| {
                p.is_property_name_start() || p.is_token(SyntaxKind::AsteriskToken)
            });
        let modifiers = if is_async { self.parse_modifiers(false) } else { None };

        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let is_identifier_name = self.is_identifier();
        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);

        if asterisk_token
            || is_async
            || self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            let function =
                self.parse_function_rest(modifiers, is_async, asterisk_token, name, question_token);
            return self.finish_function(SyntaxKind::MethodDeclaration, pos, function);
        }

        if is_identifier_name
            && matches!(
                self.token(),
                SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken | SyntaxKind::EqualsToken
            )
        {
            let object_assignment_initializer = self.parse_initializer();
            return self.arena.add_node(
                SyntaxKind::ShorthandPropertyAssignment,
                pos,
                self.prev_token_end,
                NodeData::ShorthandProperty(ShorthandPropertyData {
                    name,
                    object_assignment_initializer,
                }),
            );
        }

        if !self.is_token(SyntaxKind::ColonToken) {
            self.error_at_current_token(diagnostic_codes::PROPERTY_ASSIGNMENT_EXPECTED, &[]);
        }
        self.parse_optional(SyntaxKind::ColonToken);
        let initializer = self.parse_assignment_expression();
        self.arena.add_node(
            SyntaxKind::PropertyAssignment,
            pos,
            self.prev_token_end,
            NodeData::PropertyAssignment(PropertyAssignmentData { name, initializer }),
        )
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow_function(&mut self) -> Option<NodeIndex> {
        match self.token() {
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                if !self.is_arrow_head_candidate() {
                    return None;
                }
                self.try_parse(|p| p.parse_parenthesized_arrow_function(None))
            }
            SyntaxKind::AsyncKeyword => {
                let next_is_head = self.next_token_is_on_same_line(|p| {
                    p.is_token(SyntaxKind::OpenParenToken)
                        || p.is_token(SyntaxKind::LessThanToken)
                        || p.is_identifier()
                });
                if !next_is_head {
                    return self.try_parse_simple_arrow_function(None);
                }
                self.try_parse(|p| {
                    let modifiers = Some(p.parse_async_modifier());
                    if p.is_identifier() {
                        p.parse_simple_arrow_function(modifiers)
                    } else {
                        p.parse_parenthesized_arrow_function(modifiers)
                    }
                })
            }
            _ => self.try_parse_simple_arrow_function(None),
        }
    }

    /// Cheap filter before speculatively parsing `(`/`<` as an arrow head.
    fn is_arrow_head_candidate(&mut self) -> bool {
        if self.is_token(SyntaxKind::LessThanToken) {
            return true;
        }
        self.look_ahead(|p| {
            p.next_token();
            match p.token() {
                SyntaxKind::CloseParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::DotDotDotToken
                | SyntaxKind::ThisKeyword
                | SyntaxKind::AtToken => true,
                kind if kind.is_modifier_kind() && p.next_token_is(|q| q.is_identifier()) => true,
                _ if p.is_identifier() => {
                    p.next_token();
                    matches!(
                        p.token(),
                        SyntaxKind::ColonToken
                            | SyntaxKind::CommaToken
                            | SyntaxKind::QuestionToken
                            | SyntaxKind::EqualsToken
                            | SyntaxKind::CloseParenToken
                    )
                }
                _ => false,
            }
        })
    }

    /// Consume `async` as the sole modifier of an arrow function.
    fn parse_async_modifier(&mut self) -> NodeList {
        let pos = self.token_pos();
        let end = self.token_end();
        self.next_token();
        let token = self.arena.add_token(SyntaxKind::AsyncKeyword, pos, end);
        NodeList::new(vec![token], pos, end)
    }

    fn try_parse_simple_arrow_function(&mut self, modifiers: Option<NodeList>) -> Option<NodeIndex> {
        let is_simple = self.is_identifier()
            && self.next_token_is_on_same_line(|p| p.is_token(SyntaxKind::EqualsGreaterThanToken));
        if !is_simple {
            return None;
        }
        self.parse_simple_arrow_function(modifiers)
    }

    /// `x => body`, optionally after `async`.
    fn parse_simple_arrow_function(&mut self, modifiers: Option<NodeList>) -> Option<NodeIndex> {
        let pos = modifiers
            .as_ref()
            .map_or_else(|| self.token_pos(), |list| list.pos);
        let is_async = modifiers.is_some();
        let parameter_pos = self.token_pos();
        let name = self.parse_identifier();
        let parameter = self.arena.add_node(
            SyntaxKind::Parameter,
            parameter_pos,
            self.prev_token_end,
            NodeData::Parameter(ParameterData {
                modifiers: None,
                dot_dot_dot_token: false,
                name,
                question_token: false,
                type_annotation: NodeIndex::NONE,
                initializer: NodeIndex::NONE,
            }),
        );
        let parameters = NodeList::new(vec![parameter], parameter_pos, self.prev_token_end);
        if !self.parse_expected(SyntaxKind::EqualsGreaterThanToken) {
            return None;
        }
        let body = self.parse_arrow_function_body(is_async);
        let function = FunctionData {
            modifiers,
            is_async,
            asterisk_token: false,
            name: NodeIndex::NONE,
            question_token: false,
            type_parameters: None,
            parameters,
            type_annotation: NodeIndex::NONE,
            body,
            parenthesized_parameters: false,
        };
        Some(self.finish_function(SyntaxKind::ArrowFunction, pos, function))
    }

    /// `<T>(params): R => body`, optionally after `async`. Returns `None` when
    /// the tokens do not form an arrow head.
    fn parse_parenthesized_arrow_function(&mut self, modifiers: Option<NodeList>) -> Option<NodeIndex> {
        let pos = modifiers
            .as_ref()
            .map_or_else(|| self.token_pos(), |list| list.pos);
        let is_async = modifiers.is_some();
        let (set, clear) = Self::function_context(is_async, false);
        let head = self.with_context(set, clear, |p| {
            let type_parameters = p.parse_type_parameters();
            if !p.is_token(SyntaxKind::OpenParenToken) {
                return None;
            }
            let parameters = p.parse_parameters();
            let type_annotation = if p.is_token(SyntaxKind::ColonToken) {
                p.parse_return_type(SyntaxKind::ColonToken)
            } else {
                NodeIndex::NONE
            };
            if !p.is_token(SyntaxKind::EqualsGreaterThanToken) {
                return None;
            }
            Some((type_parameters, parameters, type_annotation))
        });
        let (type_parameters, parameters, type_annotation) = head?;
        self.next_token();
        let body = self.parse_arrow_function_body(is_async);
        let function = FunctionData {
            modifiers,
            is_async,
            asterisk_token: false,
            name: NodeIndex::NONE,
            question_token: false,
            type_parameters,
            parameters,
            type_annotation,
            body,
            parenthesized_parameters: true,
        };
        Some(self.finish_function(SyntaxKind::ArrowFunction, pos, function))
    }

    fn parse_arrow_function_body(&mut self, is_async: bool) -> NodeIndex {
        let (set, clear) = Self::function_context(is_async, false);
        // Arrows keep the surrounding `in` restriction for expression bodies.
        let clear = clear & !CONTEXT_FLAG_DISALLOW_IN;
        self.with_context(set, clear, |p| {
            if p.is_token(SyntaxKind::OpenBraceToken) {
                p.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |q| q.parse_block())
            } else {
                p.parse_assignment_expression()
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/state_expressions_tests.rs"]
mod tests;
