//! Parser state - declarations: modifiers, classes, interfaces, type aliases,
//! enums, namespaces, imports and exports.

use super::state::{CONTEXT_FLAG_AMBIENT, ParserState};
use crate::parser::{
    NodeIndex, NodeList,
    node::{
        BindingElementData, BindingPatternData, BlockData, ClassData, EnumData, EnumMemberData,
        ExportAssignmentData, ExportDeclData, ExprWithTypeArgsData, HeritageData, ImportClauseData,
        ImportDeclData, ImportEqualsData, IndexSignatureData, InterfaceData, ModifierFlags,
        ModuleData, NamedImportsData, NodeData, PropertyDeclData, SpecifierData,
        TypeAliasData, TypeParameterData, UnaryExprDataEx,
    },
};
use crate::scanner::SyntaxKind;
use typewiz_common::diagnostics::diagnostic_codes;

impl ParserState {
    // =========================================================================
    // Declaration detection
    // =========================================================================

    /// Whether the current token begins a declaration (possibly after modifiers).
    pub(crate) fn is_start_of_declaration(&mut self) -> bool {
        self.look_ahead(|p| loop {
            match p.token() {
                SyntaxKind::LetKeyword => {
                    p.next_token();
                    return p.is_identifier()
                        || matches!(
                            p.token(),
                            SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
                        );
                }
                SyntaxKind::VarKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::AtToken => return true,
                SyntaxKind::InterfaceKeyword | SyntaxKind::TypeKeyword => {
                    p.next_token();
                    return p.is_identifier() && !p.has_preceding_line_break();
                }
                SyntaxKind::ModuleKeyword | SyntaxKind::NamespaceKeyword => {
                    p.next_token();
                    return !p.has_preceding_line_break()
                        && (p.is_identifier() || p.is_token(SyntaxKind::StringLiteral));
                }
                SyntaxKind::GlobalKeyword => {
                    p.next_token();
                    return matches!(
                        p.token(),
                        SyntaxKind::OpenBraceToken | SyntaxKind::Identifier | SyntaxKind::ExportKeyword
                    );
                }
                SyntaxKind::ImportKeyword => {
                    p.next_token();
                    return matches!(
                        p.token(),
                        SyntaxKind::StringLiteral
                            | SyntaxKind::AsteriskToken
                            | SyntaxKind::OpenBraceToken
                    ) || p.token().is_identifier_or_keyword();
                }
                SyntaxKind::ExportKeyword => {
                    p.next_token();
                    if matches!(
                        p.token(),
                        SyntaxKind::EqualsToken
                            | SyntaxKind::AsteriskToken
                            | SyntaxKind::OpenBraceToken
                            | SyntaxKind::DefaultKeyword
                            | SyntaxKind::AsKeyword
                            | SyntaxKind::TypeKeyword
                            | SyntaxKind::ImportKeyword
                    ) {
                        return true;
                    }
                }
                SyntaxKind::AbstractKeyword
                | SyntaxKind::AccessorKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::OverrideKeyword => {
                    p.next_token();
                    if p.has_preceding_line_break() {
                        return false;
                    }
                }
                _ => return false,
            }
        })
    }

    /// Declaration statement, including its modifiers and decorators.
    pub(crate) fn parse_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let modifiers = self.parse_modifiers(false);
        let is_ambient = self
            .arena
            .modifier_flags(modifiers.as_ref())
            .contains(ModifierFlags::AMBIENT);
        let set = if is_ambient { CONTEXT_FLAG_AMBIENT } else { 0 };
        self.with_context(set, 0, |p| p.parse_declaration_worker(pos, modifiers))
    }

    fn parse_declaration_worker(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        match self.token() {
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(pos, modifiers)
            }
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, modifiers),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, modifiers),
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(pos, modifiers),
            SyntaxKind::TypeKeyword => self.parse_type_alias_declaration(pos, modifiers),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(pos, modifiers),
            SyntaxKind::ModuleKeyword | SyntaxKind::NamespaceKeyword | SyntaxKind::GlobalKeyword => {
                self.parse_module_declaration(pos, modifiers)
            }
            SyntaxKind::ImportKeyword => self.parse_import_declaration(pos, modifiers),
            SyntaxKind::ExportKeyword => self.parse_export_declaration(pos, modifiers),
            SyntaxKind::DefaultKeyword => {
                // `export default <expression>` (the `export` is in `modifiers`).
                self.next_token();
                let expression = self.parse_assignment_expression();
                self.parse_semicolon();
                self.arena.add_node(
                    SyntaxKind::ExportAssignment,
                    pos,
                    self.prev_token_end,
                    NodeData::ExportAssignment(ExportAssignmentData {
                        modifiers,
                        is_export_equals: false,
                        expression,
                    }),
                )
            }
            _ => {
                self.error_at_current_token(diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                NodeIndex::NONE
            }
        }
    }

    // =========================================================================
    // Modifiers and decorators
    // =========================================================================

    /// Parse decorators and modifier keywords. Returns `None` when there are none.
    pub(crate) fn parse_modifiers(&mut self, in_parameter: bool) -> Option<NodeList> {
        let list_pos = self.token_pos();
        let mut modifiers = Vec::new();
        loop {
            if self.is_token(SyntaxKind::AtToken) {
                modifiers.push(self.parse_decorator());
                continue;
            }
            let kind = self.token();
            if !kind.is_modifier_kind() || !self.next_token_can_follow_modifier(kind, in_parameter) {
                break;
            }
            let pos = self.token_pos();
            let end = self.token_end();
            self.next_token();
            modifiers.push(self.arena.add_token(kind, pos, end));
        }
        if modifiers.is_empty() {
            None
        } else {
            Some(NodeList::new(modifiers, list_pos, self.prev_token_end))
        }
    }

    fn next_token_can_follow_modifier(&mut self, modifier: SyntaxKind, in_parameter: bool) -> bool {
        if in_parameter
            && !matches!(
                modifier,
                SyntaxKind::PublicKeyword
                    | SyntaxKind::PrivateKeyword
                    | SyntaxKind::ProtectedKeyword
                    | SyntaxKind::ReadonlyKeyword
                    | SyntaxKind::OverrideKeyword
            )
        {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            match modifier {
                SyntaxKind::ConstKeyword => p.is_token(SyntaxKind::EnumKeyword),
                SyntaxKind::InKeyword | SyntaxKind::OutKeyword => false,
                SyntaxKind::ExportKeyword => !matches!(
                    p.token(),
                    SyntaxKind::EqualsToken
                        | SyntaxKind::AsteriskToken
                        | SyntaxKind::OpenBraceToken
                        | SyntaxKind::AsKeyword
                        | SyntaxKind::TypeKeyword
                        | SyntaxKind::ImportKeyword
                ) || (p.is_token(SyntaxKind::TypeKeyword)
                    && p.next_token_is(|q| q.is_identifier() && !q.is_token(SyntaxKind::FromKeyword))),
                SyntaxKind::DefaultKeyword => matches!(
                    p.token(),
                    SyntaxKind::ClassKeyword
                        | SyntaxKind::FunctionKeyword
                        | SyntaxKind::InterfaceKeyword
                        | SyntaxKind::AtToken
                ) || (p.is_token(SyntaxKind::AbstractKeyword)
                    && p.next_token_is(|q| q.is_token(SyntaxKind::ClassKeyword)))
                    || (p.is_token(SyntaxKind::AsyncKeyword)
                        && p.next_token_is_on_same_line(|q| q.is_token(SyntaxKind::FunctionKeyword))),
                _ => {
                    !p.has_preceding_line_break()
                        && (matches!(
                            p.token(),
                            SyntaxKind::OpenBracketToken
                                | SyntaxKind::OpenBraceToken
                                | SyntaxKind::AsteriskToken
                                | SyntaxKind::DotDotDotToken
                                | SyntaxKind::PrivateIdentifier
                                | SyntaxKind::StringLiteral
                                | SyntaxKind::NumericLiteral
                                | SyntaxKind::AtToken
                        ) || p.token().is_identifier_or_keyword())
                }
            }
        })
    }

    fn parse_decorator(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::AtToken);
        let expression = self.parse_left_hand_side_expression();
        self.arena.add_node(
            SyntaxKind::Decorator,
            pos,
            self.prev_token_end,
            NodeData::UnaryExprEx(UnaryExprDataEx {
                expression,
                asterisk_token: false,
            }),
        )
    }

    // =========================================================================
    // Binding names
    // =========================================================================

    /// Identifier, `{...}` or `[...]` binding target.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_binding_pattern(
                SyntaxKind::CloseBraceToken,
                SyntaxKind::ObjectBindingPattern,
            ),
            SyntaxKind::OpenBracketToken => self.parse_binding_pattern(
                SyntaxKind::CloseBracketToken,
                SyntaxKind::ArrayBindingPattern,
            ),
            _ => self.parse_identifier(),
        }
    }

    fn parse_binding_pattern(&mut self, close: SyntaxKind, kind: SyntaxKind) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let elements = if kind == SyntaxKind::ObjectBindingPattern {
            self.parse_delimited_list(close, Self::parse_object_binding_element)
        } else {
            self.parse_delimited_list(close, Self::parse_array_binding_element)
        };
        self.parse_expected(close);
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::BindingPattern(BindingPatternData { elements }),
        )
    }

    fn parse_object_binding_element(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let mut property_name = self.parse_property_name();
        let name = if !dot_dot_dot_token && self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_binding_name()
        } else {
            let name = property_name;
            property_name = NodeIndex::NONE;
            name
        };
        let initializer = self.parse_initializer();
        self.arena.add_node(
            SyntaxKind::BindingElement,
            pos,
            self.prev_token_end,
            NodeData::BindingElement(BindingElementData {
                dot_dot_dot_token,
                property_name,
                name,
                initializer,
            }),
        )
    }

    fn parse_array_binding_element(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if self.is_token(SyntaxKind::CommaToken) {
            return self
                .arena
                .add_token(SyntaxKind::OmittedExpression, pos, pos);
        }
        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = self.parse_binding_name();
        let initializer = self.parse_initializer();
        self.arena.add_node(
            SyntaxKind::BindingElement,
            pos,
            self.prev_token_end,
            NodeData::BindingElement(BindingElementData {
                dot_dot_dot_token,
                property_name: NodeIndex::NONE,
                name,
                initializer,
            }),
        )
    }

    // =========================================================================
    // Property names
    // =========================================================================

    pub(crate) fn is_property_name_start(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::NoSubstitutionTemplateLiteral
                | SyntaxKind::PrivateIdentifier
                | SyntaxKind::OpenBracketToken
        ) || self.token().is_identifier_or_keyword()
    }

    /// Identifier, keyword, string/numeric literal, private name or `[expr]`.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                let kind = self.token();
                let end = self.token_end();
                let text = self.token_value();
                self.next_token();
                self.arena.add_literal(kind, pos, end, text)
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_assignment_expression();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.arena.add_node(
                    SyntaxKind::ComputedPropertyName,
                    pos,
                    self.prev_token_end,
                    NodeData::UnaryExprEx(UnaryExprDataEx {
                        expression,
                        asterisk_token: false,
                    }),
                )
            }
            _ => self.parse_identifier_name(),
        }
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    pub(crate) fn parse_type_parameters(&mut self) -> Option<NodeList> {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return None;
        }
        let after_open = self.token_end();
        self.next_token();
        let mut list = self.parse_delimited_list(SyntaxKind::GreaterThanToken, Self::parse_type_parameter);
        list.pos = after_open;
        list.end = self.token_pos();
        self.parse_expected(SyntaxKind::GreaterThanToken);
        Some(list)
    }

    pub(crate) fn parse_type_parameter(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut modifier_nodes = Vec::new();
        while matches!(
            self.token(),
            SyntaxKind::ConstKeyword | SyntaxKind::InKeyword | SyntaxKind::OutKeyword
        ) && self.next_token_is(|p| p.is_identifier())
        {
            let kind = self.token();
            let (start, end) = (self.token_pos(), self.token_end());
            self.next_token();
            modifier_nodes.push(self.arena.add_token(kind, start, end));
        }
        let modifiers = if modifier_nodes.is_empty() {
            None
        } else {
            Some(self.arena.make_list(modifier_nodes, pos))
        };
        let name = self.parse_identifier();
        let constraint = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let default = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_node(
            SyntaxKind::TypeParameter,
            pos,
            self.prev_token_end,
            NodeData::TypeParameter(TypeParameterData {
                modifiers,
                name,
                constraint,
                default,
            }),
        )
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn parse_class_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_class_like(SyntaxKind::ClassDeclaration, pos, modifiers)
    }

    pub(crate) fn parse_class_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_class_like(SyntaxKind::ClassExpression, pos, None)
    }

    fn parse_class_like(&mut self, kind: SyntaxKind, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = if self.is_identifier() && !self.is_token(SyntaxKind::ImplementsKeyword) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();

        let members_pos = self.token_end();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let member = self.parse_class_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == before {
                self.error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[]);
                self.next_token();
            }
        }
        let members = NodeList::new(members, members_pos, self.token_pos());
        self.parse_expected(SyntaxKind::CloseBraceToken);

        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Class(ClassData {
                modifiers,
                name,
                type_parameters,
                heritage_clauses,
                members,
            }),
        )
    }

    fn parse_heritage_clauses(&mut self) -> Option<NodeList> {
        let list_pos = self.token_pos();
        let mut clauses = Vec::new();
        while matches!(
            self.token(),
            SyntaxKind::ExtendsKeyword | SyntaxKind::ImplementsKeyword
        ) {
            let pos = self.token_pos();
            let token = self.token();
            self.next_token();
            let types_pos = self.token_pos();
            let mut types = Vec::new();
            loop {
                let type_pos = self.token_pos();
                let expression = self.parse_left_hand_side_expression_without_call();
                let type_arguments = self.parse_type_arguments_if_present();
                types.push(self.arena.add_node(
                    SyntaxKind::ExpressionWithTypeArguments,
                    type_pos,
                    self.prev_token_end,
                    NodeData::ExprWithTypeArgs(ExprWithTypeArgsData {
                        expression,
                        type_arguments,
                    }),
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            let types = NodeList::new(types, types_pos, self.prev_token_end);
            clauses.push(self.arena.add_node(
                SyntaxKind::HeritageClause,
                pos,
                self.prev_token_end,
                NodeData::HeritageClause(HeritageData { token, types }),
            ));
        }
        if clauses.is_empty() {
            None
        } else {
            Some(NodeList::new(clauses, list_pos, self.prev_token_end))
        }
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();

        if self.is_token(SyntaxKind::StaticKeyword)
            && self.next_token_is(|p| p.is_token(SyntaxKind::OpenBraceToken))
        {
            self.next_token();
            let body = self.parse_block();
            let statements = self
                .arena
                .get(body)
                .and_then(|node| self.arena.get_block(node))
                .map_or_else(|| NodeList::empty_at(pos), |block| block.statements.clone());
            return self.arena.add_node(
                SyntaxKind::ClassStaticBlockDeclaration,
                pos,
                self.prev_token_end,
                NodeData::Block(BlockData { statements }),
            );
        }

        let modifiers = self.parse_modifiers(false);
        let modifier_flags = self.arena.modifier_flags(modifiers.as_ref());

        // Accessors: `get name()` / `set name(v)`.
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
            let function = self.parse_function_rest(modifiers, false, false, name, false);
            return self.finish_function(kind, pos, function);
        }

        // Constructor.
        if (self.is_token(SyntaxKind::ConstructorKeyword)
            || (self.is_token(SyntaxKind::StringLiteral) && self.token_value() == "constructor"))
            && self.next_token_is(|p| {
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            let name = self.create_identifier();
            let function = self.parse_function_rest(modifiers, false, false, name, false);
            return self.finish_function(SyntaxKind::Constructor, pos, function);
        }

        // Index signature: `[key: string]: T`.
        if self.is_token(SyntaxKind::OpenBracketToken) && self.is_index_signature_start() {
            return self.parse_index_signature(pos, modifiers);
        }

        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);

        if asterisk_token
            || self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            let is_async = modifier_flags.contains(ModifierFlags::ASYNC);
            let function =
                self.parse_function_rest(modifiers, is_async, asterisk_token, name, question_token);
            return self.finish_function(SyntaxKind::MethodDeclaration, pos, function);
        }

        let exclamation_token = !question_token
            && !self.has_preceding_line_break()
            && self.parse_optional(SyntaxKind::ExclamationToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = self.with_context(0, super::state::CONTEXT_FLAG_DISALLOW_IN, |p| {
            p.parse_initializer()
        });
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::PropertyDeclaration,
            pos,
            self.prev_token_end,
            NodeData::PropertyDecl(PropertyDeclData {
                modifiers,
                name,
                question_token,
                exclamation_token,
                type_annotation,
                initializer,
            }),
        )
    }

    pub(crate) fn is_index_signature_start(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::DotDotDotToken) || p.is_token(SyntaxKind::CloseBracketToken) {
                return true;
            }
            if matches!(
                p.token(),
                SyntaxKind::PublicKeyword
                    | SyntaxKind::PrivateKeyword
                    | SyntaxKind::ProtectedKeyword
                    | SyntaxKind::ReadonlyKeyword
            ) && p.next_token_is(|q| q.is_identifier())
            {
                return true;
            }
            if !p.is_identifier() {
                return false;
            }
            p.next_token();
            matches!(
                p.token(),
                SyntaxKind::ColonToken | SyntaxKind::CommaToken
            ) || (p.is_token(SyntaxKind::QuestionToken)
                && p.next_token_is(|q| {
                    matches!(
                        q.token(),
                        SyntaxKind::ColonToken | SyntaxKind::CommaToken | SyntaxKind::CloseBracketToken
                    )
                }))
        })
    }

    pub(crate) fn parse_index_signature(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let after_open = self.token_end();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut parameters =
            self.parse_delimited_list(SyntaxKind::CloseBracketToken, Self::parse_parameter);
        parameters.pos = after_open;
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let type_annotation = self.parse_type_annotation();
        self.parse_type_member_separator();
        self.arena.add_node(
            SyntaxKind::IndexSignature,
            pos,
            self.prev_token_end,
            NodeData::IndexSignature(IndexSignatureData {
                modifiers,
                parameters,
                type_annotation,
            }),
        )
    }

    // =========================================================================
    // Interfaces, type aliases, enums
    // =========================================================================

    fn parse_interface_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::InterfaceKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_object_type_members();
        self.arena.add_node(
            SyntaxKind::InterfaceDeclaration,
            pos,
            self.prev_token_end,
            NodeData::Interface(InterfaceData {
                modifiers,
                name,
                type_parameters,
                heritage_clauses,
                members,
            }),
        )
    }

    fn parse_type_alias_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::TypeKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        self.parse_expected(SyntaxKind::EqualsToken);
        let type_node = self.parse_type();
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::TypeAliasDeclaration,
            pos,
            self.prev_token_end,
            NodeData::TypeAlias(TypeAliasData {
                modifiers,
                name,
                type_parameters,
                type_node,
            }),
        )
    }

    fn parse_enum_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::EnumKeyword);
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let members = self.parse_delimited_list(SyntaxKind::CloseBraceToken, Self::parse_enum_member);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            SyntaxKind::EnumDeclaration,
            pos,
            self.prev_token_end,
            NodeData::Enum(EnumData {
                modifiers,
                name,
                members,
            }),
        )
    }

    fn parse_enum_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let name = self.parse_property_name();
        let initializer = self.parse_initializer();
        self.arena.add_node(
            SyntaxKind::EnumMember,
            pos,
            self.prev_token_end,
            NodeData::EnumMember(EnumMemberData { name, initializer }),
        )
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    fn parse_module_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        if !self.is_token(SyntaxKind::GlobalKeyword) {
            self.next_token();
        }
        let name = if self.is_token(SyntaxKind::StringLiteral) {
            let (start, end, text) = (self.token_pos(), self.token_end(), self.token_value());
            self.next_token();
            self.arena.add_literal(SyntaxKind::StringLiteral, start, end, text)
        } else {
            self.parse_identifier_name()
        };

        let body = if self.parse_optional(SyntaxKind::DotToken) {
            // `namespace A.B {}` nests B inside A.
            let inner_pos = self.token_pos();
            self.parse_module_declaration_rest(inner_pos)
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_module_block()
        } else {
            self.parse_semicolon();
            NodeIndex::NONE
        };

        self.arena.add_node(
            SyntaxKind::ModuleDeclaration,
            pos,
            self.prev_token_end,
            NodeData::Module(ModuleData {
                modifiers,
                name,
                body,
            }),
        )
    }

    fn parse_module_declaration_rest(&mut self, pos: u32) -> NodeIndex {
        let name = self.parse_identifier_name();
        let body = if self.parse_optional(SyntaxKind::DotToken) {
            let inner_pos = self.token_pos();
            self.parse_module_declaration_rest(inner_pos)
        } else {
            self.parse_module_block()
        };
        self.arena.add_node(
            SyntaxKind::ModuleDeclaration,
            pos,
            self.prev_token_end,
            NodeData::Module(ModuleData {
                modifiers: None,
                name,
                body,
            }),
        )
    }

    fn parse_module_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statements(SyntaxKind::CloseBraceToken);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            SyntaxKind::ModuleBlock,
            pos,
            self.prev_token_end,
            NodeData::Block(BlockData { statements }),
        )
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn parse_module_specifier(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            let (pos, end, text) = (self.token_pos(), self.token_end(), self.token_value());
            self.next_token();
            return self.arena.add_literal(SyntaxKind::StringLiteral, pos, end, text);
        }
        self.error_at_current_token(diagnostic_codes::EXPECTED, &["string literal"]);
        NodeIndex::NONE
    }

    /// `with { type: "json" }` / `assert { ... }` import attributes are skipped.
    fn skip_import_attributes(&mut self) {
        let is_attributes = (self.is_token(SyntaxKind::WithKeyword)
            || (self.is_token(SyntaxKind::Identifier) && self.token_value() == "assert"))
            && !self.has_preceding_line_break();
        if is_attributes && self.next_token_is(|p| p.is_token(SyntaxKind::OpenBraceToken)) {
            self.next_token();
            let mut depth = 0u32;
            loop {
                match self.token() {
                    SyntaxKind::OpenBraceToken => depth += 1,
                    SyntaxKind::CloseBraceToken => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            self.next_token();
                            break;
                        }
                    }
                    SyntaxKind::EndOfFileToken => break,
                    _ => {}
                }
                self.next_token();
            }
        }
    }

    fn parse_import_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::ImportKeyword);

        // `import "side-effect";`
        if self.is_token(SyntaxKind::StringLiteral) {
            let module_specifier = self.parse_module_specifier();
            self.skip_import_attributes();
            self.parse_semicolon();
            return self.arena.add_node(
                SyntaxKind::ImportDeclaration,
                pos,
                self.prev_token_end,
                NodeData::ImportDecl(ImportDeclData {
                    modifiers,
                    import_clause: NodeIndex::NONE,
                    module_specifier,
                }),
            );
        }

        let clause_pos = self.token_pos();
        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.next_token_is(|p| {
                p.is_identifier()
                    && !p.is_token(SyntaxKind::FromKeyword)
                    || matches!(p.token(), SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken)
            });
        if is_type_only {
            self.next_token();
        }

        let name = if self.is_identifier() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };

        // `import A = require("x")` / `import A = B.C`
        if name.is_some() && self.is_token(SyntaxKind::EqualsToken) {
            self.next_token();
            let module_reference = if self.is_token(SyntaxKind::RequireKeyword)
                && self.next_token_is(|p| p.is_token(SyntaxKind::OpenParenToken))
            {
                let ref_pos = self.token_pos();
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let expression = self.parse_module_specifier();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_node(
                    SyntaxKind::ExternalModuleReference,
                    ref_pos,
                    self.prev_token_end,
                    NodeData::UnaryExprEx(UnaryExprDataEx {
                        expression,
                        asterisk_token: false,
                    }),
                )
            } else {
                self.parse_entity_name()
            };
            self.parse_semicolon();
            return self.arena.add_node(
                SyntaxKind::ImportEqualsDeclaration,
                pos,
                self.prev_token_end,
                NodeData::ImportEquals(ImportEqualsData {
                    modifiers,
                    is_type_only,
                    name,
                    module_reference,
                }),
            );
        }

        let named_bindings = if name.is_none() || self.parse_optional(SyntaxKind::CommaToken) {
            match self.token() {
                SyntaxKind::AsteriskToken => {
                    let ns_pos = self.token_pos();
                    self.next_token();
                    self.parse_expected(SyntaxKind::AsKeyword);
                    let ns_name = self.parse_identifier();
                    self.arena.add_node(
                        SyntaxKind::NamespaceImport,
                        ns_pos,
                        self.prev_token_end,
                        NodeData::Specifier(SpecifierData {
                            is_type_only: false,
                            property_name: NodeIndex::NONE,
                            name: ns_name,
                        }),
                    )
                }
                SyntaxKind::OpenBraceToken => {
                    self.parse_named_imports_or_exports(SyntaxKind::NamedImports)
                }
                _ => {
                    self.error_at_current_token(diagnostic_codes::EXPECTED, &["{"]);
                    NodeIndex::NONE
                }
            }
        } else {
            NodeIndex::NONE
        };

        let import_clause = self.arena.add_node(
            SyntaxKind::ImportClause,
            clause_pos,
            self.prev_token_end,
            NodeData::ImportClause(ImportClauseData {
                is_type_only,
                name,
                named_bindings,
            }),
        );
        self.parse_expected(SyntaxKind::FromKeyword);
        let module_specifier = self.parse_module_specifier();
        self.skip_import_attributes();
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::ImportDeclaration,
            pos,
            self.prev_token_end,
            NodeData::ImportDecl(ImportDeclData {
                modifiers,
                import_clause,
                module_specifier,
            }),
        )
    }

    fn parse_named_imports_or_exports(&mut self, kind: SyntaxKind) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let elements = if kind == SyntaxKind::NamedImports {
            self.parse_delimited_list(SyntaxKind::CloseBraceToken, Self::parse_import_specifier)
        } else {
            self.parse_delimited_list(SyntaxKind::CloseBraceToken, Self::parse_export_specifier)
        };
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::NamedImports(NamedImportsData { elements }),
        )
    }

    fn parse_import_specifier(&mut self) -> NodeIndex {
        self.parse_specifier(SyntaxKind::ImportSpecifier)
    }

    fn parse_export_specifier(&mut self) -> NodeIndex {
        self.parse_specifier(SyntaxKind::ExportSpecifier)
    }

    fn parse_module_export_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            return self.parse_module_specifier();
        }
        self.parse_identifier_name()
    }

    fn parse_specifier(&mut self, kind: SyntaxKind) -> NodeIndex {
        let pos = self.token_pos();
        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.next_token_is(|p| p.token().is_identifier_or_keyword() || p.is_token(SyntaxKind::StringLiteral))
            && !self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::AsKeyword)
                    && p.next_token_is(|q| {
                        !q.token().is_identifier_or_keyword() && !q.is_token(SyntaxKind::StringLiteral)
                    })
            });
        if is_type_only {
            self.next_token();
        }
        let first = self.parse_module_export_name();
        let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
            (first, self.parse_module_export_name())
        } else {
            (NodeIndex::NONE, first)
        };
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Specifier(SpecifierData {
                is_type_only,
                property_name,
                name,
            }),
        )
    }

    // =========================================================================
    // Exports
    // =========================================================================

    fn parse_export_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let (export_pos, export_end) = (self.token_pos(), self.token_end());
        self.parse_expected(SyntaxKind::ExportKeyword);

        // `export = expr;`
        if self.parse_optional(SyntaxKind::EqualsToken) {
            let expression = self.parse_assignment_expression();
            self.parse_semicolon();
            return self.arena.add_node(
                SyntaxKind::ExportAssignment,
                pos,
                self.prev_token_end,
                NodeData::ExportAssignment(ExportAssignmentData {
                    modifiers,
                    is_export_equals: true,
                    expression,
                }),
            );
        }

        // `export as namespace X;`
        if self.is_token(SyntaxKind::AsKeyword) {
            self.next_token();
            self.parse_expected(SyntaxKind::NamespaceKeyword);
            let name = self.parse_identifier();
            self.parse_semicolon();
            return self.arena.add_node(
                SyntaxKind::NamespaceExport,
                pos,
                self.prev_token_end,
                NodeData::Specifier(SpecifierData {
                    is_type_only: false,
                    property_name: NodeIndex::NONE,
                    name,
                }),
            );
        }

        // `export import A = B;`
        if self.is_token(SyntaxKind::ImportKeyword) {
            let mut with_export = modifiers.unwrap_or_else(|| NodeList::empty_at(export_pos));
            let export_node = self
                .arena
                .add_token(SyntaxKind::ExportKeyword, export_pos, export_end);
            with_export.nodes.push(export_node);
            with_export.end = export_end;
            return self.parse_import_declaration(pos, Some(with_export));
        }

        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.next_token_is(|p| {
                matches!(p.token(), SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken)
            });
        if is_type_only {
            self.next_token();
        }

        let export_clause = if self.is_token(SyntaxKind::AsteriskToken) {
            let star_pos = self.token_pos();
            self.next_token();
            if self.parse_optional(SyntaxKind::AsKeyword) {
                let name = self.parse_module_export_name();
                self.arena.add_node(
                    SyntaxKind::NamespaceExport,
                    star_pos,
                    self.prev_token_end,
                    NodeData::Specifier(SpecifierData {
                        is_type_only: false,
                        property_name: NodeIndex::NONE,
                        name,
                    }),
                )
            } else {
                NodeIndex::NONE
            }
        } else {
            self.parse_named_imports_or_exports(SyntaxKind::NamedExports)
        };

        let module_specifier = if self.parse_optional(SyntaxKind::FromKeyword) {
            let specifier = self.parse_module_specifier();
            self.skip_import_attributes();
            specifier
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::ExportDeclaration,
            pos,
            self.prev_token_end,
            NodeData::ExportDecl(ExportDeclData {
                modifiers,
                is_type_only,
                export_clause,
                module_specifier,
            }),
        )
    }
}

#[cfg(test)]
#[path = "tests/state_declarations_tests.rs"]
mod tests;
