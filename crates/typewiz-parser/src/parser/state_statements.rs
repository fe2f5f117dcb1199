//! Parser state - statement parsing methods

use super::state::{
    CONTEXT_FLAG_ASYNC, CONTEXT_FLAG_DISALLOW_IN, CONTEXT_FLAG_FUNCTION_BODY,
    CONTEXT_FLAG_GENERATOR, ParserState,
};
use crate::parser::{
    NodeIndex, NodeList,
    node::{
        BlockData, CaseClauseData, CatchClauseData, ExprStatementData, ForInOfData, FunctionData,
        IfStatementData, JumpData, LabeledData, LoopData, NodeData, NodeFlags, ParameterData,
        SourceFileData, SwitchData, TryData, VariableData, VariableDeclListData,
        VariableDeclarationData, WithData,
    },
};
use crate::scanner::SyntaxKind;
use typewiz_common::diagnostics::diagnostic_codes;

impl ParserState {
    // =========================================================================
    // Source file
    // =========================================================================

    /// Parse the whole source file and return the `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let statements = self.parse_statements(SyntaxKind::EndOfFileToken);
        self.flush_scanner_diagnostics();

        let text = self.scanner.source_text_arc();
        let end = self.u32_from_usize(text.len());
        self.arena.add_node(
            SyntaxKind::SourceFile,
            0,
            end,
            NodeData::SourceFile(SourceFileData {
                statements,
                file_name: self.file_name.clone(),
                text,
            }),
        )
    }

    /// Parse statements until `close` (not consumed).
    pub(crate) fn parse_statements(&mut self, close: SyntaxKind) -> NodeList {
        let list_pos = self.token_pos();
        let mut statements = Vec::new();
        while !self.is_token(close) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            if self.is_token(SyntaxKind::CloseBraceToken) {
                self.error_at_current_token(diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                self.next_token();
                continue;
            }
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == before && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.next_token();
            }
        }
        NodeList::new(statements, list_pos, self.token_pos())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            self.next_token();
            return NodeIndex::NONE;
        }
        let statement = self.parse_statement_worker();
        self.exit_recursion();
        statement
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                self.arena
                    .add_token(SyntaxKind::EmptyStatement, pos, self.prev_token_end)
            }
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::VarKeyword => self.parse_variable_statement(pos, None),
            SyntaxKind::LetKeyword if self.is_let_declaration() => {
                self.parse_variable_statement(pos, None)
            }
            SyntaxKind::ConstKeyword
                if !self.next_token_is(|p| p.is_token(SyntaxKind::EnumKeyword)) =>
            {
                self.parse_variable_statement(pos, None)
            }
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, None),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, None),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword | SyntaxKind::BreakKeyword => self.parse_jump_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DebuggerKeyword => {
                self.next_token();
                self.parse_semicolon();
                self.arena
                    .add_token(SyntaxKind::DebuggerStatement, pos, self.prev_token_end)
            }
            _ if self.is_start_of_declaration() => self.parse_declaration(),
            _ if self.is_identifier()
                && self.next_token_is(|p| p.is_token(SyntaxKind::ColonToken)) =>
            {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn is_let_declaration(&mut self) -> bool {
        self.next_token_is(|p| {
            p.is_identifier()
                || p.is_token(SyntaxKind::OpenBraceToken)
                || p.is_token(SyntaxKind::OpenBracketToken)
        })
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statements(SyntaxKind::CloseBraceToken);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_node(
            SyntaxKind::Block,
            pos,
            self.prev_token_end,
            NodeData::Block(BlockData { statements }),
        )
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::ExpressionStatement,
            pos,
            self.prev_token_end,
            NodeData::ExprStatement(ExprStatementData { expression }),
        )
    }

    fn parse_labeled_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let label = self.parse_identifier();
        self.parse_expected(SyntaxKind::ColonToken);
        let statement = self.parse_statement();
        self.arena.add_node(
            SyntaxKind::LabeledStatement,
            pos,
            self.prev_token_end,
            NodeData::Labeled(LabeledData { label, statement }),
        )
    }

    fn parse_parenthesized_condition(&mut self) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
        self.parse_expected(SyntaxKind::CloseParenToken);
        expression
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_node(
            SyntaxKind::IfStatement,
            pos,
            self.prev_token_end,
            NodeData::If(IfStatementData {
                expression,
                then_statement,
                else_statement,
            }),
        )
    }

    fn parse_do_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let statement = self.parse_statement();
        self.parse_expected(SyntaxKind::WhileKeyword);
        let condition = self.parse_parenthesized_condition();
        // `do ... while (x)` never needs a semicolon.
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add_node(
            SyntaxKind::DoStatement,
            pos,
            self.prev_token_end,
            NodeData::Loop(LoopData {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            }),
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let condition = self.parse_parenthesized_condition();
        let statement = self.parse_statement();
        self.arena.add_node(
            SyntaxKind::WhileStatement,
            pos,
            self.prev_token_end,
            NodeData::Loop(LoopData {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            }),
        )
    }

    fn parse_for_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let await_modifier = self.parse_optional(SyntaxKind::AwaitKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);

        let initializer = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else if self.is_token(SyntaxKind::VarKeyword)
            || self.is_token(SyntaxKind::ConstKeyword)
            || (self.is_token(SyntaxKind::LetKeyword) && self.is_let_declaration())
        {
            self.with_context(CONTEXT_FLAG_DISALLOW_IN, 0, |p| {
                p.parse_variable_declaration_list()
            })
        } else {
            self.with_context(CONTEXT_FLAG_DISALLOW_IN, 0, |p| p.parse_expression())
        };

        if self.is_token(SyntaxKind::OfKeyword) || self.is_token(SyntaxKind::InKeyword) {
            let kind = if self.is_token(SyntaxKind::OfKeyword) {
                SyntaxKind::ForOfStatement
            } else {
                SyntaxKind::ForInStatement
            };
            self.next_token();
            let expression = if kind == SyntaxKind::ForOfStatement {
                self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_assignment_expression())
            } else {
                self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
            };
            self.parse_expected(SyntaxKind::CloseParenToken);
            let statement = self.parse_statement();
            return self.arena.add_node(
                kind,
                pos,
                self.prev_token_end,
                NodeData::ForInOf(ForInOfData {
                    await_modifier,
                    initializer,
                    expression,
                    statement,
                }),
            );
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add_node(
            SyntaxKind::ForStatement,
            pos,
            self.prev_token_end,
            NodeData::Loop(LoopData {
                initializer,
                condition,
                incrementor,
                statement,
            }),
        )
    }

    fn parse_jump_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let kind = if self.is_token(SyntaxKind::BreakKeyword) {
            SyntaxKind::BreakStatement
        } else {
            SyntaxKind::ContinueStatement
        };
        self.next_token();
        let label = if !self.can_parse_semicolon() && self.is_identifier() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        self.arena.add_node(
            kind,
            pos,
            self.prev_token_end,
            NodeData::Jump(JumpData { label }),
        )
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = if self.can_parse_semicolon() {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::ReturnStatement,
            pos,
            self.prev_token_end,
            NodeData::ExprStatement(ExprStatementData { expression }),
        )
    }

    fn parse_throw_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = if self.has_preceding_line_break() {
            self.error_at_current_token(diagnostic_codes::EXPRESSION_EXPECTED, &[]);
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::ThrowStatement,
            pos,
            self.prev_token_end,
            NodeData::ExprStatement(ExprStatementData { expression }),
        )
    }

    fn parse_with_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        let statement = self.parse_statement();
        self.arena.add_node(
            SyntaxKind::WithStatement,
            pos,
            self.prev_token_end,
            NodeData::With(WithData {
                expression,
                statement,
            }),
        )
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();

        let block_pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let clauses_pos = self.token_pos();
        let mut clauses = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let clause_pos = self.token_pos();
            let (kind, clause_expression) = if self.parse_optional(SyntaxKind::CaseKeyword) {
                (SyntaxKind::CaseClause, self.parse_expression())
            } else if self.parse_optional(SyntaxKind::DefaultKeyword) {
                (SyntaxKind::DefaultClause, NodeIndex::NONE)
            } else {
                self.error_at_current_token(diagnostic_codes::EXPECTED, &["case"]);
                self.next_token();
                continue;
            };
            self.parse_expected(SyntaxKind::ColonToken);
            let statements_pos = self.token_pos();
            let mut statements = Vec::new();
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                let before = self.token_pos();
                let statement = self.parse_statement();
                if statement.is_some() {
                    statements.push(statement);
                }
                if self.token_pos() == before {
                    self.next_token();
                }
            }
            let statements = NodeList::new(statements, statements_pos, self.token_pos());
            clauses.push(self.arena.add_node(
                kind,
                clause_pos,
                self.prev_token_end,
                NodeData::CaseClause(CaseClauseData {
                    expression: clause_expression,
                    statements,
                }),
            ));
        }
        let clauses = NodeList::new(clauses, clauses_pos, self.token_pos());
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let case_block = self.arena.add_node(
            SyntaxKind::CaseBlock,
            block_pos,
            self.prev_token_end,
            NodeData::Block(BlockData { statements: clauses }),
        );
        self.arena.add_node(
            SyntaxKind::SwitchStatement,
            pos,
            self.prev_token_end,
            NodeData::Switch(SwitchData {
                expression,
                case_block,
            }),
        )
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let try_block = self.parse_block();

        let catch_clause = if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_pos = self.token_pos();
            self.next_token();
            let variable_declaration = if self.parse_optional(SyntaxKind::OpenParenToken) {
                let decl = self.parse_variable_declaration();
                self.parse_expected(SyntaxKind::CloseParenToken);
                decl
            } else {
                NodeIndex::NONE
            };
            let block = self.parse_block();
            self.arena.add_node(
                SyntaxKind::CatchClause,
                catch_pos,
                self.prev_token_end,
                NodeData::CatchClause(CatchClauseData {
                    variable_declaration,
                    block,
                }),
            )
        } else {
            NodeIndex::NONE
        };

        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };
        if catch_clause.is_none() && finally_block.is_none() {
            self.error_at_current_token(diagnostic_codes::EXPECTED, &["catch"]);
        }

        self.arena.add_node(
            SyntaxKind::TryStatement,
            pos,
            self.prev_token_end,
            NodeData::Try(TryData {
                try_block,
                catch_clause,
                finally_block,
            }),
        )
    }

    // =========================================================================
    // Variables
    // =========================================================================

    pub(crate) fn parse_variable_statement(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let declaration_list = self.parse_variable_declaration_list();
        self.parse_semicolon();
        self.arena.add_node(
            SyntaxKind::VariableStatement,
            pos,
            self.prev_token_end,
            NodeData::Variable(VariableData {
                modifiers,
                declaration_list,
            }),
        )
    }

    pub(crate) fn parse_variable_declaration_list(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let flags = match self.token() {
            SyntaxKind::LetKeyword => NodeFlags::LET,
            SyntaxKind::ConstKeyword => NodeFlags::CONST,
            _ => NodeFlags::empty(),
        };
        self.next_token();

        let list_pos = self.token_pos();
        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declaration());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        let declarations = NodeList::new(declarations, list_pos, self.prev_token_end);
        let list = self.arena.add_node(
            SyntaxKind::VariableDeclarationList,
            pos,
            self.prev_token_end,
            NodeData::VariableDeclList(VariableDeclListData { declarations }),
        );
        self.arena.set_flags(list, flags);
        list
    }

    pub(crate) fn parse_variable_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let name = self.parse_binding_name();
        let exclamation_token = !self.has_preceding_line_break()
            && self.parse_optional(SyntaxKind::ExclamationToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = self.parse_initializer();
        self.arena.add_node(
            SyntaxKind::VariableDeclaration,
            pos,
            self.prev_token_end,
            NodeData::VariableDeclaration(VariableDeclarationData {
                name,
                exclamation_token,
                type_annotation,
                initializer,
            }),
        )
    }

    /// `= expr` when present.
    pub(crate) fn parse_initializer(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        }
    }

    /// `: type` when present.
    pub(crate) fn parse_type_annotation(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub(crate) fn parse_function_declaration(&mut self, pos: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let is_async = self
            .arena
            .modifier_flags(modifiers.as_ref())
            .contains(super::node::ModifierFlags::ASYNC);
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        // `export default function () {}` has no name.
        let name = if self.is_identifier() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let function = self.parse_function_rest(modifiers, is_async, asterisk_token, name, false);
        self.finish_function(SyntaxKind::FunctionDeclaration, pos, function)
    }

    /// Signature and body of a function-like, after its name.
    pub(crate) fn parse_function_rest(
        &mut self,
        modifiers: Option<NodeList>,
        is_async: bool,
        asterisk_token: bool,
        name: NodeIndex,
        question_token: bool,
    ) -> FunctionData {
        let (set, clear) = Self::function_context(is_async, asterisk_token);
        self.with_context(set, clear, |p| {
            let type_parameters = p.parse_type_parameters();
            let parameters = p.parse_parameters();
            let type_annotation = p.parse_return_type(SyntaxKind::ColonToken);
            let body = p.parse_function_body();
            FunctionData {
                modifiers,
                is_async,
                asterisk_token,
                name,
                question_token,
                type_parameters,
                parameters,
                type_annotation,
                body,
                parenthesized_parameters: true,
            }
        })
    }

    pub(crate) fn finish_function(&mut self, kind: SyntaxKind, pos: u32, function: FunctionData) -> NodeIndex {
        self.arena
            .add_node(kind, pos, self.prev_token_end, NodeData::Function(function))
    }

    /// Context flags (set, clear) for the parameters and body of a function.
    pub(crate) fn function_context(is_async: bool, is_generator: bool) -> (u32, u32) {
        let mut set = 0;
        let mut clear = CONTEXT_FLAG_DISALLOW_IN;
        if is_async {
            set |= CONTEXT_FLAG_ASYNC;
            clear |= CONTEXT_FLAG_FUNCTION_BODY;
        } else {
            set |= CONTEXT_FLAG_FUNCTION_BODY;
            clear |= CONTEXT_FLAG_ASYNC;
        }
        if is_generator {
            set |= CONTEXT_FLAG_GENERATOR;
        } else {
            clear |= CONTEXT_FLAG_GENERATOR;
        }
        (set, clear)
    }

    /// Block body, or nothing for overloads and ambient declarations.
    pub(crate) fn parse_function_body(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            return self.parse_block();
        }
        if !self.parse_semicolon() {
            self.error_at_current_token(diagnostic_codes::EXPECTED, &["{"]);
        }
        NodeIndex::NONE
    }

    /// `( params )`. The list's `pos` is the offset right after `(`.
    pub(crate) fn parse_parameters(&mut self) -> NodeList {
        if !self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_expected(SyntaxKind::OpenParenToken);
            return NodeList::empty_at(self.token_pos());
        }
        let after_open = self.token_end();
        self.next_token();
        let mut list = self.parse_delimited_list(SyntaxKind::CloseParenToken, Self::parse_parameter);
        list.pos = after_open;
        list.end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseParenToken);
        list
    }

    pub(crate) fn parse_parameter(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let modifiers = self.parse_modifiers(true);
        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = if self.is_token(SyntaxKind::ThisKeyword) {
            self.create_identifier()
        } else {
            self.parse_binding_name()
        };
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = self.parse_initializer();
        self.arena.add_node(
            SyntaxKind::Parameter,
            pos,
            self.prev_token_end,
            NodeData::Parameter(ParameterData {
                modifiers,
                dot_dot_dot_token,
                name,
                question_token,
                type_annotation,
                initializer,
            }),
        )
    }
}

#[cfg(test)]
#[path = "tests/state_statements_tests.rs"]
mod tests;
