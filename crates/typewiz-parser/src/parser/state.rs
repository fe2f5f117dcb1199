//! Parser state: token plumbing, diagnostics and speculative parsing.
//!
//! The grammar itself lives in the `state_*` modules, one per area:
//! statements, declarations (classes, interfaces, modules, imports),
//! expressions and types.

use super::base::{NodeIndex, NodeList};
use super::node::NodeArena;
use crate::scanner::{ScannerSnapshot, ScannerState, SyntaxKind};
use std::sync::Arc;
use typewiz_common::diagnostics::{diagnostic_codes, format_message, get_diagnostic_message};
use typewiz_common::limits::MAX_PARSER_RECURSION_DEPTH;

pub const CONTEXT_FLAG_DISALLOW_IN: u32 = 1 << 0;
pub const CONTEXT_FLAG_GENERATOR: u32 = 1 << 1;
pub const CONTEXT_FLAG_ASYNC: u32 = 1 << 2;
/// Inside a non-async function body, where `await` is an identifier.
pub const CONTEXT_FLAG_FUNCTION_BODY: u32 = 1 << 3;
pub const CONTEXT_FLAG_AMBIENT: u32 = 1 << 4;
pub const CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES: u32 = 1 << 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: String,
    pub code: u32,
}

struct ParserSnapshot {
    scanner: ScannerSnapshot,
    arena_len: usize,
    diagnostics_len: usize,
    current_token: SyntaxKind,
    prev_token_end: u32,
    context_flags: u32,
    error_count: u32,
}

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) parse_diagnostics: Vec<ParseDiagnostic>,
    pub(crate) context_flags: u32,
    pub(crate) current_token: SyntaxKind,
    /// End of the most recently consumed token; node ends are taken from here.
    pub(crate) prev_token_end: u32,
    pub(crate) recursion_depth: u32,
    /// Every reported error, including ones deduplicated away.
    pub(crate) error_count: u32,
}

impl ParserState {
    #[must_use]
    pub fn new(file_name: String, source_text: String) -> ParserState {
        let estimated_nodes = source_text.len() / 8;
        ParserState {
            scanner: ScannerState::new(source_text),
            arena: NodeArena::with_capacity(estimated_nodes),
            file_name,
            parse_diagnostics: Vec::new(),
            context_flags: 0,
            current_token: SyntaxKind::Unknown,
            prev_token_end: 0,
            recursion_depth: 0,
            error_count: 0,
        }
    }

    #[must_use]
    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    #[must_use]
    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    #[must_use]
    pub fn get_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    #[must_use]
    pub fn source_text_arc(&self) -> Arc<str> {
        self.scanner.source_text_arc()
    }

    #[inline]
    pub(crate) fn u32_from_usize(&self, value: usize) -> u32 {
        u32::try_from(value).unwrap_or(u32::MAX)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    #[inline]
    pub(crate) const fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.u32_from_usize(self.scanner.get_token_start())
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.u32_from_usize(self.scanner.get_token_end())
    }

    pub(crate) fn token_value(&self) -> String {
        self.scanner.get_token_value().to_string()
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    pub(crate) fn rescan_greater_token(&mut self) -> SyntaxKind {
        self.current_token = self.scanner.rescan_greater_token();
        self.current_token
    }

    pub(crate) fn rescan_slash_token(&mut self) -> SyntaxKind {
        self.current_token = self.scanner.rescan_slash_token();
        self.current_token
    }

    pub(crate) fn rescan_template_token(&mut self) -> SyntaxKind {
        self.current_token = self.scanner.rescan_template_token();
        self.current_token
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `'{kind}' expected.` without consuming.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let text = kind.token_text().unwrap_or("token");
        self.error_at_current_token(diagnostic_codes::EXPECTED, &[text]);
        false
    }

    #[inline]
    pub(crate) fn in_context(&self, flag: u32) -> bool {
        self.context_flags & flag != 0
    }

    /// Run `f` with `set` context flags added and `clear` flags removed.
    pub(crate) fn with_context<T>(&mut self, set: u32, clear: u32, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.context_flags;
        self.context_flags = (saved | set) & !clear;
        let result = f(self);
        self.context_flags = saved;
        result
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Whether the current token can be used as an identifier.
    pub(crate) fn is_identifier(&self) -> bool {
        let token = self.token();
        if token == SyntaxKind::Identifier {
            return true;
        }
        if token == SyntaxKind::YieldKeyword && self.in_context(CONTEXT_FLAG_GENERATOR) {
            return false;
        }
        if token == SyntaxKind::AwaitKeyword && self.in_context(CONTEXT_FLAG_ASYNC) {
            return false;
        }
        token.is_keyword() && !token.is_reserved_word()
    }

    pub(crate) fn create_identifier(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        let text = self.token_value();
        let kind = if self.is_token(SyntaxKind::PrivateIdentifier) {
            SyntaxKind::PrivateIdentifier
        } else {
            SyntaxKind::Identifier
        };
        self.next_token();
        self.arena.add_identifier(kind, pos, end, text)
    }

    /// Zero-width identifier standing in for a missing name.
    pub(crate) fn create_missing_identifier(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.arena
            .add_identifier(SyntaxKind::Identifier, pos, pos, String::new())
    }

    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_identifier() {
            return self.create_identifier();
        }
        self.error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
        self.create_missing_identifier()
    }

    /// Identifier or any keyword, as after `.` in a property access.
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        if self.token().is_identifier_or_keyword() || self.is_token(SyntaxKind::PrivateIdentifier) {
            return self.create_identifier();
        }
        self.error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
        self.create_missing_identifier()
    }

    // =========================================================================
    // Semicolons (ASI)
    // =========================================================================

    pub(crate) fn can_parse_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::SemicolonToken)
            || self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.has_preceding_line_break()
    }

    pub(crate) fn parse_semicolon(&mut self) -> bool {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return true;
        }
        if self.can_parse_semicolon() {
            return true;
        }
        self.parse_expected(SyntaxKind::SemicolonToken)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at(&mut self, start: u32, length: u32, code: u32, args: &[&str]) {
        self.error_count += 1;
        // One diagnostic per position keeps cascades down.
        if self
            .parse_diagnostics
            .last()
            .is_some_and(|last| last.start == start)
        {
            return;
        }
        let message = get_diagnostic_message(code)
            .map_or_else(|| format!("TS{code}"), |m| format_message(m.message, args));
        self.parse_diagnostics.push(ParseDiagnostic {
            start,
            length,
            message,
            code,
        });
    }

    pub(crate) fn error_at_current_token(&mut self, code: u32, args: &[&str]) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.error_at(start, length, code, args);
    }

    pub(crate) fn flush_scanner_diagnostics(&mut self) {
        let scanner_diagnostics = self.scanner.get_scanner_diagnostics().to_vec();
        for diag in scanner_diagnostics {
            self.parse_diagnostics.push(ParseDiagnostic {
                start: self.u32_from_usize(diag.pos),
                length: self.u32_from_usize(diag.length),
                message: diag.message.to_string(),
                code: diag.code,
            });
        }
        self.parse_diagnostics.sort_by_key(|d| d.start);
    }

    /// Guard for recursive descent. Returns false (after reporting) when the
    /// nesting limit is reached; callers must then produce a placeholder.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_RECURSION_DEPTH {
            self.error_at_current_token(diagnostic_codes::EXPRESSION_TOO_DEEPLY_NESTED, &[]);
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            arena_len: self.arena.len(),
            diagnostics_len: self.parse_diagnostics.len(),
            current_token: self.current_token,
            prev_token_end: self.prev_token_end,
            context_flags: self.context_flags,
            error_count: self.error_count,
        }
    }

    fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.arena.truncate(snapshot.arena_len);
        self.parse_diagnostics.truncate(snapshot.diagnostics_len);
        self.current_token = snapshot.current_token;
        self.prev_token_end = snapshot.prev_token_end;
        self.context_flags = snapshot.context_flags;
        self.error_count = snapshot.error_count;
    }

    /// Evaluate `f` and rewind to the current token regardless of outcome.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.restore(snapshot);
        result
    }

    /// Evaluate `f`; keep its effects only if it returns `Some` without new
    /// diagnostics.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.snapshot();
        let errors_before = self.error_count;
        let scanner_errors_before = self.scanner.get_scanner_diagnostics().len();
        match f(self) {
            Some(result)
                if self.error_count == errors_before
                    && self.scanner.get_scanner_diagnostics().len() == scanner_errors_before =>
            {
                Some(result)
            }
            _ => {
                self.restore(snapshot);
                None
            }
        }
    }

    /// Peek at the token after the current one.
    pub(crate) fn next_token_is(&mut self, predicate: impl FnOnce(&Self) -> bool) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            predicate(p)
        })
    }

    pub(crate) fn next_token_is_on_same_line(&mut self, predicate: impl FnOnce(&Self) -> bool) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break() && predicate(p)
        })
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Parse comma-separated elements up to (not including) `close`.
    pub(crate) fn parse_delimited_list(
        &mut self,
        close: SyntaxKind,
        parse_element: fn(&mut Self) -> NodeIndex,
    ) -> NodeList {
        let list_pos = self.token_pos();
        let mut nodes = Vec::new();
        let mut has_trailing_comma = false;
        while !self.is_token(close) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            let element = parse_element(self);
            if element.is_some() {
                nodes.push(element);
            }
            if self.parse_optional(SyntaxKind::CommaToken) {
                has_trailing_comma = self.is_token(close);
                continue;
            }
            has_trailing_comma = false;
            if self.is_token(close) {
                break;
            }
            self.parse_expected(SyntaxKind::CommaToken);
            if self.token_pos() == before {
                // No progress: drop the offending token.
                self.next_token();
            }
            if self.is_list_terminator_recovery() {
                break;
            }
        }
        let mut list = NodeList::new(nodes, list_pos, self.token_pos());
        list.has_trailing_comma = has_trailing_comma;
        list
    }

    fn is_list_terminator_recovery(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        )
    }

    pub(crate) fn unexpected_token(&mut self) {
        self.error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[]);
    }
}
