//! Scanner (tokenizer).
//!
//! The scanner is a pull-based state machine: [`ScannerState::scan`] advances
//! to the next token and records its kind, start, end and cooked value.
//! Trivia (whitespace and comments) is skipped and only leaves a trace in
//! [`TokenFlags::PRECEDING_LINE_BREAK`].
//!
//! Context-dependent tokens are resolved by the parser through the rescan
//! hooks: `>` is always scanned alone and merged by
//! [`ScannerState::rescan_greater_token`], `/` becomes a regular expression
//! through [`ScannerState::rescan_slash_token`], and `}` continues a template
//! through [`ScannerState::rescan_template_token`].

mod syntax_kind;

pub use syntax_kind::{SyntaxKind, keyword_text, text_to_keyword};

use bitflags::bitflags;
use std::sync::Arc;
use typewiz_common::diagnostics::{diagnostic_codes, diagnostic_messages};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u32 {
        const PRECEDING_LINE_BREAK = 1 << 0;
        const UNTERMINATED = 1 << 1;
        const SCIENTIFIC = 1 << 2;
        const HEX_SPECIFIER = 1 << 3;
        const CONTAINS_SEPARATOR = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: usize,
    pub length: usize,
    pub code: u32,
    pub message: &'static str,
}

/// Saved scanner position for speculative parsing.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    token_flags: TokenFlags,
    diagnostics_len: usize,
}

#[derive(Debug)]
pub struct ScannerState {
    text: Arc<str>,
    pos: usize,
    end: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    token_flags: TokenFlags,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    #[must_use]
    pub fn new(text: String) -> Self {
        let end = text.len();
        Self {
            text: Arc::from(text),
            pos: 0,
            end,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_value: String::new(),
            token_flags: TokenFlags::empty(),
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn source_text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    #[inline]
    #[must_use]
    pub const fn get_token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    #[must_use]
    pub const fn get_token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    #[must_use]
    pub const fn get_token_end(&self) -> usize {
        self.pos
    }

    /// Cooked value of the current token: identifier name, unescaped string
    /// or template text, numeric text without separators.
    #[must_use]
    pub fn get_token_value(&self) -> &str {
        &self.token_value
    }

    #[must_use]
    pub fn get_token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    #[inline]
    #[must_use]
    pub const fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    #[inline]
    #[must_use]
    pub const fn is_unterminated(&self) -> bool {
        self.token_flags.contains(TokenFlags::UNTERMINATED)
    }

    #[must_use]
    pub fn get_scanner_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.token_value = snapshot.token_value;
        self.token_flags = snapshot.token_flags;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.text.as_bytes().get(pos).copied().unwrap_or(0)
    }

    #[inline]
    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|rest| rest.chars().next())
    }

    fn error(&mut self, pos: usize, length: usize, code: u32, message: &'static str) {
        self.diagnostics.push(ScannerDiagnostic {
            pos,
            length,
            code,
            message,
        });
    }

    fn finish(&mut self, kind: SyntaxKind, len: usize) -> SyntaxKind {
        self.pos += len;
        self.token = kind;
        kind
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Advance to the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::empty();
        self.token_value.clear();

        loop {
            self.token_start = self.pos;
            if self.pos >= self.end {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            }

            let ch = self.byte_at(self.pos);
            match ch {
                b'\n' | b'\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'#' if self.pos == 0 && self.byte_at(1) == b'!' => self.skip_line(),
                b'/' => match self.byte_at(self.pos + 1) {
                    b'/' => self.skip_line(),
                    b'*' => self.skip_block_comment(),
                    b'=' => return self.finish(SyntaxKind::SlashEqualsToken, 2),
                    _ => return self.finish(SyntaxKind::SlashToken, 1),
                },
                b'"' | b'\'' => return self.scan_string(ch),
                b'`' => return self.scan_template(),
                b'0'..=b'9' => return self.scan_number(),
                b'.' => {
                    if self.byte_at(self.pos + 1).is_ascii_digit() {
                        return self.scan_number();
                    }
                    if self.byte_at(self.pos + 1) == b'.' && self.byte_at(self.pos + 2) == b'.' {
                        return self.finish(SyntaxKind::DotDotDotToken, 3);
                    }
                    return self.finish(SyntaxKind::DotToken, 1);
                }
                b'#' => {
                    let after = self.pos + 1;
                    if self.char_at(after).is_some_and(is_identifier_start) {
                        self.pos = after;
                        self.scan_identifier_parts();
                        self.token_value = self.text[self.token_start..self.pos].to_string();
                        self.token = SyntaxKind::PrivateIdentifier;
                        return self.token;
                    }
                    return self.invalid_character(1);
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => return self.scan_identifier(),
                _ if ch >= 0x80 => {
                    let Some(c) = self.char_at(self.pos) else {
                        return self.invalid_character(1);
                    };
                    if c == '\u{2028}' || c == '\u{2029}' {
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                        self.pos += c.len_utf8();
                    } else if c.is_whitespace() || c == '\u{feff}' {
                        self.pos += c.len_utf8();
                    } else if is_identifier_start(c) {
                        return self.scan_identifier();
                    } else {
                        return self.invalid_character(c.len_utf8());
                    }
                }
                _ => return self.scan_punctuation(ch),
            }
        }
    }

    fn invalid_character(&mut self, len: usize) -> SyntaxKind {
        self.error(
            self.pos,
            len,
            diagnostic_codes::INVALID_CHARACTER,
            diagnostic_messages::INVALID_CHARACTER,
        );
        self.finish(SyntaxKind::Unknown, len)
    }

    fn skip_line(&mut self) {
        let rest = &self.text.as_bytes()[self.pos..self.end];
        self.pos = match memchr::memchr2(b'\n', b'\r', rest) {
            Some(offset) => self.pos + offset,
            None => self.end,
        };
    }

    fn skip_block_comment(&mut self) {
        let body_start = self.pos + 2;
        let rest = &self.text.as_bytes()[body_start..self.end];
        let close = memchr::memmem::find(rest, b"*/");
        let body_end = close.map_or(self.end, |offset| body_start + offset);
        if memchr::memchr2(b'\n', b'\r', &self.text.as_bytes()[body_start..body_end]).is_some() {
            self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
        }
        match close {
            Some(_) => self.pos = body_end + 2,
            None => {
                self.error(
                    self.pos,
                    self.end - self.pos,
                    diagnostic_codes::UNTERMINATED_COMMENT,
                    diagnostic_messages::UNTERMINATED_COMMENT,
                );
                self.pos = self.end;
            }
        }
    }

    fn scan_identifier_parts(&mut self) {
        while self.pos < self.end {
            let b = self.byte_at(self.pos);
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.pos += 1;
            } else if b >= 0x80 {
                match self.char_at(self.pos) {
                    Some(c) if is_identifier_part(c) => self.pos += c.len_utf8(),
                    _ => break,
                }
            } else {
                break;
            }
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        self.scan_identifier_parts();
        let text = &self.text[self.token_start..self.pos];
        self.token = text_to_keyword(text).unwrap_or(SyntaxKind::Identifier);
        self.token_value = text.to_string();
        self.token
    }

    fn scan_digits(&mut self, accept: impl Fn(u8) -> bool) {
        while self.pos < self.end {
            let b = self.byte_at(self.pos);
            if accept(b) {
                self.pos += 1;
            } else if b == b'_' && accept(self.byte_at(self.pos + 1)) {
                self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let first = self.byte_at(self.pos);
        let second = self.byte_at(self.pos + 1).to_ascii_lowercase();
        let mut kind = SyntaxKind::NumericLiteral;

        if first == b'0' && matches!(second, b'x' | b'b' | b'o') {
            self.pos += 2;
            self.token_flags |= TokenFlags::HEX_SPECIFIER;
            match second {
                b'x' => self.scan_digits(|b| b.is_ascii_hexdigit()),
                b'b' => self.scan_digits(|b| b == b'0' || b == b'1'),
                _ => self.scan_digits(|b| (b'0'..=b'7').contains(&b)),
            }
            if self.byte_at(self.pos) == b'n' {
                self.pos += 1;
                kind = SyntaxKind::BigIntLiteral;
            }
        } else {
            let mut integral = true;
            self.scan_digits(|b| b.is_ascii_digit());
            if self.byte_at(self.pos) == b'.' {
                integral = false;
                self.pos += 1;
                self.scan_digits(|b| b.is_ascii_digit());
            }
            if matches!(self.byte_at(self.pos), b'e' | b'E') {
                let sign = usize::from(matches!(self.byte_at(self.pos + 1), b'+' | b'-'));
                if self.byte_at(self.pos + 1 + sign).is_ascii_digit() {
                    integral = false;
                    self.token_flags |= TokenFlags::SCIENTIFIC;
                    self.pos += 1 + sign;
                    self.scan_digits(|b| b.is_ascii_digit());
                }
            }
            if integral && self.byte_at(self.pos) == b'n' {
                self.pos += 1;
                kind = SyntaxKind::BigIntLiteral;
            }
        }

        self.token_value = self.text[self.token_start..self.pos].replace('_', "");
        self.token = kind;
        kind
    }

    /// Scan an escape sequence starting at the backslash and append its cooked
    /// value to `out`.
    fn scan_escape(&mut self, out: &mut String) {
        self.pos += 1;
        let Some(c) = self.char_at(self.pos) else {
            return;
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.byte_at(self.pos).is_ascii_digit() => out.push('\0'),
            'x' => {
                let digits = self.text.get(self.pos..self.pos + 2).unwrap_or("");
                match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == 2 => {
                        out.push(decoded);
                        self.pos += 2;
                    }
                    _ => out.push('x'),
                }
            }
            'u' => {
                if self.byte_at(self.pos) == b'{' {
                    let rest = &self.text.as_bytes()[self.pos..self.end];
                    if let Some(close) = memchr::memchr(b'}', rest) {
                        let digits = &self.text[self.pos + 1..self.pos + close];
                        if let Some(decoded) =
                            u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
                        {
                            out.push(decoded);
                            self.pos += close + 1;
                            return;
                        }
                    }
                    out.push('u');
                } else {
                    let digits = self.text.get(self.pos..self.pos + 4).unwrap_or("");
                    match u32::from_str_radix(digits, 16).ok() {
                        Some(code) if digits.len() == 4 => {
                            out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                            self.pos += 4;
                        }
                        _ => out.push('u'),
                    }
                }
            }
            '\r' => {
                if self.byte_at(self.pos) == b'\n' {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        loop {
            let rest = &self.text.as_bytes()[self.pos..self.end];
            let stop = match (
                memchr::memchr3(quote, b'\\', b'\n', rest),
                memchr::memchr(b'\r', rest),
            ) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            let Some(offset) = stop else {
                value.push_str(&self.text[self.pos..self.end]);
                self.pos = self.end;
                self.unterminated_string();
                break;
            };
            value.push_str(&self.text[self.pos..self.pos + offset]);
            self.pos += offset;
            match self.byte_at(self.pos) {
                b'\\' => self.scan_escape(&mut value),
                b'\n' | b'\r' => {
                    self.unterminated_string();
                    break;
                }
                _ => {
                    self.pos += 1;
                    break;
                }
            }
        }
        self.token_value = value;
        self.token = SyntaxKind::StringLiteral;
        self.token
    }

    fn unterminated_string(&mut self) {
        self.token_flags |= TokenFlags::UNTERMINATED;
        self.error(
            self.token_start,
            self.pos - self.token_start,
            diagnostic_codes::UNTERMINATED_STRING_LITERAL,
            diagnostic_messages::UNTERMINATED_STRING_LITERAL,
        );
    }

    /// Scan a template chunk. `self.pos` is on the opening `` ` `` or `}`.
    fn scan_template(&mut self) -> SyntaxKind {
        let starts_template = self.byte_at(self.pos) == b'`';
        self.pos += 1;
        let mut value = String::new();
        let kind = loop {
            if self.pos >= self.end {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    diagnostic_codes::UNTERMINATED_TEMPLATE_LITERAL,
                    diagnostic_messages::UNTERMINATED_TEMPLATE_LITERAL,
                );
                break if starts_template {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            }
            match self.byte_at(self.pos) {
                b'`' => {
                    self.pos += 1;
                    break if starts_template {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                b'$' if self.byte_at(self.pos + 1) == b'{' => {
                    self.pos += 2;
                    break if starts_template {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                b'\\' => self.scan_escape(&mut value),
                b'\r' => {
                    value.push('\n');
                    self.pos += 1;
                    if self.byte_at(self.pos) == b'\n' {
                        self.pos += 1;
                    }
                }
                _ => {
                    let Some(c) = self.char_at(self.pos) else {
                        self.pos += 1;
                        continue;
                    };
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        };
        self.token_value = value;
        self.token = kind;
        kind
    }

    fn scan_punctuation(&mut self, ch: u8) -> SyntaxKind {
        use SyntaxKind as K;
        let next = self.byte_at(self.pos + 1);
        let third = self.byte_at(self.pos + 2);
        match ch {
            b'{' => self.finish(K::OpenBraceToken, 1),
            b'}' => self.finish(K::CloseBraceToken, 1),
            b'(' => self.finish(K::OpenParenToken, 1),
            b')' => self.finish(K::CloseParenToken, 1),
            b'[' => self.finish(K::OpenBracketToken, 1),
            b']' => self.finish(K::CloseBracketToken, 1),
            b';' => self.finish(K::SemicolonToken, 1),
            b',' => self.finish(K::CommaToken, 1),
            b':' => self.finish(K::ColonToken, 1),
            b'~' => self.finish(K::TildeToken, 1),
            b'@' => self.finish(K::AtToken, 1),
            // Merged later by rescan_greater_token when the parser wants an operator.
            b'>' => self.finish(K::GreaterThanToken, 1),
            b'!' => match (next, third) {
                (b'=', b'=') => self.finish(K::ExclamationEqualsEqualsToken, 3),
                (b'=', _) => self.finish(K::ExclamationEqualsToken, 2),
                _ => self.finish(K::ExclamationToken, 1),
            },
            b'%' => match next {
                b'=' => self.finish(K::PercentEqualsToken, 2),
                _ => self.finish(K::PercentToken, 1),
            },
            b'&' => match (next, third) {
                (b'&', b'=') => self.finish(K::AmpersandAmpersandEqualsToken, 3),
                (b'&', _) => self.finish(K::AmpersandAmpersandToken, 2),
                (b'=', _) => self.finish(K::AmpersandEqualsToken, 2),
                _ => self.finish(K::AmpersandToken, 1),
            },
            b'|' => match (next, third) {
                (b'|', b'=') => self.finish(K::BarBarEqualsToken, 3),
                (b'|', _) => self.finish(K::BarBarToken, 2),
                (b'=', _) => self.finish(K::BarEqualsToken, 2),
                _ => self.finish(K::BarToken, 1),
            },
            b'^' => match next {
                b'=' => self.finish(K::CaretEqualsToken, 2),
                _ => self.finish(K::CaretToken, 1),
            },
            b'*' => match (next, third) {
                (b'*', b'=') => self.finish(K::AsteriskAsteriskEqualsToken, 3),
                (b'*', _) => self.finish(K::AsteriskAsteriskToken, 2),
                (b'=', _) => self.finish(K::AsteriskEqualsToken, 2),
                _ => self.finish(K::AsteriskToken, 1),
            },
            b'+' => match next {
                b'+' => self.finish(K::PlusPlusToken, 2),
                b'=' => self.finish(K::PlusEqualsToken, 2),
                _ => self.finish(K::PlusToken, 1),
            },
            b'-' => match next {
                b'-' => self.finish(K::MinusMinusToken, 2),
                b'=' => self.finish(K::MinusEqualsToken, 2),
                _ => self.finish(K::MinusToken, 1),
            },
            b'<' => match (next, third) {
                (b'<', b'=') => self.finish(K::LessThanLessThanEqualsToken, 3),
                (b'<', _) => self.finish(K::LessThanLessThanToken, 2),
                (b'=', _) => self.finish(K::LessThanEqualsToken, 2),
                _ => self.finish(K::LessThanToken, 1),
            },
            b'=' => match (next, third) {
                (b'=', b'=') => self.finish(K::EqualsEqualsEqualsToken, 3),
                (b'=', _) => self.finish(K::EqualsEqualsToken, 2),
                (b'>', _) => self.finish(K::EqualsGreaterThanToken, 2),
                _ => self.finish(K::EqualsToken, 1),
            },
            b'?' => match (next, third) {
                (b'.', digit) if !digit.is_ascii_digit() => self.finish(K::QuestionDotToken, 2),
                (b'?', b'=') => self.finish(K::QuestionQuestionEqualsToken, 3),
                (b'?', _) => self.finish(K::QuestionQuestionToken, 2),
                _ => self.finish(K::QuestionToken, 1),
            },
            _ => self.invalid_character(1),
        }
    }

    // =========================================================================
    // Rescanning
    // =========================================================================

    /// Merge a `>` token with following `>`/`=` characters into a shift or
    /// comparison operator.
    pub fn rescan_greater_token(&mut self) -> SyntaxKind {
        use SyntaxKind as K;
        if self.token != K::GreaterThanToken {
            return self.token;
        }
        let next = self.byte_at(self.pos);
        let third = self.byte_at(self.pos + 1);
        let fourth = self.byte_at(self.pos + 2);
        match (next, third, fourth) {
            (b'>', b'>', b'=') => self.finish(K::GreaterThanGreaterThanGreaterThanEqualsToken, 3),
            (b'>', b'>', _) => self.finish(K::GreaterThanGreaterThanGreaterThanToken, 2),
            (b'>', b'=', _) => self.finish(K::GreaterThanGreaterThanEqualsToken, 2),
            (b'>', _, _) => self.finish(K::GreaterThanGreaterThanToken, 1),
            (b'=', _, _) => self.finish(K::GreaterThanEqualsToken, 1),
            _ => self.token,
        }
    }

    /// Rescan a `/` or `/=` token as a regular expression literal.
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        if !matches!(self.token, SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken) {
            return self.token;
        }
        self.pos = self.token_start + 1;
        let mut in_class = false;
        loop {
            if self.pos >= self.end || matches!(self.byte_at(self.pos), b'\n' | b'\r') {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    diagnostic_codes::UNTERMINATED_REGULAR_EXPRESSION_LITERAL,
                    diagnostic_messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL,
                );
                break;
            }
            match self.byte_at(self.pos) {
                b'\\' => {
                    self.pos += 1;
                    if let Some(c) = self.char_at(self.pos) {
                        self.pos += c.len_utf8();
                    }
                    continue;
                }
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            match self.char_at(self.pos) {
                Some(c) => self.pos += c.len_utf8(),
                None => self.pos += 1,
            }
        }
        self.scan_identifier_parts();
        self.token_value = self.text[self.token_start..self.pos].to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Continue a template literal after the `}` closing a substitution.
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::CloseBraceToken {
            return self.token;
        }
        self.pos = self.token_start;
        self.scan_template()
    }
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

#[inline]
fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '$'
        || c == '\u{200c}'
        || c == '\u{200d}'
        || (!c.is_ascii() && c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<(SyntaxKind, String)> {
        let mut scanner = ScannerState::new(text.to_string());
        let mut out = Vec::new();
        loop {
            let kind = scanner.scan();
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
            out.push((kind, scanner.get_token_text().to_string()));
        }
        out
    }

    #[test]
    fn scans_punctuation_greedily_except_greater_than() {
        let kinds: Vec<_> = tokens("a ?. b ?? c >>= d => e")
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::QuestionDotToken,
                SyntaxKind::Identifier,
                SyntaxKind::QuestionQuestionToken,
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanToken,
                SyntaxKind::GreaterThanToken,
                SyntaxKind::EqualsToken,
                SyntaxKind::Identifier,
                SyntaxKind::EqualsGreaterThanToken,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn rescan_merges_greater_than() {
        let mut scanner = ScannerState::new("a >>= b".to_string());
        scanner.scan();
        assert_eq!(scanner.scan(), SyntaxKind::GreaterThanToken);
        assert_eq!(
            scanner.rescan_greater_token(),
            SyntaxKind::GreaterThanGreaterThanEqualsToken
        );
        assert_eq!(scanner.get_token_text(), ">>=");
    }

    #[test]
    fn skips_comments_and_tracks_line_breaks() {
        let mut scanner = ScannerState::new("a /* x\n */ b // c\n c".to_string());
        scanner.scan();
        assert!(!scanner.has_preceding_line_break());
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.get_token_value(), "b");
        assert!(scanner.has_preceding_line_break());
        scanner.scan();
        assert_eq!(scanner.get_token_value(), "c");
        assert_eq!(scanner.get_token_start(), 19);
    }

    #[test]
    fn string_escapes_are_cooked() {
        let mut scanner = ScannerState::new(r#"'a\'b\nA\u{1F600}'"#.to_string());
        assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.get_token_value(), "a'b\nA\u{1F600}");
        assert!(scanner.get_scanner_diagnostics().is_empty());
    }

    #[test]
    fn unterminated_string_reports_diagnostic() {
        let mut scanner = ScannerState::new("'abc\nx".to_string());
        scanner.scan();
        assert!(scanner.is_unterminated());
        assert_eq!(
            scanner.get_scanner_diagnostics()[0].code,
            diagnostic_codes::UNTERMINATED_STRING_LITERAL
        );
    }

    #[test]
    fn numbers() {
        let toks = tokens("1_000 0x1F 1.5e3 .5 10n");
        assert_eq!(toks[0].0, SyntaxKind::NumericLiteral);
        assert_eq!(toks[1].1, "0x1F");
        assert_eq!(toks[2].1, "1.5e3");
        assert_eq!(toks[3].1, ".5");
        assert_eq!(toks[4].0, SyntaxKind::BigIntLiteral);
    }

    #[test]
    fn templates_and_rescan() {
        let mut scanner = ScannerState::new("`a${b}c`".to_string());
        assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
        assert_eq!(scanner.get_token_value(), "a");
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateTail);
        assert_eq!(scanner.get_token_value(), "c");
    }

    #[test]
    fn regex_rescan() {
        let mut scanner = ScannerState::new("/[/]a\\//gi.test".to_string());
        assert_eq!(scanner.scan(), SyntaxKind::SlashToken);
        assert_eq!(scanner.rescan_slash_token(), SyntaxKind::RegularExpressionLiteral);
        assert_eq!(scanner.get_token_text(), "/[/]a\\//gi");
        assert_eq!(scanner.scan(), SyntaxKind::DotToken);
    }

    #[test]
    fn shebang_and_private_names() {
        let toks = tokens("#!/usr/bin/env node\n#secret");
        assert_eq!(toks, vec![(SyntaxKind::PrivateIdentifier, "#secret".to_string())]);
    }

    #[test]
    fn unicode_identifiers() {
        let toks = tokens("const naïve = 1");
        assert_eq!(toks[1], (SyntaxKind::Identifier, "naïve".to_string()));
    }

    #[test]
    fn save_and_restore_state() {
        let mut scanner = ScannerState::new("a b c".to_string());
        scanner.scan();
        let saved = scanner.save_state();
        scanner.scan();
        scanner.scan();
        scanner.restore_state(saved);
        assert_eq!(scanner.get_token_value(), "a");
        scanner.scan();
        assert_eq!(scanner.get_token_value(), "b");
    }
}
